use super::{
    ast::{Atom, BinOp, Block, Expr, Program, Stmt, UnOp, VarType},
    environment::{Binding, Environment},
    tokens::Position,
};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

pub mod console;

pub use console::{Input, Output, StdinInput};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Variable {name:?} is undefined or out of scope on {pos}.")]
    UndefinedVariable { name: String, pos: Position },
    #[error("Variable {name:?} is already declared in this scope on {pos}.")]
    Redeclaration { name: String, pos: Position },
    #[error("Type error on {pos}: {message}.")]
    TypeError { message: String, pos: Position },
    #[error("Arithmetic error on {pos}: {message}.")]
    ArithmeticError { message: String, pos: Position },
    #[error("No input left to read into {name:?} on {pos}.")]
    InputExhausted { name: String, pos: Position },
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Runtime switches, set from the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Report declarations, assignments, reads, writes and loop iterations on
    /// stderr.
    pub trace: bool,
    /// Make `leia` on an undeclared variable an error instead of declaring it.
    pub strict_reads: bool,
}

pub struct Interpreter<I, O> {
    env: Environment,
    input: I,
    output: O,
    options: Options,
}

impl<I: Input, O: Output> Interpreter<I, O> {
    pub fn new(input: I, output: O) -> Interpreter<I, O> {
        Interpreter::with_options(input, output, Options::default())
    }

    pub fn with_options(input: I, output: O, options: Options) -> Interpreter<I, O> {
        Interpreter {
            env: Environment::new(),
            input,
            output,
            options,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Executes every statement in the global frame, which outlives the call
    /// so a prompt can keep its variables between programs.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for stmt in &program.statements {
            self.evaluate_statement(stmt)?;
        }
        Ok(())
    }

    fn trace(&self, args: fmt::Arguments) {
        if self.options.trace {
            eprintln!("[arara] {}", args);
        }
    }

    fn evaluate_block(&mut self, block: &Block) -> Result<(), RuntimeError> {
        self.env.push_scope();
        let result = block
            .statements
            .iter()
            .try_for_each(|stmt| self.evaluate_statement(stmt));
        self.env.pop_scope();
        result
    }

    fn evaluate_statement(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Declaration {
                name,
                ty,
                init,
                pos,
            } => {
                if self.env.is_declared_locally(name) {
                    return Err(RuntimeError::Redeclaration {
                        name: name.to_owned(),
                        pos: *pos,
                    });
                }
                let value = match init {
                    Some(expr) => conform(self.evaluate_expr(expr)?, *ty, *pos)?,
                    // declaration, no assignment
                    None => Atom::Undefined,
                };
                self.trace(format_args!("declaração: {} = {}", name, value));
                self.env
                    .declare_var(name.to_owned(), Binding::new(value, *ty));
            }
            Stmt::Assignment { name, value, pos } => {
                let value = self.evaluate_expr(value)?;
                let ty = self.lookup(name, *pos)?.ty;
                let value = conform(value, ty, *pos)?;
                self.trace(format_args!("atribuição: {} = {}", name, value));
                if let Some(binding) = self.env.get_var_mut(name) {
                    binding.value = value;
                }
            }
            Stmt::Read { name, pos } => self.evaluate_read(name, *pos)?,
            Stmt::Write { exprs, .. } => {
                // Evaluate everything first so a failing expression prints nothing
                let values = exprs
                    .iter()
                    .map(|expr| self.evaluate_expr(expr))
                    .collect::<Result<Vec<_>, _>>()?;
                for value in &values {
                    self.output.write_text(&value.to_string())?;
                }
                self.output.write_text("\n")?;
                self.trace(format_args!("escrita: {} valor(es)", values.len()));
            }
            Stmt::Conditional {
                cond,
                then_block,
                else_block,
                ..
            } => {
                if self.evaluate_condition(cond)? {
                    self.evaluate_block(then_block)?
                } else if let Some(else_block) = else_block {
                    self.evaluate_block(else_block)?
                }
            }
            Stmt::Repetition { cond, body, .. } => {
                while self.evaluate_condition(cond)? {
                    self.trace(format_args!("iteração em {}", body.pos));
                    self.evaluate_block(body)?
                }
            }
            Stmt::Block(block) => self.evaluate_block(block)?,
        }
        Ok(())
    }

    fn lookup(&self, name: &str, pos: Position) -> Result<&Binding, RuntimeError> {
        self.env
            .get_var(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_owned(),
                pos,
            })
    }

    fn evaluate_read(&mut self, name: &str, pos: Position) -> Result<(), RuntimeError> {
        let line = self
            .input
            .next_line()?
            .ok_or_else(|| RuntimeError::InputExhausted {
                name: name.to_owned(),
                pos,
            })?;
        let target = match self.env.get_var(name) {
            Some(binding) => Some(binding.ty.or_else(|| type_of(&binding.value))),
            None if self.options.strict_reads => {
                return Err(RuntimeError::UndefinedVariable {
                    name: name.to_owned(),
                    pos,
                })
            }
            None => None,
        };
        let value = match target {
            Some(Some(ty)) => coerce(&line, ty, pos)?,
            _ => infer(&line),
        };
        self.trace(format_args!("leitura: {} = {}", name, value));
        match self.env.get_var_mut(name) {
            Some(binding) => binding.value = value,
            None => self
                .env
                .declare_var(name.to_owned(), Binding::new(value, None)),
        }
        Ok(())
    }

    fn evaluate_condition(&self, cond: &Expr) -> Result<bool, RuntimeError> {
        match self.evaluate_expr(cond)? {
            Atom::Boolean(b) => Ok(b),
            found => Err(RuntimeError::TypeError {
                message: format!("condition must be booleano, found {}", found.type_name()),
                pos: cond.position(),
            }),
        }
    }

    fn evaluate_expr(&self, expr: &Expr) -> Result<Atom, RuntimeError> {
        match expr {
            Expr::Grouping(expr) => self.evaluate_expr(expr),
            Expr::Literal(atom, _) => Ok(atom.to_owned()),
            Expr::Variable(name, pos) => Ok(self.lookup(name, *pos)?.value.to_owned()),
            Expr::Unary(op, expr, pos) => {
                let atom = self.evaluate_expr(expr)?;
                evaluate_unary(*op, atom, *pos)
            }
            Expr::Binary(lhs, op, rhs, pos) => {
                let left = self.evaluate_expr(lhs)?;
                match op {
                    BinOp::And | BinOp::Or => {
                        let left = expect_boolean(*op, left, *pos)?;
                        // Short circuiting for logic operations
                        if (*op == BinOp::And && !left) || (*op == BinOp::Or && left) {
                            return Ok(Atom::Boolean(left));
                        }
                        let right = self.evaluate_expr(rhs)?;
                        evaluate_binary(*op, Atom::Boolean(left), right, *pos)
                    }
                    op => {
                        let right = self.evaluate_expr(rhs)?;
                        evaluate_binary(*op, left, right, *pos)
                    }
                }
            }
        }
    }
}

fn type_of(atom: &Atom) -> Option<VarType> {
    match atom {
        Atom::Integer(_) => Some(VarType::Inteiro),
        Atom::Float(_) => Some(VarType::Real),
        Atom::Boolean(_) => Some(VarType::Booleano),
        Atom::String(_) => Some(VarType::Texto),
        Atom::Undefined => None,
    }
}

/// Checks a value against a declared type. Integers widen into `real`.
fn conform(value: Atom, ty: Option<VarType>, pos: Position) -> Result<Atom, RuntimeError> {
    let ty = match ty {
        Some(ty) => ty,
        None => return Ok(value),
    };
    Ok(match (ty, value) {
        (_, Atom::Undefined) => Atom::Undefined,
        (VarType::Inteiro, Atom::Integer(n)) => Atom::Integer(n),
        (VarType::Real, Atom::Integer(n)) => Atom::Float(n as f64),
        (VarType::Real, Atom::Float(n)) => Atom::Float(n),
        (VarType::Booleano, Atom::Boolean(b)) => Atom::Boolean(b),
        (VarType::Texto, Atom::String(s)) => Atom::String(s),
        (ty, value) => {
            return Err(RuntimeError::TypeError {
                message: format!(
                    "cannot store {} value in {} variable",
                    value.type_name(),
                    ty
                ),
                pos,
            })
        }
    })
}

/// Converts a line read from input into the target type.
fn coerce(line: &str, ty: VarType, pos: Position) -> Result<Atom, RuntimeError> {
    let text = line.trim();
    let parsed = match ty {
        VarType::Inteiro => text.parse().ok().map(Atom::Integer),
        VarType::Real => text.parse().ok().map(Atom::Float),
        VarType::Booleano => match text {
            "verdadeiro" => Some(Atom::Boolean(true)),
            "falso" => Some(Atom::Boolean(false)),
            _ => None,
        },
        VarType::Texto => Some(Atom::String(line.trim_matches('"').to_string())),
    };
    parsed.ok_or_else(|| RuntimeError::TypeError {
        message: format!("cannot read {:?} as {}", line, ty),
        pos,
    })
}

/// Guesses the type of a line read into an untyped variable.
fn infer(line: &str) -> Atom {
    let text = line.trim();
    if let Ok(n) = text.parse() {
        return Atom::Integer(n);
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(n) = text.parse() {
            return Atom::Float(n);
        }
    }
    match text {
        "verdadeiro" => Atom::Boolean(true),
        "falso" => Atom::Boolean(false),
        _ => Atom::String(line.trim_matches('"').to_string()),
    }
}

fn invalid_operands(op: BinOp, lhs: &Atom, rhs: &Atom, pos: Position) -> RuntimeError {
    RuntimeError::TypeError {
        message: format!(
            "invalid operands for {}: {} and {}",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        ),
        pos,
    }
}

fn expect_boolean(op: BinOp, atom: Atom, pos: Position) -> Result<bool, RuntimeError> {
    match atom {
        Atom::Boolean(b) => Ok(b),
        other => Err(RuntimeError::TypeError {
            message: format!(
                "operands of {} must be booleano, found {}",
                op.symbol(),
                other.type_name()
            ),
            pos,
        }),
    }
}

fn evaluate_binary(op: BinOp, lhs: Atom, rhs: Atom, pos: Position) -> Result<Atom, RuntimeError> {
    Ok(match op {
        BinOp::Add => match (lhs, rhs) {
            (Atom::String(a), Atom::String(b)) => Atom::String(a + &b),
            (Atom::String(a), b @ Atom::Integer(_)) | (Atom::String(a), b @ Atom::Float(_)) => {
                Atom::String(format!("{}{}", a, b))
            }
            (a @ Atom::Integer(_), Atom::String(b)) | (a @ Atom::Float(_), Atom::String(b)) => {
                Atom::String(format!("{}{}", a, b))
            }
            (a, b) => numeric(op, a, b, pos)?,
        },
        BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
            numeric(op, lhs, rhs, pos)?
        }
        BinOp::Equal => Atom::Boolean(equals(op, &lhs, &rhs, pos)?),
        BinOp::NotEqual => Atom::Boolean(!equals(op, &lhs, &rhs, pos)?),
        BinOp::Less | BinOp::LessEqual | BinOp::Greater | BinOp::GreaterEqual => {
            let ordering = compare(op, &lhs, &rhs, pos)?;
            Atom::Boolean(match ordering {
                Some(ordering) => match op {
                    BinOp::Less => ordering == Ordering::Less,
                    BinOp::LessEqual => ordering != Ordering::Greater,
                    BinOp::Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
                // NaN compares false with everything
                None => false,
            })
        }
        BinOp::And | BinOp::Or => match (lhs, rhs) {
            (Atom::Boolean(a), Atom::Boolean(b)) if op == BinOp::And => Atom::Boolean(a && b),
            (Atom::Boolean(a), Atom::Boolean(b)) => Atom::Boolean(a || b),
            (a, b) => return Err(invalid_operands(op, &a, &b, pos)),
        },
    })
}

fn numeric(op: BinOp, lhs: Atom, rhs: Atom, pos: Position) -> Result<Atom, RuntimeError> {
    match (lhs, rhs) {
        (Atom::Integer(a), Atom::Integer(b)) => integer_arithmetic(op, a, b, pos),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => float_arithmetic(op, x, y, pos),
            _ => Err(invalid_operands(op, &a, &b, pos)),
        },
    }
}

fn division_by_zero(op: BinOp, pos: Position) -> RuntimeError {
    let message = match op {
        BinOp::Modulo => "modulo by zero",
        _ => "division by zero",
    };
    RuntimeError::ArithmeticError {
        message: message.to_string(),
        pos,
    }
}

fn integer_arithmetic(op: BinOp, a: i64, b: i64, pos: Position) -> Result<Atom, RuntimeError> {
    if let BinOp::Divide | BinOp::Modulo = op {
        if b == 0 {
            return Err(division_by_zero(op, pos));
        }
    }
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => a.checked_div(b),
        BinOp::Modulo => a.checked_rem(b),
        _ => {
            return Err(invalid_operands(
                op,
                &Atom::Integer(a),
                &Atom::Integer(b),
                pos,
            ))
        }
    };
    result
        .map(Atom::Integer)
        .ok_or_else(|| RuntimeError::ArithmeticError {
            message: format!("integer overflow in {} {} {}", a, op.symbol(), b),
            pos,
        })
}

fn float_arithmetic(op: BinOp, a: f64, b: f64, pos: Position) -> Result<Atom, RuntimeError> {
    Ok(Atom::Float(match op {
        BinOp::Divide | BinOp::Modulo if b == 0.0 => return Err(division_by_zero(op, pos)),
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => a / b,
        BinOp::Modulo => a % b,
        _ => {
            return Err(invalid_operands(
                op,
                &Atom::Float(a),
                &Atom::Float(b),
                pos,
            ))
        }
    }))
}

fn equals(op: BinOp, lhs: &Atom, rhs: &Atom, pos: Position) -> Result<bool, RuntimeError> {
    match (lhs, rhs) {
        (Atom::Integer(a), Atom::Integer(b)) => Ok(a == b),
        (Atom::Boolean(a), Atom::Boolean(b)) => Ok(a == b),
        (Atom::String(a), Atom::String(b)) => Ok(a == b),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(x == y),
            _ => Err(invalid_operands(op, a, b, pos)),
        },
    }
}

fn compare(
    op: BinOp,
    lhs: &Atom,
    rhs: &Atom,
    pos: Position,
) -> Result<Option<Ordering>, RuntimeError> {
    match (lhs, rhs) {
        (Atom::Integer(a), Atom::Integer(b)) => Ok(Some(a.cmp(b))),
        (Atom::String(a), Atom::String(b)) => Ok(Some(a.cmp(b))),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
            _ => Err(invalid_operands(op, a, b, pos)),
        },
    }
}

fn evaluate_unary(op: UnOp, atom: Atom, pos: Position) -> Result<Atom, RuntimeError> {
    Ok(match (op, atom) {
        (UnOp::Not, Atom::Boolean(b)) => Atom::Boolean(!b),
        (UnOp::Negate, Atom::Float(n)) => Atom::Float(-n),
        (UnOp::Negate, Atom::Integer(n)) => {
            Atom::Integer(n.checked_neg().ok_or_else(|| RuntimeError::ArithmeticError {
                message: format!("integer overflow in -{}", n),
                pos,
            })?)
        }
        (op, atom) => {
            let symbol = match op {
                UnOp::Not => '!',
                UnOp::Negate => '-',
            };
            return Err(RuntimeError::TypeError {
                message: format!("cannot apply unary {} to {}", symbol, atom.type_name()),
                pos,
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{expr, Parser};
    use std::io;

    fn eval(input: &str) -> Result<Atom, RuntimeError> {
        let expr = expr(&mut Parser::new(input)).unwrap();
        Interpreter::new(io::empty(), io::sink()).evaluate_expr(&expr)
    }

    fn execute_with(
        source: &str,
        input: &str,
        options: Options,
    ) -> (Result<(), RuntimeError>, String) {
        let program = crate::parse(source).unwrap();
        let mut out = Vec::new();
        let result =
            Interpreter::with_options(input.as_bytes(), &mut out, options).interpret(&program);
        (result, String::from_utf8(out).unwrap())
    }

    fn execute(source: &str, input: &str) -> (Result<(), RuntimeError>, String) {
        execute_with(source, input, Options::default())
    }

    #[test]
    fn test_simple_expression_eval() {
        assert_eq!(eval("1 + 1").unwrap().to_string(), "2");
    }

    #[test]
    fn test_bang_bool() {
        assert_eq!(eval("!verdadeiro").unwrap().to_string(), "falso");
    }

    #[test]
    fn test_grouped_expr() {
        assert_eq!(eval("(2 + 2) * 2 / 2").unwrap().to_string(), "4");
        assert_eq!(eval("((((((((8))))))))").unwrap().to_string(), "8");
    }

    #[test]
    fn test_left_associative_evaluation() {
        assert_eq!(eval("10 - 4 - 3").unwrap(), Atom::Integer(3));
        assert_eq!(eval("64 / 4 / 2").unwrap(), Atom::Integer(8));
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(eval("7 / 2").unwrap(), Atom::Integer(3));
        assert_eq!(eval("7.0 / 2").unwrap(), Atom::Float(3.5));
        assert_eq!(eval("7 % 3").unwrap(), Atom::Integer(1));
        assert_eq!(eval("1 + 2.5").unwrap(), Atom::Float(3.5));
        assert_eq!(eval("-(2 * 3)").unwrap(), Atom::Integer(-6));
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(
            eval(r#""hello " + "world""#).unwrap().to_string(),
            "hello world"
        );
        assert_eq!(eval(r#""n = " + 1"#).unwrap().to_string(), "n = 1");
        assert_eq!(eval(r#"2.5 + "!""#).unwrap().to_string(), "2.5!");
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("99 < 100").unwrap(), Atom::Boolean(true));
        assert_eq!(eval("1 == 1.0").unwrap(), Atom::Boolean(true));
        assert_eq!(eval("3 >= 3").unwrap(), Atom::Boolean(true));
        assert_eq!(eval("2.5 > 3").unwrap(), Atom::Boolean(false));
        assert_eq!(eval(r#""abc" < "abd""#).unwrap(), Atom::Boolean(true));
        assert_eq!(eval("verdadeiro != falso").unwrap(), Atom::Boolean(true));
        assert!(matches!(
            eval(r#"1 == "1""#),
            Err(RuntimeError::TypeError { .. })
        ));
        assert!(matches!(
            eval("1 < 2 < 3"),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_arithmetic_errors() {
        for input in &["10 / 0", "1.5 / 0", "5 % 0", "5.0 % 0.0"] {
            assert!(
                matches!(eval(input), Err(RuntimeError::ArithmeticError { .. })),
                "{}",
                input
            );
        }
        assert!(matches!(
            eval("9223372036854775807 + 1"),
            Err(RuntimeError::ArithmeticError { .. })
        ));
    }

    #[test]
    fn test_type_errors() {
        for input in &[
            r#""a" + verdadeiro"#,
            "1 + verdadeiro",
            "-verdadeiro",
            "!1",
            "1 && verdadeiro",
            r#""a" * 2"#,
        ] {
            assert!(
                matches!(eval(input), Err(RuntimeError::TypeError { .. })),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_short_circuit() {
        // The right operands would fail if they were evaluated
        assert_eq!(eval("falso && naodefinida").unwrap(), Atom::Boolean(false));
        assert_eq!(eval("verdadeiro || 1 / 0 == 1").unwrap(), Atom::Boolean(true));
        assert!(matches!(
            eval("verdadeiro && naodefinida"),
            Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "naodefinida"
        ));
        assert!(matches!(
            eval("falso || 1"),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_logic_operators() {
        assert_eq!(eval("verdadeiro && falso").unwrap(), Atom::Boolean(false));
        assert_eq!(eval("falso || verdadeiro").unwrap(), Atom::Boolean(true));
        assert_eq!(eval("verdadeiro && !falso").unwrap(), Atom::Boolean(true));
        assert!(matches!(
            eval(r#"verdadeiro && "sim""#),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_while_loop() {
        let (result, output) =
            execute("var i = 0; enquanto (i < 3) { escreva(i); i = i + 1; }", "");
        assert!(result.is_ok());
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn test_if_else_statement() {
        let (result, output) = execute(
            r#"se (1 < 2) { escreva("a"); } senao { escreva("b"); }"#,
            "",
        );
        assert!(result.is_ok());
        assert_eq!(output, "a\n");
    }

    #[test]
    fn test_else_if_chain() {
        let input = r#"
        inteiro nota <- 7;
        se (nota >= 9) {
            escreva("A");
        } senao se (nota >= 6) {
            escreva("B");
        } senao {
            escreva("C");
        }
        "#;
        assert_eq!(execute(input, "").1, "B\n");
    }

    #[test]
    fn test_block_scope_does_not_leak() {
        let (result, _) = execute("se (verdadeiro) { inteiro t <- 1; } escreva(t);", "");
        assert!(matches!(
            result,
            Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "t"
        ));

        let input = "var i = 0; enquanto (i < 2) { inteiro k <- i; i <- i + 1; } escreva(k);";
        let (result, output) = execute(input, "");
        assert!(matches!(
            result,
            Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "k"
        ));
        assert_eq!(output, "");

        let input = r#"
        texto i <- "outer";
        {
            texto i <- "inner";
            {
                texto i <- "way inside";
                escreva(i);
            }
            escreva(i);
        }
        escreva(i);
        "#;
        let (result, output) = execute(input, "");
        assert!(result.is_ok());
        assert_eq!(output, "way inside\ninner\nouter\n");
    }

    #[test]
    fn test_shadow_can_read_outer_value() {
        let (result, output) =
            execute("inteiro a <- 1; { inteiro a <- a + 2; escreva(a); } escreva(a);", "");
        assert!(result.is_ok());
        assert_eq!(output, "3\n1\n");
    }

    #[test]
    fn test_assignment_reaches_outer_scope() {
        let (_, output) = execute("inteiro a <- 1; { a <- 5; } escreva(a);", "");
        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_loop_body_gets_fresh_scope() {
        let input = "var i = 0; enquanto (i < 2) { inteiro k <- i * 10; escreva(k); i <- i + 1; }";
        let (result, output) = execute(input, "");
        assert!(result.is_ok());
        assert_eq!(output, "0\n10\n");
    }

    #[test]
    fn test_redeclaration() {
        let (result, _) = execute("inteiro a; inteiro a;", "");
        assert!(matches!(
            result,
            Err(RuntimeError::Redeclaration { ref name, pos })
                if name == "a" && pos == Position::new(1, 12)
        ));

        let (result, output) = execute("{ inteiro a; } inteiro a <- 1; escreva(a);", "");
        assert!(result.is_ok());
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_division_by_zero_writes_nothing() {
        let (result, output) = execute(r#"escreva("antes"); escreva("x", 10 / 0);"#, "");
        assert!(matches!(result, Err(RuntimeError::ArithmeticError { .. })));
        assert_eq!(output, "antes\n");
    }

    #[test]
    fn test_runtime_error_aborts_rest_of_program() {
        let (result, output) = execute("escreva(1); x <- 2; escreva(3);", "");
        assert!(matches!(
            result,
            Err(RuntimeError::UndefinedVariable { pos, .. }) if pos == Position::new(1, 13)
        ));
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_deepest_allowed_nesting_evaluates() {
        let depth = crate::parser::MAX_NESTING - 1;
        let source = format!("escreva({}1{});", "(".repeat(depth), ")".repeat(depth));
        let (result, output) = execute(&source, "");
        assert!(result.is_ok());
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_scopes_unwind_after_error() {
        let program = crate::parse("{ { enquanto (verdadeiro) { escreva(1 / 0); } } }").unwrap();
        let mut interpreter = Interpreter::new(io::empty(), io::sink());
        assert!(interpreter.interpret(&program).is_err());
        assert_eq!(interpreter.environment().depth(), 1);
    }

    #[test]
    fn test_condition_must_be_boolean() {
        let (result, _) = execute("se (1) { escreva(1); }", "");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
        let (result, _) = execute(r#"enquanto ("sim") { }"#, "");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn test_write_multiple_expressions() {
        let (_, output) = execute(r#"escreva(1, "-", 2.0, "-", falso);"#, "");
        assert_eq!(output, "1-2.0-falso\n");
    }

    #[test]
    fn test_write_undefined() {
        let (result, output) = execute("var u; escreva(u);", "");
        assert!(result.is_ok());
        assert_eq!(output, "indefinido\n");
        let (result, _) = execute("var u; escreva(u + 1);", "");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn test_typed_declarations() {
        let (_, output) = execute("real r <- 1; escreva(r);", "");
        assert_eq!(output, "1.0\n");
        let (result, _) = execute(r#"inteiro i <- "x";"#, "");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
        let (result, _) = execute("booleano b <- verdadeiro; b <- 1;", "");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
        let (result, output) = execute("var v = 1; v <- \"texto\"; escreva(v);", "");
        assert!(result.is_ok());
        assert_eq!(output, "texto\n");
    }

    #[test]
    fn test_read_into_typed_variable() {
        let (result, output) = execute("inteiro n; leia(n); escreva(n * 2);", "21\n");
        assert!(result.is_ok());
        assert_eq!(output, "42\n");

        let (_, output) = execute("real r; leia(r); escreva(r);", "2\n");
        assert_eq!(output, "2.0\n");

        let (_, output) = execute("booleano b; leia(b); escreva(!b);", "falso\n");
        assert_eq!(output, "verdadeiro\n");

        let (result, _) = execute("inteiro n; leia(n);", "abc\n");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn test_read_coerces_to_current_value_type() {
        let (result, _) = execute("var v = 1; leia(v);", "2.5\n");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
        let (_, output) = execute("var v = 1; leia(v); escreva(v + 1);", " 41 \n");
        assert_eq!(output, "42\n");
    }

    #[test]
    fn test_read_declares_unbound_variable() {
        let (result, output) = execute(r#"leia(nome); escreva("Olá, ", nome);"#, "\"Ana\"\n");
        assert!(result.is_ok());
        assert_eq!(output, "Olá, Ana\n");

        let (_, output) = execute("leia(x); escreva(x + 1);", "41");
        assert_eq!(output, "42\n");

        let (_, output) = execute("leia(x); leia(y); escreva(x, y);", "1.5\nverdadeiro\n");
        assert_eq!(output, "1.5verdadeiro\n");
    }

    #[test]
    fn test_read_declared_in_block_does_not_leak() {
        let (result, _) = execute("{ leia(x); } escreva(x);", "1\n");
        assert!(matches!(result, Err(RuntimeError::UndefinedVariable { .. })));
    }

    #[test]
    fn test_strict_reads() {
        let options = Options {
            strict_reads: true,
            ..Options::default()
        };
        let (result, _) = execute_with("leia(x);", "1\n", options);
        assert!(matches!(result, Err(RuntimeError::UndefinedVariable { .. })));
        let (result, output) = execute_with("var x; leia(x); escreva(x);", "1\n", options);
        assert!(result.is_ok());
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_read_without_input() {
        let (result, _) = execute("inteiro n; leia(n);", "");
        assert!(matches!(
            result,
            Err(RuntimeError::InputExhausted { ref name, .. }) if name == "n"
        ));
    }

    #[test]
    fn test_globals_persist_between_programs() {
        let mut out = Vec::new();
        {
            let mut interpreter = Interpreter::new(io::empty(), &mut out);
            interpreter
                .interpret(&crate::parse("inteiro total <- 40;").unwrap())
                .unwrap();
            interpreter
                .interpret(&crate::parse("total <- total + 2; escreva(total);").unwrap())
                .unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "42\n");
    }
}
