use super::ast::{Atom, BinOp, Block, Expr, Program, Stmt, UnOp, VarType};
use super::lexer::{LexError, Lexer};
use super::tokens::{LiteralType, Position, Token, TokenType};
use std::mem;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("Expected {expected} but found {found} on {pos}.")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: Position,
    },
}

impl SyntaxError {
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::Lex(e) => e.position(),
            SyntaxError::UnexpectedToken { pos, .. } => *pos,
        }
    }
}

type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest allowed nesting of blocks, groupings, unary operators and
/// operator chains. Both parsing and evaluation recurse once per level.
pub const MAX_NESTING: usize = 100;

/// Recursive descent parser with one token of lookahead.
///
/// Lexical errors met while pulling tokens and syntax errors from statements
/// are both collected; after a syntax error the parser skips to the next
/// statement boundary and carries on.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    current: Token,
    errors: Vec<SyntaxError>,
    depth: usize,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source str) -> Parser<'source> {
        let mut lexer = Lexer::new(source);
        let mut errors = Vec::new();
        let current = Self::pull(&mut lexer, &mut errors);
        Parser {
            lexer,
            current,
            errors,
            depth: 0,
        }
    }

    fn pull(lexer: &mut Lexer, errors: &mut Vec<SyntaxError>) -> Token {
        loop {
            match lexer.next() {
                Some(Ok(token)) => return token,
                Some(Err(e)) => errors.push(e.into()),
                None => return Token::new(TokenType::EOF, "", Position::default()),
            }
        }
    }

    fn next(&mut self) -> Token {
        if let TokenType::EOF = self.current.token {
            return self.current.clone();
        }
        let next = Self::pull(&mut self.lexer, &mut self.errors);
        mem::replace(&mut self.current, next)
    }

    fn peek(&self) -> TokenType {
        self.current.token.clone()
    }

    fn check(&self, ttype: &TokenType) -> bool {
        &self.current.token == ttype
    }

    fn expect(&mut self, ttype: TokenType) -> ParseResult<Token> {
        if self.check(&ttype) {
            Ok(self.next())
        } else {
            Err(self.unexpected(ttype.to_string()))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            expected: expected.into(),
            found: self.current.token.to_string(),
            pos: self.current.pos,
        }
    }

    fn finish(&mut self, program: Program) -> Result<Program, Vec<SyntaxError>> {
        if self.errors.is_empty() {
            Ok(program)
        } else {
            let mut errors = mem::take(&mut self.errors);
            errors.sort_by_key(SyntaxError::position);
            Err(errors)
        }
    }
}

pub fn parse(p: &mut Parser) -> Result<Program, Vec<SyntaxError>> {
    let mut statements = Vec::new();
    while !p.check(&TokenType::EOF) {
        statement_or_recover(p, &mut statements);
    }
    p.finish(Program { statements })
}

fn statement_or_recover(p: &mut Parser, statements: &mut Vec<Stmt>) {
    let start = p.current.pos;
    match statement(p) {
        Ok(stmt) => statements.push(stmt),
        Err(e) => {
            p.errors.push(e);
            synchronize(p);
            // Never stall on a token that cannot start or end a statement
            if p.current.pos == start && !p.check(&TokenType::EOF) {
                p.next();
            }
        }
    }
}

/// Skips past the next `;`, or up to a token that opens or closes a
/// statement. A `}` outside any block closes nothing and is skipped too.
fn synchronize(p: &mut Parser) {
    loop {
        match p.peek() {
            TokenType::RightBrace if p.depth == 0 => {
                p.next();
                return;
            }
            TokenType::EOF | TokenType::LeftBrace | TokenType::RightBrace => return,
            TokenType::Semicolon => {
                p.next();
                return;
            }
            t if t.starts_statement() => return,
            _ => {
                p.next();
            }
        }
    }
}

fn statement(p: &mut Parser) -> ParseResult<Stmt> {
    match p.peek() {
        TokenType::Var
        | TokenType::Inteiro
        | TokenType::Real
        | TokenType::Booleano
        | TokenType::Texto => declaration(p),
        TokenType::Literal(LiteralType::Identifier(_)) => assignment(p),
        TokenType::Leia => read(p),
        TokenType::Escreva => write(p),
        TokenType::Se => conditional(p),
        TokenType::Enquanto => repetition(p),
        TokenType::LeftBrace => Ok(Stmt::Block(block(p)?)),
        _ => Err(p.unexpected("a statement")),
    }
}

fn identifier(p: &mut Parser) -> ParseResult<(String, Position)> {
    if let TokenType::Literal(LiteralType::Identifier(id)) = p.peek() {
        let token = p.next();
        Ok((id, token.pos))
    } else {
        Err(p.unexpected("identifier"))
    }
}

fn assignment_operator(p: &mut Parser) -> bool {
    if let TokenType::Arrow | TokenType::Equal = p.peek() {
        p.next();
        true
    } else {
        false
    }
}

fn declaration(p: &mut Parser) -> ParseResult<Stmt> {
    let keyword = p.next();
    let ty = VarType::from_keyword(&keyword.token);
    let (name, _) = identifier(p)?;
    let init = if assignment_operator(p) {
        Some(expr(p)?)
    } else {
        None
    };
    p.expect(TokenType::Semicolon)?;
    Ok(Stmt::Declaration {
        name,
        ty,
        init,
        pos: keyword.pos,
    })
}

fn assignment(p: &mut Parser) -> ParseResult<Stmt> {
    let (name, pos) = identifier(p)?;
    if !assignment_operator(p) {
        return Err(p.unexpected("'<-' or '='"));
    }
    let value = expr(p)?;
    p.expect(TokenType::Semicolon)?;
    Ok(Stmt::Assignment { name, value, pos })
}

fn read(p: &mut Parser) -> ParseResult<Stmt> {
    let pos = p.expect(TokenType::Leia)?.pos;
    p.expect(TokenType::LeftParen)?;
    let (name, _) = identifier(p)?;
    p.expect(TokenType::RightParen)?;
    p.expect(TokenType::Semicolon)?;
    Ok(Stmt::Read { name, pos })
}

fn write(p: &mut Parser) -> ParseResult<Stmt> {
    let pos = p.expect(TokenType::Escreva)?.pos;
    p.expect(TokenType::LeftParen)?;
    let mut exprs = vec![expr(p)?];
    while p.check(&TokenType::Comma) {
        p.next();
        exprs.push(expr(p)?);
    }
    p.expect(TokenType::RightParen)?;
    p.expect(TokenType::Semicolon)?;
    Ok(Stmt::Write { exprs, pos })
}

fn condition(p: &mut Parser) -> ParseResult<Expr> {
    p.expect(TokenType::LeftParen)?;
    let cond = expr(p)?;
    p.expect(TokenType::RightParen)?;
    Ok(cond)
}

fn conditional(p: &mut Parser) -> ParseResult<Stmt> {
    let pos = p.expect(TokenType::Se)?.pos;
    let cond = condition(p)?;
    let then_block = block(p)?;
    let else_block = if p.check(&TokenType::Senao) {
        let else_pos = p.next().pos;
        if p.check(&TokenType::Se) {
            // `senao se` chains nest inside the else block
            Some(Block {
                statements: vec![conditional(p)?],
                pos: else_pos,
            })
        } else {
            Some(block(p)?)
        }
    } else {
        None
    };
    Ok(Stmt::Conditional {
        cond,
        then_block,
        else_block,
        pos,
    })
}

fn repetition(p: &mut Parser) -> ParseResult<Stmt> {
    let pos = p.expect(TokenType::Enquanto)?.pos;
    let cond = condition(p)?;
    let body = block(p)?;
    Ok(Stmt::Repetition { cond, body, pos })
}

/// Runs `rule` one nesting level deeper, failing at the current token once
/// `MAX_NESTING` is reached.
fn nested<T>(
    p: &mut Parser,
    rule: impl FnOnce(&mut Parser) -> ParseResult<T>,
) -> ParseResult<T> {
    if p.depth >= MAX_NESTING {
        return Err(p.unexpected("shallower nesting"));
    }
    p.depth += 1;
    let result = rule(p);
    p.depth -= 1;
    result
}

/// Consumes a whole `{ ... }` group, nested braces included.
fn skip_group(p: &mut Parser) {
    let mut open = 0;
    loop {
        match p.next().token {
            TokenType::LeftBrace => open += 1,
            TokenType::RightBrace if open <= 1 => return,
            TokenType::RightBrace => open -= 1,
            TokenType::EOF => return,
            _ => {}
        }
    }
}

fn block(p: &mut Parser) -> ParseResult<Block> {
    if p.depth >= MAX_NESTING && p.check(&TokenType::LeftBrace) {
        // Skip the rest of the too-deep group so it reports only once
        let error = p.unexpected("shallower nesting");
        skip_group(p);
        return Err(error);
    }
    nested(p, |p| {
        let pos = p.expect(TokenType::LeftBrace)?.pos;
        let mut statements = Vec::new();
        while !p.check(&TokenType::RightBrace) && !p.check(&TokenType::EOF) {
            statement_or_recover(p, &mut statements);
        }
        p.expect(TokenType::RightBrace)?;
        Ok(Block { statements, pos })
    })
}

pub fn expr(p: &mut Parser) -> ParseResult<Expr> {
    logic(p)
}

/// One precedence level: an operand from the level below followed by any
/// number of (operator, operand) pairs, folded to the left.
fn binary_level(
    p: &mut Parser,
    operand: fn(&mut Parser) -> ParseResult<Expr>,
    operator: fn(&TokenType) -> Option<BinOp>,
) -> ParseResult<Expr> {
    let mut lhs = operand(p)?;
    let outer = p.depth;
    let result = loop {
        let op = match operator(&p.current.token) {
            Some(op) => op,
            None => break Ok(lhs),
        };
        // Every fold makes the tree one level deeper
        if p.depth >= MAX_NESTING {
            break Err(p.unexpected("shallower nesting"));
        }
        p.depth += 1;
        let pos = p.next().pos;
        match operand(p) {
            Ok(rhs) => lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs), pos),
            Err(e) => break Err(e),
        }
    };
    p.depth = outer;
    result
}

fn logic(p: &mut Parser) -> ParseResult<Expr> {
    binary_level(p, comparison, BinOp::logic)
}

fn comparison(p: &mut Parser) -> ParseResult<Expr> {
    binary_level(p, sum, BinOp::comparison)
}

fn sum(p: &mut Parser) -> ParseResult<Expr> {
    binary_level(p, term, BinOp::sum)
}

fn term(p: &mut Parser) -> ParseResult<Expr> {
    binary_level(p, factor, BinOp::term)
}

fn factor(p: &mut Parser) -> ParseResult<Expr> {
    let pos = p.current.pos;
    Ok(match p.peek() {
        TokenType::Minus => nested(p, |p| {
            p.next();
            Ok(Expr::Unary(UnOp::Negate, Box::new(factor(p)?), pos))
        })?,
        TokenType::Bang => nested(p, |p| {
            p.next();
            Ok(Expr::Unary(UnOp::Not, Box::new(factor(p)?), pos))
        })?,
        TokenType::LeftParen => nested(p, |p| {
            p.next();
            let expr = expr(p)?;
            p.expect(TokenType::RightParen)?;
            Ok(Expr::Grouping(Box::new(expr)))
        })?,
        TokenType::Verdadeiro => {
            p.next();
            Expr::Literal(Atom::Boolean(true), pos)
        }
        TokenType::Falso => {
            p.next();
            Expr::Literal(Atom::Boolean(false), pos)
        }
        TokenType::Literal(literal) => {
            p.next();
            match literal {
                LiteralType::Integer(n) => Expr::Literal(Atom::Integer(n), pos),
                LiteralType::Real(n) => Expr::Literal(Atom::Float(n), pos),
                LiteralType::String(s) => Expr::Literal(Atom::String(s), pos),
                LiteralType::Identifier(id) => Expr::Variable(id, pos),
            }
        }
        _ => return Err(p.unexpected("an expression")),
    })
}
