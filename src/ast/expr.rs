use super::atom::Atom;
use crate::tokens::{Position, TokenType};
use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    // Logic
    And,
    Or,
    // Comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    // Sum
    Add,
    Subtract,
    // Term
    Multiply,
    Divide,
    Modulo,
}

impl BinOp {
    pub fn logic(token: &TokenType) -> Option<BinOp> {
        match token {
            TokenType::AndAnd => Some(BinOp::And),
            TokenType::OrOr => Some(BinOp::Or),
            _ => None,
        }
    }

    pub fn comparison(token: &TokenType) -> Option<BinOp> {
        match token {
            TokenType::EqualEqual => Some(BinOp::Equal),
            TokenType::BangEqual => Some(BinOp::NotEqual),
            TokenType::Less => Some(BinOp::Less),
            TokenType::LessEqual => Some(BinOp::LessEqual),
            TokenType::Greater => Some(BinOp::Greater),
            TokenType::GreaterEqual => Some(BinOp::GreaterEqual),
            _ => None,
        }
    }

    pub fn sum(token: &TokenType) -> Option<BinOp> {
        match token {
            TokenType::Plus => Some(BinOp::Add),
            TokenType::Minus => Some(BinOp::Subtract),
            _ => None,
        }
    }

    pub fn term(token: &TokenType) -> Option<BinOp> {
        match token {
            TokenType::Star => Some(BinOp::Multiply),
            TokenType::Slash => Some(BinOp::Divide),
            TokenType::Percent => Some(BinOp::Modulo),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::Less => "<",
            BinOp::LessEqual => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Negate,
    Not,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Expr bound by parentheses
    Grouping(Box<Expr>),
    /// LHS, Operator, RHS, position of the operator
    Binary(Box<Expr>, BinOp, Box<Expr>, Position),
    /// Operator, Expr
    Unary(UnOp, Box<Expr>, Position),
    Literal(Atom, Position),
    /// Reference to a variable by name
    Variable(String, Position),
}

impl Expr {
    pub fn position(&self) -> Position {
        match self {
            Expr::Grouping(expr) => expr.position(),
            Expr::Binary(_, _, _, pos)
            | Expr::Unary(_, _, pos)
            | Expr::Literal(_, pos)
            | Expr::Variable(_, pos) => *pos,
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Grouping(expr) => write!(f, "({})", expr),
            Expr::Binary(lhs, op, rhs, _) => write!(f, "({} {} {})", op.symbol(), lhs, rhs),
            Expr::Unary(op, expr, _) => {
                let op = match op {
                    UnOp::Not => "!",
                    UnOp::Negate => "-",
                };
                write!(f, "({}{})", op, expr)
            }
            Expr::Literal(Atom::String(s), _) => write!(f, "{:?}", s),
            Expr::Literal(atom, _) => write!(f, "{}", atom),
            Expr::Variable(id, _) => write!(f, "{}", id),
        }
    }
}
