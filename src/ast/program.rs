use super::Expr;
use crate::tokens::{Position, TokenType};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Statements between braces. Executing one opens a new scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub pos: Position,
}

/// Declared type of a variable; `var` declarations carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Inteiro,
    Real,
    Booleano,
    Texto,
}

impl VarType {
    pub fn from_keyword(token: &TokenType) -> Option<VarType> {
        match token {
            TokenType::Inteiro => Some(VarType::Inteiro),
            TokenType::Real => Some(VarType::Real),
            TokenType::Booleano => Some(VarType::Booleano),
            TokenType::Texto => Some(VarType::Texto),
            _ => None,
        }
    }
}

impl Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VarType::Inteiro => "inteiro",
            VarType::Real => "real",
            VarType::Booleano => "booleano",
            VarType::Texto => "texto",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declaration {
        name: String,
        ty: Option<VarType>,
        init: Option<Expr>,
        pos: Position,
    },
    Assignment {
        name: String,
        value: Expr,
        pos: Position,
    },
    Read {
        name: String,
        pos: Position,
    },
    Write {
        exprs: Vec<Expr>,
        pos: Position,
    },
    Conditional {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
        pos: Position,
    },
    Repetition {
        cond: Expr,
        body: Block,
        pos: Position,
    },
    Block(Block),
}

impl Stmt {
    pub fn position(&self) -> Position {
        match self {
            Stmt::Declaration { pos, .. }
            | Stmt::Assignment { pos, .. }
            | Stmt::Read { pos, .. }
            | Stmt::Write { pos, .. }
            | Stmt::Conditional { pos, .. }
            | Stmt::Repetition { pos, .. } => *pos,
            Stmt::Block(block) => block.pos,
        }
    }
}
