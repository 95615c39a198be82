pub mod atom;
pub mod dot;
pub mod expr;
pub mod program;

pub use atom::Atom;
pub use dot::Dot;
pub use expr::{BinOp, Expr, UnOp};
pub use program::{Block, Program, Stmt, VarType};
