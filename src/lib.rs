//! Arara is a small teaching language with Portuguese keywords.
//!
//! Source text goes through the [`lexer`], which produces positioned
//! [`tokens`], then through the [`parser`], which builds a [`Program`]. The
//! [`Interpreter`] walks that tree against an [`Environment`] of nested
//! scopes, reading from an [`Input`] and writing to an [`Output`].
//!
//! ```
//! let program = arara::parse("inteiro x <- 2; escreva(\"x = \", x * 21);").unwrap();
//! let mut out = Vec::new();
//! arara::run(&program, std::io::empty(), &mut out).unwrap();
//! assert_eq!(out, b"x = 42\n");
//! ```

pub mod ast;
pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod tokens;

pub use ast::Program;
pub use environment::Environment;
pub use interpreter::{Input, Interpreter, Options, Output, RuntimeError};
pub use lexer::{LexError, Lexer};
pub use parser::{Parser, SyntaxError};

/// Parses a whole source text. All syntax errors are reported together,
/// ordered by position.
pub fn parse(source: &str) -> Result<Program, Vec<SyntaxError>> {
    parser::parse(&mut Parser::new(source))
}

/// Runs a program with a fresh environment.
pub fn run<I: Input, O: Output>(
    program: &Program,
    input: I,
    output: O,
) -> Result<(), RuntimeError> {
    Interpreter::new(input, output).interpret(program)
}
