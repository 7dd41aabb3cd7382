//! Lexing and parsing for NooCrush
//!
//! `SourceFile` wraps the raw text, `tokenize` produces the token stream,
//! and `Parser` builds the AST. `parse` runs the whole front end.

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod span;

pub use ast::Program;
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::Parser;
pub use span::SourceFile;

use crate::diagnostics::Diagnostic;

/// Lex and parse a source file into a program
pub fn parse(source: &SourceFile) -> Result<Program, Diagnostic> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests;
