//! NooCrush: a small dynamically-checked scripting language
//!
//! The pipeline is source text → tokens → AST → tree-walking evaluation.
//! `run_source` wires the whole thing together; the `parser` and
//! `interpreter` modules expose each stage for embedders and tools.

pub mod diagnostics;
pub mod interpreter;
pub mod parser;

pub use diagnostics::{Diagnostic, Span};
pub use interpreter::{Console, Interpreter, RuntimeError, StdConsole, Value};
pub use parser::{parse, SourceFile};

use thiserror::Error;

/// Failure of an end-to-end run, one variant per pipeline stage
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Lex(Diagnostic),
    #[error("{0}")]
    Parse(Diagnostic),
    #[error("{0}")]
    Runtime(RuntimeError),
}

impl Error {
    /// The underlying diagnostic, for uniform reporting
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Lex(d) | Error::Parse(d) => d.clone(),
            Error::Runtime(e) => e.to_diagnostic(),
        }
    }
}

/// Parse and evaluate a source string with the given console
pub fn run_source(name: &str, source: &str, console: Box<dyn Console>) -> Result<Value, Error> {
    let source_file = SourceFile::new(name, source);
    let tokens = parser::tokenize(&source_file).map_err(Error::Lex)?;
    let program = parser::Parser::new(tokens)
        .parse_program()
        .map_err(Error::Parse)?;
    let mut interpreter = Interpreter::new(console);
    interpreter.run(&program).map_err(Error::Runtime)
}
