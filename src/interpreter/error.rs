//! Runtime errors and control-flow signals
//!
//! Evaluation uses one error channel for both real failures and non-local
//! control flow (`return`, `break`, `continue`). Loops and function calls
//! intercept the signals they own; anything that escapes to the top is
//! converted into a runtime error.

use crate::diagnostics::{Diagnostic, Span};
use crate::interpreter::value::Value;
use thiserror::Error;

/// Classification of runtime errors, each with a stable R-series code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownIdentifier,
    ImmutableAssignment,
    TypeMismatch,
    DivisionByZero,
    MatchExhaustion,
    ArityMismatch,
    UncaughtControlSignal,
    NotCallable,
    UnknownField,
    UnknownMethod,
    IndexOutOfBounds,
    StructError,
}

impl ErrorKind {
    /// Stable diagnostic code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownIdentifier => "R0001",
            ErrorKind::ImmutableAssignment => "R0002",
            ErrorKind::TypeMismatch => "R0003",
            ErrorKind::DivisionByZero => "R0004",
            ErrorKind::MatchExhaustion => "R0005",
            ErrorKind::ArityMismatch => "R0006",
            ErrorKind::UncaughtControlSignal => "R0007",
            ErrorKind::NotCallable => "R0008",
            ErrorKind::UnknownField => "R0009",
            ErrorKind::UnknownMethod => "R0010",
            ErrorKind::IndexOutOfBounds => "R0011",
            ErrorKind::StructError => "R0012",
        }
    }
}

/// A runtime error with the span of the offending code
#[derive(Debug, Clone, Error)]
#[error("[{}] {message}", .kind.code())]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// Convert into a structured diagnostic for reporting
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.kind.code())
            .message(self.message.clone())
            .span(self.span.clone())
            .build()
    }
}

/// What interrupted evaluation: a real error or control flow in flight
#[derive(Debug, Clone)]
pub enum Signal {
    Error(RuntimeError),
    Return(Value),
    Break(Span),
    Continue(Span),
}

impl Signal {
    /// Collapse into a runtime error; control signals that reached a place
    /// with no handler become `UncaughtControlSignal`
    pub fn into_runtime_error(self) -> RuntimeError {
        match self {
            Signal::Error(e) => e,
            Signal::Return(_) => RuntimeError::new(
                ErrorKind::UncaughtControlSignal,
                "`return` outside of a function",
                Span::start_of_input(),
            ),
            Signal::Break(span) => RuntimeError::new(
                ErrorKind::UncaughtControlSignal,
                "`break` outside of a loop",
                span,
            ),
            Signal::Continue(span) => RuntimeError::new(
                ErrorKind::UncaughtControlSignal,
                "`continue` outside of a loop",
                span,
            ),
        }
    }
}

impl From<RuntimeError> for Signal {
    fn from(e: RuntimeError) -> Self {
        Signal::Error(e)
    }
}

/// Result of one evaluation step
pub type Exec<T> = Result<T, Signal>;

/// Shorthand for raising a runtime error out of evaluation
pub fn raise<T>(kind: ErrorKind, message: impl Into<String>, span: &Span) -> Exec<T> {
    Err(Signal::Error(RuntimeError::new(kind, message, span.clone())))
}
