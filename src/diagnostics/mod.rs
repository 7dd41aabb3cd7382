//! Diagnostic reporting for the NooCrush interpreter
//!
//! Lex, parse, and runtime failures are all surfaced as structured
//! diagnostics with stable codes, source spans, and optional JSON output
//! for machine consumers.

use serde::{Deserialize, Serialize};

/// Stable diagnostic codes. Lex errors are L-series, parse errors P-series;
/// runtime codes are derived from the error kind in `interpreter::error`.
pub mod codes {
    pub const LEX_UNEXPECTED_CHAR: &str = "L0001";
    pub const PARSE_UNEXPECTED_TOKEN: &str = "P0001";
}

/// A source location span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed)
    pub start: usize,

    /// End byte offset (0-indexed, exclusive)
    pub end: usize,

    /// Start line (1-indexed)
    pub line: usize,

    /// Start column (1-indexed)
    pub col: usize,

    /// End line (1-indexed)
    pub end_line: usize,

    /// End column (1-indexed)
    pub end_col: usize,
}

impl Span {
    /// Create a new span
    pub fn new(
        start: usize,
        end: usize,
        line: usize,
        col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start,
            end,
            line,
            col,
            end_line,
            end_col,
        }
    }

    /// A zero-width span at the start of the source
    pub fn start_of_input() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            col: 1,
            end_line: 1,
            end_col: 1,
        }
    }

    /// Merge two spans into one that covers both
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            col: if self.line <= other.line {
                self.col
            } else {
                other.col
            },
            end_line: self.end_line.max(other.end_line),
            end_col: if self.end_line >= other.end_line {
                self.end_col
            } else {
                other.end_col
            },
        }
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A structured diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable error code (e.g., "L0001", "P0001", "R0004")
    pub code: String,

    /// Severity level
    pub severity: Severity,

    /// Primary message
    pub message: String,

    /// Primary source span
    pub span: Span,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder {
            code: code.into(),
            severity: Severity::Error,
            message: String::new(),
            span: None,
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Format as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format as human-readable text with a source caret
    pub fn to_human_readable(&self, source: &str) -> String {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };

        let mut output = format!(
            "{}[{}]: {}\n  --> {}:{}\n",
            severity, self.code, self.message, self.span.line, self.span.col
        );

        let lines: Vec<&str> = source.lines().collect();
        if self.span.line > 0 && self.span.line <= lines.len() {
            let line = lines[self.span.line - 1];
            output.push_str(&format!("   |\n{:>3} | {}\n   |", self.span.line, line));

            let underline_start = self.span.col.saturating_sub(1);
            let underline_len = if self.span.end_line == self.span.line {
                self.span.end_col.saturating_sub(self.span.col).max(1)
            } else {
                line.len().saturating_sub(underline_start).max(1)
            };

            output.push_str(&format!(
                " {}{}\n",
                " ".repeat(underline_start),
                "^".repeat(underline_len)
            ));
        }

        output
    }
}

/// Builder for constructing diagnostics
pub struct DiagnosticBuilder {
    code: String,
    severity: Severity,
    message: String,
    span: Option<Span>,
}

impl DiagnosticBuilder {
    /// Set the message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the primary span
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            code: self.code,
            severity: self.severity,
            message: self.message,
            span: self.span.unwrap_or_else(Span::start_of_input),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} at {}:{}",
            self.code, self.message, self.span.line, self.span.col
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_json_contains_code_and_message() {
        let diag = Diagnostic::error("P0001")
            .message("unexpected token")
            .span(Span::new(10, 20, 1, 10, 1, 20))
            .build();

        let json = diag.to_json();
        assert!(json.contains("P0001"));
        assert!(json.contains("unexpected token"));
    }

    #[test]
    fn span_merge_covers_both() {
        let span1 = Span::new(10, 20, 1, 10, 1, 20);
        let span2 = Span::new(15, 30, 1, 15, 2, 5);

        let merged = span1.merge(&span2);
        assert_eq!(merged.start, 10);
        assert_eq!(merged.end, 30);
        assert_eq!(merged.end_line, 2);
    }

    #[test]
    fn human_readable_underlines_the_span() {
        let diag = Diagnostic::error("L0001")
            .message("unexpected character: `@`")
            .span(Span::new(4, 5, 1, 5, 1, 6))
            .build();

        let output = diag.to_human_readable("let @ = 1;");
        assert!(output.contains("error[L0001]"));
        assert!(output.contains("let @ = 1;"));
        assert!(output.contains('^'));
    }
}
