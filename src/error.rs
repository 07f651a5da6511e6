//! Error types for the model-definition front end.
//!
//! This module provides a unified error type [`ModelError`] covering every
//! condition raised while reading a model-definition document, plus the
//! [`Diagnostic`] record used to report recoverable problems without aborting
//! the parse.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;

/// How a reported problem affects the rest of the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Aborts the whole parse.
    Fatal,
    /// Reported, then parsing resumes after the offending statement.
    Recoverable,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "error"),
            Severity::Recoverable => write!(f, "warning"),
        }
    }
}

/// Unified error type for all model-definition operations.
#[derive(Error, Debug)]
pub enum ModelError {
    // ============ Section / Context Errors ============
    /// Keyword used outside the sections that allow it
    #[error("Line {line}: '{token}' is not valid in this context")]
    BadContext { token: String, line: usize },

    /// One-shot section opened a second time
    #[error("Line {line}: section '{section}' is already defined")]
    DuplicateSection { section: String, line: usize },

    /// The document has no line starting with `End`
    #[error("Model has no 'End' statement")]
    MissingEnd,

    // ============ Statement Errors ============
    /// A required token is missing
    #[error("Line {line}: expected '{expected}'{}", hint_suffix(.hint))]
    ExpectedToken {
        expected: String,
        line: usize,
        hint: Option<String>,
    },

    /// Target of a `dt()` statement is not a declared state
    #[error("Line {line}: '{name}' is not a declared state variable")]
    BadState { name: String, line: usize },

    /// Identifier exceeds the configured maximum length
    #[error("Line {line}: name '{name}' is longer than {max} characters")]
    NameTooLong { name: String, line: usize, max: usize },

    /// Malformed `[lb:ub]` array bounds
    #[error("Line {line}: bad array bounds: {message}")]
    BadArrayBounds { line: usize, message: String },

    /// Subscript in an equation that cannot be resolved for an index
    #[error("Bad index expression '{expression}' in equation: {message}")]
    BadIndexExpression { expression: String, message: String },

    /// Variable declared twice
    #[error("Variable '{name}' is already declared")]
    Redeclared { name: String },

    /// Assignment with nothing on the right-hand side
    #[error("Line {line}: empty equation for '{name}'")]
    EmptyEquation { name: String, line: usize },

    /// Stray token at the top level
    #[error("Line {line}: unexpected '{token}'{}", hint_suffix(.hint))]
    UnexpectedToken {
        token: String,
        line: usize,
        hint: Option<String>,
    },

    /// Stray number at the top level
    #[error("Line {line}: unexpected number '{token}', ignoring")]
    UnexpectedNumber { token: String, line: usize },

    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Failure reported by an embedded-format reader
    #[error("Error reading {section} section: {message}")]
    EmbeddedReader { section: String, message: String },

    // ============ Model Validation Errors ============
    /// State variable without a `dt()` equation
    #[error("State variable '{state}' has no differential equation")]
    MissingDerivative { state: String },

    /// Variable assigned in a section where its kind forbids it
    #[error("'{name}' cannot be assigned in the {section} section")]
    InvalidAssignment { name: String, section: String },

    // ============ I/O Errors ============
    /// Error reading the model file
    #[error("Failed to read model file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" ({})", hint),
        None => String::new(),
    }
}

impl ModelError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an expected-token error
    pub fn expected(expected: impl Into<String>, line: usize) -> Self {
        Self::ExpectedToken {
            expected: expected.into(),
            line,
            hint: None,
        }
    }

    /// Create an expected-token error with an explanatory hint
    pub fn expected_with_hint(expected: impl Into<String>, line: usize, hint: impl Into<String>) -> Self {
        Self::ExpectedToken {
            expected: expected.into(),
            line,
            hint: Some(hint.into()),
        }
    }

    /// Create a bad-array-bounds error
    pub fn bad_bounds(line: usize, message: impl Into<String>) -> Self {
        Self::BadArrayBounds {
            line,
            message: message.into(),
        }
    }

    /// Whether this error aborts the parse or only the current statement.
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnexpectedToken { .. } | Self::UnexpectedNumber { .. } | Self::EmptyEquation { .. } => {
                Severity::Recoverable
            }
            _ => Severity::Fatal,
        }
    }

    /// Shorthand for `severity() == Severity::Fatal`.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Source line the error points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::BadContext { line, .. }
            | Self::DuplicateSection { line, .. }
            | Self::ExpectedToken { line, .. }
            | Self::BadState { line, .. }
            | Self::NameTooLong { line, .. }
            | Self::BadArrayBounds { line, .. }
            | Self::EmptyEquation { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::UnexpectedNumber { line, .. }
            | Self::LexerError { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// A reported problem that did not stop the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Fatal or recoverable
    pub severity: Severity,
    /// Source line, if the problem is tied to one
    pub line: Option<usize>,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a recoverable diagnostic not tied to a line.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Recoverable,
            line: None,
            message: message.into(),
        }
    }
}

impl From<&ModelError> for Diagnostic {
    fn from(err: &ModelError) -> Self {
        Self {
            severity: err.severity(),
            line: err.line(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert!(ModelError::MissingEnd.is_fatal());
        assert!(ModelError::expected(";", 3).is_fatal());
        let stray = ModelError::UnexpectedNumber {
            token: "42".to_string(),
            line: 7,
        };
        assert_eq!(stray.severity(), Severity::Recoverable);
        assert_eq!(stray.line(), Some(7));
    }

    #[test]
    fn test_expected_hint_in_message() {
        let err = ModelError::expected_with_hint("{", 2, "section must be delimited by curly braces");
        assert_eq!(
            err.to_string(),
            "Line 2: expected '{' (section must be delimited by curly braces)"
        );
        assert_eq!(ModelError::expected("=", 4).to_string(), "Line 4: expected '='");
    }

    #[test]
    fn test_diagnostic_from_error() {
        let err = ModelError::EmptyEquation {
            name: "k".to_string(),
            line: 5,
        };
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.severity, Severity::Recoverable);
        assert_eq!(diag.line, Some(5));
        assert_eq!(diag.to_string(), "warning: Line 5: empty equation for 'k'");
    }
}
