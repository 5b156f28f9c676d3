//! Error types for the silica job service.

use thiserror::Error;

/// Result type alias using silica's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for silica operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or empty submission input (sequences, genome, form field).
    #[error("{0}")]
    Input(String),

    /// A sanitized parameter failed its documented constraint.
    #[error("{message}")]
    Validation {
        /// Form key of the offending option.
        field: &'static str,
        /// Human-readable message naming the option and its range.
        message: String,
    },

    /// The external tool could not be started.
    #[error("{0}")]
    Launch(String),

    /// The external tool ran but exited non-zero and/or wrote diagnostics.
    #[error("Execution error: {0}")]
    Execution(ExecutionFailure),

    /// Well-formed identifier without a stored artifact.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Result identifier does not match the compound identifier grammar.
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a completed tool invocation is not a success.
///
/// Both conditions are tracked independently; either one alone is enough
/// to fail the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    /// Exit code when it was not zero (`None` if the process exited 0).
    /// A process killed by a signal has no code and is recorded as -1.
    pub exit_code: Option<i32>,
    /// Verbatim error stream content when it was not blank.
    pub diagnostics: Option<String>,
}

impl ExecutionFailure {
    /// User-visible titles, non-zero exit first.
    pub fn titles(&self) -> Vec<String> {
        let mut titles = Vec::new();
        if let Some(code) = self.exit_code {
            titles.push(format!("Run Error - silica did not return 0 (exit code {})", code));
        }
        if let Some(ref text) = self.diagnostics {
            titles.push(format!("Error in running silica: {}", text));
        }
        titles
    }
}

impl std::fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.titles().join("; "))
    }
}

impl Error {
    /// Build a validation error for a form field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
