//! Error types for the bracketcheck core library.

use thiserror::Error;

/// Result type alias using the bracketcheck [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for bracketcheck operations.
///
/// Unbalanced input is never an error; it is reported as a `false` verdict.
#[derive(Debug, Error)]
pub enum Error {
    /// A header line was missing or not an unsigned integer.
    #[error("Invalid header on input line {line}: expected an unsigned integer, got {value:?}")]
    InputFormat { line: usize, value: String },

    /// Grammar definition error
    #[error("Grammar error: {0}")]
    Grammar(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from a malformed header line.
    pub const fn is_input_format(&self) -> bool {
        matches!(self, Self::InputFormat { .. })
    }
}
