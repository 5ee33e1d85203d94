//! Error types for pointsize

use thiserror::Error;

/// Main error type for point-cloud import operations
///
/// Every variant is terminal for the import that raised it: no partial
/// point set is ever returned alongside an error.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed magic line, encoding line, property line or unterminated header
    #[error("Format error: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The binary body ended before `expected` records were read
    #[error("Truncated body: expected {expected} vertices, decoded {decoded}")]
    TruncatedBody { expected: usize, decoded: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// Whether this error came from a malformed header
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    /// Whether this error came from a bad caller-supplied parameter
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Error::InvalidParameter(_))
    }
}

/// Result type alias for pointsize operations
pub type Result<T> = std::result::Result<T, Error>;

/// Build a [`Error::Format`] from any message
pub fn format_error(message: impl Into<String>) -> Error {
    Error::Format(message.into())
}

/// Build a [`Error::InvalidParameter`] from any message
pub fn invalid_parameter(message: impl Into<String>) -> Error {
    Error::InvalidParameter(message.into())
}
