//! Error types for the index engines.

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while configuring, validating or driving an index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Minimum degree below the smallest supported multiway fanout
    #[error("Invalid minimum degree {degree} (must be at least {min})")]
    InvalidDegree { degree: usize, min: usize },

    /// Engine name that does not match any known back-end
    #[error("Unknown index kind: {0}")]
    UnknownKind(String),

    /// Structural check failed; indicates a bug in the rebalancing logic
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Malformed directive in an operation script
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error while reading a script
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Create an invariant violation error with a message
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create a parse error for the given 1-based line
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }
}
