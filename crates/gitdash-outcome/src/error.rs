#![forbid(unsafe_code)]

use std::fmt;

/// Errors from the outcome channel.
#[derive(Debug)]
pub enum OutcomeError {
    /// Reading or writing the outcome file failed.
    Io(std::io::Error),
    /// The record could not be encoded or decoded.
    Serialization(String),
    /// The in-process receiver is gone.
    Disconnected,
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeError::Io(e) => write!(f, "I/O error: {e}"),
            OutcomeError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            OutcomeError::Disconnected => write!(f, "outcome receiver disconnected"),
        }
    }
}

impl std::error::Error for OutcomeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutcomeError::Io(e) => Some(e),
            OutcomeError::Serialization(_) | OutcomeError::Disconnected => None,
        }
    }
}

impl From<std::io::Error> for OutcomeError {
    fn from(e: std::io::Error) -> Self {
        OutcomeError::Io(e)
    }
}

impl From<serde_json::Error> for OutcomeError {
    fn from(e: serde_json::Error) -> Self {
        OutcomeError::Serialization(e.to_string())
    }
}

/// Result alias for outcome operations.
pub type OutcomeResult<T> = Result<T, OutcomeError>;
