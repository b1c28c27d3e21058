#![forbid(unsafe_code)]

use std::fmt;
use std::io;

use gitdash_outcome::OutcomeError;
use gitdash_panels::{BackendError, Fatal};

/// Anything that ends a session early.
#[derive(Debug)]
pub enum RuntimeError {
    /// Terminal setup or event reading failed.
    Io(io::Error),
    /// The dashboard could not draw its base panels.
    Backend(BackendError),
    /// The panel engine hit an unrecoverable error.
    Fatal(Fatal),
    /// The outcome could not be recorded.
    Outcome(OutcomeError),
    /// A replay script could not be parsed.
    Replay(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "terminal error: {e}"),
            RuntimeError::Backend(e) => write!(f, "backend error: {e}"),
            RuntimeError::Fatal(e) => write!(f, "fatal: {e}"),
            RuntimeError::Outcome(e) => write!(f, "outcome error: {e}"),
            RuntimeError::Replay(msg) => write!(f, "replay error: {msg}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            RuntimeError::Backend(e) => Some(e),
            RuntimeError::Fatal(e) => Some(e),
            RuntimeError::Outcome(e) => Some(e),
            RuntimeError::Replay(_) => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

impl From<BackendError> for RuntimeError {
    fn from(e: BackendError) -> Self {
        RuntimeError::Backend(e)
    }
}

impl From<Fatal> for RuntimeError {
    fn from(e: Fatal) -> Self {
        RuntimeError::Fatal(e)
    }
}

impl From<OutcomeError> for RuntimeError {
    fn from(e: OutcomeError) -> Self {
        RuntimeError::Outcome(e)
    }
}

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
