#![forbid(unsafe_code)]

//! Destinations for a session outcome.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::error::{OutcomeError, OutcomeResult};
use crate::record::{SessionOutcome, write_outcome};

/// Somewhere an outcome can be delivered.
pub trait OutcomeSink: Send {
    fn deliver(&mut self, outcome: &SessionOutcome) -> OutcomeResult<()>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Writes the outcome file. Used across process boundaries.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutcomeSink for FileSink {
    fn deliver(&mut self, outcome: &SessionOutcome) -> OutcomeResult<()> {
        write_outcome(&self.path, outcome)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Sends the outcome over a channel. Used when the consumer shares the process.
#[derive(Debug, Clone)]
pub struct DirectSink {
    tx: mpsc::Sender<SessionOutcome>,
}

impl DirectSink {
    #[must_use]
    pub fn new(tx: mpsc::Sender<SessionOutcome>) -> Self {
        Self { tx }
    }

    /// A sink and the receiver it feeds.
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<SessionOutcome>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl OutcomeSink for DirectSink {
    fn deliver(&mut self, outcome: &SessionOutcome) -> OutcomeResult<()> {
        self.tx
            .send(outcome.clone())
            .map_err(|_| OutcomeError::Disconnected)
    }

    fn describe(&self) -> String {
        "in-process channel".to_owned()
    }
}
