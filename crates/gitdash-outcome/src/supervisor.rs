#![forbid(unsafe_code)]

//! Supervisor-side half of the outcome channel.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::OutcomeResult;
use crate::record::{configure_outcome_path, read_outcome};

/// What the supervisor concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(String),
    /// The session exited without writing an outcome.
    Inconclusive,
}

impl Verdict {
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed(msg) if msg.is_empty() => f.write_str("failed"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
            Self::Inconclusive => f.write_str("inconclusive"),
        }
    }
}

/// Runs a session process and reads back its outcome.
///
/// Any file already at the outcome path is removed first so a stale record
/// from an earlier run is never mistaken for this one.
#[derive(Debug)]
pub struct Supervisor {
    command: Command,
    outcome_path: PathBuf,
}

impl Supervisor {
    #[must_use]
    pub fn new(command: Command, outcome_path: impl Into<PathBuf>) -> Self {
        Self {
            command,
            outcome_path: outcome_path.into(),
        }
    }

    #[must_use]
    pub fn outcome_path(&self) -> &Path {
        &self.outcome_path
    }

    /// Run the session to completion and judge it.
    pub fn run(mut self) -> OutcomeResult<Verdict> {
        match fs::remove_file(&self.outcome_path) {
            Ok(()) => tracing::debug!(path = %self.outcome_path.display(), "removed stale outcome"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        configure_outcome_path(&mut self.command, &self.outcome_path);
        let status = self.command.status()?;
        tracing::debug!(code = ?status.code(), "session exited");

        let verdict = match read_outcome(&self.outcome_path)? {
            Some(outcome) if outcome.succeeded => Verdict::Passed,
            Some(outcome) => Verdict::Failed(outcome.message),
            None => Verdict::Inconclusive,
        };
        tracing::info!(%verdict, "session judged");
        Ok(verdict)
    }
}
