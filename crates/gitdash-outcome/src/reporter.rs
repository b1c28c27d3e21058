#![forbid(unsafe_code)]

//! Session-side half of the outcome channel.

use std::fmt;
use std::path::PathBuf;

use crate::error::OutcomeResult;
use crate::record::{SessionOutcome, outcome_path_from_env};
use crate::sink::{FileSink, OutcomeSink};

/// Records a session's outcome once.
///
/// Without a sink every call is a no-op. With one, the first
/// `record_*` call delivers and later calls are ignored, so a failure
/// recorded by a fatal error path cannot be overwritten by a success
/// recorded on the way out.
#[derive(Default)]
pub struct OutcomeReporter {
    sink: Option<Box<dyn OutcomeSink>>,
    recorded: Option<SessionOutcome>,
}

impl fmt::Debug for OutcomeReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeReporter")
            .field("sink", &self.sink.as_ref().map(|s| s.describe()))
            .field("recorded", &self.recorded)
            .finish()
    }
}

impl OutcomeReporter {
    /// Reporter that records nothing.
    #[must_use]
    pub fn inert() -> Self {
        Self::default()
    }

    /// File reporter when `GITDASH_OUTCOME_PATH` is set and non-empty, inert otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_path(outcome_path_from_env())
    }

    /// File reporter for `path`, inert for `None`.
    #[must_use]
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::with_sink(FileSink::new(path)),
            None => Self::inert(),
        }
    }

    #[must_use]
    pub fn with_sink(sink: impl OutcomeSink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
            recorded: None,
        }
    }

    /// Whether outcomes go anywhere.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.sink.is_some()
    }

    /// The outcome recorded so far.
    #[must_use]
    pub fn recorded(&self) -> Option<&SessionOutcome> {
        self.recorded.as_ref()
    }

    /// Record success. Returns whether anything was delivered.
    pub fn record_success(&mut self) -> OutcomeResult<bool> {
        self.record(SessionOutcome::success())
    }

    /// Record failure. Returns whether anything was delivered.
    pub fn record_failure(&mut self, message: impl Into<String>) -> OutcomeResult<bool> {
        self.record(SessionOutcome::failure(message))
    }

    fn record(&mut self, outcome: SessionOutcome) -> OutcomeResult<bool> {
        if self.recorded.is_some() {
            tracing::debug!(succeeded = outcome.succeeded, "outcome already recorded");
            return Ok(false);
        }
        let delivered = match self.sink.as_mut() {
            Some(sink) => {
                sink.deliver(&outcome)?;
                true
            }
            None => false,
        };
        self.recorded = Some(outcome);
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::DirectSink;

    #[test]
    fn inert_records_locally_only() {
        let mut reporter = OutcomeReporter::inert();
        assert!(!reporter.is_configured());
        assert!(!reporter.record_success().unwrap());
        assert_eq!(reporter.recorded(), Some(&SessionOutcome::success()));
    }

    #[test]
    fn first_record_wins() {
        let (sink, rx) = DirectSink::channel();
        let mut reporter = OutcomeReporter::with_sink(sink);
        assert!(reporter.record_failure("boom").unwrap());
        assert!(!reporter.record_success().unwrap());
        assert_eq!(rx.try_recv().unwrap(), SessionOutcome::failure("boom"));
        assert!(rx.try_recv().is_err());
        assert_eq!(reporter.recorded(), Some(&SessionOutcome::failure("boom")));
    }

    #[test]
    fn from_path_none_is_inert() {
        assert!(!OutcomeReporter::from_path(None).is_configured());
    }
}
