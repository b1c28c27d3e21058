#![forbid(unsafe_code)]

//! Headless key replay.
//!
//! Drives a [`Session`] over a [`HeadlessBackend`] from a scripted list of
//! keys, waiting for background actions to settle after every key so runs
//! are deterministic. The outcome is recorded exactly as in an interactive
//! run: success when the session quits on its own, failure otherwise.
//!
//! # Script format
//!
//! Key names separated by commas or whitespace, in the form accepted by
//! [`KeyEvent`]'s `FromStr`:
//!
//! ```text
//! down, down, enter, ctrl+c
//! ```

use std::time::Duration;

use gitdash_core::event::KeyEvent;
use gitdash_core::geometry::ScreenSize;
use gitdash_outcome::OutcomeReporter;
use gitdash_panels::{ControllerConfig, Fatal, HeadlessBackend};

use crate::error::{RuntimeError, RuntimeResult};
use crate::program::failure_message;
use crate::session::{Dashboard, Session};

/// Message recorded when the script runs out before the session quits.
pub const UNFINISHED_MESSAGE: &str = "replay ended before the session quit";

/// Parse a replay script into key events.
pub fn parse_script(script: &str) -> RuntimeResult<Vec<KeyEvent>> {
    script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<KeyEvent>()
                .map_err(|e| RuntimeError::Replay(format!("{token:?}: {e}")))
        })
        .collect()
}

/// Replay settings.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Screen size reported by the headless backend.
    pub size: ScreenSize,
    pub controller: ControllerConfig,
    /// Upper bound on waiting for actions after each key.
    pub settle_timeout: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            size: ScreenSize::new(80, 24),
            controller: ControllerConfig::default(),
            settle_timeout: Duration::from_secs(30),
        }
    }
}

/// What a replay did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Keys delivered before the session quit or the script ran out.
    pub keys_fed: usize,
    /// Whether the session quit on its own.
    pub quit: bool,
    /// Status line text at the end of the run.
    pub status: String,
}

/// Feed `keys` into `session` until it stops running. Returns how many keys were fed.
pub fn feed_keys<D: Dashboard>(
    session: &mut Session<D, HeadlessBackend>,
    keys: &[KeyEvent],
    settle_timeout: Duration,
) -> Result<usize, Fatal> {
    let mut fed = 0;
    for key in keys {
        if !session.is_running() {
            break;
        }
        tracing::debug!(key = %key, "replay key");
        session.handle_key(*key)?;
        session.settle(settle_timeout)?;
        fed += 1;
    }
    Ok(fed)
}

/// Run `dashboard` headlessly over `keys` and record the outcome.
pub fn run_replay<D: Dashboard>(
    dashboard: D,
    keys: &[KeyEvent],
    config: ReplayConfig,
    reporter: OutcomeReporter,
) -> RuntimeResult<ReplaySummary> {
    let backend = HeadlessBackend::new(config.size);
    let mut session = Session::new(dashboard, backend, config.controller).with_reporter(reporter);

    let fed = match session.init() {
        Ok(()) => feed_keys(&mut session, keys, config.settle_timeout).map_err(RuntimeError::from),
        Err(e) => Err(e),
    };
    let keys_fed = match fed {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "replay failed");
            if let Err(record_err) = session.record_failure(failure_message(&e)) {
                tracing::warn!(error = %record_err, "could not record failure");
            }
            return Err(e);
        }
    };

    let quit = !session.is_running();
    let recorded = if quit {
        session.record_success()
    } else {
        tracing::warn!(keys_fed, "{UNFINISHED_MESSAGE}");
        session.record_failure(UNFINISHED_MESSAGE)
    };
    if let Err(e) = recorded {
        tracing::warn!(error = %e, quit, "could not record replay outcome");
    }
    tracing::info!(keys_fed, quit, "replay finished");
    Ok(ReplaySummary {
        keys_fed,
        quit,
        status: session.backend().status().to_owned(),
    })
}
