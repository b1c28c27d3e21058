#![forbid(unsafe_code)]

//! Interactive terminal loop.
//!
//! [`run`] owns the whole lifetime of an interactive session:
//!
//! 1. enter raw mode through [`TerminalSession`];
//! 2. create the base panels and draw;
//! 3. poll input, draining every pending event per wakeup, and deliver a
//!    [`Event::Tick`] when the poll window passes without input so finished
//!    background actions are picked up while the user is idle;
//! 4. restore the terminal;
//! 5. record the outcome. Recording happens after the terminal is restored
//!    so a supervisor never sees a verdict while the screen is still owned.

use std::time::Duration;

use gitdash_core::event::Event;
use gitdash_core::geometry::ScreenSize;
use gitdash_outcome::OutcomeReporter;
use gitdash_panels::ControllerConfig;

use crate::crossterm_backend::CrosstermBackend;
use crate::error::{RuntimeError, RuntimeResult};
use crate::session::{Dashboard, Session};
use crate::terminal_session::{SessionOptions, TerminalSession};

/// Loop settings.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// How long to wait for input before delivering a tick.
    pub poll_timeout: Duration,
    /// How long to wait for in-flight actions after quit.
    pub shutdown_grace: Duration,
    pub controller: ControllerConfig,
    pub terminal: SessionOptions,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(250),
            shutdown_grace: Duration::from_secs(2),
            controller: ControllerConfig::default(),
            terminal: SessionOptions::default(),
        }
    }
}

/// Run `dashboard` on the terminal until it quits or hits a fatal error.
pub fn run<D: Dashboard>(
    dashboard: D,
    config: ProgramConfig,
    mut reporter: OutcomeReporter,
) -> RuntimeResult<()> {
    let terminal = match TerminalSession::new(config.terminal.clone()) {
        Ok(terminal) => terminal,
        Err(e) => {
            record_failure(&mut reporter, &format!("terminal setup failed: {e}"));
            return Err(e.into());
        }
    };
    let backend = match CrosstermBackend::stdout() {
        Ok(backend) => backend,
        Err(e) => {
            drop(terminal);
            record_failure(&mut reporter, &format!("terminal size unavailable: {e}"));
            return Err(e.into());
        }
    };

    let mut session = Session::new(dashboard, backend, config.controller.clone())
        .with_reporter(reporter);
    let result = drive(&terminal, &mut session, &config);
    drop(terminal);

    match result {
        Ok(()) => {
            if let Err(e) = session.record_success() {
                tracing::warn!(error = %e, "could not record success");
            }
            tracing::info!("session ended");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            if let Err(record_err) = session.record_failure(failure_message(&e)) {
                tracing::warn!(error = %record_err, "could not record failure");
            }
            Err(e)
        }
    }
}

fn drive<D: Dashboard>(
    terminal: &TerminalSession,
    session: &mut Session<D, CrosstermBackend<std::io::Stdout>>,
    config: &ProgramConfig,
) -> RuntimeResult<()> {
    session.init()?;

    let mut iterations: u64 = 0;
    while session.is_running() {
        iterations += 1;
        if iterations.is_multiple_of(100) {
            tracing::trace!(iterations, "loop heartbeat");
        }

        if terminal.poll_event(config.poll_timeout)? {
            loop {
                if let Some(event) = terminal.read_event()? {
                    if let Event::Resize { width, height } = event {
                        session
                            .backend_mut()
                            .set_size(ScreenSize::new(width, height));
                    }
                    session.handle_event(event)?;
                }
                if !session.is_running() || !terminal.poll_event(Duration::ZERO)? {
                    break;
                }
            }
        } else {
            session.handle_event(Event::Tick)?;
        }
    }

    if session.actions_in_flight() > 0 {
        tracing::info!(
            in_flight = session.actions_in_flight(),
            "waiting for background actions"
        );
        session.settle(config.shutdown_grace)?;
    }
    Ok(())
}

/// Outcome message for a failed session. Fatal errors carry their own context.
pub(crate) fn failure_message(error: &RuntimeError) -> String {
    match error {
        RuntimeError::Fatal(fatal) => fatal.to_string(),
        other => other.to_string(),
    }
}

fn record_failure(reporter: &mut OutcomeReporter, message: &str) {
    if let Err(e) = reporter.record_failure(message) {
        tracing::warn!(error = %e, "could not record failure");
    }
}
