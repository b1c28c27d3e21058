#![forbid(unsafe_code)]

//! Background action handoff.
//!
//! Each [`ActionTask`] runs on its own thread. Results come back over an
//! mpsc channel that the UI loop drains once per iteration, so panel state
//! is only ever touched from the loop thread.
//!
//! A task that panics never sends a result. Its handle is reaped on the next
//! drain and a failure report is synthesized in its place, so the in-flight
//! count always returns to zero.

use std::io;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gitdash_panels::{ActionError, ActionResult, ActionTask};

/// Poll slice used while waiting for in-flight actions.
const WAIT_SLICE: Duration = Duration::from_millis(25);

/// Result of one finished action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub label: String,
    pub result: ActionResult,
}

impl ActionReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Spawns action threads and collects their reports.
#[derive(Debug)]
pub struct ActionRunner {
    tx: mpsc::Sender<ActionReport>,
    rx: mpsc::Receiver<ActionReport>,
    handles: Vec<(String, JoinHandle<()>)>,
    in_flight: usize,
}

impl Default for ActionRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRunner {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            handles: Vec::new(),
            in_flight: 0,
        }
    }

    /// Actions started but not yet reported.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Start `task` on a new thread.
    pub fn spawn(&mut self, task: ActionTask) -> io::Result<()> {
        let label = task.label().to_owned();
        let tx = self.tx.clone();
        let thread_label = label.clone();
        let handle = thread::Builder::new()
            .name(format!("gitdash-action-{label}"))
            .spawn(move || {
                let result = task.run();
                let _ = tx.send(ActionReport {
                    label: thread_label,
                    result,
                });
            })?;
        tracing::debug!(action = %label, "action started");
        self.handles.push((label, handle));
        self.in_flight += 1;
        Ok(())
    }

    /// Reports available right now, without blocking.
    pub fn drain(&mut self) -> Vec<ActionReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            reports.push(report);
        }
        reports.extend(self.reap());
        reports
    }

    /// Block until every in-flight action has reported or `timeout` passes.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<ActionReport> {
        let deadline = Instant::now() + timeout;
        let mut reports = self.drain();
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(in_flight = self.in_flight, "timed out waiting for actions");
                break;
            }
            if let Ok(report) = self.rx.recv_timeout(WAIT_SLICE.min(deadline - now)) {
                self.in_flight = self.in_flight.saturating_sub(1);
                reports.push(report);
            }
            reports.extend(self.reap());
        }
        reports
    }

    /// Join finished threads. Panicked ones become failure reports.
    fn reap(&mut self) -> Vec<ActionReport> {
        let mut reports = Vec::new();
        let mut remaining = Vec::with_capacity(self.handles.len());
        for (label, handle) in self.handles.drain(..) {
            if !handle.is_finished() {
                remaining.push((label, handle));
                continue;
            }
            if let Err(payload) = handle.join() {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_owned()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_owned()
                };
                tracing::error!(action = %label, "action panicked: {msg}");
                self.in_flight = self.in_flight.saturating_sub(1);
                reports.push(ActionReport {
                    label,
                    result: Err(ActionError::new(format!("action panicked: {msg}"))),
                });
            }
        }
        self.handles = remaining;
        reports
    }
}
