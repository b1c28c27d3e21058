#![forbid(unsafe_code)]

//! The single-threaded session loop body.
//!
//! A [`Session`] owns the panel controller, a rendering backend, the base
//! [`Dashboard`] and the action runner. Input reaches it as canonical
//! [`Event`]s from either the terminal loop in [`crate::program`] or the
//! headless replay driver, so both paths exercise the same dispatch code.
//!
//! # Dispatch order
//!
//! 1. Keys go to the controller first. A focused modal panel consumes its
//!    bindings and, when editable, unbound printable keys.
//! 2. Unconsumed keys go to the dashboard together with the focused panel.
//! 3. Effects returned by either are applied after the modal panel involved
//!    has been torn down.
//! 4. Finished background actions are drained on every event.

use std::time::Duration;

use gitdash_core::event::{Event, KeyEvent};
use gitdash_outcome::OutcomeReporter;
use gitdash_panels::{
    ActionError, Backend, BackendResult, ConfirmationRequest, Controller, ControllerConfig,
    Dispatch, Effect, Fatal, OpenError, PanelName,
};

use crate::error::RuntimeResult;
use crate::worker::{ActionReport, ActionRunner};

/// The non-modal part of an application: base panels and their keys.
pub trait Dashboard {
    /// Create the base panels. Returns the panel that starts with focus.
    fn init(&mut self, backend: &mut dyn Backend) -> BackendResult<PanelName>;

    /// A key that no modal panel consumed. `focus` is the focused base panel.
    fn on_key(&mut self, key: KeyEvent, focus: Option<&PanelName>) -> Effect;

    /// A background action finished.
    fn on_action(&mut self, report: ActionReport) -> Effect;

    /// Redraw base panels and, when no modal panel is open, the status line.
    fn render(&self, backend: &mut dyn Backend, modal_open: bool) -> BackendResult<()>;

    /// Reposition base panels after the screen size changed.
    fn relayout(&mut self, backend: &mut dyn Backend) -> BackendResult<()> {
        let _ = backend;
        Ok(())
    }
}

/// One interactive session.
pub struct Session<D, B> {
    dashboard: D,
    backend: B,
    controller: Controller,
    runner: ActionRunner,
    reporter: OutcomeReporter,
    running: bool,
}

impl<D: Dashboard, B: Backend> Session<D, B> {
    #[must_use]
    pub fn new(dashboard: D, backend: B, config: ControllerConfig) -> Self {
        Self {
            dashboard,
            backend,
            controller: Controller::new(config),
            runner: ActionRunner::new(),
            reporter: OutcomeReporter::inert(),
            running: true,
        }
    }

    /// Record the session outcome through `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: OutcomeReporter) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn dashboard(&self) -> &D {
        &self.dashboard
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    #[must_use]
    pub fn reporter(&self) -> &OutcomeReporter {
        &self.reporter
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Actions still running in the background.
    #[must_use]
    pub fn actions_in_flight(&self) -> usize {
        self.runner.in_flight()
    }

    /// Create base panels, focus the initial one, draw.
    pub fn init(&mut self) -> RuntimeResult<()> {
        let focus = self.dashboard.init(&mut self.backend)?;
        tracing::info!(focus = %focus, "session started");
        self.controller.focus_base(&mut self.backend, focus)?;
        self.render()?;
        Ok(())
    }

    /// Handle one event and redraw.
    pub fn handle_event(&mut self, event: Event) -> Result<(), Fatal> {
        match event {
            Event::Key(key) => self.handle_key(key)?,
            Event::Resize { width, height } => {
                tracing::debug!(width, height, "resize");
                self.controller.relayout(&mut self.backend)?;
                if let Err(e) = self.dashboard.relayout(&mut self.backend) {
                    tracing::warn!(error = %e, "base panel relayout failed");
                }
            }
            Event::Paste(text) => {
                self.controller.paste(&mut self.backend, &text)?;
            }
            Event::Focus(_) | Event::Tick => {}
        }
        self.poll_actions()?;
        self.render_or_log();
        Ok(())
    }

    /// Feed a key through the controller, then the dashboard.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<(), Fatal> {
        if !key.is_actionable() {
            return Ok(());
        }
        let effect = match self.controller.handle_key(&mut self.backend, key)? {
            Dispatch::Handled(effect) => effect,
            Dispatch::Unhandled => {
                let focus = self.controller.focused().cloned();
                self.dashboard.on_key(key, focus.as_ref())
            }
        };
        self.apply(effect)
    }

    /// Apply reports from finished actions.
    pub fn poll_actions(&mut self) -> Result<(), Fatal> {
        for report in self.runner.drain() {
            self.apply_report(report)?;
        }
        Ok(())
    }

    /// Wait for in-flight actions and apply their reports.
    pub fn settle(&mut self, timeout: Duration) -> Result<(), Fatal> {
        for report in self.runner.wait_idle(timeout) {
            self.apply_report(report)?;
        }
        self.render_or_log();
        Ok(())
    }

    fn apply_report(&mut self, report: ActionReport) -> Result<(), Fatal> {
        tracing::info!(action = %report.label, succeeded = report.succeeded(), "action finished");
        let effect = self.dashboard.on_action(report);
        self.apply(effect)
    }

    /// Apply an effect. Only fatal controller errors propagate.
    pub fn apply(&mut self, effect: Effect) -> Result<(), Fatal> {
        for effect in effect.flatten() {
            match effect {
                Effect::None | Effect::Batch(_) => {}
                Effect::Open(request) => self.open(*request)?,
                Effect::Status(text) => {
                    if let Err(e) = self.backend.set_status(&text) {
                        tracing::warn!(error = %e, "status update failed");
                    }
                }
                Effect::Run(task) => {
                    let label = task.label().to_owned();
                    if let Err(e) = self.runner.spawn(task) {
                        tracing::error!(action = %label, error = %e, "could not start action");
                        let report = ActionReport {
                            label,
                            result: Err(ActionError::new(format!("could not start: {e}"))),
                        };
                        self.apply_report(report)?;
                    }
                }
                Effect::Quit => {
                    tracing::info!("quit requested");
                    self.running = false;
                }
            }
        }
        Ok(())
    }

    /// Open a modal panel. Rejections become a status message.
    pub fn open(&mut self, request: ConfirmationRequest) -> Result<(), Fatal> {
        match self.controller.open(&mut self.backend, request) {
            Ok(()) => Ok(()),
            Err(OpenError::Fatal(fatal)) => Err(fatal),
            Err(e) => {
                tracing::warn!(error = %e, "panel open rejected");
                if let Err(e) = self.backend.set_status(&e.to_string()) {
                    tracing::warn!(error = %e, "status update failed");
                }
                Ok(())
            }
        }
    }

    /// Redraw base panels and flush the backend.
    pub fn render(&mut self) -> BackendResult<()> {
        let modal_open = self.controller.has_modal();
        self.dashboard.render(&mut self.backend, modal_open)?;
        self.backend.present()
    }

    fn render_or_log(&mut self) {
        if let Err(e) = self.render() {
            tracing::warn!(error = %e, "render failed");
        }
    }

    /// Record a clean exit.
    pub fn record_success(&mut self) -> RuntimeResult<bool> {
        Ok(self.reporter.record_success()?)
    }

    /// Record a failed exit.
    pub fn record_failure(&mut self, message: impl Into<String>) -> RuntimeResult<bool> {
        Ok(self.reporter.record_failure(message)?)
    }
}
