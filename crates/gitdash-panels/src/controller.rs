#![forbid(unsafe_code)]

//! Confirmation and prompt workflow controller.
//!
//! Owns the panel arena, the focus stack and the modal keybinding scopes,
//! and drives every modal panel through
//! `Closed -> Opening -> Open -> Closing -> Closed`.
//!
//! # Invariants
//!
//! 1. At most one live panel per name. Opening a live name tears the old
//!    panel down first, through the same path a normal close takes.
//! 2. Every close, whichever key caused it, runs the same teardown:
//!    drop the keybinding scope, destroy the panel, restore focus. Each step
//!    runs exactly once and in that order.
//! 3. A handler runs before teardown. If it fails the error is returned as
//!    [`Fatal::Handler`] and nothing is torn down; the process is expected
//!    to exit.
//! 4. A failed open leaves nothing registered: no arena entry, no scope, no
//!    focus stack entry.
//!
//! # Example
//!
//! ```
//! use gitdash_core::event::{KeyCode, KeyEvent};
//! use gitdash_core::geometry::ScreenSize;
//! use gitdash_panels::{ConfirmationRequest, Controller, Dispatch, Effect, HeadlessBackend};
//!
//! let mut backend = HeadlessBackend::new(ScreenSize::new(80, 24));
//! let mut controller = Controller::default();
//!
//! let request = ConfirmationRequest::confirm("Discard", "Discard all changes?")
//!     .on_confirm(|_| Ok(Effect::status("discarded")));
//! controller.open(&mut backend, request).unwrap();
//! assert!(controller.is_open("confirmation"));
//!
//! let dispatch = controller
//!     .handle_key(&mut backend, KeyEvent::new(KeyCode::Enter))
//!     .unwrap();
//! assert!(matches!(dispatch, Dispatch::Handled(Effect::Status(_))));
//! assert!(!controller.is_open("confirmation"));
//! ```

use std::collections::HashMap;
use std::fmt;

use gitdash_core::event::{KeyCode, KeyEvent};
use gitdash_core::{debug, debug_span, warn};
use gitdash_layout::{compute_bounds, fit_height, newline_bounds};

use crate::arena::{Panel, PanelArena, PanelName};
use crate::backend::Backend;
use crate::editor::TextBuffer;
use crate::effect::Effect;
use crate::error::{Fatal, FatalResult, OpenError};
use crate::focus::FocusStack;
use crate::journal::{DEFAULT_JOURNAL_CAPACITY, Journal, LifecycleEvent};
use crate::keybinding::{KeybindingRouter, Keymap, Trigger};
use crate::request::{ConfirmationRequest, Handler, HandlerContext, PromptDraft};

/// Which handler a close runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Confirm,
    Cancel,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
        })
    }
}

/// Bound to the standard triggers of each modal panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    Accept,
    Newline,
    Cancel,
}

/// Where a panel is in its lifecycle, as seen from outside a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Closed,
    Open { editable: bool },
}

/// Outcome of offering a key to the controller.
#[derive(Debug)]
pub enum Dispatch {
    /// No modal panel wanted the key.
    Unhandled,
    /// The key was consumed; apply the effect.
    Handled(Effect),
}

impl Dispatch {
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// Controller settings.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub keymap: Keymap,
    /// Status line text while a modal panel is open. Derived from the keymap when `None`.
    pub status_hint: Option<String>,
    pub journal_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            keymap: Keymap::default(),
            status_hint: None,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

struct Workflow {
    on_confirm: Option<Handler>,
    on_cancel: Option<Handler>,
    draft: Option<PromptDraft>,
}

/// The modal panel engine.
pub struct Controller {
    config: ControllerConfig,
    arena: PanelArena,
    focus: FocusStack,
    router: KeybindingRouter<PanelCommand>,
    workflows: HashMap<PanelName, Workflow>,
    journal: Journal,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("open", &self.arena.names().collect::<Vec<_>>())
            .field("focus", &self.focus.current())
            .field("depth", &self.focus.depth())
            .finish_non_exhaustive()
    }
}

impl Controller {
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        let journal = Journal::with_capacity(config.journal_capacity);
        Self {
            config,
            arena: PanelArena::new(),
            focus: FocusStack::new(),
            router: KeybindingRouter::new(),
            workflows: HashMap::new(),
            journal,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Status text written when a modal panel opens.
    #[must_use]
    pub fn status_hint(&self) -> String {
        self.config
            .status_hint
            .clone()
            .unwrap_or_else(|| self.config.keymap.status_hint())
    }

    #[must_use]
    pub fn is_open(&self, name: &str) -> bool {
        self.arena.contains(name)
    }

    #[must_use]
    pub fn state(&self, name: &str) -> WorkflowState {
        match self.arena.get(name) {
            Some(panel) => WorkflowState::Open {
                editable: panel.editable,
            },
            None => WorkflowState::Closed,
        }
    }

    #[must_use]
    pub fn panel(&self, name: &str) -> Option<&Panel> {
        self.arena.get(name)
    }

    /// Live modal panels, oldest first.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.arena.iter()
    }

    /// Panel with focus, modal or base.
    #[must_use]
    pub fn focused(&self) -> Option<&PanelName> {
        self.focus.current()
    }

    /// Whether any modal panel is open.
    #[must_use]
    pub fn has_modal(&self) -> bool {
        !self.focus.is_empty()
    }

    #[must_use]
    pub fn focus_stack(&self) -> &FocusStack {
        &self.focus
    }

    #[must_use]
    pub fn router(&self) -> &KeybindingRouter<PanelCommand> {
        &self.router
    }

    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut Journal {
        &mut self.journal
    }

    // ========================================================================
    // Base focus
    // ========================================================================

    /// Move focus between base panels. Refused while a modal panel is open.
    pub fn focus_base<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        name: impl Into<PanelName>,
    ) -> crate::backend::BackendResult<bool> {
        if self.has_modal() {
            return Ok(false);
        }
        let name = name.into();
        backend.set_focus(Some(&name))?;
        self.focus.set_current(Some(name));
        Ok(true)
    }

    // ========================================================================
    // Opening
    // ========================================================================

    /// Open a modal panel, replacing any live panel with the same name.
    pub fn open<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        request: ConfirmationRequest,
    ) -> Result<(), OpenError> {
        let content = request.initial_content();
        let ConfirmationRequest {
            name,
            kind,
            title,
            on_confirm,
            on_cancel,
            multiline,
            return_focus,
            draft,
            ..
        } = request;

        let span = debug_span!("panel.open", panel = %name, kind = %kind);
        let _guard = span.enter();

        if self.arena.contains(name.as_str()) {
            debug!(panel = %name, "replacing live panel");
            self.journal.push(LifecycleEvent::Replaced {
                panel: name.clone(),
            });
            self.teardown(backend, &name)?;
        }

        let origin = return_focus.or_else(|| self.focus.current().cloned());
        let bounds = compute_bounds(&content, backend.size());
        let panel = Panel {
            name: name.clone(),
            title,
            bounds,
            kind,
            style: kind.style(),
            editable: kind.editable(),
            buffer: TextBuffer::with_text(content),
        };

        backend
            .create_panel(&name, bounds)
            .map_err(|source| OpenError::Rejected {
                panel: name.clone(),
                source,
            })?;
        if let Err(source) = backend.update_panel(panel.view()) {
            self.rollback_open(backend, &name);
            return Err(OpenError::Rejected { panel: name, source });
        }
        self.arena.insert(panel).map_err(OpenError::Occupied)?;

        self.focus.record_and_switch(origin, name.clone());
        let keymap = self.config.keymap;
        self.router.bind(&name, keymap.accept, PanelCommand::Accept);
        self.router.bind(&name, keymap.cancel, PanelCommand::Cancel);
        if multiline {
            self.router.bind(&name, keymap.newline, PanelCommand::Newline);
        }
        self.workflows.insert(
            name.clone(),
            Workflow {
                on_confirm,
                on_cancel,
                draft,
            },
        );

        let hint = self.status_hint();
        let configured = backend
            .set_focus(Some(&name))
            .and_then(|()| backend.set_status(&hint));
        if let Err(source) = configured {
            self.rollback_open(backend, &name);
            return Err(OpenError::Rejected { panel: name, source });
        }

        let depth = self.focus.depth();
        debug!(panel = %name, depth, "panel opened");
        self.journal.push(LifecycleEvent::Opened {
            panel: name,
            kind,
            depth,
        });
        Ok(())
    }

    /// Undo whatever part of an open got registered. Best effort.
    fn rollback_open<B: Backend + ?Sized>(&mut self, backend: &mut B, name: &PanelName) {
        warn!(panel = %name, "rolling back partially opened panel");
        self.router.unbind_all(name.as_str());
        self.workflows.remove(name.as_str());
        self.arena.remove(name.as_str());
        if self.focus.release(name).is_ok() {
            let _ = backend.set_focus(self.focus.current());
        }
        let _ = backend.destroy_panel(name);
        self.journal.push(LifecycleEvent::RolledBack {
            panel: name.clone(),
        });
    }

    /// Open an error panel over whatever has focus.
    pub fn show_error<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        message: impl AsRef<str>,
    ) -> Result<(), OpenError> {
        self.open(backend, ConfirmationRequest::error(message))
    }

    /// Open an informational panel over whatever has focus.
    pub fn show_message<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<(), OpenError> {
        self.open(backend, ConfirmationRequest::message(title, body))
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Offer a key to the focused modal panel.
    pub fn handle_key<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        key: KeyEvent,
    ) -> FatalResult<Dispatch> {
        if !key.is_actionable() {
            return Ok(Dispatch::Unhandled);
        }
        let Some(focused) = self.focus.current().cloned() else {
            return Ok(Dispatch::Unhandled);
        };
        if !self.arena.contains(focused.as_str()) {
            return Ok(Dispatch::Unhandled);
        }

        let command = self
            .router
            .lookup(Some(&focused), Trigger::from(key))
            .map(|(_, command)| *command);
        match command {
            Some(PanelCommand::Accept) => self
                .finish(backend, &focused, Branch::Confirm)
                .map(Dispatch::Handled),
            Some(PanelCommand::Cancel) => self
                .finish(backend, &focused, Branch::Cancel)
                .map(Dispatch::Handled),
            Some(PanelCommand::Newline) => {
                self.insert_newline(backend, &focused)?;
                Ok(Dispatch::Handled(Effect::None))
            }
            None => {
                if self.edit(backend, &focused, key)? {
                    Ok(Dispatch::Handled(Effect::None))
                } else {
                    Ok(Dispatch::Unhandled)
                }
            }
        }
    }

    /// Insert pasted text into the focused editable panel.
    ///
    /// Newlines are kept only where multiline input is bound.
    pub fn paste<B: Backend + ?Sized>(&mut self, backend: &mut B, text: &str) -> FatalResult<bool> {
        let Some(focused) = self.focus.current().cloned() else {
            return Ok(false);
        };
        let multiline = self
            .router
            .triggers(focused.as_str())
            .any(|t| t == self.config.keymap.newline);
        let Some(panel) = self.arena.get_mut(focused.as_str()) else {
            return Ok(false);
        };
        if !panel.editable {
            return Ok(false);
        }
        if multiline {
            panel.buffer.insert_str(text);
        } else {
            panel.buffer.insert_str(&text.replace(['\r', '\n'], " "));
        }
        self.refresh(backend, &focused)?;
        Ok(true)
    }

    fn edit<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        name: &PanelName,
        key: KeyEvent,
    ) -> FatalResult<bool> {
        let Some(panel) = self.arena.get_mut(name.as_str()) else {
            return Ok(false);
        };
        if !panel.editable {
            return Ok(false);
        }
        let buffer = &mut panel.buffer;
        if let Some(ch) = key.printable() {
            buffer.insert_char(ch);
        } else {
            match key.code {
                KeyCode::Backspace => {
                    buffer.delete_backward();
                }
                KeyCode::Delete => {
                    buffer.delete_forward();
                }
                KeyCode::Left => buffer.move_left(),
                KeyCode::Right => buffer.move_right(),
                KeyCode::Home => buffer.move_line_start(),
                KeyCode::End => buffer.move_line_end(),
                _ => return Ok(false),
            }
        }
        self.refresh(backend, name)?;
        Ok(true)
    }

    /// Grow the panel by one row, then insert the newline.
    fn insert_newline<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        name: &PanelName,
    ) -> FatalResult<()> {
        let screen = backend.size();
        let Some(panel) = self.arena.get_mut(name.as_str()) else {
            return Ok(());
        };
        let bounds = newline_bounds(panel.content(), screen);
        backend
            .resize_panel(name, bounds)
            .map_err(|source| Fatal::Render {
                panel: name.clone(),
                source,
            })?;
        panel.bounds = bounds;
        self.journal.push(LifecycleEvent::Resized {
            panel: name.clone(),
            bounds,
        });
        panel.buffer.insert_newline();
        backend
            .update_panel(panel.view())
            .map_err(|source| Fatal::Render {
                panel: name.clone(),
                source,
            })
    }

    /// Refit the panel's height to its content and redraw it.
    fn refresh<B: Backend + ?Sized>(&mut self, backend: &mut B, name: &PanelName) -> FatalResult<()> {
        let screen = backend.size();
        let Some(panel) = self.arena.get_mut(name.as_str()) else {
            return Ok(());
        };
        if let Some(bounds) = fit_height(panel.bounds, panel.content(), screen) {
            backend
                .resize_panel(name, bounds)
                .map_err(|source| Fatal::Render {
                    panel: name.clone(),
                    source,
                })?;
            panel.bounds = bounds;
            self.journal.push(LifecycleEvent::Resized {
                panel: name.clone(),
                bounds,
            });
        }
        backend
            .update_panel(panel.view())
            .map_err(|source| Fatal::Render {
                panel: name.clone(),
                source,
            })
    }

    /// Recompute every live panel's bounds for the backend's current size.
    pub fn relayout<B: Backend + ?Sized>(&mut self, backend: &mut B) -> FatalResult<()> {
        let screen = backend.size();
        let names: Vec<PanelName> = self.arena.names().cloned().collect();
        for name in names {
            let Some(panel) = self.arena.get_mut(name.as_str()) else {
                continue;
            };
            let bounds = compute_bounds(panel.content(), screen);
            if bounds == panel.bounds {
                continue;
            }
            backend
                .resize_panel(&name, bounds)
                .map_err(|source| Fatal::Render {
                    panel: name.clone(),
                    source,
                })?;
            panel.bounds = bounds;
            self.journal.push(LifecycleEvent::Resized {
                panel: name,
                bounds,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Closing
    // ========================================================================

    /// Run `branch`'s handler for `name`, then tear the panel down.
    pub fn finish<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        name: &PanelName,
        branch: Branch,
    ) -> FatalResult<Effect> {
        let Some(mut workflow) = self.workflows.remove(name.as_str()) else {
            return Ok(Effect::None);
        };
        let content = self
            .arena
            .get(name.as_str())
            .map(|p| p.content().to_owned())
            .unwrap_or_default();

        let handler = match branch {
            Branch::Confirm => workflow.on_confirm.take(),
            Branch::Cancel => workflow.on_cancel.take(),
        };
        let effect = match handler {
            Some(handler) => {
                let ctx = HandlerContext {
                    panel: name,
                    content: &content,
                };
                handler(&ctx).map_err(|source| Fatal::Handler {
                    panel: name.clone(),
                    branch,
                    source,
                })?
            }
            None => Effect::None,
        };

        if let Some(draft) = &workflow.draft {
            match branch {
                Branch::Confirm => draft.clear(),
                Branch::Cancel => draft.store(&content),
            }
        }
        self.journal.push(LifecycleEvent::HandlerRan {
            panel: name.clone(),
            branch,
        });

        self.teardown(backend, name)?;
        Ok(effect)
    }

    /// Close `name` without running any handler. Returns `false` if it was not open.
    pub fn close<B: Backend + ?Sized>(&mut self, backend: &mut B, name: &str) -> FatalResult<bool> {
        if !self.arena.contains(name) {
            return Ok(false);
        }
        self.teardown(backend, &PanelName::new(name))?;
        Ok(true)
    }

    /// Close every modal panel, newest first, without running handlers.
    pub fn close_all<B: Backend + ?Sized>(&mut self, backend: &mut B) -> FatalResult<usize> {
        let names: Vec<PanelName> = self.arena.names().rev().cloned().collect();
        for name in &names {
            self.teardown(backend, name)?;
        }
        Ok(names.len())
    }

    /// The only teardown path.
    fn teardown<B: Backend + ?Sized>(&mut self, backend: &mut B, name: &PanelName) -> FatalResult<()> {
        let span = debug_span!("panel.teardown", panel = %name);
        let _guard = span.enter();

        let bindings = self.router.unbind_all(name.as_str());
        self.workflows.remove(name.as_str());
        self.journal.push(LifecycleEvent::Unbound {
            panel: name.clone(),
            bindings,
        });

        backend
            .destroy_panel(name)
            .map_err(|source| Fatal::Teardown {
                panel: name.clone(),
                source,
            })?;
        self.arena.remove(name.as_str());
        self.journal.push(LifecycleEvent::Destroyed {
            panel: name.clone(),
        });

        let restored = self.focus.release(name)?;
        backend
            .set_focus(restored.as_ref())
            .map_err(|source| Fatal::Teardown {
                panel: name.clone(),
                source,
            })?;
        debug!(panel = %name, depth = self.focus.depth(), "panel closed");
        self.journal.push(LifecycleEvent::FocusRestored {
            panel: name.clone(),
            focus: restored,
        });
        Ok(())
    }
}
