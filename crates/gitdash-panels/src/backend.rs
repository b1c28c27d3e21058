#![forbid(unsafe_code)]

//! Rendering backend capabilities.
//!
//! The controller never draws. It describes panels through [`Backend`] and a
//! backend decides how they look: the terminal backend in the runtime crate
//! paints framed boxes with crossterm, [`HeadlessBackend`] just records.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;

use gitdash_core::geometry::{Bounds, ScreenSize};

use crate::arena::{PanelName, PanelStyle, PanelView};
use crate::editor::CursorPosition;

/// Errors reported by a backend.
#[derive(Debug)]
pub enum BackendError {
    /// Operation on a panel the backend does not know.
    UnknownPanel(PanelName),
    /// `create_panel` for a name that is already drawn.
    AlreadyExists(PanelName),
    /// Bounds the backend refuses to draw.
    InvalidBounds { panel: PanelName, bounds: Bounds },
    /// Terminal I/O failed.
    Io(io::Error),
    /// Anything else, described.
    Other(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPanel(name) => write!(f, "unknown panel {name}"),
            Self::AlreadyExists(name) => write!(f, "panel {name} already exists"),
            Self::InvalidBounds { panel, bounds } => write!(
                f,
                "invalid bounds for panel {panel}: ({}, {}) - ({}, {})",
                bounds.x0, bounds.y0, bounds.x1, bounds.y1
            ),
            Self::Io(e) => write!(f, "terminal I/O error: {e}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BackendError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// What the panel engine needs from a renderer.
pub trait Backend {
    /// Current screen size.
    fn size(&self) -> ScreenSize;

    /// Create an empty framed panel.
    fn create_panel(&mut self, name: &PanelName, bounds: Bounds) -> BackendResult<()>;

    /// Set a panel's title, content, style and cursor.
    fn update_panel(&mut self, view: PanelView<'_>) -> BackendResult<()>;

    /// Move or resize an existing panel.
    fn resize_panel(&mut self, name: &PanelName, bounds: Bounds) -> BackendResult<()>;

    /// Remove a panel.
    fn destroy_panel(&mut self, name: &PanelName) -> BackendResult<()>;

    /// Give input focus to a panel, or to nothing.
    fn set_focus(&mut self, name: Option<&PanelName>) -> BackendResult<()>;

    /// Replace the status line text.
    fn set_status(&mut self, text: &str) -> BackendResult<()>;

    /// Flush pending drawing. Backends that draw eagerly need not override.
    fn present(&mut self) -> BackendResult<()> {
        Ok(())
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreatePanel { name: PanelName, bounds: Bounds },
    UpdatePanel { name: PanelName, content: String },
    ResizePanel { name: PanelName, bounds: Bounds },
    DestroyPanel { name: PanelName },
    SetFocus(Option<PanelName>),
    SetStatus(String),
}

/// Panel state as the headless backend last saw it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeadlessPanel {
    pub bounds: Bounds,
    pub title: String,
    pub content: String,
    pub style: PanelStyle,
    pub cursor: Option<CursorPosition>,
}

/// Backend that draws nothing and records everything.
///
/// Used by tests and by headless key replay. Failures can be injected per
/// panel name to exercise rollback and fatal teardown paths.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    size: ScreenSize,
    panels: HashMap<PanelName, HeadlessPanel>,
    focus: Option<PanelName>,
    status: String,
    calls: Vec<BackendCall>,
    fail_create: HashSet<String>,
    fail_update: HashSet<String>,
    fail_destroy: HashSet<String>,
    fail_focus: bool,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new(size: ScreenSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Simulate a terminal resize.
    pub fn set_size(&mut self, size: ScreenSize) {
        self.size = size;
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    #[must_use]
    pub fn panel(&self, name: &str) -> Option<&HeadlessPanel> {
        self.panels.get(name)
    }

    #[must_use]
    pub fn has_panel(&self, name: &str) -> bool {
        self.panels.contains_key(name)
    }

    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn focus(&self) -> Option<&PanelName> {
        self.focus.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Make `create_panel` fail for `name`.
    pub fn fail_create_for(&mut self, name: &str) {
        self.fail_create.insert(name.to_owned());
    }

    /// Make `update_panel` fail for `name`.
    pub fn fail_update_for(&mut self, name: &str) {
        self.fail_update.insert(name.to_owned());
    }

    /// Make `destroy_panel` fail for `name`.
    pub fn fail_destroy_for(&mut self, name: &str) {
        self.fail_destroy.insert(name.to_owned());
    }

    /// Make every `set_focus` fail.
    pub fn fail_set_focus(&mut self, fail: bool) {
        self.fail_focus = fail;
    }

    fn injected(name: &PanelName, op: &str) -> BackendError {
        BackendError::Other(format!("injected {op} failure for {name}"))
    }
}

impl Backend for HeadlessBackend {
    fn size(&self) -> ScreenSize {
        self.size
    }

    fn create_panel(&mut self, name: &PanelName, bounds: Bounds) -> BackendResult<()> {
        self.calls.push(BackendCall::CreatePanel {
            name: name.clone(),
            bounds,
        });
        if self.fail_create.contains(name.as_str()) {
            return Err(Self::injected(name, "create"));
        }
        if self.panels.contains_key(name) {
            return Err(BackendError::AlreadyExists(name.clone()));
        }
        self.panels.insert(
            name.clone(),
            HeadlessPanel {
                bounds,
                ..HeadlessPanel::default()
            },
        );
        Ok(())
    }

    fn update_panel(&mut self, view: PanelView<'_>) -> BackendResult<()> {
        self.calls.push(BackendCall::UpdatePanel {
            name: view.name.clone(),
            content: view.content.to_owned(),
        });
        if self.fail_update.contains(view.name.as_str()) {
            return Err(Self::injected(view.name, "update"));
        }
        let panel = self
            .panels
            .get_mut(view.name)
            .ok_or_else(|| BackendError::UnknownPanel(view.name.clone()))?;
        panel.title = view.title.to_owned();
        panel.content = view.content.to_owned();
        panel.style = view.style;
        panel.cursor = view.cursor;
        Ok(())
    }

    fn resize_panel(&mut self, name: &PanelName, bounds: Bounds) -> BackendResult<()> {
        self.calls.push(BackendCall::ResizePanel {
            name: name.clone(),
            bounds,
        });
        let panel = self
            .panels
            .get_mut(name)
            .ok_or_else(|| BackendError::UnknownPanel(name.clone()))?;
        panel.bounds = bounds;
        Ok(())
    }

    fn destroy_panel(&mut self, name: &PanelName) -> BackendResult<()> {
        self.calls.push(BackendCall::DestroyPanel { name: name.clone() });
        if self.fail_destroy.contains(name.as_str()) {
            return Err(Self::injected(name, "destroy"));
        }
        self.panels
            .remove(name)
            .map(drop)
            .ok_or_else(|| BackendError::UnknownPanel(name.clone()))
    }

    fn set_focus(&mut self, name: Option<&PanelName>) -> BackendResult<()> {
        self.calls.push(BackendCall::SetFocus(name.cloned()));
        if self.fail_focus {
            return Err(BackendError::Other("injected focus failure".into()));
        }
        self.focus = name.cloned();
        Ok(())
    }

    fn set_status(&mut self, text: &str) -> BackendResult<()> {
        self.calls.push(BackendCall::SetStatus(text.to_owned()));
        text.clone_into(&mut self.status);
        Ok(())
    }
}
