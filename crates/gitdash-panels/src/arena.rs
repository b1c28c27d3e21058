#![forbid(unsafe_code)]

//! Live modal panels keyed by name.
//!
//! The arena enforces the single-instance rule: [`PanelArena::insert`]
//! refuses a name that is already live. Replacing a panel therefore always
//! goes through an explicit teardown first, which the controller performs.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use gitdash_core::geometry::Bounds;

use crate::editor::{CursorPosition, TextBuffer};
use crate::request::PanelKind;

/// Stable, unique panel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelName(Arc<str>);

impl PanelName {
    /// Reserved name shared by confirmation, message and error panels.
    pub const CONFIRMATION: &'static str = "confirmation";

    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PanelName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for PanelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PanelName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for PanelName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// How a panel's content is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelStyle {
    #[default]
    Normal,
    /// Error text (red foreground).
    Error,
}

/// A live modal panel.
#[derive(Debug, Clone)]
pub struct Panel {
    pub name: PanelName,
    pub title: String,
    pub bounds: Bounds,
    pub kind: PanelKind,
    pub style: PanelStyle,
    pub editable: bool,
    pub buffer: TextBuffer,
}

impl Panel {
    /// Current content.
    #[must_use]
    pub fn content(&self) -> &str {
        self.buffer.text()
    }

    /// Borrowed snapshot for a rendering backend.
    #[must_use]
    pub fn view(&self) -> PanelView<'_> {
        PanelView {
            name: &self.name,
            title: &self.title,
            content: self.buffer.text(),
            style: self.style,
            cursor: self.editable.then(|| self.buffer.cursor_position()),
        }
    }
}

/// What a backend needs to draw a panel's title and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelView<'a> {
    pub name: &'a PanelName,
    pub title: &'a str,
    pub content: &'a str,
    pub style: PanelStyle,
    /// Cursor to show, for editable panels only.
    pub cursor: Option<CursorPosition>,
}

/// Refusal to insert a second panel under a live name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupied(pub PanelName);

impl fmt::Display for Occupied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel {} is already open", self.0)
    }
}

impl std::error::Error for Occupied {}

/// Name-keyed store of live panels, remembering open order.
#[derive(Debug, Default)]
pub struct PanelArena {
    panels: HashMap<PanelName, Panel>,
    order: Vec<PanelName>,
}

impl PanelArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a panel. Fails if its name is already live.
    pub fn insert(&mut self, panel: Panel) -> Result<(), Occupied> {
        if self.panels.contains_key(&panel.name) {
            return Err(Occupied(panel.name));
        }
        self.order.push(panel.name.clone());
        self.panels.insert(panel.name.clone(), panel);
        Ok(())
    }

    /// Remove and return a panel.
    pub fn remove(&mut self, name: &str) -> Option<Panel> {
        let panel = self.panels.remove(name)?;
        self.order.retain(|n| n.as_str() != name);
        Some(panel)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.panels.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Panel> {
        self.panels.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Panel> {
        self.panels.get_mut(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Names in the order their panels were opened, oldest first.
    pub fn names(&self) -> impl DoubleEndedIterator<Item = &PanelName> {
        self.order.iter()
    }

    /// Panels in open order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Panel> {
        self.order.iter().filter_map(|name| self.panels.get(name))
    }
}
