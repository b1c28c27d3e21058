#![forbid(unsafe_code)]

//! Focus stack.
//!
//! Every modal open pushes exactly one entry recording who had focus before
//! it; every close pops exactly one. The stack depth therefore equals the
//! number of nested modal panels.
//!
//! # Invariants
//!
//! 1. `restore` is strictly LIFO: it returns the `previous` of the most
//!    recently pushed entry and makes it current.
//! 2. Restoring from an empty stack is a [`FocusError::Underflow`], never a
//!    silent no-op.
//! 3. [`FocusStack::release`] closes a panel that may not be on top (forced
//!    replacement of a buried panel). The entry above it inherits its
//!    `previous`, so the chain of returns stays intact and the current focus
//!    does not move.

use std::fmt;

use crate::arena::PanelName;

/// One pushed record: `owner` took focus from `previous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusStackEntry {
    pub owner: PanelName,
    pub previous: Option<PanelName>,
}

/// Focus stack misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusError {
    /// `restore` called with nothing pushed.
    Underflow,
    /// `release` named a panel that never pushed an entry.
    NotOnStack(PanelName),
}

impl fmt::Display for FocusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underflow => write!(f, "focus restore with an empty focus stack"),
            Self::NotOnStack(name) => write!(f, "panel {name} has no focus stack entry"),
        }
    }
}

impl std::error::Error for FocusError {}

/// LIFO focus history plus the currently focused panel.
#[derive(Debug, Default)]
pub struct FocusStack {
    current: Option<PanelName>,
    entries: Vec<FocusStackEntry>,
}

impl FocusStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel that currently has focus.
    #[must_use]
    pub fn current(&self) -> Option<&PanelName> {
        self.current.as_ref()
    }

    /// Number of pushed entries.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pushed entries, bottom first.
    #[must_use]
    pub fn entries(&self) -> &[FocusStackEntry] {
        &self.entries
    }

    /// Move focus between base panels without pushing anything.
    pub fn set_current(&mut self, name: Option<PanelName>) {
        self.current = name;
    }

    /// Push `from` and give focus to `to`.
    pub fn record_and_switch(&mut self, from: Option<PanelName>, to: PanelName) {
        self.entries.push(FocusStackEntry {
            owner: to.clone(),
            previous: from,
        });
        self.current = Some(to);
    }

    /// Pop the most recent entry and return focus to its `previous`.
    pub fn restore(&mut self) -> Result<Option<PanelName>, FocusError> {
        let entry = self.entries.pop().ok_or(FocusError::Underflow)?;
        self.current = entry.previous.clone();
        Ok(entry.previous)
    }

    /// Pop the entry pushed by `owner`, wherever it sits.
    ///
    /// On top this is exactly [`restore`](Self::restore). Below the top the
    /// entry is spliced out and the current focus is returned unchanged.
    pub fn release(&mut self, owner: &PanelName) -> Result<Option<PanelName>, FocusError> {
        let idx = self
            .entries
            .iter()
            .rposition(|e| &e.owner == owner)
            .ok_or_else(|| FocusError::NotOnStack(owner.clone()))?;
        if idx + 1 == self.entries.len() {
            return self.restore();
        }
        let removed = self.entries.remove(idx);
        if let Some(above) = self.entries.get_mut(idx) {
            if above.previous.as_ref() == Some(owner) {
                above.previous = removed.previous;
            }
        }
        Ok(self.current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PanelName {
        PanelName::new(s)
    }

    #[test]
    fn restore_returns_previous() {
        let mut stack = FocusStack::new();
        stack.set_current(Some(name("files")));
        stack.record_and_switch(Some(name("files")), name("confirmation"));
        assert_eq!(stack.current(), Some(&name("confirmation")));
        assert_eq!(stack.restore(), Ok(Some(name("files"))));
        assert_eq!(stack.current(), Some(&name("files")));
        assert!(stack.is_empty());
    }

    #[test]
    fn restore_on_empty_is_an_error() {
        let mut stack = FocusStack::new();
        assert_eq!(stack.restore(), Err(FocusError::Underflow));
    }

    #[test]
    fn nested_restore_is_lifo() {
        let mut stack = FocusStack::new();
        stack.record_and_switch(Some(name("files")), name("a"));
        stack.record_and_switch(Some(name("a")), name("b"));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.restore(), Ok(Some(name("a"))));
        assert_eq!(stack.restore(), Ok(Some(name("files"))));
    }

    #[test]
    fn release_buried_entry_relinks_chain() {
        let mut stack = FocusStack::new();
        stack.record_and_switch(Some(name("files")), name("a"));
        stack.record_and_switch(Some(name("a")), name("b"));
        assert_eq!(stack.release(&name("a")), Ok(Some(name("b"))));
        assert_eq!(stack.current(), Some(&name("b")));
        assert_eq!(stack.restore(), Ok(Some(name("files"))));
    }

    #[test]
    fn release_unknown_owner() {
        let mut stack = FocusStack::new();
        assert_eq!(
            stack.release(&name("ghost")),
            Err(FocusError::NotOnStack(name("ghost")))
        );
    }
}
