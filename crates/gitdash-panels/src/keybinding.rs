#![forbid(unsafe_code)]

//! Scoped keybinding router.
//!
//! Bindings live in scopes. Each modal panel gets its own scope, keyed by
//! panel name, and there is one global scope for bindings that fire
//! regardless of focus. Lookup consults the focused panel's scope first and
//! falls back to the global one, so a modal panel's Enter wins over any
//! global Enter while it has focus.
//!
//! Handlers are generic: the panel controller stores small command values,
//! the dashboard stores its own action enum.

use std::collections::HashMap;
use std::fmt;

use gitdash_core::event::{KeyCode, KeyEvent, Modifiers};

use crate::arena::PanelName;

/// Normalized key used as a binding key.
///
/// Shift is dropped for character keys since the character already carries
/// the case (`Q` arrives as `Char('Q')` with or without the shift flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl Trigger {
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Plain character trigger.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }
}

impl From<KeyEvent> for Trigger {
    fn from(key: KeyEvent) -> Self {
        let modifiers = match key.code {
            KeyCode::Char(_) => key.modifiers - Modifiers::SHIFT,
            _ => key.modifiers,
        };
        Self {
            code: key.code,
            modifiers,
        }
    }
}

impl From<KeyCode> for Trigger {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&KeyEvent::new(self.code).with_modifiers(self.modifiers), f)
    }
}

/// Where a binding lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Panel(PanelName),
}

/// The three triggers every confirmation or prompt panel binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    pub accept: Trigger,
    /// Bound only on panels that allow multiline input.
    pub newline: Trigger,
    pub cancel: Trigger,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            accept: Trigger::new(KeyCode::Enter),
            newline: Trigger::new(KeyCode::Tab),
            cancel: Trigger::new(KeyCode::Escape),
        }
    }
}

impl Keymap {
    /// Hint shown in the status line while a modal panel is open.
    #[must_use]
    pub fn status_hint(&self) -> String {
        format!("{}: close, {}: confirm", self.cancel, self.accept)
    }
}

/// Scoped trigger-to-handler tables.
#[derive(Debug)]
pub struct KeybindingRouter<H> {
    global: HashMap<Trigger, H>,
    panels: HashMap<PanelName, HashMap<Trigger, H>>,
}

impl<H> Default for KeybindingRouter<H> {
    fn default() -> Self {
        Self {
            global: HashMap::new(),
            panels: HashMap::new(),
        }
    }
}

impl<H> KeybindingRouter<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `trigger` in `panel`'s scope. Returns the handler it displaced.
    pub fn bind(&mut self, panel: &PanelName, trigger: impl Into<Trigger>, handler: H) -> Option<H> {
        self.panels
            .entry(panel.clone())
            .or_default()
            .insert(trigger.into(), handler)
    }

    /// Bind `trigger` in the global scope. Returns the handler it displaced.
    pub fn bind_global(&mut self, trigger: impl Into<Trigger>, handler: H) -> Option<H> {
        self.global.insert(trigger.into(), handler)
    }

    /// Drop `panel`'s whole scope. Returns how many bindings it held.
    pub fn unbind_all(&mut self, panel: &str) -> usize {
        self.panels.remove(panel).map_or(0, |scope| scope.len())
    }

    /// Resolve a trigger for the given focus: panel scope, then global.
    #[must_use]
    pub fn lookup(&self, focus: Option<&PanelName>, trigger: Trigger) -> Option<(Scope, &H)> {
        if let Some(name) = focus {
            if let Some(handler) = self.panels.get(name).and_then(|s| s.get(&trigger)) {
                return Some((Scope::Panel(name.clone()), handler));
            }
        }
        self.global.get(&trigger).map(|h| (Scope::Global, h))
    }

    /// Whether `panel` has any bindings.
    #[must_use]
    pub fn has_scope(&self, panel: &str) -> bool {
        self.panels.contains_key(panel)
    }

    /// Number of bindings in `panel`'s scope.
    #[must_use]
    pub fn scope_len(&self, panel: &str) -> usize {
        self.panels.get(panel).map_or(0, HashMap::len)
    }

    /// Triggers bound in `panel`'s scope, in no particular order.
    pub fn triggers(&self, panel: &str) -> impl Iterator<Item = Trigger> + '_ {
        self.panels
            .get(panel)
            .into_iter()
            .flat_map(|scope| scope.keys().copied())
    }

    /// Number of panel scopes currently registered.
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.panels.len()
    }
}
