#![forbid(unsafe_code)]

//! Bounded record of panel lifecycle transitions.

use std::collections::VecDeque;

use gitdash_core::geometry::Bounds;

use crate::arena::PanelName;
use crate::controller::Branch;
use crate::request::PanelKind;

/// Default number of events kept.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 256;

/// One lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Panel reached `Open`; `depth` is the focus stack depth afterwards.
    Opened {
        panel: PanelName,
        kind: PanelKind,
        depth: usize,
    },
    /// A live panel is being torn down to make room for a new one.
    Replaced { panel: PanelName },
    /// Partial registration from a failed open was undone.
    RolledBack { panel: PanelName },
    /// A confirm or cancel handler ran successfully.
    HandlerRan { panel: PanelName, branch: Branch },
    /// The panel's keybinding scope was dropped.
    Unbound { panel: PanelName, bindings: usize },
    /// The panel was destroyed.
    Destroyed { panel: PanelName },
    /// Focus went back to `focus`.
    FocusRestored {
        panel: PanelName,
        focus: Option<PanelName>,
    },
    /// The panel's bounds changed.
    Resized { panel: PanelName, bounds: Bounds },
}

impl LifecycleEvent {
    /// Panel the event is about.
    #[must_use]
    pub fn panel(&self) -> &PanelName {
        match self {
            Self::Opened { panel, .. }
            | Self::Replaced { panel }
            | Self::RolledBack { panel }
            | Self::HandlerRan { panel, .. }
            | Self::Unbound { panel, .. }
            | Self::Destroyed { panel }
            | Self::FocusRestored { panel, .. }
            | Self::Resized { panel, .. } => panel,
        }
    }

    /// Whether this is one of the three teardown steps.
    #[must_use]
    pub fn is_teardown_step(&self) -> bool {
        matches!(
            self,
            Self::Unbound { .. } | Self::Destroyed { .. } | Self::FocusRestored { .. }
        )
    }
}

/// Ring buffer of [`LifecycleEvent`]s. Oldest events fall off the front.
#[derive(Debug, Clone)]
pub struct Journal {
    events: VecDeque<LifecycleEvent>,
    capacity: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_JOURNAL_CAPACITY)
    }
}

impl Journal {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_JOURNAL_CAPACITY)),
            capacity,
        }
    }

    pub fn push(&mut self, event: LifecycleEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LifecycleEvent> {
        self.events.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&mut self) -> Vec<LifecycleEvent> {
        self.events.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
