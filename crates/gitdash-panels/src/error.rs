#![forbid(unsafe_code)]

//! Controller error types.
//!
//! Two families. [`OpenError::Rejected`] is recoverable: the backend refused
//! to configure a panel and nothing was left registered. [`Fatal`] means the
//! panel engine's bookkeeping can no longer be trusted; the runtime restores
//! the terminal and exits.

use std::fmt;

use crate::arena::{Occupied, PanelName};
use crate::backend::BackendError;
use crate::controller::Branch;
use crate::focus::FocusError;
use crate::request::HandlerError;

/// Unrecoverable controller failure.
#[derive(Debug)]
pub enum Fatal {
    /// A confirm or cancel handler returned an error.
    Handler {
        panel: PanelName,
        branch: Branch,
        source: HandlerError,
    },
    /// The backend failed while a panel was being torn down.
    Teardown {
        panel: PanelName,
        source: BackendError,
    },
    /// The backend failed to resize or redraw an open panel.
    Render {
        panel: PanelName,
        source: BackendError,
    },
    /// Focus restore without a matching push.
    Focus(FocusError),
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler {
                panel,
                branch,
                source,
            } => write!(f, "{branch} handler for panel {panel} failed: {source}"),
            Self::Teardown { panel, source } => {
                write!(f, "failed to tear down panel {panel}: {source}")
            }
            Self::Render { panel, source } => write!(f, "failed to redraw panel {panel}: {source}"),
            Self::Focus(e) => write!(f, "focus stack corrupted: {e}"),
        }
    }
}

impl std::error::Error for Fatal {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Handler { source, .. } => Some(source),
            Self::Teardown { source, .. } | Self::Render { source, .. } => Some(source),
            Self::Focus(e) => Some(e),
        }
    }
}

impl From<FocusError> for Fatal {
    fn from(e: FocusError) -> Self {
        Self::Focus(e)
    }
}

/// Failure to open a panel.
#[derive(Debug)]
pub enum OpenError {
    /// The backend refused the panel. Nothing was registered.
    Rejected {
        panel: PanelName,
        source: BackendError,
    },
    /// The name was still live after replacement.
    Occupied(Occupied),
    /// Tearing down the panel being replaced failed.
    Fatal(Fatal),
}

impl OpenError {
    /// Whether the session can carry on.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal(_))
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { panel, source } => write!(f, "could not open panel {panel}: {source}"),
            Self::Occupied(e) => write!(f, "{e}"),
            Self::Fatal(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OpenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected { source, .. } => Some(source),
            Self::Occupied(e) => Some(e),
            Self::Fatal(e) => Some(e),
        }
    }
}

impl From<Fatal> for OpenError {
    fn from(e: Fatal) -> Self {
        Self::Fatal(e)
    }
}

/// Result alias for fallible controller operations.
pub type FatalResult<T> = Result<T, Fatal>;
