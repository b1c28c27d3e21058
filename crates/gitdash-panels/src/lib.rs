#![forbid(unsafe_code)]

//! Modal panel engine for the gitdash dashboard.
//!
//! # Role
//! Everything between "a key arrived" and "a backend draws a box": the
//! arena of live modal panels, the focus stack that remembers where focus
//! goes back to, the scoped keybinding router, and the controller that
//! drives confirmation, prompt, message and error panels through their
//! lifecycle.
//!
//! # Primary responsibilities
//! - **Controller**: open, edit, confirm, cancel, replace and tear down
//!   modal panels through one teardown path.
//! - **FocusStack**: strict LIFO focus history.
//! - **KeybindingRouter**: per-panel scopes plus a global scope.
//! - **Backend**: the capability set a renderer must provide;
//!   [`HeadlessBackend`] records calls for tests and replay.
//!
//! # How it fits in the system
//! `gitdash-layout` computes the geometry, this crate owns the state, and
//! `gitdash-runtime` feeds it events and applies the [`Effect`]s handlers
//! return.

pub mod arena;
pub mod backend;
pub mod controller;
pub mod editor;
pub mod effect;
pub mod error;
pub mod focus;
pub mod journal;
pub mod keybinding;
pub mod request;

pub use arena::{Panel, PanelArena, PanelName, PanelStyle, PanelView};
pub use backend::{Backend, BackendCall, BackendError, BackendResult, HeadlessBackend};
pub use controller::{Branch, Controller, ControllerConfig, Dispatch, PanelCommand, WorkflowState};
pub use editor::{CursorPosition, TextBuffer};
pub use effect::{Action, ActionError, ActionResult, ActionTask, Effect};
pub use error::{Fatal, FatalResult, OpenError};
pub use focus::{FocusError, FocusStack, FocusStackEntry};
pub use journal::{Journal, LifecycleEvent};
pub use keybinding::{KeybindingRouter, Keymap, Scope, Trigger};
pub use request::{
    ConfirmationRequest, Handler, HandlerContext, HandlerError, HandlerResult, PanelKind,
    PromptDraft,
};
