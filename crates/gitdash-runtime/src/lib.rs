#![forbid(unsafe_code)]

//! gitdash runtime
//!
//! Ties the panel engine to a terminal and to the outcome channel.
//!
//! # Key Components
//!
//! - [`Session`] - Event dispatch between the panel controller and a [`Dashboard`]
//! - [`program::run`] - Interactive loop over a raw-mode terminal
//! - [`replay::run_replay`] - The same session driven by scripted keys, no terminal
//! - [`ActionRunner`] - Background threads for git actions, drained by the loop
//! - [`CrosstermBackend`] - Draws panels with crossterm
//! - [`TerminalSession`] - Raw-mode guard with panic and signal cleanup
//!
//! # How it fits in the system
//! `gitdash-panels` decides what is on screen and who has focus; this crate
//! decides when input is read, when actions run, and when the outcome is
//! recorded. The binary supplies the [`Dashboard`].

pub mod crossterm_backend;
pub mod error;
pub mod program;
pub mod replay;
pub mod session;
pub mod terminal_session;
pub mod worker;

pub use crossterm_backend::CrosstermBackend;
pub use error::{RuntimeError, RuntimeResult};
pub use program::ProgramConfig;
pub use replay::{ReplayConfig, ReplaySummary, parse_script};
pub use session::{Dashboard, Session};
pub use terminal_session::{SessionOptions, TerminalSession};
pub use worker::{ActionReport, ActionRunner};
