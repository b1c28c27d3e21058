#![forbid(unsafe_code)]

//! gitdash: a terminal dashboard for everyday git operations.
//!
//! The binary wires [`app::GitDashboard`] into the `gitdash-runtime` loop,
//! either on the terminal or headlessly from a key script.

pub mod actions;
pub mod app;
pub mod cli;
pub mod logging;
