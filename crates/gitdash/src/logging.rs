#![forbid(unsafe_code)]

//! Subscriber setup.
//!
//! While the UI owns the terminal nothing may be written to it, so logs go
//! to the file named by `GITDASH_LOG_FILE` or nowhere. Headless runs have no
//! screen to protect and fall back to stderr.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Off,
}

impl<'a> LogTarget<'a> {
    /// Pick a target for a run.
    #[must_use]
    pub fn choose(log_file: Option<&'a Path>, headless: bool) -> Self {
        match (log_file, headless) {
            (Some(path), _) => LogTarget::File(path),
            (None, true) => LogTarget::Stderr,
            (None, false) => LogTarget::Off,
        }
    }
}

/// Parse `directive`, falling back to `info` when it is malformed.
#[must_use]
pub fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
pub fn init(target: LogTarget<'_>, directive: &str) -> io::Result<()> {
    let registry = tracing_subscriber::registry().with(filter(directive));
    let installed = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => registry
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()
        }
    };
    installed.map_err(io::Error::other)
}
