#![forbid(unsafe_code)]

//! The outcome record and its file format.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{OutcomeError, OutcomeResult};

/// Environment variable naming the outcome file.
pub const OUTCOME_PATH_ENV: &str = "GITDASH_OUTCOME_PATH";

/// How a supervised session ended.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionOutcome {
    #[serde(rename = "Success")]
    pub succeeded: bool,
    /// Failure text. Empty, and omitted from the file, on success.
    #[serde(rename = "Message", default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl SessionOutcome {
    #[must_use]
    pub fn success() -> Self {
        Self {
            succeeded: true,
            message: String::new(),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }
}

/// Point a child command's outcome channel at `path`.
pub fn configure_outcome_path<'a>(command: &'a mut Command, path: impl AsRef<Path>) -> &'a mut Command {
    command.env(OUTCOME_PATH_ENV, path.as_ref())
}

/// The configured outcome path of this process, if any.
#[must_use]
pub fn outcome_path_from_env() -> Option<PathBuf> {
    std::env::var_os(OUTCOME_PATH_ENV)
        .filter(|value| is_configured(Some(value)))
        .map(PathBuf::from)
}

/// Truncate `path` and write `outcome` as a single JSON object.
pub fn write_outcome(path: &Path, outcome: &SessionOutcome) -> OutcomeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, outcome)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    tracing::debug!(
        path = %path.display(),
        succeeded = outcome.succeeded,
        "wrote session outcome"
    );
    Ok(())
}

/// Read the outcome at `path`. `Ok(None)` if nothing has been written yet.
pub fn read_outcome(path: &Path) -> OutcomeResult<Option<SessionOutcome>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(OutcomeError::Io(e)),
    };
    let outcome = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        OutcomeError::Serialization(format!(
            "failed to parse outcome file {}: {e}",
            path.display()
        ))
    })?;
    Ok(Some(outcome))
}

/// Whether an env value names an outcome path.
pub(crate) fn is_configured(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}
