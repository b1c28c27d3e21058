#![forbid(unsafe_code)]

//! Out-of-band session outcome channel.
//!
//! A session that owns the terminal cannot report through stdout: the UI is
//! drawing there, and a supervisor capturing it would see escape sequences.
//! Instead the supervisor names a file through [`OUTCOME_PATH_ENV`], the
//! session writes one [`SessionOutcome`] record there when it finishes, and
//! the supervisor reads it back after the process exits.
//!
//! # Protocol
//!
//! | Step | Who | What |
//! |------|-----|------|
//! | 1 | supervisor | set `GITDASH_OUTCOME_PATH` on the child, optionally remove a stale file |
//! | 2 | session | [`OutcomeReporter::from_env`]; inert when the variable is unset |
//! | 3 | session | first `record_success` / `record_failure` truncates and writes the file |
//! | 4 | supervisor | wait for exit, then [`read_outcome`]; `None` means inconclusive |
//!
//! The file holds `{"Success":true}` or
//! `{"Success":false,"Message":"..."}`. It is left in place after reading.
//!
//! When the session runs in the same process as whatever consumes the
//! outcome, a [`DirectSink`] delivers over a channel instead.

mod error;
mod record;
mod reporter;
mod sink;
mod supervisor;

pub use error::{OutcomeError, OutcomeResult};
pub use record::{
    OUTCOME_PATH_ENV, SessionOutcome, configure_outcome_path, outcome_path_from_env,
    read_outcome, write_outcome,
};
pub use reporter::OutcomeReporter;
pub use sink::{DirectSink, FileSink, OutcomeSink};
pub use supervisor::{Supervisor, Verdict};
