//! End-to-end runs of the binary in headless replay mode, observed through
//! the outcome file.

use std::path::Path;
use std::process::{Command, Output};

use gitdash_outcome::{OUTCOME_PATH_ENV, SessionOutcome, Supervisor, Verdict, read_outcome};

// ── Helpers ─────────────────────────────────────────────────────────────

fn gitdash(outcome: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gitdash"));
    cmd.args(args)
        .env(OUTCOME_PATH_ENV, outcome)
        .env_remove("GITDASH_REPLAY")
        .env_remove("GITDASH_LOG_FILE")
        .env("GITDASH_LOG", "warn");
    cmd
}

fn replay(script: &str) -> (Output, Option<SessionOutcome>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outcome.json");
    let output = gitdash(&path, &[&format!("--replay={script}")])
        .output()
        .unwrap();
    let outcome = read_outcome(&path).unwrap();
    (output, outcome)
}

// ═════════════════════════════════════════════════════════════════════════
// Outcome channel
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn confirmed_quit_records_success() {
    let (output, outcome) = replay("q,enter");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(outcome, Some(SessionOutcome::success()));
}

#[test]
fn navigation_then_quit_records_success() {
    let (output, outcome) = replay("j,j,k,q,esc,q,enter");
    assert!(output.status.success());
    assert_eq!(outcome, Some(SessionOutcome::success()));
}

#[test]
fn ctrl_c_records_success() {
    let (output, outcome) = replay("ctrl+c");
    assert!(output.status.success());
    assert_eq!(outcome, Some(SessionOutcome::success()));
}

#[test]
fn unfinished_script_records_failure() {
    let (output, outcome) = replay("q");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        outcome,
        Some(SessionOutcome::failure("replay ended before the session quit"))
    );
}

#[test]
fn bad_script_records_failure() {
    let (output, outcome) = replay("q,nonsense");
    assert_eq!(output.status.code(), Some(1));
    let outcome = outcome.expect("outcome file written");
    assert!(!outcome.succeeded);
    assert!(outcome.message.contains("nonsense"), "{}", outcome.message);
}

#[test]
fn cancelled_commit_prompt_then_quit() {
    // Commit is the fifth entry. Type a message, cancel, quit.
    let (output, outcome) = replay("j,j,j,j,enter,w,i,p,esc,q,enter");
    assert!(output.status.success());
    assert_eq!(outcome, Some(SessionOutcome::success()));
}

#[test]
fn no_outcome_without_env() {
    let output = Command::new(env!("CARGO_BIN_EXE_gitdash"))
        .arg("--replay=q,enter")
        .env_remove(OUTCOME_PATH_ENV)
        .env_remove("GITDASH_LOG_FILE")
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn outcome_path_comes_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("outcome.json");
    let output = gitdash(&path, &["--replay=ctrl+c"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(read_outcome(&path).unwrap(), Some(SessionOutcome::success()));
}

#[cfg(unix)]
#[test]
fn non_utf8_outcome_path_is_honoured() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(OsStr::from_bytes(b"outcome-\xff.json"));
    let output = gitdash(&path, &["--replay=q,enter"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read_outcome(&path).unwrap(), Some(SessionOutcome::success()));
}

// ═════════════════════════════════════════════════════════════════════════
// Supervisor
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn supervisor_sees_pass_and_fail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outcome.json");

    let mut pass = Command::new(env!("CARGO_BIN_EXE_gitdash"));
    pass.arg("--replay=q,enter").env_remove("GITDASH_LOG_FILE");
    assert_eq!(Supervisor::new(pass, &path).run().unwrap(), Verdict::Passed);

    let mut fail = Command::new(env!("CARGO_BIN_EXE_gitdash"));
    fail.arg("--replay=q").env_remove("GITDASH_LOG_FILE");
    assert_eq!(
        Supervisor::new(fail, &path).run().unwrap(),
        Verdict::Failed("replay ended before the session quit".into())
    );
}

#[test]
fn help_and_version_exit_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outcome.json");
    let help = gitdash(&path, &["--help"]).output().unwrap();
    assert!(help.status.success());
    assert!(String::from_utf8_lossy(&help.stdout).contains("GITDASH_OUTCOME_PATH"));

    let version = gitdash(&path, &["--version"]).output().unwrap();
    assert!(String::from_utf8_lossy(&version.stdout).starts_with("gitdash "));
    assert!(!path.exists());
}
