#![forbid(unsafe_code)]

//! Git operations the dashboard can run.
//!
//! Each entry maps to one `git` invocation in the configured repository.
//! Commands run on a worker thread through [`Action`]; the UI only ever sees
//! the one-line summary or the failure text.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use gitdash_panels::{Action, ActionError, ActionResult};

/// Operations offered on the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitOp {
    Status,
    Fetch,
    Pull,
    Push,
    Commit,
    Stash,
    Discard,
}

impl GitOp {
    pub const ALL: [GitOp; 7] = [
        GitOp::Status,
        GitOp::Fetch,
        GitOp::Pull,
        GitOp::Push,
        GitOp::Commit,
        GitOp::Stash,
        GitOp::Discard,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            GitOp::Status => "status",
            GitOp::Fetch => "fetch",
            GitOp::Pull => "pull",
            GitOp::Push => "push",
            GitOp::Commit => "commit",
            GitOp::Stash => "stash",
            GitOp::Discard => "discard",
        }
    }

    /// One-line description for the action list.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            GitOp::Status => "show working tree status",
            GitOp::Fetch => "fetch all remotes",
            GitOp::Pull => "pull the current branch",
            GitOp::Push => "push the current branch",
            GitOp::Commit => "commit staged changes",
            GitOp::Stash => "stash local changes",
            GitOp::Discard => "discard all unstaged changes",
        }
    }

    /// Whether the operation throws away work and needs confirmation.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, GitOp::Discard | GitOp::Stash)
    }

    /// Whether the operation needs a message from the user first.
    #[must_use]
    pub const fn needs_message(self) -> bool {
        matches!(self, GitOp::Commit)
    }

    fn args(self, message: Option<&str>) -> Vec<String> {
        let fixed: &[&str] = match self {
            GitOp::Status => &["status", "--short", "--branch"],
            GitOp::Fetch => &["fetch", "--all", "--prune"],
            GitOp::Pull => &["pull", "--ff-only"],
            GitOp::Push => &["push"],
            GitOp::Commit => &["commit"],
            GitOp::Stash => &["stash", "push"],
            GitOp::Discard => &["checkout", "--", "."],
        };
        let mut args: Vec<String> = fixed.iter().map(|s| (*s).to_owned()).collect();
        if let Some(message) = message {
            args.push("-m".to_owned());
            args.push(message.to_owned());
        }
        args
    }
}

impl fmt::Display for GitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `git` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    op: GitOp,
    repo: PathBuf,
    message: Option<String>,
    program: String,
}

impl GitCommand {
    #[must_use]
    pub fn new(op: GitOp, repo: impl Into<PathBuf>) -> Self {
        Self {
            op,
            repo: repo.into(),
            message: None,
            program: "git".to_owned(),
        }
    }

    /// Attach a commit message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Run a different executable in place of `git`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn op(&self) -> GitOp {
        self.op
    }

    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Arguments passed after `-C <repo>`.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        self.op.args(self.message.as_deref())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C")
            .arg(&self.repo)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Action for GitCommand {
    fn label(&self) -> String {
        self.op.label().to_owned()
    }

    fn run(self: Box<Self>) -> ActionResult {
        tracing::debug!(op = %self.op, repo = %self.repo.display(), "running git");
        let output = self
            .command()
            .output()
            .map_err(|e| ActionError::new(format!("could not run {}: {e}", self.program)))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            Ok(summarize(&stdout, &stderr, self.op))
        } else {
            let text = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            let message = if text.is_empty() {
                format!("{} failed", self.op)
            } else {
                text.to_owned()
            };
            let err = ActionError::new(message);
            Err(match output.status.code() {
                Some(code) => err.with_exit_code(code),
                None => err,
            })
        }
    }
}

/// First meaningful line of a successful run.
fn summarize(stdout: &str, stderr: &str, op: GitOp) -> String {
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map_or_else(|| format!("{op}: done"), str::to_owned)
}
