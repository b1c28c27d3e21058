#![forbid(unsafe_code)]

//! Effects returned by panel handlers.
//!
//! A handler never touches the runtime directly. It returns an [`Effect`]
//! describing what should happen next and the runtime applies it once the
//! panel has been torn down.

use std::fmt;

use crate::request::ConfirmationRequest;

/// Failure of a background action, as the dashboard reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    /// Human-readable failure text, typically the command's stderr.
    pub message: String,
    /// Process exit code, when there was a process.
    pub exit_code: Option<i32>,
}

impl ActionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: None,
        }
    }

    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} (exit code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ActionError {}

/// Result of a background action: a one-line summary on success.
pub type ActionResult = Result<String, ActionError>;

/// Something long-running that reports success or failure.
///
/// This is the whole interface the panel engine has to the version-control
/// layer.
pub trait Action: Send + 'static {
    /// Short label used in logs and status text.
    fn label(&self) -> String;

    /// Do the work. Runs on a worker thread.
    fn run(self: Box<Self>) -> ActionResult;
}

/// Boxed job ready to hand to a worker.
pub struct ActionTask {
    label: String,
    job: Box<dyn FnOnce() -> ActionResult + Send>,
}

impl ActionTask {
    /// Wrap a closure.
    pub fn new(label: impl Into<String>, job: impl FnOnce() -> ActionResult + Send + 'static) -> Self {
        Self {
            label: label.into(),
            job: Box::new(job),
        }
    }

    /// Wrap an [`Action`].
    pub fn from_action(action: impl Action) -> Self {
        let label = action.label();
        let boxed: Box<dyn Action> = Box::new(action);
        Self::new(label, move || boxed.run())
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consume the task and run it on the current thread.
    pub fn run(self) -> ActionResult {
        (self.job)()
    }
}

impl fmt::Debug for ActionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTask")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// What the runtime should do after a handler returns.
#[derive(Default)]
pub enum Effect {
    /// Nothing.
    #[default]
    None,
    /// Open another modal panel.
    Open(Box<ConfirmationRequest>),
    /// Replace the status line.
    Status(String),
    /// Hand an action to a worker thread.
    Run(ActionTask),
    /// End the session.
    Quit,
    /// Several effects, applied in order.
    Batch(Vec<Effect>),
}

impl Effect {
    /// Open a panel.
    #[must_use]
    pub fn open(request: ConfirmationRequest) -> Self {
        Self::Open(Box::new(request))
    }

    /// Status line text.
    #[must_use]
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status(text.into())
    }

    /// Run an action in the background.
    #[must_use]
    pub fn run(task: ActionTask) -> Self {
        Self::Run(task)
    }

    /// Combine effects, dropping `None`s and flattening nested batches of one.
    #[must_use]
    pub fn batch(effects: impl IntoIterator<Item = Effect>) -> Self {
        let mut effects: Vec<Effect> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::None,
            1 => effects.pop().unwrap_or_default(),
            _ => Self::Batch(effects),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Flatten into a list of non-batch effects, in application order.
    #[must_use]
    pub fn flatten(self) -> Vec<Effect> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(effects) => effects.into_iter().flat_map(Effect::flatten).collect(),
            other => vec![other],
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Open(req) => f.debug_tuple("Open").field(&req.panel_name()).finish(),
            Self::Status(text) => f.debug_tuple("Status").field(text).finish(),
            Self::Run(task) => f.debug_tuple("Run").field(task).finish(),
            Self::Quit => f.write_str("Quit"),
            Self::Batch(effects) => f.debug_tuple("Batch").field(effects).finish(),
        }
    }
}
