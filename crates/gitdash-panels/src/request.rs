#![forbid(unsafe_code)]

//! Requests for modal panels and the handlers attached to them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::arena::{PanelName, PanelStyle};
use crate::effect::Effect;

/// What a modal panel is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// Yes/no question, read-only.
    Confirmation,
    /// Free-text input, editable.
    Prompt,
    /// Informational text, read-only, no handlers.
    Message,
    /// Error text, read-only, no handlers.
    Error,
}

impl PanelKind {
    /// Whether panels of this kind start editable.
    #[must_use]
    pub const fn editable(self) -> bool {
        matches!(self, Self::Prompt)
    }

    #[must_use]
    pub const fn style(self) -> PanelStyle {
        match self {
            Self::Error => PanelStyle::Error,
            _ => PanelStyle::Normal,
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Confirmation => "confirmation",
            Self::Prompt => "prompt",
            Self::Message => "message",
            Self::Error => "error",
        })
    }
}

/// What a handler can see when it runs.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub panel: &'a PanelName,
    /// Panel content at the moment the key was pressed.
    pub content: &'a str,
}

/// Failure inside a confirm or cancel handler. Always fatal.
#[derive(Debug)]
pub struct HandlerError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string()).with_source(e)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result returned by a handler.
pub type HandlerResult = Result<Effect, HandlerError>;

/// Confirm or cancel callback. Runs at most once.
pub type Handler = Box<dyn FnOnce(&HandlerContext<'_>) -> HandlerResult>;

/// Text kept across openings of the same prompt.
///
/// Cancelling a prompt stores its trimmed text here; the next prompt opened
/// with the same draft starts from that text with the cursor at the end.
/// Confirming clears it.
#[derive(Debug, Clone, Default)]
pub struct PromptDraft(Rc<RefCell<String>>);

impl PromptDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft text.
    #[must_use]
    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }

    /// Store `text` with surrounding whitespace removed.
    pub fn store(&self, text: &str) {
        let mut draft = self.0.borrow_mut();
        draft.clear();
        draft.push_str(text.trim());
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Everything needed to open one modal panel.
pub struct ConfirmationRequest {
    pub(crate) name: PanelName,
    pub(crate) kind: PanelKind,
    pub(crate) title: String,
    pub(crate) prompt: String,
    pub(crate) on_confirm: Option<Handler>,
    pub(crate) on_cancel: Option<Handler>,
    pub(crate) multiline: bool,
    pub(crate) return_focus: Option<PanelName>,
    pub(crate) draft: Option<PromptDraft>,
}

impl ConfirmationRequest {
    fn with_kind(kind: PanelKind, title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: PanelName::new(PanelName::CONFIRMATION),
            kind,
            title: title.into(),
            prompt: prompt.into(),
            on_confirm: None,
            on_cancel: None,
            multiline: false,
            return_focus: None,
            draft: None,
        }
    }

    /// Read-only yes/no question.
    #[must_use]
    pub fn confirm(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::with_kind(PanelKind::Confirmation, title, prompt)
    }

    /// Editable text input. Multiline by default.
    #[must_use]
    pub fn prompt(title: impl Into<String>) -> Self {
        let mut req = Self::with_kind(PanelKind::Prompt, title, "");
        req.multiline = true;
        req
    }

    /// Informational panel without handlers.
    #[must_use]
    pub fn message(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_kind(PanelKind::Message, title, body)
    }

    /// Error panel without handlers. The body is trimmed.
    #[must_use]
    pub fn error(body: impl AsRef<str>) -> Self {
        Self::with_kind(PanelKind::Error, "Error", body.as_ref().trim())
    }

    /// Use a panel name other than the shared `confirmation` slot.
    #[must_use]
    pub fn named(mut self, name: impl Into<PanelName>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn on_confirm(mut self, handler: impl FnOnce(&HandlerContext<'_>) -> HandlerResult + 'static) -> Self {
        self.on_confirm = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_cancel(mut self, handler: impl FnOnce(&HandlerContext<'_>) -> HandlerResult + 'static) -> Self {
        self.on_cancel = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn multiline(mut self, allowed: bool) -> Self {
        self.multiline = allowed;
        self
    }

    /// Panel that gets focus back on close, instead of whatever had it on open.
    #[must_use]
    pub fn return_focus(mut self, name: impl Into<PanelName>) -> Self {
        self.return_focus = Some(name.into());
        self
    }

    /// Initial text for a prompt.
    #[must_use]
    pub fn initial(mut self, text: impl Into<String>) -> Self {
        self.prompt = text.into();
        self
    }

    /// Preserve abandoned text in `draft`. A non-empty draft overrides the initial text.
    #[must_use]
    pub fn draft(mut self, draft: PromptDraft) -> Self {
        self.draft = Some(draft);
        self
    }

    #[must_use]
    pub fn panel_name(&self) -> &PanelName {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// Text the panel opens with.
    #[must_use]
    pub fn initial_content(&self) -> String {
        match &self.draft {
            Some(draft) if self.kind == PanelKind::Prompt && !draft.is_empty() => draft.get(),
            _ => self.prompt.clone(),
        }
    }
}

impl fmt::Debug for ConfirmationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationRequest")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("prompt", &self.prompt)
            .field("on_confirm", &self.on_confirm.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("multiline", &self.multiline)
            .field("return_focus", &self.return_focus)
            .finish_non_exhaustive()
    }
}
