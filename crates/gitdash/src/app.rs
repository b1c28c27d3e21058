#![forbid(unsafe_code)]

//! The git dashboard: one list of operations plus the status line.
//!
//! # Keys on the action list
//!
//! | Key | Effect |
//! |-----|--------|
//! | `j` / `down` | next operation |
//! | `k` / `up` | previous operation |
//! | `enter` | run the selected operation |
//! | `q` | ask before quitting |
//! | `ctrl+c` | quit immediately |
//!
//! Destructive operations open a confirmation panel first. Commit opens a
//! multiline message prompt whose text survives a cancel. A failed operation
//! opens an error panel stacked over whatever had focus.

use std::collections::VecDeque;
use std::path::PathBuf;

use gitdash_core::event::{KeyCode, KeyEvent};
use gitdash_layout::dashboard_regions;
use gitdash_panels::{
    ActionTask, Backend, BackendResult, ConfirmationRequest, Effect, PanelName, PanelStyle,
    PanelView, PromptDraft,
};
use gitdash_runtime::{ActionReport, Dashboard};

use crate::actions::{GitCommand, GitOp};

/// Name of the base panel.
pub const ACTIONS_PANEL: &str = "actions";
/// Name of the panel showing a failed operation.
pub const ACTION_ERROR_PANEL: &str = "action-error";
/// Status line while the action list has focus.
pub const BASE_HINT: &str = "j/k: move, enter: run, q: quit";

const HISTORY_LEN: usize = 5;

/// Dashboard state.
#[derive(Debug)]
pub struct GitDashboard {
    repo: PathBuf,
    program: Option<String>,
    selected: usize,
    draft: PromptDraft,
    status: String,
    history: VecDeque<String>,
}

impl GitDashboard {
    #[must_use]
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            program: None,
            selected: 0,
            draft: PromptDraft::new(),
            status: BASE_HINT.to_owned(),
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    /// Run a different executable in place of `git`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    #[must_use]
    pub fn selected(&self) -> GitOp {
        GitOp::ALL[self.selected]
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Most recent results, newest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    #[must_use]
    pub fn draft(&self) -> &PromptDraft {
        &self.draft
    }

    fn command(&self, op: GitOp) -> GitCommand {
        let cmd = GitCommand::new(op, self.repo.clone());
        match &self.program {
            Some(program) => cmd.with_program(program.clone()),
            None => cmd,
        }
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(GitOp::ALL.len() - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn activate(&mut self) -> Effect {
        let op = self.selected();
        if op.needs_message() {
            return self.commit_prompt();
        }
        let task = ActionTask::from_action(self.command(op));
        if op.is_destructive() {
            let prompt = format!("Really {}?", op.description());
            return Effect::open(
                ConfirmationRequest::confirm(capitalize(op.label()), prompt)
                    .on_confirm(move |_| Ok(Effect::run(task))),
            );
        }
        self.status = format!("running {op}");
        Effect::run(task)
    }

    fn commit_prompt(&self) -> Effect {
        let base = self.command(GitOp::Commit);
        Effect::open(
            ConfirmationRequest::prompt("Commit message")
                .draft(self.draft.clone())
                .on_confirm(move |ctx| {
                    let message = ctx.content.trim();
                    if message.is_empty() {
                        return Ok(Effect::open(ConfirmationRequest::error(
                            "Commit aborted: empty message",
                        )));
                    }
                    Ok(Effect::run(ActionTask::from_action(base.with_message(message))))
                }),
        )
    }

    fn push_history(&mut self, line: String) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_back();
        }
        self.history.push_front(line);
    }

    fn list_content(&self) -> String {
        let mut lines: Vec<String> = GitOp::ALL
            .iter()
            .enumerate()
            .map(|(i, op)| {
                let marker = if i == self.selected { '>' } else { ' ' };
                format!("{marker} {:<8} {}", op.label(), op.description())
            })
            .collect();
        if !self.history.is_empty() {
            lines.push(String::new());
            lines.extend(self.history.iter().cloned());
        }
        lines.join("\n")
    }
}

impl Dashboard for GitDashboard {
    fn init(&mut self, backend: &mut dyn Backend) -> BackendResult<PanelName> {
        let name = PanelName::new(ACTIONS_PANEL);
        backend.create_panel(&name, dashboard_regions(backend.size()).main)?;
        tracing::info!(repo = %self.repo.display(), "dashboard ready");
        Ok(name)
    }

    fn on_key(&mut self, key: KeyEvent, focus: Option<&PanelName>) -> Effect {
        if key.ctrl() && key.is_char('c') {
            return Effect::Quit;
        }
        if focus.map(PanelName::as_str) != Some(ACTIONS_PANEL) {
            return Effect::None;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                Effect::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                Effect::None
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Char('q') => Effect::open(
                ConfirmationRequest::confirm("Quit", "Quit gitdash?")
                    .on_confirm(|_| Ok(Effect::Quit)),
            ),
            _ => Effect::None,
        }
    }

    fn on_action(&mut self, report: ActionReport) -> Effect {
        match report.result {
            Ok(summary) => {
                self.status = format!("{}: {summary}", report.label);
                self.push_history(format!("ok   {}: {summary}", report.label));
                Effect::None
            }
            Err(e) => {
                tracing::warn!(action = %report.label, error = %e, "action failed");
                self.status = format!("{} failed", report.label);
                self.push_history(format!("fail {}: {}", report.label, e.message));
                Effect::open(
                    ConfirmationRequest::error(format!("{} failed:\n{e}", report.label))
                        .named(ACTION_ERROR_PANEL),
                )
            }
        }
    }

    fn render(&self, backend: &mut dyn Backend, modal_open: bool) -> BackendResult<()> {
        let name = PanelName::new(ACTIONS_PANEL);
        let content = self.list_content();
        backend.update_panel(PanelView {
            name: &name,
            title: "gitdash",
            content: &content,
            style: PanelStyle::Normal,
            cursor: None,
        })?;
        if !modal_open {
            backend.set_status(&self.status)?;
        }
        Ok(())
    }

    fn relayout(&mut self, backend: &mut dyn Backend) -> BackendResult<()> {
        let bounds = dashboard_regions(backend.size()).main;
        backend.resize_panel(&PanelName::new(ACTIONS_PANEL), bounds)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitdash_core::event::Modifiers;
    use gitdash_panels::{ActionError, PanelKind};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    fn actions() -> PanelName {
        PanelName::new(ACTIONS_PANEL)
    }

    fn select(dash: &mut GitDashboard, op: GitOp) {
        while dash.selected() != op {
            dash.on_key(key(KeyCode::Down), Some(&actions()));
        }
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut dash = GitDashboard::new(".");
        dash.on_key(key(KeyCode::Char('k')), Some(&actions()));
        assert_eq!(dash.selected(), GitOp::Status);
        for _ in 0..20 {
            dash.on_key(key(KeyCode::Char('j')), Some(&actions()));
        }
        assert_eq!(dash.selected(), GitOp::Discard);
    }

    #[test]
    fn keys_ignored_without_list_focus() {
        let mut dash = GitDashboard::new(".");
        let other = PanelName::new("confirmation");
        let effect = dash.on_key(key(KeyCode::Enter), Some(&other));
        assert!(effect.is_none());
        dash.on_key(key(KeyCode::Down), Some(&other));
        assert_eq!(dash.selected(), GitOp::Status);
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut dash = GitDashboard::new(".");
        let key = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(matches!(dash.on_key(key, None), Effect::Quit));
    }

    #[test]
    fn safe_op_runs_directly() {
        let mut dash = GitDashboard::new(".");
        select(&mut dash, GitOp::Fetch);
        let effect = dash.on_key(key(KeyCode::Enter), Some(&actions()));
        assert!(matches!(effect, Effect::Run(ref task) if task.label() == "fetch"));
        assert_eq!(dash.status(), "running fetch");
    }

    #[test]
    fn destructive_op_asks_first() {
        let mut dash = GitDashboard::new(".");
        select(&mut dash, GitOp::Discard);
        let effect = dash.on_key(key(KeyCode::Enter), Some(&actions()));
        let Effect::Open(request) = effect else {
            panic!("expected a confirmation panel");
        };
        assert_eq!(request.kind(), PanelKind::Confirmation);
        assert_eq!(request.title(), "Discard");
        assert_eq!(request.initial_content(), "Really discard all unstaged changes?");
    }

    #[test]
    fn commit_opens_prompt_with_draft() {
        let mut dash = GitDashboard::new(".");
        dash.draft().store("half-written");
        select(&mut dash, GitOp::Commit);
        let Effect::Open(request) = dash.on_key(key(KeyCode::Enter), Some(&actions())) else {
            panic!("expected a prompt");
        };
        assert_eq!(request.kind(), PanelKind::Prompt);
        assert!(request.is_multiline());
        assert_eq!(request.initial_content(), "half-written");
    }

    #[test]
    fn failed_action_opens_named_error_panel() {
        let mut dash = GitDashboard::new(".");
        let report = ActionReport {
            label: "push".into(),
            result: Err(ActionError::new("rejected").with_exit_code(1)),
        };
        let Effect::Open(request) = dash.on_action(report) else {
            panic!("expected an error panel");
        };
        assert_eq!(request.panel_name().as_str(), ACTION_ERROR_PANEL);
        assert_eq!(request.kind(), PanelKind::Error);
        assert_eq!(request.initial_content(), "push failed:\nrejected (exit code 1)");
        assert_eq!(dash.status(), "push failed");
        assert_eq!(dash.history().next(), Some("fail push: rejected"));
    }

    #[test]
    fn successful_action_updates_status() {
        let mut dash = GitDashboard::new(".");
        let report = ActionReport {
            label: "commit".into(),
            result: Ok("[main abc123] feat: x".into()),
        };
        assert!(dash.on_action(report).is_none());
        assert_eq!(dash.status(), "commit: [main abc123] feat: x");
    }

    #[test]
    fn history_keeps_most_recent() {
        let mut dash = GitDashboard::new(".");
        for i in 0..(HISTORY_LEN + 2) {
            dash.on_action(ActionReport {
                label: "fetch".into(),
                result: Ok(format!("run {i}")),
            });
        }
        let lines: Vec<&str> = dash.history().collect();
        assert_eq!(lines.len(), HISTORY_LEN);
        assert_eq!(lines[0], "ok   fetch: run 6");
    }

    #[test]
    fn list_marks_selection() {
        let mut dash = GitDashboard::new(".");
        select(&mut dash, GitOp::Pull);
        let content = dash.list_content();
        let marked: Vec<&str> = content.lines().filter(|l| l.starts_with('>')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("pull"));
    }
}
