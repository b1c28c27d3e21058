//! Lifecycle tests for the confirmation/prompt controller, driven through
//! [`HeadlessBackend`].

use std::cell::RefCell;
use std::rc::Rc;

use gitdash_core::event::{KeyCode, KeyEvent, KeyEventKind};
use gitdash_core::geometry::ScreenSize;
use gitdash_layout::{compute_bounds, newline_bounds};
use gitdash_panels::{
    Backend, BackendCall, Branch, ConfirmationRequest, Controller, Dispatch, Effect, Fatal,
    HandlerError, HeadlessBackend, LifecycleEvent, OpenError, PanelName, PanelStyle,
    PromptDraft, WorkflowState,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn setup() -> (Controller, HeadlessBackend) {
    let mut backend = HeadlessBackend::new(ScreenSize::new(80, 24));
    let mut controller = Controller::default();
    assert!(controller.focus_base(&mut backend, "files").unwrap());
    backend.take_calls();
    (controller, backend)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}

fn type_text(controller: &mut Controller, backend: &mut HeadlessBackend, text: &str) {
    for ch in text.chars() {
        let dispatch = controller.handle_key(backend, key(KeyCode::Char(ch))).unwrap();
        assert!(dispatch.is_handled(), "char {ch:?} should be consumed");
    }
}

fn teardown_steps(controller: &Controller) -> Vec<LifecycleEvent> {
    controller
        .journal()
        .iter()
        .filter(|e| e.is_teardown_step())
        .cloned()
        .collect()
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    (log.clone(), log)
}

// ═════════════════════════════════════════════════════════════════════════
// Open / accept / cancel
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn accept_runs_confirm_handler_and_restores_focus() {
    let (mut controller, mut backend) = setup();
    let (log, seen) = recorder();
    let request = ConfirmationRequest::confirm("Discard", "Discard all changes?")
        .on_confirm(move |ctx| {
            log.borrow_mut().push(format!("confirm:{}", ctx.content));
            Ok(Effect::status("discarded"))
        });
    controller.open(&mut backend, request).unwrap();

    assert_eq!(controller.focused(), Some(&PanelName::new("confirmation")));
    assert_eq!(backend.status(), "esc: close, enter: confirm");
    assert_eq!(
        backend.panel("confirmation").unwrap().bounds,
        compute_bounds("Discard all changes?", ScreenSize::new(80, 24))
    );

    let dispatch = controller.handle_key(&mut backend, key(KeyCode::Enter)).unwrap();
    assert!(matches!(dispatch, Dispatch::Handled(Effect::Status(ref s)) if s == "discarded"));
    assert_eq!(seen.borrow().as_slice(), ["confirm:Discard all changes?"]);
    assert_eq!(controller.focused(), Some(&PanelName::new("files")));
    assert_eq!(backend.focus(), Some(&PanelName::new("files")));
    assert_eq!(controller.state("confirmation"), WorkflowState::Closed);
    assert!(!backend.has_panel("confirmation"));
}

#[test]
fn cancel_runs_only_cancel_handler() {
    let (mut controller, mut backend) = setup();
    let (log, seen) = recorder();
    let log2 = log.clone();
    let request = ConfirmationRequest::confirm("Reset", "Hard reset?")
        .on_confirm(move |_| {
            log.borrow_mut().push("confirm".into());
            Ok(Effect::None)
        })
        .on_cancel(move |_| {
            log2.borrow_mut().push("cancel".into());
            Ok(Effect::None)
        });
    controller.open(&mut backend, request).unwrap();
    controller.handle_key(&mut backend, key(KeyCode::Escape)).unwrap();
    assert_eq!(seen.borrow().as_slice(), ["cancel"]);
    assert!(!controller.has_modal());
}

#[test]
fn teardown_is_uniform_across_branches() {
    for (close_key, branch) in [(KeyCode::Enter, Branch::Confirm), (KeyCode::Escape, Branch::Cancel)] {
        let (mut controller, mut backend) = setup();
        controller
            .open(&mut backend, ConfirmationRequest::confirm("t", "body"))
            .unwrap();
        backend.take_calls();
        controller.journal_mut().clear();

        controller.handle_key(&mut backend, key(close_key)).unwrap();

        let confirmation = PanelName::new("confirmation");
        assert_eq!(
            teardown_steps(&controller),
            vec![
                LifecycleEvent::Unbound {
                    panel: confirmation.clone(),
                    bindings: 2,
                },
                LifecycleEvent::Destroyed {
                    panel: confirmation.clone(),
                },
                LifecycleEvent::FocusRestored {
                    panel: confirmation.clone(),
                    focus: Some(PanelName::new("files")),
                },
            ],
            "branch {branch}"
        );
        assert_eq!(
            backend.take_calls(),
            vec![
                BackendCall::DestroyPanel {
                    name: confirmation.clone()
                },
                BackendCall::SetFocus(Some(PanelName::new("files"))),
            ]
        );
        assert_eq!(controller.router().scope_count(), 0);
    }
}

#[test]
fn release_events_are_ignored() {
    let (mut controller, mut backend) = setup();
    controller
        .open(&mut backend, ConfirmationRequest::confirm("t", "body"))
        .unwrap();
    let release = key(KeyCode::Enter).with_kind(KeyEventKind::Release);
    let dispatch = controller.handle_key(&mut backend, release).unwrap();
    assert!(!dispatch.is_handled());
    assert!(controller.is_open("confirmation"));
}

#[test]
fn keys_without_modal_are_unhandled() {
    let (mut controller, mut backend) = setup();
    let dispatch = controller.handle_key(&mut backend, key(KeyCode::Enter)).unwrap();
    assert!(!dispatch.is_handled());
}

// ═════════════════════════════════════════════════════════════════════════
// Single-instance replacement
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn reopening_replaces_without_stale_bindings() {
    let (mut controller, mut backend) = setup();
    let (log, seen) = recorder();
    let first_log = log.clone();
    controller
        .open(
            &mut backend,
            ConfirmationRequest::confirm("first", "one").on_confirm(move |_| {
                first_log.borrow_mut().push("first".into());
                Ok(Effect::None)
            }),
        )
        .unwrap();
    controller
        .open(
            &mut backend,
            ConfirmationRequest::prompt("second").on_confirm(move |_| {
                log.borrow_mut().push("second".into());
                Ok(Effect::None)
            }),
        )
        .unwrap();

    assert_eq!(controller.panels().count(), 1);
    assert_eq!(backend.panel_count(), 1);
    assert_eq!(controller.focus_stack().depth(), 1);
    // accept, cancel, newline of the prompt only
    assert_eq!(controller.router().scope_len("confirmation"), 3);
    assert_eq!(
        controller.focus_stack().entries()[0].previous,
        Some(PanelName::new("files"))
    );

    controller.handle_key(&mut backend, key(KeyCode::Enter)).unwrap();
    assert_eq!(seen.borrow().as_slice(), ["second"]);
    assert_eq!(controller.focused(), Some(&PanelName::new("files")));
    assert!(
        controller
            .journal()
            .iter()
            .any(|e| matches!(e, LifecycleEvent::Replaced { .. }))
    );
}

// ═════════════════════════════════════════════════════════════════════════
// Nesting
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn nested_panels_restore_in_reverse_order() {
    let (mut controller, mut backend) = setup();
    controller
        .open(&mut backend, ConfirmationRequest::confirm("a", "a").named("a"))
        .unwrap();
    controller
        .open(&mut backend, ConfirmationRequest::confirm("b", "b").named("b"))
        .unwrap();
    assert_eq!(controller.focus_stack().depth(), 2);

    controller.handle_key(&mut backend, key(KeyCode::Escape)).unwrap();
    assert_eq!(controller.focused(), Some(&PanelName::new("a")));
    controller.handle_key(&mut backend, key(KeyCode::Escape)).unwrap();
    assert_eq!(controller.focused(), Some(&PanelName::new("files")));
    assert!(!controller.has_modal());
}

#[test]
fn explicit_return_focus_wins() {
    let (mut controller, mut backend) = setup();
    controller
        .open(
            &mut backend,
            ConfirmationRequest::message("Info", "done").return_focus("branches"),
        )
        .unwrap();
    controller.handle_key(&mut backend, key(KeyCode::Enter)).unwrap();
    assert_eq!(controller.focused(), Some(&PanelName::new("branches")));
}

#[test]
fn close_all_unwinds_every_panel() {
    let (mut controller, mut backend) = setup();
    for name in ["a", "b", "c"] {
        controller
            .open(&mut backend, ConfirmationRequest::confirm(name, name).named(name))
            .unwrap();
    }
    backend.take_calls();
    assert_eq!(controller.close_all(&mut backend).unwrap(), 3);
    assert_eq!(controller.focused(), Some(&PanelName::new("files")));
    assert_eq!(backend.panel_count(), 0);

    let destroyed: Vec<String> = backend
        .take_calls()
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::DestroyPanel { name } => Some(name.as_str().to_owned()),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, ["c", "b", "a"]);
}

// ═════════════════════════════════════════════════════════════════════════
// Fatal paths
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn handler_error_is_fatal_and_not_swallowed() {
    let (mut controller, mut backend) = setup();
    controller
        .open(
            &mut backend,
            ConfirmationRequest::confirm("Push", "Force push?")
                .on_confirm(|_| Err(HandlerError::new("remote rejected"))),
        )
        .unwrap();
    let err = controller
        .handle_key(&mut backend, key(KeyCode::Enter))
        .unwrap_err();
    match err {
        Fatal::Handler { panel, branch, source } => {
            assert_eq!(panel, "confirmation");
            assert_eq!(branch, Branch::Confirm);
            assert_eq!(source.message(), "remote rejected");
        }
        other => panic!("expected handler error, got {other:?}"),
    }
    // no error panel was opened in its place
    assert_eq!(controller.panels().count(), 1);
    assert_eq!(controller.panel("confirmation").unwrap().kind, gitdash_panels::PanelKind::Confirmation);
}

#[test]
fn teardown_failure_is_fatal() {
    let (mut controller, mut backend) = setup();
    controller
        .open(&mut backend, ConfirmationRequest::confirm("t", "body"))
        .unwrap();
    backend.fail_destroy_for("confirmation");
    let err = controller
        .handle_key(&mut backend, key(KeyCode::Escape))
        .unwrap_err();
    assert!(matches!(err, Fatal::Teardown { .. }));
}

// ═════════════════════════════════════════════════════════════════════════
// Open rollback
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn rejected_create_registers_nothing() {
    let (mut controller, mut backend) = setup();
    backend.fail_create_for("confirmation");
    let err = controller
        .open(&mut backend, ConfirmationRequest::confirm("t", "body"))
        .unwrap_err();
    assert!(matches!(err, OpenError::Rejected { .. }));
    assert!(err.is_recoverable());
    assert!(!controller.is_open("confirmation"));
    assert!(!controller.router().has_scope("confirmation"));
    assert_eq!(controller.focus_stack().depth(), 0);
    assert_eq!(controller.focused(), Some(&PanelName::new("files")));
}

#[test]
fn rejected_focus_rolls_back_partial_registration() {
    let (mut controller, mut backend) = setup();
    backend.fail_set_focus(true);
    let err = controller
        .open(&mut backend, ConfirmationRequest::prompt("Commit"))
        .unwrap_err();
    assert!(matches!(err, OpenError::Rejected { .. }));
    assert!(!controller.is_open("confirmation"));
    assert!(!backend.has_panel("confirmation"));
    assert!(!controller.router().has_scope("confirmation"));
    assert_eq!(controller.focus_stack().depth(), 0);
    assert_eq!(controller.focused(), Some(&PanelName::new("files")));
}

// ═════════════════════════════════════════════════════════════════════════
// Editing and sizing
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn structural_newline_grows_before_inserting() {
    let (mut controller, mut backend) = setup();
    let screen = backend.size();
    controller
        .open(&mut backend, ConfirmationRequest::prompt("Commit message"))
        .unwrap();
    type_text(&mut controller, &mut backend, "abc");
    backend.take_calls();

    controller.handle_key(&mut backend, key(KeyCode::Tab)).unwrap();

    let expected = newline_bounds("abc", screen);
    let calls = backend.take_calls();
    assert_eq!(
        calls[0],
        BackendCall::ResizePanel {
            name: PanelName::new("confirmation"),
            bounds: expected,
        }
    );
    assert_eq!(
        calls[1],
        BackendCall::UpdatePanel {
            name: PanelName::new("confirmation"),
            content: "abc\n".into(),
        }
    );
    assert_eq!(controller.panel("confirmation").unwrap().bounds, expected);
}

#[test]
fn cursor_line_stays_visible_after_newline() {
    let (mut controller, mut backend) = setup();
    controller
        .open(&mut backend, ConfirmationRequest::prompt("Commit message"))
        .unwrap();
    type_text(&mut controller, &mut backend, "ab");
    controller.handle_key(&mut backend, key(KeyCode::Tab)).unwrap();
    let grown = controller.panel("confirmation").unwrap().bounds;

    for code in [KeyCode::Home, KeyCode::End, KeyCode::Right, KeyCode::Delete] {
        controller.handle_key(&mut backend, key(code)).unwrap();
        let panel = backend.panel("confirmation").unwrap();
        let cursor = panel.cursor.expect("prompt shows a cursor");
        assert_eq!(panel.content, "ab\n");
        assert_eq!(cursor.line, 1);
        assert!(
            panel.bounds.inner_rows() > 1,
            "{code:?} shrank the panel to {:?}",
            panel.bounds
        );
        assert_eq!(panel.bounds, grown);
    }
}

#[test]
fn multiline_paste_grows_to_fit_every_line() {
    let (mut controller, mut backend) = setup();
    controller
        .open(&mut backend, ConfirmationRequest::prompt("Commit message"))
        .unwrap();
    assert!(controller.paste(&mut backend, "subject\n\nbody\n").unwrap());

    let panel = backend.panel("confirmation").unwrap();
    assert_eq!(panel.content, "subject\n\nbody\n");
    let cursor = panel.cursor.expect("prompt shows a cursor");
    assert_eq!(cursor.line, 3);
    assert!(panel.bounds.inner_rows() > 3);
}

#[test]
fn readonly_panel_has_no_newline_and_ignores_typing() {
    let (mut controller, mut backend) = setup();
    controller
        .open(&mut backend, ConfirmationRequest::confirm("t", "body"))
        .unwrap();
    assert!(!controller.handle_key(&mut backend, key(KeyCode::Tab)).unwrap().is_handled());
    assert!(
        !controller
            .handle_key(&mut backend, key(KeyCode::Char('x')))
            .unwrap()
            .is_handled()
    );
    assert_eq!(controller.panel("confirmation").unwrap().content(), "body");
}

#[test]
fn typing_past_the_width_grows_the_panel() {
    let mut backend = HeadlessBackend::new(ScreenSize::new(20, 24));
    let mut controller = Controller::default();
    controller
        .open(&mut backend, ConfirmationRequest::prompt("p"))
        .unwrap();
    let before = controller.panel("confirmation").unwrap().bounds;
    // panel width is 10, so the tenth character needs a second row
    type_text(&mut controller, &mut backend, "0123456789");
    let after = controller.panel("confirmation").unwrap().bounds;
    assert_eq!(after.height(), before.height() + 1);
    assert_eq!((after.x0, after.x1), (before.x0, before.x1));

    controller.handle_key(&mut backend, key(KeyCode::Backspace)).unwrap();
    assert_eq!(controller.panel("confirmation").unwrap().bounds, before);
}

#[test]
fn prompt_handler_sees_typed_text() {
    let (mut controller, mut backend) = setup();
    let (log, seen) = recorder();
    controller
        .open(
            &mut backend,
            ConfirmationRequest::prompt("Commit").on_confirm(move |ctx| {
                log.borrow_mut().push(ctx.content.to_owned());
                Ok(Effect::None)
            }),
        )
        .unwrap();
    type_text(&mut controller, &mut backend, "fix");
    controller.handle_key(&mut backend, key(KeyCode::Left)).unwrap();
    type_text(&mut controller, &mut backend, "e");
    controller.handle_key(&mut backend, key(KeyCode::Enter)).unwrap();
    assert_eq!(seen.borrow().as_slice(), ["fiex"]);
}

#[test]
fn paste_flattens_newlines_without_multiline() {
    let (mut controller, mut backend) = setup();
    controller
        .open(
            &mut backend,
            ConfirmationRequest::prompt("Branch name").multiline(false),
        )
        .unwrap();
    assert!(controller.paste(&mut backend, "feature\nlogin").unwrap());
    assert_eq!(controller.panel("confirmation").unwrap().content(), "feature login");
}

#[test]
fn relayout_follows_screen_size() {
    let (mut controller, mut backend) = setup();
    controller
        .open(&mut backend, ConfirmationRequest::confirm("t", "body"))
        .unwrap();
    backend.set_size(ScreenSize::new(120, 40));
    controller.relayout(&mut backend).unwrap();
    assert_eq!(
        controller.panel("confirmation").unwrap().bounds,
        compute_bounds("body", ScreenSize::new(120, 40))
    );
    assert_eq!(
        backend.panel("confirmation").unwrap().bounds,
        compute_bounds("body", ScreenSize::new(120, 40))
    );
}

// ═════════════════════════════════════════════════════════════════════════
// Drafts and error panels
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn cancelled_prompt_text_is_restored_on_reopen() {
    let (mut controller, mut backend) = setup();
    let draft = PromptDraft::new();

    controller
        .open(&mut backend, ConfirmationRequest::prompt("Commit").draft(draft.clone()))
        .unwrap();
    type_text(&mut controller, &mut backend, "wip ");
    controller.handle_key(&mut backend, key(KeyCode::Escape)).unwrap();
    assert_eq!(draft.get(), "wip");

    controller
        .open(&mut backend, ConfirmationRequest::prompt("Commit").draft(draft.clone()))
        .unwrap();
    let panel = controller.panel("confirmation").unwrap();
    assert_eq!(panel.content(), "wip");
    assert_eq!(panel.buffer.cursor(), 3);

    controller.handle_key(&mut backend, key(KeyCode::Enter)).unwrap();
    assert!(draft.is_empty());
}

#[test]
fn error_panel_is_styled_and_returns_focus() {
    let (mut controller, mut backend) = setup();
    controller
        .show_error(&mut backend, "fatal: not a git repository\n")
        .unwrap();
    let panel = controller.panel("confirmation").unwrap();
    assert_eq!(panel.style, PanelStyle::Error);
    assert_eq!(panel.content(), "fatal: not a git repository");
    assert_eq!(backend.panel("confirmation").unwrap().style, PanelStyle::Error);

    controller.handle_key(&mut backend, key(KeyCode::Escape)).unwrap();
    assert_eq!(controller.focused(), Some(&PanelName::new("files")));
}

#[test]
fn effect_from_handler_can_open_another_panel() {
    let (mut controller, mut backend) = setup();
    controller
        .open(
            &mut backend,
            ConfirmationRequest::confirm("Commit", "Commit staged changes?").on_confirm(|_| {
                Ok(Effect::open(ConfirmationRequest::prompt("Commit message")))
            }),
        )
        .unwrap();
    let dispatch = controller.handle_key(&mut backend, key(KeyCode::Enter)).unwrap();
    let Dispatch::Handled(Effect::Open(request)) = dispatch else {
        panic!("expected an open effect");
    };
    controller.open(&mut backend, *request).unwrap();
    assert_eq!(
        controller.state("confirmation"),
        WorkflowState::Open { editable: true }
    );
    assert_eq!(controller.focus_stack().depth(), 1);
}
