//! Tests for keybinding dispatch against a live app's mode.
//!
//! These tests verify that shifted keys (how terminals report `?`) still
//! match, and that the app's current mode picks the right key table.

mod test_utils;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use jira_tui::tui::keybindings::{dispatch, Mode};
use jira_tui::tui::Message;
use test_utils::{started, test_config, FakeService};

// ============================================================================
// Test Helpers
// ============================================================================

fn key_event(code: KeyCode) -> KeyEvent {
    key_with(code, KeyModifiers::empty())
}

fn key_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

// ============================================================================
// Normal Mode
// ============================================================================

#[test]
fn test_question_mark_with_shift_toggles_help() {
    // ? requires Shift+/ on US keyboards, terminal sends '?' with SHIFT
    let msg = dispatch(Mode::Normal, key_with(KeyCode::Char('?'), KeyModifiers::SHIFT));
    assert!(matches!(msg, Message::ToggleHelp), "got {:?}", msg);
}

#[test]
fn test_ctrl_keys_are_distinct_from_plain_keys() {
    let msg = dispatch(Mode::Normal, key_with(KeyCode::Char('p'), KeyModifiers::CONTROL));
    assert!(matches!(msg, Message::OpenEpicSelector));

    let msg = dispatch(Mode::Normal, key_with(KeyCode::Char('r'), KeyModifiers::CONTROL));
    assert!(matches!(msg, Message::Reload));

    // Plain `r` is not bound
    assert!(matches!(dispatch(Mode::Normal, key_event(KeyCode::Char('r'))), Message::None));
}

#[test]
fn test_detail_pane_keys() {
    let down = dispatch(Mode::Normal, key_with(KeyCode::Char('e'), KeyModifiers::CONTROL));
    let up = dispatch(Mode::Normal, key_with(KeyCode::Char('y'), KeyModifiers::CONTROL));
    let tab = dispatch(Mode::Normal, key_event(KeyCode::Tab));
    assert!(matches!(down, Message::ScrollDetailDown));
    assert!(matches!(up, Message::ScrollDetailUp));
    assert!(matches!(tab, Message::CycleLink));

    // Plain `e` edits
    assert!(matches!(
        dispatch(Mode::Normal, key_event(KeyCode::Char('e'))),
        Message::EditIssue
    ));
}

#[test]
fn test_arrows_and_letters_navigate() {
    for (code, expected) in [
        (KeyCode::Char('j'), "MoveDown"),
        (KeyCode::Down, "MoveDown"),
        (KeyCode::Char('k'), "MoveUp"),
        (KeyCode::Up, "MoveUp"),
        (KeyCode::Char('l'), "NextTab"),
        (KeyCode::Right, "NextTab"),
        (KeyCode::Char('h'), "PrevTab"),
        (KeyCode::Left, "PrevTab"),
    ] {
        let msg = dispatch(Mode::Normal, key_event(code));
        assert_eq!(format!("{:?}", msg), expected, "key {:?}", code);
    }
}

// ============================================================================
// Modes Driven by the App
// ============================================================================

#[tokio::test]
async fn test_filter_prompt_captures_letters() {
    let service = FakeService::with_issues(&["ABC-1"]);
    let mut app = started(test_config(&[]), service).await;

    let msg = dispatch(app.mode(), key_event(KeyCode::Char('/')));
    app.update(msg).unwrap();
    assert_eq!(app.mode(), Mode::Filtering);

    // `q` is text while filtering, not quit
    let msg = dispatch(app.mode(), key_event(KeyCode::Char('q')));
    assert!(matches!(msg, Message::FilterInput('q')));
    app.update(msg).unwrap();
    assert_eq!(app.active_tab().table.query(), "q");

    let msg = dispatch(app.mode(), key_event(KeyCode::Esc));
    assert!(matches!(msg, Message::CancelFilter));
    app.update(msg).unwrap();
    assert_eq!(app.mode(), Mode::Normal);
}

#[tokio::test]
async fn test_help_keys_scroll_and_close() {
    let service = FakeService::with_issues(&["ABC-1"]);
    let mut app = started(test_config(&[]), service).await;

    let msg = dispatch(app.mode(), key_with(KeyCode::Char('?'), KeyModifiers::SHIFT));
    app.update(msg).unwrap();
    assert_eq!(app.mode(), Mode::Help);

    assert!(matches!(
        dispatch(app.mode(), key_event(KeyCode::Char('j'))),
        Message::HelpScroll(1)
    ));

    // `q` closes help instead of quitting
    let msg = dispatch(app.mode(), key_event(KeyCode::Char('q')));
    assert!(matches!(msg, Message::CloseOverlay));
    assert!(!app.update(msg).unwrap());
    assert_eq!(app.mode(), Mode::Normal);
}

#[tokio::test]
async fn test_error_overlay_keys_dismiss() {
    let service = FakeService::with_issues(&["ABC-1"]);
    let mut app = started(test_config(&[]), service).await;

    app.update(Message::ToggleBacklog).unwrap();
    assert_eq!(app.mode(), Mode::Error);

    for code in [KeyCode::Enter, KeyCode::Esc, KeyCode::Char('q')] {
        assert!(matches!(
            dispatch(app.mode(), key_event(code)),
            Message::DismissError
        ));
    }
    // Navigation keys do nothing while the error is up
    assert!(matches!(
        dispatch(app.mode(), key_event(KeyCode::Char('j'))),
        Message::None
    ));
}
