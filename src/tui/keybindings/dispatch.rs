//! Key event dispatch using the registry.

use super::{Action, KeyPattern, Mode, BINDINGS};
use crate::tui::message::Message;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Dispatch a key event to a message based on current mode.
pub fn dispatch(mode: Mode, key: KeyEvent) -> Message {
    if mode.is_text_input() {
        return dispatch_text_input(mode, key);
    }

    for binding in BINDINGS.iter() {
        if !binding.modes.contains(&mode) {
            continue;
        }
        if matches_pattern(&key, &binding.pattern)
            || binding
                .alternatives
                .iter()
                .any(|alt| matches_pattern(&key, alt))
        {
            return action_message(binding.action);
        }
    }

    Message::None
}

fn action_message(action: Action) -> Message {
    match action {
        Action::MoveDown => Message::MoveDown,
        Action::MoveUp => Message::MoveUp,
        Action::NextTab => Message::NextTab,
        Action::PrevTab => Message::PrevTab,
        Action::StartFilter => Message::StartFilter,
        Action::ScrollDetailDown => Message::ScrollDetailDown,
        Action::ScrollDetailUp => Message::ScrollDetailUp,
        Action::CycleLink => Message::CycleLink,
        Action::OpenInBrowser => Message::OpenInBrowser,
        Action::CopyUrl => Message::CopyUrl,
        Action::CreateIssue => Message::CreateIssue,
        Action::EditIssue => Message::EditIssue,
        Action::MoveIssue => Message::MoveIssue,
        Action::AddComment => Message::AddComment,
        Action::ToggleBacklog => Message::ToggleBacklog,
        Action::Reload => Message::Reload,
        Action::AssignUser => Message::OpenUserSelector,
        Action::AssignEpic => Message::OpenEpicSelector,
        Action::ToggleHelp => Message::ToggleHelp,
        Action::Back => Message::Back,
        Action::Quit => Message::Quit,
        Action::HelpScrollDown => Message::HelpScroll(1),
        Action::HelpScrollUp => Message::HelpScroll(-1),
        Action::CloseOverlay => Message::CloseOverlay,
        Action::DismissError => Message::DismissError,
    }
}

/// Handle text input modes (filter prompt, fuzzy selector).
fn dispatch_text_input(mode: Mode, key: KeyEvent) -> Message {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match mode {
        Mode::Filtering => match key.code {
            KeyCode::Enter => Message::CommitFilter,
            KeyCode::Esc => Message::CancelFilter,
            KeyCode::Char('c') if ctrl => Message::CancelFilter,
            KeyCode::Backspace => Message::FilterBackspace,
            KeyCode::Up => Message::MoveUp,
            KeyCode::Down => Message::MoveDown,
            KeyCode::Char(c) if !ctrl => Message::FilterInput(c),
            _ => Message::None,
        },
        Mode::Fuzzy => match key.code {
            KeyCode::Enter => Message::SelectorPick,
            KeyCode::Esc => Message::CloseOverlay,
            KeyCode::Char('c') if ctrl => Message::CloseOverlay,
            KeyCode::Up => Message::SelectorMove(-1),
            KeyCode::Down => Message::SelectorMove(1),
            KeyCode::Char('k') if ctrl => Message::SelectorMove(-1),
            KeyCode::Char('j') if ctrl => Message::SelectorMove(1),
            KeyCode::Backspace => Message::SelectorBackspace,
            KeyCode::Char(c) if !ctrl => Message::SelectorInput(c),
            _ => Message::None,
        },
        _ => Message::None,
    }
}

/// Check if a key event matches a pattern.
fn matches_pattern(key: &KeyEvent, pattern: &KeyPattern) -> bool {
    match pattern {
        KeyPattern::Single(code) => {
            // Shifted punctuation and uppercase letters arrive with SHIFT set
            if key.modifiers.is_empty() {
                key.code == *code
            } else if key.modifiers == KeyModifiers::SHIFT {
                match (key.code, code) {
                    (KeyCode::Char(a), KeyCode::Char(b)) => {
                        a == *b && (a.is_ascii_uppercase() || "~!@#$%^&*()_+{}|:\"<>?".contains(a))
                    }
                    _ => false,
                }
            } else {
                false
            }
        }
        KeyPattern::WithModifier { key: code, mods } => {
            key.code == *code && key.modifiers.contains(*mods)
        }
    }
}
