//! Static registry of all command keybindings.
//!
//! Both dispatch and help generation derive from this list. Text-input
//! keys for the filter prompt and the fuzzy selector live in `dispatch.rs`.

use super::{Action, Category, KeyBinding, KeyPattern, Mode};
use crossterm::event::{KeyCode, KeyModifiers};

const fn ctrl(c: char) -> KeyPattern {
    KeyPattern::WithModifier {
        key: KeyCode::Char(c),
        mods: KeyModifiers::CONTROL,
    }
}

/// All keybindings in the application, searched in order.
pub static BINDINGS: &[KeyBinding] = &[
    // ═══════════════════════════════════════════════════════════════════════════
    // NORMAL MODE
    // ═══════════════════════════════════════════════════════════════════════════

    // Navigation
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('j')),
        action: Action::MoveDown,
        description: "Next issue",
        category: Category::Navigation,
        alternatives: &[KeyPattern::Single(KeyCode::Down)],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('k')),
        action: Action::MoveUp,
        description: "Previous issue",
        category: Category::Navigation,
        alternatives: &[KeyPattern::Single(KeyCode::Up)],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('l')),
        action: Action::NextTab,
        description: "Next tab",
        category: Category::Navigation,
        alternatives: &[KeyPattern::Single(KeyCode::Right)],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('h')),
        action: Action::PrevTab,
        description: "Previous tab",
        category: Category::Navigation,
        alternatives: &[KeyPattern::Single(KeyCode::Left)],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('/')),
        action: Action::StartFilter,
        description: "Filter issues",
        category: Category::Navigation,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: ctrl('e'),
        action: Action::ScrollDetailDown,
        description: "Scroll issue down",
        category: Category::Navigation,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: ctrl('y'),
        action: Action::ScrollDetailUp,
        description: "Scroll issue up",
        category: Category::Navigation,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Tab),
        action: Action::CycleLink,
        description: "Select next link and copy it",
        category: Category::Navigation,
        alternatives: &[],
        show_in_help: true,
    },
    // Issue actions
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Enter),
        action: Action::OpenInBrowser,
        description: "Open in browser",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('u')),
        action: Action::CopyUrl,
        description: "Copy issue URL",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('n')),
        action: Action::CreateIssue,
        description: "New issue",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('e')),
        action: Action::EditIssue,
        description: "Edit issue",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('m')),
        action: Action::MoveIssue,
        description: "Move (transition) issue",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('c')),
        action: Action::AddComment,
        description: "Add comment",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('b')),
        action: Action::ToggleBacklog,
        description: "Toggle board/backlog",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: ctrl('r'),
        action: Action::Reload,
        description: "Reload tab",
        category: Category::IssueActions,
        alternatives: &[],
        show_in_help: true,
    },
    // Assignment
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('a')),
        action: Action::AssignUser,
        description: "Assign to user",
        category: Category::Assignment,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: ctrl('p'),
        action: Action::AssignEpic,
        description: "Add to epic",
        category: Category::Assignment,
        alternatives: &[],
        show_in_help: true,
    },
    // Other
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('?')),
        action: Action::ToggleHelp,
        description: "Toggle help",
        category: Category::Other,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Esc),
        action: Action::Back,
        description: "Clear filter, or quit",
        category: Category::Other,
        alternatives: &[],
        show_in_help: true,
    },
    KeyBinding {
        modes: &[Mode::Normal],
        pattern: KeyPattern::Single(KeyCode::Char('q')),
        action: Action::Quit,
        description: "Quit",
        category: Category::Other,
        alternatives: &[ctrl('c')],
        show_in_help: true,
    },
    // ═══════════════════════════════════════════════════════════════════════════
    // HELP OVERLAY
    // ═══════════════════════════════════════════════════════════════════════════
    KeyBinding {
        modes: &[Mode::Help],
        pattern: KeyPattern::Single(KeyCode::Char('j')),
        action: Action::HelpScrollDown,
        description: "Scroll down",
        category: Category::Navigation,
        alternatives: &[KeyPattern::Single(KeyCode::Down), ctrl('e')],
        show_in_help: false,
    },
    KeyBinding {
        modes: &[Mode::Help],
        pattern: KeyPattern::Single(KeyCode::Char('k')),
        action: Action::HelpScrollUp,
        description: "Scroll up",
        category: Category::Navigation,
        alternatives: &[KeyPattern::Single(KeyCode::Up), ctrl('y')],
        show_in_help: false,
    },
    KeyBinding {
        modes: &[Mode::Help],
        pattern: KeyPattern::Single(KeyCode::Char('?')),
        action: Action::CloseOverlay,
        description: "Close help",
        category: Category::Other,
        alternatives: &[
            KeyPattern::Single(KeyCode::Esc),
            KeyPattern::Single(KeyCode::Char('q')),
            ctrl('c'),
        ],
        show_in_help: false,
    },
    // ═══════════════════════════════════════════════════════════════════════════
    // ERROR OVERLAY
    // ═══════════════════════════════════════════════════════════════════════════
    KeyBinding {
        modes: &[Mode::Error],
        pattern: KeyPattern::Single(KeyCode::Enter),
        action: Action::DismissError,
        description: "Close",
        category: Category::Other,
        alternatives: &[
            KeyPattern::Single(KeyCode::Esc),
            KeyPattern::Single(KeyCode::Char('q')),
        ],
        show_in_help: false,
    },
];
