//! Centralized keybindings system.
//!
//! The registry defines every binding once; dispatch and the help overlay
//! are both derived from it.

mod dispatch;
mod help;
mod registry;

pub use dispatch::dispatch;
pub use help::generate_help_for_mode;
pub use registry::BINDINGS;

use crossterm::event::{KeyCode, KeyModifiers};

/// All contexts where keybindings apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Issue table and detail pane
    Normal,
    /// Typing a table filter after `/`
    Filtering,
    /// Fuzzy selector overlay
    Fuzzy,
    /// Help overlay
    Help,
    /// Error overlay
    Error,
}

impl Mode {
    /// Returns true if this mode accepts text input (chars are not dispatched as commands).
    pub fn is_text_input(&self) -> bool {
        matches!(self, Mode::Filtering | Mode::Fuzzy)
    }
}

/// Categories for grouping bindings in help display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Navigation,
    IssueActions,
    Assignment,
    Other,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Navigation => "Navigation",
            Category::IssueActions => "Issue Actions",
            Category::Assignment => "Assignment",
            Category::Other => "Other",
        }
    }
}

/// What a binding does, independent of the key that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveDown,
    MoveUp,
    NextTab,
    PrevTab,
    StartFilter,
    ScrollDetailDown,
    ScrollDetailUp,
    CycleLink,
    OpenInBrowser,
    CopyUrl,
    CreateIssue,
    EditIssue,
    MoveIssue,
    AddComment,
    ToggleBacklog,
    Reload,
    AssignUser,
    AssignEpic,
    ToggleHelp,
    Back,
    Quit,
    HelpScrollDown,
    HelpScrollUp,
    CloseOverlay,
    DismissError,
}

/// Pattern for matching key events.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// Single key without modifiers (e.g., 'j', Enter, Esc)
    Single(KeyCode),
    /// Key with modifiers (e.g., Ctrl+r)
    WithModifier { key: KeyCode, mods: KeyModifiers },
}

impl KeyPattern {
    /// Format this pattern for display in help text.
    pub fn display(&self) -> String {
        match self {
            KeyPattern::Single(code) => format_keycode(code),
            KeyPattern::WithModifier { key, mods } => {
                let mut result = String::new();
                if mods.contains(KeyModifiers::CONTROL) {
                    result.push_str("ctrl+");
                }
                if mods.contains(KeyModifiers::ALT) {
                    result.push_str("alt+");
                }
                if mods.contains(KeyModifiers::SHIFT) {
                    result.push_str("shift+");
                }
                result.push_str(&format_keycode(key));
                result
            }
        }
    }
}

fn format_keycode(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        _ => format!("{:?}", code),
    }
}

/// A complete keybinding definition.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// Modes where this binding applies
    pub modes: &'static [Mode],
    /// The key pattern to match
    pub pattern: KeyPattern,
    pub action: Action,
    /// Human-readable description for help text
    pub description: &'static str,
    /// Category for grouping in help
    pub category: Category,
    /// Alternative key patterns (e.g., j and Down for same action)
    pub alternatives: &'static [KeyPattern],
    /// Whether to show this binding in help
    pub show_in_help: bool,
}
