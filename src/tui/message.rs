use crate::data::{IssueDetail, IssueSummary, User};
use crate::tui::board::BoardState;
use crate::tui::subprocess::{ExecKind, ExecOutcome};
use std::sync::Arc;

/// Result of loading a tab: its issues plus board membership when the tab
/// has a board configured and the backlog query succeeded.
#[derive(Debug, Clone)]
pub struct TabLoad {
    pub issues: Vec<IssueSummary>,
    pub board: Option<BoardState>,
}

/// All messages that can update the application state.
/// Background task results carry errors as strings since they cross task boundaries.
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Quit the application
    Quit,
    /// Esc in normal mode: clear an active filter, otherwise quit
    Back,
    /// Terminal was resized
    Resize { width: u16, height: u16 },

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    MoveDown,
    MoveUp,
    NextTab,
    PrevTab,
    ScrollDetailDown,
    ScrollDetailUp,
    /// Select the next link in the detail pane and copy its URL
    CycleLink,

    // ─────────────────────────────────────────────────────────────────────────
    // Filter
    // ─────────────────────────────────────────────────────────────────────────
    StartFilter,
    FilterInput(char),
    FilterBackspace,
    CommitFilter,
    CancelFilter,

    // ─────────────────────────────────────────────────────────────────────────
    // Issue actions
    // ─────────────────────────────────────────────────────────────────────────
    OpenInBrowser,
    CopyUrl,
    CreateIssue,
    EditIssue,
    MoveIssue,
    AddComment,
    ToggleBacklog,
    /// Drop the tab's cache and reload it from the server
    Reload,
    /// Open the assignee selector
    OpenUserSelector,
    /// Open the epic selector
    OpenEpicSelector,

    // ─────────────────────────────────────────────────────────────────────────
    // Overlays
    // ─────────────────────────────────────────────────────────────────────────
    ToggleHelp,
    HelpScroll(isize),
    CloseOverlay,
    SelectorInput(char),
    SelectorBackspace,
    SelectorMove(isize),
    SelectorPick,
    DismissError,

    // ─────────────────────────────────────────────────────────────────────────
    // Background task results
    // ─────────────────────────────────────────────────────────────────────────
    /// Tab search (and board state) finished
    IssuesLoaded {
        tab: usize,
        result: Result<TabLoad, String>,
    },
    /// Detail for the row under (or next to) the cursor arrived
    DetailLoaded {
        tab: usize,
        row: usize,
        key: String,
        /// Cache generation of `key` when the fetch started
        generation: u64,
        result: Result<Arc<IssueDetail>, String>,
    },
    /// Warm-up fetch finished; only fills the cache
    Prefetched {
        tab: usize,
        key: String,
        generation: u64,
        result: Result<Arc<IssueDetail>, String>,
    },
    UsersLoaded(Result<Vec<User>, String>),
    EpicsLoaded {
        tab: usize,
        result: Result<Vec<IssueSummary>, String>,
    },
    UserAssigned {
        tab: usize,
        key: String,
        result: Result<(), String>,
    },
    BacklogToggled {
        tab: usize,
        key: String,
        to_backlog: bool,
        result: Result<(), String>,
    },
    /// A suspended-terminal child command exited
    SubprocessFinished {
        tab: usize,
        kind: ExecKind,
        key: Option<String>,
        outcome: ExecOutcome,
    },

    /// No-op
    None,
}
