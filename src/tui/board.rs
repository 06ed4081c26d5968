//! Which issues of a tab sit in the board backlog.

use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("no board ID configured for this tab")]
    NoBoardConfigured,
    #[error("no board state information available")]
    NoBoardState,
}

/// Where an issue is relative to the tab's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowHighlight {
    OnBoard,
    OnBacklog,
}

/// Snapshot of a board's backlog, resolved when the tab loads.
///
/// After a successful toggle the snapshot is updated in place rather than
/// fetched again, so it may drift from the server until the next reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    board_id: u64,
    backlog: HashSet<String>,
}

impl BoardState {
    pub fn new(board_id: u64, backlog: impl IntoIterator<Item = String>) -> Self {
        Self {
            board_id,
            backlog: backlog.into_iter().collect(),
        }
    }

    pub fn board_id(&self) -> u64 {
        self.board_id
    }

    pub fn in_backlog(&self, key: &str) -> bool {
        self.backlog.contains(key)
    }

    pub fn is_on_board(&self, key: &str) -> bool {
        !self.in_backlog(key)
    }

    pub fn highlight(&self, key: &str) -> RowHighlight {
        if self.is_on_board(key) {
            RowHighlight::OnBoard
        } else {
            RowHighlight::OnBacklog
        }
    }

    pub fn set_in_backlog(&mut self, key: &str, in_backlog: bool) {
        if in_backlog {
            self.backlog.insert(key.to_string());
        } else {
            self.backlog.remove(key);
        }
    }
}

/// A backlog move decided from the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogToggle {
    pub board_id: u64,
    pub key: String,
    /// Target state: `true` moves the issue into the backlog.
    pub to_backlog: bool,
}

/// Decide which way `key` should move, without touching the network.
pub fn plan_toggle(
    board_id: Option<u64>,
    state: Option<&BoardState>,
    key: &str,
) -> Result<BacklogToggle, BoardError> {
    let board_id = board_id.ok_or(BoardError::NoBoardConfigured)?;
    let state = state.ok_or(BoardError::NoBoardState)?;
    Ok(BacklogToggle {
        board_id,
        key: key.to_string(),
        to_backlog: state.is_on_board(key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_membership() {
        let state = BoardState::new(7, vec!["ABC-2".to_string()]);
        assert!(state.is_on_board("ABC-1"));
        assert!(state.in_backlog("ABC-2"));
        assert_eq!(state.highlight("ABC-2"), RowHighlight::OnBacklog);
        assert_eq!(state.board_id(), 7);
    }

    #[test]
    fn test_optimistic_update() {
        let mut state = BoardState::new(7, Vec::new());
        state.set_in_backlog("ABC-1", true);
        assert!(!state.is_on_board("ABC-1"));
        state.set_in_backlog("ABC-1", false);
        assert!(state.is_on_board("ABC-1"));
    }

    #[test]
    fn test_plan_toggle_direction() {
        let state = BoardState::new(7, vec!["ABC-2".to_string()]);
        let plan = plan_toggle(Some(7), Some(&state), "ABC-1").unwrap();
        assert!(plan.to_backlog);
        let plan = plan_toggle(Some(7), Some(&state), "ABC-2").unwrap();
        assert!(!plan.to_backlog);
    }

    #[test]
    fn test_plan_toggle_errors() {
        let state = BoardState::new(7, Vec::new());
        assert_eq!(
            plan_toggle(None, Some(&state), "ABC-1").unwrap_err().to_string(),
            "no board ID configured for this tab"
        );
        assert_eq!(
            plan_toggle(Some(7), None, "ABC-1").unwrap_err().to_string(),
            "no board state information available"
        );
    }
}
