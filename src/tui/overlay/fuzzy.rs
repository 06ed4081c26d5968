//! Searchable picker used for epic and assignee selection.

use crate::data::{IssueSummary, Listable, User};
use crate::tui::search::FuzzySearch;

/// Rows taken by the border, the query line and the separator under it.
const CHROME_ROWS: u16 = 4;

pub struct FuzzySelector<T: Listable> {
    title: &'static str,
    items: Vec<T>,
    matches: Vec<usize>,
    query: String,
    cursor: usize,
    offset: usize,
    search: FuzzySearch,
    width: u16,
    height: u16,
}

impl<T: Listable> FuzzySelector<T> {
    pub fn new(title: &'static str, items: Vec<T>, width: u16, height: u16) -> Self {
        let matches = (0..items.len()).collect();
        Self {
            title,
            items,
            matches,
            query: String::new(),
            cursor: 0,
            offset: 0,
            search: FuzzySearch::new(),
            width,
            height,
        }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.keep_cursor_visible();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.rerank();
    }

    pub fn pop_char(&mut self) {
        if self.query.pop().is_some() {
            self.rerank();
        }
    }

    fn rerank(&mut self) {
        self.matches = self.search.rank(&self.items, &self.query);
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.matches.is_empty() {
            return;
        }
        let last = self.matches.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
        self.keep_cursor_visible();
    }

    /// Rows available for items inside the overlay box.
    pub fn list_rows(&self) -> usize {
        self.height.saturating_sub(CHROME_ROWS).max(1) as usize
    }

    fn keep_cursor_visible(&mut self) {
        let rows = self.list_rows();
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + rows {
            self.offset = self.cursor + 1 - rows;
        }
    }

    /// Ranked items in the current window, paired with whether each is selected.
    pub fn visible(&self) -> impl Iterator<Item = (&T, bool)> {
        self.matches
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(self.list_rows())
            .map(|(pos, &i)| (&self.items[i], pos == self.cursor))
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn selected(&self) -> Option<&T> {
        self.matches.get(self.cursor).map(|&i| &self.items[i])
    }
}

/// What a pick is going to be applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickTarget {
    pub tab: usize,
    pub key: String,
}

pub enum FuzzyOverlay {
    Epic {
        target: PickTarget,
        selector: FuzzySelector<IssueSummary>,
    },
    User {
        target: PickTarget,
        selector: FuzzySelector<User>,
    },
}

/// The discriminated result of a pick, routed by kind.
#[derive(Debug, Clone)]
pub enum Picked {
    Epic { target: PickTarget, epic: IssueSummary },
    User { target: PickTarget, user: User },
}

pub const EPIC_TITLE: &str = "Select an epic to assign to:";
pub const USER_TITLE: &str = "Assign this issue to:";

impl FuzzyOverlay {
    pub fn epics(target: PickTarget, epics: Vec<IssueSummary>, width: u16, height: u16) -> Self {
        FuzzyOverlay::Epic {
            target,
            selector: FuzzySelector::new(EPIC_TITLE, epics, width, height),
        }
    }

    pub fn users(target: PickTarget, users: Vec<User>, width: u16, height: u16) -> Self {
        FuzzyOverlay::User {
            target,
            selector: FuzzySelector::new(USER_TITLE, users, width, height),
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self {
            FuzzyOverlay::Epic { selector, .. } => selector.push_char(c),
            FuzzyOverlay::User { selector, .. } => selector.push_char(c),
        }
    }

    pub fn pop_char(&mut self) {
        match self {
            FuzzyOverlay::Epic { selector, .. } => selector.pop_char(),
            FuzzyOverlay::User { selector, .. } => selector.pop_char(),
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        match self {
            FuzzyOverlay::Epic { selector, .. } => selector.move_cursor(delta),
            FuzzyOverlay::User { selector, .. } => selector.move_cursor(delta),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        match self {
            FuzzyOverlay::Epic { selector, .. } => selector.resize(width, height),
            FuzzyOverlay::User { selector, .. } => selector.resize(width, height),
        }
    }

    pub fn size(&self) -> (u16, u16) {
        match self {
            FuzzyOverlay::Epic { selector, .. } => selector.size(),
            FuzzyOverlay::User { selector, .. } => selector.size(),
        }
    }

    /// The highlighted item, if the filtered list is not empty.
    pub fn pick(&self) -> Option<Picked> {
        match self {
            FuzzyOverlay::Epic { target, selector } => selector.selected().map(|epic| {
                Picked::Epic {
                    target: target.clone(),
                    epic: epic.clone(),
                }
            }),
            FuzzyOverlay::User { target, selector } => {
                selector.selected().map(|user| Picked::User {
                    target: target.clone(),
                    user: user.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn epic(key: &str, summary: &str) -> IssueSummary {
        IssueSummary {
            key: key.to_string(),
            issue_type: "Epic".to_string(),
            summary: summary.to_string(),
            ..IssueSummary::default()
        }
    }

    fn target() -> PickTarget {
        PickTarget {
            tab: 0,
            key: "ABC-1".to_string(),
        }
    }

    #[test]
    fn test_query_narrows_and_resets_cursor() {
        let mut selector = FuzzySelector::new(
            EPIC_TITLE,
            vec![epic("ABC-10", "Billing"), epic("ABC-11", "Onboarding")],
            80,
            20,
        );
        selector.move_cursor(1);
        assert_eq!(selector.cursor(), 1);

        for c in "onboard".chars() {
            selector.push_char(c);
        }
        assert_eq!(selector.cursor(), 0);
        assert_eq!(selector.match_count(), 1);
        assert_eq!(selector.selected().map(|e| e.key.as_str()), Some("ABC-11"));
    }

    #[test]
    fn test_cursor_clamps() {
        let mut selector =
            FuzzySelector::new(EPIC_TITLE, vec![epic("ABC-10", "Billing")], 80, 20);
        selector.move_cursor(-3);
        assert_eq!(selector.cursor(), 0);
        selector.move_cursor(5);
        assert_eq!(selector.cursor(), 0);
    }

    #[test]
    fn test_window_follows_cursor() {
        let epics = (0..10)
            .map(|i| epic(&format!("ABC-{}", i), "Epic"))
            .collect();
        // 7 rows tall leaves 3 list rows
        let mut selector = FuzzySelector::new(EPIC_TITLE, epics, 80, 7);
        selector.move_cursor(5);
        let keys: Vec<_> = selector.visible().map(|(e, _)| e.key.clone()).collect();
        assert_eq!(keys, vec!["ABC-3", "ABC-4", "ABC-5"]);
    }

    #[test]
    fn test_pick_carries_kind_and_target() {
        let overlay = FuzzyOverlay::epics(target(), vec![epic("ABC-10", "Billing")], 80, 20);
        match overlay.pick() {
            Some(Picked::Epic { target, epic }) => {
                assert_eq!(target.key, "ABC-1");
                assert_eq!(epic.key, "ABC-10");
            }
            other => panic!("unexpected pick: {:?}", other),
        }

        let mut empty = FuzzyOverlay::users(target(), Vec::new(), 80, 20);
        empty.push_char('x');
        assert!(empty.pick().is_none());
    }
}
