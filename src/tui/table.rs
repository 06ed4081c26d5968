//! One tab's issue list: filter state machine, cursor and detail cache.

use crate::data::{format_datetime, IssueDetail, IssueSummary};
use crate::tui::board::{BoardState, RowHighlight};
use crate::tui::cache::IssueCache;
use std::sync::Arc;

/// `Inactive --/--> Filtering --enter--> Active --esc--> Inactive`,
/// and `Filtering --esc--> Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Inactive,
    Filtering,
    Active,
}

/// Answer to "which issue should the detail pane show?"
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRequest {
    Ready(Arc<IssueDetail>),
    /// Not cached yet. The fetch result must be tagged with `row` so it can
    /// be dropped if the cursor has moved on by the time it arrives, and with
    /// `generation` so it is not cached if the key is invalidated meanwhile.
    Pending {
        key: String,
        row: usize,
        generation: u64,
    },
    /// No issue under the cursor.
    Empty,
}

#[derive(Debug, Default)]
pub struct IssueTable {
    issues: Vec<IssueSummary>,
    /// Indices into `issues`, in original order.
    visible: Vec<usize>,
    filter_mode: FilterMode,
    query: String,
    cursor: usize,
    offset: usize,
    height: usize,
    cache: IssueCache,
    board: Option<BoardState>,
    loading: bool,
}

impl IssueTable {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    /// Replace the issue set. Clears the cache and any filter.
    pub fn load(&mut self, issues: Vec<IssueSummary>) {
        self.visible = (0..issues.len()).collect();
        self.issues = issues;
        self.cache.clear();
        self.filter_mode = FilterMode::Inactive;
        self.query.clear();
        self.loading = false;
        self.clamp_cursor();
    }

    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_board(&mut self, board: Option<BoardState>) {
        self.board = board;
    }

    pub fn board(&self) -> Option<&BoardState> {
        self.board.as_ref()
    }

    pub fn board_mut(&mut self) -> Option<&mut BoardState> {
        self.board.as_mut()
    }

    pub fn row_highlight(&self, key: &str) -> Option<RowHighlight> {
        self.board.as_ref().map(|b| b.highlight(key))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Filter
    // ─────────────────────────────────────────────────────────────────────

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = FilterMode::Filtering;
        self.query.clear();
        self.recompute_visible();
    }

    /// Recompute the visible rows. Ignored unless the user is typing a filter.
    pub fn set_filter_query(&mut self, text: &str) {
        if self.filter_mode != FilterMode::Filtering {
            return;
        }
        self.query = text.to_string();
        self.recompute_visible();
        if !self.visible.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        }
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut text = self.query.clone();
        text.push(c);
        self.set_filter_query(&text);
    }

    pub fn pop_filter_char(&mut self) {
        let mut text = self.query.clone();
        text.pop();
        self.set_filter_query(&text);
    }

    /// Freeze the current subset until the next `/`.
    pub fn commit_filter(&mut self) {
        if self.filter_mode == FilterMode::Filtering {
            self.filter_mode = FilterMode::Active;
        }
    }

    pub fn cancel_filter(&mut self) {
        self.filter_mode = FilterMode::Inactive;
        self.query.clear();
        self.recompute_visible();
    }

    fn recompute_visible(&mut self) {
        if self.query.is_empty() {
            self.visible = (0..self.issues.len()).collect();
        } else {
            let needle = self.query.to_lowercase();
            self.visible = self
                .issues
                .iter()
                .enumerate()
                .filter(|(_, issue)| {
                    issue.key.to_lowercase().contains(&needle)
                        || issue.summary.to_lowercase().contains(&needle)
                })
                .map(|(i, _)| i)
                .collect();
        }
        self.clamp_cursor();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rows and cursor
    // ─────────────────────────────────────────────────────────────────────

    pub fn all_issues(&self) -> &[IssueSummary] {
        &self.issues
    }

    pub fn visible_issues(&self) -> impl Iterator<Item = &IssueSummary> {
        self.visible.iter().map(|&i| &self.issues[i])
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn issue_at(&self, row: usize) -> Option<&IssueSummary> {
        self.visible.get(row).map(|&i| &self.issues[i])
    }

    pub fn current_issue(&self) -> Option<&IssueSummary> {
        self.issue_at(self.cursor)
    }

    pub fn cursor_move(&mut self, delta: isize) {
        self.cursor = self.row_from_cursor(delta).unwrap_or(0);
        self.scroll_into_view();
    }

    fn row_from_cursor(&self, delta: isize) -> Option<usize> {
        let last = self.visible.len().checked_sub(1)?;
        Some((self.cursor as isize + delta).clamp(0, last as isize) as usize)
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.row_from_cursor(0).unwrap_or(0);
        self.scroll_into_view();
    }

    /// Number of issue rows that fit. Header and footer take one line each,
    /// and the filter prompt another while typing.
    pub fn body_rows(&self) -> usize {
        let chrome = if self.filter_mode == FilterMode::Filtering {
            3
        } else {
            2
        };
        self.height.saturating_sub(chrome).max(1)
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.scroll_into_view();
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn scroll_into_view(&mut self) {
        let rows = self.body_rows();
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + rows {
            self.offset = self.cursor + 1 - rows;
        }
        let max_offset = self.visible.len().saturating_sub(rows);
        self.offset = self.offset.min(max_offset);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Detail cache
    // ─────────────────────────────────────────────────────────────────────

    /// Detail for the row `row_offset` away from the cursor, clamped to the
    /// visible rows.
    pub fn request_detail(&self, row_offset: isize) -> DetailRequest {
        let Some(row) = self.row_from_cursor(row_offset) else {
            return DetailRequest::Empty;
        };
        let Some(issue) = self.issue_at(row) else {
            return DetailRequest::Empty;
        };
        match self.cache.get(&issue.key) {
            Some(detail) => DetailRequest::Ready(detail),
            None => DetailRequest::Pending {
                key: issue.key.clone(),
                row,
                generation: self.cache.generation(&issue.key),
            },
        }
    }

    /// Cache a detail fetched under `generation`. `None` means the key was
    /// invalidated or the table reloaded since, and the detail was dropped.
    pub fn store_detail(
        &mut self,
        detail: impl Into<Arc<IssueDetail>>,
        generation: u64,
    ) -> Option<Arc<IssueDetail>> {
        self.cache.insert(detail, generation)
    }

    pub fn generation(&self, key: &str) -> u64 {
        self.cache.generation(key)
    }

    pub fn cached(&self, key: &str) -> Option<Arc<IssueDetail>> {
        self.cache.get(key)
    }

    /// Whether a result fetched for (`row`, `key`) still matches the cursor.
    pub fn is_current(&self, row: usize, key: &str) -> bool {
        self.cursor == row && self.current_issue().is_some_and(|i| i.key == key)
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        self.cache.invalidate(key)
    }

    /// Keys of the first `n` visible rows that are not cached yet, with the
    /// generation each fetch starts under.
    pub fn keys_from_top(&self, n: usize) -> Vec<(String, u64)> {
        self.visible_issues()
            .take(n)
            .filter(|issue| !self.cache.contains(&issue.key))
            .map(|issue| (issue.key.clone(), self.cache.generation(&issue.key)))
            .collect()
    }
}

/// Text of one table cell.
pub fn column_value(issue: &IssueSummary, column: &str) -> String {
    match column {
        "KEY" => issue.key.clone(),
        "TYPE" => issue.issue_type.clone(),
        "PARENT" => issue.parent.clone().unwrap_or_default(),
        "SUMMARY" => issue.summary.clone(),
        "STATUS" => issue.status.clone(),
        "ASSIGNEE" => issue.assignee.clone().unwrap_or_default(),
        "REPORTER" => issue.reporter.clone().unwrap_or_default(),
        "CREATED" => format_datetime(issue.created.as_ref()),
        "PRIORITY" => issue.priority.clone().unwrap_or_default(),
        "RESOLUTION" => issue.resolution.clone().unwrap_or_default(),
        "UPDATED" => format_datetime(issue.updated.as_ref()),
        "LABELS" => issue.labels.join(","),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue(key: &str, summary: &str) -> IssueSummary {
        IssueSummary {
            key: key.to_string(),
            summary: summary.to_string(),
            ..Default::default()
        }
    }

    fn table() -> IssueTable {
        let mut t = IssueTable::new();
        t.set_height(10);
        t.load(vec![
            issue("ABC-1", "Login page broken"),
            issue("ABC-2", "Add dark mode"),
            issue("ABC-3", "login timeout"),
        ]);
        t
    }

    fn store(t: &mut IssueTable, key: &str) {
        let generation = t.generation(key);
        t.store_detail(
            IssueDetail {
                summary: issue(key, ""),
                ..Default::default()
            },
            generation,
        );
    }

    fn visible_keys(t: &IssueTable) -> Vec<String> {
        t.visible_issues().map(|i| i.key.clone()).collect()
    }

    #[test]
    fn test_filter_is_case_insensitive_subsequence() {
        let mut t = table();
        t.enter_filter_mode();
        t.set_filter_query("LOGIN");
        assert_eq!(visible_keys(&t), vec!["ABC-1", "ABC-3"]);
        t.set_filter_query("abc-2");
        assert_eq!(visible_keys(&t), vec!["ABC-2"]);
    }

    #[test]
    fn test_empty_query_shows_everything() {
        let mut t = table();
        t.enter_filter_mode();
        t.set_filter_query("");
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_query_ignored_outside_filtering() {
        let mut t = table();
        t.set_filter_query("dark");
        assert_eq!(t.len(), 3);
        assert_eq!(t.query(), "");
    }

    #[test]
    fn test_commit_then_cancel() {
        let mut t = table();
        t.enter_filter_mode();
        t.set_filter_query("dark");
        t.commit_filter();
        assert_eq!(t.filter_mode(), FilterMode::Active);
        assert_eq!(visible_keys(&t), vec!["ABC-2"]);

        t.cancel_filter();
        assert_eq!(t.filter_mode(), FilterMode::Inactive);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_typing_resets_cursor_when_results_exist() {
        let mut t = table();
        t.cursor_move(2);
        t.enter_filter_mode();
        t.push_filter_char('l');
        assert_eq!(t.cursor(), 0);
    }

    #[test]
    fn test_cursor_clamps() {
        let mut t = table();
        t.cursor_move(10);
        assert_eq!(t.cursor(), 2);
        t.cursor_move(-10);
        assert_eq!(t.cursor(), 0);

        let mut empty = IssueTable::new();
        empty.load(Vec::new());
        empty.cursor_move(1);
        assert_eq!(empty.cursor(), 0);
        assert_eq!(empty.request_detail(0), DetailRequest::Empty);
    }

    #[test]
    fn test_request_detail_pending_then_ready() {
        let mut t = table();
        assert_eq!(
            t.request_detail(1),
            DetailRequest::Pending {
                key: "ABC-2".to_string(),
                row: 1,
                generation: t.generation("ABC-2"),
            }
        );

        store(&mut t, "ABC-2");
        assert!(matches!(t.request_detail(1), DetailRequest::Ready(_)));

        t.invalidate("ABC-2");
        assert!(matches!(t.request_detail(1), DetailRequest::Pending { .. }));
    }

    #[test]
    fn test_detail_fetched_before_reload_is_dropped() {
        let mut t = table();
        let DetailRequest::Pending { generation, .. } = t.request_detail(1) else {
            panic!("expected a fetch");
        };
        t.load(vec![issue("ABC-1", "again"), issue("ABC-2", "again")]);

        let late = IssueDetail {
            summary: issue("ABC-2", "Add dark mode"),
            ..Default::default()
        };
        assert!(t.store_detail(late, generation).is_none());
        assert!(t.cached("ABC-2").is_none());
    }

    #[test]
    fn test_is_current() {
        let mut t = table();
        t.cursor_move(1);
        assert!(t.is_current(1, "ABC-2"));
        assert!(!t.is_current(0, "ABC-1"));
    }

    #[test]
    fn test_keys_from_top_skips_cached() {
        let mut t = table();
        store(&mut t, "ABC-1");
        let generation = t.generation("ABC-2");
        assert_eq!(t.keys_from_top(2), vec![("ABC-2".to_string(), generation)]);
    }

    #[test]
    fn test_load_clears_cache_and_filter() {
        let mut t = table();
        store(&mut t, "ABC-1");
        t.enter_filter_mode();
        t.set_filter_query("dark");
        t.load(vec![issue("ABC-1", "again")]);
        assert!(t.cached("ABC-1").is_none());
        assert_eq!(t.filter_mode(), FilterMode::Inactive);
        assert!(!t.is_loading());
    }

    #[test]
    fn test_scroll_keeps_cursor_visible() {
        let mut t = IssueTable::new();
        t.set_height(4);
        t.load((0..10).map(|i| issue(&format!("ABC-{i}"), "")).collect());
        assert_eq!(t.body_rows(), 2);
        t.cursor_move(5);
        assert_eq!(t.offset(), 4);
        t.cursor_move(-5);
        assert_eq!(t.offset(), 0);
    }

    #[test]
    fn test_column_values() {
        let mut i = issue("ABC-1", "Title");
        i.labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(column_value(&i, "LABELS"), "a,b");
        assert_eq!(column_value(&i, "ASSIGNEE"), "");
        assert_eq!(column_value(&i, "KEY"), "ABC-1");
    }
}
