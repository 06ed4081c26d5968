//! Tests for cursor and tab navigation against an in-memory issue service.
//!
//! These tests verify that:
//! 1. The first issue's detail is shown after a tab loads
//! 2. Out-of-order detail fetches never overwrite the row under the cursor
//! 3. Tabs wrap, load lazily and stay sized while in the background

mod test_utils;

use pretty_assertions::assert_eq;
use std::time::Duration;
use test_utils::{app_with, pump, pump_until, shown_key, started, test_config, FakeService};

use jira_tui::tui::Message;

#[tokio::test]
async fn test_first_issue_detail_is_shown() {
    let service = FakeService::with_issues(&["ABC-1", "ABC-2"]);
    let app = started(test_config(&[]), service.clone()).await;

    assert_eq!(app.active_tab().table.len(), 2);
    assert_eq!(shown_key(&app).as_deref(), Some("ABC-1"));
    assert_eq!(service.count("get_issue"), 1);
}

#[tokio::test]
async fn test_rapid_moves_show_only_final_row() {
    let service = FakeService::with_issues(&["ABC-1", "ABC-2", "ABC-3"]);
    let mut app = started(test_config(&[]), service.clone()).await;

    // ABC-2 answers after ABC-3 does
    service.delay("ABC-2", Duration::from_millis(150));
    app.update(Message::MoveDown).unwrap();
    app.update(Message::MoveDown).unwrap();
    assert!(app.active_tab().detail.is_loading());

    let first = pump(&mut app).await;
    assert!(matches!(first, Message::DetailLoaded { ref key, .. } if key == "ABC-3"));
    assert_eq!(shown_key(&app).as_deref(), Some("ABC-3"));

    let second = pump(&mut app).await;
    assert!(matches!(second, Message::DetailLoaded { ref key, .. } if key == "ABC-2"));
    assert_eq!(shown_key(&app).as_deref(), Some("ABC-3"));

    // The late result still warms the cache
    assert!(app.active_tab().table.cached("ABC-2").is_some());
}

#[tokio::test]
async fn test_cached_detail_is_shown_without_fetch() {
    let service = FakeService::with_issues(&["ABC-1", "ABC-2"]);
    let mut app = started(test_config(&[]), service.clone()).await;

    app.update(Message::MoveDown).unwrap();
    pump_until(&mut app, |m| matches!(m, Message::DetailLoaded { .. })).await;
    app.update(Message::MoveUp).unwrap();

    assert_eq!(shown_key(&app).as_deref(), Some("ABC-1"));
    assert!(!app.active_tab().detail.is_loading());
    assert_eq!(service.count("get_issue ABC-1"), 1);
}

#[tokio::test]
async fn test_cursor_stops_at_edges() {
    let service = FakeService::with_issues(&["ABC-1", "ABC-2"]);
    let mut app = started(test_config(&[]), service.clone()).await;

    app.update(Message::MoveUp).unwrap();
    assert_eq!(app.active_tab().table.cursor(), 0);
    // Staying on the same row does not refetch
    assert_eq!(service.count("get_issue"), 1);
}

#[tokio::test]
async fn test_empty_tab_renders_without_fetching() {
    let service = FakeService::with_issues(&[]);
    let mut app = started(test_config(&[]), service.clone()).await;

    let tab = app.active_tab();
    assert!(tab.table.is_empty());
    assert!(!tab.table.is_loading());
    assert!(!tab.detail.is_loading());
    assert!(tab.detail.issue().is_none());

    app.update(Message::MoveDown).unwrap();
    app.update(Message::CycleLink).unwrap();
    app.update(Message::EditIssue).unwrap();
    assert!(app.take_pending_exec().is_none());
    assert_eq!(service.count("get_issue"), 0);
}

#[tokio::test]
async fn test_tabs_wrap_and_load_once() {
    let service = FakeService::with_issues(&["ABC-1"]);
    let mut app = started(test_config(&["Mine", "Team"]), service.clone()).await;
    assert_eq!(service.count("search"), 1);

    app.update(Message::PrevTab).unwrap();
    assert_eq!(app.active(), 1);
    pump_until(&mut app, |m| matches!(m, Message::DetailLoaded { tab: 1, .. })).await;
    assert_eq!(service.count("search"), 2);

    app.update(Message::NextTab).unwrap();
    assert_eq!(app.active(), 0);
    app.update(Message::NextTab).unwrap();
    assert_eq!(app.active(), 1);
    assert_eq!(service.count("search"), 2);
}

#[tokio::test]
async fn test_resize_sizes_every_tab() {
    let service = FakeService::with_issues(&["ABC-1"]);
    let mut app = app_with(test_config(&["Mine", "Team"]), service);

    app.update(Message::Resize {
        width: 120,
        height: 52,
    })
    .unwrap();

    // 2 rows of tab band, 40% of the rest to the table, one separator row
    for tab in app.tabs() {
        assert_eq!(tab.table.height(), 20);
        assert_eq!(tab.detail.size(), (120, 29));
    }
}

#[tokio::test]
async fn test_single_tab_has_no_band() {
    let service = FakeService::with_issues(&["ABC-1"]);
    let mut app = app_with(test_config(&[]), service);

    app.update(Message::Resize {
        width: 80,
        height: 50,
    })
    .unwrap();
    assert_eq!(app.pane_heights(), (20, 29));
}
