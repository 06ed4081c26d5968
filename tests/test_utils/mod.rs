//! Test utilities and fixtures for jira-tui tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use jira_tui::config::{Config, TabConfig};
use jira_tui::data::{IssueDetail, IssueSummary, RichText, User};
use jira_tui::jira::{IssueService, SearchPage, Transition};
use jira_tui::tui::{App, Message};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SERVER: &str = "https://jira.example.com";

/// Config with one tab per name and no prefetching, so every detail fetch
/// in a test is one the test asked for.
pub fn test_config(tabs: &[&str]) -> Config {
    let mut config = Config::new(SERVER, "me@example.com", "ABC");
    config.tabs = tabs
        .iter()
        .map(|name| TabConfig {
            name: name.to_string(),
            ..TabConfig::default()
        })
        .collect();
    config.ui.list.prefetch_from_top = 0;
    config
}

pub fn issue(key: &str, summary: &str) -> IssueSummary {
    IssueSummary {
        key: key.to_string(),
        issue_type: "Task".to_string(),
        summary: summary.to_string(),
        status: "To Do".to_string(),
        ..IssueSummary::default()
    }
}

pub fn detail(key: &str, summary: &str) -> IssueDetail {
    IssueDetail {
        summary: issue(key, summary),
        description: Some(RichText::Plain(format!("Description of {key}"))),
        ..IssueDetail::default()
    }
}

pub fn user(name: &str) -> User {
    User {
        account_id: Some(format!("id-{}", name.to_lowercase())),
        name: None,
        email: Some(format!("{}@example.com", name.to_lowercase())),
        display_name: name.to_string(),
        active: true,
    }
}

/// In-memory issue service that records every call.
#[derive(Default)]
pub struct FakeService {
    pub issues: Mutex<Vec<IssueSummary>>,
    pub details: Mutex<HashMap<String, IssueDetail>>,
    pub backlog: Mutex<Vec<String>>,
    pub users: Mutex<Vec<User>>,
    pub epics: Mutex<Vec<IssueSummary>>,
    /// Per-key latency for `get_issue`
    pub delays: Mutex<HashMap<String, Duration>>,
    pub fail_search: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
    /// Delayed `get_issue` calls currently sleeping, and the most seen at once
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeService {
    /// A service holding `keys`, each with a matching detail.
    pub fn with_issues(keys: &[&str]) -> Arc<Self> {
        let service = Self::default();
        {
            let mut issues = service.issues.lock().unwrap();
            let mut details = service.details.lock().unwrap();
            for (i, key) in keys.iter().enumerate() {
                let summary = format!("Issue number {}", i + 1);
                issues.push(issue(key, &summary));
                details.insert(key.to_string(), detail(key, &summary));
            }
        }
        Arc::new(service)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn set_summary(&self, key: &str, summary: &str) {
        let mut details = self.details.lock().unwrap();
        if let Some(d) = details.get_mut(key) {
            d.summary.summary = summary.to_string();
        }
    }

    pub fn delay(&self, key: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(key.to_string(), delay);
    }

    /// Most delayed `get_issue` calls that were in flight at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueService for FakeService {
    async fn search(&self, jql: &str, _from: usize, _limit: usize) -> Result<SearchPage> {
        self.record(format!("search {jql}"));
        if let Some(error) = self.fail_search.lock().unwrap().clone() {
            anyhow::bail!(error);
        }
        let issues = if jql.contains("issuetype=\"Epic\"") {
            self.epics.lock().unwrap().clone()
        } else {
            self.issues.lock().unwrap().clone()
        };
        Ok(SearchPage {
            total: issues.len(),
            issues,
        })
    }

    async fn get_issue(&self, key: &str, _comment_limit: usize) -> Result<IssueDetail> {
        self.record(format!("get_issue {key}"));
        // Read before the delay: a slow reply carries what the server had
        // when it was asked
        let found = self.details.lock().unwrap().get(key).cloned();
        let delay = self.delays.lock().unwrap().get(key).copied();
        if let Some(delay) = delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        found.ok_or_else(|| anyhow::anyhow!("Issue {key} does not exist"))
    }

    async fn assign(&self, key: &str, user: Option<&User>) -> Result<()> {
        let name = user.map(|u| u.display_name.clone()).unwrap_or_default();
        self.record(format!("assign {key} {name}"));
        Ok(())
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        self.record(format!("transitions {key}"));
        Ok(Vec::new())
    }

    async fn transition(&self, key: &str, target: &str) -> Result<()> {
        self.record(format!("transition {key} {target}"));
        Ok(())
    }

    async fn backlog_members(&self, board_id: u64, _jql: &str) -> Result<Vec<IssueSummary>> {
        self.record(format!("backlog_members {board_id}"));
        Ok(self
            .backlog
            .lock()
            .unwrap()
            .iter()
            .map(|key| issue(key, ""))
            .collect())
    }

    async fn move_to_backlog(&self, board_id: u64, key: &str) -> Result<()> {
        self.record(format!("move_to_backlog {board_id} {key}"));
        Ok(())
    }

    async fn move_to_board(&self, board_id: u64, key: &str) -> Result<()> {
        self.record(format!("move_to_board {board_id} {key}"));
        Ok(())
    }

    async fn assignable_users(&self, key: &str) -> Result<Vec<User>> {
        self.record(format!("assignable_users {key}"));
        Ok(self.users.lock().unwrap().clone())
    }
}

/// Build an app over `service`, sized 100x40.
pub fn app_with(config: Config, service: Arc<FakeService>) -> App {
    let mut app = App::new(config, service, None);
    app.update(Message::Resize {
        width: 100,
        height: 40,
    })
    .unwrap();
    app
}

/// Receive the next background message and apply it.
pub async fn pump(app: &mut App) -> Message {
    let msg = tokio::time::timeout(Duration::from_secs(5), app.recv_message())
        .await
        .expect("timed out waiting for a background message")
        .expect("message channel closed");
    app.update(msg.clone()).unwrap();
    msg
}

/// Apply background messages until one matches `done`.
pub async fn pump_until(app: &mut App, done: impl Fn(&Message) -> bool) -> Message {
    loop {
        let msg = pump(app).await;
        if done(&msg) {
            return msg;
        }
    }
}

/// Start the app and wait for the first tab and its first detail.
pub async fn started(config: Config, service: Arc<FakeService>) -> App {
    let mut app = app_with(config, service);
    app.start();
    let loaded = pump_until(&mut app, |m| matches!(m, Message::IssuesLoaded { .. })).await;
    let has_issues = matches!(
        &loaded,
        Message::IssuesLoaded { result: Ok(load), .. } if !load.issues.is_empty()
    );
    if has_issues {
        pump_until(&mut app, |m| matches!(m, Message::DetailLoaded { .. })).await;
    }
    app
}

pub fn shown_key(app: &App) -> Option<String> {
    app.active_tab()
        .detail
        .issue()
        .map(|d| d.key().to_string())
}
