use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Installation;

/// Row-level view of an issue, as returned by bulk search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub key: String,
    pub issue_type: String,
    pub parent: Option<String>,
    pub summary: String,
    pub status: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub priority: Option<String>,
    pub resolution: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

/// Full issue, fetched lazily per key for the detail pane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueDetail {
    pub summary: IssueSummary,
    pub description: Option<RichText>,
    pub components: Vec<String>,
    pub watch_count: u32,
    pub is_watching: bool,
    /// Oldest first, as the API returns them. May be a suffix of all comments.
    pub comments: Vec<Comment>,
    pub comment_total: usize,
    pub subtasks: Vec<RelatedIssue>,
    pub links: Vec<IssueLink>,
}

impl IssueDetail {
    pub fn key(&self) -> &str {
        &self.summary.key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub created: Option<DateTime<Utc>>,
    pub body: RichText,
}

/// Compact reference to another issue (subtask or link target).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedIssue {
    pub key: String,
    pub summary: String,
    pub issue_type: String,
    pub status: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Relation as seen from this issue, e.g. "blocks" or "is blocked by".
    pub relation: String,
    pub issue: RelatedIssue,
}

/// Remote rich text: cloud sends ADF documents, server sends wiki text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    Plain(String),
    Adf(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub display_name: String,
    pub active: bool,
}

impl User {
    /// Identifier the assignee endpoint expects for this installation.
    pub fn assign_id(&self, installation: Installation) -> Option<&str> {
        match installation {
            Installation::Cloud => self.account_id.as_deref(),
            Installation::Local => self.name.as_deref(),
        }
    }
}

/// Anything the fuzzy selector can list.
pub trait Listable {
    fn title(&self) -> String;
    fn description(&self) -> String;
    /// Text the fuzzy matcher runs against.
    fn filter_key(&self) -> String;
}

impl Listable for IssueSummary {
    fn title(&self) -> String {
        self.key.clone()
    }

    fn description(&self) -> String {
        self.summary.clone()
    }

    fn filter_key(&self) -> String {
        format!("{} {}", self.key, self.summary)
    }
}

impl Listable for User {
    fn title(&self) -> String {
        self.display_name.clone()
    }

    fn description(&self) -> String {
        self.email.clone().unwrap_or_default()
    }

    fn filter_key(&self) -> String {
        format!(
            "{} {}",
            self.name.as_deref().unwrap_or(&self.display_name),
            self.email.as_deref().unwrap_or_default()
        )
    }
}

/// Table/detail timestamp format, in local time.
pub fn format_datetime(dt: Option<&DateTime<Utc>>) -> String {
    match dt {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}
