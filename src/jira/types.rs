//! Wire shapes of the Jira REST API and their conversion into domain types.

use crate::data::{
    Comment, IssueDetail, IssueLink, IssueSummary, RelatedIssue, RichText, User,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Fields requested for table rows.
pub const SUMMARY_FIELDS: &str =
    "summary,issuetype,parent,status,assignee,reporter,priority,resolution,created,updated,labels";

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub issues: Vec<IssueSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub id: String,
    pub name: String,
    /// Status the issue lands in after the transition.
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    issues: Vec<IssueNode>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueNode {
    key: String,
    #[serde(default)]
    fields: FieldsNode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FieldsNode {
    summary: String,
    description: Option<RichText>,
    labels: Vec<String>,
    resolution: Option<NamedNode>,
    #[serde(rename = "issuetype")]
    issue_type: Option<NamedNode>,
    parent: Option<ParentNode>,
    assignee: Option<UserNode>,
    priority: Option<NamedNode>,
    reporter: Option<UserNode>,
    watches: Option<WatchesNode>,
    status: Option<NamedNode>,
    components: Vec<NamedNode>,
    comment: Option<CommentsNode>,
    subtasks: Vec<IssueNode>,
    #[serde(rename = "issuelinks")]
    issue_links: Vec<LinkNode>,
    created: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedNode {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ParentNode {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserNode {
    account_id: Option<String>,
    name: Option<String>,
    email_address: Option<String>,
    #[serde(default)]
    display_name: String,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchesNode {
    #[serde(default)]
    watch_count: u32,
    #[serde(default)]
    is_watching: bool,
}

#[derive(Debug, Deserialize)]
struct CommentsNode {
    #[serde(default)]
    comments: Vec<CommentNode>,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct CommentNode {
    #[serde(default)]
    id: String,
    author: Option<UserNode>,
    body: Option<RichText>,
    created: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkNode {
    #[serde(rename = "type")]
    link_type: LinkTypeNode,
    inward_issue: Option<IssueNode>,
    outward_issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct LinkTypeNode {
    #[serde(default)]
    inward: String,
    #[serde(default)]
    outward: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<TransitionNode>,
}

#[derive(Debug, Deserialize)]
struct TransitionNode {
    id: String,
    name: String,
    to: Option<NamedNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedIssue {
    pub key: String,
}

/// Jira error body: `{"errorMessages": [...], "errors": {"field": "msg"}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    error_messages: Vec<String>,
    errors: HashMap<String, String>,
}

impl ErrorBody {
    pub(crate) fn describe(&self) -> Option<String> {
        let mut parts = self.error_messages.clone();
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort();
        parts.extend(fields.into_iter().map(|(field, msg)| format!("{field}: {msg}")));
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Jira timestamps look like `2024-03-01T09:15:00.000+0000`.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn name_of(node: Option<NamedNode>) -> Option<String> {
    node.map(|n| n.name).filter(|n| !n.is_empty())
}

impl UserNode {
    fn label(&self) -> String {
        if !self.display_name.is_empty() {
            return self.display_name.clone();
        }
        self.name.clone().unwrap_or_default()
    }

    pub(crate) fn into_user(self) -> User {
        User {
            display_name: self.label(),
            account_id: self.account_id,
            name: self.name,
            email: self.email_address,
            active: self.active,
        }
    }
}

impl IssueNode {
    fn into_related(self) -> RelatedIssue {
        let fields = self.fields;
        RelatedIssue {
            key: self.key,
            summary: fields.summary,
            issue_type: name_of(fields.issue_type).unwrap_or_default(),
            status: name_of(fields.status).unwrap_or_default(),
            priority: name_of(fields.priority).unwrap_or_default(),
        }
    }

    pub(crate) fn into_summary(self) -> IssueSummary {
        self.split().0
    }

    /// Row fields plus the remainder of the node for detail conversion.
    fn split(self) -> (IssueSummary, FieldsNode) {
        let mut fields = self.fields;
        let summary = IssueSummary {
            key: self.key,
            issue_type: name_of(fields.issue_type.take()).unwrap_or_default(),
            parent: fields.parent.take().map(|p| p.key),
            summary: std::mem::take(&mut fields.summary),
            status: name_of(fields.status.take()).unwrap_or_default(),
            assignee: fields.assignee.take().map(|u| u.label()),
            reporter: fields.reporter.take().map(|u| u.label()),
            priority: name_of(fields.priority.take()),
            resolution: name_of(fields.resolution.take()),
            created: fields.created.take().as_deref().and_then(parse_datetime),
            updated: fields.updated.take().as_deref().and_then(parse_datetime),
            labels: std::mem::take(&mut fields.labels),
        };
        (summary, fields)
    }

    /// Keeps at most `comment_limit` of the most recent comments.
    pub(crate) fn into_detail(self, comment_limit: usize) -> IssueDetail {
        let (summary, fields) = self.split();

        let (mut comments, comment_total) = match fields.comment {
            Some(node) => {
                let total = node.total.max(node.comments.len());
                let comments: Vec<Comment> = node
                    .comments
                    .into_iter()
                    .map(|c| Comment {
                        id: c.id,
                        author: c.author.map(|a| a.label()).unwrap_or_default(),
                        created: c.created.as_deref().and_then(parse_datetime),
                        body: c.body.unwrap_or_else(|| RichText::Plain(String::new())),
                    })
                    .collect();
                (comments, total)
            }
            None => (Vec::new(), 0),
        };
        if comments.len() > comment_limit {
            comments.drain(..comments.len() - comment_limit);
        }

        let links = fields
            .issue_links
            .into_iter()
            .filter_map(|link| match (link.outward_issue, link.inward_issue) {
                (Some(issue), _) => Some(IssueLink {
                    relation: link.link_type.outward,
                    issue: issue.into_related(),
                }),
                (None, Some(issue)) => Some(IssueLink {
                    relation: link.link_type.inward,
                    issue: issue.into_related(),
                }),
                (None, None) => None,
            })
            .collect();

        let (watch_count, is_watching) = fields
            .watches
            .map(|w| (w.watch_count, w.is_watching))
            .unwrap_or_default();

        IssueDetail {
            summary,
            description: fields.description,
            components: fields.components.into_iter().map(|c| c.name).collect(),
            watch_count,
            is_watching,
            comments,
            comment_total,
            subtasks: fields.subtasks.into_iter().map(IssueNode::into_related).collect(),
            links,
        }
    }
}

impl SearchResponse {
    pub(crate) fn into_page(self) -> SearchPage {
        let total = self.total.unwrap_or(self.issues.len());
        SearchPage {
            issues: self.issues.into_iter().map(IssueNode::into_summary).collect(),
            total,
        }
    }
}

impl TransitionsResponse {
    pub(crate) fn into_transitions(self) -> Vec<Transition> {
        self.transitions
            .into_iter()
            .map(|t| Transition {
                id: t.id,
                name: t.name,
                to: name_of(t.to),
            })
            .collect()
    }
}

/// Parse a search (or board backlog) response body.
pub fn parse_search_response(body: &str) -> Result<SearchPage> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Failed to parse search response")?;
    Ok(response.into_page())
}

/// Parse a single-issue response body.
pub fn parse_issue(body: &str, comment_limit: usize) -> Result<IssueDetail> {
    let node: IssueNode = serde_json::from_str(body).context("Failed to parse issue")?;
    Ok(node.into_detail(comment_limit))
}

/// Parse an assignable-users response body.
pub fn parse_users(body: &str) -> Result<Vec<User>> {
    let nodes: Vec<UserNode> = serde_json::from_str(body).context("Failed to parse users")?;
    Ok(nodes.into_iter().map(UserNode::into_user).collect())
}
