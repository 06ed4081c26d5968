//! The editable text form of an issue.
//!
//! ```text
//! Summary line
//!
//! Description...
//!
//! # DO NOT EDIT THIS LINE - Comment by Jane Doe (at 2024-03-01 09:15)
//! Comment body...
//! ```

use crate::data::{format_datetime, IssueDetail};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const SEPARATOR_PREFIX: &str = "# DO NOT EDIT THIS LINE - Comment by ";

static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^# DO NOT EDIT THIS LINE - Comment by .* \(at .*\)\s*$")
        .expect("separator regex is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error(
        "Comment count mismatch: expected {expected} comments, got {actual}. DO NOT EDIT separator lines must not be modified."
    )]
    CommentCountMismatch { expected: usize, actual: usize },

    /// The user backed out. The message always contains "interrupted" so the
    /// parent process can tell it apart from a real failure.
    #[error("{0} interrupted{1}")]
    Interrupted(&'static str, String),
}

impl EditError {
    pub fn interrupted(flow: &'static str, reason: &str) -> Self {
        if reason.is_empty() {
            Self::Interrupted(flow, String::new())
        } else {
            Self::Interrupted(flow, format!(": {reason}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditableComment {
    pub id: String,
    pub author: String,
    pub created: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditDocument {
    pub summary: String,
    pub description: String,
    pub comments: Vec<EditableComment>,
}

/// What changed between the original document and the edited text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditChanges {
    pub summary: Option<String>,
    pub description: Option<String>,
    /// (comment id, new body)
    pub comments: Vec<(String, String)>,
}

impl EditChanges {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.description.is_none() && self.comments.is_empty()
    }
}

impl EditDocument {
    pub fn from_issue(detail: &IssueDetail) -> Self {
        Self {
            summary: detail.summary.summary.clone(),
            description: detail
                .description
                .as_ref()
                .map(|d| d.to_markdown())
                .unwrap_or_default(),
            comments: detail
                .comments
                .iter()
                .map(|c| EditableComment {
                    id: c.id.clone(),
                    author: c.author.clone(),
                    created: format_datetime(c.created.as_ref()),
                    body: c.body.to_markdown(),
                })
                .collect(),
        }
    }

    pub fn compose(&self) -> String {
        let mut out = format!("{}\n\n{}\n", self.summary.trim(), self.description.trim());
        for comment in &self.comments {
            out.push_str(&format!(
                "\n{}{} (at {})\n{}\n",
                SEPARATOR_PREFIX,
                comment.author,
                comment.created,
                comment.body.trim()
            ));
        }
        out
    }

    /// Parse edited text against this document's comments.
    ///
    /// Fails without producing any change when the separator count differs.
    pub fn changes(&self, edited: &str) -> Result<EditChanges, EditError> {
        let parsed = parse(edited);
        if parsed.comments.len() != self.comments.len() {
            return Err(EditError::CommentCountMismatch {
                expected: self.comments.len(),
                actual: parsed.comments.len(),
            });
        }

        let mut changes = EditChanges::default();
        if parsed.summary != self.summary.trim() {
            changes.summary = Some(parsed.summary);
        }
        if parsed.description != self.description.trim() {
            changes.description = Some(parsed.description);
        }
        for (original, body) in self.comments.iter().zip(parsed.comments) {
            if body != original.body.trim() {
                changes.comments.push((original.id.clone(), body));
            }
        }
        Ok(changes)
    }
}

/// Result of splitting edited text; bodies are trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub summary: String,
    pub description: String,
    pub comments: Vec<String>,
}

pub fn parse(text: &str) -> ParsedDocument {
    let mut sections: Vec<Vec<&str>> = vec![Vec::new()];
    for line in text.lines() {
        if SEPARATOR.is_match(line) {
            sections.push(Vec::new());
        } else if let Some(current) = sections.last_mut() {
            current.push(line);
        }
    }

    let head = sections.remove(0);
    let mut head_lines = head.into_iter();
    let summary = head_lines.next().unwrap_or_default().trim().to_string();
    let description = head_lines.collect::<Vec<_>>().join("\n").trim().to_string();
    let comments = sections
        .into_iter()
        .map(|lines| lines.join("\n").trim().to_string())
        .collect();

    ParsedDocument {
        summary,
        description,
        comments,
    }
}
