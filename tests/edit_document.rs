//! Tests for the editor round trip of an issue fetched from the API.

use jira_tui::config::{Config, Installation};
use jira_tui::editing::document::{parse, EditDocument, EditError, SEPARATOR_PREFIX};
use jira_tui::jira::types::parse_issue;
use jira_tui::jira::{adf, Client, Mentions};
use pretty_assertions::assert_eq;
use serde_json::Value;

const ISSUE: &str = r#"{
  "key": "ABC-5",
  "fields": {
    "summary": "Rotate API keys",
    "description": {"type": "doc", "version": 1, "content": [
      {"type": "paragraph", "content": [{"type": "text", "text": "Keys expire on "}, {"type": "text", "text": "Friday", "marks": [{"type": "strong"}]}]},
      {"type": "bulletList", "content": [
        {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "staging"}]}]},
        {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "production"}]}]}
      ]}
    ]},
    "comment": {"total": 2, "comments": [
      {"id": "10", "author": {"displayName": "Jane Doe"}, "body": "Staging done", "created": "2024-03-01T09:15:00.000+0000"},
      {"id": "11", "author": {"displayName": "Sam Poe"}, "body": "Prod scheduled\n\nfor Thursday", "created": "2024-03-02T09:15:00.000+0000"}
    ]}
  }
}"#;

fn document() -> EditDocument {
    EditDocument::from_issue(&parse_issue(ISSUE, 10).unwrap())
}

#[test]
fn test_composed_issue_parses_back() {
    let doc = document();
    let text = doc.compose();

    assert!(text.starts_with("Rotate API keys\n\n"));
    assert_eq!(text.matches(SEPARATOR_PREFIX).count(), 2);

    let parsed = parse(&text);
    assert_eq!(parsed.summary, "Rotate API keys");
    assert_eq!(parsed.description, doc.description.trim());
    assert_eq!(parsed.comments, vec!["Staging done", "Prod scheduled\n\nfor Thursday"]);
    assert!(doc.changes(&text).unwrap().is_empty());
}

#[test]
fn test_edited_comment_is_the_only_change() {
    let doc = document();
    let text = doc.compose().replace("Staging done", "Staging done, verified");

    let changes = doc.changes(&text).unwrap();
    assert_eq!(changes.summary, None);
    assert_eq!(changes.description, None);
    assert_eq!(
        changes.comments,
        vec![("10".to_string(), "Staging done, verified".to_string())]
    );
}

#[test]
fn test_removed_separator_aborts_edit() {
    let doc = document();
    let text: String = doc
        .compose()
        .lines()
        .filter(|line| !line.contains("Comment by Sam Poe"))
        .map(|line| format!("{line}\n"))
        .collect();

    let err = doc.changes(&text).unwrap_err();
    assert_eq!(
        err,
        EditError::CommentCountMismatch {
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(
        err.to_string(),
        "Comment count mismatch: expected 2 comments, got 1. DO NOT EDIT separator lines must not be modified."
    );
}

#[test]
fn test_edited_description_is_sent_as_rich_text() {
    let issue = r#"{
      "key": "ABC-6",
      "fields": {
        "summary": "Flaky login",
        "description": {"type": "doc", "version": 1, "content": [
          {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Steps"}]},
          {"type": "paragraph", "content": [{"type": "text", "text": "this", "marks": [{"type": "strong"}]}]}
        ]},
        "comment": {"total": 0, "comments": []}
      }
    }"#;
    let doc = EditDocument::from_issue(&parse_issue(issue, 10).unwrap());
    let text = doc.compose().replace("**this**", "**this too**");
    let description = doc.changes(&text).unwrap().description.unwrap();
    assert_eq!(description, "## Steps\n\n**this too**");

    let mut config = Config::new("https://x.atlassian.net", "me", "ABC");
    let sent = Client::new(&config).markup(&description, &Mentions::new());
    assert_eq!(sent["content"][0]["type"], "heading");
    assert_eq!(sent["content"][1]["content"][0]["text"], "this too");
    assert_eq!(sent["content"][1]["content"][0]["marks"][0]["type"], "strong");
    // Reads back as what the user wrote
    assert_eq!(adf::to_markdown(&sent), description);

    config.installation = Installation::Local;
    let sent = Client::new(&config).markup(&description, &Mentions::new());
    assert_eq!(sent, Value::String("h2. Steps\n\n*this too*".to_string()));
}
