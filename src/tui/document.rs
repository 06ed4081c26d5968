//! Composes the detail pane's document from an issue.
//!
//! The result is a list of fragments; markdown fragments are rendered by
//! `markdown.rs`, the rest are laid out directly. Nothing here depends on
//! the terminal, so the layout can be checked with plain strings.

use crate::data::{format_datetime, IssueDetail, RelatedIssue};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthStr;

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex is valid"));

/// Longest summary shown in subtask and link rows.
const SUMMARY_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Pale,
    Strong,
    Key,
    Accent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tone: Tone,
}

impl Segment {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Rendered through the markdown renderer; links inside count for `tab`.
    Markdown(String),
    /// Pale horizontal rule with a centered title.
    Rule(String),
    Line(Vec<Segment>),
    Blank(usize),
}

/// Build the fragments for `detail`, newest comments first.
pub fn compose(detail: &IssueDetail, browse_url: &str, comment_limit: usize) -> Vec<Fragment> {
    let mut out = vec![Fragment::Markdown(header(detail))];

    let description = detail
        .description
        .as_ref()
        .map(|d| d.to_markdown())
        .unwrap_or_default();
    if !description.trim().is_empty() {
        out.extend([
            Fragment::Blank(1),
            Fragment::Rule("Description".to_string()),
            Fragment::Blank(1),
            Fragment::Markdown(replace_redundant_link_text(&description)),
        ]);
    }

    if !detail.subtasks.is_empty() {
        out.extend([
            Fragment::Blank(1),
            Fragment::Rule(format!("{} Subtasks", detail.subtasks.len())),
            Fragment::Blank(1),
        ]);
        out.extend(related_rows("SUBTASKS", &detail.subtasks, false));
        out.push(Fragment::Blank(1));
    }

    if !detail.links.is_empty() {
        out.extend([
            Fragment::Blank(1),
            Fragment::Rule("Linked Issues".to_string()),
            Fragment::Blank(1),
        ]);
        let mut groups: BTreeMap<&str, Vec<RelatedIssue>> = BTreeMap::new();
        for link in &detail.links {
            groups
                .entry(link.relation.as_str())
                .or_default()
                .push(link.issue.clone());
        }
        for (relation, issues) in groups {
            out.extend(related_rows(&relation.to_uppercase(), &issues, true));
        }
        out.push(Fragment::Blank(1));
    }

    let shown = comment_limit.min(detail.comments.len());
    if detail.comment_total > 0 && shown > 0 {
        out.extend([
            Fragment::Blank(1),
            Fragment::Rule(format!("{} Comments", detail.comment_total)),
            Fragment::Blank(1),
        ]);
        for (i, comment) in detail.comments.iter().rev().take(shown).enumerate() {
            let mut meta = vec![
                Segment::new(format!(" {}", comment.author), Tone::Strong),
                Segment::new(" • ", Tone::Plain),
                Segment::new(format_datetime(comment.created.as_ref()), Tone::Strong),
            ];
            if i == 0 {
                meta.push(Segment::new(" • ", Tone::Plain));
                meta.push(Segment::new("Latest comment", Tone::Accent));
            }
            out.extend([
                Fragment::Blank(1),
                Fragment::Line(meta),
                Fragment::Blank(1),
                Fragment::Markdown(replace_redundant_link_text(&comment.body.to_markdown())),
            ]);
        }
    }

    out.push(Fragment::Blank(1));
    if comment_limit > 0 && shown < detail.comment_total {
        out.push(Fragment::Line(vec![Segment::new(
            format!("Showing {} of {} comments", shown, detail.comment_total),
            Tone::Pale,
        )]));
    }
    out.push(Fragment::Line(vec![Segment::new(
        format!("View this issue on Jira: {browse_url}"),
        Tone::Pale,
    )]));
    out.push(Fragment::Blank(1));
    out
}

pub fn header(detail: &IssueDetail) -> String {
    let issue = &detail.summary;
    let type_icon = if issue.issue_type == "Bug" { "🐞" } else { "⭐" };
    let status_icon = if issue.status == "Done" { "✅" } else { "🚧" };
    let components = if detail.components.is_empty() {
        "None".to_string()
    } else {
        detail.components.join(", ")
    };
    let labels = if issue.labels.is_empty() {
        "None".to_string()
    } else {
        issue.labels.join(", ")
    };

    format!(
        "{} {}  {} {}  ⌛ {}  👷 {}  🔑️ {}  💭 {} comments  🧵 {} linked\n\n# {}\n\n⏱️ {}  🔎 {}  🚀 {}  📦 {}  🏷️ {}  👀 {}",
        type_icon,
        issue.issue_type,
        status_icon,
        issue.status,
        format_datetime(issue.updated.as_ref()),
        issue.assignee.as_deref().unwrap_or("Unassigned"),
        issue.key,
        detail.comment_total,
        detail.links.len(),
        issue.summary,
        format_datetime(issue.created.as_ref()),
        issue.reporter.as_deref().unwrap_or_default(),
        issue.priority.as_deref().unwrap_or_default(),
        components,
        labels,
        watchers(detail.watch_count, detail.is_watching),
    )
}

pub fn watchers(count: u32, is_watching: bool) -> String {
    if is_watching && count == 1 {
        "You are watching".to_string()
    } else if is_watching {
        format!("You + {} watchers", count.saturating_sub(1))
    } else {
        format!("{count} watchers")
    }
}

/// Show `[link](url)` instead of repeating a URL as its own text.
///
/// Display only; the editable text keeps the original link.
pub fn replace_redundant_link_text(text: &str) -> String {
    MARKDOWN_LINK
        .replace_all(text, |caps: &regex::Captures| {
            let (label, url) = (&caps[1], &caps[2]);
            if label.trim() == url.trim() {
                format!("[link]({url})")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn related_rows(title: &str, issues: &[RelatedIssue], with_type: bool) -> Vec<Fragment> {
    let key_w = max_width(issues, |i| i.key.as_str());
    let summary_w = max_width(issues, |i| i.summary.as_str()).min(SUMMARY_WIDTH);
    let type_w = max_width(issues, |i| i.issue_type.as_str());
    let priority_w = max_width(issues, |i| i.priority.as_str());
    let status_w = max_width(issues, |i| i.status.as_str());

    let mut rows = vec![
        Fragment::Blank(1),
        Fragment::Line(vec![Segment::new(format!(" {title}"), Tone::Strong)]),
        Fragment::Blank(1),
    ];
    for issue in issues {
        let mut line = vec![
            Segment::new("  ", Tone::Plain),
            Segment::new(pad(&issue.key, key_w), Tone::Key),
            Segment::new(format!(" {}", shorten_and_pad(&issue.summary, summary_w)), Tone::Plain),
        ];
        if with_type {
            line.push(Segment::new(format!(" • {}", pad(&issue.issue_type, type_w)), Tone::Plain));
        }
        line.push(Segment::new(
            format!(
                " • {} • {}",
                pad(&issue.priority, priority_w),
                pad(&issue.status, status_w)
            ),
            Tone::Plain,
        ));
        rows.push(Fragment::Line(line));
    }
    rows
}

fn max_width(issues: &[RelatedIssue], field: impl Fn(&RelatedIssue) -> &str) -> usize {
    issues
        .iter()
        .map(|i| UnicodeWidthStr::width(field(i)))
        .max()
        .unwrap_or(0)
}

fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

fn shorten_and_pad(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return pad(text, width);
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    pad(&out, width)
}

/// Flatten fragments to plain text, one entry per line. Used by tests and
/// by anything that wants the document without styling.
pub fn plain_lines(fragments: &[Fragment]) -> Vec<String> {
    let mut lines = Vec::new();
    for fragment in fragments {
        match fragment {
            Fragment::Markdown(text) => lines.extend(text.lines().map(str::to_string)),
            Fragment::Rule(title) => lines.push(rule_text(title)),
            Fragment::Line(segments) => {
                lines.push(segments.iter().map(|s| s.text.as_str()).collect())
            }
            Fragment::Blank(n) => lines.extend(std::iter::repeat(String::new()).take(*n)),
        }
    }
    lines
}

pub const RULE: &str = "————————————————————————";

pub fn rule_text(title: &str) -> String {
    if title.is_empty() {
        format!("{RULE}{RULE}")
    } else {
        format!("{RULE} {title} {RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Comment, IssueLink, IssueSummary, RichText};
    use pretty_assertions::assert_eq;

    fn related(key: &str, summary: &str) -> RelatedIssue {
        RelatedIssue {
            key: key.to_string(),
            summary: summary.to_string(),
            issue_type: "Task".to_string(),
            status: "Open".to_string(),
            priority: "High".to_string(),
        }
    }

    fn comment(id: &str, body: &str) -> Comment {
        Comment {
            id: id.to_string(),
            author: format!("author{id}"),
            created: None,
            body: RichText::Plain(body.to_string()),
        }
    }

    fn detail() -> IssueDetail {
        IssueDetail {
            summary: IssueSummary {
                key: "ABC-1".to_string(),
                issue_type: "Bug".to_string(),
                summary: "Login broken".to_string(),
                status: "In Progress".to_string(),
                ..Default::default()
            },
            description: Some(RichText::Plain("See [https://x.io](https://x.io)".to_string())),
            comments: vec![comment("1", "first"), comment("2", "second"), comment("3", "third")],
            comment_total: 3,
            links: vec![
                IssueLink {
                    relation: "is blocked by".to_string(),
                    issue: related("ABC-9", "Infra"),
                },
                IssueLink {
                    relation: "blocks".to_string(),
                    issue: related("ABC-5", "Release"),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_section_order() {
        let lines = plain_lines(&compose(&detail(), "https://jira/browse/ABC-1", 10));
        let pos = |needle: &str| {
            lines
                .iter()
                .position(|l| l.contains(needle))
                .unwrap_or_else(|| panic!("missing {needle}"))
        };
        assert!(pos("# Login broken") < pos("Description"));
        assert!(pos("Description") < pos("Linked Issues"));
        assert!(pos("BLOCKS") < pos("IS BLOCKED BY"));
        assert!(pos("Linked Issues") < pos("3 Comments"));
        assert!(pos("third") < pos("second"));
        assert!(pos("second") < pos("first"));
        assert!(pos("first") < pos("View this issue on Jira: https://jira/browse/ABC-1"));
    }

    #[test]
    fn test_latest_comment_marker_and_truncation_footer() {
        let lines = plain_lines(&compose(&detail(), "u", 2));
        let latest: Vec<_> = lines.iter().filter(|l| l.contains("Latest comment")).collect();
        assert_eq!(latest, vec![" author3 •  • Latest comment"]);
        assert!(lines.iter().any(|l| l == "Showing 2 of 3 comments"));
        assert!(!lines.iter().any(|l| l == "first"));
    }

    #[test]
    fn test_header_defaults() {
        let text = header(&detail());
        assert!(text.starts_with("🐞 Bug  🚧 In Progress"));
        assert!(text.contains("👷 Unassigned"));
        assert!(text.contains("📦 None"));
        assert!(text.contains("🧵 2 linked"));
    }

    #[test]
    fn test_watchers() {
        assert_eq!(watchers(1, true), "You are watching");
        assert_eq!(watchers(4, true), "You + 3 watchers");
        assert_eq!(watchers(4, false), "4 watchers");
    }

    #[test]
    fn test_redundant_link_text() {
        assert_eq!(
            replace_redundant_link_text("a [ https://x.io ](https://x.io) b [docs](https://d)"),
            "a [link](https://x.io) b [docs](https://d)"
        );
    }

    #[test]
    fn test_rule() {
        assert_eq!(rule_text("Description"), format!("{RULE} Description {RULE}"));
    }
}
