//! Atlassian Document Format to markdown and back.
//!
//! Covers the node types Jira emits for descriptions and comments. Unknown
//! block nodes fall through to their children so no text is lost.

use super::mention::{self, Mentions, Piece};
use crate::data::RichText;
use chrono::{TimeZone, Utc};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use serde_json::{json, Value};

impl RichText {
    /// Markdown-ish text for display and editing.
    pub fn to_markdown(&self) -> String {
        match self {
            RichText::Plain(text) => text.clone(),
            RichText::Adf(doc) => to_markdown(doc),
        }
    }
}

pub fn to_markdown(doc: &Value) -> String {
    let mut out = String::new();
    render_blocks(children(doc), &mut out, "");
    out.trim_end().to_string()
}

fn children(node: &Value) -> &[Value] {
    node.get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn node_type(node: &Value) -> &str {
    node.get("type").and_then(Value::as_str).unwrap_or("")
}

fn attr<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    node.get("attrs").and_then(|a| a.get(name))
}

fn attr_str<'a>(node: &'a Value, name: &str) -> Option<&'a str> {
    attr(node, name).and_then(Value::as_str)
}

fn render_blocks(nodes: &[Value], out: &mut String, prefix: &str) {
    for node in nodes {
        render_block(node, out, prefix);
    }
}

fn push_lines(out: &mut String, prefix: &str, text: &str) {
    for line in text.split('\n') {
        out.push_str(prefix);
        out.push_str(line);
        out.push('\n');
    }
}

fn render_block(node: &Value, out: &mut String, prefix: &str) {
    match node_type(node) {
        "paragraph" => {
            push_lines(out, prefix, &render_inline(children(node)));
            out.push('\n');
        }
        "heading" => {
            let level = attr(node, "level")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6) as usize;
            let text = format!("{} {}", "#".repeat(level), render_inline(children(node)));
            push_lines(out, prefix, &text);
            out.push('\n');
        }
        "bulletList" => render_list(node, out, prefix, false),
        "orderedList" => render_list(node, out, prefix, true),
        "codeBlock" => {
            let lang = attr_str(node, "language").unwrap_or("");
            let body: String = children(node)
                .iter()
                .filter_map(|n| n.get("text").and_then(Value::as_str))
                .collect();
            push_lines(out, prefix, &format!("```{lang}\n{body}\n```"));
            out.push('\n');
        }
        "blockquote" | "panel" => {
            let quoted = format!("{prefix}> ");
            render_blocks(children(node), out, &quoted);
        }
        "rule" => {
            push_lines(out, prefix, "---");
            out.push('\n');
        }
        "table" => render_table(node, out, prefix),
        "blockCard" | "embedCard" => {
            if let Some(url) = attr_str(node, "url") {
                push_lines(out, prefix, &format!("[{url}]({url})"));
                out.push('\n');
            }
        }
        "mediaSingle" | "mediaGroup" | "media" => {}
        "text" | "hardBreak" | "mention" | "emoji" | "inlineCard" | "status" | "date" => {
            push_lines(out, prefix, &render_inline(std::slice::from_ref(node)));
            out.push('\n');
        }
        _ => render_blocks(children(node), out, prefix),
    }
}

fn render_list(node: &Value, out: &mut String, prefix: &str, ordered: bool) {
    let start = attr(node, "order").and_then(Value::as_u64).unwrap_or(1);
    for (i, item) in children(node).iter().enumerate() {
        let marker = if ordered {
            format!("{}. ", start + i as u64)
        } else {
            "- ".to_string()
        };
        let indent = " ".repeat(marker.len());

        let mut body = String::new();
        render_blocks(children(item), &mut body, "");

        let mut first = true;
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            out.push_str(prefix);
            out.push_str(if first { &marker } else { &indent });
            out.push_str(line);
            out.push('\n');
            first = false;
        }
        if first {
            out.push_str(prefix);
            out.push_str(marker.trim_end());
            out.push('\n');
        }
    }
    out.push('\n');
}

fn render_table(node: &Value, out: &mut String, prefix: &str) {
    for (i, row) in children(node).iter().enumerate() {
        let cells: Vec<String> = children(row)
            .iter()
            .map(|cell| {
                let mut text = String::new();
                render_blocks(children(cell), &mut text, "");
                text.split_whitespace().collect::<Vec<_>>().join(" ")
            })
            .collect();
        push_lines(out, prefix, &format!("| {} |", cells.join(" | ")));
        if i == 0 {
            let sep = vec!["---"; cells.len().max(1)].join(" | ");
            push_lines(out, prefix, &format!("| {sep} |"));
        }
    }
    out.push('\n');
}

fn render_inline(nodes: &[Value]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node_type(node) {
            "text" => out.push_str(&render_text(node)),
            "hardBreak" => out.push('\n'),
            "mention" => {
                let name = attr_str(node, "text").unwrap_or("unknown");
                out.push('@');
                out.push_str(name.trim_start_matches('@'));
            }
            "emoji" => {
                let text = attr_str(node, "text")
                    .or_else(|| attr_str(node, "shortName"))
                    .unwrap_or("");
                out.push_str(text);
            }
            "inlineCard" => {
                if let Some(url) = attr_str(node, "url") {
                    out.push_str(&format!("[{url}]({url})"));
                }
            }
            "status" => out.push_str(attr_str(node, "text").unwrap_or("")),
            "date" => {
                let millis = attr(node, "timestamp").and_then(|t| match t {
                    Value::String(s) => s.parse::<i64>().ok(),
                    other => other.as_i64(),
                });
                if let Some(dt) = millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single()) {
                    out.push_str(&dt.format("%Y-%m-%d").to_string());
                }
            }
            _ => out.push_str(&render_inline(children(node))),
        }
    }
    out
}

fn render_text(node: &Value) -> String {
    let mut text = node
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let mut href: Option<&str> = None;

    if let Some(marks) = node.get("marks").and_then(Value::as_array) {
        for mark in marks {
            text = match node_type(mark) {
                "strong" => format!("**{text}**"),
                "em" => format!("*{text}*"),
                "code" => format!("`{text}`"),
                "strike" => format!("~~{text}~~"),
                "link" => {
                    href = attr_str(mark, "href");
                    text
                }
                _ => text,
            };
        }
    }

    match href {
        Some(url) => format!("[{text}]({url})"),
        None => text,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Markdown to ADF
// ─────────────────────────────────────────────────────────────────────────────

struct Frame {
    node: Value,
    /// Paragraph opened for bare text in a tight list item or table cell
    implicit: bool,
}

struct AdfBuilder<'m> {
    stack: Vec<Frame>,
    marks: Vec<Value>,
    in_table_head: bool,
    mentions: &'m Mentions,
}

fn block(kind: &str) -> Value {
    json!({ "type": kind, "content": [] })
}

fn push_child(parent: &mut Value, child: Value) {
    if let Some(content) = parent.get_mut("content").and_then(Value::as_array_mut) {
        content.push(child);
    }
}

impl<'m> AdfBuilder<'m> {
    fn new(mentions: &'m Mentions) -> Self {
        Self {
            stack: vec![Frame {
                node: json!({ "type": "doc", "version": 1, "content": [] }),
                implicit: false,
            }],
            marks: Vec::new(),
            in_table_head: false,
            mentions,
        }
    }

    fn open(&mut self, node: Value) {
        self.stack.push(Frame {
            node,
            implicit: false,
        });
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(Frame { mut node, .. }) = self.stack.pop() else {
            return;
        };
        let empty = node
            .get("content")
            .and_then(Value::as_array)
            .is_some_and(Vec::is_empty);
        let kind = node_type(&node).to_string();
        match kind.as_str() {
            "listItem" | "tableCell" | "tableHeader" if empty => {
                push_child(&mut node, block("paragraph"))
            }
            "codeBlock" => trim_code(&mut node),
            _ => {}
        }
        if let Some(parent) = self.stack.last_mut() {
            push_child(&mut parent.node, node);
        }
    }

    fn close_implicit(&mut self) {
        if self.stack.last().is_some_and(|f| f.implicit) {
            self.close();
        }
    }

    /// Close the block a markdown `End` event refers to.
    fn end_block(&mut self) {
        self.close_implicit();
        self.close();
    }

    fn inline_target(&mut self) -> &mut Value {
        let accepts_inline = self
            .stack
            .last()
            .is_some_and(|f| matches!(node_type(&f.node), "paragraph" | "heading" | "codeBlock"));
        if !accepts_inline {
            self.stack.push(Frame {
                node: block("paragraph"),
                implicit: true,
            });
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last].node
    }

    fn text(&mut self, text: &str, extra_mark: Option<Value>) {
        if text.is_empty() {
            return;
        }
        let in_code_block = self
            .stack
            .last()
            .is_some_and(|f| node_type(&f.node) == "codeBlock");
        let literal = in_code_block || extra_mark.is_some();
        let mut marks = if in_code_block { Vec::new() } else { self.marks.clone() };
        marks.extend(extra_mark);

        let mut nodes = Vec::new();
        if literal {
            let mut node = json!({ "type": "text", "text": text });
            if !marks.is_empty() {
                node["marks"] = Value::Array(marks);
            }
            nodes.push(node);
        } else {
            for piece in mention::split(text, self.mentions) {
                match piece {
                    Piece::Text(t) => {
                        let mut node = json!({ "type": "text", "text": t });
                        if !marks.is_empty() {
                            node["marks"] = Value::Array(marks.clone());
                        }
                        nodes.push(node);
                    }
                    Piece::Mention { typed, id } => {
                        nodes.push(json!({ "type": "mention", "attrs": { "id": id, "text": typed } }))
                    }
                }
            }
        }

        let target = self.inline_target();
        for node in nodes {
            push_child(target, node);
        }
    }

    fn hard_break(&mut self) {
        let target = self.inline_target();
        push_child(target, json!({ "type": "hardBreak" }));
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.close_implicit();
                self.open(block("paragraph"));
            }
            Tag::Heading(level, _, _) => {
                self.close_implicit();
                self.open(json!({ "type": "heading", "attrs": { "level": level as u64 }, "content": [] }));
            }
            Tag::BlockQuote => {
                self.close_implicit();
                self.open(block("blockquote"));
            }
            Tag::CodeBlock(kind) => {
                self.close_implicit();
                let mut node = block("codeBlock");
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        node["attrs"] = json!({ "language": lang.to_string() });
                    }
                }
                self.open(node);
            }
            Tag::List(Some(start)) => {
                self.close_implicit();
                self.open(json!({ "type": "orderedList", "attrs": { "order": start }, "content": [] }));
            }
            Tag::List(None) => {
                self.close_implicit();
                self.open(block("bulletList"));
            }
            Tag::Item => self.open(block("listItem")),
            Tag::Table(_) => self.open(block("table")),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open(block("tableRow"));
            }
            Tag::TableRow => self.open(block("tableRow")),
            Tag::TableCell => {
                let kind = if self.in_table_head { "tableHeader" } else { "tableCell" };
                self.open(block(kind));
            }
            Tag::Emphasis => self.marks.push(json!({ "type": "em" })),
            Tag::Strong => self.marks.push(json!({ "type": "strong" })),
            Tag::Strikethrough => self.marks.push(json!({ "type": "strike" })),
            Tag::Link(_, dest, _) | Tag::Image(_, dest, _) => self
                .marks
                .push(json!({ "type": "link", "attrs": { "href": dest.to_string() } })),
            Tag::FootnoteDefinition(_) => {}
        }
    }

    fn end(&mut self, tag: Tag) {
        match tag {
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link(..) | Tag::Image(..) => {
                self.marks.pop();
            }
            Tag::TableHead => {
                self.in_table_head = false;
                self.end_block();
            }
            Tag::FootnoteDefinition(_) => {}
            _ => self.end_block(),
        }
    }

    fn finish(mut self) -> Value {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .map(|f| f.node)
            .unwrap_or_else(|| json!({ "type": "doc", "version": 1, "content": [] }))
    }
}

/// Drop the newline the markdown parser leaves at the end of a code block.
fn trim_code(node: &mut Value) {
    let last = node
        .get_mut("content")
        .and_then(Value::as_array_mut)
        .and_then(|c| c.last_mut())
        .and_then(|t| t.get_mut("text"));
    if let Some(Value::String(text)) = last {
        if text.ends_with('\n') {
            text.pop();
        }
    }
}

/// Markdown as written in the editor to an ADF document. Mentions found in
/// `mentions` become mention nodes.
pub fn from_markdown(markdown: &str, mentions: &Mentions) -> Value {
    let mut builder = AdfBuilder::new(mentions);
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(tag) => builder.end(tag),
            Event::Text(text) | Event::Html(text) => builder.text(&text, None),
            Event::Code(code) => builder.text(&code, Some(json!({ "type": "code" }))),
            Event::SoftBreak | Event::HardBreak => builder.hard_break(),
            Event::Rule => {
                builder.close_implicit();
                builder.open(json!({ "type": "rule" }));
                builder.close();
            }
            Event::FootnoteReference(name) => builder.text(&format!("[^{name}]"), None),
            Event::TaskListMarker(done) => builder.text(if done { "[x] " } else { "[ ] " }, None),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_paragraph_with_marks_and_link() {
        let doc = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "See "},
                    {"type": "text", "text": "docs", "marks": [{"type": "link", "attrs": {"href": "https://example.com"}}]},
                    {"type": "text", "text": " and "},
                    {"type": "text", "text": "this", "marks": [{"type": "strong"}]}
                ]
            }]
        });
        assert_eq!(to_markdown(&doc), "See [docs](https://example.com) and **this**");
    }

    #[test]
    fn test_heading_and_lists() {
        let doc = json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Steps"}]},
                {"type": "orderedList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "one"}]}]},
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "two"}]},
                        {"type": "bulletList", "content": [
                            {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "nested"}]}]}
                        ]}
                    ]}
                ]}
            ]
        });
        assert_eq!(to_markdown(&doc), "## Steps\n\n1. one\n2. two\n   - nested");
    }

    #[test]
    fn test_code_block_mention_and_card() {
        let doc = json!({
            "type": "doc",
            "content": [
                {"type": "codeBlock", "attrs": {"language": "rust"}, "content": [{"type": "text", "text": "fn main() {}"}]},
                {"type": "paragraph", "content": [
                    {"type": "mention", "attrs": {"text": "@Jane"}},
                    {"type": "text", "text": " "},
                    {"type": "inlineCard", "attrs": {"url": "https://x.io/a"}}
                ]}
            ]
        });
        assert_eq!(
            to_markdown(&doc),
            "```rust\nfn main() {}\n```\n\n@Jane [https://x.io/a](https://x.io/a)"
        );
    }

    #[test]
    fn test_blockquote_and_unknown_nodes() {
        let doc = json!({
            "type": "doc",
            "content": [
                {"type": "blockquote", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "quoted"}]}]},
                {"type": "mysteryBlock", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "kept"}]}]}
            ]
        });
        assert_eq!(to_markdown(&doc), "> quoted\n\nkept");
    }

    #[test]
    fn test_markdown_to_adf_structure() {
        let doc = from_markdown("## Steps\n\n**this too**", &Mentions::new());
        assert_eq!(
            doc,
            json!({
                "type": "doc",
                "version": 1,
                "content": [
                    {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Steps"}]},
                    {"type": "paragraph", "content": [
                        {"type": "text", "text": "this too", "marks": [{"type": "strong"}]}
                    ]}
                ]
            })
        );
    }

    #[test]
    fn test_edited_markdown_survives_round_trip() {
        let original = json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Steps"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "See "},
                    {"type": "text", "text": "docs", "marks": [{"type": "link", "attrs": {"href": "https://example.com"}}]},
                    {"type": "text", "text": " and "},
                    {"type": "text", "text": "this", "marks": [{"type": "strong"}]}
                ]},
                {"type": "orderedList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "one"}]}]},
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "two"}]},
                        {"type": "bulletList", "content": [
                            {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "nested"}]}]}
                        ]}
                    ]}
                ]},
                {"type": "codeBlock", "attrs": {"language": "rust"}, "content": [{"type": "text", "text": "fn main() {}"}]},
                {"type": "blockquote", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "quoted"}]}]}
            ]
        });
        let markdown = to_markdown(&original);
        let edited = markdown.replace("this", "this too");

        let sent = from_markdown(&edited, &Mentions::new());
        assert_eq!(to_markdown(&sent), edited);
        assert_eq!(sent["content"][3]["attrs"]["language"], "rust");
        assert_eq!(sent["content"][3]["content"][0]["text"], "fn main() {}");
        assert_eq!(sent["content"][2]["attrs"]["order"], 1);
    }

    #[test]
    fn test_resolved_mentions_become_nodes() {
        let mut mentions = Mentions::new();
        mentions.insert("@jane@example.com".to_string(), "5b10".to_string());

        let doc = from_markdown("cc @jane@example.com, `@jane@example.com`", &mentions);
        let inline = &doc["content"][0]["content"];
        assert_eq!(inline[0], json!({"type": "text", "text": "cc "}));
        assert_eq!(
            inline[1],
            json!({"type": "mention", "attrs": {"id": "5b10", "text": "@jane@example.com"}})
        );
        // Code spans are literal
        assert_eq!(inline[3]["type"], "text");
        assert_eq!(inline[3]["marks"][0]["type"], "code");
    }

    #[test]
    fn test_table_and_tight_list_get_paragraphs() {
        let doc = from_markdown("| a | b |\n| --- | --- |\n| 1 | 2 |\n\n- x\n- y", &Mentions::new());
        let table = &doc["content"][0];
        assert_eq!(table["content"][0]["content"][0]["type"], "tableHeader");
        assert_eq!(table["content"][1]["content"][1]["content"][0]["type"], "paragraph");
        assert_eq!(to_markdown(&doc), "| a | b |\n| --- | --- |\n| 1 | 2 |\n\n- x\n- y");
    }

    #[test]
    fn test_plain_rich_text_passes_through() {
        let text = RichText::Plain("h1. Wiki".to_string());
        assert_eq!(text.to_markdown(), "h1. Wiki");
    }
}
