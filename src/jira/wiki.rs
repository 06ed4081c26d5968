//! Markdown to Jira wiki markup, for servers that store text fields as wiki.

use super::mention::{self, Mentions, Piece};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

#[derive(Default)]
struct WikiWriter {
    out: String,
    /// `*` or `#` per open list
    lists: Vec<char>,
    links: Vec<String>,
    quotes: usize,
    in_code_block: bool,
    in_table_head: bool,
}

impl WikiWriter {
    fn line_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block_end(&mut self) {
        self.line_break();
        if self.lists.is_empty() && self.quotes == 0 {
            self.out.push('\n');
        }
    }

    fn text(&mut self, text: &str, mentions: &Mentions) {
        if self.in_code_block {
            self.out.push_str(text);
            return;
        }
        for piece in mention::split(text, mentions) {
            match piece {
                Piece::Text(t) => self.out.push_str(t),
                Piece::Mention { id, .. } => {
                    self.out.push_str("[~");
                    self.out.push_str(id);
                    self.out.push(']');
                }
            }
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph | Tag::FootnoteDefinition(_) => {}
            Tag::Heading(level, _, _) => {
                self.line_break();
                self.out.push_str(&format!("h{}. ", level as usize));
            }
            Tag::BlockQuote => {
                self.line_break();
                self.out.push_str("{quote}\n");
                self.quotes += 1;
            }
            Tag::CodeBlock(kind) => {
                self.line_break();
                match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        self.out.push_str(&format!("{{code:{lang}}}\n"))
                    }
                    _ => self.out.push_str("{code}\n"),
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.line_break();
                self.lists.push(if start.is_some() { '#' } else { '*' });
            }
            Tag::Item => {
                self.line_break();
                let marker: String = self.lists.iter().collect();
                self.out.push_str(&marker);
                self.out.push(' ');
            }
            Tag::Table(_) => self.line_break(),
            Tag::TableHead => self.in_table_head = true,
            Tag::TableRow => {}
            Tag::TableCell => self.out.push_str(if self.in_table_head { "||" } else { "|" }),
            Tag::Emphasis => self.out.push('_'),
            Tag::Strong => self.out.push('*'),
            Tag::Strikethrough => self.out.push('-'),
            Tag::Link(_, dest, _) | Tag::Image(_, dest, _) => {
                self.out.push('[');
                self.links.push(dest.to_string());
            }
        }
    }

    fn end(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph | Tag::Heading(..) => self.block_end(),
            Tag::BlockQuote => {
                self.quotes = self.quotes.saturating_sub(1);
                self.line_break();
                self.out.push_str("{quote}\n");
                self.block_end();
            }
            Tag::CodeBlock(_) => {
                self.in_code_block = false;
                self.line_break();
                self.out.push_str("{code}\n");
                self.block_end();
            }
            Tag::List(_) => {
                self.lists.pop();
                self.block_end();
            }
            Tag::Item => self.line_break(),
            Tag::Table(_) => self.out.push('\n'),
            Tag::TableHead => {
                self.in_table_head = false;
                self.out.push_str("||\n");
            }
            Tag::TableRow => self.out.push_str("|\n"),
            Tag::TableCell | Tag::FootnoteDefinition(_) => {}
            Tag::Emphasis => self.out.push('_'),
            Tag::Strong => self.out.push('*'),
            Tag::Strikethrough => self.out.push('-'),
            Tag::Link(..) | Tag::Image(..) => {
                if let Some(url) = self.links.pop() {
                    self.out.push('|');
                    self.out.push_str(&url);
                    self.out.push(']');
                }
            }
        }
    }
}

/// Markdown as written in the editor to wiki markup. Resolved mentions
/// become `[~user]` references.
pub fn from_markdown(markdown: &str, mentions: &Mentions) -> String {
    let mut w = WikiWriter::default();
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => w.start(tag),
            Event::End(tag) => w.end(tag),
            Event::Text(text) | Event::Html(text) => w.text(&text, mentions),
            Event::Code(code) => {
                w.out.push_str("{{");
                w.out.push_str(&code);
                w.out.push_str("}}");
            }
            Event::SoftBreak | Event::HardBreak => w.out.push('\n'),
            Event::Rule => {
                w.line_break();
                w.out.push_str("----\n\n");
            }
            Event::FootnoteReference(name) => w.out.push_str(&format!("[^{name}]")),
            Event::TaskListMarker(done) => w.out.push_str(if done { "[x] " } else { "[ ] " }),
        }
    }
    w.out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wiki(markdown: &str) -> String {
        from_markdown(markdown, &Mentions::new())
    }

    #[test]
    fn test_headings_and_inline_marks() {
        assert_eq!(
            wiki("## Steps\n\n**bold**, *soft* and ~~gone~~ with `code`"),
            "h2. Steps\n\n*bold*, _soft_ and -gone- with {{code}}"
        );
    }

    #[test]
    fn test_links_and_nested_lists() {
        assert_eq!(
            wiki("See [docs](https://example.com)\n\n1. one\n2. two\n   - nested\n\nafter"),
            "See [docs|https://example.com]\n\n# one\n# two\n#* nested\n\nafter"
        );
    }

    #[test]
    fn test_code_block_and_quote() {
        assert_eq!(
            wiki("```rust\nlet x = *y;\n```\n\n> quoted"),
            "{code:rust}\nlet x = *y;\n{code}\n\n{quote}\nquoted\n{quote}"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            wiki("| a | b |\n| --- | --- |\n| 1 | 2 |"),
            "||a||b||\n|1|2|"
        );
    }

    #[test]
    fn test_mentions_use_login_name() {
        let mut mentions = Mentions::new();
        mentions.insert("@jane@example.com".to_string(), "jdoe".to_string());
        assert_eq!(
            from_markdown("thanks @jane@example.com", &mentions),
            "thanks [~jdoe]"
        );
    }
}
