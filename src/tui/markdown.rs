//! Markdown to styled lines for the detail pane.

use crate::tui::theme::MarkdownStyles;
use crate::tui::ui::layout::display_width;
use pulldown_cmark::{Event, Options, Parser, Tag};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// A link found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLink {
    pub url: String,
    /// Index into `RenderedMarkdown::lines` of the line the link ends on.
    pub line: usize,
}

#[derive(Debug, Default)]
pub struct RenderedMarkdown {
    pub lines: Vec<Line<'static>>,
    pub links: Vec<RenderedLink>,
}

/// Number of links `render` would report for `markdown`.
pub fn count_links(markdown: &str) -> usize {
    Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH)
        .filter(|event| matches!(event, Event::Start(Tag::Link(_, _, _))))
        .count()
}

struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    width: usize,
    max_width: usize,
    /// The previous text ended in whitespace, so the next word needs a gap.
    space_pending: bool,
}

impl LineBuilder {
    fn flush(&mut self, indent: &str) {
        if !self.spans.is_empty() {
            let mut line_spans = vec![Span::raw(indent.to_string())];
            line_spans.append(&mut self.spans);
            self.lines.push(Line::from(line_spans));
        }
        self.width = 0;
        self.space_pending = false;
    }

    fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }

    /// Append one unbreakable token, wrapping at `max_width`.
    fn push_word(&mut self, word: &str, style: Style, gap: bool) {
        let word_width = display_width(word);
        if self.width > 0 && self.width + word_width + 1 > self.max_width {
            self.flush("  ");
        }
        if self.width > 0 && gap {
            self.spans.push(Span::raw(" "));
            self.width += 1;
        }
        self.spans.push(Span::styled(word.to_string(), style));
        self.width += word_width;
        self.space_pending = false;
    }

    /// Append text word by word, keeping the whitespace at its edges.
    fn push_words(&mut self, text: &str, style: Style) {
        let leading = text.starts_with(char::is_whitespace);
        for (i, word) in text.split_whitespace().enumerate() {
            let gap = i > 0 || leading || self.space_pending;
            self.push_word(word, style, gap);
        }
        if text.ends_with(char::is_whitespace) {
            self.space_pending = true;
        }
    }

    fn push_span(&mut self, text: String, style: Style) {
        self.width += display_width(&text);
        self.spans.push(Span::styled(text, style));
    }
}

/// Render `markdown` into lines no wider than `max_width` (plus indent).
///
/// `selected` is the index of the link to highlight among this text's links.
pub fn render(
    markdown: &str,
    max_width: usize,
    selected: Option<usize>,
    styles: &MarkdownStyles,
) -> RenderedMarkdown {
    let mut out = LineBuilder {
        lines: Vec::new(),
        spans: Vec::new(),
        width: 0,
        max_width: max_width.max(1),
        space_pending: false,
    };
    let mut links: Vec<RenderedLink> = Vec::new();
    let mut link_url: Option<String> = None;

    let mut is_bold = false;
    let mut is_italic = false;
    let mut is_strike = false;
    let mut in_heading = false;
    let mut in_code_block = false;
    let mut in_blockquote = false;
    let mut list_depth = 0usize;

    let MarkdownStyles {
        text: text_style,
        code: code_style,
        heading: heading_style,
        link: link_style,
        url: url_style,
        selected: selected_style,
        quote: quote_style,
    } = *styles;

    for event in Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading(_, _, _) => {
                    out.flush("  ");
                    in_heading = true;
                }
                Tag::Paragraph => {
                    if list_depth == 0 {
                        out.flush("  ");
                    }
                }
                Tag::Strong => is_bold = true,
                Tag::Emphasis => is_italic = true,
                Tag::Strikethrough => is_strike = true,
                Tag::CodeBlock(_) => {
                    out.flush("  ");
                    in_code_block = true;
                }
                Tag::BlockQuote => {
                    out.flush("  ");
                    in_blockquote = true;
                }
                Tag::List(_) => {
                    out.flush("  ");
                    list_depth += 1;
                }
                Tag::Item => {
                    out.flush("  ");
                    let indent = "  ".repeat(list_depth.saturating_sub(1));
                    out.push_span(format!("{indent}•"), text_style);
                    out.space_pending = true;
                }
                Tag::Link(_, dest, _) => link_url = Some(dest.to_string()),
                _ => {}
            },
            Event::End(tag) => match tag {
                Tag::Heading(_, _, _) => {
                    out.flush("  ");
                    out.blank();
                    in_heading = false;
                }
                Tag::Paragraph => {
                    out.flush("  ");
                    if list_depth == 0 {
                        out.blank();
                    }
                }
                Tag::Strong => is_bold = false,
                Tag::Emphasis => is_italic = false,
                Tag::Strikethrough => is_strike = false,
                Tag::CodeBlock(_) => {
                    out.flush("    ");
                    out.blank();
                    in_code_block = false;
                }
                Tag::BlockQuote => {
                    out.flush("  ");
                    in_blockquote = false;
                }
                Tag::List(_) => {
                    list_depth = list_depth.saturating_sub(1);
                    if list_depth == 0 {
                        out.flush("  ");
                        out.blank();
                    }
                }
                Tag::Item => out.flush("  "),
                Tag::Link(_, _, _) => {
                    if let Some(url) = link_url.take() {
                        let is_selected = selected == Some(links.len());
                        out.push_word(&url, if is_selected { selected_style } else { url_style }, true);
                        links.push(RenderedLink {
                            url,
                            line: out.lines.len(),
                        });
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                let mut style = if in_heading {
                    heading_style
                } else if in_code_block {
                    code_style
                } else if in_blockquote {
                    quote_style
                } else if link_url.is_some() {
                    if selected == Some(links.len()) {
                        selected_style
                    } else {
                        link_style
                    }
                } else {
                    text_style
                };
                if is_bold {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if is_italic {
                    style = style.add_modifier(Modifier::ITALIC);
                }
                if is_strike {
                    style = style.add_modifier(Modifier::CROSSED_OUT);
                }

                if in_code_block {
                    for line in text.lines() {
                        out.push_span(line.to_string(), style);
                        out.flush("    ");
                    }
                } else {
                    out.push_words(&text, style);
                }
            }
            Event::Code(code) => {
                let gap = out.space_pending;
                out.push_word(&format!("`{code}`"), code_style, gap);
            }
            Event::SoftBreak | Event::HardBreak => out.flush("  "),
            Event::Rule => {
                out.flush("  ");
                let rule = "─".repeat(out.max_width.min(40));
                out.push_span(rule, url_style);
                out.flush("  ");
                out.blank();
            }
            _ => {}
        }
    }

    out.flush("  ");

    while out
        .lines
        .last()
        .is_some_and(|line| line.spans.iter().all(|s| s.content.trim().is_empty()))
    {
        out.lines.pop();
    }

    if out.lines.is_empty() {
        out.lines.push(Line::from("  (empty)"));
    }

    // Links recorded on a line that was trimmed away still point at the last line.
    let last = out.lines.len() - 1;
    for link in &mut links {
        link.line = link.line.min(last);
    }

    RenderedMarkdown {
        lines: out.lines,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;
    use crate::tui::theme::Theme;
    use pretty_assertions::assert_eq;
    use ratatui::style::Color;

    fn plain(markdown: &str, width: usize, selected: Option<usize>) -> RenderedMarkdown {
        render(markdown, width, selected, &MarkdownStyles::default())
    }

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_paragraph_wraps() {
        let rendered = plain("one two three four", 9, None);
        let lines: Vec<String> = rendered.lines.iter().map(text_of).collect();
        assert_eq!(lines, vec!["  one two", "  three", "  four"]);
    }

    #[test]
    fn test_links_counted_and_located() {
        let md = "intro\n\n[docs](https://d.io) and more\n\nlast [x](https://x.io)";
        assert_eq!(count_links(md), 2);
        let rendered = plain(md, 80, None);
        assert_eq!(rendered.links.len(), 2);
        assert_eq!(rendered.links[0].url, "https://d.io");
        assert!(text_of(&rendered.lines[rendered.links[0].line]).contains("docs"));
        assert!(text_of(&rendered.lines[rendered.links[1].line]).contains("https://x.io"));
    }

    #[test]
    fn test_selected_link_is_highlighted() {
        let styles = MarkdownStyles::default();
        let rendered = plain("[a](https://a) [b](https://b)", 80, Some(1));
        let highlighted: Vec<String> = rendered.lines[0]
            .spans
            .iter()
            .filter(|s| s.style == styles.selected)
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(highlighted, vec!["b", "https://b"]);
    }

    #[test]
    fn test_colors_come_from_theme() {
        let config = ThemeConfig {
            accent: "#ff8800".to_string(),
            pale: "245".to_string(),
            ..ThemeConfig::default()
        };
        let styles = Theme::from_config(&config).markdown();
        let rendered = render("# Title\n\nsee [docs](https://d.io)", 80, None, &styles);

        let heading = &rendered.lines[0].spans[1];
        assert_eq!(heading.content, "Title");
        assert_eq!(heading.style.fg, Some(Color::Rgb(255, 136, 0)));

        let link_line = &rendered.lines[rendered.links[0].line];
        let docs = link_line.spans.iter().find(|s| s.content == "docs").unwrap();
        assert_eq!(docs.style, styles.link);
        let url = link_line.spans.iter().find(|s| s.content == "https://d.io").unwrap();
        assert_eq!(url.style.fg, Some(Color::Indexed(245)));
    }

    #[test]
    fn test_list_items() {
        let rendered = plain("- one\n- two", 80, None);
        let lines: Vec<String> = rendered.lines.iter().map(text_of).collect();
        assert_eq!(lines, vec!["  • one", "  • two"]);
    }

    #[test]
    fn test_empty() {
        let rendered = plain("", 80, None);
        assert_eq!(text_of(&rendered.lines[0]), "  (empty)");
    }
}
