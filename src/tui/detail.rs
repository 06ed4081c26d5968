//! Detail pane: virtualized issue document with scroll and link cycling.

use crate::data::IssueDetail;
use crate::tui::document::{self, Fragment, Segment};
use crate::tui::markdown;
use crate::tui::theme::MarkdownStyles;
use ratatui::text::Line;
use std::sync::Arc;

/// Narrowest width the document is laid out for.
pub const MIN_RENDER_WIDTH: usize = 40;

/// Viewport into the rendered document.
///
/// `first` always stays within `0..=max(0, total - viewport)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    first: usize,
    total: usize,
    viewport: usize,
}

impl ScrollState {
    pub fn first(&self) -> usize {
        self.first
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn max_first(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.first as isize + delta;
        self.first = target.clamp(0, self.max_first() as isize) as usize;
    }

    pub fn scroll_to(&mut self, line: usize) {
        self.first = line.min(self.max_first());
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.clamp();
    }

    pub fn set_viewport(&mut self, viewport: usize) {
        self.viewport = viewport;
        self.clamp();
    }

    pub fn is_visible(&self, line: usize) -> bool {
        line >= self.first && line < self.first + self.viewport.max(1)
    }

    fn clamp(&mut self) {
        self.first = self.first.min(self.max_first());
    }
}

/// Which link `tab` has selected. `-1` means none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCycle {
    index: isize,
    count: usize,
}

impl Default for LinkCycle {
    fn default() -> Self {
        Self {
            index: -1,
            count: 0,
        }
    }
}

impl LinkCycle {
    pub fn index(&self) -> isize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn selected(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }
}

/// One rendered line of the document. Tones are resolved against the theme
/// at draw time.
#[derive(Debug, Clone, PartialEq)]
pub enum DocLine {
    Text(Line<'static>),
    Rule(String),
    Segments(Vec<Segment>),
    Blank,
}

#[derive(Debug, Default)]
pub struct DetailPane {
    issue: Option<Arc<IssueDetail>>,
    loading: bool,
    server: String,
    comment_limit: usize,
    scroll_step: usize,
    fragments: Vec<Fragment>,
    width: usize,
    height: usize,
    lines: Vec<DocLine>,
    link_lines: Vec<usize>,
    link_urls: Vec<String>,
    scroll: ScrollState,
    links: LinkCycle,
    styles: MarkdownStyles,
}

impl DetailPane {
    pub fn new(server: &str, comment_limit: usize, scroll_step: usize) -> Self {
        Self {
            loading: true,
            server: server.trim_end_matches('/').to_string(),
            comment_limit,
            scroll_step: scroll_step.max(1),
            ..Default::default()
        }
    }

    pub fn with_styles(mut self, styles: MarkdownStyles) -> Self {
        self.styles = styles;
        self
    }

    pub fn issue(&self) -> Option<&Arc<IssueDetail>> {
        self.issue.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Show `detail`, or a loading indicator for `None`.
    pub fn set_issue(&mut self, detail: Option<Arc<IssueDetail>>) {
        self.loading = detail.is_none();
        self.fragments = match &detail {
            Some(d) => document::compose(
                d,
                &format!("{}/browse/{}", self.server, d.key()),
                self.comment_limit,
            ),
            None => Vec::new(),
        };
        self.issue = detail;
        self.links = LinkCycle {
            index: -1,
            count: count_links(&self.fragments),
        };
        self.scroll = ScrollState {
            first: 0,
            total: 0,
            viewport: self.scroll.viewport,
        };
        self.rebuild();
    }

    /// Nothing to show, e.g. an empty tab.
    pub fn clear(&mut self) {
        self.set_issue(None);
        self.loading = false;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width as usize;
        self.height = height as usize;
        self.scroll.set_viewport(self.height.saturating_sub(1));
        self.links.index = -1;
        self.rebuild();
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Width the document is wrapped at: 80% of a 90% wide viewport.
    pub fn render_width(&self) -> usize {
        (self.width * 9 / 10 * 8 / 10).max(MIN_RENDER_WIDTH)
    }

    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    pub fn links(&self) -> LinkCycle {
        self.links
    }

    pub fn scroll_down(&mut self) {
        self.scroll.scroll_by(self.scroll_step as isize);
    }

    pub fn scroll_up(&mut self) {
        self.scroll.scroll_by(-(self.scroll_step as isize));
    }

    /// Select the next link, scrolling forward until it is on screen.
    ///
    /// Past the last link the selection clears and the view returns to the
    /// top. Returns the URL of the newly selected link.
    pub fn cycle_link(&mut self) -> Option<String> {
        if self.links.count == 0 {
            return None;
        }

        if self.links.index == self.links.count as isize - 1 {
            self.links.index = -1;
            self.scroll.scroll_to(0);
            self.rebuild();
            return None;
        }

        self.links.index += 1;
        self.rebuild();

        let selected = self.links.selected()?;
        let target = *self.link_lines.get(selected)?;
        for _ in 0..=self.scroll.total() {
            if self.scroll.is_visible(target) || self.scroll.first() == self.scroll.max_first() {
                break;
            }
            self.scroll_down();
        }
        if !self.scroll.is_visible(target) {
            self.scroll.scroll_to(target);
        }

        self.link_urls.get(selected).cloned()
    }

    pub fn lines(&self) -> &[DocLine] {
        &self.lines
    }

    /// The lines inside the viewport.
    pub fn visible_lines(&self) -> &[DocLine] {
        let start = self.scroll.first().min(self.lines.len());
        let end = (start + self.scroll.viewport()).min(self.lines.len());
        &self.lines[start..end]
    }

    pub fn link_line(&self, index: usize) -> Option<usize> {
        self.link_lines.get(index).copied()
    }

    fn rebuild(&mut self) {
        self.lines.clear();
        self.link_lines.clear();
        self.link_urls.clear();

        let width = self.render_width();
        let selected = self.links.selected();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Markdown(text) => {
                    let base = self.link_urls.len();
                    let local = selected.and_then(|s| s.checked_sub(base));
                    let rendered = markdown::render(text, width, local, &self.styles);
                    let offset = self.lines.len();
                    for link in rendered.links {
                        self.link_lines.push(offset + link.line);
                        self.link_urls.push(link.url);
                    }
                    self.lines
                        .extend(rendered.lines.into_iter().map(DocLine::Text));
                }
                Fragment::Rule(title) => self.lines.push(DocLine::Rule(title.clone())),
                Fragment::Line(segments) => self.lines.push(DocLine::Segments(segments.clone())),
                Fragment::Blank(n) => self
                    .lines
                    .extend(std::iter::repeat(DocLine::Blank).take(*n)),
            }
        }
        self.scroll.set_total(self.lines.len());
    }
}

fn count_links(fragments: &[Fragment]) -> usize {
    fragments
        .iter()
        .map(|f| match f {
            Fragment::Markdown(text) => markdown::count_links(text),
            _ => 0,
        })
        .sum()
}
