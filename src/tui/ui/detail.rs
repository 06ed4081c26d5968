//! Issue detail pane: the visible window of the document and its scrollbar.

use super::layout::fit_line_to_width;
use crate::tui::detail::{DetailPane, DocLine, ScrollState};
use crate::tui::document::rule_text;
use crate::tui::theme::Theme;
use crate::tui::App;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn draw_detail(f: &mut Frame, app: &App, pane: &DetailPane, area: Rect) {
    let theme = app.theme();

    if pane.is_loading() {
        let text = format!("{} Loading issue...", app.spinner_char());
        f.render_widget(Paragraph::new(text).style(theme.pale_style()), area);
        return;
    }
    if pane.issue().is_none() {
        return;
    }

    // The document takes a centered 90% of the pane
    let width = (area.width as usize * 9 / 10).max(1) as u16;
    let body = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height.saturating_sub(1),
    };

    let lines: Vec<Line> = pane
        .visible_lines()
        .iter()
        .map(|line| fit_line_to_width(doc_line(line, theme), body.width as usize))
        .collect();
    f.render_widget(Paragraph::new(lines), body);

    let scroll = pane.scroll();
    if scroll.total() > scroll.viewport() && area.width > 0 {
        let bar = Rect {
            x: area.x + area.width - 1,
            y: area.y,
            width: 1,
            height: body.height,
        };
        draw_scrollbar(f, &scroll, bar, theme);
    }
}

fn doc_line(line: &DocLine, theme: &Theme) -> Line<'static> {
    match line {
        DocLine::Text(line) => line.clone(),
        DocLine::Rule(title) => Line::from(Span::styled(rule_text(title), theme.pale_style())),
        DocLine::Segments(segments) => Line::from(
            segments
                .iter()
                .map(|s| Span::styled(s.text.clone(), theme.tone(s.tone)))
                .collect::<Vec<_>>(),
        ),
        DocLine::Blank => Line::default(),
    }
}

/// Thumb extent `(start, size)` for a track of `height` rows.
pub fn thumb(scroll: &ScrollState, height: usize) -> (usize, usize) {
    let total = scroll.total().max(1);
    let size = (scroll.viewport() * height / total).clamp(1, height.max(1));
    let travel = height.saturating_sub(size);
    let range = scroll.max_first();
    let start = if range == 0 {
        0
    } else {
        scroll.first() * travel / range
    };
    (start, size)
}

fn draw_scrollbar(f: &mut Frame, scroll: &ScrollState, area: Rect, theme: &Theme) {
    let height = area.height as usize;
    let (start, size) = thumb(scroll, height);
    let lines: Vec<Line> = (0..height)
        .map(|row| {
            if row >= start && row < start + size {
                Line::from(Span::styled("█", theme.accent_style()))
            } else {
                Line::from(Span::styled("▓", theme.pale_style()))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scroll(first: usize, total: usize, viewport: usize) -> ScrollState {
        let mut state = ScrollState::default();
        state.set_viewport(viewport);
        state.set_total(total);
        state.scroll_to(first);
        state
    }

    #[test]
    fn test_thumb_at_top_and_bottom() {
        assert_eq!(thumb(&scroll(0, 100, 10), 10), (0, 1));
        assert_eq!(thumb(&scroll(90, 100, 10), 10), (9, 1));
    }

    #[test]
    fn test_thumb_scales_with_viewport() {
        assert_eq!(thumb(&scroll(0, 20, 10), 10), (0, 5));
        assert_eq!(thumb(&scroll(10, 20, 10), 10), (5, 5));
    }
}
