//! Modal rendering: fuzzy selector, help, error.

use super::layout::{centered_rect, fit_line_to_width, popup_rect, truncate_with_ellipsis};
use crate::data::Listable;
use crate::tui::overlay::{ErrorOverlay, FuzzyOverlay, FuzzySelector, HelpOverlay, Overlay};
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn draw_overlay(f: &mut Frame, overlay: &Overlay, theme: &Theme) {
    match overlay {
        Overlay::Fuzzy(FuzzyOverlay::Epic { selector, .. }) => draw_selector(f, selector, theme),
        Overlay::Fuzzy(FuzzyOverlay::User { selector, .. }) => draw_selector(f, selector, theme),
        Overlay::Help(help) => draw_help(f, help, theme),
        Overlay::Error(error) => draw_error(f, error),
    }
}

fn draw_selector<T: Listable>(f: &mut Frame, selector: &FuzzySelector<T>, theme: &Theme) {
    let area = f.area();
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(Span::styled(
            format!(" {} ", selector.title()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", theme.accent_style()),
            Span::raw(selector.query().to_string()),
            Span::styled("█", theme.pale_style()),
        ]),
        Line::from(Span::styled("─".repeat(width), theme.pale_style())),
    ];

    if selector.match_count() == 0 {
        lines.push(Line::from(Span::styled("No matches", theme.pale_style())));
    }
    for (item, selected) in selector.visible() {
        let marker = if selected { "▶ " } else { "  " };
        let mut line = Line::from(vec![
            Span::raw(marker),
            Span::styled(item.title(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(item.description(), theme.pale_style()),
        ]);
        if selected {
            line = line.style(Style::default().fg(theme.accent));
        }
        lines.push(fit_line_to_width(line, width));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(f: &mut Frame, help: &HelpOverlay, theme: &Theme) {
    let area = popup_rect(60, 80, 50, 12, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(" Help ")
        .title_bottom(Line::from(" j/k: scroll | ?/esc: close ").right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = help
        .lines()
        .iter()
        .skip(help.scroll())
        .take(inner.height as usize)
        .map(|l| Line::from(truncate_with_ellipsis(l, inner.width as usize)))
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_error(f: &mut Frame, error: &ErrorOverlay) {
    let (width, height) = error.box_size();
    let area: Rect = centered_rect(width, height, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ratatui::style::Color::Red))
        .title(" Error ");
    let paragraph = Paragraph::new(error.text())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
