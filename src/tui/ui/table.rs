//! Issue table rendering: header, rows, filter prompt, footer.

use super::layout::{compute_column_widths, pad_to_width, COLUMN_GAP};
use crate::tui::table::{column_value, FilterMode};
use crate::tui::theme::Theme;
use crate::tui::{App, Tab};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn draw_table(f: &mut Frame, app: &App, tab: &Tab, area: Rect) {
    let theme = app.theme();
    let table = &tab.table;

    if table.is_loading() && table.all_issues().is_empty() {
        let text = format!("{} Loading issues...", app.spinner_char());
        f.render_widget(Paragraph::new(text).style(theme.pale_style()), area);
        return;
    }
    if table.all_issues().is_empty() {
        f.render_widget(
            Paragraph::new("No issues found").style(theme.pale_style()),
            area,
        );
        return;
    }

    let columns = tab.columns();
    let widths = compute_column_widths(
        &columns,
        table
            .visible_issues()
            .map(|issue| columns.iter().map(|c| column_value(issue, c)).collect()),
        area.width as usize,
    );

    let mut lines = Vec::with_capacity(area.height as usize);
    lines.push(header_line(&columns, &widths, theme));
    if table.filter_mode() == FilterMode::Filtering {
        lines.push(Line::from(vec![
            Span::styled("/", theme.accent_style()),
            Span::raw(table.query().to_string()),
            Span::styled("█", theme.pale_style()),
        ]));
    }

    let rows = table.body_rows();
    for (row, issue) in table
        .visible_issues()
        .enumerate()
        .skip(table.offset())
        .take(rows)
    {
        let selected = row == table.cursor();
        let mut spans = Vec::with_capacity(columns.len() * 2);
        for (column, width) in columns.iter().zip(&widths) {
            let text = pad_to_width(&column_value(issue, column), *width);
            let mut style = Style::default();
            if column == "KEY" {
                if let Some(highlight) = table.row_highlight(&issue.key) {
                    style = style.fg(theme.highlight(highlight));
                }
            }
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" ".repeat(COLUMN_GAP)));
        }
        let mut line = Line::from(spans);
        if selected {
            line = line.style(
                Style::default()
                    .bg(theme.accent)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        }
        lines.push(line);
    }

    // Pad so the footer sits on the last row
    while lines.len() + 1 < area.height as usize {
        lines.push(Line::default());
    }
    lines.push(footer_line(app, tab, theme));

    f.render_widget(Paragraph::new(lines), area);
}

fn header_line(columns: &[String], widths: &[usize], theme: &Theme) -> Line<'static> {
    let style = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::BOLD);
    let spans: Vec<Span> = columns
        .iter()
        .zip(widths)
        .flat_map(|(column, width)| {
            [
                Span::styled(pad_to_width(column, *width), style),
                Span::raw(" ".repeat(COLUMN_GAP)),
            ]
        })
        .collect();
    Line::from(spans)
}

fn footer_line(app: &App, tab: &Tab, theme: &Theme) -> Line<'static> {
    let table = &tab.table;
    let position = if table.is_empty() {
        "0/0".to_string()
    } else {
        format!("{}/{}", table.cursor() + 1, table.len())
    };
    let left = match app.status() {
        Some(status) => Span::styled(status.to_string(), theme.accent_style()),
        None => Span::styled("?: toggle help", theme.pale_style()),
    };
    Line::from(vec![
        left,
        Span::styled(format!("  {}", position), theme.pale_style()),
    ])
}
