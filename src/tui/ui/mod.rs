//! TUI rendering module.
//!
//! - `layout` - Layout calculations and text utilities
//! - `table` - Issue table rendering
//! - `detail` - Issue detail pane and scrollbar
//! - `overlays` - Fuzzy selector, help and error modals

mod detail;
pub mod layout;
mod overlays;
mod table;

pub use self::draw::draw;

mod draw {
    use super::detail::draw_detail;
    use super::overlays::draw_overlay;
    use super::table::draw_table;
    use crate::tui::App;
    use ratatui::{
        layout::{Constraint, Direction, Layout, Rect},
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::Paragraph,
        Frame,
    };

    /// Main draw function - renders the entire TUI.
    pub fn draw(f: &mut Frame, app: &App) {
        if let Some(overlay) = app.overlay() {
            draw_overlay(f, overlay, app.theme());
            return;
        }

        let area = f.area();
        let has_tabs = app.tabs().len() > 1;
        let (table_height, _) = app.pane_heights();

        let mut constraints = Vec::with_capacity(4);
        if has_tabs {
            constraints.push(Constraint::Length(2)); // Tab band
        }
        constraints.push(Constraint::Length(table_height));
        constraints.push(Constraint::Length(1)); // Separator
        constraints.push(Constraint::Min(0)); // Detail pane

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut next = 0;
        if has_tabs {
            draw_tab_band(f, app, chunks[0]);
            next = 1;
        }
        let tab = app.active_tab();
        draw_table(f, app, tab, chunks[next]);
        draw_separator(f, app, chunks[next + 1]);
        draw_detail(f, app, &tab.detail, chunks[next + 2]);
    }

    fn draw_tab_band(f: &mut Frame, app: &App, area: Rect) {
        let theme = app.theme();
        let mut spans = Vec::new();
        for (i, tab) in app.tabs().iter().enumerate() {
            let style = if i == app.active() {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme.pale_style()
            };
            spans.push(Span::styled(format!(" {} ", tab.name()), style));
            spans.push(Span::styled("│", theme.pale_style()));
        }
        spans.pop();
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_separator(f: &mut Frame, app: &App, area: Rect) {
        let rule = "─".repeat(area.width as usize);
        f.render_widget(
            Paragraph::new(Span::styled(rule, app.theme().pale_style())),
            area,
        );
    }
}
