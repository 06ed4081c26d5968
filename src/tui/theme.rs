//! Colors resolved once from the config and passed to every draw call.

use crate::config::ThemeConfig;
use crate::tui::board::RowHighlight;
use crate::tui::document::Tone;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub pale: Color,
    pub on_board: Color,
    pub on_backlog: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

/// Parse an ANSI-256 index (`"62"`), `#rrggbb`, or a color name.
pub fn parse_color(value: &str) -> Option<Color> {
    value.trim().parse::<Color>().ok()
}

fn color_or(value: Option<&str>, fallback: Color) -> Color {
    match value {
        Some(v) => parse_color(v).unwrap_or_else(|| {
            tracing::warn!("Unknown color `{}`, using {:?}", v, fallback);
            fallback
        }),
        None => fallback,
    }
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let accent = color_or(Some(&config.accent), Color::Indexed(62));
        let pale = color_or(Some(&config.pale), Color::Indexed(240));
        Self {
            accent,
            pale,
            on_board: color_or(config.on_board.as_deref(), accent),
            on_backlog: color_or(config.on_backlog.as_deref(), pale),
        }
    }

    pub fn highlight(&self, highlight: RowHighlight) -> Color {
        match highlight {
            RowHighlight::OnBoard => self.on_board,
            RowHighlight::OnBacklog => self.on_backlog,
        }
    }

    pub fn tone(&self, tone: Tone) -> Style {
        match tone {
            Tone::Plain => Style::default(),
            Tone::Pale => Style::default().fg(self.pale),
            Tone::Strong => Style::default().add_modifier(Modifier::BOLD),
            Tone::Key => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            Tone::Accent => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Styles for issue text rendered from markdown.
    pub fn markdown(&self) -> MarkdownStyles {
        MarkdownStyles {
            text: Style::default(),
            code: Style::default().fg(self.pale),
            heading: Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD),
            link: Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::UNDERLINED),
            url: Style::default().fg(self.pale),
            selected: Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::REVERSED),
            quote: Style::default()
                .fg(self.pale)
                .add_modifier(Modifier::ITALIC),
        }
    }

    pub fn pale_style(&self) -> Style {
        Style::default().fg(self.pale)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }
}

/// Resolved styles the markdown renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownStyles {
    pub text: Style,
    pub code: Style,
    pub heading: Style,
    pub link: Style,
    /// The `(url)` shown after link text
    pub url: Style,
    /// Link picked with `tab`
    pub selected: Style,
    pub quote: Style,
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Theme::default().markdown()
    }
}
