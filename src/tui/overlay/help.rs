use crate::tui::keybindings::{generate_help_for_mode, Mode};

/// Scrollable key reference generated from the binding registry.
#[derive(Debug, Clone)]
pub struct HelpOverlay {
    lines: Vec<String>,
    scroll: usize,
    width: u16,
    height: u16,
}

impl HelpOverlay {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            lines: generate_help_for_mode(Mode::Normal),
            scroll: 0,
            width,
            height,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Inner rows of the bordered box.
    pub fn viewport(&self) -> usize {
        self.height.saturating_sub(2).max(1) as usize
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.lines.len().saturating_sub(self.viewport());
        self.scroll = (self.scroll as isize + delta).clamp(0, max as isize) as usize;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.scroll_by(0);
    }
}
