/// Modal shown when a remote call or child command fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorOverlay {
    error: String,
    output: String,
    width: u16,
    height: u16,
}

impl ErrorOverlay {
    pub fn new(error: impl Into<String>, output: impl Into<String>, width: u16, height: u16) -> Self {
        Self {
            error: error.into(),
            output: output.into(),
            width,
            height,
        }
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn text(&self) -> String {
        format!(
            "Error occurred:\n{}\n\nCommand output:\n{}\n\nPress Enter, Esc, or 'q' to close",
            self.error,
            self.output.trim_end()
        )
    }

    /// Box dimensions for the current terminal size.
    pub fn box_size(&self) -> (u16, u16) {
        (
            self.width.saturating_sub(4).min(100),
            self.height.saturating_sub(4).min(20),
        )
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_layout() {
        let overlay = ErrorOverlay::new("exit status: 1", "boom\n", 120, 40);
        assert_eq!(
            overlay.text(),
            "Error occurred:\nexit status: 1\n\nCommand output:\nboom\n\nPress Enter, Esc, or 'q' to close"
        );
    }

    #[test]
    fn test_box_size() {
        let mut overlay = ErrorOverlay::new("e", "", 200, 60);
        assert_eq!(overlay.box_size(), (100, 20));
        overlay.resize(50, 10);
        assert_eq!(overlay.box_size(), (46, 6));
    }
}
