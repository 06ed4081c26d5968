//! Best-effort clipboard writes.

use anyhow::{Context, Result};
use arboard::Clipboard;

pub fn copy(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to open clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to write clipboard")
}

/// Copy on a blocking thread; the caller never learns the result.
pub fn copy_in_background(text: String) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = copy(&text) {
            tracing::debug!("Clipboard write failed: {:#}", e);
        }
    });
}
