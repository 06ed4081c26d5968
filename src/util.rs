//! Utility functions and helpers.

use anyhow::Result;
use tokio::sync::mpsc;

/// Send a value through a channel, logging a warning if it fails.
///
/// Background tasks use this for their completion message; a closed channel
/// means the UI already exited, so there is nobody left to tell.
pub async fn send_or_log<T>(tx: &mpsc::Sender<T>, value: T, context: &str) {
    if let Err(e) = tx.send(value).await {
        tracing::warn!("Failed to send {}: {}", context, e);
    }
}

/// Open a URL in the user's browser without waiting for it.
pub fn open_url(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()?;
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .or_else(|_| {
                // Fallback to wslview for WSL
                std::process::Command::new("wslview").arg(url).spawn()
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_or_log_success() {
        let (tx, mut rx) = mpsc::channel(1);
        send_or_log(&tx, 42, "test value").await;
        assert_eq!(rx.recv().await, Some(42));
    }

    #[tokio::test]
    async fn test_send_or_log_closed_channel() {
        let (tx, rx) = mpsc::channel::<i32>(1);
        drop(rx);
        // Should not panic, just log
        send_or_log(&tx, 42, "test value").await;
    }
}
