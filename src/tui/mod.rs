mod app;
pub mod board;
pub mod cache;
mod clipboard;
pub mod detail;
pub mod document;
pub mod keybindings;
pub mod markdown;
pub mod message;
pub mod overlay;
pub mod search;
pub mod subprocess;
pub mod table;
mod tasks;
pub mod theme;
mod ui;

use crate::config::Config;
use crate::jira::IssueService;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use app::{App, Tab, SPINNER_FRAMES};
pub use message::{Message, TabLoad};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run(
    config: Config,
    service: Arc<dyn IssueService>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if !std::io::IsTerminal::is_terminal(&io::stdout()) {
        anyhow::bail!("jira-tui requires an interactive terminal");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, service, config_path);
    let size = terminal.size()?;
    app.update(Message::Resize {
        width: size.width,
        height: size.height,
    })?;

    // The UI shows a loading state until the first tab arrives
    app.start();

    let result = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(terminal: &mut Term, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            match event::read()? {
                Event::Resize(width, height) => {
                    app.update(Message::Resize { width, height })?;
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let msg = keybindings::dispatch(app.mode(), key);
                    if app.update(msg)? {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }

        if let Some(request) = app.take_pending_exec() {
            let outcome = with_suspended_terminal(terminal, subprocess::run(&request)).await?;
            app.update(Message::SubprocessFinished {
                tab: request.tab,
                kind: request.kind,
                key: request.key,
                outcome,
            })?;
        }

        if app.poll_messages()? {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = std::time::Instant::now();
        }
    }
}

/// Give the terminal to a child process for the duration of `work`.
async fn with_suspended_terminal<T>(
    terminal: &mut Term,
    work: impl std::future::Future<Output = T>,
) -> Result<T> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    let output = work.await;

    enable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    terminal.clear()?;

    Ok(output)
}
