use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jira_tui::{config, editing, jira, tui};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "jira-tui")]
#[command(about = "Terminal issue browser for Jira")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse issues (the default)
    Ui,
    /// Work on a single issue
    Issue {
        #[command(subcommand)]
        action: IssueCommand,
    },
    /// Epic membership
    Epic {
        #[command(subcommand)]
        action: EpicCommand,
    },
}

#[derive(Subcommand, Debug)]
enum IssueCommand {
    /// Edit summary, description and comments in $EDITOR
    Edit { key: String },
    /// Create an issue
    Create {
        /// Project key; defaults to the configured project
        #[arg(long, short)]
        project: Option<String>,
    },
    /// Comments
    Comment {
        #[command(subcommand)]
        action: CommentCommand,
    },
    /// Transition an issue to another status
    Move { key: String },
}

#[derive(Subcommand, Debug)]
enum CommentCommand {
    /// Write a new comment in $EDITOR
    Add { key: String },
}

#[derive(Subcommand, Debug)]
enum EpicCommand {
    /// Make KEY a child of EPIC
    Add { epic: String, key: String },
}

/// Log to a file under the cache dir; stdout belongs to the TUI and stderr
/// is captured by the parent when running as a child command.
fn init_logging(debug: bool) -> Result<()> {
    let dir = config::cache_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join("jira-tui.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let level = if debug { "jira_tui=debug" } else { "jira_tui=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = init_logging(args.debug) {
        eprintln!("Logging disabled: {:#}", e);
    }

    if args.init {
        config::init_wizard().await?;
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;

    match args.command {
        None | Some(Command::Ui) => {
            let service = Arc::new(jira::Client::new(&config));
            tui::run(config, service, args.config).await
        }
        Some(Command::Issue { action }) => match action {
            IssueCommand::Edit { key } => editing::edit_issue(&config, &key).await,
            IssueCommand::Create { project } => {
                editing::create_issue(&config, project.as_deref()).await
            }
            IssueCommand::Comment {
                action: CommentCommand::Add { key },
            } => editing::add_comment(&config, &key).await,
            IssueCommand::Move { key } => editing::move_issue(&config, &key).await,
        },
        Some(Command::Epic {
            action: EpicCommand::Add { epic, key },
        }) => editing::add_to_epic(&config, &epic, &key).await,
    }
}
