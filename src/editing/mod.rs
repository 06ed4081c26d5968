//! Interactive flows run by the `issue ...` and `epic add` subcommands.
//!
//! The TUI suspends itself and re-invokes the binary for these, so they own
//! the terminal while running. Prompts go to stdout; stderr is captured by
//! the parent and shown in its error overlay.

pub mod document;

use crate::config::{Config, Installation};
use crate::data::User;
use crate::jira::mention::{self, Mentions};
use crate::jira::{Client, IssueService};
use anyhow::{Context, Result};
use document::{EditDocument, EditError};
use std::future::Future;
use std::io::{self, BufRead, Write};

/// Comments fetched for editing. Every comment must be present so the
/// separator count matches what the server has.
const EDIT_COMMENT_LIMIT: usize = usize::MAX;

fn editor_command() -> String {
    std::env::var("VISUAL")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string())
}

/// Open `initial` in the user's editor and return what they saved.
pub async fn edit_text(initial: &str, flow: &'static str) -> Result<String> {
    let file = tempfile::Builder::new()
        .prefix("jira-tui-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create scratch file")?;
    std::fs::write(file.path(), initial).context("Failed to write scratch file")?;

    let editor = editor_command();
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    tracing::info!("Launching editor {} for {}", editor, flow);

    let status = tokio::process::Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .await
        .with_context(|| format!("Failed to launch editor `{editor}`"))?;

    if !status.success() {
        return Err(EditError::interrupted(flow, &format!("editor exited with {status}")).into());
    }

    std::fs::read_to_string(file.path()).context("Failed to read scratch file")
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Resolve the `@email` mentions in `text`. `users` is only awaited when
/// there is something to resolve.
pub async fn resolve_mentions<F>(text: &str, installation: Installation, users: F) -> Result<Mentions>
where
    F: Future<Output = Result<Vec<User>>>,
{
    let mentioned = mention::mentioned_emails(text);
    if mentioned.is_empty() {
        return Ok(Mentions::new());
    }
    let users = users.await.context("Failed to look up users for mentions")?;
    Ok(mention::resolve(&mentioned, &users, installation))
}

pub async fn edit_issue(config: &Config, key: &str) -> Result<()> {
    let client = Client::new(config);
    let detail = client.get_issue(key, EDIT_COMMENT_LIMIT).await?;
    let original = EditDocument::from_issue(&detail);

    let edited = edit_text(&original.compose(), "edit").await?;
    let changes = original.changes(&edited)?;
    if changes.is_empty() {
        tracing::info!("No changes to {}", key);
        return Ok(());
    }

    let mut text = changes.description.clone().unwrap_or_default();
    for (_, body) in &changes.comments {
        text.push('\n');
        text.push_str(body);
    }
    let mentions = resolve_mentions(&text, config.installation, client.assignable_users(key)).await?;

    client
        .update_issue(
            key,
            changes.summary.as_deref(),
            changes.description.as_deref(),
            &mentions,
        )
        .await?;
    for (comment_id, body) in &changes.comments {
        client.update_comment(key, comment_id, body, &mentions).await?;
    }
    tracing::info!("Updated {} ({} comments changed)", key, changes.comments.len());
    Ok(())
}

pub async fn create_issue(config: &Config, project: Option<&str>) -> Result<()> {
    let project = project
        .filter(|p| !p.is_empty())
        .unwrap_or(&config.project)
        .to_string();
    if project.is_empty() {
        anyhow::bail!("No project given and no default project configured");
    }

    let issue_type = prompt("Issue type [Task]: ")?;
    let issue_type = if issue_type.is_empty() {
        "Task".to_string()
    } else {
        issue_type
    };

    let text = edit_text("", "create").await?;
    let parsed = document::parse(&text);
    if parsed.summary.is_empty() {
        return Err(EditError::interrupted("create", "empty summary").into());
    }

    let client = Client::new(config);
    let mentions = resolve_mentions(
        &parsed.description,
        config.installation,
        client.assignable_in_project(&project),
    )
    .await?;
    let key = client
        .create_issue(
            &project,
            &issue_type,
            &parsed.summary,
            &parsed.description,
            &mentions,
        )
        .await?;
    println!("Created {key}");
    tracing::info!("Created {} in {}", key, project);
    Ok(())
}

pub async fn add_comment(config: &Config, key: &str) -> Result<()> {
    let body = edit_text("", "comment").await?;
    let body = body.trim();
    if body.is_empty() {
        return Err(EditError::interrupted("comment", "empty body").into());
    }
    let client = Client::new(config);
    let mentions = resolve_mentions(body, config.installation, client.assignable_users(key)).await?;
    client.add_comment(key, body, &mentions).await?;
    tracing::info!("Commented on {}", key);
    Ok(())
}

pub async fn move_issue(config: &Config, key: &str) -> Result<()> {
    let client = Client::new(config);
    let transitions = client.transitions(key).await?;
    if transitions.is_empty() {
        anyhow::bail!("No transitions available for {key}");
    }

    println!("Move {key} to:");
    for (i, t) in transitions.iter().enumerate() {
        match &t.to {
            Some(to) if to != &t.name => println!("  {}) {} -> {}", i + 1, t.name, to),
            _ => println!("  {}) {}", i + 1, t.name),
        }
    }

    let choice = prompt("Transition number (empty to cancel): ")?;
    if choice.is_empty() {
        return Err(EditError::interrupted("move", "").into());
    }
    let index: usize = choice
        .parse()
        .ok()
        .filter(|n| (1..=transitions.len()).contains(n))
        .with_context(|| format!("Invalid choice `{choice}`"))?;

    let chosen = &transitions[index - 1];
    client.transition(key, &chosen.id).await?;
    tracing::info!("Moved {} via {}", key, chosen.name);
    Ok(())
}

pub async fn add_to_epic(config: &Config, epic: &str, key: &str) -> Result<()> {
    Client::new(config).set_parent(key, epic).await?;
    tracing::info!("Added {} to epic {}", key, epic);
    Ok(())
}
