//! Interactive flows run by re-invoking this binary with the terminal handed
//! over to the child.

use std::path::Path;
use std::process::Stdio;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecKind {
    Edit,
    Create,
    Comment,
    Move,
    AssignEpic,
}

impl ExecKind {
    /// Creation yields a key nobody knows yet, so the whole tab reloads.
    pub fn needs_full_reload(&self) -> bool {
        matches!(self, ExecKind::Create)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub kind: ExecKind,
    pub tab: usize,
    pub key: Option<String>,
    pub args: Vec<String>,
}

impl ExecRequest {
    fn new(
        kind: ExecKind,
        tab: usize,
        key: Option<String>,
        config_path: Option<&Path>,
        args: &[&str],
    ) -> Self {
        let mut full = Vec::new();
        if let Some(path) = config_path {
            full.push("-c".to_string());
            full.push(path.display().to_string());
        }
        full.extend(args.iter().map(|a| a.to_string()));
        Self {
            kind,
            tab,
            key,
            args: full,
        }
    }

    pub fn edit(tab: usize, key: &str, config_path: Option<&Path>) -> Self {
        Self::new(
            ExecKind::Edit,
            tab,
            Some(key.to_string()),
            config_path,
            &["issue", "edit", key],
        )
    }

    pub fn create(tab: usize, project: &str, config_path: Option<&Path>) -> Self {
        Self::new(
            ExecKind::Create,
            tab,
            None,
            config_path,
            &["issue", "create", "-p", project],
        )
    }

    pub fn comment(tab: usize, key: &str, config_path: Option<&Path>) -> Self {
        Self::new(
            ExecKind::Comment,
            tab,
            Some(key.to_string()),
            config_path,
            &["issue", "comment", "add", key],
        )
    }

    pub fn transition(tab: usize, key: &str, config_path: Option<&Path>) -> Self {
        Self::new(
            ExecKind::Move,
            tab,
            Some(key.to_string()),
            config_path,
            &["issue", "move", key],
        )
    }

    pub fn assign_epic(tab: usize, epic: &str, key: &str, config_path: Option<&Path>) -> Self {
        Self::new(
            ExecKind::AssignEpic,
            tab,
            Some(key.to_string()),
            config_path,
            &["epic", "add", epic, key],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Ok,
    /// The user backed out of the flow; treated as success
    Cancelled,
    Failed { error: String, stderr: String },
}

impl ExecOutcome {
    pub fn classify(success: bool, status: &str, stderr: &str) -> Self {
        if success {
            ExecOutcome::Ok
        } else if stderr.contains("interrupt") {
            ExecOutcome::Cancelled
        } else {
            ExecOutcome::Failed {
                error: status.to_string(),
                stderr: stderr.to_string(),
            }
        }
    }
}

/// Run the child to completion. stdin/stdout stay attached to the terminal
/// so editors and prompts work; stderr is captured for the error overlay.
pub async fn run(request: &ExecRequest) -> ExecOutcome {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            return ExecOutcome::Failed {
                error: format!("Failed to locate executable: {}", e),
                stderr: String::new(),
            }
        }
    };

    tracing::info!("Running {:?}: {}", request.kind, request.args.join(" "));

    let child = tokio::process::Command::new(exe)
        .args(&request.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn();

    let output = match child {
        Ok(child) => child.wait_with_output().await,
        Err(e) => Err(e),
    };

    match output {
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let outcome = ExecOutcome::classify(
                output.status.success(),
                &output.status.to_string(),
                &stderr,
            );
            if let ExecOutcome::Failed { error, .. } = &outcome {
                tracing::warn!("{:?} failed: {}", request.kind, error);
            }
            outcome
        }
        Err(e) => ExecOutcome::Failed {
            error: format!("Failed to run command: {}", e),
            stderr: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_classify() {
        assert_eq!(ExecOutcome::classify(true, "exit status: 0", ""), ExecOutcome::Ok);
        assert_eq!(
            ExecOutcome::classify(false, "exit status: 1", "Error: edit interrupted: no changes"),
            ExecOutcome::Cancelled
        );
        assert_eq!(
            ExecOutcome::classify(false, "exit status: 1", "Error: 400 Bad Request"),
            ExecOutcome::Failed {
                error: "exit status: 1".to_string(),
                stderr: "Error: 400 Bad Request".to_string(),
            }
        );
    }

    #[test]
    fn test_config_path_is_forwarded() {
        let path = PathBuf::from("/tmp/jira.toml");
        let request = ExecRequest::assign_epic(1, "ABC-9", "ABC-2", Some(&path));
        assert_eq!(
            request.args,
            vec!["-c", "/tmp/jira.toml", "epic", "add", "ABC-9", "ABC-2"]
        );
        assert_eq!(request.key.as_deref(), Some("ABC-2"));

        let request = ExecRequest::create(0, "ABC", None);
        assert_eq!(request.args, vec!["issue", "create", "-p", "ABC"]);
        assert!(request.kind.needs_full_reload());
    }
}
