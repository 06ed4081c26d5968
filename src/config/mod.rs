use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Columns the issue table knows how to render.
pub const VALID_COLUMNS: &[&str] = &[
    "KEY",
    "TYPE",
    "PARENT",
    "SUMMARY",
    "STATUS",
    "ASSIGNEE",
    "REPORTER",
    "CREATED",
    "PRIORITY",
    "RESOLUTION",
    "UPDATED",
    "LABELS",
];

/// Environment variable that overrides the configured API token.
pub const TOKEN_ENV: &str = "JIRA_API_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: String,
    pub login: String,
    #[serde(default)]
    pub installation: Installation,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub tabs: Vec<TabConfig>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Installation {
    #[default]
    Cloud,
    Local,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Basic,
    Bearer,
}

/// One configured issue view.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TabConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub issue: IssueViewConfig,
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_pale")]
    pub pale: String,
    #[serde(default)]
    pub on_board: Option<String>,
    #[serde(default)]
    pub on_backlog: Option<String>,
}

fn default_accent() -> String {
    "62".to_string()
}

fn default_pale() -> String {
    "240".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: default_accent(),
            pale: default_pale(),
            on_board: None,
            on_backlog: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueViewConfig {
    #[serde(default = "default_scroll_size")]
    pub scroll_size: i64,
    #[serde(default = "default_comment_limit")]
    pub comment_limit: usize,
}

fn default_scroll_size() -> i64 {
    1
}

fn default_comment_limit() -> usize {
    10
}

impl Default for IssueViewConfig {
    fn default() -> Self {
        Self {
            scroll_size: default_scroll_size(),
            comment_limit: default_comment_limit(),
        }
    }
}

impl IssueViewConfig {
    /// Scroll step for the detail pane; non-positive values fall back to 1.
    pub fn scroll_step(&self) -> usize {
        if self.scroll_size <= 0 {
            1
        } else {
            self.scroll_size as usize
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_prefetch")]
    pub prefetch_from_top: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_prefetch() -> usize {
    5
}

fn default_page_size() -> usize {
    100
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            prefetch_from_top: default_prefetch(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// A config with only the connection fields set; everything else defaulted.
    pub fn new(server: &str, login: &str, project: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            login: login.to_string(),
            installation: Installation::default(),
            auth_type: AuthType::default(),
            project: project.to_string(),
            token: String::new(),
            tabs: Vec::new(),
            ui: UiConfig::default(),
        }
    }

    /// Token from the environment, falling back to the config file.
    pub fn api_token(&self) -> String {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.token.clone())
    }

    /// Tabs to open; a config without any gets a single "Issues" tab on the default project.
    pub fn effective_tabs(&self) -> Vec<TabConfig> {
        if self.tabs.is_empty() {
            return vec![TabConfig {
                name: "Issues".to_string(),
                ..TabConfig::default()
            }];
        }
        self.tabs.clone()
    }

    /// Project a tab queries, falling back to the top-level project.
    pub fn tab_project<'a>(&'a self, tab: &'a TabConfig) -> &'a str {
        tab.project
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.project)
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.server.trim_end_matches('/'), key)
    }

    fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            anyhow::bail!("`server` must be set");
        }
        for tab in &self.tabs {
            for column in &tab.columns {
                let upper = column.to_uppercase();
                if !VALID_COLUMNS.contains(&upper.as_str()) {
                    anyhow::bail!(
                        "Unknown column `{}` in tab `{}`. Valid columns: {}",
                        column,
                        tab.name,
                        VALID_COLUMNS.join(", ")
                    );
                }
            }
        }
        Ok(())
    }
}

impl TabConfig {
    /// Upper-cased column list, or the default set when none is configured.
    pub fn columns(&self) -> Vec<String> {
        if self.columns.is_empty() {
            VALID_COLUMNS.iter().map(|c| c.to_string()).collect()
        } else {
            self.columns.iter().map(|c| c.to_uppercase()).collect()
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "jira-tui")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn cache_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "jira-tui")
        .context("Could not determine cache directory")?
        .cache_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn parse(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)?;
    config.server = config.server.trim_end_matches('/').to_string();
    config.validate()?;
    Ok(config)
}

pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `jira-tui --init` to create one.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub async fn init_wizard() -> Result<()> {
    use std::io::{self, Write};

    println!("jira-tui Configuration Wizard");
    println!("=============================\n");

    let config_path = default_config_path()?;
    if config_path.exists() {
        print!("Config already exists at {}. Overwrite? [y/N] ", config_path.display());
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let ask = |prompt: &str| -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    };

    let server = ask("Jira server URL (e.g. https://example.atlassian.net): ")?;
    let login = ask("Login (email for cloud, username for server): ")?;
    let installation = ask("Installation type [cloud/local] (default cloud): ")?;
    let project = ask("Default project key: ")?;
    let token = ask(&format!(
        "API token (press Enter to use ${TOKEN_ENV} at runtime): "
    ))?;

    let mut config = Config::new(&server, &login, &project);
    config.token = token;
    if installation.eq_ignore_ascii_case("local") {
        config.installation = Installation::Local;
    }

    // Create config directory
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(&config_path, content)?;

    // The token may live in here
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))?;
    }

    println!("\nConfig saved to {}", config_path.display());
    println!("Run `jira-tui` to start browsing.");

    Ok(())
}
