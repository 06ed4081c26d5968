pub mod adf;
pub mod mention;
pub mod query;
pub mod types;
pub mod wiki;

use crate::config::{AuthType, Config, Installation};
use crate::data::{IssueDetail, IssueSummary, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use types::{CreatedIssue, ErrorBody, SearchResponse, TransitionsResponse, UserNode};

pub use mention::Mentions;
pub use query::IssueQuery;
pub use types::{SearchPage, Transition};

/// Shared HTTP client for all API requests to enable connection pooling
pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(5)
        .build()
        .expect("Failed to create HTTP client")
});

/// Remote operations the browser needs. The controller only talks to this
/// trait so tests can swap in an in-memory service.
#[async_trait]
pub trait IssueService: Send + Sync {
    async fn search(&self, jql: &str, from: usize, limit: usize) -> Result<SearchPage>;

    async fn get_issue(&self, key: &str, comment_limit: usize) -> Result<IssueDetail>;

    /// `None` unassigns.
    async fn assign(&self, key: &str, user: Option<&User>) -> Result<()>;

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>>;

    /// `target` is a transition id or a transition/status name.
    async fn transition(&self, key: &str, target: &str) -> Result<()>;

    async fn backlog_members(&self, board_id: u64, jql: &str) -> Result<Vec<IssueSummary>>;

    async fn move_to_backlog(&self, board_id: u64, key: &str) -> Result<()>;

    async fn move_to_board(&self, board_id: u64, key: &str) -> Result<()>;

    async fn assignable_users(&self, key: &str) -> Result<Vec<User>>;
}

/// Jira REST client for one configured server.
#[derive(Debug, Clone)]
pub struct Client {
    server: String,
    login: String,
    token: String,
    installation: Installation,
    auth_type: AuthType,
}

impl Client {
    pub fn new(config: &Config) -> Self {
        Self {
            server: config.server.trim_end_matches('/').to_string(),
            login: config.login.clone(),
            token: config.api_token(),
            installation: config.installation,
            auth_type: config.auth_type,
        }
    }

    /// Cloud goes through v3 wherever descriptions or comments are read or
    /// written, since v3 carries them as ADF. Server only speaks v2.
    fn api_version(&self) -> &'static str {
        match self.installation {
            Installation::Cloud => "3",
            Installation::Local => "2",
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/{}{}", self.server, self.api_version(), path)
    }

    fn write_url(&self, path: &str) -> String {
        format!("{}/rest/api/2{}", self.server, path)
    }

    fn agile_url(&self, path: &str) -> String {
        format!("{}/rest/agile/1.0{}", self.server, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = HTTP_CLIENT
            .request(method, url)
            .header("Accept", "application/json")
            .header("User-Agent", "jira-tui");
        match self.auth_type {
            AuthType::Basic => builder.basic_auth(&self.login, Some(&self.token)),
            AuthType::Bearer => builder.bearer_auth(&self.token),
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        tracing::debug!("jira request: {}", what);
        let response = builder
            .send()
            .await
            .with_context(|| format!("{what} failed"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.describe());
        tracing::warn!("{} failed with {}", what, status);
        match detail {
            Some(detail) => anyhow::bail!("{what} failed with {status}: {detail}"),
            None => anyhow::bail!("{what} failed with {status}"),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = self.send(builder, what).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response of {what}"))
    }

    /// Markdown from the editor in the body format this installation stores.
    pub fn markup(&self, markdown: &str, mentions: &Mentions) -> Value {
        match self.installation {
            Installation::Cloud => adf::from_markdown(markdown, mentions),
            Installation::Local => Value::String(wiki::from_markdown(markdown, mentions)),
        }
    }

    pub async fn update_issue(
        &self,
        key: &str,
        summary: Option<&str>,
        description: Option<&str>,
        mentions: &Mentions,
    ) -> Result<()> {
        let mut fields = serde_json::Map::new();
        if let Some(summary) = summary {
            fields.insert("summary".to_string(), json!(summary));
        }
        if let Some(description) = description {
            fields.insert("description".to_string(), self.markup(description, mentions));
        }
        if fields.is_empty() {
            return Ok(());
        }
        let url = self.api_url(&issue_path(key, ""));
        self.send(
            self.request(Method::PUT, &url).json(&json!({ "fields": fields })),
            &format!("PUT /issue/{key}"),
        )
        .await?;
        Ok(())
    }

    pub async fn update_comment(
        &self,
        key: &str,
        comment_id: &str,
        body: &str,
        mentions: &Mentions,
    ) -> Result<()> {
        let url = self.api_url(&issue_path(key, &format!("/comment/{comment_id}")));
        let body = json!({ "body": self.markup(body, mentions) });
        self.send(
            self.request(Method::PUT, &url).json(&body),
            &format!("PUT /issue/{key}/comment/{comment_id}"),
        )
        .await?;
        Ok(())
    }

    pub async fn add_comment(&self, key: &str, body: &str, mentions: &Mentions) -> Result<()> {
        let url = self.api_url(&issue_path(key, "/comment"));
        let body = json!({ "body": self.markup(body, mentions) });
        self.send(
            self.request(Method::POST, &url).json(&body),
            &format!("POST /issue/{key}/comment"),
        )
        .await?;
        Ok(())
    }

    /// Returns the new issue's key.
    pub async fn create_issue(
        &self,
        project: &str,
        issue_type: &str,
        summary: &str,
        description: &str,
        mentions: &Mentions,
    ) -> Result<String> {
        let mut fields = json!({
            "project": { "key": project },
            "issuetype": { "name": issue_type },
            "summary": summary,
        });
        if !description.trim().is_empty() {
            fields["description"] = self.markup(description, mentions);
        }
        let url = self.api_url("/issue");
        let created: CreatedIssue = self
            .send_json(
                self.request(Method::POST, &url).json(&json!({ "fields": fields })),
                "POST /issue",
            )
            .await?;
        Ok(created.key)
    }

    pub async fn set_parent(&self, key: &str, parent_key: &str) -> Result<()> {
        let url = self.write_url(&issue_path(key, ""));
        let body = json!({ "fields": { "parent": { "key": parent_key } } });
        self.send(
            self.request(Method::PUT, &url).json(&body),
            &format!("PUT /issue/{key} (parent)"),
        )
        .await?;
        Ok(())
    }

    /// Users assignable to issues in `project`, for mentions in an issue
    /// that does not exist yet.
    pub async fn assignable_in_project(&self, project: &str) -> Result<Vec<User>> {
        let url = self.api_url("/user/assignable/search");
        let nodes: Vec<UserNode> = self
            .send_json(
                self.request(Method::GET, &url)
                    .query(&[("project", project), ("maxResults", "1000")]),
                "GET /user/assignable/search",
            )
            .await?;
        Ok(nodes
            .into_iter()
            .map(UserNode::into_user)
            .filter(|u| u.active)
            .collect())
    }

    async fn move_issue(&self, url: String, what: String, key: &str) -> Result<()> {
        self.send(
            self.request(Method::POST, &url).json(&json!({ "issues": [key] })),
            &what,
        )
        .await?;
        Ok(())
    }
}

/// `/issue/KEY` plus `rest`, with the key escaped for use in a path.
fn issue_path(key: &str, rest: &str) -> String {
    format!("/issue/{}{}", urlencoding::encode(key), rest)
}

#[async_trait]
impl IssueService for Client {
    async fn search(&self, jql: &str, from: usize, limit: usize) -> Result<SearchPage> {
        let limit = limit.to_string();
        let builder = match self.installation {
            Installation::Cloud => self
                .request(Method::GET, &self.api_url("/search/jql"))
                .query(&[
                    ("jql", jql),
                    ("maxResults", limit.as_str()),
                    ("fields", types::SUMMARY_FIELDS),
                ]),
            Installation::Local => {
                let from = from.to_string();
                self.request(Method::GET, &self.api_url("/search")).query(&[
                    ("jql", jql),
                    ("startAt", from.as_str()),
                    ("maxResults", limit.as_str()),
                    ("fields", types::SUMMARY_FIELDS),
                ])
            }
        };
        let response: SearchResponse = self.send_json(builder, "GET /search").await?;
        Ok(response.into_page())
    }

    async fn get_issue(&self, key: &str, comment_limit: usize) -> Result<IssueDetail> {
        let url = self.api_url(&issue_path(key, ""));
        let node: types::IssueNode = self
            .send_json(self.request(Method::GET, &url), &format!("GET /issue/{key}"))
            .await?;
        Ok(node.into_detail(comment_limit))
    }

    async fn assign(&self, key: &str, user: Option<&User>) -> Result<()> {
        let id = user.and_then(|u| u.assign_id(self.installation));
        let body = match self.installation {
            Installation::Cloud => json!({ "accountId": id }),
            Installation::Local => json!({ "name": id }),
        };
        let url = self.write_url(&issue_path(key, "/assignee"));
        self.send(
            self.request(Method::PUT, &url).json(&body),
            &format!("PUT /issue/{key}/assignee"),
        )
        .await?;
        Ok(())
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let url = self.write_url(&issue_path(key, "/transitions"));
        let response: TransitionsResponse = self
            .send_json(
                self.request(Method::GET, &url),
                &format!("GET /issue/{key}/transitions"),
            )
            .await?;
        Ok(response.into_transitions())
    }

    async fn transition(&self, key: &str, target: &str) -> Result<()> {
        let available = self.transitions(key).await?;
        let chosen = available
            .iter()
            .find(|t| t.id == target)
            .or_else(|| available.iter().find(|t| t.name.eq_ignore_ascii_case(target)))
            .or_else(|| {
                available
                    .iter()
                    .find(|t| t.to.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(target)))
            })
            .with_context(|| format!("No transition to `{target}` available for {key}"))?;

        let url = self.write_url(&issue_path(key, "/transitions"));
        self.send(
            self.request(Method::POST, &url)
                .json(&json!({ "transition": { "id": chosen.id } })),
            &format!("POST /issue/{key}/transitions"),
        )
        .await?;
        Ok(())
    }

    async fn backlog_members(&self, board_id: u64, jql: &str) -> Result<Vec<IssueSummary>> {
        let url = self.agile_url(&format!("/board/{board_id}/backlog"));
        let response: SearchResponse = self
            .send_json(
                self.request(Method::GET, &url).query(&[
                    ("maxResults", "100"),
                    ("jql", jql),
                    ("fields", types::SUMMARY_FIELDS),
                ]),
                &format!("GET /board/{board_id}/backlog"),
            )
            .await?;
        Ok(response.into_page().issues)
    }

    async fn move_to_backlog(&self, board_id: u64, key: &str) -> Result<()> {
        self.move_issue(
            self.agile_url(&format!("/backlog/{board_id}/issue")),
            format!("POST /backlog/{board_id}/issue"),
            key,
        )
        .await
    }

    async fn move_to_board(&self, board_id: u64, key: &str) -> Result<()> {
        self.move_issue(
            self.agile_url(&format!("/board/{board_id}/issue")),
            format!("POST /board/{board_id}/issue"),
            key,
        )
        .await
    }

    async fn assignable_users(&self, key: &str) -> Result<Vec<User>> {
        let url = self.api_url("/user/assignable/search");
        let nodes: Vec<UserNode> = self
            .send_json(
                self.request(Method::GET, &url)
                    .query(&[("issueKey", key), ("maxResults", "1000")]),
                "GET /user/assignable/search",
            )
            .await?;
        Ok(nodes
            .into_iter()
            .map(UserNode::into_user)
            .filter(|u| u.active)
            .collect())
    }
}
