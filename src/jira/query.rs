//! JQL construction for tab views and the epic picker.

use crate::config::{Config, TabConfig};

/// Parameters of one issue search, rendered to JQL on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueQuery {
    pub project: String,
    pub assignee: Option<String>,
    pub status: Vec<String>,
    pub issue_type: Option<String>,
    pub extra: Option<String>,
}

impl IssueQuery {
    pub fn for_tab(config: &Config, tab: &TabConfig) -> Self {
        Self {
            project: config.tab_project(tab).to_string(),
            assignee: tab.assignee.clone().filter(|a| !a.is_empty()),
            status: tab.status.clone(),
            issue_type: None,
            extra: tab.jql.clone().filter(|j| !j.trim().is_empty()),
        }
    }

    /// Epics of the tab's project, regardless of assignee or status.
    pub fn epics_for_tab(config: &Config, tab: &TabConfig) -> Self {
        Self {
            project: config.tab_project(tab).to_string(),
            issue_type: Some("Epic".to_string()),
            ..Self::default()
        }
    }

    /// Filter clauses only, without ordering. Used for backlog listings.
    pub fn filter_clause(&self) -> String {
        let mut clauses = Vec::new();
        if !self.project.is_empty() {
            clauses.push(format!("project={}", quote(&self.project)));
        }
        if let Some(issue_type) = &self.issue_type {
            clauses.push(format!("issuetype={}", quote(issue_type)));
        }
        if let Some(assignee) = &self.assignee {
            clauses.push(format!("assignee={}", quote(assignee)));
        }
        if !self.status.is_empty() {
            let quoted: Vec<String> = self.status.iter().map(|s| quote(s)).collect();
            clauses.push(format!("status IN ({})", quoted.join(", ")));
        }
        if let Some(extra) = &self.extra {
            clauses.push(format!("({})", extra.trim()));
        }
        clauses.join(" AND ")
    }

    pub fn to_jql(&self) -> String {
        let filter = self.filter_clause();
        if filter.is_empty() {
            "ORDER BY created DESC".to_string()
        } else {
            format!("{filter} ORDER BY created DESC")
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
