use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as resolved by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub owner: String,
    /// Canonical name; casing may differ from what was configured.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    #[serde(untagged)]
    Other(String),
}

impl PrState {
    pub fn as_str(&self) -> &str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Other(s) => s,
        }
    }
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pull request as listed for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    pub title: String,
    pub state: PrState,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

/// A pull request attributed to the repository it was listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub title: String,
    pub state: PrState,
    pub repo_name: String,
    pub author_login: String,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl PullRequestRecord {
    pub fn new(repo: &RepositoryInfo, pr: PullRequestSummary) -> Self {
        Self {
            title: pr.title,
            state: pr.state,
            repo_name: repo.name.clone(),
            author_login: pr.author,
            created_at: pr.created_at,
            html_url: pr.html_url,
        }
    }

    /// Cell texts in table column order.
    pub fn columns(&self) -> [String; 5] {
        [
            self.title.clone(),
            self.state.to_string(),
            self.repo_name.clone(),
            self.author_login.clone(),
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]
    }
}
