use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;

use crate::error::{Result, WatchError};
use crate::forge::{PullRequestSource, TokenVerifier};
use crate::types::{PrState, PullRequestSummary, RepositoryInfo};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

pub struct GitHub {
    client: Octocrab,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub").finish_non_exhaustive()
    }
}

impl From<octocrab::Error> for WatchError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } if is_bad_credentials(source) => {
                WatchError::AuthenticationRejected(source.message.clone())
            }
            octocrab::Error::GitHub { source, .. } => WatchError::Api(format!(
                "{} (status {})",
                source.message, source.status_code
            )),
            octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => {
                WatchError::MalformedResponse(err.to_string())
            }
            _ => WatchError::Api(err.to_string()),
        }
    }
}

fn is_bad_credentials(source: &octocrab::GitHubError) -> bool {
    source.status_code.as_u16() == 401 || source.message.contains("Bad credentials")
}

impl GitHub {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_uri(token, DEFAULT_API_BASE)
    }

    pub fn with_base_uri(token: String, base_uri: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .base_uri(base_uri)
            .map_err(|e| WatchError::Api(format!("invalid API base {}: {}", base_uri, e)))?
            .build()
            .map_err(|e| WatchError::Api(e.to_string()))?;

        Ok(Self { client })
    }

    pub async fn current_user(&self) -> Result<String> {
        let user: ApiUser = self.client.get("/user", None::<&()>).await?;
        user.login
            .filter(|l| !l.is_empty())
            .ok_or_else(|| missing("user", "login"))
    }
}

// Response shapes. Every field is optional on the wire and checked once here.

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: Option<String>,
    owner: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    title: Option<String>,
    state: Option<PrState>,
    user: Option<ApiUser>,
    created_at: Option<DateTime<Utc>>,
    html_url: Option<String>,
}

fn missing(what: &str, field: &str) -> WatchError {
    WatchError::MalformedResponse(format!("{} is missing `{}`", what, field))
}

impl ApiRepository {
    fn validate(self, requested_owner: &str) -> Result<RepositoryInfo> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| missing("repository", "name"))?;
        let owner = self
            .owner
            .and_then(|o| o.login)
            .unwrap_or_else(|| requested_owner.to_string());
        Ok(RepositoryInfo { owner, name })
    }
}

impl ApiPullRequest {
    fn validate(self) -> Result<PullRequestSummary> {
        Ok(PullRequestSummary {
            title: self.title.ok_or_else(|| missing("pull request", "title"))?,
            state: self.state.ok_or_else(|| missing("pull request", "state"))?,
            author: self
                .user
                .and_then(|u| u.login)
                .ok_or_else(|| missing("pull request", "user.login"))?,
            created_at: self
                .created_at
                .ok_or_else(|| missing("pull request", "created_at"))?,
            html_url: self
                .html_url
                .ok_or_else(|| missing("pull request", "html_url"))?,
        })
    }
}

#[async_trait]
impl PullRequestSource for GitHub {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryInfo> {
        let route = format!("/repos/{}/{}", owner, name);
        let repo: ApiRepository = self.client.get(&route, None::<&()>).await?;
        repo.validate(owner)
    }

    async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestSummary>> {
        let route = format!("/repos/{}/{}/pulls", owner, repo);
        let params = [("state", "open"), ("per_page", "100")];
        let prs: Vec<ApiPullRequest> = self.client.get(&route, Some(&params)).await?;

        prs.into_iter().map(ApiPullRequest::validate).collect()
    }
}

/// Verifies a candidate token by asking the API who it belongs to.
pub struct GitHubVerifier {
    base_uri: String,
}

impl GitHubVerifier {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
        }
    }
}

impl Default for GitHubVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl TokenVerifier for GitHubVerifier {
    async fn verify(&self, token: &str) -> Result<String> {
        let github = GitHub::with_base_uri(token.to_string(), &self.base_uri)?;
        github.current_user().await
    }
}
