use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PullRequestSummary, RepositoryInfo};

/// The two remote reads the aggregator needs.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryInfo>;

    /// Open pull requests only; `repo` is the canonical name from `get_repository`.
    async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestSummary>>;
}

/// Identity check run once against a freshly entered token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Returns the login the token authenticates as.
    async fn verify(&self, token: &str) -> Result<String>;
}
