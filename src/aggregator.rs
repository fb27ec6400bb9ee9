use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::RepoMap;
use crate::error::Result;
use crate::forge::PullRequestSource;
use crate::types::PullRequestRecord;

/// tokio channels need room for at least one message; with a single slot the
/// producer waits on every send until the UI loop has taken the previous record.
const STREAM_CAPACITY: usize = 1;

pub struct PullRequestStream {
    pub records: mpsc::Receiver<PullRequestRecord>,
    /// Resolves to the number of records emitted, or the first remote error.
    pub producer: JoinHandle<Result<usize>>,
}

/// Spawns the producer that walks the configured repositories and hands each
/// open pull request to the UI loop as soon as it is known.
pub fn stream_pull_requests(
    repos: RepoMap,
    source: Arc<dyn PullRequestSource>,
) -> PullRequestStream {
    let (tx, records) = mpsc::channel(STREAM_CAPACITY);
    let producer = tokio::spawn(async move { produce(&repos, source.as_ref(), &tx).await });
    PullRequestStream { records, producer }
}

/// Emits records in (owner, repository, pull request) order. The first remote
/// error stops the walk; records already sent stay sent.
pub async fn produce(
    repos: &RepoMap,
    source: &dyn PullRequestSource,
    tx: &mpsc::Sender<PullRequestRecord>,
) -> Result<usize> {
    let mut emitted = 0;

    for (owner, names) in repos {
        for name in names {
            debug!(owner = %owner, repo = %name, "fetching open pull requests");

            let repo = source.get_repository(owner, name).await.inspect_err(|e| {
                debug!(owner = %owner, repo = %name, error = %e, "repository lookup failed");
            })?;
            let prs = source.list_open_pull_requests(owner, &repo.name).await?;
            debug!(owner = %repo.owner, repo = %repo.name, count = prs.len(), "listed");

            for pr in prs {
                if tx.send(PullRequestRecord::new(&repo, pr)).await.is_err() {
                    debug!("record stream closed by the consumer");
                    return Ok(emitted);
                }
                emitted += 1;
            }
        }
    }

    debug!(emitted, "finished walking repositories");
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::error::WatchError;
    use crate::types::{PrState, PullRequestSummary, RepositoryInfo};

    enum Reply {
        Repo(&'static str, Vec<PullRequestSummary>),
        BadCredentials,
        NotFound,
    }

    #[derive(Default)]
    struct FakeSource {
        replies: HashMap<(String, String), Reply>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, owner: &str, name: &str, reply: Reply) -> Self {
            self.replies
                .insert((owner.to_string(), name.to_string()), reply);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn canonical(&self, owner: &str, canonical: &str) -> Option<&Vec<PullRequestSummary>> {
            self.replies.iter().find_map(|((o, _), reply)| match reply {
                Reply::Repo(name, prs) if o == owner && *name == canonical => Some(prs),
                _ => None,
            })
        }
    }

    #[async_trait]
    impl PullRequestSource for FakeSource {
        async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryInfo> {
            self.calls.lock().unwrap().push(format!("get {}/{}", owner, name));
            match self.replies.get(&(owner.to_string(), name.to_string())) {
                Some(Reply::Repo(canonical, _)) => Ok(RepositoryInfo {
                    owner: owner.to_string(),
                    name: canonical.to_string(),
                }),
                Some(Reply::BadCredentials) => {
                    Err(WatchError::AuthenticationRejected("Bad credentials".into()))
                }
                Some(Reply::NotFound) | None => Err(WatchError::Api("Not Found".into())),
            }
        }

        async fn list_open_pull_requests(
            &self,
            owner: &str,
            repo: &str,
        ) -> Result<Vec<PullRequestSummary>> {
            self.calls.lock().unwrap().push(format!("list {}/{}", owner, repo));
            Ok(self.canonical(owner, repo).cloned().unwrap_or_default())
        }
    }

    fn pr(title: &str, author: &str, url: &str) -> PullRequestSummary {
        PullRequestSummary {
            title: title.to_string(),
            state: PrState::Open,
            author: author.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            html_url: url.to_string(),
        }
    }

    fn repos(entries: &[(&str, &[&str])]) -> RepoMap {
        entries
            .iter()
            .map(|(owner, names)| {
                (
                    owner.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect()
    }

    async fn drain(
        mut stream: PullRequestStream,
    ) -> (Vec<PullRequestRecord>, Result<usize>) {
        let mut received = Vec::new();
        while let Some(record) = stream.records.recv().await {
            received.push(record);
        }
        (received, stream.producer.await.unwrap())
    }

    #[tokio::test]
    async fn single_repo_yields_one_record() {
        let source = FakeSource::default().with(
            "alice",
            "repo1",
            Reply::Repo("repo1", vec![pr("Fix bug", "bob", "https://x/1")]),
        );

        let stream = stream_pull_requests(repos(&[("alice", &["repo1"])]), Arc::new(source));
        let (records, result) = drain(stream).await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Fix bug");
        assert_eq!(records[0].state, PrState::Open);
        assert_eq!(records[0].repo_name, "repo1");
        assert_eq!(records[0].author_login, "bob");
        assert_eq!(records[0].html_url, "https://x/1");
    }

    #[tokio::test]
    async fn emits_every_record_in_traversal_order() {
        let source = FakeSource::default()
            .with(
                "bob",
                "tools",
                Reply::Repo("tools", vec![pr("b1", "x", "u/b1")]),
            )
            .with(
                "alice",
                "zeta",
                Reply::Repo("zeta", vec![pr("z1", "x", "u/z1"), pr("z2", "y", "u/z2")]),
            )
            .with("alice", "alpha", Reply::Repo("alpha", vec![]))
            .with(
                "alice",
                "mid",
                Reply::Repo("mid", vec![pr("m1", "z", "u/m1")]),
            );
        let config = repos(&[("bob", &["tools"]), ("alice", &["zeta", "alpha", "mid"])]);

        let (records, result) = drain(stream_pull_requests(config, Arc::new(source))).await;

        assert_eq!(result.unwrap(), 4);
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["z1", "z2", "m1", "b1"]);
        let repos: Vec<&str> = records.iter().map(|r| r.repo_name.as_str()).collect();
        assert_eq!(repos, vec!["zeta", "zeta", "mid", "tools"]);
    }

    #[tokio::test]
    async fn lists_under_canonical_name() {
        let source = Arc::new(FakeSource::default().with(
            "alice",
            "REPO1",
            Reply::Repo("repo1", vec![pr("Fix bug", "bob", "https://x/1")]),
        ));

        let (records, _) = drain(stream_pull_requests(
            repos(&[("alice", &["REPO1"])]),
            source.clone(),
        ))
        .await;

        assert_eq!(records[0].repo_name, "repo1");
        assert_eq!(source.calls(), vec!["get alice/REPO1", "list alice/repo1"]);
    }

    #[tokio::test]
    async fn duplicate_entries_produce_duplicate_records() {
        let source = FakeSource::default().with(
            "alice",
            "repo1",
            Reply::Repo("repo1", vec![pr("Fix bug", "bob", "https://x/1")]),
        );

        let (records, result) = drain(stream_pull_requests(
            repos(&[("alice", &["repo1", "repo1"])]),
            Arc::new(source),
        ))
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[tokio::test]
    async fn bad_credentials_abort_before_any_record() {
        let source = FakeSource::default().with("alice", "repo1", Reply::BadCredentials);

        let (records, result) = drain(stream_pull_requests(
            repos(&[("alice", &["repo1"])]),
            Arc::new(source),
        ))
        .await;

        assert!(records.is_empty());
        assert!(result.unwrap_err().is_bad_credentials());
    }

    #[tokio::test]
    async fn first_failure_stops_the_walk() {
        let source = Arc::new(
            FakeSource::default()
                .with(
                    "alice",
                    "one",
                    Reply::Repo("one", vec![pr("first", "bob", "u/1")]),
                )
                .with("alice", "two", Reply::NotFound)
                .with(
                    "alice",
                    "three",
                    Reply::Repo("three", vec![pr("never", "bob", "u/3")]),
                ),
        );

        let (records, result) = drain(stream_pull_requests(
            repos(&[("alice", &["one", "two", "three"])]),
            source.clone(),
        ))
        .await;

        assert_eq!(records.len(), 1);
        assert!(matches!(result, Err(WatchError::Api(_))));
        assert!(!source.calls().iter().any(|c| c.contains("three")));
    }

    #[tokio::test]
    async fn producer_waits_for_consumer() {
        let source = FakeSource::default().with(
            "alice",
            "repo1",
            Reply::Repo(
                "repo1",
                vec![pr("a", "x", "u/a"), pr("b", "x", "u/b"), pr("c", "x", "u/c")],
            ),
        );
        let stream =
            stream_pull_requests(repos(&[("alice", &["repo1"])]), Arc::new(source));

        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!stream.producer.is_finished());

        let (records, result) = drain(stream).await;
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(result.unwrap(), 3);
    }
}
