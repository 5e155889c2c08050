//! [`UpstreamSource`] backed by the pull requests and git trees of the source repository.

use async_trait::async_trait;

use super::client::GitHubClient;
use super::models::{GitHubPullFile, GitHubPullRequest, GitHubTree};
use crate::domain::errors::DomainResult;
use crate::domain::models::{ChangedFile, MergedChange, RepoRef};
use crate::domain::ports::UpstreamSource;

/// Pages of closed pull requests followed while looking for the pointer.
const MAX_HISTORY_PAGES: u32 = 30;

pub struct GitHubUpstream {
    client: GitHubClient,
    repo: RepoRef,
    branch: String,
}

impl GitHubUpstream {
    pub fn new(client: GitHubClient, repo: RepoRef, branch: impl Into<String>) -> Self {
        Self {
            client,
            repo,
            branch: branch.into(),
        }
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.repo.owner, self.repo.repository)
    }

    fn closed_query(&self, sort: &str) -> Vec<(&'static str, String)> {
        vec![
            ("state", "closed".to_string()),
            ("base", self.branch.clone()),
            ("sort", sort.to_string()),
            ("direction", "desc".to_string()),
        ]
    }
}

/// Oldest merge first; pull request number breaks ties.
fn merge_order(mut changes: Vec<MergedChange>) -> Vec<MergedChange> {
    changes.sort_by(|a, b| a.merged_at.cmp(&b.merged_at).then(a.number.cmp(&b.number)));
    changes
}

#[async_trait]
impl UpstreamSource for GitHubUpstream {
    async fn merged_since(&self, after: u64) -> DomainResult<Vec<MergedChange>> {
        let path = format!("{}/pulls", self.repo_path());
        let query = self.closed_query("created");
        let mut window = Vec::new();

        // Newest created first: everything past the pointer sits on the leading pages.
        'pages: for page in 1..=MAX_HISTORY_PAGES {
            let batch: Vec<GitHubPullRequest> = self
                .client
                .get_page("list closed pull requests", &path, &query, page)
                .await?;
            let short = batch.len() < GitHubClient::per_page();
            for pull in batch {
                if pull.number <= after {
                    break 'pages;
                }
                window.extend(pull.into_merged());
            }
            if short {
                break;
            }
        }

        tracing::debug!(after, merged = window.len(), "merged pull requests since pointer");
        Ok(merge_order(window))
    }

    async fn latest_merged(&self) -> DomainResult<Option<MergedChange>> {
        let path = format!("{}/pulls", self.repo_path());
        let batch: Vec<GitHubPullRequest> = self
            .client
            .get_page("list closed pull requests", &path, &self.closed_query("updated"), 1)
            .await?;
        Ok(merge_order(batch.into_iter().filter_map(GitHubPullRequest::into_merged).collect())
            .pop())
    }

    async fn changed_files(&self, number: u64) -> DomainResult<Vec<ChangedFile>> {
        let operation = format!("list files of pull request #{number}");
        let path = format!("{}/pulls/{number}/files", self.repo_path());
        let files: Vec<GitHubPullFile> = self.client.paginate(&operation, &path, &[]).await?;
        Ok(files.into_iter().map(|f| f.into_changed(number)).collect())
    }

    async fn tree_paths(&self, revision: &str) -> DomainResult<Vec<String>> {
        let operation = format!("get tree {revision}");
        let path = format!("{}/git/trees/{revision}", self.repo_path());
        let tree: GitHubTree = self
            .client
            .get_query(&operation, &path, &[("recursive", "1".to_string())])
            .await?;
        if tree.truncated {
            tracing::warn!(revision, entries = tree.tree.len(), "upstream tree listing is truncated");
        }
        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path)
            .collect())
    }
}
