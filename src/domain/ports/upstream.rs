use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ChangedFile, MergedChange};

/// Read access to the source repository's merge history.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Merged pull requests with a number strictly greater than `after`,
    /// oldest merge first.
    async fn merged_since(&self, after: u64) -> DomainResult<Vec<MergedChange>>;

    /// The most recently merged pull request, if any.
    async fn latest_merged(&self) -> DomainResult<Option<MergedChange>>;

    /// Files touched by one pull request, tagged with its number.
    async fn changed_files(&self, number: u64) -> DomainResult<Vec<ChangedFile>>;

    /// Every blob path in the tree at `revision`.
    async fn tree_paths(&self, revision: &str) -> DomainResult<Vec<String>>;
}
