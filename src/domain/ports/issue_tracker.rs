use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{IssueDraft, IssueEdit, IssueQuery, IssueSnapshot, IssueState};

/// Issue operations against the workspace repository.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch one issue by number.
    async fn get_issue(&self, number: u64) -> DomainResult<IssueSnapshot>;

    /// List issues matching the query. Pull requests are never returned.
    async fn list_issues(&self, query: &IssueQuery) -> DomainResult<Vec<IssueSnapshot>>;

    /// Create an issue and return it as stored.
    async fn create_issue(&self, draft: &IssueDraft) -> DomainResult<IssueSnapshot>;

    /// Apply a partial edit and return the issue as stored.
    async fn edit_issue(&self, number: u64, edit: &IssueEdit) -> DomainResult<IssueSnapshot>;

    /// Post a comment on an issue.
    async fn post_comment(&self, number: u64, body: &str) -> DomainResult<()>;

    /// When `label` was most recently applied to the issue, if ever.
    async fn label_applied_at(
        &self,
        number: u64,
        label: &str,
    ) -> DomainResult<Option<DateTime<Utc>>>;

    /// Count open issues assigned to `login` that carry every label in `labels`.
    async fn count_open_assigned(&self, login: &str, labels: &[String]) -> DomainResult<usize> {
        let query = IssueQuery {
            labels: labels.to_vec(),
            assignee: Some(login.to_string()),
            state: IssueState::Open,
        };
        Ok(self.list_issues(&query).await?.len())
    }
}
