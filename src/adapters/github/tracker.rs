//! [`IssueTracker`] backed by the GitHub issues API of the workspace repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;

use super::client::GitHubClient;
use super::models::{GitHubCommentRequest, GitHubIssue, GitHubIssueEvent, GitHubIssueRequest};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{IssueDraft, IssueEdit, IssueQuery, IssueSnapshot, RepoRef};
use crate::domain::ports::IssueTracker;

pub struct GitHubIssueTracker {
    client: GitHubClient,
    repo: RepoRef,
}

impl GitHubIssueTracker {
    pub fn new(client: GitHubClient, repo: RepoRef) -> Self {
        Self { client, repo }
    }

    fn issues_path(&self) -> String {
        format!("/repos/{}/{}/issues", self.repo.owner, self.repo.repository)
    }

    fn issue_path(&self, number: u64) -> String {
        format!("{}/{number}", self.issues_path())
    }
}

fn list_query(query: &IssueQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("state", query.state.as_str().to_string())];
    if !query.labels.is_empty() {
        params.push(("labels", query.labels.join(",")));
    }
    if let Some(assignee) = &query.assignee {
        params.push(("assignee", assignee.clone()));
    }
    params
}

#[async_trait]
impl IssueTracker for GitHubIssueTracker {
    async fn get_issue(&self, number: u64) -> DomainResult<IssueSnapshot> {
        let operation = format!("get issue #{number}");
        match self.client.get::<GitHubIssue>(&operation, &self.issue_path(number)).await {
            Ok(issue) => Ok(issue.into()),
            Err(e) if e.status() == Some(404) => Err(DomainError::IssueNotFound(number)),
            Err(e) => Err(e),
        }
    }

    async fn list_issues(&self, query: &IssueQuery) -> DomainResult<Vec<IssueSnapshot>> {
        let issues: Vec<GitHubIssue> = self
            .client
            .paginate("list issues", &self.issues_path(), &list_query(query))
            .await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .map(IssueSnapshot::from)
            .collect())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> DomainResult<IssueSnapshot> {
        let body = GitHubIssueRequest::from(draft);
        let created: GitHubIssue = self
            .client
            .send_json("create issue", Method::POST, &self.issues_path(), &body)
            .await?;
        tracing::debug!(issue = created.number, title = %created.title, "issue created");
        Ok(created.into())
    }

    async fn edit_issue(&self, number: u64, edit: &IssueEdit) -> DomainResult<IssueSnapshot> {
        let operation = format!("edit issue #{number}");
        let body = GitHubIssueRequest::from(edit);
        let edited: GitHubIssue = self
            .client
            .send_json(&operation, Method::PATCH, &self.issue_path(number), &body)
            .await?;
        Ok(edited.into())
    }

    async fn post_comment(&self, number: u64, body: &str) -> DomainResult<()> {
        let operation = format!("comment on issue #{number}");
        let path = format!("{}/comments", self.issue_path(number));
        let request = GitHubCommentRequest {
            body: body.to_string(),
        };
        self.client
            .send_discard(&operation, Method::POST, &path, &request)
            .await
    }

    async fn label_applied_at(
        &self,
        number: u64,
        label: &str,
    ) -> DomainResult<Option<DateTime<Utc>>> {
        let operation = format!("list events of issue #{number}");
        let path = format!("{}/events", self.issue_path(number));
        let events: Vec<GitHubIssueEvent> = self.client.paginate(&operation, &path, &[]).await?;
        Ok(events
            .into_iter()
            .filter(|e| e.event == "labeled")
            .filter(|e| e.label.as_ref().is_some_and(|l| l.name == label))
            .map(|e| e.created_at)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::IssueState;

    #[test]
    fn test_list_query_joins_labels() {
        let query = IssueQuery {
            labels: vec!["kind/page".into(), "status/pending".into()],
            assignee: Some("alice".into()),
            state: IssueState::Open,
        };
        assert_eq!(
            list_query(&query),
            vec![
                ("state", "open".to_string()),
                ("labels", "kind/page,status/pending".to_string()),
                ("assignee", "alice".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_query_without_filters() {
        let query = IssueQuery::default();
        assert_eq!(list_query(&query), vec![("state", "open".to_string())]);
    }
}
