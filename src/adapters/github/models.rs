//! GitHub REST API request and response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads. They stay
//! inside the adapter; the rest of the crate sees domain types only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{
    ChangeKind, ChangedFile, IssueDraft, IssueEdit, IssueSnapshot, IssueState, MergedChange,
};

/// An issue returned by the GitHub API.
///
/// Issues and pull requests share the endpoint. Pull requests carry a
/// non-null `pull_request` field and are dropped by the adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// "open" or "closed".
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub assignees: Vec<GitHubUser>,
    #[serde(default)]
    pub milestone: Option<GitHubMilestone>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GitHubIssue {
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<GitHubIssue> for IssueSnapshot {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|u| u.login).collect(),
            milestone: issue.milestone.map(|m| m.number),
            state: IssueState::from_str(&issue.state).unwrap_or_default(),
            updated_at: issue.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    /// "User", "Organization" or "Bot".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubMilestone {
    pub number: u64,
}

/// Body for creating an issue or editing one. Absent fields are left as is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GitHubIssueRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl From<&IssueDraft> for GitHubIssueRequest {
    fn from(draft: &IssueDraft) -> Self {
        Self {
            title: Some(draft.title.clone()),
            body: Some(draft.body.clone()),
            labels: Some(draft.labels.clone()),
            assignees: (!draft.assignees.is_empty()).then(|| draft.assignees.clone()),
            milestone: draft.milestone,
            state: None,
        }
    }
}

impl From<&IssueEdit> for GitHubIssueRequest {
    fn from(edit: &IssueEdit) -> Self {
        Self {
            title: edit.title.clone(),
            body: edit.body.clone(),
            labels: edit.labels.clone(),
            assignees: edit.assignees.clone(),
            milestone: None,
            state: edit.state.map(|s| s.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GitHubCommentRequest {
    pub body: String,
}

/// Entry of `GET /repos/{owner}/{repo}/issues/{n}/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssueEvent {
    pub event: String,
    #[serde(default)]
    pub label: Option<GitHubLabel>,
    pub created_at: DateTime<Utc>,
}

/// Entry of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullRequest {
    pub number: u64,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
}

impl GitHubPullRequest {
    /// `None` for pull requests closed without merging.
    pub fn into_merged(self) -> Option<MergedChange> {
        let merged_at = self.merged_at?;
        Some(MergedChange {
            number: self.number,
            merge_sha: self.merge_commit_sha,
            merged_at,
        })
    }
}

/// Entry of `GET /repos/{owner}/{repo}/pulls/{n}/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub previous_filename: Option<String>,
}

impl GitHubPullFile {
    pub fn into_changed(self, change_number: u64) -> ChangedFile {
        ChangedFile {
            kind: ChangeKind::from_status(&self.status),
            path: self.filename,
            previous_path: self.previous_filename,
            change_number,
        }
    }
}

/// Response of `GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=1`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubTree {
    pub tree: Vec<GitHubTreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubTreeEntry {
    pub path: String,
    /// "blob", "tree" or "commit".
    #[serde(rename = "type")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_deserialization_into_snapshot() {
        let json = r#"{
            "id": 1,
            "number": 42,
            "title": "docs/setup",
            "body": null,
            "state": "open",
            "labels": [{"id": 1, "name": "kind/page", "color": "fff"}],
            "assignees": [{"login": "alice", "type": "User"}],
            "milestone": {"number": 3, "title": "v1"},
            "updated_at": "2026-01-15T10:00:00Z",
            "html_url": "https://github.com/o/r/issues/42"
        }"#;

        let issue: GitHubIssue = serde_json::from_str(json).unwrap();
        assert!(!issue.is_pull_request());
        let snapshot = IssueSnapshot::from(issue);
        assert_eq!(snapshot.number, 42);
        assert_eq!(snapshot.body, "");
        assert_eq!(snapshot.labels, vec!["kind/page"]);
        assert_eq!(snapshot.assignees, vec!["alice"]);
        assert_eq!(snapshot.milestone, Some(3));
        assert_eq!(snapshot.state, IssueState::Open);
        assert!(snapshot.updated_at.is_some());
    }

    #[test]
    fn test_pull_request_items_are_flagged() {
        let json = r#"{
            "number": 7,
            "title": "Fix typo",
            "state": "closed",
            "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/7"}
        }"#;
        let issue: GitHubIssue = serde_json::from_str(json).unwrap();
        assert!(issue.is_pull_request());
    }

    #[test]
    fn test_edit_request_skips_untouched_fields() {
        let edit = IssueEdit {
            labels: Some(vec!["a".into()]),
            state: Some(IssueState::Closed),
            ..Default::default()
        };
        let json = serde_json::to_value(GitHubIssueRequest::from(&edit)).unwrap();
        assert_eq!(json, serde_json::json!({"labels": ["a"], "state": "closed"}));
    }

    #[test]
    fn test_unmerged_pull_request_is_dropped() {
        let json = r#"[
            {"number": 5, "merged_at": null, "merge_commit_sha": "abc"},
            {"number": 6, "merged_at": "2026-02-01T00:00:00Z", "merge_commit_sha": "def"}
        ]"#;
        let pulls: Vec<GitHubPullRequest> = serde_json::from_str(json).unwrap();
        let merged: Vec<MergedChange> = pulls.into_iter().filter_map(GitHubPullRequest::into_merged).collect();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].number, 6);
        assert_eq!(merged[0].merge_sha.as_deref(), Some("def"));
    }

    #[test]
    fn test_pull_file_into_changed() {
        let json = r#"{"filename": "docs/b.md", "status": "renamed", "previous_filename": "docs/a.md"}"#;
        let file: GitHubPullFile = serde_json::from_str(json).unwrap();
        let changed = file.into_changed(11);
        assert_eq!(changed, ChangedFile::renamed("docs/a.md", "docs/b.md", 11));
    }
}
