//! Issue snapshots and the mutation requests sent to the issue tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl IssueState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Point-in-time view of a workspace issue.
///
/// The title is the natural key used to match tracked files to issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueSnapshot {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
    pub state: IssueState,
    pub updated_at: Option<DateTime<Utc>>,
}

impl IssueSnapshot {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn has_labels<S: AsRef<str>>(&self, labels: &[S]) -> bool {
        labels.iter().all(|l| self.has_label(l.as_ref()))
    }

    pub fn is_assigned(&self, login: &str) -> bool {
        self.assignees.iter().any(|a| a.eq_ignore_ascii_case(login))
    }
}

/// A new issue to create.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
}

/// Partial edit of an existing issue. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IssueEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub state: Option<IssueState>,
}

impl IssueEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.labels.is_none()
            && self.assignees.is_none()
            && self.state.is_none()
    }
}

/// Filter for listing issues.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssueQuery {
    /// Every label must be present.
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    pub state: IssueState,
}

impl IssueQuery {
    pub fn open_with_labels(labels: &[String]) -> Self {
        Self {
            labels: labels.to_vec(),
            assignee: None,
            state: IssueState::Open,
        }
    }
}
