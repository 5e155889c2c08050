//! Upstream change records consumed by the synchronization engine.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a file changed in a merged pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Renamed,
    Removed,
    /// Any status the engine does not handle. Skipped with a warning.
    Unknown(String),
}

impl ChangeKind {
    /// Map a GitHub pull-request file status.
    pub fn from_status(status: &str) -> Self {
        match status {
            "added" => Self::Added,
            "modified" | "changed" => Self::Modified,
            "renamed" => Self::Renamed,
            "removed" => Self::Removed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Renamed => "renamed",
            Self::Removed => "removed",
            Self::Unknown(status) => status,
        }
    }
}

/// One file touched by a merged pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    pub path: String,
    pub kind: ChangeKind,
    /// Old path, present for renames.
    pub previous_path: Option<String>,
    /// Pull request the change came from.
    pub change_number: u64,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, kind: ChangeKind, change_number: u64) -> Self {
        Self {
            path: path.into(),
            kind,
            previous_path: None,
            change_number,
        }
    }

    pub fn renamed(
        from: impl Into<String>,
        to: impl Into<String>,
        change_number: u64,
    ) -> Self {
        Self {
            path: to.into(),
            kind: ChangeKind::Renamed,
            previous_path: Some(from.into()),
            change_number,
        }
    }
}

/// A merged pull request in the source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedChange {
    pub number: u64,
    /// Merge commit, used as the pointer revision.
    pub merge_sha: Option<String>,
    pub merged_at: DateTime<Utc>,
}
