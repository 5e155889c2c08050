//! Repository selectors and global bot settings from the `Repository` document.

use chrono::NaiveTime;
use serde::Serialize;

/// `owner/repository` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub repository: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }

    /// Case-insensitive comparison against a `owner/name` string from a payload.
    pub fn matches_full_name(&self, full_name: &str) -> bool {
        self.full_name().eq_ignore_ascii_case(full_name)
    }

    pub fn tree_url(&self, reference: &str) -> String {
        format!(
            "https://github.com/{}/{}/tree/{reference}",
            self.owner, self.repository
        )
    }

    pub fn pull_url(&self, number: u64) -> String {
        format!(
            "https://github.com/{}/{}/pull/{number}",
            self.owner, self.repository
        )
    }
}

/// Upstream repository whose merged changes are mirrored into tracking issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRepo {
    pub repo: RepoRef,
    pub branch: String,
    /// Published site root, used to link a rendered page from the issue body.
    pub site: Option<String>,
    /// Path prefix stripped before building site URLs.
    pub remove_prefix: Option<String>,
}

/// Repository the tracked work lands in, mirrored into a second body section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslateRepo {
    pub repo: RepoRef,
    pub branch: String,
    pub site: Option<String>,
    pub replace_from: String,
    pub replace_to: String,
}

/// Daily detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub enabled: bool,
    /// Local wall-clock time of the daily pass.
    pub at: NaiveTime,
    /// Sentinel issue whose body stores the sync pointer.
    pub pointer_issue: Option<u64>,
    /// Labels attached when an issue's tracked-file list becomes empty.
    pub needs_review_labels: Vec<String>,
}

/// Global settings from the `Repository` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySettings {
    pub workspace: RepoRef,
    pub source: SourceRepo,
    pub translate: Option<TranslateRepo>,
    /// Team slug inside the workspace owner's organization.
    pub maintainer_team: Option<String>,
    pub detection: Detection,
}
