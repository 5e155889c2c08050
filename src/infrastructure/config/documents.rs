//! Raw shapes of the rule documents, as written in `config.yaml`.
//!
//! Every document shares the envelope:
//!
//! ```yaml
//! api_version: v1
//! kind: IssueComment
//! metadata:
//!   name: accept
//! spec: { ... }
//! ```
//!
//! `spec` is decoded according to `kind`. These types only mirror the file;
//! [`super::loader`] validates them into domain models.

use serde::Deserialize;

use crate::domain::models::{ActorToken, Grouping, IssueState, Permission};

#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub api_version: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: serde_yaml::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
}

/// Document kinds the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Repository,
    IssueCreate,
    IssueComment,
    Job,
}

impl DocumentKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "Repository" => Some(Self::Repository),
            "IssueCreate" => Some(Self::IssueCreate),
            "IssueComment" => Some(Self::IssueComment),
            "Job" => Some(Self::Job),
            _ => None,
        }
    }
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_at() -> String {
    "08:00".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoDoc {
    pub owner: String,
    pub repository: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceDoc {
    pub owner: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub remove_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateDoc {
    pub owner: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub site: Option<String>,
    pub replace_from: String,
    pub replace_to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionDoc {
    #[serde(default)]
    pub enable: bool,
    /// `HH:MM`, local time.
    #[serde(default = "default_at")]
    pub at: String,
    #[serde(default)]
    pub pointer_issue: Option<u64>,
    #[serde(default)]
    pub needs_review_labels: Vec<String>,
}

impl Default for DetectionDoc {
    fn default() -> Self {
        Self {
            enable: false,
            at: default_at(),
            pointer_issue: None,
            needs_review_labels: Vec::new(),
        }
    }
}

/// `kind: Repository`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySpec {
    pub workspace: RepoDoc,
    pub source: SourceDoc,
    #[serde(default)]
    pub translate: Option<TranslateDoc>,
    #[serde(default)]
    pub maintainer_team: Option<String>,
    #[serde(default)]
    pub detection: DetectionDoc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncludeDoc {
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub suffixes: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<IncludeDoc>,
}

/// `kind: IssueCreate`
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCreateSpec {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub milestone: Option<u64>,
    #[serde(default)]
    pub grouping: Grouping,
    #[serde(default)]
    pub title_skip: usize,
    #[serde(default)]
    pub index_title: Option<String>,
    #[serde(default)]
    pub includes: Vec<IncludeDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRulesDoc {
    pub instruct: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<ActorToken>,
    #[serde(default)]
    pub permission_feedback: Option<String>,
    #[serde(default)]
    pub label_feedback: Option<String>,
    #[serde(default)]
    pub assignee_feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentActionDoc {
    #[serde(default)]
    pub add_labels: Vec<String>,
    #[serde(default)]
    pub add_labels_limit: Option<u32>,
    #[serde(default)]
    pub limit_feedback: Option<String>,
    #[serde(default)]
    pub remove_labels: Vec<String>,
    #[serde(default)]
    pub add_assignees: Vec<ActorToken>,
    #[serde(default)]
    pub remove_assignees: Vec<ActorToken>,
    #[serde(default)]
    pub state: Option<IssueState>,
    #[serde(default)]
    pub success_feedback: Option<String>,
}

/// `kind: IssueComment`
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentSpec {
    pub rules: CommentRulesDoc,
    #[serde(default)]
    pub action: CommentActionDoc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRulesDoc {
    pub labels: Vec<String>,
    pub in_days: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobActionDoc {
    #[serde(default)]
    pub add_labels: Vec<String>,
    #[serde(default)]
    pub remove_labels: Vec<String>,
    #[serde(default)]
    pub remove_assignees: Vec<ActorToken>,
    #[serde(default)]
    pub state: Option<IssueState>,
    #[serde(default)]
    pub reset_in_days: Option<u32>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// `kind: Job`
#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    pub rules: JobRulesDoc,
    #[serde(default)]
    pub action: JobActionDoc,
}
