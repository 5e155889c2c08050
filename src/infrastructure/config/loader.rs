use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::documents::{
    CommentActionDoc, DocumentKind, IncludeDoc, IssueCommentSpec, IssueCreateSpec, JobSpec,
    RawDocument, RepositorySpec,
};
use crate::domain::errors::DomainError;
use crate::domain::models::{
    Action, ActorToken, CapacityLimit, Conditions, Detection, Flow, IncludeRule, IncludeSet,
    IssueState, Job, JobAction, RepoRef, RepositorySettings, RuleBook, SourceRepo, TitlePolicy,
    TrackingSettings, TranslateRepo,
};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document {index} is not valid YAML: {source}")]
    Yaml {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {kind} document '{name}': {source}")]
    Document {
        kind: String,
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("A Repository document is required")]
    MissingRepository,

    #[error("Only one {0} document is allowed")]
    Duplicate(&'static str),

    #[error("Invalid instruction '{0}': must start with '/' and contain no whitespace")]
    InvalidInstruction(String),

    #[error("Instruction '{0}' is defined more than once")]
    DuplicateInstruction(String),

    #[error("Rule '{0}': all-assignees can only be removed, not added")]
    AllAssigneesAdded(String),

    #[error("Invalid detection time '{0}': expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Loads the multi-document rule file into a validated [`RuleBook`].
pub struct RuleLoader;

impl RuleLoader {
    /// Load rules from a file on disk.
    pub fn load_file(path: impl AsRef<Path>) -> Result<RuleBook, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::load_str(&text)?;
        tracing::info!(
            path = %path.display(),
            flows = rules.flows.len(),
            jobs = rules.jobs.len(),
            "rules loaded"
        );
        Ok(rules)
    }

    /// Load rules from YAML text holding one or more `---`-separated documents.
    pub fn load_str(text: &str) -> Result<RuleBook, ConfigError> {
        let mut repository: Option<RepositorySettings> = None;
        let mut tracking: Option<TrackingSettings> = None;
        let mut flows: BTreeMap<String, Flow> = BTreeMap::new();
        let mut jobs = Vec::new();

        for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|source| ConfigError::Yaml { index, source })?;
            if value.is_null() {
                continue;
            }
            let raw: RawDocument =
                serde_yaml::from_value(value).map_err(|source| ConfigError::Yaml { index, source })?;

            let Some(kind) = DocumentKind::parse(&raw.kind) else {
                tracing::warn!(kind = %raw.kind, name = %raw.metadata.name, "skipping document of unknown kind");
                continue;
            };
            match kind {
                DocumentKind::Repository => {
                    if repository.is_some() {
                        return Err(ConfigError::Duplicate("Repository"));
                    }
                    repository = Some(resolve_repository(decode(&raw)?)?);
                }
                DocumentKind::IssueCreate => {
                    if tracking.is_some() {
                        return Err(ConfigError::Duplicate("IssueCreate"));
                    }
                    tracking = Some(resolve_tracking(decode(&raw)?));
                }
                DocumentKind::IssueComment => {
                    let flow = resolve_flow(&raw.metadata.name, decode(&raw)?)?;
                    if flows.contains_key(&flow.instruct) {
                        return Err(ConfigError::DuplicateInstruction(flow.instruct));
                    }
                    flows.insert(flow.instruct.clone(), flow);
                }
                DocumentKind::Job => jobs.push(resolve_job(&raw.metadata.name, decode(&raw)?)?),
            }
        }

        let repository = repository.ok_or(ConfigError::MissingRepository)?;
        let detection = &repository.detection;
        if detection.enabled {
            if detection.pointer_issue.is_none() {
                return Err(ConfigError::ValidationFailed(
                    "detection.enable requires detection.pointer_issue".to_string(),
                ));
            }
            if tracking.is_none() {
                return Err(ConfigError::ValidationFailed(
                    "detection.enable requires an IssueCreate document".to_string(),
                ));
            }
        }

        Ok(RuleBook {
            repository,
            tracking,
            flows,
            jobs,
        })
    }
}

fn decode<T: DeserializeOwned>(raw: &RawDocument) -> Result<T, ConfigError> {
    serde_yaml::from_value(raw.spec.clone()).map_err(|source| ConfigError::Document {
        kind: raw.kind.clone(),
        name: raw.metadata.name.clone(),
        source,
    })
}

fn parse_at(at: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(at.trim(), "%H:%M").map_err(|_| ConfigError::InvalidTime(at.to_string()))
}

fn resolve_repository(spec: RepositorySpec) -> Result<RepositorySettings, ConfigError> {
    let detection = Detection {
        enabled: spec.detection.enable,
        at: parse_at(&spec.detection.at)?,
        pointer_issue: spec.detection.pointer_issue,
        needs_review_labels: spec.detection.needs_review_labels,
    };
    Ok(RepositorySettings {
        workspace: RepoRef::new(spec.workspace.owner, spec.workspace.repository),
        source: SourceRepo {
            repo: RepoRef::new(spec.source.owner, spec.source.repository),
            branch: spec.source.branch,
            site: spec.source.site,
            remove_prefix: spec.source.remove_prefix,
        },
        translate: spec.translate.map(|t| TranslateRepo {
            repo: RepoRef::new(t.owner, t.repository),
            branch: t.branch,
            site: t.site,
            replace_from: t.replace_from,
            replace_to: t.replace_to,
        }),
        maintainer_team: spec.maintainer_team.filter(|t| !t.is_empty()),
        detection,
    })
}

fn resolve_include(doc: IncludeDoc) -> IncludeRule {
    IncludeRule {
        path: doc.path,
        title: doc.title,
        labels: doc.labels,
        suffixes: doc.suffixes,
        excludes: doc.exclude.into_iter().map(resolve_include).collect(),
    }
}

fn resolve_tracking(spec: IssueCreateSpec) -> TrackingSettings {
    TrackingSettings {
        labels: spec.labels,
        assignees: spec.assignees,
        milestone: spec.milestone,
        includes: IncludeSet {
            rules: spec.includes.into_iter().map(resolve_include).collect(),
            policy: TitlePolicy {
                grouping: spec.grouping,
                skip: spec.title_skip,
                index_title: spec.index_title,
            },
        },
    }
}

fn resolve_action(name: &str, doc: CommentActionDoc) -> Result<Action, ConfigError> {
    if doc.add_assignees.contains(&ActorToken::AllAssignees) {
        return Err(ConfigError::AllAssigneesAdded(name.to_string()));
    }
    let capacity = doc
        .add_labels_limit
        .filter(|limit| *limit > 0)
        .map(|limit| CapacityLimit {
            limit,
            feedback: doc.limit_feedback.clone(),
        });
    Ok(Action {
        add_labels: doc.add_labels,
        capacity,
        remove_labels: doc.remove_labels,
        add_assignees: doc.add_assignees,
        remove_assignees: doc.remove_assignees,
        state: doc.state.unwrap_or(IssueState::Open),
        success_feedback: doc.success_feedback,
    })
}

fn resolve_flow(name: &str, spec: IssueCommentSpec) -> Result<Flow, ConfigError> {
    let instruct = spec.rules.instruct.trim().to_string();
    if !instruct.starts_with('/') || instruct.len() < 2 || instruct.contains(char::is_whitespace)
    {
        return Err(ConfigError::InvalidInstruction(instruct));
    }
    if spec.rules.permissions.is_empty() {
        tracing::warn!(instruction = %instruct, "no permissions configured, instruction is always rejected");
    }
    Ok(Flow {
        name: name.to_string(),
        conditions: Conditions {
            permissions: spec.rules.permissions,
            labels: spec.rules.labels,
            assignees: spec.rules.assignees,
            permission_feedback: spec.rules.permission_feedback,
            label_feedback: spec.rules.label_feedback,
            assignee_feedback: spec.rules.assignee_feedback,
        },
        action: resolve_action(name, spec.action)?,
        instruct,
    })
}

fn resolve_job(name: &str, spec: JobSpec) -> Result<Job, ConfigError> {
    if spec.rules.labels.is_empty() {
        return Err(ConfigError::ValidationFailed(format!(
            "job '{name}' must watch at least one label"
        )));
    }
    Ok(Job {
        name: name.to_string(),
        labels: spec.rules.labels,
        in_days: spec.rules.in_days,
        action: JobAction {
            add_labels: spec.action.add_labels,
            remove_labels: spec.action.remove_labels,
            remove_assignees: spec.action.remove_assignees,
            state: spec.action.state,
            reset_in_days: spec.action.reset_in_days,
            feedback: spec.action.feedback,
        },
    })
}
