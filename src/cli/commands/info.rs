//! `issue-shepherd info`: print the loaded rule table.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{join_or_dash, list_table, output, truncate, CommandOutput};
use crate::cli::types::GlobalArgs;
use crate::domain::models::{IncludeRule, RuleBook};

#[derive(Debug, Serialize)]
pub struct FlowRow {
    pub instruct: String,
    pub permissions: Vec<String>,
    pub requires_labels: Vec<String>,
    pub add_labels: Vec<String>,
    pub remove_labels: Vec<String>,
    pub limit: Option<u32>,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct IncludeRow {
    pub path: String,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub suffixes: Vec<String>,
    pub excludes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JobRow {
    pub name: String,
    pub labels: Vec<String>,
    pub in_days: u32,
    pub add_labels: Vec<String>,
    pub remove_labels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoOutput {
    pub workspace: String,
    pub source: String,
    pub branch: String,
    pub maintainer_team: Option<String>,
    pub detection: bool,
    pub detection_at: String,
    pub pointer_issue: Option<u64>,
    pub flows: Vec<FlowRow>,
    pub includes: Vec<IncludeRow>,
    pub jobs: Vec<JobRow>,
}

/// Direct exclusions only; nested re-inclusions are left to the rule file.
fn exclude_paths(rule: &IncludeRule) -> Vec<String> {
    rule.excludes.iter().map(|e| e.path.clone()).collect()
}

impl From<&RuleBook> for InfoOutput {
    fn from(rules: &RuleBook) -> Self {
        let repository = &rules.repository;
        Self {
            workspace: repository.workspace.full_name(),
            source: repository.source.repo.full_name(),
            branch: repository.source.branch.clone(),
            maintainer_team: repository.maintainer_team.clone(),
            detection: repository.detection.enabled,
            detection_at: repository.detection.at.format("%H:%M").to_string(),
            pointer_issue: repository.detection.pointer_issue,
            flows: rules
                .flows
                .values()
                .map(|flow| FlowRow {
                    instruct: flow.instruct.clone(),
                    permissions: flow
                        .conditions
                        .permissions
                        .iter()
                        .map(|p| p.as_str().to_string())
                        .collect(),
                    requires_labels: flow.conditions.labels.clone(),
                    add_labels: flow.action.add_labels.clone(),
                    remove_labels: flow.action.remove_labels.clone(),
                    limit: flow.action.capacity.as_ref().map(|c| c.limit),
                    state: flow.action.state.as_str().to_string(),
                })
                .collect(),
            includes: rules
                .tracking
                .iter()
                .flat_map(|t| t.includes.rules.iter())
                .map(|rule| IncludeRow {
                    path: rule.path.clone(),
                    title: rule.title.clone(),
                    labels: rule.labels.clone(),
                    suffixes: rule.suffixes.clone(),
                    excludes: exclude_paths(rule),
                })
                .collect(),
            jobs: rules
                .jobs
                .iter()
                .map(|job| JobRow {
                    name: job.name.clone(),
                    labels: job.labels.clone(),
                    in_days: job.in_days,
                    add_labels: job.action.add_labels.clone(),
                    remove_labels: job.action.remove_labels.clone(),
                })
                .collect(),
        }
    }
}

impl CommandOutput for InfoOutput {
    fn to_human(&self) -> String {
        let mut sections = vec![format!(
            "Workspace: {}\nSource:    {} ({})\nMaintainers: {}\nDetection: {}",
            self.workspace,
            self.source,
            self.branch,
            self.maintainer_team.as_deref().unwrap_or("-"),
            if self.detection {
                format!(
                    "daily at {}, pointer #{}",
                    self.detection_at,
                    self.pointer_issue.unwrap_or_default()
                )
            } else {
                "disabled".to_string()
            }
        )];

        let mut flows = list_table(&["instruction", "permissions", "requires", "adds", "removes", "limit", "state"]);
        for flow in &self.flows {
            flows.add_row(vec![
                flow.instruct.clone(),
                join_or_dash(&flow.permissions),
                join_or_dash(&flow.requires_labels),
                join_or_dash(&flow.add_labels),
                join_or_dash(&flow.remove_labels),
                flow.limit.map_or_else(|| "-".to_string(), |l| l.to_string()),
                flow.state.clone(),
            ]);
        }
        sections.push(format!("\nInstructions ({}):\n{flows}", self.flows.len()));

        let mut includes = list_table(&["path", "title", "labels", "suffixes", "excludes"]);
        for include in &self.includes {
            includes.add_row(vec![
                include.path.clone(),
                include.title.as_deref().map_or_else(|| "-".to_string(), |t| truncate(t, 40)),
                join_or_dash(&include.labels),
                join_or_dash(&include.suffixes),
                join_or_dash(&include.excludes),
            ]);
        }
        sections.push(format!("\nIncludes ({}):\n{includes}", self.includes.len()));

        let mut jobs = list_table(&["job", "watches", "after days", "adds", "removes"]);
        for job in &self.jobs {
            jobs.add_row(vec![
                job.name.clone(),
                join_or_dash(&job.labels),
                job.in_days.to_string(),
                join_or_dash(&job.add_labels),
                join_or_dash(&job.remove_labels),
            ]);
        }
        sections.push(format!("\nJobs ({}):\n{jobs}", self.jobs.len()));

        sections.join("\n")
    }
}

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let rules = super::load_rules(global)?;
    output(&InfoOutput::from(&rules), global.json);
    Ok(())
}
