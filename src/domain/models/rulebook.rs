//! The validated rule set the engines run against.

use std::collections::BTreeMap;

use serde::Serialize;

use super::include::IncludeSet;
use super::job::Job;
use super::repository::RepositorySettings;
use super::rule::Flow;
use super::tracked::BodyLayout;

/// Settings from the `IssueCreate` document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TrackingSettings {
    /// Applied to every created issue and used to find tracking issues.
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
    pub includes: IncludeSet,
}

/// Every configuration document, resolved into typed objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleBook {
    pub repository: RepositorySettings,
    pub tracking: Option<TrackingSettings>,
    /// Keyed by instruction literal, e.g. `/accept`.
    pub flows: BTreeMap<String, Flow>,
    pub jobs: Vec<Job>,
}

impl RuleBook {
    pub fn flow(&self, instruct: &str) -> Option<&Flow> {
        self.flows.get(instruct)
    }

    pub fn layout(&self) -> BodyLayout {
        BodyLayout::new(
            self.repository.source.clone(),
            self.repository.translate.clone(),
        )
    }
}
