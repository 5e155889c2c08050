//! Bootstraps tracking issues from the upstream tree, and tears them down.

use std::sync::Arc;

use serde::Serialize;

use super::dispatcher::{DispatchSummary, MutationDispatcher};
use super::sync_engine::{pointer_issue, tracked_issues, tracking, write_pointer};
use super::sync_planner::SyncPlanner;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ChangeKind, ChangedFile, IssueQuery, RuleBook, SyncMutation, SyncPointer,
};
use crate::domain::ports::{IssueTracker, UpstreamSource};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Paths in the upstream tree.
    pub paths: usize,
    /// Paths matching an include rule.
    pub tracked: usize,
    pub unchanged: usize,
    pub dispatched: DispatchSummary,
    pub pointer: Option<SyncPointer>,
}

/// Creates or completes tracking issues for every tracked file upstream.
pub struct Initializer {
    rules: Arc<RuleBook>,
    tracker: Arc<dyn IssueTracker>,
    upstream: Arc<dyn UpstreamSource>,
    dispatcher: Arc<MutationDispatcher>,
}

impl Initializer {
    pub fn new(
        rules: Arc<RuleBook>,
        tracker: Arc<dyn IssueTracker>,
        upstream: Arc<dyn UpstreamSource>,
        dispatcher: Arc<MutationDispatcher>,
    ) -> Self {
        Self {
            rules,
            tracker,
            upstream,
            dispatcher,
        }
    }

    /// Seed issues from the tree at the latest merged pull request.
    ///
    /// Every matching path is planned as an addition, so existing issues only
    /// gain missing paths. The pointer, when configured, moves to that pull
    /// request so the next sync pass starts after it.
    pub async fn initialize(&self) -> DomainResult<InitReport> {
        let tracking = tracking(&self.rules)?;
        let source = &self.rules.repository.source;

        let latest = self.upstream.latest_merged().await?.ok_or_else(|| {
            DomainError::ValidationFailed(format!(
                "{} has no merged pull requests",
                source.repo.full_name()
            ))
        })?;
        let revision = latest
            .merge_sha
            .clone()
            .unwrap_or_else(|| source.branch.clone());
        tracing::info!(pr = latest.number, revision = %revision, "initializing from upstream tree");

        let paths = self.upstream.tree_paths(&revision).await?;
        let files: Vec<ChangedFile> = paths
            .iter()
            .filter(|p| tracking.includes.resolve(p).is_some())
            .map(|p| ChangedFile::new(p.as_str(), ChangeKind::Added, latest.number))
            .collect();

        let configured_pointer = self.rules.repository.detection.pointer_issue;
        let existing = tracked_issues(self.tracker.as_ref(), tracking, configured_pointer).await?;
        let layout = self.rules.layout();
        let plan = SyncPlanner::new(
            tracking,
            &layout,
            &self.rules.repository.detection.needs_review_labels,
        )
        .plan(&files, &existing);

        let dispatched = self.dispatcher.dispatch(plan.mutations).await;

        let pointer = match configured_pointer {
            Some(issue) => {
                let next = SyncPointer::new(latest.number, latest.merge_sha.clone());
                write_pointer(self.tracker.as_ref(), &self.rules, issue, &next).await?;
                Some(next)
            }
            None => None,
        };

        let report = InitReport {
            paths: paths.len(),
            tracked: files.len(),
            unchanged: plan.unchanged,
            dispatched,
            pointer,
        };
        tracing::info!(
            tracked = report.tracked,
            created = report.dispatched.created,
            updated = report.dispatched.updated,
            failed = report.dispatched.failed,
            "initialization finished"
        );
        Ok(report)
    }

    /// Close every open tracking issue. Issues are never deleted.
    pub async fn destroy(&self) -> DomainResult<DispatchSummary> {
        let tracking = tracking(&self.rules)?;
        let sentinel = pointer_issue(&self.rules).ok();
        let issues = self
            .tracker
            .list_issues(&IssueQuery::open_with_labels(&tracking.labels))
            .await?;

        let mutations: Vec<SyncMutation> = issues
            .into_iter()
            .filter(|issue| Some(issue.number) != sentinel)
            .map(|issue| SyncMutation::Close {
                number: issue.number,
                title: issue.title,
            })
            .collect();
        tracing::warn!(count = mutations.len(), "closing every tracking issue");
        Ok(self.dispatcher.dispatch(mutations).await)
    }
}
