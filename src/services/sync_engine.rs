//! Synchronization engine: mirrors merged upstream changes into tracking issues.
//!
//! One pass:
//!
//! 1. Read the [`SyncPointer`] from the sentinel issue.
//! 2. List merged pull requests newer than the pointer, oldest merge first.
//! 3. Flatten their changed files in that order.
//! 4. Plan one coalesced mutation per title ([`SyncPlanner`]).
//! 5. Fan the mutations out through the [`MutationDispatcher`] and wait.
//! 6. Advance the pointer to the newest processed pull request, whatever the
//!    per-mutation outcome was.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::dispatcher::{DispatchSummary, MutationDispatcher};
use super::sync_planner::{index_by_title, SyncPlanner};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ChangedFile, IssueEdit, IssueQuery, IssueSnapshot, MergedChange, RuleBook, SyncPointer,
    TrackingSettings,
};
use crate::domain::ports::{IssueTracker, UpstreamSource};

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Merged pull requests in the window.
    pub changes: usize,
    /// Changed files across the window.
    pub files: usize,
    pub ignored: usize,
    pub skipped: usize,
    pub orphaned: usize,
    pub unchanged: usize,
    pub dispatched: DispatchSummary,
    /// Pointer written at the end of the pass; `None` when nothing was processed.
    pub pointer: Option<SyncPointer>,
}

pub struct SyncEngine {
    rules: Arc<RuleBook>,
    tracker: Arc<dyn IssueTracker>,
    upstream: Arc<dyn UpstreamSource>,
    dispatcher: Arc<MutationDispatcher>,
    notify_assignees: bool,
}

impl SyncEngine {
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
            notify_assignees: false,
        }
    }

    /// Comment on assigned issues whose tracked files changed.
    #[must_use]
    pub const fn with_notifications(mut self, enabled: bool) -> Self {
        self.notify_assignees = enabled;
        self
    }

    /// Run one pass. Callers serialize passes through the admission gate.
    pub async fn run_pass(&self) -> DomainResult<SyncReport> {
        let tracking = tracking(&self.rules)?;
        let pointer_issue = pointer_issue(&self.rules)?;

        let sentinel = self.tracker.get_issue(pointer_issue).await?;
        let pointer = SyncPointer::parse(&sentinel.body)?;
        tracing::info!(pointer = pointer.number, "sync pass started");

        let window = self.upstream.merged_since(pointer.number).await?;
        if window.is_empty() {
            tracing::info!(pointer = pointer.number, "no merged changes since pointer");
            return Ok(SyncReport::default());
        }

        let mut files: Vec<ChangedFile> = Vec::new();
        for change in &window {
            files.extend(self.upstream.changed_files(change.number).await?);
        }

        let existing = tracked_issues(self.tracker.as_ref(), tracking, Some(pointer_issue)).await?;
        let layout = self.rules.layout();
        let needs_review = &self.rules.repository.detection.needs_review_labels;
        let plan = SyncPlanner::new(tracking, &layout, needs_review)
            .with_notifications(self.notify_assignees)
            .plan(&files, &existing);
        tracing::info!(
            changes = window.len(),
            files = files.len(),
            mutations = plan.mutations.len(),
            "sync plan ready"
        );

        let dispatched = self.dispatcher.dispatch(plan.mutations).await;
        if dispatched.failed > 0 {
            tracing::warn!(
                failed = dispatched.failed,
                "some mutations failed, advancing pointer anyway"
            );
        }

        let next = advance(&pointer, &window);
        write_pointer(self.tracker.as_ref(), &self.rules, pointer_issue, &next).await?;

        let report = SyncReport {
            changes: window.len(),
            files: files.len(),
            ignored: plan.ignored,
            skipped: plan.skipped,
            orphaned: plan.orphaned,
            unchanged: plan.unchanged,
            dispatched,
            pointer: Some(next),
        };
        tracing::info!(
            created = report.dispatched.created,
            updated = report.dispatched.updated,
            failed = report.dispatched.failed,
            pointer = report.pointer.as_ref().map_or(0, |p| p.number),
            "sync pass finished"
        );
        Ok(report)
    }
}

pub(crate) fn tracking(rules: &RuleBook) -> DomainResult<&TrackingSettings> {
    rules.tracking.as_ref().ok_or_else(|| {
        DomainError::Configuration("no IssueCreate document is configured".to_string())
    })
}

pub(crate) fn pointer_issue(rules: &RuleBook) -> DomainResult<u64> {
    rules.repository.detection.pointer_issue.ok_or_else(|| {
        DomainError::Configuration("detection.pointer_issue is not configured".to_string())
    })
}

/// Open tracking issues keyed by title.
pub async fn tracked_issues(
    tracker: &dyn IssueTracker,
    tracking: &TrackingSettings,
    pointer_issue: Option<u64>,
) -> DomainResult<HashMap<String, IssueSnapshot>> {
    let issues = tracker
        .list_issues(&IssueQuery::open_with_labels(&tracking.labels))
        .await?;
    Ok(index_by_title(issues, pointer_issue))
}

/// Pointer after processing `window`: highest number, newest merge revision.
fn advance(current: &SyncPointer, window: &[MergedChange]) -> SyncPointer {
    let number = window
        .iter()
        .map(|c| c.number)
        .max()
        .unwrap_or(current.number)
        .max(current.number);
    let revision = window
        .iter()
        .rev()
        .find_map(|c| c.merge_sha.clone())
        .or_else(|| current.revision.clone());
    SyncPointer::new(number, revision)
}

pub(crate) async fn write_pointer(
    tracker: &dyn IssueTracker,
    rules: &RuleBook,
    pointer_issue: u64,
    pointer: &SyncPointer,
) -> DomainResult<()> {
    let edit = IssueEdit {
        body: Some(pointer.render(&rules.repository.source.repo)),
        ..Default::default()
    };
    tracker
        .edit_issue(pointer_issue, &edit)
        .await
        .inspect_err(|e| {
            tracing::error!(
                issue = pointer_issue,
                pointer = pointer.number,
                error = %e,
                "failed to persist sync pointer"
            );
        })?;
    tracing::info!(issue = pointer_issue, pointer = pointer.number, "sync pointer advanced");
    Ok(())
}
