//! Fan-out executor for sync mutations.
//!
//! Each mutation runs on its own task. A semaphore bounds the number of live
//! workers and every remote call first takes a token from the
//! [`DispatchThrottle`]. [`MutationDispatcher::dispatch`] returns only after
//! every worker has finished.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;

use super::throttle::DispatchThrottle;
use crate::domain::errors::DomainResult;
use crate::domain::models::{IssueEdit, IssueState, SyncMutation};
use crate::domain::ports::IssueTracker;

/// What happened to one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Created,
    Updated,
    Closed,
}

/// Tally of a dispatch round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub created: usize,
    pub updated: usize,
    pub closed: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub const fn attempted(&self) -> usize {
        self.created + self.updated + self.closed + self.failed
    }
}

pub struct MutationDispatcher {
    tracker: Arc<dyn IssueTracker>,
    throttle: Arc<DispatchThrottle>,
    max_workers: usize,
}

impl MutationDispatcher {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        throttle: Arc<DispatchThrottle>,
        max_workers: usize,
    ) -> Self {
        Self {
            tracker,
            throttle,
            max_workers: max_workers.max(1),
        }
    }

    /// Apply every mutation and wait for all of them.
    ///
    /// Failures are logged and counted. They never stop sibling mutations.
    pub async fn dispatch(&self, mutations: Vec<SyncMutation>) -> DispatchSummary {
        let workers = Arc::new(Semaphore::new(self.max_workers));
        let mut handles = Vec::with_capacity(mutations.len());

        for mutation in mutations {
            let tracker = self.tracker.clone();
            let throttle = self.throttle.clone();
            let workers = workers.clone();
            handles.push(tokio::spawn(async move {
                // The semaphore is never closed.
                let _permit = workers.acquire_owned().await.ok();
                apply(tracker.as_ref(), &throttle, mutation).await
            }));
        }

        let mut summary = DispatchSummary::default();
        for outcome in join_all(handles).await {
            match outcome {
                Ok(Ok(Applied::Created)) => summary.created += 1,
                Ok(Ok(Applied::Updated)) => summary.updated += 1,
                Ok(Ok(Applied::Closed)) => summary.closed += 1,
                Ok(Err(())) => summary.failed += 1,
                Err(e) => {
                    tracing::error!(error = %e, "mutation worker panicked");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

async fn apply(
    tracker: &dyn IssueTracker,
    throttle: &DispatchThrottle,
    mutation: SyncMutation,
) -> Result<Applied, ()> {
    throttle.acquire().await;
    let result = match &mutation {
        SyncMutation::Create { draft } => tracker.create_issue(draft).await.map(|issue| {
            tracing::info!(issue = issue.number, title = %draft.title, "created tracking issue");
            Applied::Created
        }),
        SyncMutation::Update {
            number,
            title,
            edit,
            notice,
        } => update(tracker, throttle, *number, title, edit, notice.as_deref()).await,
        SyncMutation::Close { number, title } => {
            let edit = IssueEdit {
                state: Some(IssueState::Closed),
                ..Default::default()
            };
            tracker.edit_issue(*number, &edit).await.map(|_| {
                tracing::info!(issue = number, title = %title, "closed tracking issue");
                Applied::Closed
            })
        }
    };

    result.map_err(|e| {
        tracing::error!(
            op = mutation.kind(),
            title = %mutation.title(),
            mutation = ?mutation,
            status = ?e.status(),
            error = %e,
            "mutation failed"
        );
    })
}

async fn update(
    tracker: &dyn IssueTracker,
    throttle: &DispatchThrottle,
    number: u64,
    title: &str,
    edit: &IssueEdit,
    notice: Option<&str>,
) -> DomainResult<Applied> {
    tracker.edit_issue(number, edit).await?;
    tracing::info!(issue = number, title = %title, "updated tracking issue");

    if let Some(notice) = notice {
        throttle.acquire().await;
        if let Err(e) = tracker.post_comment(number, notice).await {
            tracing::warn!(issue = number, error = %e, "failed to post change notice");
        }
    }
    Ok(Applied::Updated)
}
