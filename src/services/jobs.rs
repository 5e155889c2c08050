//! Daily jobs: act on issues that sat in a labelled state for too long.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::feedback::FeedbackContext;
use super::instruction_engine::{next_assignees, next_labels};
use super::throttle::DispatchThrottle;
use crate::domain::errors::DomainResult;
use crate::domain::models::{IssueEdit, IssueQuery, IssueSnapshot, Job, RuleBook};
use crate::domain::ports::IssueTracker;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    /// Issues carrying a job's watched labels.
    pub watched: usize,
    /// Issues the job acted on.
    pub fired: usize,
    pub failed: usize,
}

pub struct JobRunner {
    rules: Arc<RuleBook>,
    tracker: Arc<dyn IssueTracker>,
    throttle: Arc<DispatchThrottle>,
}

impl JobRunner {
    pub fn new(
        rules: Arc<RuleBook>,
        tracker: Arc<dyn IssueTracker>,
        throttle: Arc<DispatchThrottle>,
    ) -> Self {
        Self {
            rules,
            tracker,
            throttle,
        }
    }

    /// Run every configured job as of `now`.
    pub async fn run_all(&self, now: DateTime<Utc>) -> JobReport {
        let mut report = JobReport::default();
        for job in &self.rules.jobs {
            match self.run_job(job, now).await {
                Ok(partial) => {
                    report.watched += partial.watched;
                    report.fired += partial.fired;
                    report.failed += partial.failed;
                }
                Err(e) => {
                    tracing::error!(job = %job.name, error = %e, "job failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    pub async fn run_job(&self, job: &Job, now: DateTime<Utc>) -> DomainResult<JobReport> {
        let issues = self
            .tracker
            .list_issues(&IssueQuery::open_with_labels(&job.labels))
            .await?;
        let mut report = JobReport {
            watched: issues.len(),
            ..Default::default()
        };

        for issue in issues {
            let done = !job.action.add_labels.is_empty() && issue.has_labels(&job.action.add_labels);
            if done {
                continue;
            }
            let deadline = match self.deadline(job, &issue).await {
                Ok(Some(deadline)) => deadline,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(job = %job.name, issue = issue.number, error = %e, "label history lookup failed");
                    report.failed += 1;
                    continue;
                }
            };
            if now < deadline {
                continue;
            }
            match self.fire(job, &issue, deadline, now).await {
                Ok(()) => report.fired += 1,
                Err(e) => {
                    tracing::error!(job = %job.name, issue = issue.number, error = %e, "job action failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    async fn deadline(&self, job: &Job, issue: &IssueSnapshot) -> DomainResult<Option<DateTime<Utc>>> {
        let Some(watched) = job.labels.first() else {
            return Ok(None);
        };
        self.throttle.acquire().await;
        let since = self
            .tracker
            .label_applied_at(issue.number, watched)
            .await?
            .or(issue.updated_at);
        Ok(since.map(|t| t + Duration::days(i64::from(job.in_days))))
    }

    async fn fire(
        &self,
        job: &Job,
        issue: &IssueSnapshot,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let action = &job.action;
        let actor = issue.assignees.first().cloned().unwrap_or_default();
        let edit = IssueEdit {
            labels: Some(next_labels(&issue.labels, &action.remove_labels, &action.add_labels)),
            assignees: Some(next_assignees(
                &issue.assignees,
                &[],
                &action.remove_assignees,
                &actor,
                &[],
            )),
            state: action.state,
            ..Default::default()
        };

        self.throttle.acquire().await;
        self.tracker.edit_issue(issue.number, &edit).await?;
        tracing::info!(job = %job.name, issue = issue.number, "job fired");

        let reset_date = action.reset_in_days.map_or_else(
            || deadline.date_naive(),
            |days| (now + Duration::days(i64::from(days))).date_naive(),
        );
        let feedback = FeedbackContext {
            reset_date: Some(reset_date),
            request_id: Some(Uuid::new_v4()),
            assignees: issue.assignees.clone(),
            ..FeedbackContext::for_actor(actor)
        }
        .render_opt(action.feedback.as_ref());
        if let Some(text) = feedback {
            self.throttle.acquire().await;
            self.tracker.post_comment(issue.number, &text).await?;
        }
        Ok(())
    }
}
