//! Composition root.
//!
//! [`Shepherd`] wires the loaded rules, the three ports and the runtime
//! tuning into the engines, and exposes the operations the webhook server,
//! the daily timer and the CLI call. Long-running operations (sync, init,
//! destroy) share one [`AdmissionGate`] slot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::adapters::github::{GitHubClient, GitHubIssueTracker, GitHubMembership, GitHubUpstream};
use crate::domain::errors::DomainResult;
use crate::domain::models::{EventContext, RuleBook};
use crate::domain::ports::{IssueTracker, MembershipDirectory, UpstreamSource};
use crate::infrastructure::config::Settings;
use crate::services::{
    AdmissionGate, CommentReport, DailyScheduler, DispatchSummary, DispatchThrottle, InitReport,
    Initializer, InstructionEngine, JobReport, JobRunner, MembershipCache, MutationDispatcher,
    SyncEngine, SyncReport,
};

/// The three outbound ports.
#[derive(Clone)]
pub struct Ports {
    pub tracker: Arc<dyn IssueTracker>,
    pub upstream: Arc<dyn UpstreamSource>,
    pub directory: Arc<dyn MembershipDirectory>,
}

impl Ports {
    /// GitHub-backed ports for the repositories named in `rules`.
    pub fn github(rules: &RuleBook, token: &str, api_base: &str) -> DomainResult<Self> {
        let client = GitHubClient::new(token, api_base)?;
        let repository = &rules.repository;
        Ok(Self {
            tracker: Arc::new(GitHubIssueTracker::new(
                client.clone(),
                repository.workspace.clone(),
            )),
            upstream: Arc::new(GitHubUpstream::new(
                client.clone(),
                repository.source.repo.clone(),
                repository.source.branch.clone(),
            )),
            directory: Arc::new(GitHubMembership::new(
                client,
                repository.workspace.owner.clone(),
                repository.maintainer_team.clone(),
            )),
        })
    }
}

/// Concurrency and pacing knobs.
#[derive(Clone)]
pub struct Tuning {
    pub throttle: Arc<DispatchThrottle>,
    pub max_workers: usize,
    pub admission_wait: Duration,
    pub notify_assignees: bool,
}

impl Tuning {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            throttle: Arc::new(DispatchThrottle::new(
                settings.throttle.burst,
                settings.throttle_interval(),
            )),
            max_workers: settings.throttle.max_workers,
            admission_wait: settings.admission_wait(),
            notify_assignees: settings.sync.notify_assignees,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            throttle: Arc::new(DispatchThrottle::unlimited()),
            max_workers: 4,
            admission_wait: Duration::from_secs(1),
            notify_assignees: true,
        }
    }
}

pub struct Shepherd {
    rules: Arc<RuleBook>,
    membership: Arc<MembershipCache>,
    instructions: InstructionEngine,
    sync: Arc<SyncEngine>,
    initializer: Initializer,
    jobs: Arc<JobRunner>,
    gate: Arc<AdmissionGate>,
}

impl Shepherd {
    pub fn new(rules: RuleBook, ports: Ports, tuning: Tuning) -> Self {
        let rules = Arc::new(rules);
        let membership = Arc::new(MembershipCache::new(ports.directory));
        let dispatcher = Arc::new(MutationDispatcher::new(
            ports.tracker.clone(),
            tuning.throttle.clone(),
            tuning.max_workers,
        ));

        Self {
            instructions: InstructionEngine::new(
                rules.clone(),
                ports.tracker.clone(),
                membership.clone(),
            ),
            sync: Arc::new(
                SyncEngine::new(
                    rules.clone(),
                    ports.tracker.clone(),
                    ports.upstream.clone(),
                    dispatcher.clone(),
                )
                .with_notifications(tuning.notify_assignees),
            ),
            initializer: Initializer::new(
                rules.clone(),
                ports.tracker.clone(),
                ports.upstream,
                dispatcher,
            ),
            jobs: Arc::new(JobRunner::new(rules.clone(), ports.tracker, tuning.throttle)),
            gate: Arc::new(AdmissionGate::new(tuning.admission_wait)),
            membership,
            rules,
        }
    }

    /// Build against GitHub using the runtime settings.
    pub fn connect(rules: RuleBook, settings: &Settings, token: &str) -> DomainResult<Self> {
        let ports = Ports::github(&rules, token, &settings.github.api_base)?;
        Ok(Self::new(rules, ports, Tuning::from_settings(settings)))
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn membership(&self) -> &MembershipCache {
        &self.membership
    }

    /// Whether a sync, init or destroy currently holds the admission slot.
    pub fn is_busy(&self) -> bool {
        self.gate.is_held()
    }

    pub async fn handle_comment(&self, ctx: &EventContext, body: &str) -> CommentReport {
        self.instructions.handle_comment(ctx, body).await
    }

    /// One synchronization pass through the admission gate.
    pub async fn sync_now(&self) -> DomainResult<SyncReport> {
        self.gate.run("sync", self.sync.run_pass()).await
    }

    pub async fn initialize(&self) -> DomainResult<InitReport> {
        self.gate.run("init", self.initializer.initialize()).await
    }

    pub async fn destroy(&self) -> DomainResult<DispatchSummary> {
        self.gate.run("destroy", self.initializer.destroy()).await
    }

    /// Reload both membership sets; returns `(maintainers, members)`.
    pub async fn reload_members(&self) -> DomainResult<(usize, usize)> {
        self.membership.refresh().await?;
        Ok(self.membership.sizes().await)
    }

    pub async fn run_jobs(&self, now: DateTime<Utc>) -> JobReport {
        self.jobs.run_all(now).await
    }

    /// The daily timer, when detection is enabled.
    pub fn scheduler(&self) -> Option<DailyScheduler> {
        let detection = &self.rules.repository.detection;
        detection.enabled.then(|| {
            DailyScheduler::new(
                detection.at,
                self.gate.clone(),
                self.sync.clone(),
                self.jobs.clone(),
            )
        })
    }
}
