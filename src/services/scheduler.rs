//! Daily timer: one sync pass followed by the jobs, at a fixed local time.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

use super::admission::AdmissionGate;
use super::jobs::JobRunner;
use super::sync_engine::SyncEngine;

/// Next occurrence of `at` strictly after `now`.
pub fn next_run<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    // Covers "already passed today" plus a DST gap on the following day.
    for _ in 0..3 {
        if let Some(candidate) = day.and_time(at).and_local_timezone(tz.clone()).earliest() {
            if candidate > *now {
                return candidate;
            }
        }
        day = day.succ_opt().unwrap_or(day);
    }
    now.clone() + Duration::days(1)
}

pub struct DailyScheduler {
    at: NaiveTime,
    gate: Arc<AdmissionGate>,
    sync: Arc<SyncEngine>,
    jobs: Arc<JobRunner>,
}

impl DailyScheduler {
    pub fn new(
        at: NaiveTime,
        gate: Arc<AdmissionGate>,
        sync: Arc<SyncEngine>,
        jobs: Arc<JobRunner>,
    ) -> Self {
        Self {
            at,
            gate,
            sync,
            jobs,
        }
    }

    /// Loop forever. Spawn this on its own task.
    pub async fn run(self) {
        loop {
            let now = Local::now();
            let next = next_run(&now, self.at);
            let wait = (next.clone() - now).to_std().unwrap_or_default();
            tracing::info!(next = %next, "waiting for daily detection");
            tokio::time::sleep(wait).await;
            self.tick().await;
        }
    }

    /// One scheduled round: sync, then jobs.
    pub async fn tick(&self) {
        let permit = match self.gate.admit("scheduled sync").await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::warn!(error = %e, "skipping scheduled sync");
                return;
            }
        };
        match self.sync.run_pass().await {
            Ok(report) => tracing::info!(
                changes = report.changes,
                failed = report.dispatched.failed,
                "scheduled sync finished"
            ),
            Err(e) => tracing::error!(error = %e, "scheduled sync failed"),
        }
        drop(permit);

        let report = self.jobs.run_all(Utc::now()).await;
        tracing::info!(
            watched = report.watched,
            fired = report.fired,
            failed = report.failed,
            "scheduled jobs finished"
        );
    }
}
