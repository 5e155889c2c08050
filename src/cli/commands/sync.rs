//! `issue-shepherd sync`: one synchronization pass.

use anyhow::{Context, Result};

use crate::cli::output::{output, CommandOutput};
use crate::cli::types::GlobalArgs;
use crate::infrastructure::config::Settings;
use crate::services::SyncReport;

impl CommandOutput for SyncReport {
    fn to_human(&self) -> String {
        let Some(pointer) = &self.pointer else {
            return "No merged changes since the pointer.".to_string();
        };
        let mut lines = vec![
            format!("Processed {} merged pull request(s), {} changed file(s).", self.changes, self.files),
            format!(
                "Issues: {} created, {} updated, {} closed, {} failed.",
                self.dispatched.created, self.dispatched.updated, self.dispatched.closed, self.dispatched.failed
            ),
            format!(
                "Files: {} untracked, {} unchanged, {} skipped, {} orphaned.",
                self.ignored, self.unchanged, self.skipped, self.orphaned
            ),
        ];
        lines.push(format!("Pointer advanced to #{}.", pointer.number));
        lines.join("\n")
    }
}

pub async fn execute(global: &GlobalArgs, settings: &Settings) -> Result<()> {
    let shepherd = super::connect(global, settings)?;
    let report = shepherd.sync_now().await.context("Synchronization pass failed")?;
    output(&report, global.json);
    Ok(())
}
