//! `issue-shepherd init`: seed tracking issues from the upstream tree.

use anyhow::{Context, Result};

use crate::cli::output::{output, CommandOutput};
use crate::cli::types::GlobalArgs;
use crate::infrastructure::config::Settings;
use crate::services::InitReport;

impl CommandOutput for InitReport {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Scanned {} upstream path(s), {} tracked.", self.paths, self.tracked),
            format!(
                "Issues: {} created, {} updated, {} already complete, {} failed.",
                self.dispatched.created, self.dispatched.updated, self.unchanged, self.dispatched.failed
            ),
        ];
        if let Some(pointer) = &self.pointer {
            lines.push(format!("Pointer set to #{}.", pointer.number));
        }
        lines.join("\n")
    }
}

pub async fn execute(global: &GlobalArgs, settings: &Settings) -> Result<()> {
    let shepherd = super::connect(global, settings)?;
    let report = shepherd.initialize().await.context("Initialization failed")?;
    output(&report, global.json);
    Ok(())
}
