//! `issue-shepherd destroy --yes`: close every open tracking issue.

use anyhow::{bail, Context, Result};

use crate::cli::output::{output, CommandOutput};
use crate::cli::types::{DestroyArgs, GlobalArgs};
use crate::infrastructure::config::Settings;
use crate::services::DispatchSummary;

impl CommandOutput for DispatchSummary {
    fn to_human(&self) -> String {
        if self.attempted() == 0 {
            return "No open tracking issues.".to_string();
        }
        format!("Closed {} tracking issue(s), {} failed.", self.closed, self.failed)
    }
}

pub async fn execute(global: &GlobalArgs, settings: &Settings, args: &DestroyArgs) -> Result<()> {
    if !args.yes {
        bail!("destroy closes every open tracking issue; re-run with --yes to confirm");
    }
    let shepherd = super::connect(global, settings)?;
    let summary = shepherd.destroy().await.context("Destroy failed")?;
    output(&summary, global.json);
    Ok(())
}
