//! CLI command implementations.

pub mod destroy;
pub mod info;
pub mod init;
pub mod serve;
pub mod sync;

use anyhow::{Context, Result};

use crate::application::Shepherd;
use crate::cli::types::GlobalArgs;
use crate::domain::models::RuleBook;
use crate::infrastructure::config::{RuleLoader, Settings};

/// Load the runtime settings named by `--settings`.
pub fn load_settings(global: &GlobalArgs) -> Result<Settings> {
    Settings::load(global.settings.as_deref()).context("Failed to load runtime settings")
}

/// Load and validate the rule file named by `--config`.
pub fn load_rules(global: &GlobalArgs) -> Result<RuleBook> {
    RuleLoader::load_file(&global.config)
        .with_context(|| format!("Failed to load rules from {}", global.config.display()))
}

/// Wire the GitHub-backed bot. Fails without a token.
pub fn connect(global: &GlobalArgs, settings: &Settings) -> Result<Shepherd> {
    let token = global
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .context("A GitHub token is required: pass --token or set GITHUB_TOKEN")?;
    let rules = load_rules(global)?;
    Shepherd::connect(rules, settings, token).context("Failed to build the GitHub client")
}
