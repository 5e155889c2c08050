//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "issue-shepherd")]
#[command(about = "Issue Shepherd - tracking-issue bot for documentation workflows", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Rule file (multi-document YAML)
    #[arg(short, long, global = true, default_value = "./config.yaml")]
    pub config: PathBuf,

    /// Runtime settings file (YAML), layered under SHEPHERD_* variables
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// GitHub token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the webhook server and the daily timer
    Serve(ServeArgs),

    /// Run one synchronization pass now
    Sync,

    /// Create or complete tracking issues from the latest upstream tree
    Init,

    /// Close every open tracking issue
    Destroy(DestroyArgs),

    /// Show the loaded rules, include patterns and jobs
    Info,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DestroyArgs {
    /// Confirm closing every tracking issue
    #[arg(long)]
    pub yes: bool,
}
