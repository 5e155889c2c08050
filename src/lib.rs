//! Issue Shepherd - tracking-issue bot
//!
//! Issue Shepherd keeps a workspace repository's issues in step with two
//! inputs: slash instructions in issue comments (`/accept`, `/done`, ...)
//! and merged pull requests in an upstream source repository.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): rules, issue snapshots, sync pointer and the port traits
//! - **Service Layer** (`services`): instruction engine, sync engine, jobs and their plumbing
//! - **Adapters** (`adapters`): GitHub REST client and the webhook/control HTTP server
//! - **Application Layer** (`application`): composition root wiring ports into engines
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use issue_shepherd::application::Shepherd;
//! use issue_shepherd::infrastructure::config::{RuleLoader, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let rules = RuleLoader::load_file("config.yaml")?;
//!     let settings = Settings::load(None)?;
//!     let shepherd = Shepherd::connect(rules, &settings, "ghp_...")?;
//!     let report = shepherd.sync_now().await?;
//!     println!("{} issues updated", report.dispatched.updated);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{Ports, Shepherd, Tuning};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{EventContext, Flow, IssueSnapshot, RuleBook, SyncPointer};
pub use domain::ports::{IssueTracker, MembershipDirectory, UpstreamSource};
pub use infrastructure::config::{ConfigError, RuleLoader, Settings};
pub use services::{InstructionEngine, SyncEngine, SyncReport};
