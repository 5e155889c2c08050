//! Configuration management infrastructure
//!
//! Two independent inputs:
//! - the rule file: multi-document YAML decoded by `kind` and validated
//!   into a [`crate::domain::models::RuleBook`]
//! - runtime settings: figment layering of defaults, an optional YAML file
//!   and `SHEPHERD_*` environment variables

pub mod documents;
pub mod loader;
pub mod settings;

pub use loader::{ConfigError, RuleLoader};
pub use settings::Settings;
