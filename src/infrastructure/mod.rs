//! Infrastructure layer module
//!
//! - Configuration management (rule documents and runtime settings)
//! - Logging infrastructure

pub mod config;
pub mod logging;
