//! Domain layer for the issue-shepherd bot
//!
//! This module contains the rule and sync models plus the ports the engines depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
