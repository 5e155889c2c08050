//! GitHub adapter.
//!
//! Implements the domain ports over the GitHub REST API v3:
//!
//! - [`GitHubIssueTracker`]: issues and comments in the workspace repository
//! - [`GitHubUpstream`]: merged pull requests and trees of the source repository
//! - [`GitHubMembership`]: organization members and the maintainer team
//!
//! All three share one [`GitHubClient`].

pub mod client;
pub mod membership;
pub mod models;
pub mod tracker;
pub mod upstream;

pub use client::{GitHubClient, GITHUB_API_BASE};
pub use membership::GitHubMembership;
pub use tracker::GitHubIssueTracker;
pub use upstream::GitHubUpstream;
