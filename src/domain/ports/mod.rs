//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - IssueTracker: issue reads and writes in the workspace repository
//! - UpstreamSource: merge history and trees of the source repository
//! - MembershipDirectory: organization members and the maintainer team
//!
//! The engines only ever talk to these traits, so tests swap in in-memory fakes.

pub mod issue_tracker;
pub mod membership;
pub mod upstream;

pub use issue_tracker::IssueTracker;
pub use membership::MembershipDirectory;
pub use upstream::UpstreamSource;
