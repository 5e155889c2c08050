//! Timed jobs run by the daily scheduler after the sync pass.

use serde::Serialize;

use super::issue::IssueState;
use super::rule::ActorToken;

/// Action taken on an issue that held the watched labels for too long.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct JobAction {
    pub add_labels: Vec<String>,
    pub remove_labels: Vec<String>,
    pub remove_assignees: Vec<ActorToken>,
    /// `None` leaves the state as it is.
    pub state: Option<IssueState>,
    /// Days added to today for the `@reset-date` placeholder.
    pub reset_in_days: Option<u32>,
    pub feedback: Option<String>,
}

/// A resolved `Job` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub name: String,
    /// Labels an issue must carry to be watched. The first one is timed.
    pub labels: Vec<String>,
    pub in_days: u32,
    pub action: JobAction,
}
