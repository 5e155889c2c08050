//! Mutation plans produced by the engines and executed against the tracker.

use serde::Serialize;

use super::issue::{IssueDraft, IssueEdit, IssueState};

/// Computed next state of one issue after an instruction passed every gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationPlan {
    pub issue: u64,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub state: IssueState,
}

impl MutationPlan {
    pub fn to_edit(&self) -> IssueEdit {
        IssueEdit {
            labels: Some(self.labels.clone()),
            assignees: Some(self.assignees.clone()),
            state: Some(self.state),
            ..Default::default()
        }
    }
}

/// One coalesced mutation for one title, derived from a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SyncMutation {
    Create {
        draft: IssueDraft,
    },
    Update {
        number: u64,
        title: String,
        edit: IssueEdit,
        /// Comment announcing the change to current assignees.
        notice: Option<String>,
    },
    Close {
        number: u64,
        title: String,
    },
}

impl SyncMutation {
    pub fn title(&self) -> &str {
        match self {
            Self::Create { draft } => &draft.title,
            Self::Update { title, .. } | Self::Close { title, .. } => title,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Close { .. } => "close",
        }
    }
}
