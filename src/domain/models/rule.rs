//! Instruction rule (`Flow`) domain model.
//!
//! A `Flow` binds one instruction name (e.g. `/accept`) to the conditions an
//! actor must satisfy and the mutation applied when they do. Flows are built
//! once at configuration load time and are read-only afterwards.

use serde::{Deserialize, Serialize};

use super::issue::IssueState;

/// Permission token accepted by the permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    /// Actor belongs to the maintainer team.
    Maintainer,
    /// Actor is already assigned to the issue.
    Assignees,
    /// Actor is a member of the organization.
    Member,
    /// Always passes.
    Anyone,
}

impl Permission {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maintainer => "maintainer",
            Self::Assignees => "assignees",
            Self::Member => "member",
            Self::Anyone => "anyone",
        }
    }
}

/// Symbolic actor used in assignee deltas and assignee preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActorToken {
    /// The author of the triggering comment.
    Commenter,
    /// Everyone `@`-mentioned on the instruction line.
    Mentioned,
    /// Every current assignee. Only valid in remove lists.
    AllAssignees,
}

impl ActorToken {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Commenter => "commenter",
            Self::Mentioned => "mentioned",
            Self::AllAssignees => "all-assignees",
        }
    }
}

/// Preconditions checked by the permission and state gates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conditions {
    /// Any one of these must hold. Empty means nobody may run the instruction.
    pub permissions: Vec<Permission>,
    /// Labels the issue must already carry.
    pub labels: Vec<String>,
    /// Actors that must already be assigned.
    pub assignees: Vec<ActorToken>,
    pub permission_feedback: Option<String>,
    pub label_feedback: Option<String>,
    pub assignee_feedback: Option<String>,
}

/// Upper bound on how many open issues carrying the added labels an actor may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityLimit {
    pub limit: u32,
    pub feedback: Option<String>,
}

/// Mutation applied once every gate has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub add_labels: Vec<String>,
    /// `None` disables the capacity gate.
    pub capacity: Option<CapacityLimit>,
    pub remove_labels: Vec<String>,
    pub add_assignees: Vec<ActorToken>,
    pub remove_assignees: Vec<ActorToken>,
    pub state: IssueState,
    pub success_feedback: Option<String>,
}

impl Default for Action {
    fn default() -> Self {
        Self {
            add_labels: Vec::new(),
            capacity: None,
            remove_labels: Vec::new(),
            add_assignees: Vec::new(),
            remove_assignees: Vec::new(),
            state: IssueState::Open,
            success_feedback: None,
        }
    }
}

/// A fully resolved instruction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flow {
    /// Document name from `metadata.name`.
    pub name: String,
    /// Instruction literal, always starting with `/`.
    pub instruct: String,
    pub conditions: Conditions,
    pub action: Action,
}

/// One of the three sequential checks of instruction evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Permission,
    State,
    Capacity,
}

impl Gate {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Permission => "permission",
            Self::State => "state",
            Self::Capacity => "capacity",
        }
    }
}

/// Outcome of running the gates for one flow against one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    /// A gate failed. This is an expected outcome, not an error.
    Rejected {
        gate: Gate,
        /// Rendered feedback to post, if the rule configures any.
        feedback: Option<String>,
    },
}

impl Verdict {
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}
