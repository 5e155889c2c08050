pub mod change;
pub mod event;
pub mod include;
pub mod issue;
pub mod job;
pub mod plan;
pub mod pointer;
pub mod repository;
pub mod rule;
pub mod rulebook;
pub mod tracked;

pub use change::{ChangeKind, ChangedFile, MergedChange};
pub use event::EventContext;
pub use include::{Grouping, IncludeRule, IncludeSet, Resolution, TitlePolicy};
pub use issue::{IssueDraft, IssueEdit, IssueQuery, IssueSnapshot, IssueState};
pub use job::{Job, JobAction};
pub use plan::{MutationPlan, SyncMutation};
pub use pointer::SyncPointer;
pub use repository::{Detection, RepoRef, RepositorySettings, SourceRepo, TranslateRepo};
pub use rule::{
    Action, ActorToken, CapacityLimit, Conditions, Flow, Gate, Permission, Verdict,
};
pub use rulebook::{RuleBook, TrackingSettings};
pub use tracked::{BodyLayout, TrackedFiles};
