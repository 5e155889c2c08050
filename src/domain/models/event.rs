//! Event context handed to the instruction engine.

use uuid::Uuid;

use super::issue::IssueSnapshot;

/// Everything the instruction engine needs to know about one comment event.
///
/// Built once per event and never mutated during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub owner: String,
    pub repository: String,
    /// Login of the comment author.
    pub actor: String,
    /// Logins mentioned on the instruction line, without the leading `@`.
    pub mentions: Vec<String>,
    pub issue: IssueSnapshot,
    /// Correlation id, rendered into feedback as `@req-id`.
    pub request_id: Uuid,
}

impl EventContext {
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        actor: impl Into<String>,
        issue: IssueSnapshot,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            actor: actor.into(),
            mentions: Vec::new(),
            issue,
            request_id: Uuid::new_v4(),
        }
    }

    /// Same event, scoped to the mentions of one instruction line.
    #[must_use]
    pub fn with_mentions(&self, mentions: Vec<String>) -> Self {
        Self {
            mentions,
            ..self.clone()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }
}
