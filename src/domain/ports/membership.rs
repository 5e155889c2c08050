use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Source of truth for organization and maintainer-team membership.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Logins of the maintainer team.
    async fn maintainers(&self) -> DomainResult<Vec<String>>;

    /// Logins of every organization member.
    async fn members(&self) -> DomainResult<Vec<String>>;
}
