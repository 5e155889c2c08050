//! Membership cache consulted by the permission gate.
//!
//! Holds the maintainer and member login sets behind `RwLock`s so readers
//! never observe a half-written refresh. Refreshes are triggered by
//! organization/membership webhooks, plus one forced member refresh when a
//! `member` permission check misses.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::ports::MembershipDirectory;

fn normalize(logins: Vec<String>) -> HashSet<String> {
    logins.into_iter().map(|l| l.to_lowercase()).collect()
}

/// Shared maintainer/member sets.
pub struct MembershipCache {
    directory: Arc<dyn MembershipDirectory>,
    maintainers: RwLock<HashSet<String>>,
    members: RwLock<HashSet<String>>,
}

impl MembershipCache {
    /// Create an empty cache. Call [`Self::refresh`] before serving events.
    pub fn new(directory: Arc<dyn MembershipDirectory>) -> Self {
        Self {
            directory,
            maintainers: RwLock::new(HashSet::new()),
            members: RwLock::new(HashSet::new()),
        }
    }

    pub async fn is_maintainer(&self, login: &str) -> bool {
        self.maintainers.read().await.contains(&login.to_lowercase())
    }

    pub async fn is_member(&self, login: &str) -> bool {
        self.members.read().await.contains(&login.to_lowercase())
    }

    /// Member check that refreshes the member set once on a miss.
    pub async fn is_member_fresh(&self, login: &str) -> bool {
        if self.is_member(login).await {
            return true;
        }
        tracing::debug!(login = login, "member cache miss, refreshing");
        if let Err(e) = self.refresh_members().await {
            tracing::warn!(error = %e, "member refresh failed, keeping previous set");
            return false;
        }
        self.is_member(login).await
    }

    /// Reload both sets. A failed load keeps the previous set.
    pub async fn refresh(&self) -> DomainResult<()> {
        let maintainers = self.refresh_maintainers().await;
        let members = self.refresh_members().await;
        maintainers.and(members)
    }

    pub async fn refresh_members(&self) -> DomainResult<()> {
        let fresh = normalize(self.directory.members().await?);
        let count = fresh.len();
        *self.members.write().await = fresh;
        tracing::info!(count = count, "member cache refreshed");
        Ok(())
    }

    pub async fn refresh_maintainers(&self) -> DomainResult<()> {
        let fresh = normalize(self.directory.maintainers().await?);
        let count = fresh.len();
        *self.maintainers.write().await = fresh;
        tracing::info!(count = count, "maintainer cache refreshed");
        Ok(())
    }

    /// Current set sizes as `(maintainers, members)`.
    pub async fn sizes(&self) -> (usize, usize) {
        (
            self.maintainers.read().await.len(),
            self.members.read().await.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Directory whose member list can change between calls.
    struct ScriptedDirectory {
        members: Mutex<Vec<String>>,
        member_calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedDirectory {
        fn new(members: &[&str]) -> Self {
            Self {
                members: Mutex::new(members.iter().map(ToString::to_string).collect()),
                member_calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl MembershipDirectory for ScriptedDirectory {
        async fn maintainers(&self) -> DomainResult<Vec<String>> {
            Ok(vec!["Lead".to_string()])
        }

        async fn members(&self) -> DomainResult<Vec<String>> {
            self.member_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::Transport {
                    operation: "list members".into(),
                    reason: "connection reset".into(),
                });
            }
            Ok(self.members.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_both_sets_case_insensitively() {
        let cache = MembershipCache::new(Arc::new(ScriptedDirectory::new(&["Alice"])));
        cache.refresh().await.unwrap();

        assert!(cache.is_maintainer("lead").await);
        assert!(cache.is_member("ALICE").await);
        assert!(!cache.is_member("bob").await);
        assert_eq!(cache.sizes().await, (1, 1));
    }

    #[tokio::test]
    async fn test_member_miss_forces_one_refresh() {
        let directory = Arc::new(ScriptedDirectory::new(&["alice"]));
        let cache = MembershipCache::new(directory.clone());
        cache.refresh().await.unwrap();

        directory.members.lock().unwrap().push("bob".into());
        assert!(!cache.is_member("bob").await);
        assert!(cache.is_member_fresh("bob").await);
        assert_eq!(directory.member_calls.load(Ordering::SeqCst), 2);

        // A hit does not touch the directory.
        assert!(cache.is_member_fresh("alice").await);
        assert_eq!(directory.member_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_set() {
        let mut directory = ScriptedDirectory::new(&["alice"]);
        directory.fail = true;
        let cache = MembershipCache::new(Arc::new(directory));

        assert!(cache.refresh().await.is_err());
        assert!(cache.is_maintainer("lead").await);
        assert!(!cache.is_member_fresh("alice").await);
    }
}
