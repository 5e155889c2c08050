//! Single-slot admission gate for long-running operations.
//!
//! Manual sync, scheduled sync and issue initialization share one slot.
//! A caller waits a bounded interval for it and then gets
//! [`DomainError::Busy`] instead of queuing.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::domain::errors::{DomainError, DomainResult};

pub struct AdmissionGate {
    slot: Semaphore,
    wait: Duration,
}

impl AdmissionGate {
    pub const fn new(wait: Duration) -> Self {
        Self {
            slot: Semaphore::const_new(1),
            wait,
        }
    }

    /// Take the slot, waiting at most the configured interval.
    pub async fn admit(&self, operation: &str) -> DomainResult<SemaphorePermit<'_>> {
        match tokio::time::timeout(self.wait, self.slot.acquire()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(operation = operation, "admission gate busy");
                Err(DomainError::Busy(operation.to_string()))
            }
        }
    }

    /// Run `work` while holding the slot.
    pub async fn run<T, F>(&self, operation: &str, work: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        let _permit = self.admit(operation).await?;
        work.await
    }

    pub fn is_held(&self) -> bool {
        self.slot.available_permits() == 0
    }
}
