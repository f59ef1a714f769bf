//! Random allocation of unused four digit session codes.

use std::future::Future;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_ALLOCATION_ATTEMPTS,
    dao::{models::SessionId, storage::StorageError},
    error::ServiceError,
};

/// Draws random codes until one is free, giving up after a fixed number of attempts.
///
/// Allocation has no side effect: two callers can receive the same free code,
/// and the loser's insert is rejected by the primary key.
#[derive(Debug, Clone, Copy)]
pub struct SessionCodeAllocator {
    max_attempts: u32,
}

impl Default for SessionCodeAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOCATION_ATTEMPTS)
    }
}

impl SessionCodeAllocator {
    /// Allocator giving up after `max_attempts` draws; zero is raised to one.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Number of draws before allocation fails.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Allocate using a freshly seeded generator.
    pub async fn allocate<F, Fut>(&self, is_taken: F) -> Result<SessionId, ServiceError>
    where
        F: FnMut(SessionId) -> Fut,
        Fut: Future<Output = Result<bool, StorageError>>,
    {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.allocate_with(&mut rng, is_taken).await
    }

    /// Allocate drawing candidates from `rng`; `is_taken` probes the store for each candidate.
    pub async fn allocate_with<R, F, Fut>(
        &self,
        rng: &mut R,
        mut is_taken: F,
    ) -> Result<SessionId, ServiceError>
    where
        R: Rng,
        F: FnMut(SessionId) -> Fut,
        Fut: Future<Output = Result<bool, StorageError>>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = SessionId::random(rng);
            if !is_taken(candidate.clone()).await? {
                debug!(session_id = %candidate, attempt, "allocated session code");
                return Ok(candidate);
            }
        }

        warn!(
            attempts = self.max_attempts,
            "session code space exhausted"
        );
        Err(ServiceError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}
