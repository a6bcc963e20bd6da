//! Per-artifact exclusivity for regeneration cycles
//!
//! [`ArtifactLocks`] serializes cycles inside one process. [`LeaseGuard`]
//! holds the store-backed lease that serializes them across processes.

use lectern_domain::{ArtifactId, ArtifactLease, LeaseToken};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Set of artifacts with a regeneration in flight
///
/// Acquisition never blocks: a held artifact is reported as unavailable and
/// the caller fails fast. Locks are not reentrant.
#[derive(Debug, Default)]
pub struct ArtifactLocks {
    held: Mutex<HashSet<ArtifactId>>,
}

impl ArtifactLocks {
    /// Create an empty lock set
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for `artifact_id`
    ///
    /// Returns `None` when the artifact is already locked. The lock is held
    /// until the returned guard is dropped.
    pub fn try_acquire(&self, artifact_id: ArtifactId) -> Option<ArtifactLockGuard<'_>> {
        if !self.held().insert(artifact_id) {
            debug!(artifact = %artifact_id, "Artifact lock busy");
            return None;
        }
        debug!(artifact = %artifact_id, "Artifact lock acquired");
        Some(ArtifactLockGuard {
            locks: self,
            artifact_id,
        })
    }

    /// Whether `artifact_id` is currently locked
    pub fn is_locked(&self, artifact_id: ArtifactId) -> bool {
        self.held().contains(&artifact_id)
    }

    fn held(&self) -> MutexGuard<'_, HashSet<ArtifactId>> {
        // The set stays consistent even if a holder panicked mid-cycle
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the artifact lock on drop
#[derive(Debug)]
pub struct ArtifactLockGuard<'a> {
    locks: &'a ArtifactLocks,
    artifact_id: ArtifactId,
}

impl ArtifactLockGuard<'_> {
    /// Locked artifact
    pub fn artifact_id(&self) -> ArtifactId {
        self.artifact_id
    }
}

impl Drop for ArtifactLockGuard<'_> {
    fn drop(&mut self) {
        self.locks.held().remove(&self.artifact_id);
        debug!(artifact = %self.artifact_id, "Artifact lock released");
    }
}

/// Releases a store-backed lease on drop
pub struct LeaseGuard<'a, S: ArtifactLease> {
    store: &'a Mutex<S>,
    artifact_id: ArtifactId,
    token: LeaseToken,
}

impl<'a, S: ArtifactLease> LeaseGuard<'a, S> {
    /// Wrap a lease claimed from `store`
    pub fn new(store: &'a Mutex<S>, artifact_id: ArtifactId, token: LeaseToken) -> Self {
        Self {
            store,
            artifact_id,
            token,
        }
    }
}

impl<S: ArtifactLease> Drop for LeaseGuard<'_, S> {
    fn drop(&mut self) {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = store.release(self.artifact_id, &self.token) {
            // The row expires on its own
            warn!(artifact = %self.artifact_id, error = %e, "Failed to release lease");
        }
    }
}
