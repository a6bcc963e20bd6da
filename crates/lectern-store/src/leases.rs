//! Cross-process regeneration leases
//!
//! A lease is a row in `regeneration_locks`. Claiming inserts the row and
//! fails on the primary key while another holder has it; releasing deletes
//! the row only if the token still matches. Rows older than the store's
//! lease TTL are removed before a claim, so a process that died mid-cycle
//! blocks its artifact for at most that long.

use crate::{is_constraint_violation, unix_now, SqliteStore, StoreError};
use lectern_domain::{ArtifactId, ArtifactLease, LeaseToken, VersionStoreError};
use rusqlite::{params, TransactionBehavior};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default age after which an unreleased lease is considered abandoned
pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(15 * 60);

impl SqliteStore {
    /// Claim the regeneration lease for `artifact_id` at the current time
    pub fn claim_lease(&mut self, artifact_id: ArtifactId) -> Result<Option<LeaseToken>, StoreError> {
        self.claim_lease_at(artifact_id, unix_now())
    }

    /// Claim the regeneration lease for `artifact_id` as of `now`
    pub fn claim_lease_at(
        &mut self,
        artifact_id: ArtifactId,
        now: u64,
    ) -> Result<Option<LeaseToken>, StoreError> {
        let cutoff = now.saturating_sub(self.lease_ttl.as_secs()) as i64;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let expired = tx.execute(
            "DELETE FROM regeneration_locks WHERE artifact_id = ?1 AND acquired_at <= ?2",
            params![artifact_id.value() as i64, cutoff],
        )?;
        if expired > 0 {
            warn!(artifact_id = %artifact_id, "Expired abandoned regeneration lease");
        }

        let token = LeaseToken(Uuid::now_v7().to_string());
        let claimed = match tx.execute(
            "INSERT INTO regeneration_locks (artifact_id, holder, acquired_at) VALUES (?1, ?2, ?3)",
            params![artifact_id.value() as i64, token.as_str(), now as i64],
        ) {
            Ok(_) => Some(token),
            Err(e) if is_constraint_violation(&e) => None,
            Err(e) => return Err(e.into()),
        };
        tx.commit()?;

        match &claimed {
            Some(_) => debug!(artifact_id = %artifact_id, "Claimed regeneration lease"),
            None => debug!(artifact_id = %artifact_id, "Regeneration lease held elsewhere"),
        }
        Ok(claimed)
    }

    /// Release a lease; a no-op if it expired and was taken over
    pub fn release_lease(
        &mut self,
        artifact_id: ArtifactId,
        token: &LeaseToken,
    ) -> Result<(), StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM regeneration_locks WHERE artifact_id = ?1 AND holder = ?2",
            params![artifact_id.value() as i64, token.as_str()],
        )?;
        if removed == 0 {
            warn!(artifact_id = %artifact_id, "Regeneration lease was already gone at release");
        } else {
            debug!(artifact_id = %artifact_id, "Released regeneration lease");
        }
        Ok(())
    }

    /// Whether any live lease exists for `artifact_id` as of `now`
    pub fn is_leased_at(&self, artifact_id: ArtifactId, now: u64) -> Result<bool, StoreError> {
        let cutoff = now.saturating_sub(self.lease_ttl.as_secs()) as i64;
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM regeneration_locks WHERE artifact_id = ?1 AND acquired_at > ?2",
            params![artifact_id.value() as i64, cutoff],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl ArtifactLease for SqliteStore {
    fn try_claim(
        &mut self,
        artifact_id: ArtifactId,
    ) -> Result<Option<LeaseToken>, VersionStoreError> {
        Ok(self.claim_lease(artifact_id)?)
    }

    fn release(
        &mut self,
        artifact_id: ArtifactId,
        token: &LeaseToken,
    ) -> Result<(), VersionStoreError> {
        Ok(self.release_lease(artifact_id, token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_second_claim_fails_until_release() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = ArtifactId::new(42);

        let token = store.claim_lease_at(id, NOW).unwrap().unwrap();
        assert!(store.claim_lease_at(id, NOW + 1).unwrap().is_none());
        assert!(store.is_leased_at(id, NOW + 1).unwrap());

        store.release_lease(id, &token).unwrap();
        assert!(!store.is_leased_at(id, NOW + 1).unwrap());
        assert!(store.claim_lease_at(id, NOW + 2).unwrap().is_some());
    }

    #[test]
    fn test_artifacts_are_independent() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        assert!(store.claim_lease_at(ArtifactId::new(1), NOW).unwrap().is_some());
        assert!(store.claim_lease_at(ArtifactId::new(2), NOW).unwrap().is_some());
    }

    #[test]
    fn test_abandoned_lease_expires() {
        let mut store =
            SqliteStore::new(":memory:").unwrap().with_lease_ttl(Duration::from_secs(60));
        let id = ArtifactId::new(7);
        let stale = store.claim_lease_at(id, NOW).unwrap().unwrap();

        assert!(store.claim_lease_at(id, NOW + 59).unwrap().is_none());
        let fresh = store.claim_lease_at(id, NOW + 60).unwrap().unwrap();
        assert_ne!(fresh, stale);

        // The old holder finishing late must not free the new holder's lease
        store.release_lease(id, &stale).unwrap();
        assert!(store.is_leased_at(id, NOW + 61).unwrap());
        assert!(store.claim_lease_at(id, NOW + 61).unwrap().is_none());
    }
}
