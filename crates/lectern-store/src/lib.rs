//! Lectern Storage Layer
//!
//! Implements the `VersionStore` and `QuotaLedger` traits on SQLite.
//!
//! # Architecture
//!
//! - `generation_records`: append-only version ledger, one active record per
//!   artifact enforced by a partial unique index, content immutability
//!   enforced by a trigger
//! - `quotas`: per-user allowance counters
//! - `regeneration_locks`: expiring per-artifact leases that keep concurrent
//!   processes from regenerating the same artifact
//!
//! All tables live in the same database file; [`SqliteStore`] and
//! [`SqliteQuotaLedger`] each open their own connection to it.
//!
//! # Examples
//!
//! ```no_run
//! use lectern_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for version operations
//! ```

#![warn(missing_docs)]

pub mod leases;
pub mod quota;
pub mod versions;

use lectern_domain::{ArtifactId, QuotaError, VersionStoreError};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub use leases::DEFAULT_LEASE_TTL;
pub use quota::{QuotaConfig, QuotaStatus, SqliteQuotaLedger};
pub use versions::SqliteStore;

/// Schema shared by every connection
pub(crate) const SCHEMA: &str = include_str!("schema.sql");

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Version not found
    #[error("Version {version} of artifact {artifact_id} not found")]
    NotFound {
        /// Artifact searched
        artifact_id: ArtifactId,
        /// Missing version
        version: u32,
    },

    /// Version already exists
    #[error("Version {version} of artifact {artifact_id} already exists")]
    Conflict {
        /// Artifact appended to
        artifact_id: ArtifactId,
        /// Colliding version
        version: u32,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON (de)serialization of a column failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for VersionStoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound {
                artifact_id,
                version,
            } => VersionStoreError::NotFound {
                artifact_id,
                version,
            },
            StoreError::Conflict {
                artifact_id,
                version,
            } => VersionStoreError::Conflict {
                artifact_id,
                version,
            },
            StoreError::InvalidData(msg) => VersionStoreError::InvalidData(msg),
            StoreError::Serialization(e) => VersionStoreError::InvalidData(e.to_string()),
            StoreError::Database(e) => VersionStoreError::Backend(e.to_string()),
        }
    }
}

impl From<StoreError> for QuotaError {
    fn from(e: StoreError) -> Self {
        QuotaError::Backend(e.to_string())
    }
}

/// Whether a SQLite error is a constraint violation (unique, primary key, check)
pub(crate) fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Current Unix time in seconds
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
