//! SQLite-backed version ledger

use crate::leases::DEFAULT_LEASE_TTL;
use crate::{is_constraint_violation, unix_now, StoreError, SCHEMA};
use lectern_domain::{
    ArtifactId, GenerationRecord, NewRecord, VersionStore, VersionStoreError, VoiceMap,
};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const RECORD_COLUMNS: &str = "artifact_id, version, content, prompt, context_snapshot, \
     voice_config, is_active, created_at, metadata";

/// SQLite-based implementation of VersionStore
///
/// Appends and activations run in `IMMEDIATE` transactions so that two
/// connections to the same file serialize on the write lock instead of both
/// reading the same `MAX(version)`. If they still collide the primary key
/// rejects the second insert and the caller sees `Conflict`.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between threads
/// behind a `Mutex`, or give each thread its own instance.
pub struct SqliteStore {
    pub(crate) conn: Connection,
    pub(crate) lease_ttl: Duration,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lectern_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("lectern.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            lease_ttl: DEFAULT_LEASE_TTL,
        })
    }

    /// Age after which an unreleased regeneration lease counts as abandoned
    pub fn with_lease_ttl(mut self, ttl: Duration) -> Self {
        self.lease_ttl = ttl;
        self
    }

    /// All versions of an artifact, oldest first
    pub fn versions(&self, artifact_id: ArtifactId) -> Result<Vec<GenerationRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM generation_records WHERE artifact_id = ?1 ORDER BY version ASC",
            RECORD_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![artifact_id.value() as i64], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// The newest `limit` versions, oldest first
    pub fn recent(
        &self,
        artifact_id: ArtifactId,
        limit: usize,
    ) -> Result<Vec<GenerationRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM generation_records WHERE artifact_id = ?1 \
             ORDER BY version DESC LIMIT ?2",
            RECORD_COLUMNS
        ))?;
        let mut records = stmt
            .query_map(params![artifact_id.value() as i64, limit as i64], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        records.reverse();
        Ok(records)
    }

    /// The active version of an artifact
    pub fn active(&self, artifact_id: ArtifactId) -> Result<Option<GenerationRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM generation_records WHERE artifact_id = ?1 AND is_active = 1",
                    RECORD_COLUMNS
                ),
                params![artifact_id.value() as i64],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Append the next version and make it the active one
    pub fn append_record(
        &mut self,
        artifact_id: ArtifactId,
        record: NewRecord,
    ) -> Result<GenerationRecord, StoreError> {
        let now = unix_now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let max: Option<i64> = tx.query_row(
            "SELECT MAX(version) FROM generation_records WHERE artifact_id = ?1",
            params![artifact_id.value() as i64],
            |row| row.get(0),
        )?;
        let version = u32::try_from(max.unwrap_or(0) + 1).map_err(|_| {
            StoreError::InvalidData(format!("Version overflow for artifact {}", artifact_id))
        })?;

        tx.execute(
            "UPDATE generation_records SET is_active = 0 WHERE artifact_id = ?1 AND is_active = 1",
            params![artifact_id.value() as i64],
        )?;
        let created = insert_record(&tx, artifact_id, version, record, now)?;
        tx.commit()?;

        debug!(artifact_id = %artifact_id, version, "Appended generation record");
        Ok(created)
    }

    /// Move the active flag to an existing version
    pub fn activate_version(
        &mut self,
        artifact_id: ArtifactId,
        version: u32,
    ) -> Result<GenerationRecord, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM generation_records WHERE artifact_id = ?1 AND version = ?2",
                params![artifact_id.value() as i64, version as i64],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::NotFound {
                artifact_id,
                version,
            });
        }

        tx.execute(
            "UPDATE generation_records SET is_active = 0 WHERE artifact_id = ?1 AND is_active = 1",
            params![artifact_id.value() as i64],
        )?;
        tx.execute(
            "UPDATE generation_records SET is_active = 1 WHERE artifact_id = ?1 AND version = ?2",
            params![artifact_id.value() as i64, version as i64],
        )?;
        let record = tx.query_row(
            &format!(
                "SELECT {} FROM generation_records WHERE artifact_id = ?1 AND version = ?2",
                RECORD_COLUMNS
            ),
            params![artifact_id.value() as i64, version as i64],
            row_to_record,
        )?;
        tx.commit()?;

        debug!(artifact_id = %artifact_id, version, "Activated generation record");
        Ok(record)
    }
}

impl VersionStore for SqliteStore {
    fn list_versions(
        &self,
        artifact_id: ArtifactId,
    ) -> Result<Vec<GenerationRecord>, VersionStoreError> {
        Ok(self.versions(artifact_id)?)
    }

    fn recent_versions(
        &self,
        artifact_id: ArtifactId,
        limit: usize,
    ) -> Result<Vec<GenerationRecord>, VersionStoreError> {
        Ok(self.recent(artifact_id, limit)?)
    }

    fn get_active(
        &self,
        artifact_id: ArtifactId,
    ) -> Result<Option<GenerationRecord>, VersionStoreError> {
        Ok(self.active(artifact_id)?)
    }

    fn append(
        &mut self,
        artifact_id: ArtifactId,
        record: NewRecord,
    ) -> Result<GenerationRecord, VersionStoreError> {
        Ok(self.append_record(artifact_id, record)?)
    }

    fn activate(
        &mut self,
        artifact_id: ArtifactId,
        version: u32,
    ) -> Result<GenerationRecord, VersionStoreError> {
        Ok(self.activate_version(artifact_id, version)?)
    }
}

/// Insert one active record; a key or index collision becomes `Conflict`
fn insert_record(
    conn: &Connection,
    artifact_id: ArtifactId,
    version: u32,
    record: NewRecord,
    created_at: u64,
) -> Result<GenerationRecord, StoreError> {
    let content = serde_json::to_string(&record.content)?;
    let voice_config = record
        .voice_config
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let metadata = serde_json::to_string(&record.metadata)?;

    conn.execute(
        &format!(
            "INSERT INTO generation_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)",
            RECORD_COLUMNS
        ),
        params![
            artifact_id.value() as i64,
            version as i64,
            &content,
            &record.prompt,
            &record.context_snapshot,
            &voice_config,
            created_at as i64,
            &metadata,
        ],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            StoreError::Conflict {
                artifact_id,
                version,
            }
        } else {
            StoreError::Database(e)
        }
    })?;

    Ok(GenerationRecord {
        artifact_id,
        version,
        content: record.content,
        prompt: record.prompt,
        context_snapshot: record.context_snapshot,
        voice_config: record.voice_config,
        is_active: true,
        created_at,
        metadata: record.metadata,
    })
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<GenerationRecord> {
    let voice_config: Option<String> = row.get(5)?;
    let voice_config = voice_config
        .map(|text| serde_json::from_str::<VoiceMap>(&text))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(GenerationRecord {
        artifact_id: ArtifactId::new(row.get::<_, i64>(0)? as u64),
        version: row.get::<_, i64>(1)? as u32,
        content: json_column(row, 2)?,
        prompt: row.get(3)?,
        context_snapshot: row.get(4)?,
        voice_config,
        is_active: row.get::<_, i64>(6)? == 1,
        created_at: row.get::<_, i64>(7)? as u64,
        metadata: json_column(row, 8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::{FillBlankQuestion, UnitDocument};

    fn unit(answer: &str) -> UnitDocument {
        UnitDocument::FillBlank(FillBlankQuestion {
            sentence: "I ___ to school every day.".to_string(),
            answer: answer.to_string(),
            explanation: String::new(),
        })
    }

    #[test]
    fn test_version_collision_is_conflict() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let artifact = ArtifactId::new(1);
        store
            .append_record(artifact, NewRecord::new(vec![unit("go")]))
            .unwrap();

        // Simulate a second writer that read the same MAX(version)
        let tx = store.conn.transaction().unwrap();
        tx.execute(
            "UPDATE generation_records SET is_active = 0 WHERE artifact_id = 1",
            [],
        )
        .unwrap();
        let result = insert_record(&tx, artifact, 1, NewRecord::new(vec![unit("walk")]), 0);
        assert!(matches!(
            result,
            Err(StoreError::Conflict { version: 1, .. })
        ));
    }

    #[test]
    fn test_second_active_record_is_rejected() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let artifact = ArtifactId::new(1);
        store
            .append_record(artifact, NewRecord::new(vec![unit("go")]))
            .unwrap();

        // Skipping the deactivation step must trip the partial unique index
        let result = insert_record(&store.conn, artifact, 2, NewRecord::new(vec![unit("x")]), 0);
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[test]
    fn test_content_is_immutable() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store
            .append_record(ArtifactId::new(1), NewRecord::new(vec![unit("go")]))
            .unwrap();

        let result = store.conn.execute(
            "UPDATE generation_records SET content = '[]' WHERE artifact_id = 1",
            [],
        );
        assert!(result.is_err(), "trigger should reject content updates");

        let result = store.conn.execute(
            "UPDATE generation_records SET prompt = 'edited' WHERE artifact_id = 1",
            [],
        );
        assert!(result.is_err(), "trigger should reject prompt updates");

        let record = store.active(ArtifactId::new(1)).unwrap().unwrap();
        assert_eq!(record.content, vec![unit("go")]);
    }
}
