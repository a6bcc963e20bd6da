//! SQLite-backed quota ledger
//!
//! Allowance rules, checked in order:
//!
//! 1. An unexpired subscription allows unlimited use
//! 2. Purchased credits are consumed next
//! 3. Then the free daily allowance
//! 4. Otherwise the request is refused
//!
//! Free allowances are counted per UTC day (`unix_seconds / 86400`). A
//! counter from an earlier day is treated as zero on read, so a missed
//! janitor sweep never locks a user out.

use crate::{unix_now, StoreError, SCHEMA};
use lectern_domain::{
    QuotaError, QuotaLedger, QuotaMaintenance, QuotaReceipt, QuotaSource, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const SECONDS_PER_DAY: u64 = 86_400;

/// Quota ledger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Free generations per user per day
    pub free_daily_limit: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_daily_limit: 10,
        }
    }
}

/// Snapshot of a user's allowance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// User
    pub user_id: UserId,
    /// Free generations left today
    pub free_remaining: u32,
    /// Purchased credits left
    pub purchased_remaining: u32,
    /// Subscription end (seconds since Unix epoch), if any
    pub subscription_expires_at: Option<u64>,
    /// Whether an unexpired subscription is active
    pub unlimited: bool,
}

/// Day number of a Unix timestamp
pub fn day_of(unix_seconds: u64) -> u64 {
    unix_seconds / SECONDS_PER_DAY
}

struct QuotaRow {
    free_used: u32,
    free_day: u64,
    purchased_remaining: u32,
    subscription_expires_at: Option<u64>,
}

impl QuotaRow {
    fn free_used_on(&self, day: u64) -> u32 {
        if self.free_day < day {
            0
        } else {
            self.free_used
        }
    }

    fn subscribed_at(&self, now: u64) -> bool {
        self.subscription_expires_at.is_some_and(|end| end > now)
    }
}

/// SQLite-based implementation of QuotaLedger
pub struct SqliteQuotaLedger {
    conn: Connection,
    config: QuotaConfig,
}

impl SqliteQuotaLedger {
    /// Open the ledger in the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P, config: QuotaConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, config })
    }

    /// Ledger configuration
    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Consume one unit at the given time
    pub fn consume_one_at(&mut self, user_id: UserId, now: u64) -> Result<QuotaReceipt, QuotaError> {
        let day = day_of(now);
        let limit = self.config.free_daily_limit;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let row = load_or_create(&tx, user_id, day, now)?;

        let source = if row.subscribed_at(now) {
            QuotaSource::Subscription
        } else if row.purchased_remaining > 0 {
            tx.execute(
                "UPDATE quotas SET purchased_remaining = purchased_remaining - 1, updated_at = ?2
                 WHERE user_id = ?1",
                params![user_id.value() as i64, now as i64],
            )
            .map_err(StoreError::from)?;
            QuotaSource::Purchased
        } else if row.free_used_on(day) < limit {
            tx.execute(
                "UPDATE quotas SET free_used = ?2, free_day = ?3, updated_at = ?4 WHERE user_id = ?1",
                params![
                    user_id.value() as i64,
                    row.free_used_on(day) + 1,
                    day as i64,
                    now as i64
                ],
            )
            .map_err(StoreError::from)?;
            QuotaSource::FreeDaily
        } else {
            info!(user_id = %user_id, limit, "Quota exceeded");
            return Err(QuotaError::Exceeded {
                user_id,
                reason: format!("free daily allowance of {} used up", limit),
            });
        };

        tx.commit().map_err(StoreError::from)?;
        debug!(user_id = %user_id, ?source, "Consumed quota unit");
        Ok(QuotaReceipt {
            user_id,
            source,
            consumed_at: now,
        })
    }

    /// Add purchased credits
    pub fn grant_credits(&mut self, user_id: UserId, credits: u32) -> Result<QuotaStatus, QuotaError> {
        let now = unix_now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        load_or_create(&tx, user_id, day_of(now), now)?;
        tx.execute(
            "UPDATE quotas SET purchased_remaining = purchased_remaining + ?2, updated_at = ?3
             WHERE user_id = ?1",
            params![user_id.value() as i64, credits, now as i64],
        )
        .map_err(StoreError::from)?;
        tx.commit().map_err(StoreError::from)?;

        info!(user_id = %user_id, credits, "Granted credits");
        self.status_at(user_id, now)
    }

    /// Activate (or extend) a subscription until `expires_at`
    pub fn activate_subscription(
        &mut self,
        user_id: UserId,
        expires_at: u64,
    ) -> Result<QuotaStatus, QuotaError> {
        let now = unix_now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        load_or_create(&tx, user_id, day_of(now), now)?;
        tx.execute(
            "UPDATE quotas SET subscription_expires_at = MAX(COALESCE(subscription_expires_at, 0), ?2),
             updated_at = ?3 WHERE user_id = ?1",
            params![user_id.value() as i64, expires_at as i64, now as i64],
        )
        .map_err(StoreError::from)?;
        tx.commit().map_err(StoreError::from)?;

        info!(user_id = %user_id, expires_at, "Activated subscription");
        self.status_at(user_id, now)
    }

    /// Current allowance of a user
    pub fn status(&self, user_id: UserId) -> Result<QuotaStatus, QuotaError> {
        self.status_at(user_id, unix_now())
    }

    /// Allowance of a user at the given time
    pub fn status_at(&self, user_id: UserId, now: u64) -> Result<QuotaStatus, QuotaError> {
        let limit = self.config.free_daily_limit;
        let row = load(&self.conn, user_id)?;
        let status = match row {
            Some(row) => QuotaStatus {
                user_id,
                free_remaining: limit.saturating_sub(row.free_used_on(day_of(now))),
                purchased_remaining: row.purchased_remaining,
                subscription_expires_at: row.subscription_expires_at,
                unlimited: row.subscribed_at(now),
            },
            None => QuotaStatus {
                user_id,
                free_remaining: limit,
                purchased_remaining: 0,
                subscription_expires_at: None,
                unlimited: false,
            },
        };
        Ok(status)
    }
}

impl QuotaLedger for SqliteQuotaLedger {
    fn consume_one(&mut self, user_id: UserId) -> Result<QuotaReceipt, QuotaError> {
        self.consume_one_at(user_id, unix_now())
    }

    fn refund(&mut self, receipt: &QuotaReceipt) -> Result<(), QuotaError> {
        let user = receipt.user_id.value() as i64;
        let now = unix_now() as i64;
        match receipt.source {
            QuotaSource::Subscription => {}
            QuotaSource::Purchased => {
                self.conn
                    .execute(
                        "UPDATE quotas SET purchased_remaining = purchased_remaining + 1,
                         updated_at = ?2 WHERE user_id = ?1",
                        params![user, now],
                    )
                    .map_err(StoreError::from)?;
            }
            QuotaSource::FreeDaily => {
                // A refund after the day rolled over has nothing left to give back
                self.conn
                    .execute(
                        "UPDATE quotas SET free_used = free_used - 1, updated_at = ?3
                         WHERE user_id = ?1 AND free_day = ?2 AND free_used > 0",
                        params![user, day_of(receipt.consumed_at) as i64, now],
                    )
                    .map_err(StoreError::from)?;
            }
        }
        debug!(user_id = %receipt.user_id, source = ?receipt.source, "Refunded quota unit");
        Ok(())
    }
}

impl QuotaMaintenance for SqliteQuotaLedger {
    fn count_stale_allowances(&self, day: u64) -> Result<usize, QuotaError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM quotas WHERE free_day < ?1",
                params![day as i64],
                |row| row.get(0),
            )
            .map_err(StoreError::from)?;
        Ok(count as usize)
    }

    fn reset_daily_allowances(&mut self, day: u64) -> Result<usize, QuotaError> {
        let reset = self
            .conn
            .execute(
                "UPDATE quotas SET free_used = 0, free_day = ?1, updated_at = ?2 WHERE free_day < ?1",
                params![day as i64, unix_now() as i64],
            )
            .map_err(StoreError::from)?;
        Ok(reset)
    }
}

fn load(conn: &Connection, user_id: UserId) -> Result<Option<QuotaRow>, StoreError> {
    let row = conn
        .query_row(
            "SELECT free_used, free_day, purchased_remaining, subscription_expires_at
             FROM quotas WHERE user_id = ?1",
            params![user_id.value() as i64],
            |row| {
                let expires: Option<i64> = row.get(3)?;
                Ok(QuotaRow {
                    free_used: row.get(0)?,
                    free_day: row.get::<_, i64>(1)? as u64,
                    purchased_remaining: row.get(2)?,
                    subscription_expires_at: expires.map(|t| t as u64),
                })
            },
        )
        .optional()?;
    Ok(row)
}

fn load_or_create(
    tx: &Transaction<'_>,
    user_id: UserId,
    day: u64,
    now: u64,
) -> Result<QuotaRow, StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO quotas (user_id, free_used, free_day, purchased_remaining, updated_at)
         VALUES (?1, 0, ?2, 0, ?3)",
        params![user_id.value() as i64, day as i64, now as i64],
    )?;
    load(tx, user_id)?.ok_or_else(|| {
        StoreError::InvalidData(format!("Quota row for user {} vanished", user_id))
    })
}
