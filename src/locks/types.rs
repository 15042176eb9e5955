//! Lock manager outcomes and reporting structures.

use super::record::{LockRecord, format_remaining};
use crate::error::{GateError, Result};
use crate::key::LockKey;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an acquire attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// The lock is ours until the record expires or is released.
    Acquired(LockRecord),
    /// A record is present. `holder` is the blocking record when it could be
    /// read, and may itself be expired.
    AlreadyHeld { holder: Option<LockRecord> },
}

impl Acquisition {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Acquisition::Acquired(_))
    }
}

/// Outcome of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Released,
    /// Nothing to release. Not an error: release is idempotent.
    NotFound,
}

/// What acquire does when the record in its way has already expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Leave expired records to `sweep` (default). Acquire never evicts.
    #[default]
    Sweep,
    /// Evict an expired record and retry the create once.
    Reclaim,
}

/// Lock lifetime requested by a caller. Always at least one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttl {
    minutes: u32,
}

impl Ttl {
    /// Build a TTL from minutes; zero is malformed input.
    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(GateError::UserError(
                "ttl must be at least 1 minute".to_string(),
            ));
        }
        Ok(Self { minutes })
    }

    pub fn minutes(self) -> u32 {
        self.minutes
    }

    pub fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }
}

/// A stored record as seen at one instant.
#[derive(Debug, Clone)]
pub struct LockStatus {
    pub record: LockRecord,

    /// Whether the record had expired when listed.
    pub expired: bool,

    /// Time left before expiry (zero when expired).
    pub remaining: Duration,
}

impl LockStatus {
    pub fn at(record: LockRecord, now: DateTime<Utc>) -> Self {
        Self {
            expired: record.is_expired(now),
            remaining: record.remaining(now),
            record,
        }
    }

    /// Remaining time as `Xd Yh`, `Xh Ym` or `Xm`.
    pub fn remaining_string(&self) -> String {
        format_remaining(self.remaining)
    }
}

impl std::fmt::Display for LockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (owner: {}, expires: {}{})",
            self.record.lock_key,
            self.record.owner,
            self.record.expires_at_utc().format("%Y-%m-%d %H:%M:%S UTC"),
            if self.expired { ", EXPIRED" } else { "" }
        )
    }
}

/// Result of a stale-record sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Keys whose expired record was deleted.
    pub reclaimed: Vec<LockKey>,

    /// Records left in place because they are still live.
    pub live: usize,
}
