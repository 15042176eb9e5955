//! The persisted lock record and its time helpers.

use crate::key::LockKey;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One lock held on one resource.
///
/// Persisted as `{ lockKey, expiresAt (epoch seconds), owner }`. A record whose
/// `expiresAt` has passed is logically absent even while it is physically
/// present; the store's conditional create does not look at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    /// The protected resource.
    pub lock_key: LockKey,

    /// Absolute expiry, in seconds since the Unix epoch.
    pub expires_at: i64,

    /// Holder (run or session id). Informational only.
    pub owner: String,
}

impl LockRecord {
    /// Create a record expiring `ttl` after `now`.
    pub fn new(lock_key: LockKey, owner: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            lock_key,
            expires_at: (now + ttl).timestamp(),
            owner: owner.into(),
        }
    }

    /// Expiry as a timestamp.
    pub fn expires_at_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.expires_at, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the record is abandoned at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let left = self.expires_at - now.timestamp();
        Duration::seconds(left.max(0))
    }

    /// Format the remaining time as a human-readable string.
    pub fn remaining_string(&self, now: DateTime<Utc>) -> String {
        format_remaining(self.remaining(now))
    }

    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Format a duration as `Xd Yh`, `Xh Ym` or `Xm`.
pub(crate) fn format_remaining(left: Duration) -> String {
    let minutes = left.num_minutes();
    let hours = left.num_hours();
    let days = left.num_days();

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}

/// Default owner string when no run id is configured (`user@HOST`).
pub(crate) fn default_owner() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
