//! Acquire/release on top of a [`LockStore`].

use super::record::LockRecord;
use super::store::{CreateOutcome, DeleteOutcome, LockStore};
use super::types::{Acquisition, LockStatus, Release, StalePolicy, SweepReport, Ttl};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::key::LockKey;
use tracing::{info, warn};

/// TTL-based mutual exclusion keyed by [`LockKey`].
///
/// The manager never blocks and never retries on contention. Store failures
/// reach the caller unmodified. There is no renewal: a holder whose work
/// outlives its TTL may overlap with the next acquirer once the record is
/// removed.
pub struct LockManager<S, C = SystemClock> {
    store: S,
    clock: C,
    owner: String,
    stale_policy: StalePolicy,
}

impl<S: LockStore> LockManager<S, SystemClock> {
    /// Create a manager using wall-clock time.
    pub fn new(store: S, owner: impl Into<String>) -> Self {
        Self::with_clock(store, SystemClock, owner)
    }
}

impl<S: LockStore, C: Clock> LockManager<S, C> {
    /// Create a manager reading time from `clock`.
    pub fn with_clock(store: S, clock: C, owner: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            owner: owner.into(),
            stale_policy: StalePolicy::default(),
        }
    }

    /// Set what acquire does about expired records.
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Try to take the lock for `key` for `ttl`.
    pub fn acquire(&self, key: &LockKey, ttl: Ttl) -> Result<Acquisition> {
        let now = self.clock.now();
        let record = LockRecord::new(key.clone(), self.owner.clone(), now, ttl.as_duration());

        if self.store.conditional_create(&record)? == CreateOutcome::Created {
            info!(lock_key = %key, owner = %self.owner, ttl_minutes = ttl.minutes(), "lock acquired");
            return Ok(Acquisition::Acquired(record));
        }

        if self.stale_policy == StalePolicy::Reclaim && self.store.delete_if_expired(key, now)? {
            info!(lock_key = %key, "reclaimed expired lock record");
            if self.store.conditional_create(&record)? == CreateOutcome::Created {
                info!(lock_key = %key, owner = %self.owner, ttl_minutes = ttl.minutes(), "lock acquired");
                return Ok(Acquisition::Acquired(record));
            }
        }

        let holder = self.holder(key);
        info!(
            lock_key = %key,
            holder = holder.as_ref().map(|h| h.owner.as_str()).unwrap_or("unknown"),
            "lock already held"
        );
        Ok(Acquisition::AlreadyHeld { holder })
    }

    /// Delete the record for `key`. Ownership is not checked.
    pub fn release(&self, key: &LockKey) -> Result<Release> {
        match self.store.delete(key)? {
            DeleteOutcome::Deleted => {
                info!(lock_key = %key, "lock released");
                Ok(Release::Released)
            }
            DeleteOutcome::NotFound => {
                info!(lock_key = %key, "no lock to release");
                Ok(Release::NotFound)
            }
        }
    }

    /// Every stored record with its expiry state.
    pub fn list(&self) -> Result<Vec<LockStatus>> {
        let now = self.clock.now();
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|record| LockStatus::at(record, now))
            .collect())
    }

    /// Delete every expired record, leaving live ones alone.
    pub fn sweep(&self) -> Result<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for record in self.store.list()? {
            if !record.is_expired(now) {
                report.live += 1;
                continue;
            }
            if self.store.delete_if_expired(&record.lock_key, now)? {
                info!(lock_key = %record.lock_key, owner = %record.owner, "swept expired lock");
                report.reclaimed.push(record.lock_key);
            }
        }

        Ok(report)
    }

    /// Best-effort read of the record blocking an acquire.
    fn holder(&self, key: &LockKey) -> Option<LockRecord> {
        match self.store.get(key) {
            Ok(holder) => holder,
            Err(e) => {
                warn!(lock_key = %key, error = %e, "could not read lock holder");
                None
            }
        }
    }
}
