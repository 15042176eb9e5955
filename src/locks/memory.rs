//! In-process lock store.

use super::record::LockRecord;
use super::store::{CreateOutcome, DeleteOutcome, LockStore, StoreError};
use crate::key::LockKey;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Mutex-guarded map of lock records.
///
/// Every operation runs under one mutex, which makes the store linearizable.
#[derive(Debug, Default)]
pub struct InMemoryLockStore {
    records: Mutex<BTreeMap<LockKey, LockRecord>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, BTreeMap<LockKey, LockRecord>> {
        // A panic while holding the guard cannot leave a half-written record.
        self.records.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl LockStore for InMemoryLockStore {
    fn conditional_create(&self, record: &LockRecord) -> Result<CreateOutcome, StoreError> {
        let mut records = self.records();
        if records.contains_key(&record.lock_key) {
            return Ok(CreateOutcome::Exists);
        }
        records.insert(record.lock_key.clone(), record.clone());
        Ok(CreateOutcome::Created)
    }

    fn delete(&self, key: &LockKey) -> Result<DeleteOutcome, StoreError> {
        match self.records().remove(key) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    fn get(&self, key: &LockKey) -> Result<Option<LockRecord>, StoreError> {
        Ok(self.records().get(key).cloned())
    }

    fn list(&self) -> Result<Vec<LockRecord>, StoreError> {
        Ok(self.records().values().cloned().collect())
    }

    fn delete_if_expired(&self, key: &LockKey, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut records = self.records();
        match records.get(key) {
            Some(record) if record.is_expired(now) => {
                records.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
