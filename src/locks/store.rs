//! The lock store client interface.

use super::record::LockRecord;
use crate::key::LockKey;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Result of a conditional create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// No record existed; ours is now stored.
    Created,
    /// A record (live or stale) already exists for the key.
    Exists,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Infrastructure failure of the lock store.
///
/// Never contention: a failed conditional check is reported as
/// [`CreateOutcome::Exists`], not as an error.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem or network I/O failed.
    #[error("lock store I/O failed at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored record could not be decoded.
    #[error("lock record '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// The backend cannot be reached or is misconfigured.
    #[error("lock store unavailable: {0}")]
    Unavailable(String),
}

/// A key/value store with one atomic conditional-write primitive.
///
/// Implementations must give linearizable create-if-absent semantics for a
/// single key. Nothing else in the crate serializes concurrent holders.
pub trait LockStore {
    /// Store `record` only if no record exists under its key.
    fn conditional_create(&self, record: &LockRecord) -> Result<CreateOutcome, StoreError>;

    /// Remove the record for `key`, whoever holds it.
    fn delete(&self, key: &LockKey) -> Result<DeleteOutcome, StoreError>;

    /// Read the record for `key`.
    fn get(&self, key: &LockKey) -> Result<Option<LockRecord>, StoreError>;

    /// All records, sorted by key.
    fn list(&self) -> Result<Vec<LockRecord>, StoreError>;

    /// Remove the record for `key` only if it is expired at `now`.
    ///
    /// A live record that replaced an expired one concurrently must survive.
    /// Returns whether a record was removed.
    fn delete_if_expired(&self, key: &LockKey, now: DateTime<Utc>) -> Result<bool, StoreError>;
}

impl<S: LockStore + ?Sized> LockStore for &S {
    fn conditional_create(&self, record: &LockRecord) -> Result<CreateOutcome, StoreError> {
        (**self).conditional_create(record)
    }

    fn delete(&self, key: &LockKey) -> Result<DeleteOutcome, StoreError> {
        (**self).delete(key)
    }

    fn get(&self, key: &LockKey) -> Result<Option<LockRecord>, StoreError> {
        (**self).get(key)
    }

    fn list(&self) -> Result<Vec<LockRecord>, StoreError> {
        (**self).list()
    }

    fn delete_if_expired(&self, key: &LockKey, now: DateTime<Utc>) -> Result<bool, StoreError> {
        (**self).delete_if_expired(key, now)
    }
}
