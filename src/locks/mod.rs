//! Locking subsystem for buildgate.
//!
//! This module implements the TTL-based mutual exclusion that keeps an
//! initial build and a feedback-driven rebuild of the same issue from
//! running at the same time:
//! - [`LockStore`]: a key/value store with one atomic conditional create
//! - [`LockManager`]: acquire/release with TTL and ownership policy
//!
//! # Lock Records
//!
//! Each record carries:
//! - `lockKey`: the protected resource
//! - `expiresAt`: epoch seconds after which the lock is abandoned
//! - `owner`: the run that took it (informational, not access control)
//!
//! # Stale Records
//!
//! The conditional create does not look at `expiresAt`. An expired record
//! keeps blocking acquires until it is released or swept, unless the manager
//! runs with [`StalePolicy::Reclaim`].

mod file;
mod manager;
mod memory;
mod record;
mod store;
mod types;


// Re-export public API
pub use file::FileLockStore;
pub use manager::LockManager;
pub use memory::InMemoryLockStore;
pub use record::LockRecord;
pub(crate) use record::default_owner;
pub use store::{CreateOutcome, DeleteOutcome, LockStore, StoreError};
pub use types::{Acquisition, LockStatus, Release, StalePolicy, SweepReport, Ttl};
