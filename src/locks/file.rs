//! Directory-backed lock store.
//!
//! Each record lives in `<dir>/<lockKey>.lock` as a JSON document. The
//! conditional create writes the record to a private scratch file, syncs it,
//! then hard-links it into place. `link(2)` fails when the target exists, so
//! the filesystem performs the compare-and-set and readers never observe a
//! half-written record.
//!
//! Expired records are removed in place, never moved aside. Reclaimers of a
//! key take turns through an exclusive `.<lockKey>.reclaim` guard file and
//! delete only the file they read.

use super::record::LockRecord;
use super::store::{CreateOutcome, DeleteOutcome, LockStore, StoreError};
use crate::key::LockKey;
use chrono::{DateTime, Utc};
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// File extension of live lock records.
const LOCK_EXTENSION: &str = "lock";

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Lock store keeping one file per record inside a lock table directory.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    dir: PathBuf,
}

impl FileLockStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The lock table directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &LockKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key, LOCK_EXTENSION))
    }

    /// A unique path next to the records. Keys never start with `.`, so
    /// scratch names cannot collide with a record.
    fn scratch_path(&self, key: &LockKey, purpose: &str) -> PathBuf {
        let seq = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        self.dir.join(format!(
            ".{}.{}.{}.{}.{}",
            key,
            std::process::id(),
            nanos,
            seq,
            purpose
        ))
    }

    /// Guard file serializing reclaimers of `key`.
    fn reclaim_guard_path(&self, key: &LockKey) -> PathBuf {
        self.dir.join(format!(".{}.reclaim", key))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if self.dir.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))
    }

    fn write_scratch(&self, path: &Path, record: &LockRecord) -> Result<(), StoreError> {
        let json = record.to_json().map_err(|e| StoreError::Corrupt {
            key: record.lock_key.to_string(),
            reason: e.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| io_error(path, e))?;

        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| io_error(path, e))
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read one record file. A missing file reads as `None`.
fn read_record(path: &Path, key: &str) -> Result<Option<LockRecord>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };

    parse_record(&content, key).map(Some)
}

fn parse_record(content: &str, key: &str) -> Result<LockRecord, StoreError> {
    serde_json::from_str(content).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    a.len() == b.len()
        && a.modified().ok() == b.modified().ok()
        && a.created().ok() == b.created().ok()
}

/// Exclusive right to reclaim one key, released on drop.
struct ReclaimGuard {
    path: PathBuf,
}

impl ReclaimGuard {
    /// `None` when another reclaimer holds the guard or the table is gone.
    fn try_acquire(path: PathBuf) -> Result<Option<Self>, StoreError> {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Some(Self { path })),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

impl Drop for ReclaimGuard {
    fn drop(&mut self) {
        remove_quietly(&self.path);
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove temporary file");
    }
}

impl LockStore for FileLockStore {
    fn conditional_create(&self, record: &LockRecord) -> Result<CreateOutcome, StoreError> {
        self.ensure_dir()?;

        let target = self.record_path(&record.lock_key);
        let scratch = self.scratch_path(&record.lock_key, "tmp");

        if let Err(e) = self.write_scratch(&scratch, record) {
            remove_quietly(&scratch);
            return Err(e);
        }

        let linked = fs::hard_link(&scratch, &target);
        remove_quietly(&scratch);

        match linked {
            Ok(()) => Ok(CreateOutcome::Created),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(CreateOutcome::Exists),
            Err(e) => Err(io_error(&target, e)),
        }
    }

    fn delete(&self, key: &LockKey) -> Result<DeleteOutcome, StoreError> {
        let path = self.record_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DeleteOutcome::NotFound),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn get(&self, key: &LockKey) -> Result<Option<LockRecord>, StoreError> {
        read_record(&self.record_path(key), key.as_str())
    }

    fn list(&self) -> Result<Vec<LockRecord>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.dir, e))?;
            let path = entry.path();

            // Skip scratch files and anything else that is not a record
            if path.extension().and_then(|e| e.to_str()) != Some(LOCK_EXTENSION) {
                continue;
            }
            let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

            match read_record(&path, name) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {} // released while listing
                Err(e) => warn!(error = %e, "skipping unreadable lock record"),
            }
        }

        records.sort_by(|a, b| a.lock_key.cmp(&b.lock_key));
        Ok(records)
    }

    fn delete_if_expired(&self, key: &LockKey, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let path = self.record_path(key);
        match read_record(&path, key.as_str())? {
            Some(record) if record.is_expired(now) => {}
            _ => return Ok(false),
        }

        let Some(_guard) = ReclaimGuard::try_acquire(self.reclaim_guard_path(key))? else {
            debug!(lock_key = %key, "another reclaimer holds the guard");
            return Ok(false);
        };

        // Re-read under the guard: the record we saw may already be gone or replaced.
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_error(&path, e)),
        };
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| io_error(&path, e))?;
        if !parse_record(&content, key.as_str())?.is_expired(now) {
            return Ok(false);
        }

        let opened = file.metadata().map_err(|e| io_error(&path, e))?;
        let current = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_error(&path, e)),
        };
        if !same_file(&opened, &current) {
            debug!(lock_key = %key, "stale record was replaced concurrently; leaving it");
            return Ok(false);
        }

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
