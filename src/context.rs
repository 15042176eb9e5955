//! Run context resolution for buildgate.
//!
//! Every command resolves one [`RunContext`] at entry: the effective config
//! plus the on-disk layout under the state directory.
//!
//! ```text
//! <state>/config.yaml                 optional config file
//! <state>/locks/<lock_table>/         one `<key>.lock` per held lock
//! <state>/events/dispatch.ndjson      emitted dispatch events
//! ```

use crate::config::Config;
use crate::error::Result;
use crate::events::NdjsonEventSink;
use crate::locks::{FileLockStore, LockManager, default_owner};
use std::path::{Path, PathBuf};

/// Default state directory, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".buildgate";

/// Resolved config and paths for one invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,

    /// Root of all buildgate state.
    pub state_dir: PathBuf,

    /// Directory of the configured lock table.
    pub locks_dir: PathBuf,

    /// Event log written by the NDJSON sink.
    pub events_file: PathBuf,

    /// Owner recorded on acquired locks and emitted events.
    pub owner: String,
}

impl RunContext {
    /// Lay out paths for an already-resolved config.
    ///
    /// The owner is the configured one (which the environment overlay fills
    /// from the run id), falling back to `user@host`.
    pub fn new(config: Config, state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        let locks_dir = state_dir.join("locks").join(&config.lock_table);
        let events_file = state_dir.join("events").join("dispatch.ndjson");
        let owner = config.owner.clone().unwrap_or_else(default_owner);

        Self {
            config,
            state_dir,
            locks_dir,
            events_file,
            owner,
        }
    }

    /// Resolve config and layout from command-line paths and `env`.
    ///
    /// Without an explicit config path, `<state>/config.yaml` is used when it
    /// exists; otherwise the defaults apply.
    pub fn resolve<F>(config_path: Option<&Path>, state_dir: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let state_dir = state_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        let default_config = state_dir.join("config.yaml");
        let config_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None if default_config.is_file() => Some(default_config),
            None => None,
        };

        let config = Config::resolve(config_path.as_deref(), env)?;
        Ok(Self::new(config, state_dir))
    }

    /// Resolve against the process environment.
    pub fn from_process(config_path: Option<&Path>, state_dir: Option<&Path>) -> Result<Self> {
        Self::resolve(config_path, state_dir, |name| std::env::var(name).ok())
    }

    /// Get the path to the config file inside the state directory.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join("config.yaml")
    }

    pub fn lock_store(&self) -> FileLockStore {
        FileLockStore::new(&self.locks_dir)
    }

    /// A lock manager over the configured table, with the configured stale policy.
    pub fn lock_manager(&self) -> LockManager<FileLockStore> {
        LockManager::new(self.lock_store(), self.owner.clone())
            .with_stale_policy(self.config.stale_policy)
    }

    pub fn event_sink(&self) -> NdjsonEventSink {
        NdjsonEventSink::new(&self.events_file, self.owner.clone())
    }
}
