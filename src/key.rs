//! Work item identity and lock key derivation.
//!
//! The dispatch coordinator, the feedback pathway and the downstream runner
//! compute lock keys independently. They all go through
//! [`LockKey::for_work_item`], so the same `(source, work item)` pair always
//! yields the same key.

use crate::error::{GateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed namespace segment embedded in every work item lock key.
pub const LOCK_NAMESPACE: &str = "issue";

/// Maximum length of a lock key in bytes.
const MAX_KEY_LEN: usize = 200;

/// Identifier of a work item (issue or pull request number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(u64);

impl WorkItemId {
    /// Create a work item id. Zero is not a valid issue number.
    pub fn new(number: u64) -> Result<Self> {
        if number == 0 {
            return Err(GateError::UserError(
                "work item number must be greater than 0".to_string(),
            ));
        }
        Ok(Self(number))
    }

    /// The raw number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the external source (an `owner/repo` pair).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    owner: String,
    repo: String,
}

impl SourceId {
    /// Parse an `owner/repo` string.
    ///
    /// Both halves must be non-empty and use only `[A-Za-z0-9._-]`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || {
            GateError::UserError(format!(
                "invalid repository '{}': expected 'owner/repo' using letters, digits, '.', '_' or '-'",
                s
            ))
        };

        let (owner, repo) = s.split_once('/').ok_or_else(invalid)?;
        if !is_name(owner) || !is_name(repo) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_key_char)
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Identifier of a protected resource.
///
/// Keys double as file names in the directory-backed store, so the accepted
/// alphabet is `[A-Za-z0-9._-]` and a key may not start with `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LockKey(String);

impl LockKey {
    /// Validate a caller-supplied lock key.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(GateError::UserError("lock key must not be empty".to_string()));
        }
        if s.len() > MAX_KEY_LEN {
            return Err(GateError::UserError(format!(
                "lock key is {} bytes long; the limit is {}",
                s.len(),
                MAX_KEY_LEN
            )));
        }
        if s.starts_with('.') {
            return Err(GateError::UserError(format!(
                "lock key '{}' must not start with '.'",
                s
            )));
        }
        if let Some(bad) = s.chars().find(|c| !is_key_char(*c)) {
            return Err(GateError::UserError(format!(
                "lock key '{}' contains invalid character {:?}",
                s, bad
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Derive the lock key guarding a work item: `{owner}_{repo}_issue_{id}`.
    pub fn for_work_item(source: &SourceId, item: WorkItemId) -> Self {
        Self(format!(
            "{}_{}_{}_{}",
            source.owner, source.repo, LOCK_NAMESPACE, item
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LockKey {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LockKey> for String {
    fn from(key: LockKey) -> Self {
        key.0
    }
}
