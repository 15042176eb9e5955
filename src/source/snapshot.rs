//! Issue source backed by a JSON snapshot of the tracker.
//!
//! ```json
//! {"issues": [{"number": 42, "title": "...", "state": "open",
//!   "labels": [{"name": "autobuild"}],
//!   "reactions": [{"user": {"login": "alice"}, "content": "rocket"}]}]}
//! ```

use super::{IssueSource, RawIssue, RawReaction, SourceError};
use crate::key::WorkItemId;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    issues: Vec<SnapshotIssue>,
}

#[derive(Debug, Deserialize)]
struct SnapshotIssue {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default = "default_state")]
    state: String,
    #[serde(default)]
    labels: Vec<SnapshotLabel>,
    #[serde(default)]
    reactions: Vec<SnapshotReaction>,
}

fn default_state() -> String {
    "open".to_string()
}

#[derive(Debug, Deserialize)]
struct SnapshotLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SnapshotReaction {
    #[serde(default)]
    user: Option<SnapshotUser>,
    content: String,
}

#[derive(Debug, Deserialize)]
struct SnapshotUser {
    login: Option<String>,
}

/// One issue as held in memory, with its number validated.
#[derive(Debug)]
struct Issue {
    number: WorkItemId,
    title: String,
    open: bool,
    labels: Vec<String>,
    reactions: Vec<RawReaction>,
}

/// Issues and reactions captured from the tracker at one point in time.
#[derive(Debug)]
pub struct SnapshotSource {
    issues: Vec<Issue>,
}

impl SnapshotSource {
    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    /// Parse snapshot JSON; `origin` names the input in errors.
    pub fn from_json(content: &str, origin: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let origin = origin.into();
        let snapshot: Snapshot =
            serde_json::from_str(content).map_err(|e| SourceError::Parse {
                path: origin.clone(),
                reason: e.to_string(),
            })?;

        let issues = snapshot
            .issues
            .into_iter()
            .map(|raw| {
                let number = WorkItemId::new(raw.number).map_err(|e| SourceError::Parse {
                    path: origin.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Issue {
                    number,
                    title: raw.title,
                    open: raw.state.eq_ignore_ascii_case("open"),
                    labels: raw.labels.into_iter().map(|l| l.name).collect(),
                    reactions: raw
                        .reactions
                        .into_iter()
                        .map(|r| RawReaction {
                            actor: r.user.and_then(|u| u.login),
                            content: r.content,
                        })
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        Ok(Self { issues })
    }
}

impl IssueSource for SnapshotSource {
    fn list_candidates(&self, label: &str) -> Result<Vec<RawIssue>, SourceError> {
        Ok(self
            .issues
            .iter()
            .filter(|issue| issue.open && issue.labels.iter().any(|l| l == label))
            .map(|issue| RawIssue {
                number: issue.number,
                title: issue.title.clone(),
            })
            .collect())
    }

    fn list_endorsements(&self, id: WorkItemId) -> Result<Vec<RawReaction>, SourceError> {
        self.issues
            .iter()
            .find(|issue| issue.number == id)
            .map(|issue| issue.reactions.clone())
            .ok_or(SourceError::UnknownItem(id))
    }
}
