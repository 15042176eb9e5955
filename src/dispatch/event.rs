//! Dispatch events handed to the runner.

use crate::events::EventKind;
use crate::key::{LockKey, WorkItemId};
use serde_json::{Value, json};

/// A request for the runner to build (or rebuild) a work item.
///
/// Every event carries the lock key the runner must acquire before it
/// touches the work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    Build {
        issue_number: WorkItemId,
        votes: u32,
        lock_key: LockKey,
    },
    Feedback {
        issue_number: WorkItemId,
        pr_number: u64,
        feedback: String,
        lock_key: LockKey,
    },
}

impl DispatchEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DispatchEvent::Build { .. } => EventKind::Build,
            DispatchEvent::Feedback { .. } => EventKind::Feedback,
        }
    }

    pub fn issue_number(&self) -> WorkItemId {
        match self {
            DispatchEvent::Build { issue_number, .. }
            | DispatchEvent::Feedback { issue_number, .. } => *issue_number,
        }
    }

    pub fn lock_key(&self) -> &LockKey {
        match self {
            DispatchEvent::Build { lock_key, .. } | DispatchEvent::Feedback { lock_key, .. } => {
                lock_key
            }
        }
    }

    /// The client payload as the runner receives it.
    pub fn payload(&self) -> Value {
        match self {
            DispatchEvent::Build {
                issue_number,
                votes,
                lock_key,
            } => json!({
                "issue_number": issue_number.get(),
                "votes": votes,
                "lock_key": lock_key.as_str(),
            }),
            DispatchEvent::Feedback {
                issue_number,
                pr_number,
                feedback,
                lock_key,
            } => json!({
                "issue_number": issue_number.get(),
                "pr_number": pr_number,
                "feedback": feedback,
                "lock_key": lock_key.as_str(),
            }),
        }
    }
}

impl std::fmt::Display for DispatchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchEvent::Build {
                issue_number, votes, ..
            } => write!(f, "{} #{} ({} votes)", self.kind(), issue_number, votes),
            DispatchEvent::Feedback {
                issue_number,
                pr_number,
                ..
            } => write!(f, "{} #{} (PR #{})", self.kind(), issue_number, pr_number),
        }
    }
}
