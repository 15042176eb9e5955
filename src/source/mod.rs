//! Issue tracker collaborators.
//!
//! The coordinator never talks to a tracker directly. It reads raw issues
//! and reactions through an [`IssueSource`] and turns them into
//! [`Candidate`]s with [`collect_candidates`].

mod snapshot;
mod webhook;


pub use snapshot::SnapshotSource;

use crate::authorize::{Candidate, Endorsement, SignalMap};
use crate::key::WorkItemId;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// An open issue carrying the candidate label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIssue {
    pub number: WorkItemId,
    pub title: String,
}

/// One reaction as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReaction {
    /// Login of the reacting user; trackers may omit deleted accounts.
    pub actor: Option<String>,
    pub content: String,
}

/// Failure to read from the issue tracker.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("work item #{0} is not known to the issue source")]
    UnknownItem(WorkItemId),
}

/// Read access to the issue tracker.
pub trait IssueSource {
    /// Open issues carrying `label`, in arrival order.
    fn list_candidates(&self, label: &str) -> Result<Vec<RawIssue>, SourceError>;

    /// Reactions on one issue.
    fn list_endorsements(&self, id: WorkItemId) -> Result<Vec<RawReaction>, SourceError>;
}

impl<T: IssueSource + ?Sized> IssueSource for &T {
    fn list_candidates(&self, label: &str) -> Result<Vec<RawIssue>, SourceError> {
        (**self).list_candidates(label)
    }

    fn list_endorsements(&self, id: WorkItemId) -> Result<Vec<RawReaction>, SourceError> {
        (**self).list_endorsements(id)
    }
}

/// Build this cycle's candidates, classifying reactions through `signals`.
///
/// Reactions that map to no signal are dropped. Candidate order follows the
/// source.
pub fn collect_candidates(
    source: &dyn IssueSource,
    label: &str,
    signals: &SignalMap,
) -> Result<Vec<Candidate>, SourceError> {
    let issues = source.list_candidates(label)?;
    let mut candidates = Vec::with_capacity(issues.len());

    for issue in issues {
        let endorsements: Vec<Endorsement> = source
            .list_endorsements(issue.number)?
            .into_iter()
            .filter_map(|reaction| {
                signals.classify(&reaction.content).map(|kind| Endorsement {
                    actor: reaction.actor,
                    kind,
                })
            })
            .collect();

        debug!(
            work_item = %issue.number,
            signals = endorsements.len(),
            "collected candidate"
        );
        candidates.push(Candidate {
            id: issue.number,
            endorsements,
        });
    }

    Ok(candidates)
}
