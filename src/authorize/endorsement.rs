//! Endorsement signals and candidates.

use crate::key::WorkItemId;
use serde::{Deserialize, Serialize};

/// What an endorsement means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Lightweight up-vote; counts towards priority.
    Support,
    /// Strong reaction; authorizes the build when it comes from an approver.
    Approve,
}

/// A signal attached to a work item by an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endorsement {
    /// Login of the reacting user, when the source reports one.
    pub actor: Option<String>,
    pub kind: SignalKind,
}

impl Endorsement {
    pub fn new(actor: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            actor: Some(actor.into()),
            kind,
        }
    }

    pub fn anonymous(kind: SignalKind) -> Self {
        Self { actor: None, kind }
    }
}

/// Maps raw reaction contents onto signal kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalMap {
    /// Reaction counted as support (default `+1`).
    pub support: String,

    /// Reaction counted as approval (default `rocket`).
    pub approve: String,
}

impl Default for SignalMap {
    fn default() -> Self {
        Self {
            support: "+1".to_string(),
            approve: "rocket".to_string(),
        }
    }
}

impl SignalMap {
    /// Classify a reaction; anything unmapped is ignored.
    pub fn classify(&self, content: &str) -> Option<SignalKind> {
        if content == self.approve {
            Some(SignalKind::Approve)
        } else if content == self.support {
            Some(SignalKind::Support)
        } else {
            None
        }
    }
}

/// A work item under evaluation in one coordination cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: WorkItemId,
    pub endorsements: Vec<Endorsement>,
}

/// Authorization outcome for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub authorized: bool,
    pub score: u32,
}

/// A candidate with its verdict applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatedCandidate {
    pub id: WorkItemId,
    pub score: u32,
    pub authorized: bool,
}
