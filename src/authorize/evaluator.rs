//! Authorization and scoring of candidates.

use super::endorsement::{Candidate, EvaluatedCandidate, SignalKind, Verdict};
use super::membership::MembershipLookup;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Who may authorize a build.
///
/// With no identities and no groups every approval counts (open admission).
/// Configuration only produces an open set when open admission is requested
/// by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Approvers {
    identities: BTreeSet<String>,
    groups: Vec<String>,
}

impl Approvers {
    pub fn new<I, G>(identities: I, groups: G) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            identities: identities.into_iter().map(Into::into).collect(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Anyone's approval counts.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.identities.is_empty() && self.groups.is_empty()
    }

    /// Whether `actor` may approve. Group lookup failures count as
    /// non-membership of that group only.
    fn admits(&self, actor: &str, membership: &dyn MembershipLookup) -> bool {
        if self.identities.contains(actor) {
            return true;
        }

        self.groups.iter().any(|group| match membership.is_active_member(group, actor) {
            Ok(member) => member,
            Err(e) => {
                warn!(group = %group, actor = %actor, error = %e, "membership lookup failed; treating as non-member");
                false
            }
        })
    }
}

/// Decide whether `candidate` may be built and how urgently.
///
/// The score counts support signals from anyone. Authorization needs at
/// least one approve signal from an admitted actor; in open admission any
/// approve signal will do, including one without an actor.
pub fn evaluate(
    candidate: &Candidate,
    approvers: &Approvers,
    membership: &dyn MembershipLookup,
) -> Verdict {
    let score = candidate
        .endorsements
        .iter()
        .filter(|e| e.kind == SignalKind::Support)
        .count() as u32;

    let authorized = candidate
        .endorsements
        .iter()
        .filter(|e| e.kind == SignalKind::Approve)
        .any(|e| {
            if approvers.is_open() {
                return true;
            }
            e.actor
                .as_deref()
                .is_some_and(|actor| approvers.admits(actor, membership))
        });

    debug!(work_item = %candidate.id, authorized, score, "evaluated candidate");
    Verdict { authorized, score }
}

/// Evaluate a whole cycle, keeping input order.
pub fn evaluate_all(
    candidates: &[Candidate],
    approvers: &Approvers,
    membership: &dyn MembershipLookup,
) -> Vec<EvaluatedCandidate> {
    candidates
        .iter()
        .map(|candidate| {
            let verdict = evaluate(candidate, approvers, membership);
            if !verdict.authorized {
                info!(work_item = %candidate.id, "not approved by an authorized approver; skipping");
            }
            EvaluatedCandidate {
                id: candidate.id,
                score: verdict.score,
                authorized: verdict.authorized,
            }
        })
        .collect()
}
