//! Authorization evaluator.
//!
//! Turns the endorsements collected for a work item into a verdict:
//! - `score`: number of support signals, from anyone
//! - `authorized`: an approve signal from a configured approver, a member
//!   of a configured group, or anyone at all under open admission
//!
//! Evaluation is pure apart from group membership lookups, and a failing
//! lookup never aborts evaluation of the other signals.

mod endorsement;
mod evaluator;
mod membership;


pub use endorsement::{Candidate, Endorsement, EvaluatedCandidate, SignalKind, SignalMap, Verdict};
pub use evaluator::{Approvers, evaluate, evaluate_all};
pub use membership::{LookupError, MembershipLookup, StaticMembership};
