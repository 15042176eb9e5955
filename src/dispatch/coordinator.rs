//! Ordering and emission of build events.

use super::event::DispatchEvent;
use crate::authorize::EvaluatedCandidate;
use crate::events::EventSink;
use crate::key::{LockKey, SourceId};
use tracing::{info, warn};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionOutcome {
    Delivered,
    Failed(String),
}

/// One event and its send outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub event: DispatchEvent,
    pub outcome: EmissionOutcome,
}

impl Emission {
    pub fn is_delivered(&self) -> bool {
        self.outcome == EmissionOutcome::Delivered
    }
}

/// Outcome of a coordination cycle, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub emissions: Vec<Emission>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.emissions.iter().filter(|e| e.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.emissions.len() - self.delivered()
    }
}

/// Orders authorized candidates and hands build events to a sink.
///
/// The coordinator never acquires locks and never waits for the runner.
/// The lock key in each event is what the runner contends on.
#[derive(Debug)]
pub struct Coordinator<K> {
    source: SourceId,
    sink: K,
}

impl<K: EventSink> Coordinator<K> {
    pub fn new(source: SourceId, sink: K) -> Self {
        Self { source, sink }
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Build events for the authorized candidates, highest score first.
    ///
    /// Candidates with equal scores keep their arrival order.
    pub fn plan(&self, candidates: &[EvaluatedCandidate]) -> Vec<DispatchEvent> {
        let mut authorized: Vec<&EvaluatedCandidate> =
            candidates.iter().filter(|c| c.authorized).collect();
        authorized.sort_by(|a, b| b.score.cmp(&a.score));

        authorized
            .into_iter()
            .map(|c| DispatchEvent::Build {
                issue_number: c.id,
                votes: c.score,
                lock_key: LockKey::for_work_item(&self.source, c.id),
            })
            .collect()
    }

    /// Plan, then send every event in order.
    ///
    /// A failed send is recorded and the remaining events are still sent.
    pub fn coordinate(&self, candidates: &[EvaluatedCandidate]) -> DispatchReport {
        let emissions = self
            .plan(candidates)
            .into_iter()
            .map(|event| self.emit(event))
            .collect();
        DispatchReport { emissions }
    }

    /// Send a single event.
    pub fn emit(&self, event: DispatchEvent) -> Emission {
        let outcome = match self.sink.send(event.kind(), &event.payload()) {
            Ok(()) => {
                info!(event = %event, lock_key = %event.lock_key(), "dispatched");
                EmissionOutcome::Delivered
            }
            Err(e) => {
                warn!(event = %event, error = %e, "dispatch failed");
                EmissionOutcome::Failed(e.to_string())
            }
        };
        Emission { event, outcome }
    }
}
