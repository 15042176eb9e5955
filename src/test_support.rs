use crate::authorize::{Candidate, Endorsement, LookupError, MembershipLookup, SignalKind};
use crate::events::{EventKind, EventSink, SendError};
use crate::key::{LockKey, WorkItemId};
use crate::locks::{CreateOutcome, DeleteOutcome, LockRecord, LockStore, StoreError};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Mutex;

/// A fixed instant so expiry arithmetic in tests is reproducible.
pub(crate) fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// A store whose backend is always down.
pub(crate) struct FailingStore;

impl FailingStore {
    fn fail() -> StoreError {
        StoreError::Unavailable("backend offline".to_string())
    }
}

impl LockStore for FailingStore {
    fn conditional_create(&self, _record: &LockRecord) -> Result<CreateOutcome, StoreError> {
        Err(Self::fail())
    }

    fn delete(&self, _key: &LockKey) -> Result<DeleteOutcome, StoreError> {
        Err(Self::fail())
    }

    fn get(&self, _key: &LockKey) -> Result<Option<LockRecord>, StoreError> {
        Err(Self::fail())
    }

    fn list(&self) -> Result<Vec<LockRecord>, StoreError> {
        Err(Self::fail())
    }

    fn delete_if_expired(&self, _key: &LockKey, _now: DateTime<Utc>) -> Result<bool, StoreError> {
        Err(Self::fail())
    }
}

/// Captures every event it is handed.
#[derive(Default)]
pub(crate) struct RecordingSink {
    sent: Mutex<Vec<(EventKind, Value)>>,
}

impl RecordingSink {
    pub(crate) fn sent(&self) -> Vec<(EventKind, Value)> {
        self.sent.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn send(&self, kind: EventKind, payload: &Value) -> Result<(), SendError> {
        self.sent.lock().unwrap().push((kind, payload.clone()));
        Ok(())
    }
}

/// Fails for the listed issue numbers and records the rest.
pub(crate) struct FlakySink {
    failing: BTreeSet<u64>,
    inner: RecordingSink,
}

impl FlakySink {
    pub(crate) fn failing_on(issues: &[u64]) -> Self {
        Self {
            failing: issues.iter().copied().collect(),
            inner: RecordingSink::default(),
        }
    }

    pub(crate) fn sent(&self) -> Vec<(EventKind, Value)> {
        self.inner.sent()
    }
}

impl EventSink for FlakySink {
    fn send(&self, kind: EventKind, payload: &Value) -> Result<(), SendError> {
        let issue = payload["issue_number"].as_u64().unwrap_or_default();
        if self.failing.contains(&issue) {
            return Err(SendError::Transient(format!("dispatch for #{} rejected", issue)));
        }
        self.inner.send(kind, payload)
    }
}

/// Membership backend that cannot answer for the listed groups and
/// reports no members anywhere else.
pub(crate) struct BrokenMembership {
    pub(crate) broken: Vec<String>,
}

impl MembershipLookup for BrokenMembership {
    fn is_active_member(&self, group: &str, _actor: &str) -> Result<bool, LookupError> {
        if self.broken.iter().any(|g| g == group) {
            Err(LookupError::Unavailable {
                group: group.to_string(),
                reason: "rate limited".to_string(),
            })
        } else {
            Ok(false)
        }
    }
}

pub(crate) fn work_item(n: u64) -> WorkItemId {
    WorkItemId::new(n).unwrap()
}

pub(crate) fn approve(actor: &str) -> Endorsement {
    Endorsement::new(actor, SignalKind::Approve)
}

pub(crate) fn support(actor: &str) -> Endorsement {
    Endorsement::new(actor, SignalKind::Support)
}

pub(crate) fn candidate(n: u64, endorsements: Vec<Endorsement>) -> Candidate {
    Candidate {
        id: work_item(n),
        endorsements,
    }
}
