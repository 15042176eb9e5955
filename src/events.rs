//! Event sink for outbound dispatch events.
//!
//! Dispatch events are handed to an [`EventSink`]; what happens after that
//! (a repository dispatch, a queue, a file) is the sink's business, as is
//! idempotency. The bundled [`NdjsonEventSink`] appends one JSON object per
//! line to a local file, which a runner or relay can tail.
//!
//! # Line Format
//!
//! - `ts`: RFC3339 timestamp
//! - `event_type`: `agent-build` or `agent-feedback`
//! - `client_payload`: the event payload
//! - `actor`: who emitted it (the run owner)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Kinds of dispatch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Initial build of an approved issue.
    #[serde(rename = "agent-build")]
    Build,
    /// Rebuild driven by review feedback on the generated PR.
    #[serde(rename = "agent-feedback")]
    Feedback,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Build => "agent-build",
            EventKind::Feedback => "agent-feedback",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to hand one event to the sink.
#[derive(Error, Debug)]
pub enum SendError {
    /// The sink could not accept the event right now; a later run may succeed.
    #[error("transient send failure: {0}")]
    Transient(String),

    /// The event could not be encoded.
    #[error("event could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for dispatch events.
pub trait EventSink {
    fn send(&self, kind: EventKind, payload: &Value) -> Result<(), SendError>;
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn send(&self, kind: EventKind, payload: &Value) -> Result<(), SendError> {
        (**self).send(kind, payload)
    }
}

/// One line of the NDJSON event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLine {
    /// When the event was emitted.
    pub ts: DateTime<Utc>,

    /// The kind of event.
    pub event_type: EventKind,

    /// Event-specific payload.
    pub client_payload: Value,

    /// The emitting run.
    pub actor: String,
}

impl EventLine {
    /// Serialize the line without embedded newlines.
    pub fn to_ndjson_line(&self) -> Result<String, SendError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Appends events to a newline-delimited JSON file.
#[derive(Debug, Clone)]
pub struct NdjsonEventSink {
    path: PathBuf,
    actor: String,
}

impl NdjsonEventSink {
    pub fn new(path: impl Into<PathBuf>, actor: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            actor: actor.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        // Ensure the events directory exists
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Write the JSON line with trailing newline
        writeln!(file, "{}", line)?;

        // Sync to disk for durability
        file.sync_all()
    }
}

impl EventSink for NdjsonEventSink {
    fn send(&self, kind: EventKind, payload: &Value) -> Result<(), SendError> {
        let line = EventLine {
            ts: Utc::now(),
            event_type: kind,
            client_payload: payload.clone(),
            actor: self.actor.clone(),
        }
        .to_ndjson_line()?;

        self.append(&line).map_err(|e| {
            SendError::Transient(format!(
                "failed to append to '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Read every line of an NDJSON event log.
pub fn read_event_log(path: &Path) -> std::io::Result<Vec<EventLine>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(std::io::Error::other))
        .collect()
}
