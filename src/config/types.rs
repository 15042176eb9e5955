//! Configuration enums and default values.

use serde::{Deserialize, Serialize};

/// Who may authorize builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
    /// Only configured approvers and members of configured groups (default).
    #[default]
    Restricted,
    /// Any approve signal authorizes. Must be requested explicitly.
    Open,
}

impl AdmissionMode {
    /// Parse an admission mode from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restricted" => Some(Self::Restricted),
            "open" => Some(Self::Open),
            _ => None,
        }
    }
}

pub fn default_candidate_label() -> String {
    "autobuild".to_string()
}

pub fn default_lock_ttl_minutes() -> u32 {
    30
}

pub fn default_lock_table() -> String {
    "AgentLockTable".to_string()
}

pub fn default_feedback_trigger() -> String {
    crate::dispatch::DEFAULT_TRIGGER.to_string()
}

pub fn default_feedback() -> String {
    crate::dispatch::DEFAULT_FEEDBACK.to_string()
}
