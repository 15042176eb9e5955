//! Config struct definition and default implementation.

use super::types::*;
use crate::authorize::SignalMap;
use crate::locks::StalePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for buildgate.
///
/// Read from `<state>/config.yaml` (or `--config`), then overlaid with the
/// environment. Unknown fields in the YAML are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Source settings
    // =========================================================================
    /// Repository in `owner/repo` form. Required by the dispatch commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Label that marks issues as build candidates (default: "autobuild").
    #[serde(default = "default_candidate_label")]
    pub candidate_label: String,

    // =========================================================================
    // Authorization settings
    // =========================================================================
    #[serde(default)]
    pub admission: AdmissionMode,

    /// Logins whose approve signal authorizes a build.
    #[serde(default)]
    pub approvers: Vec<String>,

    /// Groups whose active members may authorize a build.
    #[serde(default)]
    pub approver_groups: Vec<String>,

    /// Group membership table, keyed by group name.
    #[serde(default)]
    pub teams: BTreeMap<String, Vec<String>>,

    /// Reactions counted as support and approval.
    #[serde(default)]
    pub signals: SignalMap,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Lifetime of an acquired lock in minutes (default: 30).
    #[serde(default = "default_lock_ttl_minutes")]
    pub lock_ttl_minutes: u32,

    /// Name of the lock table (default: "AgentLockTable").
    #[serde(default = "default_lock_table")]
    pub lock_table: String,

    /// What acquire does with an expired record.
    #[serde(default)]
    pub stale_policy: StalePolicy,

    /// Owner recorded on acquired locks. Falls back to the run id, then
    /// `user@host`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    // =========================================================================
    // Feedback settings
    // =========================================================================
    /// Mention that marks a review comment as agent feedback.
    #[serde(default = "default_feedback_trigger")]
    pub feedback_trigger: String,

    /// Feedback used when the trigger is not followed by any text.
    #[serde(default = "default_feedback")]
    pub default_feedback: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: None,
            candidate_label: default_candidate_label(),
            admission: AdmissionMode::default(),
            approvers: Vec::new(),
            approver_groups: Vec::new(),
            teams: BTreeMap::new(),
            signals: SignalMap::default(),
            lock_ttl_minutes: default_lock_ttl_minutes(),
            lock_table: default_lock_table(),
            stale_policy: StalePolicy::default(),
            owner: None,
            feedback_trigger: default_feedback_trigger(),
            default_feedback: default_feedback(),
        }
    }
}
