//! Config loading, environment overlay, validation, and accessors.

use super::model::Config;
use super::types::AdmissionMode;
use crate::authorize::{Approvers, StaticMembership};
use crate::dispatch::FeedbackRules;
use crate::error::{GateError, Result};
use crate::key::{LockKey, SourceId};
use crate::locks::Ttl;
use std::path::Path;

/// Environment variables read by [`Config::apply_env`].
pub const ENV_REPO: &str = "REPO";
pub const ENV_APPROVERS: &str = "AGENT_APPROVERS";
pub const ENV_APPROVER_GROUPS: &str = "AGENT_APPROVER_GROUPS";
pub const ENV_ADMISSION: &str = "AGENT_ADMISSION";
pub const ENV_LOCK_TABLE: &str = "LOCK_TABLE_NAME";
pub const ENV_LOCK_TTL_MINUTES: &str = "LOCK_TTL_MINUTES";
pub const ENV_RUN_ID: &str = "GITHUB_RUN_ID";

fn invalid(message: impl std::fmt::Display) -> GateError {
    GateError::UserError(format!("config validation failed: {}", message))
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    /// The result is not validated; see [`Config::resolve`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            GateError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null rather than an empty mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| GateError::UserError(format!("failed to parse config YAML: {}", e)))
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GateError::UserError(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Build the effective config: file (if any), then `env`, then validation.
    pub fn resolve<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the environment. Empty variables are ignored.
    ///
    /// - `REPO` replaces `repository`
    /// - `AGENT_APPROVERS` / `AGENT_APPROVER_GROUPS` replace the lists (comma separated)
    /// - `AGENT_ADMISSION` replaces `admission`
    /// - `LOCK_TABLE_NAME` / `LOCK_TTL_MINUTES` replace the lock settings
    /// - `GITHUB_RUN_ID` becomes the owner unless one is configured
    pub fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(repo) = get(ENV_REPO) {
            self.repository = Some(repo.trim().to_string());
        }
        if let Some(list) = get(ENV_APPROVERS) {
            self.approvers = split_list(&list);
        }
        if let Some(list) = get(ENV_APPROVER_GROUPS) {
            self.approver_groups = split_list(&list);
        }
        if let Some(mode) = get(ENV_ADMISSION) {
            self.admission = AdmissionMode::from_str(&mode).ok_or_else(|| {
                GateError::UserError(format!(
                    "invalid {} '{}': expected 'restricted' or 'open'",
                    ENV_ADMISSION, mode
                ))
            })?;
        }
        if let Some(table) = get(ENV_LOCK_TABLE) {
            self.lock_table = table.trim().to_string();
        }
        if let Some(minutes) = get(ENV_LOCK_TTL_MINUTES) {
            self.lock_ttl_minutes = minutes.trim().parse().map_err(|_| {
                GateError::UserError(format!(
                    "invalid {} '{}': expected a positive number of minutes",
                    ENV_LOCK_TTL_MINUTES, minutes
                ))
            })?;
        }
        if self.owner.is_none()
            && let Some(run_id) = get(ENV_RUN_ID)
        {
            self.owner = Some(run_id.trim().to_string());
        }

        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_ttl_minutes` must be positive
    /// - `repository`, when set, must be `owner/repo`
    /// - `lock_table` must be usable as a directory name
    /// - `candidate_label` and `feedback_trigger` must be non-empty
    /// - `signals` must be non-empty and distinct
    /// - `admission: open` cannot be combined with approvers or groups
    ///
    /// A restricted config with nobody allowed to approve is rejected when the
    /// approver set is requested, so lock-only commands work without one.
    pub fn validate(&self) -> Result<()> {
        if self.lock_ttl_minutes == 0 {
            return Err(invalid("lock_ttl_minutes must be greater than 0"));
        }

        if let Some(repo) = &self.repository {
            SourceId::parse(repo).map_err(invalid)?;
        }

        if LockKey::parse(&self.lock_table).is_err() {
            return Err(invalid(format!(
                "lock_table '{}' must be a non-empty name using letters, digits, '.', '_' or '-'",
                self.lock_table
            )));
        }

        if self.candidate_label.trim().is_empty() {
            return Err(invalid("candidate_label must be non-empty"));
        }

        if self.feedback_trigger.trim().is_empty() {
            return Err(invalid("feedback_trigger must be non-empty"));
        }

        if self.signals.support.is_empty() || self.signals.approve.is_empty() {
            return Err(invalid("signals.support and signals.approve must be non-empty"));
        }
        if self.signals.support == self.signals.approve {
            return Err(invalid(format!(
                "signals.support and signals.approve must differ (both are '{}')",
                self.signals.support
            )));
        }

        if self.admission == AdmissionMode::Open
            && (!self.approvers.is_empty() || !self.approver_groups.is_empty())
        {
            return Err(invalid(
                "admission is 'open' but approvers or approver_groups are configured; \
                 remove them or use 'restricted'",
            ));
        }

        Ok(())
    }

    /// The configured repository.
    pub fn source_id(&self) -> Result<SourceId> {
        let repo = self.repository.as_deref().ok_or_else(|| {
            GateError::UserError(format!(
                "no repository configured; set 'repository' in the config or {}",
                ENV_REPO
            ))
        })?;
        SourceId::parse(repo)
    }

    /// Who may authorize builds.
    ///
    /// Restricted admission with no approvers and no groups is an error, never
    /// an open door.
    pub fn approvers(&self) -> Result<Approvers> {
        match self.admission {
            AdmissionMode::Open => Ok(Approvers::open()),
            AdmissionMode::Restricted => {
                if self.approvers.is_empty() && self.approver_groups.is_empty() {
                    return Err(invalid(format!(
                        "admission is 'restricted' but no approvers or approver_groups are configured \
                         (set {} or use 'admission: open')",
                        ENV_APPROVERS
                    )));
                }
                Ok(Approvers::new(
                    self.approvers.iter().cloned(),
                    self.approver_groups.iter().cloned(),
                ))
            }
        }
    }

    pub fn membership(&self) -> StaticMembership {
        StaticMembership::new(&self.teams)
    }

    pub fn lock_ttl(&self) -> Result<Ttl> {
        Ttl::from_minutes(self.lock_ttl_minutes)
    }

    pub fn feedback_rules(&self) -> FeedbackRules {
        FeedbackRules {
            trigger: self.feedback_trigger.clone(),
            default_feedback: self.default_feedback.clone(),
        }
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
