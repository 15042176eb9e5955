//! Group membership lookup.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Failure to resolve one group.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown group '{0}'")]
    UnknownGroup(String),

    #[error("membership lookup for group '{group}' failed: {reason}")]
    Unavailable { group: String, reason: String },
}

/// Resolves whether an actor is an active member of a group.
pub trait MembershipLookup {
    fn is_active_member(&self, group: &str, actor: &str) -> Result<bool, LookupError>;
}

impl<T: MembershipLookup + ?Sized> MembershipLookup for &T {
    fn is_active_member(&self, group: &str, actor: &str) -> Result<bool, LookupError> {
        (**self).is_active_member(group, actor)
    }
}

/// Membership table read from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticMembership {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl StaticMembership {
    pub fn new(groups: &BTreeMap<String, Vec<String>>) -> Self {
        Self {
            groups: groups
                .iter()
                .map(|(name, members)| (name.clone(), members.iter().cloned().collect()))
                .collect(),
        }
    }
}

impl MembershipLookup for StaticMembership {
    fn is_active_member(&self, group: &str, actor: &str) -> Result<bool, LookupError> {
        self.groups
            .get(group)
            .map(|members| members.contains(actor))
            .ok_or_else(|| LookupError::UnknownGroup(group.to_string()))
    }
}
