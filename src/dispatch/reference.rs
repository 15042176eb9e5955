//! Issue references in pull request text.
//!
//! Grammar, matched ASCII case-insensitively:
//!
//! ```text
//! body  := keyword space* "#" digits
//! digits := [0-9]+
//! keyword := "closes" | "fixes" | "resolves" | "related to" | "issue"
//! title := "issue" ("_" | "-") digits
//! ```
//!
//! The body is searched first; the title is a fallback. Only the first
//! match in each is considered.

use crate::key::WorkItemId;
use regex::Regex;
use std::sync::LazyLock;

static BODY_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:closes|fixes|resolves|related to|issue)\s*#([0-9]+)")
        .expect("Invalid issue reference regex")
});

static TITLE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)issue[_-]([0-9]+)").expect("Invalid title reference regex"));

/// Find the work item a pull request was built for.
pub fn find_issue_reference(pr_body: &str, pr_title: &str) -> Option<WorkItemId> {
    if let Some(caps) = BODY_REFERENCE.captures(pr_body) {
        return to_work_item(&caps[1]);
    }
    TITLE_REFERENCE
        .captures(pr_title)
        .and_then(|caps| to_work_item(&caps[1]))
}

fn to_work_item(digits: &str) -> Option<WorkItemId> {
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| WorkItemId::new(n).ok())
}
