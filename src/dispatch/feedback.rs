//! Feedback re-entry: review comments on a generated pull request become
//! a rebuild request for the original work item.

use super::event::DispatchEvent;
use super::reference::find_issue_reference;
use crate::key::{LockKey, SourceId};
use serde::{Deserialize, Serialize};

/// Feedback used when a comment carries the trigger and nothing else.
pub const DEFAULT_FEEDBACK: &str = "Please review and refine the implementation";

/// Default mention that marks a comment as feedback for the agent.
pub const DEFAULT_TRIGGER: &str = "@agent";

/// A review comment on a pull request, with the pull request's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackTrigger {
    pub pr_number: u64,
    pub comment_body: String,
    pub pr_body: String,
    pub pr_title: String,
}

/// How feedback is recognized in a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRules {
    pub trigger: String,
    pub default_feedback: String,
}

impl Default for FeedbackRules {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            default_feedback: DEFAULT_FEEDBACK.to_string(),
        }
    }
}

impl FeedbackRules {
    /// Text after the first trigger, or the default when nothing follows.
    /// `None` when the comment does not mention the trigger.
    pub fn extract(&self, comment: &str) -> Option<String> {
        let (_, rest) = comment.split_once(self.trigger.as_str())?;
        let rest = rest.trim();
        if rest.is_empty() {
            Some(self.default_feedback.clone())
        } else {
            Some(rest.to_string())
        }
    }
}

/// Why a trigger produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoTrigger,
    NoIssueReference,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoTrigger => write!(f, "comment does not mention the trigger"),
            SkipReason::NoIssueReference => {
                write!(f, "pull request does not reference an issue")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Dispatched(DispatchEvent),
    Skipped(SkipReason),
}

/// Turn a review comment into at most one feedback event.
pub fn feedback_event(
    source: &SourceId,
    trigger: &FeedbackTrigger,
    rules: &FeedbackRules,
) -> FeedbackOutcome {
    let Some(feedback) = rules.extract(&trigger.comment_body) else {
        return FeedbackOutcome::Skipped(SkipReason::NoTrigger);
    };

    let Some(issue_number) = find_issue_reference(&trigger.pr_body, &trigger.pr_title) else {
        return FeedbackOutcome::Skipped(SkipReason::NoIssueReference);
    };

    FeedbackOutcome::Dispatched(DispatchEvent::Feedback {
        issue_number,
        pr_number: trigger.pr_number,
        feedback,
        lock_key: LockKey::for_work_item(source, issue_number),
    })
}
