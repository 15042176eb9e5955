//! Webhook payloads for review comments.

use crate::dispatch::FeedbackTrigger;
use serde_json::Value;

impl FeedbackTrigger {
    /// Parse a review or issue comment webhook.
    ///
    /// Returns `None` unless the event concerns a pull request: either a
    /// `pull_request` object, or an `issue` object that carries a
    /// `pull_request` link.
    pub fn from_webhook(event: &Value) -> Option<Self> {
        let pr = match event.get("pull_request") {
            Some(pr) if pr.is_object() => pr,
            _ => {
                let issue = event.get("issue")?;
                if issue.get("pull_request").is_none_or(Value::is_null) {
                    return None;
                }
                issue
            }
        };

        Some(Self {
            pr_number: pr.get("number")?.as_u64()?,
            comment_body: text(event.get("comment"), "body"),
            pr_body: text(Some(pr), "body"),
            pr_title: text(Some(pr), "title"),
        })
    }
}

/// A string field, treating missing and null as empty.
fn text(object: Option<&Value>, field: &str) -> String {
    object
        .and_then(|o| o.get(field))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
