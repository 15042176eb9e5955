//! Dispatch coordinator and feedback re-entry.
//!
//! Both pathways emit events through an [`EventSink`](crate::events::EventSink)
//! and derive lock keys with [`LockKey::for_work_item`](crate::key::LockKey::for_work_item),
//! so a build and a later rebuild of the same issue contend on one lock.

mod coordinator;
mod event;
mod feedback;
mod reference;


pub use coordinator::{Coordinator, DispatchReport, Emission, EmissionOutcome};
pub use event::DispatchEvent;
pub use feedback::{
    DEFAULT_FEEDBACK, DEFAULT_TRIGGER, FeedbackOutcome, FeedbackRules, FeedbackTrigger,
    SkipReason, feedback_event,
};
pub use reference::find_issue_reference;
