//! Implementation of the `buildgate feedback` command.

use crate::cli::FeedbackArgs;
use crate::context::RunContext;
use crate::dispatch::{
    Coordinator, DispatchEvent, EmissionOutcome, FeedbackOutcome, FeedbackTrigger, feedback_event,
};
use crate::error::{GateError, Result};
use crate::events::EventSink;
use crate::source::SourceError;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the `buildgate feedback` command.
pub fn cmd_feedback(ctx: &RunContext, args: FeedbackArgs) -> Result<()> {
    run_feedback(ctx, &args, ctx.event_sink()).map(|_| ())
}

/// Handle one webhook event, sending at most one feedback event to `sink`.
///
/// Events that are not about a pull request, comments without the trigger,
/// and pull requests without an issue reference are skipped, not errors.
pub(crate) fn run_feedback<K: EventSink>(
    ctx: &RunContext,
    args: &FeedbackArgs,
    sink: K,
) -> Result<Option<DispatchEvent>> {
    let source_id = ctx.config.source_id()?;
    let event = read_webhook(&args.event)?;

    let Some(trigger) = FeedbackTrigger::from_webhook(&event) else {
        println!("No pull request in event; nothing to do.");
        return Ok(None);
    };
    info!(pr_number = trigger.pr_number, "processing feedback");

    let event = match feedback_event(&source_id, &trigger, &ctx.config.feedback_rules()) {
        FeedbackOutcome::Dispatched(event) => event,
        FeedbackOutcome::Skipped(reason) => {
            println!("Skipped PR #{}: {}", trigger.pr_number, reason);
            return Ok(None);
        }
    };

    if args.dry_run {
        println!("[dry-run] {} lock_key={}", event, event.lock_key());
        return Ok(Some(event));
    }

    let emission = Coordinator::new(source_id, sink).emit(event);
    match emission.outcome {
        EmissionOutcome::Delivered => {
            println!(
                "Dispatched {} lock_key={}",
                emission.event,
                emission.event.lock_key()
            );
            Ok(Some(emission.event))
        }
        EmissionOutcome::Failed(reason) => Err(GateError::DispatchError(format!(
            "{}: {}",
            emission.event, reason
        ))),
    }
}

fn read_webhook(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|e| SourceError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(value)
}
