//! Implementation of the `buildgate poll` command.
//!
//! One coordination cycle: read candidates from the tracker snapshot,
//! evaluate them, and emit build events for the authorized ones.

use crate::authorize::evaluate_all;
use crate::cli::PollArgs;
use crate::context::RunContext;
use crate::dispatch::{Coordinator, DispatchReport, EmissionOutcome};
use crate::error::{GateError, Result};
use crate::events::EventSink;
use crate::source::{SnapshotSource, collect_candidates};
use tracing::info;

/// Execute the `buildgate poll` command.
pub fn cmd_poll(ctx: &RunContext, args: PollArgs) -> Result<()> {
    run_poll(ctx, &args, ctx.event_sink()).map(|_| ())
}

/// Run one cycle against `sink`.
///
/// Fails with [`GateError::DispatchError`] after attempting every event if
/// any of them could not be sent.
pub(crate) fn run_poll<K: EventSink>(
    ctx: &RunContext,
    args: &PollArgs,
    sink: K,
) -> Result<DispatchReport> {
    // Resolve everything that can fail on configuration before reading input
    let source_id = ctx.config.source_id()?;
    let approvers = ctx.config.approvers()?;
    let membership = ctx.config.membership();

    let source = SnapshotSource::load(&args.snapshot)?;
    let candidates = collect_candidates(&source, &ctx.config.candidate_label, &ctx.config.signals)?;
    let evaluated = evaluate_all(&candidates, &approvers, &membership);
    info!(
        candidates = candidates.len(),
        authorized = evaluated.iter().filter(|c| c.authorized).count(),
        "evaluated cycle"
    );

    let coordinator = Coordinator::new(source_id, sink);

    if args.dry_run {
        let planned = coordinator.plan(&evaluated);
        if planned.is_empty() {
            println!("No approved candidates.");
        }
        for event in &planned {
            println!("[dry-run] {} lock_key={}", event, event.lock_key());
        }
        return Ok(DispatchReport::default());
    }

    let report = coordinator.coordinate(&evaluated);
    if report.emissions.is_empty() {
        println!("No approved candidates.");
    }
    for emission in &report.emissions {
        match &emission.outcome {
            EmissionOutcome::Delivered => {
                println!("Dispatched {} lock_key={}", emission.event, emission.event.lock_key())
            }
            EmissionOutcome::Failed(reason) => {
                println!("FAILED {}: {}", emission.event, reason)
            }
        }
    }

    if report.failed() > 0 {
        return Err(GateError::DispatchError(format!(
            "{} of {} events could not be sent",
            report.failed(),
            report.emissions.len()
        )));
    }

    Ok(report)
}
