//! Command implementations for buildgate.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command runs against one resolved [`RunContext`].

mod feedback;
mod key;
mod lock;
mod poll;

#[cfg(test)]
mod tests;

use crate::cli::Command;
use crate::context::RunContext;
use crate::error::Result;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(ctx: &RunContext, command: Command) -> Result<()> {
    match command {
        Command::Acquire(args) => lock::cmd_acquire(ctx, args),
        Command::Release(args) => lock::cmd_release(ctx, args),
        Command::Locks => lock::cmd_locks(ctx),
        Command::Sweep => lock::cmd_sweep(ctx),
        Command::Key(args) => key::cmd_key(ctx, args),
        Command::Poll(args) => poll::cmd_poll(ctx, args),
        Command::Feedback(args) => feedback::cmd_feedback(ctx, args),
    }
}
