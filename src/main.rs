//! Buildgate: TTL locks and approval-gated build dispatch for agent runners.
//!
//! This is the main entry point for the `buildgate` CLI. It parses arguments,
//! initializes logging, resolves the run context, dispatches to the
//! appropriate command handler, and handles errors with proper exit codes.

mod cli;
mod commands;
pub mod authorize;
pub mod clock;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod key;
pub mod locks;
pub mod source;

#[cfg(test)]
mod test_support;

use cli::Cli;
use context::RunContext;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Route logs to stderr so stdout stays machine-readable.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(&cli.log_level);

    let result = RunContext::from_process(cli.config.as_deref(), cli.state_dir.as_deref())
        .and_then(|ctx| commands::dispatch(&ctx, cli.command));

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
