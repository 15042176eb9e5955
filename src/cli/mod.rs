//! CLI argument parsing for buildgate.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Buildgate: TTL locks and approval-gated build dispatch for agent runners.
///
/// - `acquire`/`release` guard one work item at a time across runners
/// - `poll` turns approved, labeled issues into prioritized build events
/// - `feedback` turns review comments into rebuild events
#[derive(Parser, Debug)]
#[command(name = "buildgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: <state-dir>/config.yaml when present).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// State directory holding locks and the event log (default: .buildgate).
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Log filter, e.g. `info` or `buildgate=debug`. Logs go to stderr.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for buildgate.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire a lock.
    ///
    /// Exits 0 when acquired and 1 when another holder has it.
    Acquire(AcquireArgs),

    /// Release a lock.
    ///
    /// Succeeds whether or not the lock existed.
    Release(ReleaseArgs),

    /// List lock records with owner and expiry.
    Locks,

    /// Delete expired lock records.
    Sweep,

    /// Print the lock key derived for an issue.
    Key(KeyArgs),

    /// Evaluate candidate issues and dispatch build events.
    ///
    /// Reads the tracker snapshot, keeps issues approved by an authorized
    /// approver, and emits one build event per issue, most supported first.
    Poll(PollArgs),

    /// Dispatch a rebuild from a review comment webhook.
    Feedback(FeedbackArgs),
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Lock key to acquire.
    #[arg(long)]
    pub lock_key: String,

    /// Lock lifetime in minutes (default: `lock_ttl_minutes` from config).
    #[arg(long)]
    pub ttl_minutes: Option<u32>,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Lock key to release.
    #[arg(long)]
    pub lock_key: String,
}

/// Arguments for the `key` command.
#[derive(Parser, Debug)]
pub struct KeyArgs {
    /// Issue number.
    #[arg(long)]
    pub issue: u64,
}

/// Arguments for the `poll` command.
#[derive(Parser, Debug)]
pub struct PollArgs {
    /// JSON snapshot of the tracker's issues and reactions.
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Print the planned events without emitting them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `feedback` command.
#[derive(Parser, Debug)]
pub struct FeedbackArgs {
    /// Webhook event payload (e.g. `$GITHUB_EVENT_PATH`).
    #[arg(long, value_name = "FILE")]
    pub event: PathBuf,

    /// Print the event without emitting it.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_acquire() {
        let cli = Cli::try_parse_from([
            "buildgate",
            "acquire",
            "--lock-key",
            "acme_widgets_issue_42",
            "--ttl-minutes",
            "10",
        ])
        .unwrap();
        if let Command::Acquire(args) = cli.command {
            assert_eq!(args.lock_key, "acme_widgets_issue_42");
            assert_eq!(args.ttl_minutes, Some(10));
        } else {
            panic!("Expected Acquire command");
        }
    }

    #[test]
    fn parse_acquire_default_ttl() {
        let cli = Cli::try_parse_from(["buildgate", "acquire", "--lock-key", "k"]).unwrap();
        if let Command::Acquire(args) = cli.command {
            assert_eq!(args.ttl_minutes, None);
        } else {
            panic!("Expected Acquire command");
        }
    }

    #[test]
    fn parse_acquire_requires_key() {
        assert!(Cli::try_parse_from(["buildgate", "acquire"]).is_err());
    }

    #[test]
    fn parse_release() {
        let cli = Cli::try_parse_from(["buildgate", "release", "--lock-key", "k"]).unwrap();
        assert!(matches!(cli.command, Command::Release(ref args) if args.lock_key == "k"));
    }

    #[test]
    fn parse_locks_and_sweep() {
        let cli = Cli::try_parse_from(["buildgate", "locks"]).unwrap();
        assert!(matches!(cli.command, Command::Locks));

        let cli = Cli::try_parse_from(["buildgate", "sweep"]).unwrap();
        assert!(matches!(cli.command, Command::Sweep));
    }

    #[test]
    fn parse_key() {
        let cli = Cli::try_parse_from(["buildgate", "key", "--issue", "42"]).unwrap();
        assert!(matches!(cli.command, Command::Key(KeyArgs { issue: 42 })));
    }

    #[test]
    fn parse_poll() {
        let cli = Cli::try_parse_from([
            "buildgate",
            "poll",
            "--snapshot",
            "issues.json",
            "--dry-run",
        ])
        .unwrap();
        if let Command::Poll(args) = cli.command {
            assert_eq!(args.snapshot, PathBuf::from("issues.json"));
            assert!(args.dry_run);
        } else {
            panic!("Expected Poll command");
        }
    }

    #[test]
    fn parse_feedback() {
        let cli = Cli::try_parse_from(["buildgate", "feedback", "--event", "event.json"]).unwrap();
        if let Command::Feedback(args) = cli.command {
            assert_eq!(args.event, PathBuf::from("event.json"));
            assert!(!args.dry_run);
        } else {
            panic!("Expected Feedback command");
        }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "buildgate",
            "locks",
            "--state-dir",
            "/tmp/state",
            "--config",
            "gate.yaml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/state")));
        assert_eq!(cli.config, Some(PathBuf::from("gate.yaml")));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn parse_default_log_level() {
        let cli = Cli::try_parse_from(["buildgate", "sweep"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_unknown_command_fails() {
        assert!(Cli::try_parse_from(["buildgate", "claim"]).is_err());
    }
}
