//! Tests for command implementations.

use super::feedback::run_feedback;
use super::lock::{cmd_acquire, cmd_locks, cmd_release, cmd_sweep};
use super::poll::run_poll;
use super::*;
use crate::cli::{AcquireArgs, FeedbackArgs, KeyArgs, PollArgs, ReleaseArgs};
use crate::config::{AdmissionMode, Config};
use crate::error::GateError;
use crate::events::{EventKind, read_event_log};
use crate::exit_codes;
use crate::key::LockKey;
use crate::locks::LockStore;
use crate::test_support::{FlakySink, RecordingSink};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{"issues": [
  {"number": 10, "state": "open", "labels": [{"name": "autobuild"}],
   "reactions": [{"user": {"login": "alice"}, "content": "rocket"},
                 {"user": {"login": "x"}, "content": "+1"}]},
  {"number": 11, "state": "open", "labels": [{"name": "autobuild"}],
   "reactions": [{"user": {"login": "alice"}, "content": "rocket"},
                 {"user": {"login": "y"}, "content": "+1"}]},
  {"number": 12, "state": "open", "labels": [{"name": "autobuild"}],
   "reactions": [{"user": {"login": "mallory"}, "content": "rocket"},
                 {"user": {"login": "x"}, "content": "+1"},
                 {"user": {"login": "y"}, "content": "+1"},
                 {"user": {"login": "z"}, "content": "+1"}]},
  {"number": 13, "state": "open", "labels": [{"name": "autobuild"}],
   "reactions": [{"user": {"login": "alice"}, "content": "rocket"},
                 {"user": {"login": "x"}, "content": "+1"},
                 {"user": {"login": "y"}, "content": "+1"},
                 {"user": {"login": "z"}, "content": "+1"}]}
]}"#;

fn gate_config() -> Config {
    Config {
        repository: Some("acme/widgets".to_string()),
        approvers: vec!["alice".to_string()],
        owner: Some("run-1".to_string()),
        ..Config::default()
    }
}

fn context(temp_dir: &TempDir, config: Config) -> RunContext {
    RunContext::new(config, temp_dir.path().join("state"))
}

fn write(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn acquire_args(key: &str, ttl_minutes: Option<u32>) -> AcquireArgs {
    AcquireArgs {
        lock_key: key.to_string(),
        ttl_minutes,
    }
}

fn release_args(key: &str) -> ReleaseArgs {
    ReleaseArgs {
        lock_key: key.to_string(),
    }
}

fn poll_args(snapshot: PathBuf, dry_run: bool) -> PollArgs {
    PollArgs { snapshot, dry_run }
}

fn sent_issues(sent: &[(EventKind, serde_json::Value)]) -> Vec<u64> {
    sent.iter()
        .map(|(_, p)| p["issue_number"].as_u64().unwrap())
        .collect()
}

// ============================================================================
// Lock commands
// ============================================================================

#[test]
fn test_acquire_then_contend_then_release() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());

    cmd_acquire(&ctx, acquire_args("acme_widgets_issue_42", None)).unwrap();
    assert!(ctx.locks_dir.join("acme_widgets_issue_42.lock").exists());

    let err = cmd_acquire(&ctx, acquire_args("acme_widgets_issue_42", Some(5))).unwrap_err();
    assert!(matches!(err, GateError::LockHeld(_)));
    assert_eq!(err.exit_code(), exit_codes::LOCK_HELD);
    assert!(err.to_string().contains("run-1"));

    cmd_release(&ctx, release_args("acme_widgets_issue_42")).unwrap();
    assert!(!ctx.locks_dir.join("acme_widgets_issue_42.lock").exists());

    // Releasing again is still a success
    cmd_release(&ctx, release_args("acme_widgets_issue_42")).unwrap();
}

#[test]
fn test_acquire_uses_config_ttl() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        lock_ttl_minutes: 90,
        ..gate_config()
    };
    let ctx = context(&temp_dir, config);

    cmd_acquire(&ctx, acquire_args("k", None)).unwrap();
    let record = ctx
        .lock_store()
        .get(&LockKey::parse("k").unwrap())
        .unwrap()
        .unwrap();
    let lifetime = record.expires_at - chrono::Utc::now().timestamp();
    assert!(lifetime > 89 * 60 && lifetime <= 90 * 60);
}

#[test]
fn test_acquire_rejects_bad_input() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());

    let err = cmd_acquire(&ctx, acquire_args("k", Some(0))).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);

    let err = cmd_acquire(&ctx, acquire_args("../escape", None)).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert!(!ctx.locks_dir.exists());
}

#[test]
fn test_locks_and_sweep_on_empty_table() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());

    cmd_locks(&ctx).unwrap();
    cmd_sweep(&ctx).unwrap();
}

#[test]
fn test_locks_lists_held_lock() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());

    cmd_acquire(&ctx, acquire_args("a", None)).unwrap();
    cmd_acquire(&ctx, acquire_args("b", None)).unwrap();
    cmd_locks(&ctx).unwrap();

    let listed = ctx.lock_manager().list().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|s| !s.expired));
}

#[test]
fn test_lock_commands_need_no_approvers() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, Config::default());

    dispatch(&ctx, Command::Acquire(acquire_args("k", None))).unwrap();
    dispatch(&ctx, Command::Release(release_args("k"))).unwrap();
    dispatch(&ctx, Command::Locks).unwrap();
    dispatch(&ctx, Command::Sweep).unwrap();
}

// ============================================================================
// Key command
// ============================================================================

#[test]
fn test_key_requires_repository() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, Config::default());

    let err = dispatch(&ctx, Command::Key(KeyArgs { issue: 42 })).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);

    let ctx = context(&temp_dir, gate_config());
    dispatch(&ctx, Command::Key(KeyArgs { issue: 42 })).unwrap();
    let err = dispatch(&ctx, Command::Key(KeyArgs { issue: 0 })).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

// ============================================================================
// Poll command
// ============================================================================

#[test]
fn test_poll_dispatches_authorized_by_score() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let snapshot = write(&temp_dir, "issues.json", SNAPSHOT);
    let sink = RecordingSink::default();

    let report = run_poll(&ctx, &poll_args(snapshot, false), &sink).unwrap();
    assert_eq!(report.delivered(), 3);

    let sent = sink.sent();
    // #12 has the most support but no authorized approval
    assert_eq!(sent_issues(&sent), vec![13, 10, 11]);
    assert!(sent.iter().all(|(kind, _)| *kind == EventKind::Build));
    assert_eq!(sent[0].1["votes"], 3);
    assert_eq!(sent[0].1["lock_key"], "acme_widgets_issue_13");
}

#[test]
fn test_poll_dry_run_sends_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let snapshot = write(&temp_dir, "issues.json", SNAPSHOT);
    let sink = RecordingSink::default();

    run_poll(&ctx, &poll_args(snapshot, true), &sink).unwrap();
    assert!(sink.sent().is_empty());
}

#[test]
fn test_poll_reports_failed_sends_after_trying_all() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let snapshot = write(&temp_dir, "issues.json", SNAPSHOT);
    let sink = FlakySink::failing_on(&[10]);

    let err = run_poll(&ctx, &poll_args(snapshot, false), &sink).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::DISPATCH_FAILURE);
    assert!(err.to_string().contains("1 of 3"));
    assert_eq!(sent_issues(&sink.sent()), vec![13, 11]);
}

#[test]
fn test_poll_restricted_without_approvers_fails_closed() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        approvers: Vec::new(),
        ..gate_config()
    };
    let ctx = context(&temp_dir, config);
    let snapshot = write(&temp_dir, "issues.json", SNAPSHOT);
    let sink = RecordingSink::default();

    let err = run_poll(&ctx, &poll_args(snapshot, false), &sink).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert!(sink.sent().is_empty());
}

#[test]
fn test_poll_open_admission_dispatches_every_approval() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        approvers: Vec::new(),
        admission: AdmissionMode::Open,
        ..gate_config()
    };
    let ctx = context(&temp_dir, config);
    let snapshot = write(&temp_dir, "issues.json", SNAPSHOT);
    let sink = RecordingSink::default();

    run_poll(&ctx, &poll_args(snapshot, false), &sink).unwrap();
    assert_eq!(sent_issues(&sink.sent()), vec![12, 13, 10, 11]);
}

#[test]
fn test_poll_missing_snapshot_is_source_failure() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());

    let err = run_poll(
        &ctx,
        &poll_args(temp_dir.path().join("missing.json"), false),
        RecordingSink::default(),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::SOURCE_FAILURE);
}

#[test]
fn test_poll_writes_event_log() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let snapshot = write(&temp_dir, "issues.json", SNAPSHOT);

    dispatch(&ctx, Command::Poll(poll_args(snapshot, false))).unwrap();

    let lines = read_event_log(&ctx.events_file).unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].event_type, EventKind::Build);
    assert_eq!(lines[0].client_payload["issue_number"], 13);
    assert_eq!(lines[0].actor, "run-1");
}

// ============================================================================
// Feedback command
// ============================================================================

fn review_event(comment: &str, body: &str) -> String {
    json!({
        "comment": {"body": comment},
        "pull_request": {"number": 88, "title": "Agent build", "body": body}
    })
    .to_string()
}

#[test]
fn test_feedback_dispatches_with_build_lock_key() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let event = write(
        &temp_dir,
        "event.json",
        &review_event("@agent handle empty input", "Closes #13"),
    );
    let sink = RecordingSink::default();

    let dispatched = run_feedback(
        &ctx,
        &FeedbackArgs {
            event,
            dry_run: false,
        },
        &sink,
    )
    .unwrap()
    .unwrap();
    assert_eq!(dispatched.lock_key().as_str(), "acme_widgets_issue_13");

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, EventKind::Feedback);
    assert_eq!(sent[0].1["pr_number"], 88);
    assert_eq!(sent[0].1["feedback"], "handle empty input");

    // Same key the poll pathway would use for the issue
    let snapshot = write(&temp_dir, "issues.json", SNAPSHOT);
    let builds = RecordingSink::default();
    run_poll(&ctx, &poll_args(snapshot, false), &builds).unwrap();
    assert_eq!(builds.sent()[0].1["lock_key"], sent[0].1["lock_key"]);
}

#[test]
fn test_feedback_skips_are_not_errors() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let sink = RecordingSink::default();

    let cases = [
        review_event("LGTM", "Closes #13"),
        review_event("@agent again", "No reference"),
        json!({"comment": {"body": "@agent"}, "issue": {"number": 3}}).to_string(),
    ];
    for (i, case) in cases.iter().enumerate() {
        let event = write(&temp_dir, &format!("event-{}.json", i), case);
        let outcome = run_feedback(
            &ctx,
            &FeedbackArgs {
                event,
                dry_run: false,
            },
            &sink,
        )
        .unwrap();
        assert!(outcome.is_none());
    }
    assert!(sink.sent().is_empty());
}

#[test]
fn test_feedback_dry_run() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let event = write(&temp_dir, "event.json", &review_event("@agent", "Fixes #4"));
    let sink = RecordingSink::default();

    let planned = run_feedback(&ctx, &FeedbackArgs { event, dry_run: true }, &sink)
        .unwrap()
        .unwrap();
    assert_eq!(
        planned.payload()["feedback"],
        "Please review and refine the implementation"
    );
    assert!(sink.sent().is_empty());
}

#[test]
fn test_feedback_send_failure() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let event = write(&temp_dir, "event.json", &review_event("@agent", "Fixes #4"));

    let err = run_feedback(
        &ctx,
        &FeedbackArgs {
            event,
            dry_run: false,
        },
        FlakySink::failing_on(&[4]),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::DISPATCH_FAILURE);
}

#[test]
fn test_feedback_malformed_event() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, gate_config());
    let event = write(&temp_dir, "event.json", "{oops");

    let err = run_feedback(
        &ctx,
        &FeedbackArgs {
            event,
            dry_run: false,
        },
        RecordingSink::default(),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::SOURCE_FAILURE);
}
