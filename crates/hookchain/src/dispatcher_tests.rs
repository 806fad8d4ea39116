// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::definition::RawHook;
use crate::handler_path::HandlerResolver;
use crate::invoker::{ScriptedInvoker, ScriptedResponse};
use crate::registry::HookRegistry;
use crate::source::SourceTier;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use yare::parameterized;

struct Fixture {
    dir: TempDir,
    registry: HookRegistry,
    invoker: Arc<ScriptedInvoker>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let registry = HookRegistry::new()
            .with_resolver(HandlerResolver::new(dir.path()))
            .with_default_timeout_ms(5_000);
        Self {
            dir,
            registry,
            invoker: Arc::new(ScriptedInvoker::new()),
        }
    }

    /// Create a handler file and return its path.
    fn handler(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    fn add(&mut self, tier: SourceTier, raw: RawHook) -> PathBuf {
        let path = self.handler(&raw.handler);
        let raw = RawHook {
            handler: path.display().to_string(),
            ..raw
        };
        let registration = self.registry.register(tier, vec![raw]);
        assert!(registration.rejected.is_empty(), "{:?}", registration.rejected);
        path
    }

    fn respond(&self, handler: &Path, response: ScriptedResponse) {
        self.invoker.set(handler, response);
    }

    fn dispatcher(&self) -> Dispatcher {
        let store = Arc::new(HookStore::from_registry(&self.registry));
        Dispatcher::new(store, Arc::clone(&self.invoker) as Arc<dyn HandlerInvoker>)
    }
}

fn bash(command: &str) -> EventPayload {
    EventPayload::pre_operation("Bash", json!({ "command": command }))
}

// =========================================================================
// classify
// =========================================================================

fn output(code: Option<i32>, stdout: &str, stderr: &str) -> Result<HandlerOutput, InvokeError> {
    Ok(HandlerOutput {
        exit_code: code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    })
}

#[test]
fn classify_exit_zero_without_output_continues() {
    assert_eq!(
        classify(EventKind::PreOperation, output(Some(0), "  \n", "noise")),
        Verdict::Continue
    );
}

#[test]
fn classify_exit_zero_with_payload_modifies() {
    let verdict = classify(
        EventKind::PromptSubmit,
        output(Some(0), r#"{"prompt": "rewritten"}"#, ""),
    );
    assert_eq!(
        verdict,
        Verdict::Modify(EventPayload::prompt_submit("rewritten"))
    );
}

#[parameterized(
    stderr_first = { "from stderr", "from stdout", "from stderr" },
    stdout_fallback = { "", "from stdout", "from stdout" },
    default_reason = { " ", "", "skipped by hook" },
)]
fn classify_exit_two_skips(stderr: &str, stdout: &str, reason: &str) {
    assert_eq!(
        classify(EventKind::PreOperation, output(Some(2), stdout, stderr)),
        Verdict::Skip(reason.to_string())
    );
}

#[test]
fn classify_exit_one_rejects() {
    assert_eq!(
        classify(EventKind::PreOperation, output(Some(1), "", "policy says no\n")),
        Verdict::Fail(HandlerFailure::Rejected("policy says no".to_string()))
    );
}

#[parameterized(
    unknown_code = { Some(42) },
    negative = { Some(-1) },
    signal = { None },
)]
fn classify_other_exits_crash(code: Option<i32>) {
    let verdict = classify(EventKind::PostOperation, output(code, "", "trace"));
    assert_eq!(
        verdict,
        Verdict::Fail(HandlerFailure::Crash {
            exit_code: code,
            stderr: "trace".to_string()
        })
    );
}

#[parameterized(
    not_json = { "allow" },
    wrong_kind = { r#"{"hookEventName": "PromptSubmit", "prompt": "x"}"# },
    missing_fields = { r#"{"parameters": {}}"# },
)]
fn classify_malformed_modify_output(stdout: &str) {
    let verdict = classify(EventKind::PreOperation, output(Some(0), stdout, ""));
    assert!(matches!(
        verdict,
        Verdict::Fail(HandlerFailure::MalformedOutput(_))
    ));
}

#[test]
fn classify_invoke_errors() {
    assert_eq!(
        classify(
            EventKind::PreOperation,
            Err(InvokeError::Timeout(Duration::from_millis(1500)))
        ),
        Verdict::Fail(HandlerFailure::Timeout { timeout_ms: 1500 })
    );
    assert!(matches!(
        classify(
            EventKind::PreOperation,
            Err(InvokeError::Spawn("denied".into()))
        ),
        Verdict::Fail(HandlerFailure::Launch(_))
    ));
}

// =========================================================================
// Chain execution
// =========================================================================

#[tokio::test]
async fn no_hooks_continues_with_original_payload() {
    let fixture = Fixture::new();
    let event = bash("ls");
    let outcome = fixture.dispatcher().dispatch(event.clone()).await;
    assert_eq!(outcome, ChainOutcome::Continue(event));
}

#[tokio::test]
async fn no_matching_hook_continues_unchanged() {
    let mut fixture = Fixture::new();
    let guard = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Write", "guard.sh"),
    );
    fixture.respond(&guard, ScriptedResponse::reject("never"));

    let event = bash("ls");
    let outcome = fixture.dispatcher().dispatch(event.clone()).await;

    assert_eq!(outcome, ChainOutcome::Continue(event));
    assert_eq!(fixture.invoker.call_count(&guard), 0);
}

#[tokio::test]
async fn skip_stops_chain_in_priority_order() {
    let mut fixture = Fixture::new();
    let low = fixture.add(
        SourceTier::UserSettings,
        RawHook::new(EventKind::PreOperation, "Bash", "low.sh").with_priority(-100),
    );
    let high = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Bash", "high.sh").with_priority(100),
    );
    let mid = fixture.add(
        SourceTier::AddonManifest,
        RawHook::new(EventKind::PreOperation, "Bash", "mid.sh").with_priority(50),
    );
    fixture.respond(&mid, ScriptedResponse::skip("rm -rf detected"));

    let dispatcher = fixture.dispatcher();
    let outcome = dispatcher.dispatch(bash("rm -rf /")).await;

    assert_eq!(fixture.invoker.call_order(), [high, mid.clone()]);
    assert_eq!(fixture.invoker.call_count(&low), 0);
    assert!(matches!(
        outcome,
        ChainOutcome::Skip { ref reason, ref hook, .. }
            if reason == "rm -rf detected" && hook.handler_path == mid
    ));
    assert_eq!(
        resolver::resolve(outcome),
        ResolvedAction::Suppress("rm -rf detected".to_string())
    );
}

#[tokio::test]
async fn modify_terminates_chain_without_double_transform() {
    let mut fixture = Fixture::new();
    let first = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "*", "first.sh").with_priority(10),
    );
    let second = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "*", "second.sh"),
    );
    fixture.respond(
        &first,
        ScriptedResponse::modify(r#"{"operationName": "Bash", "parameters": {"command": "ls -i"}}"#),
    );
    fixture.respond(
        &second,
        ScriptedResponse::modify(r#"{"operationName": "Bash", "parameters": {"command": "twice"}}"#),
    );

    let outcome = fixture.dispatcher().dispatch(bash("ls")).await;

    assert_eq!(fixture.invoker.call_count(&second), 0);
    let ChainOutcome::Modify { payload, hook } = outcome else {
        panic!("expected modify, got {outcome:?}");
    };
    assert_eq!(hook.handler_path, first);
    assert_eq!(payload, bash("ls -i"));
}

#[tokio::test]
async fn continuing_hooks_all_see_the_original_payload() {
    let mut fixture = Fixture::new();
    fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Bash", "a.sh"),
    );
    fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Bash*", "b.sh"),
    );

    let event = bash("echo safe");
    let outcome = fixture.dispatcher().dispatch(event.clone()).await;

    assert_eq!(outcome, ChainOutcome::Continue(event.clone()));
    let expected = event.to_wire_string().unwrap();
    let calls = fixture.invoker.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| call.input == expected));
}

#[tokio::test]
async fn failure_stops_chain_with_offending_hook() {
    let mut fixture = Fixture::new();
    let broken = fixture.add(
        SourceTier::SetupManifest,
        RawHook::new(EventKind::PostOperation, "Write", "broken.sh").with_priority(1),
    );
    let after = fixture.add(
        SourceTier::SetupManifest,
        RawHook::new(EventKind::PostOperation, "Write", "after.sh"),
    );
    fixture.respond(&broken, ScriptedResponse::exit(7));

    let write = EventPayload::post_operation("Write", json!({"path": "a"}), json!(null), true);
    let outcome = fixture.dispatcher().dispatch(write.clone()).await;

    assert_eq!(fixture.invoker.call_count(&after), 0);
    assert!(matches!(
        outcome,
        ChainOutcome::Error {
            failure: HandlerFailure::Crash { exit_code: Some(7), .. },
            ref hook,
            ..
        } if hook.handler_path == broken
    ));
    assert_eq!(resolver::resolve(outcome), ResolvedAction::Proceed(write));
}

#[tokio::test]
async fn hung_handler_times_out_as_error() {
    let mut fixture = Fixture::new();
    let slow = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Bash", "slow.sh").with_timeout_ms(30),
    );
    fixture.respond(&slow, ScriptedResponse::Hang);

    let outcome = fixture.dispatcher().dispatch(bash("sleep")).await;
    assert!(matches!(
        outcome,
        ChainOutcome::Error {
            failure: HandlerFailure::Timeout { timeout_ms: 30 },
            ..
        }
    ));
}

#[tokio::test]
async fn events_without_subject_run_every_hook() {
    let mut fixture = Fixture::new();
    let a = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::SessionStop, "Bash", "a.sh"),
    );
    let b = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::SessionStop, "*", "b.sh"),
    );

    fixture
        .dispatcher()
        .dispatch(EventPayload::session_stop("completed"))
        .await;

    assert_eq!(fixture.invoker.call_count(&a), 1);
    assert_eq!(fixture.invoker.call_count(&b), 1);
}

#[tokio::test]
async fn subagent_stop_matches_agent_type() {
    let mut fixture = Fixture::new();
    let reviewer = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::SubAgentStop, "reviewer", "reviewer.sh"),
    );
    let other = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::SubAgentStop, "planner", "planner.sh"),
    );

    fixture
        .dispatcher()
        .dispatch(EventPayload::subagent_stop("reviewer", "done"))
        .await;

    assert_eq!(fixture.invoker.call_count(&reviewer), 1);
    assert_eq!(fixture.invoker.call_count(&other), 0);
}

#[tokio::test]
async fn repeated_dispatch_is_deterministic() {
    let mut fixture = Fixture::new();
    for (name, priority) in [("a.sh", 1), ("b.sh", 1), ("c.sh", 5)] {
        fixture.add(
            SourceTier::AddonManifest,
            RawHook::new(EventKind::PreOperation, "*", name).with_priority(priority),
        );
    }
    let dispatcher = fixture.dispatcher();

    let first = dispatcher.dispatch(bash("ls")).await;
    let order = fixture.invoker.call_order();
    let second = dispatcher.dispatch(bash("ls")).await;
    let both = fixture.invoker.call_order();

    assert_eq!(first, second);
    assert_eq!(both[..3], both[3..]);
    assert_eq!(order.len(), 3);
}

// =========================================================================
// Async hooks
// =========================================================================

#[tokio::test]
async fn async_hook_never_affects_outcome() {
    let mut fixture = Fixture::new();
    let audit = fixture.add(
        SourceTier::UserSettings,
        RawHook::new(EventKind::PreOperation, "Bash", "audit.sh")
            .with_priority(100)
            .with_async(true),
    );
    let guard = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Bash", "guard.sh"),
    );
    fixture.respond(&audit, ScriptedResponse::reject("audit log unavailable"));

    let dispatcher = fixture.dispatcher();
    let event = bash("ls");
    let outcome = dispatcher.dispatch(event.clone()).await;
    dispatcher.drain_async().await;

    assert_eq!(outcome, ChainOutcome::Continue(event));
    assert_eq!(fixture.invoker.call_count(&audit), 1);
    assert_eq!(fixture.invoker.call_count(&guard), 1);
    assert_eq!(dispatcher.pending_async(), 0);
}

#[tokio::test]
async fn async_hook_runs_even_when_chain_stops_later() {
    let mut fixture = Fixture::new();
    let audit = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "*", "audit.sh")
            .with_priority(10)
            .with_async(true),
    );
    let guard = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "*", "guard.sh"),
    );
    fixture.respond(&guard, ScriptedResponse::skip("blocked"));

    let dispatcher = fixture.dispatcher();
    let action = dispatcher.dispatch_resolved(bash("ls")).await;
    dispatcher.drain_async().await;

    assert_eq!(action, ResolvedAction::Suppress("blocked".to_string()));
    assert_eq!(fixture.invoker.call_count(&audit), 1);
}

// =========================================================================
// Cancellation and reload
// =========================================================================

#[tokio::test]
async fn cancellation_stops_a_hung_chain() {
    let mut fixture = Fixture::new();
    let slow = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Bash", "slow.sh").with_timeout_ms(60_000),
    );
    fixture.respond(&slow, ScriptedResponse::Hang);

    let dispatcher = fixture.dispatcher();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = dispatcher.dispatch_with_cancel(bash("ls"), &cancel).await;

    assert_eq!(result, Err(Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn uncancelled_dispatch_completes() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();
    let event = bash("ls");
    let result = fixture
        .dispatcher()
        .dispatch_with_cancel(event.clone(), &cancel)
        .await;
    assert_eq!(result, Ok(ChainOutcome::Continue(event)));
}

#[tokio::test]
async fn reload_applies_to_next_dispatch() {
    let mut fixture = Fixture::new();
    let dispatcher = fixture.dispatcher();

    let guard = fixture.add(
        SourceTier::Builtin,
        RawHook::new(EventKind::PreOperation, "Bash", "guard.sh"),
    );
    fixture.respond(&guard, ScriptedResponse::skip("new policy"));

    let before = dispatcher.dispatch(bash("ls")).await;
    dispatcher.store().install(&fixture.registry);
    let after = dispatcher.dispatch(bash("ls")).await;

    assert_eq!(before.name(), "continue");
    assert_eq!(after.name(), "skip");
}
