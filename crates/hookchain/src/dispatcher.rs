// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook chain execution.
//!
//! A dispatch takes the current snapshot once, selects the hooks whose
//! matcher accepts the event's subject, and runs them in chain order:
//!
//! | Handler result                     | Effect                     |
//! |------------------------------------|----------------------------|
//! | exit 0, no output                  | next hook                  |
//! | exit 0, replacement payload        | `Modify`, chain ends       |
//! | exit 2                             | `Skip`, chain ends         |
//! | exit 1, other code, timeout, junk  | `Error`, chain ends        |
//!
//! Hooks marked `async` are started in the background and never affect the
//! outcome.

use crate::definition::HookDefinition;
use crate::error::{Cancelled, HandlerFailure, InvokeError};
use crate::event::{EventKind, EventPayload};
use crate::invoker::{HandlerInvoker, HandlerOutput, Invocation};
use crate::resolver::{self, ResolvedAction};
use crate::snapshot::{HookSnapshot, HookStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;
use uuid::Uuid;

/// How one handler result affects the chain.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Continue,
    Modify(EventPayload),
    Skip(String),
    Fail(HandlerFailure),
}

impl Verdict {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Modify(_) => "modify",
            Self::Skip(_) => "skip",
            Self::Fail(_) => "fail",
        }
    }
}

/// Classify a handler result for an event of `kind`.
pub fn classify(kind: EventKind, result: Result<HandlerOutput, InvokeError>) -> Verdict {
    let output = match result {
        Ok(output) => output,
        Err(InvokeError::Timeout(timeout)) => {
            return Verdict::Fail(HandlerFailure::Timeout {
                timeout_ms: millis(timeout),
            });
        }
        Err(e) => return Verdict::Fail(HandlerFailure::Launch(e.to_string())),
    };

    match output.exit_code {
        Some(0) if output.stdout.trim().is_empty() => Verdict::Continue,
        Some(0) => match EventPayload::from_json(kind, &output.stdout) {
            Ok(payload) => Verdict::Modify(payload),
            Err(e) => Verdict::Fail(HandlerFailure::MalformedOutput(e.to_string())),
        },
        Some(2) => Verdict::Skip(skip_reason(&output)),
        Some(1) => Verdict::Fail(HandlerFailure::Rejected(output.stderr.trim().to_string())),
        code => Verdict::Fail(HandlerFailure::Crash {
            exit_code: code,
            stderr: output.stderr.trim().to_string(),
        }),
    }
}

fn skip_reason(output: &HandlerOutput) -> String {
    [&output.stderr, &output.stdout]
        .into_iter()
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .unwrap_or("skipped by hook")
        .to_string()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Raw result of one dispatch, before per-kind resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum ChainOutcome {
    /// Every hook continued (or none matched)
    Continue(EventPayload),
    /// A hook asked for the action to be skipped
    Skip {
        reason: String,
        hook: Arc<HookDefinition>,
        payload: EventPayload,
    },
    /// A hook replaced the payload
    Modify {
        payload: EventPayload,
        hook: Arc<HookDefinition>,
    },
    /// A hook failed
    Error {
        failure: HandlerFailure,
        hook: Arc<HookDefinition>,
        payload: EventPayload,
    },
}

impl ChainOutcome {
    pub fn kind(&self) -> EventKind {
        self.payload().kind()
    }

    /// The payload the caller would proceed with.
    pub fn payload(&self) -> &EventPayload {
        match self {
            Self::Continue(payload)
            | Self::Skip { payload, .. }
            | Self::Modify { payload, .. }
            | Self::Error { payload, .. } => payload,
        }
    }

    /// The hook that ended the chain, if one did.
    pub fn hook(&self) -> Option<&HookDefinition> {
        match self {
            Self::Continue(_) => None,
            Self::Skip { hook, .. } | Self::Modify { hook, .. } | Self::Error { hook, .. } => {
                Some(hook.as_ref())
            }
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Continue(_) => "continue",
            Self::Skip { .. } => "skip",
            Self::Modify { .. } => "modify",
            Self::Error { .. } => "error",
        }
    }
}

/// Runs hook chains against the store's current snapshot.
pub struct Dispatcher {
    store: Arc<HookStore>,
    invoker: Arc<dyn HandlerInvoker>,
    background: TaskTracker,
}

impl Dispatcher {
    pub fn new(store: Arc<HookStore>, invoker: Arc<dyn HandlerInvoker>) -> Self {
        Self {
            store,
            invoker,
            background: TaskTracker::new(),
        }
    }

    pub fn store(&self) -> &Arc<HookStore> {
        &self.store
    }

    /// Run the chain for `event`.
    pub async fn dispatch(&self, event: EventPayload) -> ChainOutcome {
        let snapshot = self.store.current();
        let span = tracing::debug_span!(
            "dispatch",
            dispatch_id = %Uuid::new_v4(),
            kind = %event.kind(),
            version = snapshot.version(),
        );
        self.run_chain(&snapshot, event).instrument(span).await
    }

    /// Run the chain unless `cancel` fires first.
    ///
    /// On cancellation the in-flight handler process is killed. Async hooks
    /// already started are left to finish.
    pub async fn dispatch_with_cancel(
        &self,
        event: EventPayload,
        cancel: &CancellationToken,
    ) -> Result<ChainOutcome, Cancelled> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("dispatch cancelled");
                Err(Cancelled)
            }
            outcome = self.dispatch(event) => Ok(outcome),
        }
    }

    /// Run the chain and resolve it into the caller's action.
    pub async fn dispatch_resolved(&self, event: EventPayload) -> ResolvedAction {
        resolver::resolve(self.dispatch(event).await)
    }

    /// Wait for every async hook started so far.
    pub async fn drain_async(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }

    /// Number of async hooks still running.
    pub fn pending_async(&self) -> usize {
        self.background.len()
    }

    async fn run_chain(&self, snapshot: &HookSnapshot, event: EventPayload) -> ChainOutcome {
        let kind = event.kind();
        let chain = match snapshot.effective(kind) {
            Some(set) => set.matching(event.subject()),
            None => Vec::new(),
        };
        if chain.is_empty() {
            tracing::debug!(subject = ?event.subject(), "no matching hooks");
            return ChainOutcome::Continue(event);
        }

        let input = match event.to_wire_string() {
            Ok(input) => input,
            Err(e) => {
                return ChainOutcome::Error {
                    failure: HandlerFailure::Launch(e.to_string()),
                    hook: Arc::clone(&chain[0].definition),
                    payload: event,
                };
            }
        };

        for hook in chain {
            let def = &hook.definition;
            let invocation = Invocation::new(&def.handler_path, input.as_str(), def.timeout());

            if def.run_async {
                self.spawn_async(kind, Arc::clone(def), invocation);
                continue;
            }

            let started = Instant::now();
            let result = self.invoker.invoke(invocation).await;
            tracing::debug!(
                hook = %def.describe(),
                exit_code = ?result.as_ref().ok().and_then(|o| o.exit_code),
                elapsed_ms = millis(started.elapsed()),
                "hook finished"
            );

            match classify(kind, result) {
                Verdict::Continue => {}
                Verdict::Modify(payload) => {
                    return ChainOutcome::Modify {
                        payload,
                        hook: Arc::clone(def),
                    };
                }
                Verdict::Skip(reason) => {
                    return ChainOutcome::Skip {
                        reason,
                        hook: Arc::clone(def),
                        payload: event,
                    };
                }
                Verdict::Fail(failure) => {
                    return ChainOutcome::Error {
                        failure,
                        hook: Arc::clone(def),
                        payload: event,
                    };
                }
            }
        }

        ChainOutcome::Continue(event)
    }

    fn spawn_async(&self, kind: EventKind, hook: Arc<HookDefinition>, invocation: Invocation) {
        let invoker = Arc::clone(&self.invoker);
        self.background.spawn(
            async move {
                match classify(kind, invoker.invoke(invocation).await) {
                    Verdict::Fail(failure) => tracing::warn!(
                        hook = %hook.describe(),
                        category = failure.category(),
                        error = %failure,
                        "async hook failed"
                    ),
                    verdict => tracing::debug!(
                        hook = %hook.describe(),
                        ?verdict,
                        "async hook finished; result discarded"
                    ),
                }
            }
            .in_current_span(),
        );
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
