// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resolution of chain outcomes into caller actions.

use crate::dispatcher::ChainOutcome;
use crate::event::EventPayload;

/// What the caller must do with the triggering action.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedAction {
    /// Go ahead, with this (possibly replaced) payload
    Proceed(EventPayload),
    /// Silently drop the action
    Suppress(String),
    /// Fail the action
    Abort(String),
}

impl ResolvedAction {
    /// Process exit code mirroring the handler contract: 0, 2 or 1.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Proceed(_) => 0,
            Self::Suppress(_) => 2,
            Self::Abort(_) => 1,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Proceed(_) => "proceed",
            Self::Suppress(_) => "suppress",
            Self::Abort(_) => "abort",
        }
    }
}

/// Resolve a chain outcome.
///
/// Skip and Error only gate blocking kinds. For events raised after the fact
/// they are logged and the original payload proceeds.
pub fn resolve(outcome: ChainOutcome) -> ResolvedAction {
    let kind = outcome.kind();
    match outcome {
        ChainOutcome::Continue(payload) | ChainOutcome::Modify { payload, .. } => {
            ResolvedAction::Proceed(payload)
        }
        ChainOutcome::Skip { reason, hook, .. } if kind.is_blocking() => {
            tracing::debug!(hook = %hook.describe(), %reason, "suppressing action");
            ResolvedAction::Suppress(reason)
        }
        ChainOutcome::Skip {
            reason,
            hook,
            payload,
        } => {
            tracing::warn!(
                %kind,
                hook = %hook.describe(),
                %reason,
                "skip has no effect on a non-blocking event; proceeding"
            );
            ResolvedAction::Proceed(payload)
        }
        ChainOutcome::Error { failure, hook, .. } if kind.is_blocking() => {
            tracing::warn!(
                hook = %hook.describe(),
                category = failure.category(),
                error = %failure,
                "aborting action"
            );
            ResolvedAction::Abort(format!("{failure} ({})", hook.describe()))
        }
        ChainOutcome::Error {
            failure,
            hook,
            payload,
        } => {
            tracing::warn!(
                %kind,
                hook = %hook.describe(),
                category = failure.category(),
                error = %failure,
                "hook failed on a non-blocking event; proceeding"
            );
            ResolvedAction::Proceed(payload)
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
