// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook definitions, raw and validated.

use crate::event::EventKind;
use crate::source::SourceTier;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeout applied when a record omits `timeoutMs`.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// A hook record as declared by a configuration source, before validation.
///
/// `priority` and `timeoutMs` are kept as raw JSON so that a bad value
/// rejects only this record instead of the whole document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHook {
    /// Event kind name; filled from the enclosing group key when loading files
    #[serde(default)]
    pub event: String,

    #[serde(default)]
    pub matcher: String,

    #[serde(default, alias = "command")]
    pub handler: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, alias = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<Value>,

    #[serde(default, rename = "async", skip_serializing_if = "Option::is_none")]
    pub run_async: Option<bool>,

    /// File the record was read from
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

impl RawHook {
    pub fn new(event: EventKind, matcher: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            event: event.wire_name().to_string(),
            matcher: matcher.into(),
            handler: handler.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(Value::from(priority));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(Value::from(timeout_ms));
        self
    }

    pub fn with_async(mut self, run_async: bool) -> Self {
        self.run_async = Some(run_async);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// A validated, immutable hook definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDefinition {
    pub event: EventKind,
    pub matcher_pattern: String,
    pub handler_path: PathBuf,
    pub priority: i64,
    pub enabled: bool,
    pub timeout_ms: u64,
    #[serde(rename = "async")]
    pub run_async: bool,
    pub source_tier: SourceTier,
    pub registration_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<PathBuf>,
}

impl HookDefinition {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Key under which definitions from different tiers are considered the
    /// same hook.
    pub fn identity(&self) -> (EventKind, &Path, &str) {
        (self.event, &self.handler_path, &self.matcher_pattern)
    }

    /// One-line description for logs: `[user] Bash -> /path/guard.sh (priority 10)`.
    pub fn describe(&self) -> String {
        format!(
            "[{}] {} -> {} (priority {})",
            self.source_tier,
            self.matcher_pattern,
            self.handler_path.display(),
            self.priority
        )
    }

    /// Chain order: priority descending, then tier descending, then
    /// registration order.
    pub fn chain_order(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.source_tier.cmp(&self.source_tier))
            .then_with(|| self.registration_index.cmp(&other.registration_index))
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
