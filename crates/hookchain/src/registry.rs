// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook registry: validates raw records from each source tier.

use crate::compose::{self, EffectiveHookSet};
use crate::definition::{HookDefinition, RawHook, DEFAULT_TIMEOUT_MS};
use crate::diagnostic::HookDiagnostic;
use crate::env;
use crate::error::{ConfigError, MatchCompileError};
use crate::event::EventKind;
use crate::handler_path::HandlerResolver;
use crate::matcher::{self, Matcher};
use crate::source::SourceTier;
use serde_json::Value;
use std::sync::Arc;

/// A definition whose matcher compiled and whose handler resolved.
#[derive(Clone, Debug)]
pub struct ValidatedHook {
    pub definition: Arc<HookDefinition>,
    pub matcher: Matcher,
}

impl ValidatedHook {
    /// Wrap an already validated definition, compiling its matcher.
    pub fn new(definition: HookDefinition) -> Result<Self, MatchCompileError> {
        let matcher = matcher::compile(&definition.matcher_pattern)?;
        Ok(Self {
            definition: Arc::new(definition),
            matcher,
        })
    }
}

/// Outcome of registering one batch.
#[derive(Clone, Debug, Default)]
pub struct Registration {
    pub accepted: Vec<ValidatedHook>,
    pub rejected: Vec<HookDiagnostic>,
}

/// Validated hooks and exclusion diagnostics from every source tier.
#[derive(Clone, Debug)]
pub struct HookRegistry {
    hooks: Vec<ValidatedHook>,
    diagnostics: Vec<HookDiagnostic>,
    next_index: usize,
    resolver: HandlerResolver,
    default_timeout_ms: u64,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    /// Create a registry resolving handlers from the process environment.
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            diagnostics: Vec::new(),
            next_index: 0,
            resolver: HandlerResolver::from_env(),
            default_timeout_ms: env::default_timeout_ms()
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_resolver(mut self, resolver: HandlerResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Validate a batch of records from one tier.
    ///
    /// Every record consumes a registration index, accepted or not, so the
    /// order of later records does not depend on earlier failures.
    pub fn register(&mut self, tier: SourceTier, raw: Vec<RawHook>) -> Registration {
        let mut registration = Registration::default();

        for record in raw {
            let index = self.next_index;
            self.next_index += 1;

            match self.validate(tier, &record, index) {
                Ok(hook) => {
                    tracing::debug!(hook = %hook.definition.describe(), "registered hook");
                    registration.accepted.push(hook);
                }
                Err(error) => {
                    let diag = HookDiagnostic::rejected(tier, &record, &error);
                    tracing::warn!(
                        tier = %tier,
                        matcher = %record.matcher,
                        handler = %record.handler,
                        reason = %error,
                        "excluding hook"
                    );
                    registration.rejected.push(diag);
                }
            }
        }

        self.hooks.extend(registration.accepted.iter().cloned());
        self.diagnostics
            .extend(registration.rejected.iter().cloned());
        registration
    }

    /// Record an exclusion found before validation (unreadable file,
    /// malformed record). Consumes no registration index.
    pub fn record(&mut self, diagnostic: HookDiagnostic) {
        tracing::warn!(%diagnostic, "excluding hook source");
        self.diagnostics.push(diagnostic);
    }

    pub fn hooks(&self) -> &[ValidatedHook] {
        &self.hooks
    }

    /// Registration-time diagnostics, in the order they were recorded.
    pub fn diagnostics(&self) -> &[HookDiagnostic] {
        &self.diagnostics
    }

    /// Compose the effective hook set for one event kind.
    pub fn compose(&self, kind: EventKind) -> EffectiveHookSet {
        compose::compose(kind, &self.hooks)
    }

    fn validate(
        &self,
        tier: SourceTier,
        raw: &RawHook,
        index: usize,
    ) -> Result<ValidatedHook, ConfigError> {
        let event: EventKind = raw
            .event
            .parse()
            .map_err(|_| ConfigError::UnknownEvent(raw.event.clone()))?;

        if raw.matcher.trim().is_empty() {
            return Err(ConfigError::EmptyMatcher);
        }
        let matcher = matcher::compile(&raw.matcher)?;

        let base_dir = raw.origin.as_deref().and_then(|origin| origin.parent());
        let handler_path = self.resolver.resolve(&raw.handler, base_dir)?;

        let priority = parse_priority(raw.priority.as_ref())?;
        let timeout_ms = parse_timeout(raw.timeout_ms.as_ref(), self.default_timeout_ms)?;

        let definition = HookDefinition {
            event,
            matcher_pattern: matcher.pattern().to_string(),
            handler_path,
            priority,
            enabled: raw.enabled.unwrap_or(true),
            timeout_ms,
            run_async: raw.run_async.unwrap_or(false),
            source_tier: tier,
            registration_index: index,
            origin: raw.origin.clone(),
        };

        Ok(ValidatedHook {
            definition: Arc::new(definition),
            matcher,
        })
    }
}

fn parse_priority(value: Option<&Value>) -> Result<i64, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| ConfigError::InvalidPriority(v.to_string())),
    }
}

fn parse_timeout(value: Option<&Value>, default_ms: u64) -> Result<u64, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(default_ms),
        Some(v) => v
            .as_u64()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| ConfigError::InvalidTimeout(v.to_string())),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
