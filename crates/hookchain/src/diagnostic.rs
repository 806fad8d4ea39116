// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Records of hooks excluded from composition.
//!
//! Every record that does not end up in an effective hook set leaves a
//! diagnostic naming its tier, matcher, handler, and the reason.

use crate::definition::{HookDefinition, RawHook};
use crate::error::ConfigError;
use crate::source::SourceTier;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a record was excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ExclusionReason {
    UnknownEvent,
    InvalidMatcher,
    UnresolvedHandler,
    InvalidPriority,
    InvalidTimeout,
    MalformedRecord,
    SourceUnreadable,
    /// Shadowed by the same hook from a higher tier
    Duplicate,
    /// `enabled: false`
    Disabled,
}

impl ExclusionReason {
    pub fn from_error(error: &ConfigError) -> Self {
        match error {
            ConfigError::UnknownEvent(_) => Self::UnknownEvent,
            ConfigError::EmptyMatcher | ConfigError::Matcher(_) => Self::InvalidMatcher,
            ConfigError::UnresolvedHandler { .. } => Self::UnresolvedHandler,
            ConfigError::InvalidPriority(_) => Self::InvalidPriority,
            ConfigError::InvalidTimeout(_) => Self::InvalidTimeout,
            ConfigError::MalformedRecord(_) => Self::MalformedRecord,
            ConfigError::SourceUnreadable { .. } => Self::SourceUnreadable,
        }
    }
}

/// One excluded record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDiagnostic {
    pub tier: SourceTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub matcher: String,
    pub handler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<PathBuf>,
    pub reason: ExclusionReason,
    pub detail: String,
}

impl HookDiagnostic {
    /// A raw record that failed validation.
    pub fn rejected(tier: SourceTier, raw: &RawHook, error: &ConfigError) -> Self {
        Self {
            tier,
            event: (!raw.event.is_empty()).then(|| raw.event.clone()),
            matcher: raw.matcher.clone(),
            handler: raw.handler.clone(),
            origin: raw.origin.clone(),
            reason: ExclusionReason::from_error(error),
            detail: error.to_string(),
        }
    }

    /// A whole source that could not be read or parsed.
    pub fn source_failure(tier: SourceTier, error: &ConfigError) -> Self {
        let origin = match error {
            ConfigError::SourceUnreadable { path, .. } => Some(path.clone()),
            _ => None,
        };
        Self {
            tier,
            event: None,
            matcher: String::new(),
            handler: String::new(),
            origin,
            reason: ExclusionReason::from_error(error),
            detail: error.to_string(),
        }
    }

    /// `shadowed` lost deduplication to `winner`.
    pub fn duplicate(shadowed: &HookDefinition, winner: &HookDefinition) -> Self {
        Self {
            detail: format!(
                "shadowed by the same hook from {} (registration #{})",
                winner.source_tier, winner.registration_index
            ),
            ..Self::for_definition(shadowed, ExclusionReason::Duplicate)
        }
    }

    pub fn disabled(definition: &HookDefinition) -> Self {
        Self {
            detail: "disabled".to_string(),
            ..Self::for_definition(definition, ExclusionReason::Disabled)
        }
    }

    fn for_definition(definition: &HookDefinition, reason: ExclusionReason) -> Self {
        Self {
            tier: definition.source_tier,
            event: Some(definition.event.to_string()),
            matcher: definition.matcher_pattern.clone(),
            handler: definition.handler_path.display().to_string(),
            origin: definition.origin.clone(),
            reason,
            detail: String::new(),
        }
    }

    /// Whether the exclusion stems from bad configuration, as opposed to
    /// deduplication or an explicit `enabled: false`.
    pub fn is_error(&self) -> bool {
        !matches!(
            self.reason,
            ExclusionReason::Duplicate | ExclusionReason::Disabled
        )
    }
}

impl fmt::Display for HookDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tier)?;
        if let Some(event) = &self.event {
            write!(f, " {event}")?;
        }
        if !self.matcher.is_empty() || !self.handler.is_empty() {
            write!(f, " {} -> {}", self.matcher, self.handler)?;
        }
        if let Some(origin) = &self.origin {
            write!(f, " ({})", origin.display())?;
        }
        write!(f, ": {}", self.detail)
    }
}

#[cfg(test)]
#[path = "diagnostic_tests.rs"]
mod tests;
