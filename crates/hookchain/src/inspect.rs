// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read models over a snapshot: the effective chain for a kind, and which
//! of its hooks an operation would run.

use crate::definition::HookDefinition;
use crate::diagnostic::HookDiagnostic;
use crate::event::EventKind;
use crate::snapshot::HookSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The effective chain for one event kind.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookListing {
    pub event: EventKind,
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub fingerprint: String,
    pub hooks: Vec<ListedHook>,
    /// Records declared for this kind that are not in the chain
    pub excluded: Vec<HookDiagnostic>,
}

/// One hook in chain order (1-based).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedHook {
    pub position: usize,
    #[serde(flatten)]
    pub definition: HookDefinition,
}

/// List the effective hooks for `kind`.
pub fn list_effective(snapshot: &HookSnapshot, kind: EventKind) -> HookListing {
    let (hooks, fingerprint) = match snapshot.effective(kind) {
        Some(set) => (
            set.iter()
                .enumerate()
                .map(|(i, hook)| ListedHook {
                    position: i + 1,
                    definition: hook.definition.as_ref().clone(),
                })
                .collect(),
            set.fingerprint(),
        ),
        None => (Vec::new(), String::new()),
    };

    HookListing {
        event: kind,
        version: snapshot.version(),
        loaded_at: snapshot.loaded_at(),
        fingerprint,
        hooks,
        excluded: excluded_for(snapshot, kind),
    }
}

/// Listings for every event kind, in declaration order.
pub fn list_all(snapshot: &HookSnapshot) -> Vec<HookListing> {
    EventKind::all()
        .iter()
        .map(|kind| list_effective(snapshot, *kind))
        .collect()
}

/// Diagnostics that are not tied to any single event kind, such as
/// unreadable files and records naming an unknown event.
pub fn unattributed(snapshot: &HookSnapshot) -> Vec<HookDiagnostic> {
    snapshot
        .diagnostics()
        .iter()
        .filter(|diag| diagnostic_kind(diag).is_none())
        .cloned()
        .collect()
}

fn excluded_for(snapshot: &HookSnapshot, kind: EventKind) -> Vec<HookDiagnostic> {
    snapshot
        .diagnostics()
        .iter()
        .filter(|diag| diagnostic_kind(diag) == Some(kind))
        .cloned()
        .collect()
}

fn diagnostic_kind(diag: &HookDiagnostic) -> Option<EventKind> {
    diag.event.as_deref().and_then(|name| name.parse().ok())
}

/// How each hook in the effective chain relates to one subject.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchExplanation {
    pub event: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub entries: Vec<ExplainEntry>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainEntry {
    /// Position in the full effective chain (1-based)
    pub position: usize,
    pub matched: bool,
    /// Position among the hooks that would actually run (1-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_position: Option<usize>,
    pub definition: HookDefinition,
}

impl MatchExplanation {
    /// Definitions that would run, in order.
    pub fn chain(&self) -> impl Iterator<Item = &HookDefinition> {
        self.entries
            .iter()
            .filter(|entry| entry.matched)
            .map(|entry| &entry.definition)
    }
}

/// Explain which hooks for `kind` an event with `subject` would run.
///
/// Kinds without a subject (session stop, prompt submit) match every hook,
/// and so does `subject = None`.
pub fn explain(snapshot: &HookSnapshot, kind: EventKind, subject: Option<&str>) -> MatchExplanation {
    let subject = subject.filter(|_| has_subject(kind));
    let mut next_chain_position = 1;
    let entries = snapshot
        .effective(kind)
        .map(|set| {
            set.iter()
                .enumerate()
                .map(|(i, hook)| {
                    let matched = subject.is_none_or(|s| hook.matcher.matches(s));
                    let chain_position = matched.then(|| {
                        let position = next_chain_position;
                        next_chain_position += 1;
                        position
                    });
                    ExplainEntry {
                        position: i + 1,
                        matched,
                        chain_position,
                        definition: hook.definition.as_ref().clone(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    MatchExplanation {
        event: kind,
        subject: subject.map(str::to_string),
        entries,
    }
}

/// Whether events of `kind` carry a name that matchers select on.
pub const fn has_subject(kind: EventKind) -> bool {
    !matches!(kind, EventKind::SessionStop | EventKind::PromptSubmit)
}

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod tests;
