// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Composition of validated hooks into one ordered chain per event kind.

use crate::definition::HookDefinition;
use crate::diagnostic::HookDiagnostic;
use crate::event::EventKind;
use crate::registry::ValidatedHook;
use sha2::{Digest, Sha256};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

/// The ordered, deduplicated, enabled hooks for one event kind.
#[derive(Clone, Debug)]
pub struct EffectiveHookSet {
    kind: EventKind,
    hooks: Vec<ValidatedHook>,
    excluded: Vec<HookDiagnostic>,
}

/// Merge `hooks` into the effective set for `kind`.
///
/// Definitions sharing a handler path and matcher are collapsed to the one
/// from the highest tier (earliest registration within a tier). Deduplication
/// runs before the enabled filter, so a higher tier can switch off a hook
/// declared lower down by repeating it with `enabled: false`.
pub fn compose(kind: EventKind, hooks: &[ValidatedHook]) -> EffectiveHookSet {
    let mut winners: BTreeMap<(EventKind, &Path, &str), &ValidatedHook> = BTreeMap::new();
    let mut excluded = Vec::new();

    for hook in hooks.iter().filter(|h| h.definition.event == kind) {
        match winners.entry(hook.definition.identity()) {
            Entry::Vacant(slot) => {
                slot.insert(hook);
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get().definition.as_ref();
                if outranks(&hook.definition, current) {
                    excluded.push(HookDiagnostic::duplicate(current, &hook.definition));
                    slot.insert(hook);
                } else {
                    excluded.push(HookDiagnostic::duplicate(&hook.definition, current));
                }
            }
        }
    }

    let mut chain = Vec::with_capacity(winners.len());
    for hook in winners.into_values() {
        if hook.definition.enabled {
            chain.push(hook.clone());
        } else {
            excluded.push(HookDiagnostic::disabled(&hook.definition));
        }
    }
    chain.sort_by(|a, b| a.definition.chain_order(&b.definition));

    EffectiveHookSet {
        kind,
        hooks: chain,
        excluded,
    }
}

/// Higher tier wins; within a tier the earlier registration wins.
fn outranks(candidate: &HookDefinition, current: &HookDefinition) -> bool {
    candidate
        .source_tier
        .cmp(&current.source_tier)
        .then_with(|| current.registration_index.cmp(&candidate.registration_index))
        .is_gt()
}

impl EffectiveHookSet {
    pub fn empty(kind: EventKind) -> Self {
        Self {
            kind,
            hooks: Vec::new(),
            excluded: Vec::new(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Hooks in chain order.
    pub fn hooks(&self) -> &[ValidatedHook] {
        &self.hooks
    }

    /// Definitions dropped during composition (duplicates and disabled).
    pub fn excluded(&self) -> &[HookDiagnostic] {
        &self.excluded
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidatedHook> {
        self.hooks.iter()
    }

    /// The chain for one event, in order.
    ///
    /// With no subject every hook qualifies.
    pub fn matching(&self, subject: Option<&str>) -> Vec<&ValidatedHook> {
        self.hooks
            .iter()
            .filter(|hook| subject.is_none_or(|s| hook.matcher.matches(s)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// SHA-256 over the ordered definitions, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.kind.wire_name().as_bytes());
        for hook in &self.hooks {
            let def = &hook.definition;
            hasher.update(
                format!(
                    "\n{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    def.matcher_pattern,
                    def.handler_path.display(),
                    def.priority,
                    def.enabled,
                    def.timeout_ms,
                    def.run_async,
                    def.source_tier,
                    def.registration_index
                )
                .as_bytes(),
            );
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod tests;
