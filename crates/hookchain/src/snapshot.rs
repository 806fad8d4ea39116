// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned, immutable hook snapshots and the store that swaps them.
//!
//! A dispatch clones the current `Arc<HookSnapshot>` once and works from it
//! until it resolves, so a reload never changes a chain mid-flight.

use crate::compose::EffectiveHookSet;
use crate::diagnostic::HookDiagnostic;
use crate::event::EventKind;
use crate::loader::HookSources;
use crate::registry::HookRegistry;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Effective hook sets for every event kind, computed once per load.
#[derive(Clone, Debug)]
pub struct HookSnapshot {
    version: u64,
    loaded_at: DateTime<Utc>,
    sets: BTreeMap<EventKind, EffectiveHookSet>,
    diagnostics: Vec<HookDiagnostic>,
}

impl HookSnapshot {
    /// Snapshot with no hooks (version 0).
    pub fn empty() -> Self {
        Self {
            version: 0,
            loaded_at: Utc::now(),
            sets: EventKind::all()
                .iter()
                .map(|kind| (*kind, EffectiveHookSet::empty(*kind)))
                .collect(),
            diagnostics: Vec::new(),
        }
    }

    pub fn from_registry(registry: &HookRegistry, version: u64) -> Self {
        let sets: BTreeMap<_, _> = EventKind::all()
            .iter()
            .map(|kind| (*kind, registry.compose(*kind)))
            .collect();

        let mut diagnostics = registry.diagnostics().to_vec();
        for set in sets.values() {
            diagnostics.extend(set.excluded().iter().cloned());
        }

        Self {
            version,
            loaded_at: Utc::now(),
            sets,
            diagnostics,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// The composed chain for `kind`.
    pub fn effective(&self, kind: EventKind) -> Option<&EffectiveHookSet> {
        self.sets.get(&kind)
    }

    pub fn sets(&self) -> impl Iterator<Item = &EffectiveHookSet> {
        self.sets.values()
    }

    /// Every excluded record: validation failures, unreadable sources,
    /// duplicates and disabled hooks.
    pub fn diagnostics(&self) -> &[HookDiagnostic] {
        &self.diagnostics
    }

    pub fn hook_count(&self) -> usize {
        self.sets.values().map(EffectiveHookSet::len).sum()
    }
}

/// Holds the current snapshot and replaces it atomically on reload.
#[derive(Debug)]
pub struct HookStore {
    current: RwLock<Arc<HookSnapshot>>,
    next_version: AtomicU64,
}

impl Default for HookStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HookStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(HookSnapshot::empty())),
            next_version: AtomicU64::new(1),
        }
    }

    pub fn from_registry(registry: &HookRegistry) -> Self {
        let store = Self::new();
        store.install(registry);
        store
    }

    /// The snapshot new dispatches should use.
    pub fn current(&self) -> Arc<HookSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Compose `registry` into a new snapshot and make it current.
    pub fn install(&self, registry: &HookRegistry) -> Arc<HookSnapshot> {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let snapshot = Arc::new(HookSnapshot::from_registry(registry, version));

        tracing::info!(
            version,
            hooks = snapshot.hook_count(),
            excluded = snapshot.diagnostics().iter().filter(|d| d.is_error()).count(),
            "loaded hook snapshot"
        );

        let mut current = self.current.write();
        // Concurrent installs must not roll back to an older version.
        if current.version() < snapshot.version() {
            *current = Arc::clone(&snapshot);
        }
        snapshot
    }

    /// Re-read every configuration source and install the result.
    pub fn reload(&self, sources: &HookSources) -> Arc<HookSnapshot> {
        self.install(&sources.load())
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
