// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use std::path::PathBuf;
use crate::diagnostic::ExclusionReason;
use crate::source::SourceTier;
use proptest::prelude::*;

fn hook(
    kind: EventKind,
    matcher: &str,
    handler: &str,
    priority: i64,
    tier: SourceTier,
    index: usize,
) -> ValidatedHook {
    ValidatedHook::new(HookDefinition {
        event: kind,
        matcher_pattern: matcher.to_string(),
        handler_path: PathBuf::from(handler),
        priority,
        enabled: true,
        timeout_ms: 1000,
        run_async: false,
        source_tier: tier,
        registration_index: index,
        origin: None,
    })
    .unwrap()
}

fn pre(matcher: &str, handler: &str, priority: i64, tier: SourceTier, index: usize) -> ValidatedHook {
    hook(EventKind::PreOperation, matcher, handler, priority, tier, index)
}

fn disabled(mut hook: ValidatedHook) -> ValidatedHook {
    let mut def = (*hook.definition).clone();
    def.enabled = false;
    hook.definition = def.into();
    hook
}

fn handlers(set: &EffectiveHookSet) -> Vec<String> {
    set.iter()
        .map(|h| h.definition.handler_path.display().to_string())
        .collect()
}

// =========================================================================
// Ordering
// =========================================================================

#[test]
fn orders_by_priority_descending() {
    let hooks = vec![
        pre("Bash", "/h/low", -100, SourceTier::UserSettings, 0),
        pre("Bash", "/h/high", 100, SourceTier::Builtin, 1),
        pre("Bash", "/h/mid", 50, SourceTier::AddonManifest, 2),
    ];
    let set = compose(EventKind::PreOperation, &hooks);
    assert_eq!(handlers(&set), ["/h/high", "/h/mid", "/h/low"]);
}

#[test]
fn equal_priority_user_settings_before_builtin() {
    let hooks = vec![
        pre("Bash", "/h/builtin", 0, SourceTier::Builtin, 0),
        pre("Bash", "/h/user", 0, SourceTier::UserSettings, 1),
    ];
    let set = compose(EventKind::PreOperation, &hooks);
    assert_eq!(handlers(&set), ["/h/user", "/h/builtin"]);
}

#[test]
fn equal_priority_and_tier_keeps_registration_order() {
    let hooks = vec![
        pre("Bash", "/h/b", 5, SourceTier::AddonManifest, 3),
        pre("Bash", "/h/a", 5, SourceTier::AddonManifest, 1),
    ];
    let set = compose(EventKind::PreOperation, &hooks);
    assert_eq!(handlers(&set), ["/h/a", "/h/b"]);
}

#[test]
fn filters_by_event_kind() {
    let hooks = vec![
        pre("Bash", "/h/pre", 0, SourceTier::Builtin, 0),
        hook(EventKind::PostOperation, "Bash", "/h/post", 0, SourceTier::Builtin, 1),
    ];
    let set = compose(EventKind::PostOperation, &hooks);
    assert_eq!(set.kind(), EventKind::PostOperation);
    assert_eq!(handlers(&set), ["/h/post"]);
}

// =========================================================================
// Deduplication
// =========================================================================

#[test]
fn duplicate_keeps_highest_tier() {
    let hooks = vec![
        pre("Bash", "/h/guard", 10, SourceTier::Builtin, 0),
        pre("Bash", "/h/guard", 1, SourceTier::UserSettings, 1),
        pre("Bash", "/h/guard", 99, SourceTier::SetupManifest, 2),
    ];
    let set = compose(EventKind::PreOperation, &hooks);

    assert_eq!(set.len(), 1);
    let winner = &set.hooks()[0].definition;
    assert_eq!(winner.source_tier, SourceTier::UserSettings);
    assert_eq!(winner.priority, 1);

    assert_eq!(set.excluded().len(), 2);
    assert!(set
        .excluded()
        .iter()
        .all(|d| d.reason == ExclusionReason::Duplicate));
}

#[test]
fn duplicate_within_tier_keeps_earliest() {
    let hooks = vec![
        pre("Bash", "/h/guard", 7, SourceTier::AddonManifest, 4),
        pre("Bash", "/h/guard", 3, SourceTier::AddonManifest, 2),
    ];
    let set = compose(EventKind::PreOperation, &hooks);
    assert_eq!(set.hooks()[0].definition.registration_index, 2);
}

#[test]
fn same_handler_different_matcher_is_not_a_duplicate() {
    let hooks = vec![
        pre("Bash", "/h/guard", 0, SourceTier::Builtin, 0),
        pre("Write", "/h/guard", 0, SourceTier::Builtin, 1),
    ];
    assert_eq!(compose(EventKind::PreOperation, &hooks).len(), 2);
}

#[test]
fn disabled_hooks_are_excluded_with_reason() {
    let hooks = vec![disabled(pre("Bash", "/h/off", 0, SourceTier::Builtin, 0))];
    let set = compose(EventKind::PreOperation, &hooks);
    assert!(set.is_empty());
    assert_eq!(set.excluded()[0].reason, ExclusionReason::Disabled);
}

#[test]
fn higher_tier_disabled_duplicate_switches_hook_off() {
    let hooks = vec![
        pre("Bash", "/h/guard", 0, SourceTier::Builtin, 0),
        disabled(pre("Bash", "/h/guard", 0, SourceTier::UserSettings, 1)),
    ];
    let set = compose(EventKind::PreOperation, &hooks);
    assert!(set.is_empty());
    let reasons: Vec<_> = set.excluded().iter().map(|d| d.reason).collect();
    assert_eq!(
        reasons,
        [ExclusionReason::Duplicate, ExclusionReason::Disabled]
    );
}

// =========================================================================
// Matching
// =========================================================================

#[test]
fn matching_filters_by_subject_in_order() {
    let hooks = vec![
        pre("Read*", "/h/read", 0, SourceTier::Builtin, 0),
        pre("*", "/h/all", 10, SourceTier::Builtin, 1),
        pre("Write", "/h/write", 20, SourceTier::Builtin, 2),
    ];
    let set = compose(EventKind::PreOperation, &hooks);

    let chain: Vec<_> = set
        .matching(Some("ReadFile"))
        .iter()
        .map(|h| h.definition.handler_path.display().to_string())
        .collect();
    assert_eq!(chain, ["/h/all", "/h/read"]);
    assert_eq!(set.matching(Some("Nothing")).len(), 1);
}

#[test]
fn matching_without_subject_takes_every_hook() {
    let hooks = vec![
        hook(EventKind::SessionStop, "Bash", "/h/a", 0, SourceTier::Builtin, 0),
        hook(EventKind::SessionStop, "*", "/h/b", 0, SourceTier::Builtin, 1),
    ];
    let set = compose(EventKind::SessionStop, &hooks);
    assert_eq!(set.matching(None).len(), 2);
}

// =========================================================================
// Fingerprint
// =========================================================================

#[test]
fn fingerprint_changes_with_contents() {
    let a = compose(
        EventKind::PreOperation,
        &[pre("Bash", "/h/a", 0, SourceTier::Builtin, 0)],
    );
    let b = compose(
        EventKind::PreOperation,
        &[pre("Bash", "/h/a", 1, SourceTier::Builtin, 0)],
    );
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint().len(), 64);
}

#[test]
fn empty_sets_of_different_kinds_differ() {
    assert_ne!(
        EffectiveHookSet::empty(EventKind::PreOperation).fingerprint(),
        EffectiveHookSet::empty(EventKind::PostOperation).fingerprint()
    );
}

// =========================================================================
// Properties
// =========================================================================

const MATCHERS: &[&str] = &["Bash", "Read*", "*", "(Read|Write)"];
const HANDLERS: &[&str] = &["/h/a", "/h/b", "/h/c"];

fn arb_hooks() -> impl Strategy<Value = Vec<ValidatedHook>> {
    prop::collection::vec(
        (
            0..MATCHERS.len(),
            0..HANDLERS.len(),
            -3i64..3,
            0..SourceTier::all().len(),
            any::<bool>(),
        ),
        0..16,
    )
    .prop_map(|records| {
        records
            .into_iter()
            .enumerate()
            .map(|(index, (m, h, priority, tier, enabled))| {
                let hook = pre(
                    MATCHERS[m],
                    HANDLERS[h],
                    priority,
                    SourceTier::all()[tier],
                    index,
                );
                if enabled {
                    hook
                } else {
                    disabled(hook)
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn chain_is_sorted_and_unique(hooks in arb_hooks()) {
        let set = compose(EventKind::PreOperation, &hooks);
        for pair in set.hooks().windows(2) {
            prop_assert!(pair[0].definition.chain_order(&pair[1].definition).is_lt());
        }
        let mut keys: Vec<_> = set
            .iter()
            .map(|h| (h.definition.handler_path.clone(), h.definition.matcher_pattern.clone()))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
        prop_assert!(set.iter().all(|h| h.definition.enabled));
    }

    #[test]
    fn compose_is_idempotent(hooks in arb_hooks()) {
        let first = compose(EventKind::PreOperation, &hooks);
        let second = compose(EventKind::PreOperation, &hooks);
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn input_order_does_not_affect_chain(
        (hooks, shuffled) in arb_hooks().prop_flat_map(|hooks| {
            let shuffled = Just(hooks.clone()).prop_shuffle();
            (Just(hooks), shuffled)
        })
    ) {
        prop_assert_eq!(
            compose(EventKind::PreOperation, &hooks).fingerprint(),
            compose(EventKind::PreOperation, &shuffled).fingerprint()
        );
    }

    #[test]
    fn every_input_is_accounted_for(hooks in arb_hooks()) {
        let set = compose(EventKind::PreOperation, &hooks);
        prop_assert_eq!(set.len() + set.excluded().len(), hooks.len());
    }
}
