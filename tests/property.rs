#![allow(clippy::unwrap_used)]
//! Property-based tests for focal.
//!
//! Uses proptest to find edge cases automatically through randomized
//! element trees and focus churn.

use focal::element::{Document, Element, ElementId, ElementKind};
use focal::focusable::is_focusable;
use focal::manager::{FocusManager, FocusRule};
use focal::navigation::step;
use proptest::prelude::*;

/// One element of a generated tree: parent among the earlier elements,
/// a kind, and visibility/enabled flags.
#[derive(Debug, Clone)]
struct NodeSpec {
    parent: usize,
    kind: ElementKind,
    visible: bool,
    enabled: bool,
}

fn node_specs(max: usize) -> impl Strategy<Value = Vec<NodeSpec>> {
    prop::collection::vec(
        (
            any::<prop::sample::Index>(),
            prop_oneof![
                Just(ElementKind::Pane),
                Just(ElementKind::TextField),
                Just(ElementKind::Button),
                Just(ElementKind::Label),
            ],
            any::<bool>(),
            any::<bool>(),
        ),
        1..max,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (pidx, kind, visible, enabled))| NodeSpec {
                parent: if i == 0 { 0 } else { pidx.index(i) },
                kind,
                visible,
                enabled,
            })
            .collect()
    })
}

/// Materialize the specs below `form`. Element `i`'s parent is element
/// `spec.parent` (always `< i`), or the form for the first one.
fn build(doc: &mut Document, form: ElementId, specs: &[NodeSpec]) -> Vec<ElementId> {
    let mut ids: Vec<ElementId> = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let parent = if i == 0 { form } else { ids[spec.parent] };
        let id = doc.append(
            parent,
            Element::new(spec.kind)
                .visible(spec.visible)
                .enabled(spec.enabled),
        );
        ids.push(id);
    }
    ids
}

proptest! {
    /// After validation, focus is on a focusable element of the scope
    /// whenever one exists, and parked on the container otherwise.
    #[test]
    fn validated_focus_is_always_legal(specs in node_specs(24)) {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane).named("form"));
        let ids = build(&mut doc, form, &specs);

        let mut fm = FocusManager::default();
        fm.install_focus_context(&mut doc, form, FocusRule::Auto).unwrap();
        fm.validate_focus(&mut doc);

        let focused = doc.focused();
        if ids.iter().any(|&el| is_focusable(&doc, el)) {
            let el = focused.expect("a focusable scope must hold focus");
            prop_assert!(is_focusable(&doc, el));
        } else {
            prop_assert_eq!(focused, Some(form));
        }
    }

    /// Validation is idempotent: a second run moves nothing and emits no
    /// focus-change events.
    #[test]
    fn validation_is_idempotent(specs in node_specs(24)) {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane).named("form"));
        build(&mut doc, form, &specs);

        let mut fm = FocusManager::default();
        fm.install_focus_context(&mut doc, form, FocusRule::Auto).unwrap();
        fm.validate_focus(&mut doc);
        let settled = doc.focused();
        doc.take_events();

        fm.validate_focus(&mut doc);
        prop_assert_eq!(doc.focused(), settled);
        prop_assert_eq!(doc.take_events().len(), 0);
    }

    /// Validation survives arbitrary element removal: removing any subtree
    /// and validating again never leaves focus on a detached element.
    #[test]
    fn removal_never_strands_focus(specs in node_specs(24), victim in any::<prop::sample::Index>()) {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane).named("form"));
        let ids = build(&mut doc, form, &specs);

        let mut fm = FocusManager::default();
        fm.install_focus_context(&mut doc, form, FocusRule::Auto).unwrap();

        doc.remove(ids[victim.index(ids.len())]);
        fm.validate_focus(&mut doc);

        if let Some(el) = doc.focused() {
            prop_assert!(doc.is_attached(el));
        }
    }

    /// Registering and unregistering a glass-pane target is symmetric:
    /// while registered every element of the subtree is blocked, afterwards
    /// nothing is.
    #[test]
    fn glass_pane_blocking_is_symmetric(specs in node_specs(24), target in any::<prop::sample::Index>()) {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane).named("form"));
        let ids = build(&mut doc, form, &specs);
        let target = ids[target.index(ids.len())];

        let mut fm = FocusManager::default();
        prop_assert!(fm.register_glass_pane_target(&mut doc, target));
        prop_assert!(fm.is_element_covert_by_glass_pane(&doc, target, None));
        for el in doc.descendants(target).collect::<Vec<_>>() {
            prop_assert!(fm.is_element_covert_by_glass_pane(&doc, el, None));
        }

        prop_assert!(fm.unregister_glass_pane_target(&mut doc, target));
        for &el in &ids {
            prop_assert!(!fm.is_element_covert_by_glass_pane(&doc, el, None));
        }
    }

    /// Forward and backward tab steps are inverses, and a full cycle of
    /// forward steps returns to the starting element.
    #[test]
    fn tab_step_cycles(len in 1usize..12, start in any::<prop::sample::Index>()) {
        let order: Vec<ElementId> = (0..len as u64).map(ElementId).collect();
        let start = order[start.index(len)];

        let forward = step(&order, Some(start), true);
        prop_assert_eq!(step(&order, forward, false), Some(start));

        let mut cur = Some(start);
        for _ in 0..len {
            cur = step(&order, cur, true);
        }
        prop_assert_eq!(cur, Some(start));
    }
}
