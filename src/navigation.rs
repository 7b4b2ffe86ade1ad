//! Tab-order computation and the first-focusable-element heuristic.
//!
//! The tab order inside a scope is simply document order over the elements
//! the focusability predicate accepts and no glass pane blocks. The
//! interesting part is the *initial* focus target of a freshly installed
//! scope: the heuristic is deliberately biased against inline action
//! buttons so that opening a form or dialog lands on a meaningful input
//! field rather than, say, a toolbar's first icon button.

use crate::element::{Caps, Document, ElementId, ElementKind};
use crate::filter::{self, FilterFn};
use crate::focusable::{accepts_initial_focus, is_focusable};
use crate::glass_pane::GlassPaneRegistry;
use smallvec::SmallVec;

/// All tabbable elements inside `container`, in document order: focusable,
/// not glass-blocked, passing `filter`. The container itself is never part
/// of its own tab cycle.
pub fn tabbable_elements(
    doc: &Document,
    panes: &GlassPaneRegistry,
    container: ElementId,
    filter: Option<FilterFn<'_>>,
) -> SmallVec<[ElementId; 16]> {
    doc.descendants(container)
        .filter(|&el| {
            is_focusable(doc, el)
                && !panes.is_blocked(doc, el, None)
                && filter::passes(filter, doc, el)
        })
        .collect()
}

/// The "natural" initial focus target among the descendants of `container`.
///
/// Single document-order pass over candidates (automatic-focus eligible,
/// unblocked, passing `filter`), tracking three fallbacks:
///
/// - `first_element`: the first candidate that is NOT a button/menu-item,
/// - `first_default_button`: the first candidate tagged as the scope's
///   default action,
/// - `first_button`: the first button/menu-item candidate, wherever it
///   sits (bar/box chrome or inline).
///
/// A plain candidate outside the chrome containers (menu bar, tab header,
/// button box) wins immediately: ordinary form fields beat buttons
/// regardless of document order. Otherwise the default button is preferred,
/// then `first_button`, with one exception: when `first_element` is a tab
/// item living in the same tab header as `first_button`, the tab label wins
/// over the toolbar button. A scope holding nothing but action items (a
/// popup menu, a button-only pane) still yields its first item.
pub fn find_first_focusable_element(
    doc: &Document,
    panes: &GlassPaneRegistry,
    container: ElementId,
    filter: Option<FilterFn<'_>>,
) -> Option<ElementId> {
    let mut first_element: Option<ElementId> = None;
    let mut first_default_button: Option<ElementId> = None;
    let mut first_button: Option<ElementId> = None;

    for el in doc.descendants(container) {
        if !accepts_initial_focus(doc, el)
            || panes.is_blocked(doc, el, None)
            || !filter::passes(filter, doc, el)
        {
            continue;
        }
        let element = doc.get(el)?;

        if element.kind.is_action_item() {
            if first_default_button.is_none() && element.caps.contains(Caps::DEFAULT_ACTION) {
                first_default_button = Some(el);
            }
            if first_button.is_none() {
                first_button = Some(el);
            }
        } else {
            if nearest_chrome(doc, el, container).is_none() {
                return Some(el);
            }
            if first_element.is_none() {
                first_element = Some(el);
            }
        }
    }

    if first_default_button.is_some() {
        return first_default_button;
    }
    if let Some(button) = first_button {
        if let Some(element) = first_element {
            if element != button && tab_item_in_same_header(doc, element, button, container) {
                return Some(element);
            }
        }
        return Some(button);
    }
    first_element
}

/// Step through `order` from `current`, wrapping at both ends. When nothing
/// inside the cycle is focused, a forward step enters at the first entry
/// and a backward step at the last, like Tab and Shift-Tab entering an
/// untouched cycle.
pub fn step(order: &[ElementId], current: Option<ElementId>, forward: bool) -> Option<ElementId> {
    if order.is_empty() {
        return None;
    }
    let Some(pos) = current.and_then(|c| order.iter().position(|&el| el == c)) else {
        return if forward {
            order.first().copied()
        } else {
            order.last().copied()
        };
    };
    let next = if forward {
        (pos + 1) % order.len()
    } else {
        (pos + order.len() - 1) % order.len()
    };
    order.get(next).copied()
}

/// Nearest chrome container (menu bar, tab header, button box) strictly
/// between `el` and `container`.
fn nearest_chrome(doc: &Document, el: ElementId, container: ElementId) -> Option<ElementId> {
    doc.nearest_ancestor(el, Some(container), |e| e.kind.is_chrome_container())
}

/// The caret case of the tie-break: `element` is a tab item inside the
/// same tab-header chrome as `button`.
fn tab_item_in_same_header(
    doc: &Document,
    element: ElementId,
    button: ElementId,
    container: ElementId,
) -> bool {
    if doc.get(element).map(|e| e.kind) != Some(ElementKind::TabItem) {
        return false;
    }
    let element_header = doc.nearest_ancestor(element, Some(container), |e| {
        e.kind == ElementKind::TabHeader
    });
    let button_header = doc.nearest_ancestor(button, Some(container), |e| {
        e.kind == ElementKind::TabHeader
    });
    element_header.is_some() && element_header == button_header
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn first(doc: &Document, container: ElementId) -> Option<ElementId> {
        let panes = GlassPaneRegistry::new();
        find_first_focusable_element(doc, &panes, container, None)
    }

    // ========== First-focusable tie-break ==========

    #[test]
    fn test_plain_input_wins_over_bar_buttons() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let menubar = doc.append(form, Element::new(ElementKind::MenuBar));
        let _menu_button = doc.append(menubar, Element::new(ElementKind::Button));
        let input = doc.append(form, Element::new(ElementKind::TextField));
        let _default = doc.append(
            form,
            Element::new(ElementKind::Button).caps(Caps::DEFAULT_ACTION),
        );

        assert_eq!(first(&doc, form), Some(input));
    }

    #[test]
    fn test_default_button_wins_without_plain_candidate() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let menubar = doc.append(form, Element::new(ElementKind::MenuBar));
        let _plain_button = doc.append(menubar, Element::new(ElementKind::Button));
        let default = doc.append(
            menubar,
            Element::new(ElementKind::Button).caps(Caps::DEFAULT_ACTION),
        );

        assert_eq!(first(&doc, form), Some(default));
    }

    #[test]
    fn test_chrome_button_when_nothing_else_qualifies() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let buttons = doc.append(form, Element::new(ElementKind::ButtonBox));
        let ok = doc.append(buttons, Element::new(ElementKind::Button));
        let _cancel = doc.append(buttons, Element::new(ElementKind::Button));

        assert_eq!(first(&doc, form), Some(ok));
    }

    #[test]
    fn test_button_only_pane_yields_its_first_button() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let ok = doc.append(form, Element::new(ElementKind::Button));
        let _cancel = doc.append(form, Element::new(ElementKind::Button));

        assert_eq!(first(&doc, form), Some(ok));
    }

    #[test]
    fn test_menu_only_popup_yields_its_first_item() {
        let mut doc = Document::new();
        let popup = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let copy = doc.append(popup, Element::new(ElementKind::MenuItem));
        let _paste = doc.append(popup, Element::new(ElementKind::MenuItem));

        assert_eq!(first(&doc, popup), Some(copy));
    }

    #[test]
    fn test_plain_input_wins_over_earlier_inline_button() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let _button = doc.append(form, Element::new(ElementKind::Button));
        let input = doc.append(form, Element::new(ElementKind::TextField));

        assert_eq!(first(&doc, form), Some(input));
    }

    #[test]
    fn test_tab_item_wins_over_toolbar_button_in_same_header() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let header = doc.append(form, Element::new(ElementKind::TabHeader));
        let toolbar_button = doc.append(header, Element::new(ElementKind::MenuItem));
        let tab = doc.append(header, Element::new(ElementKind::TabItem));

        // Without the caret case the toolbar button would win by order.
        assert_ne!(first(&doc, form), Some(toolbar_button));
        assert_eq!(first(&doc, form), Some(tab));
    }

    #[test]
    fn test_tab_item_in_different_header_does_not_win() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let header_a = doc.append(form, Element::new(ElementKind::TabHeader));
        let button = doc.append(header_a, Element::new(ElementKind::MenuItem));
        let header_b = doc.append(form, Element::new(ElementKind::TabHeader));
        let _tab = doc.append(header_b, Element::new(ElementKind::TabItem));

        assert_eq!(first(&doc, form), Some(button));
    }

    #[test]
    fn test_prevent_initial_focus_is_skipped() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let marked = doc.append(
            form,
            Element::new(ElementKind::TextField).caps(Caps::PREVENT_INITIAL_FOCUS),
        );
        let second = doc.append(form, Element::new(ElementKind::TextField));

        assert_ne!(first(&doc, form), Some(marked));
        assert_eq!(first(&doc, form), Some(second));
    }

    #[test]
    fn test_blocked_candidates_are_skipped() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let covered = doc.append(form, Element::new(ElementKind::Pane));
        let _blocked = doc.append(covered, Element::new(ElementKind::TextField));
        let free = doc.append(form, Element::new(ElementKind::TextField));

        let mut panes = GlassPaneRegistry::new();
        panes.register_target(covered);
        assert_eq!(
            find_first_focusable_element(&doc, &panes, form, None),
            Some(free)
        );
    }

    #[test]
    fn test_empty_container_yields_none() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        assert_eq!(first(&doc, form), None);
    }

    // ========== Tab order ==========

    #[test]
    fn test_tab_order_is_document_order() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let a = doc.append(form, Element::new(ElementKind::TextField));
        let group = doc.append(form, Element::new(ElementKind::Pane));
        let b = doc.append(group, Element::new(ElementKind::Button));
        let c = doc.append(form, Element::new(ElementKind::TextField));

        let panes = GlassPaneRegistry::new();
        let order = tabbable_elements(&doc, &panes, form, None);
        assert_eq!(order.as_slice(), &[a, b, c]);
    }

    #[test]
    fn test_step_wraps_both_ways() {
        let order = [ElementId(1), ElementId(2), ElementId(3)];
        assert_eq!(step(&order, Some(ElementId(3)), true), Some(ElementId(1)));
        assert_eq!(step(&order, Some(ElementId(1)), false), Some(ElementId(3)));
        assert_eq!(step(&order, None, true), Some(ElementId(1)));
        assert_eq!(step(&order, None, false), Some(ElementId(3)));
        assert_eq!(step(&[], None, true), None);
        assert_eq!(step(&[], None, false), None);
    }
}
