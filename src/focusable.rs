//! Focusability predicate.
//!
//! Pure functions deciding whether an element is a legal focus target.
//! Everything else in the subsystem funnels through these checks, so they
//! stay free of any manager or registry state: blocking by glass panes is a
//! separate concern layered on top (see [`crate::glass_pane`]).

use crate::element::{Caps, Document, ElementId};

/// Whether `id` is currently a legal focus target: attached, part of the
/// natively-interactive or explicitly-focusable set, visible, and enabled.
///
/// Elements marked [`Caps::PREVENT_INITIAL_FOCUS`] still pass: the marker
/// only excludes them from *automatic* first-focus selection, explicit
/// requests may target them (see [`accepts_initial_focus`]).
pub fn is_focusable(doc: &Document, id: ElementId) -> bool {
    let Some(element) = doc.get(id) else {
        return false;
    };
    if !element.kind.is_interactive() && !element.caps.contains(Caps::FOCUSABLE) {
        return false;
    }
    element.enabled && doc.is_visible(id)
}

/// Whether `id` may be chosen as an automatic first-focus candidate.
pub fn accepts_initial_focus(doc: &Document, id: ElementId) -> bool {
    is_focusable(doc, id)
        && !doc
            .get(id)
            .is_some_and(|e| e.caps.contains(Caps::PREVENT_INITIAL_FOCUS))
}

/// Whether `id` hosts selectable read-only text.
///
/// Such elements are accepted as mouse-down focus targets even though they
/// are not tab-focusable: the user's intent is text selection, not form
/// interaction, so a disabled text field still qualifies.
pub fn is_selectable_text(doc: &Document, id: ElementId) -> bool {
    doc.get(id)
        .is_some_and(|e| e.caps.contains(Caps::SELECTABLE_TEXT))
        && doc.is_visible(id)
}
