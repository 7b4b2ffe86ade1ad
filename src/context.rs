//! Focus contexts: one per tab-cycle scope.
//!
//! A context owns a scope's container handle, the last element that validly
//! held focus inside it, and the logic to pick a valid element when none is
//! focused. It never decides *which* context should be validated; that is
//! the [`FocusManager`](crate::manager::FocusManager)'s job, so all
//! validation entry points are crate-private and receive the registry and
//! the manager's `active` flag explicitly.
//!
//! Validation is idempotent and side-effect free when the document already
//! reflects the desired state: a focus-change handler that re-triggers
//! validation while an outer validation is unwinding settles immediately.

use crate::element::{Document, ElementId};
use crate::filter::{self, FilterFn};
use crate::focusable::is_focusable;
use crate::glass_pane::GlassPaneRegistry;
use crate::manager::FocusOptions;
use crate::navigation::find_first_focusable_element;

/// One logical focus scope: an application window region, a dialog, a
/// popup.
#[derive(Debug, Clone)]
pub struct FocusContext {
    container: ElementId,
    last_valid_focused: Option<ElementId>,
    ready: bool,
    prepared: bool,
}

impl FocusContext {
    pub(crate) fn new(container: ElementId, prepared: bool) -> Self {
        Self {
            container,
            last_valid_focused: None,
            ready: !prepared,
            prepared,
        }
    }

    /// The scope's container element.
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// The last element that validly held focus inside this scope.
    ///
    /// May be stale: the element can have been detached since it was
    /// recorded. Validation treats a stale handle as absent.
    pub fn last_valid_focused(&self) -> Option<ElementId> {
        self.last_valid_focused
    }

    /// Whether initial focus placement has occurred. A context created
    /// with the `Prepare` rule stays un-ready until activated.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the context was created ahead of being shown.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Mark the context ready for normal validation.
    pub(crate) fn ready(&mut self) {
        self.ready = true;
    }

    /// Attempt to focus `candidate`; fall back to the first focusable
    /// descendant, then to the container itself (which is focused without
    /// being recorded as a valid element).
    ///
    /// Returns whether an element (not the container fallback) ended up
    /// actually holding document focus.
    pub(crate) fn validate_and_set_focus(
        &mut self,
        doc: &mut Document,
        panes: &GlassPaneRegistry,
        active: bool,
        candidate: Option<ElementId>,
        filter: Option<FilterFn<'_>>,
        options: FocusOptions,
    ) -> bool {
        let candidate = candidate.filter(|&el| self.is_valid_target(doc, panes, el, filter));
        let target =
            candidate.or_else(|| find_first_focusable_element(doc, panes, self.container, filter));

        match target {
            Some(el) => {
                // Recorded even when the manager is inactive, so focus can
                // be restored once the manager becomes active again.
                self.last_valid_focused = Some(el);
                if active {
                    doc.focus(el, options.prevent_scroll);
                }
                doc.focused() == Some(el)
            }
            None => {
                // Scope without a focusable element: park focus on the
                // container so keystrokes still land inside the scope.
                if active {
                    doc.focus(self.container, options.prevent_scroll);
                }
                false
            }
        }
    }

    /// Re-assert focus without an explicit candidate, used after tree
    /// mutation. If the currently focused element already belongs to this
    /// scope and is still valid and unblocked, nothing happens; otherwise
    /// the remembered element is tried, then the regular fallback chain.
    pub(crate) fn validate_focus(
        &mut self,
        doc: &mut Document,
        panes: &GlassPaneRegistry,
        active: bool,
        filter: Option<FilterFn<'_>>,
        options: FocusOptions,
    ) {
        if let Some(current) = doc.focused() {
            if current != self.container && self.is_valid_target(doc, panes, current, filter) {
                self.last_valid_focused = Some(current);
                return;
            }
        }
        let remembered = self
            .last_valid_focused
            .filter(|&el| self.is_valid_target(doc, panes, el, filter));
        self.validate_and_set_focus(doc, panes, active, remembered, filter, options);
    }

    /// Whether `el` is a genuine focus target for this scope right now:
    /// inside the container, focusable, unblocked, and passing `filter`.
    fn is_valid_target(
        &self,
        doc: &Document,
        panes: &GlassPaneRegistry,
        el: ElementId,
        filter: Option<FilterFn<'_>>,
    ) -> bool {
        doc.is_or_has_ancestor(el, self.container)
            && is_focusable(doc, el)
            && !panes.is_blocked(doc, el, None)
            && filter::passes(filter, doc, el)
    }
}
