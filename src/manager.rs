//! The focus manager: one per UI session.
//!
//! Owns the stack of [`FocusContext`]s and the [`GlassPaneRegistry`] and
//! arbitrates every focus change in the session. Widgets never call the
//! document's focus primitive directly; they go through
//! [`FocusManager::request_focus`] or install and activate contexts, and
//! the manager decides which element may actually gain focus given the
//! current stack, the glass panes, and the focusability predicate.
//!
//! The stack is ordered bottom to top. The *active* context is the topmost
//! ready context whose container is not glass-blocked; it is the scope Tab
//! traversal cycles in and the scope `validate_focus` re-asserts after tree
//! mutations.

use crate::context::FocusContext;
use crate::element::{Caps, Document, ElementId, WidgetId};
use crate::events::{KeyCode, KeyEvent, KeyModifiers, MouseDownEvent};
use crate::filter::{self, FilterFn};
use crate::focusable::{is_focusable, is_selectable_text};
use crate::glass_pane::{GlassPaneRegistry, GlassPaneRenderer, RendererId};
use crate::navigation;
use std::fmt::Write as _;
use thiserror::Error;
use tracing::{debug, trace};

/// Input capabilities of the device the session runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceProfile {
    /// The device has no pointer other than touch.
    pub touch_only: bool,
    /// Focusing a text input pops up an on-screen keyboard.
    pub on_screen_keyboard: bool,
}

/// Startup configuration for a [`FocusManager`].
#[derive(Debug, Clone, Copy)]
pub struct FocusManagerConfig {
    /// Whether the manager actually moves document focus. An inactive
    /// manager keeps all bookkeeping current but never calls the focus
    /// primitive, so an embedding host (a portlet, a background session)
    /// cannot steal focus from its surroundings.
    pub active: bool,
    /// Whether mouse-down may move focus only onto genuinely focusable
    /// elements. When unrestricted, any press is allowed to shift focus the
    /// way an unmanaged document would.
    pub restricted_focus_gain: bool,
}

impl FocusManagerConfig {
    /// Derive a configuration from the device: touch devices restrict
    /// focus gain on press so that tapping a label or a row does not pop
    /// up the on-screen keyboard via some focusable ancestor.
    pub fn from_device(device: DeviceProfile) -> Self {
        Self {
            active: true,
            restricted_focus_gain: device.touch_only || device.on_screen_keyboard,
        }
    }
}

impl Default for FocusManagerConfig {
    fn default() -> Self {
        Self {
            active: true,
            restricted_focus_gain: true,
        }
    }
}

/// How a freshly installed focus context picks its initial focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusRule {
    /// Focus the first focusable element of the container.
    #[default]
    Auto,
    /// Install the context without touching focus.
    None,
    /// Install the context for a scope that is not shown yet; it stays
    /// un-ready (skipped by validation) until activated.
    Prepare,
    /// Focus this specific element.
    Element(ElementId),
}

/// Per-call options for focus requests and validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusOptions {
    /// Ask the viewport not to scroll the element into view.
    pub prevent_scroll: bool,
    /// Refuse the request when the target's context is not ready yet.
    pub only_if_ready: bool,
    /// Select the element's text after it gained focus.
    pub select_text: bool,
}

/// Errors for API misuse. Everything stemming from ordinary UI churn
/// (stale handles, hidden elements) is handled by falling back, not by
/// erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FocusError {
    /// A focus context was installed on a container that is not attached
    /// to the document.
    #[error("focus context container {container} is not attached")]
    ContainerDetached { container: ElementId },
}

/// Session-wide focus arbiter. See the module docs.
#[derive(Debug)]
pub struct FocusManager {
    contexts: Vec<FocusContext>,
    panes: GlassPaneRegistry,
    active: bool,
    restricted_focus_gain: bool,
    pending_validation: bool,
}

impl FocusManager {
    /// Create a manager with the given configuration.
    pub fn new(config: FocusManagerConfig) -> Self {
        Self {
            contexts: Vec::new(),
            panes: GlassPaneRegistry::new(),
            active: config.active,
            restricted_focus_gain: config.restricted_focus_gain,
            pending_validation: false,
        }
    }

    /// Whether the manager currently moves document focus.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate or deactivate the manager. Becoming active re-asserts the
    /// focus position that was tracked while inactive.
    pub fn set_active(&mut self, doc: &mut Document, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        debug!(active, "focus manager activity changed");
        if active {
            self.validate_focus(doc);
        }
    }

    /// Whether restricted focus gain on mouse-down is in effect.
    pub fn is_focus_gain_restricted(&self) -> bool {
        self.restricted_focus_gain
    }

    // ==================== Context stack ====================

    /// Install a focus context for `container`, or move an already
    /// installed one to the top of the stack. The new top immediately
    /// receives focus according to `rule` (except for [`FocusRule::None`]
    /// and [`FocusRule::Prepare`]).
    pub fn install_focus_context(
        &mut self,
        doc: &mut Document,
        container: ElementId,
        rule: FocusRule,
    ) -> Result<&FocusContext, FocusError> {
        if !doc.is_attached(container) {
            return Err(FocusError::ContainerDetached { container });
        }
        if let Some(pos) = self.context_position(container) {
            let ctx = self.contexts.remove(pos);
            self.contexts.push(ctx);
            debug!(container = %doc.label(container), "focus context moved to top");
        } else {
            let prepared = rule == FocusRule::Prepare;
            self.contexts.push(FocusContext::new(container, prepared));
            debug!(container = %doc.label(container), ?rule, "focus context installed");
        }

        let idx = self.contexts.len() - 1;
        match rule {
            FocusRule::Prepare => {}
            FocusRule::None => self.contexts[idx].ready(),
            FocusRule::Auto | FocusRule::Element(_) => {
                self.contexts[idx].ready();
                let candidate = match rule {
                    FocusRule::Element(el) => Some(el),
                    _ => None,
                };
                self.contexts[idx].validate_and_set_focus(
                    doc,
                    &self.panes,
                    self.active,
                    candidate,
                    None,
                    FocusOptions::default(),
                );
            }
        }
        Ok(&self.contexts[idx])
    }

    /// Remove the context installed for `container`. Unknown containers
    /// are a silent no-op, so teardown code may uninstall unconditionally.
    /// Focus is then re-validated outside the removed subtree, restoring
    /// it to the context that becomes top.
    pub fn uninstall_focus_context(&mut self, doc: &mut Document, container: ElementId) {
        let Some(pos) = self.context_position(container) else {
            return;
        };
        self.contexts.remove(pos);
        debug!(container = %doc.label(container), "focus context uninstalled");
        if !self.contexts.is_empty() {
            let exclude = filter::outside(container);
            self.validate_focus_with(doc, Some(&exclude));
        }
    }

    /// Move the context of `container` to the top of the stack and restore
    /// its focus position. Refused (returning false) while the container
    /// is glass-blocked; a covered scope cannot become the active one.
    pub fn activate_focus_context(&mut self, doc: &mut Document, container: ElementId) -> bool {
        let Some(pos) = self.context_position(container) else {
            return false;
        };
        if self.panes.is_blocked(doc, container, None) {
            trace!(container = %doc.label(container), "activation refused, container is glass-blocked");
            return false;
        }
        let ctx = self.contexts.remove(pos);
        self.contexts.push(ctx);
        let idx = self.contexts.len() - 1;
        self.contexts[idx].ready();
        self.contexts[idx].validate_focus(
            doc,
            &self.panes,
            self.active,
            None,
            FocusOptions::default(),
        );
        debug!(container = %doc.label(container), "focus context activated");
        true
    }

    /// The installed context owning `container`, if any.
    pub fn get_focus_context(&self, container: ElementId) -> Option<&FocusContext> {
        self.context_position(container).map(|i| &self.contexts[i])
    }

    /// Whether a context is installed for `container`.
    pub fn is_focus_context_installed(&self, container: ElementId) -> bool {
        self.context_position(container).is_some()
    }

    /// The context that currently arbitrates focus: topmost, ready, and
    /// not glass-blocked.
    pub fn active_context(&self, doc: &Document) -> Option<&FocusContext> {
        self.top_context_index(doc).map(|i| &self.contexts[i])
    }

    // ==================== Focus requests ====================

    /// Request focus for `element`. The request is routed to the innermost
    /// installed context containing the element and granted only if the
    /// element passes validation there; otherwise that context's fallback
    /// chain decides. Returns whether `element` itself ended up focused.
    ///
    /// Glass-blocked elements and elements outside every installed context
    /// never gain focus this way.
    pub fn request_focus(
        &mut self,
        doc: &mut Document,
        element: ElementId,
        options: FocusOptions,
    ) -> bool {
        self.request_focus_filtered(doc, element, None, options)
    }

    /// [`request_focus`](Self::request_focus) narrowed by a filter applied
    /// to the fallback candidates during validation.
    pub fn request_focus_filtered(
        &mut self,
        doc: &mut Document,
        element: ElementId,
        filter: Option<FilterFn<'_>>,
        options: FocusOptions,
    ) -> bool {
        self.cancel_pending_validation();
        if self.panes.is_blocked(doc, element, None) {
            trace!(element = %doc.label(element), "focus request refused, element is glass-blocked");
            return false;
        }
        let Some(idx) = self.context_index_for(doc, element) else {
            trace!(element = %doc.label(element), "focus request outside any context");
            return false;
        };
        if options.only_if_ready && !self.contexts[idx].is_ready() {
            return false;
        }
        self.contexts[idx].validate_and_set_focus(
            doc,
            &self.panes,
            self.active,
            Some(element),
            filter,
            options,
        );
        let gained = doc.focused() == Some(element);
        if gained && options.select_text {
            doc.select_text(element);
        }
        trace!(element = %doc.label(element), gained, "focus requested");
        gained
    }

    /// Re-assert a valid focus position after the tree changed: elements
    /// removed, hidden, disabled, or panes come and gone. Idempotent; safe
    /// to call from focus-change handlers.
    pub fn validate_focus(&mut self, doc: &mut Document) {
        self.validate_focus_with(doc, None);
    }

    /// [`validate_focus`](Self::validate_focus) narrowed by a filter, for
    /// callers that must exclude a subtree about to be detached.
    pub fn validate_focus_with(&mut self, doc: &mut Document, filter: Option<FilterFn<'_>>) {
        let Some(idx) = self.top_context_index(doc) else {
            // Every scope is covered. Focus may not stay inside a blocked
            // region, so it is forced out to the ambient root.
            if let Some(el) = doc.focused() {
                if self.active && self.panes.is_blocked(doc, el, None) {
                    doc.focus(doc.root(), false);
                }
            }
            return;
        };
        self.contexts[idx].validate_focus(
            doc,
            &self.panes,
            self.active,
            filter,
            FocusOptions::default(),
        );
    }

    /// Resolve a [`FocusRule`] against `container` without moving focus:
    /// the element that would receive initial focus.
    pub fn evaluate_focus_rule(
        &self,
        doc: &Document,
        container: ElementId,
        rule: FocusRule,
    ) -> Option<ElementId> {
        match rule {
            FocusRule::Auto | FocusRule::Prepare => {
                navigation::find_first_focusable_element(doc, &self.panes, container, None)
            }
            FocusRule::None => None,
            FocusRule::Element(el) => Some(el),
        }
    }

    // ==================== Deferred validation ====================

    /// Note that a validation is needed once the current batch of tree
    /// mutations is done. Collapses any number of requests into one.
    pub fn schedule_validation(&mut self) {
        self.pending_validation = true;
    }

    /// Drop a scheduled validation. Called when an explicit focus request
    /// supersedes it, so the request's outcome is not clobbered afterwards.
    pub fn cancel_pending_validation(&mut self) {
        self.pending_validation = false;
    }

    /// Run the scheduled validation, if one is still pending.
    pub fn flush_pending_validation(&mut self, doc: &mut Document) {
        if std::mem::take(&mut self.pending_validation) {
            self.validate_focus(doc);
        }
    }

    /// Whether a validation is scheduled.
    pub fn has_pending_validation(&self) -> bool {
        self.pending_validation
    }

    // ==================== Glass panes ====================

    /// Block the subtree rooted at `target` and re-validate focus, pushing
    /// it out of the newly covered region. Returns whether the registry
    /// changed.
    pub fn register_glass_pane_target(&mut self, doc: &mut Document, target: ElementId) -> bool {
        if !self.panes.register_target(target) {
            return false;
        }
        debug!(target = %doc.label(target), "glass pane target registered");
        self.validate_focus(doc);
        true
    }

    /// Unblock the subtree rooted at `target` and re-validate focus,
    /// letting the revealed scope take it back.
    pub fn unregister_glass_pane_target(&mut self, doc: &mut Document, target: ElementId) -> bool {
        if !self.panes.unregister_target(target) {
            return false;
        }
        debug!(target = %doc.label(target), "glass pane target unregistered");
        self.validate_focus(doc);
        true
    }

    /// Block every element rendered by `widget` and re-validate focus.
    pub fn register_glass_pane_display_parent(
        &mut self,
        doc: &mut Document,
        widget: WidgetId,
    ) -> bool {
        if !self.panes.register_display_parent(widget) {
            return false;
        }
        debug!(?widget, "glass pane display parent registered");
        self.validate_focus(doc);
        true
    }

    /// Unblock the elements rendered by `widget` and re-validate focus.
    pub fn unregister_glass_pane_display_parent(
        &mut self,
        doc: &mut Document,
        widget: WidgetId,
    ) -> bool {
        if !self.panes.unregister_display_parent(widget) {
            return false;
        }
        debug!(?widget, "glass pane display parent unregistered");
        self.validate_focus(doc);
        true
    }

    /// Register a pane renderer; its panes are built immediately.
    pub fn register_glass_pane_renderer(
        &mut self,
        doc: &mut Document,
        renderer: Box<dyn GlassPaneRenderer>,
    ) -> RendererId {
        self.panes.register_renderer(doc, renderer)
    }

    /// Unregister a pane renderer, tearing its panes down.
    pub fn unregister_glass_pane_renderer(
        &mut self,
        doc: &mut Document,
        id: RendererId,
    ) -> Option<Box<dyn GlassPaneRenderer>> {
        self.panes.unregister_renderer(doc, id)
    }

    /// Rebuild all pane visuals. Blocking semantics and focus are
    /// unchanged, so no validation follows.
    pub fn rerender_glass_panes(&mut self, doc: &mut Document) {
        self.panes.rerender(doc);
    }

    /// Whether `element` is covered by a registered glass pane, optionally
    /// narrowed to pane targets passing `filter`.
    pub fn is_element_covert_by_glass_pane(
        &self,
        doc: &Document,
        element: ElementId,
        filter: Option<FilterFn<'_>>,
    ) -> bool {
        self.panes.is_blocked(doc, element, filter)
    }

    /// Read access to the pane registry.
    pub fn glass_panes(&self) -> &GlassPaneRegistry {
        &self.panes
    }

    // ==================== Input handling ====================

    /// Whether a mouse press on `target` may shift focus. Presses on glass
    /// panes or covered elements never shift focus. Under restricted focus
    /// gain a press is accepted only when the target is mouse-focusable,
    /// hosts selectable text, or has a focusable ancestor below the nearest
    /// scope boundary (clicking a table row focuses the row, not nothing).
    pub fn accept_focus_change_on_mouse_down(&self, doc: &Document, target: ElementId) -> bool {
        let Some(element) = doc.get(target) else {
            return false;
        };
        if element.caps.contains(Caps::GLASS_PANE) || self.panes.is_blocked(doc, target, None) {
            return false;
        }
        if !self.restricted_focus_gain {
            return true;
        }
        if is_selectable_text(doc, target) {
            return true;
        }
        self.mouse_focus_target(doc, target).is_some()
    }

    /// Handle a mouse press. Returns whether the host may run its default
    /// focus behavior for the press; when false the press must not move
    /// focus (the caller suppresses the default, focus stays put).
    pub fn on_mouse_down(&mut self, doc: &mut Document, event: MouseDownEvent) -> bool {
        self.cancel_pending_validation();
        if !self.accept_focus_change_on_mouse_down(doc, event.target) {
            trace!(target = %doc.label(event.target), "mouse focus gain refused");
            return false;
        }
        if is_selectable_text(doc, event.target) && !is_focusable(doc, event.target) {
            // The press starts a text selection; moving focus would
            // destroy it.
            return true;
        }
        if let Some(el) = self.mouse_focus_target(doc, event.target) {
            self.request_focus(
                doc,
                el,
                FocusOptions {
                    prevent_scroll: true,
                    ..FocusOptions::default()
                },
            );
        }
        true
    }

    /// Handle a key press. Only Tab and Shift-Tab are consumed; returns
    /// whether the event was handled.
    pub fn on_key(&mut self, doc: &mut Document, event: KeyEvent) -> bool {
        if event.code != KeyCode::Tab {
            return false;
        }
        let forward = !event.modifiers.contains(KeyModifiers::SHIFT);
        self.focus_adjacent_tabbable(doc, forward, FocusOptions::default());
        true
    }

    /// Move focus to the next tabbable element of the active context,
    /// wrapping at the end. Returns whether focus moved.
    pub fn focus_next_tabbable(&mut self, doc: &mut Document) -> bool {
        self.focus_next_tabbable_with(doc, FocusOptions::default())
    }

    /// [`focus_next_tabbable`](Self::focus_next_tabbable) with options,
    /// for hosts that want the destination's text selected.
    pub fn focus_next_tabbable_with(&mut self, doc: &mut Document, options: FocusOptions) -> bool {
        self.focus_adjacent_tabbable(doc, true, options)
    }

    /// Move focus to the previous tabbable element of the active context,
    /// wrapping at the start. Returns whether focus moved.
    pub fn focus_previous_tabbable(&mut self, doc: &mut Document) -> bool {
        self.focus_previous_tabbable_with(doc, FocusOptions::default())
    }

    /// [`focus_previous_tabbable`](Self::focus_previous_tabbable) with
    /// options.
    pub fn focus_previous_tabbable_with(
        &mut self,
        doc: &mut Document,
        options: FocusOptions,
    ) -> bool {
        self.focus_adjacent_tabbable(doc, false, options)
    }

    // ==================== Introspection ====================

    /// Multi-line dump of the manager state for logs and bug reports:
    /// the context stack top first (`*` marks the active context), the
    /// pane registry, and the document focus.
    pub fn debug_dump(&self, doc: &Document) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "FocusManager active={} restricted_focus_gain={} pending_validation={}",
            self.active, self.restricted_focus_gain, self.pending_validation
        );
        let top = self.top_context_index(doc);
        for (i, ctx) in self.contexts.iter().enumerate().rev() {
            let marker = if Some(i) == top { '*' } else { ' ' };
            let state = if ctx.is_ready() { "ready" } else { "prepared" };
            let last = ctx
                .last_valid_focused()
                .map_or_else(|| "-".into(), |el| doc.label(el));
            let _ = writeln!(
                out,
                "{marker} {} {state} last={last}",
                doc.label(ctx.container())
            );
        }
        let targets: Vec<String> = self.panes.targets().map(|t| doc.label(t)).collect();
        let _ = writeln!(out, "glass targets: [{}]", targets.join(", "));
        let focused = doc.focused().map_or_else(|| "-".into(), |el| doc.label(el));
        let _ = write!(out, "focused: {focused}");
        out
    }

    // ==================== Internals ====================

    fn focus_adjacent_tabbable(
        &mut self,
        doc: &mut Document,
        forward: bool,
        options: FocusOptions,
    ) -> bool {
        let Some(idx) = self.top_context_index(doc) else {
            return false;
        };
        let container = self.contexts[idx].container();
        let order = navigation::tabbable_elements(doc, &self.panes, container, None);
        let Some(next) = navigation::step(&order, doc.focused(), forward) else {
            return false;
        };
        self.contexts[idx].validate_and_set_focus(
            doc,
            &self.panes,
            self.active,
            Some(next),
            None,
            options,
        );
        let gained = doc.focused() == Some(next);
        if gained && options.select_text {
            doc.select_text(next);
        }
        gained
    }

    fn context_position(&self, container: ElementId) -> Option<usize> {
        self.contexts
            .iter()
            .position(|c| c.container() == container)
    }

    /// Topmost ready context whose container is not glass-blocked.
    fn top_context_index(&self, doc: &Document) -> Option<usize> {
        self.contexts.iter().enumerate().rev().find_map(|(i, ctx)| {
            (ctx.is_ready() && !self.panes.is_blocked(doc, ctx.container(), None)).then_some(i)
        })
    }

    /// The innermost installed context containing `element`: the first
    /// self-or-ancestor that is some context's container.
    fn context_index_for(&self, doc: &Document, element: ElementId) -> Option<usize> {
        std::iter::once(element)
            .chain(doc.ancestors(element))
            .find_map(|el| self.context_position(el))
    }

    /// The element a mouse press on `target` should focus: the target
    /// itself when it is mouse-focusable, otherwise the first focusable
    /// ancestor below the innermost context boundary.
    fn mouse_focus_target(&self, doc: &Document, target: ElementId) -> Option<ElementId> {
        let prevented = doc
            .get(target)
            .is_some_and(|e| e.caps.contains(Caps::PREVENT_MOUSE_FOCUS));
        if !prevented && is_focusable(doc, target) {
            return Some(target);
        }
        for el in doc.ancestors(target) {
            if self.context_position(el).is_some() {
                return None;
            }
            if is_focusable(doc, el) {
                return Some(el);
            }
        }
        None
    }
}

impl Default for FocusManager {
    fn default() -> Self {
        Self::new(FocusManagerConfig::default())
    }
}
