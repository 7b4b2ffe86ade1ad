//! Glass-pane bookkeeping.
//!
//! A glass pane is a transparent modal overlay blocking interaction with
//! the UI region underneath while a dialog or blocking operation is active.
//! The registry tracks three things:
//!
//! - **targets**: subtree roots whose descendants are blocked from focus,
//! - **display parents**: logical widgets owning a pane; elements rendered
//!   by such a widget are blocked even when not literally covered (popups
//!   render outside their owner's subtree),
//! - **renderers**: the visual overlay builders, so panes can be rebuilt
//!   when a renderer has to be re-created without changing blocking
//!   semantics.
//!
//! All operations are pure bookkeeping and never fail; callers must always
//! follow a registry mutation with a focus re-validation, which the
//! [`FocusManager`](crate::manager::FocusManager) wrappers do.

use crate::element::{Document, ElementId, WidgetId};
use crate::filter::{self, FilterFn};
use indexmap::IndexSet;
use std::fmt;

/// Handle for a registered [`GlassPaneRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererId(u64);

/// Builds and tears down the visual overlay elements for one pane owner.
///
/// Renderers only produce visuals; blocking is decided by the registered
/// targets and display parents alone.
pub trait GlassPaneRenderer {
    /// Add overlay elements to the document.
    fn render_panes(&mut self, doc: &mut Document);

    /// Remove the overlay elements previously added.
    fn remove_panes(&mut self, doc: &mut Document);
}

/// Registry of active glass panes. Answers "is this element currently
/// blocked from receiving focus".
#[derive(Default)]
pub struct GlassPaneRegistry {
    targets: IndexSet<ElementId>,
    display_parents: IndexSet<WidgetId>,
    renderers: Vec<(RendererId, Box<dyn GlassPaneRenderer>)>,
    next_renderer_id: u64,
}

impl GlassPaneRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blocking subtree root. Returns whether the set changed.
    pub fn register_target(&mut self, target: ElementId) -> bool {
        self.targets.insert(target)
    }

    /// Unregister a blocking subtree root. Returns whether the set changed.
    pub fn unregister_target(&mut self, target: ElementId) -> bool {
        self.targets.shift_remove(&target)
    }

    /// Register a logical pane owner. Returns whether the set changed.
    pub fn register_display_parent(&mut self, widget: WidgetId) -> bool {
        self.display_parents.insert(widget)
    }

    /// Unregister a logical pane owner. Returns whether the set changed.
    pub fn unregister_display_parent(&mut self, widget: WidgetId) -> bool {
        self.display_parents.shift_remove(&widget)
    }

    /// Currently registered blocking targets, in registration order.
    pub fn targets(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.targets.iter().copied()
    }

    /// Whether any pane is currently registered.
    pub fn has_panes(&self) -> bool {
        !self.targets.is_empty() || !self.display_parents.is_empty()
    }

    /// Whether `element` is blocked: it is a descendant of (or equal to) a
    /// registered target (optionally narrowed to targets passing
    /// `filter`), or its nearest enclosing widget is a registered display
    /// parent.
    pub fn is_blocked(
        &self,
        doc: &Document,
        element: ElementId,
        filter: Option<FilterFn<'_>>,
    ) -> bool {
        let covered = self
            .targets
            .iter()
            .filter(|&&t| doc.is_attached(t) && filter::passes(filter, doc, t))
            .any(|&t| doc.is_or_has_ancestor(element, t));
        if covered {
            return true;
        }
        doc.nearest_widget(element)
            .is_some_and(|w| self.display_parents.contains(&w))
    }

    /// Register a renderer, building its panes immediately.
    pub fn register_renderer(
        &mut self,
        doc: &mut Document,
        mut renderer: Box<dyn GlassPaneRenderer>,
    ) -> RendererId {
        let id = RendererId(self.next_renderer_id);
        self.next_renderer_id += 1;
        renderer.render_panes(doc);
        self.renderers.push((id, renderer));
        id
    }

    /// Unregister a renderer, removing its panes. Returns the renderer so
    /// the caller can keep widget state alive, or `None` if unknown.
    pub fn unregister_renderer(
        &mut self,
        doc: &mut Document,
        id: RendererId,
    ) -> Option<Box<dyn GlassPaneRenderer>> {
        let pos = self.renderers.iter().position(|(rid, _)| *rid == id)?;
        let (_, mut renderer) = self.renderers.remove(pos);
        renderer.remove_panes(doc);
        Some(renderer)
    }

    /// Rebuild all pane visuals: every renderer removes its panes, then all
    /// re-add them. Blocking semantics are unchanged.
    pub fn rerender(&mut self, doc: &mut Document) {
        for (_, renderer) in &mut self.renderers {
            renderer.remove_panes(doc);
        }
        for (_, renderer) in &mut self.renderers {
            renderer.render_panes(doc);
        }
    }
}

impl fmt::Debug for GlassPaneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlassPaneRegistry")
            .field("targets", &self.targets)
            .field("display_parents", &self.display_parents)
            .field("renderers", &self.renderers.len())
            .finish()
    }
}
