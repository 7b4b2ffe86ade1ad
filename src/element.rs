//! Element tree shared between the widget toolkit and the focus subsystem.
//!
//! The focus subsystem never owns the UI. It consumes a narrow interface of
//! the rendering layer: every widget exposes a root container and a set of
//! candidate focusable descendants, and the toolkit mutates the tree as the
//! server pushes UI changes (elements rendered, removed, hidden). This
//! module is that interface: an id-keyed arena of [`Element`]s with typed
//! capability flags, parent/child links, and the native focus/selection
//! primitives.
//!
//! Handles are weak by construction. An [`ElementId`] may outlive its
//! element; every lookup goes through the [`Document`] and returns `Option`,
//! so a stale handle is indistinguishable from "no element" and is never
//! dereferenced blindly.
//!
//! # Example
//!
//! ```
//! use focal::element::{Document, Element, ElementKind};
//!
//! let mut doc = Document::new();
//! let form = doc.append(doc.root(), Element::new(ElementKind::Pane).named("form"));
//! let field = doc.append(form, Element::new(ElementKind::TextField).named("name"));
//!
//! assert!(doc.is_attached(field));
//! doc.remove(field);
//! assert!(!doc.is_attached(field));
//! ```

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smartstring::alias::String as SmartString;
use std::fmt;

/// Type alias for element children collections.
/// The first 8 ids are stored inline, spilling to heap only for wide trees.
pub type ElementChildren = SmallVec<[ElementId; 8]>;

/// Unique identifier for elements in the tree.
///
/// Ids are never reused within a [`Document`], so a handle kept across a
/// removal stays stale forever instead of silently pointing at a newcomer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Unique identifier for the logical widget that rendered an element.
///
/// Widgets are a coarser grain than elements: one widget usually renders a
/// whole subtree. The glass-pane registry blocks at this grain via display
/// parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u64);

bitflags! {
    /// Typed capability flags decided once at render time.
    ///
    /// Capability checks replace class-name and duck-type sniffing: the
    /// renderer tags each element explicitly and the focus subsystem only
    /// ever consults these flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Caps: u8 {
        /// Explicitly focusable even if the kind is not interactive
        /// (the `tabindex` analog).
        const FOCUSABLE = 1 << 0;
        /// Never chosen as an *automatic* first-focus candidate.
        /// Explicit focus requests may still target the element.
        const PREVENT_INITIAL_FOCUS = 1 << 1;
        /// Excluded from gaining focus on mouse down (buttons that should
        /// not retain a visible focus ring after a click).
        const PREVENT_MOUSE_FOCUS = 1 << 2;
        /// Hosts selectable read-only text (a disabled text field whose
        /// content can still be copied).
        const SELECTABLE_TEXT = 1 << 3;
        /// The element is itself a modal glass pane overlay.
        const GLASS_PANE = 1 << 4;
        /// Marked as the scope's default action button.
        const DEFAULT_ACTION = 1 << 5;
    }
}

/// Semantic element kinds, the subset of toolkit roles the focus subsystem
/// distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementKind {
    /// Generic container with no focus semantics.
    #[default]
    Pane,
    /// Static text.
    Label,
    /// Editable text input.
    TextField,
    /// Push button.
    Button,
    /// Hyperlink-like action.
    Link,
    /// Item inside a menu.
    MenuItem,
    /// Tab label inside a tab header.
    TabItem,
    /// Menu bar chrome container.
    MenuBar,
    /// Tab header chrome container.
    TabHeader,
    /// Button box chrome container (dialog button rows).
    ButtonBox,
    /// Data table.
    Table,
    /// Focusable row inside a table.
    TableRow,
}

impl ElementKind {
    /// Returns true if this kind is natively focusable.
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            ElementKind::TextField
                | ElementKind::Button
                | ElementKind::Link
                | ElementKind::MenuItem
                | ElementKind::TabItem
                | ElementKind::TableRow
        )
    }

    /// Returns true for inline action items the first-focus heuristic is
    /// biased against (buttons and menu items).
    pub fn is_action_item(self) -> bool {
        matches!(self, ElementKind::Button | ElementKind::MenuItem)
    }

    /// Returns true for chrome containers (menu bars, tab headers, button
    /// boxes) whose buttons lose first-focus tie-breaks against plain
    /// form fields.
    pub fn is_chrome_container(self) -> bool {
        matches!(
            self,
            ElementKind::MenuBar | ElementKind::TabHeader | ElementKind::ButtonBox
        )
    }
}

/// A single element in the tree.
///
/// Built with a builder-style API, then attached via [`Document::append`].
#[derive(Debug, Clone)]
pub struct Element {
    /// Semantic kind.
    pub kind: ElementKind,
    /// Capability flags.
    pub caps: Caps,
    /// Whether the element is shown (`display: none` analog). Visibility is
    /// effective only if all ancestors are visible too, see
    /// [`Document::is_visible`].
    pub visible: bool,
    /// Whether the element is enabled.
    pub enabled: bool,
    /// Logical widget that rendered this element, if tagged.
    pub widget: Option<WidgetId>,
    /// Optional debug name (`#name` in dumps and tests).
    pub name: Option<SmartString>,
    parent: Option<ElementId>,
    children: ElementChildren,
}

impl Element {
    /// Create a detached element of the given kind.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            caps: Caps::empty(),
            visible: true,
            enabled: true,
            widget: None,
            name: None,
            parent: None,
            children: SmallVec::new(),
        }
    }

    /// Add capability flags.
    pub fn caps(mut self, caps: Caps) -> Self {
        self.caps |= caps;
        self
    }

    /// Set visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set enabled state.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Tag the element with its owning widget.
    pub fn widget(mut self, widget: WidgetId) -> Self {
        self.widget = Some(widget);
        self
    }

    /// Set a debug name.
    pub fn named(mut self, name: impl AsRef<str>) -> Self {
        self.name = Some(SmartString::from(name.as_ref()));
        self
    }

    /// Parent element, if attached below the root.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Child ids in document order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// A change of the document's focused element.
///
/// Emitted into the document's event queue instead of being dispatched
/// synchronously: handlers drain the queue between turns, so a focus call
/// can never re-enter validation while an outer validation is unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    /// Previously focused element.
    pub old: Option<ElementId>,
    /// Newly focused element.
    pub new: Option<ElementId>,
    /// Whether the focus call asked the viewport not to scroll.
    pub prevent_scroll: bool,
}

/// The element tree plus the ambient focus/selection state the real DOM
/// would carry (`document.activeElement`, the text selection).
pub struct Document {
    elements: FxHashMap<ElementId, Element>,
    root: ElementId,
    focused: Option<ElementId>,
    selection: Option<ElementId>,
    events: Vec<FocusChange>,
    next_id: u64,
}

impl Document {
    /// Create a document holding only the root container.
    pub fn new() -> Self {
        let root = ElementId(1);
        let mut elements = FxHashMap::default();
        elements.insert(root, Element::new(ElementKind::Pane).named("root"));
        Self {
            elements,
            root,
            focused: None,
            selection: None,
            events: Vec::new(),
            next_id: 2,
        }
    }

    /// The root container.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Attach `element` as the last child of `parent` and return its id.
    ///
    /// Unknown parents fall back to the root.
    pub fn append(&mut self, parent: ElementId, element: Element) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        let parent = if self.elements.contains_key(&parent) {
            parent
        } else {
            self.root
        };
        let mut element = element;
        element.parent = Some(parent);
        element.children.clear();
        self.elements.insert(id, element);
        if let Some(p) = self.elements.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Detach and delete the subtree rooted at `id`.
    ///
    /// If the focused element was inside the subtree, focus moves to the
    /// root (the body-fallback behavior of a real DOM); callers are
    /// expected to follow up with a focus re-validation.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.root || !self.elements.contains_key(&id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.elements.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
        }
        let mut stack: SmallVec<[ElementId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(el) = stack.pop() {
            if let Some(removed) = self.elements.remove(&el) {
                stack.extend(removed.children);
            }
            if self.focused == Some(el) {
                self.set_focused(Some(self.root), false);
            }
            if self.selection == Some(el) {
                self.selection = None;
            }
        }
    }

    /// Look up an element. Stale handles yield `None`.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Whether the handle still refers to an attached element.
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Parent of `id`, if any.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    /// Children of `id` in document order (empty for stale handles).
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements.get(&id).map_or(&[], |e| e.children())
    }

    /// Iterate the proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |&el| self.parent(el))
    }

    /// Whether `id` is `ancestor` or one of its descendants.
    pub fn is_or_has_ancestor(&self, id: ElementId, ancestor: ElementId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Pre-order document-order traversal of the descendants of `id`,
    /// excluding `id` itself.
    pub fn descendants(&self, id: ElementId) -> Descendants<'_> {
        let mut stack: SmallVec<[ElementId; 16]> = SmallVec::new();
        stack.extend(self.children(id).iter().rev().copied());
        Descendants { doc: self, stack }
    }

    /// Nearest self-or-ancestor widget tag.
    pub fn nearest_widget(&self, id: ElementId) -> Option<WidgetId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|el| self.get(el).and_then(|e| e.widget))
    }

    /// Nearest proper ancestor satisfying `pred`, stopping (exclusive) at
    /// `boundary` when given.
    pub fn nearest_ancestor<F>(
        &self,
        id: ElementId,
        boundary: Option<ElementId>,
        pred: F,
    ) -> Option<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        for el in self.ancestors(id) {
            if Some(el) == boundary {
                return None;
            }
            if self.get(el).is_some_and(&pred) {
                return Some(el);
            }
        }
        None
    }

    /// Effective visibility: the element and all of its ancestors are
    /// attached and visible.
    pub fn is_visible(&self, id: ElementId) -> bool {
        let Some(element) = self.get(id) else {
            return false;
        };
        element.visible && self.ancestors(id).all(|a| self.get(a).is_some_and(|e| e.visible))
    }

    /// Show or hide an element.
    pub fn set_visible(&mut self, id: ElementId, visible: bool) {
        if let Some(e) = self.elements.get_mut(&id) {
            e.visible = visible;
        }
    }

    /// Enable or disable an element.
    pub fn set_enabled(&mut self, id: ElementId, enabled: bool) {
        if let Some(e) = self.elements.get_mut(&id) {
            e.enabled = enabled;
        }
    }

    /// The currently focused element, the `document.activeElement` analog.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Native focus primitive. Focuses `id` if it is attached; a no-op
    /// (and no event) when `id` is already focused, which keeps repeated
    /// validation side-effect free.
    pub fn focus(&mut self, id: ElementId, prevent_scroll: bool) -> bool {
        if !self.is_attached(id) {
            return false;
        }
        if self.focused == Some(id) {
            return true;
        }
        self.set_focused(Some(id), prevent_scroll);
        true
    }

    /// Native blur primitive: clears focus if `id` currently holds it.
    pub fn blur(&mut self, id: ElementId) -> bool {
        if self.focused != Some(id) {
            return false;
        }
        self.set_focused(None, false);
        true
    }

    /// Select the text content of `id` (tab navigation may request this
    /// for the destination element).
    pub fn select_text(&mut self, id: ElementId) {
        if self.is_attached(id) {
            self.selection = Some(id);
        }
    }

    /// The element whose text is currently selected, if any.
    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    /// Drain the queued focus-change events.
    pub fn take_events(&mut self) -> Vec<FocusChange> {
        std::mem::take(&mut self.events)
    }

    /// Debug label for an element: `#name` when named, the raw id
    /// otherwise.
    pub fn label(&self, id: ElementId) -> String {
        match self.get(id).and_then(|e| e.name.as_ref()) {
            Some(name) => format!("#{name}"),
            None => id.to_string(),
        }
    }

    fn set_focused(&mut self, new: Option<ElementId>, prevent_scroll: bool) {
        let old = self.focused;
        if old == new {
            return;
        }
        self.focused = new;
        self.events.push(FocusChange {
            old,
            new,
            prevent_scroll,
        });
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.elements.len())
            .field("focused", &self.focused)
            .field("selection", &self.selection)
            .finish()
    }
}

/// Iterator over descendants in document order. See
/// [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: SmallVec<[ElementId; 16]>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
