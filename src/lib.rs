//! # focal
//!
//! Focus management for widget-based UI sessions: a stack of focus
//! contexts (one per dialog, popup, or window region), glass-pane
//! exclusion for modal blocking, Tab-order computation, and focus
//! restoration when elements disappear.
//!
//! The crate never owns the UI. The host toolkit maintains an
//! [`element::Document`] mirroring its widget tree and forwards input
//! events; the [`manager::FocusManager`] arbitrates which element may hold
//! focus at any time.
//!
//! ## Example
//!
//! ```
//! use focal::prelude::*;
//!
//! let mut doc = Document::new();
//! let form = doc.append(doc.root(), Element::new(ElementKind::Pane).named("form"));
//! let name = doc.append(form, Element::new(ElementKind::TextField).named("name"));
//! let ok = doc.append(form, Element::new(ElementKind::Button).named("ok"));
//!
//! let mut fm = FocusManager::default();
//! fm.install_focus_context(&mut doc, form, FocusRule::Auto)?;
//! assert_eq!(doc.focused(), Some(name));
//!
//! fm.focus_next_tabbable(&mut doc);
//! assert_eq!(doc.focused(), Some(ok));
//!
//! // The focused element disappears: focus falls back inside the scope.
//! doc.remove(ok);
//! fm.validate_focus(&mut doc);
//! assert_eq!(doc.focused(), Some(name));
//! # Ok::<(), focal::FocusError>(())
//! ```

#![forbid(unsafe_code)]

pub mod context;
pub mod element;
pub mod events;
pub mod filter;
pub mod focusable;
pub mod glass_pane;
pub mod manager;
pub mod navigation;

pub use context::FocusContext;
pub use element::{Caps, Document, Element, ElementId, ElementKind, FocusChange, WidgetId};
pub use events::{KeyCode, KeyEvent, KeyModifiers, MouseDownEvent};
pub use filter::FilterFn;
pub use glass_pane::{GlassPaneRegistry, GlassPaneRenderer, RendererId};
pub use manager::{
    DeviceProfile, FocusError, FocusManager, FocusManagerConfig, FocusOptions, FocusRule,
};

/// Convenience re-exports for embedding hosts.
pub mod prelude {
    pub use crate::element::{Caps, Document, Element, ElementId, ElementKind, WidgetId};
    pub use crate::events::{KeyEvent, MouseDownEvent};
    pub use crate::manager::{
        DeviceProfile, FocusManager, FocusManagerConfig, FocusOptions, FocusRule,
    };
}
