//! Element filters.
//!
//! Several focus operations take an optional filter narrowing which
//! elements are acceptable: uninstalling a context validates focus while
//! excluding the subtree that is about to be detached, widgets re-validate
//! "everything outside me", and glass-pane queries can be narrowed to a
//! subset of pane targets. Filters are plain predicates over
//! `(document, element)` so callers can compose them with closures.

use crate::element::{Document, ElementId};

/// Borrowed element predicate used throughout the focus subsystem.
pub type FilterFn<'a> = &'a dyn Fn(&Document, ElementId) -> bool;

/// Accepts only elements outside the subtree rooted at `container`
/// (the container itself included in the exclusion).
pub fn outside(container: ElementId) -> impl Fn(&Document, ElementId) -> bool {
    move |doc, id| !doc.is_or_has_ancestor(id, container)
}

/// Accepts only elements inside (or equal to) `container`.
pub fn within(container: ElementId) -> impl Fn(&Document, ElementId) -> bool {
    move |doc, id| doc.is_or_has_ancestor(id, container)
}

/// Returns true when `id` passes `filter`, treating "no filter" as a pass.
pub(crate) fn passes(filter: Option<FilterFn<'_>>, doc: &Document, id: ElementId) -> bool {
    filter.map_or(true, |f| f(doc, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind};

    #[test]
    fn test_outside_excludes_subtree() {
        let mut doc = Document::new();
        let pane = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let inner = doc.append(pane, Element::new(ElementKind::TextField));
        let other = doc.append(doc.root(), Element::new(ElementKind::TextField));

        let f = outside(pane);
        assert!(!f(&doc, pane));
        assert!(!f(&doc, inner));
        assert!(f(&doc, other));
    }

    #[test]
    fn test_within_accepts_subtree() {
        let mut doc = Document::new();
        let pane = doc.append(doc.root(), Element::new(ElementKind::Pane));
        let inner = doc.append(pane, Element::new(ElementKind::TextField));
        let other = doc.append(doc.root(), Element::new(ElementKind::TextField));

        let f = within(pane);
        assert!(f(&doc, pane));
        assert!(f(&doc, inner));
        assert!(!f(&doc, other));
    }

    #[test]
    fn test_missing_filter_passes() {
        let doc = Document::new();
        assert!(passes(None, &doc, doc.root()));
    }
}
