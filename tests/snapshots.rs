#![allow(clippy::unwrap_used)]
//! Snapshot tests for the manager's debug dump.
//!
//! The dump is what lands in logs and bug reports, so its shape is pinned
//! here. Run `cargo insta review` to review and accept changes.

use focal::element::{Document, Element, ElementKind};
use focal::manager::{FocusManager, FocusRule};

fn pane(doc: &mut Document, name: &str) -> focal::ElementId {
    doc.append(doc.root(), Element::new(ElementKind::Pane).named(name))
}

fn field(doc: &mut Document, parent: focal::ElementId, name: &str) -> focal::ElementId {
    doc.append(parent, Element::new(ElementKind::TextField).named(name))
}

#[test]
fn snapshot_empty_manager() {
    let doc = Document::new();
    let fm = FocusManager::default();

    insta::assert_snapshot!(fm.debug_dump(&doc), @r"
FocusManager active=true restricted_focus_gain=true pending_validation=false
glass targets: []
focused: -
");
}

#[test]
fn snapshot_modal_dialog_over_desktop() {
    let mut doc = Document::new();
    let desktop = pane(&mut doc, "desktop");
    field(&mut doc, desktop, "desktop-field");
    let dialog = pane(&mut doc, "dialog");
    field(&mut doc, dialog, "dialog-field");

    let mut fm = FocusManager::default();
    fm.install_focus_context(&mut doc, desktop, FocusRule::Auto)
        .unwrap();
    fm.install_focus_context(&mut doc, dialog, FocusRule::Auto)
        .unwrap();
    fm.register_glass_pane_target(&mut doc, desktop);

    insta::assert_snapshot!(fm.debug_dump(&doc), @r"
FocusManager active=true restricted_focus_gain=true pending_validation=false
* #dialog ready last=#dialog-field
  #desktop ready last=#desktop-field
glass targets: [#desktop]
focused: #dialog-field
");
}

#[test]
fn snapshot_prepared_popup_is_skipped() {
    let mut doc = Document::new();
    let desktop = pane(&mut doc, "desktop");
    field(&mut doc, desktop, "desktop-field");
    let popup = pane(&mut doc, "popup");
    field(&mut doc, popup, "popup-field");

    let mut fm = FocusManager::default();
    fm.install_focus_context(&mut doc, desktop, FocusRule::Auto)
        .unwrap();
    fm.install_focus_context(&mut doc, popup, FocusRule::Prepare)
        .unwrap();
    fm.schedule_validation();

    insta::assert_snapshot!(fm.debug_dump(&doc), @r"
FocusManager active=true restricted_focus_gain=true pending_validation=true
  #popup prepared last=-
* #desktop ready last=#desktop-field
glass targets: []
focused: #desktop-field
");
}
