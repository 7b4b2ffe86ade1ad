//! Input events consumed by the focus manager.
//!
//! The host embeds the focus subsystem in its own event loop and forwards
//! only the events focus handling cares about: key presses (for Tab
//! traversal) and mouse-down (for the restricted focus-gain policy).

use crate::element::ElementId;
use bitflags::bitflags;

/// A key on the keyboard, reduced to what focus handling inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Tab,
    Enter,
    Escape,
    Char(char),
}

bitflags! {
    /// Modifier keys held during a [`KeyEvent`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// A key press forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Plain Tab.
    pub fn tab() -> Self {
        Self::new(KeyCode::Tab, KeyModifiers::empty())
    }

    /// Shift-Tab.
    pub fn shift_tab() -> Self {
        Self::new(KeyCode::Tab, KeyModifiers::SHIFT)
    }
}

/// A mouse press on `target`, forwarded by the host before it performs its
/// own default focus handling so the manager can veto or redirect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseDownEvent {
    pub target: ElementId,
}

impl MouseDownEvent {
    pub fn new(target: ElementId) -> Self {
        Self { target }
    }
}
