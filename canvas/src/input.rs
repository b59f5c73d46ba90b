//! Input model: palette tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of an event.
//! `InputState` is the surface-level gesture tracked between pointer-down and
//! pointer-up. Element drags and resizes are delegated to
//! [`crate::drag::DragController`], which owns their finer-grained state.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::align::Guide;
use crate::camera::{Bounds, Point};
use crate::doc::{ConnectionId, ElementType};

/// A tool-palette entry that can be dropped onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Empty content card awaiting a URL.
    Content,
    /// AI chat panel.
    Chat,
    /// Free-form text note.
    Text,
    /// Collection (folder).
    #[serde(alias = "folder")]
    Collection,
}

impl Tool {
    /// Element type this tool creates.
    #[must_use]
    pub fn element_type(self) -> ElementType {
        match self {
            Self::Content => ElementType::Content,
            Self::Chat => ElementType::Chat,
            Self::Text => ElementType::Text,
            Self::Collection => ElementType::Collection,
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS: the toggle-selection modifier.
    #[must_use]
    pub fn toggle(self) -> bool {
        self.ctrl || self.meta
    }

    #[must_use]
    pub fn any(self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Transient UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Snap guides for the active drag/resize. Empty otherwise.
    pub guides: Vec<Guide>,
    /// Marquee rectangle in world space while box-selecting.
    pub marquee: Option<Bounds>,
    /// Connection picked by clicking its curve.
    pub selected_connection: Option<ConnectionId>,
}

/// Surface-level gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the background pans the viewport.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// An element move or resize, owned by the drag controller.
    Manipulating,
    /// Box selection from a background drag with Shift held.
    Marquee {
        /// World-space corner where the drag started.
        anchor_world: Point,
        /// Keep the existing selection and add to it.
        additive: bool,
    },
}
