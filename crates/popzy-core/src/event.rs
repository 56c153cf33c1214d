#![forbid(unsafe_code)]

//! DOM events delivered to listeners registered through a [`Document`].
//!
//! Only the three event families the modal layer reacts to are modelled:
//! pointer clicks, key presses, and CSS transition completion.
//!
//! [`Document`]: crate::document::Document

use crate::document::NodeId;

/// Key value reported for the Escape key.
pub const KEY_ESCAPE: &str = "Escape";

/// Event family used when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `click` on an element (bubbles).
    Click,
    /// `keydown` on the document.
    KeyDown,
    /// `transitionend` on an element (bubbles).
    TransitionEnd,
}

/// A dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// A click whose original target is `target`.
    Click { target: NodeId },
    /// A key press; `key` follows the `KeyboardEvent.key` naming.
    KeyDown { key: String },
    /// A finished CSS transition on `target` for `property_name`.
    TransitionEnd {
        target: NodeId,
        property_name: String,
    },
}

impl DomEvent {
    /// Build a click event.
    pub fn click(target: NodeId) -> Self {
        Self::Click { target }
    }

    /// Build a keydown event.
    pub fn key_down(key: impl Into<String>) -> Self {
        Self::KeyDown { key: key.into() }
    }

    /// Build a transitionend event.
    pub fn transition_end(target: NodeId, property_name: impl Into<String>) -> Self {
        Self::TransitionEnd {
            target,
            property_name: property_name.into(),
        }
    }

    /// The listener family this event is delivered to.
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click { .. } => EventKind::Click,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::TransitionEnd { .. } => EventKind::TransitionEnd,
        }
    }

    /// Original target element, if the event has one.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::Click { target } | Self::TransitionEnd { target, .. } => Some(*target),
            Self::KeyDown { .. } => None,
        }
    }

    /// Whether this is a keydown for `key`.
    pub fn is_key(&self, key: &str) -> bool {
        matches!(self, Self::KeyDown { key: k } if k == key)
    }

    /// Whether the event bubbles from its target through the ancestors.
    pub fn bubbles(&self) -> bool {
        !matches!(self, Self::KeyDown { .. })
    }
}
