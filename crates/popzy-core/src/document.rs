#![forbid(unsafe_code)]

//! Host document abstraction.
//!
//! The modal layer never touches a concrete DOM. Everything it needs from the
//! host (element creation, class lists, inline styles, tree edits, template
//! cloning, layout measurement, listeners, timers) goes through the
//! [`Document`] trait, addressed by opaque [`NodeId`] handles.
//!
//! # Invariants
//!
//! - Handles are never reused: once a node is removed, its `NodeId` stays
//!   dead and every operation on it is a silent no-op.
//! - Every method takes `&self`. Implementations use interior mutability and
//!   must not hold an internal borrow while invoking a listener or timer
//!   callback, so callbacks may call back into the document.
//! - Removing a node also drops the listeners registered on it and on its
//!   descendants.
//!
//! # Failure Modes
//!
//! Backends swallow host-level failures (detached nodes, rejected class
//! tokens) the same way browser glue code ignores the `Result` of
//! `classList.add`. The modal layer validates its inputs before calling in.

use std::rc::Rc;
use std::time::Duration;

use crate::event::{DomEvent, EventKind};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw backend value.
            #[inline]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw value.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }
    };
}

handle!(
    /// Handle to an element (or template fragment) owned by a [`Document`].
    NodeId
);
handle!(
    /// Handle returned by [`Document::add_listener`].
    ListenerId
);
handle!(
    /// Handle returned by [`Document::set_timeout`].
    TimerId
);

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The document itself (keyboard input).
    Document,
    /// A single element; receives events bubbling from descendants too.
    Node(NodeId),
}

/// Shared event callback.
pub type Listener = Rc<dyn Fn(&DomEvent)>;

/// One-shot timer callback.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Host document operations used by the modal layer.
pub trait Document {
    /// The `<body>` element.
    fn body(&self) -> NodeId;

    /// Create a detached element with the given tag name.
    fn create_element(&self, tag: &str) -> NodeId;

    /// Whether a template with this id exists.
    fn has_template(&self, template_id: &str) -> bool;

    /// Deep-clone the content of the template with this id into a detached
    /// fragment. Appending the fragment moves its content into the parent.
    fn clone_template(&self, template_id: &str) -> Option<NodeId>;

    /// Replace the whole class attribute.
    fn set_class_name(&self, node: NodeId, class_name: &str);

    /// Add one class token.
    fn add_class(&self, node: NodeId, class: &str);

    /// Remove one class token.
    fn remove_class(&self, node: NodeId, class: &str);

    /// Whether the class list contains `class`.
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Replace the element's children with parsed markup.
    fn set_inner_html(&self, node: NodeId, html: &str);

    /// Set an inline style property (kebab-case name).
    fn set_style(&self, node: NodeId, property: &str, value: &str);

    /// Clear an inline style property.
    fn remove_style(&self, node: NodeId, property: &str);

    /// Append `child` as the last child of `parent`, moving it if attached.
    fn append_child(&self, parent: NodeId, child: NodeId);

    /// Detach `node` from its parent and discard it with its descendants.
    fn remove(&self, node: NodeId);

    /// Layout width including borders and scrollbar.
    fn offset_width(&self, node: NodeId) -> u32;

    /// Layout width excluding the scrollbar.
    fn client_width(&self, node: NodeId) -> u32;

    /// Register a listener; listeners fire in registration order.
    fn add_listener(&self, target: EventTarget, kind: EventKind, listener: Listener)
    -> ListenerId;

    /// Unregister a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Run `callback` once after `delay`. A zero delay means "next tick".
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timer. Unknown or fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}
