#![forbid(unsafe_code)]

//! Footer buttons and footer rendering.

use std::rc::{Rc, Weak};

use popzy_core::{Document, DomEvent, EventKind, EventTarget, NodeId};

use crate::modal::{Modal, ModalInner};
use crate::options::ButtonCallback;

/// A registered footer button.
#[derive(Clone)]
pub(crate) struct FooterButton {
    /// Button markup.
    pub(crate) label: String,
    /// Class attribute.
    pub(crate) class: String,
    pub(crate) callback: ButtonCallback,
}

impl std::fmt::Debug for FooterButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FooterButton")
            .field("label", &self.label)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl FooterButton {
    pub(crate) fn new(
        label: impl Into<String>,
        class: impl Into<String>,
        callback: ButtonCallback,
    ) -> Self {
        Self {
            label: label.into(),
            class: class.into(),
            callback,
        }
    }
}

/// Create the `<button>` for `button`, wired to its callback.
pub(crate) fn render_button(
    doc: &dyn Document,
    button: &FooterButton,
    owner: Weak<ModalInner>,
) -> NodeId {
    let node = doc.create_element("button");
    doc.set_class_name(node, &button.class);
    doc.set_inner_html(node, &button.label);

    let callback = Rc::clone(&button.callback);
    doc.add_listener(
        EventTarget::Node(node),
        EventKind::Click,
        Rc::new(move |_: &DomEvent| {
            if let Some(inner) = owner.upgrade() {
                callback(&Modal::from_inner(inner));
            }
        }),
    );
    node
}

/// Rewrite `footer`: the markup first, then every button in add order.
pub(crate) fn render_footer(
    doc: &dyn Document,
    footer: NodeId,
    content: Option<&str>,
    buttons: &[FooterButton],
    owner: Weak<ModalInner>,
) {
    doc.set_inner_html(footer, content.unwrap_or_default());
    for button in buttons {
        let node = render_button(doc, button, owner.clone());
        doc.append_child(footer, node);
    }
}
