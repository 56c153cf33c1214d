#![forbid(unsafe_code)]

//! The modal controller.
//!
//! A [`Modal`] renders this structure into the document body:
//!
//! ```text
//! div.popzy__backdrop
//! └── div.popzy__container (+ extra style classes)
//!     ├── button.popzy__close          (button dismissal only)
//!     ├── div.popzy__content           (literal markup or template clone)
//!     └── footer.popzy__footer         (footer only)
//!         ├── footer content markup
//!         └── button.<class> ...       (footer buttons, in add order)
//! ```
//!
//! # Lifecycle
//!
//! - `open()` builds the tree if needed, pushes the modal onto the manager
//!   stack, locks page scrolling, adds `popzy--show` on the next tick, wires
//!   dismissal, and runs `on_open` once the open transition finishes.
//! - `close(destroy)` removes the modal from the stack, drops `popzy--show`,
//!   unwires dismissal, and once the close transition finishes: tears the
//!   tree down (if `destroy`), runs `on_close`, and releases the scroll lock
//!   when nothing else is open.
//!
//! # Invariants
//!
//! - The tree is either fully built and attached, or absent (`tree: None`).
//! - Escape only closes the modal that is on top of the manager stack.
//! - Only the most recently armed transition wait ever completes.
//! - No internal borrow is held while user callbacks run, so callbacks may
//!   call back into the modal.
//! - The manager holds the modal from `open()` until its close completes;
//!   dropping the last handle of a closed modal discards its hidden tree.
//!
//! # Failure Modes
//!
//! | Call | State | Behavior |
//! |------|-------|----------|
//! | `open()` | already open | no-op, returns the backdrop |
//! | `open()` | template removed since creation | `Err(TemplateNotFound)` |
//! | `close()` | not open | no-op |
//! | `destroy()` | closed but built | immediate teardown |

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use popzy_core::{
    Document, DomEvent, EventKind, EventTarget, KEY_ESCAPE, ListenerId, NodeId, TimerId,
};

use crate::classes;
use crate::error::ModalError;
use crate::footer::{FooterButton, render_button, render_footer};
use crate::manager::ModalManager;
use crate::options::{ButtonCallback, ContentSource, DismissMethods, ModalCallback};
use crate::stack::ModalId;
use crate::transition::TransitionWait;

/// Resolved, immutable per-modal configuration.
pub(crate) struct ModalSettings {
    pub(crate) destroy_on_close: bool,
    pub(crate) footer: bool,
    pub(crate) dismiss: DismissMethods,
    pub(crate) style_classes: Vec<String>,
    pub(crate) on_open: Option<ModalCallback>,
    pub(crate) on_close: Option<ModalCallback>,
}

/// Handles to the built DOM subtree.
#[derive(Debug, Clone, Copy)]
struct ModalTree {
    backdrop: NodeId,
    content: NodeId,
    footer: Option<NodeId>,
}

#[derive(Default)]
struct ModalState {
    footer_content: Option<String>,
    footer_buttons: Vec<FooterButton>,
    tree: Option<ModalTree>,
    escape_listener: Option<ListenerId>,
    backdrop_listener: Option<ListenerId>,
    show_timer: Option<TimerId>,
    transition: Option<TransitionWait>,
}

pub(crate) struct ModalInner {
    id: ModalId,
    manager: ModalManager,
    settings: ModalSettings,
    source: RefCell<ContentSource>,
    state: RefCell<ModalState>,
}

/// Handle to one modal. Cloning yields another handle to the same modal.
#[derive(Clone)]
pub struct Modal {
    inner: Rc<ModalInner>,
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("id", &self.inner.id)
            .field("open", &self.is_open())
            .field("built", &self.is_built())
            .finish()
    }
}

impl PartialEq for Modal {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Modal {}

impl Modal {
    pub(crate) fn new(manager: ModalManager, source: ContentSource, settings: ModalSettings) -> Self {
        Self {
            inner: Rc::new(ModalInner {
                id: ModalId::next(),
                manager,
                settings,
                source: RefCell::new(source),
                state: RefCell::new(ModalState::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ModalInner>) -> Self {
        Self { inner }
    }

    fn from_weak(weak: &Weak<ModalInner>) -> Option<Self> {
        weak.upgrade().map(Self::from_inner)
    }

    fn weak(&self) -> Weak<ModalInner> {
        Rc::downgrade(&self.inner)
    }

    fn doc(&self) -> &Rc<dyn Document> {
        &self.inner.manager.shared().doc
    }

    // --- Queries ---

    /// Unique id of this modal.
    pub fn id(&self) -> ModalId {
        self.inner.id
    }

    /// Whether the modal is on the manager stack.
    pub fn is_open(&self) -> bool {
        self.inner.manager.is_open(self.inner.id)
    }

    /// Whether the DOM subtree currently exists.
    pub fn is_built(&self) -> bool {
        self.inner.state.borrow().tree.is_some()
    }

    /// Whether an open or close transition has not finished yet.
    pub fn is_transitioning(&self) -> bool {
        self.inner
            .state
            .borrow()
            .transition
            .as_ref()
            .is_some_and(TransitionWait::is_pending)
    }

    /// The backdrop element, if built.
    pub fn backdrop(&self) -> Option<NodeId> {
        self.inner.state.borrow().tree.map(|t| t.backdrop)
    }

    /// The content slot element, if built.
    pub fn content_slot(&self) -> Option<NodeId> {
        self.inner.state.borrow().tree.map(|t| t.content)
    }

    /// The footer element, if built with a footer.
    pub fn footer(&self) -> Option<NodeId> {
        self.inner.state.borrow().tree.and_then(|t| t.footer)
    }

    /// The current content source.
    pub fn content_source(&self) -> ContentSource {
        self.inner.source.borrow().clone()
    }

    /// The manager this modal belongs to.
    pub fn manager(&self) -> &ModalManager {
        &self.inner.manager
    }

    // --- Building ---

    /// Build the DOM subtree and attach it to `<body>`.
    ///
    /// Idempotent: returns the existing backdrop if already built.
    pub fn build(&self) -> Result<NodeId, ModalError> {
        if let Some(backdrop) = self.backdrop() {
            return Ok(backdrop);
        }

        let doc = self.doc().clone();
        let settings = &self.inner.settings;

        // Resolve the content first so a failure leaves nothing behind.
        let source = self.inner.source.borrow().clone();
        let content_fragment = match &source {
            ContentSource::Literal(_) => None,
            ContentSource::Template(id) => Some(doc.clone_template(id).ok_or_else(|| {
                let err = ModalError::TemplateNotFound(id.clone());
                tracing::error!(modal = self.id().id(), error = %err, "cannot build modal");
                err
            })?),
        };

        let backdrop = doc.create_element("div");
        doc.set_class_name(backdrop, classes::BACKDROP);

        let container = doc.create_element("div");
        doc.set_class_name(container, classes::CONTAINER);
        for class in &settings.style_classes {
            doc.add_class(container, class);
        }

        if settings.dismiss.contains(DismissMethods::BUTTON) {
            let close = FooterButton::new(
                classes::CLOSE_LABEL,
                classes::CLOSE,
                Rc::new(|modal: &Modal| modal.close_default()),
            );
            let node = render_button(doc.as_ref(), &close, self.weak());
            doc.append_child(container, node);
        }

        let content = doc.create_element("div");
        doc.set_class_name(content, classes::CONTENT);
        match (&source, content_fragment) {
            (_, Some(fragment)) => doc.append_child(content, fragment),
            (ContentSource::Literal(html), None) => doc.set_inner_html(content, html),
            (ContentSource::Template(_), None) => {}
        }
        doc.append_child(container, content);

        let footer = settings.footer.then(|| {
            let footer = doc.create_element("footer");
            doc.set_class_name(footer, classes::FOOTER);
            let state = self.inner.state.borrow();
            render_footer(
                doc.as_ref(),
                footer,
                state.footer_content.as_deref(),
                &state.footer_buttons,
                self.weak(),
            );
            doc.append_child(container, footer);
            footer
        });

        doc.append_child(backdrop, container);
        doc.append_child(doc.body(), backdrop);

        self.inner.state.borrow_mut().tree = Some(ModalTree {
            backdrop,
            content,
            footer,
        });
        tracing::debug!(modal = self.id().id(), "modal built");
        Ok(backdrop)
    }

    fn teardown(&self) {
        let tree = self.inner.state.borrow_mut().tree.take();
        if let Some(tree) = tree {
            self.doc().remove(tree.backdrop);
            tracing::debug!(modal = self.id().id(), "modal destroyed");
        }
    }

    // --- Open / Close ---

    /// Open the modal and return its backdrop.
    ///
    /// # Errors
    ///
    /// [`ModalError::TemplateNotFound`] if the subtree must be built from a
    /// template that no longer exists.
    pub fn open(&self) -> Result<NodeId, ModalError> {
        let manager = &self.inner.manager;
        if manager.is_open(self.id()) {
            tracing::debug!(modal = self.id().id(), "open ignored: already open");
            return self.build();
        }

        let backdrop = self.build()?;
        let depth = manager.push(self.id()).unwrap_or_else(|| manager.depth());
        manager.retain(self);
        manager.lock_scroll();

        let doc = self.doc().clone();
        let settings = &self.inner.settings;

        // The show class must land after the tree is in the document, or the
        // transition does not run.
        let show_timer = {
            let weak = self.weak();
            doc.set_timeout(
                Duration::ZERO,
                Box::new(move || {
                    if let Some(modal) = Modal::from_weak(&weak) {
                        modal.apply_show();
                    }
                }),
            )
        };

        let backdrop_listener = settings
            .dismiss
            .contains(DismissMethods::BACKDROP)
            .then(|| {
                let weak = self.weak();
                doc.add_listener(
                    EventTarget::Node(backdrop),
                    EventKind::Click,
                    Rc::new(move |event: &DomEvent| {
                        if event.target() != Some(backdrop) {
                            return;
                        }
                        if let Some(modal) = Modal::from_weak(&weak) {
                            modal.close_default();
                        }
                    }),
                )
            });

        let escape_listener = settings.dismiss.contains(DismissMethods::ESCAPE).then(|| {
            let weak = self.weak();
            doc.add_listener(
                EventTarget::Document,
                EventKind::KeyDown,
                Rc::new(move |event: &DomEvent| {
                    if !event.is_key(KEY_ESCAPE) {
                        return;
                    }
                    let Some(modal) = Modal::from_weak(&weak) else {
                        return;
                    };
                    if modal.inner.manager.is_top(modal.id()) {
                        tracing::trace!(modal = modal.id().id(), "escape dismisses top modal");
                        modal.close_default();
                    }
                }),
            )
        });

        {
            let mut state = self.inner.state.borrow_mut();
            let stale = [
                state.show_timer.replace(show_timer).map(Stale::Timer),
                std::mem::replace(&mut state.backdrop_listener, backdrop_listener)
                    .map(Stale::Listener),
                std::mem::replace(&mut state.escape_listener, escape_listener)
                    .map(Stale::Listener),
            ];
            drop(state);
            for item in stale.into_iter().flatten() {
                item.release(doc.as_ref());
            }
        }

        let on_open = settings.on_open.clone();
        self.await_transition(backdrop, move || {
            if let Some(callback) = on_open {
                callback();
            }
        });

        tracing::debug!(modal = self.id().id(), depth, "modal opened");
        Ok(backdrop)
    }

    fn apply_show(&self) {
        let backdrop = {
            let mut state = self.inner.state.borrow_mut();
            state.show_timer = None;
            state.tree.map(|t| t.backdrop)
        };
        if let Some(backdrop) = backdrop {
            self.doc().add_class(backdrop, classes::SHOW);
        }
    }

    /// Close using the configured destroy-on-close policy.
    pub fn close_default(&self) {
        self.close(self.inner.settings.destroy_on_close);
    }

    /// Close the modal; with `destroy`, the subtree is discarded once the
    /// close transition finishes.
    pub fn close(&self, destroy: bool) {
        let Some(depth) = self.inner.manager.remove(self.id()) else {
            tracing::debug!(modal = self.id().id(), "close ignored: not open");
            return;
        };

        let doc = self.doc().clone();
        let (backdrop, stale) = {
            let mut state = self.inner.state.borrow_mut();
            let stale = [
                state.show_timer.take().map(Stale::Timer),
                state.backdrop_listener.take().map(Stale::Listener),
                state.escape_listener.take().map(Stale::Listener),
            ];
            (state.tree.map(|t| t.backdrop), stale)
        };
        for item in stale.into_iter().flatten() {
            item.release(doc.as_ref());
        }

        let Some(backdrop) = backdrop else {
            // Open always builds, so this only happens if the tree was torn
            // down by hand while open.
            self.finish_close(destroy);
            return;
        };
        doc.remove_class(backdrop, classes::SHOW);

        let weak = self.weak();
        self.await_transition(backdrop, move || {
            if let Some(modal) = Modal::from_weak(&weak) {
                modal.finish_close(destroy);
            }
        });

        tracing::debug!(modal = self.id().id(), depth, destroy, "modal closing");
    }

    fn finish_close(&self, destroy: bool) {
        // Released before `on_close` so a reopen from the callback retains
        // the modal again.
        let held = self.inner.manager.release(self.id());
        if destroy {
            self.teardown();
        }
        if let Some(callback) = self.inner.settings.on_close.clone() {
            callback();
        }
        self.inner.manager.release_scroll_if_idle();
        drop(held);
    }

    /// Close and discard the subtree regardless of the configured policy.
    ///
    /// A modal that is already closed but still built is torn down at once.
    pub fn destroy(&self) {
        if self.is_open() {
            self.close(true);
            return;
        }
        let pending = self.inner.state.borrow_mut().transition.take();
        match pending {
            // A close is still animating: finish it now, with teardown.
            Some(wait) if wait.is_pending() => {
                wait.cancel();
                self.finish_close(true);
            }
            Some(wait) => {
                wait.cancel();
                self.teardown();
            }
            None => self.teardown(),
        }
    }

    /// Arm a transition wait on `node`, replacing any pending one.
    fn await_transition(&self, node: NodeId, on_done: impl FnOnce() + 'static) {
        let config = self.inner.manager.config();
        let wait = TransitionWait::arm(
            self.doc(),
            node,
            &config.transition_property,
            config.transition_timeout,
            on_done,
        );
        let previous = self.inner.state.borrow_mut().transition.replace(wait);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    // --- Content ---

    /// Replace the body markup; updates the content slot at once if built.
    pub fn set_content(&self, html: impl Into<String>) {
        let html = html.into();
        if let Some(content) = self.content_slot() {
            self.doc().set_inner_html(content, &html);
        }
        *self.inner.source.borrow_mut() = ContentSource::Literal(html);
    }

    /// Replace the footer markup; updates the footer at once if it exists.
    ///
    /// Footer buttons already added stay after the new markup.
    pub fn set_footer_content(&self, html: impl Into<String>) {
        let footer = {
            let mut state = self.inner.state.borrow_mut();
            state.footer_content = Some(html.into());
            state.tree.and_then(|t| t.footer)
        };
        if let Some(footer) = footer {
            let state = self.inner.state.borrow();
            render_footer(
                self.doc().as_ref(),
                footer,
                state.footer_content.as_deref(),
                &state.footer_buttons,
                self.weak(),
            );
        }
    }

    /// Append a footer button; rendered at once if the footer exists,
    /// otherwise when the modal is built.
    pub fn add_footer_button(
        &self,
        label: impl Into<String>,
        class: impl Into<String>,
        callback: impl Fn(&Modal) + 'static,
    ) {
        let callback: ButtonCallback = Rc::new(callback);
        let button = FooterButton::new(label, class, callback);
        let footer = self.footer();
        if let Some(footer) = footer {
            let node = render_button(self.doc().as_ref(), &button, self.weak());
            self.doc().append_child(footer, node);
        }
        self.inner.state.borrow_mut().footer_buttons.push(button);
    }

    /// Number of footer buttons added so far.
    pub fn footer_button_count(&self) -> usize {
        self.inner.state.borrow().footer_buttons.len()
    }
}

impl Drop for ModalInner {
    // Only reachable once the modal is neither open nor closing, so at most a
    // hidden tree is left to discard.
    fn drop(&mut self) {
        let doc = self.manager.shared().doc.clone();
        let state = self.state.get_mut();
        if let Some(wait) = state.transition.take() {
            wait.cancel();
        }
        let stale = [
            state.show_timer.take().map(Stale::Timer),
            state.backdrop_listener.take().map(Stale::Listener),
            state.escape_listener.take().map(Stale::Listener),
        ];
        for item in stale.into_iter().flatten() {
            item.release(doc.as_ref());
        }
        if let Some(tree) = state.tree.take() {
            doc.remove(tree.backdrop);
            tracing::debug!(modal = self.id.id(), "dropped modal discarded its tree");
        }
    }
}

/// A listener or timer superseded by a newer one.
enum Stale {
    Listener(ListenerId),
    Timer(TimerId),
}

impl Stale {
    fn release(self, doc: &dyn Document) {
        match self {
            Self::Listener(id) => doc.remove_listener(id),
            Self::Timer(id) => doc.clear_timeout(id),
        }
    }
}
