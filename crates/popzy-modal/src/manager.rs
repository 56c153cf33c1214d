#![forbid(unsafe_code)]

//! The process-scoped owner of open-modal state.
//!
//! A [`ModalManager`] binds one [`Document`] and owns everything modals share:
//! the [`ModalStack`], the page scroll lock on `<body>`, and the cached
//! scrollbar width. Modals are created through it and keep a handle back to
//! it, so one manager per document replaces an ambient global registry.
//!
//! # Invariants
//!
//! - The scroll lock is present whenever the stack is non-empty, and is
//!   removed only once a close completes with the stack empty.
//! - The scrollbar width is measured at most once per manager.
//! - A modal is kept alive by the manager from `open()` until its close
//!   completes, so dropping every `Modal` handle never strands an open modal.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use popzy_core::Document;

use crate::classes;
use crate::config::ManagerConfig;
use crate::error::ModalError;
use crate::modal::{Modal, ModalSettings};
use crate::options::{ContentSource, ModalOptions, is_class_token};
use crate::stack::{ModalId, ModalStack};

/// Shared state behind a [`ModalManager`] handle.
pub(crate) struct Shared {
    pub(crate) doc: Rc<dyn Document>,
    pub(crate) config: ManagerConfig,
    stack: RefCell<ModalStack>,
    // Strong handles to modals that are open or still closing.
    live: RefCell<Vec<Modal>>,
    scrollbar_width: OnceCell<u32>,
}

/// Creates modals and tracks which of them are open.
///
/// Cloning is cheap; clones share the same stack.
#[derive(Clone)]
pub struct ModalManager {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for ModalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalManager")
            .field("config", &self.shared.config)
            .field("stack", &*self.shared.stack.borrow())
            .field("live", &self.shared.live.borrow().len())
            .field("scrollbar_width", &self.shared.scrollbar_width.get())
            .finish()
    }
}

impl ModalManager {
    /// Create a manager with the default configuration.
    pub fn new(doc: Rc<dyn Document>) -> Self {
        Self::with_config(doc, ManagerConfig::default())
    }

    /// Create a manager with an explicit configuration.
    pub fn with_config(doc: Rc<dyn Document>, config: ManagerConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                doc,
                config,
                stack: RefCell::new(ModalStack::new()),
                live: RefCell::new(Vec::new()),
                scrollbar_width: OnceCell::new(),
            }),
        }
    }

    /// Create a modal from `options`.
    ///
    /// # Errors
    ///
    /// - [`ModalError::MissingContent`] if neither content nor template is set.
    /// - [`ModalError::TemplateNotFound`] if the template id does not resolve.
    ///
    /// Both are also logged at `error` level. Setting both content and a
    /// template is not an error: the content wins and a warning is logged.
    pub fn create(&self, options: ModalOptions) -> Result<Modal, ModalError> {
        let (source, template_ignored) = options
            .resolve_source()
            .inspect_err(|err| tracing::error!(error = %err, "cannot create modal"))?;

        if template_ignored {
            tracing::warn!(
                template = options.template.as_deref().unwrap_or_default(),
                "both 'content' and 'template' are specified; 'content' takes precedence and the template is ignored"
            );
        }

        if let ContentSource::Template(id) = &source
            && !self.shared.doc.has_template(id)
        {
            let err = ModalError::TemplateNotFound(id.clone());
            tracing::error!(error = %err, "cannot create modal");
            return Err(err);
        }

        let style_classes = options
            .style_classes
            .into_iter()
            .filter(|class| {
                let valid = is_class_token(class);
                if !valid {
                    tracing::warn!(class = %class, "ignoring invalid style class");
                }
                valid
            })
            .collect();

        let settings = ModalSettings {
            destroy_on_close: options.destroy_on_close,
            footer: options.footer,
            dismiss: options.dismiss,
            style_classes,
            on_open: options.on_open,
            on_close: options.on_close,
        };

        let modal = Modal::new(self.clone(), source, settings);
        tracing::debug!(modal = modal.id().id(), "modal created");
        Ok(modal)
    }

    /// The document this manager renders into.
    pub fn document(&self) -> &Rc<dyn Document> {
        &self.shared.doc
    }

    /// The manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.shared.config
    }

    // --- Stack Queries ---

    /// Number of open modals.
    pub fn depth(&self) -> usize {
        self.shared.stack.borrow().depth()
    }

    /// Whether no modal is open.
    pub fn is_empty(&self) -> bool {
        self.shared.stack.borrow().is_empty()
    }

    /// The topmost open modal.
    pub fn top_id(&self) -> Option<ModalId> {
        self.shared.stack.borrow().top_id()
    }

    /// Open modals in open order (bottom to top).
    pub fn open_ids(&self) -> Vec<ModalId> {
        self.shared.stack.borrow().ids().to_vec()
    }

    pub(crate) fn is_open(&self, id: ModalId) -> bool {
        self.shared.stack.borrow().contains(id)
    }

    pub(crate) fn is_top(&self, id: ModalId) -> bool {
        self.shared.stack.borrow().is_top(id)
    }

    /// Register `id` as the new top. Returns the new depth, or `None` if it
    /// was already open.
    pub(crate) fn push(&self, id: ModalId) -> Option<usize> {
        let mut stack = self.shared.stack.borrow_mut();
        stack.push(id).then(|| stack.depth())
    }

    /// Remove `id` wherever it sits. Returns the remaining depth, or `None`
    /// if it was not open.
    pub(crate) fn remove(&self, id: ModalId) -> Option<usize> {
        let mut stack = self.shared.stack.borrow_mut();
        stack.remove(id).then(|| stack.depth())
    }

    /// Hold a strong handle to `modal` until [`release`](Self::release).
    pub(crate) fn retain(&self, modal: &Modal) {
        let mut live = self.shared.live.borrow_mut();
        if !live.iter().any(|m| m.id() == modal.id()) {
            live.push(modal.clone());
        }
    }

    /// Give back the handle taken by [`retain`](Self::retain).
    ///
    /// The caller drops the result once no borrow is held, since that may
    /// be the last handle.
    pub(crate) fn release(&self, id: ModalId) -> Option<Modal> {
        let mut live = self.shared.live.borrow_mut();
        let idx = live.iter().position(|m| m.id() == id)?;
        Some(live.remove(idx))
    }

    /// Number of modals held alive (open or finishing a close).
    pub fn live_count(&self) -> usize {
        self.shared.live.borrow().len()
    }

    // --- Page State ---

    /// Width of the page scrollbar, measured once with an offscreen probe.
    pub fn scrollbar_width(&self) -> u32 {
        *self
            .shared
            .scrollbar_width
            .get_or_init(|| measure_scrollbar(self.shared.doc.as_ref()))
    }

    /// Whether the page scroll lock is applied.
    pub fn is_scroll_locked(&self) -> bool {
        let doc = &self.shared.doc;
        doc.has_class(doc.body(), classes::NO_SCROLL)
    }

    pub(crate) fn lock_scroll(&self) {
        let width = self.scrollbar_width();
        let doc = &self.shared.doc;
        let body = doc.body();
        doc.add_class(body, classes::NO_SCROLL);
        doc.set_style(body, "padding-right", &format!("{width}px"));
    }

    /// Drop the scroll lock if no modal is open any more.
    pub(crate) fn release_scroll_if_idle(&self) {
        if !self.is_empty() {
            return;
        }
        let doc = &self.shared.doc;
        let body = doc.body();
        doc.remove_class(body, classes::NO_SCROLL);
        doc.remove_style(body, "padding-right");
        tracing::debug!("scroll lock released");
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }
}

fn measure_scrollbar(doc: &dyn Document) -> u32 {
    let probe = doc.create_element("div");
    doc.set_style(probe, "overflow", "scroll");
    doc.set_style(probe, "position", "absolute");
    doc.set_style(probe, "top", "-9999px");
    doc.append_child(doc.body(), probe);
    let width = doc
        .offset_width(probe)
        .saturating_sub(doc.client_width(probe));
    doc.remove(probe);
    tracing::debug!(width, "measured scrollbar width");
    width
}
