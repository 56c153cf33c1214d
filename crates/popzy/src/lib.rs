#![forbid(unsafe_code)]

//! Popzy: stackable popup modals.
//!
//! This facade re-exports:
//! - [`core`]: the [`Document`] backend trait and the headless [`MemoryDocument`]
//! - [`modal`]: [`ModalManager`], [`Modal`], and [`ModalOptions`]
//! - [`web`] (feature `web`, wasm32 only): the browser backend
//!
//! ```
//! use std::rc::Rc;
//! use popzy::prelude::*;
//!
//! let doc = Rc::new(MemoryDocument::new());
//! let manager = ModalManager::new(doc.clone());
//! let modal = manager.create(ModalOptions::new().content("<p>Hi</p>")).unwrap();
//! modal.open().unwrap();
//! assert!(manager.is_scroll_locked());
//! ```

pub use popzy_core as core;
pub use popzy_modal as modal;
#[cfg(feature = "web")]
pub use popzy_web as web;

pub use popzy_core::{Document, DomEvent, EventKind, EventTarget, MemoryDocument, NodeId};
pub use popzy_modal::{
    ContentSource, DismissMethod, DismissMethods, ManagerConfig, Modal, ModalError, ModalId,
    ModalManager, ModalOptions, classes,
};

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use popzy_web::WebDocument;

/// Common imports for building modals.
pub mod prelude {
    pub use popzy_core::{Document, MemoryDocument};
    pub use popzy_modal::{
        DismissMethods, ManagerConfig, Modal, ModalError, ModalManager, ModalOptions,
    };

    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    pub use popzy_web::WebDocument;
}
