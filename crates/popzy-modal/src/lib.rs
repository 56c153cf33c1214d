#![forbid(unsafe_code)]

//! Stackable popup modals rendered through a [`Document`] backend.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use popzy_core::MemoryDocument;
//! use popzy_modal::{DismissMethods, ModalManager, ModalOptions};
//!
//! let doc = Rc::new(MemoryDocument::new());
//! let manager = ModalManager::new(doc.clone());
//!
//! let modal = manager
//!     .create(
//!         ModalOptions::new()
//!             .content("<p>Saved</p>")
//!             .footer(true)
//!             .dismiss(DismissMethods::BUTTON | DismissMethods::ESCAPE),
//!     )
//!     .expect("content is set");
//! modal.add_footer_button("OK", "btn", |m| m.close_default());
//!
//! modal.open().expect("literal content always builds");
//! assert_eq!(manager.depth(), 1);
//!
//! doc.key_down("Escape");
//! assert_eq!(manager.depth(), 0);
//! ```
//!
//! [`Document`]: popzy_core::Document

pub mod classes;
mod config;
mod error;
mod footer;
mod manager;
mod modal;
mod options;
mod stack;
mod transition;

pub use config::{DEFAULT_TRANSITION_PROPERTY, DEFAULT_TRANSITION_TIMEOUT, ManagerConfig};
pub use error::{ModalError, ParseDismissMethodError};
pub use manager::ModalManager;
pub use modal::Modal;
pub use options::{
    ButtonCallback, ContentSource, DismissMethod, DismissMethods, ModalCallback, ModalOptions,
};
pub use stack::{ModalId, ModalStack};
