#![forbid(unsafe_code)]

//! Browser backend for Popzy.
//!
//! [`WebDocument`] implements [`popzy_core::Document`] over `web-sys`, so a
//! `ModalManager` can render into the page it runs in. It only exists on
//! `wasm32`; on other targets this crate exposes just its error type and the
//! event-name mapping.

mod error;
mod names;

#[cfg(target_arch = "wasm32")]
mod web;

pub use error::WebError;
pub use names::event_type;

#[cfg(target_arch = "wasm32")]
pub use web::{UNTRACKED, WebDocument};
