#![forbid(unsafe_code)]

//! Host document abstraction for Popzy.
//!
//! - [`document`]: the [`Document`] trait the modal layer renders through.
//! - [`event`]: the DOM events listeners receive.
//! - [`memory`]: [`MemoryDocument`], a deterministic headless backend.

pub mod document;
pub mod event;
pub mod memory;

pub use document::{Document, EventTarget, Listener, ListenerId, NodeId, TimerCallback, TimerId};
pub use event::{DomEvent, EventKind, KEY_ESCAPE};
pub use memory::MemoryDocument;
