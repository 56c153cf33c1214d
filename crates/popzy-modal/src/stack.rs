#![forbid(unsafe_code)]

//! Open-order record of modals.
//!
//! The last entry is the top, the only modal the Escape key reaches.
//!
//! # Invariants
//!
//! - Entries keep the order in which their modals were opened.
//! - An id is present at most once.
//! - [`ModalStack::remove`] takes out exactly the given entry, wherever it
//!   sits, so closing a buried modal leaves every other entry in place.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MODAL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one modal, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MODAL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, as logged in the `modal` field.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ModalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "modal#{}", self.0)
    }
}

/// Ids of open modals, bottom first.
#[derive(Debug, Clone, Default)]
pub struct ModalStack {
    open: Vec<ModalId>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `id` on top. A repeated id is refused and `false` returned.
    pub fn push(&mut self, id: ModalId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.open.push(id);
        true
    }

    /// Take `id` out of the stack; `false` if it was not there.
    pub fn remove(&mut self, id: ModalId) -> bool {
        let before = self.open.len();
        self.open.retain(|entry| *entry != id);
        self.open.len() != before
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Number of open modals.
    #[inline]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.open.contains(&id)
    }

    /// The most recently opened modal still open.
    pub fn top_id(&self) -> Option<ModalId> {
        self.open.last().copied()
    }

    pub fn is_top(&self, id: ModalId) -> bool {
        self.top_id() == Some(id)
    }

    /// Open ids, bottom to top.
    pub fn ids(&self) -> &[ModalId] {
        &self.open
    }
}
