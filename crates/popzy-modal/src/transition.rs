#![forbid(unsafe_code)]

//! Waiting for a visual transition to finish.
//!
//! A [`TransitionWait`] completes exactly once, on whichever comes first:
//!
//! 1. a `transitionend` on (or bubbling to) the watched node whose property
//!    matches the configured one (other properties are ignored, so parallel
//!    opacity and transform transitions do not complete twice), or
//! 2. the fallback timer, when a timeout is configured.
//!
//! Completing removes the listener and cancels the timer. [`cancel`]
//! tears both down without running the callback; modals use it so that only
//! the most recently armed wait ever completes.
//!
//! [`cancel`]: TransitionWait::cancel

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use popzy_core::{Document, DomEvent, EventKind, EventTarget, ListenerId, NodeId, TimerId};

type Completion = Box<dyn FnOnce()>;

#[derive(Default)]
struct Pending {
    callback: Option<Completion>,
    listener: Option<ListenerId>,
    timer: Option<TimerId>,
}

impl Pending {
    fn take_all(&mut self) -> (Option<Completion>, Option<ListenerId>, Option<TimerId>) {
        (self.callback.take(), self.listener.take(), self.timer.take())
    }
}

/// An armed wait for the end of a transition.
pub(crate) struct TransitionWait {
    pending: Rc<RefCell<Pending>>,
    doc: Weak<dyn Document>,
}

impl TransitionWait {
    /// Start waiting on `node` for `property`, then run `on_done`.
    pub(crate) fn arm(
        doc: &Rc<dyn Document>,
        node: NodeId,
        property: &str,
        timeout: Option<Duration>,
        on_done: impl FnOnce() + 'static,
    ) -> Self {
        let pending = Rc::new(RefCell::new(Pending {
            callback: Some(Box::new(on_done)),
            ..Pending::default()
        }));
        let weak_doc = Rc::downgrade(doc);

        let listener = {
            let pending = Rc::downgrade(&pending);
            let weak_doc = weak_doc.clone();
            let property = property.to_owned();
            doc.add_listener(
                EventTarget::Node(node),
                EventKind::TransitionEnd,
                Rc::new(move |event: &DomEvent| {
                    let DomEvent::TransitionEnd { property_name, .. } = event else {
                        return;
                    };
                    if *property_name != property {
                        return;
                    }
                    if let Some(pending) = pending.upgrade() {
                        complete(&pending, &weak_doc);
                    }
                }),
            )
        };

        let timer = timeout.map(|delay| {
            let pending = Rc::downgrade(&pending);
            let weak_doc = weak_doc.clone();
            doc.set_timeout(
                delay,
                Box::new(move || {
                    if let Some(pending) = pending.upgrade() {
                        tracing::debug!(?delay, "transition fallback timeout fired");
                        complete(&pending, &weak_doc);
                    }
                }),
            )
        });

        {
            let mut p = pending.borrow_mut();
            p.listener = Some(listener);
            p.timer = timer;
        }

        Self {
            pending,
            doc: weak_doc,
        }
    }

    /// Whether the wait has neither completed nor been cancelled.
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.borrow().callback.is_some()
    }

    /// Disarm without running the callback.
    pub(crate) fn cancel(self) {
        let (callback, listener, timer) = self.pending.borrow_mut().take_all();
        release(&self.doc, listener, timer);
        drop(callback);
    }
}

fn complete(pending: &RefCell<Pending>, doc: &Weak<dyn Document>) {
    let (callback, listener, timer) = pending.borrow_mut().take_all();
    release(doc, listener, timer);
    if let Some(callback) = callback {
        callback();
    }
}

fn release(doc: &Weak<dyn Document>, listener: Option<ListenerId>, timer: Option<TimerId>) {
    let Some(doc) = doc.upgrade() else {
        return;
    };
    if let Some(id) = listener {
        doc.remove_listener(id);
    }
    if let Some(id) = timer {
        doc.clear_timeout(id);
    }
}
