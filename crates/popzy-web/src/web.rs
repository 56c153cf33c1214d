#![forbid(unsafe_code)]

//! `web-sys` implementation of [`Document`].
//!
//! Nodes created here (and the page `<body>`) are tracked in a registry keyed
//! by [`NodeId`]. Listener closures and pending timers live in the same
//! registry so they can be released when a node is removed or the backend is
//! dropped. A timer's closure is owned by its registry entry and freed when
//! the timer is cleared, or on the next timer call after it fires.
//!
//! # Invariants
//!
//! - No registry borrow is held while a listener or timer callback runs.
//! - Removing a node (or replacing its markup) forgets every tracked
//!   descendant and detaches their listeners.
//! - Events whose origin is not a tracked node report [`UNTRACKED`] as their
//!   target, so "target is this node" checks stay exact.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use ahash::AHashMap;
use popzy_core::{
    Document, DomEvent, EventKind, EventTarget, Listener, ListenerId, NodeId, TimerCallback,
    TimerId,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::error::WebError;
use crate::names::event_type;

/// Target reported for events from nodes this backend did not create.
pub const UNTRACKED: NodeId = NodeId::new(u64::MAX);

const DOCUMENT_FRAGMENT_NODE: u16 = 11;

type JsListener = Closure<dyn FnMut(web_sys::Event)>;
type JsTimer = Closure<dyn FnMut()>;

struct Pending {
    handle: i32,
    closure: JsTimer,
}

struct Registered {
    node: Option<NodeId>,
    target: web_sys::EventTarget,
    kind: EventKind,
    closure: JsListener,
}

impl Registered {
    fn detach(self) {
        let _ = self.target.remove_event_listener_with_callback(
            event_type(self.kind),
            self.closure.as_ref().unchecked_ref(),
        );
    }
}

#[derive(Default)]
struct Registry {
    nodes: AHashMap<NodeId, web_sys::Node>,
    listeners: AHashMap<ListenerId, Registered>,
    timers: AHashMap<TimerId, Pending>,
    // Closures of fired timers, freed on the next timer call since a closure
    // cannot be dropped while it runs.
    spent: Vec<JsTimer>,
    next_node: u64,
    next_listener: u64,
    next_timer: u64,
}

impl Registry {
    fn alloc(&mut self, node: web_sys::Node) -> NodeId {
        self.next_node += 1;
        let id = NodeId::new(self.next_node);
        self.nodes.insert(id, node);
        id
    }

    fn node(&self, id: NodeId) -> Option<web_sys::Node> {
        self.nodes.get(&id).cloned()
    }

    fn resolve(&self, target: &web_sys::Node) -> NodeId {
        self.nodes
            .iter()
            .find(|(_, n)| n.is_same_node(Some(target)))
            .map_or(UNTRACKED, |(id, _)| *id)
    }

    /// Forget tracked nodes inside `root` and return their listeners.
    fn forget_within(&mut self, root: &web_sys::Node, include_root: bool) -> Vec<Registered> {
        let gone: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, n)| {
                let is_root = n.is_same_node(Some(root));
                if is_root {
                    include_root
                } else {
                    root.contains(Some(n))
                }
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &gone {
            self.nodes.remove(id);
        }
        let stale: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, l)| l.node.is_some_and(|n| gone.contains(&n)))
            .map(|(id, _)| *id)
            .collect();
        stale
            .into_iter()
            .filter_map(|id| self.listeners.remove(&id))
            .collect()
    }
}

/// Translate a browser event into the event a listener of `kind` expects.
fn translate(registry: &Registry, kind: EventKind, event: &web_sys::Event) -> Option<DomEvent> {
    let target = || {
        event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Node>().ok())
            .map_or(UNTRACKED, |n| registry.resolve(&n))
    };
    match kind {
        EventKind::Click => Some(DomEvent::click(target())),
        EventKind::KeyDown => event
            .dyn_ref::<web_sys::KeyboardEvent>()
            .map(|k| DomEvent::key_down(k.key())),
        EventKind::TransitionEnd => event
            .dyn_ref::<web_sys::TransitionEvent>()
            .map(|t| DomEvent::transition_end(target(), t.property_name())),
    }
}

fn px(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// The page document, seen through [`Document`].
pub struct WebDocument {
    window: web_sys::Window,
    document: web_sys::Document,
    body: NodeId,
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("WebDocument")
            .field("nodes", &registry.nodes.len())
            .field("listeners", &registry.listeners.len())
            .field("timers", &registry.timers.len())
            .finish()
    }
}

impl WebDocument {
    /// Bind to the global window's document.
    ///
    /// # Errors
    ///
    /// Returns a [`WebError`] naming the first missing piece of the page.
    pub fn new() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;
        let body = document.body().ok_or(WebError::NoBody)?;

        let mut registry = Registry::default();
        let body = registry.alloc(web_sys::Node::from(body));

        #[cfg(feature = "tracing")]
        tracing::debug!("web document bound");

        Ok(Self {
            window,
            document,
            body,
            registry: Rc::new(RefCell::new(registry)),
        })
    }

    /// The DOM element behind `node`, for host code that needs direct access
    /// (focus management, attributes).
    pub fn element(&self, node: NodeId) -> Option<web_sys::Element> {
        self.registry
            .borrow()
            .node(node)
            .and_then(|n| n.dyn_into::<web_sys::Element>().ok())
    }

    /// Timers scheduled and neither fired nor cleared.
    pub fn pending_timers(&self) -> usize {
        self.registry.borrow().timers.len()
    }

    fn html_element(&self, node: NodeId) -> Option<web_sys::HtmlElement> {
        self.element(node)
            .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok())
    }

    fn release(listeners: Vec<Registered>) {
        for listener in listeners {
            listener.detach();
        }
    }
}

impl Document for WebDocument {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&self, tag: &str) -> NodeId {
        match self.document.create_element(tag) {
            Ok(el) => self.registry.borrow_mut().alloc(el.into()),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(tag, "createElement rejected tag");
                UNTRACKED
            }
        }
    }

    fn has_template(&self, template_id: &str) -> bool {
        self.document
            .get_element_by_id(template_id)
            .is_some_and(|e| e.dyn_ref::<web_sys::HtmlTemplateElement>().is_some())
    }

    fn clone_template(&self, template_id: &str) -> Option<NodeId> {
        let template = self
            .document
            .get_element_by_id(template_id)?
            .dyn_into::<web_sys::HtmlTemplateElement>()
            .ok()?;
        let fragment = template.content().clone_node_with_deep(true).ok()?;
        Some(self.registry.borrow_mut().alloc(fragment))
    }

    fn set_class_name(&self, node: NodeId, class_name: &str) {
        if let Some(el) = self.element(node) {
            el.set_class_name(class_name);
        }
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn set_inner_html(&self, node: NodeId, html: &str) {
        let Some(el) = self.element(node) else {
            return;
        };
        let stale = self
            .registry
            .borrow_mut()
            .forget_within(el.as_ref(), false);
        Self::release(stale);
        el.set_inner_html(html);
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.html_element(node) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn remove_style(&self, node: NodeId, property: &str) {
        if let Some(el) = self.html_element(node) {
            let _ = el.style().remove_property(property);
        }
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let (parent_node, child_node) = {
            let registry = self.registry.borrow();
            (registry.node(parent), registry.node(child))
        };
        let (Some(parent_node), Some(child_node)) = (parent_node, child_node) else {
            return;
        };
        let _ = parent_node.append_child(&child_node);
        // An appended fragment is left empty; its handle is spent.
        if child_node.node_type() == DOCUMENT_FRAGMENT_NODE {
            self.registry.borrow_mut().nodes.remove(&child);
        }
    }

    fn remove(&self, node: NodeId) {
        let Some(dom_node) = self.registry.borrow().node(node) else {
            return;
        };
        let stale = self.registry.borrow_mut().forget_within(&dom_node, true);
        Self::release(stale);
        if let Some(el) = dom_node.dyn_ref::<web_sys::Element>() {
            el.remove();
        } else if let Some(parent) = dom_node.parent_node() {
            let _ = parent.remove_child(&dom_node);
        }
    }

    fn offset_width(&self, node: NodeId) -> u32 {
        self.html_element(node).map_or(0, |el| px(el.offset_width()))
    }

    fn client_width(&self, node: NodeId) -> u32 {
        self.element(node).map_or(0, |el| px(el.client_width()))
    }

    fn add_listener(
        &self,
        target: EventTarget,
        kind: EventKind,
        listener: Listener,
    ) -> ListenerId {
        let (id, js_target) = {
            let mut registry = self.registry.borrow_mut();
            registry.next_listener += 1;
            let id = ListenerId::new(registry.next_listener);
            let js_target: Option<web_sys::EventTarget> = match target {
                EventTarget::Document => Some(self.document.clone().into()),
                EventTarget::Node(node) => registry.node(node).map(Into::into),
            };
            (id, js_target)
        };
        let Some(js_target) = js_target else {
            return id;
        };

        let weak: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        let closure: JsListener = Closure::new(move |event: web_sys::Event| {
            let Some(registry) = weak.upgrade() else {
                return;
            };
            let translated = {
                let registry = registry.borrow();
                translate(&registry, kind, &event)
            };
            if let Some(dom_event) = translated {
                listener(&dom_event);
            }
        });
        let _ = js_target.add_event_listener_with_callback(
            event_type(kind),
            closure.as_ref().unchecked_ref(),
        );

        #[cfg(feature = "tracing")]
        tracing::trace!(listener = id.get(), event = event_type(kind), "listener attached");

        let node = match target {
            EventTarget::Document => None,
            EventTarget::Node(node) => Some(node),
        };
        self.registry.borrow_mut().listeners.insert(
            id,
            Registered {
                node,
                target: js_target,
                kind,
                closure,
            },
        );
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let removed = self.registry.borrow_mut().listeners.remove(&id);
        if let Some(listener) = removed {
            listener.detach();
        }
    }

    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let (id, spent) = {
            let mut registry = self.registry.borrow_mut();
            registry.next_timer += 1;
            (TimerId::new(registry.next_timer), std::mem::take(&mut registry.spent))
        };
        drop(spent);
        let weak = Rc::downgrade(&self.registry);
        let closure: JsTimer = Closure::once(move || {
            if let Some(registry) = weak.upgrade() {
                let mut registry = registry.borrow_mut();
                if let Some(pending) = registry.timers.remove(&id) {
                    registry.spent.push(pending.closure);
                }
            }
            callback();
        });
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref::<js_sys::Function>(),
                millis,
            ) {
            Ok(handle) => {
                self.registry
                    .borrow_mut()
                    .timers
                    .insert(id, Pending { handle, closure });
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(timer = id.get(), "setTimeout refused");
            }
        }
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        let (pending, spent) = {
            let mut registry = self.registry.borrow_mut();
            (registry.timers.remove(&id), std::mem::take(&mut registry.spent))
        };
        if let Some(pending) = pending {
            self.window.clear_timeout_with_handle(pending.handle);
        }
        drop(spent);
    }
}

impl Drop for WebDocument {
    fn drop(&mut self) {
        let (listeners, timers) = {
            let mut registry = self.registry.borrow_mut();
            let listeners: Vec<Registered> =
                registry.listeners.drain().map(|(_, l)| l).collect();
            let timers: Vec<Pending> = registry.timers.drain().map(|(_, t)| t).collect();
            registry.spent.clear();
            (listeners, timers)
        };
        Self::release(listeners);
        for pending in timers {
            self.window.clear_timeout_with_handle(pending.handle);
        }
    }
}
