#![forbid(unsafe_code)]

//! Deterministic in-memory [`Document`] for headless hosts and tests.
//!
//! `MemoryDocument` keeps a small element tree, a template registry, the
//! registered listeners, and a queue of timers driven by a virtual clock.
//! Nothing happens on its own: time only moves through [`advance`] and
//! [`tick`], and input only arrives through [`click`], [`key_down`], and
//! [`transition_end`].
//!
//! Markup set through `set_inner_html` is kept verbatim rather than parsed;
//! serialization via [`outer_html`] writes it back in place.
//!
//! # Invariants
//!
//! 1. Timers fire in `(due time, registration order)` order.
//! 2. Listeners for one node fire in registration order; bubbling visits the
//!    target first, then each ancestor up to the root.
//! 3. A listener removed while an event is in flight is not invoked for the
//!    remainder of that dispatch.
//! 4. No internal borrow is held while user callbacks run.
//!
//! [`advance`]: MemoryDocument::advance
//! [`tick`]: MemoryDocument::tick
//! [`click`]: MemoryDocument::click
//! [`key_down`]: MemoryDocument::key_down
//! [`transition_end`]: MemoryDocument::transition_end
//! [`outer_html`]: MemoryDocument::outer_html

use std::cell::RefCell;
use std::fmt::Write as _;
use std::time::Duration;

use ahash::AHashMap;

use crate::document::{
    Document, EventTarget, Listener, ListenerId, NodeId, TimerCallback, TimerId,
};
use crate::event::{DomEvent, EventKind};

/// Default layout width of every attached element, in pixels.
const DEFAULT_ELEMENT_WIDTH: u32 = 1024;

/// Default width of a classic (non-overlay) scrollbar, in pixels.
const DEFAULT_SCROLLBAR_WIDTH: u32 = 15;

/// Tag used for template fragments.
const FRAGMENT_TAG: &str = "#fragment";

/// A piece of element content: raw markup or a child element.
#[derive(Debug, Clone)]
enum Content {
    Markup(String),
    Element(NodeId),
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: Vec<String>,
    style: Vec<(String, String)>,
    content: Vec<Content>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            classes: Vec::new(),
            style: Vec::new(),
            content: Vec::new(),
            parent: None,
        }
    }

    fn is_fragment(&self) -> bool {
        self.tag == FRAGMENT_TAG
    }

    fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }
}

struct ListenerEntry {
    id: ListenerId,
    target: EventTarget,
    kind: EventKind,
    listener: Listener,
}

struct Timer {
    id: TimerId,
    due: Duration,
    callback: TimerCallback,
}

struct Inner {
    nodes: AHashMap<NodeId, Node>,
    body: NodeId,
    next_node: u64,
    templates: AHashMap<String, String>,
    listeners: Vec<ListenerEntry>,
    next_listener: u64,
    // Kept in registration order; `advance` picks the earliest due.
    timers: Vec<Timer>,
    next_timer: u64,
    now: Duration,
    element_width: u32,
    scrollbar_width: u32,
}

impl Inner {
    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, node);
        id
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.content
                .retain(|c| !matches!(c, Content::Element(child) if *child == node));
        }
    }

    fn discard(&mut self, node: NodeId) {
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                for c in n.content {
                    if let Content::Element(child) = c {
                        pending.push(child);
                    }
                }
                self.listeners
                    .retain(|l| l.target != EventTarget::Node(id));
            }
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if !self.nodes.contains_key(&id) {
                break;
            }
            path.push(id);
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        path
    }

    fn serialize(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(&node) else {
            return;
        };
        if !n.is_fragment() {
            let _ = write!(out, "<{}", n.tag);
            if !n.classes.is_empty() {
                let _ = write!(out, " class=\"{}\"", n.classes.join(" "));
            }
            if !n.style.is_empty() {
                out.push_str(" style=\"");
                for (name, value) in &n.style {
                    let _ = write!(out, "{name}: {value};");
                }
                out.push('"');
            }
            out.push('>');
        }
        self.serialize_content(n, out);
        if !n.is_fragment() {
            let _ = write!(out, "</{}>", n.tag);
        }
    }

    fn serialize_content(&self, n: &Node, out: &mut String) {
        for c in &n.content {
            match c {
                Content::Markup(html) => out.push_str(html),
                Content::Element(child) => self.serialize(*child, out),
            }
        }
    }

    fn collect_by_class(&self, node: NodeId, class: &str, out: &mut Vec<NodeId>) {
        let Some(n) = self.nodes.get(&node) else {
            return;
        };
        if n.classes.iter().any(|c| c == class) {
            out.push(node);
        }
        for c in &n.content {
            if let Content::Element(child) = c {
                self.collect_by_class(*child, class, out);
            }
        }
    }
}

/// Headless document with a virtual clock.
pub struct MemoryDocument {
    inner: RefCell<Inner>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryDocument")
            .field("nodes", &inner.nodes.len())
            .field("listeners", &inner.listeners.len())
            .field("timers", &inner.timers.len())
            .field("now", &inner.now)
            .finish()
    }
}

impl MemoryDocument {
    /// Create an empty document containing only `<body>`.
    pub fn new() -> Self {
        let mut inner = Inner {
            nodes: AHashMap::new(),
            body: NodeId::new(0),
            next_node: 0,
            templates: AHashMap::new(),
            listeners: Vec::new(),
            next_listener: 1,
            timers: Vec::new(),
            next_timer: 1,
            now: Duration::ZERO,
            element_width: DEFAULT_ELEMENT_WIDTH,
            scrollbar_width: DEFAULT_SCROLLBAR_WIDTH,
        };
        inner.body = inner.alloc(Node::new("body"));
        Self {
            inner: RefCell::new(inner),
        }
    }

    /// Set the width a `overflow: scroll` element loses to its scrollbar.
    #[must_use]
    pub fn with_scrollbar_width(self, width: u32) -> Self {
        self.inner.borrow_mut().scrollbar_width = width;
        self
    }

    /// Declare a template whose content is `html`.
    pub fn register_template(&self, template_id: impl Into<String>, html: impl Into<String>) {
        self.inner
            .borrow_mut()
            .templates
            .insert(template_id.into(), html.into());
    }

    // --- Clock ---

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Run every timer due now (zero-delay timers included).
    pub fn tick(&self) {
        self.advance(Duration::ZERO);
    }

    /// Move the clock forward by `by`, firing due timers in order.
    ///
    /// Timers scheduled by callbacks fire too if they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().now + by;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let idx = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| t.due)
                    .map(|(i, _)| i);
                idx.map(|i| {
                    let timer = inner.timers.remove(i);
                    inner.now = inner.now.max(timer.due);
                    timer
                })
            };
            match next {
                Some(timer) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(timer = timer.id.get(), "memory document timer fired");
                    (timer.callback)();
                }
                None => break,
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(target);
    }

    // --- Synthetic input ---

    /// Dispatch a click on `target`, bubbling to its ancestors.
    pub fn click(&self, target: NodeId) {
        self.dispatch(&DomEvent::click(target));
    }

    /// Dispatch a keydown for `key` to document listeners.
    pub fn key_down(&self, key: &str) {
        self.dispatch(&DomEvent::key_down(key));
    }

    /// Dispatch a transitionend for `property_name` on `target`, bubbling.
    pub fn transition_end(&self, target: NodeId, property_name: &str) {
        self.dispatch(&DomEvent::transition_end(target, property_name));
    }

    /// Deliver `event` to matching listeners.
    pub fn dispatch(&self, event: &DomEvent) {
        let kind = event.kind();
        let targets: Vec<EventTarget> = match event.target() {
            Some(node) if event.bubbles() => self
                .inner
                .borrow()
                .path(node)
                .into_iter()
                .map(EventTarget::Node)
                .collect(),
            Some(node) => vec![EventTarget::Node(node)],
            None => vec![EventTarget::Document],
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(?event, hops = targets.len(), "memory document dispatch");

        for target in targets {
            let batch: Vec<(ListenerId, Listener)> = self
                .inner
                .borrow()
                .listeners
                .iter()
                .filter(|l| l.target == target && l.kind == kind)
                .map(|l| (l.id, l.listener.clone()))
                .collect();
            for (id, listener) in batch {
                if self.has_listener(id) {
                    listener(event);
                }
            }
        }
    }

    // --- Inspection ---

    /// Whether `id` is still registered.
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow().listeners.iter().any(|l| l.id == id)
    }

    /// Number of listeners of `kind` on `target`.
    pub fn listener_count(&self, target: EventTarget, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .count()
    }

    /// Number of live nodes, `<body>` included.
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    /// Whether `node` is still alive (attached or not).
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains_key(&node)
    }

    /// Whether `node` is connected to `<body>`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.inner.borrow().is_attached(node)
    }

    /// Parent element of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.get(&node).and_then(|n| n.parent)
    }

    /// Element children of `node`, in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .map(|n| {
                n.content
                    .iter()
                    .filter_map(|c| match c {
                        Content::Element(id) => Some(*id),
                        Content::Markup(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tag name of `node`.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().nodes.get(&node).map(|n| n.tag.clone())
    }

    /// Class attribute of `node`.
    pub fn class_name(&self, node: NodeId) -> Option<String> {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .map(|n| n.classes.join(" "))
    }

    /// Inline style property of `node`.
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .and_then(|n| n.style_value(property).map(str::to_owned))
    }

    /// Serialized markup of `node` and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().serialize(node, &mut out);
        out
    }

    /// Serialized markup of the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        if let Some(n) = inner.nodes.get(&node) {
            inner.serialize_content(n, &mut out);
        }
        out
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        let mut out = Vec::new();
        inner.collect_by_class(inner.body, class, &mut out);
        out
    }

    /// First element inside `root` (inclusive) carrying `class`.
    pub fn find_in(&self, root: NodeId, class: &str) -> Option<NodeId> {
        let inner = self.inner.borrow();
        let mut out = Vec::new();
        inner.collect_by_class(root, class, &mut out);
        out.into_iter().next()
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    fn create_element(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().alloc(Node::new(tag))
    }

    fn has_template(&self, template_id: &str) -> bool {
        self.inner.borrow().templates.contains_key(template_id)
    }

    fn clone_template(&self, template_id: &str) -> Option<NodeId> {
        let mut inner = self.inner.borrow_mut();
        let html = inner.templates.get(template_id)?.clone();
        let mut fragment = Node::new(FRAGMENT_TAG);
        fragment.content.push(Content::Markup(html));
        Some(inner.alloc(fragment))
    }

    fn set_class_name(&self, node: NodeId, class_name: &str) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node) {
            n.classes = class_name.split_whitespace().map(str::to_owned).collect();
        }
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn set_inner_html(&self, node: NodeId, html: &str) {
        let mut inner = self.inner.borrow_mut();
        let Some(n) = inner.nodes.get_mut(&node) else {
            return;
        };
        let old = std::mem::take(&mut n.content);
        if !html.is_empty() {
            n.content.push(Content::Markup(html.to_owned()));
        }
        for c in old {
            if let Content::Element(child) = c {
                if let Some(ch) = inner.nodes.get_mut(&child) {
                    ch.parent = None;
                }
                inner.discard(child);
            }
        }
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node) {
            match n.style.iter_mut().find(|(name, _)| name == property) {
                Some(entry) => entry.1 = value.to_owned(),
                None => n.style.push((property.to_owned(), value.to_owned())),
            }
        }
    }

    fn remove_style(&self, node: NodeId, property: &str) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node) {
            n.style.retain(|(name, _)| name != property);
        }
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut inner = self.inner.borrow_mut();
        if parent == child || !inner.nodes.contains_key(&parent) {
            return;
        }
        // Refuse to create a cycle.
        if inner.path(parent).contains(&child) {
            return;
        }
        let Some(is_fragment) = inner.nodes.get(&child).map(Node::is_fragment) else {
            return;
        };

        if is_fragment {
            let moved = inner
                .nodes
                .get_mut(&child)
                .map(|f| std::mem::take(&mut f.content))
                .unwrap_or_default();
            for c in &moved {
                if let Content::Element(id) = c
                    && let Some(n) = inner.nodes.get_mut(id)
                {
                    n.parent = Some(parent);
                }
            }
            if let Some(p) = inner.nodes.get_mut(&parent) {
                p.content.extend(moved);
            }
            inner.nodes.remove(&child);
            return;
        }

        inner.detach(child);
        if let Some(n) = inner.nodes.get_mut(&child) {
            n.parent = Some(parent);
        }
        if let Some(p) = inner.nodes.get_mut(&parent) {
            p.content.push(Content::Element(child));
        }
    }

    fn remove(&self, node: NodeId) {
        let mut inner = self.inner.borrow_mut();
        if node == inner.body {
            return;
        }
        inner.detach(node);
        inner.discard(node);
    }

    fn offset_width(&self, node: NodeId) -> u32 {
        let inner = self.inner.borrow();
        if inner.is_attached(node) {
            inner.element_width
        } else {
            0
        }
    }

    fn client_width(&self, node: NodeId) -> u32 {
        let inner = self.inner.borrow();
        if !inner.is_attached(node) {
            return 0;
        }
        let scrolls = inner
            .nodes
            .get(&node)
            .and_then(|n| n.style_value("overflow"))
            .is_some_and(|v| v == "scroll");
        if scrolls {
            inner.element_width.saturating_sub(inner.scrollbar_width)
        } else {
            inner.element_width
        }
    }

    fn add_listener(
        &self,
        target: EventTarget,
        kind: EventKind,
        listener: Listener,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId::new(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push(ListenerEntry {
            id,
            target,
            kind,
            listener,
        });
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.borrow_mut().listeners.retain(|l| l.id != id);
    }

    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId::new(inner.next_timer);
        inner.next_timer += 1;
        let due = inner.now + delay;
        inner.timers.push(Timer { id, due, callback });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.inner.borrow_mut().timers.retain(|t| t.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn empty_document_has_body() {
        let doc = MemoryDocument::new();
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.outer_html(doc.body()), "<body></body>");
        assert!(doc.is_attached(doc.body()));
    }

    #[test]
    fn build_and_serialize_tree() {
        let doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.set_class_name(div, "a  b");
        doc.add_class(div, "c");
        doc.add_class(div, "a");
        doc.set_inner_html(div, "<p>x</p>");
        let btn = doc.create_element("button");
        doc.set_inner_html(btn, "ok");
        doc.append_child(div, btn);
        doc.append_child(doc.body(), div);

        assert_eq!(
            doc.outer_html(div),
            "<div class=\"a b c\"><p>x</p><button>ok</button></div>"
        );
        assert!(doc.is_attached(btn));
        assert_eq!(doc.children(div), vec![btn]);
    }

    #[test]
    fn inner_html_replaces_element_children() {
        let doc = MemoryDocument::new();
        let div = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(div, child);
        doc.set_inner_html(div, "text");
        assert!(!doc.contains(child));
        assert_eq!(doc.inner_html(div), "text");
    }

    #[test]
    fn template_fragment_moves_content() {
        let doc = MemoryDocument::new();
        doc.register_template("tpl", "<h1>T</h1>");
        assert!(doc.has_template("tpl"));
        assert!(doc.clone_template("missing").is_none());

        let slot = doc.create_element("div");
        let frag = doc.clone_template("tpl").unwrap();
        doc.append_child(slot, frag);
        assert_eq!(doc.outer_html(slot), "<div><h1>T</h1></div>");
        assert_eq!(doc.inner_html(frag), "");
    }

    #[test]
    fn remove_discards_subtree_and_listeners() {
        let doc = MemoryDocument::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner);
        doc.append_child(doc.body(), outer);
        doc.add_listener(
            EventTarget::Node(inner),
            EventKind::Click,
            Rc::new(|_: &DomEvent| {}),
        );
        let before = doc.node_count();
        doc.remove(outer);
        assert_eq!(doc.node_count(), before - 2);
        assert_eq!(
            doc.listener_count(EventTarget::Node(inner), EventKind::Click),
            0
        );
        assert_eq!(doc.outer_html(doc.body()), "<body></body>");
    }

    #[test]
    fn click_bubbles_with_original_target() {
        let doc = MemoryDocument::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        doc.add_listener(
            EventTarget::Node(outer),
            EventKind::Click,
            Rc::new(move |ev: &DomEvent| s.borrow_mut().push(ev.target())),
        );
        doc.click(inner);
        doc.click(outer);
        assert_eq!(*seen.borrow(), vec![Some(inner), Some(outer)]);
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let doc = Rc::new(MemoryDocument::new());
        let hits = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(None));

        let d = Rc::downgrade(&doc);
        let sec = second.clone();
        doc.add_listener(
            EventTarget::Document,
            EventKind::KeyDown,
            Rc::new(move |_: &DomEvent| {
                if let (Some(doc), Some(id)) = (d.upgrade(), sec.get()) {
                    doc.remove_listener(id);
                }
            }),
        );
        let h = hits.clone();
        let id = doc.add_listener(
            EventTarget::Document,
            EventKind::KeyDown,
            Rc::new(move |_: &DomEvent| h.set(h.get() + 1)),
        );
        second.set(Some(id));

        doc.key_down("Escape");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn timers_fire_in_due_order() {
        let doc = Rc::new(MemoryDocument::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, label) in [(20, "b"), (10, "a"), (20, "c")] {
            let l = log.clone();
            doc.set_timeout(
                Duration::from_millis(delay),
                Box::new(move || l.borrow_mut().push(label)),
            );
        }
        doc.advance(Duration::from_millis(15));
        assert_eq!(*log.borrow(), vec!["a"]);
        doc.advance(Duration::from_millis(5));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(doc.now(), Duration::from_millis(20));
    }

    #[test]
    fn cleared_timer_never_fires() {
        let doc = MemoryDocument::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let id = doc.set_timeout(Duration::ZERO, Box::new(move || f.set(true)));
        doc.clear_timeout(id);
        doc.tick();
        assert!(!fired.get());
        assert_eq!(doc.pending_timers(), 0);
    }

    #[test]
    fn timer_scheduled_from_callback_runs_in_same_window() {
        let doc = Rc::new(MemoryDocument::new());
        let fired = Rc::new(Cell::new(0));
        let d = Rc::downgrade(&doc);
        let f = fired.clone();
        doc.set_timeout(
            Duration::ZERO,
            Box::new(move || {
                f.set(f.get() + 1);
                if let Some(doc) = d.upgrade() {
                    let f = f.clone();
                    doc.set_timeout(Duration::ZERO, Box::new(move || f.set(f.get() + 1)));
                }
            }),
        );
        doc.tick();
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn scroll_probe_measures_scrollbar() {
        let doc = MemoryDocument::new().with_scrollbar_width(17);
        let probe = doc.create_element("div");
        assert_eq!(doc.offset_width(probe), 0);
        doc.set_style(probe, "overflow", "scroll");
        doc.append_child(doc.body(), probe);
        assert_eq!(doc.offset_width(probe) - doc.client_width(probe), 17);
    }

    #[test]
    fn style_set_and_remove() {
        let doc = MemoryDocument::new();
        let body = doc.body();
        doc.set_style(body, "padding-right", "15px");
        doc.set_style(body, "padding-right", "17px");
        assert_eq!(doc.style(body, "padding-right").as_deref(), Some("17px"));
        assert_eq!(
            doc.outer_html(body),
            "<body style=\"padding-right: 17px;\"></body>"
        );
        doc.remove_style(body, "padding-right");
        assert_eq!(doc.style(body, "padding-right"), None);
    }

    #[test]
    fn append_refuses_cycles() {
        let doc = MemoryDocument::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(a, b);
        doc.append_child(b, a);
        assert_eq!(doc.parent(a), None);
        assert_eq!(doc.parent(b), Some(a));
    }
}
