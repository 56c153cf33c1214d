#![forbid(unsafe_code)]

//! End-to-end modal lifecycle scenarios against the headless document.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use popzy_core::{Document, EventKind, EventTarget, MemoryDocument, NodeId};
use popzy_modal::{
    ContentSource, DismissMethods, Modal, ModalError, ModalManager, ModalOptions, classes,
};

// ============================================================================
// Helpers
// ============================================================================

fn setup() -> (Rc<MemoryDocument>, ModalManager) {
    let doc = Rc::new(MemoryDocument::new().with_scrollbar_width(15));
    let manager = ModalManager::new(doc.clone());
    (doc, manager)
}

/// Fire the open/close completion signal on the modal's backdrop.
fn end_transition(doc: &MemoryDocument, modal: &Modal) {
    let backdrop = modal.backdrop().expect("modal is built");
    let container = doc.children(backdrop)[0];
    // The container's transform transition bubbles to the backdrop.
    doc.transition_end(container, "opacity");
    doc.transition_end(container, "transform");
}

fn open_and_settle(doc: &MemoryDocument, modal: &Modal) {
    modal.open().unwrap();
    doc.tick();
    end_transition(doc, modal);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn missing_source_builds_nothing() {
    let (doc, manager) = setup();
    let result = manager.create(ModalOptions::new().footer(true));
    assert_eq!(result.unwrap_err(), ModalError::MissingContent);
    assert_eq!(doc.node_count(), 1);
    assert_eq!(manager.depth(), 0);
}

#[test]
fn unknown_template_builds_nothing() {
    let (doc, manager) = setup();
    let result = manager.create(ModalOptions::new().template("missing"));
    assert_eq!(
        result.unwrap_err(),
        ModalError::TemplateNotFound("missing".into())
    );
    assert_eq!(doc.node_count(), 1);
}

#[test]
fn literal_content_wins_over_template() {
    let (doc, manager) = setup();
    doc.register_template("tpl", "<h1>From template</h1>");
    let modal = manager
        .create(ModalOptions::new().content("<p>Literal</p>").template("tpl"))
        .unwrap();
    modal.open().unwrap();

    let slot = modal.content_slot().unwrap();
    assert_eq!(doc.inner_html(slot), "<p>Literal</p>");
    assert_eq!(
        modal.content_source(),
        ContentSource::Literal("<p>Literal</p>".into())
    );
}

#[test]
fn template_content_is_cloned_per_build() {
    let (doc, manager) = setup();
    doc.register_template("confirm", "<h2>Sure?</h2>");
    let modal = manager.create(ModalOptions::new().template("confirm")).unwrap();

    open_and_settle(&doc, &modal);
    assert_eq!(doc.inner_html(modal.content_slot().unwrap()), "<h2>Sure?</h2>");

    modal.close(true);
    end_transition(&doc, &modal);
    assert!(!modal.is_built());

    open_and_settle(&doc, &modal);
    assert_eq!(doc.inner_html(modal.content_slot().unwrap()), "<h2>Sure?</h2>");
}

#[test]
fn invalid_style_classes_are_ignored() {
    let (doc, manager) = setup();
    let modal = manager
        .create(
            ModalOptions::new()
                .content("x")
                .style_classes(["wide", "", "two words", "dark"]),
        )
        .unwrap();
    let backdrop = modal.open().unwrap();
    let container = doc.children(backdrop)[0];
    assert_eq!(
        doc.class_name(container).as_deref(),
        Some("popzy__container wide dark")
    );
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn button_only_modal_structure() {
    let (doc, manager) = setup();
    let modal = manager
        .create(
            ModalOptions::new()
                .content("<p>Hi</p>")
                .dismiss(DismissMethods::BUTTON)
                .footer(false),
        )
        .unwrap();
    let backdrop = modal.open().unwrap();

    assert_eq!(doc.parent(backdrop), Some(doc.body()));
    assert_eq!(
        doc.outer_html(backdrop),
        "<div class=\"popzy__backdrop\"><div class=\"popzy__container\">\
         <button class=\"popzy__close\">&times;</button>\
         <div class=\"popzy__content\"><p>Hi</p></div></div></div>"
    );
    assert!(modal.footer().is_none());
    assert!(doc.find_by_class(classes::FOOTER).is_empty());
}

#[test]
fn no_close_button_without_button_dismissal() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").dismiss(DismissMethods::ESCAPE))
        .unwrap();
    let backdrop = modal.open().unwrap();
    assert!(doc.find_in(backdrop, classes::CLOSE).is_none());
}

// ============================================================================
// Stacking and escape
// ============================================================================

#[test]
fn stack_follows_open_order() {
    let (doc, manager) = setup();
    let modals: Vec<Modal> = (0..3)
        .map(|i| {
            manager
                .create(ModalOptions::new().content(format!("<p>{i}</p>")))
                .unwrap()
        })
        .collect();
    for m in &modals {
        m.open().unwrap();
    }
    doc.tick();

    let ids: Vec<_> = modals.iter().map(Modal::id).collect();
    assert_eq!(manager.open_ids(), ids);
    assert_eq!(manager.top_id(), Some(ids[2]));

    modals[2].close_default();
    assert_eq!(manager.open_ids(), &ids[..2]);
}

#[test]
fn escape_closes_only_the_top_modal() {
    let (doc, manager) = setup();
    let a = manager.create(ModalOptions::new().content("A")).unwrap();
    let b = manager.create(ModalOptions::new().content("B")).unwrap();
    open_and_settle(&doc, &a);
    open_and_settle(&doc, &b);

    doc.key_down("Escape");
    assert_eq!(manager.open_ids(), vec![a.id()]);
    assert!(b.is_built(), "teardown waits for the close transition");

    end_transition(&doc, &b);
    assert!(!b.is_built());
    assert!(a.is_open());
    assert!(a.is_built());
    assert!(doc.has_class(a.backdrop().unwrap(), classes::SHOW));
}

#[test]
fn buried_modal_ignores_escape_even_when_top_disallows_it() {
    let (doc, manager) = setup();
    let a = manager.create(ModalOptions::new().content("A")).unwrap();
    let b = manager
        .create(ModalOptions::new().content("B").dismiss(DismissMethods::BUTTON))
        .unwrap();
    open_and_settle(&doc, &a);
    open_and_settle(&doc, &b);

    doc.key_down("Escape");
    assert_eq!(manager.open_ids(), vec![a.id(), b.id()]);
}

#[test]
fn non_escape_keys_are_ignored() {
    let (doc, manager) = setup();
    let a = manager.create(ModalOptions::new().content("A")).unwrap();
    open_and_settle(&doc, &a);
    doc.key_down("Enter");
    assert!(a.is_open());
}

#[test]
fn escape_listener_removed_on_close() {
    let (doc, manager) = setup();
    let a = manager.create(ModalOptions::new().content("A")).unwrap();
    a.open().unwrap();
    assert_eq!(
        doc.listener_count(EventTarget::Document, EventKind::KeyDown),
        1
    );
    a.close_default();
    assert_eq!(
        doc.listener_count(EventTarget::Document, EventKind::KeyDown),
        0
    );
}

#[test]
fn closing_a_buried_modal_removes_its_own_entry() {
    let (doc, manager) = setup();
    let a = manager.create(ModalOptions::new().content("A")).unwrap();
    let b = manager.create(ModalOptions::new().content("B")).unwrap();
    open_and_settle(&doc, &a);
    open_and_settle(&doc, &b);

    a.close_default();
    assert_eq!(manager.open_ids(), vec![b.id()]);
}

// ============================================================================
// Dismissal
// ============================================================================

#[test]
fn backdrop_click_closes_but_inner_click_does_not() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").dismiss(DismissMethods::BACKDROP))
        .unwrap();
    let backdrop = modal.open().unwrap();
    let slot = modal.content_slot().unwrap();

    doc.click(slot);
    assert!(modal.is_open());

    doc.click(backdrop);
    assert!(!modal.is_open());
}

#[test]
fn backdrop_click_disabled() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").dismiss(DismissMethods::BUTTON))
        .unwrap();
    let backdrop = modal.open().unwrap();
    doc.click(backdrop);
    assert!(modal.is_open());
}

#[test]
fn close_button_uses_default_policy() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").destroy_on_close(false))
        .unwrap();
    let backdrop = modal.open().unwrap();
    let close = doc.find_in(backdrop, classes::CLOSE).unwrap();

    doc.click(close);
    assert!(!modal.is_open());
    end_transition(&doc, &modal);
    assert!(modal.is_built());
}

// ============================================================================
// Hide vs destroy
// ============================================================================

#[test]
fn hide_keeps_tree_and_reopen_reuses_it() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").destroy_on_close(false))
        .unwrap();
    let first = modal.open().unwrap();
    doc.tick();
    modal.close_default();
    end_transition(&doc, &modal);

    assert!(doc.is_attached(first));
    assert!(!doc.has_class(first, classes::SHOW));

    let nodes = doc.node_count();
    let second = modal.open().unwrap();
    assert_eq!(first, second);
    assert_eq!(doc.node_count(), nodes);
}

#[test]
fn destroy_detaches_tree_and_reopen_rebuilds() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("<p>x</p>").destroy_on_close(false))
        .unwrap();
    let first = modal.open().unwrap();
    doc.tick();
    modal.destroy();
    end_transition(&doc, &modal);

    assert!(!doc.contains(first));

    let second = modal.open().unwrap();
    assert_ne!(first, second);
    assert_eq!(doc.inner_html(modal.content_slot().unwrap()), "<p>x</p>");
}

#[test]
fn close_false_overrides_destroy_default() {
    let (doc, manager) = setup();
    let modal = manager.create(ModalOptions::new().content("x")).unwrap();
    open_and_settle(&doc, &modal);
    modal.close(false);
    end_transition(&doc, &modal);
    assert!(modal.is_built());
}

#[test]
fn teardown_releases_every_listener() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").footer(true))
        .unwrap();
    modal.add_footer_button("OK", "ok", |_| {});
    let backdrop = modal.open().unwrap();
    doc.tick();
    modal.close(true);
    end_transition(&doc, &modal);

    assert!(!doc.contains(backdrop));
    assert_eq!(
        doc.listener_count(EventTarget::Document, EventKind::KeyDown),
        0
    );
    assert_eq!(doc.node_count(), 1);
    assert_eq!(doc.pending_timers(), 0);
}

// ============================================================================
// Scroll lock
// ============================================================================

#[test]
fn scroll_lock_held_until_last_close_completes() {
    let (doc, manager) = setup();
    let body = doc.body();
    let a = manager.create(ModalOptions::new().content("A")).unwrap();
    let b = manager.create(ModalOptions::new().content("B")).unwrap();

    open_and_settle(&doc, &a);
    assert!(doc.has_class(body, classes::NO_SCROLL));
    assert_eq!(doc.style(body, "padding-right").as_deref(), Some("15px"));

    open_and_settle(&doc, &b);
    b.close_default();
    end_transition(&doc, &b);
    assert!(doc.has_class(body, classes::NO_SCROLL));
    assert_eq!(doc.style(body, "padding-right").as_deref(), Some("15px"));

    a.close_default();
    assert!(doc.has_class(body, classes::NO_SCROLL), "released on completion");
    end_transition(&doc, &a);
    assert!(!doc.has_class(body, classes::NO_SCROLL));
    assert_eq!(doc.style(body, "padding-right"), None);
}

#[test]
fn missed_transition_event_still_completes_close() {
    let (doc, manager) = setup();
    let closed = Rc::new(Cell::new(false));
    let c = closed.clone();
    let modal = manager
        .create(ModalOptions::new().content("x").on_close(move || c.set(true)))
        .unwrap();
    modal.open().unwrap();
    doc.tick();
    modal.close_default();

    doc.advance(Duration::from_secs(1));
    assert!(closed.get());
    assert!(!modal.is_built());
    assert!(!manager.is_scroll_locked());
}

// ============================================================================
// Callbacks
// ============================================================================

#[test]
fn lifecycle_callbacks_fire_in_order() {
    let (doc, manager) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2) = (log.clone(), log.clone());
    let modal = manager
        .create(
            ModalOptions::new()
                .content("x")
                .on_open(move || l1.borrow_mut().push("open"))
                .on_close(move || l2.borrow_mut().push("close")),
        )
        .unwrap();

    open_and_settle(&doc, &modal);
    modal.close_default();
    end_transition(&doc, &modal);
    assert_eq!(*log.borrow(), vec!["open", "close"]);
}

// ============================================================================
// Footer
// ============================================================================

#[test]
fn footer_buttons_added_before_build_appear_on_open() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").footer(true))
        .unwrap();
    modal.set_footer_content("<small>terms</small>");
    modal.add_footer_button("Cancel", "btn", |_| {});
    modal.add_footer_button("OK", "btn btn--primary", |_| {});
    assert!(modal.footer().is_none());

    modal.open().unwrap();
    let footer = modal.footer().unwrap();
    assert_eq!(
        doc.outer_html(footer),
        "<footer class=\"popzy__footer\"><small>terms</small>\
         <button class=\"btn\">Cancel</button>\
         <button class=\"btn btn--primary\">OK</button></footer>"
    );
}

#[test]
fn footer_button_added_while_open_renders_immediately() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").footer(true))
        .unwrap();
    modal.open().unwrap();
    let footer = modal.footer().unwrap();
    assert!(doc.children(footer).is_empty());

    modal.add_footer_button("Later", "later", |_| {});
    assert_eq!(doc.children(footer).len(), 1);
    assert_eq!(modal.footer_button_count(), 1);
}

#[test]
fn footer_content_change_while_open_keeps_buttons() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").footer(true))
        .unwrap();
    modal.add_footer_button("OK", "ok", |_| {});
    modal.open().unwrap();

    modal.set_footer_content("<em>v2</em>");
    assert_eq!(
        doc.inner_html(modal.footer().unwrap()),
        "<em>v2</em><button class=\"ok\">OK</button>"
    );
}

#[test]
fn footer_disabled_ignores_footer_calls() {
    let (doc, manager) = setup();
    let modal = manager.create(ModalOptions::new().content("x")).unwrap();
    modal.set_footer_content("ignored");
    modal.add_footer_button("OK", "ok", |_| {});
    let backdrop = modal.open().unwrap();
    assert!(doc.find_in(backdrop, "ok").is_none());
    assert!(doc.find_in(backdrop, classes::FOOTER).is_none());
}

#[test]
fn footer_button_callback_receives_owner() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").footer(true))
        .unwrap();
    let seen = Rc::new(Cell::new(None));
    let s = seen.clone();
    modal.add_footer_button("Done", "done", move |m| {
        s.set(Some(m.id()));
        m.close_default();
    });
    let backdrop = modal.open().unwrap();
    let button = doc.find_in(backdrop, "done").unwrap();

    doc.click(button);
    assert_eq!(seen.get(), Some(modal.id()));
    assert!(!modal.is_open());
}

#[test]
fn footer_buttons_survive_rebuild() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").footer(true))
        .unwrap();
    modal.add_footer_button("OK", "ok", |_| {});
    open_and_settle(&doc, &modal);
    modal.destroy();
    end_transition(&doc, &modal);

    let backdrop = modal.open().unwrap();
    assert!(doc.find_in(backdrop, "ok").is_some());
}

// ============================================================================
// Handle ownership
// ============================================================================

/// Open a modal and drop every handle to it, returning its backdrop.
fn open_detached(doc: &MemoryDocument, manager: &ModalManager, options: ModalOptions) -> NodeId {
    let modal = manager.create(options).unwrap();
    let backdrop = modal.open().unwrap();
    doc.tick();
    backdrop
}

#[test]
fn open_modal_survives_dropped_handle() {
    let (doc, manager) = setup();
    let backdrop = open_detached(&doc, &manager, ModalOptions::new().content("<p>tmp</p>"));

    assert_eq!(manager.depth(), 1);
    assert_eq!(manager.live_count(), 1);
    let close = doc.find_in(backdrop, classes::CLOSE).unwrap();
    doc.click(close);
    assert_eq!(manager.depth(), 0);

    let container = doc.children(backdrop)[0];
    doc.transition_end(container, "transform");
    assert!(!doc.contains(backdrop));
    assert!(!manager.is_scroll_locked());
    assert_eq!(manager.live_count(), 0);
}

#[test]
fn escape_reaches_modal_without_handle() {
    let (doc, manager) = setup();
    let a = manager.create(ModalOptions::new().content("A")).unwrap();
    open_and_settle(&doc, &a);
    let backdrop = open_detached(&doc, &manager, ModalOptions::new().content("B"));

    doc.key_down("Escape");
    assert_eq!(manager.open_ids(), vec![a.id()]);
    doc.advance(Duration::from_secs(2));
    assert!(!doc.contains(backdrop));

    doc.key_down("Escape");
    assert!(manager.is_empty());
    end_transition(&doc, &a);
    assert!(!manager.is_scroll_locked());
}

#[test]
fn backdrop_click_reaches_modal_without_handle() {
    let (doc, manager) = setup();
    let backdrop = open_detached(&doc, &manager, ModalOptions::new().content("x"));
    doc.click(backdrop);
    doc.advance(Duration::from_secs(2));
    assert!(manager.is_empty());
    assert!(!doc.contains(backdrop));
    assert!(!manager.is_scroll_locked());
}

#[test]
fn dropping_hidden_modal_discards_its_tree() {
    let (doc, manager) = setup();
    let modal = manager
        .create(ModalOptions::new().content("x").destroy_on_close(false))
        .unwrap();
    let backdrop = modal.open().unwrap();
    modal.close_default();
    end_transition(&doc, &modal);
    assert!(doc.contains(backdrop));
    assert_eq!(manager.live_count(), 0);

    drop(modal);
    assert!(!doc.contains(backdrop));
    assert_eq!(doc.pending_timers(), 0);
}
