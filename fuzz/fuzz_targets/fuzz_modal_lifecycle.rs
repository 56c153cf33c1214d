#![no_main]

//! Drive random open/close/input sequences through a set of modals and check
//! the stack and scroll-lock invariants after every step.

use std::rc::Rc;
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use popzy_core::{Document, MemoryDocument};
use popzy_modal::{DismissMethods, Modal, ModalManager, ModalOptions, classes};

const MODALS: usize = 4;

#[derive(Debug, Arbitrary)]
enum Op {
    Open(u8),
    Close(u8, bool),
    Destroy(u8),
    Escape,
    ClickBackdrop(u8),
    TransitionEnd(u8),
    Advance(u16),
    Tick,
    AddButton(u8),
    SetContent(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    dismiss: [u8; MODALS],
    destroy_on_close: [bool; MODALS],
    ops: Vec<Op>,
}

fn pick(modals: &[Modal], index: u8) -> &Modal {
    &modals[usize::from(index) % modals.len()]
}

fuzz_target!(|input: Input| {
    let doc = Rc::new(MemoryDocument::new());
    let manager = ModalManager::new(doc.clone());
    let modals: Vec<Modal> = (0..MODALS)
        .filter_map(|i| {
            manager
                .create(
                    ModalOptions::new()
                        .content(format!("<p>{i}</p>"))
                        .footer(i % 2 == 0)
                        .dismiss(DismissMethods::from_bits_truncate(input.dismiss[i]))
                        .destroy_on_close(input.destroy_on_close[i]),
                )
                .ok()
        })
        .collect();
    assert_eq!(modals.len(), MODALS);

    for op in input.ops.into_iter().take(256) {
        match op {
            Op::Open(i) => {
                let _ = pick(&modals, i).open();
            }
            Op::Close(i, destroy) => pick(&modals, i).close(destroy),
            Op::Destroy(i) => pick(&modals, i).destroy(),
            Op::Escape => doc.key_down("Escape"),
            Op::ClickBackdrop(i) => {
                if let Some(backdrop) = pick(&modals, i).backdrop() {
                    doc.click(backdrop);
                }
            }
            Op::TransitionEnd(i) => {
                if let Some(backdrop) = pick(&modals, i).backdrop() {
                    doc.transition_end(backdrop, "transform");
                }
            }
            Op::Advance(ms) => doc.advance(Duration::from_millis(u64::from(ms))),
            Op::Tick => doc.tick(),
            Op::AddButton(i) => pick(&modals, i).add_footer_button("b", "b", |m| m.close_default()),
            Op::SetContent(i) => pick(&modals, i).set_content("<b>x</b>"),
        }

        // Every open modal is built and attached.
        for modal in &modals {
            if modal.is_open() {
                let backdrop = modal.backdrop().expect("open modal is built");
                assert!(doc.is_attached(backdrop));
            }
        }
        // The lock is held whenever something is open.
        if !manager.is_empty() {
            assert!(doc.has_class(doc.body(), classes::NO_SCROLL));
        }
        let ids = manager.open_ids();
        let mut unique = ids.clone();
        unique.sort_by_key(|id| id.id());
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }
});
