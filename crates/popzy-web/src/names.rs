#![forbid(unsafe_code)]

use popzy_core::EventKind;

/// DOM event type string for `kind`.
#[inline]
pub const fn event_type(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Click => "click",
        EventKind::KeyDown => "keydown",
        EventKind::TransitionEnd => "transitionend",
    }
}
