#![forbid(unsafe_code)]

//! Class names written into the document.

pub const BACKDROP: &str = "popzy__backdrop";
pub const CONTAINER: &str = "popzy__container";
pub const CLOSE: &str = "popzy__close";
pub const CONTENT: &str = "popzy__content";
pub const FOOTER: &str = "popzy__footer";

/// Presentation class on the backdrop while a modal is shown.
pub const SHOW: &str = "popzy--show";

/// Page-level marker on `<body>` while any modal is open.
pub const NO_SCROLL: &str = "popzy--no-scroll";

/// Label of the close button.
pub const CLOSE_LABEL: &str = "&times;";
