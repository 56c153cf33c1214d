#![forbid(unsafe_code)]

use std::fmt;

/// Failure to bind to the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebError {
    /// No global `window` (e.g. running in a worker).
    NoWindow,
    /// The window has no `document`.
    NoDocument,
    /// The document has no `<body>` yet.
    NoBody,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::NoBody => write!(f, "document has no body"),
        }
    }
}

impl std::error::Error for WebError {}
