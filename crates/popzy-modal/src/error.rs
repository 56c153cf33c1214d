#![forbid(unsafe_code)]

//! Errors reported by modal construction and option parsing.

/// Errors from modal construction and building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    /// Neither literal content nor a template id was supplied.
    MissingContent,
    /// The template id does not name a template in the document.
    TemplateNotFound(String),
}

impl std::fmt::Display for ModalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingContent => {
                write!(f, "one of 'content' or 'template' must be provided")
            }
            Self::TemplateNotFound(id) => write!(f, "template #{id} does not exist"),
        }
    }
}

impl std::error::Error for ModalError {}

/// Unknown dismissal method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDismissMethodError {
    name: String,
}

impl ParseDismissMethodError {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The rejected name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ParseDismissMethodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown dismiss method '{}' (expected button, backdrop, or escape)",
            self.name
        )
    }
}

impl std::error::Error for ParseDismissMethodError {}
