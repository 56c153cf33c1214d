#![forbid(unsafe_code)]

//! Modal construction options.
//!
//! [`ModalOptions`] is a builder-style value consumed by
//! [`ModalManager::create`](crate::ModalManager::create). Source resolution
//! happens there:
//!
//! | `content` | `template` | result |
//! |-----------|------------|--------|
//! | set | unset | literal content |
//! | unset | set | template, if it exists |
//! | set | set | literal content, template ignored with a warning |
//! | unset | unset | [`ModalError::MissingContent`] |

use std::rc::Rc;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::{ModalError, ParseDismissMethodError};
use crate::modal::Modal;

/// Lifecycle callback (`on_open` / `on_close`).
pub type ModalCallback = Rc<dyn Fn()>;

/// Footer button callback; receives the modal that owns the button.
pub type ButtonCallback = Rc<dyn Fn(&Modal)>;

bitflags! {
    /// Set of user actions allowed to dismiss a modal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DismissMethods: u8 {
        /// A close button inside the container.
        const BUTTON = 1 << 0;
        /// A click directly on the backdrop.
        const BACKDROP = 1 << 1;
        /// The Escape key, for the topmost modal only.
        const ESCAPE = 1 << 2;
    }
}

impl Default for DismissMethods {
    fn default() -> Self {
        Self::all()
    }
}

/// A single dismissal method, parseable from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissMethod {
    Button,
    Backdrop,
    Escape,
}

impl FromStr for DismissMethod {
    type Err = ParseDismissMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "button" => Ok(Self::Button),
            // "overlay" is the historical name for the backdrop.
            "backdrop" | "overlay" => Ok(Self::Backdrop),
            "escape" => Ok(Self::Escape),
            other => Err(ParseDismissMethodError::new(other)),
        }
    }
}

impl From<DismissMethod> for DismissMethods {
    fn from(method: DismissMethod) -> Self {
        match method {
            DismissMethod::Button => Self::BUTTON,
            DismissMethod::Backdrop => Self::BACKDROP,
            DismissMethod::Escape => Self::ESCAPE,
        }
    }
}

impl FromIterator<DismissMethod> for DismissMethods {
    fn from_iter<I: IntoIterator<Item = DismissMethod>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |acc, m| acc | Self::from(m))
    }
}

/// Where the modal body markup comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Literal markup written into the content slot.
    Literal(String),
    /// Id of a template whose content is cloned into the content slot.
    Template(String),
}

/// Options for a new modal.
#[derive(Clone)]
pub struct ModalOptions {
    pub content: Option<String>,
    pub template: Option<String>,
    pub destroy_on_close: bool,
    pub footer: bool,
    pub dismiss: DismissMethods,
    pub style_classes: Vec<String>,
    pub on_open: Option<ModalCallback>,
    pub on_close: Option<ModalCallback>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            content: None,
            template: None,
            destroy_on_close: true,
            footer: false,
            dismiss: DismissMethods::default(),
            style_classes: Vec::new(),
            on_open: None,
            on_close: None,
        }
    }
}

impl std::fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalOptions")
            .field("content", &self.content)
            .field("template", &self.template)
            .field("destroy_on_close", &self.destroy_on_close)
            .field("footer", &self.footer)
            .field("dismiss", &self.dismiss)
            .field("style_classes", &self.style_classes)
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

impl ModalOptions {
    /// Options with every dismissal method, no footer, destroy on close.
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal markup for the content slot. Takes precedence over
    /// [`template`](Self::template) when both are set.
    pub fn content(mut self, html: impl Into<String>) -> Self {
        self.content = Some(html.into());
        self
    }

    /// Id of a registered template whose markup is cloned into the content
    /// slot on every build.
    pub fn template(mut self, template_id: impl Into<String>) -> Self {
        self.template = Some(template_id.into());
        self
    }

    /// Whether [`Modal::close_default`](crate::Modal::close_default) tears
    /// the tree down (`true`) or only hides it.
    pub fn destroy_on_close(mut self, destroy: bool) -> Self {
        self.destroy_on_close = destroy;
        self
    }

    /// Build a footer region.
    pub fn footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Replace the allowed dismissal methods. An empty set leaves only
    /// programmatic closing.
    pub fn dismiss(mut self, methods: DismissMethods) -> Self {
        self.dismiss = methods;
        self
    }

    /// Add one extra class for the container.
    pub fn style_class(mut self, class: impl Into<String>) -> Self {
        self.style_classes.push(class.into());
        self
    }

    /// Add several extra classes for the container.
    pub fn style_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.style_classes.extend(classes.into_iter().map(Into::into));
        self
    }

    /// Run once the open transition finishes (or its fallback fires).
    pub fn on_open(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(callback));
        self
    }

    /// Run after a close completes, once the tree is hidden or destroyed.
    pub fn on_close(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(callback));
        self
    }

    /// Pick the effective content source.
    ///
    /// Literal content wins over a template; the caller is told whether a
    /// template was discarded so it can warn.
    pub(crate) fn resolve_source(&self) -> Result<(ContentSource, bool), ModalError> {
        match (&self.content, &self.template) {
            (Some(html), template) => Ok((ContentSource::Literal(html.clone()), template.is_some())),
            (None, Some(id)) => Ok((ContentSource::Template(id.clone()), false)),
            (None, None) => Err(ModalError::MissingContent),
        }
    }
}

/// Whether `class` can be added to a class list as a single token.
pub(crate) fn is_class_token(class: &str) -> bool {
    !class.is_empty() && !class.chars().any(char::is_whitespace)
}
