#![forbid(unsafe_code)]

//! Manager-wide configuration.

use std::time::Duration;

/// CSS property whose `transitionend` marks an open/close as finished.
pub const DEFAULT_TRANSITION_PROPERTY: &str = "transform";

/// How long to wait for `transitionend` before completing anyway.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration shared by every modal of a [`ModalManager`].
///
/// [`ModalManager`]: crate::ModalManager
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    /// Transition property used as the completion signal; others are ignored.
    pub transition_property: String,
    /// Fallback delay after which a pending transition completes even if no
    /// event arrived. `None` waits forever.
    pub transition_timeout: Option<Duration>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            transition_property: DEFAULT_TRANSITION_PROPERTY.to_owned(),
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
        }
    }
}

impl ManagerConfig {
    pub fn transition_property(mut self, property: impl Into<String>) -> Self {
        self.transition_property = property.into();
        self
    }

    pub fn transition_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transition_timeout = timeout;
        self
    }
}
