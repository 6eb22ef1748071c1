use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by a [`crate::Driver`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The screenshot did not arrive within the allotted timeout.
    #[error("screenshot timed out after {0:?}")]
    ScreenshotTimeout(Duration),

    /// The targeted tab no longer exists.
    #[error("tab closed: {0}")]
    TabClosed(String),

    /// The target element rejected the interaction.
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// The browser refused to navigate or change tabs.
    #[error("navigation blocked: {0}")]
    Navigation(String),

    /// Transport or protocol failure in the underlying implementation.
    #[error("driver backend failure: {0}")]
    Backend(String),
}
