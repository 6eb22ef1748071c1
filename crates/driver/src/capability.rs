use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use webhelm_core_types::{BoundingBox, Coordinate, ScrollBar, ViewportSize};

use crate::error::DriverError;

/// Pointer buttons the engine can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// The element currently holding keyboard focus, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedElement {
    /// Lowercased tag name, e.g. `"input"`. Document-level containers are
    /// filtered out by the capture layer, not here.
    pub tag_name: String,
    pub rect: BoundingBox,
}

/// Capability a host injects to let the engine observe and drive a browser.
///
/// Implementations are expected to be cheap to call sequentially; the engine
/// issues one operation at a time and never overlaps calls. Key names follow
/// DOM `KeyboardEvent` code conventions (`"Enter"`, `"PageDown"`, `"F5"`);
/// single characters are sent verbatim.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Current viewport dimensions of the active tab.
    async fn viewport(&self) -> Result<ViewportSize, DriverError>;

    /// PNG screenshot of the active tab's viewport, delivered within
    /// `timeout` or failing with [`DriverError::ScreenshotTimeout`].
    async fn screenshot(&self, timeout: Duration) -> Result<Vec<u8>, DriverError>;

    /// Scroll offset and visible fraction of the active tab's document.
    async fn scroll_metrics(&self) -> Result<ScrollBar, DriverError>;

    /// Handles of every open tab, in browser order.
    async fn tab_handles(&self) -> Result<Vec<String>, DriverError>;

    /// Handle of the currently active tab.
    async fn active_tab(&self) -> Result<String, DriverError>;

    /// Make `handle` the active tab.
    async fn switch_tab(&self, handle: &str) -> Result<(), DriverError>;

    /// URL of the active tab.
    async fn page_url(&self) -> Result<String, DriverError>;

    /// Title of the active tab.
    async fn page_title(&self) -> Result<String, DriverError>;

    /// The focused element of the active tab, if any.
    async fn focused_element(&self) -> Result<Option<FocusedElement>, DriverError>;

    /// Last pointer position the driver knows of, if it knows one.
    async fn pointer_position(&self) -> Result<Option<Coordinate>, DriverError>;

    async fn move_mouse_to(&self, target: Coordinate) -> Result<(), DriverError>;

    async fn move_mouse_by(&self, dx: i32, dy: i32) -> Result<(), DriverError>;

    async fn button_down(&self, button: MouseButton) -> Result<(), DriverError>;

    async fn button_up(&self, button: MouseButton) -> Result<(), DriverError>;

    async fn click(&self, button: MouseButton) -> Result<(), DriverError>;

    async fn double_click(&self, button: MouseButton) -> Result<(), DriverError>;

    /// Hold a key down until the matching [`Driver::key_up`].
    async fn key_down(&self, key: &str) -> Result<(), DriverError>;

    async fn key_up(&self, key: &str) -> Result<(), DriverError>;

    /// Press and release a single key.
    async fn key_tap(&self, key: &str) -> Result<(), DriverError>;

    /// Type literal text into the focused element.
    async fn send_text(&self, text: &str) -> Result<(), DriverError>;

    /// Scroll the active tab vertically by `delta_y` pixels; positive moves
    /// the content up (scrolls down).
    async fn scroll_by(&self, delta_y: i32) -> Result<(), DriverError>;
}
