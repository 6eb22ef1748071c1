//! Scripted in-memory driver for exercising the engine without a browser.
//!
//! Records every call it receives so tests can assert on exact dispatch
//! sequences, and lets tests inject failures at the screenshot and input
//! seams.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use webhelm_core_types::{Coordinate, ScrollBar, ViewportSize};

use crate::{Driver, DriverError, FocusedElement, MouseButton};

#[derive(Debug, Clone)]
struct FakeTab {
    handle: String,
    url: String,
    title: String,
}

#[derive(Debug)]
struct FakeState {
    viewport: ViewportSize,
    screenshot: Vec<u8>,
    scrollbar: ScrollBar,
    tabs: Vec<FakeTab>,
    active: String,
    pointer: Option<Coordinate>,
    focused: Option<FocusedElement>,
    calls: Vec<String>,
    screenshot_failures_left: u32,
    input_failure: Option<DriverError>,
}

/// In-memory [`Driver`] double with a call log.
pub struct FakeDriver {
    state: Mutex<FakeState>,
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDriver {
    /// A driver with one example tab, a 1920x1080 viewport, an unscrolled
    /// page and no known pointer position.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                viewport: ViewportSize::new(1920, 1080),
                screenshot: Vec::new(),
                scrollbar: ScrollBar::new(0.0, 1.0),
                tabs: vec![FakeTab {
                    handle: "tab-1".into(),
                    url: "https://example.com/".into(),
                    title: "Example Domain".into(),
                }],
                active: "tab-1".into(),
                pointer: None,
                focused: None,
                calls: Vec::new(),
                screenshot_failures_left: 0,
                input_failure: None,
            }),
        }
    }

    pub fn with_viewport(self, viewport: ViewportSize) -> Self {
        self.lock().viewport = viewport;
        self
    }

    pub fn with_screenshot(self, png: Vec<u8>) -> Self {
        self.lock().screenshot = png;
        self
    }

    pub fn with_scrollbar(self, scrollbar: ScrollBar) -> Self {
        self.lock().scrollbar = scrollbar;
        self
    }

    pub fn with_pointer(self, pointer: Coordinate) -> Self {
        self.lock().pointer = Some(pointer);
        self
    }

    pub fn with_focused(self, focused: FocusedElement) -> Self {
        self.lock().focused = Some(focused);
        self
    }

    /// Add a tab at the end of the tab order.
    pub fn open_tab(&self, handle: &str, url: &str, title: &str) {
        self.lock().tabs.push(FakeTab {
            handle: handle.into(),
            url: url.into(),
            title: title.into(),
        });
    }

    /// Remove a tab, simulating the user or page closing it.
    pub fn close_tab(&self, handle: &str) {
        self.lock().tabs.retain(|tab| tab.handle != handle);
    }

    /// Make the next `count` screenshot calls time out.
    pub fn fail_screenshots(&self, count: u32) {
        self.lock().screenshot_failures_left = count;
    }

    /// Make every input primitive fail with `error` until cleared with
    /// [`FakeDriver::clear_input_failure`].
    pub fn fail_inputs(&self, error: DriverError) {
        self.lock().input_failure = Some(error);
    }

    pub fn clear_input_failure(&self) {
        self.lock().input_failure = None;
    }

    pub fn set_pointer(&self, pointer: Coordinate) {
        self.lock().pointer = Some(pointer);
    }

    /// Every call received so far, in order, rendered as short strings like
    /// `"move_to(750,750)"` or `"click(left)"`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of unambiguous input-dispatch calls (clicks, buttons, keys,
    /// text, scrolls and absolute moves). Relative moves and tab switches
    /// are excluded because the capture layer issues those too.
    pub fn input_dispatch_count(&self) -> usize {
        const PREFIXES: [&str; 10] = [
            "move_to(",
            "click(",
            "double_click(",
            "button_down(",
            "button_up(",
            "key_down(",
            "key_up(",
            "key_tap(",
            "send_text(",
            "scroll_by(",
        ];
        self.lock()
            .calls
            .iter()
            .filter(|call| PREFIXES.iter().any(|p| call.starts_with(p)))
            .count()
    }

    pub fn pointer(&self) -> Option<Coordinate> {
        self.lock().pointer
    }

    pub fn active(&self) -> String {
        self.lock().active.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake driver state poisoned")
    }

    fn record(&self, call: impl Into<String>) {
        self.lock().calls.push(call.into());
    }

    fn input_gate(&self) -> Result<(), DriverError> {
        match &self.lock().input_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn viewport(&self) -> Result<ViewportSize, DriverError> {
        self.record("viewport");
        Ok(self.lock().viewport)
    }

    async fn screenshot(&self, timeout: Duration) -> Result<Vec<u8>, DriverError> {
        self.record("screenshot");
        let mut state = self.lock();
        if state.screenshot_failures_left > 0 {
            state.screenshot_failures_left -= 1;
            return Err(DriverError::ScreenshotTimeout(timeout));
        }
        Ok(state.screenshot.clone())
    }

    async fn scroll_metrics(&self) -> Result<ScrollBar, DriverError> {
        self.record("scroll_metrics");
        Ok(self.lock().scrollbar)
    }

    async fn tab_handles(&self) -> Result<Vec<String>, DriverError> {
        self.record("tab_handles");
        Ok(self.lock().tabs.iter().map(|t| t.handle.clone()).collect())
    }

    async fn active_tab(&self) -> Result<String, DriverError> {
        self.record("active_tab");
        Ok(self.lock().active.clone())
    }

    async fn switch_tab(&self, handle: &str) -> Result<(), DriverError> {
        self.record(format!("switch_tab({handle})"));
        let mut state = self.lock();
        if state.tabs.iter().any(|tab| tab.handle == handle) {
            state.active = handle.to_string();
            Ok(())
        } else {
            Err(DriverError::TabClosed(handle.to_string()))
        }
    }

    async fn page_url(&self) -> Result<String, DriverError> {
        self.record("page_url");
        let state = self.lock();
        state
            .tabs
            .iter()
            .find(|tab| tab.handle == state.active)
            .map(|tab| tab.url.clone())
            .ok_or_else(|| DriverError::TabClosed(state.active.clone()))
    }

    async fn page_title(&self) -> Result<String, DriverError> {
        self.record("page_title");
        let state = self.lock();
        state
            .tabs
            .iter()
            .find(|tab| tab.handle == state.active)
            .map(|tab| tab.title.clone())
            .ok_or_else(|| DriverError::TabClosed(state.active.clone()))
    }

    async fn focused_element(&self) -> Result<Option<FocusedElement>, DriverError> {
        self.record("focused_element");
        Ok(self.lock().focused.clone())
    }

    async fn pointer_position(&self) -> Result<Option<Coordinate>, DriverError> {
        self.record("pointer_position");
        Ok(self.lock().pointer)
    }

    async fn move_mouse_to(&self, target: Coordinate) -> Result<(), DriverError> {
        self.record(format!("move_to({},{})", target.x, target.y));
        self.input_gate()?;
        self.lock().pointer = Some(target);
        Ok(())
    }

    async fn move_mouse_by(&self, dx: i32, dy: i32) -> Result<(), DriverError> {
        self.record(format!("move_by({dx},{dy})"));
        self.input_gate()?;
        let mut state = self.lock();
        let current = state.pointer.unwrap_or(Coordinate::origin());
        let x = (current.x as i64 + dx as i64).max(0) as u32;
        let y = (current.y as i64 + dy as i64).max(0) as u32;
        state.pointer = Some(Coordinate::new(x, y));
        Ok(())
    }

    async fn button_down(&self, button: MouseButton) -> Result<(), DriverError> {
        self.record(format!("button_down({})", button_name(button)));
        self.input_gate()
    }

    async fn button_up(&self, button: MouseButton) -> Result<(), DriverError> {
        self.record(format!("button_up({})", button_name(button)));
        self.input_gate()
    }

    async fn click(&self, button: MouseButton) -> Result<(), DriverError> {
        self.record(format!("click({})", button_name(button)));
        self.input_gate()
    }

    async fn double_click(&self, button: MouseButton) -> Result<(), DriverError> {
        self.record(format!("double_click({})", button_name(button)));
        self.input_gate()
    }

    async fn key_down(&self, key: &str) -> Result<(), DriverError> {
        self.record(format!("key_down({key})"));
        self.input_gate()
    }

    async fn key_up(&self, key: &str) -> Result<(), DriverError> {
        self.record(format!("key_up({key})"));
        self.input_gate()
    }

    async fn key_tap(&self, key: &str) -> Result<(), DriverError> {
        self.record(format!("key_tap({key})"));
        self.input_gate()
    }

    async fn send_text(&self, text: &str) -> Result<(), DriverError> {
        self.record(format!("send_text({text})"));
        self.input_gate()
    }

    async fn scroll_by(&self, delta_y: i32) -> Result<(), DriverError> {
        self.record(format!("scroll_by({delta_y})"));
        self.input_gate()
    }
}

fn button_name(button: MouseButton) -> &'static str {
    match button {
        MouseButton::Left => "left",
        MouseButton::Middle => "middle",
        MouseButton::Right => "right",
    }
}
