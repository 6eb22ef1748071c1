//! Snapshot assembly: one [`BrowserState`] per step.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use webhelm_core_types::{BoundingBox, BrowserState, BrowserTab, Coordinate, TabRegistry};
use webhelm_driver::{Driver, DriverError};

/// Tags whose focus means "nothing interactive is focused".
const CONTAINER_TAGS: [&str; 5] = ["body", "iframe", "frame", "document", "html"];

/// Capture-layer knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// First screenshot attempt timeout; doubles on each retry.
    pub screenshot_timeout_ms: u64,
    /// Total screenshot attempts before failing open with an empty frame.
    pub screenshot_attempts: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            screenshot_timeout_ms: 5_000,
            screenshot_attempts: 3,
        }
    }
}

/// Reads the browser's current visual and geometric state through the
/// injected driver.
///
/// Owns the run's [`TabRegistry`]; each capture assigns ids to newly seen
/// tab handles and prunes handles that vanished, so ids stay stable for the
/// lifetime of a tab and are never reused afterwards.
pub struct StateCapture {
    driver: Arc<dyn Driver>,
    config: CaptureConfig,
    registry: TabRegistry,
    captures: u32,
}

impl StateCapture {
    pub fn new(driver: Arc<dyn Driver>, config: CaptureConfig) -> Self {
        Self {
            driver,
            config,
            registry: TabRegistry::new(),
            captures: 0,
        }
    }

    /// The tab-id registry, for resolving `switch_tab` actions.
    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    /// Take a fresh snapshot.
    ///
    /// Screenshot failures are retried with doubling timeouts and then
    /// degrade to an empty frame rather than failing the capture. Tabs that
    /// close mid-enumeration are dropped from the snapshot. Any other
    /// driver failure aborts the capture, after the originally active tab
    /// has been restored.
    pub async fn capture(&mut self) -> Result<BrowserState, DriverError> {
        self.captures += 1;

        let viewport = self.driver.viewport().await?;
        let screenshot = self.screenshot_with_retry().await;
        let mouse = self.pointer_estimate().await;
        let scrollbar = self.driver.scroll_metrics().await?;
        let (tabs, active_tab) = self.enumerate_tabs().await?;
        let active_element = self.focused_element().await;

        Ok(BrowserState {
            screenshot: BASE64.encode(&screenshot),
            width: viewport.width,
            height: viewport.height,
            scrollbar,
            tabs,
            active_tab,
            active_element,
            mouse,
            captured_at: Utc::now(),
        })
    }

    async fn screenshot_with_retry(&self) -> Vec<u8> {
        let attempts = self.config.screenshot_attempts;
        let mut timeout = Duration::from_millis(self.config.screenshot_timeout_ms);

        for attempt in 1..=attempts {
            match self.driver.screenshot(timeout).await {
                Ok(bytes) => return bytes,
                Err(err) if attempt < attempts => {
                    warn!(%err, attempt, "screenshot attempt failed, retrying");
                    timeout *= 2;
                }
                Err(err) => {
                    warn!(
                        %err,
                        attempts,
                        "screenshot failed on every attempt, continuing with empty frame"
                    );
                }
            }
        }

        Vec::new()
    }

    /// Estimate the pointer position from the driver's last known value,
    /// refreshed by a near-zero synthetic wiggle. Falls back to the origin.
    async fn pointer_estimate(&self) -> Coordinate {
        if let Err(err) = self.driver.move_mouse_by(3, 3).await {
            debug!(%err, "pointer wiggle failed");
        }
        if let Err(err) = self.driver.move_mouse_by(-3, -3).await {
            debug!(%err, "pointer wiggle failed");
        }

        match self.driver.pointer_position().await {
            Ok(Some(pointer)) => pointer,
            Ok(None) => Coordinate::origin(),
            Err(err) => {
                debug!(%err, "pointer read failed, defaulting to origin");
                Coordinate::origin()
            }
        }
    }

    /// Visit every open tab to read its url and title, then restore the
    /// originally active tab. The restore happens on the error path too, so
    /// the transient switches stay invisible to the rest of the step.
    async fn enumerate_tabs(&mut self) -> Result<(Vec<BrowserTab>, String), DriverError> {
        let original = self.driver.active_tab().await?;
        let handles = self.driver.tab_handles().await?;

        let mut tabs = Vec::with_capacity(handles.len());
        let mut seen = Vec::with_capacity(handles.len());
        let mut failure = None;

        for handle in handles {
            match self.read_tab(&handle, &original).await {
                Ok(Some(tab)) => {
                    seen.push(handle);
                    tabs.push(tab);
                }
                Ok(None) => debug!(handle = %handle, "tab closed during enumeration, dropped"),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Err(restore_err) = self.driver.switch_tab(&original).await {
            return Err(failure.unwrap_or(restore_err));
        }
        if let Some(err) = failure {
            return Err(err);
        }

        self.registry.prune(seen.iter().map(String::as_str));
        Ok((tabs, original))
    }

    async fn read_tab(
        &mut self,
        handle: &str,
        original: &str,
    ) -> Result<Option<BrowserTab>, DriverError> {
        if let Err(err) = self.driver.switch_tab(handle).await {
            return absorb_closed(err);
        }
        let url = match self.driver.page_url().await {
            Ok(url) => url,
            Err(err) => return absorb_closed(err),
        };
        let title = match self.driver.page_title().await {
            Ok(title) => title,
            Err(err) => return absorb_closed(err),
        };

        let (id, is_new) = self.registry.observe(handle, self.captures);
        Ok(Some(BrowserTab {
            handle: handle.to_string(),
            url,
            title,
            active: handle == original,
            new: is_new,
            id,
        }))
    }

    async fn focused_element(&self) -> Option<BoundingBox> {
        match self.driver.focused_element().await {
            Ok(Some(element)) => {
                let tag = element.tag_name.to_ascii_lowercase();
                if CONTAINER_TAGS.contains(&tag.as_str()) {
                    None
                } else {
                    Some(element.rect)
                }
            }
            Ok(None) => None,
            Err(err) => {
                debug!(%err, "focused element lookup failed");
                None
            }
        }
    }
}

fn absorb_closed(err: DriverError) -> Result<Option<BrowserTab>, DriverError> {
    match err {
        DriverError::TabClosed(_) => Ok(None),
        other => Err(other),
    }
}
