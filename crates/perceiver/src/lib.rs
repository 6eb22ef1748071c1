//! Perception layer: turns the live browser surface into immutable
//! [`webhelm_core_types::BrowserState`] snapshots and prepares screenshots
//! for oracle consumption.

mod annotate;
mod capture;

pub use annotate::{AnnotateError, ScreenshotAnnotator};
pub use capture::{CaptureConfig, StateCapture};
