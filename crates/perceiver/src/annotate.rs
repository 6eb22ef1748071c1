//! Screenshot overlays shown to the oracle: scroll position, pointer, and
//! keyboard focus.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use thiserror::Error;
use tracing::debug;

use webhelm_core_types::{BoundingBox, BrowserState, Coordinate, ScrollBar};
use webhelm_scaling::ScalingRatio;

/// Errors from screenshot processing.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("failed to decode screenshot: {0}")]
    Decode(String),

    #[error("failed to encode annotated screenshot: {0}")]
    Encode(String),
}

/// Cursor glyph height and width in pixels.
const CURSOR_SIZE: u32 = 12;

/// Overlays run-state markers onto captured screenshots before the oracle
/// sees them.
///
/// Degraded captures pass through untouched: an empty or undecodable
/// screenshot, or one smaller than the minimum marking size, is returned
/// as-is rather than failing the step.
#[derive(Debug, Clone)]
pub struct ScreenshotAnnotator {
    scrollbar_width: u32,
    min_dimension: u32,
}

impl Default for ScreenshotAnnotator {
    fn default() -> Self {
        Self {
            scrollbar_width: 10,
            min_dimension: 20,
        }
    }
}

impl ScreenshotAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a state's screenshot with the scrollbar indicator, pointer
    /// marker, and focused-element outline. Input and output are base64
    /// PNG, as stored on [`BrowserState`].
    pub fn annotate(&self, state: &BrowserState) -> Result<String, AnnotateError> {
        let bytes = match BASE64.decode(&state.screenshot) {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ => return Ok(state.screenshot.clone()),
        };
        let mut img = match image::load_from_memory(&bytes) {
            Ok(img) => img.to_rgba8(),
            Err(err) => {
                debug!(%err, "screenshot not decodable, leaving unannotated");
                return Ok(state.screenshot.clone());
            }
        };

        let (width, height) = img.dimensions();
        if width < self.min_dimension || height < self.min_dimension {
            return Ok(state.screenshot.clone());
        }

        draw_scrollbar(&mut img, state.scrollbar, self.scrollbar_width);
        draw_cursor(&mut img, state.mouse);
        if let Some(rect) = state.active_element {
            draw_focus_outline(&mut img, rect);
        }

        Ok(BASE64.encode(encode_png(img)?))
    }

    /// Resize a (marked) screenshot to the normalized target resolution so
    /// the image the oracle sees matches the coordinate space it answers
    /// in. Fails loudly on bad input; oracle hosts call this explicitly.
    pub fn resize_for_oracle(
        &self,
        screenshot: &str,
        ratio: &ScalingRatio,
    ) -> Result<Vec<u8>, AnnotateError> {
        let bytes = BASE64
            .decode(screenshot)
            .map_err(|err| AnnotateError::Decode(err.to_string()))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|err| AnnotateError::Decode(err.to_string()))?;

        let resized = image::imageops::resize(
            &img.to_rgba8(),
            ratio.new_size.width,
            ratio.new_size.height,
            FilterType::Lanczos3,
        );
        encode_png(resized)
    }
}

fn draw_scrollbar(img: &mut RgbaImage, scrollbar: ScrollBar, bar_width: u32) {
    const GRAY: [u8; 3] = [128, 128, 128];
    // 0.7 opacity in 8-bit alpha.
    const ALPHA: u32 = 179;

    let (width, height) = img.dimensions();
    let bar_width = bar_width.min(width);
    let bar_height = (height as f64 * scrollbar.height.clamp(0.0, 1.0)).floor() as u32;
    let top = (height as f64 * scrollbar.offset.clamp(0.0, 1.0)).floor() as u32;

    for y in top..(top + bar_height).min(height) {
        for x in (width - bar_width)..width {
            let px = img.get_pixel_mut(x, y);
            for channel in 0..3 {
                px[channel] =
                    ((GRAY[channel] as u32 * ALPHA + px[channel] as u32 * (255 - ALPHA)) / 255)
                        as u8;
            }
            px[3] = 255;
        }
    }
}

/// Black arrow glyph with its tip at the pointer position.
fn draw_cursor(img: &mut RgbaImage, mouse: Coordinate) {
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    let (width, height) = img.dimensions();

    for row in 0..CURSOR_SIZE {
        for col in 0..=row {
            let x = mouse.x + col;
            let y = mouse.y + row;
            if x < width && y < height {
                *img.get_pixel_mut(x, y) = BLACK;
            }
        }
    }
}

/// Two-pixel red outline around the focused element.
fn draw_focus_outline(img: &mut RgbaImage, rect: BoundingBox) {
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const THICKNESS: u32 = 2;

    let (width, height) = img.dimensions();
    let x0 = rect.x.min(width);
    let y0 = rect.y.min(height);
    let x1 = rect.x.saturating_add(rect.width).min(width);
    let y1 = rect.y.saturating_add(rect.height).min(height);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let mut put = |x: u32, y: u32| {
        if x < width && y < height {
            *img.get_pixel_mut(x, y) = RED;
        }
    };

    for x in x0..x1 {
        for t in 0..THICKNESS {
            put(x, y0 + t);
            if y1 > t {
                put(x, y1 - 1 - t);
            }
        }
    }
    for y in y0..y1 {
        for t in 0..THICKNESS {
            put(x0 + t, y);
            if x1 > t {
                put(x1 - 1 - t, y);
            }
        }
    }
}

fn encode_png(img: RgbaImage) -> Result<Vec<u8>, AnnotateError> {
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .map_err(|err| AnnotateError::Encode(err.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use webhelm_core_types::{ScrollBar, ViewportSize};
    use webhelm_scaling::{ScalingPolicy, ScalingRatio};

    fn white_png(width: u32, height: u32) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        BASE64.encode(encode_png(img).unwrap())
    }

    fn state_with(screenshot: String, width: u32, height: u32) -> BrowserState {
        BrowserState {
            screenshot,
            width,
            height,
            scrollbar: ScrollBar::new(0.25, 0.5),
            tabs: Vec::new(),
            active_tab: "tab-1".into(),
            active_element: None,
            mouse: Coordinate::new(30, 40),
            captured_at: Utc::now(),
        }
    }

    fn decode(b64: &str) -> RgbaImage {
        let bytes = BASE64.decode(b64).unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgba8()
    }

    #[test]
    fn marks_scrollbar_cursor_and_focus() {
        let mut state = state_with(white_png(100, 80), 100, 80);
        state.active_element = Some(BoundingBox::new(10, 10, 30, 12));

        let annotator = ScreenshotAnnotator::new();
        let marked = decode(&annotator.annotate(&state).unwrap());

        // Scrollbar: gray-blended pixel on the right edge, a quarter down.
        let bar_px = marked.get_pixel(95, 25);
        assert!(bar_px[0] < 255 && bar_px[0] > 100);
        // Above the bar the edge stays white.
        assert_eq!(marked.get_pixel(95, 10)[0], 255);

        // Cursor: black tip at the pointer.
        assert_eq!(*marked.get_pixel(30, 40), Rgba([0, 0, 0, 255]));

        // Focus outline: red at the rectangle's top edge.
        assert_eq!(*marked.get_pixel(20, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(*marked.get_pixel(20, 11), Rgba([255, 0, 0, 255]));
        // Interior stays white.
        assert_eq!(*marked.get_pixel(20, 16), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn empty_screenshot_passes_through() {
        let state = state_with(String::new(), 1920, 1080);
        let annotator = ScreenshotAnnotator::new();
        assert_eq!(annotator.annotate(&state).unwrap(), "");
    }

    #[test]
    fn undecodable_screenshot_passes_through() {
        let garbage = BASE64.encode(b"not a png");
        let state = state_with(garbage.clone(), 1920, 1080);
        let annotator = ScreenshotAnnotator::new();
        assert_eq!(annotator.annotate(&state).unwrap(), garbage);
    }

    #[test]
    fn tiny_screenshot_passes_through() {
        let tiny = white_png(10, 10);
        let state = state_with(tiny.clone(), 10, 10);
        let annotator = ScreenshotAnnotator::new();
        assert_eq!(annotator.annotate(&state).unwrap(), tiny);
    }

    #[test]
    fn cursor_clamps_at_image_edge() {
        let mut state = state_with(white_png(100, 80), 100, 80);
        state.mouse = Coordinate::new(99, 79);
        let annotator = ScreenshotAnnotator::new();
        let marked = decode(&annotator.annotate(&state).unwrap());
        assert_eq!(*marked.get_pixel(99, 79), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn resize_matches_normalized_target() {
        let ratio = ScalingRatio::for_viewport(ViewportSize::new(200, 160), ScalingPolicy::grid())
            .unwrap();
        let annotator = ScreenshotAnnotator::new();
        let resized = annotator
            .resize_for_oracle(&white_png(200, 160), &ratio)
            .unwrap();
        let img = image::load_from_memory(&resized).unwrap();
        assert_eq!(img.width(), 1000);
        assert_eq!(img.height(), 1000);
    }

    #[test]
    fn resize_rejects_garbage() {
        let ratio = ScalingRatio::for_viewport(ViewportSize::new(200, 160), ScalingPolicy::grid())
            .unwrap();
        let annotator = ScreenshotAnnotator::new();
        assert!(annotator.resize_for_oracle("@@not-base64@@", &ratio).is_err());
    }
}
