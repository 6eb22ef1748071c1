//! Coordinate mapping between the browser's native pixel space and the
//! fixed normalized space the decision oracle reasons in.
//!
//! The oracle never sees raw viewport pixels. Every capture derives one
//! [`ScalingRatio`] from the viewport dimensions, and all coordinates cross
//! the boundary through [`ScalingRatio::to_normalized`] and
//! [`ScalingRatio::to_native`]. Flooring plus clamping makes the round trip
//! lossy: normalized coordinates survive a trip through native space within
//! one pixel per axis, and native coordinates survive the reverse trip
//! within the per-axis ratio. Both bounds are accepted rounding, not a
//! defect, and are pinned down by the tests below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use webhelm_core_types::{Coordinate, ViewportSize};

/// Errors from ratio derivation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScalingError {
    /// A viewport or target dimension was zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// How native viewport dimensions map onto the normalized target.
///
/// Both variants are operational; a run picks one and sticks with it so
/// coordinates in history stay comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScalingPolicy {
    /// Shrink into `max` preserving aspect ratio (letterboxed target).
    FitWithin { max: ViewportSize },
    /// Map onto `target` exactly, ignoring aspect ratio.
    Stretch { target: ViewportSize },
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self::FitWithin {
            max: ViewportSize::new(1280, 800),
        }
    }
}

impl ScalingPolicy {
    /// The fixed 1000x1000 grid variant used by grid-based oracles.
    pub fn grid() -> Self {
        Self::Stretch {
            target: ViewportSize::new(1000, 1000),
        }
    }
}

/// Scaling relationship between one viewport and the normalized target.
///
/// `ratio_*` is native size over normalized size, so dividing a native
/// coordinate by the ratio normalizes it and multiplying a normalized
/// coordinate by the ratio converts it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingRatio {
    pub ratio_x: f64,
    pub ratio_y: f64,
    pub old_size: ViewportSize,
    pub new_size: ViewportSize,
}

impl ScalingRatio {
    /// Derive the ratio for a viewport under the given policy.
    ///
    /// Pure and deterministic: identical inputs always yield identical
    /// ratios. Fails if either viewport dimension, or a policy target
    /// dimension, is zero.
    pub fn for_viewport(orig: ViewportSize, policy: ScalingPolicy) -> Result<Self, ScalingError> {
        validate(orig)?;

        let new_size = match policy {
            ScalingPolicy::FitWithin { max } => {
                validate(max)?;
                let aspect = orig.width as f64 / orig.height as f64;
                if aspect > max.width as f64 / max.height as f64 {
                    let height = (max.width as f64 / aspect).round().max(1.0) as u32;
                    ViewportSize::new(max.width, height)
                } else {
                    let width = (max.height as f64 * aspect).round().max(1.0) as u32;
                    ViewportSize::new(width, max.height)
                }
            }
            ScalingPolicy::Stretch { target } => {
                validate(target)?;
                target
            }
        };

        Ok(Self {
            ratio_x: orig.width as f64 / new_size.width as f64,
            ratio_y: orig.height as f64 / new_size.height as f64,
            old_size: orig,
            new_size,
        })
    }

    /// Native pixels -> normalized space, clamped to `[1, new_size]`.
    pub fn to_normalized(&self, coord: Coordinate) -> Coordinate {
        Coordinate::new(
            floor_clamp(coord.x as f64 / self.ratio_x, self.new_size.width),
            floor_clamp(coord.y as f64 / self.ratio_y, self.new_size.height),
        )
    }

    /// Normalized space -> native pixels, clamped to `[1, old_size]`.
    pub fn to_native(&self, coord: Coordinate) -> Coordinate {
        Coordinate::new(
            floor_clamp(coord.x as f64 * self.ratio_x, self.old_size.width),
            floor_clamp(coord.y as f64 * self.ratio_y, self.old_size.height),
        )
    }
}

fn validate(size: ViewportSize) -> Result<(), ScalingError> {
    if size.width == 0 || size.height == 0 {
        return Err(ScalingError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

fn floor_clamp(value: f64, upper: u32) -> u32 {
    (value.floor() as i64).clamp(1, upper as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_scaling_matches_known_viewport() {
        let ratio =
            ScalingRatio::for_viewport(ViewportSize::new(1920, 1080), ScalingPolicy::grid())
                .unwrap();
        assert!((ratio.ratio_x - 1.92).abs() < 1e-12);
        assert!((ratio.ratio_y - 1.08).abs() < 1e-12);
        assert_eq!(ratio.new_size, ViewportSize::new(1000, 1000));

        // Evenly divisible case round-trips exactly.
        let native = Coordinate::new(960, 540);
        let normalized = ratio.to_normalized(native);
        assert_eq!(normalized, Coordinate::new(500, 500));
        assert_eq!(ratio.to_native(normalized), native);
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let wide =
            ScalingRatio::for_viewport(ViewportSize::new(1920, 1080), ScalingPolicy::default())
                .unwrap();
        assert_eq!(wide.new_size, ViewportSize::new(1280, 720));

        let tall =
            ScalingRatio::for_viewport(ViewportSize::new(800, 1200), ScalingPolicy::default())
                .unwrap();
        assert_eq!(tall.new_size.height, 800);
        assert_eq!(tall.new_size.width, 533);
    }

    #[test]
    fn derivation_is_deterministic() {
        let size = ViewportSize::new(1366, 768);
        let a = ScalingRatio::for_viewport(size, ScalingPolicy::default()).unwrap();
        let b = ScalingRatio::for_viewport(size, ScalingPolicy::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = ScalingRatio::for_viewport(ViewportSize::new(0, 1080), ScalingPolicy::grid())
            .unwrap_err();
        assert_eq!(
            err,
            ScalingError::InvalidDimensions {
                width: 0,
                height: 1080
            }
        );
        assert!(
            ScalingRatio::for_viewport(ViewportSize::new(1920, 0), ScalingPolicy::grid()).is_err()
        );
    }

    #[test]
    fn normalized_round_trip_is_within_one_pixel() {
        let ratio =
            ScalingRatio::for_viewport(ViewportSize::new(1920, 1080), ScalingPolicy::grid())
                .unwrap();

        for x in (1..=1000).step_by(13) {
            for y in (1..=1000).step_by(17) {
                let normalized = Coordinate::new(x, y);
                let back = ratio.to_normalized(ratio.to_native(normalized));
                assert!(
                    (back.x as i64 - x as i64).abs() <= 1,
                    "x drifted: {x} -> {}",
                    back.x
                );
                assert!(
                    (back.y as i64 - y as i64).abs() <= 1,
                    "y drifted: {y} -> {}",
                    back.y
                );
            }
        }
    }

    #[test]
    fn native_round_trip_error_is_bounded_by_the_ratio() {
        for policy in [ScalingPolicy::default(), ScalingPolicy::grid()] {
            let ratio =
                ScalingRatio::for_viewport(ViewportSize::new(1920, 1080), policy).unwrap();
            let bound_x = ratio.ratio_x.ceil() as i64;
            let bound_y = ratio.ratio_y.ceil() as i64;

            for x in (1..1920).step_by(97) {
                for y in (1..1080).step_by(89) {
                    let native = Coordinate::new(x, y);
                    let back = ratio.to_native(ratio.to_normalized(native));
                    assert!((back.x as i64 - x as i64).abs() <= bound_x);
                    assert!((back.y as i64 - y as i64).abs() <= bound_y);
                }
            }
        }
    }

    #[test]
    fn coordinates_clamp_into_bounds() {
        let ratio =
            ScalingRatio::for_viewport(ViewportSize::new(1920, 1080), ScalingPolicy::grid())
                .unwrap();

        // Zero clamps up to one.
        assert_eq!(ratio.to_normalized(Coordinate::origin()), Coordinate::new(1, 1));
        // Out-of-range normalized input clamps to the native bounds.
        let far = ratio.to_native(Coordinate::new(5000, 5000));
        assert_eq!(far, Coordinate::new(1920, 1080));
    }
}
