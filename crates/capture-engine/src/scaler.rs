//! Aspect-preserving downscale to a fixed short side.
//!
//! The shorter real side always maps to the target length and the longer
//! side follows the aspect ratio, rounded to the nearest pixel. Displays
//! whose short side is already below the target are scaled *up* (scale < 1);
//! nothing is clamped.

use glimpse_platform_core::DisplayMetrics;
use serde::Serialize;

/// Length the shorter output side is scaled to.
pub const SHORT_SIDE_TARGET: u32 = 540;

/// Output size for one iteration plus the real-per-output pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleResult {
    pub target_width: u32,
    pub target_height: u32,
    /// Real pixels per output pixel (`real short side / target`).
    pub scale: f32,
}

/// Computes [`ScaleResult`]s for a fixed short-side target.
#[derive(Debug, Clone, Copy)]
pub struct FrameScaler {
    short_side_target: u32,
}

impl Default for FrameScaler {
    fn default() -> Self {
        Self::new(SHORT_SIDE_TARGET)
    }
}

impl FrameScaler {
    pub fn new(short_side_target: u32) -> Self {
        Self {
            short_side_target: short_side_target.max(1),
        }
    }

    pub fn short_side_target(&self) -> u32 {
        self.short_side_target
    }

    pub fn compute_target(&self, real: DisplayMetrics) -> ScaleResult {
        let target = self.short_side_target;
        let (short, long) = if real.is_portrait() {
            (real.real_width, real.real_height)
        } else {
            (real.real_height, real.real_width)
        };

        let scale = short as f32 / target as f32;
        let scaled_long = (long as f64 * target as f64 / short as f64).round() as u32;

        if real.is_portrait() {
            ScaleResult {
                target_width: target,
                target_height: scaled_long,
                scale,
            }
        } else {
            ScaleResult {
                target_width: scaled_long,
                target_height: target,
                scale,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn metrics(w: u32, h: u32) -> DisplayMetrics {
        DisplayMetrics::new(w, h).unwrap()
    }

    #[test]
    fn portrait_phone() {
        let result = FrameScaler::default().compute_target(metrics(1080, 2400));
        assert_eq!(result.target_width, 540);
        assert_eq!(result.target_height, 1200);
        assert_eq!(result.scale, 2.0);
    }

    #[test]
    fn landscape_phone() {
        let result = FrameScaler::default().compute_target(metrics(2400, 1080));
        assert_eq!(result.target_width, 1200);
        assert_eq!(result.target_height, 540);
        assert_eq!(result.scale, 2.0);
    }

    #[test]
    fn square_uses_height_as_short_side() {
        let result = FrameScaler::default().compute_target(metrics(1080, 1080));
        assert_eq!((result.target_width, result.target_height), (540, 540));
    }

    #[test]
    fn long_side_rounds_to_nearest() {
        // 1440x3120 -> 3120 / (1440/540) = 1170 exactly
        let result = FrameScaler::default().compute_target(metrics(1440, 3120));
        assert_eq!(result.target_height, 1170);
        // 1080x2401 -> 1200.5 rounds up
        let result = FrameScaler::default().compute_target(metrics(1080, 2401));
        assert_eq!(result.target_height, 1201);
    }

    #[test]
    fn small_displays_are_upscaled() {
        let result = FrameScaler::default().compute_target(metrics(480, 800));
        assert_eq!(result.target_width, 540);
        assert_eq!(result.target_height, 900);
        assert!(result.scale < 1.0);
    }

    #[test]
    fn phone_targets_fit_default_region() {
        let capacity = glimpse_common::DEFAULT_REGION_CAPACITY;
        for (w, h) in [(1080, 2400), (1440, 3200), (720, 1600), (1080, 1920)] {
            let r = FrameScaler::default().compute_target(metrics(w, h));
            let needed = glimpse_common::HEADER_SIZE
                + r.target_width as usize * r.target_height as usize * 4;
            assert!(needed <= capacity, "{w}x{h} needs {needed}");
        }
    }

    proptest! {
        #[test]
        fn short_side_always_hits_target(w in 1u32..8000, h in 1u32..8000) {
            let r = FrameScaler::default().compute_target(metrics(w, h));
            prop_assert_eq!(r.target_width.min(r.target_height), SHORT_SIDE_TARGET);
            prop_assert!(r.scale > 0.0);
        }

        #[test]
        fn aspect_ratio_within_rounding(w in 1u32..8000, h in 1u32..8000) {
            let r = FrameScaler::default().compute_target(metrics(w, h));
            let real = w as f64 / h as f64;
            let out = r.target_width as f64 / r.target_height as f64;
            // Half a pixel on the long side, relative to the 540 short side.
            prop_assert!((real - out).abs() <= 0.5 / SHORT_SIDE_TARGET as f64 + 1e-9);
        }

        #[test]
        fn downscale_when_short_side_at_least_target(w in 540u32..8000, h in 540u32..8000) {
            let r = FrameScaler::default().compute_target(metrics(w, h));
            prop_assert!(r.scale >= 1.0);
        }
    }
}
