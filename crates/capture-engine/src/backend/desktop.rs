//! Primary-monitor capture through xcap.
//!
//! xcap only offers a full-size grab, so this adapter exposes just the
//! four-argument shape and resizes on the CPU when a size is requested.

use glimpse_common::error::{GlimpseError, GlimpseResult};
use glimpse_platform_core::{
    CaptureShape, CapturePlatform, DisplayToken, RawFrame, ShapeCall, TokenSource,
};
use image::imageops::{self, FilterType};
use xcap::Monitor;

pub struct DesktopPlatform {
    monitor_id: u32,
}

impl DesktopPlatform {
    /// Bind to the primary monitor, or the first one if none is primary.
    pub fn primary() -> GlimpseResult<Self> {
        let monitors = Monitor::all()
            .map_err(|e| GlimpseError::platform(format!("Monitor::all failed: {e}")))?;
        let monitor = monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .ok_or_else(|| GlimpseError::platform("no monitors detected"))?;
        let monitor_id = monitor
            .id()
            .map_err(|e| GlimpseError::platform(format!("monitor id unavailable: {e}")))?;

        tracing::info!(
            monitor_id,
            name = %monitor.name().unwrap_or_default(),
            "Desktop capture bound to monitor"
        );
        Ok(Self { monitor_id })
    }

    fn monitor(&self) -> GlimpseResult<Monitor> {
        Monitor::all()
            .map_err(|e| GlimpseError::capture(format!("Monitor::all failed: {e}")))?
            .into_iter()
            .find(|m| m.id().ok() == Some(self.monitor_id))
            .ok_or_else(|| GlimpseError::capture(format!("monitor {} went away", self.monitor_id)))
    }
}

impl CapturePlatform for DesktopPlatform {
    fn name(&self) -> &str {
        "desktop"
    }

    fn has_shape(&self, shape: CaptureShape) -> GlimpseResult<bool> {
        Ok(shape == CaptureShape::FourArg)
    }

    fn display_token(&self, _source: TokenSource) -> GlimpseResult<Option<DisplayToken>> {
        Ok(None)
    }

    fn screenshot(&mut self, call: &ShapeCall) -> GlimpseResult<Option<RawFrame>> {
        let (width, height) = match call {
            ShapeCall::FourArg { width, height, .. } => (*width, *height),
            other => {
                return Err(GlimpseError::unsupported(format!(
                    "desktop capture has no {} shape",
                    other.shape()
                )))
            }
        };

        let image = match self.monitor()?.capture_image() {
            Ok(image) => image,
            Err(e) => {
                tracing::debug!(error = %e, "Desktop capture returned no frame");
                return Ok(None);
            }
        };

        let image = if width == 0 || height == 0 || (width, height) == image.dimensions() {
            image
        } else {
            imageops::resize(&image, width, height, FilterType::Triangle)
        };
        let (width, height) = image.dimensions();
        Ok(Some(RawFrame::rgba(width, height, image.into_raw())))
    }
}
