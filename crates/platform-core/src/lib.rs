//! Glimpse platform core contracts.
//!
//! This crate contains the platform-neutral types the capture engine works
//! with and the [`CapturePlatform`] trait every capture adapter implements.
//! The concrete screenshot primitive is always supplied from outside; the
//! engine only probes for it and calls it.

pub mod frame;
pub mod shape;

pub use frame::*;
pub use shape::*;

use glimpse_common::error::GlimpseResult;
use serde::{Deserialize, Serialize};

/// Real (unscaled) size of the captured display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub real_width: u32,
    pub real_height: u32,
}

impl DisplayMetrics {
    /// Metrics for a display of the given size; `None` if either side is 0.
    pub fn new(real_width: u32, real_height: u32) -> Option<Self> {
        (real_width > 0 && real_height > 0).then_some(Self {
            real_width,
            real_height,
        })
    }

    pub fn is_portrait(&self) -> bool {
        self.real_width < self.real_height
    }

    pub fn short_side(&self) -> u32 {
        self.real_width.min(self.real_height)
    }
}

/// Adapter over one platform's screenshot primitive.
///
/// Probing methods are called at most once per shape and token source for
/// the life of a binding. An `Err` from a probe is treated the same as
/// `Ok(false)`.
pub trait CapturePlatform: Send {
    /// Short adapter name for logs.
    fn name(&self) -> &str;

    /// Whether the primitive exposes `shape`.
    fn has_shape(&self, shape: CaptureShape) -> GlimpseResult<bool>;

    /// Look up a display handle from `source`.
    fn display_token(&self, source: TokenSource) -> GlimpseResult<Option<DisplayToken>>;

    /// Invoke the primitive. `Ok(None)` means the platform produced no frame.
    fn screenshot(&mut self, call: &ShapeCall) -> GlimpseResult<Option<RawFrame>>;

    /// Turn a captured frame into portable RGBA. Adapters that hand out
    /// [`PixelLayout::Device`] frames must override this.
    fn to_portable(&self, frame: RawFrame) -> GlimpseResult<FrameBuffer> {
        frame.into_portable()
    }
}

impl<P: CapturePlatform + ?Sized> CapturePlatform for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn has_shape(&self, shape: CaptureShape) -> GlimpseResult<bool> {
        (**self).has_shape(shape)
    }

    fn display_token(&self, source: TokenSource) -> GlimpseResult<Option<DisplayToken>> {
        (**self).display_token(source)
    }

    fn screenshot(&mut self, call: &ShapeCall) -> GlimpseResult<Option<RawFrame>> {
        (**self).screenshot(call)
    }

    fn to_portable(&self, frame: RawFrame) -> GlimpseResult<FrameBuffer> {
        (**self).to_portable(frame)
    }
}
