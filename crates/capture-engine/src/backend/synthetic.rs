//! Deterministic test-pattern platform.
//!
//! Renders a gradient with a sweeping bar at whatever size is requested, so
//! the whole producer pipeline can run (and be tested) without a real
//! screenshot primitive. Which shapes it claims to expose is configurable.

use std::collections::{HashMap, HashSet};

use glimpse_common::error::{GlimpseError, GlimpseResult};
use glimpse_platform_core::{
    payload_len, CaptureShape, CapturePlatform, DisplayToken, PixelLayout, RawFrame, ShapeCall,
    TokenSource,
};

pub struct SyntheticPlatform {
    natural_width: u32,
    natural_height: u32,
    shapes: HashSet<CaptureShape>,
    failing_probes: HashSet<CaptureShape>,
    tokens: HashMap<TokenSource, DisplayToken>,
    layout: PixelLayout,
    frames_rendered: u64,
}

impl SyntheticPlatform {
    /// A display of the given natural size exposing every shape.
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        Self {
            natural_width,
            natural_height,
            shapes: CaptureShape::PROBE_ORDER.into_iter().collect(),
            failing_probes: HashSet::new(),
            tokens: HashMap::new(),
            layout: PixelLayout::Rgba8888,
            frames_rendered: 0,
        }
    }

    /// Expose exactly `shapes`.
    pub fn with_shapes(mut self, shapes: &[CaptureShape]) -> Self {
        self.shapes = shapes.iter().copied().collect();
        self
    }

    /// Make probing `shape` return an error instead of an answer.
    pub fn with_failing_probe(mut self, shape: CaptureShape) -> Self {
        self.failing_probes.insert(shape);
        self
    }

    pub fn with_display_token(mut self, source: TokenSource, token: DisplayToken) -> Self {
        self.tokens.insert(source, token);
        self
    }

    /// Tag frames with `layout`. `Device` frames carry RGBA bytes but are
    /// left unconverted, as an adapter with no readback would.
    pub fn with_layout(mut self, layout: PixelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    fn render(&self, width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(payload_len(width, height));
        let bar_x = (self.frames_rendered * 8 % width.max(1) as u64) as u32;
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                let b = if x.abs_diff(bar_x) < 4 { 255 } else { 64 };
                match self.layout {
                    PixelLayout::Bgra8888 => data.extend_from_slice(&[b, g, r, 255]),
                    _ => data.extend_from_slice(&[r, g, b, 255]),
                }
            }
        }
        data
    }
}

impl CapturePlatform for SyntheticPlatform {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn has_shape(&self, shape: CaptureShape) -> GlimpseResult<bool> {
        if self.failing_probes.contains(&shape) {
            return Err(GlimpseError::platform(format!("probe for {shape} failed")));
        }
        Ok(self.shapes.contains(&shape))
    }

    fn display_token(&self, source: TokenSource) -> GlimpseResult<Option<DisplayToken>> {
        Ok(self.tokens.get(&source).copied())
    }

    fn screenshot(&mut self, call: &ShapeCall) -> GlimpseResult<Option<RawFrame>> {
        if !self.shapes.contains(&call.shape()) {
            return Err(GlimpseError::platform(format!(
                "{} is not exposed by this platform",
                call.shape()
            )));
        }
        let (width, height) = match call.size() {
            (0, _) | (_, 0) => (self.natural_width, self.natural_height),
            size => size,
        };
        let data = self.render(width, height);
        self.frames_rendered += 1;
        Ok(Some(RawFrame {
            width,
            height,
            layout: self.layout,
            data,
        }))
    }
}
