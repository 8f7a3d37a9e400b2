//! Pixel buffers as delivered by the platform and as published.

use glimpse_common::error::{GlimpseError, GlimpseResult};

/// Bytes per pixel in every buffer the core handles.
pub const BYTES_PER_PIXEL: usize = 4;

/// Memory layout of a captured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// R, G, B, A bytes; the published format.
    Rgba8888,
    /// B, G, R, A bytes; swizzled by the core.
    Bgra8888,
    /// Platform-internal (e.g. GPU-backed) memory the adapter must convert.
    Device,
}

/// A frame exactly as the platform returned it.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

/// Row-major RGBA pixels ready to publish. `data.len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Payload size in bytes of a `width x height` frame.
pub fn payload_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

impl FrameBuffer {
    /// Wrap RGBA pixels, checking the buffer length against the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> GlimpseResult<Self> {
        let expected = payload_len(width, height);
        if width == 0 || height == 0 {
            return Err(GlimpseError::frame_layout(format!(
                "empty frame {width}x{height}"
            )));
        }
        if data.len() != expected {
            return Err(GlimpseError::frame_layout(format!(
                "{width}x{height} frame needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}

impl RawFrame {
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout: PixelLayout::Rgba8888,
            data,
        }
    }

    /// Convert layouts the core understands. `Device` frames are rejected;
    /// only the adapter that produced them can read them back.
    pub fn into_portable(self) -> GlimpseResult<FrameBuffer> {
        match self.layout {
            PixelLayout::Rgba8888 => FrameBuffer::from_rgba(self.width, self.height, self.data),
            PixelLayout::Bgra8888 => {
                let mut data = self.data;
                for px in data.chunks_exact_mut(BYTES_PER_PIXEL) {
                    px.swap(0, 2);
                }
                FrameBuffer::from_rgba(self.width, self.height, data)
            }
            PixelLayout::Device => Err(GlimpseError::frame_layout(
                "device-layout frame reached the core without platform conversion",
            )),
        }
    }
}
