//! Capture call shapes and the arguments each one takes.

use serde::{Deserialize, Serialize};

/// One call signature the platform screenshot primitive may expose.
///
/// Which shapes exist depends on the platform version; at most one is bound
/// per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureShape {
    /// `(crop, width, height, rotation)`
    FourArg,
    /// `(width, height)`; cannot express "natural size".
    TwoArg,
    /// `(display, width, height)`
    ThreeArg,
}

impl CaptureShape {
    /// Probe order. The first shape the platform confirms wins.
    pub const PROBE_ORDER: [CaptureShape; 3] = [
        CaptureShape::FourArg,
        CaptureShape::TwoArg,
        CaptureShape::ThreeArg,
    ];

    /// Number of arguments the shape takes.
    pub fn arity(self) -> usize {
        match self {
            CaptureShape::FourArg => 4,
            CaptureShape::TwoArg => 2,
            CaptureShape::ThreeArg => 3,
        }
    }
}

impl std::fmt::Display for CaptureShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureShape::FourArg => write!(f, "four_arg"),
            CaptureShape::TwoArg => write!(f, "two_arg"),
            CaptureShape::ThreeArg => write!(f, "three_arg"),
        }
    }
}

/// Where a display handle can be obtained from, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Token of the internal (built-in panel) display.
    InternalDisplay,
    /// Legacy lookup of built-in display number 0.
    BuiltInDisplayZero,
}

impl TokenSource {
    pub const LOOKUP_ORDER: [TokenSource; 2] =
        [TokenSource::InternalDisplay, TokenSource::BuiltInDisplayZero];
}

/// Opaque display handle, meaningful only to the adapter that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayToken(pub u64);

/// Requested output size. `0 x 0` asks for the display's natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureRequest {
    pub width: u32,
    pub height: u32,
}

impl CaptureRequest {
    /// Capture at whatever size the display reports.
    pub const NATURAL: CaptureRequest = CaptureRequest {
        width: 0,
        height: 0,
    };

    pub fn sized(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_natural(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Empty source crop, meaning "the whole display".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CropRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CropRect {
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// A fully-argumented invocation of one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeCall {
    FourArg {
        crop: CropRect,
        width: u32,
        height: u32,
        rotation: u32,
    },
    TwoArg {
        width: u32,
        height: u32,
    },
    ThreeArg {
        display: Option<DisplayToken>,
        width: u32,
        height: u32,
    },
}

impl ShapeCall {
    pub fn shape(&self) -> CaptureShape {
        match self {
            ShapeCall::FourArg { .. } => CaptureShape::FourArg,
            ShapeCall::TwoArg { .. } => CaptureShape::TwoArg,
            ShapeCall::ThreeArg { .. } => CaptureShape::ThreeArg,
        }
    }

    /// Requested `(width, height)`; zeros mean natural size.
    pub fn size(&self) -> (u32, u32) {
        match *self {
            ShapeCall::FourArg { width, height, .. }
            | ShapeCall::TwoArg { width, height }
            | ShapeCall::ThreeArg { width, height, .. } => (width, height),
        }
    }
}
