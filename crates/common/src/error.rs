//! Error types shared across Glimpse crates.

use std::path::PathBuf;

/// Top-level error type for Glimpse operations.
#[derive(Debug, thiserror::Error)]
pub enum GlimpseError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("No supported capture shape found (probed: {probed})")]
    CapabilityExhausted { probed: String },

    #[error("Shared region error at {path}: {message}")]
    SharedRegion { path: PathBuf, message: String },

    #[error("Frame needs {needed} bytes but the shared region holds {capacity}")]
    RegionOverflow { needed: usize, capacity: usize },

    #[error("Frame layout error: {message}")]
    FrameLayout { message: String },

    #[error("Signal channel error: {message}")]
    Signal { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using GlimpseError.
pub type GlimpseResult<T> = Result<T, GlimpseError>;

impl GlimpseError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn shared_region(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::SharedRegion {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn frame_layout(msg: impl Into<String>) -> Self {
        Self::FrameLayout {
            message: msg.into(),
        }
    }

    pub fn signal(msg: impl Into<String>) -> Self {
        Self::Signal {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_names_both_sizes() {
        let err = GlimpseError::RegionOverflow {
            needed: 4_194_316,
            capacity: 4_194_304,
        };
        let msg = err.to_string();
        assert!(msg.contains("4194316"));
        assert!(msg.contains("4194304"));
    }
}
