//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GlimpseError, GlimpseResult};

/// Well-known location of the shared frame file.
pub const DEFAULT_REGION_PATH: &str = "/data/local/tmp/screen_buffer.raw";

/// Fixed capacity of the shared region (4 MiB).
pub const DEFAULT_REGION_CAPACITY: usize = 4 * 1024 * 1024;

/// Header size in bytes: width, height, scale.
pub const HEADER_SIZE: usize = 12;

/// Value written to the signal stream once per published frame.
pub const DEFAULT_SIGNAL_BYTE: u8 = 0xAA;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shared region settings.
    pub region: RegionConfig,

    /// Capture and scaling settings.
    pub capture: CaptureConfig,

    /// Loop pacing and back-off settings.
    pub pacing: PacingConfig,

    /// Signal stream settings.
    pub signal: SignalConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Byte order of the 12-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeaderByteOrder {
    /// Network order; what the existing consumer decodes.
    #[default]
    Big,
    Little,
}

/// Shared region parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Path of the memory-mapped file.
    pub path: PathBuf,

    /// Mapped size in bytes.
    pub capacity: usize,

    /// Header byte order.
    pub byte_order: HeaderByteOrder,
}

/// Which capture adapter drives the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Deterministic test pattern, available everywhere.
    #[default]
    Synthetic,
    /// Primary desktop monitor (requires the `desktop` feature).
    Desktop,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Synthetic => write!(f, "synthetic"),
            BackendKind::Desktop => write!(f, "desktop"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synthetic" => Ok(BackendKind::Synthetic),
            "desktop" => Ok(BackendKind::Desktop),
            _ => Err(format!("Unknown capture backend: {s}")),
        }
    }
}

/// Capture and scaling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Length the shorter output side is scaled to.
    pub short_side_target: u32,

    /// Size requested from the two-argument shape when no size was given.
    pub fallback_width: u32,
    pub fallback_height: u32,

    /// Capture adapter.
    pub backend: BackendKind,
}

/// Loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Minimum period of one publish iteration.
    pub frame_interval_ms: u64,

    /// Back-off after a capture returned no frame.
    pub capture_retry_ms: u64,

    /// Back-off after the natural display size could not be read.
    pub metrics_retry_ms: u64,
}

/// Signal stream parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Byte emitted per published frame.
    pub byte: u8,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "glimpse=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_REGION_PATH),
            capacity: DEFAULT_REGION_CAPACITY,
            byte_order: HeaderByteOrder::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            short_side_target: 540,
            fallback_width: 720,
            fallback_height: 1280,
            backend: BackendKind::default(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 30,
            capture_retry_ms: 100,
            metrics_retry_ms: 1000,
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            byte: DEFAULT_SIGNAL_BYTE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PacingConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn capture_retry(&self) -> Duration {
        Duration::from_millis(self.capture_retry_ms)
    }

    pub fn metrics_retry(&self) -> Duration {
        Duration::from_millis(self.metrics_retry_ms)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", path, e);
                }
            }
        }
        Self::default()
    }

    /// Reject settings the capture loop cannot run with.
    pub fn validate(&self) -> GlimpseResult<()> {
        if self.capture.short_side_target == 0 {
            return Err(GlimpseError::config("capture.short_side_target must be > 0"));
        }
        if self.capture.fallback_width == 0 || self.capture.fallback_height == 0 {
            return Err(GlimpseError::config("capture fallback size must be non-zero"));
        }
        if self.pacing.frame_interval_ms == 0
            || self.pacing.capture_retry_ms == 0
            || self.pacing.metrics_retry_ms == 0
        {
            return Err(GlimpseError::config("pacing intervals must be > 0 ms"));
        }
        if self.region.capacity <= HEADER_SIZE {
            return Err(GlimpseError::config(format!(
                "region.capacity must exceed the {HEADER_SIZE}-byte header"
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("glimpse").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wire_protocol() {
        let config = AppConfig::default();
        assert_eq!(config.region.capacity, 4 * 1024 * 1024);
        assert_eq!(config.region.byte_order, HeaderByteOrder::Big);
        assert_eq!(config.capture.short_side_target, 540);
        assert_eq!(config.pacing.frame_interval(), Duration::from_millis(30));
        assert_eq!(config.signal.byte, 0xAA);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "pacing": { "frame_interval_ms": 16 }, "region": { "byte_order": "little" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pacing.frame_interval_ms, 16);
        assert_eq!(config.pacing.capture_retry_ms, 100);
        assert_eq!(config.region.byte_order, HeaderByteOrder::Little);
        assert_eq!(config.region.path, PathBuf::from(DEFAULT_REGION_PATH));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = AppConfig::default();
        config.pacing.frame_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_falls_back_on_garbage() {
        let dir = std::env::temp_dir().join("glimpse_test_config_garbage");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.capture.short_side_target, 540);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_from_keeps_file_overrides() {
        let dir = std::env::temp_dir().join("glimpse_test_config_load");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{ "capture": { "backend": "desktop" }, "signal": { "byte": 85 } }"#,
        )
        .unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.capture.backend, BackendKind::Desktop);
        assert_eq!(loaded.signal.byte, 0x55);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn backend_kind_parses_case_insensitively() {
        assert_eq!("Desktop".parse::<BackendKind>(), Ok(BackendKind::Desktop));
        assert!("gdi".parse::<BackendKind>().is_err());
    }
}
