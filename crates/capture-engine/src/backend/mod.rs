use glimpse_common::config::{AppConfig, BackendKind};
use glimpse_common::error::GlimpseResult;
use glimpse_platform_core::CapturePlatform;

pub mod synthetic;
#[cfg(feature = "desktop")]
pub mod desktop;

pub use synthetic::SyntheticPlatform;
#[cfg(feature = "desktop")]
pub use desktop::DesktopPlatform;

/// Natural size of the synthetic display (a common 20:9 phone panel).
pub const SYNTHETIC_NATURAL_SIZE: (u32, u32) = (1080, 2400);

/// Build the capture adapter selected in `config`.
pub fn get_backend(config: &AppConfig) -> GlimpseResult<Box<dyn CapturePlatform>> {
    match config.capture.backend {
        BackendKind::Synthetic => {
            let (w, h) = SYNTHETIC_NATURAL_SIZE;
            Ok(Box::new(SyntheticPlatform::new(w, h)))
        }
        #[cfg(feature = "desktop")]
        BackendKind::Desktop => Ok(Box::new(DesktopPlatform::primary()?)),
        #[cfg(not(feature = "desktop"))]
        BackendKind::Desktop => Err(glimpse_common::error::GlimpseError::unsupported(
            "desktop capture backend requires building with --features desktop",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_is_the_default_backend() {
        let backend = get_backend(&AppConfig::default()).unwrap();
        assert_eq!(backend.name(), "synthetic");
    }
}
