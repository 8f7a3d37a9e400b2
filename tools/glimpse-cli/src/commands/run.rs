//! Run the frame producer.
//!
//! stdout carries signal bytes only; every diagnostic goes to stderr.

use glimpse_capture_engine::backend::get_backend;
use glimpse_capture_engine::{CaptureLoop, Watchdog};
use glimpse_common::config::AppConfig;

pub async fn run(config: AppConfig, watchdog: bool) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!(
        region = %config.region.path.display(),
        backend = %config.capture.backend,
        byte_order = ?config.region.byte_order,
        ">>> glimpse producer (mmap + auto scale) started <<<"
    );

    if watchdog {
        let _watchdog = Watchdog::spawn(std::io::stdin(), |trigger| {
            tracing::info!(?trigger, "Companion input closed; exiting");
            std::process::exit(0);
        })?;
    }

    let platform = get_backend(&config)?;
    let mut producer = match CaptureLoop::bootstrap(&config, platform, std::io::stdout()) {
        Ok(producer) => producer,
        Err(e) => {
            tracing::error!("Fatal: failed to open shared region: {e}");
            return Err(e.into());
        }
    };

    producer.run().await?;
    Ok(())
}
