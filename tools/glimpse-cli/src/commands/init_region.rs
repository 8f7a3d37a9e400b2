//! Create the shared region file.

use glimpse_capture_engine::provision;
use glimpse_common::config::AppConfig;

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    let path = &config.region.path;

    provision(path, config.region.capacity)
        .map_err(|e| anyhow::anyhow!("Failed to provision shared region: {e}"))?;

    println!("Shared region ready:");
    println!("  Path: {}", path.display());
    println!(
        "  Capacity: {} bytes ({:.1} MiB)",
        config.region.capacity,
        config.region.capacity as f64 / (1024.0 * 1024.0)
    );
    println!("  Byte order: {:?}", config.region.byte_order);

    Ok(())
}
