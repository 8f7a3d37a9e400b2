//! Decode the frame header currently in the shared region.

use glimpse_capture_engine::{FrameHeader, RegionSnapshot};
use glimpse_common::config::AppConfig;
use serde::Serialize;

#[derive(Serialize)]
struct InspectReport {
    path: String,
    capacity: usize,
    header: FrameHeader,
    payload_bytes: usize,
    mapped: Option<MappedPoint>,
}

#[derive(Serialize)]
struct MappedPoint {
    scaled: (i32, i32),
    real: (i32, i32),
}

pub fn run(config: AppConfig, point: Option<(i32, i32)>, json: bool) -> anyhow::Result<()> {
    let path = &config.region.path;
    let snapshot = RegionSnapshot::open(path)?;
    let (header, payload) = snapshot.frame(config.region.byte_order)?;

    let report = InspectReport {
        path: path.display().to_string(),
        capacity: snapshot.capacity(),
        header,
        payload_bytes: payload.len(),
        mapped: point.map(|(x, y)| MappedPoint {
            scaled: (x, y),
            real: header.to_real(x, y),
        }),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Shared region: {}", report.path);
    println!("  Capacity: {} bytes", report.capacity);
    if report.header.width == 0 || report.header.height == 0 {
        println!("  No frame published yet");
        return Ok(());
    }
    println!(
        "  Frame: {}x{} (scale {:.3})",
        report.header.width, report.header.height, report.header.scale
    );
    println!("  Payload: {} bytes", report.payload_bytes);
    if let Some(m) = report.mapped {
        println!(
            "  ({}, {}) -> ({}, {}) on the real display",
            m.scaled.0, m.scaled.1, m.real.0, m.real.1
        );
    }
    Ok(())
}
