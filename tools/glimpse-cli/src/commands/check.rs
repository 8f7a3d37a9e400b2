//! Probe capture support on the selected backend.

use glimpse_capture_engine::backend::get_backend;
use glimpse_capture_engine::{CapabilityBinding, CapabilityResolver, FrameScaler, ScaleResult};
use glimpse_common::config::{AppConfig, HEADER_SIZE};
use glimpse_platform_core::{payload_len, CaptureRequest, DisplayMetrics};
use serde::Serialize;

#[derive(Serialize)]
struct CheckReport {
    backend: String,
    binding: CapabilityBinding,
    probes: usize,
    display: Option<DisplayMetrics>,
    target: Option<ScaleResult>,
    frame_bytes: Option<usize>,
    region_capacity: usize,
}

impl CheckReport {
    fn fits(&self) -> Option<bool> {
        self.frame_bytes.map(|n| n <= self.region_capacity)
    }
}

pub fn run(config: AppConfig, json: bool) -> anyhow::Result<()> {
    config.validate()?;

    let mut platform = get_backend(&config)?;
    let mut resolver = CapabilityResolver::new(CaptureRequest::sized(
        config.capture.fallback_width,
        config.capture.fallback_height,
    ));
    let binding = resolver.resolve(platform.as_ref());

    let display = match resolver.call_for(CaptureRequest::NATURAL) {
        Some(call) => match platform.screenshot(&call) {
            Ok(Some(raw)) => DisplayMetrics::new(raw.width, raw.height),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Natural-size capture failed");
                None
            }
        },
        None => None,
    };
    let target = display.map(|m| FrameScaler::new(config.capture.short_side_target).compute_target(m));

    let report = CheckReport {
        backend: platform.name().to_string(),
        binding,
        probes: resolver.probe_count(),
        display,
        target,
        frame_bytes: target.map(|t| HEADER_SIZE + payload_len(t.target_width, t.target_height)),
        region_capacity: config.region.capacity,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Glimpse capture check");
    println!("=====================");
    println!("  Backend: {}", report.backend);
    match report.binding {
        CapabilityBinding::Bound(bound) => {
            println!("  Shape: {} ({} args)", bound.shape, bound.shape.arity());
            if let Some(token) = bound.display {
                println!("  Display token: {:#x}", token.0);
            }
        }
        CapabilityBinding::Failed => println!("  Shape: none available"),
        CapabilityBinding::Unbound => println!("  Shape: not probed"),
    }
    println!("  Probes: {}", report.probes);

    match report.display {
        Some(m) => println!("  Display: {}x{}", m.real_width, m.real_height),
        None => println!("  Display: unknown"),
    }
    if let Some(t) = report.target {
        println!(
            "  Published frame: {}x{} (scale {:.3})",
            t.target_width, t.target_height, t.scale
        );
    }
    match (report.frame_bytes, report.fits()) {
        (Some(bytes), Some(true)) => println!(
            "  Region: OK ({} of {} bytes)",
            bytes, report.region_capacity
        ),
        (Some(bytes), _) => println!(
            "  Region: WARN frame needs {} bytes, region holds {}",
            bytes, report.region_capacity
        ),
        _ => println!("  Region: {} bytes", report.region_capacity),
    }

    if matches!(report.binding, CapabilityBinding::Failed) {
        anyhow::bail!("no supported capture shape on backend '{}'", report.backend);
    }
    Ok(())
}
