//! The producer loop: capture, scale, publish, signal, pace.
//!
//! ```text
//! ┌──────────── one iteration ─────────────────────────────────┐
//! │ metrics known? ──no──► natural-size capture ──none──► 1s   │
//! │      │ yes                                                 │
//! │      ▼                                                     │
//! │ FrameScaler ─► capture(target) ──none──► 100ms back-off    │
//! │                    │ frame                                 │
//! │                    ▼                                       │
//! │ to_portable ─► publish ─► signal ─► pace(30ms)             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Back-offs do not consume a pacing slot. Anything that fails after a
//! frame was obtained ends the loop.

use std::io::Write;
use std::time::Duration;

use glimpse_common::clock::FramePacer;
use glimpse_common::config::{AppConfig, HeaderByteOrder};
use glimpse_common::error::{GlimpseError, GlimpseResult};
use glimpse_platform_core::{CaptureRequest, CaptureShape, CapturePlatform, DisplayMetrics, RawFrame};
use tokio::time::Instant;

use crate::region::{SharedRegion, SharedRegionPublisher};
use crate::resolver::{CapabilityBinding, CapabilityResolver};
use crate::scaler::{FrameScaler, ScaleResult};
use crate::signal::SignalChannel;

/// Timing and protocol knobs for one loop.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub frame_interval: Duration,
    pub capture_retry: Duration,
    pub metrics_retry: Duration,
    pub short_side_target: u32,
    pub fallback: CaptureRequest,
    pub byte_order: HeaderByteOrder,
    pub signal_byte: u8,
}

impl LoopSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            frame_interval: config.pacing.frame_interval(),
            capture_retry: config.pacing.capture_retry(),
            metrics_retry: config.pacing.metrics_retry(),
            short_side_target: config.capture.short_side_target,
            fallback: CaptureRequest::sized(
                config.capture.fallback_width,
                config.capture.fallback_height,
            ),
            byte_order: config.region.byte_order,
            signal_byte: config.signal.byte,
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Counters kept across iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames_published: u64,
    pub capture_misses: u64,
    pub metrics_misses: u64,
}

/// State that lives for the whole process: display size and binding.
#[derive(Debug, Clone)]
pub struct LoopState {
    pub metrics: Option<DisplayMetrics>,
    pub resolver: CapabilityResolver,
    pub stats: LoopStats,
}

/// What a single iteration did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IterationOutcome {
    /// A frame went out and a signal byte followed it.
    Published(ScaleResult),
    /// The natural display size is still unknown; backed off.
    MetricsUnavailable,
    /// The scaled capture produced nothing; backed off.
    NoFrame,
}

pub struct CaptureLoop<P, R, W> {
    platform: P,
    publisher: SharedRegionPublisher<R>,
    signal: SignalChannel<W>,
    scaler: FrameScaler,
    pacer: FramePacer,
    settings: LoopSettings,
    state: LoopState,
}

impl<P, W> CaptureLoop<P, SharedRegion, W>
where
    P: CapturePlatform,
    W: Write,
{
    /// Map the shared region and assemble a loop around it.
    ///
    /// Nothing is captured or signalled unless the region opens.
    pub fn bootstrap(config: &AppConfig, platform: P, signal_out: W) -> GlimpseResult<Self> {
        let region = SharedRegion::open(&config.region.path, config.region.capacity)?;
        Ok(Self::new(
            platform,
            region,
            signal_out,
            LoopSettings::from_config(config),
        ))
    }
}

impl<P, R, W> CaptureLoop<P, R, W>
where
    P: CapturePlatform,
    R: AsMut<[u8]>,
    W: Write,
{
    pub fn new(platform: P, region: R, signal_out: W, settings: LoopSettings) -> Self {
        Self {
            platform,
            publisher: SharedRegionPublisher::new(region, settings.byte_order),
            signal: SignalChannel::new(signal_out, settings.signal_byte),
            scaler: FrameScaler::new(settings.short_side_target),
            pacer: FramePacer::new(settings.frame_interval),
            state: LoopState {
                metrics: None,
                resolver: CapabilityResolver::new(settings.fallback),
                stats: LoopStats::default(),
            },
            settings,
        }
    }

    /// Run iterations until one fails fatally. Only returns with an error.
    pub async fn run(&mut self) -> GlimpseResult<()> {
        tracing::info!(
            platform = self.platform.name(),
            interval_ms = self.settings.frame_interval.as_millis() as u64,
            short_side = self.scaler.short_side_target(),
            "Capture loop started"
        );
        loop {
            if let Err(e) = self.step().await {
                tracing::error!(error = %e, stats = ?self.state.stats, "Capture loop stopped");
                return Err(e);
            }
        }
    }

    /// Perform one iteration, including its back-off or pacing sleep.
    pub async fn step(&mut self) -> GlimpseResult<IterationOutcome> {
        let started = Instant::now();

        let metrics = match self.state.metrics {
            Some(metrics) => metrics,
            None => match self.discover_metrics()? {
                Some(metrics) => metrics,
                None => {
                    self.state.stats.metrics_misses += 1;
                    tokio::time::sleep(self.settings.metrics_retry).await;
                    return Ok(IterationOutcome::MetricsUnavailable);
                }
            },
        };

        let target = self.scaler.compute_target(metrics);
        let raw = match self.capture(CaptureRequest::sized(
            target.target_width,
            target.target_height,
        ))? {
            Some(raw) => raw,
            None => {
                self.state.stats.capture_misses += 1;
                tokio::time::sleep(self.settings.capture_retry).await;
                return Ok(IterationOutcome::NoFrame);
            }
        };

        let frame = self.platform.to_portable(raw)?;
        self.publisher.publish(&frame, target.scale)?;
        self.signal.notify()?;
        self.state.stats.frames_published += 1;

        self.pacer.pace(started).await;
        Ok(IterationOutcome::Published(target))
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.state.stats
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn signal(&self) -> &SignalChannel<W> {
        &self.signal
    }

    pub fn publisher(&self) -> &SharedRegionPublisher<R> {
        &self.publisher
    }

    fn discover_metrics(&mut self) -> GlimpseResult<Option<DisplayMetrics>> {
        let Some(raw) = self.capture(CaptureRequest::NATURAL)? else {
            tracing::debug!("Natural-size capture returned no frame");
            return Ok(None);
        };
        let metrics = DisplayMetrics::new(raw.width, raw.height);
        match metrics {
            Some(m) => tracing::info!(
                real_width = m.real_width,
                real_height = m.real_height,
                "Display size resolved"
            ),
            None => tracing::warn!(
                width = raw.width,
                height = raw.height,
                "Natural-size capture had an empty dimension"
            ),
        }
        self.state.metrics = metrics;
        Ok(metrics)
    }

    /// Capture through the bound shape. Any screenshot failure is a miss
    /// (`Ok(None)`); an exhausted binding is an error.
    fn capture(&mut self, request: CaptureRequest) -> GlimpseResult<Option<RawFrame>> {
        if let CapabilityBinding::Failed = self.state.resolver.resolve(&self.platform) {
            let probed = CaptureShape::PROBE_ORDER
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(GlimpseError::CapabilityExhausted { probed });
        }
        let Some(call) = self.state.resolver.call_for(request) else {
            return Ok(None);
        };

        match self.platform.screenshot(&call) {
            Ok(frame) => Ok(frame),
            Err(e) => {
                tracing::debug!(error = %e, shape = %call.shape(), "Capture failed; will retry");
                Ok(None)
            }
        }
    }
}
