//! Glimpse Capture Engine
//!
//! Grabs frames from a platform screenshot primitive, scales them to a fixed
//! short side, and hands them to a consumer process through a shared
//! memory-mapped region, one signal byte per frame.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────── CaptureLoop ─────────────────────────┐
//! │ CapabilityResolver ─► CapturePlatform (adapter, external)     │
//! │        │                       │ RawFrame                     │
//! │   FrameScaler                  ▼                              │
//! │        └──────────► SharedRegionPublisher ─► SignalChannel    │
//! │                                │                  │           │
//! │                          FramePacer (30ms)        │           │
//! └────────────────────────────────┼──────────────────┼───────────┘
//!                                  ▼                  ▼
//!                     /data/local/tmp/screen_buffer.raw   stdout
//!
//!  Watchdog: stdin byte / EOF ──► process exit
//! ```

pub mod backend;
pub mod capture_loop;
pub mod region;
pub mod resolver;
pub mod scaler;
pub mod signal;
pub mod watchdog;

pub use capture_loop::{CaptureLoop, IterationOutcome, LoopSettings, LoopState, LoopStats};
pub use region::{provision, read_frame, FrameHeader, RegionSnapshot, SharedRegion, SharedRegionPublisher};
pub use resolver::{BoundShape, CapabilityBinding, CapabilityResolver};
pub use scaler::{FrameScaler, ScaleResult, SHORT_SIDE_TARGET};
pub use signal::SignalChannel;
pub use watchdog::{Watchdog, WatchdogTrigger};
