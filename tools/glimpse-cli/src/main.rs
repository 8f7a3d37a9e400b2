//! Glimpse CLI: frame producer and shared-region tooling.
//!
//! Usage:
//!   glimpse run [OPTIONS]          Start producing frames (signal bytes on stdout)
//!   glimpse check                  Probe capture support on the selected backend
//!   glimpse init-region            Create the shared region file
//!   glimpse inspect                Decode the frame currently in the region

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use glimpse_common::config::{AppConfig, BackendKind, HeaderByteOrder};

mod commands;

#[derive(Parser)]
#[command(
    name = "glimpse",
    about = "Screen capture producer publishing scaled frames over shared memory",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON (always on stderr)
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/glimpse/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Shared region file
    #[arg(long, global = true)]
    region: Option<PathBuf>,

    /// Header byte order
    #[arg(long, global = true, value_enum)]
    byte_order: Option<ByteOrderArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the frame producer until the companion closes stdin
    Run {
        /// Capture backend: synthetic | desktop
        #[arg(long)]
        backend: Option<BackendKind>,

        /// Minimum time per published frame (ms)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Keep running when stdin closes (for interactive use)
        #[arg(long)]
        no_watchdog: bool,
    },

    /// Probe which capture shape the backend exposes
    Check {
        /// Capture backend: synthetic | desktop
        #[arg(long)]
        backend: Option<BackendKind>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create (or reset) the shared region file
    InitRegion {
        /// Region size in bytes
        #[arg(long)]
        capacity: Option<usize>,
    },

    /// Decode the frame header currently in the shared region
    Inspect {
        /// Map a published-frame point back to real display pixels
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        map: Option<Vec<i32>>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ByteOrderArg {
    Big,
    Little,
}

impl From<ByteOrderArg> for HeaderByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Big => HeaderByteOrder::Big,
            ByteOrderArg::Little => HeaderByteOrder::Little,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    if let Some(region) = cli.region {
        config.region.path = region;
    }
    if let Some(order) = cli.byte_order {
        config.region.byte_order = order.into();
    }

    // Initialize logging
    glimpse_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Run {
            backend,
            interval_ms,
            no_watchdog,
        } => {
            if let Some(backend) = backend {
                config.capture.backend = backend;
            }
            if let Some(ms) = interval_ms {
                config.pacing.frame_interval_ms = ms;
            }
            commands::run::run(config, !no_watchdog).await
        }
        Commands::Check { backend, json } => {
            if let Some(backend) = backend {
                config.capture.backend = backend;
            }
            commands::check::run(config, json)
        }
        Commands::InitRegion { capacity } => {
            if let Some(capacity) = capacity {
                config.region.capacity = capacity;
            }
            commands::init_region::run(config)
        }
        Commands::Inspect { map, json } => {
            let point = map.and_then(|v| match v.as_slice() {
                [x, y] => Some((*x, *y)),
                _ => None,
            });
            commands::inspect::run(config, point, json)
        }
    }
}
