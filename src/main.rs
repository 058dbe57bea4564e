//! handpilot - hand-gesture mouse, scroll and volume controller.
//!
//! Reads one s-expression message per line (landmark frames, parameter
//! updates, queries) from stdin or a file and writes one response per
//! message to stdout.  Logs go to stderr.  SIGINT/SIGTERM stop the loop
//! and release any held button, even while input is idle.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use handpilot::config::{ConfigHandle, ControlConfig};
use handpilot::device::LoggingSink;
use handpilot::driver;
use handpilot::pipeline::Pipeline;

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(name = "handpilot", about = "Hand-gesture pointer, scroll and volume control")]
struct Cli {
    /// Read messages from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Initial parameters as an s-expression plist file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after N frame messages
    #[arg(long)]
    max_frames: Option<u64>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("handpilot {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handpilot=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("handpilot v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => ControlConfig::load(path)?,
        None => ControlConfig::default(),
    };
    let handle = ConfigHandle::new(config);
    let mut pipeline = Pipeline::new(handle);
    let mut sink = LoggingSink::default();

    let reader: Box<dyn BufRead + Send> = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            info!("reading frames from {}", path.display());
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    // Signal handling via libc; the driver polls the flag between reads
    install_signal_handlers();
    let lines = driver::spawn_reader(reader)?;

    let mut out = io::stdout().lock();
    driver::run(
        &lines,
        &SHUTDOWN_REQUESTED,
        &mut pipeline,
        &mut sink,
        &mut out,
        cli.max_frames,
    )?;

    info!(
        "handpilot exiting: {} frames, {} commands sent",
        pipeline.status.frames, sink.sent
    );
    Ok(())
}
