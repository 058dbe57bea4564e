//! Line-driven frame loop.
//!
//! A reader thread feeds input lines into a channel; the loop polls it
//! with a timeout so a shutdown request is noticed even while the input
//! stream is open and idle.  Held buttons are released on every exit path.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::device::DeviceSink;
use crate::ipc;
use crate::pipeline::Pipeline;

/// How long one poll waits for input before re-checking shutdown.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    EndOfInput,
    Shutdown,
    FrameLimit,
    ReadError,
}

impl LoopExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndOfInput => "end-of-input",
            Self::Shutdown => "shutdown",
            Self::FrameLimit => "frame-limit",
            Self::ReadError => "read-error",
        }
    }
}

/// Read lines on a background thread.  The channel disconnects at EOF.
pub fn spawn_reader<R>(reader: R) -> anyhow::Result<Receiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("handpilot-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
            debug!("input reader finished");
        })
        .context("failed to spawn input reader")?;
    Ok(rx)
}

/// Drive the pipeline until EOF, a read error, the frame limit, or
/// `shutdown` is set, writing one response line per message to `out`.
pub fn run(
    lines: &Receiver<io::Result<String>>,
    shutdown: &AtomicBool,
    pipeline: &mut Pipeline,
    sink: &mut dyn DeviceSink,
    out: &mut dyn Write,
    max_frames: Option<u64>,
) -> anyhow::Result<LoopExit> {
    let result = poll_lines(lines, shutdown, pipeline, sink, out, max_frames);

    // Never leave a button held on exit
    let (released, report) = pipeline.reset(sink);
    if !report.is_clean() {
        warn!(
            "{} of {} button releases failed on exit",
            report.failed.len(),
            released.len()
        );
    }
    info!(
        "loop stopped ({}): {} frames, {} released on exit",
        result.as_ref().map(LoopExit::as_str).unwrap_or("error"),
        pipeline.status.frames,
        released.len()
    );
    result
}

fn poll_lines(
    lines: &Receiver<io::Result<String>>,
    shutdown: &AtomicBool,
    pipeline: &mut Pipeline,
    sink: &mut dyn DeviceSink,
    out: &mut dyn Write,
    max_frames: Option<u64>,
) -> anyhow::Result<LoopExit> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            info!("Shutdown signal received, exiting");
            return Ok(LoopExit::Shutdown);
        }

        let line = match lines.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(line)) => line,
            Ok(Err(e)) => {
                warn!("input read failed: {}", e);
                return Ok(LoopExit::ReadError);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(LoopExit::EndOfInput),
        };

        if let Some(response) = ipc::handle_message(pipeline, sink, &line) {
            writeln!(out, "{}", response).context("failed to write response")?;
            out.flush().context("failed to flush output")?;
        }

        if let Some(max) = max_frames {
            if pipeline.status.frames >= max {
                info!("Frame limit reached after {} frames", max);
                return Ok(LoopExit::FrameLimit);
            }
        }
    }
}
