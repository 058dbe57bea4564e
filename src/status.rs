//! Frame-rate counter and status telemetry.
//!
//! Tracks a rolling window of frame intervals for fps reporting, plus
//! session counters for IPC status queries.

use std::time::{Duration, Instant};

use crate::gesture::GestureType;

/// Rolling frame interval window.
#[derive(Debug)]
pub struct FrameRate {
    /// Recent frame intervals in milliseconds.
    pub intervals: Vec<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    last: Option<Instant>,
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(30)
    }
}

impl FrameRate {
    pub fn new(window_size: usize) -> Self {
        Self {
            intervals: Vec::with_capacity(window_size),
            window_size: window_size.max(1),
            last: None,
        }
    }

    /// Record a frame arriving at `now`.  The first tick only sets the
    /// reference point.
    pub fn tick_at(&mut self, now: Instant) {
        if let Some(last) = self.last {
            let dt = now.saturating_duration_since(last);
            self.push_interval(dt);
        }
        self.last = Some(now);
    }

    fn push_interval(&mut self, dt: Duration) {
        self.intervals.push(dt.as_secs_f64() * 1000.0);
        if self.intervals.len() > self.window_size {
            self.intervals.remove(0);
        }
    }

    /// Mean frames per second over the window; 0 with fewer than two ticks.
    pub fn fps(&self) -> f64 {
        if self.intervals.is_empty() {
            return 0.0;
        }
        let mean = self.intervals.iter().sum::<f64>() / self.intervals.len() as f64;
        if mean <= 0.0 {
            0.0
        } else {
            1000.0 / mean
        }
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
        self.last = None;
    }
}

// ── Status ─────────────────────────────────────────────────

/// Session counters reported over IPC.
#[derive(Debug, Default)]
pub struct Status {
    pub gesture: GestureType,
    pub frame_rate: FrameRate,
    /// Frames processed.
    pub frames: u64,
    /// Frames that carried a valid hand.
    pub hand_frames: u64,
    /// Commands the sink rejected.
    pub sink_errors: u64,
    /// Commands emitted by the mapper.
    pub commands: u64,
}

impl Status {
    /// Fold one processed frame into the counters.
    pub fn record(&mut self, now: Instant, gesture: GestureType, had_hand: bool, emitted: usize, failed: usize) {
        self.frame_rate.tick_at(now);
        self.gesture = gesture;
        self.frames += 1;
        if had_hand {
            self.hand_frames += 1;
        }
        self.commands += emitted as u64;
        self.sink_errors += failed as u64;
    }

    /// Generate s-expression for IPC.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:gesture :{} :fps {:.1} :frames {} :hand-frames {} :commands {} :sink-errors {})",
            self.gesture.as_str(),
            self.frame_rate.fps(),
            self.frames,
            self.hand_frames,
            self.commands,
            self.sink_errors,
        )
    }
}
