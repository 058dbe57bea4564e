//! Virtual joystick for scroll and volume modes.
//!
//! The origin is anchored on the first frame of a mode session and stays
//! fixed until cleared; each later frame reports the hand's offset from
//! it.  Output scales with displacement, not velocity.

use tracing::debug;

/// Anchored joystick centre.
#[derive(Debug, Clone, Default)]
pub struct VirtualJoystick {
    origin: Option<(f32, f32)>,
}

impl VirtualJoystick {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor on the first call of a session (returning `None`), otherwise
    /// return `(dx, dy)` relative to the anchored origin.
    pub fn offset(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        match self.origin {
            Some((ox, oy)) => Some((x - ox, y - oy)),
            None => {
                debug!("Joystick anchored at ({:.3}, {:.3})", x, y);
                self.origin = Some((x, y));
                None
            }
        }
    }

    pub fn origin(&self) -> Option<(f32, f32)> {
        self.origin
    }

    pub fn is_anchored(&self) -> bool {
        self.origin.is_some()
    }

    /// Forget the origin so the next session re-anchors.
    pub fn clear(&mut self) {
        self.origin = None;
    }
}

// ── Hysteresis latch ───────────────────────────────────────

/// Fire-once latch with asymmetric set/clear thresholds.
///
/// Fires when the value drops below `-trigger`; re-arms only once the
/// value rises above `-trigger * release_ratio`.
#[derive(Debug, Clone)]
pub struct HysteresisLatch {
    latched: bool,
    release_ratio: f32,
}

impl HysteresisLatch {
    pub fn new(release_ratio: f32) -> Self {
        Self {
            latched: false,
            release_ratio,
        }
    }

    /// Feed one sample; returns true on the frame the latch fires.
    pub fn update(&mut self, value: f32, trigger: f32) -> bool {
        if value < -trigger {
            if !self.latched {
                self.latched = true;
                return true;
            }
        } else if value > -trigger * self.release_ratio {
            self.latched = false;
        }
        false
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn clear(&mut self) {
        self.latched = false;
    }
}

impl Default for HysteresisLatch {
    fn default() -> Self {
        Self::new(0.5)
    }
}
