//! Ballistic pointer acceleration.
//!
//! Displacements below the move threshold are dropped as sensor noise.
//! Above the acceleration threshold the gain grows linearly with speed,
//! capped at three times the base sensitivity.

use crate::config::ControlConfig;

/// Maximum gain as a multiple of the base sensitivity.
pub const MAX_GAIN_MULTIPLIER: f32 = 3.0;

/// Dead-zone + acceleration curve, snapshotted from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionAccelerator {
    /// Base gain (normalized units to pixels).
    pub sensitivity: f32,
    /// Displacement magnitude below which motion is ignored.
    pub move_threshold: f32,
    /// Magnitude above which gain starts to grow.
    pub accel_threshold: f32,
    /// Slope of the gain growth.
    pub accel_factor: f32,
}

impl MotionAccelerator {
    pub fn from_config(config: &ControlConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            move_threshold: config.move_threshold,
            accel_threshold: config.acceleration_threshold,
            accel_factor: config.acceleration_factor,
        }
    }

    /// Gain for a displacement of the given magnitude (ignores the dead-zone).
    pub fn gain(&self, magnitude: f32) -> f32 {
        let gain = if self.accel_threshold > 0.0 && magnitude > self.accel_threshold {
            self.sensitivity * (1.0 + (magnitude / self.accel_threshold) * self.accel_factor)
        } else {
            self.sensitivity
        };
        gain.min(self.sensitivity * MAX_GAIN_MULTIPLIER)
    }

    /// Scale a raw displacement into a device-motion delta.
    pub fn accelerate(&self, dx: f32, dy: f32) -> (f32, f32) {
        let magnitude = (dx * dx + dy * dy).sqrt();
        if magnitude < self.move_threshold {
            return (0.0, 0.0);
        }
        let gain = self.gain(magnitude);
        (dx * gain, dy * gain)
    }
}

impl Default for MotionAccelerator {
    fn default() -> Self {
        Self::from_config(&ControlConfig::default())
    }
}
