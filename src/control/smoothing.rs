//! Exponential moving average over a 2D position stream.
//!
//! Smaller factors smooth harder at the cost of lag.  The first sample
//! after construction or `reset()` passes through unchanged.

/// EMA filter for cursor anchor positions.
#[derive(Debug, Clone)]
pub struct Smoother {
    /// Weight of the newest sample, in [0, 1].
    factor: f32,
    /// Last smoothed output; `None` until seeded.
    state: Option<(f32, f32)>,
}

impl Smoother {
    pub fn new(factor: f32) -> Self {
        Self {
            factor: clamp_factor(factor),
            state: None,
        }
    }

    /// Filter one sample.
    pub fn smooth(&mut self, x: f32, y: f32) -> (f32, f32) {
        let out = match self.state {
            None => (x, y),
            Some((sx, sy)) => (
                self.factor * x + (1.0 - self.factor) * sx,
                self.factor * y + (1.0 - self.factor) * sy,
            ),
        };
        self.state = Some(out);
        out
    }

    /// Drop history so the next sample re-seeds the filter.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Change the factor; takes effect on the next `smooth` call.
    pub fn update_factor(&mut self, factor: f32) {
        self.factor = clamp_factor(factor);
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn is_seeded(&self) -> bool {
        self.state.is_some()
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(0.2)
    }
}

fn clamp_factor(factor: f32) -> f32 {
    if factor.is_nan() {
        return 1.0;
    }
    factor.clamp(0.0, 1.0)
}
