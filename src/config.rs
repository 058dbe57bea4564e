//! Runtime control parameters.
//!
//! `ControlConfig` is a plain value object passed by reference into each
//! frame.  `ConfigHandle` is the thread-safe hand-off used by a control
//! surface: writers clamp and store under a mutex, the frame loop takes
//! one snapshot at the start of each frame.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use lexpr::Value;
use tracing::{info, warn};

// ── Parameter table ────────────────────────────────────────

/// Clamp range for a named parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
}

/// Every recognized key with its allowed range.
pub const PARAM_RANGES: &[ParamRange] = &[
    ParamRange { name: "sensitivity", min: 200.0, max: 1500.0 },
    ParamRange { name: "smoothing-factor", min: 0.01, max: 1.0 },
    ParamRange { name: "scroll-speed", min: 1.0, max: 50.0 },
    ParamRange { name: "acceleration-factor", min: 0.5, max: 3.0 },
    ParamRange { name: "joystick-dead-zone", min: 0.01, max: 0.2 },
    ParamRange { name: "move-threshold", min: 0.0, max: 0.05 },
    ParamRange { name: "acceleration-threshold", min: 0.0005, max: 0.1 },
    ParamRange { name: "volume-trigger-threshold", min: 0.01, max: 0.5 },
    ParamRange { name: "mute-trigger-threshold", min: 0.01, max: 0.5 },
    ParamRange { name: "click-threshold", min: 0.0, max: 0.2 },
    ParamRange { name: "right-click-threshold", min: 0.0, max: 0.2 },
    ParamRange { name: "enable-mouse", min: 0.0, max: 1.0 },
    ParamRange { name: "enable-scroll", min: 0.0, max: 1.0 },
    ParamRange { name: "enable-volume", min: 0.0, max: 1.0 },
    ParamRange { name: "absolute-pointer", min: 0.0, max: 1.0 },
    ParamRange { name: "frame-margin", min: 0.0, max: 0.4 },
    ParamRange { name: "screen-width", min: 1.0, max: 16384.0 },
    ParamRange { name: "screen-height", min: 1.0, max: 16384.0 },
];

/// Look up the range for a key.
pub fn param_range(name: &str) -> Option<&'static ParamRange> {
    PARAM_RANGES.iter().find(|r| r.name == name)
}

// ── Config ─────────────────────────────────────────────────

/// Control parameters read by the pipeline every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Base pointer gain (normalized displacement to pixels).
    pub sensitivity: f32,
    /// EMA weight of the newest cursor sample.
    pub smoothing_factor: f32,
    /// Scroll units per unit of joystick offset.
    pub scroll_speed: f32,
    /// Gain slope above the acceleration threshold.
    pub acceleration_factor: f32,
    /// Joystick offset below which scroll mode does nothing.
    pub joystick_dead_zone: f32,
    /// Pointer displacement treated as noise.
    pub move_threshold: f32,
    /// Pointer displacement at which acceleration starts.
    pub acceleration_threshold: f32,
    /// Vertical joystick offset needed for a volume step.
    pub volume_trigger_threshold: f32,
    /// Leftward joystick offset needed to toggle mute.
    pub mute_trigger_threshold: f32,
    /// Thumb-index pinch distance (carried for presentation layers).
    pub click_threshold: f32,
    /// Thumb-middle pinch distance (carried for presentation layers).
    pub right_click_threshold: f32,
    pub enable_mouse: bool,
    pub enable_scroll: bool,
    pub enable_volume: bool,
    /// Emit absolute cursor positions instead of relative motion.
    pub absolute_pointer: bool,
    /// Fraction of the camera frame ignored on each edge in absolute mode.
    pub frame_margin: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            sensitivity: 800.0,
            smoothing_factor: 0.2,
            scroll_speed: 10.0,
            acceleration_factor: 1.5,
            joystick_dead_zone: 0.05,
            move_threshold: 0.001,
            acceleration_threshold: 0.005,
            volume_trigger_threshold: 0.05,
            mute_trigger_threshold: 0.15,
            click_threshold: 0.04,
            right_click_threshold: 0.04,
            enable_mouse: true,
            enable_scroll: true,
            enable_volume: true,
            absolute_pointer: false,
            frame_margin: 0.156,
            screen_width: 1920.0,
            screen_height: 1080.0,
        }
    }
}

impl ControlConfig {
    /// Set a parameter by name, clamping into its range.
    ///
    /// Returns false for unknown keys and non-finite values, which are
    /// ignored.
    pub fn set(&mut self, key: &str, value: f32) -> bool {
        let range = match param_range(key) {
            Some(r) => r,
            None => return false,
        };
        if !value.is_finite() {
            return false;
        }
        let v = value.clamp(range.min, range.max);
        match key {
            "sensitivity" => self.sensitivity = v,
            "smoothing-factor" => self.smoothing_factor = v,
            "scroll-speed" => self.scroll_speed = v,
            "acceleration-factor" => self.acceleration_factor = v,
            "joystick-dead-zone" => self.joystick_dead_zone = v,
            "move-threshold" => self.move_threshold = v,
            "acceleration-threshold" => self.acceleration_threshold = v,
            "volume-trigger-threshold" => self.volume_trigger_threshold = v,
            "mute-trigger-threshold" => self.mute_trigger_threshold = v,
            "click-threshold" => self.click_threshold = v,
            "right-click-threshold" => self.right_click_threshold = v,
            "enable-mouse" => self.enable_mouse = v >= 0.5,
            "enable-scroll" => self.enable_scroll = v >= 0.5,
            "enable-volume" => self.enable_volume = v >= 0.5,
            "absolute-pointer" => self.absolute_pointer = v >= 0.5,
            "frame-margin" => self.frame_margin = v,
            "screen-width" => self.screen_width = v,
            "screen-height" => self.screen_height = v,
            _ => return false,
        }
        true
    }

    /// Read a parameter by name.
    pub fn get(&self, key: &str) -> Option<f32> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let v = match key {
            "sensitivity" => self.sensitivity,
            "smoothing-factor" => self.smoothing_factor,
            "scroll-speed" => self.scroll_speed,
            "acceleration-factor" => self.acceleration_factor,
            "joystick-dead-zone" => self.joystick_dead_zone,
            "move-threshold" => self.move_threshold,
            "acceleration-threshold" => self.acceleration_threshold,
            "volume-trigger-threshold" => self.volume_trigger_threshold,
            "mute-trigger-threshold" => self.mute_trigger_threshold,
            "click-threshold" => self.click_threshold,
            "right-click-threshold" => self.right_click_threshold,
            "enable-mouse" => flag(self.enable_mouse),
            "enable-scroll" => flag(self.enable_scroll),
            "enable-volume" => flag(self.enable_volume),
            "absolute-pointer" => flag(self.absolute_pointer),
            "frame-margin" => self.frame_margin,
            "screen-width" => self.screen_width,
            "screen-height" => self.screen_height,
            _ => return None,
        };
        Some(v)
    }

    /// Apply every `:key value` pair of an s-expression plist.
    ///
    /// Returns the number of recognized keys applied.
    pub fn apply_plist(&mut self, value: &Value) -> usize {
        let mut applied = 0;
        let mut current = value;
        while let Value::Cons(pair) = current {
            let key = match pair.car() {
                Value::Keyword(k) => Some(k.to_string()),
                Value::Symbol(s) => s.strip_prefix(':').map(str::to_string),
                _ => None,
            };
            let rest = pair.cdr();
            let (val, next) = match rest {
                Value::Cons(next) => (next.car(), next.cdr()),
                _ => break,
            };
            if let Some(key) = key {
                match val.as_f64() {
                    Some(n) if self.set(&key, n as f32) => applied += 1,
                    _ => warn!("Config: ignoring parameter {} = {}", key, val),
                }
            }
            current = next;
        }
        applied
    }

    /// Load defaults overridden by a plist file such as
    /// `(:sensitivity 900 :scroll-speed 20)`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let value = lexpr::from_str(&text)
            .with_context(|| format!("malformed s-expression in {}", path.display()))?;
        let mut config = Self::default();
        let applied = config.apply_plist(&value);
        info!("Loaded {} parameters from {}", applied, path.display());
        Ok(config)
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        let mut s = String::from("(");
        for (i, range) in PARAM_RANGES.iter().enumerate() {
            if i > 0 {
                s.push(' ');
            }
            let v = self.get(range.name).unwrap_or(0.0);
            s.push_str(&format!(":{} {}", range.name, format_number(v)));
        }
        s.push(')');
        s
    }
}

/// Render without trailing zeros: `800`, `0.2`, `0.005`.
fn format_number(v: f32) -> String {
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

// ── Shared handle ──────────────────────────────────────────

/// Mutex-guarded config shared between a control surface and the frame loop.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<Mutex<ControlConfig>>,
}

impl ConfigHandle {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
        }
    }

    /// Clamp and store one parameter.  Returns false if the key was ignored.
    pub fn update(&self, key: &str, value: f32) -> bool {
        let mut config = self.lock();
        let applied = config.set(key, value);
        if applied {
            info!(
                "Config: {} = {}",
                key,
                config.get(key).map(format_number).unwrap_or_default()
            );
        } else {
            warn!("Config: ignoring unknown or invalid parameter {}", key);
        }
        applied
    }

    /// Copy of the current values, taken once per frame.
    pub fn snapshot(&self) -> ControlConfig {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControlConfig> {
        // Plain data: a poisoned lock still holds a consistent value.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ── Tests ──────────────────────────────────────────────────
