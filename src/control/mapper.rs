//! Gesture-to-device action mapping.
//!
//! `ActionMapper` owns all cross-frame session state: the cursor
//! smoother, previous cursor position and sub-pixel remainders, button
//! latches, the joystick origin and the mute latch.  Each call consumes
//! one classified frame and returns the commands it produced.

use tracing::{debug, info};

use super::acceleration::MotionAccelerator;
use super::joystick::{HysteresisLatch, VirtualJoystick};
use super::smoothing::Smoother;
use crate::config::ControlConfig;
use crate::device::{dispatch, DeviceCommand, DeviceSink, DispatchReport, MouseButton};
use crate::gesture::GestureType;
use crate::hand::landmarks::Landmark;

/// Fixed multiplier on smoothed cursor displacement before acceleration.
pub const RESPONSIVENESS: f32 = 1.5;

/// Fraction of the mute trigger the hand must return past to re-arm.
pub const MUTE_RELEASE_RATIO: f32 = 0.5;

/// Stateful gesture-to-command translator.  Not reentrant: drive it from
/// a single frame loop.
#[derive(Debug)]
pub struct ActionMapper {
    smoother: Smoother,
    /// Previous smoothed cursor position; `None` until pointer control starts.
    prev_pos: Option<(f32, f32)>,
    /// Sub-pixel carry for relative motion.
    remainder: (f32, f32),
    /// Last absolute pixel target, to suppress duplicate warps.
    last_absolute: Option<(i32, i32)>,
    left_down: bool,
    right_down: bool,
    joystick: VirtualJoystick,
    mute_latch: HysteresisLatch,
}

impl ActionMapper {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            smoother: Smoother::new(config.smoothing_factor),
            prev_pos: None,
            remainder: (0.0, 0.0),
            last_absolute: None,
            left_down: false,
            right_down: false,
            joystick: VirtualJoystick::new(),
            mute_latch: HysteresisLatch::new(MUTE_RELEASE_RATIO),
        }
    }

    /// Process one frame and send the resulting commands to `sink`.
    ///
    /// Sink failures are reported back; mapper state is not rolled back.
    pub fn execute(
        &mut self,
        config: &ControlConfig,
        gesture: GestureType,
        info: Option<Landmark>,
        sink: &mut dyn DeviceSink,
    ) -> (Vec<DeviceCommand>, DispatchReport) {
        let commands = self.step(config, gesture, info);
        let report = dispatch(sink, &commands);
        (commands, report)
    }

    /// Advance the state machine by one frame and return its commands.
    pub fn step(
        &mut self,
        config: &ControlConfig,
        gesture: GestureType,
        info: Option<Landmark>,
    ) -> Vec<DeviceCommand> {
        let gesture = gate(config, gesture);

        self.smoother.update_factor(config.smoothing_factor);
        let mut commands = Vec::new();

        // Leaving the joystick modes drops the origin and mute latch
        if !gesture.is_joystick() {
            self.joystick.clear();
            self.mute_latch.clear();
        }

        match (gesture.is_pointer(), info) {
            (true, Some(pos)) => self.move_pointer(config, pos, &mut commands),
            _ => self.reset_pointer(),
        }

        let want_left = matches!(gesture, GestureType::Dragging | GestureType::LeftClick);
        latch_button(&mut self.left_down, want_left, MouseButton::Left, &mut commands);
        let want_right = gesture == GestureType::RightClick;
        latch_button(&mut self.right_down, want_right, MouseButton::Right, &mut commands);

        match (gesture, info) {
            (GestureType::ScrollMode, Some(pos)) => self.scroll(config, pos, &mut commands),
            (GestureType::VolumeMode, Some(pos)) => self.volume(config, pos, &mut commands),
            _ => {}
        }

        commands
    }

    /// Release held buttons and drop all session state.
    pub fn reset(&mut self) -> Vec<DeviceCommand> {
        let mut commands = Vec::new();
        latch_button(&mut self.left_down, false, MouseButton::Left, &mut commands);
        latch_button(&mut self.right_down, false, MouseButton::Right, &mut commands);
        self.reset_pointer();
        self.joystick.clear();
        self.mute_latch.clear();
        commands
    }

    /// Whether the left/right buttons are currently held.
    pub fn buttons_held(&self) -> (bool, bool) {
        (self.left_down, self.right_down)
    }

    // ── Pointer ────────────────────────────────────────────

    fn move_pointer(&mut self, config: &ControlConfig, pos: Landmark, out: &mut Vec<DeviceCommand>) {
        let (cx, cy) = self.smoother.smooth(pos.x, pos.y);

        if config.absolute_pointer {
            let target = screen_position(config, cx, cy);
            if self.last_absolute != Some(target) {
                out.push(DeviceCommand::MoveCursorAbsolute {
                    x: target.0,
                    y: target.1,
                });
                self.last_absolute = Some(target);
            }
            self.prev_pos = Some((cx, cy));
            return;
        }

        let (px, py) = self.prev_pos.unwrap_or((cx, cy));
        let dx = (cx - px) * RESPONSIVENESS;
        let dy = (cy - py) * RESPONSIVENESS;
        let (mx, my) = MotionAccelerator::from_config(config).accelerate(dx, dy);

        self.remainder.0 += mx;
        self.remainder.1 += my;
        let sx = self.remainder.0.round();
        let sy = self.remainder.1.round();
        self.remainder.0 -= sx;
        self.remainder.1 -= sy;

        if sx != 0.0 || sy != 0.0 {
            out.push(DeviceCommand::MoveCursorRelative {
                dx: sx as i32,
                dy: sy as i32,
            });
        }
        self.prev_pos = Some((cx, cy));
    }

    /// Resync point: the next pointer session starts from a fresh sample.
    fn reset_pointer(&mut self) {
        self.prev_pos = None;
        self.last_absolute = None;
        self.smoother.reset();
    }

    // ── Joystick modes ─────────────────────────────────────

    fn scroll(&mut self, config: &ControlConfig, pos: Landmark, out: &mut Vec<DeviceCommand>) {
        let (dx, dy) = match self.joystick.offset(pos.x, pos.y) {
            Some(offset) => offset,
            None => return,
        };

        if dy.abs() > config.joystick_dead_zone {
            // Hand up (negative dy) scrolls up (positive amount)
            let amount = -(dy * config.scroll_speed).round() as i32;
            if amount != 0 {
                out.push(DeviceCommand::ScrollVertical(amount));
            }
        }
        if dx.abs() > config.joystick_dead_zone {
            let amount = (dx * config.scroll_speed).round() as i32;
            if amount != 0 {
                out.push(DeviceCommand::ScrollHorizontal(amount));
            }
        }
    }

    fn volume(&mut self, config: &ControlConfig, pos: Landmark, out: &mut Vec<DeviceCommand>) {
        let (dx, dy) = match self.joystick.offset(pos.x, pos.y) {
            Some(offset) => offset,
            None => return,
        };

        if dy.abs() > config.volume_trigger_threshold {
            if dy < 0.0 {
                out.push(DeviceCommand::VolumeUp);
            } else {
                out.push(DeviceCommand::VolumeDown);
            }
        }

        if self.mute_latch.update(dx, config.mute_trigger_threshold) {
            info!("Mute toggled (offset x {:.3})", dx);
            out.push(DeviceCommand::ToggleMute);
        }
    }
}

impl Default for ActionMapper {
    fn default() -> Self {
        Self::new(&ControlConfig::default())
    }
}

/// Collapse gestures of disabled features to `None`.
fn gate(config: &ControlConfig, gesture: GestureType) -> GestureType {
    let enabled = match gesture {
        GestureType::Pointing
        | GestureType::Dragging
        | GestureType::LeftClick
        | GestureType::RightClick => config.enable_mouse,
        GestureType::ScrollMode => config.enable_scroll,
        GestureType::VolumeMode => config.enable_volume,
        GestureType::None | GestureType::ZoomIn | GestureType::ZoomOut => true,
    };
    if enabled {
        gesture
    } else {
        GestureType::None
    }
}

/// Edge-triggered press/release: one command per transition.
fn latch_button(held: &mut bool, want: bool, button: MouseButton, out: &mut Vec<DeviceCommand>) {
    if want && !*held {
        debug!("Button {} down", button.as_str());
        out.push(DeviceCommand::ButtonDown(button));
        *held = true;
    } else if !want && *held {
        debug!("Button {} up", button.as_str());
        out.push(DeviceCommand::ButtonUp(button));
        *held = false;
    }
}

/// Map a normalized camera position to a screen pixel, ignoring
/// `frame_margin` on each edge.
fn screen_position(config: &ControlConfig, x: f32, y: f32) -> (i32, i32) {
    let span = (1.0 - 2.0 * config.frame_margin).max(f32::EPSILON);
    let nx = ((x - config.frame_margin) / span).clamp(0.0, 1.0);
    let ny = ((y - config.frame_margin) / span).clamp(0.0, 1.0);
    (
        (nx * config.screen_width).round() as i32,
        (ny * config.screen_height).round() as i32,
    )
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{FailingSink, RecordingSink};

    fn at(x: f32, y: f32) -> Option<Landmark> {
        Some(Landmark::new(x, y, 0.0))
    }

    fn count(commands: &[DeviceCommand], wanted: DeviceCommand) -> usize {
        commands.iter().filter(|c| **c == wanted).count()
    }

    fn run(
        mapper: &mut ActionMapper,
        config: &ControlConfig,
        frames: &[(GestureType, Option<Landmark>)],
    ) -> Vec<DeviceCommand> {
        frames
            .iter()
            .flat_map(|(g, info)| mapper.step(config, *g, *info))
            .collect()
    }

    // ── Buttons ────────────────────────────────────────────

    #[test]
    fn test_drag_latches_left_button_once() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        let mut frames = vec![(GestureType::Dragging, at(0.5, 0.5)); 20];
        frames.push((GestureType::None, None));
        let commands = run(&mut mapper, &config, &frames);

        assert_eq!(count(&commands, DeviceCommand::ButtonDown(MouseButton::Left)), 1);
        assert_eq!(count(&commands, DeviceCommand::ButtonUp(MouseButton::Left)), 1);
        assert_eq!(mapper.buttons_held(), (false, false));
    }

    #[test]
    fn test_drag_to_left_click_keeps_button_held() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        let commands = run(
            &mut mapper,
            &config,
            &[
                (GestureType::Dragging, at(0.5, 0.5)),
                (GestureType::LeftClick, None),
                (GestureType::LeftClick, None),
            ],
        );
        assert_eq!(commands, vec![DeviceCommand::ButtonDown(MouseButton::Left)]);
        assert_eq!(mapper.buttons_held(), (true, false));
    }

    #[test]
    fn test_right_click_edges() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        let commands = run(
            &mut mapper,
            &config,
            &[
                (GestureType::RightClick, None),
                (GestureType::RightClick, None),
                (GestureType::Pointing, at(0.5, 0.5)),
            ],
        );
        assert_eq!(
            commands,
            vec![
                DeviceCommand::ButtonDown(MouseButton::Right),
                DeviceCommand::ButtonUp(MouseButton::Right),
            ]
        );
    }

    #[test]
    fn test_left_to_right_click_swaps_buttons() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::LeftClick, None);
        let commands = mapper.step(&config, GestureType::RightClick, None);
        assert_eq!(
            commands,
            vec![
                DeviceCommand::ButtonUp(MouseButton::Left),
                DeviceCommand::ButtonDown(MouseButton::Right),
            ]
        );
    }

    #[test]
    fn test_reset_releases_buttons() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::LeftClick, None);
        assert_eq!(mapper.reset(), vec![DeviceCommand::ButtonUp(MouseButton::Left)]);
        assert!(mapper.reset().is_empty());
    }

    // ── Pointer ────────────────────────────────────────────

    #[test]
    fn test_first_pointer_frame_does_not_move() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        assert!(mapper.step(&config, GestureType::Pointing, at(0.3, 0.3)).is_empty());
    }

    #[test]
    fn test_pointer_moves_relative() {
        let mut config = ControlConfig::default();
        config.smoothing_factor = 1.0;
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::Pointing, at(0.5, 0.5));
        // dx 0.002 * 1.5 = 0.003, below the acceleration threshold: 0.003 * 800 = 2.4
        let commands = mapper.step(&config, GestureType::Pointing, at(0.502, 0.5));
        assert_eq!(commands, vec![DeviceCommand::MoveCursorRelative { dx: 2, dy: 0 }]);
    }

    #[test]
    fn test_subpixel_remainder_carries() {
        let mut config = ControlConfig::default();
        config.smoothing_factor = 1.0;
        config.sensitivity = 200.0;
        let mut mapper = ActionMapper::new(&config);
        let mut x = 0.5;
        mapper.step(&config, GestureType::Pointing, at(x, 0.5));
        // Each frame: 0.001 * 1.5 * 200 = 0.3 px, which rounds to zero alone
        let mut total = 0;
        for _ in 0..10 {
            x += 0.001;
            for c in mapper.step(&config, GestureType::Pointing, at(x, 0.5)) {
                if let DeviceCommand::MoveCursorRelative { dx, .. } = c {
                    total += dx;
                }
            }
        }
        assert!((2..=4).contains(&total), "Expected ~3 px carried, got {}", total);
    }

    #[test]
    fn test_dead_zone_suppresses_jitter() {
        let mut config = ControlConfig::default();
        config.smoothing_factor = 1.0;
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::Pointing, at(0.5, 0.5));
        let commands = mapper.step(&config, GestureType::Pointing, at(0.5003, 0.5));
        assert!(commands.is_empty(), "Expected no motion, got {:?}", commands);
    }

    #[test]
    fn test_pointer_resyncs_after_other_gesture() {
        let mut config = ControlConfig::default();
        config.smoothing_factor = 1.0;
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::Pointing, at(0.1, 0.1));
        mapper.step(&config, GestureType::None, None);
        // A far jump after the break must not produce motion
        let commands = mapper.step(&config, GestureType::Pointing, at(0.9, 0.9));
        assert!(commands.is_empty(), "Expected resync, got {:?}", commands);
    }

    #[test]
    fn test_pointer_without_info_is_noop() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::Pointing, at(0.5, 0.5));
        assert!(mapper.step(&config, GestureType::Pointing, None).is_empty());
        assert!(mapper.prev_pos.is_none());
    }

    #[test]
    fn test_absolute_pointer_mode() {
        let mut config = ControlConfig::default();
        config.absolute_pointer = true;
        config.frame_margin = 0.25;
        config.screen_width = 1000.0;
        config.screen_height = 500.0;
        let mut mapper = ActionMapper::new(&config);

        let commands = mapper.step(&config, GestureType::Pointing, at(0.5, 0.5));
        assert_eq!(commands, vec![DeviceCommand::MoveCursorAbsolute { x: 500, y: 250 }]);

        // Same target: no duplicate warp
        assert!(mapper.step(&config, GestureType::Pointing, at(0.5, 0.5)).is_empty());

        let mut mapper = ActionMapper::new(&config);
        let commands = mapper.step(&config, GestureType::Pointing, at(0.1, 0.95));
        assert_eq!(commands, vec![DeviceCommand::MoveCursorAbsolute { x: 0, y: 500 }]);
    }

    // ── Scroll ─────────────────────────────────────────────

    #[test]
    fn test_scroll_anchor_frame_is_silent() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        assert!(mapper.step(&config, GestureType::ScrollMode, at(0.2, 0.9)).is_empty());
        assert_eq!(mapper.joystick.origin(), Some((0.2, 0.9)));
    }

    #[test]
    fn test_scroll_up_when_hand_moves_up() {
        let mut config = ControlConfig::default();
        config.joystick_dead_zone = 0.05;
        config.scroll_speed = 10.0;
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        let commands = mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.4));
        assert_eq!(commands.len(), 1, "got {:?}", commands);
        match commands[0] {
            DeviceCommand::ScrollVertical(n) => assert!(n > 0, "Expected positive, got {}", n),
            other => panic!("Expected vertical scroll, got {:?}", other),
        }
    }

    #[test]
    fn test_scroll_both_axes() {
        let mut config = ControlConfig::default();
        config.scroll_speed = 20.0;
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        let commands = mapper.step(&config, GestureType::ScrollMode, at(0.3, 0.7));
        assert_eq!(
            commands,
            vec![
                DeviceCommand::ScrollVertical(-4),
                DeviceCommand::ScrollHorizontal(-4),
            ]
        );
    }

    #[test]
    fn test_scroll_inside_dead_zone() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        assert!(mapper.step(&config, GestureType::ScrollMode, at(0.53, 0.47)).is_empty());
    }

    #[test]
    fn test_scroll_speed_grows_with_displacement() {
        let mut config = ControlConfig::default();
        config.scroll_speed = 30.0;
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        let mut last = 0;
        for y in [0.4, 0.3, 0.2] {
            let commands = mapper.step(&config, GestureType::ScrollMode, at(0.5, y));
            let n = match commands.as_slice() {
                [DeviceCommand::ScrollVertical(n)] => *n,
                other => panic!("unexpected {:?}", other),
            };
            assert!(n > last, "scroll {} did not grow past {}", n, last);
            last = n;
        }
        // Holding still keeps scrolling at the same rate
        let again = mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.2));
        assert_eq!(again, vec![DeviceCommand::ScrollVertical(last)]);
    }

    #[test]
    fn test_origin_clears_on_leaving_mode() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        mapper.step(&config, GestureType::None, None);
        assert!(!mapper.joystick.is_anchored());
        // Re-entry re-anchors silently at the new position
        assert!(mapper.step(&config, GestureType::ScrollMode, at(0.1, 0.1)).is_empty());
        assert_eq!(mapper.joystick.origin(), Some((0.1, 0.1)));
    }

    #[test]
    fn test_scroll_without_info_keeps_origin() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        assert!(mapper.step(&config, GestureType::ScrollMode, None).is_empty());
        assert_eq!(mapper.joystick.origin(), Some((0.5, 0.5)));
    }

    // ── Volume ─────────────────────────────────────────────

    #[test]
    fn test_volume_steps_repeat_while_held() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        let commands = run(
            &mut mapper,
            &config,
            &[
                (GestureType::VolumeMode, at(0.5, 0.5)),
                (GestureType::VolumeMode, at(0.5, 0.4)),
                (GestureType::VolumeMode, at(0.5, 0.4)),
                (GestureType::VolumeMode, at(0.5, 0.6)),
                (GestureType::VolumeMode, at(0.5, 0.52)),
            ],
        );
        assert_eq!(
            commands,
            vec![
                DeviceCommand::VolumeUp,
                DeviceCommand::VolumeUp,
                DeviceCommand::VolumeDown,
            ]
        );
    }

    #[test]
    fn test_mute_hysteresis() {
        let mut config = ControlConfig::default();
        config.mute_trigger_threshold = 0.15;
        let mut mapper = ActionMapper::new(&config);
        let commands = run(
            &mut mapper,
            &config,
            &[
                (GestureType::VolumeMode, at(0.5, 0.5)),
                (GestureType::VolumeMode, at(0.3, 0.5)),
                (GestureType::VolumeMode, at(0.4, 0.5)),
                (GestureType::VolumeMode, at(0.3, 0.5)),
            ],
        );
        // -0.10 stays inside the band (release at -0.075), so the second -0.20 is latched
        assert_eq!(count(&commands, DeviceCommand::ToggleMute), 1);
    }

    #[test]
    fn test_mute_rearms_after_return() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        let commands = run(
            &mut mapper,
            &config,
            &[
                (GestureType::VolumeMode, at(0.5, 0.5)),
                (GestureType::VolumeMode, at(0.3, 0.5)),
                (GestureType::VolumeMode, at(0.5, 0.5)),
                (GestureType::VolumeMode, at(0.3, 0.5)),
            ],
        );
        assert_eq!(count(&commands, DeviceCommand::ToggleMute), 2);
    }

    #[test]
    fn test_mute_latch_clears_on_mode_exit() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::VolumeMode, at(0.5, 0.5));
        mapper.step(&config, GestureType::VolumeMode, at(0.3, 0.5));
        assert!(mapper.mute_latch.is_latched());
        mapper.step(&config, GestureType::None, None);
        assert!(!mapper.mute_latch.is_latched());
    }

    #[test]
    fn test_scroll_to_volume_keeps_origin() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        let commands = mapper.step(&config, GestureType::VolumeMode, at(0.5, 0.4));
        assert_eq!(commands, vec![DeviceCommand::VolumeUp]);
    }

    // ── Config and gating ──────────────────────────────────

    #[test]
    fn test_disabled_mouse_releases_drag() {
        let mut config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::Dragging, at(0.5, 0.5));
        config.enable_mouse = false;
        let commands = mapper.step(&config, GestureType::Dragging, at(0.6, 0.5));
        assert_eq!(commands, vec![DeviceCommand::ButtonUp(MouseButton::Left)]);
    }

    #[test]
    fn test_disabled_volume_is_silent() {
        let mut config = ControlConfig::default();
        config.enable_volume = false;
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::VolumeMode, at(0.5, 0.5));
        assert!(mapper.step(&config, GestureType::VolumeMode, at(0.3, 0.3)).is_empty());
        assert!(!mapper.joystick.is_anchored());
    }

    #[test]
    fn test_config_change_applies_next_frame() {
        let mut config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.5));
        let slow = mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.3));
        config.scroll_speed = 40.0;
        let fast = mapper.step(&config, GestureType::ScrollMode, at(0.5, 0.3));
        assert_eq!(slow, vec![DeviceCommand::ScrollVertical(2)]);
        assert_eq!(fast, vec![DeviceCommand::ScrollVertical(8)]);
    }

    #[test]
    fn test_zoom_gestures_are_inert() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        assert!(mapper.step(&config, GestureType::ZoomIn, at(0.5, 0.5)).is_empty());
        assert!(mapper.step(&config, GestureType::ZoomOut, at(0.1, 0.1)).is_empty());
    }

    #[test]
    fn test_execute_reports_sink_failure_without_rollback() {
        let config = ControlConfig::default();
        let mut mapper = ActionMapper::new(&config);
        let mut sink = FailingSink {
            reject: |c| matches!(c, DeviceCommand::ButtonDown(_)),
            accepted: Vec::new(),
        };
        let (commands, report) = mapper.execute(&config, GestureType::LeftClick, None, &mut sink);
        assert_eq!(commands, vec![DeviceCommand::ButtonDown(MouseButton::Left)]);
        assert_eq!(report.failed.len(), 1);
        // Latch stays set: no second press on the next frame
        let (commands, _) = mapper.execute(&config, GestureType::LeftClick, None, &mut sink);
        assert!(commands.is_empty());
        assert_eq!(mapper.buttons_held(), (true, false));

        let mut ok = RecordingSink::new();
        let (_, report) = mapper.execute(&config, GestureType::None, None, &mut ok);
        assert!(report.is_clean());
        assert_eq!(ok.commands, vec![DeviceCommand::ButtonUp(MouseButton::Left)]);
    }

    #[test]
    fn test_screen_position_clamps() {
        let mut config = ControlConfig::default();
        config.frame_margin = 0.0;
        config.screen_width = 100.0;
        config.screen_height = 100.0;
        assert_eq!(screen_position(&config, -0.5, 1.5), (0, 100));
        assert_eq!(screen_position(&config, 0.25, 0.75), (25, 75));
    }
}
