//! Device commands and the sink that carries them to the OS.
//!
//! The pipeline never touches an input device directly.  It emits
//! `DeviceCommand`s into a `DeviceSink`; a platform backend translates
//! them into real pointer, wheel and volume calls.

use tracing::{info, trace, warn};

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// One instruction for the device sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Warp the cursor to a screen pixel.
    MoveCursorAbsolute { x: i32, y: i32 },
    /// Move the cursor by whole pixels.
    MoveCursorRelative { dx: i32, dy: i32 },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// Positive scrolls up.
    ScrollVertical(i32),
    /// Positive scrolls right.
    ScrollHorizontal(i32),
    VolumeUp,
    VolumeDown,
    ToggleMute,
}

impl DeviceCommand {
    /// Generate s-expression for IPC.
    pub fn to_sexp(&self) -> String {
        match self {
            Self::MoveCursorAbsolute { x, y } => format!("(:move-absolute {} {})", x, y),
            Self::MoveCursorRelative { dx, dy } => format!("(:move-relative {} {})", dx, dy),
            Self::ButtonDown(b) => format!("(:button-down :{})", b.as_str()),
            Self::ButtonUp(b) => format!("(:button-up :{})", b.as_str()),
            Self::ScrollVertical(n) => format!("(:scroll-vertical {})", n),
            Self::ScrollHorizontal(n) => format!("(:scroll-horizontal {})", n),
            Self::VolumeUp => "(:volume-up)".to_string(),
            Self::VolumeDown => "(:volume-down)".to_string(),
            Self::ToggleMute => "(:toggle-mute)".to_string(),
        }
    }
}

/// Format a command list as one s-expression list.
pub fn commands_sexp(commands: &[DeviceCommand]) -> String {
    if commands.is_empty() {
        return "nil".to_string();
    }
    let parts: Vec<String> = commands.iter().map(DeviceCommand::to_sexp).collect();
    format!("({})", parts.join(" "))
}

// ── Sink ───────────────────────────────────────────────────

/// Receiver of device commands (move, button, scroll, volume, mute).
pub trait DeviceSink {
    /// Perform one command.  Errors are reported, never fatal.
    fn send(&mut self, command: &DeviceCommand) -> anyhow::Result<()>;
}

/// Sink that only logs what it would do.
#[derive(Debug, Default)]
pub struct LoggingSink {
    pub sent: u64,
}

impl DeviceSink for LoggingSink {
    fn send(&mut self, command: &DeviceCommand) -> anyhow::Result<()> {
        self.sent += 1;
        match command {
            DeviceCommand::MoveCursorAbsolute { .. } | DeviceCommand::MoveCursorRelative { .. } => {
                trace!("device: {}", command.to_sexp());
            }
            _ => info!("device: {}", command.to_sexp()),
        }
        Ok(())
    }
}

/// Sink that keeps every command in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<DeviceCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take and clear the recorded commands.
    pub fn drain(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DeviceSink for RecordingSink {
    fn send(&mut self, command: &DeviceCommand) -> anyhow::Result<()> {
        self.commands.push(*command);
        Ok(())
    }
}

// ── Dispatch ───────────────────────────────────────────────

/// Outcome of sending one frame's commands.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: Vec<(DeviceCommand, anyhow::Error)>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send commands in order, best-effort: a failure is logged and the
/// remaining commands are still attempted.
pub fn dispatch(sink: &mut dyn DeviceSink, commands: &[DeviceCommand]) -> DispatchReport {
    let mut report = DispatchReport::default();
    for command in commands {
        match sink.send(command) {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!("device sink rejected {}: {:#}", command.to_sexp(), e);
                report.failed.push((*command, e));
            }
        }
    }
    report
}

#[cfg(test)]
pub(crate) struct FailingSink {
    pub reject: fn(&DeviceCommand) -> bool,
    pub accepted: Vec<DeviceCommand>,
}

#[cfg(test)]
impl DeviceSink for FailingSink {
    fn send(&mut self, command: &DeviceCommand) -> anyhow::Result<()> {
        if (self.reject)(command) {
            anyhow::bail!("platform call failed");
        }
        self.accepted.push(*command);
        Ok(())
    }
}
