//! Per-frame orchestration: landmarks in, device commands out.
//!
//! The frame loop owns one `Pipeline`.  Configuration arrives through a
//! shared `ConfigHandle` and is snapshotted once at the start of each
//! frame, so updates from the control surface land on the next frame.

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{ConfigHandle, ControlConfig};
use crate::control::mapper::ActionMapper;
use crate::device::{dispatch, DeviceCommand, DeviceSink, DispatchReport};
use crate::gesture::{recognize, Classification, GestureType};
use crate::hand::fingers::FingerState;
use crate::hand::landmarks::Landmark;
use crate::status::Status;

/// Everything one frame produced.
#[derive(Debug)]
pub struct FrameResult {
    pub classification: Classification,
    pub fingers: Option<FingerState>,
    pub commands: Vec<DeviceCommand>,
    pub report: DispatchReport,
}

/// Recognizer + mapper + telemetry for a single camera stream.
#[derive(Debug)]
pub struct Pipeline {
    config: ConfigHandle,
    mapper: ActionMapper,
    pub status: Status,
}

impl Pipeline {
    pub fn new(config: ConfigHandle) -> Self {
        let mapper = ActionMapper::new(&config.snapshot());
        Self {
            config,
            mapper,
            status: Status::default(),
        }
    }

    /// Shared handle for the control surface.
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Process one frame; `None` means no hand was detected.
    pub fn process_frame(&mut self, frame: Option<&[Landmark]>, sink: &mut dyn DeviceSink) -> FrameResult {
        self.process_frame_at(Instant::now(), frame, sink)
    }

    pub fn process_frame_at(
        &mut self,
        now: Instant,
        frame: Option<&[Landmark]>,
        sink: &mut dyn DeviceSink,
    ) -> FrameResult {
        let config: ControlConfig = self.config.snapshot();
        let (classification, fingers) = recognize(frame);

        if classification.gesture != self.status.gesture {
            debug!(
                "Gesture: {} -> {} (fingers {})",
                self.status.gesture.as_str(),
                classification.gesture.as_str(),
                fingers.map(|f| f.as_bits()).unwrap_or_else(|| "-".to_string()),
            );
        }

        let (commands, report) =
            self.mapper
                .execute(&config, classification.gesture, classification.info, sink);

        if !report.is_clean() {
            warn!(
                "Frame {}: {} of {} commands failed",
                self.status.frames,
                report.failed.len(),
                commands.len()
            );
        }

        self.status.record(
            now,
            classification.gesture,
            fingers.is_some(),
            commands.len(),
            report.failed.len(),
        );

        FrameResult {
            classification,
            fingers,
            commands,
            report,
        }
    }

    /// End the session: release held buttons and clear mapper state.
    pub fn reset(&mut self, sink: &mut dyn DeviceSink) -> (Vec<DeviceCommand>, DispatchReport) {
        let commands = self.mapper.reset();
        let report = dispatch(sink, &commands);
        self.status.gesture = GestureType::None;
        self.status.frame_rate.clear();
        (commands, report)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ConfigHandle::default())
    }
}
