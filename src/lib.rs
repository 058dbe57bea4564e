//! Handpilot: hand-gesture pointer, scroll and volume control.
//!
//! A camera-side detector supplies 21 normalized hand landmarks per
//! frame.  The pipeline reads finger extension, classifies one gesture,
//! and turns it into device commands for an injected sink.

pub mod config;
pub mod control;
pub mod device;
pub mod driver;
pub mod gesture;
pub mod hand;
pub mod ipc;
pub mod pipeline;
pub mod status;
