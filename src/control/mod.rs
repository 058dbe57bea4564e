//! Cursor, scroll and volume control from classified gestures.

pub mod acceleration;
pub mod joystick;
pub mod mapper;
pub mod smoothing;
