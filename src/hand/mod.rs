//! Hand landmark model and finger-extension extraction.

pub mod fingers;
pub mod landmarks;
