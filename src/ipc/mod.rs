//! Line-oriented s-expression protocol for the presentation layer.

pub mod dispatch;

pub use dispatch::handle_message;
