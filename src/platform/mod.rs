//! Platform abstraction layer
//!
//! Translates host control events into engine terms:
//! - Arrow keys and trackpad wheel deltas move the paddle
//! - Viewport resizes refit the arena

pub mod input;

pub use input::{ControlEvent, InputAdapter, KeyDirection};
