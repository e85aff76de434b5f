//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks
//! - Input events
//!
//! Storage lives with the types it persists (`config`, `tuning`, `settings`).

pub mod input;
pub mod time;

pub use input::InputState;
pub use time::FrameClock;
