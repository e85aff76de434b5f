//! Frame timing
//!
//! Converts animation-frame timestamps into elapsed reference frames for the
//! simulation step.

use crate::consts::{FRAME_MS, MAX_FRAME_MULTIPLIER};

#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed frames since the previous call, capped at
    /// `MAX_FRAME_MULTIPLIER`. The first call counts as one frame.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last_ms {
            Some(last) => ((now_ms - last) / FRAME_MS).max(0.0) as f32,
            None => 1.0,
        };
        self.last_ms = Some(now_ms);
        elapsed.min(MAX_FRAME_MULTIPLIER)
    }

    /// Forget the last timestamp (after the page was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_to_reference_frame() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1000.0), 1.0);
        assert!((clock.tick(1000.0 + 16.666) - 1.0).abs() < 1e-5);
        assert!((clock.tick(1000.0 + 16.666 + 8.333) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_caps_long_gaps() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        assert_eq!(clock.tick(10_000.0), MAX_FRAME_MULTIPLIER);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = FrameClock::new();
        clock.tick(500.0);
        assert_eq!(clock.tick(400.0), 0.0);
        clock.reset();
        assert_eq!(clock.tick(900.0), 1.0);
    }
}
