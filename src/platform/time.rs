//! Frame clock
//!
//! Converts variable host frame deltas into a whole number of fixed
//! simulation steps.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Fixed-step accumulator
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame delta in seconds from an animation-frame timestamp (ms).
    /// The first frame after a reset counts as one tick.
    pub fn delta_from_timestamp(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time_ms = Some(now_ms);
        dt
    }

    /// Accumulate a frame delta and return how many fixed steps to run.
    /// Negative or non-finite deltas count as zero, large ones are clamped.
    pub fn steps(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Never carry more than one step of debt into the next frame
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Fraction of a step left in the accumulator (render interpolation)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }

    /// Forget accumulated time (run reset, tab hidden)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_frame_one_step() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.steps(SIM_DT), 1);
    }

    #[test]
    fn test_accumulates_short_frames() {
        let mut clock = FrameClock::new();
        let half = SIM_DT * 0.5;
        let total: u32 = (0..4).map(|_| clock.steps(half + 1e-5)).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_hitch_is_clamped() {
        let mut clock = FrameClock::new();
        let steps = clock.steps(5.0);
        assert!(steps <= MAX_SUBSTEPS);
        assert!(clock.alpha() <= 1.0);
        // Next normal frame is not a burst
        assert!(clock.steps(SIM_DT) <= 2);
    }

    #[test]
    fn test_bad_deltas_ignored() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.steps(-1.0), 0);
        assert_eq!(clock.steps(f32::NAN), 0);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn test_timestamp_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta_from_timestamp(1000.0), SIM_DT);
        let dt = clock.delta_from_timestamp(1050.0);
        assert!((dt - 0.05).abs() < 1e-6);
        clock.reset();
        assert_eq!(clock.delta_from_timestamp(9000.0), SIM_DT);
    }
}
