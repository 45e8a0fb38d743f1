//! Frame scheduler time source.

use std::time::Instant;

/// Deltas above this are treated as a stall (window hidden, debugger pause)
/// and reported capped so one late frame cannot teleport the animation.
const MAX_FRAME_DELTA: f32 = 0.5;

/// Turns wall-clock samples into per-frame delta seconds.
///
/// There is no fixed-timestep assumption; callers feed whatever delta the
/// display loop produces and the steppers clamp progress themselves.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick, capped at [`MAX_FRAME_DELTA`].
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_DELTA)
    }

    /// Forget elapsed time, e.g. after the load barrier completes so the
    /// first animated frame does not see the whole loading stall.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
