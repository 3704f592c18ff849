//! Frame timing and the fixed-step clock.
//!
//! [`Time`] tracks frame deltas. [`FixedTime`] turns those deltas into a
//! whole number of fixed ticks, so leafs rise the same amount per tick no
//! matter how fast frames arrive.
//!
//! ```text
//! frame delta ──► accumulator += delta
//!                 while accumulator ≥ step: run fixed schedule, accumulator -= step
//! ```

use std::time::Duration;

/// Fixed step used when no [`FixedTime`] resource is present (50 Hz).
pub const DEFAULT_FIXED_STEP_SECS: f32 = 0.02;

/// Frame timing resource, advanced once per [`App::update`](crate::app::App::update).
#[derive(Debug, Clone, Copy)]
pub struct Time {
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Record a frame that took `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Simulated time: the sum of all frame deltas.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-timestep accumulator.
#[derive(Debug, Clone, Copy)]
pub struct FixedTime {
    step: Duration,
    accumulator: Duration,
    tick_count: u64,
}

impl FixedTime {
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn new(step: Duration) -> Self {
        assert!(!step.is_zero(), "Fixed timestep must be non-zero");
        Self {
            step,
            accumulator: Duration::ZERO,
            tick_count: 0,
        }
    }

    pub fn from_secs(secs: f32) -> Self {
        Self::new(Duration::from_secs_f32(secs))
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Add a frame delta and return how many fixed ticks are now due.
    pub fn accumulate(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        self.tick_count += u64::from(ticks);
        ticks
    }

    /// Time carried over to the next frame.
    pub fn overstep(&self) -> Duration {
        self.accumulator
    }
}

impl Default for FixedTime {
    fn default() -> Self {
        Self::from_secs(DEFAULT_FIXED_STEP_SECS)
    }
}
