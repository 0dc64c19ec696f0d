use std::time::Instant;

/// Tolerance used when comparing the accumulator against the step, so that
/// float drift (e.g. ten 0.01 s frames summing to 0.099_999) does not stall a tick.
const STEP_EPSILON: f32 = 1e-5;

/// Default catch-up cap: at most this many fixed steps run for a single frame.
pub const DEFAULT_MAX_CATCH_UP: u32 = 10;

/// Fixed-timestep accumulator.
///
/// Buffers variable render deltas and reports how many fixed steps are due.
/// The remainder carries into the next frame, so blend timing does not depend
/// on frame-rate jitter.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    accumulator: f32,
    max_catch_up: u32,
}

impl FixedStep {
    #[must_use]
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            accumulator: 0.0,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
        }
    }

    #[must_use]
    pub fn with_max_catch_up(mut self, max_catch_up: u32) -> Self {
        self.max_catch_up = max_catch_up.max(1);
        self
    }

    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Time buffered but not yet consumed by a step.
    #[must_use]
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Feeds one frame delta and returns the number of fixed steps to run.
    ///
    /// Negative and NaN deltas are ignored. When a stalled frame would need
    /// more than the catch-up cap, the excess whole steps are discarded.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if dt.is_nan() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= self.step {
            self.accumulator -= self.step;
            steps += 1;
            if steps >= self.max_catch_up {
                if self.accumulator >= self.step {
                    log::debug!(
                        "FixedStep: dropping {:.3}s of backlog after {} steps",
                        self.accumulator,
                        steps
                    );
                    self.accumulator %= self.step;
                }
                break;
            }
        }
        self.accumulator = self.accumulator.max(0.0);
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Longest render delta [`FrameClock`] reports, in seconds.
pub const DEFAULT_MAX_FRAME_DELTA: f32 = 0.25;

/// Wall-clock source of render deltas for hosts without their own frame loop.
///
/// Each delta is clamped to `max_delta`, so a stalled frame (debugger break,
/// window drag) arrives as one bounded delta instead of a catch-up burst.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Instant,
    max_delta: f32,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    #[must_use]
    pub fn starting_at(now: Instant) -> Self {
        Self {
            last_tick: now,
            max_delta: DEFAULT_MAX_FRAME_DELTA,
            frames: 0,
        }
    }

    #[must_use]
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    /// Frames measured so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Starts a new frame and returns the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit timestamp. Timestamps
    /// earlier than the previous one yield a zero delta.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = self.last_tick.max(now);
        self.frames += 1;
        if raw > self.max_delta {
            log::debug!("FrameClock: clamped {raw:.3}s frame to {:.3}s", self.max_delta);
            return self.max_delta;
        }
        raw
    }
}
