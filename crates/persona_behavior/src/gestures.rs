//! Gesture State Machines
//!
//! Small timers that fire one-shot clips on top of the base idle loop:
//!
//! - [`IdleAdditiveState`]: periodic weight-shift clip with smoothstep fades
//! - [`ArmRaise`]: arm gesture after sustained target motion
//! - [`BlinkState`] and [`LipState`]: morph clips on wall-clock timers
//! - [`OneShot`]: fixed-length morph clips (surprise, half-closed eyes)
//!
//! Every gesture owns its timers, so several characters never share state.
//! A gesture whose clip is missing from the model is skipped silently.

use rand::RngExt;
use rand::rngs::StdRng;
use smallvec::SmallVec;

use persona_animation::ClipMultiplexer;
use persona_core::math::{fade_envelope, reached};

use crate::axis::AxisBlend;
use crate::config::{ArmTuning, BlinkTuning, IdleTuning, LipTuning};
use crate::random::{roll, roll_stepped};

// ============================================================================
// One-shot clips
// ============================================================================

/// A clip that plays once for a fixed time and is then stopped.
#[derive(Debug, Clone)]
pub struct OneShot {
    clip: String,
    elapsed: f32,
    duration: f32,
    running: bool,
}

impl OneShot {
    #[must_use]
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            elapsed: 0.0,
            duration: 0.0,
            running: false,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Plays the clip at full weight. Returns `false` if the clip is missing.
    pub fn trigger(&mut self, mux: &mut ClipMultiplexer, duration: f32) -> bool {
        if mux.play(&self.clip, 1.0).is_err() {
            return false;
        }
        log::trace!("{}: one-shot '{}' for {duration:.2}s", mux.instance(), self.clip);
        self.elapsed = 0.0;
        self.duration = duration.max(0.0);
        self.running = true;
        true
    }

    /// Advances the timer and stops the clip once its time is up.
    pub fn update(&mut self, dt: f32, mux: &mut ClipMultiplexer) {
        if !self.running {
            return;
        }
        self.elapsed += dt;
        if reached(self.elapsed, self.duration) {
            let _ = mux.stop(&self.clip);
            self.running = false;
        }
    }

    pub fn cancel(&mut self, mux: &mut ClipMultiplexer) {
        if self.running {
            let _ = mux.stop(&self.clip);
            self.running = false;
        }
    }
}

// ============================================================================
// Idle additive
// ============================================================================

/// Periodic additive "shift weight" clip layered over the idle loop.
///
/// A cycle is `idle_duration` seconds of plain idle followed by
/// `additive_duration` seconds of one additive variant; both are re-rolled
/// every cycle.
#[derive(Debug, Clone)]
pub struct IdleAdditiveState {
    pub elapsed: f32,
    pub idle_duration: f32,
    pub additive_duration: f32,
    pub running: bool,
    current: Option<String>,
}

impl IdleAdditiveState {
    #[must_use]
    pub fn new(rng: &mut StdRng, tuning: &IdleTuning) -> Self {
        let mut state = Self {
            elapsed: 0.0,
            idle_duration: 0.0,
            additive_duration: 0.0,
            running: false,
            current: None,
        };
        state.reroll(rng, tuning);
        state
    }

    /// Seconds from the start of a cycle to the next additive trigger.
    #[must_use]
    pub fn next_trigger_at(&self) -> f32 {
        self.idle_duration
    }

    #[must_use]
    pub fn current_clip(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn reroll(&mut self, rng: &mut StdRng, tuning: &IdleTuning) {
        self.idle_duration = roll_stepped(rng, tuning.idle_min, tuning.idle_max, tuning.idle_step);
        self.additive_duration = roll(rng, tuning.additive_min, tuning.additive_max);
    }

    pub fn update(
        &mut self,
        dt: f32,
        variants: &[String],
        mux: &mut ClipMultiplexer,
        rng: &mut StdRng,
        tuning: &IdleTuning,
    ) {
        self.elapsed += dt;

        if !self.running {
            if reached(self.elapsed, self.idle_duration) {
                self.start(variants, mux, rng);
            }
            return;
        }

        let local = self.elapsed - self.idle_duration;
        if reached(local, self.additive_duration) {
            if let Some(clip) = self.current.take() {
                let _ = mux.stop(&clip);
            }
            self.running = false;
            self.elapsed = 0.0;
            self.reroll(rng, tuning);
            return;
        }

        if let Some(clip) = &self.current {
            let weight = fade_envelope(local, self.additive_duration, tuning.fade, 1.0);
            let _ = mux.set_weight(clip, weight);
        }
    }

    fn start(&mut self, variants: &[String], mux: &mut ClipMultiplexer, rng: &mut StdRng) {
        self.running = true;
        if variants.is_empty() {
            return;
        }
        let clip = &variants[rng.random_range(0..variants.len())];
        let _ = mux.set_duration(clip, self.additive_duration);
        if mux.play(clip, 0.0).is_ok() {
            log::trace!("{}: idle additive '{clip}' for {:.2}s", mux.instance(), self.additive_duration);
            self.current = Some(clip.clone());
        }
    }

    pub fn cancel(&mut self, mux: &mut ClipMultiplexer) {
        if let Some(clip) = self.current.take() {
            let _ = mux.stop(&clip);
        }
        self.running = false;
        self.elapsed = 0.0;
    }
}

/// Collects the additive idle variants of a model, in name order.
#[must_use]
pub fn idle_variants(mux: &ClipMultiplexer, is_variant: impl Fn(&str) -> bool) -> SmallVec<[String; 4]> {
    mux.clip_names()
        .into_iter()
        .filter(|name| is_variant(name))
        .collect()
}

// ============================================================================
// Arm raise
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmSide {
    Left,
    Right,
}

/// Signals the arm gesture reads each tick.
#[derive(Debug, Clone, Copy)]
pub struct ArmInput {
    pub delta_velocity: f32,
    pub interest: f32,
    /// Arm on the side the head is turned to.
    pub side: ArmSide,
    /// Weight of the head clip on that side.
    pub head_now: f32,
    pub head_target: f32,
}

#[derive(Debug, Clone, Copy)]
struct ArmStroke {
    side: ArmSide,
    elapsed: f32,
    duration: f32,
    plateau: f32,
}

/// Arm gesture toward a target that keeps moving.
///
/// Motion must stay above the velocity threshold for `sustain` seconds, the
/// head must already be turned toward that side and interest must be high.
/// Faster motion gives a shorter, snappier raise.
#[derive(Debug, Clone)]
pub struct ArmRaise {
    pub left: AxisBlend,
    pub right: AxisBlend,
    sustained: f32,
    cooldown: f32,
    stroke: Option<ArmStroke>,
}

impl ArmRaise {
    #[must_use]
    pub fn new(left_clip: &str, right_clip: &str) -> Self {
        Self {
            left: AxisBlend::new(left_clip),
            right: AxisBlend::new(right_clip),
            sustained: 0.0,
            cooldown: 0.0,
            stroke: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.stroke.is_some()
    }

    /// Seconds of uninterrupted fast motion seen so far.
    #[must_use]
    pub fn sustained(&self) -> f32 {
        self.sustained
    }

    #[must_use]
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    fn blend_mut(&mut self, side: ArmSide) -> &mut AxisBlend {
        match side {
            ArmSide::Left => &mut self.left,
            ArmSide::Right => &mut self.right,
        }
    }

    pub fn update(&mut self, dt: f32, input: ArmInput, mux: &mut ClipMultiplexer, tuning: &ArmTuning) {
        if input.delta_velocity > tuning.velocity_threshold {
            self.sustained += dt;
        } else {
            self.sustained = 0.0;
        }

        if let Some(mut stroke) = self.stroke.take() {
            stroke.elapsed += dt;
            let blend = self.blend_mut(stroke.side);
            if reached(stroke.elapsed, stroke.duration) {
                blend.release(mux);
                self.cooldown = tuning.cooldown;
            } else {
                blend.now = fade_envelope(stroke.elapsed, stroke.duration, tuning.fade, stroke.plateau);
                let _ = mux.set_weight(blend.clip(), blend.now);
                self.stroke = Some(stroke);
            }
            return;
        }

        self.cooldown = (self.cooldown - dt).max(0.0);

        let ready = reached(self.sustained, tuning.sustain)
            && input.head_now > tuning.min_head_now
            && input.head_target > tuning.min_head_target
            && input.interest > tuning.min_interest
            && self.cooldown <= 0.0;
        if ready {
            self.trigger(input, mux, tuning);
        }
    }

    fn trigger(&mut self, input: ArmInput, mux: &mut ClipMultiplexer, tuning: &ArmTuning) {
        let duration = if input.delta_velocity > 0.0 {
            (tuning.duration_scale / input.delta_velocity).clamp(tuning.min_duration, tuning.max_duration)
        } else {
            tuning.max_duration
        };
        let plateau = input.head_now.clamp(0.0, 1.0);
        self.sustained = 0.0;

        let blend = self.blend_mut(input.side);
        let _ = mux.set_duration(blend.clip(), duration);
        if mux.play(blend.clip(), 0.0).is_err() {
            return;
        }
        log::trace!(
            "{}: arm raise {:?} for {duration:.2}s at {plateau:.2}",
            mux.instance(),
            input.side
        );
        blend.retarget(plateau);
        blend.now = 0.0;
        blend.active = true;
        self.stroke = Some(ArmStroke {
            side: input.side,
            elapsed: 0.0,
            duration,
            plateau,
        });
    }

    pub fn cancel(&mut self, mux: &mut ClipMultiplexer) {
        self.left.release(mux);
        self.right.release(mux);
        self.stroke = None;
        self.sustained = 0.0;
    }
}

// ============================================================================
// Blink & lip
// ============================================================================

/// Eye blink on a jittered wall-clock timer. Held while interest is up.
#[derive(Debug, Clone)]
pub struct BlinkState {
    clip: String,
    pub elapsed: f32,
    pub next_trigger_at: f32,
    pub running: bool,
    pub blinks: u32,
}

impl BlinkState {
    #[must_use]
    pub fn new(clip: impl Into<String>, rng: &mut StdRng, tuning: &BlinkTuning) -> Self {
        Self {
            clip: clip.into(),
            elapsed: 0.0,
            next_trigger_at: tuning.base_interval + roll(rng, 0.0, tuning.jitter),
            running: false,
            blinks: 0,
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        interest: f32,
        mux: &mut ClipMultiplexer,
        rng: &mut StdRng,
        tuning: &BlinkTuning,
    ) {
        self.elapsed += dt;
        self.running = mux.is_playing(&self.clip).unwrap_or(false);
        if interest > 0.0 || !reached(self.elapsed, self.next_trigger_at) {
            return;
        }

        let Ok(duration) = mux.duration(&self.clip) else {
            return;
        };
        if mux.play(&self.clip, 1.0).is_ok() {
            self.running = true;
            self.blinks += 1;
        }
        self.elapsed = 0.0;
        self.next_trigger_at = duration + tuning.base_interval + roll(rng, 0.0, tuning.jitter);
    }
}

/// Idle mouth movement, re-triggered after each play ends. Held while furious.
#[derive(Debug, Clone)]
pub struct LipState {
    clip: String,
    pub elapsed: f32,
    pub next_trigger_at: f32,
    pub running: bool,
}

impl LipState {
    #[must_use]
    pub fn new(clip: impl Into<String>, rng: &mut StdRng, tuning: &LipTuning) -> Self {
        Self {
            clip: clip.into(),
            elapsed: 0.0,
            next_trigger_at: roll(rng, 0.0, tuning.jitter),
            running: false,
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        anger: f32,
        mux: &mut ClipMultiplexer,
        rng: &mut StdRng,
        tuning: &LipTuning,
    ) {
        self.elapsed += dt;
        self.running = mux.is_playing(&self.clip).unwrap_or(false);
        if anger >= tuning.max_anger || !reached(self.elapsed, self.next_trigger_at) {
            return;
        }

        let Ok(duration) = mux.duration(&self.clip) else {
            return;
        };
        if mux.play(&self.clip, 1.0).is_ok() {
            self.running = true;
        }
        self.elapsed = 0.0;
        self.next_trigger_at = duration + roll(rng, 0.0, tuning.jitter);
    }
}
