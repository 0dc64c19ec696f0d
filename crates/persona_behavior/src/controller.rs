//! Behavioral Controller
//!
//! Turns mood, look target and timers into clip commands for one character.
//!
//! # Frame contract
//!
//! The host calls two phases every frame, with its camera update in between:
//!
//! 1. [`BehaviorController::update`]: mood, look decision, head weights and
//!    gestures. Runs on a fixed internal step; blink and lip use the raw delta.
//! 2. The host refreshes the camera and re-projects the look target.
//! 3. [`BehaviorController::update_post`]: eye rotation, which must see the
//!    freshly projected target.
//!
//! The controller keeps no reference to its clips. It looks its multiplexer
//! up in the [`AnimationRegistry`] by instance name on every call, so a
//! removed instance simply turns the controller into a no-op.

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use smallvec::SmallVec;

use persona_animation::{AnimationRegistry, ClipMultiplexer};
use persona_core::{FixedStep, Result};

use crate::axis::HeadRig;
use crate::config::BehaviorConfig;
use crate::eye::EyeRig;
use crate::gestures::{
    ArmInput, ArmRaise, ArmSide, BlinkState, IdleAdditiveState, LipState, OneShot, idle_variants,
};
use crate::look::{HeadMotion, LookDirector, LookState};
use crate::mood::MoodState;
use crate::random::instance_rng;
use crate::target::LookTarget;

pub struct BehaviorController {
    instance: String,
    config: BehaviorConfig,
    rng: StdRng,
    fixed: FixedStep,

    mood: MoodState,
    target: LookTarget,
    look: LookDirector,
    head: HeadRig,
    eye: EyeRig,

    idle: IdleAdditiveState,
    idle_variants: Option<SmallVec<[String; 4]>>,
    arm: ArmRaise,
    blink: BlinkState,
    lip: LipState,
    surprise: OneShot,
    half_eyes: OneShot,

    started: bool,
    ticks: u64,
}

impl BehaviorController {
    /// Creates a controller for `instance`, validating the configuration.
    pub fn new(instance: impl Into<String>, config: BehaviorConfig) -> Result<Self> {
        config.validate()?;
        let instance = instance.into();
        let mut rng = instance_rng(&instance, config.seed);
        let clips = &config.clips;

        let head = HeadRig::new(
            &clips.head_left,
            &clips.head_right,
            &clips.head_up,
            &clips.head_down,
            config.look.max_heading,
            config.look.max_pitch,
        );
        let idle = IdleAdditiveState::new(&mut rng, &config.idle);
        let blink = BlinkState::new(clips.blink.clone(), &mut rng, &config.blink);
        let lip = LipState::new(clips.lip.clone(), &mut rng, &config.lip);

        Ok(Self {
            fixed: FixedStep::new(config.fixed_step).with_max_catch_up(config.max_catch_up_steps),
            mood: MoodState::new(),
            target: LookTarget::new(),
            look: LookDirector::new(),
            head,
            eye: EyeRig::new(),
            idle,
            idle_variants: None,
            arm: ArmRaise::new(&clips.arm_left, &clips.arm_right),
            blink,
            lip,
            surprise: OneShot::new(clips.surprise.clone()),
            half_eyes: OneShot::new(clips.half_eyes.clone()),
            started: false,
            ticks: 0,
            instance,
            config,
            rng,
        })
    }

    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    #[must_use]
    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    // ========================================================================
    // Look target (written by the host's projection step)
    // ========================================================================

    pub fn set_look_target_world_pos(&mut self, pos: Vec3) {
        self.target.set_world_pos(pos);
    }

    pub fn set_look_target_visible(&mut self, visible: bool) {
        self.target.set_visible(visible);
    }

    #[must_use]
    pub fn look_target(&self) -> &LookTarget {
        &self.target
    }

    // ========================================================================
    // State inspection
    // ========================================================================

    #[must_use]
    pub fn mood(&self) -> &MoodState {
        &self.mood
    }

    /// Mutable mood, for hosts that react to user input (e.g. a poke).
    pub fn mood_mut(&mut self) -> &mut MoodState {
        &mut self.mood
    }

    #[must_use]
    pub fn look_state(&self) -> LookState {
        self.look.state()
    }

    #[must_use]
    pub fn look(&self) -> &LookDirector {
        &self.look
    }

    #[must_use]
    pub fn head(&self) -> &HeadRig {
        &self.head
    }

    #[must_use]
    pub fn arm(&self) -> &ArmRaise {
        &self.arm
    }

    #[must_use]
    pub fn idle(&self) -> &IdleAdditiveState {
        &self.idle
    }

    #[must_use]
    pub fn blink(&self) -> &BlinkState {
        &self.blink
    }

    #[must_use]
    pub fn lip(&self) -> &LipState {
        &self.lip
    }

    #[must_use]
    pub fn eye(&self) -> &EyeRig {
        &self.eye
    }

    /// Local rotation the host applies to the eye bones.
    #[must_use]
    pub fn eye_rotation(&self) -> Quat {
        self.eye.rotation()
    }

    #[must_use]
    pub fn is_surprised(&self) -> bool {
        self.surprise.is_running()
    }

    #[must_use]
    pub fn is_half_eyed(&self) -> bool {
        self.half_eyes.is_running()
    }

    /// Additive idle clips found on the model, empty until the first update.
    #[must_use]
    pub fn idle_variants(&self) -> &[String] {
        self.idle_variants.as_deref().unwrap_or_default()
    }

    /// Number of fixed ticks executed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // ========================================================================
    // Frame phases
    // ========================================================================

    /// Pre-camera phase. `dt` is the render delta in seconds.
    pub fn update(&mut self, dt: f32, registry: &mut AnimationRegistry) {
        let mux = match registry.multiplexer_mut(&self.instance) {
            Ok(mux) => mux,
            Err(err) => {
                log::debug!("BehaviorController: {err}");
                // Re-read the clip set if the instance is added again.
                self.started = false;
                self.idle_variants = None;
                return;
            }
        };

        if !self.started {
            self.start(mux);
        }

        let steps = self.fixed.advance(dt);
        let step = self.fixed.step();
        for _ in 0..steps {
            self.fixed_update(step, mux);
        }

        let dt = dt.max(0.0);
        self.blink
            .update(dt, self.mood.interest, mux, &mut self.rng, &self.config.blink);
        self.lip
            .update(dt, self.mood.anger, mux, &mut self.rng, &self.config.lip);
    }

    /// Post-camera phase: integrates the eye rotation.
    pub fn update_post(&mut self, dt: f32) {
        let look = if self.look.state() == LookState::Tracking && self.target.visible {
            let (heading, pitch) = self.target.angles_from(self.config.head_position);
            (
                heading.clamp(-self.config.look.max_heading, self.config.look.max_heading),
                pitch.clamp(-self.config.look.max_pitch, self.config.look.max_pitch),
            )
        } else {
            self.look.eye_angles()
        };

        self.eye
            .aim(look, self.head.expressed_angles(), &self.config.eye);
        self.eye.update(dt, &self.config.eye);
    }

    fn start(&mut self, mux: &mut ClipMultiplexer) {
        self.started = true;
        let clips = &self.config.clips;
        self.idle_variants = Some(idle_variants(mux, |name| clips.is_idle_additive(name)));

        if self.config.auto_start_idle && !mux.is_playing(&clips.idle).unwrap_or(true) {
            let _ = mux.play(&clips.idle, 1.0);
            log::debug!("{}: started base idle '{}'", self.instance, clips.idle);
        }
    }

    fn fixed_update(&mut self, dt: f32, mux: &mut ClipMultiplexer) {
        self.ticks += 1;

        // 1. Target kinematics
        self.target.sample(dt);
        let delta_velocity = self.target.delta_velocity();

        // 2. Mood
        let tracking = self.target.visible && self.look.state() == LookState::Tracking;
        self.mood
            .update(dt, delta_velocity, tracking, &self.config.mood);

        // 3. Look direction
        let visible_angles = self
            .target
            .visible
            .then(|| self.target.angles_from(self.config.head_position));
        let decision = self.look.update(
            dt,
            visible_angles,
            self.mood.disdain,
            &mut self.rng,
            &self.config.look,
        );
        if decision.entered_disdain {
            self.half_eyes
                .trigger(mux, self.config.look.disdain_eyes_duration);
        }

        // 4. Head weights
        match decision.motion {
            HeadMotion::Ease => {
                let speed = self
                    .mood
                    .ease_speed(self.config.look.ease_base, self.config.look.ease_interest);
                self.head.track(decision.heading, decision.pitch, speed, dt);
            }
            HeadMotion::Turn { fraction, begin } => {
                if begin {
                    self.head.begin_turn(decision.heading, decision.pitch);
                }
                self.head.turn(fraction);
            }
        }
        self.head.apply(mux);

        self.update_expressions(dt, mux);

        // 5. Idle additive
        let variants = self.idle_variants.as_deref().unwrap_or_default();
        self.idle
            .update(dt, variants, mux, &mut self.rng, &self.config.idle);

        // 6. Arm raise
        let side = if self.head.heading.angle() >= 0.0 {
            ArmSide::Left
        } else {
            ArmSide::Right
        };
        let head_axis = match side {
            ArmSide::Left => &self.head.heading.positive,
            ArmSide::Right => &self.head.heading.negative,
        };
        let input = ArmInput {
            delta_velocity,
            interest: self.mood.interest,
            side,
            head_now: head_axis.now,
            head_target: head_axis.target,
        };
        self.arm.update(dt, input, mux, &self.config.arm);
    }

    /// Surprise while tracking a target that startles but does not annoy,
    /// plus the timers of the running one-shots.
    fn update_expressions(&mut self, dt: f32, mux: &mut ClipMultiplexer) {
        let tuning = &self.config.look;
        let startled = self.look.state() == LookState::Tracking
            && self.target.visible
            && self.mood.fear > 0.0
            && self.mood.anger < tuning.surprise_max_anger
            && self.mood.interest < tuning.surprise_max_interest;
        if startled && !self.surprise.is_running() {
            self.surprise.trigger(mux, tuning.surprise_duration);
        }

        self.surprise.update(dt, mux);
        self.half_eyes.update(dt, mux);
    }
}
