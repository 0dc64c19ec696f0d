use rand::rngs::StdRng;

use persona_core::math::{TIME_EPSILON, reached};

use crate::config::LookTuning;
use crate::random::roll;

/// Where the character's attention is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookState {
    /// Following the target, or holding its last direction briefly after losing it.
    Tracking,
    /// Angry enough to ignore the target and stare ahead.
    Disdain,
    /// Target lost for a while; holding a glance before the next one.
    SeekTimeout,
    /// Executing a scripted turn toward a random direction.
    LookingAround,
}

/// How the head weights should move this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadMotion {
    /// Chase the requested angles at the mood-scaled easing speed.
    Ease,
    /// Scripted turn: mix from the weights at `begin` by `fraction`.
    Turn { fraction: f32, begin: bool },
}

/// Output of one look decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookDecision {
    pub heading: f32,
    pub pitch: f32,
    pub motion: HeadMotion,
    pub entered_disdain: bool,
}

/// Timers and targets of the free-roaming glance cycle.
#[derive(Debug, Clone, Default)]
pub struct LookAround {
    pub hold_elapsed: f32,
    pub hold_duration: f32,
    pub turn_elapsed: f32,
    pub turn_duration: f32,
    /// Direction of the glance being held or turned toward.
    pub heading: f32,
    pub pitch: f32,
    /// Next glance, already chosen so the eyes can lead the head.
    pub next_heading: f32,
    pub next_pitch: f32,
    /// Completed turns since free-roaming started.
    pub turns: u32,
}

/// Look-direction state machine.
#[derive(Debug, Clone)]
pub struct LookDirector {
    state: LookState,
    lost_time: f32,
    heading: f32,
    pitch: f32,
    around: LookAround,
}

impl Default for LookDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl LookDirector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LookState::Tracking,
            lost_time: 0.0,
            heading: 0.0,
            pitch: 0.0,
            around: LookAround::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> LookState {
        self.state
    }

    /// Seconds since a visible target was last seen.
    #[must_use]
    pub fn lost_time(&self) -> f32 {
        self.lost_time
    }

    #[must_use]
    pub fn look_around(&self) -> &LookAround {
        &self.around
    }

    /// Heading and pitch (degrees) the head is being driven toward.
    #[must_use]
    pub fn head_angles(&self) -> (f32, f32) {
        (self.heading, self.pitch)
    }

    /// Heading and pitch (degrees) the eyes should aim at.
    ///
    /// While free-roaming the eyes already look at the next glance.
    #[must_use]
    pub fn eye_angles(&self) -> (f32, f32) {
        match self.state {
            LookState::SeekTimeout | LookState::LookingAround => {
                (self.around.next_heading, self.around.next_pitch)
            }
            LookState::Tracking | LookState::Disdain => (self.heading, self.pitch),
        }
    }

    fn set_state(&mut self, state: LookState) {
        if self.state != state {
            log::debug!("look state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Advances one fixed tick.
    ///
    /// `target` carries the target's heading and pitch when it is visible.
    pub fn update(
        &mut self,
        dt: f32,
        target: Option<(f32, f32)>,
        disdain: bool,
        rng: &mut StdRng,
        tuning: &LookTuning,
    ) -> LookDecision {
        let mut entered_disdain = false;

        if disdain {
            if self.state != LookState::Disdain {
                self.set_state(LookState::Disdain);
                entered_disdain = true;
            }
            self.heading = 0.0;
            self.pitch = 0.0;
            if target.is_some() {
                self.lost_time = 0.0;
            } else {
                self.lost_time += dt;
            }
            return self.decision(HeadMotion::Ease, entered_disdain);
        }
        if self.state == LookState::Disdain {
            self.set_state(LookState::Tracking);
        }

        if let Some((heading, pitch)) = target {
            self.lost_time = 0.0;
            self.set_state(LookState::Tracking);
            self.heading = heading.clamp(-tuning.max_heading, tuning.max_heading);
            self.pitch = pitch.clamp(-tuning.max_pitch, tuning.max_pitch);
            return self.decision(HeadMotion::Ease, entered_disdain);
        }

        self.lost_time += dt;
        let motion = match self.state {
            LookState::Tracking | LookState::Disdain => {
                if self.lost_time > tuning.lost_timeout + TIME_EPSILON {
                    self.start_roaming(rng, tuning);
                }
                HeadMotion::Ease
            }
            LookState::SeekTimeout => {
                self.around.hold_elapsed += dt;
                if reached(self.around.hold_elapsed, self.around.hold_duration) {
                    self.begin_turn(tuning);
                    HeadMotion::Turn {
                        fraction: 0.0,
                        begin: true,
                    }
                } else {
                    HeadMotion::Ease
                }
            }
            LookState::LookingAround => {
                self.around.turn_elapsed += dt;
                let fraction = if self.around.turn_duration > 0.0 {
                    (self.around.turn_elapsed / self.around.turn_duration).min(1.0)
                } else {
                    1.0
                };
                if reached(self.around.turn_elapsed, self.around.turn_duration) {
                    self.finish_turn(rng, tuning);
                }
                HeadMotion::Turn {
                    fraction,
                    begin: false,
                }
            }
        };

        self.decision(motion, entered_disdain)
    }

    fn decision(&self, motion: HeadMotion, entered_disdain: bool) -> LookDecision {
        let (heading, pitch) = match (self.state, motion) {
            (LookState::LookingAround, _) | (_, HeadMotion::Turn { .. }) => {
                (self.around.heading, self.around.pitch)
            }
            _ => (self.heading, self.pitch),
        };
        LookDecision {
            heading,
            pitch,
            motion,
            entered_disdain,
        }
    }

    fn start_roaming(&mut self, rng: &mut StdRng, tuning: &LookTuning) {
        self.around = LookAround {
            heading: self.heading,
            pitch: self.pitch,
            ..LookAround::default()
        };
        self.choose_next(rng, tuning);
        self.set_state(LookState::SeekTimeout);
    }

    /// Picks the next glance. The pull toward straight ahead grows with the
    /// angle, so wide glances are rarer than small ones.
    fn choose_next(&mut self, rng: &mut StdRng, tuning: &LookTuning) {
        let closer = roll(rng, 0.0, tuning.center_closer_max);
        let heading = roll(rng, -tuning.max_heading, tuning.max_heading);
        let pitch = roll(rng, -tuning.max_pitch, tuning.max_pitch);

        self.around.next_heading = heading * (1.0 - closer * heading.abs()).max(0.0);
        self.around.next_pitch = pitch * (1.0 - closer * pitch.abs()).max(0.0);
        self.around.hold_elapsed = 0.0;
        self.around.hold_duration = roll(rng, tuning.hold_min, tuning.hold_max);
    }

    fn begin_turn(&mut self, tuning: &LookTuning) {
        let dh = self.around.next_heading - self.around.heading;
        let dp = self.around.next_pitch - self.around.pitch;
        self.around.turn_elapsed = 0.0;
        self.around.turn_duration = tuning.turn_base + tuning.turn_per_angle * (dh * dh + dp * dp);
        self.around.heading = self.around.next_heading;
        self.around.pitch = self.around.next_pitch;
        self.heading = self.around.heading;
        self.pitch = self.around.pitch;
        self.set_state(LookState::LookingAround);
    }

    fn finish_turn(&mut self, rng: &mut StdRng, tuning: &LookTuning) {
        self.around.turns += 1;
        self.choose_next(rng, tuning);
        self.set_state(LookState::SeekTimeout);
    }
}
