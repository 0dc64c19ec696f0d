use crate::config::MoodTuning;

/// Emotion-like scalars driving the performance.
///
/// All three levels live in [0, 1] and decay linearly every tick. `disdain`
/// is a hysteresis flag on `anger`: set above `disdain_enter`, cleared only
/// below `disdain_exit`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoodState {
    pub interest: f32,
    pub anger: f32,
    pub fear: f32,
    pub disdain: bool,
}

impl MoodState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_levels(interest: f32, anger: f32, fear: f32) -> Self {
        let mut mood = Self {
            interest: interest.clamp(0.0, 1.0),
            anger: anger.clamp(0.0, 1.0),
            fear: fear.clamp(0.0, 1.0),
            disdain: false,
        };
        mood.refresh_disdain(&MoodTuning::default());
        mood
    }

    /// Advances one fixed tick.
    ///
    /// `delta_velocity` is the change of target velocity (cm/s) since the
    /// previous tick; `tracking` is true while a visible target is followed.
    pub fn update(&mut self, dt: f32, delta_velocity: f32, tracking: bool, tuning: &MoodTuning) {
        let delta_velocity = delta_velocity.max(0.0);
        let excess = (delta_velocity - tuning.agitation_threshold).max(0.0);

        self.interest = (self.interest - tuning.interest_decay * dt).max(0.0);
        if !self.disdain {
            let gain = (delta_velocity * tuning.interest_gain).min(1.0);
            self.interest = (self.interest + gain).min(1.0);
        }

        self.anger = (self.anger - tuning.anger_decay * dt).max(0.0);
        if tracking {
            self.anger = (self.anger + excess * excess * tuning.anger_gain).min(1.0);
        }

        self.fear = (self.fear - tuning.fear_decay * dt).max(0.0);
        self.fear = (self.fear + excess * tuning.fear_gain).min(1.0);

        self.refresh_disdain(tuning);
    }

    /// Re-evaluates the disdain flag against the current anger.
    pub fn refresh_disdain(&mut self, tuning: &MoodTuning) {
        if self.disdain {
            if self.anger < tuning.disdain_exit {
                self.disdain = false;
                log::debug!("disdain cleared at anger {:.3}", self.anger);
            }
        } else if self.anger > tuning.disdain_enter {
            self.disdain = true;
            log::debug!("disdain set at anger {:.3}", self.anger);
        }
    }

    /// Speed at which head weights chase their target, per second.
    #[must_use]
    pub fn ease_speed(&self, base: f32, per_interest: f32) -> f32 {
        base + self.interest * per_interest
    }
}
