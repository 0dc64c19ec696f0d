//! Behavior Tunables
//!
//! Every constant the controller uses lives here with its default value.
//! Hosts usually keep the defaults; overrides can be loaded from JSON, where
//! any omitted field falls back to its default:
//!
//! ```rust,ignore
//! let config = BehaviorConfig::from_json_str(r#"{ "mood": { "anger_decay": 0.05 } }"#)?;
//! ```
//!
//! Angles are in degrees unless a field says otherwise. Distances are in
//! centimetres, matching the scene units of the character assets.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use persona_core::{PersonaError, Result};

/// Root configuration of one behavior controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Explicit PRNG seed. `None` derives one from the instance name.
    pub seed: Option<u64>,
    /// Length of one inner update, in seconds.
    pub fixed_step: f32,
    /// Maximum inner updates per frame before backlog is dropped.
    pub max_catch_up_steps: u32,
    /// World position of the character's head, used to turn target
    /// positions into heading and pitch.
    pub head_position: Vec3,
    /// Start the base idle loop on the first update if it is not playing.
    pub auto_start_idle: bool,
    pub mood: MoodTuning,
    pub look: LookTuning,
    pub idle: IdleTuning,
    pub arm: ArmTuning,
    pub blink: BlinkTuning,
    pub lip: LipTuning,
    pub eye: EyeTuning,
    pub clips: ClipNames,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fixed_step: 0.1,
            max_catch_up_steps: 10,
            head_position: Vec3::new(0.0, 150.0, 0.0),
            auto_start_idle: true,
            mood: MoodTuning::default(),
            look: LookTuning::default(),
            idle: IdleTuning::default(),
            arm: ArmTuning::default(),
            blink: BlinkTuning::default(),
            lip: LipTuning::default(),
            eye: EyeTuning::default(),
            clips: ClipNames::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodTuning {
    /// Interest lost per second.
    pub interest_decay: f32,
    /// Interest gained per unit of target velocity change, per tick.
    pub interest_gain: f32,
    pub anger_decay: f32,
    /// Anger gained per squared unit of excess velocity change.
    pub anger_gain: f32,
    pub fear_decay: f32,
    /// Fear gained per unit of excess velocity change.
    pub fear_gain: f32,
    /// Velocity change (cm/s) above which anger and fear start to build.
    pub agitation_threshold: f32,
    pub disdain_enter: f32,
    pub disdain_exit: f32,
}

impl Default for MoodTuning {
    fn default() -> Self {
        Self {
            interest_decay: 0.5,
            interest_gain: 3e-3,
            anger_decay: 0.03,
            anger_gain: 1e-6,
            fear_decay: 0.4,
            fear_gain: 5e-4,
            agitation_threshold: 10.0,
            disdain_enter: 0.6,
            disdain_exit: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookTuning {
    pub max_heading: f32,
    pub max_pitch: f32,
    /// Seconds without a visible target before free-roaming starts.
    pub lost_timeout: f32,
    pub hold_min: f32,
    pub hold_max: f32,
    /// Fixed part of a scripted turn, in seconds.
    pub turn_base: f32,
    /// Seconds added per squared degree of angular distance.
    pub turn_per_angle: f32,
    /// Upper bound of the random pull toward straight ahead.
    pub center_closer_max: f32,
    /// Head weight easing speed per second at zero interest.
    pub ease_base: f32,
    /// Extra easing speed per unit of interest.
    pub ease_interest: f32,
    pub surprise_duration: f32,
    pub surprise_max_anger: f32,
    pub surprise_max_interest: f32,
    pub disdain_eyes_duration: f32,
}

impl Default for LookTuning {
    fn default() -> Self {
        Self {
            max_heading: 90.0,
            max_pitch: 30.0,
            lost_timeout: 2.0,
            hold_min: 0.5,
            hold_max: 0.55,
            turn_base: 0.3,
            turn_per_angle: 1e-4,
            center_closer_max: 0.01,
            ease_base: 2.0,
            ease_interest: 3.0,
            surprise_duration: 2.0,
            surprise_max_anger: 0.1,
            surprise_max_interest: 0.4,
            disdain_eyes_duration: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleTuning {
    pub idle_min: f32,
    pub idle_max: f32,
    /// Idle durations are drawn from `idle_min + k * idle_step`.
    pub idle_step: f32,
    pub additive_min: f32,
    pub additive_max: f32,
    pub fade: f32,
}

impl Default for IdleTuning {
    fn default() -> Self {
        Self {
            idle_min: 5.0,
            idle_max: 15.0,
            idle_step: 5.0,
            additive_min: 4.0,
            additive_max: 4.4,
            fade: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmTuning {
    /// Velocity change (cm/s) that counts as sustained motion.
    pub velocity_threshold: f32,
    /// Seconds of sustained motion before a raise may trigger.
    pub sustain: f32,
    pub min_head_now: f32,
    pub min_head_target: f32,
    pub min_interest: f32,
    /// Raise duration is `duration_scale / velocity change`, clamped.
    pub duration_scale: f32,
    pub min_duration: f32,
    pub max_duration: f32,
    pub fade: f32,
    /// Seconds after a raise ends before another may start.
    pub cooldown: f32,
}

impl Default for ArmTuning {
    fn default() -> Self {
        Self {
            velocity_threshold: 10.0,
            sustain: 2.0,
            min_head_now: 0.1,
            min_head_target: 0.4,
            min_interest: 0.5,
            duration_scale: 60.0,
            min_duration: 3.0,
            max_duration: 6.0,
            fade: 0.5,
            cooldown: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkTuning {
    pub base_interval: f32,
    pub jitter: f32,
}

impl Default for BlinkTuning {
    fn default() -> Self {
        Self {
            base_interval: 0.3,
            jitter: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipTuning {
    pub jitter: f32,
    /// At or above this anger the mouth stays still.
    pub max_anger: f32,
}

impl Default for LipTuning {
    fn default() -> Self {
        Self {
            jitter: 0.1,
            max_anger: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeTuning {
    /// Radians per second, applied to heading and pitch independently.
    pub angular_speed: f32,
    pub max_heading: f32,
    pub max_pitch: f32,
}

impl Default for EyeTuning {
    fn default() -> Self {
        Self {
            angular_speed: 2.0,
            max_heading: 30.0,
            max_pitch: 20.0,
        }
    }
}

/// Clip names the controller drives. Missing clips are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNames {
    pub idle: String,
    /// Additive idle variants are every clip named `<prefix><digits>`.
    pub idle_additive_prefix: String,
    pub head_left: String,
    pub head_right: String,
    pub head_up: String,
    pub head_down: String,
    pub arm_left: String,
    pub arm_right: String,
    pub blink: String,
    pub lip: String,
    pub surprise: String,
    pub half_eyes: String,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            idle: "idle".into(),
            idle_additive_prefix: "idleAdd".into(),
            head_left: "headL".into(),
            head_right: "headR".into(),
            head_up: "headU".into(),
            head_down: "headD".into(),
            arm_left: "armL".into(),
            arm_right: "armR".into(),
            blink: "blink".into(),
            lip: "lip".into(),
            surprise: "surprise".into(),
            half_eyes: "eyeHalf".into(),
        }
    }
}

impl ClipNames {
    /// Returns `true` if `name` is an additive idle variant.
    #[must_use]
    pub fn is_idle_additive(&self, name: &str) -> bool {
        name.strip_prefix(self.idle_additive_prefix.as_str())
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl BehaviorConfig {
    /// Parses a JSON override document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or invert the controller's timing.
    pub fn validate(&self) -> Result<()> {
        fn ensure(ok: bool, what: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(PersonaError::InvalidConfig(what.to_owned()))
            }
        }

        ensure(self.fixed_step > 0.0, "fixed_step must be positive")?;
        ensure(self.max_catch_up_steps > 0, "max_catch_up_steps must be at least 1")?;
        ensure(
            self.mood.disdain_exit <= self.mood.disdain_enter,
            "mood.disdain_exit must not exceed mood.disdain_enter",
        )?;
        ensure(
            self.look.max_heading > 0.0 && self.look.max_pitch > 0.0,
            "look angle limits must be positive",
        )?;
        ensure(self.look.hold_min <= self.look.hold_max, "look.hold_min exceeds look.hold_max")?;
        ensure(self.idle.idle_min <= self.idle.idle_max, "idle.idle_min exceeds idle.idle_max")?;
        ensure(self.idle.idle_step > 0.0, "idle.idle_step must be positive")?;
        ensure(
            self.idle.additive_min <= self.idle.additive_max,
            "idle.additive_min exceeds idle.additive_max",
        )?;
        ensure(
            self.arm.min_duration <= self.arm.max_duration,
            "arm.min_duration exceeds arm.max_duration",
        )?;
        ensure(self.eye.angular_speed >= 0.0, "eye.angular_speed must not be negative")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        BehaviorConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            BehaviorConfig::from_json_str(r#"{ "seed": 7, "mood": { "anger_decay": 0.05 } }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!((config.mood.anger_decay - 0.05).abs() < f32::EPSILON);
        assert!((config.mood.fear_decay - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.clips.head_left, "headL");
    }

    #[test]
    fn inverted_hysteresis_is_rejected() {
        let err = BehaviorConfig::from_json_str(
            r#"{ "mood": { "disdain_enter": 0.4, "disdain_exit": 0.5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, PersonaError::InvalidConfig(_)));
    }

    #[test]
    fn idle_additive_names() {
        let names = ClipNames::default();
        assert!(names.is_idle_additive("idleAdd0"));
        assert!(names.is_idle_additive("idleAdd12"));
        assert!(!names.is_idle_additive("idleAdd"));
        assert!(!names.is_idle_additive("idle"));
        assert!(!names.is_idle_additive("idleAddX"));
    }
}
