//! Persona Behavior
//!
//! The procedural layer that makes a character look alive: mood, gaze,
//! head posture, idle shifts, gestures, blinking and eye rotation. Every
//! decision ends up as play/stop/weight commands on the character's
//! [`persona_animation::ClipMultiplexer`].

pub mod axis;
pub mod config;
pub mod controller;
pub mod eye;
pub mod gestures;
pub mod look;
pub mod mood;
pub mod random;
pub mod target;

pub use axis::{AxisBlend, AxisPair, HeadRig};
pub use config::{
    ArmTuning, BehaviorConfig, BlinkTuning, ClipNames, EyeTuning, IdleTuning, LipTuning, LookTuning, MoodTuning,
};
pub use controller::BehaviorController;
pub use eye::EyeRig;
pub use gestures::{ArmRaise, ArmSide, BlinkState, IdleAdditiveState, LipState, OneShot};
pub use look::{HeadMotion, LookDecision, LookDirector, LookState};
pub use mood::MoodState;
pub use target::{LookTarget, direction_angles};
