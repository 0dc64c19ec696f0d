#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Persona
//!
//! Procedural animation blending and behavior for a desktop character.
//!
//! - [`animation`]: per-character clip multiplexers and the registry
//! - [`behavior`]: mood, gaze, gestures and eye rotation
//! - [`CharacterStage`]: owns both and drives the frame
//!
//! Errors and timing helpers from `persona_core` are re-exported at the root.

pub mod stage;

pub use persona_animation as animation;
pub use persona_behavior as behavior;

pub use persona_animation::{AnimationRegistry, Clip, ClipKind, ClipMultiplexer, ClipSource, PlayMode};
pub use persona_behavior::{BehaviorConfig, BehaviorController, LookState, MoodState};
pub use persona_core::{FixedStep, FrameClock, PersonaError, Result};
pub use stage::CharacterStage;
