//! Persona Core
//!
//! Foundational pieces shared by the animation and behavior crates:
//!
//! - [`errors`]: the [`PersonaError`] type and [`Result`] alias
//! - [`time`]: fixed-step accumulation and frame timing
//! - [`math`]: small blend helpers (smoothstep, bounded approach)

pub mod errors;
pub mod math;
pub mod time;

pub use errors::{PersonaError, Result};
pub use time::{FixedStep, FrameClock};
