pub mod clip;
pub mod multiplexer;
pub mod registry;
pub mod sim;

pub use clip::{Clip, ClipKind, ClipSource, PlayMode};
pub use multiplexer::ClipMultiplexer;
pub use registry::{AnimationRegistry, MultiplexerHandle, PLAYER_SUFFIX};
pub use sim::{SimClip, SimClipProbe, SimClock, SimModel};
