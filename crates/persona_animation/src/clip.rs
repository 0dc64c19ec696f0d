use serde::{Deserialize, Serialize};

/// How a clip behaves when its playhead reaches the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayMode {
    /// Play once and leave the live pose.
    Once,
    /// Wrap around to the start.
    #[default]
    Loop,
}

/// What a clip animates. Informational only: both kinds go through [`Clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipKind {
    /// Skeletal clip (head, arm posture).
    Bone,
    /// Morph-target clip (eyes, mouth).
    Morph,
}

/// Handle to a clip owned by the clip-evaluation engine.
///
/// The engine samples and composites the clip; the controller only decides
/// whether it plays, at which weight and priority, and where its clock starts.
/// Times are in seconds on the engine clock.
pub trait Clip {
    fn name(&self) -> &str;

    fn kind(&self) -> ClipKind;

    /// Composites the clip into the live pose.
    fn play(&mut self, weight: f32, priority: i32);

    /// Removes the clip from the live pose. Does not touch the weight.
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Engine time of the most recent tick.
    fn engine_time(&self) -> f64;

    /// Sets the engine time at which the clip's internal clock reads zero.
    fn set_start_time(&mut self, time: f64);

    fn start_time(&self) -> f64;

    /// `engine_time() - start_time()`.
    fn elapsed_since_start(&self) -> f64 {
        self.engine_time() - self.start_time()
    }

    /// Authored duration. `0.0` means it has not been measured yet.
    fn duration(&self) -> f32;

    fn set_duration(&mut self, duration: f32);

    /// Measures the duration from clip content, stores it and returns it.
    fn compute_duration(&mut self) -> f32;

    fn weight(&self) -> f32;

    fn set_weight(&mut self, weight: f32);

    fn priority(&self) -> i32;

    fn set_priority(&mut self, priority: i32);

    fn play_mode(&self) -> PlayMode;

    fn set_play_mode(&mut self, mode: PlayMode);
}

/// A loaded model that can hand out its authored clips.
pub trait ClipSource {
    /// Returns one handle per authored clip, with name, duration and play
    /// mode already set from the asset.
    fn enumerate_clips(&self) -> Vec<Box<dyn Clip>>;
}
