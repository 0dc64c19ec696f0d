use rustc_hash::FxHashMap;

use persona_core::math::wrap_phase;
use persona_core::{PersonaError, Result};

use crate::clip::{Clip, PlayMode};

/// Per-character table of named clips with play/stop/pause/resume control.
///
/// An empty clip name addresses every clip of the instance for `stop`,
/// `pause`, `resume` and the setters. Getters require a concrete name.
pub struct ClipMultiplexer {
    instance: String,
    clips: FxHashMap<String, Box<dyn Clip>>,
    /// Phase within the loop at the moment each clip was paused.
    pause_offsets: FxHashMap<String, f64>,
}

impl ClipMultiplexer {
    #[must_use]
    pub fn new(instance: impl Into<String>, clips: Vec<Box<dyn Clip>>) -> Self {
        let instance = instance.into();
        let mut table = FxHashMap::default();
        for clip in clips {
            let name = clip.name().to_owned();
            if table.insert(name.clone(), clip).is_some() {
                log::warn!("Instance '{instance}' has duplicate clip '{name}', keeping the last one");
            }
        }

        Self {
            instance,
            clips: table,
            pause_offsets: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    #[must_use]
    pub fn contains(&self, clip: &str) -> bool {
        self.clips.contains_key(clip)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clip names in sorted order.
    #[must_use]
    pub fn clip_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clips.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn clip(&self, name: &str) -> Result<&dyn Clip> {
        match self.clips.get(name) {
            Some(clip) => Ok(&**clip),
            None => Err(not_found(&self.instance, name)),
        }
    }

    fn clip_mut(&mut self, name: &str) -> Result<&mut Box<dyn Clip>> {
        let Self { clips, instance, .. } = self;
        clips.get_mut(name).ok_or_else(|| not_found(instance, name))
    }

    /// Runs `f` on the named clip, or on every clip when `name` is empty.
    fn for_each_target(&mut self, name: &str, mut f: impl FnMut(&mut Box<dyn Clip>)) -> Result<()> {
        if name.is_empty() {
            self.clips.values_mut().for_each(f);
            return Ok(());
        }
        f(self.clip_mut(name)?);
        Ok(())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Sets the weight and starts the clip from its beginning.
    pub fn play(&mut self, name: &str, weight: f32) -> Result<()> {
        let clip = self.clip_mut(name)?;
        let weight = clamp_weight(weight);
        clip.set_weight(weight);
        let now = clip.engine_time();
        clip.set_start_time(now);
        let priority = clip.priority();
        clip.play(weight, priority);
        self.pause_offsets.remove(name);
        log::trace!("{}: play '{name}' at weight {weight:.3}", self.instance);
        Ok(())
    }

    /// Removes the clip (or every clip for an empty name) from the live pose.
    pub fn stop(&mut self, name: &str) -> Result<()> {
        self.for_each_target(name, |clip| clip.stop())
    }

    pub fn stop_all(&mut self) {
        for clip in self.clips.values_mut() {
            clip.stop();
        }
    }

    /// Records the loop phase of a playing clip and stops it.
    ///
    /// Pausing a clip that is not playing keeps any previously stored offset.
    pub fn pause(&mut self, name: &str) -> Result<()> {
        let targets: Vec<String> = if name.is_empty() {
            self.clips
                .iter()
                .filter(|(_, clip)| clip.is_playing())
                .map(|(key, _)| key.clone())
                .collect()
        } else {
            self.clip(name)?;
            vec![name.to_owned()]
        };

        for target in targets {
            let duration = self.duration(&target)?;
            let Some(clip) = self.clips.get_mut(&target) else {
                continue;
            };
            if !clip.is_playing() {
                continue;
            }
            let offset = wrap_phase(clip.elapsed_since_start(), f64::from(duration));
            clip.stop();
            log::trace!("{}: pause '{target}' at phase {offset:.3}", self.instance);
            self.pause_offsets.insert(target, offset);
        }
        Ok(())
    }

    /// Restarts a paused clip at the phase it was paused at.
    ///
    /// Without a stored offset this is a plain [`play`](Self::play). An empty
    /// name resumes every clip that has a stored offset.
    pub fn resume(&mut self, name: &str, weight: f32) -> Result<()> {
        if name.is_empty() {
            let paused: Vec<String> = self.pause_offsets.keys().cloned().collect();
            for target in paused {
                self.resume(&target, weight)?;
            }
            return Ok(());
        }

        let Some(offset) = self.pause_offsets.get(name).copied() else {
            return self.play(name, weight);
        };
        let clip = self.clip_mut(name)?;
        let weight = clamp_weight(weight);
        let now = clip.engine_time();
        clip.set_start_time(now - offset);
        clip.set_weight(weight);
        let priority = clip.priority();
        clip.play(weight, priority);
        self.pause_offsets.remove(name);
        Ok(())
    }

    #[must_use]
    pub fn pause_offset(&self, name: &str) -> Option<f64> {
        self.pause_offsets.get(name).copied()
    }

    pub fn is_playing(&self, name: &str) -> Result<bool> {
        Ok(self.clip(name)?.is_playing())
    }

    /// Seconds since the clip's clock started, wrapped into one loop for looping clips.
    pub fn phase(&mut self, name: &str) -> Result<f64> {
        let duration = self.duration(name)?;
        let clip = self.clip(name)?;
        let elapsed = clip.elapsed_since_start();
        Ok(match clip.play_mode() {
            PlayMode::Loop => wrap_phase(elapsed, f64::from(duration)),
            PlayMode::Once => elapsed.clamp(0.0, f64::from(duration)),
        })
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    pub fn set_duration(&mut self, name: &str, duration: f32) -> Result<()> {
        let duration = duration.max(0.0);
        self.for_each_target(name, |clip| clip.set_duration(duration))
    }

    /// Clip duration, measured from content the first time the engine reports 0.
    pub fn duration(&mut self, name: &str) -> Result<f32> {
        let clip = self.clip_mut(name)?;
        let duration = clip.duration();
        if duration > 0.0 {
            return Ok(duration);
        }
        let measured = clip.compute_duration();
        log::debug!("{}: measured duration of '{name}' = {measured:.3}s", self.instance);
        Ok(measured.max(0.0))
    }

    pub fn set_priority(&mut self, name: &str, priority: i32) -> Result<()> {
        self.for_each_target(name, |clip| clip.set_priority(priority))
    }

    pub fn priority(&self, name: &str) -> Result<i32> {
        Ok(self.clip(name)?.priority())
    }

    /// Sets the weight, clamped to [0, 1].
    pub fn set_weight(&mut self, name: &str, weight: f32) -> Result<()> {
        let weight = clamp_weight(weight);
        self.for_each_target(name, |clip| clip.set_weight(weight))
    }

    pub fn weight(&self, name: &str) -> Result<f32> {
        Ok(self.clip(name)?.weight())
    }

    pub fn set_play_mode(&mut self, name: &str, mode: PlayMode) -> Result<()> {
        self.for_each_target(name, |clip| clip.set_play_mode(mode))
    }

    pub fn play_mode(&self, name: &str) -> Result<PlayMode> {
        Ok(self.clip(name)?.play_mode())
    }
}

/// Clamps to [0, 1]; NaN counts as silence.
fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) }
}

fn not_found(instance: &str, clip: &str) -> PersonaError {
    PersonaError::ClipNotFound {
        instance: instance.to_owned(),
        clip: clip.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClip, SimClock};

    fn mux(clock: &SimClock) -> ClipMultiplexer {
        ClipMultiplexer::new(
            "Test",
            vec![
                Box::new(SimClip::bone(clock, "idle", 4.0, PlayMode::Loop)),
                Box::new(SimClip::morph(clock, "blink", 0.0, PlayMode::Once)),
            ],
        )
    }

    #[test]
    fn unknown_clip_is_not_found() {
        let clock = SimClock::new();
        let mut m = mux(&clock);
        let err = m.play("missing", 1.0).unwrap_err();
        assert!(err.is_not_found());
        assert!(m.weight("").is_err());
    }

    #[test]
    fn zero_duration_is_measured_lazily() {
        let clock = SimClock::new();
        let mut m = mux(&clock);
        let measured = m.duration("blink").unwrap();
        assert!(measured > 0.0);
        assert_eq!(m.duration("blink").unwrap(), measured);
    }

    #[test]
    fn empty_name_applies_to_all() {
        let clock = SimClock::new();
        let mut m = mux(&clock);
        m.set_priority("", 7).unwrap();
        assert_eq!(m.priority("idle").unwrap(), 7);
        assert_eq!(m.priority("blink").unwrap(), 7);

        m.play("idle", 1.0).unwrap();
        m.play("blink", 1.0).unwrap();
        m.stop("").unwrap();
        assert!(!m.is_playing("idle").unwrap());
        assert!(!m.is_playing("blink").unwrap());
    }

    #[test]
    fn resume_without_pause_plays_from_start() {
        let clock = SimClock::new();
        let mut m = mux(&clock);
        clock.advance(3.0);
        m.resume("idle", 0.5).unwrap();
        assert!(m.is_playing("idle").unwrap());
        assert!(m.phase("idle").unwrap().abs() < 1e-9);
        assert!((m.weight("idle").unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pause_all_then_resume_all() {
        let clock = SimClock::new();
        let mut m = mux(&clock);
        m.play("idle", 1.0).unwrap();
        clock.advance(5.0);
        m.pause("").unwrap();
        assert!(!m.is_playing("idle").unwrap());
        assert!((m.pause_offset("idle").unwrap() - 1.0).abs() < 1e-9);
        assert!(m.pause_offset("blink").is_none());

        clock.advance(2.0);
        m.resume("", 1.0).unwrap();
        assert!(m.is_playing("idle").unwrap());
        assert!(!m.is_playing("blink").unwrap());
        assert!((m.phase("idle").unwrap() - 1.0).abs() < 1e-9);
    }
}
