use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use persona_core::{PersonaError, Result};

use crate::clip::{ClipSource, PlayMode};
use crate::multiplexer::ClipMultiplexer;

new_key_type! {
    pub struct MultiplexerHandle;
}

/// Suffix appended to an instance name to form its multiplexer key.
pub const PLAYER_SUFFIX: &str = "_Player";

fn player_key(instance: &str) -> String {
    format!("{instance}{PLAYER_SUFFIX}")
}

/// Maps character instance names to their clip multiplexers.
///
/// One registry exists per running character subsystem. The host-facing
/// per-clip methods return `false`/`0`/`None` for unknown instances or clips;
/// the `multiplexer*` accessors expose the underlying [`Result`] for callers
/// that want the reason.
#[derive(Default)]
pub struct AnimationRegistry {
    players: SlotMap<MultiplexerHandle, ClipMultiplexer>,
    by_key: FxHashMap<String, MultiplexerHandle>,
}

impl AnimationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: SlotMap::with_key(),
            by_key: FxHashMap::default(),
        }
    }

    /// Enumerates the model's clips and registers a multiplexer for them.
    pub fn try_add_animation(&mut self, instance: &str, model: &dyn ClipSource) -> Result<MultiplexerHandle> {
        let key = player_key(instance);
        if self.by_key.contains_key(&key) {
            return Err(PersonaError::InstanceExists(instance.to_owned()));
        }

        let clips = model.enumerate_clips();
        log::info!("Registered animation instance '{instance}' with {} clips", clips.len());
        let handle = self.players.insert(ClipMultiplexer::new(instance, clips));
        self.by_key.insert(key, handle);
        Ok(handle)
    }

    /// Returns `false` if an instance of this name already exists.
    pub fn add_animation(&mut self, instance: &str, model: &dyn ClipSource) -> bool {
        match self.try_add_animation(instance, model) {
            Ok(_) => true,
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    /// Destroys the instance's multiplexer. In-flight transitions are discarded.
    pub fn remove_animation(&mut self, instance: &str) -> bool {
        let Some(handle) = self.by_key.remove(&player_key(instance)) else {
            log::debug!("remove_animation: unknown instance '{instance}'");
            return false;
        };
        self.players.remove(handle);
        log::info!("Removed animation instance '{instance}'");
        true
    }

    /// Destroys every multiplexer.
    pub fn reset(&mut self) {
        if !self.players.is_empty() {
            log::info!("Resetting {} animation instances", self.players.len());
        }
        self.players.clear();
        self.by_key.clear();
    }

    #[must_use]
    pub fn contains(&self, instance: &str) -> bool {
        self.by_key.contains_key(&player_key(instance))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Registered instance names in sorted order.
    #[must_use]
    pub fn instance_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .players
            .values()
            .map(|player| player.instance().to_owned())
            .collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn handle(&self, instance: &str) -> Option<MultiplexerHandle> {
        self.by_key.get(&player_key(instance)).copied()
    }

    pub fn multiplexer(&self, instance: &str) -> Result<&ClipMultiplexer> {
        self.handle(instance)
            .and_then(|handle| self.players.get(handle))
            .ok_or_else(|| PersonaError::InstanceNotFound(instance.to_owned()))
    }

    pub fn multiplexer_mut(&mut self, instance: &str) -> Result<&mut ClipMultiplexer> {
        let handle = self
            .handle(instance)
            .ok_or_else(|| PersonaError::InstanceNotFound(instance.to_owned()))?;
        self.players
            .get_mut(handle)
            .ok_or_else(|| PersonaError::InstanceNotFound(instance.to_owned()))
    }

    fn with_mut<T>(&mut self, instance: &str, f: impl FnOnce(&mut ClipMultiplexer) -> Result<T>) -> Option<T> {
        let result = self.multiplexer_mut(instance).and_then(f);
        absorb(result)
    }

    fn with<T>(&self, instance: &str, f: impl FnOnce(&ClipMultiplexer) -> Result<T>) -> Option<T> {
        let result = self.multiplexer(instance).and_then(f);
        absorb(result)
    }

    // ========================================================================
    // Host-facing per-clip surface
    // ========================================================================

    pub fn play(&mut self, instance: &str, clip: &str, weight: f32) -> bool {
        self.with_mut(instance, |m| m.play(clip, weight)).is_some()
    }

    /// Stops one clip, or every clip of the instance for an empty name.
    pub fn stop(&mut self, instance: &str, clip: &str) -> bool {
        self.with_mut(instance, |m| m.stop(clip)).is_some()
    }

    pub fn stop_all(&mut self, instance: &str) -> bool {
        self.with_mut(instance, |m| {
            m.stop_all();
            Ok(())
        })
        .is_some()
    }

    pub fn pause(&mut self, instance: &str, clip: &str) -> bool {
        self.with_mut(instance, |m| m.pause(clip)).is_some()
    }

    pub fn resume(&mut self, instance: &str, clip: &str, weight: f32) -> bool {
        self.with_mut(instance, |m| m.resume(clip, weight)).is_some()
    }

    #[must_use]
    pub fn is_playing(&self, instance: &str, clip: &str) -> bool {
        self.with(instance, |m| m.is_playing(clip)).unwrap_or(false)
    }

    pub fn set_duration(&mut self, instance: &str, duration: f32, clip: &str) -> bool {
        self.with_mut(instance, |m| m.set_duration(clip, duration)).is_some()
    }

    /// Clip duration in seconds, or 0 when unknown.
    pub fn duration(&mut self, instance: &str, clip: &str) -> f32 {
        self.with_mut(instance, |m| m.duration(clip)).unwrap_or(0.0)
    }

    pub fn set_mode(&mut self, instance: &str, mode: PlayMode, clip: &str) -> bool {
        self.with_mut(instance, |m| m.set_play_mode(clip, mode)).is_some()
    }

    #[must_use]
    pub fn mode(&self, instance: &str, clip: &str) -> Option<PlayMode> {
        self.with(instance, |m| m.play_mode(clip))
    }

    pub fn set_priority(&mut self, instance: &str, priority: i32, clip: &str) -> bool {
        self.with_mut(instance, |m| m.set_priority(clip, priority)).is_some()
    }

    #[must_use]
    pub fn priority(&self, instance: &str, clip: &str) -> i32 {
        self.with(instance, |m| m.priority(clip)).unwrap_or(0)
    }

    pub fn set_weight(&mut self, instance: &str, weight: f32, clip: &str) -> bool {
        self.with_mut(instance, |m| m.set_weight(clip, weight)).is_some()
    }

    #[must_use]
    pub fn weight(&self, instance: &str, clip: &str) -> f32 {
        self.with(instance, |m| m.weight(clip)).unwrap_or(0.0)
    }

    /// Clip names of the instance; empty when the instance is unknown.
    #[must_use]
    pub fn clip_list(&self, instance: &str) -> Vec<String> {
        self.with(instance, |m| Ok(m.clip_names())).unwrap_or_default()
    }
}

fn absorb<T>(result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("{err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimModel};

    fn model(clock: &SimClock) -> SimModel {
        SimModel::new(clock)
            .with_bone("idle", 4.0, PlayMode::Loop)
            .with_bone("headL", 2.0, PlayMode::Loop)
    }

    #[test]
    fn duplicate_instance_is_rejected() {
        let clock = SimClock::new();
        let mut registry = AnimationRegistry::new();
        assert!(registry.add_animation("Char1", &model(&clock)));
        assert!(!registry.add_animation("Char1", &model(&clock)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_and_reset() {
        let clock = SimClock::new();
        let mut registry = AnimationRegistry::new();
        registry.add_animation("A", &model(&clock));
        registry.add_animation("B", &model(&clock));
        assert_eq!(registry.instance_names(), vec!["A".to_owned(), "B".to_owned()]);

        assert!(registry.remove_animation("A"));
        assert!(!registry.remove_animation("A"));
        assert!(!registry.contains("A"));
        assert!(registry.contains("B"));

        registry.reset();
        assert!(registry.is_empty());
        assert!(!registry.play("B", "idle", 1.0));
    }

    #[test]
    fn unknown_lookups_return_sentinels() {
        let clock = SimClock::new();
        let mut registry = AnimationRegistry::new();
        registry.add_animation("Char1", &model(&clock));

        assert!(!registry.play("Nobody", "idle", 1.0));
        assert!(!registry.play("Char1", "missing", 1.0));
        assert!(!registry.is_playing("Char1", "missing"));
        assert_eq!(registry.duration("Nobody", "idle"), 0.0);
        assert_eq!(registry.weight("Char1", "missing"), 0.0);
        assert_eq!(registry.priority("Nobody", "idle"), 0);
        assert!(registry.mode("Char1", "missing").is_none());
        assert!(registry.clip_list("Nobody").is_empty());
        assert!(matches!(
            registry.multiplexer("Nobody"),
            Err(PersonaError::InstanceNotFound(_))
        ));
    }

    #[test]
    fn clip_list_is_sorted() {
        let clock = SimClock::new();
        let mut registry = AnimationRegistry::new();
        registry.add_animation("Char1", &model(&clock));
        assert_eq!(
            registry.clip_list("Char1"),
            vec!["headL".to_owned(), "idle".to_owned()]
        );
    }
}
