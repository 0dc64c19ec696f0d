//! Character Stage
//!
//! The host-facing entry point. A stage owns the [`AnimationRegistry`] and
//! one [`BehaviorController`] per character, and drives both phases of the
//! frame:
//!
//! ```rust,ignore
//! stage.update(dt);                       // mood, gaze, gestures
//! camera.update(dt);                      // host
//! stage.set_look_target_world_pos(name, project(cursor, &camera));
//! stage.update_post(dt);                  // eyes
//! ```

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use persona_animation::{AnimationRegistry, ClipSource};
use persona_behavior::{BehaviorConfig, BehaviorController};
use persona_core::{PersonaError, Result};

#[derive(Default)]
pub struct CharacterStage {
    registry: AnimationRegistry,
    controllers: FxHashMap<String, BehaviorController>,
}

impl CharacterStage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Registers the model's clips and attaches a controller to them.
    pub fn spawn(&mut self, name: &str, model: &dyn ClipSource, config: BehaviorConfig) -> Result<()> {
        if self.controllers.contains_key(name) {
            return Err(PersonaError::InstanceExists(name.to_owned()));
        }
        let controller = BehaviorController::new(name, config)?;
        self.registry.try_add_animation(name, model)?;
        self.controllers.insert(name.to_owned(), controller);
        log::info!("Spawned character '{name}'");
        Ok(())
    }

    /// Removes a character and its clips. Returns `false` if it was unknown.
    pub fn despawn(&mut self, name: &str) -> bool {
        let had_controller = self.controllers.remove(name).is_some();
        let had_clips = self.registry.remove_animation(name);
        if had_controller || had_clips {
            log::info!("Despawned character '{name}'");
        }
        had_controller || had_clips
    }

    /// Drops every character.
    pub fn reset(&mut self) {
        self.controllers.clear();
        self.registry.reset();
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    // ========================================================================
    // Frame phases
    // ========================================================================

    /// Pre-camera phase for every character.
    pub fn update(&mut self, dt: f32) {
        let Self {
            registry,
            controllers,
        } = self;
        for controller in controllers.values_mut() {
            controller.update(dt, registry);
        }
    }

    /// Post-camera phase for every character.
    pub fn update_post(&mut self, dt: f32) {
        for controller in self.controllers.values_mut() {
            controller.update_post(dt);
        }
    }

    // ========================================================================
    // Look target
    // ========================================================================

    pub fn set_look_target_world_pos(&mut self, name: &str, pos: Vec3) -> bool {
        let Some(controller) = self.controllers.get_mut(name) else {
            return false;
        };
        controller.set_look_target_world_pos(pos);
        true
    }

    pub fn set_look_target_visible(&mut self, name: &str, visible: bool) -> bool {
        let Some(controller) = self.controllers.get_mut(name) else {
            return false;
        };
        controller.set_look_target_visible(visible);
        true
    }

    /// Eye bone rotation of a character, identity if unknown.
    #[must_use]
    pub fn eye_rotation(&self, name: &str) -> Quat {
        self.controllers
            .get(name)
            .map_or(Quat::IDENTITY, BehaviorController::eye_rotation)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn controller(&self, name: &str) -> Option<&BehaviorController> {
        self.controllers.get(name)
    }

    pub fn controller_mut(&mut self, name: &str) -> Option<&mut BehaviorController> {
        self.controllers.get_mut(name)
    }

    #[must_use]
    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    /// Direct clip access for host-driven animations (e.g. a wave on click).
    pub fn registry_mut(&mut self) -> &mut AnimationRegistry {
        &mut self.registry
    }
}
