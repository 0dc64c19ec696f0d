//! Character Stage Tests
//!
//! Tests for:
//! - Spawn/despawn lifecycle and duplicate names
//! - The idle character scenario (timeout, looking around, head motion)
//! - Tracking a visible target with head and eyes
//! - Recovering from a non-finite target position
//! - Blink and lip on the render delta, between fixed ticks
//! - Per-instance determinism and isolation

use glam::{Quat, Vec3};

use persona::animation::{PlayMode, SimClock, SimModel};
use persona::behavior::config::{BlinkTuning, LipTuning};
use persona::{BehaviorConfig, CharacterStage, LookState, PersonaError};

fn character(clock: &SimClock) -> SimModel {
    SimModel::new(clock)
        .with_bone("idle", 2.0, PlayMode::Loop)
        .with_bone("idleAdd0", 4.0, PlayMode::Once)
        .with_bone("headL", 1.0, PlayMode::Loop)
        .with_bone("headR", 1.0, PlayMode::Loop)
        .with_bone("headU", 1.0, PlayMode::Loop)
        .with_bone("headD", 1.0, PlayMode::Loop)
        .with_bone("armL", 3.0, PlayMode::Once)
        .with_bone("armR", 3.0, PlayMode::Once)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn frame(stage: &mut CharacterStage, clock: &SimClock, dt: f32) {
    stage.update(dt);
    clock.advance(f64::from(dt));
    stage.update_post(dt);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn spawn_rejects_duplicate_names() {
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();

    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();
    let err = stage
        .spawn("Char1", &model, BehaviorConfig::default())
        .unwrap_err();
    assert!(matches!(err, PersonaError::InstanceExists(_)));
    assert_eq!(stage.len(), 1);
}

#[test]
fn despawn_and_reset() {
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();
    stage.spawn("Char2", &model, BehaviorConfig::default()).unwrap();

    assert!(stage.despawn("Char1"));
    assert!(!stage.despawn("Char1"));
    assert!(!stage.registry().contains("Char1"));
    assert!(stage.contains("Char2"));

    stage.reset();
    assert!(stage.is_empty());
    assert!(stage.registry().is_empty());
}

#[test]
fn controller_without_clips_is_a_no_op() {
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();

    frame(&mut stage, &clock, 0.1);
    assert!(stage.registry_mut().remove_animation("Char1"));
    for _ in 0..10 {
        frame(&mut stage, &clock, 0.1);
    }
    assert_eq!(stage.controller("Char1").unwrap().ticks(), 1);
}

// ============================================================================
// Idle scenario
// ============================================================================

#[test]
fn idle_character_looks_around() {
    init_logging();
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();

    assert!(stage.registry_mut().play("Char1", "idle", 1.0));
    assert!(stage.registry_mut().set_weight("Char1", 1.0, "idle"));

    let mut seek_timeout_seen = false;
    let mut entered_at = None;
    let mut head_moved = false;
    for i in 0..50 {
        frame(&mut stage, &clock, 0.1);
        let controller = stage.controller("Char1").unwrap();
        match controller.look_state() {
            LookState::SeekTimeout => seek_timeout_seen = true,
            LookState::LookingAround if entered_at.is_none() => entered_at = Some(i),
            _ => {}
        }
        if let Some(start) = entered_at {
            let heading = &controller.head().heading;
            if i - start <= 10 && (heading.positive.now > 0.0 || heading.negative.now > 0.0) {
                head_moved = true;
            }
        }
    }

    assert!(seek_timeout_seen);
    assert!(entered_at.is_some(), "never started looking around");
    assert!(head_moved, "head weights stayed at zero");

    // The host started the idle loop; the controller must not restart it.
    assert_eq!(model.probe("idle").unwrap().play_count(), 1);
    assert!(stage.registry().is_playing("Char1", "idle"));
}

#[test]
fn idle_loop_is_started_automatically() {
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();

    frame(&mut stage, &clock, 0.1);
    assert!(stage.registry().is_playing("Char1", "idle"));
}

// ============================================================================
// Tracking
// ============================================================================

#[test]
fn visible_target_turns_head_and_eyes() {
    init_logging();
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();

    // 45 degrees to the character's left, level with the head.
    assert!(stage.set_look_target_world_pos("Char1", Vec3::new(100.0, 150.0, 100.0)));
    assert!(stage.set_look_target_visible("Char1", true));

    frame(&mut stage, &clock, 0.1);
    assert_ne!(stage.eye_rotation("Char1"), Quat::IDENTITY);

    for _ in 0..30 {
        frame(&mut stage, &clock, 0.1);
    }

    let controller = stage.controller("Char1").unwrap();
    assert_eq!(controller.look_state(), LookState::Tracking);
    assert!((controller.head().heading.positive.now - 0.5).abs() < 1e-3);
    assert_eq!(controller.head().heading.negative.now, 0.0);
    assert!((stage.registry().weight("Char1", "headL") - 0.5).abs() < 1e-3);
    assert!(!stage.registry().is_playing("Char1", "headR"));

    // Head already expresses the full angle, so the eyes return to centre.
    assert!(controller.eye().heading.abs() < 1e-3);
}

#[test]
fn non_finite_target_does_not_poison_the_eyes() {
    init_logging();
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();

    assert!(stage.set_look_target_world_pos("Char1", Vec3::new(f32::NAN, 150.0, 100.0)));
    assert!(stage.set_look_target_visible("Char1", true));
    frame(&mut stage, &clock, 0.1);

    assert!(stage.set_look_target_world_pos("Char1", Vec3::new(50.0, 150.0, 100.0)));
    for _ in 0..50 {
        frame(&mut stage, &clock, 0.1);
    }

    let controller = stage.controller("Char1").unwrap();
    assert!(controller.look_target().velocity().is_finite());
    assert!(controller.eye().heading.is_finite());
    assert!(controller.eye().pitch.is_finite());
    assert!(stage.eye_rotation("Char1").is_finite());
}

#[test]
fn unknown_character_target_is_ignored() {
    let mut stage = CharacterStage::new();
    assert!(!stage.set_look_target_visible("Ghost", true));
    assert!(!stage.set_look_target_world_pos("Ghost", Vec3::ZERO));
    assert_eq!(stage.eye_rotation("Ghost"), Quat::IDENTITY);
}

// ============================================================================
// Wall-clock gestures
// ============================================================================

fn chatty_character(clock: &SimClock) -> SimModel {
    character(clock)
        .with_morph("blink", 0.15, PlayMode::Once)
        .with_morph("lip", 1.0, PlayMode::Once)
}

fn chatty_config() -> BehaviorConfig {
    BehaviorConfig {
        blink: BlinkTuning {
            base_interval: 0.0,
            jitter: 0.05,
        },
        lip: LipTuning {
            jitter: 0.05,
            ..LipTuning::default()
        },
        ..BehaviorConfig::default()
    }
}

#[test]
fn blink_and_lip_run_between_fixed_ticks() {
    let clock = SimClock::new();
    let model = chatty_character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, chatty_config()).unwrap();

    for _ in 0..4 {
        frame(&mut stage, &clock, 1.0 / 60.0);
    }

    let controller = stage.controller("Char1").unwrap();
    assert_eq!(controller.ticks(), 0);
    assert_eq!(controller.blink().blinks, 1);
    assert_eq!(model.probe("blink").unwrap().play_count(), 1);
    assert_eq!(model.probe("lip").unwrap().play_count(), 1);
}

#[test]
fn interest_holds_blinks_but_not_lip() {
    let clock = SimClock::new();
    let model = chatty_character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, chatty_config()).unwrap();
    stage.controller_mut("Char1").unwrap().mood_mut().interest = 0.5;

    for _ in 0..4 {
        frame(&mut stage, &clock, 1.0 / 60.0);
    }

    let controller = stage.controller("Char1").unwrap();
    assert_eq!(controller.ticks(), 0);
    assert_eq!(controller.blink().blinks, 0);
    assert_eq!(model.probe("blink").unwrap().play_count(), 0);
    assert_eq!(model.probe("lip").unwrap().play_count(), 1);
}

// ============================================================================
// Determinism
// ============================================================================

fn roaming_trace(name: &str) -> Vec<(f32, f32)> {
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn(name, &model, BehaviorConfig::default()).unwrap();

    (0..60)
        .map(|_| {
            frame(&mut stage, &clock, 0.1);
            stage.controller(name).unwrap().look().head_angles()
        })
        .collect()
}

#[test]
fn same_instance_name_replays_identically() {
    assert_eq!(roaming_trace("Char1"), roaming_trace("Char1"));
}

#[test]
fn characters_keep_separate_timers() {
    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn("Char1", &model, BehaviorConfig::default()).unwrap();
    for _ in 0..15 {
        frame(&mut stage, &clock, 0.1);
    }

    stage.spawn("Char2", &model, BehaviorConfig::default()).unwrap();
    for _ in 0..10 {
        frame(&mut stage, &clock, 0.1);
    }

    let first = stage.controller("Char1").unwrap();
    let second = stage.controller("Char2").unwrap();
    assert_eq!(first.ticks(), 25);
    assert_eq!(second.ticks(), 10);
    assert!((first.look().lost_time() - 2.5).abs() < 1e-3);
    assert_ne!(first.look_state(), LookState::Tracking);
    assert!((second.look().lost_time() - 1.0).abs() < 1e-3);
}
