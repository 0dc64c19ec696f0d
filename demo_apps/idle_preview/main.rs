//! Idle Preview
//!
//! Runs one simulated character for twenty seconds against a scripted
//! cursor: a slow orbit, a long absence, then fast jitter. Prints the mood
//! and look state once per second.
//!
//! ```text
//! cargo run -p idle_preview -- [config.json] [--realtime]
//! ```

use std::time::Duration;

use anyhow::Context;
use glam::Vec3;

use persona::animation::{PlayMode, SimClock, SimModel};
use persona::{BehaviorConfig, CharacterStage, FrameClock};

const NAME: &str = "Char1";
const FRAME: f32 = 1.0 / 60.0;
const RUN_SECONDS: f32 = 20.0;

fn character(clock: &SimClock) -> SimModel {
    SimModel::new(clock)
        .with_bone("idle", 2.4, PlayMode::Loop)
        .with_bone("idleAdd0", 4.0, PlayMode::Once)
        .with_bone("idleAdd1", 4.0, PlayMode::Once)
        .with_bone("headL", 1.0, PlayMode::Loop)
        .with_bone("headR", 1.0, PlayMode::Loop)
        .with_bone("headU", 1.0, PlayMode::Loop)
        .with_bone("headD", 1.0, PlayMode::Loop)
        .with_bone("armL", 0.0, PlayMode::Once)
        .with_bone("armR", 0.0, PlayMode::Once)
        .with_morph("blink", 0.15, PlayMode::Once)
        .with_morph("lip", 0.0, PlayMode::Once)
        .with_morph("surprise", 1.0, PlayMode::Loop)
        .with_morph("eyeHalf", 1.0, PlayMode::Loop)
}

/// Cursor position in world space at time `t`, or `None` while off-screen.
fn cursor(t: f32, head: Vec3) -> Option<Vec3> {
    match t {
        t if t < 6.0 => {
            let angle = t * 0.8;
            Some(head + Vec3::new(angle.sin() * 80.0, angle.cos() * 20.0, 100.0))
        }
        t if t < 12.0 => None,
        t => {
            let jitter = if (t * 10.0) as i32 % 2 == 0 { 60.0 } else { -60.0 };
            Some(head + Vec3::new(jitter, 10.0, 100.0))
        }
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<BehaviorConfig> {
    let Some(path) = path else {
        return Ok(BehaviorConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    BehaviorConfig::from_json_str(&json).with_context(|| format!("parsing {path}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let realtime = args.iter().any(|a| a == "--realtime");
    let config_path = args.iter().find(|a| !a.starts_with("--")).map(String::as_str);
    let config = load_config(config_path)?;
    let head = config.head_position;

    let clock = SimClock::new();
    let model = character(&clock);
    let mut stage = CharacterStage::new();
    stage.spawn(NAME, &model, config)?;
    println!("Spawned {NAME} with clips: {:?}", stage.registry().clip_list(NAME));

    let mut frame_clock = FrameClock::new();
    let mut t = 0.0_f32;
    let mut next_report = 0.0_f32;

    while t < RUN_SECONDS {
        let dt = if realtime {
            std::thread::sleep(Duration::from_secs_f32(FRAME));
            frame_clock.tick()
        } else {
            FRAME
        };

        stage.update(dt);
        clock.advance(f64::from(dt));
        t += dt;

        // Camera step: re-project the cursor before the eyes update.
        match cursor(t, head) {
            Some(pos) => {
                stage.set_look_target_world_pos(NAME, pos);
                stage.set_look_target_visible(NAME, true);
            }
            None => {
                stage.set_look_target_visible(NAME, false);
            }
        }
        stage.update_post(dt);

        if t >= next_report {
            next_report += 1.0;
            if let Some(controller) = stage.controller(NAME) {
                let mood = controller.mood();
                let (heading, pitch) = controller.head().expressed_angles();
                println!(
                    "t={t:5.2}s {:?} interest={:.2} anger={:.2} fear={:.2} head=({heading:6.1}, {pitch:5.1}) arm={}",
                    controller.look_state(),
                    mood.interest,
                    mood.anger,
                    mood.fear,
                    controller.arm().is_running(),
                );
            }
        }
    }

    if let Some(controller) = stage.controller(NAME) {
        log::info!(
            "Finished after {} fixed ticks, {} blinks",
            controller.ticks(),
            controller.blink().blinks
        );
    }
    Ok(())
}
