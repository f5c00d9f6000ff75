//! Driftwood Engine -- headless demo driver and composition root.
//!
//! Loads a level layout, then advances it with a **fixed-timestep** loop (see
//! `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- consume fixed-dt slices, one level update each
//!   3. log the events each step emitted
//!
//! Input comes from a built-in demo script instead of a window: the engine
//! core only ever sees logical actions, so a scripted driver and a real
//! platform shell are interchangeable. Edge-triggered input is cleared only
//! after at least one fixed step consumed it.

mod actor;
mod collision;
mod enemy;
mod events;
mod layout;
mod level;
mod powerup;
mod projectile;
#[cfg(test)]
mod replay;
mod tunables;

use std::path::PathBuf;
use std::time::Duration;

use dwe_core::input::{Action, InputState};
use dwe_core::time::TimeState;

use events::LevelEvent;
use layout::load_layout_from_path;
use level::Level;
use powerup::ItemKind;

const LAYOUT_PATH: &str = "assets/levels/cove_01.json";
const STARTING_HEALTH: i32 = 100;

/// Scripted demo input: how many steps to hold which actions.
const DEMO_SCRIPT: &[(u32, &[Action])] = &[
    (30, &[]),
    (90, &[Action::MoveRight]),
    (25, &[Action::MoveRight, Action::Jump]),
    (60, &[Action::MoveRight]),
    (6, &[Action::Shoot]),
    (40, &[Action::Item1]),
    (240, &[Action::MoveRight]),
    (30, &[Action::MoveRight, Action::Jump]),
    (240, &[Action::MoveRight]),
];

fn main() {
    env_logger::init();

    let layout_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(LAYOUT_PATH));
    let layout = match load_layout_from_path(&layout_path) {
        Ok(layout) => layout,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    log::info!(
        "Loaded level '{}': {:.0}px wide at {:.0}px tiles, {} solid tiles, {} coins, {} enemies",
        layout.level_id,
        layout.width_px,
        layout.tile_size,
        layout.terrain.len(),
        layout.coins.len(),
        layout.enemy_spawns.len()
    );

    let items = vec![
        Some(ItemKind::SpeedPotion),
        Some(ItemKind::FreezePotion),
        Some(ItemKind::Watermelon),
        Some(ItemKind::InvincibilityPotion),
        Some(ItemKind::RocketBoots),
        Some(ItemKind::DragonWhistle),
    ];
    let mut level = match std::env::args().nth(2).and_then(|arg| arg.parse::<u64>().ok()) {
        Some(seed) => Level::with_seed(layout, items, seed),
        None => Level::new(layout, items),
    };

    let steps: Vec<&[Action]> = DEMO_SCRIPT
        .iter()
        .flat_map(|&(count, actions)| std::iter::repeat(actions).take(count as usize))
        .collect();

    let mut time = TimeState::new();
    let mut input = InputState::new();
    let mut held: Vec<Action> = Vec::new();
    let mut health = STARTING_HEALTH;
    let mut coins = 0i32;
    let mut cursor = 0usize;

    'frames: loop {
        time.begin_frame();

        while time.should_step() {
            if cursor >= steps.len() {
                break 'frames;
            }
            apply_held(&mut input, &mut held, steps[cursor]);
            cursor += 1;

            for event in level.update(&input) {
                let now = level.now_ms();
                match event {
                    LevelEvent::HealthChanged(delta) => {
                        health += delta;
                        log::info!("[{now} ms] health {delta:+} -> {health}");
                    }
                    LevelEvent::CoinsChanged(delta) => {
                        coins += delta;
                        log::info!("[{now} ms] coins {delta:+} -> {coins}");
                    }
                    LevelEvent::Died => {
                        log::info!("[{now} ms] fell out of the world");
                        break 'frames;
                    }
                    LevelEvent::ReachedGoal => {
                        log::info!("[{now} ms] reached the goal");
                        break 'frames;
                    }
                    LevelEvent::Cue(cue) => log::debug!("[{now} ms] cue: {cue:?}"),
                }
            }
            if health <= 0 {
                log::info!("[{} ms] health exhausted", level.now_ms());
                break 'frames;
            }
        }

        // Only clear edge-triggered input after a fixed step consumed it.
        if time.steps_this_frame > 0 {
            input.end_frame();
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    for view in level.draw_state() {
        log::trace!(
            "sprite {:?} at ({:.0}, {:.0}) frame {} alpha {} facing_right {} status {:?}",
            view.kind,
            view.rect.x,
            view.rect.y,
            view.frame,
            view.alpha,
            view.facing_right,
            view.status
        );
    }

    let active = level.active();
    log::info!(
        "Run complete at {} ms: position ({:.0}, {:.0}), {} coins, {} health",
        level.now_ms(),
        active.collision_rect.x,
        active.collision_rect.y,
        coins,
        health
    );
}

/// Diff the desired held set into the input state.
fn apply_held(input: &mut InputState, held: &mut Vec<Action>, desired: &[Action]) {
    for &action in held.iter() {
        if !desired.contains(&action) {
            input.action_up(action);
        }
    }
    for &action in desired {
        if !held.contains(&action) {
            input.action_down(action);
        }
    }
    held.clear();
    held.extend_from_slice(desired);
}
