//! Scripted input sequences for deterministic level runs (test tooling).
//!
//! A replay file is a list of frames, each naming the actions held that frame
//! plus one-frame presses, with a repeat count. Expanding and diff-feeding
//! them through `InputState` reproduces exactly what a player would have
//! produced, which makes whole-level determinism testable.

use dwe_core::input::{Action, InputState};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::events::LevelEvent;
use crate::level::Level;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub hold: Vec<Action>,
    #[serde(default)]
    pub press: Vec<Action>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One action set per simulation step. A `press` action is down only on
    /// the first step of its frame's repeat run.
    pub fn expanded(&self) -> Vec<HashSet<Action>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                let mut set: HashSet<Action> = frame.hold.iter().copied().collect();
                if i == 0 {
                    set.extend(frame.press.iter().copied());
                }
                out.push(set);
            }
        }
        out
    }
}

/// Feed a replay through a level, one step per expanded frame, collecting
/// every event emitted along the way.
pub fn run_replay(level: &mut Level, replay: &ReplaySequence) -> Vec<LevelEvent> {
    let mut input = InputState::new();
    let mut prev: HashSet<Action> = HashSet::new();
    let mut events = Vec::new();

    for frame in replay.expanded() {
        for &action in frame.difference(&prev) {
            input.action_down(action);
        }
        for &action in prev.difference(&frame) {
            input.action_up(action);
        }
        events.extend(level.update(&input));
        input.end_frame();
        prev = frame;
    }

    events
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::tunables::TILE_SIZE;
    use dwe_core::rect::Rect;
    use glam::Vec2;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dwe_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn sample_layout() -> Layout {
        Layout {
            level_id: "replay".to_string(),
            tile_size: TILE_SIZE,
            width_px: 30.0 * TILE_SIZE,
            terrain: (0..30)
                .map(|col| {
                    Rect::new(col as f32 * TILE_SIZE, 10.0 * TILE_SIZE, TILE_SIZE, TILE_SIZE)
                })
                .collect(),
            crates: Vec::new(),
            palms: Vec::new(),
            constraints: vec![
                Rect::new(12.0 * TILE_SIZE, 9.0 * TILE_SIZE, TILE_SIZE, TILE_SIZE),
                Rect::new(18.0 * TILE_SIZE, 9.0 * TILE_SIZE, TILE_SIZE, TILE_SIZE),
            ],
            jump_boost: Vec::new(),
            coins: vec![(
                Rect::new(10.0 * TILE_SIZE, 9.0 * TILE_SIZE, 32.0, 32.0),
                5,
            )],
            enemy_spawns: vec![Vec2::new(15.0 * TILE_SIZE, 9.0 * TILE_SIZE)],
            player_spawn: Vec2::new(8.0 * TILE_SIZE, 9.0 * TILE_SIZE),
            goal: None,
            dragon_spawn: None,
        }
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "hold": ["move_right"], "repeat": 3 },
                { "press": ["jump"], "hold": ["move_right"] }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded();
        assert_eq!(expanded.len(), 4);
        assert!(expanded[0].contains(&Action::MoveRight));
        assert!(!expanded[0].contains(&Action::Jump));
        assert!(expanded[3].contains(&Action::Jump));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty frames should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = ReplaySequence {
            frames: vec![
                ReplayFrame {
                    hold: vec![Action::MoveRight],
                    press: Vec::new(),
                    repeat: 60,
                },
                ReplayFrame {
                    hold: vec![Action::MoveRight],
                    press: vec![Action::Jump],
                    repeat: 1,
                },
                ReplayFrame {
                    hold: vec![Action::MoveRight, Action::Shoot],
                    press: Vec::new(),
                    repeat: 120,
                },
                ReplayFrame {
                    hold: vec![Action::MoveLeft],
                    press: Vec::new(),
                    repeat: 45,
                },
            ],
        };

        let mut run_a = Level::with_seed(sample_layout(), Vec::new(), 1234);
        let mut run_b = Level::with_seed(sample_layout(), Vec::new(), 1234);
        let events_a = run_replay(&mut run_a, &replay);
        let events_b = run_replay(&mut run_b, &replay);

        assert_eq!(events_a, events_b);
        assert_eq!(
            run_a.player.collision_rect, run_b.player.collision_rect,
            "same layout, seed, and inputs must land in the same place"
        );
        assert_eq!(run_a.player.velocity, run_b.player.velocity);
        assert_eq!(run_a.world_shift, run_b.world_shift);
        assert_eq!(run_a.now_ms(), run_b.now_ms());
        assert_eq!(run_a.enemies.len(), run_b.enemies.len());
        for (a, b) in run_a.enemies.iter().zip(run_b.enemies.iter()) {
            assert_eq!(a.rect, b.rect);
            assert_eq!(a.speed, b.speed);
        }
    }

    #[test]
    fn held_action_does_not_retrigger_edges_across_frames() {
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                hold: Vec::new(),
                press: vec![Action::Jump],
                repeat: 5,
            }],
        };
        // One press then four frames without it: exactly one down edge.
        let expanded = replay.expanded();
        assert!(expanded[0].contains(&Action::Jump));
        assert!(expanded[1..].iter().all(|f| !f.contains(&Action::Jump)));
    }
}
