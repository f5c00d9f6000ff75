//! Logical-action input state with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(action)` returns true every frame the
//!   action is down. Used for continuous intents like movement and jumping.
//!
//! - **Edge-triggered (just_pressed / just_released):** True only during the
//!   frame the transition happened. They are cleared by `end_frame()`, which
//!   the driver calls only after at least one fixed simulation step has consumed
//!   them. This prevents a press from being silently lost on a frame that has
//!   zero simulation steps.
//!
//! The engine never sees physical keys; the embedder maps its key/button events
//! onto these actions and feeds them in via `action_down` / `action_up`.

use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Jump,
    Shoot,
    Dismount,
    Item1,
    Item2,
    Item3,
    Item4,
    Item5,
    Item6,
}

impl Action {
    /// Item-slot actions in slot order.
    pub const ITEM_SLOTS: [Action; 6] = [
        Action::Item1,
        Action::Item2,
        Action::Item3,
        Action::Item4,
        Action::Item5,
        Action::Item6,
    ];
}

pub struct InputState {
    held: HashSet<Action>,
    just_pressed: HashSet<Action>,
    just_released: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn action_down(&mut self, action: Action) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    pub fn action_up(&mut self, action: Action) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn is_just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
