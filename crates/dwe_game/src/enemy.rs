//! Patrol enemies.
//!
//! An enemy walks at a constant signed speed; contact with an invisible
//! constraint tile flips the sign. Freezing zeroes the *effective*
//! displacement through a multiplier; the stored sign and magnitude survive,
//! so a reversal during a freeze still takes effect once the freeze ends.

use dwe_core::rect::Rect;
use glam::Vec2;
use rand::Rng;

use crate::tunables::{ENEMY_HEIGHT, ENEMY_MAX_SPEED, ENEMY_MIN_SPEED, TILE_SIZE};

#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub rect: Rect,
    /// Signed px per frame; the sign is the patrol direction.
    pub speed: f32,
    /// 0 while frozen, 1 otherwise.
    pub freeze_multiplier: f32,
    pub frozen: bool,
}

impl Enemy {
    /// Spawn bottom-aligned inside the tile whose top-left corner is `tile_pos`.
    /// Patrol speed magnitude is rolled per enemy.
    pub fn spawn<R: Rng>(tile_pos: Vec2, rng: &mut R) -> Self {
        let speed = rng.gen_range(ENEMY_MIN_SPEED..=ENEMY_MAX_SPEED) as f32;
        Self {
            rect: Rect::new(
                tile_pos.x,
                tile_pos.y + TILE_SIZE - ENEMY_HEIGHT,
                TILE_SIZE,
                ENEMY_HEIGHT,
            ),
            speed,
            freeze_multiplier: 1.0,
            frozen: false,
        }
    }

    pub fn advance(&mut self) {
        self.rect.x += self.speed * self.freeze_multiplier;
    }

    /// Patrol-boundary reversal: a pure sign flip, even while frozen.
    pub fn reverse(&mut self) {
        self.speed = -self.speed;
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
        self.freeze_multiplier = 0.0;
    }

    pub fn thaw(&mut self) {
        if self.frozen {
            self.frozen = false;
            self.freeze_multiplier = 1.0;
        }
    }

    /// True when an attacker's bottom edge lies strictly inside the stomp
    /// window: below the enemy's top, above its vertical center.
    pub fn stomp_window_hit(&self, attacker_bottom: f32) -> bool {
        self.rect.top() < attacker_bottom && attacker_bottom < self.rect.center_y()
    }
}
