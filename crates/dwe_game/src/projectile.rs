//! Single-slot projectile owned by a controlled entity.
//!
//! The slot holds exactly one fireball. While idle it is pinned to its owner's
//! center every frame; once launched it advances at a fixed speed in the
//! facing recorded at launch, ignoring the owner's later movement. The slot
//! frees itself when the fireball leaves the viewport's horizontal range, or
//! immediately when a hit consumes it.

use dwe_core::rect::Rect;
use glam::Vec2;

use crate::tunables::{FIREBALL_SIZE, FIREBALL_SPEED, VIEWPORT_WIDTH};

#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    rect: Rect,
    facing_right: bool,
    in_flight: bool,
}

impl Projectile {
    pub fn new() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, FIREBALL_SIZE, FIREBALL_SIZE),
            facing_right: true,
            in_flight: false,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Launch in the owner's current facing. Silent no-op while a fireball is
    /// already in flight; returns whether a launch happened.
    pub fn launch(&mut self, facing_right: bool) -> bool {
        if self.in_flight {
            return false;
        }
        self.facing_right = facing_right;
        self.in_flight = true;
        true
    }

    /// Per-frame advance. `owner_center` pins the idle fireball in place.
    pub fn update(&mut self, owner_center: Vec2) {
        if !self.in_flight {
            self.rect.set_center(owner_center);
            return;
        }

        let dx = if self.facing_right {
            FIREBALL_SPEED
        } else {
            -FIREBALL_SPEED
        };
        self.rect.translate(dx, 0.0);

        let x = self.rect.center_x();
        if x >= VIEWPORT_WIDTH || x < 0.0 {
            self.in_flight = false;
        }
    }

    /// Consume the fireball after a hit, freeing the slot.
    pub fn consume(&mut self) {
        self.in_flight = false;
    }
}

impl Default for Projectile {
    fn default() -> Self {
        Self::new()
    }
}
