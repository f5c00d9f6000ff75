//! Controlled entities: the player and the rideable dragon.
//!
//! Both kinds share one struct; behavior differences live in the few methods
//! that branch on `ControlledKind`. The player integrates gravity into its
//! vertical velocity; the dragon flies by direct directional speed. Exactly
//! one controlled entity is active at a time; the level resolves which, and
//! routes input only to it.
//!
//! Two rectangles per entity: the narrower collision rect drives terrain
//! resolution, and the visual rect is re-derived from it (plus facing) every
//! frame. Never the other way around.

use dwe_core::input::{Action, InputState};
use dwe_core::rect::Rect;
use glam::Vec2;

use crate::collision::ContactState;
use crate::events::{FxCue, LevelEvent};
use crate::projectile::Projectile;
use crate::tunables::{
    BOOSTED_JUMP_SPEED, CONTACT_DAMAGE, DEFAULT_JUMP_SPEED, DRAGON_COLLISION_WIDTH,
    DRAGON_SPEED, DRAGON_VISUAL_HEIGHT, DRAGON_VISUAL_WIDTH, HURT_INVINCIBILITY_MS,
    PLAYER_COLLISION_WIDTH, PLAYER_GRAVITY, PLAYER_RUN_SPEED, PLAYER_VISUAL_HEIGHT,
    PLAYER_VISUAL_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlledKind {
    Player,
    Dragon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Run,
    Jump,
    Fall,
}

#[derive(Debug, Clone)]
pub struct Controlled {
    pub kind: ControlledKind,
    pub collision_rect: Rect,
    pub visual_rect: Rect,
    /// x is movement intent (-1, 0, 1). y is px-per-frame fall speed for the
    /// player and vertical intent for the dragon.
    pub velocity: Vec2,
    pub facing_right: bool,
    pub status: Status,
    pub contacts: ContactState,
    /// Forward px per frame. The scroll rule zeroes this while the world
    /// moves instead of the entity.
    pub speed: f32,
    pub boost_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub invincible: bool,
    /// Potion invincibility suppresses the short hurt window entirely; only
    /// its own power-up timer may clear the flag.
    pub invincible_from_potion: bool,
    hurt_at_ms: u64,
    pub projectile: Projectile,
}

impl Controlled {
    pub fn new_player(spawn: Vec2) -> Self {
        let collision_rect = Rect::new(
            spawn.x,
            spawn.y,
            PLAYER_COLLISION_WIDTH,
            PLAYER_VISUAL_HEIGHT,
        );
        let mut player = Self {
            kind: ControlledKind::Player,
            collision_rect,
            visual_rect: Rect::new(spawn.x, spawn.y, PLAYER_VISUAL_WIDTH, PLAYER_VISUAL_HEIGHT),
            velocity: Vec2::ZERO,
            facing_right: true,
            status: Status::Idle,
            contacts: ContactState::default(),
            speed: PLAYER_RUN_SPEED,
            boost_speed: 0.0,
            gravity: PLAYER_GRAVITY,
            jump_speed: DEFAULT_JUMP_SPEED,
            invincible: false,
            invincible_from_potion: false,
            hurt_at_ms: 0,
            projectile: Projectile::new(),
        };
        player.sync_visual_rect();
        player
    }

    pub fn new_dragon(spawn: Vec2) -> Self {
        let collision_rect = Rect::new(
            spawn.x,
            spawn.y,
            DRAGON_COLLISION_WIDTH,
            DRAGON_VISUAL_HEIGHT,
        );
        let mut dragon = Self {
            kind: ControlledKind::Dragon,
            collision_rect,
            visual_rect: Rect::new(spawn.x, spawn.y, DRAGON_VISUAL_WIDTH, DRAGON_VISUAL_HEIGHT),
            velocity: Vec2::ZERO,
            facing_right: true,
            status: Status::Idle,
            contacts: ContactState::default(),
            speed: DRAGON_SPEED,
            boost_speed: 0.0,
            gravity: PLAYER_GRAVITY,
            jump_speed: DEFAULT_JUMP_SPEED,
            invincible: false,
            invincible_from_potion: false,
            hurt_at_ms: 0,
            projectile: Projectile::new(),
        };
        dragon.sync_visual_rect();
        dragon
    }

    /// Read the held actions into movement intent. Only the active entity is
    /// ever fed input.
    pub fn read_input(&mut self, input: &InputState, events: &mut Vec<LevelEvent>) {
        if input.is_held(Action::MoveRight) {
            self.velocity.x = 1.0;
            self.facing_right = true;
        } else if input.is_held(Action::MoveLeft) {
            self.velocity.x = -1.0;
            self.facing_right = false;
        } else {
            self.velocity.x = 0.0;
        }

        match self.kind {
            ControlledKind::Player => {
                if input.is_held(Action::Jump) && self.contacts.on_ground {
                    self.jump();
                    events.push(LevelEvent::Cue(FxCue::Jumped));
                }
            }
            ControlledKind::Dragon => {
                if input.is_held(Action::MoveUp) {
                    self.velocity.y = -1.0;
                } else if input.is_held(Action::MoveDown) {
                    self.velocity.y = 1.0;
                } else {
                    self.velocity.y = 0.0;
                }
            }
        }

        if input.is_held(Action::Shoot) {
            // Silent no-op while a fireball is already in flight.
            self.projectile.launch(self.facing_right);
        }
    }

    pub fn jump(&mut self) {
        self.velocity.y = self.jump_speed;
    }

    /// Player vertical integration: accumulate gravity, then displace.
    pub fn apply_gravity(&mut self) {
        self.velocity.y += self.gravity;
        self.collision_rect.y += self.velocity.y;
    }

    /// Dragon vertical integration: intent times speed, no accumulation.
    pub fn displace_vertical(&mut self) {
        self.collision_rect.y += self.velocity.y * self.speed;
    }

    pub fn horizontal_step(&self) -> f32 {
        self.velocity.x * self.speed
    }

    /// Status is a pure function of current velocity, recomputed every frame.
    pub fn derive_status(&mut self) {
        self.status = if self.velocity.y < 0.0 {
            Status::Jump
        } else if self.velocity.y > 1.0 {
            Status::Fall
        } else if self.velocity.x != 0.0 {
            Status::Run
        } else {
            Status::Idle
        };
    }

    pub fn set_jump_boost(&mut self) {
        self.jump_speed = BOOSTED_JUMP_SPEED;
    }

    pub fn set_default_jump(&mut self) {
        self.jump_speed = DEFAULT_JUMP_SPEED;
    }

    /// Silent no-op while invincible; otherwise report the health delta and
    /// open the short hurt window.
    pub fn take_damage(&mut self, now_ms: u64, events: &mut Vec<LevelEvent>) {
        if self.invincible {
            return;
        }
        events.push(LevelEvent::HealthChanged(CONTACT_DAMAGE));
        events.push(LevelEvent::Cue(FxCue::PlayerHit));
        self.invincible = true;
        self.hurt_at_ms = now_ms;
    }

    /// Close the hurt window after its fixed duration. Skipped entirely while
    /// potion invincibility holds the flag.
    pub fn tick_hurt_invincibility(&mut self, now_ms: u64) {
        if self.invincible
            && !self.invincible_from_potion
            && now_ms.saturating_sub(self.hurt_at_ms) >= HURT_INVINCIBILITY_MS
        {
            self.invincible = false;
        }
    }

    /// Re-derive the visual rect from the collision rect plus facing. Sprites
    /// carry asymmetric padding, so the anchor side follows the facing.
    pub fn sync_visual_rect(&mut self) {
        if self.facing_right {
            self.visual_rect
                .set_bottom_left(self.collision_rect.left(), self.collision_rect.bottom());
        } else {
            self.visual_rect
                .set_bottom_right(self.collision_rect.right(), self.collision_rect.bottom());
        }
    }

    /// Draw alpha: a square wave over the clock while invincible, opaque
    /// otherwise.
    pub fn flicker_alpha(&self, now_ms: u64) -> u8 {
        if !self.invincible {
            return 255;
        }
        if (now_ms as f32).sin() >= 0.0 {
            255
        } else {
            0
        }
    }
}
