//! The level runtime: one struct owns every collection in play and advances
//! the world by exactly one fixed step per `update`.
//!
//! Update order is fixed and load-bearing: later stages assume earlier ones
//! already produced consistent rectangles.
//!
//!   1. projectile pin/advance
//!   2. input (dismount, item use, movement intent)
//!   3. horizontal collision pass
//!   4. vertical collision pass (+ mount hand-off)
//!   5. scroll computation and world shift
//!   6. enemy patrol
//!   7. interaction checks (coins, hearts, crates, enemies, goal, death)
//!   8. timer expiry polls
//!
//! Nothing here blocks, schedules, or draws. The caller polls input before a
//! step and consumes the returned events after it.

use dwe_core::animation::{FrameClip, FrameState};
use dwe_core::input::{Action, InputState};
use dwe_core::rect::Rect;
use dwe_core::time::{SimClock, FIXED_DT_US};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::actor::{Controlled, ControlledKind, Status};
use crate::collision;
use crate::enemy::Enemy;
use crate::events::{FxCue, LevelEvent};
use crate::layout::Layout;
use crate::powerup::{ActiveTimers, ItemKind, PowerUpKind};
use crate::tunables::{
    COLLECTIBLE_SIZE, DRAGON_SPEED, ENEMY_SWARM_SIZE, GOLD_COIN_VALUE, HEART_VALUE, LOW_GRAVITY,
    PLAYER_GRAVITY, PLAYER_RUN_SPEED, RIDER_SEAT_OFFSET, SCROLL_EDGE_FRACTION, SPEED_BOOST,
    STOMP_REBOUND_SPEED, VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WATERMELON_VALUE,
};

const CHARACTER_CLIP: FrameClip = FrameClip {
    frame_count: 4,
    frame_duration_us: 111_000,
    looping: true,
};

const FIREBALL_CLIP: FrameClip = FrameClip {
    frame_count: 4,
    frame_duration_us: 66_000,
    looping: true,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Collectible {
    pub rect: Rect,
    pub value: i32,
}

/// Draw-relevant state for one sprite. The renderer owns everything visual
/// beyond this: which sheet, which row, how to flip.
#[derive(Debug, Clone, Copy)]
pub struct SpriteView {
    pub kind: SpriteKind,
    pub rect: Rect,
    pub facing_right: bool,
    pub frame: usize,
    pub alpha: u8,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Terrain,
    Palm,
    Crate,
    BoostPad,
    Goal,
    Coin,
    Heart,
    Enemy,
    Dragon,
    Player,
    Fireball,
}

pub struct Level {
    pub(crate) clock: SimClock,
    pub(crate) world_shift: f32,
    pub(crate) active: ControlledKind,
    pub(crate) player: Controlled,
    pub(crate) dragon: Option<Controlled>,
    /// Where the whistle will place the dragon. Drifts with the world until
    /// the dragon exists.
    pub(crate) dragon_spawn: Option<Vec2>,
    pub(crate) terrain: Vec<Rect>,
    pub(crate) crates: Vec<Rect>,
    pub(crate) palms: Vec<Rect>,
    pub(crate) constraints: Vec<Rect>,
    pub(crate) jump_boost: Vec<Rect>,
    pub(crate) goal: Option<Rect>,
    pub(crate) coins: Vec<Collectible>,
    pub(crate) hearts: Vec<Collectible>,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) items: Vec<Option<ItemKind>>,
    pub(crate) timers: ActiveTimers,
    rng: StdRng,
    character_anim: FrameState,
    enemy_anim: FrameState,
    fireball_anim: FrameState,
}

impl Level {
    pub fn new(layout: Layout, items: Vec<Option<ItemKind>>) -> Self {
        Self::with_seed(layout, items, rand::random())
    }

    /// Seeded construction: same layout + seed + inputs replays identically.
    pub fn with_seed(layout: Layout, items: Vec<Option<ItemKind>>, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let enemies = layout
            .enemy_spawns
            .iter()
            .map(|&pos| Enemy::spawn(pos, &mut rng))
            .collect();

        Self {
            clock: SimClock::new(),
            world_shift: 0.0,
            active: ControlledKind::Player,
            player: Controlled::new_player(layout.player_spawn),
            dragon: None,
            dragon_spawn: layout.dragon_spawn,
            terrain: layout.terrain,
            crates: layout.crates,
            palms: layout.palms,
            constraints: layout.constraints,
            jump_boost: layout.jump_boost,
            goal: layout.goal,
            coins: layout
                .coins
                .into_iter()
                .map(|(rect, value)| Collectible { rect, value })
                .collect(),
            hearts: Vec::new(),
            enemies,
            items,
            timers: ActiveTimers::new(),
            rng,
            character_anim: FrameState::new(),
            enemy_anim: FrameState::new(),
            fireball_anim: FrameState::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    #[allow(dead_code)]
    pub fn world_shift(&self) -> f32 {
        self.world_shift
    }

    #[allow(dead_code)]
    pub fn active_kind(&self) -> ControlledKind {
        self.active
    }

    pub fn active(&self) -> &Controlled {
        match (self.active, self.dragon.as_ref()) {
            (ControlledKind::Dragon, Some(dragon)) => dragon,
            _ => &self.player,
        }
    }

    fn active_mut(&mut self) -> &mut Controlled {
        match (self.active, self.dragon.as_mut()) {
            (ControlledKind::Dragon, Some(dragon)) => dragon,
            _ => &mut self.player,
        }
    }

    /// Advance the level by one fixed step. The caller clears edge-triggered
    /// input (`InputState::end_frame`) after the step has consumed it.
    pub fn update(&mut self, input: &InputState) -> Vec<LevelEvent> {
        self.clock.advance_step();
        let now = self.clock.now_ms();
        let mut events = Vec::new();

        // Projectiles pin/advance before input so a launch this frame starts
        // flying from the owner's center next frame.
        self.update_projectiles();

        self.handle_dismount(input, &mut events);
        self.handle_items(input, &mut events);
        self.active_mut().read_input(input, &mut events);

        self.move_active();
        self.scroll_world();
        self.step_enemies();
        self.pin_rider();

        self.collect_coins(&mut events);
        self.collect_hearts(&mut events);
        self.check_crates(&mut events);
        self.check_enemy_contacts(now, &mut events);
        self.check_goal(&mut events);
        self.check_death(&mut events);

        self.expire_powerups(now);
        self.player.tick_hurt_invincibility(now);
        if let Some(dragon) = &mut self.dragon {
            dragon.tick_hurt_invincibility(now);
        }

        self.character_anim.tick(FIXED_DT_US, &CHARACTER_CLIP);
        self.enemy_anim.tick(FIXED_DT_US, &CHARACTER_CLIP);
        self.fireball_anim.tick(FIXED_DT_US, &FIREBALL_CLIP);

        events
    }

    // --- input stage -------------------------------------------------------

    fn handle_dismount(&mut self, input: &InputState, events: &mut Vec<LevelEvent>) {
        // Dismount with no dragon under the player is a silent no-op.
        if self.active != ControlledKind::Dragon || !input.is_just_pressed(Action::Dismount) {
            return;
        }
        self.active = ControlledKind::Player;
        self.player.jump();
        events.push(LevelEvent::Cue(FxCue::Jumped));
    }

    fn handle_items(&mut self, input: &InputState, events: &mut Vec<LevelEvent>) {
        for (slot, &action) in Action::ITEM_SLOTS.iter().enumerate() {
            if !input.is_just_pressed(action) {
                continue;
            }
            // Empty or absent slots are silent no-ops.
            let Some(kind) = self.items.get_mut(slot).and_then(|stored| stored.take()) else {
                continue;
            };
            self.apply_item(kind, events);
        }
    }

    fn apply_item(&mut self, kind: ItemKind, events: &mut Vec<LevelEvent>) {
        let now = self.clock.now_ms();
        match kind {
            ItemKind::InvincibilityPotion => {
                self.player.invincible = true;
                self.player.invincible_from_potion = true;
                self.timers.activate(PowerUpKind::Invincibility, now);
            }
            ItemKind::SpeedPotion => {
                self.player.boost_speed = SPEED_BOOST;
                self.timers.activate(PowerUpKind::SpeedBoost, now);
            }
            ItemKind::RocketBoots => {
                self.player.gravity = LOW_GRAVITY;
                self.timers.activate(PowerUpKind::LowGravity, now);
            }
            ItemKind::FreezePotion => {
                for enemy in &mut self.enemies {
                    enemy.freeze();
                }
                self.timers.activate(PowerUpKind::EnemyFreeze, now);
            }
            ItemKind::Watermelon => {
                events.push(LevelEvent::HealthChanged(WATERMELON_VALUE));
            }
            ItemKind::DragonWhistle => self.summon_dragon(),
        }
    }

    fn summon_dragon(&mut self) {
        if self.dragon.is_some() {
            return;
        }
        let Some(spawn) = self.dragon_spawn else {
            return;
        };
        self.dragon = Some(Controlled::new_dragon(spawn));
    }

    // --- physics stage -----------------------------------------------------

    fn update_projectiles(&mut self) {
        let center = self.player.collision_rect.center();
        self.player.projectile.update(center);
        if let Some(dragon) = &mut self.dragon {
            let center = dragon.collision_rect.center();
            dragon.projectile.update(center);
        }
    }

    fn solid_rects(&self) -> Vec<Rect> {
        let mut solids =
            Vec::with_capacity(self.terrain.len() + self.crates.len() + self.palms.len());
        solids.extend_from_slice(&self.terrain);
        solids.extend_from_slice(&self.crates);
        solids.extend_from_slice(&self.palms);
        solids
    }

    fn move_active(&mut self) {
        let solids = self.solid_rects();

        match self.active {
            ControlledKind::Player => {
                let player = &mut self.player;
                player.contacts.begin_pass();

                let dx = player.horizontal_step();
                collision::resolve_horizontal(
                    &mut player.collision_rect,
                    dx,
                    &solids,
                    &mut player.contacts,
                );

                player.apply_gravity();

                // Boost pads resolve before ordinary terrain so a landing on
                // one switches the jump impulse instead of resetting it.
                if collision::resolve_vertical(
                    &mut player.collision_rect,
                    &mut player.velocity.y,
                    &self.jump_boost,
                    &mut player.contacts,
                ) {
                    player.set_jump_boost();
                }
                if collision::resolve_vertical(
                    &mut player.collision_rect,
                    &mut player.velocity.y,
                    &solids,
                    &mut player.contacts,
                ) {
                    player.set_default_jump();
                }

                // A descending player landing on the dragon mounts it instead
                // of colliding.
                let mut mounted = false;
                if let Some(dragon) = &self.dragon {
                    if player.velocity.y > 0.0
                        && player.collision_rect.overlaps(&dragon.visual_rect)
                    {
                        player.collision_rect.set_bottom(dragon.visual_rect.top());
                        player.velocity.y = 0.0;
                        mounted = true;
                    }
                }

                collision::drop_stale_ground(player.velocity.y, &mut player.contacts);
                player.derive_status();
                player.sync_visual_rect();

                if mounted {
                    self.active = ControlledKind::Dragon;
                }
            }
            ControlledKind::Dragon => {
                let Some(dragon) = self.dragon.as_mut() else {
                    return;
                };
                dragon.contacts.begin_pass();

                let dx = dragon.horizontal_step();
                collision::resolve_horizontal(
                    &mut dragon.collision_rect,
                    dx,
                    &solids,
                    &mut dragon.contacts,
                );

                dragon.displace_vertical();
                collision::resolve_vertical(
                    &mut dragon.collision_rect,
                    &mut dragon.velocity.y,
                    &solids,
                    &mut dragon.contacts,
                );

                collision::drop_stale_ground(dragon.velocity.y, &mut dragon.contacts);
                dragon.derive_status();
                dragon.sync_visual_rect();
            }
        }
    }

    // --- scroll stage ------------------------------------------------------

    /// Camera-follow rule: inside the outer quarters of the viewport the
    /// world moves and the entity holds still; in the middle band the entity
    /// moves and the world holds still. The active entity is never shifted.
    fn scroll_world(&mut self) {
        let base = match self.active {
            ControlledKind::Player => PLAYER_RUN_SPEED,
            ControlledKind::Dragon => DRAGON_SPEED,
        };
        let (center_x, intent_x, boost) = {
            let active = self.active();
            (
                active.visual_rect.center_x(),
                active.velocity.x,
                active.boost_speed,
            )
        };

        let edge = VIEWPORT_WIDTH * SCROLL_EDGE_FRACTION;
        let shift;
        let speed;
        if center_x < edge && intent_x < 0.0 {
            shift = base + boost;
            speed = 0.0;
        } else if center_x > VIEWPORT_WIDTH - edge && intent_x > 0.0 {
            shift = -(base + boost);
            speed = 0.0;
        } else {
            shift = 0.0;
            speed = base + boost;
        }

        self.world_shift = shift;
        self.active_mut().speed = speed;
        if shift != 0.0 {
            self.shift_world(shift);
        }
    }

    fn shift_world(&mut self, shift: f32) {
        for rect in self
            .terrain
            .iter_mut()
            .chain(self.crates.iter_mut())
            .chain(self.palms.iter_mut())
            .chain(self.constraints.iter_mut())
            .chain(self.jump_boost.iter_mut())
        {
            rect.translate(shift, 0.0);
        }
        for collectible in self.coins.iter_mut().chain(self.hearts.iter_mut()) {
            collectible.rect.translate(shift, 0.0);
        }
        for enemy in &mut self.enemies {
            enemy.rect.translate(shift, 0.0);
        }
        if let Some(goal) = &mut self.goal {
            goal.translate(shift, 0.0);
        }
        match (&mut self.dragon, self.active) {
            (Some(dragon), ControlledKind::Player) => {
                dragon.collision_rect.translate(shift, 0.0);
                dragon.sync_visual_rect();
            }
            (None, _) => {
                if let Some(spawn) = &mut self.dragon_spawn {
                    spawn.x += shift;
                }
            }
            _ => {}
        }
    }

    // --- enemy stage -------------------------------------------------------

    fn step_enemies(&mut self) {
        for enemy in &mut self.enemies {
            enemy.advance();
            if self.constraints.iter().any(|c| enemy.rect.overlaps(c)) {
                enemy.reverse();
            }
        }
    }

    /// While the dragon is active the player is a passenger: no physics of
    /// its own, position pinned above the saddle every frame.
    fn pin_rider(&mut self) {
        if self.active != ControlledKind::Dragon {
            return;
        }
        let Some(dragon) = &self.dragon else {
            return;
        };
        let seat = Vec2::new(
            dragon.visual_rect.center_x(),
            dragon.visual_rect.center_y() - RIDER_SEAT_OFFSET,
        );
        let facing = dragon.facing_right;
        self.player.collision_rect.set_center(seat);
        self.player.velocity = Vec2::ZERO;
        self.player.facing_right = facing;
        self.player.derive_status();
        self.player.sync_visual_rect();
    }

    // --- interaction stage -------------------------------------------------

    fn collect_coins(&mut self, events: &mut Vec<LevelEvent>) {
        let active_rect = self.active().visual_rect;
        self.coins.retain(|coin| {
            if coin.rect.overlaps(&active_rect) {
                events.push(LevelEvent::CoinsChanged(coin.value));
                events.push(LevelEvent::Cue(FxCue::CoinCollected));
                false
            } else {
                true
            }
        });
    }

    fn collect_hearts(&mut self, events: &mut Vec<LevelEvent>) {
        let active_rect = self.active().visual_rect;
        self.hearts.retain(|heart| {
            if heart.rect.overlaps(&active_rect) {
                events.push(LevelEvent::HealthChanged(heart.value));
                false
            } else {
                true
            }
        });
    }

    fn check_crates(&mut self, events: &mut Vec<LevelEvent>) {
        let projectile = &self.active().projectile;
        if !projectile.in_flight() {
            return;
        }
        let fireball = projectile.rect();

        let Some(hit) = self.crates.iter().position(|c| c.overlaps(&fireball)) else {
            return;
        };
        let crate_rect = self.crates.remove(hit);
        self.active_mut().projectile.consume();
        events.push(LevelEvent::Cue(FxCue::CrateExploded));
        self.spawn_crate_loot(crate_rect);
    }

    /// A broken crate drops a coin, a patrol enemy, a heart, or (rarely
    /// welcome) a whole swarm.
    fn spawn_crate_loot(&mut self, crate_rect: Rect) {
        let origin = Vec2::new(crate_rect.x, crate_rect.y);
        let drop_rect = Rect::from_center(crate_rect.center(), COLLECTIBLE_SIZE, COLLECTIBLE_SIZE);
        match self.rng.gen_range(0..4) {
            0 => self.coins.push(Collectible {
                rect: drop_rect,
                value: GOLD_COIN_VALUE,
            }),
            1 => {
                let enemy = Enemy::spawn(origin, &mut self.rng);
                self.enemies.push(enemy);
            }
            2 => self.hearts.push(Collectible {
                rect: drop_rect,
                value: HEART_VALUE,
            }),
            _ => {
                for _ in 0..ENEMY_SWARM_SIZE {
                    let enemy = Enemy::spawn(origin, &mut self.rng);
                    self.enemies.push(enemy);
                }
            }
        }
    }

    fn check_enemy_contacts(&mut self, now_ms: u64, events: &mut Vec<LevelEvent>) {
        let (attacker_rect, attacker_vy) = {
            let active = self.active();
            (active.visual_rect, active.velocity.y)
        };
        let attacker_bottom = attacker_rect.bottom();

        let mut stomped = false;
        let mut touched = false;
        self.enemies.retain(|enemy| {
            if !enemy.rect.overlaps(&attacker_rect) {
                return true;
            }
            if attacker_vy >= 0.0 && enemy.stomp_window_hit(attacker_bottom) {
                events.push(LevelEvent::Cue(FxCue::Stomped));
                events.push(LevelEvent::Cue(FxCue::EnemyExploded));
                stomped = true;
                false
            } else {
                touched = true;
                true
            }
        });

        if stomped {
            self.active_mut().velocity.y = STOMP_REBOUND_SPEED;
        }
        if touched {
            // No-op while invincible, from either source.
            self.active_mut().take_damage(now_ms, events);
        }

        let projectile = &self.active().projectile;
        if projectile.in_flight() {
            let fireball = projectile.rect();
            if let Some(hit) = self.enemies.iter().position(|e| e.rect.overlaps(&fireball)) {
                self.enemies.remove(hit);
                self.active_mut().projectile.consume();
                events.push(LevelEvent::Cue(FxCue::EnemyExploded));
            }
        }
    }

    fn check_goal(&mut self, events: &mut Vec<LevelEvent>) {
        let Some(goal) = self.goal else {
            return;
        };
        if self.active().visual_rect.overlaps(&goal) {
            events.push(LevelEvent::ReachedGoal);
        }
    }

    fn check_death(&mut self, events: &mut Vec<LevelEvent>) {
        if self.active().visual_rect.top() > VIEWPORT_HEIGHT {
            events.push(LevelEvent::Died);
        }
    }

    // --- timer stage -------------------------------------------------------

    fn expire_powerups(&mut self, now_ms: u64) {
        for kind in self.timers.drain_expired(now_ms) {
            match kind {
                PowerUpKind::Invincibility => {
                    self.player.invincible = false;
                    self.player.invincible_from_potion = false;
                }
                PowerUpKind::SpeedBoost => self.player.boost_speed = 0.0,
                PowerUpKind::LowGravity => self.player.gravity = PLAYER_GRAVITY,
                PowerUpKind::EnemyFreeze => {
                    for enemy in &mut self.enemies {
                        enemy.thaw();
                    }
                }
            }
        }
    }

    // --- renderer contract -------------------------------------------------

    /// Everything the renderer needs this frame, back to front.
    pub fn draw_state(&self) -> Vec<SpriteView> {
        let now = self.clock.now_ms();
        let mut sprites = Vec::new();

        let fixed = |kind: SpriteKind, rect: Rect| SpriteView {
            kind,
            rect,
            facing_right: true,
            frame: 0,
            alpha: 255,
            status: None,
        };

        for &rect in &self.terrain {
            sprites.push(fixed(SpriteKind::Terrain, rect));
        }
        for &rect in &self.jump_boost {
            sprites.push(fixed(SpriteKind::BoostPad, rect));
        }
        for &rect in &self.crates {
            sprites.push(fixed(SpriteKind::Crate, rect));
        }
        if let Some(goal) = self.goal {
            sprites.push(fixed(SpriteKind::Goal, goal));
        }
        for coin in &self.coins {
            sprites.push(fixed(SpriteKind::Coin, coin.rect));
        }
        for heart in &self.hearts {
            sprites.push(fixed(SpriteKind::Heart, heart.rect));
        }
        for enemy in &self.enemies {
            sprites.push(SpriteView {
                kind: SpriteKind::Enemy,
                rect: enemy.rect,
                facing_right: enemy.speed > 0.0,
                frame: self.enemy_anim.frame_index,
                alpha: 255,
                status: None,
            });
        }

        if let Some(dragon) = &self.dragon {
            sprites.push(SpriteView {
                kind: SpriteKind::Dragon,
                rect: dragon.visual_rect,
                facing_right: dragon.facing_right,
                frame: self.character_anim.frame_index,
                alpha: dragon.flicker_alpha(now),
                status: Some(dragon.status),
            });
        }
        sprites.push(SpriteView {
            kind: SpriteKind::Player,
            rect: self.player.visual_rect,
            facing_right: self.player.facing_right,
            frame: self.character_anim.frame_index,
            alpha: self.player.flicker_alpha(now),
            status: Some(self.player.status),
        });

        // Foreground palms overdraw the characters.
        for &rect in &self.palms {
            sprites.push(fixed(SpriteKind::Palm, rect));
        }

        for owner in std::iter::once(&self.player).chain(self.dragon.as_ref()) {
            if owner.projectile.in_flight() {
                sprites.push(SpriteView {
                    kind: SpriteKind::Fireball,
                    rect: owner.projectile.rect(),
                    facing_right: owner.facing_right,
                    frame: self.fireball_anim.frame_index,
                    alpha: 255,
                    status: None,
                });
            }
        }

        sprites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tunables::{
        CONTACT_DAMAGE, DEFAULT_JUMP_SPEED, GOLD_COIN_VALUE, POWER_UP_DURATION_MS, TILE_SIZE,
    };

    /// A flat 20-column floor on row 10, player spawn on row 9.
    fn floor_layout() -> Layout {
        let floor_row = 10.0;
        Layout {
            level_id: "test".to_string(),
            tile_size: TILE_SIZE,
            width_px: 20.0 * TILE_SIZE,
            terrain: (0..20)
                .map(|col| {
                    Rect::new(col as f32 * TILE_SIZE, floor_row * TILE_SIZE, TILE_SIZE, TILE_SIZE)
                })
                .collect(),
            crates: Vec::new(),
            palms: Vec::new(),
            constraints: Vec::new(),
            jump_boost: Vec::new(),
            coins: Vec::new(),
            enemy_spawns: Vec::new(),
            player_spawn: Vec2::new(8.0 * TILE_SIZE, 9.0 * TILE_SIZE),
            goal: None,
            dragon_spawn: None,
        }
    }

    fn level() -> Level {
        Level::with_seed(floor_layout(), Vec::new(), 42)
    }

    fn idle() -> InputState {
        InputState::new()
    }

    fn settle(level: &mut Level, steps: u32) {
        let input = idle();
        for _ in 0..steps {
            level.update(&input);
        }
    }

    #[test]
    fn player_settles_onto_the_floor() {
        let mut level = level();
        settle(&mut level, 5);
        assert!(level.player.contacts.on_ground);
        assert_eq!(level.player.collision_rect.bottom(), 10.0 * TILE_SIZE);
        assert_eq!(level.player.status, Status::Idle);
    }

    #[test]
    fn running_right_moves_at_base_speed_in_the_middle_band() {
        let mut level = level();
        settle(&mut level, 5);
        let x0 = level.player.collision_rect.x;

        let mut input = InputState::new();
        input.action_down(Action::MoveRight);
        level.update(&input);

        assert_eq!(level.player.collision_rect.x, x0 + PLAYER_RUN_SPEED);
        assert_eq!(level.world_shift, 0.0);
        assert_eq!(level.player.status, Status::Run);
    }

    #[test]
    fn left_edge_scrolls_the_world_instead_of_the_player() {
        let mut layout = floor_layout();
        layout.player_spawn = Vec2::new(2.0 * TILE_SIZE, 9.0 * TILE_SIZE);
        let mut level = Level::with_seed(layout, Vec::new(), 42);
        settle(&mut level, 5);
        let terrain_x0 = level.terrain[0].x;

        let mut input = InputState::new();
        input.action_down(Action::MoveLeft);
        level.update(&input);

        assert_eq!(level.world_shift, PLAYER_RUN_SPEED);
        assert_eq!(level.player.speed, 0.0, "entity holds still at the edge");
        assert_eq!(level.terrain[0].x, terrain_x0 + PLAYER_RUN_SPEED);

        // Once the player's own speed is zero the world keeps moving.
        let x_before = level.player.collision_rect.x;
        level.update(&input);
        assert_eq!(level.player.collision_rect.x, x_before);
    }

    #[test]
    fn jump_then_land_passes_through_jump_and_fall() {
        let mut level = level();
        settle(&mut level, 5);

        let mut input = InputState::new();
        input.action_down(Action::Jump);
        level.update(&input);
        assert_eq!(level.player.status, Status::Jump);
        assert!(!level.player.contacts.on_ground, "stale ground dropped");

        // Rises, peaks, falls, lands: eventually grounded again.
        let mut saw_fall = false;
        for _ in 0..120 {
            level.update(&idle());
            if level.player.status == Status::Fall {
                saw_fall = true;
            }
            if level.player.contacts.on_ground {
                break;
            }
        }
        assert!(saw_fall);
        assert!(level.player.contacts.on_ground);
    }

    #[test]
    fn boost_pad_doubles_the_jump_until_an_ordinary_landing() {
        let mut layout = floor_layout();
        // A pad one tile above the floor under the spawn point.
        layout.jump_boost = vec![Rect::new(
            8.0 * TILE_SIZE,
            9.5 * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        )];
        let mut level = Level::with_seed(layout, Vec::new(), 42);
        settle(&mut level, 5);

        assert_eq!(level.player.jump_speed, 2.0 * DEFAULT_JUMP_SPEED);
        assert_eq!(level.player.collision_rect.bottom(), 9.5 * TILE_SIZE);

        // Walk off the pad and land on plain terrain: impulse resets.
        let mut input = InputState::new();
        input.action_down(Action::MoveRight);
        for _ in 0..40 {
            level.update(&input);
        }
        assert_eq!(level.player.jump_speed, DEFAULT_JUMP_SPEED);
    }

    #[test]
    fn coin_overlap_awards_value_once() {
        let mut level = level();
        settle(&mut level, 5);
        level.coins.push(Collectible {
            rect: level.player.visual_rect,
            value: GOLD_COIN_VALUE,
        });

        let events = level.update(&idle());
        assert!(events.contains(&LevelEvent::CoinsChanged(GOLD_COIN_VALUE)));
        assert!(events.contains(&LevelEvent::Cue(FxCue::CoinCollected)));
        assert!(level.coins.is_empty());

        let events = level.update(&idle());
        assert!(!events
            .iter()
            .any(|e| matches!(e, LevelEvent::CoinsChanged(_))));
    }

    #[test]
    fn stomp_kills_the_enemy_and_rebounds_the_attacker() {
        let mut level = level();
        // Mid-air enemy; the player falls into its stomp window.
        let enemy_rect = Rect::new(8.0 * TILE_SIZE, 5.0 * TILE_SIZE, TILE_SIZE, 40.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = Enemy::spawn(Vec2::ZERO, &mut rng);
        enemy.rect = enemy_rect;
        level.enemies.push(enemy);

        level.player.collision_rect.set_bottom(enemy_rect.top() - 2.0);
        level.player.collision_rect.x = enemy_rect.x;
        level.player.velocity.y = 4.0;

        let events = level.update(&idle());
        assert!(level.enemies.is_empty());
        assert_eq!(level.player.velocity.y, STOMP_REBOUND_SPEED);
        assert!(events.contains(&LevelEvent::Cue(FxCue::Stomped)));
        assert!(events.contains(&LevelEvent::Cue(FxCue::EnemyExploded)));
        assert!(!events
            .iter()
            .any(|e| matches!(e, LevelEvent::HealthChanged(_))));
    }

    #[test]
    fn side_contact_damages_once_per_hurt_window() {
        let mut level = level();
        settle(&mut level, 5);
        // Enemy sharing the floor, deep-overlapping the player sideways.
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = Enemy::spawn(Vec2::ZERO, &mut rng);
        enemy.rect = Rect::new(
            level.player.visual_rect.x,
            level.player.visual_rect.y,
            TILE_SIZE,
            level.player.visual_rect.h,
        );
        enemy.speed = 0.0;
        enemy.freeze_multiplier = 0.0;
        level.enemies.push(enemy);

        let events = level.update(&idle());
        assert!(events.contains(&LevelEvent::HealthChanged(CONTACT_DAMAGE)));
        assert!(!level.enemies.is_empty());

        // Still overlapping next frame, but the hurt window holds.
        let events = level.update(&idle());
        assert!(!events
            .iter()
            .any(|e| matches!(e, LevelEvent::HealthChanged(_))));
    }

    #[test]
    fn fireball_breaks_a_crate_and_drops_loot() {
        let mut level = level();
        settle(&mut level, 5);
        let crate_rect = Rect::new(
            level.player.collision_rect.x + 3.0 * TILE_SIZE,
            9.0 * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        );
        level.crates.push(crate_rect);

        let mut input = InputState::new();
        input.action_down(Action::Shoot);
        level.update(&input);
        assert!(level.player.projectile.in_flight());

        let loot_before = level.coins.len() + level.hearts.len() + level.enemies.len();
        for _ in 0..60 {
            level.update(&idle());
            if level.crates.is_empty() {
                break;
            }
        }
        assert!(level.crates.is_empty(), "fireball reached the crate");
        assert!(!level.player.projectile.in_flight(), "hit consumed the slot");

        let dropped =
            level.coins.len() + level.hearts.len() + level.enemies.len() - loot_before;
        assert!(
            dropped == 1 || dropped == crate::tunables::ENEMY_SWARM_SIZE,
            "one drop or a swarm, got {dropped}"
        );
    }

    #[test]
    fn freeze_potion_halts_enemies_for_the_full_window() {
        let mut level = level();
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = Enemy::spawn(Vec2::new(2.0 * TILE_SIZE, 5.0 * TILE_SIZE), &mut rng);
        enemy.speed = 3.0;
        level.enemies.push(enemy);
        level.items = vec![Some(ItemKind::FreezePotion)];

        let mut input = InputState::new();
        input.action_down(Action::Item1);
        level.update(&input);
        input.end_frame();
        let frozen_x = level.enemies[0].rect.x;

        // 180 steps ≈ the 3000 ms window: no displacement anywhere inside it.
        for _ in 0..180 {
            level.update(&input);
            assert_eq!(level.enemies[0].rect.x, frozen_x);
        }

        // First step past expiry resumes the pre-freeze magnitude and sign.
        level.update(&input);
        assert_eq!(level.enemies[0].rect.x, frozen_x + 3.0);
    }

    #[test]
    fn invincibility_potion_overrides_the_hurt_timer_until_expiry() {
        let mut level = level();
        settle(&mut level, 5);
        level.items = vec![Some(ItemKind::InvincibilityPotion)];

        let mut input = InputState::new();
        input.action_down(Action::Item1);
        level.update(&input);
        input.end_frame();
        assert!(level.player.invincible);
        assert!(level.items[0].is_none(), "slot consumed");

        // Well past the 500 ms hurt window, still invincible.
        settle(&mut level, 60);
        assert!(level.player.invincible);

        // Past the potion window, cleared.
        settle(&mut level, 130);
        assert!(level.now_ms() >= POWER_UP_DURATION_MS);
        assert!(!level.player.invincible);
        assert!(!level.player.invincible_from_potion);
    }

    #[test]
    fn rocket_boots_lower_gravity_then_revert() {
        let mut level = level();
        level.items = vec![Some(ItemKind::RocketBoots)];

        let mut input = InputState::new();
        input.action_down(Action::Item1);
        level.update(&input);
        input.end_frame();
        assert_eq!(level.player.gravity, LOW_GRAVITY);

        settle(&mut level, 181);
        assert_eq!(level.player.gravity, PLAYER_GRAVITY);
    }

    #[test]
    fn whistle_summons_the_dragon_and_a_falling_player_mounts_it() {
        let mut layout = floor_layout();
        layout.dragon_spawn = Some(Vec2::new(8.0 * TILE_SIZE, 6.0 * TILE_SIZE));
        let mut level = Level::with_seed(layout, vec![Some(ItemKind::DragonWhistle)], 42);

        let mut input = InputState::new();
        input.action_down(Action::Item1);
        level.update(&input);
        input.end_frame();
        let dragon_rect = level.dragon.as_ref().expect("dragon summoned").visual_rect;

        // Drop the player onto the dragon from just above.
        level.player.collision_rect.x = dragon_rect.x + 10.0;
        level.player.collision_rect.set_bottom(dragon_rect.top() - 1.0);
        level.player.velocity.y = 2.0;
        level.update(&idle());
        assert_eq!(level.active_kind(), ControlledKind::Dragon);

        // Every subsequent frame pins the rider above the saddle.
        level.update(&idle());
        let dragon = level.dragon.as_ref().expect("dragon exists");
        let seat_y = dragon.visual_rect.center_y() - RIDER_SEAT_OFFSET;
        assert_eq!(
            level.player.collision_rect.center_x(),
            dragon.visual_rect.center_x()
        );
        assert_eq!(level.player.collision_rect.center_y(), seat_y);
    }

    #[test]
    fn dismount_reactivates_the_player_with_a_jump() {
        let mut layout = floor_layout();
        layout.dragon_spawn = Some(Vec2::new(8.0 * TILE_SIZE, 6.0 * TILE_SIZE));
        let mut level = Level::with_seed(layout, vec![Some(ItemKind::DragonWhistle)], 42);

        let mut input = InputState::new();
        input.action_down(Action::Item1);
        level.update(&input);
        input.end_frame();

        let dragon_rect = level.dragon.as_ref().expect("dragon summoned").visual_rect;
        level.player.collision_rect.x = dragon_rect.x + 10.0;
        level.player.collision_rect.set_bottom(dragon_rect.top() - 1.0);
        level.player.velocity.y = 2.0;
        level.update(&idle());
        assert_eq!(level.active_kind(), ControlledKind::Dragon);

        let mut input = InputState::new();
        input.action_down(Action::Dismount);
        level.update(&input);
        assert_eq!(level.active_kind(), ControlledKind::Player);
        assert!(level.player.velocity.y < 0.0, "separation jump issued");
    }

    #[test]
    fn goal_overlap_reports_the_win() {
        let mut level = level();
        settle(&mut level, 5);
        level.goal = Some(level.player.visual_rect);
        let events = level.update(&idle());
        assert!(events.contains(&LevelEvent::ReachedGoal));
    }

    #[test]
    fn falling_out_of_the_world_reports_death() {
        let mut layout = floor_layout();
        layout.terrain.clear();
        let mut level = Level::with_seed(layout, Vec::new(), 42);

        let mut died = false;
        for _ in 0..300 {
            if level.update(&idle()).contains(&LevelEvent::Died) {
                died = true;
                break;
            }
        }
        assert!(died);
    }

    #[test]
    fn draw_state_flags_invincibility_with_alpha() {
        let mut level = level();
        settle(&mut level, 5);
        let player_view = level
            .draw_state()
            .into_iter()
            .find(|s| s.kind == SpriteKind::Player)
            .expect("player is always drawn");
        assert_eq!(player_view.alpha, 255);
        assert_eq!(player_view.status, Some(Status::Idle));
    }
}
