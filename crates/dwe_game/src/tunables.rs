//! World constants. Velocities are px per fixed step, timers are milliseconds
//! on the simulation clock.

pub const TILE_SIZE: f32 = 64.0;
pub const VIEWPORT_WIDTH: f32 = 1200.0;
pub const VIEWPORT_HEIGHT: f32 = 704.0;

/// Horizontal band at each screen edge that triggers world scrolling.
pub const SCROLL_EDGE_FRACTION: f32 = 0.25;

pub const PLAYER_RUN_SPEED: f32 = 8.0;
pub const PLAYER_GRAVITY: f32 = 0.8;
pub const LOW_GRAVITY: f32 = 0.4;
pub const DEFAULT_JUMP_SPEED: f32 = -16.0;
pub const BOOSTED_JUMP_SPEED: f32 = -32.0;
pub const STOMP_REBOUND_SPEED: f32 = -15.0;

pub const PLAYER_VISUAL_WIDTH: f32 = 64.0;
pub const PLAYER_VISUAL_HEIGHT: f32 = 64.0;
/// Narrower than the visual sprite so side padding never snags on walls.
pub const PLAYER_COLLISION_WIDTH: f32 = 50.0;

pub const DRAGON_SPEED: f32 = 8.0;
pub const DRAGON_VISUAL_WIDTH: f32 = 96.0;
pub const DRAGON_VISUAL_HEIGHT: f32 = 64.0;
pub const DRAGON_COLLISION_WIDTH: f32 = DRAGON_VISUAL_WIDTH - 10.0;
/// Vertical offset of a mounted rider above the dragon's center.
pub const RIDER_SEAT_OFFSET: f32 = 30.0;

pub const FIREBALL_SPEED: f32 = 10.0;
pub const FIREBALL_SIZE: f32 = 20.0;

pub const ENEMY_HEIGHT: f32 = 40.0;
pub const ENEMY_MIN_SPEED: i32 = 2;
pub const ENEMY_MAX_SPEED: i32 = 8;
pub const ENEMY_SWARM_SIZE: usize = 25;

pub const CONTACT_DAMAGE: i32 = -10;
pub const HURT_INVINCIBILITY_MS: u64 = 500;
pub const POWER_UP_DURATION_MS: u64 = 3000;
pub const SPEED_BOOST: f32 = 8.0;

pub const GOLD_COIN_VALUE: i32 = 5;
pub const SILVER_COIN_VALUE: i32 = 1;
pub const HEART_VALUE: i32 = 10;
pub const WATERMELON_VALUE: i32 = 10;

pub const COLLECTIBLE_SIZE: f32 = 32.0;
