//! Level layout loading: one cell-code grid per layer, JSON on disk.
//!
//! A layout file carries a rectangular grid per layer (terrain, crates,
//! coins, enemies, constraints, jump_boost, player, palms, dragon) where the
//! sentinel `-1` means "empty". Grid coordinates become world pixels through
//! the file's tile size.
//!
//! Structural problems (ragged grids, missing player spawn) fail the load.
//! A cell code with no constructor for its layer is not structural: it is
//! logged and skipped, and the level continues without it.

use dwe_core::rect::Rect;
use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::tunables::{COLLECTIBLE_SIZE, GOLD_COIN_VALUE, SILVER_COIN_VALUE};

pub const EMPTY_CELL: i16 = -1;

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutFile {
    pub version: String,
    pub level_id: String,
    pub tile_size: i32,
    pub terrain: Vec<Vec<i16>>,
    #[serde(default)]
    pub crates: Vec<Vec<i16>>,
    #[serde(default)]
    pub coins: Vec<Vec<i16>>,
    #[serde(default)]
    pub enemies: Vec<Vec<i16>>,
    #[serde(default)]
    pub constraints: Vec<Vec<i16>>,
    #[serde(default)]
    pub jump_boost: Vec<Vec<i16>>,
    pub player: Vec<Vec<i16>>,
    #[serde(default)]
    pub palms: Vec<Vec<i16>>,
    #[serde(default)]
    pub dragon: Vec<Vec<i16>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Terrain,
    Crates,
    Coins,
    Enemies,
    Constraints,
    JumpBoost,
    Player,
    Palms,
    Dragon,
}

impl Layer {
    fn name(self) -> &'static str {
        match self {
            Layer::Terrain => "terrain",
            Layer::Crates => "crates",
            Layer::Coins => "coins",
            Layer::Enemies => "enemies",
            Layer::Constraints => "constraints",
            Layer::JumpBoost => "jump_boost",
            Layer::Player => "player",
            Layer::Palms => "palms",
            Layer::Dragon => "dragon",
        }
    }
}

/// What one layout cell produces, keyed by its layer.
#[derive(Debug, Clone, Copy)]
enum CellSpawn {
    Solid(Rect),
    Crate(Rect),
    Coin { rect: Rect, value: i32 },
    EnemySpawn(Vec2),
    Constraint(Rect),
    JumpBoost(Rect),
    PlayerSpawn(Vec2),
    Goal(Rect),
    DragonSpawn(Vec2),
}

/// The per-layer constructor table. Unknown codes produce `None`.
fn build_cell(layer: Layer, code: i16, pos: Vec2, tile: f32) -> Option<CellSpawn> {
    let tile_rect = Rect::new(pos.x, pos.y, tile, tile);
    match layer {
        // Terrain codes index tile art; every code is the same solid here.
        Layer::Terrain if code >= 0 => Some(CellSpawn::Solid(tile_rect)),
        Layer::Palms if code == 0 || code == 1 => Some(CellSpawn::Solid(tile_rect)),
        Layer::Crates if code == 0 => Some(CellSpawn::Crate(tile_rect)),
        Layer::Coins if code == 0 => Some(CellSpawn::Coin {
            rect: collectible_rect(tile_rect),
            value: GOLD_COIN_VALUE,
        }),
        Layer::Coins if code == 1 => Some(CellSpawn::Coin {
            rect: collectible_rect(tile_rect),
            value: SILVER_COIN_VALUE,
        }),
        Layer::Enemies if code == 0 => Some(CellSpawn::EnemySpawn(pos)),
        Layer::Constraints if code == 0 => Some(CellSpawn::Constraint(tile_rect)),
        Layer::JumpBoost if code == 0 => Some(CellSpawn::JumpBoost(tile_rect)),
        Layer::Player if code == 0 => Some(CellSpawn::PlayerSpawn(pos)),
        Layer::Player if code == 1 => Some(CellSpawn::Goal(tile_rect)),
        Layer::Dragon if code == 0 => Some(CellSpawn::DragonSpawn(pos)),
        _ => None,
    }
}

fn collectible_rect(tile_rect: Rect) -> Rect {
    Rect::from_center(tile_rect.center(), COLLECTIBLE_SIZE, COLLECTIBLE_SIZE)
}

/// A loaded level, in world pixels.
#[derive(Debug, Clone)]
pub struct Layout {
    pub level_id: String,
    pub tile_size: f32,
    pub width_px: f32,
    pub terrain: Vec<Rect>,
    pub crates: Vec<Rect>,
    pub palms: Vec<Rect>,
    pub constraints: Vec<Rect>,
    pub jump_boost: Vec<Rect>,
    pub coins: Vec<(Rect, i32)>,
    pub enemy_spawns: Vec<Vec2>,
    pub player_spawn: Vec2,
    pub goal: Option<Rect>,
    pub dragon_spawn: Option<Vec2>,
}

impl Layout {
    pub fn from_file(file: LayoutFile) -> Result<Self, String> {
        validate_layout(&file)?;
        log::debug!("Building level '{}' ({})", file.level_id, file.version);

        let tile = file.tile_size as f32;
        let cols = file.terrain[0].len();

        let mut layout = Layout {
            level_id: file.level_id.clone(),
            tile_size: tile,
            width_px: cols as f32 * tile,
            terrain: Vec::new(),
            crates: Vec::new(),
            palms: Vec::new(),
            constraints: Vec::new(),
            jump_boost: Vec::new(),
            coins: Vec::new(),
            enemy_spawns: Vec::new(),
            player_spawn: Vec2::ZERO,
            goal: None,
            dragon_spawn: None,
        };

        let layers: [(Layer, &Vec<Vec<i16>>); 9] = [
            (Layer::Terrain, &file.terrain),
            (Layer::Crates, &file.crates),
            (Layer::Coins, &file.coins),
            (Layer::Enemies, &file.enemies),
            (Layer::Constraints, &file.constraints),
            (Layer::JumpBoost, &file.jump_boost),
            (Layer::Player, &file.player),
            (Layer::Palms, &file.palms),
            (Layer::Dragon, &file.dragon),
        ];

        for (layer, grid) in layers {
            for (row, cells) in grid.iter().enumerate() {
                for (col, &code) in cells.iter().enumerate() {
                    if code == EMPTY_CELL {
                        continue;
                    }
                    let pos = Vec2::new(col as f32 * tile, row as f32 * tile);
                    match build_cell(layer, code, pos, tile) {
                        Some(spawn) => layout.place(spawn),
                        None => log::warn!(
                            "Layer '{}' has no constructor for code {code} at ({col}, {row}); cell skipped",
                            layer.name()
                        ),
                    }
                }
            }
        }

        if layout.goal.is_none() {
            log::warn!(
                "Level '{}' has no goal marker. This is allowed but cannot be won.",
                layout.level_id
            );
        }

        Ok(layout)
    }

    fn place(&mut self, spawn: CellSpawn) {
        match spawn {
            CellSpawn::Solid(rect) => self.terrain.push(rect),
            CellSpawn::Crate(rect) => self.crates.push(rect),
            CellSpawn::Coin { rect, value } => self.coins.push((rect, value)),
            CellSpawn::EnemySpawn(pos) => self.enemy_spawns.push(pos),
            CellSpawn::Constraint(rect) => self.constraints.push(rect),
            CellSpawn::JumpBoost(rect) => self.jump_boost.push(rect),
            CellSpawn::PlayerSpawn(pos) => self.player_spawn = pos,
            CellSpawn::Goal(rect) => self.goal = Some(rect),
            CellSpawn::DragonSpawn(pos) => self.dragon_spawn = Some(pos),
        }
    }
}

pub fn load_layout_from_path(path: &Path) -> Result<Layout, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let file: LayoutFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse layout JSON {}: {e}", path.display()))?;
    Layout::from_file(file)
}

fn validate_layout(file: &LayoutFile) -> Result<(), String> {
    if file.tile_size <= 0 {
        return Err("Layout validation failed: tile_size must be > 0".to_string());
    }
    if file.terrain.is_empty() || file.terrain[0].is_empty() {
        return Err("Layout validation failed: terrain grid is empty".to_string());
    }

    let rows = file.terrain.len();
    let cols = file.terrain[0].len();

    let named: [(&str, &Vec<Vec<i16>>); 9] = [
        ("terrain", &file.terrain),
        ("crates", &file.crates),
        ("coins", &file.coins),
        ("enemies", &file.enemies),
        ("constraints", &file.constraints),
        ("jump_boost", &file.jump_boost),
        ("player", &file.player),
        ("palms", &file.palms),
        ("dragon", &file.dragon),
    ];

    for (name, grid) in named {
        if grid.is_empty() {
            continue;
        }
        if grid.len() != rows {
            return Err(format!(
                "Layout validation failed: layer '{name}' has {} rows, terrain has {rows}",
                grid.len()
            ));
        }
        for (row, cells) in grid.iter().enumerate() {
            if cells.len() != cols {
                return Err(format!(
                    "Layout validation failed: layer '{name}' row {row} has {} cells, expected {cols}",
                    cells.len()
                ));
            }
        }
    }

    let count = |grid: &Vec<Vec<i16>>, code: i16| -> usize {
        grid.iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == code)
            .count()
    };

    match count(&file.player, 0) {
        1 => {}
        n => {
            return Err(format!(
                "Layout validation failed: player layer must contain exactly one spawn cell, found {n}"
            ))
        }
    }
    if count(&file.player, 1) > 1 {
        return Err("Layout validation failed: player layer has more than one goal cell".to_string());
    }
    if count(&file.dragon, 0) > 1 {
        return Err("Layout validation failed: dragon layer has more than one spawn cell".to_string());
    }

    Ok(())
}
