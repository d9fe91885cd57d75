//! World domain plugin for Hollowfield.
//!
//! Responsible for:
//! - Building and holding the active tile grid
//! - Collision queries against the fixed solid set
//! - Scene transitions between the seven areas
//! - Preserving the exterior grid across scene changes

use bevy::prelude::*;

use crate::shared::*;

pub mod maps;
pub mod transitions;

use transitions::{handle_scene_transition, scene_transition_check};

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldGrid>()
            .init_resource::<SceneCache>()
            .add_systems(OnEnter(GameState::Playing), spawn_initial_grid)
            .add_systems(
                FixedUpdate,
                (scene_transition_check, handle_scene_transition)
                    .chain()
                    .in_set(FixedStep::Transitions)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Builds the starting exterior unless a loaded save already put a grid in
/// place.
fn spawn_initial_grid(
    mut grid: ResMut<WorldGrid>,
    player: Res<PlayerState>,
    mut rebuilt: EventWriter<GridRebuiltEvent>,
) {
    if grid.width == 0 {
        *grid = maps::generate_scene(player.scene);
        info!(
            "World grid built: {:?} ({}x{})",
            grid.scene, grid.width, grid.height
        );
    }
    rebuilt.send(GridRebuiltEvent);
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// The active scene's tile grid, indexed `tiles[y][x]`.
#[derive(Resource, Debug, Clone)]
pub struct WorldGrid {
    pub scene: SceneId,
    pub tiles: Vec<Vec<Tile>>,
    pub width: i32,
    pub height: i32,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self {
            scene: SceneId::Exterior,
            tiles: Vec::new(),
            width: 0,
            height: 0,
        }
    }
}

impl WorldGrid {
    pub fn from_tiles(scene: SceneId, tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len() as i32;
        let width = tiles.first().map_or(0, |row| row.len() as i32);
        Self {
            scene,
            tiles,
            width,
            height,
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        if self.in_bounds(x, y) {
            Some(self.tiles[y as usize][x as usize])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            self.tiles[y as usize][x as usize] = tile;
        }
    }

    /// Out-of-bounds counts as solid so movement clamps at the edges.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        match self.get(x, y) {
            Some(tile) => tile.is_solid(),
            None => true,
        }
    }

    /// Collision check for a pixel-space position. The grid cell is the
    /// rounded pixel position, same as the player's derived grid pos.
    pub fn check_collision(&self, pixel_x: f32, pixel_y: f32) -> bool {
        let gx = (pixel_x / CELL_SIZE).round() as i32;
        let gy = (pixel_y / CELL_SIZE).round() as i32;
        self.is_solid(gx, gy)
    }

    /// Every mutable farm position: inside the farm rectangle, exterior only.
    pub fn is_farm_plot(&self, x: i32, y: i32) -> bool {
        self.scene.is_farmable() && in_farm_rect(x, y)
    }
}

pub fn in_farm_rect(x: i32, y: i32) -> bool {
    x >= FARM_START_X
        && x < FARM_START_X + FARM_SIZE
        && y >= FARM_START_Y
        && y < FARM_START_Y + FARM_SIZE
}

/// Exterior grid kept alive while the player is in another scene, so crops
/// and chopped trees survive the round trip. Interiors are regenerated
/// fresh every entry.
#[derive(Resource, Debug, Clone, Default)]
pub struct SceneCache {
    pub exterior: Option<Vec<Vec<Tile>>>,
}

/// Debug-overlay label for whatever the player is facing.
pub fn describe_tile(tile: &Tile) -> &'static str {
    match tile {
        Tile::Empty => "soil",
        Tile::Crop(c) if c.is_tilled() => "tilled soil",
        Tile::Crop(c) if c.corrupted => "corrupted crop",
        Tile::Crop(_) => "crop",
        Tile::Terrain(t) => match t {
            Terrain::Grass => "grass",
            Terrain::Path => "path",
            Terrain::StonePath => "stone path",
            Terrain::Water => "water",
            Terrain::Fence => "fence",
            Terrain::StoneWall => "stone wall",
            Terrain::Tree { .. } => "tree",
            Terrain::HouseWall => "house wall",
            Terrain::HouseFloor => "house floor",
            Terrain::HouseDoor => "house door",
            Terrain::BuildingWall => "building wall",
            Terrain::BuildingFloor => "building floor",
            Terrain::BuildingDoor => "building door",
            Terrain::Fountain => "fountain",
            Terrain::Forge => "forge",
            Terrain::Furniture(f) => match f {
                Furniture::Bed => "bed",
                Furniture::Table => "table",
                Furniture::Chest => "chest",
                Furniture::ShopCounter => "shop counter",
                Furniture::ShopShelf => "shop shelf",
                Furniture::Anvil => "anvil",
                Furniture::KitchenCounter => "kitchen counter",
                Furniture::Bookshelf => "bookshelf",
                Furniture::DisplayCase => "display case",
                Furniture::Workbench => "workbench",
                Furniture::Stove => "stove",
            },
            Terrain::ExitToTown => "road to town",
            Terrain::ExitToFarm => "road to the farm",
            Terrain::ExitToArena => "path to the hollow",
        },
    }
}
