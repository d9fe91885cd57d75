//! Static scene layouts.
//!
//! Each generator returns a freshly built grid. The exterior is the only
//! scene whose state matters across visits; it is cached by the transition
//! handler rather than regenerated.

use crate::shared::*;

use super::{in_farm_rect, WorldGrid};

pub const EXTERIOR_WIDTH: i32 = 40;
pub const EXTERIOR_HEIGHT: i32 = 30;

pub const HOUSE_DOOR: (i32, i32) = (4, 4);

/// Where the bed sits in the farmhouse; standing here opens the save prompt.
pub const INTERIOR_BED: (i32, i32) = (2, 2);
/// Where the player wakes up after sleeping, loading, or being knocked out.
pub const INTERIOR_WAKE: (i32, i32) = (5, 3);

/// Town building footprints, used to tell apart identical door tiles.
pub const STORE_FOOTPRINT: (i32, i32, i32, i32) = (2, 5, 8, 10);
pub const BLACKSMITH_FOOTPRINT: (i32, i32, i32, i32) = (12, 1, 18, 5);
pub const COZY_FOOTPRINT: (i32, i32, i32, i32) = (22, 6, 27, 11);

pub fn generate_scene(scene: SceneId) -> WorldGrid {
    let tiles = match scene {
        SceneId::Exterior => exterior_tiles(),
        SceneId::Interior => interior_tiles(),
        SceneId::TownSquare => town_tiles(),
        SceneId::GeneralStore => store_tiles(),
        SceneId::Blacksmith => blacksmith_tiles(),
        SceneId::CozyHouse => cozy_tiles(),
        SceneId::Arena => arena_tiles(),
    };
    WorldGrid::from_tiles(scene, tiles)
}

/// Spawn cell when entering `to` from `from`. Every entry sits next to its
/// transition tile, never on it, so arriving can't immediately re-trigger.
pub fn entry_point(to: SceneId, from: SceneId) -> (i32, i32) {
    match (to, from) {
        (SceneId::Interior, _) => (5, 6),
        (SceneId::Exterior, SceneId::TownSquare) => (37, 15),
        (SceneId::Exterior, SceneId::Arena) => (2, 15),
        (SceneId::Exterior, _) => (4, 5),
        (SceneId::TownSquare, SceneId::GeneralStore) => (5, 11),
        (SceneId::TownSquare, SceneId::Blacksmith) => (15, 6),
        (SceneId::TownSquare, SceneId::CozyHouse) => (24, 12),
        (SceneId::TownSquare, _) => (2, 12),
        (SceneId::GeneralStore, _) => (6, 7),
        (SceneId::Blacksmith, _) => (6, 7),
        (SceneId::CozyHouse, _) => (5, 6),
        (SceneId::Arena, _) => (2, 7),
    }
}

fn filled(width: i32, height: i32, tile: Tile) -> Vec<Vec<Tile>> {
    vec![vec![tile; width as usize]; height as usize]
}

fn set(tiles: &mut [Vec<Tile>], x: i32, y: i32, tile: Tile) {
    tiles[y as usize][x as usize] = tile;
}

fn fill_rect(tiles: &mut [Vec<Tile>], x0: i32, y0: i32, x1: i32, y1: i32, tile: Tile) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            set(tiles, x, y, tile);
        }
    }
}

fn border(tiles: &mut [Vec<Tile>], width: i32, height: i32, wall: Terrain) {
    for x in 0..width {
        set(tiles, x, 0, Tile::Terrain(wall));
        set(tiles, x, height - 1, Tile::Terrain(wall));
    }
    for y in 0..height {
        set(tiles, 0, y, Tile::Terrain(wall));
        set(tiles, width - 1, y, Tile::Terrain(wall));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARM EXTERIOR
// ═══════════════════════════════════════════════════════════════════════

fn exterior_tiles() -> Vec<Vec<Tile>> {
    let (w, h) = (EXTERIOR_WIDTH, EXTERIOR_HEIGHT);
    let mut tiles = filled(w, h, Tile::Terrain(Terrain::Grass));

    // Farmable soil
    for y in 0..h {
        for x in 0..w {
            if in_farm_rect(x, y) {
                set(&mut tiles, x, y, Tile::Empty);
            }
        }
    }

    // Farmhouse with its door on the south face
    fill_rect(&mut tiles, 2, 1, 6, 4, Tile::Terrain(Terrain::HouseWall));
    set(
        &mut tiles,
        HOUSE_DOOR.0,
        HOUSE_DOOR.1,
        Tile::Terrain(Terrain::HouseDoor),
    );

    // Path from the door, and the east-west road at mid-height
    fill_rect(&mut tiles, 4, 5, 4, 7, Tile::Terrain(Terrain::Path));
    fill_rect(&mut tiles, 21, 15, 38, 15, Tile::Terrain(Terrain::Path));
    fill_rect(&mut tiles, 2, 15, 8, 15, Tile::Terrain(Terrain::Path));

    // Pond
    fill_rect(&mut tiles, 30, 20, 34, 23, Tile::Terrain(Terrain::Water));

    // Choppable trees
    for &(x, y) in &[
        (2, 10),
        (3, 18),
        (6, 21),
        (8, 25),
        (12, 20),
        (15, 22),
        (22, 4),
        (25, 8),
        (28, 3),
        (33, 7),
        (36, 22),
        (24, 26),
    ] {
        set(
            &mut tiles,
            x,
            y,
            Tile::Terrain(Terrain::Tree {
                health: TREE_MAX_HEALTH,
            }),
        );
    }

    // Fence line along the top of the farm, with a gap to walk through
    fill_rect(&mut tiles, 10, 4, 19, 4, Tile::Terrain(Terrain::Fence));
    set(&mut tiles, 14, 4, Tile::Terrain(Terrain::Grass));

    // Edge exits: town east, the hollow west
    for y in 14..=16 {
        set(&mut tiles, w - 1, y, Tile::Terrain(Terrain::ExitToTown));
        set(&mut tiles, 0, y, Tile::Terrain(Terrain::ExitToArena));
    }

    tiles
}

// ═══════════════════════════════════════════════════════════════════════
// FARMHOUSE INTERIOR
// ═══════════════════════════════════════════════════════════════════════

fn interior_tiles() -> Vec<Vec<Tile>> {
    let (w, h) = (10, 8);
    let mut tiles = filled(w, h, Tile::Terrain(Terrain::HouseFloor));
    border(&mut tiles, w, h, Terrain::HouseWall);

    set(
        &mut tiles,
        INTERIOR_BED.0,
        INTERIOR_BED.1,
        Tile::Terrain(Terrain::Furniture(Furniture::Bed)),
    );
    set(&mut tiles, 4, 3, Tile::Terrain(Terrain::Furniture(Furniture::Table)));
    set(&mut tiles, 7, 2, Tile::Terrain(Terrain::Furniture(Furniture::Chest)));
    set(
        &mut tiles,
        7,
        5,
        Tile::Terrain(Terrain::Furniture(Furniture::KitchenCounter)),
    );

    set(&mut tiles, 5, h - 1, Tile::Terrain(Terrain::HouseDoor));
    tiles
}

// ═══════════════════════════════════════════════════════════════════════
// TOWN SQUARE
// ═══════════════════════════════════════════════════════════════════════

fn town_tiles() -> Vec<Vec<Tile>> {
    let (w, h) = (30, 25);
    let mut tiles = filled(w, h, Tile::Terrain(Terrain::Grass));

    // Central plaza with a fountain
    fill_rect(&mut tiles, 10, 10, 19, 15, Tile::Terrain(Terrain::StonePath));
    fill_rect(&mut tiles, 14, 12, 15, 13, Tile::Terrain(Terrain::Fountain));

    // General store
    let (sx0, sy0, sx1, sy1) = STORE_FOOTPRINT;
    fill_rect(&mut tiles, sx0, sy0, sx1, sy1, Tile::Terrain(Terrain::BuildingWall));
    set(&mut tiles, 5, sy1, Tile::Terrain(Terrain::BuildingDoor));

    // Blacksmith
    let (bx0, by0, bx1, by1) = BLACKSMITH_FOOTPRINT;
    fill_rect(&mut tiles, bx0, by0, bx1, by1, Tile::Terrain(Terrain::BuildingWall));
    set(&mut tiles, 15, by1, Tile::Terrain(Terrain::BuildingDoor));

    // Cozy house
    let (cx0, cy0, cx1, cy1) = COZY_FOOTPRINT;
    fill_rect(&mut tiles, cx0, cy0, cx1, cy1, Tile::Terrain(Terrain::BuildingWall));
    set(&mut tiles, 24, cy1, Tile::Terrain(Terrain::BuildingDoor));

    // Road back to the farm on the west edge
    fill_rect(&mut tiles, 1, 12, 9, 12, Tile::Terrain(Terrain::Path));
    for y in 11..=13 {
        set(&mut tiles, 0, y, Tile::Terrain(Terrain::ExitToFarm));
    }

    tiles
}

// ═══════════════════════════════════════════════════════════════════════
// BUILDING INTERIORS
// ═══════════════════════════════════════════════════════════════════════

fn store_tiles() -> Vec<Vec<Tile>> {
    let (w, h) = (12, 9);
    let mut tiles = filled(w, h, Tile::Terrain(Terrain::BuildingFloor));
    border(&mut tiles, w, h, Terrain::BuildingWall);

    for x in 3..=5 {
        set(&mut tiles, x, 3, Tile::Terrain(Terrain::Furniture(Furniture::ShopCounter)));
    }
    for x in [2, 3, 4, 7, 8] {
        set(&mut tiles, x, 1, Tile::Terrain(Terrain::Furniture(Furniture::ShopShelf)));
    }
    set(
        &mut tiles,
        8,
        4,
        Tile::Terrain(Terrain::Furniture(Furniture::DisplayCase)),
    );

    set(&mut tiles, 6, h - 1, Tile::Terrain(Terrain::BuildingDoor));
    tiles
}

fn blacksmith_tiles() -> Vec<Vec<Tile>> {
    let (w, h) = (12, 9);
    let mut tiles = filled(w, h, Tile::Terrain(Terrain::BuildingFloor));
    border(&mut tiles, w, h, Terrain::BuildingWall);

    set(&mut tiles, 3, 2, Tile::Terrain(Terrain::Forge));
    set(&mut tiles, 5, 2, Tile::Terrain(Terrain::Furniture(Furniture::Anvil)));
    set(
        &mut tiles,
        8,
        2,
        Tile::Terrain(Terrain::Furniture(Furniture::Workbench)),
    );

    set(&mut tiles, 6, h - 1, Tile::Terrain(Terrain::BuildingDoor));
    tiles
}

fn cozy_tiles() -> Vec<Vec<Tile>> {
    let (w, h) = (10, 8);
    let mut tiles = filled(w, h, Tile::Terrain(Terrain::BuildingFloor));
    border(&mut tiles, w, h, Terrain::BuildingWall);

    set(&mut tiles, 4, 3, Tile::Terrain(Terrain::Furniture(Furniture::Table)));
    for x in [2, 3] {
        set(&mut tiles, x, 1, Tile::Terrain(Terrain::Furniture(Furniture::Bookshelf)));
    }
    set(&mut tiles, 7, 1, Tile::Terrain(Terrain::Furniture(Furniture::Stove)));

    set(&mut tiles, 5, h - 1, Tile::Terrain(Terrain::BuildingDoor));
    tiles
}

// ═══════════════════════════════════════════════════════════════════════
// THE HOLLOW (ARENA)
// ═══════════════════════════════════════════════════════════════════════

fn arena_tiles() -> Vec<Vec<Tile>> {
    let (w, h) = (20, 15);
    let mut tiles = filled(w, h, Tile::Terrain(Terrain::Grass));
    border(&mut tiles, w, h, Terrain::StoneWall);

    fill_rect(&mut tiles, 8, 6, 11, 8, Tile::Terrain(Terrain::StonePath));

    // Way back out through the west wall
    for y in 6..=8 {
        set(&mut tiles, 0, y, Tile::Terrain(Terrain::ExitToFarm));
    }

    tiles
}
