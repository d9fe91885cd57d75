//! Scene transitions.
//!
//! Edge exits fire when the player steps onto them; doors fire from the
//! action dispatcher. Either way the swap itself happens in one system:
//! grid, scene id, player position, and camera all change together, so no
//! other system can observe a half-switched world.

use bevy::prelude::*;

use crate::shared::*;

use super::maps::{
    self, BLACKSMITH_FOOTPRINT, COZY_FOOTPRINT, STORE_FOOTPRINT,
};
use super::{SceneCache, WorldGrid};

/// Fires an edge-exit transition when the player's grid cell changed this
/// tick onto an exit tile. Keyed on the cell change so standing still on an
/// exit (right after arriving) can't re-trigger it.
pub fn scene_transition_check(
    player: Res<PlayerState>,
    grid: Res<WorldGrid>,
    mut last_cell: Local<Option<(i32, i32)>>,
    mut transitions: EventWriter<SceneTransitionEvent>,
) {
    let cell = (player.grid_x, player.grid_y);
    let changed = *last_cell != Some(cell);
    *last_cell = Some(cell);
    if !changed {
        return;
    }

    let Some(Tile::Terrain(terrain)) = grid.get(cell.0, cell.1) else {
        return;
    };
    let to = match terrain {
        Terrain::ExitToTown => SceneId::TownSquare,
        Terrain::ExitToArena => SceneId::Arena,
        Terrain::ExitToFarm => SceneId::Exterior,
        _ => return,
    };
    transitions.send(SceneTransitionEvent {
        to,
        entry: maps::entry_point(to, grid.scene),
    });
}

/// Scene a door leads to, or None if the tile isn't a door the dispatcher
/// should open. Town doors are identical tiles; the building footprint
/// containing the door decides which interior it opens.
pub fn door_target(scene: SceneId, x: i32, y: i32) -> Option<SceneId> {
    match scene {
        SceneId::Exterior => Some(SceneId::Interior),
        SceneId::Interior => Some(SceneId::Exterior),
        SceneId::TownSquare => {
            if in_footprint(STORE_FOOTPRINT, x, y) {
                Some(SceneId::GeneralStore)
            } else if in_footprint(BLACKSMITH_FOOTPRINT, x, y) {
                Some(SceneId::Blacksmith)
            } else if in_footprint(COZY_FOOTPRINT, x, y) {
                Some(SceneId::CozyHouse)
            } else {
                None
            }
        }
        SceneId::GeneralStore | SceneId::Blacksmith | SceneId::CozyHouse => {
            Some(SceneId::TownSquare)
        }
        SceneId::Arena => None,
    }
}

fn in_footprint(rect: (i32, i32, i32, i32), x: i32, y: i32) -> bool {
    let (x0, y0, x1, y1) = rect;
    x >= x0 && x <= x1 && y >= y0 && y <= y1
}

/// Performs the swap. Only the last queued transition wins if several were
/// requested in one tick.
pub fn handle_scene_transition(
    mut transitions: EventReader<SceneTransitionEvent>,
    mut grid: ResMut<WorldGrid>,
    mut cache: ResMut<SceneCache>,
    mut player: ResMut<PlayerState>,
    mut camera: ResMut<CameraState>,
    mut rebuilt: EventWriter<GridRebuiltEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let Some(event) = transitions.read().last().cloned() else {
        return;
    };
    if event.to == grid.scene {
        return;
    }

    if grid.scene == SceneId::Exterior {
        cache.exterior = Some(std::mem::take(&mut grid.tiles));
    }

    *grid = match (event.to, cache.exterior.take()) {
        (SceneId::Exterior, Some(tiles)) => WorldGrid::from_tiles(SceneId::Exterior, tiles),
        (to, kept) => {
            cache.exterior = kept;
            maps::generate_scene(to)
        }
    };

    player.scene = event.to;
    player.set_position(event.entry.0, event.entry.1);
    player.is_moving = false;
    camera.snap_to(&player);

    info!("Scene transition -> {:?} at {:?}", event.to, event.entry);
    sfx.send(PlaySfxEvent {
        sfx_id: "door".into(),
    });
    rebuilt.send(GridRebuiltEvent);
}
