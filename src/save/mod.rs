//! Save domain — a single serde_json save file.
//!
//! Saving happens through sleep: the file records the morning about to
//! begin (day + 1), the exterior grid as it stands, held items, ground
//! drops, and NPC cursors. Loading applies the file before the world
//! spawns; a corrupt or mismatched file is a warning and a fresh start,
//! never a crash. Disk persistence is native-only.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;
use crate::world::maps::{self, EXTERIOR_HEIGHT, EXTERIOR_WIDTH};
use crate::world::{SceneCache, WorldGrid};

pub const SAVE_VERSION: u32 = 1;
pub const SAVE_FILE: &str = "hollowfield_save.json";

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingNpcState>()
            .add_systems(OnEnter(GameState::Boot), load_on_start)
            .add_systems(
                Update,
                (handle_save_request, apply_pending_npc_state)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILE FORMAT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// The day the player wakes into, already incremented.
    pub day: u32,
    pub inventory: Inventory,
    pub exterior: Vec<Vec<Tile>>,
    pub drops: Vec<SavedDrop>,
    pub npcs: Vec<SavedNpc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDrop {
    pub kind: DropKind,
    pub x: f32,
    pub y: f32,
    pub scene: SceneId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedNpc {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub path_index: usize,
    pub dialogue_index: usize,
}

/// NPC state from a loaded file, held until the NPC entities exist.
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingNpcState(pub Vec<SavedNpc>);

// ═══════════════════════════════════════════════════════════════════════
// SAVE
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_save_request(
    mut requests: EventReader<SaveRequestEvent>,
    grid: Res<WorldGrid>,
    cache: Res<SceneCache>,
    clock: Res<GameClock>,
    inventory: Res<Inventory>,
    items: Query<&DroppedItem>,
    npcs: Query<&Npc>,
    mut day_ends: EventWriter<DayEndEvent>,
) {
    if requests.read().next().is_none() {
        return;
    }

    let exterior = if grid.scene == SceneId::Exterior {
        grid.tiles.clone()
    } else {
        match &cache.exterior {
            Some(tiles) => tiles.clone(),
            None => maps::generate_scene(SceneId::Exterior).tiles,
        }
    };

    let data = SaveData {
        version: SAVE_VERSION,
        day: clock.day + 1,
        inventory: inventory.clone(),
        exterior,
        drops: items
            .iter()
            .map(|item| SavedDrop {
                kind: item.kind,
                x: item.pos.x,
                y: item.pos.y,
                scene: item.scene,
            })
            .collect(),
        npcs: npcs
            .iter()
            .map(|npc| SavedNpc {
                id: npc.id.clone(),
                x: npc.pixel.x,
                y: npc.pixel.y,
                path_index: npc.path_index,
                dialogue_index: npc.dialogue_index,
            })
            .collect(),
    };

    match write_save(&data) {
        Ok(()) => info!("Game saved (waking into day {})", data.day),
        Err(err) => warn!("Save failed: {}", err),
    }

    // Sleep follows the save either way; losing the file shouldn't trap
    // the player in an endless day.
    day_ends.send(DayEndEvent { slept_in_bed: true });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_path() -> std::path::PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(SAVE_FILE)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write_save(data: &SaveData) -> Result<(), String> {
    let json = serde_json::to_string_pretty(data).map_err(|e| e.to_string())?;
    std::fs::write(save_path(), json).map_err(|e| e.to_string())
}

#[cfg(target_arch = "wasm32")]
pub fn write_save(_data: &SaveData) -> Result<(), String> {
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// LOAD
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
pub fn read_save() -> Option<SaveData> {
    let path = save_path();
    if !path.exists() {
        return None;
    }
    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(err) => {
            warn!("Could not read save file: {}", err);
            return None;
        }
    };
    match serde_json::from_str::<SaveData>(&json) {
        Ok(data) => Some(data),
        Err(err) => {
            warn!("Corrupt save file, starting fresh: {}", err);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn read_save() -> Option<SaveData> {
    None
}

fn validate(data: &SaveData) -> Result<(), String> {
    if data.version != SAVE_VERSION {
        return Err(format!(
            "save version {} != expected {}",
            data.version, SAVE_VERSION
        ));
    }
    let height = data.exterior.len() as i32;
    let width = data.exterior.first().map_or(0, |row| row.len() as i32);
    if width != EXTERIOR_WIDTH || height != EXTERIOR_HEIGHT {
        return Err(format!("exterior grid is {}x{}", width, height));
    }
    Ok(())
}

/// Applies a valid save before the world spawns: the player wakes at home,
/// the saved exterior waits in the scene cache, drops respawn, and NPC
/// cursors wait for their entities.
#[allow(clippy::too_many_arguments)]
fn load_on_start(
    mut commands: Commands,
    mut player: ResMut<PlayerState>,
    mut camera: ResMut<CameraState>,
    mut clock: ResMut<GameClock>,
    mut horror: ResMut<HorrorState>,
    mut inventory: ResMut<Inventory>,
    mut cache: ResMut<SceneCache>,
    mut pending: ResMut<PendingNpcState>,
    sim: Res<SimClock>,
) {
    let Some(data) = read_save() else {
        return;
    };
    if let Err(err) = validate(&data) {
        warn!("Ignoring save file: {}", err);
        return;
    }

    *clock = GameClock {
        day: data.day,
        ..GameClock::default()
    };
    horror.recompute(clock.day);
    *inventory = data.inventory;
    cache.exterior = Some(data.exterior);

    player.scene = SceneId::Interior;
    player.set_position(maps::INTERIOR_WAKE.0, maps::INTERIOR_WAKE.1);
    camera.snap_to(&player);

    for drop in &data.drops {
        commands.spawn(DroppedItem {
            kind: drop.kind,
            pos: Vec2::new(drop.x, drop.y),
            velocity: Vec2::ZERO,
            spawned_at: sim.elapsed,
            scene: drop.scene,
        });
    }
    pending.0 = data.npcs;

    info!("Save loaded: day {}", clock.day);
}

/// NPCs spawn on entering Playing; their saved cursors apply on the first
/// frame both exist.
fn apply_pending_npc_state(mut pending: ResMut<PendingNpcState>, mut npcs: Query<&mut Npc>) {
    if pending.0.is_empty() || npcs.is_empty() {
        return;
    }
    for saved in pending.0.drain(..) {
        for mut npc in npcs.iter_mut() {
            if npc.id != saved.id {
                continue;
            }
            npc.pixel = Vec2::new(saved.x, saved.y);
            npc.grid_x = (saved.x / CELL_SIZE).round() as i32;
            npc.grid_y = (saved.y / CELL_SIZE).round() as i32;
            npc.path_index = saved.path_index.min(npc.path.len().saturating_sub(1));
            npc.dialogue_index = saved.dialogue_index % npc.dialogue.len().max(1);
        }
    }
}
