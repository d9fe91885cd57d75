//! The action dispatcher.
//!
//! Every press of the action key funnels through one system with a fixed
//! resolution order: open modals swallow the press first, then nearby NPCs,
//! then the tile the player is facing (forge, doors), then the selected
//! tool. At most one branch fires per press.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::transitions::door_target;
use crate::world::{maps, WorldGrid};

pub struct ActionsPlugin;

impl Plugin for ActionsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (check_bed_prompt, handle_action)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// The save prompt mirrors "standing on the bed": it opens on arrival,
/// closes on departure, and stays closed after an explicit cancel until
/// the player steps off.
pub fn check_bed_prompt(
    input: Res<PlayerInput>,
    player: Res<PlayerState>,
    mut prompt: ResMut<SavePrompt>,
) {
    let on_bed = player.scene == SceneId::Interior
        && (player.grid_x, player.grid_y) == maps::INTERIOR_BED;

    if !on_bed {
        prompt.active = false;
        prompt.declined = false;
        return;
    }
    if input.cancel {
        prompt.declined = true;
    }
    prompt.active = !prompt.declined;
}

#[allow(clippy::too_many_arguments)]
pub fn handle_action(
    input: Res<PlayerInput>,
    grid: Res<WorldGrid>,
    inventory: Res<Inventory>,
    mut player: ResMut<PlayerState>,
    mut dialogue: ResMut<ActiveDialogue>,
    mut prompt: ResMut<SavePrompt>,
    mut npcs: Query<&mut Npc>,
    mut transitions: EventWriter<SceneTransitionEvent>,
    mut swings: EventWriter<SwordSwingEvent>,
    mut chops: EventWriter<ChopTreeEvent>,
    mut farm_actions: EventWriter<FarmActionEvent>,
    mut horror_triggers: EventWriter<TriggerHorrorEvent>,
    mut saves: EventWriter<SaveRequestEvent>,
) {
    if input.cancel && dialogue.0.is_some() {
        dialogue.0 = None;
        return;
    }
    if !input.action {
        return;
    }

    // 1. Open modals swallow the press.
    if prompt.active {
        prompt.active = false;
        prompt.declined = true;
        saves.send(SaveRequestEvent);
        return;
    }
    if dialogue.0.is_some() {
        dialogue.0 = None;
        return;
    }

    // 2. Nearby NPC: open their next dialogue line.
    let player_tile = Vec2::new(player.grid_x as f32, player.grid_y as f32);
    for mut npc in npcs.iter_mut() {
        if npc.scene != player.scene || npc.dialogue.is_empty() {
            continue;
        }
        let npc_tile = npc.pixel / CELL_SIZE;
        if npc_tile.distance(player_tile) <= NPC_INTERACT_RANGE {
            let line = npc.dialogue[npc.dialogue_index % npc.dialogue.len()].clone();
            npc.dialogue_index = (npc.dialogue_index + 1) % npc.dialogue.len();
            dialogue.0 = Some(DialogueBox {
                npc_name: npc.name.clone(),
                text: line,
            });
            return;
        }
    }

    // 3. The faced tile: forge, then doors.
    let (tx, ty) = player.target_tile(grid.width, grid.height);
    match grid.get(tx, ty) {
        Some(Tile::Terrain(Terrain::Forge)) => {
            horror_triggers.send(TriggerHorrorEvent {
                kind: HorrorEventKind::ForgeNightmare,
            });
            return;
        }
        Some(Tile::Terrain(Terrain::HouseDoor | Terrain::BuildingDoor)) => {
            if let Some(to) = door_target(grid.scene, tx, ty) {
                transitions.send(SceneTransitionEvent {
                    to,
                    entry: maps::entry_point(to, grid.scene),
                });
            }
            return;
        }
        _ => {}
    }

    // 4. The selected tool.
    match player.selected_tool {
        Tool::Sword => {
            if !player.is_swinging() {
                player.swing_remaining = SWING_DURATION;
                swings.send(SwordSwingEvent);
            }
        }
        Tool::Axe => {
            if let Some(Tile::Terrain(Terrain::Tree { .. })) = grid.get(tx, ty) {
                chops.send(ChopTreeEvent { x: tx, y: ty });
            }
        }
        tool => {
            if grid.is_farm_plot(tx, ty) && can_afford(&player, tool) {
                if let Tool::Seed(kind) = tool {
                    if inventory.seed_count(kind) == 0 {
                        return;
                    }
                }
                farm_actions.send(FarmActionEvent { tool, x: tx, y: ty });
            }
        }
    }
}

fn can_afford(player: &PlayerState, tool: Tool) -> bool {
    player.stamina >= stamina_cost(tool)
}

/// Whether pressing the action key right now would do anything to the
/// faced tile. Mirrors every guard the dispatcher applies, so the UI
/// highlight can never promise an action that would no-op.
pub fn is_target_actionable(
    player: &PlayerState,
    grid: &WorldGrid,
    inventory: &Inventory,
) -> bool {
    let (tx, ty) = player.target_tile(grid.width, grid.height);
    let tile = grid.get(tx, ty);

    match tile {
        Some(Tile::Terrain(Terrain::Forge)) => return true,
        Some(Tile::Terrain(Terrain::HouseDoor | Terrain::BuildingDoor)) => {
            return door_target(grid.scene, tx, ty).is_some();
        }
        _ => {}
    }

    match player.selected_tool {
        Tool::Sword => true,
        Tool::Axe => matches!(tile, Some(Tile::Terrain(Terrain::Tree { .. })))
            && can_afford(player, Tool::Axe),
        tool => {
            if !grid.is_farm_plot(tx, ty) || !can_afford(player, tool) {
                return false;
            }
            match (tool, tile) {
                (Tool::Hoe, Some(Tile::Empty)) => true,
                (Tool::Seed(kind), Some(Tile::Crop(c))) => {
                    c.is_tilled() && inventory.seed_count(kind) > 0
                }
                (Tool::WateringCan, Some(Tile::Crop(c))) => {
                    !c.is_tilled()
                        && !c.is_mature()
                        && c.waterings_received < c.waterings_required
                }
                (Tool::Hand, Some(Tile::Crop(c))) => c.is_mature(),
                _ => false,
            }
        }
    }
}
