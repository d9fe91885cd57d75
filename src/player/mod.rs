//! Player domain: fixed-tick movement, camera follow, toolbar selection.

pub mod movement;

use bevy::prelude::*;

use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (movement::player_movement, movement::camera_follow)
                .chain()
                .in_set(FixedStep::Movement)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (select_tool, toggle_debug).run_if(in_state(GameState::Playing)),
        );
    }
}

/// Digit keys pick a toolbar slot. The toolbar is a projection of the
/// inventory, so a slot index is only meaningful against the current
/// projection; stale indices are ignored.
fn select_tool(
    input: Res<PlayerInput>,
    inventory: Res<Inventory>,
    mut player: ResMut<PlayerState>,
) {
    let slots = toolbar_slots(&inventory);

    if let Some(index) = input.tool_slot {
        if let Some(slot) = slots.get(index as usize) {
            player.selected_tool = slot.tool;
        }
    }

    // A seed slot vanishes from the toolbar when the last seed is planted;
    // drop the selection back to the hoe rather than holding a ghost tool.
    if let Tool::Seed(kind) = player.selected_tool {
        if inventory.seed_count(kind) == 0 {
            player.selected_tool = Tool::Hoe;
        }
    }
}

fn toggle_debug(input: Res<PlayerInput>, mut debug_mode: ResMut<DebugMode>) {
    if input.debug_toggle {
        debug_mode.0 = !debug_mode.0;
        let state = if debug_mode.0 { "on" } else { "off" };
        info!("Debug overlay: {}", state);
    }
}
