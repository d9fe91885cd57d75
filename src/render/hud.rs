//! Text HUD: toolbar, clock, pools, and the modal boxes.

use bevy::prelude::*;

use crate::actions::is_target_actionable;
use crate::shared::*;
use crate::world::{describe_tile, WorldGrid};

#[derive(Component)]
pub struct ToolbarText;

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct ModalText;

#[derive(Component)]
pub struct DebugText;

pub fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        ToolbarText,
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
    ));
    commands.spawn((
        StatusText,
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
    ));
    commands.spawn((
        ModalText,
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(80.0),
            left: Val::Px(120.0),
            right: Val::Px(120.0),
            ..default()
        },
    ));
    commands.spawn((
        DebugText,
        Text::new(""),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            right: Val::Px(8.0),
            ..default()
        },
    ));
}

/// Toolbar line, with the selected slot bracketed and seed counts shown.
pub fn update_toolbar(
    inventory: Res<Inventory>,
    player: Res<PlayerState>,
    mut query: Query<&mut Text, With<ToolbarText>>,
) {
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };
    let line = toolbar_slots(&inventory)
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let label = match slot.count {
                Some(n) => format!("{}.{} x{}", i + 1, slot.tool.name(), n),
                None => format!("{}.{}", i + 1, slot.tool.name()),
            };
            if slot.tool == player.selected_tool {
                format!("[{}]", label)
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    text.0 = line;
}

pub fn update_status(
    clock: Res<GameClock>,
    player: Res<PlayerState>,
    inventory: Res<Inventory>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };
    text.0 = format!(
        "Day {}  {:02}:{:02}\nHP {:.0}/{:.0}  Stamina {:.0}/{:.0}\nWood {}  Coins {}",
        clock.day,
        clock.hours,
        clock.minutes,
        player.health,
        player.max_health,
        player.stamina,
        player.max_stamina,
        inventory.wood,
        inventory.coins,
    );
}

pub fn update_modal(
    dialogue: Res<ActiveDialogue>,
    prompt: Res<SavePrompt>,
    mut query: Query<&mut Text, With<ModalText>>,
) {
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };
    text.0 = if let Some(dialogue_box) = &dialogue.0 {
        format!("{}: \"{}\"", dialogue_box.npc_name, dialogue_box.text)
    } else if prompt.active {
        "Sleep and save? (Space to confirm, Esc to cancel)".to_string()
    } else {
        String::new()
    };
}

pub fn update_debug(
    debug: Res<DebugMode>,
    player: Res<PlayerState>,
    grid: Res<WorldGrid>,
    inventory: Res<Inventory>,
    horror: Res<HorrorState>,
    mut query: Query<&mut Text, With<DebugText>>,
) {
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };
    if !debug.0 {
        text.0.clear();
        return;
    }
    let (tx, ty) = player.target_tile(grid.width, grid.height);
    let facing_desc = grid
        .get(tx, ty)
        .map(|t| describe_tile(&t))
        .unwrap_or("nothing");
    text.0 = format!(
        "{:?} ({}, {})\nfacing {} @ ({}, {}) actionable={}\nhorror level {} spread {:.2}",
        grid.scene,
        player.grid_x,
        player.grid_y,
        facing_desc,
        tx,
        ty,
        is_target_actionable(&player, &grid, &inventory),
        horror.level,
        horror.corruption_spread,
    );
}
