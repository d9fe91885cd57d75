//! NPC domain — waypoint routines and dialogue.
//!
//! NPCs walk a fixed cyclic path, pausing at marked waypoints. Dialogue is
//! a cycling list; the dispatcher advances the cursor on each talk.

use bevy::prelude::*;

use crate::shared::*;

pub struct NpcsPlugin;

impl Plugin for NpcsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_npcs)
            .add_systems(
                FixedUpdate,
                npc_movement
                    .in_set(FixedStep::Npcs)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Mary wanders the town plaza. Her route pauses at the fountain corners
/// so she reads as loitering rather than patrolling.
pub fn mary() -> Npc {
    let path = vec![
        Waypoint::pause(11, 11, 2.0),
        Waypoint::new(18, 11),
        Waypoint::pause(18, 15, 3.3),
        Waypoint::new(11, 15),
    ];
    let start = path[0];
    Npc {
        id: "mary".into(),
        name: "Mary".into(),
        pixel: start.pixel(),
        grid_x: start.x,
        grid_y: start.y,
        facing: Facing::Down,
        is_moving: false,
        path,
        path_index: 1,
        is_paused: false,
        pause_remaining: 0.0,
        move_speed: PLAYER_SPEED * 0.35,
        dialogue: vec![
            "Lovely weather for the crops, isn't it?".into(),
            "The blacksmith's forge has been burning all night lately...".into(),
            "Don't stay out after dark. Things have been... different.".into(),
            "My grandmother used to say this valley listens.".into(),
        ],
        dialogue_index: 0,
        scene: SceneId::TownSquare,
    }
}

fn spawn_npcs(mut commands: Commands, existing: Query<&Npc>) {
    if !existing.is_empty() {
        return;
    }
    commands.spawn(mary());
}

/// Walks each NPC toward its current waypoint. Arrival either starts the
/// waypoint's pause or advances straight to the next one; a waypoint that
/// happens to equal the current position advances immediately instead of
/// dividing by zero.
pub fn npc_movement(time: Res<Time>, mut npcs: Query<&mut Npc>) {
    let dt = time.delta_secs();

    for mut npc in npcs.iter_mut() {
        if npc.path.is_empty() {
            continue;
        }

        if npc.is_paused {
            npc.is_moving = false;
            npc.pause_remaining -= dt;
            if npc.pause_remaining <= 0.0 {
                npc.is_paused = false;
                npc.path_index = (npc.path_index + 1) % npc.path.len();
            }
            continue;
        }

        let target = npc.path[npc.path_index % npc.path.len()];
        let offset = target.pixel() - npc.pixel;
        let dist = offset.length();
        let step = npc.move_speed * dt;

        if dist <= step || dist == 0.0 {
            npc.pixel = target.pixel();
            npc.grid_x = target.x;
            npc.grid_y = target.y;
            npc.is_moving = false;
            if target.pause_secs > 0.0 {
                npc.is_paused = true;
                npc.pause_remaining = target.pause_secs;
            } else {
                npc.path_index = (npc.path_index + 1) % npc.path.len();
            }
            continue;
        }

        let dir = offset / dist;
        npc.pixel += dir * step;
        npc.is_moving = true;
        if dir.y.abs() >= dir.x.abs() {
            npc.facing = if dir.y < 0.0 { Facing::Up } else { Facing::Down };
        } else {
            npc.facing = if dir.x > 0.0 { Facing::Right } else { Facing::Left };
        }
        npc.grid_x = (npc.pixel.x / CELL_SIZE).round() as i32;
        npc.grid_y = (npc.pixel.y / CELL_SIZE).round() as i32;
    }
}
