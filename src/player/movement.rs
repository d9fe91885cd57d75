use bevy::prelude::*;

use crate::shared::*;
use crate::world::WorldGrid;

/// Core movement system. Applies the held movement axis at a fixed rate,
/// updates facing, resolves collisions per axis, and keeps the derived
/// grid position in sync.
///
/// Facing updates before the collision check, so pressing into a wall
/// still turns the player toward it — tools aim at the blocked tile.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    grid: Res<WorldGrid>,
    mut player: ResMut<PlayerState>,
) {
    let dir = input.move_axis;
    if dir == Vec2::ZERO {
        player.is_moving = false;
        return;
    }

    // Vertical wins on diagonals; approaching plots feels better that way.
    if dir.y.abs() >= dir.x.abs() {
        player.facing = if dir.y < 0.0 { Facing::Up } else { Facing::Down };
    } else {
        player.facing = if dir.x > 0.0 { Facing::Right } else { Facing::Left };
    }

    let delta = dir.normalize() * PLAYER_SPEED * time.delta_secs();
    let candidate_x = player.pixel_x + delta.x;
    let candidate_y = player.pixel_y + delta.y;

    // Axis-separated collision so the player slides along walls. Moving
    // means at least one axis actually advanced; pressing into a wall
    // turns the player but doesn't count as movement.
    let mut moved = false;
    if delta.x != 0.0 && !grid.check_collision(candidate_x, player.pixel_y) {
        player.pixel_x = candidate_x;
        moved = true;
    }
    if delta.y != 0.0 && !grid.check_collision(player.pixel_x, candidate_y) {
        player.pixel_y = candidate_y;
        moved = true;
    }

    // If both partial moves still landed inside a solid cell (corner case),
    // snap back to the last known-good grid cell.
    if grid.check_collision(player.pixel_x, player.pixel_y) {
        player.pixel_x = player.grid_x as f32 * CELL_SIZE;
        player.pixel_y = player.grid_y as f32 * CELL_SIZE;
        moved = false;
    }
    player.is_moving = moved;

    player.grid_x = (player.pixel_x / CELL_SIZE).round() as i32;
    player.grid_y = (player.pixel_y / CELL_SIZE).round() as i32;
}

/// Exponential camera follow: close a fixed fraction of the gap each tick.
pub fn camera_follow(player: Res<PlayerState>, mut camera: ResMut<CameraState>) {
    camera.x += (player.pixel_x - camera.x) * CAMERA_SMOOTHING;
    camera.y += (player.pixel_y - camera.y) * CAMERA_SMOOTHING;
}
