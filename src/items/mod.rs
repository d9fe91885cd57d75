//! Dropped-item physics and pickup.
//!
//! Items live in tile units (1.0 = one cell). Velocities are applied per
//! fixed tick, with friction decay and a magnet pull toward the player
//! once the pickup delay has passed. Collection despawns the entity in the
//! same system that credits the inventory, so an item can never be
//! collected twice.

use bevy::prelude::*;

use crate::shared::*;

pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (item_physics, collect_items)
                .chain()
                .in_set(FixedStep::Items)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn spawn_drop(
    commands: &mut Commands,
    kind: DropKind,
    pos: Vec2,
    velocity: Vec2,
    now: f64,
    scene: SceneId,
) {
    commands.spawn(DroppedItem {
        kind,
        pos,
        velocity,
        spawned_at: now,
        scene,
    });
}

pub fn item_physics(
    clock: Res<SimClock>,
    player: Res<PlayerState>,
    mut items: Query<&mut DroppedItem>,
) {
    let player_tile = Vec2::new(player.pixel_x, player.pixel_y) / CELL_SIZE;

    for mut item in items.iter_mut() {
        if item.scene != player.scene {
            continue;
        }

        item.velocity *= ITEM_FRICTION;
        if item.velocity.length() < ITEM_VELOCITY_EPSILON {
            item.velocity = Vec2::ZERO;
        }
        let step = item.velocity;
        item.pos += step;

        // Magnet pull, scaled down with distance, only once collectable.
        let age = clock.elapsed - item.spawned_at;
        if age < item.kind.pickup_delay() as f64 {
            continue;
        }
        let offset = player_tile - item.pos;
        let dist = offset.length();
        if dist > 0.0 && dist < ITEM_MAGNET_RANGE {
            let pull = ITEM_MAGNET_SPEED * (1.0 - dist / ITEM_MAGNET_RANGE);
            item.pos += offset / dist * pull;
        }
    }
}

pub fn collect_items(
    mut commands: Commands,
    clock: Res<SimClock>,
    player: Res<PlayerState>,
    mut inventory: ResMut<Inventory>,
    items: Query<(Entity, &DroppedItem)>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let player_tile = Vec2::new(player.pixel_x, player.pixel_y) / CELL_SIZE;

    for (entity, item) in items.iter() {
        if item.scene != player.scene {
            continue;
        }
        let age = clock.elapsed - item.spawned_at;
        if age < item.kind.pickup_delay() as f64 {
            continue;
        }
        if item.pos.distance(player_tile) > ITEM_PICKUP_RANGE {
            continue;
        }

        match item.kind {
            DropKind::Wood => inventory.wood += 1,
            DropKind::Crop(kind) => inventory.add_crop(kind),
        }
        commands.entity(entity).despawn();
        sfx.send(PlaySfxEvent {
            sfx_id: "pickup".into(),
        });
    }
}
