//! Render domain — placeholder color-block sprites over the simulation
//! state. Strictly read-only: nothing here feeds back into gameplay.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::WorldGrid;

pub mod hud;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(GameState::Playing),
            (spawn_player_sprite, hud::spawn_hud),
        )
        .add_systems(
            Update,
            (
                rebuild_tile_sprites,
                attach_entity_sprites,
                sync_entity_sprites,
                sync_player_sprite,
                sync_camera,
                sync_overlay,
                hud::update_toolbar,
                hud::update_status,
                hud::update_modal,
                hud::update_debug,
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[derive(Component)]
pub struct TileSprite;

#[derive(Component)]
pub struct PlayerSprite;

/// Fullscreen darkness/dread tint, repositioned onto the camera each frame.
#[derive(Component)]
pub struct OverlaySprite;

/// Grid cells are y-down; world space is y-up.
pub fn grid_to_world(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x * CELL_SIZE, -y * CELL_SIZE, z)
}

fn terrain_color(terrain: &Terrain) -> Color {
    match terrain {
        Terrain::Grass => Color::srgb(0.35, 0.55, 0.3),
        Terrain::Path => Color::srgb(0.65, 0.55, 0.4),
        Terrain::StonePath => Color::srgb(0.55, 0.55, 0.58),
        Terrain::Water => Color::srgb(0.25, 0.4, 0.7),
        Terrain::Fence => Color::srgb(0.5, 0.38, 0.25),
        Terrain::StoneWall => Color::srgb(0.35, 0.35, 0.38),
        Terrain::Tree { .. } => Color::srgb(0.15, 0.35, 0.15),
        Terrain::HouseWall => Color::srgb(0.55, 0.35, 0.25),
        Terrain::HouseFloor => Color::srgb(0.7, 0.55, 0.4),
        Terrain::HouseDoor => Color::srgb(0.45, 0.28, 0.15),
        Terrain::BuildingWall => Color::srgb(0.5, 0.42, 0.38),
        Terrain::BuildingFloor => Color::srgb(0.68, 0.6, 0.5),
        Terrain::BuildingDoor => Color::srgb(0.4, 0.3, 0.2),
        Terrain::Fountain => Color::srgb(0.4, 0.6, 0.8),
        Terrain::Forge => Color::srgb(0.8, 0.3, 0.1),
        Terrain::Furniture(_) => Color::srgb(0.45, 0.32, 0.22),
        Terrain::ExitToTown | Terrain::ExitToFarm | Terrain::ExitToArena => {
            Color::srgb(0.75, 0.7, 0.5)
        }
    }
}

fn crop_color(crop: &Crop) -> Color {
    if crop.is_tilled() {
        return Color::srgb(0.4, 0.28, 0.18);
    }
    if crop.corrupted {
        // Deeper purple the further the rot has gone.
        let t = crop.corruption_level as f32 / MAX_CORRUPTION_LEVEL as f32;
        return Color::srgb(0.35 - 0.1 * t, 0.1, 0.35 + 0.15 * t);
    }
    let t = crop.stage as f32 / crop.max_stage.max(1) as f32;
    // Darker soil tint as soon as any watering lands this stage.
    let dim = if crop.waterings_received > 0 { 0.85 } else { 1.0 };
    Color::srgb(
        (0.3 + 0.2 * t) * dim,
        (0.6 + 0.25 * t) * dim,
        0.25 * dim,
    )
}

fn tile_color(tile: &Tile) -> Color {
    match tile {
        Tile::Terrain(t) => terrain_color(t),
        Tile::Empty => Color::srgb(0.45, 0.35, 0.22),
        Tile::Crop(c) => crop_color(c),
    }
}

/// Full rebuild whenever the grid resource changes. Placeholder blocks are
/// cheap enough that diffing isn't worth the bookkeeping.
fn rebuild_tile_sprites(
    mut commands: Commands,
    grid: Res<WorldGrid>,
    existing: Query<Entity, With<TileSprite>>,
) {
    if !grid.is_changed() {
        return;
    }
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    for y in 0..grid.height {
        for x in 0..grid.width {
            let Some(tile) = grid.get(x, y) else { continue };
            commands.spawn((
                TileSprite,
                Sprite {
                    color: tile_color(&tile),
                    custom_size: Some(Vec2::splat(CELL_SIZE)),
                    ..default()
                },
                Transform::from_translation(grid_to_world(x as f32, y as f32, 0.0)),
            ));
        }
    }
}

fn spawn_player_sprite(mut commands: Commands, player: Res<PlayerState>) {
    commands.spawn((
        PlayerSprite,
        Sprite {
            color: Color::srgb(0.9, 0.8, 0.6),
            custom_size: Some(Vec2::new(CELL_SIZE * 0.7, CELL_SIZE * 0.9)),
            ..default()
        },
        Transform::from_translation(grid_to_world(
            player.pixel_x / CELL_SIZE,
            player.pixel_y / CELL_SIZE,
            3.0,
        )),
    ));
    // Oversized so it covers the viewport wherever the camera sits.
    commands.spawn((
        OverlaySprite,
        Sprite {
            color: Color::srgba(0.0, 0.0, 0.05, 0.0),
            custom_size: Some(Vec2::splat(4000.0)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 50.0),
    ));
}

fn sync_player_sprite(
    player: Res<PlayerState>,
    mut query: Query<(&mut Transform, &mut Sprite), With<PlayerSprite>>,
) {
    let Ok((mut transform, mut sprite)) = query.get_single_mut() else {
        return;
    };
    transform.translation = grid_to_world(
        player.pixel_x / CELL_SIZE,
        player.pixel_y / CELL_SIZE,
        3.0,
    );
    sprite.color = if player.is_invulnerable() {
        Color::srgb(1.0, 0.5, 0.5)
    } else if player.is_swinging() {
        Color::srgb(1.0, 0.95, 0.7)
    } else {
        Color::srgb(0.9, 0.8, 0.6)
    };
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Slime => Color::srgb(0.3, 0.7, 0.4),
        EnemyKind::Bat => Color::srgb(0.4, 0.3, 0.5),
        EnemyKind::Skeleton => Color::srgb(0.85, 0.85, 0.8),
    }
}

fn drop_color(kind: DropKind) -> Color {
    match kind {
        DropKind::Wood => Color::srgb(0.55, 0.4, 0.2),
        DropKind::Crop(_) => Color::srgb(0.9, 0.7, 0.3),
    }
}

/// Gives freshly spawned simulation entities a sprite.
fn attach_entity_sprites(
    mut commands: Commands,
    enemies: Query<(Entity, &Enemy), Added<Enemy>>,
    npcs: Query<(Entity, &Npc), Added<Npc>>,
    items: Query<(Entity, &DroppedItem), Added<DroppedItem>>,
) {
    for (entity, enemy) in enemies.iter() {
        commands.entity(entity).insert((
            Sprite {
                color: enemy_color(enemy.kind),
                custom_size: Some(Vec2::splat(CELL_SIZE * 0.8)),
                ..default()
            },
            Transform::from_translation(grid_to_world(
                enemy.pixel.x / CELL_SIZE,
                enemy.pixel.y / CELL_SIZE,
                2.0,
            )),
        ));
    }
    for (entity, npc) in npcs.iter() {
        commands.entity(entity).insert((
            Sprite {
                color: Color::srgb(0.8, 0.6, 0.8),
                custom_size: Some(Vec2::new(CELL_SIZE * 0.7, CELL_SIZE * 0.9)),
                ..default()
            },
            Transform::from_translation(grid_to_world(
                npc.pixel.x / CELL_SIZE,
                npc.pixel.y / CELL_SIZE,
                2.0,
            )),
        ));
    }
    for (entity, item) in items.iter() {
        commands.entity(entity).insert((
            Sprite {
                color: drop_color(item.kind),
                custom_size: Some(Vec2::splat(CELL_SIZE * 0.35)),
                ..default()
            },
            Transform::from_translation(grid_to_world(item.pos.x, item.pos.y, 1.0)),
        ));
    }
}

/// Moves sprites to their simulation positions and hides anything that
/// belongs to another scene.
fn sync_entity_sprites(
    player: Res<PlayerState>,
    mut enemies: Query<(&Enemy, &mut Transform, &mut Visibility), Without<Npc>>,
    mut npcs: Query<
        (&Npc, &mut Transform, &mut Visibility),
        (Without<Enemy>, Without<DroppedItem>),
    >,
    mut items: Query<
        (&DroppedItem, &mut Transform, &mut Visibility),
        (Without<Enemy>, Without<Npc>),
    >,
) {
    for (enemy, mut transform, mut visibility) in enemies.iter_mut() {
        transform.translation = grid_to_world(
            enemy.pixel.x / CELL_SIZE,
            enemy.pixel.y / CELL_SIZE,
            2.0,
        );
        *visibility = if enemy.scene == player.scene {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    for (npc, mut transform, mut visibility) in npcs.iter_mut() {
        transform.translation =
            grid_to_world(npc.pixel.x / CELL_SIZE, npc.pixel.y / CELL_SIZE, 2.0);
        *visibility = if npc.scene == player.scene {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    for (item, mut transform, mut visibility) in items.iter_mut() {
        transform.translation = grid_to_world(item.pos.x, item.pos.y, 1.0);
        *visibility = if item.scene == player.scene {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn sync_camera(
    camera_state: Res<CameraState>,
    mut query: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    transform.translation.x = camera_state.x;
    transform.translation.y = -camera_state.y;
}

/// Darkness from the night curve plus a red-shifted pulse while a horror
/// event is live.
fn sync_overlay(
    clock: Res<GameClock>,
    grid: Res<WorldGrid>,
    sim: Res<SimClock>,
    camera_state: Res<CameraState>,
    active: Res<ActiveHorrorEvent>,
    mut query: Query<(&mut Sprite, &mut Transform), With<OverlaySprite>>,
) {
    let Ok((mut sprite, mut transform)) = query.get_single_mut() else {
        return;
    };
    transform.translation.x = camera_state.x;
    transform.translation.y = -camera_state.y;

    // Interiors stay lit; night only presses on the outdoor scenes.
    let night = match grid.scene {
        SceneId::Exterior | SceneId::TownSquare | SceneId::Arena => clock.night_intensity(),
        _ => 0.0,
    };
    let dread = active
        .0
        .as_ref()
        .map_or(0.0, |event| horror_intensity(event, sim.elapsed));

    let alpha = (night * 0.6 + dread * 0.35).min(0.9);
    let red = 0.25 * dread;
    sprite.color = Color::srgba(red, 0.0, 0.05, alpha);
}
