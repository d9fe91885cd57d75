//! Combat domain — sword swings, tree chopping, contact damage, and the
//! knockout-respawn path.

use bevy::prelude::*;

use crate::items::spawn_drop;
use crate::shared::*;
use crate::world::{maps, WorldGrid};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            tick_combat_timers
                .in_set(FixedStep::CombatTimers)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            FixedUpdate,
            enemy_contact_damage
                .in_set(FixedStep::ContactDamage)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (handle_sword_swing, handle_chop).run_if(in_state(GameState::Playing)),
        );
    }
}

/// Countdown timers on the player, driven by the fixed tick.
pub fn tick_combat_timers(time: Res<Time>, mut player: ResMut<PlayerState>) {
    let dt = time.delta_secs();
    player.swing_remaining = (player.swing_remaining - dt).max(0.0);
    player.invuln_remaining = (player.invuln_remaining - dt).max(0.0);
}

pub fn facing_vec(facing: Facing) -> Vec2 {
    let (dx, dy) = facing_offset(facing);
    Vec2::new(dx as f32, dy as f32)
}

/// True when `target` (pixel offset from the attacker) lies inside the
/// sword's forward arc: within range, and past the deadzone along the
/// facing axis.
pub fn in_sword_cone(offset: Vec2, facing: Facing) -> bool {
    if offset.length() > SWORD_RANGE {
        return false;
    }
    offset.dot(facing_vec(facing)) >= SWORD_CONE_DEADZONE
}

/// Resolves the cone once per swing, at swing start. Every enemy inside it
/// takes damage and a knockback impulse away from the player; anything
/// reduced to zero health despawns immediately.
pub fn handle_sword_swing(
    mut swings: EventReader<SwordSwingEvent>,
    mut commands: Commands,
    player: Res<PlayerState>,
    mut enemies: Query<(Entity, &mut Enemy)>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    for _ in swings.read() {
        sfx.send(PlaySfxEvent {
            sfx_id: "sword".into(),
        });
        let origin = Vec2::new(player.pixel_x, player.pixel_y);

        for (entity, mut enemy) in enemies.iter_mut() {
            if enemy.scene != player.scene {
                continue;
            }
            let offset = enemy.pixel - origin;
            if !in_sword_cone(offset, player.facing) {
                continue;
            }

            enemy.health -= SWORD_DAMAGE;
            if enemy.health <= 0.0 {
                info!("{:?} slain", enemy.kind);
                commands.entity(entity).despawn();
                sfx.send(PlaySfxEvent {
                    sfx_id: "enemy_die".into(),
                });
                continue;
            }

            // Knockback follows the swing direction, not the offset.
            enemy.knockback_velocity = facing_vec(player.facing) * KNOCKBACK_SPEED;
            enemy.knockback_remaining = KNOCKBACK_DURATION;
            sfx.send(PlaySfxEvent {
                sfx_id: "enemy_hit".into(),
            });
        }
    }
}

/// Axe hits on trees. Tree health lives in the tile itself; the last hit
/// replaces the tree with grass and throws a ring of wood drops.
pub fn handle_chop(
    mut chops: EventReader<ChopTreeEvent>,
    mut commands: Commands,
    mut grid: ResMut<WorldGrid>,
    mut player: ResMut<PlayerState>,
    clock: Res<SimClock>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    for chop in chops.read() {
        let Some(Tile::Terrain(Terrain::Tree { health })) = grid.get(chop.x, chop.y) else {
            continue;
        };
        if player.stamina < stamina_cost(Tool::Axe) {
            continue;
        }
        player.stamina -= stamina_cost(Tool::Axe);

        if health > 1 {
            grid.set(
                chop.x,
                chop.y,
                Tile::Terrain(Terrain::Tree { health: health - 1 }),
            );
            sfx.send(PlaySfxEvent { sfx_id: "chop".into() });
            continue;
        }

        grid.set(chop.x, chop.y, Tile::Terrain(Terrain::Grass));
        sfx.send(PlaySfxEvent {
            sfx_id: "tree_fall".into(),
        });
        let center = Vec2::new(chop.x as f32, chop.y as f32);
        for i in 0..WOOD_DROP_COUNT {
            let angle = std::f32::consts::TAU * i as f32 / WOOD_DROP_COUNT as f32;
            spawn_drop(
                &mut commands,
                DropKind::Wood,
                center,
                Vec2::from_angle(angle) * 0.1,
                clock.elapsed,
                grid.scene,
            );
        }
    }
}

/// Touching an enemy hurts unless the invulnerability window is open.
/// Dropping to zero health knocks the player out: a new day starts and the
/// respawn transition carries them home to bed.
pub fn enemy_contact_damage(
    mut player: ResMut<PlayerState>,
    enemies: Query<&Enemy>,
    mut transitions: EventWriter<SceneTransitionEvent>,
    mut day_ends: EventWriter<DayEndEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if player.is_invulnerable() {
        return;
    }
    let origin = Vec2::new(player.pixel_x, player.pixel_y);

    for enemy in enemies.iter() {
        if enemy.scene != player.scene {
            continue;
        }
        if enemy.pixel.distance(origin) > PLAYER_HIT_RADIUS {
            continue;
        }

        player.health -= enemy.kind.damage();
        player.invuln_remaining = INVULN_DURATION;
        sfx.send(PlaySfxEvent { sfx_id: "hurt".into() });

        if player.health <= 0.0 {
            warn!("Player knocked out; waking up at home");
            day_ends.send(DayEndEvent { slept_in_bed: false });
            transitions.send(SceneTransitionEvent {
                to: SceneId::Interior,
                entry: maps::INTERIOR_WAKE,
            });
        }
        break;
    }
}
