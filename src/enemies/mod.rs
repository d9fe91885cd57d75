//! Enemy domain — the chase/wander/pause behavior machine, knockback
//! physics, and population control for the hollow and night-time farm.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::shared::*;
use crate::world::WorldGrid;

pub struct EnemiesPlugin;

impl Plugin for EnemiesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnTimer>()
            .add_systems(
                FixedUpdate,
                enemy_ai
                    .in_set(FixedStep::Enemies)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (populate_on_scene_entry, night_spawns)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(Resource)]
pub struct SpawnTimer(pub Timer);

impl Default for SpawnTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.0, TimerMode::Repeating))
    }
}

/// How many enemies the hollow holds, scaling with escalation.
pub fn arena_enemy_cap(horror: &HorrorState) -> usize {
    ARENA_ENEMY_BASE_CAP + horror.level as usize / 2
}

fn eligible_kinds(clock: &GameClock, horror: &HorrorState) -> Vec<EnemyKind> {
    [EnemyKind::Slime, EnemyKind::Bat, EnemyKind::Skeleton]
        .into_iter()
        .filter(|kind| kind.can_spawn(clock, horror))
        .collect()
}

fn random_walkable_cell<R: Rng>(grid: &WorldGrid, rng: &mut R) -> Option<(i32, i32)> {
    for _ in 0..32 {
        let x = rng.gen_range(1..grid.width - 1);
        let y = rng.gen_range(1..grid.height - 1);
        if !grid.is_solid(x, y) {
            return Some((x, y));
        }
    }
    None
}

/// Fills the hollow with enemies when the player walks in, and clears
/// stragglers out when a scene swap leaves them behind.
fn populate_on_scene_entry(
    mut rebuilt: EventReader<GridRebuiltEvent>,
    mut commands: Commands,
    grid: Res<WorldGrid>,
    clock: Res<GameClock>,
    horror: Res<HorrorState>,
    player: Res<PlayerState>,
    enemies: Query<(Entity, &Enemy)>,
) {
    if rebuilt.read().next().is_none() {
        return;
    }

    // Arena enemies don't persist across visits.
    for (entity, enemy) in enemies.iter() {
        if enemy.scene == SceneId::Arena && grid.scene != SceneId::Arena {
            commands.entity(entity).despawn();
        }
    }

    if grid.scene != SceneId::Arena {
        return;
    }

    let mut rng = rand::thread_rng();
    let kinds = eligible_kinds(&clock, &horror);
    let cap = arena_enemy_cap(&horror);

    for _ in 0..cap {
        let Some(kind) = kinds.choose(&mut rng).copied() else {
            break;
        };
        let Some((x, y)) = random_walkable_cell(&grid, &mut rng) else {
            continue;
        };
        // Don't drop one straight onto the player.
        if (x - player.grid_x).abs() + (y - player.grid_y).abs() < 4 {
            continue;
        }
        commands.spawn(Enemy::spawn_at(kind, x, y, SceneId::Arena));
    }
    info!("Hollow populated (cap {})", cap);
}

/// Occasional night spawns on the farm once darkness falls.
fn night_spawns(
    time: Res<Time>,
    mut timer: ResMut<SpawnTimer>,
    mut commands: Commands,
    grid: Res<WorldGrid>,
    clock: Res<GameClock>,
    horror: Res<HorrorState>,
    player: Res<PlayerState>,
    enemies: Query<&Enemy>,
) {
    timer.0.tick(time.delta());
    if !timer.0.just_finished() {
        return;
    }
    if grid.scene != SceneId::Exterior || !clock.is_night() {
        return;
    }

    let on_farm = enemies
        .iter()
        .filter(|e| e.scene == SceneId::Exterior)
        .count();
    if on_farm >= 2 + horror.level as usize / 3 {
        return;
    }

    let mut rng = rand::thread_rng();
    if !rng.gen_bool(0.05) {
        return;
    }
    let kinds = eligible_kinds(&clock, &horror);
    let Some(kind) = kinds.choose(&mut rng).copied() else {
        return;
    };
    let Some((x, y)) = random_walkable_cell(&grid, &mut rng) else {
        return;
    };
    if (x - player.grid_x).abs() + (y - player.grid_y).abs() < 6 {
        return;
    }
    commands.spawn(Enemy::spawn_at(kind, x, y, SceneId::Exterior));
}

/// Per-tick enemy update. Knockback overrides everything; otherwise the
/// behavior machine rolls every couple of seconds, with the detection
/// radius forcing a chase regardless of the roll.
pub fn enemy_ai(
    time: Res<Time>,
    grid: Res<WorldGrid>,
    player: Res<PlayerState>,
    mut enemies: Query<&mut Enemy>,
) {
    let dt = time.delta_secs();
    let player_pos = Vec2::new(player.pixel_x, player.pixel_y);
    let mut rng = rand::thread_rng();

    for mut enemy in enemies.iter_mut() {
        if enemy.scene != player.scene {
            continue;
        }

        if enemy.knockback_remaining > 0.0 {
            let step = enemy.knockback_velocity * dt;
            try_move(&grid, &mut enemy, step);
            enemy.knockback_velocity *= KNOCKBACK_FRICTION;
            enemy.knockback_remaining = (enemy.knockback_remaining - dt).max(0.0);
            continue;
        }

        enemy.behavior_timer += dt;
        if enemy.behavior_timer >= ENEMY_BEHAVIOR_INTERVAL {
            enemy.behavior_timer = 0.0;
            enemy.wander_target = None;
            let roll: f32 = rng.gen();
            enemy.behavior = if roll < 0.6 {
                EnemyBehavior::Chase
            } else if roll < 0.8 {
                EnemyBehavior::Wander
            } else {
                EnemyBehavior::Pause
            };
        }

        let to_player = player_pos - enemy.pixel;
        let behavior = if to_player.length() < ENEMY_DETECTION_RADIUS {
            EnemyBehavior::Chase
        } else {
            enemy.behavior
        };

        let step = match behavior {
            EnemyBehavior::Chase => {
                let jitter = Vec2::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                ) * ENEMY_CHASE_JITTER;
                (to_player.normalize_or_zero() + jitter).normalize_or_zero()
                    * enemy.kind.speed()
                    * dt
            }
            EnemyBehavior::Wander => {
                let target = match enemy.wander_target {
                    Some(t) if t.distance(enemy.pixel) > CELL_SIZE * 0.2 => t,
                    _ => {
                        let t = enemy.pixel
                            + Vec2::new(
                                rng.gen_range(-3.0..3.0),
                                rng.gen_range(-3.0..3.0),
                            ) * CELL_SIZE;
                        enemy.wander_target = Some(t);
                        t
                    }
                };
                (target - enemy.pixel).normalize_or_zero() * enemy.kind.speed() * 0.5 * dt
            }
            EnemyBehavior::Pause => Vec2::ZERO,
        };

        enemy.is_moving = step != Vec2::ZERO;
        if enemy.is_moving {
            if step.y.abs() >= step.x.abs() {
                enemy.facing = if step.y < 0.0 { Facing::Up } else { Facing::Down };
            } else {
                enemy.facing = if step.x > 0.0 { Facing::Right } else { Facing::Left };
            }
            try_move(&grid, &mut enemy, step);
        }
    }
}

/// Axis-separated move with bounds clamping, same scheme as the player.
fn try_move(grid: &WorldGrid, enemy: &mut Enemy, step: Vec2) {
    let candidate_x = enemy.pixel.x + step.x;
    let candidate_y = enemy.pixel.y + step.y;

    if !grid.check_collision(candidate_x, enemy.pixel.y) {
        enemy.pixel.x = candidate_x;
    }
    if !grid.check_collision(enemy.pixel.x, candidate_y) {
        enemy.pixel.y = candidate_y;
    }

    let max_x = (grid.width - 1) as f32 * CELL_SIZE;
    let max_y = (grid.height - 1) as f32 * CELL_SIZE;
    enemy.pixel.x = enemy.pixel.x.clamp(0.0, max_x);
    enemy.pixel.y = enemy.pixel.y.clamp(0.0, max_y);

    enemy.grid_x = (enemy.pixel.x / CELL_SIZE).round() as i32;
    enemy.grid_y = (enemy.pixel.y / CELL_SIZE).round() as i32;
}
