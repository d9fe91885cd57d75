//! Farming domain — tilling, planting, watering, harvest, growth, and
//! crop corruption.
//!
//! All mutations arrive as `FarmActionEvent`s from the dispatcher, but the
//! guards live here: an event that no longer applies to the tile it names
//! is a silent no-op.

use bevy::prelude::*;
use rand::Rng;

use crate::items::spawn_drop;
use crate::shared::*;
use crate::world::WorldGrid;

pub mod growth;

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GrowthTimer>().add_systems(
            Update,
            (handle_farm_action, tick_growth, handle_crop_rot)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Drives the slow crop systems at one tick per second.
#[derive(Resource)]
pub struct GrowthTimer(pub Timer);

impl Default for GrowthTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(GROWTH_TICK_SECONDS, TimerMode::Repeating))
    }
}

pub fn handle_farm_action(
    mut actions: EventReader<FarmActionEvent>,
    mut commands: Commands,
    mut grid: ResMut<WorldGrid>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    clock: Res<SimClock>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    for action in actions.read() {
        if !grid.is_farm_plot(action.x, action.y) {
            continue;
        }
        let Some(tile) = grid.get(action.x, action.y) else {
            continue;
        };
        if player.stamina < stamina_cost(action.tool) {
            continue;
        }

        match (action.tool, tile) {
            (Tool::Hoe, Tile::Empty) => {
                grid.set(action.x, action.y, Tile::Crop(Crop::tilled()));
                player.stamina -= stamina_cost(Tool::Hoe);
                sfx.send(PlaySfxEvent { sfx_id: "hoe".into() });
            }
            (Tool::Seed(kind), Tile::Crop(c)) if c.is_tilled() => {
                if !inventory.take_seed(kind) {
                    continue;
                }
                grid.set(
                    action.x,
                    action.y,
                    Tile::Crop(Crop::planted(kind, clock.elapsed)),
                );
                player.stamina -= stamina_cost(action.tool);
                sfx.send(PlaySfxEvent { sfx_id: "plant".into() });
            }
            (Tool::WateringCan, Tile::Crop(mut c))
                if !c.is_tilled()
                    && !c.is_mature()
                    && c.waterings_received < c.waterings_required =>
            {
                c.waterings_received += 1;
                // The watered flag means the stage quota is met.
                c.watered = c.waterings_received >= c.waterings_required;
                grid.set(action.x, action.y, Tile::Crop(c));
                player.stamina -= stamina_cost(Tool::WateringCan);
                sfx.send(PlaySfxEvent { sfx_id: "water".into() });
            }
            (Tool::Hand, Tile::Crop(c)) if c.is_mature() => {
                grid.set(action.x, action.y, Tile::Empty);
                player.stamina -= stamina_cost(Tool::Hand);
                // Corruption is a visual overlay; the harvest still yields.
                if let CropKind::Seed(kind) = c.kind {
                    let mut rng = rand::thread_rng();
                    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                    let speed = rng.gen_range(0.05..0.12);
                    spawn_drop(
                        &mut commands,
                        DropKind::Crop(kind),
                        Vec2::new(action.x as f32, action.y as f32),
                        Vec2::from_angle(angle) * speed,
                        clock.elapsed,
                        grid.scene,
                    );
                    sfx.send(PlaySfxEvent { sfx_id: "harvest".into() });
                }
            }
            _ => {}
        }
    }
}

fn tick_growth(
    time: Res<Time>,
    clock: Res<SimClock>,
    horror: Res<HorrorState>,
    mut timer: ResMut<GrowthTimer>,
    mut grid: ResMut<WorldGrid>,
) {
    timer.0.tick(time.delta());
    if !timer.0.just_finished() {
        return;
    }
    if !grid.scene.is_farmable() {
        return;
    }
    growth::advance_crop_growth(&mut grid, clock.elapsed);
    growth::roll_corruption(&mut grid, &horror, &mut rand::thread_rng());
}

/// The crop-rot horror event corrupts a handful of healthy crops outright.
fn handle_crop_rot(
    mut events: EventReader<HorrorEventStartedEvent>,
    mut grid: ResMut<WorldGrid>,
) {
    for event in events.read() {
        if event.kind != HorrorEventKind::CropRot || !grid.scene.is_farmable() {
            continue;
        }
        let mut rng = rand::thread_rng();
        let mut remaining = 3;
        for y in FARM_START_Y..FARM_START_Y + FARM_SIZE {
            for x in FARM_START_X..FARM_START_X + FARM_SIZE {
                if remaining == 0 {
                    return;
                }
                if let Some(Tile::Crop(mut c)) = grid.get(x, y) {
                    if !c.is_tilled() && !c.corrupted && rng.gen_bool(0.5) {
                        c.corrupted = true;
                        c.corruption_level = 1;
                        grid.set(x, y, Tile::Crop(c));
                        remaining -= 1;
                    }
                }
            }
        }
    }
}
