//! Headless integration tests for Hollowfield.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic systems (skipping all rendering/UI), and verify that the
//! core game loops work correctly.
//!
//! Run with: `cargo test --test headless`

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use hollowfield::actions::{check_bed_prompt, handle_action, is_target_actionable};
use hollowfield::combat::{enemy_contact_damage, handle_chop, handle_sword_swing, in_sword_cone};
use hollowfield::enemies::arena_enemy_cap;
use hollowfield::farming::growth::{advance_crop_growth, corruption_chance, roll_corruption};
use hollowfield::farming::handle_farm_action;
use hollowfield::horror::{
    eligible_kinds, handle_day_end, handle_forge_trigger, horror_scheduler, pick_event,
    HorrorTimer,
};
use hollowfield::items::{collect_items, item_physics};
use hollowfield::npcs::{mary, npc_movement};
use hollowfield::player::movement::player_movement;
use hollowfield::save::{
    handle_save_request, read_save, save_path, SaveData, SavedNpc, SAVE_VERSION,
};
use hollowfield::shared::*;
use hollowfield::world::transitions::{
    door_target, handle_scene_transition, scene_transition_check,
};
use hollowfield::world::{in_farm_rect, maps, SceneCache, WorldGrid};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a minimal Bevy app with all shared resources and events registered
/// but NO rendering, windowing, or asset loading. Systems must be added
/// per-test depending on what's being exercised.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    // Deterministic frame time for systems that read `Res<Time>`.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
        50,
    )));

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.init_resource::<PlayerInput>()
        .init_resource::<PlayerState>()
        .init_resource::<CameraState>()
        .init_resource::<Inventory>()
        .init_resource::<SimClock>()
        .init_resource::<GameClock>()
        .init_resource::<HorrorState>()
        .init_resource::<ActiveHorrorEvent>()
        .init_resource::<ActiveDialogue>()
        .init_resource::<SavePrompt>()
        .init_resource::<DebugMode>()
        .init_resource::<WorldGrid>()
        .init_resource::<SceneCache>();

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<SceneTransitionEvent>()
        .add_event::<DayEndEvent>()
        .add_event::<GridRebuiltEvent>()
        .add_event::<SwordSwingEvent>()
        .add_event::<ChopTreeEvent>()
        .add_event::<FarmActionEvent>()
        .add_event::<TriggerHorrorEvent>()
        .add_event::<HorrorEventStartedEvent>()
        .add_event::<SaveRequestEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<PlayMusicEvent>();

    app
}

/// Moves the app into the Playing state (systems gated on it start running).
fn enter_playing_state(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
}

fn count_events<E: Event>(app: &mut App) -> usize {
    let events = app.world().resource::<Events<E>>();
    events.get_cursor().read(events).count()
}

fn dropped_item_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&DroppedItem>()
        .iter(app.world())
        .count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tiles & Maps
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn solid_set_is_fixed_and_out_of_bounds_is_solid() {
    assert!(Terrain::Water.is_solid());
    assert!(Terrain::Fence.is_solid());
    assert!(Terrain::StoneWall.is_solid());
    assert!(Terrain::Tree { health: 3 }.is_solid());
    assert!(Terrain::HouseWall.is_solid());
    assert!(Terrain::Fountain.is_solid());
    assert!(Terrain::Forge.is_solid());
    assert!(Terrain::Furniture(Furniture::Table).is_solid());

    // The bed must stay walkable so the save spot is reachable.
    assert!(!Terrain::Furniture(Furniture::Bed).is_solid());
    assert!(!Terrain::HouseDoor.is_solid());
    assert!(!Terrain::ExitToTown.is_solid());
    assert!(!Tile::Empty.is_solid());
    assert!(!Tile::Crop(Crop::tilled()).is_solid());

    let grid = maps::generate_scene(SceneId::Exterior);
    assert!(grid.is_solid(-1, 0), "out of bounds must count as solid");
    assert!(grid.is_solid(0, grid.height), "out of bounds must count as solid");

    // Pixel collision uses the rounded cell, same as the player's grid pos.
    let (px, py) = (30.0 * CELL_SIZE, 20.0 * CELL_SIZE); // pond
    assert!(grid.check_collision(px, py));
    assert!(!grid.check_collision(20.0 * CELL_SIZE, 10.0 * CELL_SIZE));
}

#[test]
fn exterior_map_has_farm_house_and_exits() {
    let grid = maps::generate_scene(SceneId::Exterior);
    assert_eq!((grid.width, grid.height), (40, 30));

    // Every cell of the farm rectangle starts as bare soil.
    for y in FARM_START_Y..FARM_START_Y + FARM_SIZE {
        for x in FARM_START_X..FARM_START_X + FARM_SIZE {
            assert!(in_farm_rect(x, y));
            assert_eq!(grid.get(x, y), Some(Tile::Empty), "farm plot at ({x}, {y})");
            assert!(grid.is_farm_plot(x, y));
        }
    }
    assert!(!grid.is_farm_plot(FARM_START_X - 1, FARM_START_Y));

    assert_eq!(
        grid.get(maps::HOUSE_DOOR.0, maps::HOUSE_DOOR.1),
        Some(Tile::Terrain(Terrain::HouseDoor))
    );
    for y in 14..=16 {
        assert_eq!(grid.get(39, y), Some(Tile::Terrain(Terrain::ExitToTown)));
        assert_eq!(grid.get(0, y), Some(Tile::Terrain(Terrain::ExitToArena)));
    }
}

#[test]
fn every_entry_point_is_walkable_and_off_transition_tiles() {
    let scenes = [
        SceneId::Exterior,
        SceneId::Interior,
        SceneId::TownSquare,
        SceneId::GeneralStore,
        SceneId::Blacksmith,
        SceneId::CozyHouse,
        SceneId::Arena,
    ];
    for to in scenes {
        for from in scenes {
            if to == from {
                continue;
            }
            let (x, y) = maps::entry_point(to, from);
            let grid = maps::generate_scene(to);
            let tile = grid
                .get(x, y)
                .unwrap_or_else(|| panic!("entry into {to:?} from {from:?} out of bounds"));
            assert!(!tile.is_solid(), "entry into {to:?} from {from:?} is solid");
            if let Tile::Terrain(t) = tile {
                assert!(
                    !t.is_transition(),
                    "entry into {to:?} from {from:?} sits on a transition tile"
                );
            }
        }
    }
}

#[test]
fn town_doors_resolve_by_building_footprint() {
    assert_eq!(
        door_target(SceneId::TownSquare, 5, 10),
        Some(SceneId::GeneralStore)
    );
    assert_eq!(
        door_target(SceneId::TownSquare, 15, 5),
        Some(SceneId::Blacksmith)
    );
    assert_eq!(
        door_target(SceneId::TownSquare, 24, 11),
        Some(SceneId::CozyHouse)
    );
    assert_eq!(door_target(SceneId::TownSquare, 0, 0), None);

    assert_eq!(door_target(SceneId::Exterior, 4, 4), Some(SceneId::Interior));
    assert_eq!(door_target(SceneId::Interior, 5, 7), Some(SceneId::Exterior));
    assert_eq!(
        door_target(SceneId::GeneralStore, 6, 8),
        Some(SceneId::TownSquare)
    );
    assert_eq!(door_target(SceneId::Arena, 1, 1), None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Movement
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn walking_into_a_wall_turns_the_player_without_moving_them() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        player_movement.run_if(in_state(GameState::Playing)),
    );

    let mut tiles = vec![vec![Tile::Terrain(Terrain::Grass); 5]; 5];
    tiles[1][2] = Tile::Terrain(Terrain::StoneWall);
    app.insert_resource(WorldGrid::from_tiles(SceneId::Exterior, tiles));
    enter_playing_state(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.set_position(2, 2);
        player.facing = Facing::Down;
    }
    app.world_mut().resource_mut::<PlayerInput>().move_axis = Vec2::new(0.0, -1.0);

    for _ in 0..10 {
        app.update();
    }

    let player = app.world().resource::<PlayerState>();
    assert_eq!(player.facing, Facing::Up, "facing turns toward the wall");
    assert_eq!(
        (player.grid_x, player.grid_y),
        (2, 2),
        "the wall stops the player inside their cell"
    );
    assert!(
        player.pixel_y >= 71.9,
        "player may approach the wall but never enter it (y = {})",
        player.pixel_y
    );
    assert!(
        !player.is_moving,
        "pressing into a wall turns the player but is not movement"
    );
}

#[test]
fn open_ground_movement_keeps_grid_position_in_sync() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        player_movement.run_if(in_state(GameState::Playing)),
    );
    app.insert_resource(maps::generate_scene(SceneId::Exterior));
    enter_playing_state(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.set_position(20, 10);
    }
    app.world_mut().resource_mut::<PlayerInput>().move_axis = Vec2::new(1.0, 0.0);

    for _ in 0..10 {
        app.update();
    }

    let player = app.world().resource::<PlayerState>();
    assert!(player.pixel_x > 20.0 * CELL_SIZE);
    assert!(player.is_moving);
    assert_eq!(player.facing, Facing::Right);
    assert_eq!(
        player.grid_x,
        (player.pixel_x / CELL_SIZE).round() as i32,
        "grid position is always the rounded pixel position"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Farming
// ─────────────────────────────────────────────────────────────────────────────

/// Grid with a single crop planted at the given farm cell.
fn exterior_with_crop(x: i32, y: i32, crop: Crop) -> WorldGrid {
    let mut grid = maps::generate_scene(SceneId::Exterior);
    grid.set(x, y, Tile::Crop(crop));
    grid
}

#[test]
fn watering_repeats_until_the_stage_quota_is_met() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        handle_farm_action.run_if(in_state(GameState::Playing)),
    );
    app.insert_resource(exterior_with_crop(
        10,
        5,
        Crop::planted(SeedKind::Potato, 0.0),
    ));
    enter_playing_state(&mut app);

    // A potato wants three waterings per stage; each one must land.
    for expected in 1..=3u8 {
        app.world_mut().send_event(FarmActionEvent {
            tool: Tool::WateringCan,
            x: 10,
            y: 5,
        });
        app.update();

        let grid = app.world().resource::<WorldGrid>();
        let Some(Tile::Crop(crop)) = grid.get(10, 5) else {
            panic!("crop vanished");
        };
        assert_eq!(crop.waterings_received, expected);
        assert_eq!(
            crop.watered,
            expected == 3,
            "the watered flag flips only when the quota is met"
        );
    }

    // A fourth watering past the quota is a no-op.
    app.world_mut().send_event(FarmActionEvent {
        tool: Tool::WateringCan,
        x: 10,
        y: 5,
    });
    app.update();

    let grid = app.world().resource::<WorldGrid>();
    let Some(Tile::Crop(crop)) = grid.get(10, 5) else {
        panic!("crop vanished");
    };
    assert_eq!(crop.waterings_received, 3, "the quota caps watering");

    let player = app.world().resource::<PlayerState>();
    assert_eq!(
        player.stamina,
        MAX_STAMINA - 3.0 * stamina_cost(Tool::WateringCan),
        "only the waterings that landed cost stamina"
    );

    // The fully watered potato grows once its interval has elapsed.
    let mut grid = app.world_mut().resource_mut::<WorldGrid>();
    let updated = advance_crop_growth(&mut grid, CROP_GROWTH_INTERVAL + 0.5);
    assert_eq!(updated, vec![(10, 5)], "a quota-complete crop must grow");
}

#[test]
fn growth_needs_the_watering_quota_and_the_stage_interval() {
    let mut grid = exterior_with_crop(10, 5, Crop::planted(SeedKind::Potato, 0.0));

    // Quota unmet: no growth no matter how much time passed.
    let updated = advance_crop_growth(&mut grid, 100.0);
    assert!(updated.is_empty(), "potato needs 3 waterings per stage");

    // Quota met but interval not elapsed.
    if let Some(Tile::Crop(mut c)) = grid.get(10, 5) {
        c.waterings_received = 3;
        c.watered = true;
        grid.set(10, 5, Tile::Crop(c));
    }
    assert!(advance_crop_growth(&mut grid, CROP_GROWTH_INTERVAL - 0.5).is_empty());

    // Both satisfied: one stage, quota reset.
    let updated = advance_crop_growth(&mut grid, CROP_GROWTH_INTERVAL + 0.5);
    assert_eq!(updated, vec![(10, 5)]);
    let Some(Tile::Crop(c)) = grid.get(10, 5) else {
        panic!("crop vanished");
    };
    assert_eq!(c.stage, 1);
    assert!(!c.watered, "advancing a stage resets the watered flag");
    assert_eq!(c.waterings_received, 0, "each stage must be watered anew");

    // Stage N waits (N + 1) intervals measured from planting.
    if let Some(Tile::Crop(mut c)) = grid.get(10, 5) {
        c.waterings_received = 3;
        grid.set(10, 5, Tile::Crop(c));
    }
    assert!(
        advance_crop_growth(&mut grid, CROP_GROWTH_INTERVAL + 1.0).is_empty(),
        "stage 1 waits two intervals since planting"
    );
    let updated = advance_crop_growth(&mut grid, 2.0 * CROP_GROWTH_INTERVAL + 0.5);
    assert_eq!(updated, vec![(10, 5)]);

    // A late watering on an old crop advances it on the very next tick.
    let mut grid = exterior_with_crop(9, 5, Crop::planted(SeedKind::Parsnip, 0.0));
    assert!(advance_crop_growth(&mut grid, 50.0).is_empty(), "quota unmet");
    if let Some(Tile::Crop(mut c)) = grid.get(9, 5) {
        c.waterings_received = 1;
        grid.set(9, 5, Tile::Crop(c));
    }
    assert_eq!(
        advance_crop_growth(&mut grid, 50.0),
        vec![(9, 5)],
        "elapsed time since planting already covers the interval"
    );

    // Mature crops never grow past max_stage.
    let mut mature = Crop::planted(SeedKind::Parsnip, 0.0);
    mature.stage = mature.max_stage;
    mature.waterings_received = 3;
    let mut grid = exterior_with_crop(11, 5, mature);
    assert!(advance_crop_growth(&mut grid, 1000.0).is_empty());
}

#[test]
fn harvest_drops_a_crop_and_pickup_credits_the_inventory() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        (handle_farm_action, item_physics, collect_items)
            .chain()
            .run_if(in_state(GameState::Playing)),
    );

    let mut crop = Crop::planted(SeedKind::Parsnip, 0.0);
    crop.stage = crop.max_stage;
    app.insert_resource(exterior_with_crop(10, 5, crop));
    enter_playing_state(&mut app);

    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(10, 5);
    app.world_mut().send_event(FarmActionEvent {
        tool: Tool::Hand,
        x: 10,
        y: 5,
    });
    app.update();

    assert_eq!(
        app.world().resource::<WorldGrid>().get(10, 5),
        Some(Tile::Empty),
        "harvest clears the plot back to bare soil"
    );
    assert_eq!(dropped_item_count(&mut app), 1);

    // Once the pickup delay has passed, the drop flies to the player.
    app.world_mut().resource_mut::<SimClock>().elapsed = 2.0;
    for _ in 0..120 {
        app.update();
    }

    assert_eq!(dropped_item_count(&mut app), 0, "the drop was collected");
    assert_eq!(
        app.world().resource::<Inventory>().crop_count(SeedKind::Parsnip),
        1
    );
}

#[test]
fn corrupted_harvest_still_drops_the_crop() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        handle_farm_action.run_if(in_state(GameState::Playing)),
    );

    let mut crop = Crop::planted(SeedKind::Parsnip, 0.0);
    crop.stage = crop.max_stage;
    crop.corrupted = true;
    crop.corruption_level = 2;
    app.insert_resource(exterior_with_crop(12, 7, crop));
    enter_playing_state(&mut app);

    app.world_mut().send_event(FarmActionEvent {
        tool: Tool::Hand,
        x: 12,
        y: 7,
    });
    app.update();

    assert_eq!(
        app.world().resource::<WorldGrid>().get(12, 7),
        Some(Tile::Empty)
    );
    assert_eq!(
        dropped_item_count(&mut app),
        1,
        "corruption is a visual overlay; the harvest still yields"
    );
}

#[test]
fn till_plant_consumes_a_seed() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        handle_farm_action.run_if(in_state(GameState::Playing)),
    );
    app.insert_resource(maps::generate_scene(SceneId::Exterior));
    enter_playing_state(&mut app);

    app.world_mut().send_event(FarmActionEvent {
        tool: Tool::Hoe,
        x: 10,
        y: 5,
    });
    app.update();
    match app.world().resource::<WorldGrid>().get(10, 5) {
        Some(Tile::Crop(c)) => assert!(c.is_tilled()),
        other => panic!("expected tilled soil, got {other:?}"),
    }

    app.world_mut().send_event(FarmActionEvent {
        tool: Tool::Seed(SeedKind::Parsnip),
        x: 10,
        y: 5,
    });
    app.update();
    match app.world().resource::<WorldGrid>().get(10, 5) {
        Some(Tile::Crop(c)) => {
            assert_eq!(c.kind, CropKind::Seed(SeedKind::Parsnip));
            assert_eq!(c.stage, 0);
        }
        other => panic!("expected a planted parsnip, got {other:?}"),
    }
    assert_eq!(
        app.world().resource::<Inventory>().seed_count(SeedKind::Parsnip),
        STARTING_PARSNIP_SEEDS - 1
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Corruption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn corruption_chance_scales_with_level_and_maturity() {
    let mut horror = HorrorState::default();
    horror.recompute(1);
    assert_eq!(horror.level, 0);
    assert_eq!(
        corruption_chance(&horror, 0),
        0.0,
        "no corruption before the first threshold day"
    );

    horror.recompute(8); // level 3
    assert_eq!(horror.level, 3);
    let base = corruption_chance(&horror, 0);
    let expected = CORRUPTION_BASE_CHANCE * 1.6 * 0.3;
    assert!((base - expected).abs() < 1e-12, "got {base}, want {expected}");

    // Maturity factor caps at +50%.
    let mature = corruption_chance(&horror, 4);
    assert!((mature - expected * 1.5).abs() < 1e-12);
    assert_eq!(corruption_chance(&horror, 6), mature);
}

#[test]
fn corruption_never_rolls_at_zero_spread_and_deepens_to_the_cap() {
    // An RNG that always says yes: if spread is zero, not even it corrupts.
    let mut always = rand::rngs::mock::StepRng::new(0, 0);

    let mut grid = exterior_with_crop(10, 5, Crop::planted(SeedKind::Parsnip, 0.0));
    let mut horror = HorrorState::default();
    horror.recompute(1);
    roll_corruption(&mut grid, &horror, &mut always);
    if let Some(Tile::Crop(c)) = grid.get(10, 5) {
        assert!(!c.corrupted, "spread 0 means no corruption at all");
    }

    horror.recompute(8);
    for _ in 0..5 {
        roll_corruption(&mut grid, &horror, &mut always);
    }
    let Some(Tile::Crop(c)) = grid.get(10, 5) else {
        panic!("crop vanished");
    };
    assert!(c.corrupted);
    assert_eq!(
        c.corruption_level, MAX_CORRUPTION_LEVEL,
        "corruption deepens one level per tick up to the cap"
    );

    // Tilled soil is never a corruption target.
    let mut grid = exterior_with_crop(10, 5, Crop::tilled());
    roll_corruption(&mut grid, &horror, &mut always);
    if let Some(Tile::Crop(c)) = grid.get(10, 5) {
        assert!(!c.corrupted);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock & Horror
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn game_clock_wraps_hours_and_resets_on_a_new_day() {
    let mut clock = GameClock::default();
    assert_eq!((clock.hours, clock.minutes, clock.day), (6, 0, 1));

    clock.advance_minutes(10);
    assert_eq!((clock.hours, clock.minutes), (6, 10));

    clock.advance_minutes(18 * 60); // past midnight
    assert_eq!(clock.hours, 0);
    assert!(clock.is_night());

    clock.start_new_day();
    assert_eq!((clock.hours, clock.minutes, clock.day), (6, 0, 2));
    assert!(!clock.is_night());
}

#[test]
fn night_intensity_follows_the_piecewise_curve() {
    assert_eq!(night_intensity(12), 0.0);
    assert_eq!(night_intensity(6), 0.0);
    assert!((night_intensity(19) - 0.35).abs() < 1e-6);
    assert!((night_intensity(20) - 0.7).abs() < 1e-6);
    assert!((night_intensity(0) - 1.0).abs() < 1e-6);
    assert!((night_intensity(5) - 0.7).abs() < 1e-6);
    // Darkness never exceeds the midnight peak.
    for h in 0..24 {
        let v = night_intensity(h);
        assert!((0.0..=1.0).contains(&v), "hour {h} gave {v}");
    }
}

#[test]
fn hour_ranges_wrap_overnight() {
    assert!(hour_in_range(23, 20, 6));
    assert!(hour_in_range(2, 20, 6));
    assert!(hour_in_range(6, 20, 6));
    assert!(!hour_in_range(12, 20, 6));
    assert!(hour_in_range(12, 0, 23));
}

#[test]
fn horror_level_steps_on_threshold_days() {
    assert_eq!(horror_level(1), 0);
    assert_eq!(horror_level(2), 0);
    assert_eq!(horror_level(3), 1);
    assert_eq!(horror_level(5), 2);
    assert_eq!(horror_level(8), 3);
    assert_eq!(horror_level(12), 4);
    assert_eq!(horror_level(30), 8);
    assert_eq!(horror_level(50), 10);
    assert_eq!(horror_level(9999), 10);

    let mut horror = HorrorState::default();
    horror.recompute(30);
    assert!(horror.nightmare_mode, "level 8 is the nightmare threshold");
    assert!((horror.corruption_spread - 0.8).abs() < 1e-6);

    horror.recompute(25);
    assert!(!horror.nightmare_mode);
}

#[test]
fn horror_event_intensity_ramps_holds_and_fades() {
    let event = HorrorEvent {
        kind: HorrorEventKind::Whispers,
        started_at: 100.0,
        duration: 10.0,
        intensity: 1.0,
    };
    assert_eq!(horror_intensity(&event, 100.0), 0.0);
    assert!((horror_intensity(&event, 101.5) - 0.5).abs() < 1e-5);
    assert_eq!(horror_intensity(&event, 105.0), 1.0);
    assert!((horror_intensity(&event, 108.5) - 0.5).abs() < 1e-5);
    assert!(horror_intensity(&event, 110.0).abs() < 1e-5);
    assert!(horror_intensity(&event, 200.0).abs() < 1e-5, "clamps past the end");

    // Peak scales with the event's own intensity.
    let half = HorrorEvent {
        intensity: 0.5,
        ..event
    };
    assert_eq!(horror_intensity(&half, 105.0), 0.5);
}

#[test]
fn scheduler_eligibility_respects_day_window_and_anti_repeat() {
    let mut clock = GameClock::default();
    let mut horror = HorrorState::default();

    // Day 1, morning: nothing is unlocked yet.
    horror.recompute(clock.day);
    assert!(eligible_kinds(&clock, &horror).is_empty());

    // Day 5 at 23:00: whispers, the shadow figure, crop rot, heartbeat's
    // day gate still closed, blood mist's too.
    clock.day = 5;
    clock.advance_minutes(17 * 60); // 06:00 -> 23:00
    assert_eq!(clock.hours, 23);
    horror.recompute(clock.day);
    let kinds = eligible_kinds(&clock, &horror);
    assert!(kinds.contains(&HorrorEventKind::Whispers));
    assert!(kinds.contains(&HorrorEventKind::ShadowFigure));
    assert!(kinds.contains(&HorrorEventKind::CropRot));
    assert!(!kinds.contains(&HorrorEventKind::BloodMist));
    assert!(!kinds.contains(&HorrorEventKind::Footsteps));
    assert!(!kinds.contains(&HorrorEventKind::Heartbeat));
    assert!(
        !kinds.contains(&HorrorEventKind::ForgeNightmare),
        "the forge event never rolls from the scheduler"
    );

    // Anything in the recent-events ring is blocked, not just the last
    // kind played.
    horror.push_recent(HorrorEventKind::Whispers);
    assert!(!eligible_kinds(&clock, &horror).contains(&HorrorEventKind::Whispers));
    horror.push_recent(HorrorEventKind::CropRot);
    assert!(
        !eligible_kinds(&clock, &horror).contains(&HorrorEventKind::Whispers),
        "a kind stays blocked while it sits anywhere in the ring"
    );
    assert!(!eligible_kinds(&clock, &horror).contains(&HorrorEventKind::CropRot));
    assert!(eligible_kinds(&clock, &horror).contains(&HorrorEventKind::ShadowFigure));

    // The ring holds five entries; older kinds fall out and unlock.
    horror.push_recent(HorrorEventKind::ShadowFigure);
    horror.push_recent(HorrorEventKind::BloodMist);
    horror.push_recent(HorrorEventKind::Footsteps);
    horror.push_recent(HorrorEventKind::Heartbeat);
    assert!(eligible_kinds(&clock, &horror).contains(&HorrorEventKind::Whispers));
    assert!(!eligible_kinds(&clock, &horror).contains(&HorrorEventKind::CropRot));
}

#[test]
fn each_candidate_rolls_its_own_trigger_chance() {
    let candidates = [
        HorrorEventKind::ForgeNightmare,
        HorrorEventKind::Whispers,
        HorrorEventKind::CropRot,
    ];

    // A generator that passes every roll still can't pass a zero chance,
    // so the first scheduled kind wins.
    let mut always = rand::rngs::mock::StepRng::new(0, 0);
    assert_eq!(
        pick_event(&candidates, &mut always),
        Some(HorrorEventKind::Whispers)
    );
    assert_eq!(pick_event(&[], &mut always), None);

    // A generator that fails every roll picks nothing.
    let mut never = rand::rngs::mock::StepRng::new(u64::MAX, 0);
    assert_eq!(pick_event(&candidates, &mut never), None);
}

#[test]
fn an_expired_event_joins_the_recent_ring() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        horror_scheduler.run_if(in_state(GameState::Playing)),
    );
    app.init_resource::<HorrorTimer>();
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<SimClock>().elapsed = 100.0;
    app.world_mut().resource_mut::<ActiveHorrorEvent>().0 = Some(HorrorEvent {
        kind: HorrorEventKind::Whispers,
        started_at: 10.0,
        duration: 5.0,
        intensity: 1.0,
    });

    // One full scheduler tick at 50 ms per frame.
    for _ in 0..20 {
        app.update();
    }

    assert!(
        app.world().resource::<ActiveHorrorEvent>().0.is_none(),
        "the expired event deactivates"
    );
    let horror = app.world().resource::<HorrorState>();
    assert_eq!(
        horror.recent_events.back().copied(),
        Some(HorrorEventKind::Whispers),
        "completed events enter the anti-repeat ring"
    );
}

#[test]
fn the_forge_always_answers() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        handle_forge_trigger.run_if(in_state(GameState::Playing)),
    );
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<SimClock>().elapsed = 42.0;
    app.world_mut().send_event(TriggerHorrorEvent {
        kind: HorrorEventKind::ForgeNightmare,
    });
    app.update();

    let active = app.world().resource::<ActiveHorrorEvent>();
    let event = active.0.expect("forge trigger must start an event");
    assert_eq!(event.kind, HorrorEventKind::ForgeNightmare);
    assert_eq!(event.intensity, 1.0);
    assert_eq!(event.duration, FORGE_NIGHTMARE_DURATION);
    assert_eq!(event.started_at, 42.0);
    assert_eq!(count_events::<HorrorEventStartedEvent>(&mut app), 1);
}

#[test]
fn day_end_restores_the_player_and_clears_the_active_event() {
    let mut app = build_test_app();
    app.add_systems(Update, handle_day_end);
    enter_playing_state(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.health = 12.0;
        player.stamina = 3.0;
        player.invuln_remaining = 0.4;
        player.scene = SceneId::Interior;
        player.set_position(7, 6);
    }
    app.world_mut().resource_mut::<ActiveHorrorEvent>().0 = Some(HorrorEvent {
        kind: HorrorEventKind::Whispers,
        started_at: 0.0,
        duration: 100.0,
        intensity: 1.0,
    });

    app.world_mut().send_event(DayEndEvent { slept_in_bed: true });
    app.update();

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day, 2);
    assert_eq!(clock.hours, STARTING_HOUR);

    let player = app.world().resource::<PlayerState>();
    assert_eq!(player.health, MAX_HEALTH);
    assert_eq!(player.stamina, MAX_STAMINA);
    assert_eq!(player.invuln_remaining, 0.0);
    assert_eq!(
        (player.grid_x, player.grid_y),
        maps::INTERIOR_WAKE,
        "sleeping wakes the player beside the bed"
    );
    assert!(app.world().resource::<ActiveHorrorEvent>().0.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Combat
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn sword_cone_has_a_deadzone_a_range_and_no_back_swing() {
    // Facing right: a target one cell ahead is in the cone.
    assert!(in_sword_cone(Vec2::new(CELL_SIZE, 0.0), Facing::Right));
    // Behind, or to the side, is not.
    assert!(!in_sword_cone(Vec2::new(-CELL_SIZE, 0.0), Facing::Right));
    assert!(!in_sword_cone(Vec2::new(0.0, CELL_SIZE), Facing::Right));
    // Inside the deadzone (practically on top of the player) misses.
    assert!(!in_sword_cone(Vec2::new(CELL_SIZE * 0.1, 0.0), Facing::Right));
    // Past the range misses.
    assert!(!in_sword_cone(Vec2::new(SWORD_RANGE + 1.0, 0.0), Facing::Right));
    // A diagonal target counts as long as it is far enough forward.
    assert!(in_sword_cone(
        Vec2::new(CELL_SIZE * 0.7, CELL_SIZE * 0.9),
        Facing::Right
    ));
    // The cone rotates with facing.
    assert!(in_sword_cone(Vec2::new(0.0, -CELL_SIZE), Facing::Up));
    assert!(in_sword_cone(Vec2::new(0.0, CELL_SIZE), Facing::Down));
}

#[test]
fn sword_swing_damages_once_and_fells_at_zero_health() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        handle_sword_swing.run_if(in_state(GameState::Playing)),
    );
    enter_playing_state(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.set_position(4, 4);
        player.facing = Facing::Down;
    }
    let enemy = app
        .world_mut()
        .spawn(Enemy::spawn_at(EnemyKind::Slime, 4, 5, SceneId::Exterior))
        .id();

    app.world_mut().send_event(SwordSwingEvent);
    app.update();

    {
        let slime = app.world().get::<Enemy>(enemy).expect("slime survives one hit");
        assert_eq!(slime.health, EnemyKind::Slime.max_health() - SWORD_DAMAGE);
        assert!(slime.knockback_remaining > 0.0);
        assert_eq!(
            slime.knockback_velocity,
            Vec2::new(0.0, KNOCKBACK_SPEED),
            "knockback follows the swing direction"
        );
    }

    // No event, no damage: the cone resolves once per swing.
    app.update();
    assert_eq!(
        app.world().get::<Enemy>(enemy).unwrap().health,
        EnemyKind::Slime.max_health() - SWORD_DAMAGE
    );

    app.world_mut().send_event(SwordSwingEvent);
    app.update();
    assert_eq!(
        app.world().get::<Enemy>(enemy).unwrap().health,
        EnemyKind::Slime.max_health() - 2.0 * SWORD_DAMAGE
    );

    app.world_mut().get_mut::<Enemy>(enemy).unwrap().health = SWORD_DAMAGE;
    app.world_mut().send_event(SwordSwingEvent);
    app.update();
    assert!(
        app.world().get::<Enemy>(enemy).is_none(),
        "an enemy at zero health despawns"
    );
}

#[test]
fn chopping_a_tree_takes_three_hits_and_spills_wood() {
    let mut app = build_test_app();
    app.add_systems(Update, handle_chop.run_if(in_state(GameState::Playing)));

    let mut grid = maps::generate_scene(SceneId::Exterior);
    grid.set(
        20,
        20,
        Tile::Terrain(Terrain::Tree {
            health: TREE_MAX_HEALTH,
        }),
    );
    app.insert_resource(grid);
    enter_playing_state(&mut app);

    for hit in 1..=TREE_MAX_HEALTH {
        app.world_mut().send_event(ChopTreeEvent { x: 20, y: 20 });
        app.update();

        let tile = app.world().resource::<WorldGrid>().get(20, 20);
        if hit < TREE_MAX_HEALTH {
            assert_eq!(
                tile,
                Some(Tile::Terrain(Terrain::Tree {
                    health: TREE_MAX_HEALTH - hit
                }))
            );
        } else {
            assert_eq!(tile, Some(Tile::Terrain(Terrain::Grass)));
        }
    }

    assert_eq!(dropped_item_count(&mut app), WOOD_DROP_COUNT);
    assert_eq!(
        app.world().resource::<PlayerState>().stamina,
        MAX_STAMINA - TREE_MAX_HEALTH as f32 * stamina_cost(Tool::Axe)
    );

    // Chopping grass does nothing further.
    app.world_mut().send_event(ChopTreeEvent { x: 20, y: 20 });
    app.update();
    assert_eq!(dropped_item_count(&mut app), WOOD_DROP_COUNT);
}

#[test]
fn contact_damage_opens_the_invulnerability_window() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        enemy_contact_damage.run_if(in_state(GameState::Playing)),
    );
    enter_playing_state(&mut app);

    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(4, 4);
    app.world_mut()
        .spawn(Enemy::spawn_at(EnemyKind::Slime, 4, 4, SceneId::Exterior));

    app.update();
    {
        let player = app.world().resource::<PlayerState>();
        assert_eq!(player.health, MAX_HEALTH - EnemyKind::Slime.damage());
        assert!(player.is_invulnerable());
    }

    // Still touching, still invulnerable: no second hit.
    app.update();
    assert_eq!(
        app.world().resource::<PlayerState>().health,
        MAX_HEALTH - EnemyKind::Slime.damage()
    );
}

#[test]
fn knockout_starts_a_new_day_at_home() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        (enemy_contact_damage, handle_day_end, handle_scene_transition)
            .chain()
            .run_if(in_state(GameState::Playing)),
    );
    app.insert_resource(maps::generate_scene(SceneId::Exterior));
    enter_playing_state(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.set_position(20, 10);
        player.health = 5.0;
    }
    app.world_mut()
        .spawn(Enemy::spawn_at(EnemyKind::Skeleton, 20, 10, SceneId::Exterior));

    app.update();

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day, 2, "a knockout still ends the day");

    let player = app.world().resource::<PlayerState>();
    assert_eq!(player.health, MAX_HEALTH, "waking up restores health");
    assert_eq!(player.scene, SceneId::Interior);
    assert_eq!((player.grid_x, player.grid_y), maps::INTERIOR_WAKE);
    assert_eq!(app.world().resource::<WorldGrid>().scene, SceneId::Interior);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene Transitions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn edge_exit_swaps_scene_atomically_and_preserves_the_farm() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        (scene_transition_check, handle_scene_transition)
            .chain()
            .run_if(in_state(GameState::Playing)),
    );

    // Till a plot so we can prove the exterior survives the round trip.
    let mut grid = maps::generate_scene(SceneId::Exterior);
    grid.set(10, 5, Tile::Crop(Crop::tilled()));
    app.insert_resource(grid);
    enter_playing_state(&mut app);

    // Step onto the east exit.
    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(39, 15);
    app.update();

    {
        let grid = app.world().resource::<WorldGrid>();
        let player = app.world().resource::<PlayerState>();
        let camera = app.world().resource::<CameraState>();
        assert_eq!(grid.scene, SceneId::TownSquare);
        assert_eq!(player.scene, SceneId::TownSquare, "grid and player swap together");
        assert_eq!((player.grid_x, player.grid_y), maps::entry_point(SceneId::TownSquare, SceneId::Exterior));
        assert_eq!((camera.x, camera.y), (player.pixel_x, player.pixel_y));
        assert!(
            app.world().resource::<SceneCache>().exterior.is_some(),
            "the exterior is cached, not discarded"
        );
    }

    // Standing still on the entry tile must not re-trigger anything.
    app.update();
    assert_eq!(
        app.world().resource::<WorldGrid>().scene,
        SceneId::TownSquare
    );

    // Walk back through the town's west exit.
    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(0, 12);
    app.update();

    let grid = app.world().resource::<WorldGrid>();
    assert_eq!(grid.scene, SceneId::Exterior);
    assert_eq!(
        grid.get(10, 5),
        Some(Tile::Crop(Crop::tilled())),
        "farm mutations survive the round trip through town"
    );
    let player = app.world().resource::<PlayerState>();
    assert_eq!(
        (player.grid_x, player.grid_y),
        maps::entry_point(SceneId::Exterior, SceneId::TownSquare)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Action Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bed_prompt_opens_confirms_and_stays_declined_until_stepping_off() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        (check_bed_prompt, handle_action)
            .chain()
            .run_if(in_state(GameState::Playing)),
    );
    app.insert_resource(maps::generate_scene(SceneId::Interior));
    enter_playing_state(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.scene = SceneId::Interior;
        player.set_position(maps::INTERIOR_BED.0, maps::INTERIOR_BED.1);
    }
    app.update();
    assert!(app.world().resource::<SavePrompt>().active);

    // Escape declines; the prompt stays closed while standing on the bed.
    app.world_mut().resource_mut::<PlayerInput>().cancel = true;
    app.update();
    app.world_mut().resource_mut::<PlayerInput>().cancel = false;
    app.update();
    assert!(!app.world().resource::<SavePrompt>().active);

    // Stepping off and back on re-offers the prompt.
    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(5, 4);
    app.update();
    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(maps::INTERIOR_BED.0, maps::INTERIOR_BED.1);
    app.update();
    assert!(app.world().resource::<SavePrompt>().active);

    // Confirming fires exactly one save request.
    app.world_mut().resource_mut::<PlayerInput>().action = true;
    app.update();
    app.world_mut().resource_mut::<PlayerInput>().action = false;
    assert_eq!(count_events::<SaveRequestEvent>(&mut app), 1);
}

#[test]
fn open_dialogue_swallows_the_action_press() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        handle_action.run_if(in_state(GameState::Playing)),
    );
    app.insert_resource(maps::generate_scene(SceneId::TownSquare));
    enter_playing_state(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.scene = SceneId::TownSquare;
        player.set_position(11, 12);
    }
    app.world_mut().spawn(mary());

    // First press opens Mary's first line.
    app.world_mut().resource_mut::<PlayerInput>().action = true;
    app.update();
    {
        let dialogue = app.world().resource::<ActiveDialogue>();
        let open = dialogue.0.as_ref().expect("talking opens a dialogue box");
        assert_eq!(open.npc_name, "Mary");
    }

    // Second press only dismisses; no tool use, no new line.
    app.update();
    assert!(
        app.world().resource::<ActiveDialogue>().0.is_none(),
        "an open dialogue swallows the press"
    );
    assert_eq!(count_events::<FarmActionEvent>(&mut app), 0);
    assert_eq!(count_events::<SwordSwingEvent>(&mut app), 0);

    // Third press opens the second line: the cursor advanced.
    app.update();
    let dialogue = app.world().resource::<ActiveDialogue>();
    let open = dialogue.0.as_ref().expect("dialogue reopens");
    assert!(open.text.contains("forge"), "dialogue cycles to the next line");
}

#[test]
fn target_highlight_mirrors_the_dispatcher_guards() {
    let mut grid = maps::generate_scene(SceneId::Exterior);
    let mut player = PlayerState::default();
    let mut inventory = Inventory::default();
    player.set_position(10, 4);
    player.facing = Facing::Down; // target (10, 5), bare soil

    player.selected_tool = Tool::Hoe;
    assert!(is_target_actionable(&player, &grid, &inventory));
    player.selected_tool = Tool::WateringCan;
    assert!(!is_target_actionable(&player, &grid, &inventory));
    player.selected_tool = Tool::Hand;
    assert!(!is_target_actionable(&player, &grid, &inventory));

    grid.set(10, 5, Tile::Crop(Crop::tilled()));
    player.selected_tool = Tool::Hoe;
    assert!(!is_target_actionable(&player, &grid, &inventory));
    player.selected_tool = Tool::Seed(SeedKind::Parsnip);
    assert!(is_target_actionable(&player, &grid, &inventory));

    // Watering stays actionable until the stage quota is met.
    let mut potato = Crop::planted(SeedKind::Potato, 0.0);
    potato.waterings_received = 2;
    grid.set(10, 5, Tile::Crop(potato));
    player.selected_tool = Tool::WateringCan;
    assert!(is_target_actionable(&player, &grid, &inventory));
    potato.waterings_received = 3;
    potato.watered = true;
    grid.set(10, 5, Tile::Crop(potato));
    assert!(
        !is_target_actionable(&player, &grid, &inventory),
        "a quota-complete crop can't be watered again"
    );
    grid.set(10, 5, Tile::Crop(Crop::tilled()));
    player.selected_tool = Tool::Seed(SeedKind::Parsnip);
    inventory.seeds.insert(SeedKind::Parsnip, 0);
    assert!(
        !is_target_actionable(&player, &grid, &inventory),
        "planting with no seeds left can't be promised"
    );

    // Exhausted stamina blocks farm tools.
    player.selected_tool = Tool::Seed(SeedKind::Potato);
    player.stamina = 0.0;
    assert!(!is_target_actionable(&player, &grid, &inventory));
    player.stamina = MAX_STAMINA;

    // The sword swings anywhere; it costs nothing.
    player.selected_tool = Tool::Sword;
    assert!(is_target_actionable(&player, &grid, &inventory));

    // Doors and the forge are actionable regardless of tool.
    player.selected_tool = Tool::Hoe;
    player.set_position(maps::HOUSE_DOOR.0, maps::HOUSE_DOOR.1 + 1);
    player.facing = Facing::Up;
    assert!(is_target_actionable(&player, &grid, &inventory));
}

#[test]
fn toolbar_projection_drops_spent_seed_slots() {
    let mut inventory = Inventory::default();
    let slots = toolbar_slots(&inventory);
    assert_eq!(slots[0].tool, Tool::Hoe);
    assert!(slots
        .iter()
        .any(|s| s.tool == Tool::Seed(SeedKind::Parsnip) && s.count == Some(5)));
    assert!(slots
        .iter()
        .any(|s| s.tool == Tool::Seed(SeedKind::Potato) && s.count == Some(3)));
    assert_eq!(slots.last().unwrap().tool, Tool::Sword);

    inventory.seeds.insert(SeedKind::Potato, 0);
    let slots = toolbar_slots(&inventory);
    assert!(
        !slots.iter().any(|s| s.tool == Tool::Seed(SeedKind::Potato)),
        "a spent seed slot disappears from the toolbar"
    );
    assert!(slots.iter().any(|s| s.tool == Tool::Seed(SeedKind::Parsnip)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn item_physics_decays_velocity_and_magnets_toward_the_player() {
    let mut app = build_test_app();
    app.add_systems(Update, item_physics.run_if(in_state(GameState::Playing)));
    enter_playing_state(&mut app);

    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(10, 5);
    app.world_mut().resource_mut::<SimClock>().elapsed = 100.0;

    // A fresh drop beyond magnet range just skids to a stop.
    let far = app
        .world_mut()
        .spawn(DroppedItem {
            kind: DropKind::Wood,
            pos: Vec2::new(20.0, 5.0),
            velocity: Vec2::new(0.1, 0.0),
            spawned_at: 100.0,
            scene: SceneId::Exterior,
        })
        .id();
    // A stale drop just inside magnet range, at rest.
    let near = app
        .world_mut()
        .spawn(DroppedItem {
            kind: DropKind::Wood,
            pos: Vec2::new(12.0, 5.0),
            velocity: Vec2::ZERO,
            spawned_at: 0.0,
            scene: SceneId::Exterior,
        })
        .id();
    // Same spot, wrong scene: untouched.
    let elsewhere = app
        .world_mut()
        .spawn(DroppedItem {
            kind: DropKind::Wood,
            pos: Vec2::new(12.0, 5.0),
            velocity: Vec2::ZERO,
            spawned_at: 0.0,
            scene: SceneId::Arena,
        })
        .id();

    app.update();

    {
        let item = app.world().get::<DroppedItem>(far).unwrap();
        assert!((item.velocity.x - 0.1 * ITEM_FRICTION).abs() < 1e-6);
        assert!(item.pos.x > 20.0, "velocity moved it before decaying");
    }
    {
        let item = app.world().get::<DroppedItem>(near).unwrap();
        assert!(item.pos.x < 12.0, "magnet pulls the stale drop inward");
    }
    assert_eq!(
        app.world().get::<DroppedItem>(elsewhere).unwrap().pos,
        Vec2::new(12.0, 5.0),
        "items in other scenes are frozen"
    );

    // Sub-epsilon velocity snaps to zero.
    app.world_mut().get_mut::<DroppedItem>(far).unwrap().velocity =
        Vec2::new(ITEM_VELOCITY_EPSILON * 0.5, 0.0);
    app.update();
    assert_eq!(
        app.world().get::<DroppedItem>(far).unwrap().velocity,
        Vec2::ZERO
    );
}

#[test]
fn pickup_waits_out_the_drop_delay() {
    let mut app = build_test_app();
    app.add_systems(Update, collect_items.run_if(in_state(GameState::Playing)));
    enter_playing_state(&mut app);

    app.world_mut()
        .resource_mut::<PlayerState>()
        .set_position(10, 5);
    app.world_mut().resource_mut::<SimClock>().elapsed = 10.0;

    app.world_mut().spawn(DroppedItem {
        kind: DropKind::Wood,
        pos: Vec2::new(10.1, 5.0),
        velocity: Vec2::ZERO,
        spawned_at: 10.0,
        scene: SceneId::Exterior,
    });

    app.update();
    assert_eq!(
        dropped_item_count(&mut app),
        1,
        "a drop can't be grabbed the instant it spawns"
    );
    assert_eq!(app.world().resource::<Inventory>().wood, 0);

    app.world_mut().resource_mut::<SimClock>().elapsed = 10.0 + ITEM_PICKUP_DELAY as f64 + 0.1;
    app.update();
    assert_eq!(dropped_item_count(&mut app), 0);
    assert_eq!(app.world().resource::<Inventory>().wood, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Enemies & NPCs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn enemy_spawn_pool_depends_on_time_and_escalation() {
    let mut clock = GameClock::default();
    let mut horror = HorrorState::default();
    horror.recompute(1);

    assert!(EnemyKind::Slime.can_spawn(&clock, &horror));
    assert!(!EnemyKind::Bat.can_spawn(&clock, &horror), "bats are night-only");
    assert!(!EnemyKind::Skeleton.can_spawn(&clock, &horror));

    clock.advance_minutes(16 * 60); // 06:00 -> 22:00
    assert!(EnemyKind::Bat.can_spawn(&clock, &horror));

    horror.recompute(30); // nightmare threshold
    assert!(EnemyKind::Skeleton.can_spawn(&clock, &horror));

    assert_eq!(arena_enemy_cap(&horror), ARENA_ENEMY_BASE_CAP + 4);
    horror.recompute(1);
    assert_eq!(arena_enemy_cap(&horror), ARENA_ENEMY_BASE_CAP);
}

#[test]
fn npc_walks_its_loop_and_pauses_at_marked_waypoints() {
    let mut app = build_test_app();
    app.add_systems(Update, npc_movement.run_if(in_state(GameState::Playing)));
    enter_playing_state(&mut app);

    let start = Waypoint::pause(1, 1, 0.5);
    let npc = app
        .world_mut()
        .spawn(Npc {
            id: "walker".into(),
            name: "Walker".into(),
            pixel: start.pixel(),
            grid_x: start.x,
            grid_y: start.y,
            facing: Facing::Down,
            is_moving: false,
            path: vec![start, Waypoint::new(3, 1)],
            path_index: 1,
            is_paused: false,
            pause_remaining: 0.0,
            move_speed: 480.0,
            dialogue: vec!["...".into()],
            dialogue_index: 0,
            scene: SceneId::TownSquare,
        })
        .id();

    // Walks east to (3, 1), turns around, then pauses back at (1, 1).
    let mut saw_east = false;
    for _ in 0..40 {
        app.update();
        let walker = app.world().get::<Npc>(npc).unwrap();
        if (walker.grid_x, walker.grid_y) == (3, 1) {
            saw_east = true;
        }
        if walker.is_paused {
            break;
        }
    }
    let walker = app.world().get::<Npc>(npc).unwrap();
    assert!(saw_east, "the walker reached the far waypoint");
    assert!(walker.is_paused, "the pause waypoint stops the walker");
    assert_eq!((walker.grid_x, walker.grid_y), (1, 1));
    assert!(walker.pixel.x.is_finite() && walker.pixel.y.is_finite());

    // The pause runs out and the loop continues.
    for _ in 0..20 {
        app.update();
        if !app.world().get::<Npc>(npc).unwrap().is_paused {
            break;
        }
    }
    let walker = app.world().get::<Npc>(npc).unwrap();
    assert!(!walker.is_paused);
    assert_eq!(walker.path_index, 1, "the path index advanced past the pause");
}

#[test]
fn npc_with_a_degenerate_waypoint_never_divides_by_zero() {
    let mut app = build_test_app();
    app.add_systems(Update, npc_movement.run_if(in_state(GameState::Playing)));
    enter_playing_state(&mut app);

    let spot = Waypoint::new(2, 2);
    let npc = app
        .world_mut()
        .spawn(Npc {
            id: "statue".into(),
            name: "Statue".into(),
            pixel: spot.pixel(),
            grid_x: spot.x,
            grid_y: spot.y,
            facing: Facing::Down,
            is_moving: false,
            path: vec![spot],
            path_index: 0,
            is_paused: false,
            pause_remaining: 0.0,
            move_speed: 100.0,
            dialogue: vec!["...".into()],
            dialogue_index: 0,
            scene: SceneId::TownSquare,
        })
        .id();

    for _ in 0..5 {
        app.update();
    }
    let statue = app.world().get::<Npc>(npc).unwrap();
    assert_eq!(statue.pixel, spot.pixel());
    assert!(statue.pixel.x.is_finite() && statue.pixel.y.is_finite());
}

// ─────────────────────────────────────────────────────────────────────────────
// Save / Load
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn save_file_round_trips_through_serde_json() {
    let mut inventory = Inventory::default();
    inventory.wood = 7;
    inventory.add_crop(SeedKind::Parsnip);

    let mut grid = maps::generate_scene(SceneId::Exterior);
    grid.set(10, 5, Tile::Crop(Crop::planted(SeedKind::Potato, 12.5)));

    let data = SaveData {
        version: SAVE_VERSION,
        day: 9,
        inventory,
        exterior: grid.tiles,
        drops: vec![],
        npcs: vec![SavedNpc {
            id: "mary".into(),
            x: 14.0 * CELL_SIZE,
            y: 11.0 * CELL_SIZE,
            path_index: 2,
            dialogue_index: 3,
        }],
    };

    let json = serde_json::to_string(&data).expect("save data serializes");
    let back: SaveData = serde_json::from_str(&json).expect("save data deserializes");

    assert_eq!(back.version, SAVE_VERSION);
    assert_eq!(back.day, 9);
    assert_eq!(back.inventory.wood, 7);
    assert_eq!(back.inventory.crop_count(SeedKind::Parsnip), 1);
    assert_eq!(
        back.exterior[5][10],
        Tile::Crop(Crop::planted(SeedKind::Potato, 12.5)),
        "crop records survive the file format"
    );
    assert_eq!(back.npcs[0].path_index, 2);

    // A truncated file is an error, not a panic.
    assert!(serde_json::from_str::<SaveData>(&json[..json.len() / 2]).is_err());
}

#[test]
#[cfg(not(target_arch = "wasm32"))]
fn sleeping_writes_the_next_morning_to_disk() {
    let mut app = build_test_app();
    app.add_systems(
        Update,
        (handle_save_request, handle_day_end)
            .chain()
            .run_if(in_state(GameState::Playing)),
    );
    app.insert_resource(maps::generate_scene(SceneId::Exterior));
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<GameClock>().day = 4;
    app.world_mut().resource_mut::<Inventory>().wood = 3;

    app.world_mut().send_event(SaveRequestEvent);
    app.update();

    let data = read_save().expect("the save file exists after sleeping");
    assert_eq!(
        data.day, 5,
        "the file records the morning the player wakes into"
    );
    assert_eq!(data.inventory.wood, 3);
    assert_eq!(data.exterior.len() as i32, maps::EXTERIOR_HEIGHT);

    // The save handler also ends the day, so reloading never replays it.
    assert_eq!(app.world().resource::<GameClock>().day, 5);

    let _ = std::fs::remove_file(save_path());
}
