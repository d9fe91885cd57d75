mod actions;
mod audio;
mod combat;
mod enemies;
mod farming;
mod horror;
mod input;
mod items;
mod npcs;
mod player;
mod render;
mod save;
mod shared;
mod world;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Hollowfield".into(),
                        resolution: WindowResolution::new(1280.0, 720.0),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .insert_resource(Time::<Fixed>::from_hz(SIM_TICK_HZ))
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<PlayerInput>()
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
        // Events
        .add_event::<SceneTransitionEvent>()
        .add_event::<DayEndEvent>()
        .add_event::<GridRebuiltEvent>()
        .add_event::<SwordSwingEvent>()
        .add_event::<ChopTreeEvent>()
        .add_event::<FarmActionEvent>()
        .add_event::<TriggerHorrorEvent>()
        .add_event::<HorrorEventStartedEvent>()
        .add_event::<SaveRequestEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<PlayMusicEvent>()
        // Fixed-tick simulation order
        .configure_sets(
            FixedUpdate,
            (
                FixedStep::Movement,
                FixedStep::Transitions,
                FixedStep::Items,
                FixedStep::CombatTimers,
                FixedStep::Enemies,
                FixedStep::ContactDamage,
                FixedStep::Npcs,
            )
                .chain(),
        )
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(actions::ActionsPlugin)
        .add_plugins(farming::FarmingPlugin)
        .add_plugins(items::ItemsPlugin)
        .add_plugins(combat::CombatPlugin)
        .add_plugins(enemies::EnemiesPlugin)
        .add_plugins(npcs::NpcsPlugin)
        .add_plugins(horror::HorrorPlugin)
        .add_plugins(audio::AudioPlugin)
        .add_plugins(render::RenderPlugin)
        .add_plugins(save::SavePlugin)
        // Camera + boot handoff
        .add_systems(Startup, setup_camera)
        .add_systems(Update, finish_boot.run_if(in_state(GameState::Boot)))
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Boot exists so the save file can load before the world spawns.
fn finish_boot(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::Playing);
}
