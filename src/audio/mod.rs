//! Audio domain — one-shot SFX and the ambient music loop.
//!
//! Other domains only send id strings; the id→path tables and playback
//! entities live here. Which track should play is a pure function of game
//! state, so the music system just compares desired vs current.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::WorldGrid;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicState>().add_systems(
            Update,
            (choose_music, handle_play_music, handle_play_sfx)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[derive(Resource, Default)]
pub struct MusicState {
    pub current_track: Option<Entity>,
    pub current_track_id: String,
}

// ═══════════════════════════════════════════════════════════════════════
// PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "hoe" => Some("audio/sfx/sfx_sounds_impact1.ogg"),
        "plant" => Some("audio/sfx/sfx_sounds_interaction1.ogg"),
        "water" => Some("audio/sfx/sfx_sounds_interaction5.ogg"),
        "harvest" => Some("audio/sfx/sfx_sounds_powerup1.ogg"),
        "chop" => Some("audio/sfx/sfx_sounds_impact2.ogg"),
        "tree_fall" => Some("audio/sfx/sfx_sounds_impact5.ogg"),
        "sword" => Some("audio/sfx/sfx_wpn_sword1.ogg"),
        "enemy_hit" => Some("audio/sfx/sfx_damage_hit1.ogg"),
        "enemy_die" => Some("audio/sfx/sfx_sounds_damage2.ogg"),
        "hurt" => Some("audio/sfx/sfx_sounds_damage1.ogg"),
        "pickup" => Some("audio/sfx/sfx_coin_single1.ogg"),
        "door" => Some("audio/sfx/sfx_movement_dooropen1.ogg"),
        "horror_sting" => Some("audio/sfx/sfx_sounds_negative1.ogg"),
        _ => None,
    }
}

fn music_path(track_id: &str) -> Option<&'static str> {
    match track_id {
        "farm_day" => Some("audio/music/pixel_1.ogg"),
        "farm_night" => Some("audio/music/pixel_10.ogg"),
        "indoors" => Some("audio/music/pixel_4.ogg"),
        "town" => Some("audio/music/pixel_5.ogg"),
        "hollow" => Some("audio/music/pixel_6.ogg"),
        "dread" => Some("audio/music/pixel_12.ogg"),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TRACK SELECTION
// ═══════════════════════════════════════════════════════════════════════

/// Pure mapping from game state to the track that should be playing.
/// An active horror event trumps everything; otherwise the scene picks,
/// with the farm swapping tracks at nightfall.
pub fn desired_music(
    scene: SceneId,
    clock: &GameClock,
    active: &ActiveHorrorEvent,
) -> &'static str {
    if active.0.is_some() {
        return "dread";
    }
    match scene {
        SceneId::Exterior => {
            if clock.is_night() {
                "farm_night"
            } else {
                "farm_day"
            }
        }
        SceneId::Interior | SceneId::CozyHouse => "indoors",
        SceneId::TownSquare | SceneId::GeneralStore | SceneId::Blacksmith => "town",
        SceneId::Arena => "hollow",
    }
}

fn choose_music(
    grid: Res<WorldGrid>,
    clock: Res<GameClock>,
    active: Res<ActiveHorrorEvent>,
    music: Res<MusicState>,
    mut events: EventWriter<PlayMusicEvent>,
) {
    let desired = desired_music(grid.scene, &clock, &active);
    if music.current_track_id != desired {
        events.send(PlayMusicEvent {
            track_id: desired.into(),
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYBACK
// ═══════════════════════════════════════════════════════════════════════

/// One-shot audio sources that despawn themselves when finished.
fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
) {
    for event in events.read() {
        if let Some(path) = sfx_path(&event.sfx_id) {
            commands.spawn((
                AudioPlayer::new(asset_server.load(path)),
                PlaybackSettings::DESPAWN,
            ));
        }
    }
}

fn handle_play_music(
    mut events: EventReader<PlayMusicEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut music: ResMut<MusicState>,
) {
    for event in events.read() {
        let Some(path) = music_path(&event.track_id) else {
            continue;
        };
        if let Some(current) = music.current_track.take() {
            commands.entity(current).despawn();
        }
        let entity = commands
            .spawn((
                AudioPlayer::new(asset_server.load(path)),
                PlaybackSettings::LOOP,
            ))
            .id();
        music.current_track = Some(entity);
        music.current_track_id = event.track_id.clone();
    }
}
