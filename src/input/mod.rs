use crate::shared::*;
use bevy::prelude::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, reset_and_read_input);
    }
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    *input = PlayerInput::default();

    let mut axis = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        axis.x += 1.0;
    }
    input.move_axis = axis;

    input.action = keys.just_pressed(KeyCode::Space) || keys.just_pressed(KeyCode::Enter);
    input.cancel = keys.just_pressed(KeyCode::Escape);
    input.debug_toggle = keys.just_pressed(KeyCode::F3);

    for (i, key) in [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ]
    .iter()
    .enumerate()
    {
        if keys.just_pressed(*key) {
            input.tool_slot = Some(i as u8);
            break;
        }
    }
}
