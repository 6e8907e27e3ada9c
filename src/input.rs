//! Input provider resources and the keyboard glue that fills them.
//!
//! The rig only ever reads [`MoveInput`] and [`ActionLatch`]; tests write
//! them directly.  [`keyboard_input_system`] is added by the binary.
//!
//! - **A / D** or **← / →** → horizontal axis
//! - **W / S** or **↑ / ↓** → vertical axis
//! - **Space** (held) → wall-jump modifier
//! - **E** → launch the head
//! - **R** → reset every rig

use crate::connection::ResetRig;
use crate::segment::CharacterRig;
use bevy::prelude::*;

/// The continuous movement vector, each axis in `[-1, 1]`.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveInput {
    pub axis: Vec2,
    /// While held, a directional input on a wall triggers a wall jump.
    pub wall_jump_held: bool,
}

/// Discrete actions latched between a rendered frame and the next physics
/// tick.  Each flag is consumed by exactly one tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionLatch {
    pub launch: bool,
}

impl ActionLatch {
    /// Read and clear the launch flag.
    pub fn take_launch(&mut self) -> bool {
        std::mem::take(&mut self.launch)
    }
}

fn axis(keys: &ButtonInput<KeyCode>, negative: [KeyCode; 2], positive: [KeyCode; 2]) -> f32 {
    let mut value = 0.0;
    if keys.any_pressed(negative) {
        value -= 1.0;
    }
    if keys.any_pressed(positive) {
        value += 1.0;
    }
    value
}

/// Translate the keyboard into [`MoveInput`] / [`ActionLatch`] each frame.
pub fn keyboard_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut input: ResMut<MoveInput>,
    mut latch: ResMut<ActionLatch>,
    characters: Query<Entity, With<CharacterRig>>,
    mut resets: MessageWriter<ResetRig>,
) {
    input.axis = Vec2::new(
        axis(
            &keys,
            [KeyCode::KeyA, KeyCode::ArrowLeft],
            [KeyCode::KeyD, KeyCode::ArrowRight],
        ),
        axis(
            &keys,
            [KeyCode::KeyS, KeyCode::ArrowDown],
            [KeyCode::KeyW, KeyCode::ArrowUp],
        ),
    );
    input.wall_jump_held = keys.pressed(KeyCode::Space);

    if keys.just_pressed(KeyCode::KeyE) {
        latch.launch = true;
    }
    if keys.just_pressed(KeyCode::KeyR) {
        for character in characters.iter() {
            resets.write(ResetRig { character });
        }
    }
}
