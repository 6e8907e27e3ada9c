//! Head launch.
//!
//! On a latched launch action, every character whose head is attached asks
//! the connection manager to detach it and fires the head off as a
//! projectile.  The head comes back through the ordinary reconnection scan
//! once its cooldown has run out and it is within snap distance again.

use crate::config::{LaunchAim, LaunchConfig, RigConfig};
use crate::connection::{DisconnectRequest, SegmentConnections};
use crate::constants::MIN_DIRECTION_LENGTH;
use crate::error::{RigError, RigResult};
use crate::input::{ActionLatch, MoveInput};
use crate::physics::BodyState;
use crate::segment::{BodyPart, CharacterRig, Segment};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Per-character launch state.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HeadLauncher {
    /// `1.0` facing right, `-1.0` facing left.
    pub facing: f32,
}

impl Default for HeadLauncher {
    fn default() -> Self {
        Self { facing: 1.0 }
    }
}

impl HeadLauncher {
    /// Remember the last horizontal direction the player pushed.
    pub fn track_facing(&mut self, x: f32, deadzone: f32) {
        if x.abs() > deadzone {
            self.facing = x.signum();
        }
    }

    /// Unit launch direction.  Falls back to straight up when the head sits
    /// on the anchor.
    pub fn aim(&self, config: &LaunchConfig, head: &BodyState, torso: &BodyState) -> Vec2 {
        match self.try_aim(config, head, torso) {
            Ok(direction) => direction,
            Err(e) => {
                debug!("{e}; launching straight up");
                Vec2::Y
            }
        }
    }

    fn try_aim(&self, config: &LaunchConfig, head: &BodyState, torso: &BodyState) -> RigResult<Vec2> {
        let raw = match config.aim {
            LaunchAim::Anchor => {
                let offset = Vec2::from_angle(torso.rotation_deg.to_radians())
                    .rotate(Vec2::from_array(config.anchor_offset));
                head.position - (torso.position + offset)
            }
            LaunchAim::Facing => Vec2::new(self.facing, 1.0),
        };
        if raw.length() > MIN_DIRECTION_LENGTH {
            Ok(raw.normalize())
        } else {
            Err(RigError::DegenerateDirection {
                context: "head launch",
            })
        }
    }
}

/// Consume the launch latch and fire every attached head.
pub fn head_launch_system(
    mut latch: ResMut<ActionLatch>,
    input: Res<MoveInput>,
    config: Res<RigConfig>,
    mut characters: Query<(Entity, &CharacterRig, &SegmentConnections, &mut HeadLauncher)>,
    bodies: Query<(&Transform, &Velocity)>,
    mut impulses: Query<&mut ExternalImpulse>,
    mut requests: MessageWriter<DisconnectRequest>,
) {
    for (.., mut launcher) in characters.iter_mut() {
        launcher.track_facing(input.axis.x, config.input.move_deadzone);
    }

    if !latch.take_launch() {
        return;
    }

    for (character, rig, connections, launcher) in characters.iter() {
        if !connections.is_connected(Segment::Head) {
            continue;
        }
        let (Some(head), Some(torso)) = (rig.get(BodyPart::Head), rig.torso()) else {
            continue;
        };
        let (Ok(head_body), Ok(torso_body)) = (bodies.get(head), bodies.get(torso)) else {
            continue;
        };
        let head_state = BodyState::from_physics(head_body.0, head_body.1);
        let torso_state = BodyState::from_physics(torso_body.0, torso_body.1);
        let direction = launcher.aim(&config.launch, &head_state, &torso_state);

        requests.write(DisconnectRequest {
            character,
            segment: Segment::Head,
        });
        if let Ok(mut impulse) = impulses.get_mut(head) {
            impulse.impulse += direction * config.launch.impulse;
        }
        info!("Launched head of {character:?} toward {direction:?}");
    }
}
