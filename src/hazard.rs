//! Fatal collisions.
//!
//! When any body of a character starts touching a [`Hazard`] collider, every
//! connected segment is detached (each starting its own reconnect cooldown),
//! the parts are blown apart, and [`CharacterDied`] is published for whatever
//! restarts the level.

use crate::config::{HazardConfig, RigConfig};
use crate::connection::{disconnect_segment, ConnectionChanged, SegmentConnections};
use crate::segment::{BodyPart, CharacterRig, RigPart, Segment};
use crate::stage::{refresh_stage, StageChanged, StageSelector};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

/// Marks a lethal level collider.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hazard;

/// A character touched a hazard while at least one segment was attached.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CharacterDied {
    pub character: Entity,
}

/// Outward scatter direction for `part`, rotated by `jitter` radians.
pub fn scatter_direction(part: BodyPart, jitter: f32) -> Vec2 {
    let base = match part {
        BodyPart::Head | BodyPart::Torso => Vec2::Y,
        BodyPart::RightArm | BodyPart::RightLeg => Vec2::X,
        BodyPart::LeftArm | BodyPart::LeftLeg => Vec2::NEG_X,
    };
    Vec2::from_angle(jitter).rotate(base)
}

fn scatter(
    rig: &CharacterRig,
    config: &HazardConfig,
    impulses: &mut Query<&mut ExternalImpulse>,
) {
    let mut rng = rand::thread_rng();
    for (part, entity) in rig.iter() {
        let Ok(mut impulse) = impulses.get_mut(entity) else {
            continue;
        };
        let jitter = if config.scatter_spread > 0.0 {
            rng.gen_range(-config.scatter_spread..config.scatter_spread)
        } else {
            0.0
        };
        impulse.impulse += scatter_direction(part, jitter) * config.scatter_impulse;
    }
}

/// Tear apart every character whose body started touching a hazard.
pub fn hazard_contact_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    hazards: Query<(), With<Hazard>>,
    parts: Query<&RigPart>,
    mut characters: Query<(&CharacterRig, &mut SegmentConnections, &mut StageSelector)>,
    mut impulses: Query<&mut ExternalImpulse>,
    config: Res<RigConfig>,
    mut changed: MessageWriter<ConnectionChanged>,
    mut stage_changed: MessageWriter<StageChanged>,
    mut died: MessageWriter<CharacterDied>,
) {
    let mut victims: Vec<Entity> = Vec::new();
    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let part = if hazards.contains(e1) {
            parts.get(e2)
        } else if hazards.contains(e2) {
            parts.get(e1)
        } else {
            continue;
        };
        if let Ok(part) = part {
            if !victims.contains(&part.character) {
                victims.push(part.character);
            }
        }
    }

    for character in victims {
        let Ok((rig, mut connections, mut selector)) = characters.get_mut(character) else {
            continue;
        };
        if !connections.any_connected() {
            continue;
        }
        for segment in Segment::ALL {
            disconnect_segment(
                &mut commands,
                character,
                rig,
                &mut connections,
                segment,
                config.connection.reconnect_delay,
                &mut changed,
            );
        }
        refresh_stage(
            character,
            &mut selector,
            &connections,
            &config.camera,
            &mut stage_changed,
        );
        scatter(rig, &config.hazard, &mut impulses);
        warn!("Character {character:?} hit a hazard and fell apart");
        died.write(CharacterDied { character });
    }
}
