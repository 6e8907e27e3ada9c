//! Camera and debug overlays.
//!
//! | System                 | Schedule | Purpose                                    |
//! |------------------------|----------|--------------------------------------------|
//! | `setup_camera`         | Startup  | Spawn the orthographic [`RigCamera`]       |
//! | `camera_zoom_system`   | Update   | Retarget zoom on [`StageChanged`]          |
//! | `camera_follow_system` | Update   | Track the character and ease toward zoom   |
//! | `connector_gizmo_system` | Update | Draw attached connectors and wall sticks   |
//!
//! Colliders themselves are drawn by Rapier's debug renderer.

use crate::climb::WallClimb;
use crate::config::RigConfig;
use crate::connection::SegmentConnections;
use crate::segment::{BodyPart, CharacterRig, RigPart, Segment};
use crate::stage::{LocomotionStage, StageChanged, StageSelector};
use bevy::prelude::*;

/// Marks the gameplay camera and holds the scale it is easing toward.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RigCamera {
    pub target_scale: f32,
}

pub fn setup_camera(mut commands: Commands, config: Res<RigConfig>) {
    let scale = config.camera.zoom_for(LocomotionStage::HeadOnly);
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale,
            ..OrthographicProjection::default_2d()
        }),
        RigCamera {
            target_scale: scale,
        },
    ));
}

/// Frame-rate independent exponential approach of `current` toward `target`.
pub fn ease_scale(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 {
        return target;
    }
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

pub fn camera_zoom_system(
    mut stage_changed: MessageReader<StageChanged>,
    mut cameras: Query<&mut RigCamera>,
) {
    let Some(latest) = stage_changed.read().last() else {
        return;
    };
    for mut camera in cameras.iter_mut() {
        camera.target_scale = latest.camera_zoom;
    }
}

/// Keep the camera centred on the first character.
///
/// A lone head is followed directly; anything bigger is followed by the
/// torso.  Camera Z is preserved.
pub fn camera_follow_system(
    time: Res<Time>,
    config: Res<RigConfig>,
    characters: Query<(&CharacterRig, &StageSelector)>,
    bodies: Query<&Transform, (With<RigPart>, Without<RigCamera>)>,
    mut cameras: Query<(&mut Transform, &mut Projection, &RigCamera)>,
) {
    let Some((rig, selector)) = characters.iter().next() else {
        return;
    };
    let Ok((mut cam, mut projection, camera)) = cameras.single_mut() else {
        return;
    };

    let followed = match selector.stage() {
        LocomotionStage::HeadOnly => BodyPart::Head,
        _ => BodyPart::Torso,
    };
    if let Some(target) = rig.get(followed).and_then(|e| bodies.get(e).ok()) {
        cam.translation.x = target.translation.x;
        cam.translation.y = target.translation.y;
    }

    if let Projection::Orthographic(ortho) = projection.as_mut() {
        ortho.scale = ease_scale(
            ortho.scale,
            camera.target_scale,
            config.camera.zoom_ease,
            time.delta_secs(),
        );
    }
}

/// Draw a line along every attached connector, and mark hands stuck to a wall.
pub fn connector_gizmo_system(
    mut gizmos: Gizmos,
    characters: Query<(&CharacterRig, &SegmentConnections, &WallClimb)>,
    bodies: Query<&Transform, With<RigPart>>,
) {
    let attached = Color::srgb(0.3, 0.9, 0.4);
    let stuck = Color::srgb(1.0, 0.6, 0.1);

    for (rig, connections, climb) in characters.iter() {
        let Some(torso) = rig.torso().and_then(|e| bodies.get(e).ok()) else {
            continue;
        };
        let torso_pos = torso.translation.truncate();

        for segment in connections.connected_segments() {
            let Some(body) = rig.get(segment.part()).and_then(|e| bodies.get(e).ok()) else {
                continue;
            };
            gizmos.line_2d(torso_pos, body.translation.truncate(), attached);
        }

        if climb.sticking {
            for arm in [Segment::RightArm, Segment::LeftArm] {
                if let Some(hand) = rig.get(arm.part()).and_then(|e| bodies.get(e).ok()) {
                    gizmos.circle_2d(hand.translation.truncate(), 0.12, stuck);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_moves_toward_target_without_overshoot() {
        let next = ease_scale(1.0, 2.0, 3.0, 0.1);
        assert!(next > 1.0 && next < 2.0);
        let far = ease_scale(1.0, 2.0, 3.0, 100.0);
        assert!((far - 2.0).abs() < 1e-4);
    }

    #[test]
    fn zero_rate_snaps() {
        assert_eq!(ease_scale(1.0, 2.0, 0.0, 0.016), 2.0);
    }

    #[test]
    fn zoom_follows_latest_stage_change() {
        let mut app = App::new();
        app.add_message::<StageChanged>();
        app.add_systems(Update, camera_zoom_system);
        app.world_mut().spawn(RigCamera { target_scale: 1.0 });
        let character = app.world_mut().spawn_empty().id();
        for (stage, zoom) in [
            (LocomotionStage::BodyConnected, 0.5),
            (LocomotionStage::OneArmConnected, 0.7),
        ] {
            app.world_mut().write_message(StageChanged {
                character,
                stage,
                camera_zoom: zoom,
            });
        }
        app.update();

        let mut q = app.world_mut().query::<&RigCamera>();
        let camera = q.single(app.world()).expect("camera");
        assert_eq!(camera.target_scale, 0.7);
    }
}
