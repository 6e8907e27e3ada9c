//! The seam between the rig logic and the rigid-body engine.
//!
//! Controllers and abilities never touch Rapier directly.  Each physics tick
//! the step system takes a [`RigWorld`] snapshot of the six bodies, lets the
//! active controller and the wall-climb ability read it, query surfaces through
//! a [`ShapeProbe`], and write forces into a [`ForceBuffer`].  The buffer is
//! then flushed into Rapier's `ExternalForce` / `ExternalImpulse` /
//! `GravityScale` components.
//!
//! Tests swap [`RapierProbe`] for a scripted probe and inspect the buffer.

use crate::error::{RigError, RigResult};
use crate::segment::{BodyPart, CharacterRig, RigPart};
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::parry::shape::Cuboid;
use bevy_rapier2d::prelude::*;

// ── Surface classification ────────────────────────────────────────────────────

/// Collision group of walkable level geometry.
pub const GROUND_GROUP: Group = Group::GROUP_1;
/// Collision group of surfaces the hands can stick to.
pub const CLIMBABLE_GROUP: Group = Group::GROUP_2;
/// Collision group of lethal geometry.
pub const HAZARD_GROUP: Group = Group::GROUP_3;
/// Collision group of every character body.  Parts never collide with each other.
pub const CHARACTER_GROUP: Group = Group::GROUP_4;

/// Classification of a level collider, queried by the rig's probes.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Ground,
    ClimbableWall,
}

impl SurfaceKind {
    pub fn group(self) -> Group {
        match self {
            SurfaceKind::Ground => GROUND_GROUP,
            SurfaceKind::ClimbableWall => CLIMBABLE_GROUP,
        }
    }

    /// Collision groups to put on a level collider of this kind.
    pub fn collision_groups(self) -> CollisionGroups {
        CollisionGroups::new(self.group(), Group::ALL)
    }
}

/// Collision groups for a character body: collide with the level, not each other.
pub fn character_collision_groups() -> CollisionGroups {
    CollisionGroups::new(
        CHARACTER_GROUP,
        GROUND_GROUP | CLIMBABLE_GROUP | HAZARD_GROUP,
    )
}

// ── Probes ────────────────────────────────────────────────────────────────────

/// A small box swept from just beyond a segment's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxProbe {
    pub half_extents: Vec2,
    pub distance: f32,
    /// How far along the sweep direction the box starts.
    pub offset: f32,
}

/// A fully resolved sweep request handed to a [`ShapeProbe`].
///
/// Zero `half_extents` degrade the sweep to a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeCast {
    pub origin: Vec2,
    /// Rotation of the swept box in radians.
    pub rotation: f32,
    /// Unit sweep direction.
    pub direction: Vec2,
    pub half_extents: Vec2,
    pub max_distance: f32,
    pub surface: SurfaceKind,
}

/// Result of a probe that struck a surface of the requested kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Outward normal of the struck surface (points back toward the prober).
    pub normal: Vec2,
    pub distance: f32,
    pub surface: SurfaceKind,
}

/// Answers shape-cast queries against the level.
pub trait ShapeProbe {
    fn cast(&self, cast: &ShapeCast) -> Option<ProbeHit>;
}

/// A probe that never hits anything.  Used when no physics context exists.
pub struct NoSurfaces;

impl ShapeProbe for NoSurfaces {
    fn cast(&self, _cast: &ShapeCast) -> Option<ProbeHit> {
        None
    }
}

/// Shape casts answered by the Rapier query pipeline.
pub struct RapierProbe<'c, 'a> {
    pub context: &'c RapierContext<'a>,
}

impl ShapeProbe for RapierProbe<'_, '_> {
    fn cast(&self, cast: &ShapeCast) -> Option<ProbeHit> {
        let filter = QueryFilter::default()
            .groups(CollisionGroups::new(Group::ALL, cast.surface.group()))
            .exclude_sensors();

        if cast.half_extents == Vec2::ZERO {
            return self
                .context
                .cast_ray_and_get_normal(
                    cast.origin,
                    cast.direction,
                    cast.max_distance,
                    true,
                    filter,
                )
                .map(|(_, hit)| ProbeHit {
                    normal: hit.normal,
                    distance: hit.time_of_impact,
                    surface: cast.surface,
                });
        }

        let shape = Cuboid::new(cast.half_extents.into());
        self.context
            .cast_shape(
                cast.origin,
                cast.rotation,
                cast.direction,
                &shape,
                ShapeCastOptions {
                    max_time_of_impact: cast.max_distance,
                    stop_at_penetration: true,
                    ..default()
                },
                filter,
            )
            .map(|(_, hit)| ProbeHit {
                // normal2 belongs to the struck collider.
                normal: hit.details.map(|d| d.normal2).unwrap_or(-cast.direction),
                distance: hit.time_of_impact,
                surface: cast.surface,
            })
    }
}

// ── Snapshot & force buffer ───────────────────────────────────────────────────

/// Kinematic state of one body at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub position: Vec2,
    /// Rotation in degrees, wrapped to (-180, 180].
    pub rotation_deg: f32,
    pub linvel: Vec2,
    pub angvel: f32,
}

impl BodyState {
    pub fn from_physics(transform: &Transform, velocity: &Velocity) -> Self {
        let angle = transform.rotation.to_euler(EulerRot::ZYX).0;
        Self {
            position: transform.translation.truncate(),
            rotation_deg: wrap_degrees(angle.to_degrees()),
            linvel: velocity.linvel,
            angvel: velocity.angvel,
        }
    }
}

/// Wrap an angle in degrees into (-180, 180].
pub fn wrap_degrees(deg: f32) -> f32 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Forces, torques, impulses and gravity-scale writes accumulated in one tick.
///
/// Writes to the same body from different sources add up; a gravity-scale
/// write replaces any earlier one in the same tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceBuffer {
    pub force: [Vec2; BodyPart::COUNT],
    pub torque: [f32; BodyPart::COUNT],
    pub impulse: [Vec2; BodyPart::COUNT],
    pub gravity_scale: [Option<f32>; BodyPart::COUNT],
}

impl ForceBuffer {
    pub fn force(&self, part: BodyPart) -> Vec2 {
        self.force[part.index()]
    }

    pub fn torque(&self, part: BodyPart) -> f32 {
        self.torque[part.index()]
    }

    pub fn impulse(&self, part: BodyPart) -> Vec2 {
        self.impulse[part.index()]
    }

    pub fn gravity_scale(&self, part: BodyPart) -> Option<f32> {
        self.gravity_scale[part.index()]
    }

    pub fn is_empty(&self) -> bool {
        *self == ForceBuffer::default()
    }
}

/// Everything a controller or ability may see and do during one tick.
pub struct RigWorld<'p> {
    bodies: [Option<BodyState>; BodyPart::COUNT],
    probe: &'p dyn ShapeProbe,
    buffer: ForceBuffer,
    fixed_dt: f32,
}

impl<'p> RigWorld<'p> {
    pub fn new(probe: &'p dyn ShapeProbe, fixed_dt: f32) -> Self {
        Self {
            bodies: [None; BodyPart::COUNT],
            probe,
            buffer: ForceBuffer::default(),
            fixed_dt,
        }
    }

    pub fn with_body(mut self, part: BodyPart, state: BodyState) -> Self {
        self.set_body(part, Some(state));
        self
    }

    pub fn set_body(&mut self, part: BodyPart, state: Option<BodyState>) {
        self.bodies[part.index()] = state;
    }

    pub fn body(&self, part: BodyPart) -> RigResult<BodyState> {
        self.bodies[part.index()].ok_or(RigError::MissingBody { part })
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    pub fn add_force(&mut self, part: BodyPart, force: Vec2) {
        self.buffer.force[part.index()] += force;
    }

    pub fn add_torque(&mut self, part: BodyPart, torque: f32) {
        self.buffer.torque[part.index()] += torque;
    }

    pub fn add_impulse(&mut self, part: BodyPart, impulse: Vec2) {
        self.buffer.impulse[part.index()] += impulse;
    }

    pub fn set_gravity_scale(&mut self, part: BodyPart, scale: f32) {
        self.buffer.gravity_scale[part.index()] = Some(scale);
    }

    /// Sweep `probe` from `part` along `direction` against `surface`.
    ///
    /// A missing body or a zero direction never hits.
    pub fn cast(
        &self,
        part: BodyPart,
        direction: Vec2,
        probe: &BoxProbe,
        surface: SurfaceKind,
    ) -> Option<ProbeHit> {
        let body = self.body(part).ok()?;
        let direction = direction.try_normalize()?;
        self.probe.cast(&ShapeCast {
            origin: body.position + direction * probe.offset,
            rotation: body.rotation_deg.to_radians(),
            direction,
            half_extents: probe.half_extents,
            max_distance: probe.distance,
            surface,
        })
    }

    /// Downward sweep against ground.
    pub fn is_grounded(&self, part: BodyPart, probe: &BoxProbe) -> bool {
        self.cast(part, Vec2::NEG_Y, probe, SurfaceKind::Ground)
            .is_some()
    }

    pub fn buffer(&self) -> &ForceBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> ForceBuffer {
        self.buffer
    }
}

// ── Systems & helpers ─────────────────────────────────────────────────────────

/// Zero the continuous force on every rig body at the start of a tick.
///
/// Rapier keeps `ExternalForce` between steps, so without this the forces of
/// every previous tick would keep acting.
pub fn clear_rig_forces_system(mut q: Query<&mut ExternalForce, With<RigPart>>) {
    for mut force in q.iter_mut() {
        force.force = Vec2::ZERO;
        force.torque = 0.0;
    }
}

/// Write a tick's buffer into the rig's Rapier components.
///
/// Bodies without the needed components are skipped.
pub fn flush_force_buffer(
    buffer: &ForceBuffer,
    rig: &CharacterRig,
    bodies: &mut Query<
        (
            &mut ExternalForce,
            &mut ExternalImpulse,
            Option<&mut GravityScale>,
        ),
        With<RigPart>,
    >,
) {
    for (part, entity) in rig.iter() {
        let Ok((mut force, mut impulse, gravity)) = bodies.get_mut(entity) else {
            continue;
        };
        let i = part.index();
        force.force += buffer.force[i];
        force.torque += buffer.torque[i];
        impulse.impulse += buffer.impulse[i];
        if let (Some(scale), Some(mut gravity)) = (buffer.gravity_scale[i], gravity) {
            gravity.0 = scale;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn wrap_degrees_stays_in_half_open_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert!((wrap_degrees(725.0) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn missing_body_reports_error_and_never_hits() {
        let probe = ScriptedProbe::default().hit(Vec2::ZERO, SurfaceKind::Ground, Vec2::Y);
        let world = RigWorld::new(&probe, 1.0 / 60.0);
        assert_eq!(
            world.body(BodyPart::Head),
            Err(RigError::MissingBody {
                part: BodyPart::Head
            })
        );
        assert!(!world.is_grounded(
            BodyPart::Head,
            &BoxProbe {
                half_extents: Vec2::splat(0.1),
                distance: 0.01,
                offset: 0.0,
            }
        ));
        assert!(probe.casts.borrow().is_empty());
    }

    #[test]
    fn cast_uses_body_pose_and_normalised_direction() {
        let probe = ScriptedProbe::default();
        let world = RigWorld::new(&probe, 1.0 / 60.0).with_body(
            BodyPart::LeftArm,
            BodyState {
                position: Vec2::new(2.0, 1.0),
                rotation_deg: 90.0,
                ..Default::default()
            },
        );
        let probe_box = BoxProbe {
            half_extents: Vec2::new(0.2, 0.1),
            distance: 0.5,
            offset: 0.25,
        };
        world.cast(
            BodyPart::LeftArm,
            Vec2::new(3.0, 0.0),
            &probe_box,
            SurfaceKind::ClimbableWall,
        );
        let casts = probe.casts.borrow();
        assert_eq!(casts.len(), 1);
        assert_eq!(casts[0].origin, Vec2::new(2.25, 1.0));
        assert_eq!(casts[0].direction, Vec2::X);
        assert!((casts[0].rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(casts[0].max_distance, 0.5);
    }

    #[test]
    fn buffer_accumulates_additively_and_gravity_overwrites() {
        let probe = NoSurfaces;
        let mut world = RigWorld::new(&probe, 1.0 / 60.0);
        world.add_force(BodyPart::Torso, Vec2::X);
        world.add_force(BodyPart::Torso, Vec2::Y);
        world.add_torque(BodyPart::Torso, 1.5);
        world.add_torque(BodyPart::Torso, -0.5);
        world.set_gravity_scale(BodyPart::LeftLeg, 3.0);
        world.set_gravity_scale(BodyPart::LeftLeg, 1.0);
        let buffer = world.into_buffer();
        assert_eq!(buffer.force(BodyPart::Torso), Vec2::new(1.0, 1.0));
        assert_eq!(buffer.torque(BodyPart::Torso), 1.0);
        assert_eq!(buffer.gravity_scale(BodyPart::LeftLeg), Some(1.0));
        assert_eq!(buffer.gravity_scale(BodyPart::RightLeg), None);
    }
}
