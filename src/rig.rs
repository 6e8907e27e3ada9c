//! Character spawning, the per-tick drive system, and [`RigPlugin`].
//!
//! ## Fixed tick (`FixedUpdate`; Rapier steps afterwards in `FixedPostUpdate`)
//!
//! | Set                     | Systems                                                    |
//! |-------------------------|------------------------------------------------------------|
//! | [`RigSet::Prepare`]     | clear forces → head launch → hazard contacts               |
//! | [`RigSet::Connections`] | apply disconnect requests → reconnection scan              |
//! | [`RigSet::Drive`]       | [`rig_step_system`]: locomotion, wall climb, force flush   |
//!
//! Reconnect cooldowns and rig resets run in `Update`.

use crate::climb::WallClimb;
use crate::config::RigConfig;
use crate::connection::{
    apply_disconnect_requests_system, reconnect_scan_system, reset_rig_system, spring_joint,
    tick_reconnect_cooldowns_system, ConnectionChanged, DisconnectRequest, ResetRig,
    SegmentConnections,
};
use crate::constants::*;
use crate::hazard::{hazard_contact_system, CharacterDied};
use crate::input::{ActionLatch, MoveInput};
use crate::launch::{head_launch_system, HeadLauncher};
use crate::physics::{
    character_collision_groups, clear_rig_forces_system, flush_force_buffer, BodyState,
    NoSurfaces, RapierProbe, RigWorld, ShapeProbe,
};
use crate::segment::{BodyPart, CharacterRig, RigPart, Segment, SpringConnector};
use crate::stage::{StageChanged, StageSelector};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Ordered phases of the rig's fixed tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RigSet {
    Prepare,
    Connections,
    Drive,
}

pub struct RigPlugin;

impl Plugin for RigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RigConfig>()
            .init_resource::<MoveInput>()
            .init_resource::<ActionLatch>()
            .add_message::<DisconnectRequest>()
            .add_message::<ConnectionChanged>()
            .add_message::<StageChanged>()
            .add_message::<ResetRig>()
            .add_message::<CharacterDied>()
            .add_message::<CollisionEvent>()
            .configure_sets(
                FixedUpdate,
                (RigSet::Prepare, RigSet::Connections, RigSet::Drive).chain(),
            )
            .add_systems(
                FixedUpdate,
                (
                    clear_rig_forces_system,
                    head_launch_system,
                    hazard_contact_system,
                )
                    .chain()
                    .in_set(RigSet::Prepare),
            )
            .add_systems(
                FixedUpdate,
                (apply_disconnect_requests_system, reconnect_scan_system)
                    .chain()
                    .in_set(RigSet::Connections),
            )
            .add_systems(FixedUpdate, rig_step_system.in_set(RigSet::Drive))
            .add_systems(Update, (tick_reconnect_cooldowns_system, reset_rig_system));
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// World-space spawn position of every body, indexed by [`BodyPart`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigLayout {
    pub positions: [Vec2; BodyPart::COUNT],
}

impl RigLayout {
    /// Every segment sitting on its connector anchor around a torso at `origin`.
    pub fn assembled(origin: Vec2) -> Self {
        let mut positions = [origin; BodyPart::COUNT];
        for segment in Segment::ALL {
            positions[segment.part().index()] = origin + connector_anchor(segment);
        }
        Self { positions }
    }

    pub fn with_part(mut self, part: BodyPart, position: Vec2) -> Self {
        self.positions[part.index()] = position;
        self
    }

    pub fn position(&self, part: BodyPart) -> Vec2 {
        self.positions[part.index()]
    }
}

/// Torso-local anchor of a segment's connector.
pub fn connector_anchor(segment: Segment) -> Vec2 {
    Vec2::from_array(CONNECTOR_ANCHORS[segment.index()])
}

fn segment_connector(segment: Segment, config: &RigConfig) -> SpringConnector {
    SpringConnector {
        torso_anchor: connector_anchor(segment),
        rest_length: config.connection.spring_rest_length,
        stiffness: config.connection.spring_stiffness,
        damping: config.connection.spring_damping,
    }
}

fn part_collider(part: BodyPart) -> Collider {
    match part {
        BodyPart::Torso => Collider::cuboid(TORSO_HALF_EXTENTS[0], TORSO_HALF_EXTENTS[1]),
        BodyPart::Head => Collider::ball(HEAD_RADIUS),
        _ => Collider::cuboid(LIMB_HALF_EXTENTS[0], LIMB_HALF_EXTENTS[1]),
    }
}

/// Spawn the six bodies and the character root; returns the root.
///
/// Segments listed in `connection.spawn_connected` start attached.  The root
/// carries the connection table, the stage selector, and the abilities.
pub fn spawn_character(commands: &mut Commands, layout: &RigLayout, config: &RigConfig) -> Entity {
    let character = commands.spawn(Name::new("Character")).id();
    let mut rig = CharacterRig::default();

    for part in BodyPart::ALL {
        let mut body = commands.spawn((
            Name::new(part.to_string()),
            RigPart { character, part },
            RigidBody::Dynamic,
            part_collider(part),
            ColliderMassProperties::Density(BODY_DENSITY),
            character_collision_groups(),
            ActiveEvents::COLLISION_EVENTS,
            Transform::from_translation(layout.position(part).extend(0.0)),
            Velocity::zero(),
            ExternalForce::default(),
            ExternalImpulse::default(),
            GravityScale(config.full_body.normal_gravity_scale),
            Damping {
                linear_damping: BODY_LINEAR_DAMPING,
                angular_damping: BODY_ANGULAR_DAMPING,
            },
        ));
        if let Some(segment) = part.segment() {
            body.insert(segment_connector(segment, config));
        }
        rig.set(part, body.id());
    }

    let mut connections = SegmentConnections::default();
    if let Some(torso) = rig.torso() {
        for &segment in &config.connection.spawn_connected {
            let Some(entity) = rig.get(segment.part()) else {
                continue;
            };
            if connections.connect(segment) {
                let connector = segment_connector(segment, config);
                commands.entity(entity).insert(spring_joint(torso, &connector));
            }
        }
    }

    let selector = StageSelector::new(&connections);
    info!(
        "Spawned character {character:?} at {:?} as {:?}",
        layout.position(BodyPart::Torso),
        selector.stage()
    );
    commands.entity(character).insert((
        rig,
        connections,
        selector,
        WallClimb::default(),
        HeadLauncher::default(),
    ));
    character
}

// ── Drive ─────────────────────────────────────────────────────────────────────

/// Snapshot every character, run its controller and wall climb, and flush the
/// resulting forces into Rapier.
///
/// Without a Rapier context every probe misses, so characters are simply
/// never grounded.
pub fn rig_step_system(
    rapier_context: ReadRapierContext,
    input: Res<MoveInput>,
    config: Res<RigConfig>,
    time: Res<Time<Fixed>>,
    mut characters: Query<(Entity, &CharacterRig, &mut StageSelector, &mut WallClimb)>,
    states: Query<(&Transform, &Velocity), With<RigPart>>,
    mut bodies: Query<
        (
            &mut ExternalForce,
            &mut ExternalImpulse,
            Option<&mut GravityScale>,
        ),
        With<RigPart>,
    >,
) {
    let rapier = rapier_context.single().ok();
    let rapier_probe = rapier.as_ref().map(|context| RapierProbe { context });
    let probe: &dyn ShapeProbe = match &rapier_probe {
        Some(probe) => probe,
        None => &NoSurfaces,
    };
    let dt = time.timestep().as_secs_f32();

    for (character, rig, mut selector, mut climb) in characters.iter_mut() {
        let mut world = RigWorld::new(probe, dt);
        for (part, entity) in rig.iter() {
            if let Ok((transform, velocity)) = states.get(entity) {
                world.set_body(part, Some(BodyState::from_physics(transform, velocity)));
            }
        }

        if let Err(e) = selector.step(&input, &config, &mut world) {
            debug!("{character:?}: {:?} step skipped: {e}", selector.stage());
        }
        if let Err(e) = climb.step(selector.stage(), &input, &config.climb, &mut world) {
            debug!("{character:?}: wall climb skipped: {e}");
        }

        flush_force_buffer(world.buffer(), rig, &mut bodies);
    }
}
