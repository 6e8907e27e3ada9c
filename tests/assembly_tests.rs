//! Headless tests for assembling, tearing apart, and driving a character.
//!
//! These tests use [`MinimalPlugins`] plus [`RigPlugin`] (no window, no
//! rendering, no physics backend) and run the `FixedUpdate` schedule by hand
//! so each call is exactly one rig tick.  Without Rapier every surface probe
//! misses, which is fine for everything checked here.
//!
//! Covered scenarios:
//! 1. Segments resting on their anchors all snap on in one tick.
//! 2. Detaching the head demotes to `HeadOnly` and blocks reattachment until
//!    the cooldown has run out.
//! 3. A segment just outside snap distance stays loose until moved closer.
//! 4. A hazard contact tears every segment off and reports the death once.
//! 5. A latched launch detaches the head and fires it.
//! 6. The head-only controller pushes the head along the input.
//! 7. Segments brought in one at a time walk the stage up step by step.
//! 8. Reconnect cooldowns run on the real clock in `Update`.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use reassembly::config::RigConfig;
use reassembly::connection::{DisconnectRequest, SegmentConnections};
use reassembly::constants::{
    HEAD_MOVE_FORCE, RECONNECT_DELAY, SNAP_DISTANCE, STAGE_CAMERA_ZOOM,
};
use reassembly::hazard::{CharacterDied, Hazard};
use reassembly::input::{ActionLatch, MoveInput};
use reassembly::locomotion::Locomotion;
use reassembly::rig::{spawn_character, RigLayout, RigPlugin};
use reassembly::segment::{BodyPart, CharacterRig, Segment};
use reassembly::stage::{LocomotionStage, StageChanged, StageSelector};
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

const ORIGIN: Vec2 = Vec2::new(0.0, 2.0);

fn rig_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, RigPlugin));
    app
}

fn spawn(app: &mut App, layout: RigLayout) -> Entity {
    app.world_mut()
        .run_system_once(move |mut commands: Commands, config: Res<RigConfig>| {
            spawn_character(&mut commands, &layout, &config)
        })
        .expect("spawn system runs")
}

/// Every part far enough from the torso that nothing snaps on.
fn scattered() -> RigLayout {
    let mut layout = RigLayout::assembled(ORIGIN);
    for (i, part) in BodyPart::ALL.into_iter().enumerate() {
        if part != BodyPart::Torso {
            layout = layout.with_part(part, ORIGIN + Vec2::new(3.0 + i as f32, 0.0));
        }
    }
    layout
}

fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn stage(app: &App, character: Entity) -> LocomotionStage {
    app.world()
        .get::<StageSelector>(character)
        .expect("selector")
        .stage()
}

fn connections(app: &App, character: Entity) -> SegmentConnections {
    app.world()
        .get::<SegmentConnections>(character)
        .expect("connections")
        .clone()
}

fn part(app: &App, character: Entity, part: BodyPart) -> Entity {
    app.world()
        .get::<CharacterRig>(character)
        .and_then(|rig| rig.get(part))
        .expect("part entity")
}

fn place(app: &mut App, entity: Entity, position: Vec2) {
    app.world_mut()
        .get_mut::<Transform>(entity)
        .expect("transform")
        .translation = position.extend(0.0);
}

fn has_joint(app: &App, entity: Entity) -> bool {
    app.world().get::<ImpulseJoint>(entity).is_some()
}

fn stage_messages(app: &App) -> Vec<StageChanged> {
    let messages = app.world().resource::<Messages<StageChanged>>();
    messages.get_cursor().read(messages).copied().collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn resting_segments_assemble_in_one_tick() {
    let mut app = rig_app();
    let character = spawn(&mut app, RigLayout::assembled(ORIGIN));
    assert_eq!(stage(&app, character), LocomotionStage::HeadOnly);

    tick(&mut app);

    assert_eq!(stage(&app, character), LocomotionStage::FullyConnected);
    for segment in Segment::ALL {
        assert!(connections(&app, character).is_connected(segment));
        assert!(has_joint(&app, part(&app, character, segment.part())));
    }
    assert!(!has_joint(&app, part(&app, character, BodyPart::Torso)));

    // All five snapped in the same scan: one stage change, with its zoom.
    let changes = stage_messages(&app);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].stage, LocomotionStage::FullyConnected);
    assert_eq!(changes[0].camera_zoom, STAGE_CAMERA_ZOOM[4]);
}

#[test]
fn detached_head_waits_out_its_cooldown() {
    let mut app = rig_app();
    let character = spawn(&mut app, RigLayout::assembled(ORIGIN));
    tick(&mut app);

    app.world_mut().write_message(DisconnectRequest {
        character,
        segment: Segment::Head,
    });
    tick(&mut app);

    let head = part(&app, character, BodyPart::Head);
    assert_eq!(stage(&app, character), LocomotionStage::HeadOnly);
    assert!(!connections(&app, character).is_connected(Segment::Head));
    assert!(!connections(&app, character).reconnect_allowed(Segment::Head));
    assert!(!has_joint(&app, head));
    // The rest of the body stays on.
    assert!(connections(&app, character).is_connected(Segment::LeftLeg));

    // Still within snap distance, but cooling down.
    tick(&mut app);
    assert!(!connections(&app, character).is_connected(Segment::Head));

    app.world_mut()
        .get_mut::<SegmentConnections>(character)
        .expect("connections")
        .tick(5.0);
    tick(&mut app);

    assert!(connections(&app, character).is_connected(Segment::Head));
    assert!(has_joint(&app, head));
    assert_eq!(stage(&app, character), LocomotionStage::FullyConnected);
}

#[test]
fn segment_outside_snap_distance_stays_loose() {
    let mut app = rig_app();
    let layout = scattered().with_part(
        BodyPart::Head,
        ORIGIN + Vec2::new(0.0, SNAP_DISTANCE + 0.05),
    );
    let character = spawn(&mut app, layout);
    tick(&mut app);

    let head = part(&app, character, BodyPart::Head);
    assert!(!connections(&app, character).is_connected(Segment::Head));
    assert!(!has_joint(&app, head));
    assert_eq!(stage(&app, character), LocomotionStage::HeadOnly);

    app.world_mut()
        .get_mut::<Transform>(head)
        .expect("head transform")
        .translation = (ORIGIN + Vec2::new(0.0, SNAP_DISTANCE - 0.05)).extend(0.0);
    tick(&mut app);

    assert!(connections(&app, character).is_connected(Segment::Head));
    assert!(has_joint(&app, head));
    assert_eq!(stage(&app, character), LocomotionStage::BodyConnected);
}

#[test]
fn hazard_contact_tears_everything_off() {
    let mut app = rig_app();
    let character = spawn(&mut app, RigLayout::assembled(ORIGIN));
    tick(&mut app);

    let hazard = app.world_mut().spawn(Hazard).id();
    let leg = part(&app, character, BodyPart::LeftLeg);
    for _ in 0..2 {
        app.world_mut().write_message(CollisionEvent::Started(
            hazard,
            leg,
            CollisionEventFlags::empty(),
        ));
        tick(&mut app);
    }

    let state = connections(&app, character);
    assert!(!state.any_connected());
    for segment in Segment::ALL {
        assert!(!state.reconnect_allowed(segment));
        assert!(!has_joint(&app, part(&app, character, segment.part())));
    }
    assert_eq!(stage(&app, character), LocomotionStage::HeadOnly);

    let head = part(&app, character, BodyPart::Head);
    let impulse = app.world().get::<ExternalImpulse>(head).expect("impulse");
    assert!(impulse.impulse.y > 0.0);

    // The second contact found nothing attached, so only one death.
    let messages = app.world().resource::<Messages<CharacterDied>>();
    let deaths: Vec<_> = messages.get_cursor().read(messages).copied().collect();
    assert_eq!(deaths, vec![CharacterDied { character }]);
}

#[test]
fn latched_launch_fires_the_head() {
    let mut app = rig_app();
    let layout = scattered().with_part(BodyPart::Head, ORIGIN + Vec2::new(0.0, 0.5));
    let character = spawn(&mut app, layout);
    tick(&mut app);
    assert_eq!(stage(&app, character), LocomotionStage::BodyConnected);

    app.world_mut().resource_mut::<ActionLatch>().launch = true;
    tick(&mut app);

    let head = part(&app, character, BodyPart::Head);
    assert!(!app.world().resource::<ActionLatch>().launch);
    assert!(!connections(&app, character).is_connected(Segment::Head));
    assert!(!has_joint(&app, head));
    assert_eq!(stage(&app, character), LocomotionStage::HeadOnly);

    // Head sits straight above the torso, so it goes straight up.
    let impulse = app.world().get::<ExternalImpulse>(head).expect("impulse");
    assert!(impulse.impulse.y > 0.0);
    assert!(impulse.impulse.x.abs() < 1e-4);
}

#[test]
fn head_only_pushes_the_head() {
    let mut app = rig_app();
    let character = spawn(&mut app, scattered());
    app.world_mut().resource_mut::<MoveInput>().axis = Vec2::new(-1.0, 0.0);
    tick(&mut app);

    assert_eq!(stage(&app, character), LocomotionStage::HeadOnly);
    let head = part(&app, character, BodyPart::Head);
    let force = app.world().get::<ExternalForce>(head).expect("force");
    assert_eq!(force.force, Vec2::new(-HEAD_MOVE_FORCE, 0.0));

    // Forces are cleared every tick rather than piling up.
    tick(&mut app);
    let force = app.world().get::<ExternalForce>(head).expect("force");
    assert_eq!(force.force, Vec2::new(-HEAD_MOVE_FORCE, 0.0));
}

#[test]
fn segments_brought_in_one_by_one_walk_the_stage_up() {
    let mut app = rig_app();
    let character = spawn(&mut app, scattered());
    let anchors = RigLayout::assembled(ORIGIN);

    for (segment, expected) in [
        (Segment::Head, LocomotionStage::BodyConnected),
        (Segment::RightArm, LocomotionStage::OneArmConnected),
        (Segment::LeftArm, LocomotionStage::TwoArmsConnected),
        (Segment::RightLeg, LocomotionStage::TwoArmsConnected),
        (Segment::LeftLeg, LocomotionStage::FullyConnected),
    ] {
        let entity = part(&app, character, segment.part());
        place(&mut app, entity, anchors.position(segment.part()));
        tick(&mut app);
        assert_eq!(stage(&app, character), expected, "after the {segment}");
        assert!(has_joint(&app, entity));
    }

    // One leg alone changes nothing, so four changes for five connections.
    let stages: Vec<_> = stage_messages(&app).iter().map(|m| m.stage).collect();
    assert_eq!(
        stages,
        vec![
            LocomotionStage::BodyConnected,
            LocomotionStage::OneArmConnected,
            LocomotionStage::TwoArmsConnected,
            LocomotionStage::FullyConnected,
        ]
    );
    let selector = app.world().get::<StageSelector>(character).expect("selector");
    assert!(matches!(selector.controller(), Locomotion::FullBody(_)));
}

#[test]
fn reconnect_cooldown_runs_on_the_real_clock() {
    let step = 0.25;
    let mut app = rig_app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        step,
    )));
    let character = spawn(&mut app, scattered());
    // The first frame only starts the clock.
    app.update();

    {
        let mut state = app
            .world_mut()
            .get_mut::<SegmentConnections>(character)
            .expect("connections");
        assert!(state.connect(Segment::Head));
        assert!(state.disconnect(Segment::Head, RECONNECT_DELAY));
    }

    let frames = (RECONNECT_DELAY / step).round() as usize;
    for _ in 1..frames {
        app.update();
        assert!(!connections(&app, character).reconnect_allowed(Segment::Head));
    }
    app.update();
    assert!(connections(&app, character).reconnect_allowed(Segment::Head));
    // Too far away to snap back on by itself.
    assert!(!connections(&app, character).is_connected(Segment::Head));
}
