use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use reassembly::config::{load_rig_config, RigConfig};
use reassembly::hazard::Hazard;
use reassembly::input::keyboard_input_system;
use reassembly::physics::{SurfaceKind, HAZARD_GROUP};
use reassembly::rendering::{
    camera_follow_system, camera_zoom_system, connector_gizmo_system, setup_camera,
};
use reassembly::rig::{spawn_character, RigLayout, RigPlugin};
use reassembly::segment::BodyPart;

/// Where the torso lands; the other parts are strewn around it.
const SPAWN_ORIGIN: Vec2 = Vec2::new(0.0, 1.0);

fn spawn_surface(commands: &mut Commands, name: &str, center: Vec2, half: Vec2, kind: SurfaceKind) {
    commands.spawn((
        Name::new(name.to_string()),
        kind,
        RigidBody::Fixed,
        Collider::cuboid(half.x, half.y),
        kind.collision_groups(),
        Transform::from_translation(center.extend(0.0)),
    ));
}

/// Ground, a climbable wall on the right, and a hazard strip on the left.
fn spawn_demo_level(mut commands: Commands) {
    spawn_surface(
        &mut commands,
        "Ground",
        Vec2::new(0.0, -0.5),
        Vec2::new(20.0, 0.5),
        SurfaceKind::Ground,
    );
    spawn_surface(
        &mut commands,
        "Ledge",
        Vec2::new(-3.0, 2.5),
        Vec2::new(1.5, 0.2),
        SurfaceKind::Ground,
    );
    spawn_surface(
        &mut commands,
        "Climbable wall",
        Vec2::new(7.0, 4.0),
        Vec2::new(0.5, 4.0),
        SurfaceKind::ClimbableWall,
    );

    commands.spawn((
        Name::new("Spikes"),
        Hazard,
        RigidBody::Fixed,
        Collider::cuboid(1.5, 0.1),
        CollisionGroups::new(HAZARD_GROUP, Group::ALL),
        ActiveEvents::COLLISION_EVENTS,
        Transform::from_xyz(-9.0, 0.1, 0.0),
    ));
}

/// Start with every segment lying loose near the torso.
fn spawn_scattered_character(mut commands: Commands, config: Res<RigConfig>) {
    let layout = RigLayout::assembled(SPAWN_ORIGIN)
        .with_part(BodyPart::Head, Vec2::new(-2.5, 0.3))
        .with_part(BodyPart::RightArm, Vec2::new(1.6, 0.3))
        .with_part(BodyPart::LeftArm, Vec2::new(-1.2, 0.3))
        .with_part(BodyPart::RightLeg, Vec2::new(2.8, 0.3))
        .with_part(BodyPart::LeftLeg, Vec2::new(3.6, 0.3));
    spawn_character(&mut commands, &layout, &config);
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Reassembly".into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
    // Insert RigConfig with compiled defaults; load_rig_config will overwrite
    // it from assets/rig.toml (if present) in the Startup schedule.
    .insert_resource(RigConfig::default())
    // World units are metres; forces in constants.rs assume this scale.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0).in_fixed_schedule())
    .add_plugins(RapierDebugRenderPlugin::default())
    .add_plugins(RigPlugin)
    .add_systems(
        Startup,
        (
            // Load config first so every other startup system sees the final values.
            load_rig_config,
            setup_camera.after(load_rig_config),
            spawn_demo_level,
            spawn_scattered_character.after(load_rig_config),
        ),
    )
    .add_systems(
        Update,
        (
            keyboard_input_system,
            camera_zoom_system,
            camera_follow_system.after(camera_zoom_system),
            connector_gizmo_system,
        ),
    );

    println!("Reassembly: A/D move, W/S up/down, Space wall-jump, E launch head, R reset");

    app.run();
}
