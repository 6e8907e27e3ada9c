//! Centralised physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::RigConfig::default`] is built from these values, and
//! `assets/rig.toml` can override any of them at startup.
//!
//! ## Units
//!
//! Rapier runs with `pixels_per_meter(1.0)`, so one world unit is one metre.
//! Segment colliders are a few tenths of a unit across and weigh roughly
//! 0.3–1.5 kg, which is the scale the force values below are tuned for.
//! Angles that appear in tuning (balance clamps, upright deadzone) are degrees.

// ── Connection ────────────────────────────────────────────────────────────────

/// Maximum separation (u) at which a detached segment snaps back onto the torso.
///
/// Measured centre-to-centre.  Larger values make reassembly forgiving;
/// smaller values force the player to push the torso right up against a part.
pub const SNAP_DISTANCE: f32 = 1.2;

/// Seconds after a disconnect before the segment may reconnect again.
///
/// Counted in real (unscaled) time.  Without it a launched head would snap back
/// on the very next tick because it starts inside `SNAP_DISTANCE`.
pub const RECONNECT_DELAY: f32 = 1.0;

/// Rest length (u) of the spring connector between a segment and the torso.
pub const SPRING_REST_LENGTH: f32 = 0.0;

/// Spring stiffness of the connector.  Tested range: 150–600.
/// Below ~100 the limbs visibly sag away from the torso while walking.
pub const SPRING_STIFFNESS: f32 = 300.0;

/// Spring damping of the connector.
pub const SPRING_DAMPING: f32 = 12.0;

// ── Body geometry ────────────────────────────────────────────────────────────

/// Half-extents (u) of the torso box.
pub const TORSO_HALF_EXTENTS: [f32; 2] = [0.15, 0.25];

/// Radius (u) of the head ball.
pub const HEAD_RADIUS: f32 = 0.2;

/// Half-extents (u) of every arm and leg box.
pub const LIMB_HALF_EXTENTS: [f32; 2] = [0.08, 0.25];

/// Torso-local connector anchors (u), in [`crate::segment::Segment::ALL`] order:
/// head, right arm, left arm, right leg, left leg.
pub const CONNECTOR_ANCHORS: [[f32; 2]; 5] = [
    [0.0, 0.45],
    [0.25, 0.05],
    [-0.25, 0.05],
    [0.09, -0.5],
    [-0.09, -0.5],
];

/// Collider density (kg/u²).  Puts the torso around 1.2 kg and each limb
/// around 0.6 kg.
pub const BODY_DENSITY: f32 = 8.0;

/// Linear damping of every body.  Keeps spring oscillation from ringing.
pub const BODY_LINEAR_DAMPING: f32 = 0.3;

/// Angular damping of every body.
pub const BODY_ANGULAR_DAMPING: f32 = 0.8;

// ── Camera ────────────────────────────────────────────────────────────────────

/// Orthographic scale suggested for each stage, from `HeadOnly` to
/// `FullyConnected`.  Bigger bodies get a wider view.
pub const STAGE_CAMERA_ZOOM: [f32; 5] = [0.012, 0.014, 0.016, 0.018, 0.021];

/// Exponential easing rate (1/s) of the camera scale toward the suggested zoom.
pub const CAMERA_ZOOM_EASE: f32 = 3.0;

// ── Grounding probe ──────────────────────────────────────────────────────────

/// Half-extents (u) of the box swept below a segment to detect ground.
pub const GROUND_PROBE_HALF_EXTENTS: [f32; 2] = [0.365, 0.07];

/// Distance (u) the ground probe is swept downward.
pub const GROUND_PROBE_DISTANCE: f32 = 0.01;

/// Distance (u) below the segment centre at which the ground probe starts.
/// Together with the half-height and sweep distance this must reach just past
/// the bottom of the smallest probing segment.
pub const GROUND_PROBE_OFFSET: f32 = 0.2;

// ── Input ─────────────────────────────────────────────────────────────────────

/// Horizontal input below this magnitude is treated as "no input".
pub const MOVE_DEADZONE: f32 = 0.05;

/// Vertical input above this value counts as a jump request for the
/// two-, three- and four-segment controllers.
pub const JUMP_INPUT_THRESHOLD: f32 = 0.1;

// ── Stage: head only ─────────────────────────────────────────────────────────

/// Horizontal force (N) per unit input applied to the lone head.
pub const HEAD_MOVE_FORCE: f32 = 8.0;

// ── Stage: head + torso ──────────────────────────────────────────────────────

/// Horizontal force (N) per unit input applied to the head.
pub const HEAD_BODY_MOVE_FORCE: f32 = 10.0;

/// Upward impulse (N·s) applied to the head on a jump.
pub const HEAD_BODY_JUMP_IMPULSE: f32 = 4.0;

/// Fraction of the head's force and impulse transmitted to the torso.
pub const HEAD_BODY_TORSO_INFLUENCE: f32 = 0.5;

// ── Stage: head + torso + one arm ────────────────────────────────────────────

/// Torque (N·m) per unit input spinning the connected arm.
pub const ARM_SPIN_TORQUE: f32 = 6.0;

/// Upward impulse (N·s) applied to the arm(s) on a jump.
pub const ARM_JUMP_IMPULSE: f32 = 5.0;

/// Fraction of arm force / impulse forwarded to the head.
pub const ARM_HEAD_INFLUENCE: f32 = 0.3;

/// Fraction of arm force / impulse forwarded to the torso.
pub const ARM_TORSO_INFLUENCE: f32 = 0.5;

/// Horizontal force (N) per unit input applied to the torso while airborne.
pub const ARM_MID_AIR_FORCE: f32 = 3.0;

/// Horizontal reach (u) of the one-arm wall-touch probe.
pub const ONE_ARM_WALL_CHECK_DISTANCE: f32 = 0.3;

/// Multiplier applied to the one-arm jump while the arm touches a wall.
/// Prevents climbing a wall by repeatedly jumping against it.
pub const ONE_ARM_WALL_JUMP_REDUCTION: f32 = 0.5;

/// Multiplier applied to the two-arm jump when only one arm is grounded.
pub const TWO_ARMS_PARTIAL_JUMP_FACTOR: f32 = 2.0 / 3.0;

// ── Stage: full body ─────────────────────────────────────────────────────────

/// Seconds between stepping-leg swaps while walking.
pub const STEP_INTERVAL: f32 = 0.5;

/// Horizontal walking force (N) per unit input applied to the torso.
pub const STEP_FORCE: f32 = 10.0;

/// Swing torque (N·m) applied to the stepping leg.
pub const LEG_SWING_TORQUE: f32 = 5.0;

/// Constant upward force (N) on the torso that takes weight off the legs.
pub const STABILIZATION_FORCE: f32 = 2.0;

/// Torso balance gain (N·m per degree of tilt, tilt clamped to ±45°).
pub const BALANCE_TORQUE: f32 = 3.0;

/// Arm counterbalance gain (N·m per degree of torso tilt, clamped to ±30°).
pub const ARM_BALANCE_TORQUE: f32 = 1.5;

/// Upright torque (N·m·s, scaled by the fixed timestep) for tilted legs.
pub const LEG_UPRIGHT_TORQUE: f32 = 15.0;

/// Torso tilt clamp (degrees) for the balance correction term.
pub const BODY_BALANCE_CLAMP_DEG: f32 = 45.0;

/// Torso tilt clamp (degrees) for the arm counterbalance term.
pub const ARM_BALANCE_CLAMP_DEG: f32 = 30.0;

/// Leg tilt (degrees) tolerated before upright correction kicks in.
pub const LEG_UPRIGHT_DEADZONE_DEG: f32 = 10.0;

/// Downward force (N) pressing the supporting leg into the ground mid-step.
pub const STANCE_PRESS_FORCE: f32 = 3.0;

/// Force (N) pulling each leg toward the torso every step.
pub const LEG_COHESION_FORCE: f32 = 0.5;

/// Torso lean torque (N·m) per unit input while walking.
pub const WALK_LEAN_TORQUE: f32 = 0.5;

/// Upward impulse (N·s) applied to the torso on a full-body jump.
/// The head receives half of it.
pub const FULL_BODY_JUMP_IMPULSE: f32 = 15.0;

/// Upward impulse (N·s) applied to each leg on a full-body jump.
pub const LEG_PUSH_IMPULSE: f32 = 3.0;

/// Horizontal air-control force (N) per unit input on the torso.
pub const AIR_CONTROL_FORCE: f32 = 5.0;

/// Seconds after a full-body jump before the next one is accepted.
pub const FULL_BODY_JUMP_COOLDOWN: f32 = 0.5;

/// Vertical input required to request a full-body jump.
pub const FULL_BODY_JUMP_INPUT: f32 = 0.5;

/// Gravity scale of torso and legs while standing.
pub const NORMAL_GRAVITY_SCALE: f32 = 1.0;

/// Gravity scale of torso and legs while no leg is grounded.
/// Higher values make falls snappier without touching the jump impulse.
pub const FALL_GRAVITY_SCALE: f32 = 3.0;

// ── Wall climb ───────────────────────────────────────────────────────────────

/// Adhesion force (N) pushing each contacting hand into the wall.
pub const STICK_FORCE: f32 = 10.0;

/// Seconds a two-handed stick lasts.  One-handed sticks last half as long.
pub const MAX_STICK_TIME: f32 = 3.0;

/// Half-extents (u) of the box swept outward from each hand.
pub const WALL_PROBE_HALF_EXTENTS: [f32; 2] = [0.08, 0.08];

/// Distance (u) the hand probe is swept away from the torso.
pub const WALL_PROBE_DISTANCE: f32 = 0.1;

/// Distance (u) from the hand centre, along the sweep, at which the probe starts.
pub const WALL_PROBE_OFFSET: f32 = 0.0;

/// Seconds after a wall jump before another wall jump is accepted.
pub const WALL_JUMP_COOLDOWN: f32 = 1.0;

/// Seconds after a wall jump during which the hands cannot re-stick.
pub const RESTICK_COOLDOWN: f32 = 0.3;

/// Input magnitude along an axis required to trigger a wall jump.
pub const WALL_JUMP_INPUT_THRESHOLD: f32 = 0.5;

/// Wall-jump impulse (N·s) while `HeadOnly` or `BodyConnected`.
pub const WALL_JUMP_BASE: f32 = 15.0;

/// Wall-jump impulse (N·s) with one arm connected.
pub const WALL_JUMP_ONE_ARM: f32 = 15.0;

/// Wall-jump impulse (N·s) with both arms connected.
pub const WALL_JUMP_TWO_ARMS: f32 = 18.0;

/// Wall-jump impulse (N·s) with the full body connected.
pub const WALL_JUMP_FULL_BODY: f32 = 20.0;

/// Share of the outward wall normal mixed into a vertical wall jump.
pub const VERTICAL_WALL_JUMP_NORMAL_BIAS: f32 = 0.25;

/// Upward bias added to a vertical wall jump before normalising.
pub const VERTICAL_WALL_JUMP_UP_BIAS: f32 = 0.5;

/// Combined directions shorter than this fall back to straight up.
pub const MIN_DIRECTION_LENGTH: f32 = 0.1;

// ── Head launch ──────────────────────────────────────────────────────────────

/// Impulse (N·s) applied to the head when it is launched.
pub const LAUNCH_IMPULSE: f32 = 6.0;

/// Launch anchor in torso-local space (u).  The head flies away from it.
pub const LAUNCH_ANCHOR_OFFSET: [f32; 2] = [0.0, 0.0];

// ── Hazards ──────────────────────────────────────────────────────────────────

/// Impulse (N·s) scattering each part when the character hits a hazard.
pub const DEATH_SCATTER_IMPULSE: f32 = 4.0;

/// Maximum random angular spread (radians) of the scatter directions.
pub const DEATH_SCATTER_SPREAD: f32 = 0.35;
