//! Runtime rig configuration loaded from `assets/rig.toml`.
//!
//! [`RigConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`], grouped into one TOML table per concern:
//!
//! ```toml
//! [connection]
//! snap_distance = 1.5
//! spawn_connected = ["head"]
//!
//! [full_body]
//! fall_gravity_scale = 2.5
//! ```
//!
//! At startup [`load_rig_config`] reads the file and overwrites the defaults
//! with any values present.  Missing keys and missing tables fall back to the
//! compile-time defaults, so a minimal TOML can override just the values you
//! care about.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `RigConfig::default()`.

use crate::constants::*;
use crate::error::{validate_fraction, validate_non_negative, validate_positive, RigResult};
use crate::physics::BoxProbe;
use crate::segment::Segment;
use crate::stage::LocomotionStage;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable rig configuration.
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub connection: ConnectionConfig,
    pub camera: CameraConfig,
    pub input: InputConfig,
    pub ground_probe: ProbeConfig,
    pub head: HeadConfig,
    pub head_body: HeadBodyConfig,
    pub one_arm: OneArmConfig,
    pub two_arms: TwoArmsConfig,
    pub full_body: FullBodyConfig,
    pub climb: ClimbConfig,
    pub launch: LaunchConfig,
    pub hazard: HazardConfig,
}

// ── Connection ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub snap_distance: f32,
    pub reconnect_delay: f32,
    pub spring_rest_length: f32,
    pub spring_stiffness: f32,
    pub spring_damping: f32,
    /// Segments attached to the torso the moment the character spawns.
    pub spawn_connected: Vec<Segment>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            snap_distance: SNAP_DISTANCE,
            reconnect_delay: RECONNECT_DELAY,
            spring_rest_length: SPRING_REST_LENGTH,
            spring_stiffness: SPRING_STIFFNESS,
            spring_damping: SPRING_DAMPING,
            spawn_connected: Vec::new(),
        }
    }
}

// ── Camera ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Orthographic scale per stage, `HeadOnly` first.
    pub stage_zoom: [f32; 5],
    pub zoom_ease: f32,
}

impl CameraConfig {
    pub fn zoom_for(&self, stage: LocomotionStage) -> f32 {
        self.stage_zoom[stage.index()]
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            stage_zoom: STAGE_CAMERA_ZOOM,
            zoom_ease: CAMERA_ZOOM_EASE,
        }
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub move_deadzone: f32,
    pub jump_threshold: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            move_deadzone: MOVE_DEADZONE,
            jump_threshold: JUMP_INPUT_THRESHOLD,
        }
    }
}

// ── Probes ────────────────────────────────────────────────────────────────────

/// Box probe dimensions as they appear in TOML.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub half_extents: [f32; 2],
    pub distance: f32,
    pub offset: f32,
}

impl ProbeConfig {
    pub fn to_probe(&self) -> BoxProbe {
        BoxProbe {
            half_extents: Vec2::from_array(self.half_extents),
            distance: self.distance,
            offset: self.offset,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            half_extents: GROUND_PROBE_HALF_EXTENTS,
            distance: GROUND_PROBE_DISTANCE,
            offset: GROUND_PROBE_OFFSET,
        }
    }
}

// ── Locomotion stages ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HeadConfig {
    pub move_force: f32,
}

impl Default for HeadConfig {
    fn default() -> Self {
        Self {
            move_force: HEAD_MOVE_FORCE,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HeadBodyConfig {
    pub move_force: f32,
    pub jump_impulse: f32,
    pub torso_influence: f32,
}

impl Default for HeadBodyConfig {
    fn default() -> Self {
        Self {
            move_force: HEAD_BODY_MOVE_FORCE,
            jump_impulse: HEAD_BODY_JUMP_IMPULSE,
            torso_influence: HEAD_BODY_TORSO_INFLUENCE,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OneArmConfig {
    pub spin_torque: f32,
    pub jump_impulse: f32,
    pub head_influence: f32,
    pub torso_influence: f32,
    pub mid_air_force: f32,
    pub wall_check_distance: f32,
    pub wall_jump_reduction: f32,
}

impl Default for OneArmConfig {
    fn default() -> Self {
        Self {
            spin_torque: ARM_SPIN_TORQUE,
            jump_impulse: ARM_JUMP_IMPULSE,
            head_influence: ARM_HEAD_INFLUENCE,
            torso_influence: ARM_TORSO_INFLUENCE,
            mid_air_force: ARM_MID_AIR_FORCE,
            wall_check_distance: ONE_ARM_WALL_CHECK_DISTANCE,
            wall_jump_reduction: ONE_ARM_WALL_JUMP_REDUCTION,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TwoArmsConfig {
    pub spin_torque: f32,
    pub jump_impulse: f32,
    pub head_influence: f32,
    pub torso_influence: f32,
    pub mid_air_force: f32,
    pub partial_jump_factor: f32,
}

impl Default for TwoArmsConfig {
    fn default() -> Self {
        Self {
            spin_torque: ARM_SPIN_TORQUE,
            jump_impulse: ARM_JUMP_IMPULSE,
            head_influence: ARM_HEAD_INFLUENCE,
            torso_influence: ARM_TORSO_INFLUENCE,
            mid_air_force: ARM_MID_AIR_FORCE,
            partial_jump_factor: TWO_ARMS_PARTIAL_JUMP_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FullBodyConfig {
    pub step_interval: f32,
    pub step_force: f32,
    pub leg_swing_torque: f32,
    pub stabilization_force: f32,
    pub balance_torque: f32,
    pub arm_balance_torque: f32,
    pub leg_upright_torque: f32,
    pub body_balance_clamp_deg: f32,
    pub arm_balance_clamp_deg: f32,
    pub leg_upright_deadzone_deg: f32,
    pub stance_press_force: f32,
    pub leg_cohesion_force: f32,
    pub walk_lean_torque: f32,
    pub jump_impulse: f32,
    pub leg_push_impulse: f32,
    pub air_control_force: f32,
    pub jump_cooldown: f32,
    pub jump_input: f32,
    pub normal_gravity_scale: f32,
    pub fall_gravity_scale: f32,
}

impl Default for FullBodyConfig {
    fn default() -> Self {
        Self {
            step_interval: STEP_INTERVAL,
            step_force: STEP_FORCE,
            leg_swing_torque: LEG_SWING_TORQUE,
            stabilization_force: STABILIZATION_FORCE,
            balance_torque: BALANCE_TORQUE,
            arm_balance_torque: ARM_BALANCE_TORQUE,
            leg_upright_torque: LEG_UPRIGHT_TORQUE,
            body_balance_clamp_deg: BODY_BALANCE_CLAMP_DEG,
            arm_balance_clamp_deg: ARM_BALANCE_CLAMP_DEG,
            leg_upright_deadzone_deg: LEG_UPRIGHT_DEADZONE_DEG,
            stance_press_force: STANCE_PRESS_FORCE,
            leg_cohesion_force: LEG_COHESION_FORCE,
            walk_lean_torque: WALK_LEAN_TORQUE,
            jump_impulse: FULL_BODY_JUMP_IMPULSE,
            leg_push_impulse: LEG_PUSH_IMPULSE,
            air_control_force: AIR_CONTROL_FORCE,
            jump_cooldown: FULL_BODY_JUMP_COOLDOWN,
            jump_input: FULL_BODY_JUMP_INPUT,
            normal_gravity_scale: NORMAL_GRAVITY_SCALE,
            fall_gravity_scale: FALL_GRAVITY_SCALE,
        }
    }
}

// ── Abilities ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    pub stick_force: f32,
    pub max_stick_time: f32,
    pub wall_probe: ProbeConfig,
    pub jump_cooldown: f32,
    pub restick_cooldown: f32,
    pub jump_input_threshold: f32,
    pub jump_base: f32,
    pub jump_one_arm: f32,
    pub jump_two_arms: f32,
    pub jump_full_body: f32,
    pub vertical_normal_bias: f32,
    pub vertical_up_bias: f32,
}

impl ClimbConfig {
    /// Wall-jump impulse for the current locomotion stage.
    pub fn jump_force_for(&self, stage: LocomotionStage) -> f32 {
        match stage {
            LocomotionStage::HeadOnly | LocomotionStage::BodyConnected => self.jump_base,
            LocomotionStage::OneArmConnected => self.jump_one_arm,
            LocomotionStage::TwoArmsConnected => self.jump_two_arms,
            LocomotionStage::FullyConnected => self.jump_full_body,
        }
    }
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            stick_force: STICK_FORCE,
            max_stick_time: MAX_STICK_TIME,
            wall_probe: ProbeConfig {
                half_extents: WALL_PROBE_HALF_EXTENTS,
                distance: WALL_PROBE_DISTANCE,
                offset: WALL_PROBE_OFFSET,
            },
            jump_cooldown: WALL_JUMP_COOLDOWN,
            restick_cooldown: RESTICK_COOLDOWN,
            jump_input_threshold: WALL_JUMP_INPUT_THRESHOLD,
            jump_base: WALL_JUMP_BASE,
            jump_one_arm: WALL_JUMP_ONE_ARM,
            jump_two_arms: WALL_JUMP_TWO_ARMS,
            jump_full_body: WALL_JUMP_FULL_BODY,
            vertical_normal_bias: VERTICAL_WALL_JUMP_NORMAL_BIAS,
            vertical_up_bias: VERTICAL_WALL_JUMP_UP_BIAS,
        }
    }
}

/// How the head launch picks its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchAim {
    /// Away from an anchor point fixed to the torso.
    #[default]
    Anchor,
    /// Diagonally upward in the direction the player last moved.
    Facing,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub impulse: f32,
    pub aim: LaunchAim,
    pub anchor_offset: [f32; 2],
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            impulse: LAUNCH_IMPULSE,
            aim: LaunchAim::Anchor,
            anchor_offset: LAUNCH_ANCHOR_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub scatter_impulse: f32,
    pub scatter_spread: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            scatter_impulse: DEATH_SCATTER_IMPULSE,
            scatter_spread: DEATH_SCATTER_SPREAD,
        }
    }
}

// ── Validation & loading ──────────────────────────────────────────────────────

impl RigConfig {
    /// Check the values whose misconfiguration would break an invariant
    /// (cooldowns, thresholds, step cadence) rather than just feel wrong.
    pub fn validate(&self) -> RigResult<()> {
        validate_positive("connection.snap_distance", self.connection.snap_distance)?;
        validate_non_negative("connection.reconnect_delay", self.connection.reconnect_delay)?;
        validate_positive("connection.spring_stiffness", self.connection.spring_stiffness)?;
        validate_non_negative("input.move_deadzone", self.input.move_deadzone)?;
        validate_non_negative("ground_probe.distance", self.ground_probe.distance)?;
        validate_fraction("head_body.torso_influence", self.head_body.torso_influence)?;
        validate_fraction("one_arm.wall_jump_reduction", self.one_arm.wall_jump_reduction)?;
        validate_fraction("two_arms.partial_jump_factor", self.two_arms.partial_jump_factor)?;
        validate_positive("full_body.step_interval", self.full_body.step_interval)?;
        validate_non_negative("full_body.jump_cooldown", self.full_body.jump_cooldown)?;
        validate_positive("full_body.normal_gravity_scale", self.full_body.normal_gravity_scale)?;
        validate_positive("full_body.fall_gravity_scale", self.full_body.fall_gravity_scale)?;
        validate_positive("climb.max_stick_time", self.climb.max_stick_time)?;
        validate_non_negative("climb.jump_cooldown", self.climb.jump_cooldown)?;
        validate_non_negative("climb.restick_cooldown", self.climb.restick_cooldown)?;
        for zoom in self.camera.stage_zoom {
            validate_positive("camera.stage_zoom", zoom)?;
        }
        Ok(())
    }
}

/// Startup system: attempt to load `assets/rig.toml` and overwrite the
/// `RigConfig` resource with any values present in the file.
///
/// A missing file keeps the compiled defaults.  Parse errors and values that
/// fail [`RigConfig::validate`] are logged and the defaults are kept.
pub fn load_rig_config(mut config: ResMut<RigConfig>) {
    let path = "assets/rig.toml";
    let Ok(contents) = std::fs::read_to_string(path) else {
        info!("No {path} found; using compiled defaults");
        return;
    };
    match parse_rig_config(&contents) {
        Ok(loaded) => {
            *config = loaded;
            info!("Loaded rig config from {path}");
        }
        Err(e) => warn!("Rejected {path}: {e}; using defaults"),
    }
}

/// Parse and validate a TOML document into a [`RigConfig`].
pub fn parse_rig_config(contents: &str) -> Result<RigConfig, String> {
    let loaded = toml::from_str::<RigConfig>(contents).map_err(|e| e.to_string())?;
    loaded.validate().map_err(|e| e.to_string())?;
    Ok(loaded)
}
