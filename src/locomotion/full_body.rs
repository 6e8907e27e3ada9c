//! Full-body gait: alternating steps, continuous balance, leg-gated jumps and
//! a heavier gravity while falling.

use super::{require, LocomotionController};
use crate::config::RigConfig;
use crate::error::RigResult;
use crate::input::MoveInput;
use crate::physics::RigWorld;
use crate::segment::{BodyPart, Segment};
use crate::stage::LocomotionStage;
use bevy::prelude::*;

const LEGS: [Segment; 2] = [Segment::RightLeg, Segment::LeftLeg];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullBodyController {
    /// Grounded state of `[right leg, left leg]` this tick.
    pub grounded: [bool; 2],
    /// The leg currently swinging forward.
    pub stepping: Segment,
    /// Time spent on the current step.
    pub step_elapsed: f32,
    pub jump_cooldown: f32,
    pub jump_requested: bool,
}

impl Default for FullBodyController {
    fn default() -> Self {
        Self {
            grounded: [false; 2],
            stepping: Segment::RightLeg,
            step_elapsed: 0.0,
            jump_cooldown: 0.0,
            jump_requested: false,
        }
    }
}

impl FullBodyController {
    fn any_grounded(&self) -> bool {
        self.grounded[0] || self.grounded[1]
    }

    fn both_grounded(&self) -> bool {
        self.grounded[0] && self.grounded[1]
    }

    fn leg_slot(leg: Segment) -> usize {
        if leg == Segment::RightLeg {
            0
        } else {
            1
        }
    }

    fn other_leg(leg: Segment) -> Segment {
        if leg == Segment::RightLeg {
            Segment::LeftLeg
        } else {
            Segment::RightLeg
        }
    }

    /// Timers and requests; runs before any force is written.
    fn plan(&mut self, input: &MoveInput, config: &RigConfig, dt: f32) {
        let tuning = &config.full_body;
        let moving = input.axis.x.abs() > config.input.move_deadzone;

        if input.axis.y > tuning.jump_input
            && self.both_grounded()
            && self.jump_cooldown <= 0.0
            && !self.jump_requested
        {
            self.jump_requested = true;
        }

        if self.jump_cooldown > 0.0 {
            self.jump_cooldown -= dt;
        }

        if moving && self.any_grounded() {
            self.step_elapsed += dt;
            if self.step_elapsed >= tuning.step_interval {
                self.step_elapsed = 0.0;
                self.stepping = Self::other_leg(self.stepping);
            }
        }
    }

    fn balance(&self, config: &RigConfig, world: &mut RigWorld) -> RigResult<()> {
        let tuning = &config.full_body;
        let tilt = world.body(BodyPart::Torso)?.rotation_deg;

        let body_clamp = tuning.body_balance_clamp_deg;
        world.add_torque(
            BodyPart::Torso,
            -tilt.clamp(-body_clamp, body_clamp) * tuning.balance_torque,
        );
        world.add_force(BodyPart::Torso, Vec2::Y * tuning.stabilization_force);

        let arm_clamp = tuning.arm_balance_clamp_deg;
        let counter = tilt.clamp(-arm_clamp, arm_clamp) * tuning.arm_balance_torque;
        world.add_torque(BodyPart::LeftArm, -counter);
        world.add_torque(BodyPart::RightArm, counter);
        Ok(())
    }

    fn jump(&mut self, config: &RigConfig, world: &mut RigWorld) {
        if !(self.jump_requested && self.both_grounded()) {
            return;
        }
        let tuning = &config.full_body;
        world.add_impulse(BodyPart::Torso, Vec2::Y * tuning.jump_impulse);
        for leg in LEGS {
            world.add_impulse(leg.part(), Vec2::Y * tuning.leg_push_impulse);
        }
        world.add_impulse(BodyPart::Head, Vec2::Y * tuning.jump_impulse * 0.5);
        self.jump_cooldown = tuning.jump_cooldown;
        self.jump_requested = false;
    }

    fn walk(&self, x: f32, config: &RigConfig, world: &mut RigWorld) {
        let tuning = &config.full_body;
        let moving = x.abs() > config.input.move_deadzone;

        if !self.any_grounded() {
            if moving {
                world.add_force(BodyPart::Torso, Vec2::new(x * tuning.air_control_force, 0.0));
            }
            return;
        }
        if !moving {
            return;
        }

        let support = Self::other_leg(self.stepping);
        let swing = if x > 0.0 { -1.0 } else { 1.0 };
        world.add_torque(self.stepping.part(), swing * tuning.leg_swing_torque);
        world.add_force(BodyPart::Torso, Vec2::new(x * tuning.step_force, 0.0));

        if !self.grounded[Self::leg_slot(self.stepping)] && self.grounded[Self::leg_slot(support)] {
            world.add_force(support.part(), Vec2::NEG_Y * tuning.stance_press_force);
        }

        world.add_torque(BodyPart::Torso, -x * tuning.walk_lean_torque);
    }

    fn keep_legs_upright(&self, config: &RigConfig, world: &mut RigWorld) -> RigResult<()> {
        let tuning = &config.full_body;
        let torso = world.body(BodyPart::Torso)?.position;
        let dt = world.fixed_dt();
        for leg in LEGS {
            let part = leg.part();
            let body = world.body(part)?;
            if body.rotation_deg.abs() > tuning.leg_upright_deadzone_deg {
                world.add_torque(
                    part,
                    -body.rotation_deg.signum() * tuning.leg_upright_torque * dt,
                );
            }
            let to_torso = (torso - body.position).normalize_or_zero();
            world.add_force(part, to_torso * tuning.leg_cohesion_force);
        }
        Ok(())
    }

    /// Falling multiplier with no leg down, normal with both down, and
    /// unchanged while exactly one leg is down.
    fn adjust_gravity(&self, config: &RigConfig, world: &mut RigWorld) {
        let tuning = &config.full_body;
        let scale = if !self.any_grounded() {
            tuning.fall_gravity_scale
        } else if self.both_grounded() {
            tuning.normal_gravity_scale
        } else {
            return;
        };
        world.set_gravity_scale(BodyPart::Torso, scale);
        for leg in LEGS {
            world.set_gravity_scale(leg.part(), scale);
        }
    }
}

impl LocomotionController for FullBodyController {
    fn stage(&self) -> LocomotionStage {
        LocomotionStage::FullyConnected
    }

    fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        require(world, &BodyPart::ALL)?;

        let probe = config.ground_probe.to_probe();
        for leg in LEGS {
            self.grounded[Self::leg_slot(leg)] = world.is_grounded(leg.part(), &probe);
        }
        self.plan(input, config, world.fixed_dt());

        self.balance(config, world)?;
        self.jump(config, world);
        self.walk(input.axis.x, config, world);
        self.keep_legs_upright(config, world)?;
        self.adjust_gravity(config, world);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::physics::test_support::{at, ScriptedProbe};
    use crate::physics::{BodyState, SurfaceKind};

    const DT: f32 = 0.25;
    const RIGHT_LEG: Vec2 = Vec2::new(2.0, -2.0);
    const LEFT_LEG: Vec2 = Vec2::new(-2.0, -2.0);

    fn world<'p>(probe: &'p ScriptedProbe, torso: BodyState) -> RigWorld<'p> {
        RigWorld::new(probe, DT)
            .with_body(BodyPart::Torso, torso)
            .with_body(BodyPart::Head, at(0.0, 4.0))
            .with_body(BodyPart::RightArm, at(4.0, 0.0))
            .with_body(BodyPart::LeftArm, at(-4.0, 0.0))
            .with_body(BodyPart::RightLeg, at(RIGHT_LEG.x, RIGHT_LEG.y))
            .with_body(BodyPart::LeftLeg, at(LEFT_LEG.x, LEFT_LEG.y))
    }

    fn standing() -> ScriptedProbe {
        ScriptedProbe::default()
            .hit(RIGHT_LEG, SurfaceKind::Ground, Vec2::Y)
            .hit(LEFT_LEG, SurfaceKind::Ground, Vec2::Y)
    }

    fn input(x: f32, y: f32) -> MoveInput {
        MoveInput {
            axis: Vec2::new(x, y),
            ..Default::default()
        }
    }

    #[test]
    fn balance_torque_is_clamped() {
        let probe = standing();
        let tilted = BodyState {
            rotation_deg: 60.0,
            ..at(0.0, 0.0)
        };
        let mut w = world(&probe, tilted);
        FullBodyController::default()
            .step(&input(0.0, 0.0), &RigConfig::default(), &mut w)
            .unwrap();
        let buffer = w.into_buffer();
        assert_eq!(buffer.torque(BodyPart::Torso), -45.0 * BALANCE_TORQUE);
        assert_eq!(buffer.torque(BodyPart::LeftArm), -30.0 * ARM_BALANCE_TORQUE);
        assert_eq!(buffer.torque(BodyPart::RightArm), 30.0 * ARM_BALANCE_TORQUE);
        assert_eq!(buffer.force(BodyPart::Torso), Vec2::Y * STABILIZATION_FORCE);
    }

    #[test]
    fn stepping_leg_alternates_at_cadence() {
        let probe = standing();
        let mut controller = FullBodyController::default();
        let config = RigConfig::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            let mut w = world(&probe, at(0.0, 0.0));
            controller.step(&input(1.0, 0.0), &config, &mut w).unwrap();
            seen.push(controller.stepping);
        }
        // 0.5 s interval at 0.25 s per tick: swap every second tick.
        assert_eq!(
            seen,
            vec![
                Segment::RightLeg,
                Segment::LeftLeg,
                Segment::LeftLeg,
                Segment::RightLeg
            ]
        );
    }

    #[test]
    fn walking_swings_leg_and_pushes_torso() {
        let probe = standing();
        let mut w = world(&probe, at(0.0, 0.0));
        FullBodyController::default()
            .step(&input(1.0, 0.0), &RigConfig::default(), &mut w)
            .unwrap();
        let buffer = w.into_buffer();
        assert_eq!(buffer.torque(BodyPart::RightLeg), -LEG_SWING_TORQUE);
        assert_eq!(buffer.torque(BodyPart::LeftLeg), 0.0);
        assert_eq!(buffer.force(BodyPart::Torso).x, STEP_FORCE);
        assert_eq!(buffer.torque(BodyPart::Torso), -WALK_LEAN_TORQUE);
    }

    #[test]
    fn support_leg_is_pressed_when_stepping_leg_lifts() {
        let probe = ScriptedProbe::default().hit(LEFT_LEG, SurfaceKind::Ground, Vec2::Y);
        let mut w = world(&probe, at(0.0, 0.0));
        FullBodyController::default()
            .step(&input(1.0, 0.0), &RigConfig::default(), &mut w)
            .unwrap();
        let left = w.buffer().force(BodyPart::LeftLeg);
        let cohesion = (Vec2::ZERO - LEFT_LEG).normalize() * LEG_COHESION_FORCE;
        let expected = Vec2::NEG_Y * STANCE_PRESS_FORCE + cohesion;
        assert!((left - expected).length() < 1e-5, "got {left:?}");
    }

    #[test]
    fn jump_needs_both_legs_and_respects_cooldown() {
        let probe = standing();
        let config = RigConfig::default();
        let mut controller = FullBodyController::default();

        let mut w = world(&probe, at(0.0, 0.0));
        controller.step(&input(0.0, 1.0), &config, &mut w).unwrap();
        let buffer = w.into_buffer();
        assert_eq!(buffer.impulse(BodyPart::Torso), Vec2::Y * FULL_BODY_JUMP_IMPULSE);
        assert_eq!(buffer.impulse(BodyPart::RightLeg), Vec2::Y * LEG_PUSH_IMPULSE);
        assert_eq!(
            buffer.impulse(BodyPart::Head),
            Vec2::Y * FULL_BODY_JUMP_IMPULSE * 0.5
        );
        assert_eq!(controller.jump_cooldown, FULL_BODY_JUMP_COOLDOWN);

        // 0.5 s cooldown at 0.25 s per tick: the next tick is still cooling.
        let mut w = world(&probe, at(0.0, 0.0));
        controller.step(&input(0.0, 1.0), &config, &mut w).unwrap();
        assert_eq!(w.buffer().impulse(BodyPart::Torso), Vec2::ZERO);

        let one_leg = ScriptedProbe::default().hit(LEFT_LEG, SurfaceKind::Ground, Vec2::Y);
        let mut w = world(&one_leg, at(0.0, 0.0));
        FullBodyController::default()
            .step(&input(0.0, 1.0), &config, &mut w)
            .unwrap();
        assert_eq!(w.buffer().impulse(BodyPart::Torso), Vec2::ZERO);
    }

    #[test]
    fn gravity_follows_leg_contact() {
        let config = RigConfig::default();

        let airborne = ScriptedProbe::default();
        let mut w = world(&airborne, at(0.0, 0.0));
        FullBodyController::default()
            .step(&input(0.0, 0.0), &config, &mut w)
            .unwrap();
        assert_eq!(
            w.buffer().gravity_scale(BodyPart::LeftLeg),
            Some(FALL_GRAVITY_SCALE)
        );

        let one_leg = ScriptedProbe::default().hit(RIGHT_LEG, SurfaceKind::Ground, Vec2::Y);
        let mut w = world(&one_leg, at(0.0, 0.0));
        FullBodyController::default()
            .step(&input(0.0, 0.0), &config, &mut w)
            .unwrap();
        assert_eq!(w.buffer().gravity_scale(BodyPart::Torso), None);

        let probe = standing();
        let mut w = world(&probe, at(0.0, 0.0));
        FullBodyController::default()
            .step(&input(0.0, 0.0), &config, &mut w)
            .unwrap();
        assert_eq!(
            w.buffer().gravity_scale(BodyPart::Torso),
            Some(NORMAL_GRAVITY_SCALE)
        );
    }

    #[test]
    fn tilted_leg_gets_timestep_scaled_upright_torque() {
        let probe = standing();
        let mut w = world(&probe, at(0.0, 0.0));
        w.set_body(
            BodyPart::LeftLeg,
            Some(BodyState {
                rotation_deg: 20.0,
                ..at(LEFT_LEG.x, LEFT_LEG.y)
            }),
        );
        FullBodyController::default()
            .step(&input(0.0, 0.0), &RigConfig::default(), &mut w)
            .unwrap();
        let buffer = w.into_buffer();
        assert_eq!(buffer.torque(BodyPart::LeftLeg), -LEG_UPRIGHT_TORQUE * DT);
        assert_eq!(buffer.torque(BodyPart::RightLeg), 0.0);
    }

    #[test]
    fn airborne_input_uses_air_control_only() {
        let probe = ScriptedProbe::default();
        let mut w = world(&probe, at(0.0, 0.0));
        FullBodyController::default()
            .step(&input(-1.0, 0.0), &RigConfig::default(), &mut w)
            .unwrap();
        let buffer = w.into_buffer();
        assert_eq!(buffer.force(BodyPart::Torso).x, -AIR_CONTROL_FORCE);
        assert_eq!(buffer.torque(BodyPart::RightLeg), 0.0);
    }
}
