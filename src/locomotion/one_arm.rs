use super::{require, LocomotionController, ARM_FOLLOW_SHARE};
use crate::config::RigConfig;
use crate::error::RigResult;
use crate::input::MoveInput;
use crate::physics::{BoxProbe, RigWorld, SurfaceKind};
use crate::segment::{BodyPart, Segment};
use crate::stage::LocomotionStage;
use bevy::prelude::*;

/// Head, torso and a single arm.  The arm is spun like a wheel and drags the
/// rest of the body along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneArmController {
    pub arm: Segment,
    pub grounded: bool,
    pub touching_wall: bool,
}

impl OneArmController {
    pub fn new(arm: Segment) -> Self {
        Self {
            arm,
            grounded: false,
            touching_wall: false,
        }
    }
}

impl LocomotionController for OneArmController {
    fn stage(&self) -> LocomotionStage {
        LocomotionStage::OneArmConnected
    }

    fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        let arm = self.arm.part();
        require(world, &[arm, BodyPart::Head, BodyPart::Torso])?;
        let tuning = &config.one_arm;
        let deadzone = config.input.move_deadzone;
        let x = input.axis.x;

        // Sense.
        self.grounded = world.is_grounded(arm, &config.ground_probe.to_probe());
        let wall_ray = BoxProbe {
            half_extents: Vec2::ZERO,
            distance: tuning.wall_check_distance,
            offset: 0.0,
        };
        self.touching_wall = [Vec2::X, Vec2::NEG_X]
            .into_iter()
            .any(|dir| world.cast(arm, dir, &wall_ray, SurfaceKind::ClimbableWall).is_some());
        let wants_jump =
            self.grounded && input.axis.y > config.input.jump_threshold && x.abs() < deadzone;

        // Roll.
        if x.abs() > deadzone {
            world.add_torque(arm, -x * tuning.spin_torque);
            let follow = Vec2::new(x * tuning.spin_torque * ARM_FOLLOW_SHARE, 0.0);
            world.add_force(BodyPart::Head, follow * tuning.head_influence);
            world.add_force(BodyPart::Torso, follow * tuning.torso_influence);
        }

        if !self.grounded && x.abs() > deadzone {
            world.add_force(BodyPart::Torso, Vec2::new(x * tuning.mid_air_force, 0.0));
        }

        if wants_jump {
            let mut jump = tuning.jump_impulse;
            if self.touching_wall {
                jump *= tuning.wall_jump_reduction;
            }
            let impulse = Vec2::Y * jump;
            world.add_impulse(arm, impulse);
            world.add_impulse(BodyPart::Head, impulse * tuning.head_influence);
            world.add_impulse(BodyPart::Torso, impulse * tuning.torso_influence);
        }
        Ok(())
    }
}
