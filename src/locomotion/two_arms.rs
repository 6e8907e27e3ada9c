use super::{require, LocomotionController};
use crate::config::RigConfig;
use crate::error::RigResult;
use crate::input::MoveInput;
use crate::physics::RigWorld;
use crate::segment::BodyPart;
use crate::stage::LocomotionStage;
use bevy::prelude::*;

const ARMS: [BodyPart; 2] = [BodyPart::RightArm, BodyPart::LeftArm];

/// Head, torso and both arms.  Both arms spin the same way; the jump is as
/// strong as the number of arms pushing off the ground.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TwoArmsController {
    /// Grounded state of `[right arm, left arm]`.
    pub grounded: [bool; 2],
}

impl TwoArmsController {
    pub fn grounded_arms(&self) -> usize {
        self.grounded.iter().filter(|g| **g).count()
    }
}

impl LocomotionController for TwoArmsController {
    fn stage(&self) -> LocomotionStage {
        LocomotionStage::TwoArmsConnected
    }

    fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        require(
            world,
            &[BodyPart::RightArm, BodyPart::LeftArm, BodyPart::Head, BodyPart::Torso],
        )?;
        let tuning = &config.two_arms;
        let deadzone = config.input.move_deadzone;
        let x = input.axis.x;

        let probe = config.ground_probe.to_probe();
        for (i, arm) in ARMS.into_iter().enumerate() {
            self.grounded[i] = world.is_grounded(arm, &probe);
        }
        let grounded = self.grounded_arms();
        let wants_jump =
            grounded > 0 && input.axis.y > config.input.jump_threshold && x.abs() < deadzone;

        if x.abs() > deadzone {
            let spin = if x > 0.0 { -1.0 } else { 1.0 };
            for arm in ARMS {
                world.add_torque(arm, spin * tuning.spin_torque);
            }
        }

        if grounded == 0 && x.abs() > deadzone {
            world.add_force(BodyPart::Torso, Vec2::new(x * tuning.mid_air_force, 0.0));
        }

        if wants_jump {
            let factor = if grounded == 2 {
                1.0
            } else {
                tuning.partial_jump_factor
            };
            let impulse = Vec2::Y * tuning.jump_impulse * factor;
            for arm in ARMS {
                world.add_impulse(arm, impulse);
            }
            world.add_impulse(BodyPart::Head, impulse * tuning.head_influence);
            world.add_impulse(BodyPart::Torso, impulse * tuning.torso_influence);
        }
        Ok(())
    }
}
