use super::{require, LocomotionController};
use crate::config::RigConfig;
use crate::error::RigResult;
use crate::input::MoveInput;
use crate::physics::RigWorld;
use crate::segment::BodyPart;
use crate::stage::LocomotionStage;
use bevy::prelude::*;

/// Head plus torso.  The head drives, the torso follows with a fraction of
/// the force, and jumping is gated on the torso touching ground.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadBodyController {
    pub grounded: bool,
}

impl LocomotionController for HeadBodyController {
    fn stage(&self) -> LocomotionStage {
        LocomotionStage::BodyConnected
    }

    fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        require(world, &[BodyPart::Head, BodyPart::Torso])?;
        let tuning = &config.head_body;
        let x = input.axis.x;

        self.grounded = world.is_grounded(BodyPart::Torso, &config.ground_probe.to_probe());

        if x.abs() > config.input.move_deadzone {
            let force = Vec2::new(x * tuning.move_force, 0.0);
            world.add_force(BodyPart::Head, force);
            world.add_force(BodyPart::Torso, force * tuning.torso_influence);
        }

        if self.grounded && input.axis.y > config.input.jump_threshold {
            let impulse = Vec2::Y * tuning.jump_impulse;
            world.add_impulse(BodyPart::Head, impulse);
            world.add_impulse(BodyPart::Torso, impulse * tuning.torso_influence);
        }
        Ok(())
    }
}
