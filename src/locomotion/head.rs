use super::LocomotionController;
use crate::config::RigConfig;
use crate::error::RigResult;
use crate::input::MoveInput;
use crate::physics::RigWorld;
use crate::segment::BodyPart;
use crate::stage::LocomotionStage;
use bevy::prelude::*;

/// Head on its own: roll left and right, no jump.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadController;

impl LocomotionController for HeadController {
    fn stage(&self) -> LocomotionStage {
        LocomotionStage::HeadOnly
    }

    fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        world.body(BodyPart::Head)?;
        world.add_force(
            BodyPart::Head,
            Vec2::new(input.axis.x * config.head.move_force, 0.0),
        );
        Ok(())
    }
}
