//! Stage-specific locomotion controllers.
//!
//! Each stage has one controller.  They all share one shape: sense (grounding
//! and wall probes), then plan (timers, jump requests), then apply forces into
//! the tick's [`RigWorld`].  Every controller checks that all the bodies it
//! drives exist before writing anything, so a missing body skips the whole
//! tick instead of applying half a recipe.
//!
//! [`Locomotion`] is the closed set the [`crate::stage::StageSelector`]
//! switches between; only the active variant exists at any time.

mod full_body;
mod head;
mod head_body;
mod one_arm;
mod two_arms;

pub use full_body::FullBodyController;
pub use head::HeadController;
pub use head_body::HeadBodyController;
pub use one_arm::OneArmController;
pub use two_arms::TwoArmsController;

use crate::config::RigConfig;
use crate::connection::SegmentConnections;
use crate::error::RigResult;
use crate::input::MoveInput;
use crate::physics::RigWorld;
use crate::segment::{BodyPart, Segment};
use crate::stage::LocomotionStage;

/// Share of an arm's spin torque forwarded as a horizontal pull on the head
/// and torso in the one-arm gait.
const ARM_FOLLOW_SHARE: f32 = 0.1;

/// One physics tick of a stage's movement recipe.
pub trait LocomotionController {
    fn stage(&self) -> LocomotionStage;

    fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()>;
}

/// The active controller of one character.
#[derive(Debug, Clone, PartialEq)]
pub enum Locomotion {
    Head(HeadController),
    HeadBody(HeadBodyController),
    OneArm(OneArmController),
    TwoArms(TwoArmsController),
    FullBody(FullBodyController),
}

impl Locomotion {
    /// A freshly activated controller for `stage`.
    pub fn for_stage(stage: LocomotionStage, connections: &SegmentConnections) -> Self {
        match stage {
            LocomotionStage::HeadOnly => Locomotion::Head(HeadController),
            LocomotionStage::BodyConnected => Locomotion::HeadBody(HeadBodyController::default()),
            LocomotionStage::OneArmConnected => {
                Locomotion::OneArm(OneArmController::new(connected_arm(connections)))
            }
            LocomotionStage::TwoArmsConnected => {
                Locomotion::TwoArms(TwoArmsController::default())
            }
            LocomotionStage::FullyConnected => Locomotion::FullBody(FullBodyController::default()),
        }
    }

    pub fn stage(&self) -> LocomotionStage {
        self.controller().stage()
    }

    /// The arm the one-arm gait is bound to.
    pub fn bound_arm(&self) -> Option<Segment> {
        match self {
            Locomotion::OneArm(c) => Some(c.arm),
            _ => None,
        }
    }

    /// Whether this controller is already the right one for `stage`.
    pub fn matches(&self, stage: LocomotionStage, connections: &SegmentConnections) -> bool {
        if self.stage() != stage {
            return false;
        }
        stage != LocomotionStage::OneArmConnected
            || self.bound_arm() == Some(connected_arm(connections))
    }

    pub fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        self.controller_mut().step(input, config, world)
    }

    fn controller(&self) -> &dyn LocomotionController {
        match self {
            Locomotion::Head(c) => c,
            Locomotion::HeadBody(c) => c,
            Locomotion::OneArm(c) => c,
            Locomotion::TwoArms(c) => c,
            Locomotion::FullBody(c) => c,
        }
    }

    fn controller_mut(&mut self) -> &mut dyn LocomotionController {
        match self {
            Locomotion::Head(c) => c,
            Locomotion::HeadBody(c) => c,
            Locomotion::OneArm(c) => c,
            Locomotion::TwoArms(c) => c,
            Locomotion::FullBody(c) => c,
        }
    }
}

/// The right arm wins when both are attached.
fn connected_arm(connections: &SegmentConnections) -> Segment {
    if connections.is_connected(Segment::RightArm) {
        Segment::RightArm
    } else {
        Segment::LeftArm
    }
}

/// Fail before any write if one of `parts` has no body this tick.
fn require(world: &RigWorld, parts: &[BodyPart]) -> RigResult<()> {
    for &part in parts {
        world.body(part)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::test_support::at;
    use crate::physics::NoSurfaces;
    use bevy::math::Vec2;

    #[test]
    fn for_stage_builds_matching_controller() {
        let connections = SegmentConnections::default();
        for stage in LocomotionStage::ALL {
            let controller = Locomotion::for_stage(stage, &connections);
            assert_eq!(controller.stage(), stage);
            assert!(controller.matches(stage, &connections));
        }
    }

    #[test]
    fn missing_body_skips_the_whole_tick() {
        let probe = NoSurfaces;
        // Torso present, head missing.
        let mut world = RigWorld::new(&probe, 1.0 / 60.0).with_body(BodyPart::Torso, at(0.0, 0.0));
        let mut controller = Locomotion::HeadBody(HeadBodyController::default());
        let input = MoveInput {
            axis: Vec2::new(1.0, 1.0),
            ..Default::default()
        };
        assert!(controller
            .step(&input, &RigConfig::default(), &mut world)
            .is_err());
        assert!(world.buffer().is_empty());
    }
}
