//! Locomotion stages and the selector that keeps exactly one controller live.
//!
//! The stage is never stored independently of its inputs: it is re-derived
//! from [`SegmentConnections`] after every connect or disconnect, and the
//! selector only swaps controllers when the derived value actually changes.

use crate::config::{CameraConfig, RigConfig};
use crate::connection::SegmentConnections;
use crate::error::RigResult;
use crate::input::MoveInput;
use crate::locomotion::Locomotion;
use crate::physics::RigWorld;
use crate::segment::{BodyPart, Segment};
use bevy::prelude::*;

/// Discrete locomotion capability, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LocomotionStage {
    /// Head detached from the torso; only the head is driven.
    #[default]
    HeadOnly,
    BodyConnected,
    OneArmConnected,
    TwoArmsConnected,
    FullyConnected,
}

impl LocomotionStage {
    pub const ALL: [LocomotionStage; 5] = [
        LocomotionStage::HeadOnly,
        LocomotionStage::BodyConnected,
        LocomotionStage::OneArmConnected,
        LocomotionStage::TwoArmsConnected,
        LocomotionStage::FullyConnected,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Highest stage whose preconditions hold, checked strongest first.
    ///
    /// The head gates every stage above `HeadOnly`, and both legs gate
    /// `FullyConnected` on top of both arms.
    pub fn derive(connections: &SegmentConnections) -> Self {
        let connected = |segment| connections.is_connected(segment);
        if !connected(Segment::Head) {
            return LocomotionStage::HeadOnly;
        }
        let right_arm = connected(Segment::RightArm);
        let left_arm = connected(Segment::LeftArm);
        let legs = connected(Segment::RightLeg) && connected(Segment::LeftLeg);

        if right_arm && left_arm && legs {
            LocomotionStage::FullyConnected
        } else if right_arm && left_arm {
            LocomotionStage::TwoArmsConnected
        } else if right_arm || left_arm {
            LocomotionStage::OneArmConnected
        } else {
            LocomotionStage::BodyConnected
        }
    }
}

/// Emitted whenever a character's stage changes.  Carries the camera zoom
/// suggested for the new stage.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct StageChanged {
    pub character: Entity,
    pub stage: LocomotionStage,
    pub camera_zoom: f32,
}

/// Owns the active locomotion controller of one character.
#[derive(Component, Debug, Clone)]
pub struct StageSelector {
    stage: LocomotionStage,
    controller: Locomotion,
    activations: u32,
    restore_gravity: bool,
}

impl StageSelector {
    /// Select the stage for `connections` and activate its controller.
    pub fn new(connections: &SegmentConnections) -> Self {
        let stage = LocomotionStage::derive(connections);
        Self {
            stage,
            controller: Locomotion::for_stage(stage, connections),
            activations: 1,
            restore_gravity: true,
        }
    }

    pub fn stage(&self) -> LocomotionStage {
        self.stage
    }

    pub fn controller(&self) -> &Locomotion {
        &self.controller
    }

    /// How many times a controller has been (re)activated.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Re-derive the stage and swap controllers if the binding changed.
    ///
    /// Returns the new stage only when it differs from the previous one.
    /// Recomputing into the same stage with the same arm binding leaves the
    /// running controller and its timers untouched.
    pub fn recompute(&mut self, connections: &SegmentConnections) -> Option<LocomotionStage> {
        let stage = LocomotionStage::derive(connections);
        if self.controller.matches(stage, connections) {
            return None;
        }
        let previous = self.stage;
        self.stage = stage;
        self.controller = Locomotion::for_stage(stage, connections);
        self.activations += 1;
        self.restore_gravity = true;
        (stage != previous).then_some(stage)
    }

    /// Run one physics tick of the active controller.
    ///
    /// The first tick after an activation puts torso and legs back on normal
    /// gravity so a demotion never leaves the falling multiplier behind.
    pub fn step(
        &mut self,
        input: &MoveInput,
        config: &RigConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        if self.restore_gravity {
            for part in [BodyPart::Torso, BodyPart::RightLeg, BodyPart::LeftLeg] {
                if world.body(part).is_ok() {
                    world.set_gravity_scale(part, config.full_body.normal_gravity_scale);
                }
            }
            self.restore_gravity = false;
        }
        self.controller.step(input, config, world)
    }
}

/// Recompute a character's stage and publish the change, if any.
pub fn refresh_stage(
    character: Entity,
    selector: &mut StageSelector,
    connections: &SegmentConnections,
    camera: &CameraConfig,
    stage_changed: &mut MessageWriter<StageChanged>,
) {
    if let Some(stage) = selector.recompute(connections) {
        info!("Character {character:?} is now {stage:?}");
        stage_changed.write(StageChanged {
            character,
            stage,
            camera_zoom: camera.zoom_for(stage),
        });
    }
}
