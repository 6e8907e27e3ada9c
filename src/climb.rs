//! Wall-climb ability.
//!
//! Runs every physics tick regardless of locomotion stage.  Each hand sweeps a
//! small box away from the torso; a hit on a climbable wall makes the hands
//! stick for a limited time, during which a held wall-jump modifier plus a
//! directional input kicks the torso off the wall.
//!
//! ```text
//!   Detached ──hand hits wall──▶ Sticking ──jump / timeout / wall lost──▶ Detached
//! ```
//!
//! After a timeout the hands must leave the wall once before they can stick
//! again, otherwise the countdown would just restart on the same contact.

use crate::config::ClimbConfig;
use crate::constants::MIN_DIRECTION_LENGTH;
use crate::error::{RigError, RigResult};
use crate::input::MoveInput;
use crate::physics::{ProbeHit, RigWorld, SurfaceKind};
use crate::segment::BodyPart;
use crate::stage::LocomotionStage;
use bevy::prelude::*;

/// Wall-stick state of one character.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct WallClimb {
    pub sticking: bool,
    pub remaining_stick_time: f32,
    pub one_hand_only: bool,
    /// Outward normal of the wall being held.
    pub wall_normal: Vec2,
    pub jump_cooldown: f32,
    pub restick_cooldown: f32,
    /// Set by a timeout, cleared once no hand touches a wall.
    pub exhausted: bool,
}

/// Which hands found a climbable wall this tick.
#[derive(Debug, Clone, Copy, Default)]
struct HandContact {
    right: Option<ProbeHit>,
    left: Option<ProbeHit>,
}

impl HandContact {
    fn any(&self) -> bool {
        self.right.is_some() || self.left.is_some()
    }

    fn count(&self) -> usize {
        self.right.is_some() as usize + self.left.is_some() as usize
    }

    /// The left hand's normal wins when both hands touch.
    fn normal(&self) -> Option<Vec2> {
        self.left.or(self.right).map(|hit| hit.normal)
    }
}

impl WallClimb {
    /// Run one tick of the ability.
    pub fn step(
        &mut self,
        stage: LocomotionStage,
        input: &MoveInput,
        config: &ClimbConfig,
        world: &mut RigWorld,
    ) -> RigResult<()> {
        let torso = world.body(BodyPart::Torso)?.position;
        world.body(BodyPart::RightArm)?;
        world.body(BodyPart::LeftArm)?;
        let dt = world.fixed_dt();

        let contact = probe_hands(torso, config, world);
        if !contact.any() {
            self.exhausted = false;
        }

        if !self.sticking && !self.exhausted && self.restick_cooldown <= 0.0 && contact.any() {
            self.sticking = true;
            self.track_contact(&contact);
            self.remaining_stick_time = if self.one_hand_only {
                config.max_stick_time / 2.0
            } else {
                config.max_stick_time
            };
            debug!(
                "Sticking to wall (normal {:?}, one hand: {})",
                self.wall_normal, self.one_hand_only
            );
        } else if self.sticking {
            // The stick duration stays as granted; only the grip changes.
            self.track_contact(&contact);
        }

        if self.sticking && self.jump_cooldown <= 0.0 && input.wall_jump_held {
            if let Some(direction) = self.jump_direction(input.axis, config) {
                let mut force = config.jump_force_for(stage);
                if self.one_hand_only {
                    force /= 3.0;
                }
                world.add_impulse(BodyPart::Torso, direction * force);
                self.sticking = false;
                self.jump_cooldown = config.jump_cooldown;
                self.restick_cooldown = config.restick_cooldown;
            }
        }

        if self.sticking {
            self.remaining_stick_time -= dt;
            if self.remaining_stick_time <= 0.0 {
                self.sticking = false;
                self.exhausted = true;
            } else if !contact.any() {
                self.sticking = false;
            } else {
                self.adhere(&contact, config, world);
            }
        }

        if self.jump_cooldown > 0.0 {
            self.jump_cooldown -= dt;
        }
        if self.restick_cooldown > 0.0 {
            self.restick_cooldown -= dt;
        }
        Ok(())
    }

    /// Refresh the grip from this tick's hand probes.  A tick with no
    /// contact keeps the last grip.
    fn track_contact(&mut self, contact: &HandContact) {
        if let Some(normal) = contact.normal() {
            self.one_hand_only = contact.count() == 1;
            self.wall_normal = normal.normalize_or(Vec2::NEG_X);
        }
    }

    /// Push the hands touching the wall this tick into it and drag the torso
    /// along.
    fn adhere(&self, contact: &HandContact, config: &ClimbConfig, world: &mut RigWorld) {
        let pull = -self.wall_normal * config.stick_force;
        for (hand, hit) in [
            (BodyPart::RightArm, contact.right),
            (BodyPart::LeftArm, contact.left),
        ] {
            if hit.is_some() {
                world.add_force(hand, pull);
            }
        }
        let torso_share = if self.one_hand_only { 0.25 } else { 0.5 };
        world.add_force(BodyPart::Torso, pull * torso_share);
    }

    /// Direction of a wall jump for `axis`, or `None` if neither axis passes
    /// the threshold.  Horizontal input wins over vertical.
    fn jump_direction(&self, axis: Vec2, config: &ClimbConfig) -> Option<Vec2> {
        let threshold = config.jump_input_threshold;
        let combined = if axis.x.abs() > threshold {
            self.wall_normal + Vec2::new(axis.x.signum(), 0.0)
        } else if axis.y.abs() > threshold {
            self.wall_normal * config.vertical_normal_bias
                + Vec2::new(0.0, axis.y.signum() + config.vertical_up_bias)
        } else {
            return None;
        };
        Some(match unit_or_err(combined, "wall jump") {
            Ok(direction) => direction,
            Err(e) => {
                debug!("{e}; jumping straight up");
                Vec2::Y
            }
        })
    }
}

fn unit_or_err(v: Vec2, context: &'static str) -> RigResult<Vec2> {
    if v.length() > MIN_DIRECTION_LENGTH {
        Ok(v.normalize())
    } else {
        Err(RigError::DegenerateDirection { context })
    }
}

fn probe_hands(torso: Vec2, config: &ClimbConfig, world: &RigWorld) -> HandContact {
    let probe = config.wall_probe.to_probe();
    let sweep = |hand: BodyPart| {
        let position = world.body(hand).ok()?.position;
        world.cast(hand, position - torso, &probe, SurfaceKind::ClimbableWall)
    };
    HandContact {
        right: sweep(BodyPart::RightArm),
        left: sweep(BodyPart::LeftArm),
    }
}
