//! Body-part identities and the per-part ECS components.
//!
//! The character is six rigid bodies: the torso plus five [`Segment`]s that
//! attach to it.  Every table in the crate that stores one value per segment
//! (connection state, connectors, spawn layout) is a fixed-size array indexed
//! by [`Segment::index`], so adding a part is a compile error everywhere it
//! matters instead of a missed `match` arm.

use bevy::prelude::*;
use serde::Deserialize;
use std::fmt;

/// A part that attaches to the torso through a spring connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Head,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}

impl Segment {
    pub const COUNT: usize = 5;

    pub const ALL: [Segment; Segment::COUNT] = [
        Segment::Head,
        Segment::RightArm,
        Segment::LeftArm,
        Segment::RightLeg,
        Segment::LeftLeg,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn part(self) -> BodyPart {
        match self {
            Segment::Head => BodyPart::Head,
            Segment::RightArm => BodyPart::RightArm,
            Segment::LeftArm => BodyPart::LeftArm,
            Segment::RightLeg => BodyPart::RightLeg,
            Segment::LeftLeg => BodyPart::LeftLeg,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Head => "head",
            Segment::RightArm => "right arm",
            Segment::LeftArm => "left arm",
            Segment::RightLeg => "right leg",
            Segment::LeftLeg => "left leg",
        };
        f.write_str(name)
    }
}

/// Any of the six simulated bodies, torso included.
///
/// Force buffers and body snapshots are indexed by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Torso,
    Head,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}

impl BodyPart {
    pub const COUNT: usize = 6;

    pub const ALL: [BodyPart; BodyPart::COUNT] = [
        BodyPart::Torso,
        BodyPart::Head,
        BodyPart::RightArm,
        BodyPart::LeftArm,
        BodyPart::RightLeg,
        BodyPart::LeftLeg,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The segment this part represents, or `None` for the torso.
    pub const fn segment(self) -> Option<Segment> {
        match self {
            BodyPart::Torso => None,
            BodyPart::Head => Some(Segment::Head),
            BodyPart::RightArm => Some(Segment::RightArm),
            BodyPart::LeftArm => Some(Segment::LeftArm),
            BodyPart::RightLeg => Some(Segment::RightLeg),
            BodyPart::LeftLeg => Some(Segment::LeftLeg),
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment() {
            Some(segment) => fmt::Display::fmt(&segment, f),
            None => f.write_str("torso"),
        }
    }
}

// ── Components ─────────────────────────────────────────────────────────────────

/// Tags a rigid body as one part of a character.
#[derive(Component, Debug, Clone, Copy)]
pub struct RigPart {
    /// The character root entity owning this part.
    pub character: Entity,
    pub part: BodyPart,
}

/// Entity handles of every body of one character, indexed by [`BodyPart`].
///
/// A `None` slot is a missing reference: operations that need it are skipped.
#[derive(Component, Debug, Clone, Default)]
pub struct CharacterRig {
    pub parts: [Option<Entity>; BodyPart::COUNT],
}

impl CharacterRig {
    pub fn get(&self, part: BodyPart) -> Option<Entity> {
        self.parts[part.index()]
    }

    pub fn torso(&self) -> Option<Entity> {
        self.get(BodyPart::Torso)
    }

    pub fn set(&mut self, part: BodyPart, entity: Entity) {
        self.parts[part.index()] = Some(entity);
    }

    /// Iterate over every assigned body with its part identity.
    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, Entity)> + '_ {
        BodyPart::ALL
            .iter()
            .filter_map(|&part| self.get(part).map(|entity| (part, entity)))
    }
}

/// Spring parameters for a segment's connection to the torso.
///
/// The connector itself is an `ImpulseJoint` that exists only while the
/// segment is connected; this component keeps the parameters it is rebuilt
/// from.  A segment without a `SpringConnector` can never connect.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpringConnector {
    /// Attachment point on the torso, in torso-local space.
    pub torso_anchor: Vec2,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}
