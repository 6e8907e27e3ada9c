//! Segmented ragdoll platformer library
//!
//! A character is a torso plus five detachable segments (head, two arms, two
//! legs) held on by spring connectors.  Which segments are attached decides
//! the locomotion stage, and each stage drives the bodies with its own
//! physics-force controller.

pub mod climb;
pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod hazard;
pub mod input;
pub mod launch;
pub mod locomotion;
pub mod physics;
pub mod rendering;
pub mod rig;
pub mod segment;
pub mod stage;
