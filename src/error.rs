//! Rig-specific error types.
//!
//! Nothing in the rig is fatal: systems match on these errors, log them, and
//! skip the affected segment or controller for the current tick so the
//! simulation keeps advancing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::error::RigError;
//!
//! let Ok(torso) = world.body(BodyPart::Torso) else {
//!     return; // missing reference: skip this step
//! };
//! ```

use crate::segment::{BodyPart, Segment};
use std::fmt;

/// Top-level error enum for the character rig.
#[derive(Debug, Clone, PartialEq)]
pub enum RigError {
    /// A body the operation needs has no entity, or the entity has no
    /// transform / velocity this tick.
    MissingBody {
        /// Which body was missing.
        part: BodyPart,
    },

    /// A segment has no `SpringConnector`, so it can never be attached.
    MissingConnector {
        /// Segment whose connector is absent.
        segment: Segment,
    },

    /// A computed direction had near-zero length.
    DegenerateDirection {
        /// Human-readable description of where the direction was computed.
        context: &'static str,
    },

    /// A tuning value loaded from configuration is outside its usable range.
    InvalidConfig {
        /// Dotted config key (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

impl fmt::Display for RigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RigError::MissingBody { part } => {
                write!(f, "no rigid body assigned to the {}", part)
            }
            RigError::MissingConnector { segment } => {
                write!(f, "the {} has no spring connector", segment)
            }
            RigError::DegenerateDirection { context } => {
                write!(f, "degenerate direction during '{}'", context)
            }
            RigError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(
                f,
                "config value '{}' = {} is outside expected range {}",
                name, value, expected
            ),
        }
    }
}

impl std::error::Error for RigError {}

/// Convenience alias: a `Result` using `RigError` as the error type.
pub type RigResult<T> = Result<T, RigError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> RigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(RigError::InvalidConfig {
            name,
            value,
            expected: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is zero or positive and finite.
pub fn validate_non_negative(name: &'static str, value: f32) -> RigResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(RigError::InvalidConfig {
            name,
            value,
            expected: "[0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `[0.0, 1.0]`.
pub fn validate_fraction(name: &'static str, value: f32) -> RigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RigError::InvalidConfig {
            name,
            value,
            expected: "[0.0, 1.0]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators_accept_and_reject_boundaries() {
        assert!(validate_positive("x", 0.1).is_ok());
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", f32::NAN).is_err());
        assert!(validate_non_negative("x", 0.0).is_ok());
        assert!(validate_non_negative("x", -0.01).is_err());
        assert!(validate_fraction("x", 1.0).is_ok());
        assert!(validate_fraction("x", 1.5).is_err());
    }

    #[test]
    fn display_names_the_missing_part() {
        let err = RigError::MissingBody {
            part: BodyPart::LeftLeg,
        };
        assert_eq!(err.to_string(), "no rigid body assigned to the left leg");
    }
}
