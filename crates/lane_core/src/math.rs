//! Fixed-point math utilities for deterministic simulation.
//!
//! All game simulation uses fixed-point arithmetic to ensure
//! deterministic behavior across platforms. Floating-point
//! operations can produce different results on different CPUs.
//!
//! The battlefield is a single lane, so positions are scalar
//! coordinates along the x axis rather than 2D vectors.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Absolute distance between two lane positions.
#[must_use]
pub fn lane_distance(a: Fixed, b: Fixed) -> Fixed {
    if a > b {
        a - b
    } else {
        b - a
    }
}
