//! Faction definitions and identifiers.

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// One of the two opposing sides in a match.
///
/// West spawns at the west edge of the lane and advances toward +x;
/// East spawns at the east edge and advances toward -x. A unit's
/// faction is fixed for its entire lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// The western side, advancing left to right.
    West,
    /// The eastern side, advancing right to left.
    East,
}

/// Both factions, in canonical (index) order.
pub const FACTIONS: [Faction; 2] = [Faction::West, Faction::East];

impl Faction {
    /// Get the opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Index into per-faction arrays (`West = 0`, `East = 1`).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::West => 0,
            Self::East => 1,
        }
    }

    /// Movement direction along the lane: +1 for West, -1 for East.
    #[must_use]
    pub fn forward(self) -> Fixed {
        match self {
            Self::West => Fixed::from_num(1),
            Self::East => Fixed::from_num(-1),
        }
    }

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::West => "West",
            Self::East => "East",
        }
    }
}
