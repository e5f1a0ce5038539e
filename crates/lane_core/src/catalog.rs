//! Static per-faction unit stat tables.
//!
//! The catalog is pure data: immutable stats keyed by `(Faction, UnitKind)`.
//! It is injected into the engine at construction so that every match gets
//! its own configuration and no global state is shared across matches.

use serde::{Deserialize, Serialize};

use crate::factions::Faction;

/// Catalog key for the four unit archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Short-range frontline fighter.
    Melee,
    /// Long-range attacker.
    Ranged,
    /// Non-combatant that restores ally hp.
    Healer,
    /// High-cost unit whose attacks splash every enemy in range.
    Heavy,
}

/// All unit kinds, in catalog order.
pub const UNIT_KINDS: [UnitKind; 4] = [
    UnitKind::Melee,
    UnitKind::Ranged,
    UnitKind::Healer,
    UnitKind::Heavy,
];

impl UnitKind {
    /// Whether this kind's attacks hit every enemy in range.
    #[must_use]
    pub const fn is_splash(self) -> bool {
        matches!(self, Self::Heavy)
    }
}

/// Immutable stat tuple for one `(Faction, UnitKind)` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Energy cost to spawn (before cost multipliers).
    pub cost: i32,
    /// Maximum (and starting) hit points.
    pub hp: i32,
    /// Damage per attack. Zero for non-combatants.
    pub damage: i32,
    /// Attack range in lane cells (multiplied by the configured cell size).
    pub range: i32,
}

/// Per-faction stat table for all four unit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionStats {
    /// Stats for the melee unit.
    pub melee: UnitStats,
    /// Stats for the ranged unit.
    pub ranged: UnitStats,
    /// Stats for the healer unit.
    pub healer: UnitStats,
    /// Stats for the heavy unit.
    pub heavy: UnitStats,
}

impl FactionStats {
    /// Look up stats by unit kind.
    #[must_use]
    pub const fn get(&self, kind: UnitKind) -> UnitStats {
        match kind {
            UnitKind::Melee => self.melee,
            UnitKind::Ranged => self.ranged,
            UnitKind::Healer => self.healer,
            UnitKind::Heavy => self.heavy,
        }
    }
}

/// The full stat catalog for both factions.
///
/// The two sides are intentionally asymmetric: West fields tougher,
/// harder-hitting units at a higher cost; East fields cheaper ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCatalog {
    /// West faction stat table.
    pub west: FactionStats,
    /// East faction stat table.
    pub east: FactionStats,
}

impl UnitCatalog {
    /// Look up stats for a `(faction, kind)` pair.
    #[must_use]
    pub const fn stats(&self, faction: Faction, kind: UnitKind) -> UnitStats {
        match faction {
            Faction::West => self.west.get(kind),
            Faction::East => self.east.get(kind),
        }
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self {
            west: FactionStats {
                melee: UnitStats {
                    cost: 30,
                    hp: 300,
                    damage: 5,
                    range: 1,
                },
                ranged: UnitStats {
                    cost: 50,
                    hp: 150,
                    damage: 30,
                    range: 4,
                },
                healer: UnitStats {
                    cost: 40,
                    hp: 200,
                    damage: 0,
                    range: 3,
                },
                heavy: UnitStats {
                    cost: 300,
                    hp: 2500,
                    damage: 60,
                    range: 1,
                },
            },
            east: FactionStats {
                melee: UnitStats {
                    cost: 20,
                    hp: 200,
                    damage: 1,
                    range: 1,
                },
                ranged: UnitStats {
                    cost: 40,
                    hp: 100,
                    damage: 25,
                    range: 4,
                },
                healer: UnitStats {
                    cost: 30,
                    hp: 150,
                    damage: 0,
                    range: 3,
                },
                heavy: UnitStats {
                    cost: 250,
                    hp: 2000,
                    damage: 50,
                    range: 1,
                },
            },
        }
    }
}
