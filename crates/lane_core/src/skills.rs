//! One-shot skill catalog.
//!
//! Each player is randomly assigned exactly one skill per match and may
//! invoke it at most once. The catalog is injected into the engine (like
//! the unit catalog) so nothing skill-related is global. Application of
//! the effects lives in the engine, which owns the state they mutate;
//! this module is the data: kinds, display metadata, and timing.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The eight skill behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Destroy every unit on the field, both sides.
    WipeField,
    /// Temporarily raise the caster's maximum energy.
    RaiseEnergyCap,
    /// Credit the caster with a rapid stream of small energy pulses.
    RapidRecharge,
    /// Halve the opponent's current energy.
    HalveEnemyEnergy,
    /// Pause the opponent's energy regen for a few seconds.
    PauseEnemyRegen,
    /// Halve the caster's spawn costs for a while.
    HalveOwnCost,
    /// Steal half of the opponent's current energy.
    StealEnergy,
    /// Freeze the whole battlefield: no movement, combat, healing, spawns.
    FreezeAll,
}

/// Raised cap during [`SkillKind::RaiseEnergyCap`].
pub const CAP_BOOST_VALUE: i32 = 1000;
/// Energy credited per [`SkillKind::RapidRecharge`] pulse.
pub const RECHARGE_PULSE_AMOUNT: i32 = 10;
/// Milliseconds between recharge pulses.
pub const RECHARGE_PULSE_MS: u32 = 100;
/// Discounted cost percent during [`SkillKind::HalveOwnCost`].
pub const DISCOUNT_COST_PERCENT: i32 = 50;

/// Catalog entry: one skill with display metadata and effect duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSpec {
    /// The behavior this entry triggers.
    pub kind: SkillKind,
    /// Display name.
    pub name: String,
    /// One-line description for the skill button.
    pub description: String,
    /// How long the effect lasts before its scheduled revert, in
    /// milliseconds. Zero for instant effects.
    pub duration_ms: u32,
}

/// Ordered skill catalog. Indices are stable and used on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCatalog {
    specs: Vec<SkillSpec>,
}

impl SkillCatalog {
    /// Number of skills in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Look up a skill by catalog index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SkillSpec> {
        self.specs.get(index)
    }

    /// Look up a skill by kind.
    #[must_use]
    pub fn spec(&self, kind: SkillKind) -> Option<&SkillSpec> {
        self.specs.iter().find(|s| s.kind == kind)
    }

    /// Catalog index of a kind.
    #[must_use]
    pub fn index_of(&self, kind: SkillKind) -> Option<usize> {
        self.specs.iter().position(|s| s.kind == kind)
    }

    /// Draw a random skill for one player.
    pub fn assign<R: Rng>(&self, rng: &mut R) -> SkillKind {
        let index = rng.gen_range(0..self.specs.len());
        self.specs[index].kind
    }

    /// Iterate over the catalog in index order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillSpec> {
        self.specs.iter()
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        let spec = |kind, name: &str, description: &str, duration_ms| SkillSpec {
            kind,
            name: name.to_owned(),
            description: description.to_owned(),
            duration_ms,
        };
        Self {
            specs: vec![
                spec(
                    SkillKind::WipeField,
                    "Annihilation",
                    "Destroys every unit on the field",
                    0,
                ),
                spec(
                    SkillKind::RaiseEnergyCap,
                    "Capacitor Bank",
                    "Maximum energy 1000 for 5 seconds",
                    5_000,
                ),
                spec(
                    SkillKind::RapidRecharge,
                    "Overdrive",
                    "Gain 10 energy every 0.1s for 10 seconds",
                    10_000,
                ),
                spec(
                    SkillKind::HalveEnemyEnergy,
                    "Brownout",
                    "Halves the opponent's energy",
                    0,
                ),
                spec(
                    SkillKind::PauseEnemyRegen,
                    "Blackout",
                    "Stops the opponent's regen for 2 seconds",
                    2_000,
                ),
                spec(
                    SkillKind::HalveOwnCost,
                    "War Economy",
                    "Your spawns cost half for 10 seconds",
                    10_000,
                ),
                spec(
                    SkillKind::StealEnergy,
                    "Siphon",
                    "Steals half of the opponent's energy",
                    0,
                ),
                spec(
                    SkillKind::FreezeAll,
                    "Stasis Field",
                    "Freezes all units for 3 seconds",
                    3_000,
                ),
            ],
        }
    }
}
