//! Test fixtures and helpers.
//!
//! Pre-built engines and stat catalogs for consistent testing.

use fixed::types::I32F32;

use lane_core::catalog::{FactionStats, UnitCatalog, UnitStats};
use lane_core::config::MatchConfig;
use lane_core::engine::MatchEngine;
use lane_core::skills::SkillCatalog;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// An engine with default config and catalogs.
#[must_use]
pub fn default_engine(seed: u64) -> MatchEngine {
    MatchEngine::with_defaults(seed)
}

/// An engine whose bases take `base_hp` breaches to fall, so a one-sided
/// test can run for a while without ending the match.
#[must_use]
pub fn tall_base_engine(seed: u64, base_hp: i32) -> MatchEngine {
    let mut config = MatchConfig::default();
    config.base_hp = base_hp;
    MatchEngine::new(
        config,
        UnitCatalog::default(),
        SkillCatalog::default(),
        seed,
    )
}

/// A symmetric catalog with small numbers for duel scenarios: a cheap
/// melee (cost 25, hp 25, damage 20, range 1) against a glassy ranged
/// unit (cost 45, hp 15, damage 30, range 3).
#[must_use]
pub fn duel_catalog() -> UnitCatalog {
    let side = FactionStats {
        melee: UnitStats {
            cost: 25,
            hp: 25,
            damage: 20,
            range: 1,
        },
        ranged: UnitStats {
            cost: 45,
            hp: 15,
            damage: 30,
            range: 3,
        },
        healer: UnitStats {
            cost: 40,
            hp: 30,
            damage: 0,
            range: 3,
        },
        heavy: UnitStats {
            cost: 300,
            hp: 500,
            damage: 60,
            range: 1,
        },
    };
    UnitCatalog {
        west: side,
        east: side,
    }
}

/// An engine over the duel catalog.
#[must_use]
pub fn duel_engine(seed: u64) -> MatchEngine {
    MatchEngine::new(
        MatchConfig::default(),
        duel_catalog(),
        SkillCatalog::default(),
        seed,
    )
}
