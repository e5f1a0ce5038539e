//! Match configuration.
//!
//! All tunable constants for one match, injected into the engine at
//! construction. Defaults reproduce the shipped balance values. Configs
//! can also be loaded from RON files for experiments and tests.
//!
//! All durations are expressed in milliseconds and converted to tick
//! counts internally; the simulation itself never sees wall-clock time.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::factions::Faction;
use crate::math::Fixed;

/// Tunable constants for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Duration of one simulation tick in milliseconds.
    pub tick_ms: u32,
    /// Energy regeneration cadence in milliseconds.
    pub regen_interval_ms: u32,
    /// Attack cadence in milliseconds (also the per-unit attack cooldown).
    pub attack_interval_ms: u32,
    /// Healing cadence in milliseconds (also the per-healer cooldown).
    pub heal_interval_ms: u32,
    /// Baseline-crossing check cadence in milliseconds.
    pub boundary_interval_ms: u32,

    /// West end of the lane.
    pub field_west: i32,
    /// East end of the lane.
    pub field_east: i32,
    /// Size of one lane cell; unit ranges are expressed in cells.
    pub unit_size: i32,
    /// Seconds a unit takes to walk the full lane unopposed.
    pub crossing_secs: u32,
    /// Distance from the field edge at which new units appear.
    pub spawn_inset: i32,
    /// Maximum cosmetic lateral offset applied to fresh spawns.
    pub lateral_spread: i32,

    /// Baseline maximum energy per faction.
    pub max_energy: i32,
    /// Energy gained per regen interval.
    pub regen_rate: i32,
    /// Starting base hit points per faction.
    pub base_hp: i32,
    /// Maximum live units per faction.
    pub unit_cap: usize,
    /// Own-unit deaths required before the heavy unit unlocks.
    ///
    /// Historical builds shipped with both 0 and 20; 20 is the canonical
    /// value here so the unlock is an actual mechanic.
    pub heavy_unlock_deaths: u32,
    /// Hit points restored per heal.
    pub heal_amount: i32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            regen_interval_ms: 1000,
            attack_interval_ms: 1000,
            heal_interval_ms: 1000,
            boundary_interval_ms: 100,
            field_west: 150,
            field_east: 1250,
            unit_size: 60,
            crossing_secs: 15,
            spawn_inset: 50,
            lateral_spread: 140,
            max_energy: 500,
            regen_rate: 10,
            base_hp: 1,
            unit_cap: 15,
            heavy_unlock_deaths: 20,
            heal_amount: 10,
        }
    }
}

impl MatchConfig {
    /// Parse a config from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigParse`] if the text is not valid RON or
    /// fails validation.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(text).map_err(|e| GameError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigParse`] describing the first violated
    /// constraint.
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(GameError::ConfigParse("tick_ms must be positive".into()));
        }
        if self.field_east <= self.field_west {
            return Err(GameError::ConfigParse(
                "field_east must be greater than field_west".into(),
            ));
        }
        if self.crossing_secs == 0 {
            return Err(GameError::ConfigParse(
                "crossing_secs must be positive".into(),
            ));
        }
        if self.base_hp <= 0 {
            return Err(GameError::ConfigParse("base_hp must be positive".into()));
        }
        Ok(())
    }

    /// Convert a millisecond duration to a tick count (at least one tick).
    #[must_use]
    pub fn ticks(&self, ms: u32) -> u64 {
        u64::from((ms / self.tick_ms).max(1))
    }

    /// Regen cadence in ticks.
    #[must_use]
    pub fn regen_interval_ticks(&self) -> u64 {
        self.ticks(self.regen_interval_ms)
    }

    /// Attack cadence in ticks.
    #[must_use]
    pub fn attack_interval_ticks(&self) -> u64 {
        self.ticks(self.attack_interval_ms)
    }

    /// Healing cadence in ticks.
    #[must_use]
    pub fn heal_interval_ticks(&self) -> u64 {
        self.ticks(self.heal_interval_ms)
    }

    /// Baseline-check cadence in ticks.
    #[must_use]
    pub fn boundary_interval_ticks(&self) -> u64 {
        self.ticks(self.boundary_interval_ms)
    }

    /// Width of the lane.
    #[must_use]
    pub fn field_width(&self) -> i32 {
        self.field_east - self.field_west
    }

    /// Unit walking speed in lane units per second.
    #[must_use]
    pub fn unit_speed(&self) -> Fixed {
        Fixed::from_num(self.field_width()) / Fixed::from_num(self.crossing_secs)
    }

    /// Distance a walking unit covers in one tick.
    #[must_use]
    pub fn step_per_tick(&self) -> Fixed {
        self.unit_speed() * Fixed::from_num(self.tick_ms) / Fixed::from_num(1000)
    }

    /// Spawn x coordinate for a faction's fresh units.
    #[must_use]
    pub fn spawn_x(&self, faction: Faction) -> Fixed {
        match faction {
            Faction::West => Fixed::from_num(self.field_west + self.spawn_inset),
            Faction::East => Fixed::from_num(self.field_east - self.spawn_inset),
        }
    }

    /// Convert a tick count back to whole seconds (for match reports).
    #[must_use]
    pub fn ticks_to_secs(&self, ticks: u64) -> u64 {
        ticks * u64::from(self.tick_ms) / 1000
    }
}
