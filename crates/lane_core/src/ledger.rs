//! Per-faction energy pools.
//!
//! Energy is the regenerating resource spent to spawn units. All
//! calculations use integer math for deterministic simulation. Skills
//! temporarily perturb the cap, the regen flag, and the cost multiplier;
//! reverts are scheduled on the simulation clock, not here.

use serde::{Deserialize, Serialize};

/// Energy pool for one faction.
///
/// Invariant: `0 <= current <= max` between operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyLedger {
    /// Current energy.
    pub current: i32,
    /// Current maximum (may be temporarily raised by a skill).
    pub max: i32,
    /// Baseline maximum the cap reverts to.
    pub baseline_max: i32,
    /// When true, regen ticks are skipped.
    pub paused: bool,
    /// Spawn-cost multiplier in percent (100 = full price).
    pub cost_percent: i32,
}

impl EnergyLedger {
    /// Create a full ledger with the given baseline cap.
    #[must_use]
    pub const fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            baseline_max: max,
            paused: false,
            cost_percent: 100,
        }
    }

    /// Apply one regen step, clamped to the current cap. No-op while paused.
    pub fn regen(&mut self, rate: i32) {
        if !self.paused {
            self.current = (self.current + rate).min(self.max);
        }
    }

    /// Debit energy. The caller must have already checked sufficiency;
    /// the balance never goes negative.
    pub fn charge(&mut self, amount: i32) {
        debug_assert!(amount <= self.current, "charge without sufficiency check");
        self.current = (self.current - amount).max(0);
    }

    /// Credit energy, clamped to the current cap. Overflow is lost.
    pub fn credit(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Effective spawn cost after the cost multiplier (integer floor).
    #[must_use]
    pub const fn effective_cost(&self, base_cost: i32) -> i32 {
        base_cost * self.cost_percent / 100
    }

    /// Whether the faction can afford the given effective cost.
    #[must_use]
    pub const fn can_afford(&self, effective_cost: i32) -> bool {
        self.current >= effective_cost
    }

    /// Temporarily raise the cap. Reverted via [`restore_max`](Self::restore_max).
    pub fn raise_max(&mut self, value: i32) {
        self.max = value;
    }

    /// Restore the cap to its baseline, clamping current energy down so the
    /// ledger invariant holds immediately rather than at the next regen.
    pub fn restore_max(&mut self) {
        self.max = self.baseline_max;
        self.current = self.current.min(self.max);
    }

    /// Halve the remaining energy (integer floor).
    pub fn halve(&mut self) {
        self.current /= 2;
    }

    /// Remove half the remaining energy and return the amount taken.
    pub fn drain_half(&mut self) -> i32 {
        let taken = self.current / 2;
        self.current -= taken;
        taken
    }
}
