//! Core match engine and tick loop.
//!
//! One [`MatchEngine`] instance owns the entire state of one match: the
//! unit registry, both energy ledgers, base hit points, skill assignments,
//! and the simulation clock. The engine is the *only* writer of match
//! state; in multiplayer it runs on the host, and guests hold a mirrored
//! copy that is only ever replaced wholesale by snapshots.
//!
//! # Determinism
//!
//! - No floating-point math (fixed-point via [`Fixed`]).
//! - No system randomness: one seeded RNG per match.
//! - Consistent iteration order (sorted unit ids).
//! - Same seed and same inputs always produce the same match.
//!
//! # Tick phases
//!
//! Each tick, after due scheduled tasks fire (FIFO), phases run in fixed
//! order at their configured cadence:
//!
//! 1. **Regen** - energy regeneration for both factions
//! 2. **Movement** - walk or engage, per unit
//! 3. **Combat** - targeting and damage
//! 4. **Healing** - healers restore wounded allies
//! 5. **Boundary** - units past the opposing baseline damage the base
//! 6. **Win check** - base hp threshold

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalog::{UnitCatalog, UnitKind};
use crate::clock::{SimClock, TaskHandle, TaskKind};
use crate::combat::{resolve_combat, resolve_healing, DamageEvent, HealEvent};
use crate::config::MatchConfig;
use crate::error::{GameError, Result, SkillError, SpawnError};
use crate::factions::{Faction, FACTIONS};
use crate::ledger::EnergyLedger;
use crate::math::{lane_distance, Fixed};
use crate::skills::{
    SkillCatalog, SkillKind, CAP_BOOST_VALUE, DISCOUNT_COST_PERCENT, RECHARGE_PULSE_AMOUNT,
    RECHARGE_PULSE_MS,
};
use crate::units::{Unit, UnitId, UnitRegistry};

/// Where a spawn request originated. Only used for logging and for the
/// session layer to decide whether an intent needs forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Requested by the local player or AI.
    Local,
    /// Requested over the network (guest intent executed by the host).
    Network,
}

/// Host-owned mutable match state.
///
/// Guests receive the observable parts of this through snapshots and
/// never derive it independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// Remaining base hit points, indexed by [`Faction::index`].
    pub base_hp: [i32; 2],
    /// Energy ledgers, indexed by faction.
    pub energy: [EnergyLedger; 2],
    /// Own-unit combat deaths per faction (gates the heavy unlock).
    pub death_count: [u32; 2],
    /// The one-shot skill drawn for each player.
    pub assigned_skill: [SkillKind; 2],
    /// Whether each player has spent their skill.
    pub skill_used: [bool; 2],
    /// Battlefield-wide freeze (no movement, combat, healing, spawns).
    pub global_freeze: bool,
    /// Whether the match has ended.
    pub over: bool,
    /// Winning faction once `over` is true.
    pub winner: Option<Faction>,
}

/// A combat death, for effects and accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathRecord {
    /// The destroyed unit's id.
    pub id: UnitId,
    /// Its faction (whose death counter was incremented).
    pub faction: Faction,
    /// Where it died on the lane.
    #[serde(with = "crate::math::fixed_serde")]
    pub x: Fixed,
}

/// A unit crossing the opposing baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachRecord {
    /// The unit that crossed (already removed).
    pub unit: UnitId,
    /// The faction whose base took the point of damage.
    pub base: Faction,
}

/// Everything that happened during one tick, for the render/session layer.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Damage applications from the combat phase.
    pub damage_events: Vec<DamageEvent>,
    /// Heals from the healing phase.
    pub heal_events: Vec<HealEvent>,
    /// Combat deaths (counted toward the heavy unlock).
    pub deaths: Vec<DeathRecord>,
    /// Baseline crossings (1 base damage each, no death count).
    pub breaches: Vec<BreachRecord>,
    /// AI controllers due to act this tick.
    pub ai_wakeups: Vec<Faction>,
    /// Set on the tick the match ends, carrying the winner.
    pub ended: Option<Faction>,
}

/// Result of a successful skill invocation.
#[derive(Debug, Clone)]
pub struct SkillOutcome {
    /// Which behavior fired.
    pub kind: SkillKind,
    /// Units destroyed by [`SkillKind::WipeField`] (empty for other skills).
    pub wiped: Vec<Unit>,
}

/// Serialized form of a match (the RNG is reseeded on load).
#[derive(Serialize, Deserialize)]
struct SavedMatch {
    seed: u64,
    config: MatchConfig,
    catalog: UnitCatalog,
    skills: SkillCatalog,
    state: MatchState,
    units: UnitRegistry,
    clock: SimClock,
}

/// The authoritative simulation for one match.
#[derive(Debug)]
pub struct MatchEngine {
    config: MatchConfig,
    catalog: UnitCatalog,
    skills: SkillCatalog,
    state: MatchState,
    units: UnitRegistry,
    clock: SimClock,
    rng: SmallRng,
    seed: u64,
}

impl MatchEngine {
    /// Create a new match with injected configuration and catalogs.
    ///
    /// The seed drives every random decision in the match: skill
    /// assignment, spawn lateral offsets, and AI choices derived from it.
    #[must_use]
    pub fn new(config: MatchConfig, catalog: UnitCatalog, skills: SkillCatalog, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let assigned_skill = [skills.assign(&mut rng), skills.assign(&mut rng)];
        tracing::info!(
            west_skill = ?assigned_skill[0],
            east_skill = ?assigned_skill[1],
            seed,
            "match created"
        );
        Self {
            state: MatchState {
                base_hp: [config.base_hp, config.base_hp],
                energy: [
                    EnergyLedger::new(config.max_energy),
                    EnergyLedger::new(config.max_energy),
                ],
                death_count: [0, 0],
                assigned_skill,
                skill_used: [false, false],
                global_freeze: false,
                over: false,
                winner: None,
            },
            units: UnitRegistry::new(),
            clock: SimClock::new(),
            rng,
            seed,
            config,
            catalog,
            skills,
        }
    }

    /// Create a match with default config and catalogs.
    #[must_use]
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(
            MatchConfig::default(),
            UnitCatalog::default(),
            SkillCatalog::default(),
            seed,
        )
    }

    /// The match configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The unit stat catalog.
    #[must_use]
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// The skill catalog.
    #[must_use]
    pub fn skills(&self) -> &SkillCatalog {
        &self.skills
    }

    /// Read-only view of the match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Read-only view of the unit registry.
    #[must_use]
    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Current tick.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.clock.now()
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.over
    }

    /// Winner, once the match is over.
    #[must_use]
    pub fn winner(&self) -> Option<Faction> {
        self.state.winner
    }

    /// The skill drawn for a player.
    #[must_use]
    pub fn assigned_skill(&self, faction: Faction) -> SkillKind {
        self.state.assigned_skill[faction.index()]
    }

    /// Effective spawn cost for a faction right now (after multipliers).
    #[must_use]
    pub fn effective_cost(&self, faction: Faction, kind: UnitKind) -> i32 {
        self.state.energy[faction.index()].effective_cost(self.catalog.stats(faction, kind).cost)
    }

    /// Schedule an AI wake-up; the corresponding faction appears in
    /// [`TickEvents::ai_wakeups`] when it fires.
    pub fn schedule_ai_wake(&mut self, faction: Faction, delay_ticks: u64) -> TaskHandle {
        self.clock.schedule_in(delay_ticks, TaskKind::AiWake { faction })
    }

    /// Advance the simulation by one tick.
    ///
    /// Once the match is over this is a no-op: gameplay state is never
    /// mutated again.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        if self.state.over {
            return events;
        }

        let now = self.clock.advance();

        for task in self.clock.take_due() {
            self.run_task(task.kind, &mut events);
        }

        // 1. Regen (freeze stops characters, not electricity).
        if now % self.config.regen_interval_ticks() == 0 {
            for faction in FACTIONS {
                self.state.energy[faction.index()].regen(self.config.regen_rate);
            }
        }

        if !self.state.global_freeze {
            // 2. Movement
            self.run_movement();

            // 3. Combat
            if now % self.config.attack_interval_ticks() == 0 {
                let outcome = resolve_combat(
                    &mut self.units,
                    now,
                    self.config.attack_interval_ticks(),
                    self.config.unit_size,
                );
                events.damage_events = outcome.damage_events;
                for unit in outcome.deaths {
                    self.state.death_count[unit.faction.index()] += 1;
                    events.deaths.push(DeathRecord {
                        id: unit.id,
                        faction: unit.faction,
                        x: unit.x,
                    });
                }
            }

            // 4. Healing
            events.heal_events = resolve_healing(
                &mut self.units,
                now,
                self.config.heal_interval_ticks(),
                self.config.unit_size,
                self.config.heal_amount,
            );
        }

        // 5. Boundary check
        if now % self.config.boundary_interval_ticks() == 0 {
            self.run_boundary(&mut events);
        }

        // 6. Win check
        self.check_win(&mut events);

        events
    }

    /// Try to spawn a unit for a faction.
    ///
    /// Preconditions are checked in a fixed order and a failure makes no
    /// state change:
    /// 1. match running and not frozen ([`SpawnError::MatchOver`])
    /// 2. live-unit cap ([`SpawnError::UnitCapReached`])
    /// 3. heavy unlock ([`SpawnError::LockedUnit`])
    /// 4. energy ([`SpawnError::InsufficientEnergy`])
    ///
    /// # Errors
    ///
    /// Returns the typed rejection; never panics.
    pub fn spawn(
        &mut self,
        faction: Faction,
        kind: UnitKind,
        origin: SpawnOrigin,
    ) -> std::result::Result<UnitId, SpawnError> {
        if self.state.over || self.state.global_freeze {
            return Err(SpawnError::MatchOver);
        }
        if self.units.count_faction(faction) >= self.config.unit_cap {
            return Err(SpawnError::UnitCapReached);
        }
        if kind == UnitKind::Heavy
            && self.state.death_count[faction.index()] < self.config.heavy_unlock_deaths
        {
            return Err(SpawnError::LockedUnit);
        }

        let stats = self.catalog.stats(faction, kind);
        let ledger = &mut self.state.energy[faction.index()];
        let cost = ledger.effective_cost(stats.cost);
        if !ledger.can_afford(cost) {
            return Err(SpawnError::InsufficientEnergy);
        }
        ledger.charge(cost);

        let lateral = Fixed::from_num(self.rng.gen_range(0..=self.config.lateral_spread));
        let id = self.units.allocate_id();
        let unit = Unit::new(id, faction, kind, stats, self.config.spawn_x(faction), lateral);
        self.units.insert(unit);

        tracing::debug!(?faction, ?kind, ?origin, id, cost, "unit spawned");
        Ok(id)
    }

    /// Invoke a player's assigned one-shot skill.
    ///
    /// # Errors
    ///
    /// [`SkillError::AlreadyUsed`] after the first use (the invocation is
    /// a no-op), or [`SkillError::MatchOver`] once the match ended.
    pub fn use_skill(&mut self, faction: Faction) -> std::result::Result<SkillOutcome, SkillError> {
        if self.state.over {
            return Err(SkillError::MatchOver);
        }
        if self.state.skill_used[faction.index()] {
            return Err(SkillError::AlreadyUsed);
        }
        self.state.skill_used[faction.index()] = true;

        let kind = self.state.assigned_skill[faction.index()];
        let wiped = self.apply_skill_effect(faction, kind);
        tracing::info!(?faction, ?kind, "skill invoked");
        Ok(SkillOutcome { kind, wiped })
    }

    /// Apply a skill's immediate mutation and schedule its revert.
    fn apply_skill_effect(&mut self, faction: Faction, kind: SkillKind) -> Vec<Unit> {
        let own = faction.index();
        let opp = faction.opponent().index();
        let duration_ms = self
            .skills
            .spec(kind)
            .map(|spec| spec.duration_ms)
            .unwrap_or(0);
        let duration_ticks = if duration_ms == 0 {
            0
        } else {
            self.config.ticks(duration_ms)
        };

        match kind {
            SkillKind::WipeField => {
                // Removals here bypass the death counters on purpose:
                // a wipe does not feed the heavy unlock.
                return self.units.drain_all();
            }
            SkillKind::RaiseEnergyCap => {
                self.state.energy[own].raise_max(CAP_BOOST_VALUE);
                self.clock
                    .schedule_in(duration_ticks, TaskKind::RestoreMaxEnergy { faction });
            }
            SkillKind::RapidRecharge => {
                let interval_ticks = self.config.ticks(RECHARGE_PULSE_MS);
                let pulses = duration_ms / RECHARGE_PULSE_MS;
                self.clock.schedule_in(
                    interval_ticks,
                    TaskKind::EnergyPulse {
                        faction,
                        amount: RECHARGE_PULSE_AMOUNT,
                        remaining: pulses,
                        interval_ticks,
                    },
                );
            }
            SkillKind::HalveEnemyEnergy => {
                self.state.energy[opp].halve();
            }
            SkillKind::PauseEnemyRegen => {
                self.state.energy[opp].paused = true;
                self.clock.schedule_in(
                    duration_ticks,
                    TaskKind::ResumeRegen {
                        faction: faction.opponent(),
                    },
                );
            }
            SkillKind::HalveOwnCost => {
                self.state.energy[own].cost_percent = DISCOUNT_COST_PERCENT;
                self.clock
                    .schedule_in(duration_ticks, TaskKind::RestoreCostMultiplier { faction });
            }
            SkillKind::StealEnergy => {
                let taken = self.state.energy[opp].drain_half();
                self.state.energy[own].credit(taken);
            }
            SkillKind::FreezeAll => {
                self.state.global_freeze = true;
                for id in self.units.sorted_ids() {
                    if let Some(unit) = self.units.get_mut(id) {
                        unit.moving = false;
                    }
                }
                self.clock.schedule_in(duration_ticks, TaskKind::EndFreeze);
            }
        }
        Vec::new()
    }

    fn run_task(&mut self, kind: TaskKind, events: &mut TickEvents) {
        match kind {
            TaskKind::RestoreMaxEnergy { faction } => {
                self.state.energy[faction.index()].restore_max();
            }
            TaskKind::RestoreCostMultiplier { faction } => {
                self.state.energy[faction.index()].cost_percent = 100;
            }
            TaskKind::ResumeRegen { faction } => {
                self.state.energy[faction.index()].paused = false;
            }
            TaskKind::EndFreeze => {
                self.state.global_freeze = false;
            }
            TaskKind::EnergyPulse {
                faction,
                amount,
                remaining,
                interval_ticks,
            } => {
                self.state.energy[faction.index()].credit(amount);
                if remaining > 1 {
                    self.clock.schedule_in(
                        interval_ticks,
                        TaskKind::EnergyPulse {
                            faction,
                            amount,
                            remaining: remaining - 1,
                            interval_ticks,
                        },
                    );
                }
            }
            TaskKind::AiWake { faction } => {
                events.ai_wakeups.push(faction);
            }
        }
    }

    /// Movement phase: engage when the nearest enemy is in range, walk
    /// toward the opposing base otherwise.
    fn run_movement(&mut self) {
        let step = self.config.step_per_tick();
        let unit_size = self.config.unit_size;

        for id in self.units.sorted_ids() {
            let Some(unit) = self.units.get(id).copied() else {
                continue;
            };
            let nearest = self
                .units
                .iter()
                .filter(|other| other.faction != unit.faction)
                .map(|other| lane_distance(unit.x, other.x))
                .min();

            let reach = crate::combat::engagement_range(unit.range, unit_size);
            let engaged = nearest.is_some_and(|dist| dist <= reach);

            if let Some(unit) = self.units.get_mut(id) {
                if engaged {
                    unit.moving = false;
                } else {
                    unit.moving = true;
                    unit.x += unit.faction.forward() * step;
                }
            }
        }
    }

    /// Boundary phase: a unit past the opposing baseline deals exactly one
    /// point of base damage and is removed, regardless of its own state.
    fn run_boundary(&mut self, events: &mut TickEvents) {
        let west_line = Fixed::from_num(self.config.field_west);
        let east_line = Fixed::from_num(self.config.field_east);

        for id in self.units.sorted_ids() {
            let Some(unit) = self.units.get(id).copied() else {
                continue;
            };
            let breached_base = match unit.faction {
                Faction::West if unit.x >= east_line => Some(Faction::East),
                Faction::East if unit.x <= west_line => Some(Faction::West),
                _ => None,
            };
            if let Some(base) = breached_base {
                self.state.base_hp[base.index()] -= 1;
                self.units.remove(id);
                events.breaches.push(BreachRecord { unit: id, base });
                tracing::debug!(unit = id, ?base, "baseline breached");
            }
        }
    }

    /// Win phase. The East base is evaluated first, so West wins the
    /// (rare) tick in which both bases fall.
    fn check_win(&mut self, events: &mut TickEvents) {
        let winner = if self.state.base_hp[Faction::East.index()] <= 0 {
            Some(Faction::West)
        } else if self.state.base_hp[Faction::West.index()] <= 0 {
            Some(Faction::East)
        } else {
            None
        };

        if let Some(winner) = winner {
            self.state.over = true;
            self.state.winner = Some(winner);
            events.ended = Some(winner);
            // Pending reverts must not fire into a finished match.
            let purged = self.clock.purge();
            tracing::info!(?winner, tick = self.clock.now(), purged, "match over");
        }
    }

    /// Hash of the observable simulation state.
    ///
    /// Two engines that evolved identically produce identical hashes;
    /// used by tests to verify determinism and snapshot idempotence.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.clock.now().hash(&mut hasher);
        self.state.base_hp.hash(&mut hasher);
        self.state.death_count.hash(&mut hasher);
        self.state.skill_used.hash(&mut hasher);
        self.state.global_freeze.hash(&mut hasher);
        self.state.over.hash(&mut hasher);
        for faction in FACTIONS {
            let ledger = &self.state.energy[faction.index()];
            ledger.current.hash(&mut hasher);
            ledger.max.hash(&mut hasher);
            ledger.paused.hash(&mut hasher);
            ledger.cost_percent.hash(&mut hasher);
        }
        for id in self.units.sorted_ids() {
            if let Some(unit) = self.units.get(id) {
                id.hash(&mut hasher);
                unit.x.to_bits().hash(&mut hasher);
                unit.hp.hash(&mut hasher);
                unit.max_hp.hash(&mut hasher);
                unit.moving.hash(&mut hasher);
                unit.last_attack_tick.hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Serialize the whole match for save or inspection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let saved = SavedMatch {
            seed: self.seed,
            config: self.config,
            catalog: self.catalog,
            skills: self.skills.clone(),
            state: self.state.clone(),
            units: self.units.clone(),
            clock: self.clock.clone(),
        };
        bincode::serialize(&saved)
            .map_err(|e| GameError::InvalidState(format!("failed to serialize match: {e}")))
    }

    /// Restore a match from [`to_bytes`](Self::to_bytes) output.
    ///
    /// The RNG is reseeded from the original seed and the restore tick, so
    /// post-restore random draws differ from an uninterrupted run; the
    /// observable state is restored exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let saved: SavedMatch = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("failed to deserialize match: {e}")))?;
        let rng = SmallRng::seed_from_u64(saved.seed ^ saved.clock.now());
        Ok(Self {
            config: saved.config,
            catalog: saved.catalog,
            skills: saved.skills,
            state: saved.state,
            units: saved.units,
            clock: saved.clock,
            rng,
            seed: saved.seed,
        })
    }
}
