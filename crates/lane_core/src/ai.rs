//! Scripted opponent for single-player matches.
//!
//! The controller never touches engine internals: it acts through the
//! same public `spawn`/`use_skill` API a remote player would use, and it
//! is paced by `AiWake` tasks on the simulation clock rather than wall
//! time, so an AI match is fully reproducible from its seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::catalog::UnitKind;
use crate::engine::{MatchEngine, SpawnOrigin};
use crate::factions::Faction;

/// Milliseconds before the first AI spawn.
const FIRST_SPAWN_DELAY_MS: u32 = 3_000;
/// Bounds of the spawn cadence, in milliseconds.
const SPAWN_DELAY_MS: (u32, u32) = (2_000, 4_000);
/// Bounds of the one-shot skill moment, in milliseconds.
const SKILL_DELAY_MS: (u32, u32) = (20_000, 40_000);
/// Chance the AI picks its heavy when it is unlocked and affordable.
const HEAVY_CHANCE_PERCENT: u32 = 15;

/// Spawn-and-skill cadence for one scripted faction.
#[derive(Debug)]
pub struct AiController {
    faction: Faction,
    rng: SmallRng,
    skill_at_tick: u64,
    skill_spent: bool,
}

impl AiController {
    /// Create a controller for a faction.
    #[must_use]
    pub fn new(faction: Faction, seed: u64) -> Self {
        Self {
            faction,
            rng: SmallRng::seed_from_u64(seed),
            skill_at_tick: 0,
            skill_spent: false,
        }
    }

    /// The faction this controller plays.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Schedule the controller's first wake-up and draw its skill moment.
    /// Call once, right after match start.
    pub fn activate(&mut self, engine: &mut MatchEngine) {
        let config = engine.config();
        let skill_ms = self.rng.gen_range(SKILL_DELAY_MS.0..=SKILL_DELAY_MS.1);
        self.skill_at_tick = engine.current_tick() + config.ticks(skill_ms);
        let first = config.ticks(FIRST_SPAWN_DELAY_MS);
        engine.schedule_ai_wake(self.faction, first);
    }

    /// Act on a wake-up reported in `TickEvents::ai_wakeups`.
    ///
    /// Uses the skill once its drawn moment has passed, makes one spawn
    /// attempt, and schedules the next wake-up.
    pub fn on_wake(&mut self, engine: &mut MatchEngine) {
        if engine.is_over() {
            return;
        }

        if !self.skill_spent && engine.current_tick() >= self.skill_at_tick {
            self.skill_spent = true;
            let _ = engine.use_skill(self.faction);
        }

        self.try_spawn(engine);

        let delay_ms = self.rng.gen_range(SPAWN_DELAY_MS.0..=SPAWN_DELAY_MS.1);
        let delay = engine.config().ticks(delay_ms);
        engine.schedule_ai_wake(self.faction, delay);
    }

    fn try_spawn(&mut self, engine: &mut MatchEngine) {
        let energy = engine.state().energy[self.faction.index()].current;
        let unlocked = engine.state().death_count[self.faction.index()]
            >= engine.config().heavy_unlock_deaths;

        if unlocked
            && energy >= engine.effective_cost(self.faction, UnitKind::Heavy)
            && self.rng.gen_range(0..100) < HEAVY_CHANCE_PERCENT
        {
            let _ = engine.spawn(self.faction, UnitKind::Heavy, SpawnOrigin::Local);
            return;
        }

        let affordable: Vec<UnitKind> = [UnitKind::Melee, UnitKind::Ranged, UnitKind::Healer]
            .into_iter()
            .filter(|&kind| energy >= engine.effective_cost(self.faction, kind))
            .collect();

        if !affordable.is_empty() {
            let kind = affordable[self.rng.gen_range(0..affordable.len())];
            let _ = engine.spawn(self.faction, kind, SpawnOrigin::Local);
        }
    }
}
