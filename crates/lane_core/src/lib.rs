//! # Lane Core
//!
//! Deterministic simulation core for the two-faction lane battle.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (one seeded RNG per match)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Host-authoritative multiplayer (the engine runs on exactly one peer)
//! - Headless AI-vs-AI runs
//! - Reproducible matches from a seed
//!
//! ## Crate Structure
//!
//! - [`catalog`] - static per-faction unit stats
//! - [`ledger`] - regenerating per-faction energy pools
//! - [`units`] - unit entities and the registry that owns them
//! - [`clock`] - fixed-tick clock and cancellable scheduled tasks
//! - [`combat`] - targeting, damage, and healing resolution
//! - [`skills`] - one-shot skill catalog
//! - [`engine`] - the match engine and tick loop
//! - [`ai`] - scripted single-player opponent
//! - [`report`] - end-of-match result records

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod catalog;
pub mod clock;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod factions;
pub mod ledger;
pub mod math;
pub mod report;
pub mod skills;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::AiController;
    pub use crate::catalog::{UnitCatalog, UnitKind, UnitStats};
    pub use crate::config::MatchConfig;
    pub use crate::engine::{MatchEngine, MatchState, SpawnOrigin, TickEvents};
    pub use crate::error::{GameError, Result, SkillError, SpawnError};
    pub use crate::factions::{Faction, FACTIONS};
    pub use crate::ledger::EnergyLedger;
    pub use crate::math::Fixed;
    pub use crate::report::{MatchReport, ResultSink, SubmitOutcome};
    pub use crate::skills::{SkillCatalog, SkillKind};
    pub use crate::units::{Unit, UnitId, UnitRegistry};
}
