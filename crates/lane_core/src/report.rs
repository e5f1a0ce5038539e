//! Match result records handed to the game shell.
//!
//! Persistence is an external collaborator: the engine produces a
//! [`MatchReport`] and the shell pushes it into whatever implements
//! [`ResultSink`].

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::engine::MatchEngine;
use crate::factions::Faction;

/// Result of one finished match, from one player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// The reporting player's faction.
    pub faction: Faction,
    /// Whether that player won.
    pub is_win: bool,
    /// Whether the opponent was the scripted AI.
    pub is_ai_game: bool,
    /// Match length in whole seconds.
    pub duration_seconds: u64,
}

/// Outcome of submitting a report to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// Whether the record was stored.
    pub success: bool,
    /// Human-readable detail.
    pub message: String,
}

/// Where finished-match records go. Implemented by the game shell.
pub trait ResultSink {
    /// Store one match record.
    fn submit_result(&mut self, report: &MatchReport) -> SubmitOutcome;
}

impl MatchEngine {
    /// Build the result record for a player. `None` while the match is
    /// still running.
    #[must_use]
    pub fn report(&self, player: Faction, is_ai_game: bool) -> Option<MatchReport> {
        let winner = self.winner()?;
        Some(MatchReport {
            faction: player,
            is_win: winner == player,
            is_ai_game,
            duration_seconds: self.config().ticks_to_secs(self.current_tick()),
        })
    }
}

/// Compute a duration in seconds from a tick count, for callers that
/// only mirror state (guests) and have no engine.
#[must_use]
pub fn duration_secs(config: &MatchConfig, ticks: u64) -> u64 {
    config.ticks_to_secs(ticks)
}
