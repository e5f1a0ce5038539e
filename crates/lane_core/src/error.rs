//! Error types for the game simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Why a spawn request was rejected.
///
/// Rejections are ordinary outcomes, not faults: the simulation makes
/// no state change and the caller may surface a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The faction cannot afford the effective unit cost.
    #[error("insufficient energy for spawn")]
    InsufficientEnergy,

    /// The faction is already at its live-unit cap.
    #[error("unit cap reached")]
    UnitCapReached,

    /// The heavy unit is still locked (death count below the unlock threshold).
    #[error("unit type is locked")]
    LockedUnit,

    /// The match has ended, or the battlefield is frozen by a skill.
    #[error("match is over or frozen")]
    MatchOver,
}

/// Why a skill invocation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkillError {
    /// The player's one-shot skill has already been used this match.
    #[error("skill already used")]
    AlreadyUsed,

    /// The match has ended.
    #[error("match is over")]
    MatchOver,
}

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Invalid unit reference.
    #[error("unit not found: {0}")]
    UnitNotFound(u64),

    /// Configuration file parsing error.
    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    /// Invalid game state.
    #[error("invalid game state: {0}")]
    InvalidState(String),
}
