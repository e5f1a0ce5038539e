//! # Lane Net
//!
//! Host-authoritative synchronization protocol for the lane battle.
//!
//! This crate is transport-agnostic: sessions are pure state machines
//! that consume [`messages::Envelope`]s and queue outgoing ones. The
//! channel underneath is assumed order-preserving per topic but lossy;
//! there are no acknowledgments and no retries - the host's periodic
//! full snapshot is the sole recovery mechanism, bounding any desync to
//! one snapshot interval.
//!
//! ## Crate Structure
//!
//! - [`messages`] - the wire envelope and payloads
//! - [`snapshot`] - full-state capture and its wire form
//! - [`host`] - the authoritative session (owns the engine)
//! - [`guest`] - the mirroring session (render-only state)
//! - [`relay`] - role-validated message classification for the relay

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod guest;
pub mod host;
pub mod messages;
pub mod relay;
pub mod snapshot;

use serde::{Deserialize, Serialize};

use lane_core::factions::Faction;

use crate::messages::RoomCode;

/// Connection lifecycle of one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Channel opened, waiting for the room to fill.
    Connecting,
    /// Both peers present, match not yet started.
    Joined,
    /// Match running; snapshots and intents flow.
    Synced,
    /// Match finished; the session no longer mutates anything.
    Ended,
}

/// Initialization payload handed in once by the game shell at match start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    /// The local player's faction.
    pub player_faction: Faction,
    /// The remote (or AI) faction.
    pub opponent_faction: Faction,
    /// Whether this is a networked match.
    pub is_multiplayer: bool,
    /// Lobby-issued room identifier.
    pub room_code: RoomCode,
    /// Whether the local peer runs the authoritative simulation.
    pub is_host: bool,
}

/// Protocol timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Milliseconds between host snapshots.
    pub snapshot_interval_ms: u32,
    /// Debounce window for identical-faction spawn intents.
    pub intent_debounce_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: 100,
            intent_debounce_ms: 300,
        }
    }
}
