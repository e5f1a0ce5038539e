//! Wire messages.
//!
//! Every message travels in the same envelope: `{type, roomCode,
//! playerId?, data}`, JSON-encoded. `SPAWN_UNIT` and `USE_SKILL` are
//! deliberately dual-use - the host sends them as authoritative events
//! and the guest sends them as intents - so receivers disambiguate by
//! sender role (see [`crate::relay`]), never by message shape.

use serde::{Deserialize, Serialize};

use lane_core::catalog::UnitKind;
use lane_core::factions::Faction;
use lane_core::math::{fixed_serde, Fixed};
use lane_core::units::UnitId;

use crate::snapshot::Snapshot;

/// Opaque room identifier issued by the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Wrap a lobby-issued code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

/// Message body, tagged by the wire `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payload {
    /// A peer entered the room.
    JoinRoom,
    /// Host signal that both peers are present and the match begins.
    GameStart,
    /// Spawn event (host, authoritative: `unit_id` present) or spawn
    /// intent (guest: `unit_id` absent).
    SpawnUnit {
        /// Requesting faction.
        faction: Faction,
        /// Requested unit archetype.
        #[serde(rename = "unitType")]
        kind: UnitKind,
        /// Assigned id; only on host-originated authoritative events.
        #[serde(rename = "unitId", skip_serializing_if = "Option::is_none")]
        unit_id: Option<UnitId>,
    },
    /// Per-unit delta update. Retained for wire compatibility; the
    /// protocol reconciles through full snapshots instead.
    UnitUpdate {
        /// Updated unit.
        #[serde(rename = "unitId")]
        unit_id: UnitId,
        /// New lane position.
        #[serde(with = "fixed_serde")]
        x: Fixed,
        /// New hit points.
        hp: i32,
        /// Whether the unit is still alive.
        #[serde(rename = "isAlive")]
        is_alive: bool,
    },
    /// Skill event (host) or skill intent (guest).
    UseSkill {
        /// Catalog index of the skill.
        #[serde(rename = "skillIndex")]
        skill_index: usize,
        /// Casting faction.
        faction: Faction,
    },
    /// Base damage notification. Retained for wire compatibility.
    BaseDamage {
        /// Faction whose base was hit.
        #[serde(rename = "targetFaction")]
        target_faction: Faction,
        /// Damage dealt.
        damage: i32,
    },
    /// Host's end-of-match announcement.
    GameEnd {
        /// Winning faction.
        #[serde(rename = "winnerFaction")]
        winner_faction: Faction,
    },
    /// Host's periodic full-state broadcast.
    SyncState {
        /// The complete observable match state.
        #[serde(rename = "gameState")]
        game_state: Snapshot,
    },
}

/// The wire envelope around every [`Payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type and body.
    #[serde(flatten)]
    pub payload: Payload,
    /// Room the message belongs to.
    #[serde(rename = "roomCode")]
    pub room_code: RoomCode,
    /// Sending player, when known.
    #[serde(rename = "playerId", skip_serializing_if = "Option::is_none")]
    pub player_id: Option<u64>,
}

impl Envelope {
    /// Wrap a payload for a room.
    #[must_use]
    pub fn new(room_code: RoomCode, payload: Payload) -> Self {
        Self {
            payload,
            room_code,
            player_id: None,
        }
    }

    /// Encode to the JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if encoding fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode from the JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error on malformed input.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
