//! Relay-side message classification.
//!
//! The transport relay rebroadcasts messages between the two peers. It
//! must decide what a message *is* from the sender's validated role, not
//! from anything the client asserts in the message body: a `SPAWN_UNIT`
//! from the host is an authoritative event, the same message from the
//! guest is merely an advisory intent, and several message types are
//! host-only and must be rejected from a guest outright.

use serde::{Deserialize, Serialize};

use crate::messages::Payload;

/// The validated role of a message's sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderRole {
    /// The peer that owns the authoritative simulation.
    Host,
    /// The mirroring peer.
    Guest,
}

/// How the relay should treat a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayDecision {
    /// Forward as authoritative state: the receiver applies it.
    Authoritative,
    /// Forward as an advisory request: only the host may act on it.
    Advisory,
    /// Drop: this sender is not allowed to emit this message type.
    Reject,
}

/// Classify a message by its sender's validated role.
#[must_use]
pub fn classify(role: SenderRole, payload: &Payload) -> RelayDecision {
    match (role, payload) {
        // Signaling flows both ways.
        (_, Payload::JoinRoom) => RelayDecision::Advisory,

        // Dual-use types: authoritative from the host, intents from the guest.
        (SenderRole::Host, Payload::SpawnUnit { .. } | Payload::UseSkill { .. }) => {
            RelayDecision::Authoritative
        }
        (SenderRole::Guest, Payload::SpawnUnit { .. } | Payload::UseSkill { .. }) => {
            RelayDecision::Advisory
        }

        // Everything else states facts about the match; only the
        // authoritative peer may utter it.
        (SenderRole::Host, _) => RelayDecision::Authoritative,
        (SenderRole::Guest, _) => RelayDecision::Reject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use lane_core::catalog::UnitKind;
    use lane_core::factions::Faction;

    fn snapshot_payload() -> Payload {
        Payload::SyncState {
            game_state: Snapshot {
                base_hp: [1, 1],
                energy: [500, 500],
                death_count: [0, 0],
                units: Vec::new(),
                over: false,
                winner: None,
            },
        }
    }

    #[test]
    fn test_dual_use_types_split_by_role() {
        let spawn = Payload::SpawnUnit {
            faction: Faction::East,
            kind: UnitKind::Melee,
            unit_id: None,
        };
        assert_eq!(classify(SenderRole::Host, &spawn), RelayDecision::Authoritative);
        assert_eq!(classify(SenderRole::Guest, &spawn), RelayDecision::Advisory);

        let skill = Payload::UseSkill {
            skill_index: 0,
            faction: Faction::East,
        };
        assert_eq!(classify(SenderRole::Host, &skill), RelayDecision::Authoritative);
        assert_eq!(classify(SenderRole::Guest, &skill), RelayDecision::Advisory);
    }

    #[test]
    fn test_guest_cannot_assert_match_facts() {
        assert_eq!(
            classify(SenderRole::Guest, &snapshot_payload()),
            RelayDecision::Reject
        );
        assert_eq!(
            classify(
                SenderRole::Guest,
                &Payload::GameEnd {
                    winner_faction: Faction::East
                }
            ),
            RelayDecision::Reject
        );
        assert_eq!(
            classify(SenderRole::Guest, &Payload::GameStart),
            RelayDecision::Reject
        );
    }

    #[test]
    fn test_host_states_are_authoritative() {
        assert_eq!(
            classify(SenderRole::Host, &snapshot_payload()),
            RelayDecision::Authoritative
        );
        assert_eq!(
            classify(SenderRole::Host, &Payload::GameStart),
            RelayDecision::Authoritative
        );
    }

    #[test]
    fn test_join_is_advisory_for_both() {
        assert_eq!(classify(SenderRole::Host, &Payload::JoinRoom), RelayDecision::Advisory);
        assert_eq!(classify(SenderRole::Guest, &Payload::JoinRoom), RelayDecision::Advisory);
    }
}
