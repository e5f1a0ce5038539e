//! Guest-side mirror and session.
//!
//! The guest never simulates. It holds a render-only mirror that is
//! replaced wholesale by each applied snapshot, and it forwards its own
//! spawn/skill requests to the host as intents. A guest-initiated skill
//! is *never* applied locally - it takes effect only once the host's
//! snapshot reflects it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lane_core::catalog::UnitKind;
use lane_core::factions::Faction;
use lane_core::math::Fixed;
use lane_core::units::UnitId;

use crate::messages::{Envelope, Payload, RoomCode};
use crate::snapshot::Snapshot;
use crate::{MatchSetup, SessionPhase};

/// One mirrored unit, as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorUnit {
    /// Unit id.
    pub id: UnitId,
    /// Archetype.
    pub kind: UnitKind,
    /// Owning faction.
    pub faction: Faction,
    /// Last reported lane position.
    #[serde(with = "lane_core::math::fixed_serde")]
    pub x: Fixed,
    /// Last reported hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
}

/// What changed when a snapshot was applied, for render effects.
#[derive(Debug, Clone, Default)]
pub struct ApplyEffects {
    /// Units that appeared (spawn effects).
    pub created: Vec<UnitId>,
    /// Units that vanished (death effects), with their last known state.
    pub removed: Vec<MirrorUnit>,
    /// Set on the snapshot that first reported the match over, carrying
    /// the host-declared winner.
    pub finalized: Option<Faction>,
}

/// The guest's last-applied-snapshot view of the match.
///
/// Never independently derived: every field is an echo of host state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestMirror {
    /// Base hit points, indexed by faction.
    pub base_hp: [i32; 2],
    /// Current energy per faction.
    pub energy: [i32; 2],
    /// Combat death counters per faction.
    pub death_count: [u32; 2],
    /// Mirrored units by id.
    pub units: BTreeMap<UnitId, MirrorUnit>,
    /// Whether the host declared the match over.
    pub over: bool,
    /// Host-declared winner.
    pub winner: Option<Faction>,
}

impl GuestMirror {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one snapshot: upsert listed units, drop unlisted ones, and
    /// overwrite every scalar.
    ///
    /// Applying the same snapshot twice is a no-op the second time.
    /// Once the match has been finalized, further snapshots are ignored
    /// entirely so stale rebroadcasts cannot resurrect the battlefield.
    pub fn apply(&mut self, snapshot: &Snapshot) -> ApplyEffects {
        let mut effects = ApplyEffects::default();
        if self.over {
            return effects;
        }

        for unit in &snapshot.units {
            match self.units.get_mut(&unit.id) {
                Some(existing) => {
                    existing.x = unit.x;
                    existing.hp = unit.hp;
                    existing.max_hp = unit.max_hp;
                }
                None => {
                    self.units.insert(
                        unit.id,
                        MirrorUnit {
                            id: unit.id,
                            kind: unit.kind,
                            faction: unit.faction,
                            x: unit.x,
                            hp: unit.hp,
                            max_hp: unit.max_hp,
                        },
                    );
                    effects.created.push(unit.id);
                }
            }
        }

        let listed: std::collections::BTreeSet<UnitId> =
            snapshot.units.iter().map(|u| u.id).collect();
        let gone: Vec<UnitId> = self
            .units
            .keys()
            .copied()
            .filter(|id| !listed.contains(id))
            .collect();
        for id in gone {
            if let Some(unit) = self.units.remove(&id) {
                effects.removed.push(unit);
            }
        }

        self.base_hp = snapshot.base_hp;
        self.energy = snapshot.energy;
        self.death_count = snapshot.death_count;

        if snapshot.over {
            self.over = true;
            self.winner = snapshot.winner;
            effects.finalized = snapshot.winner;
            tracing::info!(winner = ?snapshot.winner, "match finalized from snapshot");
        }

        effects
    }
}

/// Everything a handled message produced, for the render layer.
#[derive(Debug, Clone, Default)]
pub struct GuestEvents {
    /// Snapshot application effects, when the message was a snapshot.
    pub applied: Option<ApplyEffects>,
    /// The opponent used a skill (display its effect banner).
    pub enemy_skill: Option<usize>,
    /// The host started the match this message.
    pub started: bool,
}

/// Guest-side connection state machine and intent forwarder.
#[derive(Debug)]
pub struct GuestSession {
    room: RoomCode,
    faction: Faction,
    phase: SessionPhase,
    mirror: GuestMirror,
    skill_requested: bool,
    outbox: Vec<Envelope>,
}

impl GuestSession {
    /// Create a session from the shell's initialization payload and queue
    /// the join message.
    #[must_use]
    pub fn new(setup: &MatchSetup) -> Self {
        debug_assert!(!setup.is_host);
        let mut session = Self {
            room: setup.room_code.clone(),
            faction: setup.player_faction,
            phase: SessionPhase::Connecting,
            mirror: GuestMirror::new(),
            skill_requested: false,
            outbox: Vec::new(),
        };
        session.send(Payload::JoinRoom);
        session.phase = SessionPhase::Joined;
        session
    }

    /// Current connection phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The mirrored match state for rendering.
    #[must_use]
    pub fn mirror(&self) -> &GuestMirror {
        &self.mirror
    }

    /// Whether this guest already forwarded its one skill request.
    #[must_use]
    pub fn skill_requested(&self) -> bool {
        self.skill_requested
    }

    /// Handle a message from the channel.
    pub fn handle(&mut self, envelope: &Envelope) -> GuestEvents {
        let mut events = GuestEvents::default();
        match &envelope.payload {
            Payload::GameStart => {
                if self.phase == SessionPhase::Joined {
                    self.phase = SessionPhase::Synced;
                    events.started = true;
                }
            }
            Payload::SyncState { game_state } => {
                if self.phase == SessionPhase::Synced {
                    let applied = self.mirror.apply(game_state);
                    if applied.finalized.is_some() {
                        self.phase = SessionPhase::Ended;
                    }
                    events.applied = Some(applied);
                }
            }
            Payload::UseSkill {
                skill_index,
                faction,
            } => {
                // Host-originated skill event: display only, never applied.
                if *faction != self.faction {
                    events.enemy_skill = Some(*skill_index);
                }
            }
            Payload::GameEnd { winner_faction } => {
                // The final snapshot normally lands first; this is the
                // belt-and-braces path when it was lost.
                if self.phase == SessionPhase::Synced {
                    self.mirror.over = true;
                    self.mirror.winner = Some(*winner_faction);
                    self.phase = SessionPhase::Ended;
                    events.applied = Some(ApplyEffects {
                        finalized: Some(*winner_faction),
                        ..ApplyEffects::default()
                    });
                }
            }
            _ => {}
        }
        events
    }

    /// Forward a spawn intent to the host.
    pub fn request_spawn(&mut self, kind: UnitKind) {
        if self.phase != SessionPhase::Synced {
            return;
        }
        self.send(Payload::SpawnUnit {
            faction: self.faction,
            kind,
            unit_id: None,
        });
    }

    /// Forward the guest's one skill request to the host.
    ///
    /// The effect is not applied locally; it arrives via a later
    /// snapshot. Repeat calls do nothing.
    pub fn request_skill(&mut self, skill_index: usize) {
        if self.phase != SessionPhase::Synced || self.skill_requested {
            return;
        }
        self.skill_requested = true;
        self.send(Payload::UseSkill {
            skill_index,
            faction: self.faction,
        });
    }

    /// Take every queued outgoing envelope.
    pub fn drain_outbox(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outbox)
    }

    fn send(&mut self, payload: Payload) {
        self.outbox.push(Envelope::new(self.room.clone(), payload));
    }
}
