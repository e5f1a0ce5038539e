//! Host-side session: the authoritative peer.
//!
//! The host owns the [`MatchEngine`] and is the only writer of match
//! state. Guest intents arrive over the channel, get validated and
//! debounced, and are executed through the same engine API local input
//! uses. State flows back exclusively through periodic snapshots.

use lane_core::catalog::UnitKind;
use lane_core::engine::{MatchEngine, SpawnOrigin, TickEvents};
use lane_core::factions::Faction;

use crate::messages::{Envelope, Payload, RoomCode};
use crate::snapshot::Snapshot;
use crate::{MatchSetup, SessionConfig, SessionPhase};

/// Host-side connection state machine and snapshot broadcaster.
#[derive(Debug)]
pub struct HostSession {
    engine: MatchEngine,
    room: RoomCode,
    own_faction: Faction,
    phase: SessionPhase,
    snapshot_interval_ticks: u64,
    debounce_ticks: u64,
    last_snapshot_tick: Option<u64>,
    last_spawn_intent: [Option<u64>; 2],
    end_announced: bool,
    outbox: Vec<Envelope>,
}

impl HostSession {
    /// Wrap an engine in a host session.
    ///
    /// The session starts in `Connecting` and will not tick the engine
    /// until the guest has joined and `GAME_START` went out: a multiplayer
    /// match never begins without a confirmed synchronized channel.
    #[must_use]
    pub fn new(engine: MatchEngine, setup: &MatchSetup, session_config: &SessionConfig) -> Self {
        debug_assert!(setup.is_host);
        let config = engine.config();
        let snapshot_interval_ticks = config.ticks(session_config.snapshot_interval_ms);
        let debounce_ticks = config.ticks(session_config.intent_debounce_ms);
        Self {
            engine,
            room: setup.room_code.clone(),
            own_faction: setup.player_faction,
            phase: SessionPhase::Connecting,
            snapshot_interval_ticks,
            debounce_ticks,
            last_snapshot_tick: None,
            last_spawn_intent: [None, None],
            end_announced: false,
            outbox: Vec::new(),
        }
    }

    /// Current connection phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The authoritative engine (host-side rendering reads through this).
    #[must_use]
    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Handle a message from the channel.
    pub fn handle(&mut self, envelope: &Envelope) {
        match &envelope.payload {
            Payload::JoinRoom => {
                if self.phase == SessionPhase::Connecting {
                    self.phase = SessionPhase::Joined;
                    self.send(Payload::GameStart);
                    self.phase = SessionPhase::Synced;
                    tracing::info!(room = ?self.room, "guest joined, match starting");
                }
            }
            Payload::SpawnUnit {
                faction,
                kind,
                unit_id,
            } => {
                // Authoritative spawn events carry an id; only bare
                // intents are executed, and only for the guest's side.
                if unit_id.is_none() {
                    self.handle_spawn_intent(*faction, *kind);
                }
            }
            Payload::UseSkill {
                skill_index,
                faction,
            } => {
                self.handle_skill_intent(*skill_index, *faction);
            }
            _ => {}
        }
    }

    fn handle_spawn_intent(&mut self, faction: Faction, kind: UnitKind) {
        if faction == self.own_faction {
            // Echo of our own authoritative event; the engine already ran it.
            return;
        }
        let now = self.engine.current_tick();
        if let Some(last) = self.last_spawn_intent[faction.index()] {
            if now.saturating_sub(last) < self.debounce_ticks {
                tracing::debug!(?faction, "duplicate spawn intent dropped");
                return;
            }
        }
        self.last_spawn_intent[faction.index()] = Some(now);

        if let Err(rejection) = self.engine.spawn(faction, kind, SpawnOrigin::Network) {
            tracing::debug!(?faction, ?kind, ?rejection, "guest spawn rejected");
        }
    }

    fn handle_skill_intent(&mut self, skill_index: usize, faction: Faction) {
        // A skill request for the host's own faction can only be an echo
        // of our own broadcast; executing it would double-fire.
        if faction == self.own_faction {
            tracing::warn!("ignoring self-faction skill request");
            return;
        }
        // The sender can only cast the skill the match dealt them.
        let assigned = self.engine.assigned_skill(faction);
        if self.engine.skills().index_of(assigned) != Some(skill_index) {
            tracing::warn!(skill_index, ?assigned, "skill intent does not match assignment");
            return;
        }
        match self.engine.use_skill(faction) {
            Ok(outcome) => {
                // Relay the event so the guest can show the effect banner.
                self.send(Payload::UseSkill {
                    skill_index,
                    faction,
                });
                tracing::debug!(kind = ?outcome.kind, "guest skill executed");
            }
            Err(rejection) => {
                tracing::debug!(?rejection, "guest skill rejected");
            }
        }
    }

    /// Spawn for the host's own player (local input).
    ///
    /// # Errors
    ///
    /// Propagates the engine's typed rejection.
    pub fn spawn_own(
        &mut self,
        kind: UnitKind,
    ) -> Result<lane_core::units::UnitId, lane_core::error::SpawnError> {
        self.engine.spawn(self.own_faction, kind, SpawnOrigin::Local)
    }

    /// Use the host player's own skill and announce it to the guest.
    ///
    /// # Errors
    ///
    /// Propagates the engine's typed rejection.
    pub fn use_own_skill(
        &mut self,
    ) -> Result<lane_core::engine::SkillOutcome, lane_core::error::SkillError> {
        let kind = self.engine.assigned_skill(self.own_faction);
        let outcome = self.engine.use_skill(self.own_faction)?;
        if let Some(index) = self.engine.skills().index_of(kind) {
            self.send(Payload::UseSkill {
                skill_index: index,
                faction: self.own_faction,
            });
        }
        Ok(outcome)
    }

    /// Advance the match by one tick and emit due snapshots.
    ///
    /// A no-op until the channel is synced, and after the end has been
    /// announced.
    pub fn tick(&mut self) -> TickEvents {
        if self.phase != SessionPhase::Synced {
            return TickEvents::default();
        }

        let events = self.engine.tick();
        let now = self.engine.current_tick();

        let snapshot_due = match self.last_snapshot_tick {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.snapshot_interval_ticks,
        };
        // The end-of-match snapshot goes out immediately, once.
        if snapshot_due || (self.engine.is_over() && !self.end_announced) {
            self.last_snapshot_tick = Some(now);
            let snapshot = Snapshot::capture(&self.engine);
            self.send(Payload::SyncState {
                game_state: snapshot,
            });
        }

        if self.engine.is_over() && !self.end_announced {
            self.end_announced = true;
            if let Some(winner) = self.engine.winner() {
                self.send(Payload::GameEnd {
                    winner_faction: winner,
                });
            }
            self.phase = SessionPhase::Ended;
        }

        events
    }

    /// Take every queued outgoing envelope.
    pub fn drain_outbox(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outbox)
    }

    fn send(&mut self, payload: Payload) {
        self.outbox.push(Envelope::new(self.room.clone(), payload));
    }
}
