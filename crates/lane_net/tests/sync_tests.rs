//! End-to-end protocol tests: a host and a guest session exchanging
//! envelopes over an in-memory, deliberately lossy channel.

use lane_core::catalog::UnitKind;
use lane_core::factions::Faction;
use lane_test_utils::fixtures::default_engine;
use lane_net::guest::GuestSession;
use lane_net::host::HostSession;
use lane_net::messages::{Envelope, Payload, RoomCode};
use lane_net::snapshot::Snapshot;
use lane_net::{MatchSetup, SessionConfig, SessionPhase};

fn room() -> RoomCode {
    RoomCode::new("314")
}

fn host_setup() -> MatchSetup {
    MatchSetup {
        player_faction: Faction::West,
        opponent_faction: Faction::East,
        is_multiplayer: true,
        room_code: room(),
        is_host: true,
    }
}

fn guest_setup() -> MatchSetup {
    MatchSetup {
        player_faction: Faction::East,
        opponent_faction: Faction::West,
        is_multiplayer: true,
        room_code: room(),
        is_host: false,
    }
}

/// Build a connected host/guest pair (join handshake already done).
fn connected_pair(seed: u64) -> (HostSession, GuestSession) {
    let engine = default_engine(seed);
    let mut host = HostSession::new(engine, &host_setup(), &SessionConfig::default());
    let mut guest = GuestSession::new(&guest_setup());

    for envelope in guest.drain_outbox() {
        host.handle(&envelope);
    }
    for envelope in host.drain_outbox() {
        guest.handle(&envelope);
    }
    assert_eq!(host.phase(), SessionPhase::Synced);
    assert_eq!(guest.phase(), SessionPhase::Synced);
    (host, guest)
}

/// Deliver host traffic to the guest, dropping snapshots the predicate
/// rejects. Returns how many envelopes were dropped.
fn deliver_lossy(
    host: &mut HostSession,
    guest: &mut GuestSession,
    mut keep: impl FnMut(usize, &Envelope) -> bool,
) -> usize {
    let mut dropped = 0;
    for (index, envelope) in host.drain_outbox().into_iter().enumerate() {
        if keep(index, &envelope) {
            guest.handle(&envelope);
        } else {
            dropped += 1;
        }
    }
    dropped
}

fn assert_mirror_matches_engine(guest: &GuestSession, host: &HostSession) {
    let truth = Snapshot::capture(host.engine());
    let mirror = guest.mirror();

    assert_eq!(mirror.base_hp, truth.base_hp);
    assert_eq!(mirror.energy, truth.energy);
    assert_eq!(mirror.death_count, truth.death_count);
    assert_eq!(mirror.units.len(), truth.units.len());
    for unit in &truth.units {
        let mirrored = &mirror.units[&unit.id];
        assert_eq!(mirrored.x, unit.x);
        assert_eq!(mirrored.hp, unit.hp);
        assert_eq!(mirrored.faction, unit.faction);
        assert_eq!(mirrored.kind, unit.kind);
    }
}

#[test]
fn guest_converges_despite_dropped_snapshots() {
    let (mut host, mut guest) = connected_pair(101);
    host.spawn_own(UnitKind::Melee).unwrap();
    host.spawn_own(UnitKind::Ranged).unwrap();

    // Run five seconds of match, losing every other snapshot.
    let mut snapshot_count = 0;
    for _ in 0..100 {
        host.tick();
        deliver_lossy(&mut host, &mut guest, |_, envelope| {
            if matches!(envelope.payload, Payload::SyncState { .. }) {
                snapshot_count += 1;
                snapshot_count % 2 == 0
            } else {
                true
            }
        });
    }

    // One fully delivered snapshot heals everything.
    let mut healed = false;
    for _ in 0..4 {
        host.tick();
        let mut delivered_snapshot = false;
        for envelope in host.drain_outbox() {
            if matches!(envelope.payload, Payload::SyncState { .. }) {
                delivered_snapshot = true;
            }
            guest.handle(&envelope);
        }
        if delivered_snapshot {
            healed = true;
            break;
        }
    }
    assert!(healed);
    assert_mirror_matches_engine(&guest, &host);
}

#[test]
fn guest_spawn_intent_round_trip_with_debounce() {
    let (mut host, mut guest) = connected_pair(102);

    // Mash the button: three identical intents in one window.
    guest.request_spawn(UnitKind::Melee);
    guest.request_spawn(UnitKind::Melee);
    guest.request_spawn(UnitKind::Melee);
    for envelope in guest.drain_outbox() {
        host.handle(&envelope);
    }
    assert_eq!(host.engine().units().count_faction(Faction::East), 1);

    // The unit shows up on the guest with the next snapshot.
    host.tick();
    deliver_lossy(&mut host, &mut guest, |_, _| true);
    assert_eq!(guest.mirror().units.len(), 1);
    let unit = guest.mirror().units.values().next().unwrap();
    assert_eq!(unit.faction, Faction::East);
    assert_eq!(unit.kind, UnitKind::Melee);

    // Past the window, the guest can spawn again.
    for _ in 0..6 {
        host.tick();
    }
    host.drain_outbox();
    guest.request_spawn(UnitKind::Healer);
    for envelope in guest.drain_outbox() {
        host.handle(&envelope);
    }
    assert_eq!(host.engine().units().count_faction(Faction::East), 2);
}

#[test]
fn guest_skill_takes_effect_only_through_the_host() {
    let (mut host, mut guest) = connected_pair(103);
    let guest_skill_index = host
        .engine()
        .skills()
        .index_of(host.engine().assigned_skill(Faction::East))
        .unwrap();

    guest.request_skill(guest_skill_index);
    // Before delivery, nothing anywhere has changed.
    assert!(!host.engine().state().skill_used[Faction::East.index()]);

    for envelope in guest.drain_outbox() {
        host.handle(&envelope);
    }
    assert!(host.engine().state().skill_used[Faction::East.index()]);

    // The host relays the event; the guest sees it as its own, not as an
    // enemy skill banner.
    let mut enemy_banners = 0;
    for envelope in host.drain_outbox() {
        if guest.handle(&envelope).enemy_skill.is_some() {
            enemy_banners += 1;
        }
    }
    assert_eq!(enemy_banners, 0);

    // A replayed intent is absorbed by the engine's one-shot rule.
    let replay = Envelope::new(
        room(),
        Payload::UseSkill {
            skill_index: guest_skill_index,
            faction: Faction::East,
        },
    );
    let hash = host.engine().state_hash();
    host.handle(&replay);
    assert_eq!(host.engine().state_hash(), hash);
}

#[test]
fn host_skill_reaches_guest_as_enemy_banner() {
    let (mut host, mut guest) = connected_pair(104);
    host.use_own_skill().unwrap();

    let mut banner = None;
    for envelope in host.drain_outbox() {
        let events = guest.handle(&envelope);
        if events.enemy_skill.is_some() {
            banner = events.enemy_skill;
        }
    }
    assert!(banner.is_some());
}

#[test]
fn winner_propagates_even_when_every_snapshot_is_lost() {
    let (mut host, mut guest) = connected_pair(105);
    host.spawn_own(UnitKind::Melee).unwrap();

    // Drop every snapshot; only GAME_END gets through.
    for _ in 0..400 {
        host.tick();
        deliver_lossy(&mut host, &mut guest, |_, envelope| {
            !matches!(envelope.payload, Payload::SyncState { .. })
        });
        if guest.phase() == SessionPhase::Ended {
            break;
        }
    }

    assert_eq!(host.phase(), SessionPhase::Ended);
    assert_eq!(guest.phase(), SessionPhase::Ended);
    assert!(guest.mirror().over);
    assert_eq!(guest.mirror().winner, Some(Faction::West));
}

#[test]
fn normal_finish_finalizes_from_the_snapshot() {
    let (mut host, mut guest) = connected_pair(106);
    host.spawn_own(UnitKind::Melee).unwrap();

    let mut finalized = None;
    for _ in 0..400 {
        host.tick();
        for envelope in host.drain_outbox() {
            let events = guest.handle(&envelope);
            if let Some(applied) = events.applied {
                if applied.finalized.is_some() {
                    finalized = applied.finalized;
                }
            }
        }
        if finalized.is_some() {
            break;
        }
    }

    assert_eq!(finalized, Some(Faction::West));
    // The lone attacker crossed the line: its removal came through as a
    // snapshot diff before the end, or with the final snapshot itself.
    assert!(guest.mirror().units.is_empty());
    assert_eq!(guest.mirror().base_hp[Faction::East.index()], 0);
}
