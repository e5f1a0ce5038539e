//! Cross-module match scenarios and property tests.

use lane_core::catalog::UnitKind;
use lane_core::engine::SpawnOrigin;
use lane_core::factions::Faction;
use lane_core::ledger::EnergyLedger;
use lane_test_utils::fixtures::{duel_engine, tall_base_engine};
use lane_test_utils::proptest::prelude::*;

#[test]
fn melee_walks_into_ranged_fire_and_dies() {
    // Symmetric duel stats: melee cost 25 / hp 25 / dmg 20 / range 1,
    // ranged cost 45 / hp 15 / dmg 30 / range 3. Both walk toward each
    // other; the ranged unit engages first and one volley is lethal.
    let mut engine = duel_engine(1);
    let melee = engine
        .spawn(Faction::West, UnitKind::Melee, SpawnOrigin::Local)
        .unwrap();
    let ranged = engine
        .spawn(Faction::East, UnitKind::Ranged, SpawnOrigin::Local)
        .unwrap();

    let mut melee_died_at = None;
    for _ in 0..300 {
        let events = engine.tick();
        if events.deaths.iter().any(|d| d.id == melee) {
            melee_died_at = Some(engine.current_tick());
            break;
        }
        assert!(
            !events.deaths.iter().any(|d| d.id == ranged),
            "the ranged unit must never be hit"
        );
    }

    assert!(melee_died_at.is_some());
    assert!(engine.units().get(melee).is_none());
    assert!(engine.units().get(ranged).is_some());
    // Kill accounting: only the melee's faction counter moved.
    assert_eq!(engine.state().death_count[Faction::West.index()], 1);
    assert_eq!(engine.state().death_count[Faction::East.index()], 0);
}

#[test]
fn healer_keeps_a_frontliner_alive_longer() {
    // Same duel twice, once with a healer behind the melee. The healed
    // melee must survive at least as long, and here strictly longer:
    // heals outpace the chip damage for a while.
    let survival = |with_healer: bool| -> u64 {
        let mut engine = tall_base_engine(5, 100);
        let melee = engine
            .spawn(Faction::West, UnitKind::Melee, SpawnOrigin::Local)
            .unwrap();
        if with_healer {
            engine
                .spawn(Faction::West, UnitKind::Healer, SpawnOrigin::Local)
                .unwrap();
        }
        engine
            .spawn(Faction::East, UnitKind::Ranged, SpawnOrigin::Local)
            .unwrap();

        for _ in 0..2_000 {
            let events = engine.tick();
            if events.deaths.iter().any(|d| d.id == melee) {
                return engine.current_tick();
            }
        }
        u64::MAX
    };

    let unhealed = survival(false);
    let healed = survival(true);
    assert!(healed > unhealed, "healed {healed} <= unhealed {unhealed}");
}

#[test]
fn unit_cap_holds_under_sustained_pressure() {
    let mut engine = tall_base_engine(9, 1_000);
    let cap = engine.config().unit_cap;

    for _ in 0..3_000 {
        // Free energy every tick keeps the spawner from starving.
        let _ = engine.spawn(Faction::West, UnitKind::Melee, SpawnOrigin::Local);
        engine.tick();
        assert!(engine.units().count_faction(Faction::West) <= cap);
    }
}

proptest! {
    #[test]
    fn ledger_invariant_holds_under_arbitrary_ops(
        ops in prop::collection::vec(0u8..5, 1..200),
        max in 100i32..2_000,
    ) {
        let mut ledger = EnergyLedger::new(max);
        for op in ops {
            match op {
                0 => ledger.regen(10),
                1 => {
                    let amount = ledger.current / 3;
                    ledger.charge(amount);
                }
                2 => ledger.credit(250),
                3 => ledger.halve(),
                _ => {
                    let _ = ledger.drain_half();
                }
            }
            prop_assert!(ledger.current >= 0);
            prop_assert!(ledger.current <= ledger.max);
        }
    }

    #[test]
    fn effective_cost_floors_for_any_percent(
        cost in 0i32..10_000,
        percent in 0i32..=100,
    ) {
        let mut ledger = EnergyLedger::new(500);
        ledger.cost_percent = percent;
        let effective = ledger.effective_cost(cost);
        prop_assert_eq!(effective, cost * percent / 100);
        prop_assert!(effective <= cost);
        prop_assert!(effective >= 0);
    }

    #[test]
    fn spawn_never_overdraws_or_mutates_on_failure(
        seed in 0u64..500,
        starting_energy in 0i32..500,
    ) {
        let mut engine = lane_test_utils::fixtures::default_engine(seed);
        // Drain to an arbitrary level through the public-ish path: the
        // ledger is reachable via state, so assert on observables only.
        let cost = engine.effective_cost(Faction::West, UnitKind::Ranged);
        let before_units = engine.units().count_faction(Faction::West);

        // Burn energy down by spawning melee units until below target.
        while engine.state().energy[Faction::West.index()].current > starting_energy {
            if engine.spawn(Faction::West, UnitKind::Melee, SpawnOrigin::Local).is_err() {
                break;
            }
        }
        let energy = engine.state().energy[Faction::West.index()].current;
        let units = engine.units().count_faction(Faction::West);
        let result = engine.spawn(Faction::West, UnitKind::Ranged, SpawnOrigin::Local);

        match result {
            Ok(_) => {
                prop_assert_eq!(
                    engine.state().energy[Faction::West.index()].current,
                    energy - cost
                );
            }
            Err(_) => {
                // A rejection changes nothing.
                prop_assert_eq!(engine.state().energy[Faction::West.index()].current, energy);
                prop_assert_eq!(engine.units().count_faction(Faction::West), units);
            }
        }
        prop_assert!(engine.state().energy[Faction::West.index()].current >= 0);
        let _ = before_units;
    }
}
