//! Targeting, damage, and healing resolution.
//!
//! One combat pass works over a consistent view of the battlefield:
//! positions are read as they were at the start of the pass, damage
//! accumulates during it, and every unit marked dead is destroyed in a
//! single sweep afterwards. A unit marked dead earlier in the pass can
//! neither attack nor be targeted by later attackers in the same pass.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::math::{lane_distance, Fixed};
use crate::units::{Unit, UnitId, UnitRegistry};

/// A single application of damage during a combat pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Attacking unit.
    pub attacker: UnitId,
    /// Unit that took the hit.
    pub target: UnitId,
    /// Damage applied.
    pub damage: i32,
}

/// A single heal applied during a healing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealEvent {
    /// Healing unit.
    pub healer: UnitId,
    /// Ally that was healed.
    pub target: UnitId,
    /// Hit points restored (after the max-hp cap).
    pub amount: i32,
}

/// Result of one combat pass.
#[derive(Debug, Clone, Default)]
pub struct CombatOutcome {
    /// Every damage application, in resolution order.
    pub damage_events: Vec<DamageEvent>,
    /// Units destroyed by the pass, removed from the registry, in id order.
    pub deaths: Vec<Unit>,
}

/// Engagement range of a unit: catalog range in cells times the cell size.
#[must_use]
pub fn engagement_range(range: i32, unit_size: i32) -> Fixed {
    Fixed::from_num(range * unit_size)
}

/// Lane distance from `unit` to its nearest living enemy, if any.
#[must_use]
pub fn nearest_enemy_distance(registry: &UnitRegistry, unit: &Unit) -> Option<Fixed> {
    registry
        .iter()
        .filter(|other| other.faction != unit.faction)
        .map(|other| lane_distance(unit.x, other.x))
        .min()
}

/// Run one combat pass over the whole battlefield.
///
/// Attackers act in ascending id order. An attacker participates when it
/// has positive damage, is not already marked dead, and its cooldown has
/// elapsed (`tick - last_attack_tick >= attack_interval_ticks`).
///
/// Splash attackers hit every unmarked enemy in range; everyone else hits
/// exactly the nearest one. Exact distance ties go to the lowest unit id,
/// so a pass is fully reproducible.
pub fn resolve_combat(
    registry: &mut UnitRegistry,
    tick: u64,
    attack_interval_ticks: u64,
    unit_size: i32,
) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    let mut marked: BTreeSet<UnitId> = BTreeSet::new();

    for attacker_id in registry.sorted_ids() {
        if marked.contains(&attacker_id) {
            continue;
        }
        let Some(attacker) = registry.get(attacker_id).copied() else {
            continue;
        };
        if attacker.damage <= 0 {
            continue;
        }
        if tick.saturating_sub(attacker.last_attack_tick) < attack_interval_ticks {
            continue;
        }

        let reach = engagement_range(attacker.range, unit_size);
        let mut in_range: Vec<(Fixed, UnitId)> = registry
            .iter()
            .filter(|enemy| enemy.faction != attacker.faction && !marked.contains(&enemy.id))
            .map(|enemy| (lane_distance(attacker.x, enemy.x), enemy.id))
            .filter(|(dist, _)| *dist <= reach)
            .collect();

        if in_range.is_empty() {
            continue;
        }

        // Distance first, lowest id on exact ties.
        in_range.sort_unstable();

        let targets: Vec<UnitId> = if attacker.kind.is_splash() {
            in_range.into_iter().map(|(_, id)| id).collect()
        } else {
            vec![in_range[0].1]
        };

        for target_id in targets {
            if let Some(target) = registry.get_mut(target_id) {
                target.hp -= attacker.damage;
                outcome.damage_events.push(DamageEvent {
                    attacker: attacker_id,
                    target: target_id,
                    damage: attacker.damage,
                });
                if target.is_dead() {
                    marked.insert(target_id);
                }
            }
        }

        if let Some(attacker) = registry.get_mut(attacker_id) {
            attacker.last_attack_tick = tick;
        }
    }

    for id in marked {
        if let Some(unit) = registry.remove(id) {
            outcome.deaths.push(unit);
        }
    }

    outcome
}

/// Run one healing pass.
///
/// Each ready healer restores `heal_amount` to the wounded ally with the
/// lowest hp inside its range (ties again to the lowest id), capped at the
/// ally's max hp. Healers never heal themselves.
pub fn resolve_healing(
    registry: &mut UnitRegistry,
    tick: u64,
    heal_interval_ticks: u64,
    unit_size: i32,
    heal_amount: i32,
) -> Vec<HealEvent> {
    let mut events = Vec::new();

    for healer_id in registry.sorted_ids() {
        let Some(healer) = registry.get(healer_id).copied() else {
            continue;
        };
        if healer.kind != crate::catalog::UnitKind::Healer {
            continue;
        }
        if tick.saturating_sub(healer.last_heal_tick) < heal_interval_ticks {
            continue;
        }

        let reach = engagement_range(healer.range, unit_size);
        let target_id = registry
            .iter()
            .filter(|ally| {
                ally.faction == healer.faction
                    && ally.id != healer_id
                    && ally.hp < ally.max_hp
                    && lane_distance(healer.x, ally.x) <= reach
            })
            .map(|ally| (ally.hp, ally.id))
            .min()
            .map(|(_, id)| id);

        let Some(target_id) = target_id else {
            continue;
        };

        if let Some(target) = registry.get_mut(target_id) {
            let healed = heal_amount.min(target.max_hp - target.hp);
            target.hp += healed;
            events.push(HealEvent {
                healer: healer_id,
                target: target_id,
                amount: healed,
            });
        }
        if let Some(healer) = registry.get_mut(healer_id) {
            healer.last_heal_tick = tick;
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{UnitCatalog, UnitKind, UnitStats};
    use crate::factions::Faction;

    const UNIT_SIZE: i32 = 60;
    const INTERVAL: u64 = 20;

    fn place(
        registry: &mut UnitRegistry,
        faction: Faction,
        kind: UnitKind,
        stats: UnitStats,
        x: i32,
    ) -> UnitId {
        let id = registry.allocate_id();
        registry.insert(Unit::new(
            id,
            faction,
            kind,
            stats,
            Fixed::from_num(x),
            Fixed::ZERO,
        ));
        id
    }

    fn catalog_place(
        registry: &mut UnitRegistry,
        faction: Faction,
        kind: UnitKind,
        x: i32,
    ) -> UnitId {
        let stats = UnitCatalog::default().stats(faction, kind);
        place(registry, faction, kind, stats, x)
    }

    #[test]
    fn test_single_target_hits_nearest() {
        let mut registry = UnitRegistry::new();
        let ranged = catalog_place(&mut registry, Faction::West, UnitKind::Ranged, 500);
        let near = catalog_place(&mut registry, Faction::East, UnitKind::Melee, 560);
        let far = catalog_place(&mut registry, Faction::East, UnitKind::Melee, 620);

        let outcome = resolve_combat(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE);

        let hits: Vec<_> = outcome
            .damage_events
            .iter()
            .filter(|e| e.attacker == ranged)
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, near);
        assert_eq!(registry.get(far).unwrap().hp, 200);
    }

    #[test]
    fn test_equidistant_tie_goes_to_lowest_id() {
        let mut registry = UnitRegistry::new();
        let stats = UnitStats {
            cost: 10,
            hp: 100,
            damage: 15,
            range: 4,
        };
        let attacker = place(&mut registry, Faction::West, UnitKind::Ranged, stats, 500);
        let left = place(&mut registry, Faction::East, UnitKind::Melee, stats, 440);
        let _right = place(&mut registry, Faction::East, UnitKind::Melee, stats, 560);

        let outcome = resolve_combat(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE);
        let hit = outcome
            .damage_events
            .iter()
            .find(|e| e.attacker == attacker)
            .unwrap();
        assert_eq!(hit.target, left);
    }

    #[test]
    fn test_splash_hits_everyone_in_range() {
        let mut registry = UnitRegistry::new();
        let heavy = catalog_place(&mut registry, Faction::West, UnitKind::Heavy, 500);
        let a = catalog_place(&mut registry, Faction::East, UnitKind::Melee, 520);
        let b = catalog_place(&mut registry, Faction::East, UnitKind::Ranged, 540);
        let out_of_range = catalog_place(&mut registry, Faction::East, UnitKind::Melee, 700);

        let outcome = resolve_combat(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE);

        let targets: BTreeSet<_> = outcome
            .damage_events
            .iter()
            .filter(|e| e.attacker == heavy)
            .map(|e| e.target)
            .collect();
        assert!(targets.contains(&a));
        assert!(targets.contains(&b));
        assert!(!targets.contains(&out_of_range));
    }

    #[test]
    fn test_overkill_removes_unit_and_reports_death() {
        let mut registry = UnitRegistry::new();
        let melee_stats = UnitStats {
            cost: 25,
            hp: 25,
            damage: 20,
            range: 1,
        };
        let ranged_stats = UnitStats {
            cost: 45,
            hp: 15,
            damage: 30,
            range: 3,
        };
        let ranged = place(&mut registry, Faction::East, UnitKind::Ranged, ranged_stats, 560);
        let melee = place(&mut registry, Faction::West, UnitKind::Melee, melee_stats, 500);

        let outcome = resolve_combat(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE);

        // The ranged unit fires first (lower id) and the kill denies the
        // melee its counterattack.
        let dead: Vec<_> = outcome.deaths.iter().map(|u| u.id).collect();
        assert_eq!(dead, vec![melee]);
        assert!(registry.get(melee).is_none());
        let corpse = outcome.deaths.iter().find(|u| u.id == melee).unwrap();
        assert_eq!(corpse.hp, 25 - 30);
        assert_eq!(registry.get(ranged).unwrap().hp, 15);
    }

    #[test]
    fn test_dead_units_cannot_act_or_be_targeted() {
        let mut registry = UnitRegistry::new();
        let killer_stats = UnitStats {
            cost: 10,
            hp: 500,
            damage: 100,
            range: 4,
        };
        let victim_stats = UnitStats {
            cost: 10,
            hp: 50,
            damage: 100,
            range: 4,
        };
        // Lowest id attacks first and kills the victim before it can act.
        let _killer = place(&mut registry, Faction::West, UnitKind::Ranged, killer_stats, 500);
        let victim = place(&mut registry, Faction::East, UnitKind::Ranged, victim_stats, 560);
        let bystander = place(&mut registry, Faction::West, UnitKind::Melee, victim_stats, 560);

        let outcome = resolve_combat(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE);

        assert!(outcome
            .damage_events
            .iter()
            .all(|e| e.attacker != victim));
        assert_eq!(registry.get(bystander).unwrap().hp, 50);
    }

    #[test]
    fn test_cooldown_blocks_second_attack() {
        let mut registry = UnitRegistry::new();
        let ranged = catalog_place(&mut registry, Faction::West, UnitKind::Ranged, 500);
        let _tank = catalog_place(&mut registry, Faction::East, UnitKind::Heavy, 560);

        let first = resolve_combat(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE);
        assert_eq!(first.damage_events.len(), 2); // both sides in range and ready

        // One tick later the attacker is still cooling down.
        let second = resolve_combat(&mut registry, INTERVAL + 1, INTERVAL, UNIT_SIZE);
        assert!(second.damage_events.is_empty());

        let third = resolve_combat(&mut registry, INTERVAL * 2, INTERVAL, UNIT_SIZE);
        assert!(third.damage_events.iter().any(|e| e.attacker == ranged));
    }

    #[test]
    fn test_healer_heals_lowest_hp_ally_capped() {
        let mut registry = UnitRegistry::new();
        let healer = catalog_place(&mut registry, Faction::West, UnitKind::Healer, 500);
        let wounded = catalog_place(&mut registry, Faction::West, UnitKind::Melee, 520);
        let scratched = catalog_place(&mut registry, Faction::West, UnitKind::Melee, 540);
        registry.get_mut(wounded).unwrap().hp = 40;
        registry.get_mut(scratched).unwrap().hp = 295;

        let events = resolve_healing(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE, 10);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, wounded);
        assert_eq!(registry.get(wounded).unwrap().hp, 50);

        // Second pass is gated by the healer's own cooldown.
        let events = resolve_healing(&mut registry, INTERVAL + 1, INTERVAL, UNIT_SIZE, 10);
        assert!(events.is_empty());

        // Heal the scratch: the cap keeps hp at max.
        registry.get_mut(wounded).unwrap().hp = 300;
        let events = resolve_healing(&mut registry, INTERVAL * 2, INTERVAL, UNIT_SIZE, 10);
        assert_eq!(events[0].target, scratched);
        assert_eq!(events[0].amount, 5);
        assert_eq!(registry.get(scratched).unwrap().hp, 300);
        let _ = healer;
    }

    #[test]
    fn test_healer_ignores_enemies_and_full_health_allies() {
        let mut registry = UnitRegistry::new();
        catalog_place(&mut registry, Faction::West, UnitKind::Healer, 500);
        catalog_place(&mut registry, Faction::West, UnitKind::Melee, 520);
        let enemy = catalog_place(&mut registry, Faction::East, UnitKind::Melee, 530);
        registry.get_mut(enemy).unwrap().hp = 1;

        let events = resolve_healing(&mut registry, INTERVAL, INTERVAL, UNIT_SIZE, 10);
        assert!(events.is_empty());
    }
}
