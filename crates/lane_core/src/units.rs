//! Unit entities and the registry that owns them.
//!
//! The registry is the single owner of all live units: an explicit
//! id-indexed store with deterministic iteration via sorted ids.
//! Nothing else in the engine holds unit state, and "what is a unit"
//! is always answered by this store, never by duck-typed scans.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{UnitKind, UnitStats};
use crate::factions::Faction;
use crate::math::{fixed_serde, Fixed};

/// Unique identifier for units.
pub type UnitId = u64;

/// A live combatant on the lane.
///
/// Created by a successful spawn, mutated by the movement/combat/healing
/// phases, destroyed when hp drops to zero or the unit crosses the
/// opposing baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier assigned by the registry.
    pub id: UnitId,
    /// Owning faction, fixed for the unit's lifetime.
    pub faction: Faction,
    /// Catalog archetype.
    pub kind: UnitKind,
    /// Scalar position along the lane.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Cosmetic lateral offset, fixed at spawn time.
    #[serde(with = "fixed_serde")]
    pub lateral: Fixed,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Damage per attack.
    pub damage: i32,
    /// Attack range in lane cells.
    pub range: i32,
    /// Whether the unit is currently walking (false while engaged).
    pub moving: bool,
    /// Tick of the unit's last attack.
    pub last_attack_tick: u64,
    /// Tick of the unit's last heal (healers only).
    pub last_heal_tick: u64,
}

impl Unit {
    /// Create a fresh unit at full health.
    #[must_use]
    pub fn new(
        id: UnitId,
        faction: Faction,
        kind: UnitKind,
        stats: UnitStats,
        x: Fixed,
        lateral: Fixed,
    ) -> Self {
        Self {
            id,
            faction,
            kind,
            x,
            lateral,
            hp: stats.hp,
            max_hp: stats.hp,
            damage: stats.damage,
            range: stats.range,
            moving: true,
            last_attack_tick: 0,
            last_heal_tick: 0,
        }
    }

    /// Whether this unit is dead (pending removal).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

/// Storage for all live units in a match.
///
/// Uses a `HashMap` for O(1) lookup by id, with deterministic iteration
/// via sorted keys when running simulation phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRegistry {
    units: HashMap<UnitId, Unit>,
    next_id: UnitId,
}

impl UnitRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a fresh unit id.
    pub fn allocate_id(&mut self) -> UnitId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a unit under its own id.
    pub fn insert(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    /// Remove a unit by id.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable reference to a unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Number of live units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of live units belonging to a faction.
    #[must_use]
    pub fn count_faction(&self, faction: Faction) -> usize {
        self.units.values().filter(|u| u.faction == faction).count()
    }

    /// Sorted unit ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<_> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all units (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Units belonging to a faction, in id order.
    #[must_use]
    pub fn faction_units(&self, faction: Faction) -> Vec<&Unit> {
        let mut units: Vec<_> = self.units.values().filter(|u| u.faction == faction).collect();
        units.sort_unstable_by_key(|u| u.id);
        units
    }

    /// Units of a given kind belonging to a faction, in id order.
    #[must_use]
    pub fn faction_units_of_kind(&self, faction: Faction, kind: UnitKind) -> Vec<&Unit> {
        let mut units: Vec<_> = self
            .units
            .values()
            .filter(|u| u.faction == faction && u.kind == kind)
            .collect();
        units.sort_unstable_by_key(|u| u.id);
        units
    }

    /// Remove every unit, returning them in id order.
    pub fn drain_all(&mut self) -> Vec<Unit> {
        let ids = self.sorted_ids();
        ids.into_iter()
            .filter_map(|id| self.units.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitCatalog;

    fn sample_unit(registry: &mut UnitRegistry, faction: Faction, kind: UnitKind) -> UnitId {
        let catalog = UnitCatalog::default();
        let id = registry.allocate_id();
        registry.insert(Unit::new(
            id,
            faction,
            kind,
            catalog.stats(faction, kind),
            Fixed::from_num(200),
            Fixed::ZERO,
        ));
        id
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let mut registry = UnitRegistry::new();
        let a = sample_unit(&mut registry, Faction::West, UnitKind::Melee);
        let b = sample_unit(&mut registry, Faction::East, UnitKind::Ranged);
        assert!(b > a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_faction_count_and_queries() {
        let mut registry = UnitRegistry::new();
        sample_unit(&mut registry, Faction::West, UnitKind::Melee);
        sample_unit(&mut registry, Faction::West, UnitKind::Healer);
        sample_unit(&mut registry, Faction::East, UnitKind::Melee);

        assert_eq!(registry.count_faction(Faction::West), 2);
        assert_eq!(registry.count_faction(Faction::East), 1);
        assert_eq!(
            registry
                .faction_units_of_kind(Faction::West, UnitKind::Healer)
                .len(),
            1
        );

        let west = registry.faction_units(Faction::West);
        assert_eq!(west.len(), 2);
        assert!(west.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    #[test]
    fn test_new_unit_starts_at_full_health() {
        let mut registry = UnitRegistry::new();
        let id = sample_unit(&mut registry, Faction::West, UnitKind::Melee);
        let unit = registry.get(id).unwrap();
        assert_eq!(unit.hp, unit.max_hp);
        assert_eq!(unit.hp, 300);
        assert!(unit.moving);
    }

    #[test]
    fn test_drain_all_returns_in_id_order() {
        let mut registry = UnitRegistry::new();
        sample_unit(&mut registry, Faction::West, UnitKind::Melee);
        sample_unit(&mut registry, Faction::East, UnitKind::Melee);
        sample_unit(&mut registry, Faction::West, UnitKind::Ranged);

        let drained = registry.drain_all();
        assert!(registry.is_empty());
        let ids: Vec<_> = drained.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut registry = UnitRegistry::new();
        let a = sample_unit(&mut registry, Faction::West, UnitKind::Melee);
        registry.remove(a);
        let b = sample_unit(&mut registry, Faction::West, UnitKind::Melee);
        assert!(b > a);
    }
}
