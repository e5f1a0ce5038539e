//! Full-state snapshots.
//!
//! The host's periodic snapshot is the only reconciliation mechanism in
//! the protocol: there are no acknowledgments and no retries. A lost or
//! reordered message is healed by the next snapshot, which bounds any
//! desync to one snapshot interval. Application is idempotent by
//! construction - applying the same snapshot twice changes nothing.

use serde::{Deserialize, Serialize};

use lane_core::catalog::UnitKind;
use lane_core::engine::MatchEngine;
use lane_core::factions::{Faction, FACTIONS};
use lane_core::math::{fixed_serde, Fixed};
use lane_core::units::UnitId;

/// One unit as the guest needs to see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unit id (stable across snapshots).
    pub id: UnitId,
    /// Archetype, for sprite selection.
    #[serde(rename = "unitType")]
    pub kind: UnitKind,
    /// Owning faction.
    pub faction: Faction,
    /// Lane position.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    #[serde(rename = "maxHp")]
    pub max_hp: i32,
}

/// The complete observable match state, as broadcast by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Base hit points, indexed by [`Faction::index`].
    pub base_hp: [i32; 2],
    /// Current energy per faction.
    pub energy: [i32; 2],
    /// Combat death counters per faction.
    pub death_count: [u32; 2],
    /// Every live unit, in id order.
    pub units: Vec<UnitSnapshot>,
    /// Whether the match has ended.
    pub over: bool,
    /// Winner, once `over` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Faction>,
}

impl Snapshot {
    /// Capture the engine's current observable state.
    #[must_use]
    pub fn capture(engine: &MatchEngine) -> Self {
        let state = engine.state();
        let units = engine
            .units()
            .sorted_ids()
            .into_iter()
            .filter_map(|id| engine.units().get(id))
            .map(|unit| UnitSnapshot {
                id: unit.id,
                kind: unit.kind,
                faction: unit.faction,
                x: unit.x,
                hp: unit.hp,
                max_hp: unit.max_hp,
            })
            .collect();

        Self {
            base_hp: state.base_hp,
            energy: FACTIONS.map(|f| state.energy[f.index()].current),
            death_count: state.death_count,
            units,
            over: state.over,
            winner: state.winner,
        }
    }
}
