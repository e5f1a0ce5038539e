//! Simulation clock and scheduled one-shot tasks.
//!
//! The clock counts fixed-duration ticks and owns a queue of scheduled
//! tasks: skill reverts, repeating energy pulses, and AI wake-ups. Tasks
//! are plain data, not closures, so the whole clock serializes with the
//! rest of the match state.
//!
//! Ordering guarantees:
//! - tasks due on the same tick fire in registration order (FIFO);
//! - every task has a cancellable handle, and the queue can be purged
//!   wholesale when a match is torn down, so no revert outlives its match.

use serde::{Deserialize, Serialize};

use crate::factions::Faction;

/// Handle for a scheduled task, usable to cancel it before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(u64);

/// What a scheduled task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Revert a temporarily raised energy cap to its baseline.
    RestoreMaxEnergy {
        /// Faction whose cap reverts.
        faction: Faction,
    },
    /// Revert a discounted spawn cost to full price.
    RestoreCostMultiplier {
        /// Faction whose multiplier reverts.
        faction: Faction,
    },
    /// Resume a paused energy regen.
    ResumeRegen {
        /// Faction whose regen resumes.
        faction: Faction,
    },
    /// Lift a global battlefield freeze.
    EndFreeze,
    /// Credit one energy pulse and reschedule until `remaining` runs out.
    EnergyPulse {
        /// Faction receiving the pulse.
        faction: Faction,
        /// Energy credited per pulse.
        amount: i32,
        /// Pulses left, including this one.
        remaining: u32,
        /// Ticks between pulses.
        interval_ticks: u64,
    },
    /// Wake an AI controller so it can act.
    AiWake {
        /// Faction the controller plays.
        faction: Faction,
    },
}

/// A task waiting on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Cancellation handle.
    pub handle: TaskHandle,
    /// Tick at which the task fires.
    pub fire_at: u64,
    /// Registration sequence number; orders same-tick tasks FIFO.
    pub seq: u64,
    /// The effect to apply.
    pub kind: TaskKind,
}

/// Fixed-tick simulation clock with a one-shot task queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    tick: u64,
    next_handle: u64,
    next_seq: u64,
    tasks: Vec<ScheduledTask>,
}

impl SimClock {
    /// Create a clock at tick zero with no pending tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current tick.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.tick
    }

    /// Advance to the next tick and return it.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Schedule a task to fire `delay_ticks` from now.
    pub fn schedule_in(&mut self, delay_ticks: u64, kind: TaskKind) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(ScheduledTask {
            handle,
            fire_at: self.tick + delay_ticks,
            seq,
            kind,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() < before
    }

    /// Drop every pending task, returning how many were purged.
    ///
    /// Called on match teardown so reverts cannot fire into a dead match.
    pub fn purge(&mut self) -> usize {
        let purged = self.tasks.len();
        self.tasks.clear();
        purged
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Remove and return every task due at or before the current tick,
    /// ordered by (fire tick, registration order).
    pub fn take_due(&mut self) -> Vec<ScheduledTask> {
        let now = self.tick;
        let mut due: Vec<ScheduledTask> =
            self.tasks.iter().copied().filter(|t| t.fire_at <= now).collect();
        self.tasks.retain(|t| t.fire_at > now);
        due.sort_unstable_by_key(|t| (t.fire_at, t.seq));
        due
    }
}
