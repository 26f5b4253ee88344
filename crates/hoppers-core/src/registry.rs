//! Per-run id allocation.
//!
//! One monotonically increasing counter hands out every id in a run:
//! creatures take `1..=n`, the guardian takes `n + 1`, and clusters take
//! the ids after that in formation order. Ids are never reused, so a cluster
//! id can never collide with a creature or guardian id of the same run.

use hoppers_types::{ClusterId, CreatureId, GuardianId};

/// Allocates ids for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRegistry {
    next: u32,
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdRegistry {
    /// Create a registry whose first id is `1`.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Restart allocation at `1`.
    pub const fn reset(&mut self) {
        self.next = 1;
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    /// Allocate the next creature id.
    pub fn next_creature(&mut self) -> CreatureId {
        CreatureId(self.allocate())
    }

    /// Allocate the guardian id.
    pub fn next_guardian(&mut self) -> GuardianId {
        GuardianId(self.allocate())
    }

    /// Allocate the next cluster id.
    pub fn next_cluster(&mut self) -> ClusterId {
        ClusterId(self.allocate())
    }
}
