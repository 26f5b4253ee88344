//! Snapshot assembly and the per-run history.
//!
//! While a step runs, the engine fills a [`StepRecord`] with who robbed whom
//! and what the guardian absorbed. [`capture`] then combines that record with
//! the live entity lists into an [`IterationSnapshot`], which is appended to
//! the [`History`].

use std::collections::BTreeMap;

use hoppers_types::{
    ClusterId, ClusterSnapshot, CreatureId, CreatureSnapshot, GuardianSnapshot, IterationSnapshot,
};

use crate::entity::{Actor, Cluster, Creature, Guardian};

/// Bookkeeping collected while one step runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRecord {
    /// Individual thefts: thief -> victim.
    pub creature_thefts: BTreeMap<CreatureId, CreatureId>,
    /// Cluster thefts: cluster -> victim.
    pub cluster_thefts: BTreeMap<ClusterId, CreatureId>,
    /// Clusters formed this step, in formation order.
    pub formed: Vec<ClusterId>,
    /// Free creatures removed for holding too little gold.
    pub starved: Vec<CreatureId>,
    /// Cluster absorbed by the guardian this step.
    pub eliminated_cluster: Option<ClusterId>,
}

/// Build the snapshot for one finished step. The success flag starts `false`.
pub fn capture(
    iteration: u32,
    creatures: &[Creature],
    clusters: &[Cluster],
    guardian: &Guardian,
    record: &StepRecord,
) -> IterationSnapshot {
    IterationSnapshot {
        iteration,
        creatures: creatures
            .iter()
            .map(|c| CreatureSnapshot {
                id: c.id(),
                gold: c.gold(),
                position: c.position(),
                robbed_id: record.creature_thefts.get(&c.id()).copied(),
            })
            .collect(),
        clusters: clusters
            .iter()
            .map(|c| ClusterSnapshot {
                cluster_id: c.id(),
                member_ids: c.members().to_vec(),
                gold: c.gold(),
                position: c.position(),
                robbed_id: record.cluster_thefts.get(&c.id()).copied(),
            })
            .collect(),
        guardian: GuardianSnapshot {
            id: guardian.id(),
            gold: guardian.gold(),
            position: guardian.position(),
            eliminated_cluster_id: record.eliminated_cluster,
        },
        success: false,
    }
}

/// Ordered snapshots of the current run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    snapshots: Vec<IterationSnapshot>,
}

impl History {
    /// Create an empty history.
    pub const fn new() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }

    /// Drop every recorded snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Append a snapshot.
    pub fn push(&mut self, snapshot: IterationSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Set the success flag on the last snapshot only. No-op when empty.
    pub fn mark_success(&mut self) {
        if let Some(last) = self.snapshots.last_mut() {
            last.success = true;
        }
    }

    /// Returns `true` if any snapshot carries the success flag.
    pub fn any_success(&self) -> bool {
        self.snapshots.iter().any(|s| s.success)
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[IterationSnapshot] {
        &self.snapshots
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
