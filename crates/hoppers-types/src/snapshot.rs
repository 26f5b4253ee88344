//! Per-iteration snapshot records.
//!
//! A snapshot is the recorded state of every live entity after one full
//! simulation step. Snapshots are immutable once appended to the history;
//! the only post-hoc mutation is the success flag on the final record.
//!
//! Absent ids (nobody robbed, nothing eliminated) travel over the wire as
//! `-1`, see [`sentinel`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::Gold;
use crate::ids::{ClusterId, CreatureId, GuardianId};

/// Serde adapter that encodes `Option<Id>` as the id number or `-1`.
///
/// Any negative value decodes back to `None`.
pub mod sentinel {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Wire value used for an absent id.
    pub const NONE: i64 = -1;

    /// Serialize an optional id as its number, or [`NONE`].
    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Copy + Into<u32>,
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_i64(i64::from((*id).into())),
            None => serializer.serialize_i64(NONE),
        }
    }

    /// Deserialize an id number, mapping negative values to `None`.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: From<u32>,
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            return Ok(None);
        }
        u32::try_from(raw)
            .map(|v| Some(T::from(v)))
            .map_err(|e| D::Error::custom(format!("id out of range: {e}")))
    }
}

/// State of one free creature at the end of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreatureSnapshot {
    /// Creature id.
    pub id: CreatureId,
    /// Gold held after the step.
    #[ts(type = "number")]
    pub gold: Gold,
    /// Position after the step.
    pub position: f64,
    /// Creature robbed during the individual theft phase, if any.
    #[serde(with = "sentinel")]
    #[ts(type = "number")]
    pub robbed_id: Option<CreatureId>,
}

/// State of one live cluster at the end of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusterSnapshot {
    /// Opaque cluster id.
    pub cluster_id: ClusterId,
    /// Ids of the merged creatures, in merge order.
    pub member_ids: Vec<CreatureId>,
    /// Pooled gold after the step.
    #[ts(type = "number")]
    pub gold: Gold,
    /// Shared position after the step.
    pub position: f64,
    /// Creature robbed during the cluster theft phase, if any.
    #[serde(with = "sentinel")]
    #[ts(type = "number")]
    pub robbed_id: Option<CreatureId>,
}

/// State of the guardian at the end of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GuardianSnapshot {
    /// Guardian id (`n + 1`).
    pub id: GuardianId,
    /// Gold held after the step, including absorbed clusters.
    #[ts(type = "number")]
    pub gold: Gold,
    /// Position after the step.
    pub position: f64,
    /// Cluster absorbed during this step, if any.
    #[serde(with = "sentinel")]
    #[ts(type = "number")]
    pub eliminated_cluster_id: Option<ClusterId>,
}

/// Everything recorded for one simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IterationSnapshot {
    /// 1-based step number.
    pub iteration: u32,
    /// Free creatures alive after the step, ascending by id.
    pub creatures: Vec<CreatureSnapshot>,
    /// Live clusters after the step, in formation order.
    pub clusters: Vec<ClusterSnapshot>,
    /// The guardian after the step.
    pub guardian: GuardianSnapshot,
    /// Set only on the final snapshot of a run that reached a win condition.
    pub success: bool,
}

impl IterationSnapshot {
    /// Sum of gold held by every entity in this snapshot.
    pub fn total_gold(&self) -> Gold {
        let creatures = self
            .creatures
            .iter()
            .fold(0_u64, |acc, c| acc.saturating_add(c.gold));
        let clusters = self
            .clusters
            .iter()
            .fold(0_u64, |acc, c| acc.saturating_add(c.gold));
        creatures
            .saturating_add(clusters)
            .saturating_add(self.guardian.gold)
    }

    /// Returns `true` if `id` appears in any cluster's member list.
    pub fn is_clustered(&self, id: CreatureId) -> bool {
        self.clusters.iter().any(|c| c.member_ids.contains(&id))
    }
}
