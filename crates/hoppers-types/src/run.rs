//! Run-level request and report types exchanged with outer collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::RunId;
use crate::snapshot::IterationSnapshot;

/// Parameters supplied by a caller to start a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationRequest {
    /// Number of creatures to create (`2..=1000`).
    pub quantity: u32,
    /// Iteration budget (`1..=1000`).
    pub iterations: u32,
    /// Login of the user running the simulation, if any.
    #[serde(default)]
    pub user_login: Option<String>,
}

impl SimulationRequest {
    /// The login to report the outcome against, if it is present and non-blank.
    pub fn reportable_login(&self) -> Option<&str> {
        self.user_login
            .as_deref()
            .map(str::trim)
            .filter(|login| !login.is_empty())
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EndReason {
    /// No free creatures and no clusters remain.
    GuardianAlone,
    /// One free creature remains, with strictly less gold than the guardian.
    GuardianOutgunsLastCreature,
    /// Every iteration ran without reaching a win condition.
    IterationBudgetExhausted,
}

impl EndReason {
    /// Returns `true` for the two win conditions.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::GuardianAlone | Self::GuardianOutgunsLastCreature)
    }
}

/// Full outcome of one run, as handed to the reporting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationReport {
    /// Unique id of this run.
    pub run_id: RunId,
    /// Wall-clock time the run started.
    pub started_at: DateTime<Utc>,
    /// Creature count the run was initialized with.
    pub quantity: u32,
    /// Iteration budget the run was given.
    pub iterations: u32,
    /// Why the run stopped.
    pub end_reason: EndReason,
    /// Whether any snapshot carries the success flag.
    pub success: bool,
    /// Ordered snapshot history.
    pub history: Vec<IterationSnapshot>,
}
