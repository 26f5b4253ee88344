//! Shared type definitions for the Hoppers simulation.
//!
//! This crate is the single source of truth for the identifiers and wire
//! records that leave the engine. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for dashboard consumers.
//!
//! # Modules
//!
//! - [`ids`] -- Numeric entity ids and the UUID run id
//! - [`snapshot`] -- Per-iteration snapshot records
//! - [`run`] -- Simulation request, end reason, and run report

pub mod ids;
pub mod run;
pub mod snapshot;

/// Gold is a non-negative integer quantity.
pub type Gold = u64;

// Re-export all public types at crate root for convenience.
pub use ids::{ClusterId, CreatureId, GuardianId, RunId};
pub use run::{EndReason, SimulationReport, SimulationRequest};
pub use snapshot::{ClusterSnapshot, CreatureSnapshot, GuardianSnapshot, IterationSnapshot};
