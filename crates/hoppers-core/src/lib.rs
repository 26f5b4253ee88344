//! Entities, stepping algorithm, and run orchestration for the Hoppers
//! simulation.
//!
//! Creatures hop along a line, rob their nearest neighbor, merge into
//! clusters when they crowd together, and are hunted by a single guardian
//! that absorbs any cluster it reaches.
//!
//! # Modules
//!
//! - [`audit`] -- Gold conservation check run after every step.
//! - [`config`] -- Configuration loading from `hoppers-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- [`Engine`] and the per-step phase sequence.
//! - [`entity`] -- [`Creature`], [`Cluster`], [`Guardian`] and the shared
//!   [`Actor`] behavior.
//! - [`error`] -- [`EngineError`].
//! - [`history`] -- Snapshot assembly and the per-run history.
//! - [`nearest`] -- Distance and nearest-neighbor search.
//! - [`random`] -- [`RandomSource`] trait and its implementations.
//! - [`registry`] -- Per-run id allocation.
//! - [`report`] -- [`simulate`] and the [`OutcomeReporter`] hook.
//!
//! [`Engine`]: engine::Engine
//! [`Creature`]: entity::Creature
//! [`Cluster`]: entity::Cluster
//! [`Guardian`]: entity::Guardian
//! [`Actor`]: entity::Actor
//! [`EngineError`]: error::EngineError
//! [`RandomSource`]: random::RandomSource
//! [`simulate`]: report::simulate
//! [`OutcomeReporter`]: report::OutcomeReporter

pub mod audit;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod history;
pub mod nearest;
pub mod random;
pub mod registry;
pub mod report;

pub use engine::Engine;
pub use error::EngineError;
pub use report::{NoOpReporter, OutcomeReporter, ReportError, simulate};
