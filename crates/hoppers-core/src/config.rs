//! Configuration loading and typed config structures for the Hoppers simulation.
//!
//! The canonical configuration lives in `hoppers-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//!
//! The input contract bounds ([`MIN_CREATURES`], [`MAX_CREATURES`],
//! [`MIN_ITERATIONS`], [`MAX_ITERATIONS`]) are constants, not configuration.

use std::path::Path;

use hoppers_types::{Gold, SimulationRequest};
use serde::Deserialize;

/// Smallest accepted creature count.
pub const MIN_CREATURES: u32 = 2;

/// Largest accepted creature count.
pub const MAX_CREATURES: u32 = 1000;

/// Smallest accepted iteration budget.
pub const MIN_ITERATIONS: u32 = 1;

/// Largest accepted iteration budget.
pub const MAX_ITERATIONS: u32 = 1000;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value: {reason}")]
    Invalid {
        /// Which value was rejected and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `hoppers-config.yaml`. Every field has a default
/// so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HoppersConfig {
    /// Rule-set parameters for the engine.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Parameters for the command-line run.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HoppersConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override the `run` section:
    /// - `HOPPERS_QUANTITY` overrides `run.quantity`
    /// - `HOPPERS_ITERATIONS` overrides `run.iterations`
    /// - `HOPPERS_USER` overrides `run.user_login`
    /// - `HOPPERS_SEED` overrides `run.seed`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.run.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects a completely empty document for a mapping type.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.engine.validate()?;
        Ok(config)
    }
}

/// Rule-set parameters for the stepping algorithm.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Gold given to every creature and the guardian at initialization.
    #[serde(default = "default_starting_gold")]
    pub starting_gold: Gold,

    /// Maximum distance from a group's anchor for a creature to join it.
    #[serde(default = "default_cluster_tolerance")]
    pub cluster_tolerance: f64,

    /// Maximum distance at which the guardian absorbs a cluster.
    ///
    /// `0.0` means exact co-location (within floating-point noise).
    #[serde(default = "default_absorption_radius")]
    pub absorption_radius: f64,

    /// Low-gold elimination policy.
    #[serde(default)]
    pub elimination: EliminationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_gold: default_starting_gold(),
            cluster_tolerance: default_cluster_tolerance(),
            absorption_radius: default_absorption_radius(),
            elimination: EliminationPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Check that every value is usable by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_gold == 0 {
            return Err(ConfigError::Invalid {
                reason: "engine.starting_gold must be positive".to_owned(),
            });
        }
        check_distance("engine.cluster_tolerance", self.cluster_tolerance)?;
        check_distance("engine.absorption_radius", self.absorption_radius)?;
        Ok(())
    }
}

fn check_distance(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be a finite, non-negative distance (got {value})"),
        })
    }
}

/// Removal of free creatures whose gold drops below a floor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EliminationPolicy {
    /// Whether the elimination phase runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Creatures holding strictly less than this are removed.
    #[serde(default = "default_gold_floor")]
    pub gold_floor: Gold,
}

impl Default for EliminationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            gold_floor: default_gold_floor(),
        }
    }
}

impl EliminationPolicy {
    /// Policy that never removes anyone.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            gold_floor: 0,
        }
    }
}

/// Parameters for a single command-line run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Creature count.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Iteration budget.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Login to report the outcome against.
    #[serde(default)]
    pub user_login: Option<String>,

    /// Seed for a reproducible run; unseeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Wall-clock limit for the whole run, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Logins the local scoreboard accepts.
    #[serde(default)]
    pub known_users: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            quantity: default_quantity(),
            iterations: default_iterations(),
            user_login: None,
            seed: None,
            timeout_ms: default_timeout_ms(),
            known_users: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Apply `HOPPERS_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HOPPERS_QUANTITY") {
            self.quantity = parse_override("HOPPERS_QUANTITY", &val)?;
        }
        if let Some(val) = lookup("HOPPERS_ITERATIONS") {
            self.iterations = parse_override("HOPPERS_ITERATIONS", &val)?;
        }
        if let Some(val) = lookup("HOPPERS_USER") {
            self.user_login = Some(val);
        }
        if let Some(val) = lookup("HOPPERS_SEED") {
            self.seed = Some(parse_override("HOPPERS_SEED", &val)?);
        }
        Ok(())
    }

    /// The simulation request described by this run section.
    pub fn request(&self) -> SimulationRequest {
        SimulationRequest {
            quantity: self.quantity,
            iterations: self.iterations,
            user_login: self.user_login.clone(),
        }
    }
}

fn parse_override<T: core::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: core::fmt::Display,
{
    raw.trim().parse().map_err(|e| ConfigError::Invalid {
        reason: format!("{key}={raw:?}: {e}"),
    })
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_starting_gold() -> Gold {
    1_000_000
}

const fn default_cluster_tolerance() -> f64 {
    5_000.0
}

const fn default_absorption_radius() -> f64 {
    500_000.0
}

const fn default_gold_floor() -> Gold {
    300_000
}

const fn default_quantity() -> u32 {
    50
}

const fn default_iterations() -> u32 {
    100
}

const fn default_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_matches_rule_set() {
        let config = HoppersConfig::default();
        assert_eq!(config.engine.starting_gold, 1_000_000);
        assert!((config.engine.cluster_tolerance - 5_000.0).abs() < f64::EPSILON);
        assert!((config.engine.absorption_radius - 500_000.0).abs() < f64::EPSILON);
        assert!(config.engine.elimination.enabled);
        assert_eq!(config.engine.elimination.gold_floor, 300_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
engine:
  starting_gold: 500
  cluster_tolerance: 0.5
  absorption_radius: 0.0
  elimination:
    enabled: false
    gold_floor: 10

run:
  quantity: 12
  iterations: 40
  user_login: "ana"
  seed: 99
  timeout_ms: 1000
  known_users:
    - ana
    - bruno

logging:
  level: "debug"
"#;
        let config = HoppersConfig::parse(yaml).unwrap();
        assert_eq!(config.engine.starting_gold, 500);
        assert!(!config.engine.elimination.enabled);
        assert_eq!(config.run.quantity, 12);
        assert_eq!(config.run.seed, Some(99));
        assert_eq!(config.run.known_users.len(), 2);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = HoppersConfig::parse("run:\n  quantity: 7\n").unwrap();
        assert_eq!(config.run.quantity, 7);
        // Everything else uses defaults
        assert_eq!(config.run.iterations, 100);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(HoppersConfig::parse("").is_ok());
    }

    #[test]
    fn rejects_negative_tolerance() {
        let err = HoppersConfig::parse("engine:\n  cluster_tolerance: -1.0\n");
        assert!(matches!(err, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_zero_starting_gold() {
        let err = HoppersConfig::parse("engine:\n  starting_gold: 0\n");
        assert!(matches!(err, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn overrides_replace_run_values() {
        let env: BTreeMap<&str, &str> = [
            ("HOPPERS_QUANTITY", "30"),
            ("HOPPERS_ITERATIONS", " 8 "),
            ("HOPPERS_USER", "carla"),
            ("HOPPERS_SEED", "5"),
        ]
        .into_iter()
        .collect();

        let mut run = RunConfig::default();
        run.apply_overrides(|k| env.get(k).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(run.quantity, 30);
        assert_eq!(run.iterations, 8);
        assert_eq!(run.user_login.as_deref(), Some("carla"));
        assert_eq!(run.seed, Some(5));
        assert_eq!(run.request().quantity, 30);
    }

    #[test]
    fn malformed_override_is_an_error() {
        let mut run = RunConfig::default();
        let result = run.apply_overrides(|k| (k == "HOPPERS_QUANTITY").then(|| "many".to_owned()));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        assert_eq!(run.quantity, 50);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("hoppers-config.yaml");
        if path.exists() {
            let config = HoppersConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
