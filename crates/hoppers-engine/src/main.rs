//! Command-line harness for the Hoppers simulation.
//!
//! Loads configuration, runs one simulation on the blocking pool under a
//! wall-clock limit, and prints the resulting report as pretty JSON on
//! stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hoppers-config.yaml` (or `HOPPERS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the local scoreboard from `run.known_users`
//! 4. Run the simulation with the configured timeout
//! 5. Print the report and log the outcome

mod error;
mod runner;
mod scoreboard;

use std::io::Write as _;
use std::path::PathBuf;

use hoppers_core::config::HoppersConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::scoreboard::Scoreboard;

/// Application entry point for the harness.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the run is rejected or
/// times out, or the report cannot be written.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so any message about
    //    the source is deferred until the subscriber is installed.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("hoppers-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        quantity = config.run.quantity,
        iterations = config.run.iterations,
        seed = ?config.run.seed,
        timeout_ms = config.run.timeout_ms,
        starting_gold = config.engine.starting_gold,
        elimination = config.engine.elimination.enabled,
        "Run parameters"
    );

    // 3. Build the scoreboard.
    let scoreboard = Scoreboard::new(&config.run.known_users);
    info!(known_users = scoreboard.registered_count(), "Scoreboard ready");

    // 4. Run.
    let (report, scoreboard) = runner::execute(&config, scoreboard).await?;

    // 5. Print and log.
    let json = serde_json::to_string_pretty(&report).map_err(AppError::from)?;
    writeln!(std::io::stdout().lock(), "{json}")?;

    info!(
        run_id = %report.run_id,
        end_reason = ?report.end_reason,
        success = report.success,
        steps = report.history.len(),
        "hoppers-engine finished"
    );
    let request = config.run.request();
    if let Some((login, tally)) = request
        .reportable_login()
        .and_then(|login| scoreboard.tally(login).map(|tally| (login, tally)))
    {
        info!(
            login,
            attempts = tally.attempts,
            successes = tally.successes,
            "Scoreboard updated"
        );
    }

    Ok(())
}

/// Load configuration, returning the file it came from.
///
/// The path is `HOPPERS_CONFIG` when set, `hoppers-config.yaml` otherwise.
/// A missing file yields defaults with environment overrides applied.
fn load_config() -> Result<(HoppersConfig, Option<PathBuf>), AppError> {
    let path = std::env::var_os("HOPPERS_CONFIG")
        .map_or_else(|| PathBuf::from("hoppers-config.yaml"), PathBuf::from);

    if path.exists() {
        let config = HoppersConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = HoppersConfig::default();
        config
            .run
            .apply_overrides(|key| std::env::var(key).ok())?;
        Ok((config, None))
    }
}
