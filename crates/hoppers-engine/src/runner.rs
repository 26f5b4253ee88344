//! Timed execution of one simulation request.
//!
//! The stepping algorithm is CPU-bound and synchronous, so it runs on the
//! blocking pool via [`tokio::task::spawn_blocking`] while the async side
//! enforces the configured wall-clock limit.

use std::time::Duration;

use hoppers_core::config::{EngineConfig, HoppersConfig};
use hoppers_core::random::{RandomSource, SeededRandom, ThreadRandom};
use hoppers_core::{Engine, simulate};
use hoppers_types::SimulationReport;
use tracing::info;

use crate::error::AppError;
use crate::scoreboard::Scoreboard;

/// Engine type used by the harness: the random source is picked at runtime.
pub type HarnessEngine = Engine<Box<dyn RandomSource + Send>>;

/// Build an engine, seeded for reproducibility when `seed` is present.
pub fn build_engine(config: &EngineConfig, seed: Option<u64>) -> HarnessEngine {
    let rng: Box<dyn RandomSource + Send> = match seed {
        Some(seed) => {
            info!(seed, "Using seeded random source");
            Box::new(SeededRandom::new(seed))
        }
        None => Box::new(ThreadRandom::new()),
    };
    Engine::with_random(config.clone(), rng)
}

/// Run `job` on the blocking pool, giving up after `timeout_ms`.
///
/// A timed-out job is detached, not cancelled; it runs to completion in the
/// background.
pub async fn run_blocking<T, F>(timeout_ms: u64, job: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);
    match tokio::time::timeout(Duration::from_millis(timeout_ms), handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AppError::Join {
            message: e.to_string(),
        }),
        Err(_elapsed) => Err(AppError::Timeout { timeout_ms }),
    }
}

/// Execute the configured run and hand the scoreboard back with the report.
///
/// The scoreboard moves into the blocking job. If the run times out, the
/// detached job keeps it and that run's tally is lost; runs are capped at
/// 1000 creatures and 1000 iterations, so the default limit is rarely hit.
pub async fn execute(
    config: &HoppersConfig,
    scoreboard: Scoreboard,
) -> Result<(SimulationReport, Scoreboard), AppError> {
    let mut engine = build_engine(&config.engine, config.run.seed);
    let request = config.run.request();
    let mut scoreboard = scoreboard;

    let (result, scoreboard) = run_blocking(config.run.timeout_ms, move || {
        let result = simulate(&mut engine, &request, &mut scoreboard);
        (result, scoreboard)
    })
    .await?;

    Ok((result?, scoreboard))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hoppers_core::config::RunConfig;

    use super::*;

    fn small_config(seed: Option<u64>) -> HoppersConfig {
        HoppersConfig {
            run: RunConfig {
                quantity: 12,
                iterations: 40,
                user_login: Some("alice".to_owned()),
                seed,
                ..RunConfig::default()
            },
            ..HoppersConfig::default()
        }
    }

    #[tokio::test]
    async fn execute_returns_report_and_updates_scoreboard() {
        let config = small_config(Some(3));
        let (report, board) = execute(&config, Scoreboard::new(["alice"])).await.unwrap();

        assert_eq!(report.quantity, 12);
        assert!(!report.history.is_empty());
        let tally = board.tally("alice").unwrap();
        assert_eq!(tally.attempts, 1);
        assert_eq!(tally.successes, u64::from(report.success));
    }

    #[tokio::test]
    async fn unknown_user_does_not_fail_the_run() {
        let config = small_config(None);
        let (report, board) = execute(&config, Scoreboard::new(["bob"])).await.unwrap();
        assert!(!report.history.is_empty());
        assert_eq!(board.tally("bob").unwrap().attempts, 0);
    }

    #[tokio::test]
    async fn seeded_runs_are_reproducible() {
        let config = small_config(Some(11));
        let (a, _) = execute(&config, Scoreboard::default()).await.unwrap();
        let (b, _) = execute(&config, Scoreboard::default()).await.unwrap();
        assert_eq!(a.history, b.history);
        assert_ne!(a.run_id, b.run_id);
    }

    #[tokio::test]
    async fn invalid_quantity_surfaces_engine_error() {
        let mut config = small_config(None);
        config.run.quantity = 1;
        let err = execute(&config, Scoreboard::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Engine { .. }));
    }

    #[tokio::test]
    async fn slow_job_times_out() {
        let err = run_blocking(10, || std::thread::sleep(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout { timeout_ms: 10 }));
    }

    #[tokio::test]
    async fn timed_out_job_keeps_its_scoreboard() {
        let mut board = Scoreboard::new(["alice"]);
        let result = run_blocking(10, move || {
            std::thread::sleep(Duration::from_millis(200));
            let _ = hoppers_core::OutcomeReporter::record_simulation(&mut board, "alice", true);
            board
        })
        .await;
        assert!(matches!(result, Err(AppError::Timeout { timeout_ms: 10 })));
    }

    #[tokio::test]
    async fn fast_job_returns_value() {
        let value = run_blocking(1_000, || 42).await.unwrap();
        assert_eq!(value, 42);
    }
}
