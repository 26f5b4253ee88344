//! Run orchestration and outcome reporting.
//!
//! [`simulate`] drives one request end to end: initialize, run, assemble a
//! [`SimulationReport`], and notify an [`OutcomeReporter`] when the request
//! names a user. The [`OutcomeReporter`] trait abstracts where outcomes go;
//! it could be a database, a remote scoreboard, or a test double.
//!
//! Reporting is fire-and-forget. A reporter failure is logged at `warn` and
//! never changes the returned report.

use chrono::Utc;
use hoppers_types::{EndReason, RunId, SimulationReport, SimulationRequest};
use tracing::{info, warn};

use crate::config::{MAX_ITERATIONS, MIN_ITERATIONS};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::random::RandomSource;

/// Errors an [`OutcomeReporter`] can raise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// The login is not registered with the reporter.
    #[error("unknown user: {login}")]
    UnknownUser {
        /// The rejected login.
        login: String,
    },

    /// The reporter's backing store could not be reached.
    #[error("reporter unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// A sink for per-user run outcomes.
///
/// [`simulate`] calls [`record_simulation`] at most once per run, after the
/// run has finished, and only for requests with a non-blank login.
///
/// [`record_simulation`]: OutcomeReporter::record_simulation
pub trait OutcomeReporter {
    /// Record that `login` ran a simulation that did or did not succeed.
    ///
    /// `login` is already trimmed and never empty.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the outcome could not be recorded.
    fn record_simulation(&mut self, login: &str, success: bool) -> Result<(), ReportError>;
}

impl<T: OutcomeReporter + ?Sized> OutcomeReporter for &mut T {
    fn record_simulation(&mut self, login: &str, success: bool) -> Result<(), ReportError> {
        (**self).record_simulation(login, success)
    }
}

/// A reporter that accepts and discards every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub const fn new() -> Self {
        Self
    }
}

impl OutcomeReporter for NoOpReporter {
    fn record_simulation(&mut self, _login: &str, _success: bool) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Execute one simulation request on `engine` and report its outcome.
///
/// The engine is re-initialized with `request.quantity` creatures, then run
/// for up to `request.iterations` steps.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] if either count is out of range;
/// the engine's previous session is left untouched in that case. Reporter
/// failures are not errors.
pub fn simulate<R: RandomSource>(
    engine: &mut Engine<R>,
    request: &SimulationRequest,
    reporter: &mut dyn OutcomeReporter,
) -> Result<SimulationReport, EngineError> {
    let run_id = RunId::new();
    let started_at = Utc::now();

    info!(
        run_id = %run_id,
        quantity = request.quantity,
        iterations = request.iterations,
        "Run requested"
    );

    // Both counts are checked before `initialize` discards the prior session.
    if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&request.iterations) {
        return Err(EngineError::iteration_count(
            request.iterations,
            MIN_ITERATIONS,
            MAX_ITERATIONS,
        ));
    }

    engine.initialize(request.quantity)?;
    let history = engine.run(request.iterations)?.to_vec();

    let end_reason = engine
        .end_reason()
        .unwrap_or(EndReason::IterationBudgetExhausted);
    let success = engine.succeeded();

    if let Some(login) = request.reportable_login() {
        match reporter.record_simulation(login, success) {
            Ok(()) => info!(run_id = %run_id, login, success, "Outcome recorded"),
            Err(err) => warn!(run_id = %run_id, login, error = %err, "Failed to record outcome"),
        }
    }

    Ok(SimulationReport {
        run_id,
        started_at,
        quantity: request.quantity,
        iterations: request.iterations,
        end_reason,
        success,
        history,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::random::SeededRandom;

    /// Records every call it receives, optionally failing each one.
    #[derive(Debug, Default)]
    struct RecordingReporter {
        calls: Vec<(String, bool)>,
        fail: bool,
    }

    impl OutcomeReporter for RecordingReporter {
        fn record_simulation(&mut self, login: &str, success: bool) -> Result<(), ReportError> {
            self.calls.push((login.to_owned(), success));
            if self.fail {
                Err(ReportError::Unavailable {
                    message: "offline".to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn request(login: Option<&str>) -> SimulationRequest {
        SimulationRequest {
            quantity: 10,
            iterations: 20,
            user_login: login.map(str::to_owned),
        }
    }

    fn seeded_engine() -> Engine<SeededRandom> {
        Engine::with_random(EngineConfig::default(), SeededRandom::new(7))
    }

    #[test]
    fn trimmed_login_is_reported_once() {
        let mut engine = seeded_engine();
        let mut reporter = RecordingReporter::default();
        let report = simulate(&mut engine, &request(Some("  alice  ")), &mut reporter).unwrap();

        assert_eq!(reporter.calls, vec![("alice".to_owned(), report.success)]);
    }

    #[test]
    fn blank_or_missing_login_skips_reporter() {
        let mut engine = seeded_engine();
        let mut reporter = RecordingReporter::default();
        let _ = simulate(&mut engine, &request(None), &mut reporter).unwrap();
        let _ = simulate(&mut engine, &request(Some("   ")), &mut reporter).unwrap();
        assert!(reporter.calls.is_empty());
    }

    #[test]
    fn reporter_failure_does_not_fail_the_run() {
        let mut engine = seeded_engine();
        let mut reporter = RecordingReporter {
            fail: true,
            ..RecordingReporter::default()
        };
        let report = simulate(&mut engine, &request(Some("bob")), &mut reporter).unwrap();
        assert_eq!(reporter.calls.len(), 1);
        assert!(!report.history.is_empty());
    }

    #[test]
    fn report_mirrors_engine_outcome() {
        let mut engine = seeded_engine();
        let report = simulate(&mut engine, &request(None), &mut NoOpReporter::new()).unwrap();

        assert_eq!(report.quantity, 10);
        assert_eq!(report.iterations, 20);
        assert!(report.history.len() <= 20);
        assert_eq!(report.success, report.end_reason.is_success());
        assert_eq!(Some(report.end_reason), engine.end_reason());
        assert_eq!(report.history.as_slice(), engine.history());
    }

    #[test]
    fn report_serializes_with_snake_case_end_reason() {
        let mut engine = seeded_engine();
        let report = simulate(&mut engine, &request(None), &mut NoOpReporter::new()).unwrap();
        let value = serde_json::to_value(&report).unwrap();

        assert!(value["run_id"].is_string());
        assert!(value["end_reason"].is_string());
        assert_eq!(value["success"], serde_json::Value::Bool(report.success));
        assert_eq!(
            value["history"].as_array().map(Vec::len),
            Some(report.history.len())
        );
    }

    #[test]
    fn invalid_request_is_rejected_before_reporting() {
        let mut engine = seeded_engine();
        let mut reporter = RecordingReporter::default();
        let bad = SimulationRequest {
            quantity: 1,
            iterations: 5,
            user_login: Some("carol".to_owned()),
        };
        let err = simulate(&mut engine, &bad, &mut reporter).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(reporter.calls.is_empty());
    }

    #[test]
    fn invalid_iterations_keep_previous_session() {
        let mut engine = seeded_engine();
        let first = simulate(&mut engine, &request(None), &mut NoOpReporter::new()).unwrap();
        let creatures = engine.creatures().to_vec();
        let guardian = engine.guardian().cloned();

        let bad = SimulationRequest {
            quantity: 5,
            iterations: 0,
            user_login: None,
        };
        let err = simulate(&mut engine, &bad, &mut NoOpReporter::new()).unwrap_err();
        assert!(err.is_invalid_argument());

        assert_eq!(engine.creatures(), creatures.as_slice());
        assert_eq!(engine.guardian().cloned(), guardian);
        assert_eq!(engine.history(), first.history.as_slice());
        assert_eq!(engine.end_reason(), Some(first.end_reason));
    }
}
