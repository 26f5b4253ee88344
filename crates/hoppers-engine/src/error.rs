//! Error types for the command-line harness.
//!
//! [`AppError`] is the top-level error type that wraps every failure mode
//! between loading configuration and printing the report.

/// Top-level error for the harness binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hoppers_core::config::ConfigError,
    },

    /// The engine rejected the request.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: hoppers_core::EngineError,
    },

    /// The run did not finish within its wall-clock limit.
    #[error("simulation timed out after {timeout_ms}ms")]
    Timeout {
        /// The limit that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// The blocking simulation task panicked or was cancelled.
    #[error("simulation task failed: {message}")]
    Join {
        /// Description of the join failure.
        message: String,
    },

    /// The report could not be serialized.
    #[error("output error: {source}")]
    Output {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
