//! Error types for engine operations.
//!
//! Every validation failure is raised synchronously at the point of
//! detection and leaves engine state untouched. Random outcomes (nobody to
//! rob, a broke neighbor) are normal results, never errors.

/// Errors returned by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A caller-supplied argument is outside its contract.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable description of the rejected argument.
        message: String,
    },

    /// The engine is not in a state that allows the operation.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Human-readable description of the missing precondition.
        message: String,
    },
}

impl EngineError {
    /// Creature count outside `min..=max`.
    pub fn creature_count(n: u32, min: u32, max: u32) -> Self {
        Self::InvalidArgument {
            message: format!("creature count out of range: {n} (expected {min}..={max})"),
        }
    }

    /// Iteration count outside `min..=max`.
    pub fn iteration_count(iterations: u32, min: u32, max: u32) -> Self {
        Self::InvalidArgument {
            message: format!(
                "iteration count out of range: {iterations} (expected {min}..={max})"
            ),
        }
    }

    /// An absent entity was passed where a reference entity is required.
    pub fn null_reference(what: &str) -> Self {
        Self::InvalidArgument {
            message: format!("reference must not be null: {what}"),
        }
    }

    /// `run` was called without a successful `initialize`.
    pub fn not_initialized() -> Self {
        Self::InvalidState {
            message: "simulation was not initialized (guardian absent)".to_owned(),
        }
    }

    /// Returns `true` for [`EngineError::InvalidArgument`].
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` for [`EngineError::InvalidState`].
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_category() {
        assert!(
            EngineError::creature_count(1, 2, 1000)
                .to_string()
                .contains("creature count")
        );
        assert!(
            EngineError::iteration_count(0, 1, 1000)
                .to_string()
                .contains("iteration count")
        );
        assert!(
            EngineError::null_reference("creature")
                .to_string()
                .contains("must not be null")
        );
    }

    #[test]
    fn kind_predicates() {
        assert!(EngineError::creature_count(0, 2, 1000).is_invalid_argument());
        assert!(EngineError::not_initialized().is_invalid_state());
        assert!(!EngineError::not_initialized().is_invalid_argument());
    }
}
