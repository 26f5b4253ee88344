//! Gold conservation audit.
//!
//! Gold never enters the simulation after initialization. Theft and guardian
//! absorption only move it between entities; low-gold elimination is the
//! only sink. For every step the audit therefore checks:
//!
//! ```text
//! live_gold + destroyed_gold == initial_gold
//! ```
//!
//! The check holds by construction. A violation produces a [`GoldAnomaly`],
//! which the engine logs; it never aborts a run.

use hoppers_types::Gold;

/// The result of auditing one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// Every unit of gold is accounted for.
    Balanced,
    /// Live plus destroyed gold differs from the initial total.
    Anomaly(GoldAnomaly),
}

/// A conservation violation detected after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldAnomaly {
    /// The step where the anomaly was detected.
    pub iteration: u32,
    /// Gold present at initialization.
    pub initial: Gold,
    /// Gold held by live entities after the step.
    pub live: Gold,
    /// Gold removed by elimination so far.
    pub destroyed: Gold,
    /// Human-readable description.
    pub message: String,
}

impl core::fmt::Display for GoldAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Verify gold conservation for one step.
pub fn verify_gold(iteration: u32, initial: Gold, live: Gold, destroyed: Gold) -> AuditResult {
    let Some(accounted) = live.checked_add(destroyed) else {
        return AuditResult::Anomaly(GoldAnomaly {
            iteration,
            initial,
            live,
            destroyed,
            message: format!("GOLD_ANOMALY at iteration {iteration}: overflow summing live and destroyed gold"),
        });
    };

    if accounted == initial {
        AuditResult::Balanced
    } else {
        AuditResult::Anomaly(GoldAnomaly {
            iteration,
            initial,
            live,
            destroyed,
            message: format!(
                "GOLD_ANOMALY at iteration {iteration}: live {live} + destroyed {destroyed} != initial {initial}"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_when_everything_is_accounted_for() {
        assert_eq!(verify_gold(1, 3_000, 2_500, 500), AuditResult::Balanced);
        assert_eq!(verify_gold(1, 3_000, 3_000, 0), AuditResult::Balanced);
    }

    #[test]
    fn created_gold_is_an_anomaly() {
        let result = verify_gold(4, 3_000, 3_001, 0);
        assert!(matches!(result, AuditResult::Anomaly(_)));
        if let AuditResult::Anomaly(a) = result {
            assert_eq!(a.iteration, 4);
            assert!(a.message.contains("GOLD_ANOMALY"));
        }
    }

    #[test]
    fn lost_gold_is_an_anomaly() {
        assert!(matches!(
            verify_gold(2, 3_000, 1_000, 1_000),
            AuditResult::Anomaly(_)
        ));
    }

    #[test]
    fn overflow_is_an_anomaly() {
        assert!(matches!(
            verify_gold(1, 0, Gold::MAX, 1),
            AuditResult::Anomaly(_)
        ));
    }
}
