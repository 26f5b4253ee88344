//! In-memory outcome reporter.
//!
//! The [`Scoreboard`] keeps a per-login tally of attempts and successes for
//! the logins listed in `run.known_users`. Any other login is rejected with
//! [`ReportError::UnknownUser`], which the simulation logs and ignores.

use std::collections::BTreeMap;

use hoppers_core::{OutcomeReporter, ReportError};

/// Attempts and successes recorded for one login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Simulations run.
    pub attempts: u64,
    /// Simulations that ended in success.
    pub successes: u64,
}

/// Per-login tallies for registered users.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    tallies: BTreeMap<String, Tally>,
}

impl Scoreboard {
    /// Create a scoreboard accepting the given logins.
    ///
    /// Logins are trimmed; blank entries are ignored.
    pub fn new<I, S>(known_users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tallies = known_users
            .into_iter()
            .map(|login| login.as_ref().trim().to_owned())
            .filter(|login| !login.is_empty())
            .map(|login| (login, Tally::default()))
            .collect();
        Self { tallies }
    }

    /// The tally for `login`, if registered.
    pub fn tally(&self, login: &str) -> Option<Tally> {
        self.tallies.get(login).copied()
    }

    /// Number of registered logins.
    pub fn registered_count(&self) -> usize {
        self.tallies.len()
    }
}

impl OutcomeReporter for Scoreboard {
    fn record_simulation(&mut self, login: &str, success: bool) -> Result<(), ReportError> {
        let tally = self
            .tallies
            .get_mut(login)
            .ok_or_else(|| ReportError::UnknownUser {
                login: login.to_owned(),
            })?;
        tally.attempts = tally.attempts.saturating_add(1);
        if success {
            tally.successes = tally.successes.saturating_add(1);
        }
        Ok(())
    }
}
