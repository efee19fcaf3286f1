//! Solver configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resource limits and search options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum number of product states explored before answering `unknown`
    pub max_states: usize,
    /// Wall-clock budget per check (`None` = unlimited)
    pub timeout: Option<Duration>,
    /// Pick letters before digits and punctuation when building witnesses
    pub prefer_readable: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_states: 4_000_000,
            timeout: None,
            prefer_readable: true,
        }
    }
}

impl SolverConfig {
    /// Set the state budget.
    #[must_use]
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    /// Set the wall-clock budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Toggle readable witness characters.
    #[must_use]
    pub fn with_prefer_readable(mut self, prefer_readable: bool) -> Self {
        self.prefer_readable = prefer_readable;
        self
    }
}
