use impact_protocol::{ChangeUnit, PassResponses};
use serde::Serialize;

/// Per-pass bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// 1-based
    pub pass: usize,
    pub units: usize,
    pub failures: usize,

    /// Units whose affected set differs from the previous pass. Always empty
    /// for pass 1.
    pub changed_units: Vec<ChangeUnit>,
}

/// Result of a full convergence run.
#[derive(Debug, Clone)]
pub struct ConvergenceOutcome {
    /// Responses of the final pass only
    pub responses: PassResponses,
    pub summaries: Vec<PassSummary>,
    pub unstable_units: Vec<ChangeUnit>,
}

impl ConvergenceOutcome {
    pub fn passes(&self) -> usize {
        self.summaries.len()
    }

    /// At least two passes ran and the last one changed nothing.
    pub fn is_converged(&self) -> bool {
        self.passes() >= 2 && self.unstable_units.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.summaries.last().map_or(0, |summary| summary.failures)
    }
}
