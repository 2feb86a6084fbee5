use crate::outcome::{ConvergenceOutcome, PassSummary};
use crate::{ConvergenceError, Result};
use impact_protocol::{AnalysisEngine, ChangeSet, PassResponses, UnitResponse};
use std::fmt;

/// Number of passes over the change set, at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassCount(usize);

impl PassCount {
    pub const WARM_UP: PassCount = PassCount(2);
    pub const COMPARISON: PassCount = PassCount(3);

    pub fn new(passes: usize) -> Result<Self> {
        if passes == 0 {
            return Err(ConvergenceError::InvalidPassCount(passes));
        }
        Ok(Self(passes))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PassCount {
    fn default() -> Self {
        Self::WARM_UP
    }
}

impl fmt::Display for PassCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the driver is between passes.
#[derive(Debug, Clone, Default)]
pub enum DriverState {
    #[default]
    Cold,
    Warming {
        completed: usize,
        previous: PassResponses,
    },
    Converged {
        last: PassResponses,
    },
}

impl DriverState {
    /// Passes finished so far
    pub fn completed(&self) -> usize {
        match self {
            DriverState::Cold => 0,
            DriverState::Warming { completed, .. } => *completed,
            DriverState::Converged { last } => last.pass(),
        }
    }

    fn previous(&self) -> Option<&PassResponses> {
        match self {
            DriverState::Cold => None,
            DriverState::Warming { previous, .. } => Some(previous),
            DriverState::Converged { last } => Some(last),
        }
    }
}

/// Feeds a change set through an engine a fixed number of times.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceDriver {
    passes: PassCount,
    state: DriverState,
}

impl ConvergenceDriver {
    pub fn new(passes: PassCount) -> Self {
        Self {
            passes,
            state: DriverState::Cold,
        }
    }

    pub fn passes(&self) -> PassCount {
        self.passes
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Run every pass. Only an unavailable engine stops the run early.
    pub fn converge<E>(&mut self, mut engine: E, changes: &ChangeSet) -> Result<ConvergenceOutcome>
    where
        E: AnalysisEngine,
    {
        let ordered = changes.sorted();
        let total = self.passes.get();
        let mut summaries = Vec::with_capacity(total);
        self.state = DriverState::Cold;

        log::info!(
            "Converging {} units over {} passes with {}",
            ordered.len(),
            total,
            engine.name()
        );

        for pass in 1..=total {
            let responses = self.run_pass(&mut engine, &ordered, pass)?;
            summaries.push(self.complete_pass(responses, pass == total, total));
        }

        let responses = match &self.state {
            DriverState::Converged { last } => last.clone(),
            _ => PassResponses::new(0),
        };
        let unstable_units = summaries
            .last()
            .map(|summary| summary.changed_units.clone())
            .unwrap_or_default();
        let outcome = ConvergenceOutcome {
            responses,
            summaries,
            unstable_units,
        };
        if total >= 2 && !outcome.is_converged() {
            log::warn!(
                "{} units still changing after pass {}",
                outcome.unstable_units.len(),
                total
            );
        }
        Ok(outcome)
    }

    /// One more pass on an engine this driver has already converged, compared
    /// against the pass before it.
    pub fn next_pass<E>(&mut self, mut engine: E, changes: &ChangeSet) -> Result<(PassResponses, PassSummary)>
    where
        E: AnalysisEngine,
    {
        let ordered = changes.sorted();
        let pass = self.state.completed() + 1;
        let responses = self.run_pass(&mut engine, &ordered, pass)?;
        let summary = self.complete_pass(responses, true, pass);
        match &self.state {
            DriverState::Converged { last } => Ok((last.clone(), summary)),
            _ => Ok((PassResponses::new(pass), summary)),
        }
    }

    /// Compare a finished pass with the previous one and move the state on.
    /// The previous pass is dropped here.
    fn complete_pass(&mut self, responses: PassResponses, last: bool, total: usize) -> PassSummary {
        let pass = responses.pass();
        let changed_units = match self.state.previous() {
            Some(previous) => responses.changed_since(previous),
            None => Vec::new(),
        };
        let summary = PassSummary {
            pass,
            units: responses.len(),
            failures: responses.failures().count(),
            changed_units,
        };
        log::info!(
            "Pass {}/{}: {} units, {} failures, {} changed",
            pass,
            total,
            summary.units,
            summary.failures,
            summary.changed_units.len()
        );

        self.state = if last {
            DriverState::Converged { last: responses }
        } else {
            DriverState::Warming {
                completed: pass,
                previous: responses,
            }
        };
        summary
    }

    fn run_pass<E: AnalysisEngine>(
        &self,
        engine: &mut E,
        ordered: &ChangeSet,
        pass: usize,
    ) -> Result<PassResponses> {
        let mut responses = PassResponses::new(pass);
        for unit in ordered {
            match engine.update(unit) {
                Ok(affected) => responses.record(UnitResponse::ok(unit.clone(), affected)),
                Err(e) if e.is_recoverable() => {
                    log::warn!("Pass {pass}: {e}");
                    responses.record(UnitResponse::failed(unit.clone(), e.to_string()));
                }
                Err(e) => {
                    return Err(ConvergenceError::Engine {
                        engine: engine.name().to_string(),
                        pass,
                        source: e,
                    })
                }
            }
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_protocol::{AffectedSet, ChangeUnit, EngineError};
    use pretty_assertions::assert_eq;

    /// Answers with how many times it has seen the unit, up to a cap.
    struct Counting {
        seen: Vec<String>,
        cap: usize,
    }

    impl AnalysisEngine for Counting {
        fn update(&mut self, unit: &ChangeUnit) -> std::result::Result<AffectedSet, EngineError> {
            let name = unit.path_string();
            self.seen.push(name.clone());
            let count = self.seen.iter().filter(|s| **s == name).count().min(self.cap);
            Ok((0..count).map(|i| format!("{name}#{i}")).collect())
        }
    }

    fn change_set(paths: &[&str]) -> ChangeSet {
        paths.iter().map(|p| ChangeUnit::new(*p)).collect()
    }

    #[test]
    fn pass_count_rejects_zero() {
        assert!(matches!(
            PassCount::new(0),
            Err(ConvergenceError::InvalidPassCount(0))
        ));
        assert_eq!(PassCount::default().get(), 2);
        assert_eq!(PassCount::new(5).unwrap().to_string(), "5");
    }

    #[test]
    fn units_are_fed_in_sorted_order_every_pass() {
        let mut engine = Counting {
            seen: Vec::new(),
            cap: 1,
        };
        let mut driver = ConvergenceDriver::new(PassCount::new(2).unwrap());
        driver
            .converge(&mut engine, &change_set(&["z.class", "a.class", "m.class"]))
            .unwrap();

        assert_eq!(
            engine.seen,
            vec!["a.class", "m.class", "z.class", "a.class", "m.class", "z.class"]
        );
        assert_eq!(driver.state().completed(), 2);
    }

    #[test]
    fn stable_engine_converges_after_two_passes() {
        let engine = Counting {
            seen: Vec::new(),
            cap: 1,
        };
        let outcome = ConvergenceDriver::default()
            .converge(engine, &change_set(&["a.class", "b.class"]))
            .unwrap();

        assert!(outcome.is_converged());
        assert_eq!(outcome.passes(), 2);
        assert!(outcome.summaries[0].changed_units.is_empty());
        assert_eq!(outcome.responses.pass(), 2);
    }

    #[test]
    fn growing_answers_are_reported_unstable() {
        let engine = Counting {
            seen: Vec::new(),
            cap: 3,
        };
        let outcome = ConvergenceDriver::new(PassCount::new(2).unwrap())
            .converge(engine, &change_set(&["a.class"]))
            .unwrap();

        assert!(!outcome.is_converged());
        assert_eq!(outcome.unstable_units, vec![ChangeUnit::new("a.class")]);
    }

    #[test]
    fn single_pass_never_counts_as_converged() {
        let engine = Counting {
            seen: Vec::new(),
            cap: 1,
        };
        let outcome = ConvergenceDriver::new(PassCount::new(1).unwrap())
            .converge(engine, &change_set(&["a.class"]))
            .unwrap();

        assert_eq!(outcome.passes(), 1);
        assert!(outcome.unstable_units.is_empty());
        assert!(!outcome.is_converged());
    }

    #[test]
    fn next_pass_continues_on_the_same_engine() {
        let mut engine = Counting {
            seen: Vec::new(),
            cap: 3,
        };
        let changes = change_set(&["b.class", "a.class"]);
        let mut driver = ConvergenceDriver::new(PassCount::new(1).unwrap());
        let outcome = driver.converge(&mut engine, &changes).unwrap();
        let (responses, summary) = driver.next_pass(&mut engine, &changes).unwrap();

        assert_eq!(responses.pass(), 2);
        assert_eq!(summary.pass, 2);
        assert_eq!(driver.state().completed(), 2);
        assert_eq!(
            summary.changed_units,
            vec![ChangeUnit::new("a.class"), ChangeUnit::new("b.class")]
        );
        let a = ChangeUnit::new("a.class");
        assert_eq!(outcome.responses.affected_for(&a).unwrap().len(), 1);
        assert_eq!(responses.affected_for(&a).unwrap().len(), 2);
        assert_eq!(engine.seen.len(), 4);
    }

    #[test]
    fn empty_change_set_still_runs_every_pass() {
        let engine = Counting {
            seen: Vec::new(),
            cap: 1,
        };
        let outcome = ConvergenceDriver::new(PassCount::COMPARISON)
            .converge(engine, &ChangeSet::new())
            .unwrap();
        assert_eq!(outcome.passes(), 3);
        assert!(outcome.responses.is_empty());
    }
}
