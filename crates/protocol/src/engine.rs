use crate::{AffectedSet, ChangeUnit};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Analysis of {unit} failed: {reason}")]
    UnitFailed { unit: String, reason: String },

    #[error("IO error while analysing {unit}: {source}")]
    Io {
        unit: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine as a whole can no longer answer; the run must stop.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    pub fn unit_failed(unit: &ChangeUnit, reason: impl Into<String>) -> Self {
        EngineError::UnitFailed {
            unit: unit.path_string(),
            reason: reason.into(),
        }
    }

    pub fn io(unit: &ChangeUnit, source: std::io::Error) -> Self {
        EngineError::Io {
            unit: unit.path_string(),
            source,
        }
    }

    /// Per-unit failures are recoverable; an unavailable engine is not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Unavailable(_))
    }
}

/// Incremental dependency analysis engine.
///
/// Each call registers one changed unit and answers with the units it
/// currently affects. Implementations keep whatever state they need between
/// calls; callers never look inside it. `&mut self` keeps updates strictly
/// sequential.
pub trait AnalysisEngine {
    fn update(&mut self, unit: &ChangeUnit) -> Result<AffectedSet, EngineError>;

    fn name(&self) -> &str {
        "engine"
    }
}

impl<T: AnalysisEngine + ?Sized> AnalysisEngine for &mut T {
    fn update(&mut self, unit: &ChangeUnit) -> Result<AffectedSet, EngineError> {
        (**self).update(unit)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: AnalysisEngine + ?Sized> AnalysisEngine for Box<T> {
    fn update(&mut self, unit: &ChangeUnit) -> Result<AffectedSet, EngineError> {
        (**self).update(unit)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Engine answer for one unit in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct UnitResponse {
    pub unit: ChangeUnit,
    pub affected: AffectedSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl UnitResponse {
    pub fn ok(unit: ChangeUnit, affected: AffectedSet) -> Self {
        Self {
            unit,
            affected,
            failure: None,
        }
    }

    /// Failed analysis: recorded with an empty affected set.
    pub fn failed(unit: ChangeUnit, reason: impl Into<String>) -> Self {
        Self {
            unit,
            affected: AffectedSet::new(),
            failure: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// All responses of one pass, in presentation order.
#[derive(Debug, Clone, Default)]
pub struct PassResponses {
    pass: usize,
    responses: Vec<UnitResponse>,
    index: HashMap<ChangeUnit, usize>,
}

impl PassResponses {
    pub fn new(pass: usize) -> Self {
        Self {
            pass,
            ..Self::default()
        }
    }

    /// 1-based pass number.
    pub fn pass(&self) -> usize {
        self.pass
    }

    /// Record a response; a second response for the same unit replaces the first.
    pub fn record(&mut self, response: UnitResponse) {
        match self.index.get(&response.unit) {
            Some(&slot) => self.responses[slot] = response,
            None => {
                self.index.insert(response.unit.clone(), self.responses.len());
                self.responses.push(response);
            }
        }
    }

    pub fn get(&self, unit: &ChangeUnit) -> Option<&UnitResponse> {
        self.index.get(unit).map(|&slot| &self.responses[slot])
    }

    pub fn affected_for(&self, unit: &ChangeUnit) -> Option<&AffectedSet> {
        self.get(unit).map(|response| &response.affected)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnitResponse> {
        self.responses.iter()
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitResponse> {
        self.responses.iter().filter(|response| response.is_failure())
    }

    /// Units whose affected set differs from `previous` (or that `previous` lacks).
    pub fn changed_since(&self, previous: &PassResponses) -> Vec<ChangeUnit> {
        self.responses
            .iter()
            .filter(|response| previous.affected_for(&response.unit) != Some(&response.affected))
            .map(|response| response.unit.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a PassResponses {
    type Item = &'a UnitResponse;
    type IntoIter = std::slice::Iter<'a, UnitResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}
