use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// A unit reported by the engine as impacted, identified by its display string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AffectedUnit(String);

impl AffectedUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AffectedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AffectedUnit {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AffectedUnit {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Units affected by one change, in whatever order the engine produced them.
///
/// Duplicates are dropped on insert. Equality is set equality; use
/// [`AffectedSet::sorted`] whenever order matters.
#[derive(Debug, Clone, Default)]
pub struct AffectedSet {
    units: Vec<AffectedUnit>,
}

impl AffectedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: impl Into<AffectedUnit>) -> bool {
        let unit = unit.into();
        if self.units.contains(&unit) {
            return false;
        }
        self.units.push(unit);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.iter().any(|unit| unit.as_str() == name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Engine order.
    pub fn iter(&self) -> std::slice::Iter<'_, AffectedUnit> {
        self.units.iter()
    }

    /// Ascending by display string.
    pub fn sorted(&self) -> Vec<&AffectedUnit> {
        let mut sorted: Vec<&AffectedUnit> = self.units.iter().collect();
        sorted.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        sorted
    }

    pub fn is_superset_of(&self, other: &AffectedSet) -> bool {
        other.units.iter().all(|unit| self.units.contains(unit))
    }
}

impl PartialEq for AffectedSet {
    fn eq(&self, other: &Self) -> bool {
        if self.units.len() != other.units.len() {
            return false;
        }
        let mine: HashSet<&AffectedUnit> = self.units.iter().collect();
        other.units.iter().all(|unit| mine.contains(unit))
    }
}

impl Eq for AffectedSet {}

impl<T: Into<AffectedUnit>> FromIterator<T> for AffectedSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = AffectedSet::new();
        for unit in iter {
            set.insert(unit);
        }
        set
    }
}

impl<'a> IntoIterator for &'a AffectedSet {
    type Item = &'a AffectedUnit;
    type IntoIter = std::slice::Iter<'a, AffectedUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl Serialize for AffectedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}
