use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// File suffix of a compiled unit.
pub const UNIT_SUFFIX: &str = ".class";

/// One compiled artifact presented to the engine.
///
/// Equality, ordering and hashing only look at the path. Ordering is the
/// lexicographic order of the path *string*, which is not the same as
/// `Path`'s component-wise order (`a.b` sorts before `a/b`).
#[derive(Debug, Clone)]
pub struct ChangeUnit {
    path: PathBuf,
    output_dir: Option<PathBuf>,
}

impl ChangeUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            output_dir: None,
        }
    }

    /// Unit discovered under `output_dir`; the relative path becomes the unit name.
    pub fn with_output_dir(path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            output_dir: Some(output_dir.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Dotted name relative to the output directory (`com/acme/Foo.class` -> `com.acme.Foo`).
    ///
    /// Falls back to the file stem when the unit has no output directory or
    /// does not live under it.
    pub fn unit_name(&self) -> String {
        let relative = self
            .output_dir
            .as_deref()
            .and_then(|dir| self.path.strip_prefix(dir).ok());

        match relative {
            Some(rel) => {
                let rel = rel.to_string_lossy().replace('\\', "/");
                let trimmed = rel.strip_suffix(UNIT_SUFFIX).unwrap_or(&rel);
                trimmed.trim_start_matches('/').replace('/', ".")
            }
            None => self
                .path
                .file_name()
                .map(|name| {
                    let name = name.to_string_lossy();
                    name.strip_suffix(UNIT_SUFFIX).unwrap_or(&name).to_string()
                })
                .unwrap_or_default(),
        }
    }
}

impl PartialEq for ChangeUnit {
    fn eq(&self, other: &Self) -> bool {
        self.path.as_os_str() == other.path.as_os_str()
    }
}

impl Eq for ChangeUnit {}

impl Hash for ChangeUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.as_os_str().hash(state);
    }
}

impl Ord for ChangeUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .to_string_lossy()
            .cmp(&other.path.to_string_lossy())
            .then_with(|| self.path.as_os_str().cmp(other.path.as_os_str()))
    }
}

impl PartialOrd for ChangeUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ChangeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Serialize for ChangeUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path_string())
    }
}

/// Ordered change list. A path is kept once; the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    units: Vec<ChangeUnit>,
    seen: HashSet<ChangeUnit>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `unit`; returns `false` if the path was already present.
    pub fn push(&mut self, unit: ChangeUnit) -> bool {
        if !self.seen.insert(unit.clone()) {
            return false;
        }
        self.units.push(unit);
        true
    }

    pub fn contains(&self, unit: &ChangeUnit) -> bool {
        self.seen.contains(unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[ChangeUnit] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeUnit> {
        self.units.iter()
    }

    /// Copy of this set in ascending path-string order.
    #[must_use]
    pub fn sorted(&self) -> ChangeSet {
        self.clone().into_sorted()
    }

    #[must_use]
    pub fn into_sorted(mut self) -> ChangeSet {
        self.units.sort();
        self
    }

    pub fn is_sorted(&self) -> bool {
        self.units.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

impl Extend<ChangeUnit> for ChangeSet {
    fn extend<I: IntoIterator<Item = ChangeUnit>>(&mut self, iter: I) {
        for unit in iter {
            self.push(unit);
        }
    }
}

impl FromIterator<ChangeUnit> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ChangeUnit>>(iter: I) -> Self {
        let mut set = ChangeSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeUnit;
    type IntoIter = std::slice::Iter<'a, ChangeUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.units.iter())
    }
}
