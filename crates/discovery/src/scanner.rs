use crate::{DiscoveryError, DiscoveryStats, Result};
use impact_protocol::{ChangeSet, ChangeUnit};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File names treated as compiled units.
pub const DEFAULT_UNIT_PATTERN: &str = r"^.*\.class$";

static DEFAULT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_UNIT_PATTERN).expect("default unit pattern compiles"));

/// Change set plus what it took to build it.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub change_set: ChangeSet,
    pub stats: DiscoveryStats,
}

/// Recursive finder for compiled units
#[derive(Debug, Clone)]
pub struct ChangeSetDiscovery {
    pattern: Regex,
}

impl Default for ChangeSetDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeSetDiscovery {
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }

    /// Match file names against `pattern` instead of `.*\.class`.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Units under every directory of `dirs`, in walk order.
    pub fn discover<P: AsRef<Path>>(&self, dirs: &[P]) -> ChangeSet {
        self.discover_report(dirs).change_set
    }

    pub fn discover_report<P: AsRef<Path>>(&self, dirs: &[P]) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        for dir in dirs {
            self.collect_dir(dir.as_ref(), &mut report);
        }

        log::info!(
            "Found {} compiled units in {} directories ({} missing)",
            report.stats.units,
            report.stats.dirs_scanned,
            report.stats.dirs_missing
        );
        report
    }

    fn collect_dir(&self, dir: &Path, report: &mut DiscoveryReport) {
        if !dir.is_dir() {
            log::debug!("Skipping {}: not a directory", dir.display());
            report.stats.dirs_missing += 1;
            return;
        }

        // canonical roots make `./classes` and `classes` yield the same unit paths
        let root: PathBuf = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        report.stats.dirs_scanned += 1;

        for result in WalkDir::new(&root).follow_links(false) {
            match result {
                Ok(entry) => {
                    // a link to a regular file counts, under the link's own path
                    let is_file = entry.file_type().is_file()
                        || (entry.path_is_symlink() && entry.path().is_file());
                    if !is_file {
                        continue;
                    }
                    if !self.is_unit_file(&entry.file_name().to_string_lossy()) {
                        continue;
                    }

                    let unit = ChangeUnit::with_output_dir(entry.into_path(), &root);
                    if report.change_set.push(unit) {
                        report.stats.units += 1;
                    } else {
                        report.stats.duplicates += 1;
                    }
                }
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    report.stats.add_error(e.to_string());
                }
            }
        }
    }

    fn is_unit_file(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}
