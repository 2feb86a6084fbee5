use serde::Serialize;

/// Statistics about one discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryStats {
    /// Directories walked
    pub dirs_scanned: usize,

    /// Directories skipped because they do not exist (or are files)
    pub dirs_missing: usize,

    /// Units added to the change set
    pub units: usize,

    /// Units already present from an earlier directory
    pub duplicates: usize,

    /// Entries the walker could not read
    pub errors: Vec<String>,
}

impl DiscoveryStats {
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }
}
