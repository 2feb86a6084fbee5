use crate::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// What happens when the timestamped name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,
    /// Append `-1`, `-2`, ... before `.txt` until the name is free.
    Unique,
}

impl CollisionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CollisionPolicy::Overwrite => "overwrite",
            CollisionPolicy::Unique => "unique",
        }
    }
}

/// Prefix path of a snapshot: `dir/prefix` yields `dir/prefix<ms>.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTarget {
    dir: PathBuf,
    prefix: OsString,
}

impl SnapshotTarget {
    pub fn new(prefix_path: impl AsRef<Path>) -> Result<Self> {
        let prefix_path = prefix_path.as_ref();
        let prefix = prefix_path
            .file_name()
            .ok_or_else(|| SnapshotError::InvalidTarget(prefix_path.to_path_buf()))?
            .to_os_string();
        let dir = prefix_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self { dir, prefix })
    }

    /// Directory the file lands in; empty for the working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        self.prefix.to_str().unwrap_or_default()
    }

    /// File for `timestamp_ms`, with `attempt > 0` adding a `-<attempt>` suffix.
    pub fn file_for(&self, timestamp_ms: u64, attempt: usize) -> PathBuf {
        let mut name = self.prefix.clone();
        name.push(timestamp_ms.to_string());
        if attempt > 0 {
            name.push(format!("-{attempt}"));
        }
        name.push(".txt");
        self.dir.join(name)
    }
}
