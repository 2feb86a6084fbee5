use std::path::{Path, PathBuf};

/// Separator between classpath entries on this platform.
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Non-empty entries of a classpath string, in order.
pub fn classpath_entries(classpath: &str) -> impl Iterator<Item = &str> {
    classpath
        .split(PATH_SEPARATOR)
        .filter(|entry| !entry.is_empty())
}

/// Resolve `entry` against `working_directory` unless it is already absolute.
pub(crate) fn resolve_entry(working_directory: &Path, entry: &str) -> PathBuf {
    let path = Path::new(entry);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_directory.join(path)
    }
}

/// An entry exists when it is found at the file system root or relative to the
/// working directory.
pub(crate) fn entry_exists(working_directory: &Path, entry: &str) -> bool {
    Path::new(entry).exists() || working_directory.join(entry).exists()
}

/// How the engine's own runtime artifact is recognised on a classpath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeMarker {
    /// Class file expected inside a directory entry.
    pub class_file: String,
    /// Substring expected in the file name of an archive entry.
    pub artifact_hint: String,
}

impl Default for RuntimeMarker {
    fn default() -> Self {
        Self {
            class_file: "org/infinitest/testrunner/TestRunnerProcess.class".to_string(),
            artifact_hint: "infinitest".to_string(),
        }
    }
}

impl RuntimeMarker {
    pub fn matches(&self, path: &Path) -> bool {
        if path.is_dir() {
            return path.join(&self.class_file).is_file();
        }
        if path.is_file() {
            let hint = self.artifact_hint.to_lowercase();
            return path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.to_lowercase().contains(&hint));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn skips_empty_segments() {
        let raw = format!("a{sep}{sep}b{sep}", sep = PATH_SEPARATOR);
        assert_eq!(classpath_entries(&raw).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(classpath_entries("").count(), 0);
    }

    #[test]
    fn marker_matches_directory_and_archive() {
        let temp = tempdir().unwrap();
        let marker = RuntimeMarker::default();

        let runtime_dir = temp.path().join("runtime");
        let class_file = runtime_dir.join(&marker.class_file);
        fs::create_dir_all(class_file.parent().unwrap()).unwrap();
        fs::write(&class_file, b"").unwrap();
        assert!(marker.matches(&runtime_dir));

        let jar = temp.path().join("Infinitest-Runner-5.2.jar");
        fs::write(&jar, b"").unwrap();
        assert!(marker.matches(&jar));

        let other = temp.path().join("junit.jar");
        fs::write(&other, b"").unwrap();
        assert!(!marker.matches(&other));
        assert!(!marker.matches(temp.path()));
        assert!(!marker.matches(&temp.path().join("missing.jar")));
    }

    #[test]
    fn entry_exists_relative_or_absolute() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("lib")).unwrap();
        assert!(entry_exists(temp.path(), "lib"));
        assert!(entry_exists(temp.path(), &temp.path().join("lib").to_string_lossy()));
        assert!(!entry_exists(temp.path(), "nope"));
    }
}
