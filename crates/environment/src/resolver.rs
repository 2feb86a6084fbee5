use crate::{Environment, EnvironmentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Classpath descriptor file expected at the root.
pub const CLASSPATH_DESCRIPTOR: &str = "classpath.cp";

const OUTPUT_DIR_NAMES: &[&str] = &["classes", "test-classes"];
const TOOLCHAIN_ENV_VARS: &[&str] = &["IMPACT_TOOLCHAIN_HOME", "JAVA_HOME"];

/// How build output directories are located under the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputDirStrategy {
    /// `target/classes` and `target/test-classes`, whether or not they exist.
    Explicit,
    /// Every directory named `classes` or `test-classes` anywhere under the root.
    #[default]
    Scan,
}

impl OutputDirStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputDirStrategy::Explicit => "explicit",
            OutputDirStrategy::Scan => "scan",
        }
    }

    pub fn output_dirs(self, root: &Path) -> Vec<PathBuf> {
        match self {
            OutputDirStrategy::Explicit => vec![
                root.join("target").join("classes"),
                root.join("target").join("test-classes"),
            ],
            OutputDirStrategy::Scan => scan_output_dirs(root),
        }
    }
}

/// Builds an [`Environment`] for one root directory.
#[derive(Debug, Clone)]
pub struct EnvironmentResolver {
    root: PathBuf,
    toolchain_home: Option<PathBuf>,
    strategy: OutputDirStrategy,
}

impl EnvironmentResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            toolchain_home: None,
            strategy: OutputDirStrategy::default(),
        }
    }

    /// Explicit toolchain home; otherwise `IMPACT_TOOLCHAIN_HOME` then `JAVA_HOME`.
    #[must_use]
    pub fn with_toolchain_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.toolchain_home = Some(home.into());
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: OutputDirStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Missing output directories are fine; a missing classpath descriptor or
    /// toolchain is not.
    pub fn resolve(&self) -> Result<Environment> {
        let root = absolute(&self.root)?;
        let classpath = read_classpath_descriptor(&root)?;
        let toolchain_home = match &self.toolchain_home {
            Some(home) => absolute(home)?,
            None => absolute(&toolchain_home_from_env()?)?,
        };
        let output_dirs = self.strategy.output_dirs(&root);

        log::info!("The directory used is: {}", root.display());
        log::debug!(
            "Output directories ({}): {:?}",
            self.strategy.as_str(),
            output_dirs
        );

        Environment::new(output_dirs, root, classpath, toolchain_home)
    }
}

/// Full contents of `<root>/classpath.cp`, trailing line terminators removed.
pub fn read_classpath_descriptor(root: &Path) -> Result<String> {
    let path = root.join(CLASSPATH_DESCRIPTOR);
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(contents.trim_end_matches(&['\r', '\n'][..]).to_string()),
        Err(source) => Err(EnvironmentError::ClasspathUnreadable { path, source }),
    }
}

fn toolchain_home_from_env() -> Result<PathBuf> {
    TOOLCHAIN_ENV_VARS
        .iter()
        .filter_map(|key| env::var_os(key))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or(EnvironmentError::ToolchainHomeUnset)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

fn is_output_dir_name(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| OUTPUT_DIR_NAMES.contains(&name))
}

fn scan_output_dirs(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Failed to read entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_dir() || !is_output_dir_name(entry.file_name()) {
            continue;
        }

        let path = entry.into_path();
        if seen.insert(path.clone()) {
            found.push(path);
        }
    }

    log::info!("Found {} output directories", found.len());
    found
}
