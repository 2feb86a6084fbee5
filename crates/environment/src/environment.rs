use crate::classpath::{classpath_entries, entry_exists, resolve_entry, RuntimeMarker, PATH_SEPARATOR};
use crate::custom_args::read_custom_arguments;
use crate::{EnvironmentError, Result};
use once_cell::unsync::OnceCell;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Heap size, in megabytes, handed to a launched worker unless overridden.
pub const DEFAULT_HEAP_SIZE_MB: u32 = 256;

const JAVA_EXECUTABLE: &str = "java";
const JAVA_EXECUTABLE_WINDOWS: &str = "java.exe";

/// Runtime environment of one analysis run.
///
/// Two environments are equal when their output directories, working
/// directory, raw classpath, toolchain home and added arguments are equal.
#[derive(Debug, Clone)]
pub struct Environment {
    toolchain_home: PathBuf,
    java_executable: PathBuf,
    working_directory: PathBuf,
    raw_classpath: String,
    output_dirs: Vec<PathBuf>,
    additional_args: Vec<String>,
    heap_size_mb: u32,
    runtime_classpath: String,
    runtime_marker: RuntimeMarker,
    class_dirs: OnceCell<Vec<PathBuf>>,
}

impl Environment {
    /// Fails with [`EnvironmentError::ToolchainNotFound`] unless `toolchain_home`
    /// holds `bin/java` or `bin/java.exe`.
    pub fn new(
        output_dirs: Vec<PathBuf>,
        working_directory: impl Into<PathBuf>,
        classpath: impl Into<String>,
        toolchain_home: impl Into<PathBuf>,
    ) -> Result<Self> {
        let toolchain_home = toolchain_home.into();
        let java_executable = locate_java_executable(&toolchain_home)?;
        let raw_classpath = classpath.into();

        Ok(Self {
            toolchain_home,
            java_executable,
            working_directory: working_directory.into(),
            runtime_classpath: raw_classpath.clone(),
            raw_classpath,
            output_dirs,
            additional_args: Vec::new(),
            heap_size_mb: DEFAULT_HEAP_SIZE_MB,
            runtime_marker: RuntimeMarker::default(),
            class_dirs: OnceCell::new(),
        })
    }

    pub fn toolchain_home(&self) -> &Path {
        &self.toolchain_home
    }

    pub fn java_executable(&self) -> &Path {
        &self.java_executable
    }

    /// Anchor for relative classpath entries and for `infinitest.args`.
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn raw_classpath(&self) -> &str {
        &self.raw_classpath
    }

    pub fn output_dirs(&self) -> &[PathBuf] {
        &self.output_dirs
    }

    pub fn additional_args(&self) -> &[String] {
        &self.additional_args
    }

    pub fn heap_size(&self) -> u32 {
        self.heap_size_mb
    }

    pub fn set_heap_size(&mut self, heap_size_mb: u32) {
        self.heap_size_mb = heap_size_mb;
    }

    pub fn add_process_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_args.extend(args.into_iter().map(Into::into));
    }

    /// Classpath searched for the engine runtime artifact (the classpath the
    /// engine itself runs with, not the project's).
    pub fn runtime_classpath(&self) -> &str {
        &self.runtime_classpath
    }

    pub fn set_runtime_classpath(&mut self, classpath: impl Into<String>) {
        self.runtime_classpath = classpath.into();
    }

    /// `[java, -mx<heap>m, ...infinitest.args, ...added args]`
    pub fn create_process_arguments(&self) -> Vec<String> {
        let mut args = vec![
            self.java_executable.to_string_lossy().into_owned(),
            format!("-mx{}m", self.heap_size_mb),
        ];
        args.extend(read_custom_arguments(&self.working_directory));
        args.extend(self.additional_args.iter().cloned());
        args
    }

    pub fn create_process_environment(&self) -> BTreeMap<String, String> {
        let mut environment = BTreeMap::new();
        environment.insert("CLASSPATH".to_string(), self.complete_classpath());
        environment
    }

    /// Raw classpath plus the engine runtime entry, validated entry by entry.
    ///
    /// A missing runtime entry or a missing classpath entry is logged, never fatal.
    pub fn complete_classpath(&self) -> String {
        let mut complete = self.raw_classpath.clone();
        match self.find_runtime_entry() {
            Some(entry) => {
                log::debug!("Found runtime classpath entry at {entry}");
                if !complete.is_empty() {
                    complete.push(PATH_SEPARATOR);
                }
                complete.push_str(&entry);
            }
            None => log::error!(
                "Could not find a classpath entry for the engine runtime in {}",
                self.runtime_classpath
            ),
        }

        for entry in self.missing_classpath_entries(&complete) {
            log::warn!(
                "Could not find classpath entry [{entry}] at file system root or relative to working directory [{}]",
                self.working_directory.display()
            );
        }
        complete
    }

    /// First runtime classpath entry that looks like the engine runtime.
    pub fn find_runtime_entry(&self) -> Option<String> {
        classpath_entries(&self.runtime_classpath)
            .find(|entry| {
                self.runtime_marker
                    .matches(&resolve_entry(&self.working_directory, entry))
            })
            .map(str::to_string)
    }

    pub fn missing_classpath_entries(&self, classpath: &str) -> Vec<String> {
        classpath_entries(classpath)
            .filter(|entry| !entry_exists(&self.working_directory, entry))
            .map(str::to_string)
            .collect()
    }

    /// Raw classpath entries that are existing directories. Computed once;
    /// later changes on disk are not seen.
    pub fn class_directories_in_classpath(&self) -> &[PathBuf] {
        self.class_dirs.get_or_init(|| {
            classpath_entries(&self.raw_classpath)
                .map(|entry| resolve_entry(&self.working_directory, entry))
                .filter(|path| path.is_dir())
                .collect()
        })
    }
}

fn locate_java_executable(toolchain_home: &Path) -> Result<PathBuf> {
    let bin = toolchain_home.join("bin");
    let primary = bin.join(JAVA_EXECUTABLE);
    if primary.is_file() {
        return Ok(primary);
    }
    let alternate = bin.join(JAVA_EXECUTABLE_WINDOWS);
    if alternate.is_file() {
        return Ok(alternate);
    }
    Err(EnvironmentError::ToolchainNotFound(alternate))
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.output_dirs == other.output_dirs
            && self.working_directory == other.working_directory
            && self.raw_classpath == other.raw_classpath
            && self.toolchain_home == other.toolchain_home
            && self.additional_args == other.additional_args
    }
}

impl Eq for Environment {}

impl Hash for Environment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.output_dirs.hash(state);
        self.additional_args.hash(state);
        self.toolchain_home.hash(state);
        self.working_directory.hash(state);
        self.raw_classpath.hash(state);
    }
}
