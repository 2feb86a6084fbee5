use crate::engine::GraphEngine;
use crate::extractor::{DependencyExtractor, ManifestExtractor, NoDependencies};
use crate::{GraphError, Result};
use impact_environment::Environment;
use std::path::PathBuf;

/// Builds a [`GraphEngine`] for an environment.
pub struct GraphEngineBuilder<'a> {
    environment: &'a Environment,
    name: String,
    manifest: Option<PathBuf>,
}

impl<'a> GraphEngineBuilder<'a> {
    pub fn new(environment: &'a Environment) -> Self {
        Self {
            environment,
            name: "impact".to_string(),
            manifest: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Dependency manifest; relative paths resolve against the working directory.
    #[must_use]
    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }

    /// An unreadable or malformed manifest fails construction.
    pub fn build(self) -> Result<GraphEngine> {
        if self.name.trim().is_empty() {
            return Err(GraphError::BuildError("engine name is empty".to_string()));
        }
        if self.environment.output_dirs().is_empty()
            && self.environment.class_directories_in_classpath().is_empty()
        {
            log::warn!(
                "No class directories in {}; every update will fail",
                self.environment.working_directory().display()
            );
        }

        let extractor: Box<dyn DependencyExtractor> = match self.manifest {
            Some(path) => {
                let path = if path.is_absolute() {
                    path
                } else {
                    self.environment.working_directory().join(path)
                };
                let manifest = ManifestExtractor::load(&path).map_err(|e| match e {
                    GraphError::IoError(io) => GraphError::BuildError(format!(
                        "cannot read dependency manifest {}: {io}",
                        path.display()
                    )),
                    other => other,
                })?;
                log::info!(
                    "Loaded dependency manifest {} ({} units)",
                    path.display(),
                    manifest.len()
                );
                Box::new(manifest)
            }
            None => Box::new(NoDependencies),
        };

        log::info!("Created engine {}", self.name);
        Ok(GraphEngine::new(self.name, extractor))
    }
}
