use anyhow::{Context as AnyhowContext, Result};
use impact_convergence::PassCount;
use impact_environment::OutputDirStrategy;
use impact_snapshot::{CollisionPolicy, SnapshotTarget};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the root when `--config` is absent.
pub(crate) const CONFIG_FILE: &str = "impact.toml";

pub(crate) const DEFAULT_EXPORT_DIR: &str = "infinitestExport";
const EXPORT_PREFIX: &str = "infinitestExport";
const COMPARISON_PREFIX: &str = "infinitestExport3";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum RunProfile {
    #[default]
    WarmUp,
    Comparison,
}

impl RunProfile {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            RunProfile::WarmUp => "warm-up",
            RunProfile::Comparison => "comparison",
        }
    }

    pub(crate) const fn default_passes(self) -> PassCount {
        match self {
            RunProfile::WarmUp => PassCount::WARM_UP,
            RunProfile::Comparison => PassCount::COMPARISON,
        }
    }
}

/// `impact.toml` as written on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawRunConfig {
    pub discovery: Option<OutputDirStrategy>,
    pub profile: Option<RunProfile>,
    pub passes: Option<usize>,
    pub export_dir: Option<PathBuf>,
    pub collision: Option<CollisionPolicy>,
    pub dependencies: Option<PathBuf>,
    pub heap_size_mb: Option<u32>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl RawRunConfig {
    /// `explicit` must exist; otherwise `<root>/impact.toml` is read when present.
    pub(crate) fn load(root: &Path, explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = root.join(CONFIG_FILE);
                if !default.is_file() {
                    return Ok((Self::default(), None));
                }
                default
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let raw = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok((raw, Some(path)))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Default)]
pub(crate) struct RunOverrides {
    pub toolchain_home: Option<PathBuf>,
    pub discovery: Option<OutputDirStrategy>,
    pub profile: Option<RunProfile>,
    pub passes: Option<usize>,
    pub export_dir: Option<PathBuf>,
    pub collision: Option<CollisionPolicy>,
    pub dependencies: Option<PathBuf>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub(crate) struct RunConfig {
    pub root: PathBuf,
    pub toolchain_home: Option<PathBuf>,
    pub discovery: OutputDirStrategy,
    pub profile: RunProfile,
    pub passes: PassCount,
    pub export_dir: PathBuf,
    pub collision: CollisionPolicy,
    pub dependencies: Option<PathBuf>,
    pub heap_size_mb: Option<u32>,
    pub extra_args: Vec<String>,
}

impl RunConfig {
    /// Command line > config file > profile default.
    pub(crate) fn merge(root: PathBuf, cli: RunOverrides, file: RawRunConfig) -> Result<Self> {
        let profile = cli.profile.or(file.profile).unwrap_or_default();
        let passes = match cli.passes.or(file.passes) {
            Some(passes) => PassCount::new(passes)?,
            None => profile.default_passes(),
        };
        if file.heap_size_mb == Some(0) {
            anyhow::bail!("heap_size_mb must be positive");
        }

        Ok(Self {
            root,
            toolchain_home: cli.toolchain_home,
            discovery: cli.discovery.or(file.discovery).unwrap_or_default(),
            profile,
            passes,
            export_dir: cli
                .export_dir
                .or(file.export_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
            collision: cli.collision.or(file.collision).unwrap_or_default(),
            dependencies: cli.dependencies.or(file.dependencies),
            heap_size_mb: file.heap_size_mb,
            extra_args: file.extra_args,
        })
    }

    /// Main snapshot prefix, relative to the process working directory.
    pub(crate) fn snapshot_target(&self) -> Result<SnapshotTarget> {
        Ok(SnapshotTarget::new(self.export_dir.join(EXPORT_PREFIX))?)
    }

    /// Prefix for the extra pass written by the comparison profile.
    pub(crate) fn comparison_target(&self) -> Result<Option<SnapshotTarget>> {
        match self.profile {
            RunProfile::Comparison => Ok(Some(SnapshotTarget::new(COMPARISON_PREFIX)?)),
            RunProfile::WarmUp => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn profile_sets_default_pass_count() {
        let config = RunConfig::merge(
            PathBuf::from("/work"),
            RunOverrides::default(),
            RawRunConfig::parse("profile = \"comparison\"").unwrap(),
        )
        .unwrap();
        assert_eq!(config.passes.get(), 3);
        assert_eq!(config.discovery, OutputDirStrategy::Scan);
        assert!(config.comparison_target().unwrap().is_some());
    }

    #[test]
    fn command_line_beats_config_file() {
        let file = RawRunConfig::parse(
            r#"
            discovery = "explicit"
            passes = 4
            collision = "unique"
            export_dir = "snapshots"
            heap_size_mb = 512
            extra_args = ["-ea"]
            "#,
        )
        .unwrap();
        let cli = RunOverrides {
            passes: Some(2),
            collision: Some(CollisionPolicy::Overwrite),
            ..RunOverrides::default()
        };

        let config = RunConfig::merge(PathBuf::from("/work"), cli, file).unwrap();
        assert_eq!(config.passes.get(), 2);
        assert_eq!(config.collision, CollisionPolicy::Overwrite);
        assert_eq!(config.discovery, OutputDirStrategy::Explicit);
        assert_eq!(config.export_dir, PathBuf::from("snapshots"));
        assert_eq!(config.heap_size_mb, Some(512));
        assert_eq!(config.extra_args, vec!["-ea"]);
        assert_eq!(config.profile, RunProfile::WarmUp);
    }

    #[test]
    fn unknown_keys_and_zero_passes_are_rejected() {
        let err = RawRunConfig::parse("pases = 2").unwrap_err();
        assert!(format!("{err:#}").contains("unknown field"));

        let zero = RawRunConfig::parse("passes = 0").unwrap();
        assert!(RunConfig::merge(PathBuf::from("/work"), RunOverrides::default(), zero).is_err());
    }

    #[test]
    fn root_config_is_optional() {
        let temp = tempdir().unwrap();
        let (raw, path) = RawRunConfig::load(temp.path(), None).unwrap();
        assert!(path.is_none());
        assert!(raw.extra_args.is_empty());

        fs::write(temp.path().join(CONFIG_FILE), "passes = 5\n").unwrap();
        let (raw, path) = RawRunConfig::load(temp.path(), None).unwrap();
        assert_eq!(raw.passes, Some(5));
        assert_eq!(path, Some(temp.path().join(CONFIG_FILE)));

        assert!(RawRunConfig::load(temp.path(), Some(&temp.path().join("nope.toml"))).is_err());
    }
}
