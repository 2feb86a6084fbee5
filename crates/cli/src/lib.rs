//! # Impact CLI
//!
//! `impact [OPTIONS] <ROOT>`: resolve the project environment under `ROOT`,
//! discover its compiled units, drive the analysis engine until its answers
//! settle and write the last pass as a text snapshot.

use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use config::{RawRunConfig, RunConfig, RunOverrides};
use flags::{CollisionFlag, DiscoveryFlag, ProfileFlag};
use impact_environment::EnvironmentError;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod config;
mod flags;
mod pipeline;
mod report;

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "impact")]
#[command(about = "Warm up an incremental test-impact engine and snapshot its answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root containing classpath.cp
    root: PathBuf,

    /// Toolchain home (defaults to IMPACT_TOOLCHAIN_HOME, then JAVA_HOME)
    #[arg(long)]
    toolchain_home: Option<PathBuf>,

    /// How output directories are found under the root
    #[arg(long, value_enum)]
    discovery: Option<DiscoveryFlag>,

    /// Run profile (default: warm-up)
    #[arg(long, value_enum)]
    profile: Option<ProfileFlag>,

    /// Number of passes over the change set (overrides the profile)
    #[arg(long)]
    passes: Option<usize>,

    /// Directory for the main snapshot (default: infinitestExport)
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// What to do when a snapshot name is already taken
    #[arg(long, value_enum)]
    collision: Option<CollisionFlag>,

    /// Dependency manifest for the reference engine
    #[arg(long)]
    dependencies: Option<PathBuf>,

    /// Config file (default: <ROOT>/impact.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON run summary on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self, cwd: &Path) -> RunOverrides {
        RunOverrides {
            toolchain_home: self.toolchain_home.clone(),
            discovery: self.discovery.map(DiscoveryFlag::as_domain),
            profile: self.profile.map(ProfileFlag::as_domain),
            passes: self.passes,
            export_dir: self.export_dir.clone(),
            collision: self.collision.map(CollisionFlag::as_domain),
            dependencies: self.dependencies.as_ref().map(|path| cwd.join(path)),
        }
    }
}

/// Process exit status for a failed run: 10 when the classpath descriptor is
/// missing, 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EnvironmentError>())
        .map_or(1, EnvironmentError::exit_code)
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let cwd = env::current_dir().context("Failed to read the working directory")?;
    let root = cwd.join(&cli.root);
    let (file, config_path) = RawRunConfig::load(&root, cli.config.as_deref())?;
    if let Some(path) = &config_path {
        log::info!("Using config {}", path.display());
    }
    let config = RunConfig::merge(root, cli.overrides(&cwd), file)?;
    log::debug!("Run config: {config:?}");

    let summary = pipeline::run(&config)?;
    log::info!("{}", summary.headline());
    if cli.json {
        print_stdout(&serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(())
}
