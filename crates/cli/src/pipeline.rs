use crate::config::RunConfig;
use crate::report::RunSummary;
use anyhow::{Context as AnyhowContext, Result};
use impact_convergence::ConvergenceDriver;
use impact_discovery::ChangeSetDiscovery;
use impact_environment::{Environment, EnvironmentResolver};
use impact_graph::GraphEngineBuilder;
use impact_protocol::AnalysisEngine;
use impact_snapshot::SnapshotExporter;
use std::path::PathBuf;
use std::time::Instant;

/// Resolve, discover, converge, export. Strictly in that order.
pub(crate) fn run(config: &RunConfig) -> Result<RunSummary> {
    let started = Instant::now();

    let environment = resolve_environment(config)?;
    let worker_command = environment.create_process_arguments();
    let worker_environment = environment.create_process_environment();
    log::debug!("Worker command: {}", worker_command.join(" "));
    for (key, value) in &worker_environment {
        log::debug!("Worker environment: {key}={value}");
    }

    let report = ChangeSetDiscovery::new().discover_report(&class_directories(&environment));
    log::debug!(
        "Discovered {} units in {} directories ({} missing, {} duplicates)",
        report.stats.units,
        report.stats.dirs_scanned,
        report.stats.dirs_missing,
        report.stats.duplicates
    );

    let mut engine = GraphEngineBuilder::new(&environment)
        .with_manifest(config.dependencies.clone())
        .build()
        .context("Failed to create analysis engine")?;
    let engine_name = engine.name().to_string();

    let mut driver = ConvergenceDriver::new(config.passes);
    let outcome = driver
        .converge(&mut engine, &report.change_set)
        .context("Convergence aborted")?;

    let exporter = SnapshotExporter::new(config.collision);
    let mut snapshots: Vec<PathBuf> = exporter
        .export(&config.snapshot_target()?, &report.change_set, &outcome.responses)
        .into_iter()
        .collect();

    // The comparison snapshot holds the pass after the main one.
    if let Some(target) = config.comparison_target()? {
        let (responses, summary) = driver
            .next_pass(&mut engine, &report.change_set)
            .context("Comparison pass aborted")?;
        log::debug!(
            "Comparison pass {} changed {} units",
            summary.pass,
            summary.changed_units.len()
        );
        snapshots.extend(exporter.export(&target, &report.change_set, &responses));
    }

    Ok(RunSummary {
        root: environment.working_directory().to_path_buf(),
        profile: config.profile.as_str(),
        discovery: config.discovery.as_str(),
        collision: config.collision.as_str(),
        engine: engine_name,
        units: report.change_set.len(),
        passes: outcome.passes(),
        converged: outcome.is_converged(),
        failures: outcome.failures(),
        unstable_units: outcome.unstable_units,
        discovery_stats: report.stats,
        pass_summaries: outcome.summaries,
        snapshots,
        worker_command,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}

fn resolve_environment(config: &RunConfig) -> Result<Environment> {
    let mut resolver = EnvironmentResolver::new(&config.root).with_strategy(config.discovery);
    if let Some(home) = &config.toolchain_home {
        resolver = resolver.with_toolchain_home(home);
    }
    let mut environment = resolver.resolve()?;

    if let Some(heap_size_mb) = config.heap_size_mb {
        environment.set_heap_size(heap_size_mb);
    }
    environment.add_process_args(config.extra_args.iter().cloned());
    Ok(environment)
}

/// Output directories first, so unit names are relative to them; then the
/// class directories named on the classpath.
fn class_directories(environment: &Environment) -> Vec<PathBuf> {
    let mut dirs = environment.output_dirs().to_vec();
    dirs.extend(environment.class_directories_in_classpath().iter().cloned());
    dirs
}
