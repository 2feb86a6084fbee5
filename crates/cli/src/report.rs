use impact_convergence::PassSummary;
use impact_discovery::DiscoveryStats;
use impact_protocol::ChangeUnit;
use serde::Serialize;
use std::path::PathBuf;

/// What a run did, printed with `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct RunSummary {
    pub root: PathBuf,
    pub profile: &'static str,
    pub discovery: &'static str,
    pub collision: &'static str,
    pub engine: String,
    pub units: usize,
    pub passes: usize,
    pub converged: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unstable_units: Vec<ChangeUnit>,
    pub failures: usize,
    pub discovery_stats: DiscoveryStats,
    pub pass_summaries: Vec<PassSummary>,
    pub snapshots: Vec<PathBuf>,
    pub worker_command: Vec<String>,
    pub duration_ms: u64,
}

impl RunSummary {
    /// One-line human summary for the log.
    pub(crate) fn headline(&self) -> String {
        let state = if self.converged {
            "converged"
        } else if self.passes < 2 {
            "not compared"
        } else {
            "still changing"
        };
        format!(
            "{} units, {} passes ({state}), {} failures, {} snapshots in {} ms",
            self.units,
            self.passes,
            self.failures,
            self.snapshots.len(),
            self.duration_ms
        )
    }
}
