use impact_convergence::{ConvergenceDriver, ConvergenceError, PassCount};
use impact_graph::{GraphEngine, ManifestExtractor};
use impact_protocol::{AffectedSet, AnalysisEngine, ChangeSet, ChangeUnit, EngineError};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Fails on units whose path contains `poison`, goes dark on `fatal`.
struct Flaky;

impl AnalysisEngine for Flaky {
    fn update(&mut self, unit: &ChangeUnit) -> Result<AffectedSet, EngineError> {
        let path = unit.path_string();
        if path.contains("fatal") {
            return Err(EngineError::Unavailable("worker exited".to_string()));
        }
        if path.contains("poison") {
            return Err(EngineError::unit_failed(unit, "malformed class file"));
        }
        Ok([format!("{path}Test")].into_iter().collect())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

fn change_set(paths: &[&str]) -> ChangeSet {
    paths.iter().map(|p| ChangeUnit::new(*p)).collect()
}

#[test]
fn one_failing_unit_does_not_abort_the_run() {
    let changes = change_set(&["a.class", "b-poison.class", "c.class"]);
    let outcome = ConvergenceDriver::default()
        .converge(Flaky, &changes)
        .unwrap();

    let responses = &outcome.responses;
    assert_eq!(responses.len(), 3);
    let failed = responses.get(&ChangeUnit::new("b-poison.class")).unwrap();
    assert!(failed.affected.is_empty());
    assert!(failed.failure.as_deref().unwrap().contains("malformed"));

    let a = responses.affected_for(&ChangeUnit::new("a.class")).unwrap();
    assert!(a.contains("a.classTest"));
    let c = responses.affected_for(&ChangeUnit::new("c.class")).unwrap();
    assert!(c.contains("c.classTest"));

    assert_eq!(outcome.failures(), 1);
    assert!(outcome.is_converged());
}

#[test]
fn unavailable_engine_stops_the_run() {
    let changes = change_set(&["a.class", "fatal.class"]);
    let mut driver = ConvergenceDriver::new(PassCount::COMPARISON);
    let err = driver.converge(Flaky, &changes).unwrap_err();

    match err {
        ConvergenceError::Engine { engine, pass, .. } => {
            assert_eq!(engine, "flaky");
            assert_eq!(pass, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(driver.state().completed(), 0);
}

fn compiled(output: &Path, relative: &str) -> ChangeUnit {
    let path = output.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"").unwrap();
    ChangeUnit::with_output_dir(path, output)
}

#[test]
fn warm_up_pass_completes_the_first() {
    let temp = tempdir().unwrap();
    let classes = temp.path().join("classes");
    let a = compiled(&classes, "app/A.class");
    let b = compiled(&classes, "app/B.class");
    let b_test = compiled(&classes, "app/BTest.class");
    let changes: ChangeSet = vec![b_test.clone(), a.clone(), b.clone()].into_iter().collect();

    let manifest = ManifestExtractor::parse("app.A -> app.B\napp.BTest -> app.A").unwrap();

    let mut single = GraphEngine::new("one", manifest.clone());
    let cold = ConvergenceDriver::new(PassCount::new(1).unwrap())
        .converge(&mut single, &changes)
        .unwrap();
    let mut double = GraphEngine::new("two", manifest);
    let warm = ConvergenceDriver::new(PassCount::WARM_UP)
        .converge(&mut double, &changes)
        .unwrap();

    for unit in [&a, &b, &b_test] {
        let before = cold.responses.affected_for(unit).unwrap();
        let after = warm.responses.affected_for(unit).unwrap();
        assert!(after.is_superset_of(before), "{unit}");
    }
    assert!(cold.responses.affected_for(&a).unwrap().is_empty());
    assert!(warm.responses.affected_for(&a).unwrap().contains("app.BTest"));
    assert!(warm.responses.affected_for(&b).unwrap().contains("app.BTest"));
    assert_eq!(warm.summaries[1].changed_units, vec![a, b]);
}
