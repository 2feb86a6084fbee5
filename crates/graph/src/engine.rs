use crate::extractor::{DependencyExtractor, NoDependencies};
use crate::types::{UnitGraph, UnitKind};
use impact_protocol::{AffectedSet, AnalysisEngine, ChangeUnit, EngineError};
use std::io;

const TEST_SUFFIXES: &[&str] = &["Test", "Tests", "TestCase", "IT"];
const TEST_PREFIX: &str = "Test";

/// Whether a dotted unit name looks like a test. Inner classes follow their
/// outer class (`FooTest$Fixture` is a test).
pub fn is_test_name(name: &str) -> bool {
    let simple = name.rsplit('.').next().unwrap_or(name);
    let outer = simple.split('$').next().unwrap_or(simple);
    TEST_SUFFIXES.iter().any(|suffix| outer.ends_with(suffix))
        || (outer.starts_with(TEST_PREFIX) && outer.len() > TEST_PREFIX.len())
}

/// Incremental engine: each update registers the unit, refreshes its edges
/// and answers with the registered tests that reach it.
pub struct GraphEngine<E = Box<dyn DependencyExtractor>> {
    name: String,
    graph: UnitGraph,
    extractor: E,
    updates: usize,
}

impl GraphEngine<NoDependencies> {
    pub fn standalone(name: impl Into<String>) -> Self {
        GraphEngine::new(name, NoDependencies)
    }
}

impl<E: DependencyExtractor> GraphEngine<E> {
    pub fn new(name: impl Into<String>, extractor: E) -> Self {
        Self {
            name: name.into(),
            graph: UnitGraph::new(),
            extractor,
            updates: 0,
        }
    }

    pub fn graph(&self) -> &UnitGraph {
        &self.graph
    }

    /// Successful updates since construction
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl<E: DependencyExtractor> AnalysisEngine for GraphEngine<E> {
    fn update(&mut self, unit: &ChangeUnit) -> Result<AffectedSet, EngineError> {
        let name = unit.unit_name();
        if name.is_empty() {
            return Err(EngineError::unit_failed(unit, "unit has no name"));
        }
        if !unit.path().is_file() {
            return Err(EngineError::io(
                unit,
                io::Error::new(io::ErrorKind::NotFound, "compiled unit no longer exists"),
            ));
        }

        let dependencies = self
            .extractor
            .dependencies(unit, &name)
            .map_err(|e| EngineError::unit_failed(unit, e.to_string()))?;
        let kind = if is_test_name(&name) {
            UnitKind::Test
        } else {
            UnitKind::Production
        };

        let idx = self.graph.register(&name, unit.path(), kind, &dependencies);
        self.updates += 1;

        let affected: AffectedSet = self
            .graph
            .affected_tests(idx)
            .into_iter()
            .map(|node| node.name.clone())
            .collect();
        log::debug!(
            "{}: {} -> {} affected ({} nodes, {} edges)",
            self.name,
            name,
            affected.len(),
            self.graph.node_count(),
            self.graph.edge_count()
        );
        Ok(affected)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ManifestExtractor;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn unit(output: &Path, relative: &str) -> ChangeUnit {
        let path = output.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
        ChangeUnit::with_output_dir(path, output)
    }

    #[test]
    fn test_names() {
        assert!(is_test_name("com.acme.FooTest"));
        assert!(is_test_name("com.acme.FooTest$Fixture"));
        assert!(is_test_name("com.acme.TestFoo"));
        assert!(is_test_name("com.acme.FooIT"));
        assert!(!is_test_name("com.acme.Foo"));
        assert!(!is_test_name("com.acme.Test"));
        assert!(!is_test_name("com.acme.Contest$Inner"));
    }

    #[test]
    fn dependents_registered_later_show_up_next_pass() {
        let temp = tempdir().unwrap();
        let classes = temp.path().join("classes");
        let test_classes = temp.path().join("test-classes");
        let foo = unit(&classes, "com/acme/Foo.class");
        let foo_test = unit(&test_classes, "com/acme/FooTest.class");

        let manifest = ManifestExtractor::parse("com.acme.FooTest -> com.acme.Foo").unwrap();
        let mut engine = GraphEngine::new("test", manifest);

        // cold graph: FooTest is unknown when Foo is fed
        assert!(engine.update(&foo).unwrap().is_empty());
        let first = engine.update(&foo_test).unwrap();
        assert_eq!(first, ["com.acme.FooTest"].into_iter().collect::<AffectedSet>());

        let second = engine.update(&foo).unwrap();
        assert_eq!(second, ["com.acme.FooTest"].into_iter().collect::<AffectedSet>());
        assert_eq!(engine.updates(), 3);
        assert_eq!(engine.graph().registered_count(), 2);
    }

    #[test]
    fn vanished_unit_is_a_unit_failure() {
        let temp = tempdir().unwrap();
        let mut engine = GraphEngine::standalone("test");
        let gone = ChangeUnit::with_output_dir(temp.path().join("Gone.class"), temp.path());

        let err = engine.update(&gone).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(engine.updates(), 0);
        assert_eq!(engine.name(), "test");
    }
}
