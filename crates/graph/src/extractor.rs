use crate::{GraphError, Result};
use impact_protocol::ChangeUnit;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Source of dependency edges for a unit.
pub trait DependencyExtractor {
    /// Names of the units that `unit` (registered as `name`) depends on.
    fn dependencies(&self, unit: &ChangeUnit, name: &str) -> Result<Vec<String>>;
}

impl<T: DependencyExtractor + ?Sized> DependencyExtractor for Box<T> {
    fn dependencies(&self, unit: &ChangeUnit, name: &str) -> Result<Vec<String>> {
        (**self).dependencies(unit, name)
    }
}

/// Every unit stands alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDependencies;

impl DependencyExtractor for NoDependencies {
    fn dependencies(&self, _unit: &ChangeUnit, _name: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Dependencies declared in a text manifest:
///
/// ```text
/// # dependent -> dependencies
/// com.acme.FooTest -> com.acme.Foo, com.acme.Bar
/// com.acme.Foo -> com.acme.Bar
/// ```
///
/// Repeated heads accumulate.
#[derive(Debug, Clone, Default)]
pub struct ManifestExtractor {
    edges: HashMap<String, Vec<String>>,
}

impl ManifestExtractor {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse_named(&text, &path.display().to_string())
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_named(text, "<inline>")
    }

    fn parse_named(text: &str, source_name: &str) -> Result<Self> {
        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        for (offset, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let invalid = |reason: &str| GraphError::Manifest {
                source_name: source_name.to_string(),
                line: offset + 1,
                reason: reason.to_string(),
            };

            let (head, tail) = line
                .split_once("->")
                .ok_or_else(|| invalid("expected `<unit> -> <dependency>, ...`"))?;
            let head = head.trim();
            if head.is_empty() {
                return Err(invalid("missing dependent unit name"));
            }

            let targets = edges.entry(head.to_string()).or_default();
            for dependency in tail.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                if !targets.iter().any(|existing| existing == dependency) {
                    targets.push(dependency.to_string());
                }
            }
        }
        Ok(Self { edges })
    }

    /// Number of units with declared dependencies
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl DependencyExtractor for ManifestExtractor {
    fn dependencies(&self, _unit: &ChangeUnit, name: &str) -> Result<Vec<String>> {
        Ok(self.edges.get(name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_heads_and_accumulates() {
        let manifest = ManifestExtractor::parse(
            "# header\n\
             com.acme.FooTest -> com.acme.Foo, com.acme.Bar\n\
             \n\
             com.acme.FooTest -> com.acme.Bar, com.acme.Baz  # trailing\n\
             com.acme.Leaf ->\n",
        )
        .unwrap();

        let unit = ChangeUnit::new("/t/com/acme/FooTest.class");
        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.dependencies(&unit, "com.acme.FooTest").unwrap(),
            vec!["com.acme.Foo", "com.acme.Bar", "com.acme.Baz"]
        );
        assert!(manifest.dependencies(&unit, "com.acme.Leaf").unwrap().is_empty());
        assert!(manifest.dependencies(&unit, "unknown").unwrap().is_empty());
    }

    #[test]
    fn rejects_lines_without_arrow() {
        let err = ManifestExtractor::parse("A -> B\nC D\n").unwrap_err();
        match err {
            GraphError::Manifest { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(ManifestExtractor::parse(" -> B").is_err());
    }
}
