use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnitKind {
    Production,
    Test,
}

/// Node in the unit graph
#[derive(Debug, Clone, Serialize)]
pub struct UnitNode {
    /// Dotted unit name (e.g., "com.acme.Foo")
    pub name: String,

    /// Compiled file, once the unit itself has been registered
    pub path: Option<PathBuf>,

    pub kind: UnitKind,

    /// False for placeholders created because another unit depends on this name
    pub registered: bool,
}

/// Directed graph of units: an edge `a -> b` means `a` depends on `b`.
pub struct UnitGraph {
    pub graph: DiGraph<UnitNode, ()>,

    /// Unit name -> NodeIndex mapping for fast lookup
    pub name_index: HashMap<String, NodeIndex>,
}

impl UnitGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_index: HashMap::new(),
        }
    }

    /// Node for `name`, created as an unregistered placeholder if unknown.
    pub fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.name_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(UnitNode {
            name: name.to_string(),
            path: None,
            kind: UnitKind::Production,
            registered: false,
        });
        self.name_index.insert(name.to_string(), idx);
        idx
    }

    /// Register `name` and replace its outgoing edges with `dependencies`.
    ///
    /// Nodes are never removed, so a `NodeIndex` stays valid for the graph's
    /// lifetime.
    pub fn register(
        &mut self,
        name: &str,
        path: &Path,
        kind: UnitKind,
        dependencies: &[String],
    ) -> NodeIndex {
        let idx = self.ensure_node(name);
        if let Some(node) = self.graph.node_weight_mut(idx) {
            node.path = Some(path.to_path_buf());
            node.kind = kind;
            node.registered = true;
        }

        self.graph.retain_edges(|graph, edge| {
            graph
                .edge_endpoints(edge)
                .map_or(true, |(source, _)| source != idx)
        });

        for dependency in dependencies {
            if dependency == name {
                continue;
            }
            let target = self.ensure_node(dependency);
            self.graph.update_edge(idx, target, ());
        }
        idx
    }

    /// Find node by unit name
    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.name_index.get(name).copied()
    }

    pub fn get_node(&self, idx: NodeIndex) -> Option<&UnitNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn registered_count(&self) -> usize {
        self.graph
            .raw_nodes()
            .iter()
            .filter(|node| node.weight.registered)
            .count()
    }
}

impl Default for UnitGraph {
    fn default() -> Self {
        Self::new()
    }
}
