use crate::types::{UnitGraph, UnitKind, UnitNode};
use petgraph::graph::NodeIndex;
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;

impl UnitGraph {
    /// Units `node` depends on directly (outgoing edges)
    pub fn get_dependencies(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect()
    }

    /// Units that depend on `node` directly (incoming edges)
    pub fn get_dependents(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .collect()
    }

    /// `node` plus every unit that reaches it, in breadth-first order.
    pub fn dependents_closure(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, node);
        let mut closure = Vec::new();
        while let Some(next) = bfs.next(reversed) {
            closure.push(next);
        }
        closure
    }

    /// Registered test units in the dependents closure of `node`.
    pub fn affected_tests(&self, node: NodeIndex) -> Vec<&UnitNode> {
        self.dependents_closure(node)
            .into_iter()
            .filter_map(|idx| self.get_node(idx))
            .filter(|unit| unit.registered && unit.kind == UnitKind::Test)
            .collect()
    }
}
