//! Dependency graph over a resolution plan
//!
//! Nodes are package keys, edges point from a package to the packages it
//! depends on. The graph yields the dependency-first installation order and
//! reports cycles as a readable path.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// Directed dependency graph keyed by package key
#[derive(Debug, Default)]
pub struct PlanGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl PlanGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package node, returning the existing node if already present
    pub fn add_package(&mut self, key: &str) -> NodeIndex {
        if let Some(index) = self.node_map.get(key) {
            return *index;
        }
        let index = self.graph.add_node(key.to_string());
        self.node_map.insert(key.to_string(), index);
        index
    }

    /// Add a `dependent -> dependency` edge, adding missing nodes
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        let from = self.add_package(dependent);
        let to = self.add_package(dependency);
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Package keys with every dependency before its dependents.
    ///
    /// Fails with the cycle path when the graph is not acyclic.
    pub fn dependency_order(&self) -> Result<Vec<String>, Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(sorted) => Ok(sorted
                .into_iter()
                .rev()
                .filter_map(|index| self.graph.node_weight(index))
                .cloned()
                .collect()),
            Err(cycle) => Err(self.extract_cycle_path(cycle.node_id())),
        }
    }

    /// Walk from a node known to sit on a cycle until a node repeats
    fn extract_cycle_path(&self, start: NodeIndex) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut path: Vec<NodeIndex> = Vec::new();
        let mut current = start;

        loop {
            if !visited.insert(current) {
                let cycle_start = path.iter().position(|index| *index == current).unwrap_or(0);
                return path[cycle_start..]
                    .iter()
                    .filter_map(|index| self.graph.node_weight(*index))
                    .cloned()
                    .collect();
            }
            path.push(current);

            // Prefer an edge that stays on a cycle
            let next = self
                .graph
                .edges(current)
                .map(|edge| edge.target())
                .find(|target| self.reaches(*target, current));
            match next {
                Some(target) => current = target,
                None => break,
            }
        }

        path.iter()
            .filter_map(|index| self.graph.node_weight(*index))
            .cloned()
            .collect()
    }

    fn reaches(&self, from: NodeIndex, to: NodeIndex) -> bool {
        petgraph::algo::has_path_connecting(&self.graph, from, to, None)
    }

    /// Format cycle as "a -> b -> a"
    pub fn format_cycle(cycle: &[String]) -> String {
        match cycle.first() {
            None => "no cycle".to_string(),
            Some(first) => {
                let mut closed = cycle.to_vec();
                closed.push(first.clone());
                closed.join(" -> ")
            },
        }
    }
}
