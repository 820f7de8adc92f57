//! Replays a processing log into the lineage DAG of its targets.
use super::entry::ProcessingLog;
use crate::error::{CatalogError, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Nodes are log targets; an edge `parent -> target` carries the operation.
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    graph: DiGraph<String, String>,
    index: HashMap<String, NodeIndex>,
}

impl LineageGraph {
    pub fn from_log(log: &ProcessingLog) -> Result<Self> {
        let mut lineage = Self::default();
        for entry in log {
            let target = lineage.node(&entry.target);
            for parent in &entry.parents {
                let parent = lineage.node(parent);
                lineage.graph.update_edge(parent, target, entry.operation.clone());
            }
        }

        // Rejects cycles (self-references included) up front.
        lineage.sorted_indices()?;
        Ok(lineage)
    }

    fn node(&mut self, target: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(target) {
            return idx;
        }
        let idx = self.graph.add_node(target.to_string());
        self.index.insert(target.to_string(), idx);
        idx
    }

    fn sorted_indices(&self) -> Result<Vec<NodeIndex>> {
        toposort(&self.graph, None)
            .map_err(|cycle| CatalogError::CycleDetected(self.graph[cycle.node_id()].clone()))
    }

    pub fn node_count(&self) -> usize { self.graph.node_count() }
    pub fn edge_count(&self) -> usize { self.graph.edge_count() }
    pub fn contains(&self, target: &str) -> bool { self.index.contains_key(target) }

    /// Every target ordered so that parents precede the targets derived from them.
    pub fn topological_order(&self) -> Result<Vec<&str>> {
        Ok(self.sorted_indices()?.into_iter().map(|idx| self.graph[idx].as_str()).collect())
    }

    /// Direct parents of `target`, in the order they first appeared in the log.
    pub fn parents(&self, target: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(target) else {
            return Vec::new();
        };
        let mut parents: Vec<NodeIndex> = self.graph.neighbors_directed(idx, Direction::Incoming).collect();
        parents.sort();
        parents.into_iter().map(|p| self.graph[p].as_str()).collect()
    }

    /// The operation that produced `target` from `parent`, if they are linked.
    pub fn operation(&self, parent: &str, target: &str) -> Option<&str> {
        let from = *self.index.get(parent)?;
        let to = *self.index.get(target)?;
        let edge = self.graph.find_edge(from, to)?;
        Some(self.graph[edge].as_str())
    }

    /// All transitive predecessors of `target`.
    pub fn ancestors(&self, target: &str) -> Vec<&str> {
        let Some(&start) = self.index.get(target) else {
            return Vec::new();
        };
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for parent in self.graph.neighbors_directed(node, Direction::Incoming) {
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        let mut found: Vec<NodeIndex> = visited.into_iter().collect();
        found.sort();
        found.into_iter().map(|idx| self.graph[idx].as_str()).collect()
    }

    /// Targets with no parents, i.e. raw inputs.
    pub fn roots(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_directed(idx, Direction::Incoming).next().is_none())
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }
}
