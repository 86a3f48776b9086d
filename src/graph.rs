//! Successor/predecessor graph: one [`TaskNode`] per observed activity,
//! thresholded at θ_dep from the [`DependencyMatrix`].

use crate::dependency::DependencyMatrix;
use hashbrown::{HashSet, HashMap};
use std::collections::BTreeSet;

/// An activity's confirmed predecessors and successors, per the θ_dep
/// threshold.
#[derive(Debug, Clone, Default)]
pub struct TaskNode {
    pub predecessors: BTreeSet<String>,
    pub successors: BTreeSet<String>,
}

/// The full set of task nodes discovered so far. Never pruned: an activity
/// once observed stays registered for the lifetime of the graph, matching
/// the documented "task registration leak" in the design notes.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: HashMap<String, TaskNode>,
}

impl TaskGraph {
    /// Builds a graph covering exactly `activities`, using `matrix` scores
    /// compared against `theta_dep` with `>=` (inclusive), matching the
    /// reference implementation.
    pub fn build(activities: &HashSet<String>, matrix: &DependencyMatrix, theta_dep: f64) -> Self {
        let mut nodes: HashMap<String, TaskNode> = activities
            .iter()
            .map(|a| (a.clone(), TaskNode::default()))
            .collect();

        for predecessor in activities.iter() {
            for successor in activities.iter() {
                if matrix.score(predecessor, successor) >= theta_dep {
                    nodes
                        .get_mut(predecessor)
                        .expect("predecessor registered above")
                        .successors
                        .insert(successor.clone());
                    nodes
                        .get_mut(successor)
                        .expect("successor registered above")
                        .predecessors
                        .insert(predecessor.clone());
                }
            }
        }

        tracing::debug!(activities = activities.len(), theta_dep, "task graph built");
        Self { nodes }
    }

    pub fn node(&self, activity: &str) -> Option<&TaskNode> {
        self.nodes.get(activity)
    }

    /// Activities in ascending lexicographic order, for deterministic
    /// downstream iteration.
    pub fn activities(&self) -> BTreeSet<String> {
        self.nodes.keys().cloned().collect()
    }

    /// Activities with no confirmed predecessor — candidate start
    /// transitions.
    pub fn sources(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.predecessors.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Activities with no confirmed successor — candidate end transitions.
    pub fn sinks(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.successors.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lossy::DrSet;

    fn activities(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut dr = DrSet::new();
        for bucket in 1..=9 {
            dr.observe("a", "b", bucket);
        }
        let acts = activities(&["a", "b"]);
        let matrix = DependencyMatrix::build(&acts, &dr);
        let score = matrix.score("a", "b");
        let graph = TaskGraph::build(&acts, &matrix, score);
        assert!(graph.node("a").unwrap().successors.contains("b"));
    }

    #[test]
    fn linear_chain_has_one_source_and_one_sink() {
        let mut dr = DrSet::new();
        for bucket in 1..=10 {
            dr.observe("a", "b", bucket);
            dr.observe("b", "c", bucket);
        }
        let acts = activities(&["a", "b", "c"]);
        let matrix = DependencyMatrix::build(&acts, &dr);
        let graph = TaskGraph::build(&acts, &matrix, 0.5);
        assert_eq!(graph.sources(), ["a".to_string()].into_iter().collect());
        assert_eq!(graph.sinks(), ["c".to_string()].into_iter().collect());
    }
}
