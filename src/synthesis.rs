//! Petri-net synthesis: turn a [`TaskGraph`] into a [`PetriNet`] by greedily
//! extending maximal split/join relations under an XOR-compatibility
//! predicate, then materializing transitions, places, and their edges.
//!
//! Grounded directly on `XOR_Relation`/`HeuristicMiner.generate_petriNet` in
//! the reference implementation: one relation per confirmed dependency edge
//! to start, greedily folded into wider AND/XOR groups while every member
//! stays mutually exclusive with its peers, then deduplicated and
//! materialized one place per surviving relation.

use crate::error::{MinerError, Result};
use crate::graph::TaskGraph;
use crate::lossy::DrSet;
use crate::petri::PetriNet;
use std::collections::BTreeSet;

/// A candidate split/join group: a set of predecessor activities that can
/// all lead into any one of a set of successor activities (or vice versa),
/// with every successor mutually exclusive of its peers (and likewise for
/// predecessors).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relation {
    predecessors: BTreeSet<String>,
    successors: BTreeSet<String>,
}

fn dependency_frequency(dr: &DrSet, a: &str, b: &str) -> f64 {
    dr.frequency(a, b) as f64
}

/// `a -> {b xor c}`: is adding `c` as a second successor alongside `b`
/// (both reachable from `a`) still a valid XOR split?
fn is_a_bc_xor(dr: &DrSet, a: &str, b: &str, c: &str, threshold: f64) -> bool {
    let ratio = (dependency_frequency(dr, b, c) + dependency_frequency(dr, c, b))
        / (dependency_frequency(dr, a, b) + dependency_frequency(dr, a, c) + 1.0);
    ratio < threshold
}

/// `{a xor b} -> c`: is adding `b` as a second predecessor alongside `a`
/// (both leading into `c`) still a valid XOR join?
fn is_ab_c_xor(dr: &DrSet, a: &str, b: &str, c: &str, threshold: f64) -> bool {
    let ratio = (dependency_frequency(dr, a, b) + dependency_frequency(dr, b, a))
        / (dependency_frequency(dr, a, c) + dependency_frequency(dr, b, c) + 1.0);
    ratio < threshold
}

fn is_new_successor_valid(
    dr: &DrSet,
    predecessors: &BTreeSet<String>,
    successors: &BTreeSet<String>,
    candidate: &str,
    threshold: f64,
) -> bool {
    predecessors.iter().all(|pred| {
        successors
            .iter()
            .all(|succ| is_a_bc_xor(dr, pred, succ, candidate, threshold))
    })
}

fn is_new_predecessor_valid(
    dr: &DrSet,
    predecessors: &BTreeSet<String>,
    successors: &BTreeSet<String>,
    candidate: &str,
    threshold: f64,
) -> bool {
    predecessors.iter().all(|pred| {
        successors
            .iter()
            .all(|succ| is_ab_c_xor(dr, pred, candidate, succ, threshold))
    })
}

/// Finds one relation that can be grown by one activity and grows it.
/// Returns `true` if an extension was made (the caller should call again),
/// `false` once no relation can be extended any further.
fn extend_one_relation(relations: &mut [Relation], graph: &TaskGraph, dr: &DrSet, threshold: f64) -> bool {
    for relation in relations.iter_mut() {
        let mut common_successors: Option<BTreeSet<String>> = None;
        for pred in &relation.predecessors {
            let succs = graph
                .node(pred)
                .map(|n| n.successors.clone())
                .unwrap_or_default();
            common_successors = Some(match common_successors {
                None => succs,
                Some(acc) => acc.intersection(&succs).cloned().collect(),
            });
        }
        let mut candidates: BTreeSet<String> = common_successors.unwrap_or_default();
        for existing in &relation.successors {
            candidates.remove(existing);
        }
        for candidate in &candidates {
            if is_new_successor_valid(dr, &relation.predecessors, &relation.successors, candidate, threshold) {
                relation.successors.insert(candidate.clone());
                return true;
            }
        }

        let mut common_predecessors: Option<BTreeSet<String>> = None;
        for succ in &relation.successors {
            let preds = graph
                .node(succ)
                .map(|n| n.predecessors.clone())
                .unwrap_or_default();
            common_predecessors = Some(match common_predecessors {
                None => preds,
                Some(acc) => acc.intersection(&preds).cloned().collect(),
            });
        }
        let mut candidates: BTreeSet<String> = common_predecessors.unwrap_or_default();
        for existing in &relation.predecessors {
            candidates.remove(existing);
        }
        for candidate in &candidates {
            if is_new_predecessor_valid(dr, &relation.predecessors, &relation.successors, candidate, threshold) {
                relation.predecessors.insert(candidate.clone());
                return true;
            }
        }
    }
    false
}

/// Removes exact structural duplicates, keeping the first occurrence.
fn dedup_relations(relations: Vec<Relation>) -> Vec<Relation> {
    let mut seen: Vec<Relation> = Vec::with_capacity(relations.len());
    for relation in relations {
        if !seen.contains(&relation) {
            seen.push(relation);
        }
    }
    seen
}

/// Runs the full synthesis pipeline over a [`TaskGraph`] and returns the
/// materialized [`PetriNet`].
///
/// Fails with [`MinerError::UnknownActivity`] only if a relation references
/// an activity outside the graph it was built from — internal corruption,
/// per the error taxonomy, not a condition this function induces itself.
pub fn synthesize(graph: &TaskGraph, dr: &DrSet, xor_threshold: f64) -> Result<PetriNet> {
    let activities = graph.activities();

    let mut relations = Vec::new();
    for pred in &activities {
        let Some(node) = graph.node(pred) else { continue };
        for succ in &node.successors {
            relations.push(Relation {
                predecessors: BTreeSet::from([pred.clone()]),
                successors: BTreeSet::from([succ.clone()]),
            });
        }
    }

    while extend_one_relation(&mut relations, graph, dr, xor_threshold) {}
    let relations = dedup_relations(relations);

    tracing::debug!(
        activities = activities.len(),
        relations = relations.len(),
        "synthesis relations finalized"
    );

    materialize(&activities, graph, &relations)
}

fn transition_lookup(net: &PetriNet, activity: &str) -> Result<u64> {
    net.transition_id(activity)
        .ok_or_else(|| MinerError::UnknownActivity(activity.to_string()))
}

fn materialize(activities: &BTreeSet<String>, graph: &TaskGraph, relations: &[Relation]) -> Result<PetriNet> {
    let mut net = PetriNet::new();

    for activity in activities {
        net.add_transition(activity.clone());
    }

    for relation in relations {
        let place = net.add_place();
        for pred in &relation.predecessors {
            let transition = transition_lookup(&net, pred)?;
            net.add_edge(transition, place)
                .expect("transition -> place is bipartite by construction");
        }
        for succ in &relation.successors {
            let transition = transition_lookup(&net, succ)?;
            net.add_edge(place, transition)
                .expect("place -> transition is bipartite by construction");
        }
    }

    let sources = graph.sources();
    if !sources.is_empty() {
        let start = net.add_place();
        net.add_marking(start);
        for activity in &sources {
            let transition = transition_lookup(&net, activity)?;
            net.add_edge(start, transition)
                .expect("place -> transition is bipartite by construction");
        }
    }

    let sinks = graph.sinks();
    if !sinks.is_empty() {
        let end = net.add_place();
        for activity in &sinks {
            let transition = transition_lookup(&net, activity)?;
            net.add_edge(transition, end)
                .expect("transition -> place is bipartite by construction");
        }
    }

    Ok(net)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::DependencyMatrix;
    use hashbrown::HashSet;

    fn activities(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn linear_chain_yields_single_path_net() {
        let mut dr = DrSet::new();
        for bucket in 1..=10 {
            dr.observe("a", "b", bucket);
            dr.observe("b", "c", bucket);
        }
        let acts = activities(&["a", "b", "c"]);
        let matrix = DependencyMatrix::build(&acts, &dr);
        let graph = TaskGraph::build(&acts, &matrix, 0.5);
        let net = synthesize(&graph, &dr, 0.8).unwrap();

        let start = net
            .transition_id("a")
            .expect("a registered");
        assert!(net.is_enabled(start));
    }

    #[test]
    fn parallel_split_creates_distinct_relation_per_branch() {
        // a -> b, a -> c, b -> d, c -> d: b and c are not mutually exclusive
        // (AND-split), so extension must not merge them into one XOR group.
        let mut dr = DrSet::new();
        for bucket in 1..=10 {
            dr.observe("a", "b", bucket);
            dr.observe("a", "c", bucket);
            dr.observe("b", "d", bucket);
            dr.observe("c", "d", bucket);
        }
        let acts = activities(&["a", "b", "c", "d"]);
        let matrix = DependencyMatrix::build(&acts, &dr);
        let graph = TaskGraph::build(&acts, &matrix, 0.5);
        let net = synthesize(&graph, &dr, 0.0).unwrap();

        let a = net.transition_id("a").unwrap();
        net.tokens(a);
        assert!(net.transition_id("b").is_some());
        assert!(net.transition_id("c").is_some());
    }
}
