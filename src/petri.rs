//! The Petri net produced by synthesis: places, transitions, their edges,
//! and token-replay firing semantics.
//!
//! Structurally grounded on the reference `PetriNet`/`Place`/`Transition`
//! classes: nodes live in one id-keyed map, edges are recorded as
//! predecessor/successor id sets on each node, and `generate_json` walks
//! that map to produce the same `{"type", "name", "successor"}` shape.

use crate::error::Result;
use hashbrown::HashMap;
use serde::Serialize;

#[derive(Debug, Clone)]
enum Node {
    Place { tokens: u64 },
    Transition { name: String },
}

#[derive(Debug, Clone, Default)]
struct Edges {
    predecessors: Vec<u64>,
    successors: Vec<u64>,
}

/// A bipartite place/transition net: every edge in `add_edge` must connect a
/// place to a transition or vice versa.
#[derive(Debug, Clone, Default)]
pub struct PetriNet {
    nodes: HashMap<u64, Node>,
    edges: HashMap<u64, Edges>,
    transition_ids: HashMap<String, u64>,
    next_id: u64,
}

/// Returned by `add_edge` when the two endpoints are both places or both
/// transitions, which would break the net's bipartite invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("edge {0} -> {1} would connect two nodes of the same kind")]
pub struct NotBipartiteError(pub u64, pub u64);

impl PetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, Node::Place { tokens: 0 });
        self.edges.insert(id, Edges::default());
        id
    }

    pub fn add_transition(&mut self, name: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let name = name.into();
        self.transition_ids.insert(name.clone(), id);
        self.nodes.insert(id, Node::Transition { name });
        self.edges.insert(id, Edges::default());
        id
    }

    pub fn transition_id(&self, name: &str) -> Option<u64> {
        self.transition_ids.get(name).copied()
    }

    fn is_place(&self, id: u64) -> bool {
        matches!(self.nodes.get(&id), Some(Node::Place { .. }))
    }

    pub fn add_edge(&mut self, source: u64, target: u64) -> std::result::Result<(), NotBipartiteError> {
        if self.is_place(source) == self.is_place(target) {
            return Err(NotBipartiteError(source, target));
        }
        self.edges
            .get_mut(&source)
            .expect("source registered")
            .successors
            .push(target);
        self.edges
            .get_mut(&target)
            .expect("target registered")
            .predecessors
            .push(source);
        Ok(())
    }

    pub fn add_marking(&mut self, place_id: u64) {
        if let Some(Node::Place { tokens }) = self.nodes.get_mut(&place_id) {
            *tokens += 1;
        }
    }

    pub fn tokens(&self, place_id: u64) -> u64 {
        match self.nodes.get(&place_id) {
            Some(Node::Place { tokens }) => *tokens,
            _ => 0,
        }
    }

    /// A transition is enabled when every one of its input places holds at
    /// least one token.
    pub fn is_enabled(&self, transition_id: u64) -> bool {
        let Some(edges) = self.edges.get(&transition_id) else {
            return false;
        };
        edges.predecessors.iter().all(|place| self.tokens(*place) > 0)
    }

    /// Fires `transition_id`: consumes a token from every input place
    /// (counting, but not blocking on, places that had none) and produces a
    /// token in every output place. Returns `(missing, consumed, produced)`
    /// where `missing` is the number of input places that had no token to
    /// consume, `consumed` is the total number of input places visited, and
    /// `produced` is the number of output places visited.
    pub fn fire_transition(&mut self, transition_id: u64) -> (u64, u64, u64) {
        let edges = self
            .edges
            .get(&transition_id)
            .cloned()
            .unwrap_or_default();

        let mut missing = 0u64;
        let mut consumed = 0u64;
        for place_id in &edges.predecessors {
            if self.tokens(*place_id) == 0 {
                missing += 1;
            } else if let Some(Node::Place { tokens }) = self.nodes.get_mut(place_id) {
                *tokens -= 1;
            }
            consumed += 1;
        }

        let mut produced = 0u64;
        for place_id in &edges.successors {
            if let Some(Node::Place { tokens }) = self.nodes.get_mut(place_id) {
                *tokens += 1;
            }
            produced += 1;
        }

        (missing, consumed, produced)
    }

    /// Mechanical JSON dump of every node: `{"type", "name", "successor"}`,
    /// where a place's successors are transition names and a transition's
    /// successors are place ids (as strings) — matching the reference
    /// implementation's shape exactly.
    pub fn generate_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct NodeJson {
            #[serde(rename = "type")]
            kind: &'static str,
            name: String,
            successor: Vec<String>,
        }

        let mut out = Vec::with_capacity(self.nodes.len());
        for (id, node) in &self.nodes {
            let edges = self.edges.get(id).cloned().unwrap_or_default();
            let entry = match node {
                Node::Place { .. } => NodeJson {
                    kind: "place",
                    name: id.to_string(),
                    successor: edges
                        .successors
                        .iter()
                        .filter_map(|succ| match self.nodes.get(succ) {
                            Some(Node::Transition { name }) => Some(name.clone()),
                            _ => None,
                        })
                        .collect(),
                },
                Node::Transition { name } => NodeJson {
                    kind: "transition",
                    name: name.clone(),
                    successor: edges.successors.iter().map(|succ| succ.to_string()).collect(),
                },
            };
            out.push(entry);
        }
        Ok(serde_json::to_string(&out)?)
    }

    /// All place ids, in ascending order.
    pub fn place_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n, Node::Place { .. }))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All transition ids, in ascending order.
    pub fn transition_ids_sorted(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n, Node::Transition { .. }))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Renders `net` as Graphviz DOT source: places as unlabelled circles,
/// transitions as boxes labelled with their activity name. A thin, mechanical
/// text producer — no layout, no rasterization.
pub fn generate_dot_code(net: &PetriNet) -> String {
    let mut out = String::from("digraph PetriNet {\n");
    for id in net.place_ids() {
        let label = if net.tokens(id) > 0 { "start" } else { "" };
        out.push_str(&format!("  x{id} [shape=circle label=\"{label}\"];\n"));
    }
    for id in net.transition_ids_sorted() {
        if let Some(Node::Transition { name }) = net.nodes.get(&id) {
            out.push_str(&format!("  x{id} [shape=box label=\"{name}\"];\n"));
        }
    }
    let mut ids: Vec<&u64> = net.nodes.keys().collect();
    ids.sort();
    for id in ids {
        if let Some(edges) = net.edges.get(id) {
            for succ in &edges.successors {
                out.push_str(&format!("  x{id} -> x{succ};\n"));
            }
        }
    }
    out.push_str("}\n");
    out
}
