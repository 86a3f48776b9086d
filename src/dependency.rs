//! Dependency matrix: a signed score in `[-1, 1]` per ordered activity pair,
//! derived from the directly-follows frequencies in a [`DrSet`].

use crate::lossy::DrSet;
use hashbrown::{HashMap, HashSet};

/// `score(a, b)` close to `1` means `a` is reliably followed by `b` and
/// rarely the reverse; close to `-1` means the opposite; close to `0` means
/// no clear ordering (candidates for an XOR/parallel relation instead).
#[derive(Debug, Clone, Default)]
pub struct DependencyMatrix {
    scores: HashMap<(String, String), f64>,
}

impl DependencyMatrix {
    /// Computes a score for every ordered pair drawn from `activities`.
    /// Self-pairs (`a == a`) use the self-loop formula `f / (f + 1)`; all
    /// other ordered pairs use the asymmetric formula
    /// `(f(a->b) - f(b->a)) / (f(a->b) + f(b->a) + 1)`.
    pub fn build(activities: &HashSet<String>, dr: &DrSet) -> Self {
        let mut scores = HashMap::new();
        for a in activities.iter() {
            for b in activities.iter() {
                let score = if a == b {
                    let f = dr.frequency(a, b) as f64;
                    f / (f + 1.0)
                } else {
                    let forward = dr.frequency(a, b) as f64;
                    let backward = dr.frequency(b, a) as f64;
                    (forward - backward) / (forward + backward + 1.0)
                };
                scores.insert((a.clone(), b.clone()), score);
            }
        }
        tracing::debug!(pairs = scores.len(), "dependency matrix built");
        Self { scores }
    }

    /// Dependency score for the ordered pair `(a, b)`. Pairs not present in
    /// the activity set used to build the matrix score `0.0`.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.scores
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .unwrap_or(0.0)
    }
}
