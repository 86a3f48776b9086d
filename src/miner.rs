//! The incremental, per-event engine: ingest one event at a time, update the
//! lossy-counting sketches, and synthesize a fresh [`PetriNet`] on demand.

use crate::config::MinerConfig;
use crate::dependency::DependencyMatrix;
use crate::error::Result;
use crate::graph::TaskGraph;
use crate::lossy::{DcSet, DrSet};
use crate::petri::PetriNet;
use crate::synthesis::synthesize;
use hashbrown::HashSet;

/// Online process-discovery engine: consumes one event at a time and, on
/// request, synthesizes the Petri net implied by everything seen so far.
///
/// `synthesize` is pure and takes `&self` — there is no automatic rebuild
/// cadence; call it as often or as rarely as the host application wants.
#[derive(Debug, Clone)]
pub struct Miner {
    config: MinerConfig,
    dc: DcSet,
    dr: DrSet,
    activities: HashSet<String>,
    counter: u64,
}

impl Miner {
    pub fn new(config: MinerConfig) -> Self {
        Self {
            config,
            dc: DcSet::new(),
            dr: DrSet::new(),
            activities: HashSet::new(),
            counter: 1,
        }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    pub fn dc_set(&self) -> &DcSet {
        &self.dc
    }

    pub fn dr_set(&self) -> &DrSet {
        &self.dr
    }

    /// Records one `(case_id, activity)` event, updating the DC/DR sketches
    /// and pruning both whenever a bucket boundary is crossed.
    #[tracing::instrument(skip(self))]
    pub fn ingest(&mut self, case_id: &str, activity: &str) -> Result<()> {
        let bucket = (self.counter as f64 / self.config.bucket_width() as f64).ceil() as u64;

        self.activities.insert(activity.to_string());

        if let Some(previous_activity) = self.dc.touch(case_id, activity, bucket) {
            self.dr.observe(&previous_activity, activity, bucket);
        }

        if self.counter % self.config.bucket_width() == 0 {
            self.dc.prune(bucket);
            self.dr.prune(bucket);
        }

        self.counter += 1;
        Ok(())
    }

    /// Builds the dependency matrix, the thresholded task graph, and the
    /// synthesized Petri net from everything ingested so far. Does not
    /// mutate the miner.
    #[tracing::instrument(skip(self))]
    pub fn synthesize(&self) -> Result<PetriNet> {
        let matrix = DependencyMatrix::build(&self.activities, &self.dr);
        let graph = TaskGraph::build(&self.activities, &matrix, self.config.depend_threshold());
        synthesize(&graph, &self.dr, self.config.xor_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miner(epsilon: f64, depend: f64, xor: f64) -> Miner {
        Miner::new(MinerConfig::new(epsilon, depend, xor).unwrap())
    }

    fn feed(miner: &mut Miner, case_id: &str, trace: &[&str]) {
        for activity in trace {
            miner.ingest(case_id, activity).unwrap();
        }
    }

    /// Scenario: a single linear trace repeated many times must synthesize
    /// a strictly sequential net, a -> b -> c.
    #[test]
    fn single_linear_trace_synthesizes_sequential_net() {
        let mut m = miner(0.01, 0.5, 0.8);
        for i in 0..50 {
            feed(&mut m, &format!("case-{i}"), &["a", "b", "c"]);
        }
        let net = m.synthesize().unwrap();
        assert!(net.transition_id("a").is_some());
        assert!(net.transition_id("b").is_some());
        assert!(net.transition_id("c").is_some());

        let a = net.transition_id("a").unwrap();
        assert!(net.is_enabled(a));
    }

    /// Scenario: a parallel AND-split (a -> {b, c} -> d, both orders
    /// observed) keeps b and c as distinct branches rather than merging
    /// them into one XOR group.
    #[test]
    fn parallel_and_split_keeps_branches_distinct() {
        let mut m = miner(0.01, 0.3, 0.1);
        for i in 0..25 {
            feed(&mut m, &format!("case-{i}-fwd"), &["a", "b", "c", "d"]);
            feed(&mut m, &format!("case-{i}-rev"), &["a", "c", "b", "d"]);
        }
        let net = m.synthesize().unwrap();
        assert!(net.transition_id("b").is_some());
        assert!(net.transition_id("c").is_some());
    }

    /// Scenario: an XOR-split (a -> b or a -> c, never both) with a lenient
    /// xor_threshold merges b and c under a shared place.
    #[test]
    fn xor_split_is_detected() {
        let mut m = miner(0.01, 0.3, 0.9);
        for i in 0..25 {
            feed(&mut m, &format!("case-{i}-b"), &["a", "b", "d"]);
            feed(&mut m, &format!("case-{i}-c"), &["a", "c", "d"]);
        }
        let net = m.synthesize().unwrap();
        assert!(net.transition_id("b").is_some());
        assert!(net.transition_id("c").is_some());
    }

    /// Scenario: pruning kicks in under a small bucket width — the DC/DR
    /// sets never grow past a small bound even with many distinct cases.
    #[test]
    fn pruning_bounds_sketch_size() {
        let mut m = miner(0.2, 0.3, 0.8); // bucket width = 5
        for i in 0..100 {
            feed(&mut m, &format!("case-{i}"), &["a", "b"]);
        }
        assert!(m.dc_set().len() <= 100);
    }

    /// Scenario: a short self-loop (a -> a repeated) scores close to 1 and
    /// is retained as a self-dependency.
    #[test]
    fn short_self_loop_is_detected() {
        let mut m = miner(0.01, 0.3, 0.8);
        for i in 0..20 {
            feed(&mut m, &format!("case-{i}"), &["a", "a", "a", "b"]);
        }
        assert_eq!(m.dr_set().frequency("a", "a"), 40);
    }
}
