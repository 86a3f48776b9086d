//! Batch/windowed variant: ingest whole windows of exact directly-follows
//! counts rather than individual events, per the spec's windowed-vs-streaming
//! open question (see `SPEC_FULL.md` §6).

use crate::config::WindowedMinerConfig;
use crate::dependency::DependencyMatrix;
use crate::error::{MinerError, Result};
use crate::graph::TaskGraph;
use crate::lossy::DrSet;
use crate::petri::PetriNet;
use crate::synthesis::synthesize;
use hashbrown::HashSet;

/// One window's worth of exact directly-follows observations: each
/// `(predecessor, successor)` pair must appear at most once — the window is
/// assumed pre-aggregated by the caller.
#[derive(Debug, Clone, Default)]
pub struct WindowedBatch {
    triples: Vec<(String, String, u64)>,
}

impl WindowedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, predecessor: impl Into<String>, successor: impl Into<String>, frequency: u64) {
        self.triples.push((predecessor.into(), successor.into(), frequency));
    }
}

/// Accumulates whole windows of exact counts into a [`DrSet`] with no lossy
/// eviction — the window itself is the memory bound.
#[derive(Debug, Clone)]
pub struct WindowedMiner {
    config: WindowedMinerConfig,
    dr: DrSet,
    activities: HashSet<String>,
}

impl WindowedMiner {
    pub fn new(config: WindowedMinerConfig) -> Self {
        Self {
            config,
            dr: DrSet::new(),
            activities: HashSet::new(),
        }
    }

    #[tracing::instrument(skip(self, batch))]
    pub fn ingest_window(&mut self, batch: WindowedBatch) -> Result<()> {
        let mut seen = HashSet::new();
        for (predecessor, successor, frequency) in &batch.triples {
            let key = (predecessor.clone(), successor.clone());
            if !seen.insert(key) {
                return Err(MinerError::DuplicateDirectlyFollows(
                    predecessor.clone(),
                    successor.clone(),
                ));
            }
            self.activities.insert(predecessor.clone());
            self.activities.insert(successor.clone());
            self.dr.set_exact(predecessor, successor, *frequency);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn synthesize(&self) -> Result<PetriNet> {
        let matrix = DependencyMatrix::build(&self.activities, &self.dr);
        let graph = TaskGraph::build(&self.activities, &matrix, self.config.depend_threshold());
        synthesize(&graph, &self.dr, self.config.xor_threshold())
    }
}
