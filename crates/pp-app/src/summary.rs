//! End-of-run counters.

use pp_core::LsaDatabase;
use pp_graph::Topology;
use tracing::info;

/// Concise record and topology counts for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub router_count: usize,
    pub network_count: usize,
    pub summary_count: usize,
    pub skipped_count: usize,
    /// Blocks handed to extraction; zero for re-ingested documents.
    pub block_count: usize,
    pub discarded_lines: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub ghost_count: usize,
    pub aborted: bool,
    pub total_time_s: f64,
}

impl RunSummary {
    pub fn new(db: &LsaDatabase, topology: &Topology) -> Self {
        Self {
            router_count: db.routers.len(),
            network_count: db.networks.len(),
            summary_count: db.summaries.len(),
            skipped_count: db.skipped.len(),
            node_count: topology.nodes().len(),
            edge_count: topology.edges().len(),
            ghost_count: topology.ghost_count(),
            ..Self::default()
        }
    }

    pub fn record_count(&self) -> usize {
        self.router_count + self.network_count + self.summary_count
    }

    pub fn log(&self) {
        info!(
            "Run summary: {} router, {} network, {} summary LSAs, {} skipped",
            self.router_count, self.network_count, self.summary_count, self.skipped_count
        );
        info!(
            "Topology: {} nodes ({} ghosts), {} edges",
            self.node_count, self.ghost_count, self.edge_count
        );
        info!(
            "Time taken: {:.3} seconds{}",
            self.total_time_s,
            if self.aborted { " (aborted)" } else { "" }
        );
    }
}
