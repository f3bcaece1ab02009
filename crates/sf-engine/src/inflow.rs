//! External inflow accumulator.
//!
//! A coupled surface model injects node inflow between steps through
//! the coupling surface; the contributions pile up here and the next
//! routing advance drains them into the nodes' lateral inflow. Entries
//! are never cleared except by that consumption, so an injection is
//! always charged to the interval whose routing pass drains it.

#[derive(Debug, Clone, Default)]
pub struct InflowAccumulator {
    pending_cfs: Vec<f64>,
}

impl InflowAccumulator {
    pub fn new(node_count: usize) -> Self {
        Self {
            pending_cfs: vec![0.0; node_count],
        }
    }

    pub fn len(&self) -> usize {
        self.pending_cfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_cfs.is_empty()
    }

    /// Resize for a fresh run and zero every entry.
    pub fn reset(&mut self, node_count: usize) {
        self.pending_cfs.clear();
        self.pending_cfs.resize(node_count, 0.0);
    }

    /// Additive accumulation; repeated calls between steps sum.
    pub fn add(&mut self, node: usize, inflow_cfs: f64) {
        if let Some(slot) = self.pending_cfs.get_mut(node) {
            *slot += inflow_cfs;
        }
    }

    pub fn pending(&self, node: usize) -> f64 {
        self.pending_cfs.get(node).copied().unwrap_or(0.0)
    }

    /// Consume a node's pending inflow, zeroing it.
    pub fn take(&mut self, node: usize) -> f64 {
        match self.pending_cfs.get_mut(node) {
            Some(slot) => std::mem::replace(slot, 0.0),
            None => 0.0,
        }
    }

    pub fn total_pending_cfs(&self) -> f64 {
        self.pending_cfs.iter().sum()
    }
}
