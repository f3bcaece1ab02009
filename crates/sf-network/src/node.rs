//! Network nodes.

use crate::geometry::NodeGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Junction,
    Outfall,
    Storage,
    Divider,
}

/// A node of the drainage network.
///
/// Static geometry is set when the network is built; dynamic state is
/// reset by `Network::initialize_state` and advanced by the runoff and
/// routing collaborators. Coupled models read and write nodes through
/// the engine's coupling surface, never by holding references into this
/// table across steps.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Index into the per-kind auxiliary table (storage curves, outfall
    /// stage data). Zero for kinds with no auxiliary data.
    pub sub_index: usize,

    // Static geometry
    pub invert_elev_ft: f64,
    pub init_depth_ft: f64,
    pub full_depth_ft: f64,
    pub surcharge_depth_ft: f64,
    pub ponded_area_ft2: f64,
    pub geometry: NodeGeometry,

    /// Highest pipe crown connected to this node, set at finalize.
    pub crown_elev_ft: f64,
    /// Number of outflow links attached, set at finalize.
    pub degree: u32,

    // Dynamic state
    pub depth_ft: f64,
    pub volume_ft3: f64,
    pub full_volume_ft3: f64,
    pub ponded_volume_ft3: f64,
    pub inflow_cfs: f64,
    pub outflow_cfs: f64,
    pub lateral_inflow_cfs: f64,
    pub runoff_inflow_cfs: f64,
    pub overflow_cfs: f64,
    pub losses_cfs: f64,
    pub updated: bool,
}

impl Node {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            sub_index: 0,
            invert_elev_ft: 0.0,
            init_depth_ft: 0.0,
            full_depth_ft: 0.0,
            surcharge_depth_ft: 0.0,
            ponded_area_ft2: 0.0,
            geometry: NodeGeometry::default(),
            crown_elev_ft: 0.0,
            degree: 0,
            depth_ft: 0.0,
            volume_ft3: 0.0,
            full_volume_ft3: 0.0,
            ponded_volume_ft3: 0.0,
            inflow_cfs: 0.0,
            outflow_cfs: 0.0,
            lateral_inflow_cfs: 0.0,
            runoff_inflow_cfs: 0.0,
            overflow_cfs: 0.0,
            losses_cfs: 0.0,
            updated: false,
        }
    }

    /// Hydraulic head: invert plus current depth.
    pub fn head_ft(&self) -> f64 {
        self.invert_elev_ft + self.depth_ft
    }

    /// Crest elevation: invert plus full depth.
    pub fn crest_elev_ft(&self) -> f64 {
        self.invert_elev_ft + self.full_depth_ft
    }

    /// Change the full depth and recompute the full volume through the
    /// node geometry, as one operation so the pair never disagrees.
    pub fn set_full_depth(&mut self, depth_ft: f64) {
        self.full_depth_ft = depth_ft.max(0.0);
        self.full_volume_ft3 = self.geometry.volume_of_depth_ft3(self.full_depth_ft);
    }

    /// Reset dynamic state to the initial condition.
    pub fn initialize_state(&mut self) {
        self.depth_ft = self.init_depth_ft.min(self.full_depth_ft);
        self.volume_ft3 = self.geometry.volume_of_depth_ft3(self.depth_ft);
        self.full_volume_ft3 = self.geometry.volume_of_depth_ft3(self.full_depth_ft);
        self.ponded_volume_ft3 = 0.0;
        self.inflow_cfs = 0.0;
        self.outflow_cfs = 0.0;
        self.lateral_inflow_cfs = 0.0;
        self.runoff_inflow_cfs = 0.0;
        self.overflow_cfs = 0.0;
        self.losses_cfs = 0.0;
        self.updated = false;
    }
}
