//! Coupling surface for external models.
//!
//! A host model (e.g. a 2D surface-flow solver) exchanges state with a
//! live session through these methods: snapshot readers over nodes and
//! links, and a small set of writers that feed lateral inflows and
//! adjust node geometry between steps. Everything is index-addressed;
//! every indexed operation bounds-checks and returns
//! `EngineError::Index` without touching the error register.

use sf_network::{Link, LinkKind, Node, NodeKind};

use crate::error::{EngineError, EngineResult};
use crate::session::Session;

/// Point-in-time view of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub kind: NodeKind,
    pub sub_index: usize,
    pub invert_elev_ft: f64,
    pub init_depth_ft: f64,
    pub full_depth_ft: f64,
    pub surcharge_depth_ft: f64,
    pub ponded_area_ft2: f64,
    pub degree: u32,
    pub updated: bool,
    pub crown_elev_ft: f64,
    pub inflow_cfs: f64,
    pub outflow_cfs: f64,
    pub losses_cfs: f64,
    pub volume_ft3: f64,
    pub full_volume_ft3: f64,
    pub overflow_cfs: f64,
    pub depth_ft: f64,
    /// Hydraulic head, invert plus depth.
    pub head_ft: f64,
    /// Crest elevation, invert plus full depth.
    pub crest_elev_ft: f64,
    pub lateral_inflow_cfs: f64,
}

/// Point-in-time view of one link. Flow and velocity carry the link
/// direction sign.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkState {
    pub kind: LinkKind,
    pub flow_cfs: f64,
    pub depth_ft: f64,
    pub velocity_fps: f64,
    pub volume_ft3: f64,
    pub from_offset_ft: f64,
    pub to_offset_ft: f64,
    pub full_depth_ft: f64,
    pub froude: f64,
    pub setting: f64,
}

impl Session {
    fn node_checked(&self, index: usize) -> EngineResult<&Node> {
        let len = self.network.nodes.len();
        self.network
            .nodes
            .get(index)
            .ok_or(EngineError::Index {
                what: "node",
                index,
                len,
            })
    }

    fn node_checked_mut(&mut self, index: usize) -> EngineResult<&mut Node> {
        let len = self.network.nodes.len();
        self.network
            .nodes
            .get_mut(index)
            .ok_or(EngineError::Index {
                what: "node",
                index,
                len,
            })
    }

    fn link_checked(&self, index: usize) -> EngineResult<&Link> {
        let len = self.network.links.len();
        self.network
            .links
            .get(index)
            .ok_or(EngineError::Index {
                what: "link",
                index,
                len,
            })
    }

    // ---- readers --------------------------------------------------

    pub fn node_count(&self) -> usize {
        self.network.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.network.link_count()
    }

    pub fn node_name(&self, index: usize) -> EngineResult<&str> {
        Ok(&self.node_checked(index)?.name)
    }

    pub fn link_name(&self, index: usize) -> EngineResult<&str> {
        Ok(&self.link_checked(index)?.name)
    }

    /// Total inflow of every node, in node order.
    pub fn nodes_inflow(&self) -> Vec<f64> {
        self.network.nodes.iter().map(|n| n.inflow_cfs).collect()
    }

    /// Outflow of every node, in node order.
    pub fn nodes_outflow(&self) -> Vec<f64> {
        self.network.nodes.iter().map(|n| n.outflow_cfs).collect()
    }

    /// Hydraulic head of every node, in node order.
    pub fn nodes_head(&self) -> Vec<f64> {
        self.network.nodes.iter().map(Node::head_ft).collect()
    }

    pub fn node_state(&self, index: usize) -> EngineResult<NodeState> {
        let node = self.node_checked(index)?;
        Ok(NodeState {
            kind: node.kind,
            sub_index: node.sub_index,
            invert_elev_ft: node.invert_elev_ft,
            init_depth_ft: node.init_depth_ft,
            full_depth_ft: node.full_depth_ft,
            surcharge_depth_ft: node.surcharge_depth_ft,
            ponded_area_ft2: node.ponded_area_ft2,
            degree: node.degree,
            updated: node.updated,
            crown_elev_ft: node.crown_elev_ft,
            inflow_cfs: node.inflow_cfs,
            outflow_cfs: node.outflow_cfs,
            losses_cfs: node.losses_cfs,
            volume_ft3: node.volume_ft3,
            full_volume_ft3: node.full_volume_ft3,
            overflow_cfs: node.overflow_cfs,
            depth_ft: node.depth_ft,
            head_ft: node.head_ft(),
            crest_elev_ft: node.crest_elev_ft(),
            lateral_inflow_cfs: node.lateral_inflow_cfs,
        })
    }

    pub fn link_state(&self, index: usize) -> EngineResult<LinkState> {
        let link = self.link_checked(index)?;
        Ok(LinkState {
            kind: link.kind,
            flow_cfs: link.flow_cfs * link.direction,
            depth_ft: link.depth_ft,
            velocity_fps: link.velocity_fps(link.flow_cfs, link.depth_ft) * link.direction,
            volume_ft3: link.volume_ft3,
            from_offset_ft: link.offset1_ft,
            to_offset_ft: link.offset2_ft,
            full_depth_ft: link.xsect.y_full_ft(),
            froude: link.froude,
            setting: link.setting,
        })
    }

    // ---- writers --------------------------------------------------

    /// Accumulate an external lateral inflow on a node. Additive across
    /// calls; the next routing advance consumes (drains) the total.
    pub fn add_node_inflow(&mut self, index: usize, q_cfs: f64) -> EngineResult<()> {
        self.node_checked(index)?;
        self.inflows.add(index, q_cfs);
        Ok(())
    }

    /// Set a node's full depth and recompute its full volume through the
    /// node geometry in the same call.
    pub fn set_node_full_depth(&mut self, index: usize, depth_ft: f64) -> EngineResult<()> {
        self.node_checked_mut(index)?.set_full_depth(depth_ft);
        Ok(())
    }

    /// Toggle surface ponding globally; takes effect on the next
    /// routing advance.
    pub fn set_allow_ponding(&mut self, allow: bool) {
        self.allow_ponding = allow;
    }

    pub fn set_node_ponded_area(&mut self, index: usize, area_ft2: f64) -> EngineResult<()> {
        self.node_checked_mut(index)?.ponded_area_ft2 = area_ft2;
        Ok(())
    }
}
