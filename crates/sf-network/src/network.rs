//! The network: entity tables plus derived topology.

use std::collections::HashMap;

use crate::catchment::{Catchment, RainGage};
use crate::error::{NetworkError, NetworkResult};
use crate::link::{Link, LinkKind};
use crate::node::{Node, NodeKind};
use crate::xsect::XSection;

/// A validated drainage network.
///
/// Entities live in vectors and are addressed by stable `usize` index in
/// declaration order; names resolve through the index maps built by
/// `finalize`.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub catchments: Vec<Catchment>,
    pub gages: Vec<RainGage>,

    node_names: HashMap<String, usize>,
    link_names: HashMap<String, usize>,
    /// Node indices ordered upstream to downstream.
    topo_order: Vec<usize>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn catchment_count(&self) -> usize {
        self.catchments.len()
    }

    /// Add a node, returning its index.
    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::new(name, kind));
        index
    }

    /// Add a link between two existing nodes, returning its index.
    pub fn add_link(
        &mut self,
        name: &str,
        kind: LinkKind,
        from_node: usize,
        to_node: usize,
        xsect: XSection,
    ) -> NetworkResult<usize> {
        let len = self.nodes.len();
        if from_node >= len {
            return Err(NetworkError::NodeIndex { index: from_node, len });
        }
        if to_node >= len {
            return Err(NetworkError::NodeIndex { index: to_node, len });
        }
        let index = self.links.len();
        let mut link = Link::new(name, kind, from_node, to_node);
        link.xsect = xsect;
        self.links.push(link);
        Ok(index)
    }

    pub fn add_gage(&mut self, gage: RainGage) -> usize {
        self.gages.push(gage);
        self.gages.len() - 1
    }

    pub fn add_catchment(&mut self, catchment: Catchment) -> NetworkResult<usize> {
        let len = self.nodes.len();
        if catchment.outlet_node >= len {
            return Err(NetworkError::NodeIndex {
                index: catchment.outlet_node,
                len,
            });
        }
        self.catchments.push(catchment);
        Ok(self.catchments.len() - 1)
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.node_names.get(name).copied()
    }

    pub fn link_index(&self, name: &str) -> Option<usize> {
        self.link_names.get(name).copied()
    }

    pub fn node(&self, index: usize) -> NetworkResult<&Node> {
        self.nodes.get(index).ok_or(NetworkError::NodeIndex {
            index,
            len: self.nodes.len(),
        })
    }

    pub fn node_mut(&mut self, index: usize) -> NetworkResult<&mut Node> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(index)
            .ok_or(NetworkError::NodeIndex { index, len })
    }

    pub fn link(&self, index: usize) -> NetworkResult<&Link> {
        self.links.get(index).ok_or(NetworkError::LinkIndex {
            index,
            len: self.links.len(),
        })
    }

    pub fn link_mut(&mut self, index: usize) -> NetworkResult<&mut Link> {
        let len = self.links.len();
        self.links
            .get_mut(index)
            .ok_or(NetworkError::LinkIndex { index, len })
    }

    /// Node indices in upstream-to-downstream order. Valid after
    /// `finalize`.
    pub fn topological_order(&self) -> &[usize] {
        &self.topo_order
    }

    /// Build the derived tables: name maps (rejecting duplicates),
    /// outflow degrees, link orientation, crown elevations, and the
    /// topological ordering.
    pub fn finalize(&mut self) -> NetworkResult<()> {
        self.node_names.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            if self.node_names.insert(node.name.clone(), i).is_some() {
                return Err(NetworkError::DuplicateName {
                    what: "node",
                    name: node.name.clone(),
                });
            }
        }
        self.link_names.clear();
        for (i, link) in self.links.iter().enumerate() {
            if self.link_names.insert(link.name.clone(), i).is_some() {
                return Err(NetworkError::DuplicateName {
                    what: "link",
                    name: link.name.clone(),
                });
            }
        }

        for node in &mut self.nodes {
            node.degree = 0;
            node.crown_elev_ft = node.invert_elev_ft;
        }
        for link in &self.links {
            let end1 = self.nodes[link.from_node].invert_elev_ft + link.offset1_ft;
            let end2 = self.nodes[link.to_node].invert_elev_ft + link.offset2_ft;
            let y_full = link.xsect.y_full_ft();
            let crown1 = end1 + y_full;
            let crown2 = end2 + y_full;
            let n1 = &mut self.nodes[link.from_node];
            n1.degree += 1;
            n1.crown_elev_ft = n1.crown_elev_ft.max(crown1);
            let n2 = &mut self.nodes[link.to_node];
            n2.crown_elev_ft = n2.crown_elev_ft.max(crown2);
        }
        // Conduits entered uphill report flow with a reversed sign.
        for link in &mut self.links {
            if link.kind == LinkKind::Conduit {
                let end1 = self.nodes[link.from_node].invert_elev_ft + link.offset1_ft;
                let end2 = self.nodes[link.to_node].invert_elev_ft + link.offset2_ft;
                link.direction = if end1 >= end2 { 1.0 } else { -1.0 };
            } else {
                link.direction = 1.0;
            }
        }

        for node in &self.nodes {
            node.geometry.validate(&node.name)?;
        }

        self.topo_order = self.compute_topological_order();
        Ok(())
    }

    /// Reset all dynamic state to initial conditions.
    pub fn initialize_state(&mut self) {
        for node in &mut self.nodes {
            node.initialize_state();
        }
        for link in &mut self.links {
            link.initialize_state();
        }
    }

    /// Total stored volume over all nodes, ponded storage included.
    pub fn total_stored_volume_ft3(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.volume_ft3 + n.ponded_volume_ft3)
            .sum()
    }

    // Kahn's algorithm over from->to edges; a cycle leaves the
    // remaining nodes in declaration order at the tail.
    fn compute_topological_order(&self) -> Vec<usize> {
        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        for link in &self.links {
            in_degree[link.to_node] += 1;
        }
        let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        let mut head = 0;
        while head < queue.len() {
            let u = queue[head];
            head += 1;
            order.push(u);
            for link in &self.links {
                if link.from_node == u {
                    in_degree[link.to_node] -= 1;
                    if in_degree[link.to_node] == 0 {
                        queue.push(link.to_node);
                    }
                }
            }
        }
        if order.len() < n {
            let mut seen = vec![false; n];
            for &i in &order {
                seen[i] = true;
            }
            order.extend((0..n).filter(|&i| !seen[i]));
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_net() -> Network {
        let mut net = Network::new();
        let a = net.add_node("A", NodeKind::Junction);
        let b = net.add_node("B", NodeKind::Outfall);
        net.nodes[a].invert_elev_ft = 10.0;
        net.nodes[b].invert_elev_ft = 5.0;
        net.add_link(
            "A-B",
            LinkKind::Conduit,
            a,
            b,
            XSection::Circular { diameter_ft: 2.0 },
        )
        .unwrap();
        net
    }

    #[test]
    fn finalize_builds_lookup_and_degree() {
        let mut net = two_node_net();
        net.finalize().unwrap();
        assert_eq!(net.node_index("A"), Some(0));
        assert_eq!(net.link_index("A-B"), Some(0));
        assert_eq!(net.nodes[0].degree, 1);
        assert_eq!(net.nodes[1].degree, 0);
        assert_eq!(net.topological_order(), &[0, 1]);
    }

    #[test]
    fn finalize_sets_crown_elevation() {
        let mut net = two_node_net();
        net.finalize().unwrap();
        // Crown at A = invert 10 + offset 0 + yFull 2.
        assert!((net.nodes[0].crown_elev_ft - 12.0).abs() < 1e-12);
    }

    #[test]
    fn uphill_conduit_reverses_direction() {
        let mut net = Network::new();
        let a = net.add_node("A", NodeKind::Junction);
        let b = net.add_node("B", NodeKind::Junction);
        net.nodes[a].invert_elev_ft = 1.0;
        net.nodes[b].invert_elev_ft = 4.0;
        net.add_link(
            "A-B",
            LinkKind::Conduit,
            a,
            b,
            XSection::Circular { diameter_ft: 1.0 },
        )
        .unwrap();
        net.finalize().unwrap();
        assert_eq!(net.links[0].direction, -1.0);
    }

    #[test]
    fn duplicate_node_name_rejected() {
        let mut net = Network::new();
        net.add_node("A", NodeKind::Junction);
        net.add_node("A", NodeKind::Junction);
        assert!(matches!(
            net.finalize(),
            Err(NetworkError::DuplicateName { what: "node", .. })
        ));
    }

    #[test]
    fn link_to_unknown_node_rejected() {
        let mut net = Network::new();
        net.add_node("A", NodeKind::Junction);
        let err = net
            .add_link("bad", LinkKind::Conduit, 0, 7, XSection::Dummy)
            .unwrap_err();
        assert!(matches!(err, NetworkError::NodeIndex { index: 7, len: 1 }));
    }

    #[test]
    fn cycle_falls_back_to_declaration_order() {
        let mut net = Network::new();
        let a = net.add_node("A", NodeKind::Junction);
        let b = net.add_node("B", NodeKind::Junction);
        net.add_link("A-B", LinkKind::Conduit, a, b, XSection::Dummy)
            .unwrap();
        net.add_link("B-A", LinkKind::Conduit, b, a, XSection::Dummy)
            .unwrap();
        net.finalize().unwrap();
        assert_eq!(net.topological_order().len(), 2);
    }
}
