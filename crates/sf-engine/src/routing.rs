//! Reference routing engine.
//!
//! A capacity-bounded pass-through in topological order with storage
//! continuity, ponding, and overflow accounting. No wave equations are
//! solved; this engine exists to exercise the session's clocks, the
//! inflow accumulator contract, and the mass-balance ledgers. Real
//! hydraulics plug in behind the same trait.

use sf_network::{Network, NodeKind};

use crate::error::{EngineError, EngineResult};
use crate::fault::FaultKind;
use crate::inflow::InflowAccumulator;
use crate::traits::{RoutingContext, RoutingEngine, RoutingIncrement, RoutingMethod};

const GRAVITY_FT_S2: f64 = 32.174;

#[derive(Debug, Clone)]
pub struct CapacityRouting {
    method: RoutingMethod,
    /// Outgoing link indices per node, built at open.
    out_links: Vec<Vec<usize>>,
    open: bool,
}

impl CapacityRouting {
    pub fn new(method: RoutingMethod) -> Self {
        Self {
            method,
            out_links: Vec::new(),
            open: false,
        }
    }

    pub fn method(&self) -> RoutingMethod {
        self.method
    }

    fn link_capacity_cfs(network: &Network, link: usize) -> f64 {
        let link = &network.links[link];
        if link.capacity_cfs > 0.0 {
            link.capacity_cfs * link.setting
        } else {
            f64::INFINITY
        }
    }
}

impl RoutingEngine for CapacityRouting {
    fn open(&mut self, network: &mut Network, nominal_step_s: f64) -> EngineResult<()> {
        if nominal_step_s <= 0.0 {
            return Err(EngineError::Routing {
                message: format!("nominal routing step {nominal_step_s} is not positive"),
            });
        }
        self.out_links = vec![Vec::new(); network.node_count()];
        for (i, link) in network.links.iter().enumerate() {
            self.out_links[link.from_node].push(i);
        }
        self.open = true;
        Ok(())
    }

    fn next_step_s(&self, _network: &Network, nominal_step_s: f64) -> f64 {
        // Pass-through conveyance has no stability bound of its own.
        nominal_step_s
    }

    fn advance(
        &mut self,
        network: &mut Network,
        inflows: &mut InflowAccumulator,
        ctx: &RoutingContext<'_>,
    ) -> EngineResult<RoutingIncrement> {
        if !self.open {
            return Err(EngineError::Routing {
                message: "routing engine advanced before open".to_string(),
            });
        }
        let dt = ctx.step_s;
        let evap_rate_ft_s = ctx.climate.evap_rate_ft_s();

        let mut lateral_inflow_ft3 = 0.0;
        let mut outflow_ft3 = 0.0;
        let mut flooding_ft3 = 0.0;
        let mut evap_ft3 = 0.0;

        // Lateral inflow: generated runoff plus whatever the coupled
        // model injected since the last advance. Taking from the
        // accumulator is what consumes the injection.
        for i in 0..network.node_count() {
            let external_cfs = inflows.take(i);
            let node = &mut network.nodes[i];
            node.lateral_inflow_cfs = node.runoff_inflow_cfs + external_cfs;
            node.inflow_cfs = 0.0;
            node.overflow_cfs = 0.0;
            node.losses_cfs = 0.0;
            node.updated = false;
            lateral_inflow_ft3 += node.lateral_inflow_cfs * dt;
        }

        // Upstream-to-downstream sweep: each node's upstream link flows
        // are settled before the node drains.
        let order = network.topological_order().to_vec();
        let mut upstream_cfs = vec![0.0; network.node_count()];
        for &i in &order {
            let node_kind = network.nodes[i].kind;
            let total_in_cfs = network.nodes[i].lateral_inflow_cfs + upstream_cfs[i];
            network.nodes[i].inflow_cfs = total_in_cfs;

            if node_kind == NodeKind::Outfall {
                // Outfalls discharge everything they receive.
                let node = &mut network.nodes[i];
                node.outflow_cfs = total_in_cfs + node.volume_ft3 / dt;
                outflow_ft3 += node.outflow_cfs * dt;
                node.volume_ft3 = 0.0;
                node.depth_ft = 0.0;
                node.updated = true;
                continue;
            }

            // Drain through outgoing links, each bounded by its design
            // capacity and its control setting.
            let available_cfs = total_in_cfs + network.nodes[i].volume_ft3 / dt;
            let capacities: Vec<f64> = self.out_links[i]
                .iter()
                .map(|&l| Self::link_capacity_cfs(network, l))
                .collect();
            let capacity_sum: f64 = capacities.iter().sum();
            let conveyed_cfs = if self.out_links[i].is_empty() {
                0.0
            } else {
                available_cfs.min(capacity_sum)
            };

            for (slot, &l) in self.out_links[i].iter().enumerate() {
                let share = if capacity_sum.is_finite() && capacity_sum > 0.0 {
                    conveyed_cfs * capacities[slot] / capacity_sum
                } else {
                    conveyed_cfs / self.out_links[i].len() as f64
                };
                if let Some(kind) = FaultKind::of_value(share) {
                    return Err(EngineError::NumericFault {
                        kind,
                        site: "routing",
                    });
                }
                let to = network.links[l].to_node;
                upstream_cfs[to] += share;

                let link = &mut network.links[l];
                link.flow_cfs = share;
                let y_full = link.y_full_ft();
                link.depth_ft = network.nodes[i].depth_ft.min(y_full);
                link.volume_ft3 = link.xsect.area_of_depth_ft2(link.depth_ft) * link.length_ft;
                let velocity = link.velocity_fps(share, link.depth_ft);
                link.froude = if link.depth_ft > 0.0 {
                    velocity / (GRAVITY_FT_S2 * link.depth_ft).sqrt()
                } else {
                    0.0
                };
            }

            // Storage continuity with evaporation off the wet surface.
            let node = &mut network.nodes[i];
            let surface_ft2 = node.geometry.area_of_depth_ft2(node.depth_ft);
            let evap_cfs = if node.depth_ft > 0.0 {
                evap_rate_ft_s * surface_ft2
            } else {
                0.0
            };
            let mut new_volume =
                node.volume_ft3 + (total_in_cfs - conveyed_cfs - evap_cfs) * dt;
            if new_volume < 0.0 {
                // Evaporation cannot remove more than is stored.
                let shortfall = -new_volume;
                evap_ft3 -= shortfall;
                new_volume = 0.0;
            }
            evap_ft3 += evap_cfs * dt;
            node.losses_cfs = evap_cfs;

            if new_volume > node.full_volume_ft3 {
                let excess_ft3 = new_volume - node.full_volume_ft3;
                if ctx.allow_ponding && node.ponded_area_ft2 > 0.0 {
                    // Overflow held as ponded storage above the rim.
                    node.ponded_volume_ft3 += excess_ft3;
                    node.depth_ft =
                        node.full_depth_ft + node.ponded_volume_ft3 / node.ponded_area_ft2;
                } else {
                    node.overflow_cfs = excess_ft3 / dt;
                    flooding_ft3 += excess_ft3;
                    node.depth_ft = node.full_depth_ft;
                }
                node.volume_ft3 = node.full_volume_ft3;
            } else {
                // Ponded water drains back before regular storage falls.
                if node.ponded_volume_ft3 > 0.0 {
                    let refill = (node.full_volume_ft3 - new_volume).min(node.ponded_volume_ft3);
                    node.ponded_volume_ft3 -= refill;
                    new_volume += refill;
                }
                node.volume_ft3 = new_volume;
                node.depth_ft = node
                    .geometry
                    .depth_of_volume_ft(new_volume, node.full_depth_ft);
            }
            node.outflow_cfs = conveyed_cfs;
            node.updated = true;

            if let Some(kind) = FaultKind::of_value(node.volume_ft3) {
                return Err(EngineError::NumericFault {
                    kind,
                    site: "routing",
                });
            }
        }

        Ok(RoutingIncrement {
            routing_time_ms: ctx.target_time_ms,
            lateral_inflow_ft3,
            outflow_ft3,
            flooding_ft3,
            evap_ft3,
            converged: true,
        })
    }

    fn close(&mut self) -> EngineResult<()> {
        self.out_links.clear();
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::Climate;
    use sf_core::SimCalendar;
    use sf_network::{LinkKind, NodeGeometry, NodeKind, XSection};

    fn ctx(climate: &Climate, step_s: f64) -> RoutingContext<'_> {
        RoutingContext {
            climate,
            allow_ponding: false,
            step_s,
            routing_time_ms: 0.0,
            target_time_ms: 1_000.0 * step_s,
        }
    }

    fn two_node_net(capacity_cfs: f64) -> Network {
        let mut net = Network::new();
        let a = net.add_node("A", NodeKind::Junction);
        let b = net.add_node("B", NodeKind::Outfall);
        net.nodes[a].invert_elev_ft = 10.0;
        net.nodes[a].full_depth_ft = 5.0;
        net.nodes[a].geometry = NodeGeometry::Prismatic { area_ft2: 10.0 };
        net.nodes[b].invert_elev_ft = 5.0;
        let l = net
            .add_link(
                "A-B",
                LinkKind::Conduit,
                a,
                b,
                XSection::Circular { diameter_ft: 2.0 },
            )
            .unwrap();
        net.links[l].capacity_cfs = capacity_cfs;
        net.links[l].length_ft = 100.0;
        net.finalize().unwrap();
        net.initialize_state();
        net
    }

    fn climate() -> Climate {
        Climate::new(0.0, SimCalendar::default().start())
    }

    #[test]
    fn pass_through_reaches_the_outfall() {
        let mut net = two_node_net(0.0);
        let mut engine = CapacityRouting::new(RoutingMethod::KinematicWave);
        engine.open(&mut net, 30.0).unwrap();
        let mut inflows = InflowAccumulator::new(2);
        net.nodes[0].runoff_inflow_cfs = 4.0;
        let climate = climate();
        let inc = engine.advance(&mut net, &mut inflows, &ctx(&climate, 30.0)).unwrap();
        // Unbounded link: everything conveyed straight through.
        assert!((net.links[0].flow_cfs - 4.0).abs() < 1e-9);
        assert!((net.nodes[1].outflow_cfs - 4.0).abs() < 1e-9);
        assert!((inc.lateral_inflow_ft3 - 120.0).abs() < 1e-9);
        assert!((inc.outflow_ft3 - 120.0).abs() < 1e-9);
        assert_eq!(inc.routing_time_ms, 30_000.0);
    }

    #[test]
    fn capacity_bound_stores_the_excess() {
        let mut net = two_node_net(1.0);
        let mut engine = CapacityRouting::new(RoutingMethod::KinematicWave);
        engine.open(&mut net, 30.0).unwrap();
        let mut inflows = InflowAccumulator::new(2);
        net.nodes[0].runoff_inflow_cfs = 2.0;
        let climate = climate();
        engine.advance(&mut net, &mut inflows, &ctx(&climate, 30.0)).unwrap();
        assert!((net.links[0].flow_cfs - 1.0).abs() < 1e-9);
        // 1 cfs of excess over 30 s stored at A: 30 ft3 over 10 ft2.
        assert!((net.nodes[0].volume_ft3 - 30.0).abs() < 1e-9);
        assert!((net.nodes[0].depth_ft - 3.0).abs() < 1e-9);
        assert_eq!(net.nodes[0].overflow_cfs, 0.0);
    }

    #[test]
    fn accumulator_is_drained_by_the_advance() {
        let mut net = two_node_net(0.0);
        let mut engine = CapacityRouting::new(RoutingMethod::KinematicWave);
        engine.open(&mut net, 30.0).unwrap();
        let mut inflows = InflowAccumulator::new(2);
        inflows.add(0, 2.5);
        let climate = climate();
        engine.advance(&mut net, &mut inflows, &ctx(&climate, 30.0)).unwrap();
        assert_eq!(inflows.pending(0), 0.0);
        assert!((net.nodes[0].lateral_inflow_cfs - 2.5).abs() < 1e-12);
    }

    #[test]
    fn overflow_floods_without_ponding_and_ponds_with_it() {
        // Full node, no outlet capacity: inflow has nowhere to go.
        let mut net = Network::new();
        let a = net.add_node("A", NodeKind::Storage);
        net.nodes[a].full_depth_ft = 1.0;
        net.nodes[a].geometry = NodeGeometry::Prismatic { area_ft2: 10.0 };
        net.nodes[a].ponded_area_ft2 = 100.0;
        net.finalize().unwrap();
        net.initialize_state();

        let mut engine = CapacityRouting::new(RoutingMethod::KinematicWave);
        engine.open(&mut net, 10.0).unwrap();
        let mut inflows = InflowAccumulator::new(1);
        net.nodes[0].runoff_inflow_cfs = 2.0;
        let climate = climate();

        let inc = engine.advance(&mut net, &mut inflows, &ctx(&climate, 10.0)).unwrap();
        // Storage holds 10 ft3; 20 ft3 arrived.
        assert!((inc.flooding_ft3 - 10.0).abs() < 1e-9);
        assert!((net.nodes[0].overflow_cfs - 1.0).abs() < 1e-9);

        net.initialize_state();
        net.nodes[0].runoff_inflow_cfs = 2.0;
        let ponding_ctx = RoutingContext {
            allow_ponding: true,
            ..ctx(&climate, 10.0)
        };
        let inc = engine.advance(&mut net, &mut inflows, &ponding_ctx).unwrap();
        assert_eq!(inc.flooding_ft3, 0.0);
        assert!((net.nodes[0].ponded_volume_ft3 - 10.0).abs() < 1e-9);
        assert!(net.nodes[0].depth_ft > net.nodes[0].full_depth_ft);
    }

    #[test]
    fn evaporation_draws_down_storage() {
        let mut net = two_node_net(0.001);
        // Seed some standing water behind a nearly closed outlet.
        net.nodes[0].depth_ft = 2.0;
        net.nodes[0].volume_ft3 = 20.0;
        let mut engine = CapacityRouting::new(RoutingMethod::KinematicWave);
        engine.open(&mut net, 30.0).unwrap();
        let mut inflows = InflowAccumulator::new(2);
        let climate = Climate::new(12.0, SimCalendar::default().start());
        let inc = engine.advance(&mut net, &mut inflows, &ctx(&climate, 30.0)).unwrap();
        assert!(inc.evap_ft3 > 0.0);
    }
}
