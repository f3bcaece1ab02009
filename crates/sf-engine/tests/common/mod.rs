//! Shared fixtures: project builders and scripted collaborator engines.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use sf_engine::{
    EngineError, EngineResult, FaultKind, InflowAccumulator, RoutingContext, RoutingEngine,
    RoutingIncrement, RunoffEngine, RunoffIncrement,
};
use sf_network::Network;
use sf_project::{
    CatchmentDef, LinkDef, LinkKindDef, NodeDef, NodeKindDef, ProjectDef, RainGageDef,
    RainPointDef, XSectionDef,
};

pub fn junction(id: &str, invert_elev_ft: f64, max_depth_ft: f64) -> NodeDef {
    NodeDef {
        id: id.into(),
        kind: NodeKindDef::Junction,
        invert_elev_ft,
        max_depth_ft,
        init_depth_ft: 0.0,
        surcharge_depth_ft: 0.0,
        ponded_area_ft2: 0.0,
    }
}

pub fn outfall(id: &str, invert_elev_ft: f64) -> NodeDef {
    NodeDef {
        id: id.into(),
        kind: NodeKindDef::Outfall,
        invert_elev_ft,
        max_depth_ft: 4.0,
        init_depth_ft: 0.0,
        surcharge_depth_ft: 0.0,
        ponded_area_ft2: 0.0,
    }
}

pub fn conduit(id: &str, from: &str, to: &str, capacity_cfs: f64) -> LinkDef {
    LinkDef {
        id: id.into(),
        kind: LinkKindDef::Conduit {
            xsect: XSectionDef::Circular { diameter_ft: 2.0 },
            length_ft: 300.0,
        },
        from: from.into(),
        to: to.into(),
        offset1_ft: 0.0,
        offset2_ft: 0.0,
        capacity_cfs: Some(capacity_cfs),
    }
}

/// Two nodes joined by one conduit; no catchments, so runoff stays
/// disabled.
pub fn two_node_project(title: &str) -> ProjectDef {
    let mut def = ProjectDef::new(title);
    def.nodes.push(junction("J1", 20.0, 10.0));
    def.nodes.push(outfall("O1", 10.0));
    def.links.push(conduit("C1", "J1", "O1", 20.0));
    def
}

/// The two-node network plus one gaged catchment draining to J1.
pub fn catchment_project(title: &str) -> ProjectDef {
    let mut def = two_node_project(title);
    def.raingages.push(RainGageDef {
        id: "G1".into(),
        series: vec![
            RainPointDef {
                offset_min: 0.0,
                intensity_in_hr: 1.0,
            },
            RainPointDef {
                offset_min: 30.0,
                intensity_in_hr: 0.0,
            },
        ],
    });
    def.catchments.push(CatchmentDef {
        id: "S1".into(),
        outlet: "J1".into(),
        raingage: "G1".into(),
        area_ac: 5.0,
        runoff_coeff: 0.5,
    });
    def
}

/// Routing stub that always advances by a fixed step, draining the
/// external inflow accumulator and recording each drained total.
pub struct FixedStepRouting {
    pub step_s: f64,
    pub drained: Arc<Mutex<Vec<f64>>>,
}

impl FixedStepRouting {
    pub fn new(step_s: f64) -> (Self, Arc<Mutex<Vec<f64>>>) {
        let drained = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                step_s,
                drained: Arc::clone(&drained),
            },
            drained,
        )
    }
}

impl RoutingEngine for FixedStepRouting {
    fn open(&mut self, _network: &mut Network, _nominal_step_s: f64) -> EngineResult<()> {
        Ok(())
    }

    fn next_step_s(&self, _network: &Network, _nominal_step_s: f64) -> f64 {
        self.step_s
    }

    fn advance(
        &mut self,
        network: &mut Network,
        inflows: &mut InflowAccumulator,
        ctx: &RoutingContext<'_>,
    ) -> EngineResult<RoutingIncrement> {
        let mut total_cfs = 0.0;
        for index in 0..network.node_count() {
            total_cfs += inflows.take(index);
        }
        self.drained.lock().unwrap().push(total_cfs);
        Ok(RoutingIncrement {
            routing_time_ms: ctx.target_time_ms,
            lateral_inflow_ft3: total_cfs * ctx.step_s,
            outflow_ft3: total_cfs * ctx.step_s,
            flooding_ft3: 0.0,
            evap_ft3: 0.0,
            converged: true,
        })
    }

    fn close(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

pub enum RunoffScript {
    Clean,
    /// Typed runoff error after this many successful advances.
    FailAfter(u32),
    /// Numeric fault on the first advance, clean afterwards.
    FaultOnce(FaultKind),
    /// Numeric fault on every advance.
    FaultAlways(FaultKind),
    /// Out-of-bounds indexing panic on every advance.
    Panic,
}

/// Runoff stub driven by a script, advancing its clock by a fixed step.
pub struct ScriptedRunoff {
    pub script: RunoffScript,
    pub step_s: f64,
    calls: u32,
}

impl ScriptedRunoff {
    pub fn new(script: RunoffScript, step_s: f64) -> Self {
        Self {
            script,
            step_s,
            calls: 0,
        }
    }
}

impl RunoffEngine for ScriptedRunoff {
    fn open(&mut self, _network: &mut Network) -> EngineResult<()> {
        Ok(())
    }

    fn advance(
        &mut self,
        _network: &mut Network,
        runoff_time_ms: f64,
    ) -> EngineResult<RunoffIncrement> {
        self.calls += 1;
        match self.script {
            RunoffScript::FailAfter(limit) if self.calls > limit => Err(EngineError::Runoff {
                message: "scripted failure".to_string(),
            }),
            RunoffScript::FaultOnce(kind) if self.calls == 1 => Err(EngineError::NumericFault {
                kind,
                site: "runoff",
            }),
            RunoffScript::FaultAlways(kind) => Err(EngineError::NumericFault {
                kind,
                site: "runoff",
            }),
            RunoffScript::Panic => {
                let empty: Vec<f64> = Vec::new();
                let index = std::hint::black_box(1);
                Err(EngineError::Runoff {
                    message: format!("unreachable: {}", empty[index]),
                })
            }
            _ => Ok(RunoffIncrement {
                runoff_time_ms: runoff_time_ms + 1_000.0 * self.step_s,
                rain_volume_ft3: 0.0,
                runoff_volume_ft3: 0.0,
                evap_volume_ft3: 0.0,
            }),
        }
    }

    fn close(&mut self) -> EngineResult<()> {
        Ok(())
    }
}
