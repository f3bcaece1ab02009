//! Collaborator contracts the session drives.
//!
//! The engine owns lifecycle and clocks; runoff generation, flow
//! routing, state persistence, and results storage plug in behind these
//! traits. The bundled reference implementations live in `runoff`,
//! `routing`, `hotstart`, and `output`.

use sf_network::Network;
use sf_results::ArtifactHeader;

use crate::climate::Climate;
use crate::error::EngineResult;
use crate::inflow::InflowAccumulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMethod {
    Steady,
    #[default]
    KinematicWave,
    DynamicWave,
}

impl RoutingMethod {
    pub fn label(self) -> &'static str {
        match self {
            RoutingMethod::Steady => "steady flow",
            RoutingMethod::KinematicWave => "kinematic wave",
            RoutingMethod::DynamicWave => "dynamic wave",
        }
    }
}

impl From<sf_project::RoutingMethodDef> for RoutingMethod {
    fn from(def: sf_project::RoutingMethodDef) -> Self {
        match def {
            sf_project::RoutingMethodDef::Steady => RoutingMethod::Steady,
            sf_project::RoutingMethodDef::KinematicWave => RoutingMethod::KinematicWave,
            sf_project::RoutingMethodDef::DynamicWave => RoutingMethod::DynamicWave,
        }
    }
}

/// What one runoff increment produced, for the clock and the mass
/// balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunoffIncrement {
    /// The advanced runoff clock.
    pub runoff_time_ms: f64,
    pub rain_volume_ft3: f64,
    pub runoff_volume_ft3: f64,
    pub evap_volume_ft3: f64,
}

pub trait RunoffEngine {
    fn open(&mut self, network: &mut Network) -> EngineResult<()>;

    /// Perform one internal runoff increment starting at
    /// `runoff_time_ms`, accumulating `runoff_inflow_cfs` on outlet
    /// nodes. The engine picks its own increment length (wet/dry
    /// stepping); the session loops this until the runoff clock catches
    /// up with the routing target.
    fn advance(&mut self, network: &mut Network, runoff_time_ms: f64)
    -> EngineResult<RunoffIncrement>;

    fn close(&mut self) -> EngineResult<()>;
}

/// Per-advance inputs the routing engine does not own.
#[derive(Debug, Clone, Copy)]
pub struct RoutingContext<'a> {
    pub climate: &'a Climate,
    pub allow_ponding: bool,
    /// Step length to advance over, seconds.
    pub step_s: f64,
    /// Routing clock before the advance.
    pub routing_time_ms: f64,
    /// Routing clock the advance must land on exactly.
    pub target_time_ms: f64,
}

/// What one routing advance produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingIncrement {
    /// The updated routing clock; equals the context's target.
    pub routing_time_ms: f64,
    pub lateral_inflow_ft3: f64,
    pub outflow_ft3: f64,
    pub flooding_ft3: f64,
    pub evap_ft3: f64,
    pub converged: bool,
}

pub trait RoutingEngine {
    fn open(&mut self, network: &mut Network, nominal_step_s: f64) -> EngineResult<()>;

    /// Length of the next routing step in seconds, bounded by the
    /// configured nominal step. A non-positive answer is a timestep
    /// error the session latches.
    fn next_step_s(&self, network: &Network, nominal_step_s: f64) -> f64;

    /// Advance the network over `ctx.step_s`, consuming (draining to
    /// zero) the external inflow accumulator, and return the updated
    /// clock.
    fn advance(
        &mut self,
        network: &mut Network,
        inflows: &mut InflowAccumulator,
        ctx: &RoutingContext<'_>,
    ) -> EngineResult<RoutingIncrement>;

    fn close(&mut self) -> EngineResult<()>;
}

pub trait HotstartStore {
    /// Apply a saved state snapshot to the network, if one is
    /// configured. Returns whether anything was applied.
    fn restore(&mut self, network: &mut Network) -> EngineResult<bool>;

    /// Persist the current state, if a save target is configured.
    fn save(&mut self, network: &Network) -> EngineResult<()>;

    fn close(&mut self) -> EngineResult<()>;
}

pub trait OutputSink {
    fn open(&mut self, network: &Network, header: &ArtifactHeader) -> EngineResult<()>;

    fn save_snapshot(&mut self, network: &Network, elapsed_ms: f64) -> EngineResult<()>;

    fn write_end(&mut self, steps: u64, error_code: i32) -> EngineResult<()>;

    /// Consistency check before the report phase reads results back.
    fn check(&mut self) -> EngineResult<()>;

    fn periods(&self) -> usize;

    fn is_scratch(&self) -> bool;

    /// Release the artifact; `keep_artifact` false deletes it.
    fn close(&mut self, keep_artifact: bool) -> EngineResult<()>;
}
