//! sf-engine: simulation session engine for stormflow.
//!
//! Owns the session lifecycle (open/start/step/end/report/close), the
//! dual-clock step coordination between runoff and routing, the fault
//! barrier, and the coupling surface an external surface model drives
//! the network through. Runoff and routing numerics live behind the
//! collaborator traits; the bundled reference engines do plain
//! capacity-bounded bookkeeping so a session is runnable end to end.

pub mod climate;
pub mod compile;
pub mod coupling;
pub mod error;
pub mod fault;
pub mod hotstart;
pub mod inflow;
pub mod massbal;
pub mod output;
pub mod rain;
pub mod run;
pub mod runoff;
pub mod routing;
pub mod session;
pub mod stats;
pub mod step;
pub mod traits;

// Re-export key types for convenience
pub use climate::Climate;
pub use compile::{CompiledProject, compile_project};
pub use coupling::{LinkState, NodeState};
pub use error::{EngineError, EngineResult};
pub use fault::{FaultBarrier, FaultKind, FaultNotice, GuardOutcome};
pub use hotstart::FileHotstart;
pub use inflow::InflowAccumulator;
pub use massbal::{MassBalance, MassBalanceErrors};
pub use output::ArtifactSink;
pub use rain::RainfallState;
pub use routing::CapacityRouting;
pub use runoff::CoefficientRunoff;
pub use stats::StepStats;
pub use run::{RunProgressEvent, RunStage, run};
pub use session::{EngineOptions, Session, SessionBuilder, SessionPhase};
pub use traits::{
    HotstartStore, OutputSink, RoutingContext, RoutingEngine, RoutingIncrement, RoutingMethod,
    RunoffEngine, RunoffIncrement,
};

/// Encoded engine version exposed to coupled models.
pub fn engine_version() -> i32 {
    sf_core::ENGINE_VERSION
}
