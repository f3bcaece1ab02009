//! Reference runoff engine.
//!
//! Rational-method bookkeeping only: runoff rate = coefficient x
//! rainfall intensity x area, delivered to each catchment's outlet
//! node. It exists so the session is runnable end to end; real runoff
//! numerics are an external collaborator behind the same trait.

use sf_network::Network;

use crate::error::{EngineError, EngineResult};
use crate::fault::FaultKind;
use crate::traits::{RunoffEngine, RunoffIncrement};

/// 1 acre-inch/hour expressed in cfs.
const CFS_PER_AC_IN_HR: f64 = 1.008_333;

/// Square feet per acre.
const FT2_PER_ACRE: f64 = 43_560.0;

/// Coefficient-based runoff generation with wet/dry internal stepping.
#[derive(Debug, Clone)]
pub struct CoefficientRunoff {
    wet_step_s: f64,
    dry_step_s: f64,
    rain_ignored: bool,
    open: bool,
}

impl CoefficientRunoff {
    pub fn new(wet_step_s: f64, dry_step_s: f64) -> Self {
        Self {
            wet_step_s,
            dry_step_s,
            rain_ignored: false,
            open: false,
        }
    }

    /// Read every gage as dry, leaving the series data untouched.
    pub fn ignore_rainfall(mut self, ignore: bool) -> Self {
        self.rain_ignored = ignore;
        self
    }

    fn any_rain_at(network: &Network, clock_ms: f64) -> bool {
        network
            .catchments
            .iter()
            .any(|c| network.gages[c.gage].intensity_at(clock_ms) > 0.0)
    }
}

impl RunoffEngine for CoefficientRunoff {
    fn open(&mut self, network: &mut Network) -> EngineResult<()> {
        for catchment in &network.catchments {
            if catchment.gage >= network.gages.len() {
                return Err(EngineError::Runoff {
                    message: format!("catchment '{}' references a missing gage", catchment.name),
                });
            }
        }
        for node in &mut network.nodes {
            node.runoff_inflow_cfs = 0.0;
        }
        self.open = true;
        Ok(())
    }

    fn advance(
        &mut self,
        network: &mut Network,
        runoff_time_ms: f64,
    ) -> EngineResult<RunoffIncrement> {
        if !self.open {
            return Err(EngineError::Runoff {
                message: "runoff engine advanced before open".to_string(),
            });
        }

        // Wet-weather stepping while any gage is raining, the longer
        // dry step otherwise.
        let step_s = if !self.rain_ignored && Self::any_rain_at(network, runoff_time_ms) {
            self.wet_step_s
        } else {
            self.dry_step_s
        };

        for node in &mut network.nodes {
            node.runoff_inflow_cfs = 0.0;
        }

        let mut rain_volume_ft3 = 0.0;
        let mut runoff_volume_ft3 = 0.0;
        for i in 0..network.catchments.len() {
            let catchment = &network.catchments[i];
            let intensity_in_hr = if self.rain_ignored {
                0.0
            } else {
                network.gages[catchment.gage].intensity_at(runoff_time_ms)
            };
            let runoff_cfs =
                catchment.runoff_coeff * intensity_in_hr * catchment.area_ac * CFS_PER_AC_IN_HR;
            if let Some(kind) = FaultKind::of_value(runoff_cfs) {
                return Err(EngineError::NumericFault {
                    kind,
                    site: "runoff",
                });
            }
            rain_volume_ft3 +=
                intensity_in_hr / 12.0 / 3_600.0 * catchment.area_ac * FT2_PER_ACRE * step_s;
            runoff_volume_ft3 += runoff_cfs * step_s;
            let outlet = catchment.outlet_node;
            network.nodes[outlet].runoff_inflow_cfs += runoff_cfs;
        }

        Ok(RunoffIncrement {
            runoff_time_ms: runoff_time_ms + 1_000.0 * step_s,
            rain_volume_ft3,
            runoff_volume_ft3,
            evap_volume_ft3: 0.0,
        })
    }

    fn close(&mut self) -> EngineResult<()> {
        self.open = false;
        Ok(())
    }
}
