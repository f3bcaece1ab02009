//! Mass-balance accounting across a run.
//!
//! Two continuity ledgers: the runoff ledger (rainfall in vs runoff,
//! evaporation, and other abstractions out) and the flow ledger
//! (initial storage + lateral inflow vs outfall outflow, flooding,
//! evaporation, and final storage). Percent errors from both are
//! reported at `end()` and exposed through the session getter. Quality
//! transport is excluded, so its error is fixed at zero.

use sf_network::Network;
use sf_results::ReportFile;

use crate::error::EngineResult;
use crate::traits::{RoutingIncrement, RunoffIncrement};

/// Percent continuity errors surfaced after `end()`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MassBalanceErrors {
    pub runoff_pct: f64,
    pub flow_pct: f64,
    pub quality_pct: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MassBalance {
    initial_storage_ft3: f64,

    // Runoff ledger
    rain_ft3: f64,
    runoff_ft3: f64,
    runoff_evap_ft3: f64,
    abstraction_ft3: f64,

    // Flow ledger
    lateral_inflow_ft3: f64,
    outflow_ft3: f64,
    flooding_ft3: f64,
    routing_evap_ft3: f64,
}

impl MassBalance {
    /// Capture the initial stored volume before any advance.
    pub fn open(network: &Network) -> Self {
        Self {
            initial_storage_ft3: network.total_stored_volume_ft3(),
            ..Self::default()
        }
    }

    pub fn add_runoff(&mut self, inc: &RunoffIncrement) {
        self.rain_ft3 += inc.rain_volume_ft3;
        self.runoff_ft3 += inc.runoff_volume_ft3;
        self.runoff_evap_ft3 += inc.evap_volume_ft3;
        // Whatever rain neither ran off nor evaporated was abstracted
        // (infiltration, depression storage) by the runoff collaborator.
        self.abstraction_ft3 +=
            (inc.rain_volume_ft3 - inc.runoff_volume_ft3 - inc.evap_volume_ft3).max(0.0);
    }

    pub fn add_routing(&mut self, inc: &RoutingIncrement) {
        self.lateral_inflow_ft3 += inc.lateral_inflow_ft3;
        self.outflow_ft3 += inc.outflow_ft3;
        self.flooding_ft3 += inc.flooding_ft3;
        self.routing_evap_ft3 += inc.evap_ft3;
    }

    pub fn runoff_pct_error(&self) -> f64 {
        let inflow = self.rain_ft3;
        if inflow <= 0.0 {
            return 0.0;
        }
        let outflow = self.runoff_ft3 + self.runoff_evap_ft3 + self.abstraction_ft3;
        100.0 * (inflow - outflow) / inflow
    }

    pub fn flow_pct_error(&self, network: &Network) -> f64 {
        let inflow = self.initial_storage_ft3 + self.lateral_inflow_ft3;
        if inflow <= 0.0 {
            return 0.0;
        }
        let outflow = self.outflow_ft3
            + self.flooding_ft3
            + self.routing_evap_ft3
            + network.total_stored_volume_ft3();
        100.0 * (inflow - outflow) / inflow
    }

    pub fn errors(&self, network: &Network) -> MassBalanceErrors {
        MassBalanceErrors {
            runoff_pct: self.runoff_pct_error(),
            flow_pct: self.flow_pct_error(network),
            quality_pct: 0.0,
        }
    }

    pub fn report(&self, network: &Network, report: &mut ReportFile) -> EngineResult<()> {
        report.write_section("Flow Routing Continuity")?;
        report.write_line(&format!(
            "  Initial stored volume ....... {:14.3} ft3",
            self.initial_storage_ft3
        ))?;
        report.write_line(&format!(
            "  Total lateral inflow ........ {:14.3} ft3",
            self.lateral_inflow_ft3
        ))?;
        report.write_line(&format!(
            "  Total outfall outflow ....... {:14.3} ft3",
            self.outflow_ft3
        ))?;
        report.write_line(&format!(
            "  Total flooding loss ......... {:14.3} ft3",
            self.flooding_ft3
        ))?;
        report.write_line(&format!(
            "  Total evaporation loss ...... {:14.3} ft3",
            self.routing_evap_ft3
        ))?;
        report.write_line(&format!(
            "  Final stored volume ......... {:14.3} ft3",
            network.total_stored_volume_ft3()
        ))?;
        report.write_line(&format!(
            "  Continuity error ............ {:14.3} %",
            self.flow_pct_error(network)
        ))?;

        report.write_section("Runoff Continuity")?;
        report.write_line(&format!(
            "  Total precipitation ......... {:14.3} ft3",
            self.rain_ft3
        ))?;
        report.write_line(&format!(
            "  Total runoff ................ {:14.3} ft3",
            self.runoff_ft3
        ))?;
        report.write_line(&format!(
            "  Total evaporation ........... {:14.3} ft3",
            self.runoff_evap_ft3
        ))?;
        report.write_line(&format!(
            "  Total abstraction ........... {:14.3} ft3",
            self.abstraction_ft3
        ))?;
        report.write_line(&format!(
            "  Continuity error ............ {:14.3} %",
            self.runoff_pct_error()
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runoff_inc(rain: f64, runoff: f64) -> RunoffIncrement {
        RunoffIncrement {
            runoff_time_ms: 0.0,
            rain_volume_ft3: rain,
            runoff_volume_ft3: runoff,
            evap_volume_ft3: 0.0,
        }
    }

    #[test]
    fn balanced_runoff_ledger_has_zero_error() {
        let mut mb = MassBalance::default();
        mb.add_runoff(&runoff_inc(100.0, 60.0));
        mb.add_runoff(&runoff_inc(50.0, 30.0));
        assert!(mb.runoff_pct_error().abs() < 1e-9);
    }

    #[test]
    fn flow_error_measures_lost_volume() {
        let network = Network::new();
        let mut mb = MassBalance::open(&network);
        mb.add_routing(&RoutingIncrement {
            routing_time_ms: 0.0,
            lateral_inflow_ft3: 100.0,
            outflow_ft3: 90.0,
            flooding_ft3: 0.0,
            evap_ft3: 0.0,
            converged: true,
        });
        // 10 ft3 vanished: +10% error against an empty network.
        assert!((mb.flow_pct_error(&network) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn dry_run_reports_zero_errors() {
        let network = Network::new();
        let mb = MassBalance::open(&network);
        let errors = mb.errors(&network);
        assert_eq!(errors.runoff_pct, 0.0);
        assert_eq!(errors.flow_pct, 0.0);
        assert_eq!(errors.quality_pct, 0.0);
    }
}
