//! Routing time-step statistics.

use sf_results::ReportFile;

use crate::error::EngineResult;

#[derive(Debug, Clone, Default)]
pub struct StepStats {
    steps: u64,
    reported_periods: usize,
    trapped_faults: u32,
    min_step_s: f64,
    max_step_s: f64,
    sum_step_s: f64,
    non_converged: u64,
}

impl StepStats {
    pub fn open() -> Self {
        Self {
            min_step_s: f64::INFINITY,
            ..Self::default()
        }
    }

    pub fn record_step(&mut self, step_s: f64, converged: bool) {
        self.steps += 1;
        self.min_step_s = self.min_step_s.min(step_s);
        self.max_step_s = self.max_step_s.max(step_s);
        self.sum_step_s += step_s;
        if !converged {
            self.non_converged += 1;
        }
    }

    pub fn record_period(&mut self) {
        self.reported_periods += 1;
    }

    pub fn record_fault(&mut self) {
        self.trapped_faults += 1;
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn reported_periods(&self) -> usize {
        self.reported_periods
    }

    pub fn trapped_faults(&self) -> u32 {
        self.trapped_faults
    }

    pub fn mean_step_s(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.sum_step_s / self.steps as f64
        }
    }

    pub fn report(&self, report: &mut ReportFile) -> EngineResult<()> {
        report.write_section("Routing Time Step Summary")?;
        report.write_line(&format!("  Routing steps taken ......... {:10}", self.steps))?;
        if self.steps > 0 {
            report.write_line(&format!(
                "  Minimum step ................ {:10.2} s",
                self.min_step_s
            ))?;
            report.write_line(&format!(
                "  Maximum step ................ {:10.2} s",
                self.max_step_s
            ))?;
            report.write_line(&format!(
                "  Mean step ................... {:10.2} s",
                self.mean_step_s()
            ))?;
        }
        report.write_line(&format!(
            "  Reporting periods saved ..... {:10}",
            self.reported_periods
        ))?;
        report.write_line(&format!(
            "  Trapped numeric faults ...... {:10}",
            self.trapped_faults
        ))?;
        if self.non_converged > 0 {
            report.write_line(&format!(
                "  Non-converged steps ......... {:10}",
                self.non_converged
            ))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_extremes_and_mean() {
        let mut stats = StepStats::open();
        stats.record_step(30.0, true);
        stats.record_step(10.0, true);
        stats.record_step(20.0, false);
        assert_eq!(stats.steps(), 3);
        assert_eq!(stats.min_step_s, 10.0);
        assert_eq!(stats.max_step_s, 30.0);
        assert!((stats.mean_step_s() - 20.0).abs() < 1e-12);
        assert_eq!(stats.non_converged, 1);
    }

    #[test]
    fn empty_stats_mean_is_zero() {
        let stats = StepStats::open();
        assert_eq!(stats.mean_step_s(), 0.0);
    }
}
