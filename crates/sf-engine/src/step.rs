//! Step coordination: one `step()` call advances the routing clock by
//! one bounded increment, letting the runoff clock catch up first and
//! feeding the report schedule afterwards.

use sf_core::{MIN_ROUTING_STEP_MS, MSEC_PER_SEC, msec_to_days};
use tracing::trace;

use crate::error::{EngineError, EngineResult};
use crate::fault::GuardOutcome;
use crate::session::{Session, SessionPhase};
use crate::traits::RoutingContext;

impl Session {
    /// Advance the simulation by one coordinated step.
    ///
    /// Returns elapsed time in decimal days; `Ok(0.0)` once the routing
    /// clock has reached the total duration, in which case the call is a
    /// repeatable no-op that leaves the session Started and the report
    /// schedule untouched.
    pub fn step(&mut self) -> EngineResult<f64> {
        if let Some(err) = self.error.clone() {
            return Err(err);
        }
        if self.phase != SessionPhase::Started {
            return self.latch(EngineError::NotOpen);
        }
        if self.routing_time_ms >= self.options.total_duration_ms {
            return Ok(0.0);
        }

        self.step_count += 1;
        match self.guarded("step", Session::step_inner) {
            GuardOutcome::Completed(Ok(())) => {}
            GuardOutcome::Completed(Err(err)) => return self.latch(err),
            // The step was abandoned with the clocks unchanged; the
            // session keeps stepping.
            GuardOutcome::Trapped(notice) => self.note_fault(notice),
            GuardOutcome::Halted(notice) => {
                return self.latch(EngineError::SystemFault {
                    kind: notice.kind,
                    site: notice.site,
                });
            }
        }

        if self.routing_time_ms >= self.options.total_duration_ms {
            Ok(0.0)
        } else {
            Ok(msec_to_days(self.routing_time_ms))
        }
    }

    fn step_inner(&mut self) -> EngineResult<()> {
        let step_s = if self.do_routing {
            self.routing
                .next_step_s(&self.network, self.options.routing_step_s)
        } else {
            self.options.wet_step_s.min(self.options.report_step_s)
        };
        if step_s <= 0.0 {
            return Err(EngineError::Timestep { step_s });
        }

        // End-of-run clamp. The target is assigned the total duration
        // exactly; the applied step keeps a 1 ms floor so the clock
        // always makes progress.
        let mut target_time_ms = self.routing_time_ms + MSEC_PER_SEC * step_s;
        let step_s = if target_time_ms > self.options.total_duration_ms {
            target_time_ms = self.options.total_duration_ms;
            (target_time_ms - self.routing_time_ms).max(MIN_ROUTING_STEP_MS) / MSEC_PER_SEC
        } else {
            step_s
        };

        if self.do_runoff {
            // Runoff runs on its own (wet/dry) step; let it catch up to
            // the routing target before the routing advance.
            while self.runoff_time_ms < target_time_ms {
                self.climate
                    .set_state(self.options.calendar.date_time(self.runoff_time_ms));
                trace!(
                    runoff_time_ms = self.runoff_time_ms,
                    rain_possible = self
                        .rainfall
                        .as_ref()
                        .is_some_and(|r| r.rain_possible_at(self.runoff_time_ms)),
                    "runoff increment"
                );
                let inc = self.runoff.advance(&mut self.network, self.runoff_time_ms)?;
                self.runoff_time_ms = inc.runoff_time_ms;
                if let Some(massbal) = &mut self.massbal {
                    massbal.add_runoff(&inc);
                }
            }
        } else {
            self.climate
                .set_state(self.options.calendar.date_time(self.routing_time_ms));
        }

        if self.do_routing {
            let ctx = RoutingContext {
                climate: &self.climate,
                allow_ponding: self.allow_ponding,
                step_s,
                routing_time_ms: self.routing_time_ms,
                target_time_ms,
            };
            let inc = self
                .routing
                .advance(&mut self.network, &mut self.inflows, &ctx)?;
            self.routing_time_ms = inc.routing_time_ms;
            if let Some(massbal) = &mut self.massbal {
                massbal.add_routing(&inc);
            }
            if let Some(stats) = &mut self.stats {
                stats.record_step(step_s, inc.converged);
            }
        } else {
            self.routing_time_ms = target_time_ms;
            if let Some(stats) = &mut self.stats {
                stats.record_step(step_s, true);
            }
        }

        if self.routing_time_ms >= self.report_time_ms {
            if self.save_results {
                self.output
                    .save_snapshot(&self.network, self.report_time_ms)?;
                if let Some(stats) = &mut self.stats {
                    stats.record_period();
                }
            }
            // One increment per call, even when the clock jumped past
            // several reporting instants.
            self.report_time_ms += MSEC_PER_SEC * self.options.report_step_s;
        }
        Ok(())
    }
}
