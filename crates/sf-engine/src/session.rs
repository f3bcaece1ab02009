//! Simulation session lifecycle.
//!
//! A `Session` is the single-owner handle over one simulation: the
//! closed phase is the absence of the value, `open` produces an Opened
//! session, `start` takes it to Started, `end` back to Opened, and
//! `close` consumes it. The error register latches the first failure
//! and every later lifecycle call returns it until the session is
//! rebuilt by a fresh `open`.

use std::path::{Path, PathBuf};

use sf_core::{FlowUnits, SimCalendar, msec_to_days, version_string};
use sf_network::Network;
use sf_project::ProjectDef;
use sf_results::{ArtifactHeader, ReportFile};
use tracing::{info, warn};

use crate::climate::Climate;
use crate::compile::compile_project;
use crate::error::{EngineError, EngineResult};
use crate::fault::{FaultBarrier, FaultNotice, GuardOutcome};
use crate::hotstart::FileHotstart;
use crate::inflow::InflowAccumulator;
use crate::massbal::{MassBalance, MassBalanceErrors};
use crate::output::ArtifactSink;
use crate::rain::RainfallState;
use crate::routing::CapacityRouting;
use crate::runoff::CoefficientRunoff;
use crate::stats::StepStats;
use crate::traits::{HotstartStore, OutputSink, RoutingEngine, RoutingMethod, RunoffEngine};

pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Opened,
    Started,
}

/// Run options compiled from the project file.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub flow_units: FlowUnits,
    pub calendar: SimCalendar,
    pub total_duration_ms: f64,
    pub report_step_s: f64,
    pub wet_step_s: f64,
    pub dry_step_s: f64,
    pub routing_step_s: f64,
    pub routing_method: RoutingMethod,
    pub ignore_rainfall: bool,
    pub ignore_routing: bool,
    pub allow_ponding: bool,
    pub evap_rate_in_day: f64,
    pub fault_budget: u32,
    pub hotstart_use: Option<PathBuf>,
    pub hotstart_save: Option<PathBuf>,
}

/// Builds a session from an in-memory project, optionally swapping the
/// collaborator engines. Host applications and tests use this; the
/// file-driven front door is `Session::open`.
pub struct SessionBuilder {
    project: ProjectDef,
    report_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    runoff: Option<Box<dyn RunoffEngine>>,
    routing: Option<Box<dyn RoutingEngine>>,
    hotstart: Option<Box<dyn HotstartStore>>,
    output: Option<Box<dyn OutputSink>>,
    barrier: Option<FaultBarrier>,
}

impl SessionBuilder {
    pub fn from_project(project: ProjectDef) -> Self {
        Self {
            project,
            report_path: None,
            output_path: None,
            runoff: None,
            routing: None,
            hotstart: None,
            output: None,
            barrier: None,
        }
    }

    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn runoff_engine(mut self, engine: Box<dyn RunoffEngine>) -> Self {
        self.runoff = Some(engine);
        self
    }

    pub fn routing_engine(mut self, engine: Box<dyn RoutingEngine>) -> Self {
        self.routing = Some(engine);
        self
    }

    pub fn hotstart_store(mut self, store: Box<dyn HotstartStore>) -> Self {
        self.hotstart = Some(store);
        self
    }

    pub fn output_sink(mut self, sink: Box<dyn OutputSink>) -> Self {
        self.output = Some(sink);
        self
    }

    pub fn fault_barrier(mut self, barrier: FaultBarrier) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn open(self) -> EngineResult<Session> {
        let compiled = compile_project(&self.project)?;
        let options = compiled.options;

        let report = match &self.report_path {
            Some(path) => Some(ReportFile::create(path).map_err(|e| EngineError::Report {
                message: e.to_string(),
            })?),
            None => None,
        };

        let runoff = self.runoff.unwrap_or_else(|| {
            Box::new(
                CoefficientRunoff::new(options.wet_step_s, options.dry_step_s)
                    .ignore_rainfall(options.ignore_rainfall),
            )
        });
        let routing = self
            .routing
            .unwrap_or_else(|| Box::new(CapacityRouting::new(options.routing_method)));
        let hotstart = self.hotstart.unwrap_or_else(|| {
            Box::new(FileHotstart::new(
                options.hotstart_use.clone(),
                options.hotstart_save.clone(),
            ))
        });
        let output = self
            .output
            .unwrap_or_else(|| Box::new(ArtifactSink::new(self.output_path.as_deref())));
        let barrier = self
            .barrier
            .unwrap_or_else(|| FaultBarrier::trapping(options.fault_budget));

        let node_count = compiled.network.node_count();
        let mut session = Session {
            phase: SessionPhase::Opened,
            title: compiled.title,
            options,
            network: compiled.network,
            allow_ponding: false,
            runoff,
            routing,
            hotstart,
            output,
            report,
            barrier,
            rainfall: None,
            climate: Climate::new(0.0, SimCalendar::default().start()),
            inflows: InflowAccumulator::new(node_count),
            massbal: None,
            stats: None,
            runoff_opened: false,
            routing_opened: false,
            output_opened: false,
            do_runoff: false,
            do_routing: false,
            routing_time_ms: 0.0,
            runoff_time_ms: 0.0,
            report_time_ms: 0.0,
            step_count: 0,
            save_results: false,
            error: None,
            warnings: Vec::new(),
            mass_balance_errors: None,
            ended: false,
            closed: false,
        };
        session.allow_ponding = session.options.allow_ponding;

        session.write_report_preamble()?;
        for warning in compiled.warnings {
            session.push_warning(warning);
        }
        info!(
            nodes = session.network.node_count(),
            links = session.network.link_count(),
            catchments = session.network.catchment_count(),
            "session opened"
        );
        Ok(session)
    }
}

/// An open simulation session.
pub struct Session {
    pub(crate) phase: SessionPhase,
    pub(crate) title: String,
    pub(crate) options: EngineOptions,
    pub(crate) network: Network,
    /// Runtime ponding toggle; seeded from the options, writable through
    /// the coupling surface.
    pub(crate) allow_ponding: bool,

    pub(crate) runoff: Box<dyn RunoffEngine>,
    pub(crate) routing: Box<dyn RoutingEngine>,
    pub(crate) hotstart: Box<dyn HotstartStore>,
    pub(crate) output: Box<dyn OutputSink>,
    pub(crate) report: Option<ReportFile>,
    pub(crate) barrier: FaultBarrier,

    pub(crate) rainfall: Option<RainfallState>,
    pub(crate) climate: Climate,
    pub(crate) inflows: InflowAccumulator,
    pub(crate) massbal: Option<MassBalance>,
    pub(crate) stats: Option<StepStats>,

    pub(crate) runoff_opened: bool,
    pub(crate) routing_opened: bool,
    pub(crate) output_opened: bool,
    pub(crate) do_runoff: bool,
    pub(crate) do_routing: bool,

    pub(crate) routing_time_ms: f64,
    pub(crate) runoff_time_ms: f64,
    pub(crate) report_time_ms: f64,
    pub(crate) step_count: u64,
    pub(crate) save_results: bool,

    pub(crate) error: Option<EngineError>,
    pub(crate) warnings: Vec<String>,
    pub(crate) mass_balance_errors: Option<MassBalanceErrors>,
    pub(crate) ended: bool,
    closed: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session from a project file. The report path receives the
    /// plain-text run summary; with no output path the results artifact
    /// is a scratch file removed at close.
    pub fn open(
        input: &Path,
        report_path: &Path,
        output_path: Option<&Path>,
    ) -> EngineResult<Session> {
        let project = sf_project::load_yaml(input)?;
        let mut builder = SessionBuilder::from_project(project).report_path(report_path);
        if let Some(path) = output_path {
            builder = builder.output_path(path);
        }
        builder.open()
    }

    /// Start a run. The phase is marked Started before subsystem opening
    /// begins, so a mid-open failure leaves a Started session with
    /// partial subsystems; `end` and `close` tolerate that state.
    pub fn start(&mut self, save_results: bool) -> EngineResult<()> {
        if let Some(err) = self.error.clone() {
            return Err(err);
        }
        if self.phase != SessionPhase::Opened {
            return self.latch(EngineError::NotOpen);
        }

        self.barrier.reset();
        self.routing_time_ms = 0.0;
        self.runoff_time_ms = 0.0;
        self.report_time_ms = 1_000.0 * self.options.report_step_s;
        self.step_count = 0;
        self.save_results = save_results;
        self.allow_ponding = self.options.allow_ponding;
        self.mass_balance_errors = None;
        self.ended = false;
        self.phase = SessionPhase::Started;

        match self.guarded("start", Session::open_subsystems) {
            GuardOutcome::Completed(Ok(())) => {
                info!(save_results, "simulation started");
                Ok(())
            }
            GuardOutcome::Completed(Err(err)) => self.latch(err),
            GuardOutcome::Trapped(notice) => {
                self.note_fault(notice);
                Ok(())
            }
            GuardOutcome::Halted(notice) => self.latch(EngineError::SystemFault {
                kind: notice.kind,
                site: notice.site,
            }),
        }
    }

    fn open_subsystems(&mut self) -> EngineResult<()> {
        // Ignored rainfall leaves the gage series intact; the runoff
        // engine reads every gage as dry and still steps, producing
        // nothing.
        if !self.options.ignore_rainfall {
            self.rainfall = Some(RainfallState::open(&self.network)?);
        }
        self.climate = Climate::new(
            self.options.evap_rate_in_day,
            self.options.calendar.start(),
        );

        self.network.initialize_state();
        self.inflows.reset(self.network.node_count());
        self.do_runoff = self.network.catchment_count() > 0;
        self.do_routing = self.network.node_count() > 0 && !self.options.ignore_routing;

        let header = self.artifact_header();
        self.output.open(&self.network, &header)?;
        self.output_opened = true;

        if self.do_runoff {
            self.runoff.open(&mut self.network)?;
            self.runoff_opened = true;
        }

        // Hot start overrides the freshly initialized state and must
        // finish before routing opens (routing consults the restored
        // depths).
        if self.hotstart.restore(&mut self.network)? {
            info!("initial state overridden by hot-start snapshot");
        }

        if self.do_routing {
            self.routing
                .open(&mut self.network, self.options.routing_step_s)?;
            self.routing_opened = true;
        }

        self.massbal = Some(MassBalance::open(&self.network));
        self.stats = Some(StepStats::open());

        if let Some(report) = &mut self.report {
            report.write_section("Analysis Options")?;
            report.write_line(&format!(
                "  Flow units .................. {}",
                self.options.flow_units.label()
            ))?;
            report.write_line(&format!(
                "  Routing method .............. {}",
                self.options.routing_method.label()
            ))?;
            report.write_line(&format!(
                "  Starting date ............... {}",
                self.options.calendar.start().format("%Y-%m-%d %H:%M:%S")
            ))?;
            report.write_line(&format!(
                "  Total duration .............. {:.3} hr",
                self.options.total_duration_ms / 3_600_000.0
            ))?;
            report.write_line(&format!(
                "  Report step ................. {:.0} s",
                self.options.report_step_s
            ))?;
            report.write_line(&format!(
                "  Routing step ................ {:.0} s",
                self.options.routing_step_s
            ))?;
        }
        Ok(())
    }

    /// End a run: terminal output record, summaries, subsystem teardown
    /// in reverse dependency order. A no-op unless Started.
    pub fn end(&mut self) -> EngineResult<()> {
        if self.phase != SessionPhase::Started {
            return Ok(());
        }

        let mut first_close_error: Option<EngineError> = None;
        let mut note = |result: EngineResult<()>, first: &mut Option<EngineError>| {
            if let Err(err) = result {
                if first.is_none() {
                    *first = Some(err);
                }
            }
        };

        if self.output_opened {
            let code = self.error_code();
            note(
                self.output.write_end(self.step_count, code),
                &mut first_close_error,
            );
        }

        if self.error.is_none() {
            if let Some(massbal) = self.massbal.take() {
                self.mass_balance_errors = Some(massbal.errors(&self.network));
                if let Some(report) = &mut self.report {
                    note(massbal.report(&self.network, report), &mut first_close_error);
                }
            }
            if let Some(stats) = self.stats.take() {
                if let Some(report) = &mut self.report {
                    note(stats.report(report), &mut first_close_error);
                }
            }
            note(self.hotstart.save(&self.network), &mut first_close_error);
        }

        // Teardown tolerates a partially started session: only what was
        // actually opened gets closed.
        self.stats = None;
        self.massbal = None;
        if let Some(mut rainfall) = self.rainfall.take() {
            rainfall.close();
        }
        if self.runoff_opened {
            note(self.runoff.close(), &mut first_close_error);
            self.runoff_opened = false;
        }
        if self.routing_opened {
            note(self.routing.close(), &mut first_close_error);
            self.routing_opened = false;
        }
        note(self.hotstart.close(), &mut first_close_error);

        self.phase = SessionPhase::Opened;
        self.ended = true;
        info!(steps = self.step_count, "simulation ended");

        if let Some(err) = first_close_error {
            return self.latch(err);
        }
        // Teardown always runs; a previously latched error is still the
        // call's result.
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Write the run summary to the report file. Valid once the session
    /// is back in Opened after `end`; with an error latched, writes the
    /// error text instead and returns it.
    pub fn report(&mut self) -> EngineResult<()> {
        if let Some(err) = self.error.clone() {
            if let Some(report) = &mut self.report {
                let _ = report.write_section("Analysis Aborted");
                let _ = report.write_line(&format!("  ERROR {}: {err}", err.code()));
                let _ = report.flush();
            }
            return Err(err);
        }
        if self.phase != SessionPhase::Opened || !self.ended {
            return self.latch(EngineError::NotOpen);
        }

        if self.output_opened {
            if let Err(err) = self.output.check() {
                return self.latch(err);
            }
        }
        if let Some(report) = &mut self.report {
            report.write_section("Analysis Summary")?;
            report.write_line(&format!(
                "  Routing steps taken ......... {:10}",
                self.step_count
            ))?;
            report.write_line(&format!(
                "  Reporting periods saved ..... {:10}",
                self.output.periods()
            ))?;
            report.write_line(&format!(
                "  Warnings .................... {:10}",
                self.warnings.len()
            ))?;
            for warning in &self.warnings {
                report.write_line(&format!("  WARNING: {warning}"))?;
            }
            report.flush()?;
        }
        Ok(())
    }

    /// Close the session, releasing the report handle and deleting a
    /// scratch results artifact. Always safe; returns the final error
    /// code.
    pub fn close(mut self) -> i32 {
        self.close_impl();
        self.error_code()
    }

    fn close_impl(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let keep = !self.output.is_scratch();
        if let Err(err) = self.output.close(keep) {
            warn!(error = %err, "output close failed");
        }
        if let Some(report) = &mut self.report {
            let _ = report.write_line("");
            let _ = report.write_line(&format!(
                "Analysis ended with error code {}",
                self.error.as_ref().map_or(0, EngineError::code)
            ));
            let _ = report.flush();
        }
        self.report = None;
        info!("session closed");
    }

    // ---- registers and getters ------------------------------------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn error_code(&self) -> i32 {
        self.error.as_ref().map_or(0, EngineError::code)
    }

    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|err| format!("ERROR {}: {err}", err.code()))
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Mass-balance errors of the finished run; None unless the session
    /// is Opened after an `end`.
    pub fn mass_balance(&self) -> Option<MassBalanceErrors> {
        if self.phase == SessionPhase::Opened && self.ended {
            self.mass_balance_errors
        } else {
            None
        }
    }

    pub fn elapsed_days(&self) -> f64 {
        msec_to_days(self.routing_time_ms)
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn fault_count(&self) -> u32 {
        self.barrier.fault_count()
    }

    pub fn reported_periods(&self) -> usize {
        self.output.periods()
    }

    // ---- internals shared with the step and coupling modules ------

    pub(crate) fn latch<T>(&mut self, err: EngineError) -> EngineResult<T> {
        match &self.error {
            Some(first) => Err(first.clone()),
            None => {
                warn!(code = err.code(), error = %err, "error latched");
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Run a phase body under the fault barrier. The barrier is moved
    /// out for the duration so the body can borrow the session.
    pub(crate) fn guarded<T>(
        &mut self,
        site: &'static str,
        body: impl FnOnce(&mut Self) -> EngineResult<T>,
    ) -> GuardOutcome<T> {
        let mut barrier = std::mem::replace(&mut self.barrier, FaultBarrier::pass_through());
        let outcome = barrier.guard(site, || body(self));
        self.barrier = barrier;
        outcome
    }

    /// Diagnostic line for a trapped, resumable fault.
    pub(crate) fn note_fault(&mut self, notice: FaultNotice) {
        let line = format!(
            "Fault trapped: {} at elapsed time {:.4} days, step {}",
            notice.kind.label(),
            self.elapsed_days(),
            self.step_count
        );
        warn!(site = notice.site, "{line}");
        if let Some(report) = &mut self.report {
            let _ = report.write_line(&line);
        }
        if let Some(stats) = &mut self.stats {
            stats.record_fault();
        }
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        warn!("{warning}");
        if let Some(report) = &mut self.report {
            let _ = report.write_line(&format!("WARNING: {warning}"));
        }
        self.warnings.push(warning);
    }

    fn artifact_header(&self) -> ArtifactHeader {
        ArtifactHeader {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            title: self.title.clone(),
            engine_version: sf_core::ENGINE_VERSION,
            flow_units: self.options.flow_units.label().to_string(),
            start_date: self
                .options
                .calendar
                .start()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            report_step_s: self.options.report_step_s,
            node_ids: self.network.nodes.iter().map(|n| n.name.clone()).collect(),
            link_ids: self.network.links.iter().map(|l| l.name.clone()).collect(),
        }
    }

    fn write_report_preamble(&mut self) -> EngineResult<()> {
        let title = self.title.clone();
        if let Some(report) = &mut self.report {
            report
                .write_line(&format!(
                    "stormflow {} - drainage network simulation",
                    version_string()
                ))
                .and_then(|_| report.write_section(&title))
                .map_err(|e| EngineError::Report {
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Best-effort cleanup for sessions abandoned without close().
        self.close_impl();
    }
}
