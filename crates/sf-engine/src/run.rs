//! One-call run driver: open, start, step to completion, end, report,
//! close. Front ends that want per-step control use `Session` directly.

use std::path::Path;

use sf_core::MSEC_PER_DAY;
use tracing::error;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Opening,
    Running,
    Ending,
    Reporting,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::Opening => "opening",
            RunStage::Running => "simulating",
            RunStage::Ending => "finishing",
            RunStage::Reporting => "writing report",
        }
    }
}

/// Progress notification for front ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    /// Completed fraction of the run, in [0, 1].
    pub fraction: f64,
    pub elapsed_days: f64,
}

/// Run a project file to completion and return the final error code
/// (0 on success). A latched error short-circuits the step loop; the
/// session is always closed.
pub fn run(
    input: &Path,
    report: &Path,
    output: Option<&Path>,
    mut progress: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> i32 {
    let mut emit = |stage: RunStage, fraction: f64, elapsed_days: f64| {
        if let Some(callback) = progress.as_mut() {
            callback(RunProgressEvent {
                stage,
                fraction,
                elapsed_days,
            });
        }
    };

    let mut session = match Session::open(input, report, output) {
        Ok(session) => session,
        Err(err) => {
            error!(code = err.code(), error = %err, "open failed");
            return err.code();
        }
    };
    emit(RunStage::Opening, 0.0, 0.0);

    let total_duration_ms = session.options().total_duration_ms;
    if session.start(true).is_ok() {
        emit(RunStage::Running, 0.0, 0.0);
        loop {
            match session.step() {
                Ok(elapsed_days) if elapsed_days > 0.0 => {
                    let fraction = if total_duration_ms > 0.0 {
                        (elapsed_days * MSEC_PER_DAY / total_duration_ms).min(1.0)
                    } else {
                        1.0
                    };
                    emit(RunStage::Running, fraction, elapsed_days);
                }
                Ok(_) => break,
                Err(_) => break,
            }
        }
    }

    emit(RunStage::Ending, 1.0, session.elapsed_days());
    let _ = session.end();
    emit(RunStage::Reporting, 1.0, session.elapsed_days());
    let _ = session.report();
    session.close()
}
