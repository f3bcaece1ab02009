//! Fault barrier: interception and classification of synchronous
//! numeric faults.
//!
//! The barrier wraps the open, start, and per-step advance phases.
//! Resumable fault kinds abandon the guarded phase but leave the
//! session stepping-capable, up to a cumulative budget; fatal kinds
//! (and budget exhaustion) halt the run with a system-fault error.

use std::panic::{self, AssertUnwindSafe};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    FpDivideByZero,
    FpInvalidOperation,
    FpOverflow,
    FpUnderflow,
    FpDenormal,
    FpStackCheck,
    IntDivideByZero,
    IntOverflow,
    AccessViolation,
    Unknown,
}

impl FaultKind {
    pub fn is_resumable(self) -> bool {
        matches!(
            self,
            FaultKind::FpDivideByZero
                | FaultKind::FpInvalidOperation
                | FaultKind::FpOverflow
                | FaultKind::FpUnderflow
                | FaultKind::FpDenormal
                | FaultKind::IntDivideByZero
                | FaultKind::IntOverflow
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            FaultKind::FpDivideByZero => "floating point divide by zero",
            FaultKind::FpInvalidOperation => "illegal floating point operand",
            FaultKind::FpOverflow => "floating point overflow",
            FaultKind::FpUnderflow => "floating point underflow",
            FaultKind::FpDenormal => "denormalized floating point operand",
            FaultKind::FpStackCheck => "floating point stack check",
            FaultKind::IntDivideByZero => "integer divide by zero",
            FaultKind::IntOverflow => "integer overflow",
            FaultKind::AccessViolation => "memory access violation",
            FaultKind::Unknown => "unknown fault",
        }
    }

    /// Classify a suspect numeric value, for collaborators raising
    /// `EngineError::NumericFault` on their intermediate results.
    pub fn of_value(value: f64) -> Option<FaultKind> {
        if value.is_nan() {
            Some(FaultKind::FpInvalidOperation)
        } else if value.is_infinite() {
            Some(FaultKind::FpOverflow)
        } else if value != 0.0 && value.abs() < f64::MIN_POSITIVE {
            Some(FaultKind::FpUnderflow)
        } else {
            None
        }
    }
}

/// What a guarded phase produced.
#[derive(Debug)]
pub enum GuardOutcome<T> {
    /// The body ran to completion; its own result passes through.
    Completed(EngineResult<T>),
    /// A resumable fault was trapped; the phase was abandoned but the
    /// session may continue.
    Trapped(FaultNotice),
    /// A fatal fault, or a resumable one past the budget.
    Halted(FaultNotice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultNotice {
    pub kind: FaultKind,
    pub site: &'static str,
}

/// The interception capability. `Trapping` catches panics and typed
/// numeric faults; `PassThrough` is the degraded form for hosts that
/// must observe faults natively (panics propagate, numeric faults halt
/// immediately).
#[derive(Debug)]
pub enum FaultBarrier {
    Trapping { faults: u32, budget: u32 },
    PassThrough,
}

impl FaultBarrier {
    pub fn trapping(budget: u32) -> Self {
        FaultBarrier::Trapping { faults: 0, budget }
    }

    pub fn pass_through() -> Self {
        FaultBarrier::PassThrough
    }

    pub fn fault_count(&self) -> u32 {
        match self {
            FaultBarrier::Trapping { faults, .. } => *faults,
            FaultBarrier::PassThrough => 0,
        }
    }

    pub fn reset(&mut self) {
        if let FaultBarrier::Trapping { faults, .. } = self {
            *faults = 0;
        }
    }

    pub fn guard<T>(
        &mut self,
        site: &'static str,
        body: impl FnOnce() -> EngineResult<T>,
    ) -> GuardOutcome<T> {
        match self {
            FaultBarrier::PassThrough => match body() {
                Err(EngineError::NumericFault { kind, site }) => {
                    GuardOutcome::Halted(FaultNotice { kind, site })
                }
                result => GuardOutcome::Completed(result),
            },
            FaultBarrier::Trapping { faults, budget } => {
                match panic::catch_unwind(AssertUnwindSafe(body)) {
                    Ok(Ok(value)) => GuardOutcome::Completed(Ok(value)),
                    Ok(Err(EngineError::NumericFault { kind, site })) => {
                        dispose(FaultNotice { kind, site }, faults, *budget)
                    }
                    Ok(Err(other)) => GuardOutcome::Completed(Err(other)),
                    Err(payload) => {
                        let kind = classify_panic(payload.as_ref());
                        dispose(FaultNotice { kind, site }, faults, *budget)
                    }
                }
            }
        }
    }
}

fn dispose<T>(notice: FaultNotice, faults: &mut u32, budget: u32) -> GuardOutcome<T> {
    if !notice.kind.is_resumable() {
        return GuardOutcome::Halted(notice);
    }
    *faults += 1;
    if *faults > budget {
        GuardOutcome::Halted(notice)
    } else {
        GuardOutcome::Trapped(notice)
    }
}

fn classify_panic(payload: &(dyn std::any::Any + Send)) -> FaultKind {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        return FaultKind::Unknown;
    };
    if message.contains("divide by zero") || message.contains("remainder of zero") {
        FaultKind::IntDivideByZero
    } else if message.contains("overflow") {
        FaultKind::IntOverflow
    } else if message.contains("index out of bounds")
        || message.contains("slice index")
        || message.contains("out of range")
    {
        FaultKind::AccessViolation
    } else {
        FaultKind::Unknown
    }
}
