//! Simulation clock arithmetic.
//!
//! Clocks are `f64` milliseconds since the start of the run, matching the
//! resolution the step coordinator works in. Elapsed time is reported to
//! callers in decimal days.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{CoreError, CoreResult};

/// Milliseconds per day.
pub const MSEC_PER_DAY: f64 = 86_400_000.0;

/// Milliseconds per second.
pub const MSEC_PER_SEC: f64 = 1_000.0;

/// Smallest routing step the end-of-run clamp will apply.
pub const MIN_ROUTING_STEP_MS: f64 = 1.0;

pub fn msec_to_days(clock_ms: f64) -> f64 {
    clock_ms / MSEC_PER_DAY
}

pub fn days_to_msec(days: f64) -> f64 {
    days * MSEC_PER_DAY
}

pub fn sec_to_msec(step_s: f64) -> f64 {
    step_s * MSEC_PER_SEC
}

pub fn msec_to_sec(clock_ms: f64) -> f64 {
    clock_ms / MSEC_PER_SEC
}

/// Split elapsed decimal days into whole days and the hour of day,
/// for progress display.
pub fn elapsed_day_hour(elapsed_days: f64) -> (u64, u32) {
    let day = elapsed_days.floor();
    let hour = ((elapsed_days - day) * 24.0) as u32;
    (day as u64, hour.min(23))
}

/// Maps millisecond clock values onto calendar date/times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimCalendar {
    start: NaiveDateTime,
}

impl SimCalendar {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start }
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` start stamp.
    pub fn parse(stamp: &str) -> CoreResult<Self> {
        let start = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
            .map_err(|_| CoreError::InvalidArg {
                what: "start date (expected YYYY-MM-DD HH:MM:SS)",
            })?;
        Ok(Self { start })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Calendar date/time at the given clock value.
    pub fn date_time(&self, clock_ms: f64) -> NaiveDateTime {
        self.start + Duration::milliseconds(clock_ms.round() as i64)
    }
}

impl Default for SimCalendar {
    fn default() -> Self {
        // Midnight, first day of 2000; projects normally override this.
        let start = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self { start }
    }
}
