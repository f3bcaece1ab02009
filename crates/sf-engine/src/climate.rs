//! Climate state: the evaporation driver.
//!
//! On steps where no runoff analysis runs, the session refreshes this
//! state to the calendar time of the routing clock so evaporation keeps
//! tracking the simulated date.

use chrono::NaiveDateTime;

/// Feet per inch divided by seconds per day, for the in/day rate.
const FT_PER_S_PER_IN_DAY: f64 = 1.0 / (12.0 * 86_400.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub evap_rate_in_day: f64,
    current: NaiveDateTime,
}

impl Climate {
    pub fn new(evap_rate_in_day: f64, start: NaiveDateTime) -> Self {
        Self {
            evap_rate_in_day,
            current: start,
        }
    }

    /// Refresh the climate state to a simulated calendar time.
    pub fn set_state(&mut self, date: NaiveDateTime) {
        self.current = date;
    }

    pub fn current_date(&self) -> NaiveDateTime {
        self.current
    }

    /// Potential evaporation rate as a depth rate in ft/s.
    pub fn evap_rate_ft_s(&self) -> f64 {
        self.evap_rate_in_day * FT_PER_S_PER_IN_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::SimCalendar;

    #[test]
    fn set_state_tracks_the_clock() {
        let cal = SimCalendar::parse("2024-06-01 00:00:00").unwrap();
        let mut climate = Climate::new(0.1, cal.start());
        climate.set_state(cal.date_time(3_600_000.0));
        assert_eq!(
            climate.current_date().format("%H:%M:%S").to_string(),
            "01:00:00"
        );
    }

    #[test]
    fn evap_rate_converts_to_ft_per_s() {
        let cal = SimCalendar::default();
        let climate = Climate::new(12.0, cal.start());
        // 12 in/day = 1 ft/day.
        assert!((climate.evap_rate_ft_s() - 1.0 / 86_400.0).abs() < 1e-15);
    }
}
