//! Catchments and rain gages: the runoff-producing entities.

/// A rain gage with a step-function intensity series.
#[derive(Debug, Clone)]
pub struct RainGage {
    pub name: String,
    /// `(offset_ms, intensity_in_hr)` pairs sorted by offset. Each
    /// intensity holds from its offset until the next one; zero before
    /// the first point and after the series runs out is represented by
    /// explicit zero entries written at build time.
    pub series: Vec<(f64, f64)>,
}

impl RainGage {
    /// Rainfall intensity at the given clock value, in/hr.
    pub fn intensity_at(&self, clock_ms: f64) -> f64 {
        let mut current = 0.0;
        for &(offset_ms, intensity) in &self.series {
            if offset_ms > clock_ms {
                break;
            }
            current = intensity;
        }
        current
    }

    /// True once the gage is dry now and has no wet entry left ahead.
    pub fn exhausted_at(&self, clock_ms: f64) -> bool {
        self.intensity_at(clock_ms) == 0.0
            && self
                .series
                .iter()
                .all(|&(offset_ms, intensity)| offset_ms <= clock_ms || intensity == 0.0)
    }
}

/// A catchment draining to one network node.
#[derive(Debug, Clone)]
pub struct Catchment {
    pub name: String,
    /// Node index receiving this catchment's runoff.
    pub outlet_node: usize,
    /// Gage index supplying rainfall.
    pub gage: usize,
    pub area_ac: f64,
    /// Fraction of rainfall that becomes runoff.
    pub runoff_coeff: f64,
}
