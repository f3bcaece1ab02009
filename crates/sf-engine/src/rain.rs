//! Rainfall processor.
//!
//! Rainfall-file handling belongs to an external collaborator; what the
//! session owns is the open/close bookkeeping over the gage series the
//! network carries: a sanity pass over the series and the precomputed
//! end-of-rainfall time the runoff engine's wet/dry stepping keys off.

use sf_network::Network;
use tracing::info;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Default)]
pub struct RainfallState {
    gage_count: usize,
    point_count: usize,
    /// Clock value after which every gage is dry forever.
    end_of_rain_ms: f64,
}

impl RainfallState {
    pub fn open(network: &Network) -> EngineResult<Self> {
        let mut point_count = 0;
        let mut end_of_rain_ms = 0.0_f64;
        for gage in &network.gages {
            for pair in gage.series.windows(2) {
                if pair[1].0 <= pair[0].0 {
                    return Err(EngineError::Rainfall {
                        message: format!("gage '{}' series offsets must increase", gage.name),
                    });
                }
            }
            for &(_, intensity) in &gage.series {
                if !intensity.is_finite() || intensity < 0.0 {
                    return Err(EngineError::Rainfall {
                        message: format!("gage '{}' has a bad intensity {intensity}", gage.name),
                    });
                }
                point_count += 1;
            }
            // Rain from a wet point lasts until the next entry; a wet
            // point with nothing after it never ends.
            if let Some(last_wet) = gage
                .series
                .iter()
                .rev()
                .find(|&&(_, intensity)| intensity > 0.0)
            {
                let after = gage.series.iter().find(|&&(o, _)| o > last_wet.0);
                end_of_rain_ms = match after {
                    Some(&(o, _)) => end_of_rain_ms.max(o),
                    None => f64::INFINITY,
                };
            }
        }
        info!(
            gages = network.gages.len(),
            points = point_count,
            "rainfall processor opened"
        );
        Ok(Self {
            gage_count: network.gages.len(),
            point_count,
            end_of_rain_ms,
        })
    }

    /// True while any gage can still be wet at or after `clock_ms`.
    pub fn rain_possible_at(&self, clock_ms: f64) -> bool {
        clock_ms < self.end_of_rain_ms
    }

    pub fn gage_count(&self) -> usize {
        self.gage_count
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn close(&mut self) {
        info!(gages = self.gage_count, "rainfall processor closed");
    }
}
