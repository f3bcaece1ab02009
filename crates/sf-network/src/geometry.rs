//! Node storage geometry: depth <-> stored volume.

use crate::error::{NetworkError, NetworkResult};

/// Default wet surface area of a junction shaft, square feet.
pub const DEFAULT_SURF_AREA_FT2: f64 = 12.566;

/// How a node converts ponded depth into stored volume.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeGeometry {
    /// Constant surface area over the full depth range.
    Prismatic { area_ft2: f64 },
    /// Piecewise-linear surface area vs depth. Points must be sorted by
    /// depth; area between points interpolates linearly, volume
    /// integrates the trapezoids.
    Tabulated { curve: Vec<(f64, f64)> },
}

impl Default for NodeGeometry {
    fn default() -> Self {
        NodeGeometry::Prismatic {
            area_ft2: DEFAULT_SURF_AREA_FT2,
        }
    }
}

impl NodeGeometry {
    /// Validate a tabulated curve: nonempty, depths strictly increasing,
    /// areas non-negative.
    pub fn validate(&self, name: &str) -> NetworkResult<()> {
        if let NodeGeometry::Tabulated { curve } = self {
            if curve.is_empty() {
                return Err(NetworkError::BadGeometry {
                    name: name.to_string(),
                    what: "storage curve is empty",
                });
            }
            for pair in curve.windows(2) {
                if pair[1].0 <= pair[0].0 {
                    return Err(NetworkError::BadGeometry {
                        name: name.to_string(),
                        what: "storage curve depths must increase",
                    });
                }
            }
            if curve.iter().any(|&(_, a)| a < 0.0) {
                return Err(NetworkError::BadGeometry {
                    name: name.to_string(),
                    what: "storage curve area is negative",
                });
            }
        }
        Ok(())
    }

    /// Surface area at the given depth.
    pub fn area_of_depth_ft2(&self, depth_ft: f64) -> f64 {
        let d = depth_ft.max(0.0);
        match self {
            NodeGeometry::Prismatic { area_ft2 } => *area_ft2,
            NodeGeometry::Tabulated { curve } => {
                if curve.is_empty() {
                    return 0.0;
                }
                if d <= curve[0].0 {
                    return curve[0].1;
                }
                for pair in curve.windows(2) {
                    let (d0, a0) = pair[0];
                    let (d1, a1) = pair[1];
                    if d <= d1 {
                        let t = (d - d0) / (d1 - d0);
                        return a0 + t * (a1 - a0);
                    }
                }
                curve[curve.len() - 1].1
            }
        }
    }

    /// Stored volume below the given depth.
    pub fn volume_of_depth_ft3(&self, depth_ft: f64) -> f64 {
        let d = depth_ft.max(0.0);
        match self {
            NodeGeometry::Prismatic { area_ft2 } => area_ft2 * d,
            NodeGeometry::Tabulated { curve } => {
                if curve.is_empty() {
                    return 0.0;
                }
                let mut volume = 0.0;
                let mut prev = (0.0, curve[0].1);
                for &(cd, ca) in curve {
                    if d <= cd {
                        let a = self.area_of_depth_ft2(d);
                        volume += 0.5 * (prev.1 + a) * (d - prev.0);
                        return volume;
                    }
                    volume += 0.5 * (prev.1 + ca) * (cd - prev.0);
                    prev = (cd, ca);
                }
                // Above the last point the area holds constant.
                volume + prev.1 * (d - prev.0)
            }
        }
    }

    /// Depth holding the given volume: monotone inverse of
    /// `volume_of_depth_ft3`, solved by bisection.
    pub fn depth_of_volume_ft(&self, volume_ft3: f64, max_depth_ft: f64) -> f64 {
        let v = volume_ft3.max(0.0);
        if v == 0.0 || max_depth_ft <= 0.0 {
            return 0.0;
        }
        if self.volume_of_depth_ft3(max_depth_ft) <= v {
            return max_depth_ft;
        }
        let (mut lo, mut hi) = (0.0, max_depth_ft);
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            if self.volume_of_depth_ft3(mid) < v {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}
