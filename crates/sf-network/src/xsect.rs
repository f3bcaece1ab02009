//! Link cross-section shapes.
//!
//! Only the wetted-area bookkeeping the coupling surface needs lives
//! here (depth to area, full depth, full area). Conveyance hydraulics
//! belong to the routing collaborator, not this crate.

/// Cross-section shape of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XSection {
    Circular { diameter_ft: f64 },
    Rectangular { width_ft: f64, height_ft: f64 },
    /// Symmetric V shape: `top_width_ft` across at `height_ft` depth.
    Triangular { top_width_ft: f64, height_ft: f64 },
    /// Degenerate section for pumps and other non-conduit links.
    Dummy,
}

impl XSection {
    /// Depth at which the section is full.
    pub fn y_full_ft(&self) -> f64 {
        match *self {
            XSection::Circular { diameter_ft } => diameter_ft,
            XSection::Rectangular { height_ft, .. } => height_ft,
            XSection::Triangular { height_ft, .. } => height_ft,
            XSection::Dummy => 0.0,
        }
    }

    /// Area of the full section.
    pub fn full_area_ft2(&self) -> f64 {
        match *self {
            XSection::Circular { diameter_ft } => {
                std::f64::consts::FRAC_PI_4 * diameter_ft * diameter_ft
            }
            XSection::Rectangular { width_ft, height_ft } => width_ft * height_ft,
            XSection::Triangular { top_width_ft, height_ft } => 0.5 * top_width_ft * height_ft,
            XSection::Dummy => 0.0,
        }
    }

    /// Wetted area at the given flow depth. Depth is clamped to
    /// `[0, y_full]`.
    pub fn area_of_depth_ft2(&self, depth_ft: f64) -> f64 {
        let y = depth_ft.clamp(0.0, self.y_full_ft());
        match *self {
            XSection::Circular { diameter_ft } => {
                if diameter_ft <= 0.0 {
                    return 0.0;
                }
                // Circular segment: theta is the wetted central angle.
                let theta = 2.0 * (1.0 - 2.0 * y / diameter_ft).clamp(-1.0, 1.0).acos();
                diameter_ft * diameter_ft / 8.0 * (theta - theta.sin())
            }
            XSection::Rectangular { width_ft, .. } => width_ft * y,
            XSection::Triangular { top_width_ft, height_ft } => {
                if height_ft <= 0.0 {
                    return 0.0;
                }
                0.5 * (top_width_ft * y / height_ft) * y
            }
            XSection::Dummy => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_area_endpoints() {
        let xs = XSection::Circular { diameter_ft: 2.0 };
        assert!(xs.area_of_depth_ft2(0.0).abs() < 1e-12);
        let full = xs.area_of_depth_ft2(2.0);
        assert!((full - xs.full_area_ft2()).abs() < 1e-9);
        // Half full circle is half the full area.
        let half = xs.area_of_depth_ft2(1.0);
        assert!((half - 0.5 * xs.full_area_ft2()).abs() < 1e-9);
    }

    #[test]
    fn rectangular_area_is_linear() {
        let xs = XSection::Rectangular { width_ft: 3.0, height_ft: 2.0 };
        assert!((xs.area_of_depth_ft2(0.5) - 1.5).abs() < 1e-12);
        assert!((xs.area_of_depth_ft2(10.0) - xs.full_area_ft2()).abs() < 1e-12);
    }

    #[test]
    fn triangular_area_is_quadratic() {
        let xs = XSection::Triangular { top_width_ft: 4.0, height_ft: 2.0 };
        assert!((xs.area_of_depth_ft2(1.0) - 1.0).abs() < 1e-12);
        assert!((xs.full_area_ft2() - 4.0).abs() < 1e-12);
    }
}
