//! Network links.

use crate::xsect::XSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Conduit,
    Pump,
    Orifice,
    Weir,
    Outlet,
}

/// A link conveying flow between two nodes.
#[derive(Debug, Clone)]
pub struct Link {
    pub name: String,
    pub kind: LinkKind,
    pub from_node: usize,
    pub to_node: usize,

    // Static geometry
    pub offset1_ft: f64,
    pub offset2_ft: f64,
    pub length_ft: f64,
    /// Design conveyance capacity, an input parameter on every link.
    pub capacity_cfs: f64,
    pub xsect: XSection,
    /// +1 when the link is oriented downhill as entered, -1 when the
    /// build pass found it reversed. Reported flow and velocity carry
    /// this sign.
    pub direction: f64,

    // Dynamic state
    pub flow_cfs: f64,
    pub depth_ft: f64,
    pub volume_ft3: f64,
    pub froude: f64,
    /// Control setting in [0,1]; 1 = fully open/on.
    pub setting: f64,
}

impl Link {
    pub fn new(name: &str, kind: LinkKind, from_node: usize, to_node: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            from_node,
            to_node,
            offset1_ft: 0.0,
            offset2_ft: 0.0,
            length_ft: 0.0,
            capacity_cfs: 0.0,
            xsect: XSection::Dummy,
            direction: 1.0,
            flow_cfs: 0.0,
            depth_ft: 0.0,
            volume_ft3: 0.0,
            froude: 0.0,
            setting: 1.0,
        }
    }

    /// Full depth of the cross section.
    pub fn y_full_ft(&self) -> f64 {
        self.xsect.y_full_ft()
    }

    /// Mean velocity for a given flow and depth; zero when dry.
    pub fn velocity_fps(&self, flow_cfs: f64, depth_ft: f64) -> f64 {
        let area = self.xsect.area_of_depth_ft2(depth_ft);
        if area <= 1e-6 {
            return 0.0;
        }
        flow_cfs.abs() / area
    }

    /// Reset dynamic state.
    pub fn initialize_state(&mut self) {
        self.flow_cfs = 0.0;
        self.depth_ft = 0.0;
        self.volume_ft3 = 0.0;
        self.froude = 0.0;
        self.setting = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_is_flow_over_area() {
        let mut link = Link::new("C1", LinkKind::Conduit, 0, 1);
        link.xsect = XSection::Rectangular { width_ft: 2.0, height_ft: 2.0 };
        // Depth 1 ft -> area 2 ft2; 4 cfs -> 2 ft/s.
        assert!((link.velocity_fps(4.0, 1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn velocity_zero_when_dry() {
        let mut link = Link::new("C1", LinkKind::Conduit, 0, 1);
        link.xsect = XSection::Circular { diameter_ft: 1.0 };
        assert_eq!(link.velocity_fps(3.0, 0.0), 0.0);
    }
}
