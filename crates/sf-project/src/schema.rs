//! Project schema definitions.

use serde::{Deserialize, Serialize};
use sf_core::FlowUnits;
use std::path::PathBuf;

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDef {
    pub version: u32,
    pub title: String,
    #[serde(default)]
    pub options: OptionsDef,
    #[serde(default)]
    pub raingages: Vec<RainGageDef>,
    #[serde(default)]
    pub catchments: Vec<CatchmentDef>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotstart: Option<HotstartDef>,
}

impl ProjectDef {
    /// Empty project with default options, mostly a test-fixture seed.
    pub fn new(title: &str) -> Self {
        Self {
            version: LATEST_VERSION,
            title: title.to_string(),
            options: OptionsDef::default(),
            raingages: Vec::new(),
            catchments: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
            hotstart: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionsDef {
    #[serde(default)]
    pub flow_units: FlowUnits,
    /// `YYYY-MM-DD HH:MM:SS`.
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_duration_hours")]
    pub duration_hours: f64,
    #[serde(default = "default_report_step_s")]
    pub report_step_s: f64,
    #[serde(default = "default_wet_step_s")]
    pub wet_step_s: f64,
    #[serde(default = "default_dry_step_s")]
    pub dry_step_s: f64,
    #[serde(default = "default_routing_step_s")]
    pub routing_step_s: f64,
    #[serde(default)]
    pub routing_method: RoutingMethodDef,
    #[serde(default)]
    pub ignore_rainfall: bool,
    #[serde(default)]
    pub ignore_routing: bool,
    #[serde(default)]
    pub allow_ponding: bool,
    #[serde(default)]
    pub evap_rate_in_day: f64,
    /// Trapped numeric faults tolerated before the run halts.
    #[serde(default = "default_fault_budget")]
    pub fault_budget: u32,
}

fn default_start_date() -> String {
    "2000-01-01 00:00:00".to_string()
}

fn default_duration_hours() -> f64 {
    24.0
}

fn default_report_step_s() -> f64 {
    900.0
}

fn default_wet_step_s() -> f64 {
    300.0
}

fn default_dry_step_s() -> f64 {
    3_600.0
}

fn default_routing_step_s() -> f64 {
    600.0
}

fn default_fault_budget() -> u32 {
    100
}

impl Default for OptionsDef {
    fn default() -> Self {
        Self {
            flow_units: FlowUnits::default(),
            start_date: default_start_date(),
            duration_hours: default_duration_hours(),
            report_step_s: default_report_step_s(),
            wet_step_s: default_wet_step_s(),
            dry_step_s: default_dry_step_s(),
            routing_step_s: default_routing_step_s(),
            routing_method: RoutingMethodDef::default(),
            ignore_rainfall: false,
            ignore_routing: false,
            allow_ponding: false,
            evap_rate_in_day: 0.0,
            fault_budget: default_fault_budget(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoutingMethodDef {
    Steady,
    #[default]
    KinematicWave,
    DynamicWave,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RainGageDef {
    pub id: String,
    #[serde(default)]
    pub series: Vec<RainPointDef>,
}

/// One point of a gage series: intensity holds from this offset until
/// the next point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RainPointDef {
    pub offset_min: f64,
    pub intensity_in_hr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatchmentDef {
    pub id: String,
    pub outlet: String,
    pub raingage: String,
    pub area_ac: f64,
    pub runoff_coeff: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: String,
    pub kind: NodeKindDef,
    #[serde(default)]
    pub invert_elev_ft: f64,
    #[serde(default)]
    pub max_depth_ft: f64,
    #[serde(default)]
    pub init_depth_ft: f64,
    #[serde(default)]
    pub surcharge_depth_ft: f64,
    #[serde(default)]
    pub ponded_area_ft2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum NodeKindDef {
    Junction,
    Outfall,
    Storage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        area_ft2: Option<f64>,
        #[serde(default)]
        curve: Vec<StoragePointDef>,
    },
    Divider,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StoragePointDef {
    pub depth_ft: f64,
    pub area_ft2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub id: String,
    pub kind: LinkKindDef,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub offset1_ft: f64,
    #[serde(default)]
    pub offset2_ft: f64,
    /// Design conveyance capacity; absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_cfs: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LinkKindDef {
    Conduit {
        xsect: XSectionDef,
        #[serde(default)]
        length_ft: f64,
    },
    Pump,
    Orifice { xsect: XSectionDef },
    Weir { xsect: XSectionDef },
    Outlet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "shape")]
pub enum XSectionDef {
    Circular { diameter_ft: f64 },
    Rectangular { width_ft: f64, height_ft: f64 },
    Triangular { top_width_ft: f64, height_ft: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HotstartDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_file: Option<PathBuf>,
}
