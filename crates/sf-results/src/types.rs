//! Result data types.
//!
//! The results artifact is a JSONL stream: one header line, one line
//! per reported period, one terminal end line.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record")]
pub enum ArtifactRecord {
    Header(ArtifactHeader),
    Period(PeriodRecord),
    End(EndRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub schema_version: u32,
    pub title: String,
    pub engine_version: i32,
    pub flow_units: String,
    pub start_date: String,
    pub report_step_s: f64,
    pub node_ids: Vec<String>,
    pub link_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub elapsed_ms: f64,
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
    pub system: SystemRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub depth_ft: f64,
    pub head_ft: f64,
    pub volume_ft3: f64,
    pub lateral_inflow_cfs: f64,
    pub total_inflow_cfs: f64,
    pub overflow_cfs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub flow_cfs: f64,
    pub depth_ft: f64,
    pub velocity_fps: f64,
    pub volume_ft3: f64,
    /// Flow as a fraction of design capacity; 0 when unbounded.
    pub capacity_frac: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemRecord {
    pub total_lateral_inflow_cfs: f64,
    pub total_outflow_cfs: f64,
    pub total_overflow_cfs: f64,
    pub total_stored_ft3: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndRecord {
    pub periods: usize,
    pub steps: u64,
    pub error_code: i32,
}
