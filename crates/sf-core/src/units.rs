//! Unit-system tags.
//!
//! Quantities throughout the engine are plain `f64` fields with unit
//! suffixes in their names (`_ft`, `_cfs`, `_ms`). The tags here record
//! what the project file declared so reports can echo it; no numeric
//! conversion happens in this crate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Us,
    Si,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowUnits {
    #[default]
    Cfs,
    Gpm,
    Mgd,
    Cms,
    Lps,
    Mld,
}

impl FlowUnits {
    pub fn unit_system(self) -> UnitSystem {
        match self {
            FlowUnits::Cfs | FlowUnits::Gpm | FlowUnits::Mgd => UnitSystem::Us,
            FlowUnits::Cms | FlowUnits::Lps | FlowUnits::Mld => UnitSystem::Si,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowUnits::Cfs => "CFS",
            FlowUnits::Gpm => "GPM",
            FlowUnits::Mgd => "MGD",
            FlowUnits::Cms => "CMS",
            FlowUnits::Lps => "LPS",
            FlowUnits::Mld => "MLD",
        }
    }
}
