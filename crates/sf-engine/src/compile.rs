//! Project compilation: schema definitions into a runnable network and
//! engine options.

use sf_core::SimCalendar;
use sf_network::{
    Catchment, LinkKind, Network, NodeGeometry, NodeKind, RainGage, XSection,
    geometry::DEFAULT_SURF_AREA_FT2,
};
use sf_project::{
    LinkKindDef, NodeKindDef, OptionsDef, ProjectDef, XSectionDef, project_warnings,
    validate_project,
};

use crate::error::{EngineError, EngineResult};
use crate::session::EngineOptions;

pub struct CompiledProject {
    pub title: String,
    pub options: EngineOptions,
    pub network: Network,
    pub warnings: Vec<String>,
}

pub fn compile_project(def: &ProjectDef) -> EngineResult<CompiledProject> {
    validate_project(def).map_err(|e| EngineError::Configuration {
        message: e.to_string(),
    })?;

    let mut options = compile_options(&def.options)?;
    if let Some(hotstart) = &def.hotstart {
        options.hotstart_use = hotstart.use_file.clone();
        options.hotstart_save = hotstart.save_file.clone();
    }
    let mut network = Network::new();

    for gage_def in &def.raingages {
        let series = gage_def
            .series
            .iter()
            .map(|p| (p.offset_min * 60_000.0, p.intensity_in_hr))
            .collect();
        network.add_gage(RainGage {
            name: gage_def.id.clone(),
            series,
        });
    }

    for node_def in &def.nodes {
        let (kind, geometry) = match &node_def.kind {
            NodeKindDef::Junction => (NodeKind::Junction, NodeGeometry::default()),
            NodeKindDef::Outfall => (NodeKind::Outfall, NodeGeometry::default()),
            NodeKindDef::Divider => (NodeKind::Divider, NodeGeometry::default()),
            NodeKindDef::Storage { area_ft2, curve } => {
                let geometry = if curve.is_empty() {
                    NodeGeometry::Prismatic {
                        area_ft2: area_ft2.unwrap_or(DEFAULT_SURF_AREA_FT2),
                    }
                } else {
                    NodeGeometry::Tabulated {
                        curve: curve.iter().map(|p| (p.depth_ft, p.area_ft2)).collect(),
                    }
                };
                (NodeKind::Storage, geometry)
            }
        };
        let index = network.add_node(&node_def.id, kind);
        let node = &mut network.nodes[index];
        node.geometry = geometry;
        node.invert_elev_ft = node_def.invert_elev_ft;
        node.full_depth_ft = node_def.max_depth_ft;
        node.init_depth_ft = node_def.init_depth_ft;
        node.surcharge_depth_ft = node_def.surcharge_depth_ft;
        node.ponded_area_ft2 = node_def.ponded_area_ft2;
    }

    for link_def in &def.links {
        let from = lookup_node(&network, &link_def.from, &link_def.id)?;
        let to = lookup_node(&network, &link_def.to, &link_def.id)?;
        let (kind, xsect, length_ft) = match &link_def.kind {
            LinkKindDef::Conduit { xsect, length_ft } => {
                (LinkKind::Conduit, compile_xsect(xsect), *length_ft)
            }
            LinkKindDef::Pump => (LinkKind::Pump, XSection::Dummy, 0.0),
            LinkKindDef::Orifice { xsect } => (LinkKind::Orifice, compile_xsect(xsect), 0.0),
            LinkKindDef::Weir { xsect } => (LinkKind::Weir, compile_xsect(xsect), 0.0),
            LinkKindDef::Outlet => (LinkKind::Outlet, XSection::Dummy, 0.0),
        };
        let index = network.add_link(&link_def.id, kind, from, to, xsect)?;
        let link = &mut network.links[index];
        link.offset1_ft = link_def.offset1_ft;
        link.offset2_ft = link_def.offset2_ft;
        link.length_ft = length_ft;
        link.capacity_cfs = link_def.capacity_cfs.unwrap_or(0.0);
    }

    for catchment_def in &def.catchments {
        let outlet_node = lookup_node(&network, &catchment_def.outlet, &catchment_def.id)?;
        let gage = network
            .gages
            .iter()
            .position(|g| g.name == catchment_def.raingage)
            .ok_or_else(|| EngineError::Configuration {
                message: format!(
                    "catchment '{}' references unknown gage '{}'",
                    catchment_def.id, catchment_def.raingage
                ),
            })?;
        network.add_catchment(Catchment {
            name: catchment_def.id.clone(),
            outlet_node,
            gage,
            area_ac: catchment_def.area_ac,
            runoff_coeff: catchment_def.runoff_coeff,
        })?;
    }

    network.finalize()?;
    network.initialize_state();

    Ok(CompiledProject {
        title: def.title.clone(),
        options,
        network,
        warnings: project_warnings(def),
    })
}

fn compile_options(def: &OptionsDef) -> EngineResult<EngineOptions> {
    let calendar = SimCalendar::parse(&def.start_date)?;
    Ok(EngineOptions {
        flow_units: def.flow_units,
        calendar,
        total_duration_ms: def.duration_hours * 3_600_000.0,
        report_step_s: def.report_step_s,
        wet_step_s: def.wet_step_s,
        dry_step_s: def.dry_step_s,
        routing_step_s: def.routing_step_s,
        routing_method: def.routing_method.into(),
        ignore_rainfall: def.ignore_rainfall,
        ignore_routing: def.ignore_routing,
        allow_ponding: def.allow_ponding,
        evap_rate_in_day: def.evap_rate_in_day,
        fault_budget: def.fault_budget,
        hotstart_use: None,
        hotstart_save: None,
    })
}

fn lookup_node(network: &Network, id: &str, context: &str) -> EngineResult<usize> {
    network
        .node_index(id)
        .ok_or_else(|| EngineError::Configuration {
            message: format!("'{context}' references unknown node '{id}'"),
        })
}

fn compile_xsect(def: &XSectionDef) -> XSection {
    match *def {
        XSectionDef::Circular { diameter_ft } => XSection::Circular { diameter_ft },
        XSectionDef::Rectangular {
            width_ft,
            height_ft,
        } => XSection::Rectangular {
            width_ft,
            height_ft,
        },
        XSectionDef::Triangular {
            top_width_ft,
            height_ft,
        } => XSection::Triangular {
            top_width_ft,
            height_ft,
        },
    }
}
