//! Project validation logic.

use crate::schema::{
    CatchmentDef, LinkDef, LinkKindDef, NodeKindDef, OptionsDef, ProjectDef, RainGageDef,
    XSectionDef,
};
use sf_core::SimCalendar;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &ProjectDef) -> Result<(), ValidationError> {
    if project.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_options(&project.options)?;

    let mut gage_ids = HashSet::new();
    for gage in &project.raingages {
        if !gage_ids.insert(&gage.id) {
            return Err(ValidationError::DuplicateId {
                id: gage.id.clone(),
                context: "raingages".to_string(),
            });
        }
        validate_gage(gage)?;
    }

    let mut node_ids = HashSet::new();
    for node in &project.nodes {
        if !node_ids.insert(&node.id) {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: "nodes".to_string(),
            });
        }
        validate_node(node)?;
    }

    let mut link_ids = HashSet::new();
    for link in &project.links {
        if !link_ids.insert(&link.id) {
            return Err(ValidationError::DuplicateId {
                id: link.id.clone(),
                context: "links".to_string(),
            });
        }
        validate_link(link, &node_ids)?;
    }

    let mut catchment_ids = HashSet::new();
    for catchment in &project.catchments {
        if !catchment_ids.insert(&catchment.id) {
            return Err(ValidationError::DuplicateId {
                id: catchment.id.clone(),
                context: "catchments".to_string(),
            });
        }
        validate_catchment(catchment, &node_ids, &gage_ids)?;
    }

    Ok(())
}

fn validate_options(options: &OptionsDef) -> Result<(), ValidationError> {
    if SimCalendar::parse(&options.start_date).is_err() {
        return Err(ValidationError::InvalidValue {
            field: "options.start_date".to_string(),
            value: options.start_date.clone(),
            reason: "expected YYYY-MM-DD HH:MM:SS".to_string(),
        });
    }
    let positive = [
        ("options.duration_hours", options.duration_hours),
        ("options.report_step_s", options.report_step_s),
        ("options.wet_step_s", options.wet_step_s),
        ("options.dry_step_s", options.dry_step_s),
        ("options.routing_step_s", options.routing_step_s),
    ];
    for (field, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
    }
    if options.evap_rate_in_day < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "options.evap_rate_in_day".to_string(),
            value: options.evap_rate_in_day.to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_gage(gage: &RainGageDef) -> Result<(), ValidationError> {
    for pair in gage.series.windows(2) {
        if pair[1].offset_min <= pair[0].offset_min {
            return Err(ValidationError::InvalidValue {
                field: format!("raingage '{}' series", gage.id),
                value: pair[1].offset_min.to_string(),
                reason: "offsets must increase".to_string(),
            });
        }
    }
    for point in &gage.series {
        if point.intensity_in_hr < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("raingage '{}' series", gage.id),
                value: point.intensity_in_hr.to_string(),
                reason: "intensity must be non-negative".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_node(node: &crate::schema::NodeDef) -> Result<(), ValidationError> {
    if node.max_depth_ft < 0.0 || node.init_depth_ft < 0.0 || node.ponded_area_ft2 < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("node '{}'", node.id),
            value: "negative depth or area".to_string(),
            reason: "geometry must be non-negative".to_string(),
        });
    }
    if let NodeKindDef::Storage { area_ft2, curve } = &node.kind {
        if let Some(a) = area_ft2 {
            if *a <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("node '{}' area_ft2", node.id),
                    value: a.to_string(),
                    reason: "storage area must be positive".to_string(),
                });
            }
        }
        for pair in curve.windows(2) {
            if pair[1].depth_ft <= pair[0].depth_ft {
                return Err(ValidationError::InvalidValue {
                    field: format!("node '{}' curve", node.id),
                    value: pair[1].depth_ft.to_string(),
                    reason: "curve depths must increase".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_link(link: &LinkDef, node_ids: &HashSet<&String>) -> Result<(), ValidationError> {
    for (field, id) in [("from", &link.from), ("to", &link.to)] {
        if !node_ids.contains(id) {
            return Err(ValidationError::MissingReference {
                id: id.clone(),
                context: format!("link '{}' {field}", link.id),
            });
        }
    }
    if let Some(capacity) = link.capacity_cfs {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("link '{}' capacity_cfs", link.id),
                value: capacity.to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
    }
    match &link.kind {
        LinkKindDef::Conduit { xsect, length_ft } => {
            if *length_ft < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("link '{}' length_ft", link.id),
                    value: length_ft.to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
            validate_xsect(&link.id, xsect)
        }
        LinkKindDef::Orifice { xsect } | LinkKindDef::Weir { xsect } => {
            validate_xsect(&link.id, xsect)
        }
        LinkKindDef::Pump | LinkKindDef::Outlet => Ok(()),
    }
}

fn validate_xsect(link_id: &str, xsect: &XSectionDef) -> Result<(), ValidationError> {
    let dims: &[f64] = match xsect {
        XSectionDef::Circular { diameter_ft } => &[*diameter_ft],
        XSectionDef::Rectangular { width_ft, height_ft } => &[*width_ft, *height_ft],
        XSectionDef::Triangular { top_width_ft, height_ft } => &[*top_width_ft, *height_ft],
    };
    if dims.iter().any(|&d| !d.is_finite() || d <= 0.0) {
        return Err(ValidationError::InvalidValue {
            field: format!("link '{link_id}' xsect"),
            value: format!("{xsect:?}"),
            reason: "dimensions must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_catchment(
    catchment: &CatchmentDef,
    node_ids: &HashSet<&String>,
    gage_ids: &HashSet<&String>,
) -> Result<(), ValidationError> {
    if !node_ids.contains(&catchment.outlet) {
        return Err(ValidationError::MissingReference {
            id: catchment.outlet.clone(),
            context: format!("catchment '{}' outlet", catchment.id),
        });
    }
    if !gage_ids.contains(&catchment.raingage) {
        return Err(ValidationError::MissingReference {
            id: catchment.raingage.clone(),
            context: format!("catchment '{}' raingage", catchment.id),
        });
    }
    if !catchment.area_ac.is_finite() || catchment.area_ac <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("catchment '{}' area_ac", catchment.id),
            value: catchment.area_ac.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&catchment.runoff_coeff) {
        return Err(ValidationError::InvalidValue {
            field: format!("catchment '{}' runoff_coeff", catchment.id),
            value: catchment.runoff_coeff.to_string(),
            reason: "must be in [0, 1]".to_string(),
        });
    }
    Ok(())
}
