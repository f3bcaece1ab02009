//! Non-fatal project advisories, fed into the session warning register.

use crate::schema::{NodeKindDef, ProjectDef};
use std::collections::HashSet;

pub fn project_warnings(project: &ProjectDef) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut linked: HashSet<&String> = HashSet::new();
    for link in &project.links {
        linked.insert(&link.from);
        linked.insert(&link.to);
    }
    for node in &project.nodes {
        if !linked.contains(&node.id) && !matches!(node.kind, NodeKindDef::Outfall) {
            warnings.push(format!("node '{}' is not connected to any link", node.id));
        }
    }

    for catchment in &project.catchments {
        if catchment.runoff_coeff == 0.0 {
            warnings.push(format!("catchment '{}' produces no runoff", catchment.id));
        }
    }

    let duration_s = project.options.duration_hours * 3_600.0;
    let remainder = duration_s % project.options.report_step_s;
    if remainder > 1e-9 && (project.options.report_step_s - remainder) > 1e-9 {
        warnings.push(
            "duration is not a whole number of report steps; the final period is partial"
                .to_string(),
        );
    }

    if project.options.ignore_routing && !project.links.is_empty() {
        warnings.push("links are present but flow routing is ignored".to_string());
    }

    warnings
}
