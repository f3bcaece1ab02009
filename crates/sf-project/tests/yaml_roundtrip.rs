//! End-to-end project file handling through the filesystem.

use sf_project::{ProjectDef, ProjectError, load_yaml, save_yaml};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("sf-project-test-{}-{}", std::process::id(), name));
    path
}

const FULL_PROJECT: &str = "
version: 1
title: two branch network
options:
  flow_units: cfs
  start_date: 2024-06-01 00:00:00
  duration_hours: 6.0
  report_step_s: 300.0
  routing_step_s: 30.0
  routing_method: DynamicWave
  allow_ponding: true
raingages:
  - id: G1
    series:
      - { offset_min: 0.0, intensity_in_hr: 0.8 }
      - { offset_min: 120.0, intensity_in_hr: 0.0 }
catchments:
  - id: S1
    outlet: J1
    raingage: G1
    area_ac: 12.0
    runoff_coeff: 0.45
nodes:
  - id: J1
    kind: { type: Junction }
    invert_elev_ft: 20.0
    max_depth_ft: 10.0
  - id: ST1
    kind:
      type: Storage
      curve:
        - { depth_ft: 0.0, area_ft2: 100.0 }
        - { depth_ft: 8.0, area_ft2: 400.0 }
    invert_elev_ft: 12.0
    max_depth_ft: 8.0
  - id: O1
    kind: { type: Outfall }
    invert_elev_ft: 2.0
    max_depth_ft: 4.0
links:
  - id: C1
    kind:
      type: Conduit
      xsect: { shape: Circular, diameter_ft: 2.0 }
      length_ft: 350.0
    from: J1
    to: ST1
    capacity_cfs: 25.0
  - id: W1
    kind:
      type: Weir
      xsect: { shape: Rectangular, width_ft: 4.0, height_ft: 1.5 }
    from: ST1
    to: O1
";

#[test]
fn full_project_round_trips_through_disk() {
    let path = temp_path("roundtrip.yml");
    let project: ProjectDef = serde_yaml::from_str(FULL_PROJECT).unwrap();
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(project, loaded);
    std::fs::remove_file(&path).ok();
}

#[test]
fn load_rejects_malformed_yaml() {
    let path = temp_path("malformed.yml");
    std::fs::write(&path, "version: [not a number\n").unwrap();
    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(err, ProjectError::Yaml(_)));
    std::fs::remove_file(&path).ok();
}

#[test]
fn load_rejects_invalid_project() {
    let path = temp_path("invalid.yml");
    std::fs::write(
        &path,
        "version: 1\ntitle: bad\nlinks:\n  - id: L1\n    kind: { type: Pump }\n    from: A\n    to: B\n",
    )
    .unwrap();
    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(err, ProjectError::Validation(_)));
    std::fs::remove_file(&path).ok();
}

#[test]
fn load_missing_file_is_io_error() {
    let err = load_yaml(&temp_path("does-not-exist.yml")).unwrap_err();
    assert!(matches!(err, ProjectError::Io(_)));
}
