//! Coupling surface: external inflow accumulation and consumption,
//! geometry updates, and index bounds.

mod common;

use common::{FixedStepRouting, two_node_project};
use proptest::prelude::*;
use sf_engine::{EngineError, SessionBuilder};
use sf_project::{NodeKindDef, StoragePointDef};

#[test]
fn indexes_are_bounds_checked_at_both_ends() {
    let mut session = SessionBuilder::from_project(two_node_project("bounds"))
        .open()
        .unwrap();
    // Highest valid index works...
    assert!(session.node_state(1).is_ok());
    assert!(session.link_state(0).is_ok());
    // ...one past it is an Index error, and nothing latches.
    assert_eq!(
        session.node_state(2).unwrap_err(),
        EngineError::Index {
            what: "node",
            index: 2,
            len: 2
        }
    );
    assert_eq!(
        session.link_state(1).unwrap_err(),
        EngineError::Index {
            what: "link",
            index: 1,
            len: 1
        }
    );
    assert!(session.set_node_ponded_area(5, 1.0).is_err());
    assert_eq!(session.error_code(), 0);
    session.close();
}

#[test]
fn bulk_readers_cover_every_node() {
    let mut session = SessionBuilder::from_project(two_node_project("bulk"))
        .open()
        .unwrap();
    session.start(false).unwrap();
    assert_eq!(session.nodes_inflow().len(), 2);
    assert_eq!(session.nodes_outflow().len(), 2);
    let heads = session.nodes_head();
    assert_eq!(heads.len(), 2);
    // Dry junction: head equals the invert.
    assert!((heads[0] - 20.0).abs() < 1e-12);
    session.end().unwrap();
    session.close();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Inflows added between steps accumulate additively, and the next
    /// routing advance consumes the full total, leaving zero pending.
    #[test]
    fn inflow_accumulates_then_one_advance_consumes_it(
        q1 in 0.0f64..50.0,
        q2 in 0.0f64..50.0,
        q3 in 0.0f64..50.0,
    ) {
        let (routing, drained) = FixedStepRouting::new(300.0);
        let mut session = SessionBuilder::from_project(two_node_project("inflow"))
            .routing_engine(Box::new(routing))
            .open()
            .unwrap();
        session.start(false).unwrap();

        session.add_node_inflow(0, q1).unwrap();
        session.add_node_inflow(0, q2).unwrap();
        session.add_node_inflow(1, q3).unwrap();
        session.step().unwrap();

        {
            let drained = drained.lock().unwrap();
            prop_assert_eq!(drained.len(), 1);
            prop_assert!((drained[0] - (q1 + q2 + q3)).abs() < 1e-9);
        }

        // Nothing left pending: the next advance drains zero.
        session.step().unwrap();
        {
            let drained = drained.lock().unwrap();
            prop_assert_eq!(drained.len(), 2);
            prop_assert_eq!(drained[1], 0.0);
        }
        session.end().unwrap();
        session.close();
    }

    /// Updating full depth recomputes full volume through the node's
    /// geometry in the same call.
    #[test]
    fn full_depth_update_tracks_prismatic_geometry(
        area_ft2 in 50.0f64..2_000.0,
        depth_ft in 0.1f64..50.0,
    ) {
        let mut def = two_node_project("geometry");
        def.nodes[0].kind = NodeKindDef::Storage {
            area_ft2: Some(area_ft2),
            curve: Vec::new(),
        };
        let mut session = SessionBuilder::from_project(def).open().unwrap();
        session.set_node_full_depth(0, depth_ft).unwrap();
        let state = session.node_state(0).unwrap();
        prop_assert!((state.full_volume_ft3 - area_ft2 * depth_ft).abs() < 1e-6);
        session.close();
    }

    /// Tabulated storage: volume from the curve stays monotone in the
    /// assigned full depth.
    #[test]
    fn full_depth_update_tracks_tabulated_geometry(
        depth_a in 0.5f64..4.0,
        extra in 0.5f64..4.0,
    ) {
        let mut def = two_node_project("curve geometry");
        def.nodes[0].kind = NodeKindDef::Storage {
            area_ft2: None,
            curve: vec![
                StoragePointDef { depth_ft: 0.0, area_ft2: 100.0 },
                StoragePointDef { depth_ft: 8.0, area_ft2: 500.0 },
            ],
        };
        let mut session = SessionBuilder::from_project(def).open().unwrap();
        session.set_node_full_depth(0, depth_a).unwrap();
        let small = session.node_state(0).unwrap().full_volume_ft3;
        session.set_node_full_depth(0, depth_a + extra).unwrap();
        let large = session.node_state(0).unwrap().full_volume_ft3;
        prop_assert!(large > small);
        session.close();
    }
}
