//! Step coordination: snapshot cadence, the single-increment report
//! schedule, and the end-of-run clamp.

mod common;

use common::{FixedStepRouting, two_node_project};
use proptest::prelude::*;
use sf_engine::SessionBuilder;
use sf_project::ProjectDef;

#[test]
fn hourly_cadence_saves_twenty_four_snapshots() {
    // 24 h run, hourly report step, routing disabled; the wet step
    // paces the clock at one hour per call.
    let mut def = two_node_project("24 snapshots");
    def.options.duration_hours = 24.0;
    def.options.report_step_s = 3_600.0;
    def.options.wet_step_s = 3_600.0;
    def.options.ignore_routing = true;

    let mut session = SessionBuilder::from_project(def).open().unwrap();
    session.start(true).unwrap();
    let mut steps = 0;
    loop {
        let elapsed = session.step().unwrap();
        steps += 1;
        if elapsed == 0.0 {
            break;
        }
        assert!(steps < 1_000, "runaway step loop");
    }
    assert_eq!(steps, 24);
    assert_eq!(session.reported_periods(), 24);
    session.end().unwrap();
    session.close();
}

#[test]
fn report_schedule_advances_one_increment_per_step() {
    // A 3600 s routing step jumping over four 900 s report instants
    // still moves the schedule by a single increment per call: a 2 h
    // run yields 2 saved periods, not 8.
    let mut def = two_node_project("coarse stepping");
    def.options.duration_hours = 2.0;
    def.options.report_step_s = 900.0;
    def.options.routing_step_s = 3_600.0;

    let (routing, _) = FixedStepRouting::new(3_600.0);
    let mut session = SessionBuilder::from_project(def)
        .routing_engine(Box::new(routing))
        .open()
        .unwrap();
    session.start(true).unwrap();
    while session.step().unwrap() > 0.0 {}
    assert_eq!(session.step_count(), 2);
    assert_eq!(session.reported_periods(), 2);
    session.end().unwrap();
    session.close();
}

#[test]
fn negative_candidate_step_latches_a_timestep_error() {
    let def = two_node_project("bad step");
    let (routing, _) = FixedStepRouting::new(-5.0);
    let mut session = SessionBuilder::from_project(def)
        .routing_engine(Box::new(routing))
        .open()
        .unwrap();
    session.start(false).unwrap();
    let err = session.step().unwrap_err();
    assert_eq!(err.code(), 103);
    assert_eq!(session.close(), 103);
}

fn clock_project(duration_hours: f64, wet_step_s: f64) -> ProjectDef {
    let mut def = ProjectDef::new("clamp property");
    def.options.duration_hours = duration_hours;
    def.options.wet_step_s = wet_step_s;
    def.options.report_step_s = 1.0e9;
    def
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The final applied step lands the clock exactly on the total
    /// duration and never beyond it.
    #[test]
    fn clamp_lands_exactly_on_the_duration(
        duration_hours in 0.01f64..1.0,
        wet_step_s in 1.0f64..500.0,
    ) {
        let def = clock_project(duration_hours, wet_step_s);
        let total_duration_ms = duration_hours * 3_600_000.0;
        let mut session = SessionBuilder::from_project(def).open().unwrap();
        session.start(false).unwrap();
        let mut guard = 0;
        loop {
            let elapsed = session.step().unwrap();
            prop_assert!(elapsed * 86_400_000.0 <= total_duration_ms + 1e-6);
            if elapsed == 0.0 {
                break;
            }
            guard += 1;
            prop_assert!(guard < 10_000, "runaway step loop");
        }
        // The clamp assigns the target outright, so the final clock
        // equals the duration with no accumulation error (the day
        // conversion in the getter costs at most an ulp).
        let final_ms = session.elapsed_days() * 86_400_000.0;
        prop_assert!((final_ms - total_duration_ms).abs() < 1e-3);
        session.end().unwrap();
        session.close();
    }
}
