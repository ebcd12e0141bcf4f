//! Snapshot integration tests

use pretty_assertions::assert_eq;
use studio_anim::{Animating, FieldValue, StateError};

use crate::common::{FOOTSTEPS, run_ticks, soldier};

#[test]
fn test_restored_entity_continues_in_lockstep() {
    let mut original = crate::common::entity_playing(FOOTSTEPS);
    original.set_pose_parameter_by_name("move_yaw", 30.0);
    original.set_skin(1);
    original.set_bodygroup(0, 1);
    run_ticks(&mut original, 0.15, 3);

    let snapshot = original.snapshot();
    let mut restored = Animating::new().with_model(soldier());
    restored.restore(&snapshot).unwrap();

    assert_eq!(restored.snapshot(), snapshot);
    assert!((restored.get_pose_parameter_by_name("move_yaw") - 30.0).abs() < 0.01);
    assert_eq!(restored.get_bodygroup(0), 1);

    let expected = run_ticks(&mut original, 0.15, 8);
    let actual = run_ticks(&mut restored, 0.15, 8);
    assert_eq!(actual, expected);
    assert_eq!(restored.cycle(), original.cycle());
}

#[test]
fn test_restore_rejects_out_of_range_sequence() {
    let mut snapshot = crate::common::entity_playing(FOOTSTEPS).snapshot();
    snapshot.set("sequence", FieldValue::Int(40)).unwrap();

    let mut entity = Animating::new().with_model(soldier());
    let err = entity.restore(&snapshot).unwrap_err();
    assert!(matches!(err, StateError::InvalidValue { field: "sequence", .. }));
    assert_eq!(entity.sequence(), None);
}

#[test]
fn test_restore_rejects_short_arrays() {
    let mut snapshot = crate::common::entity_playing(FOOTSTEPS).snapshot();
    snapshot.pose_parameters.truncate(4);

    let mut entity = Animating::new().with_model(soldier());
    assert_eq!(
        entity.restore(&snapshot),
        Err(StateError::ArrayLength {
            field: "pose_parameters",
            expected: 24,
            found: 4
        })
    );
}

#[cfg(feature = "serde-support")]
#[test]
fn test_snapshot_json() {
    let snapshot = crate::common::entity_playing(FOOTSTEPS).snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: studio_anim::AnimatingSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
}

#[test]
fn test_restore_rejects_cycles_outside_their_domain() {
    let mut entity = Animating::new().with_model(soldier());
    let valid = crate::common::entity_playing(FOOTSTEPS).snapshot();
    assert!(valid.loops);
    entity.restore(&valid).unwrap();

    for cycle in [3.5, 1.0, -0.25, f32::NAN] {
        let mut snapshot = valid.clone();
        snapshot.cycle = cycle;
        let err = entity.restore(&snapshot).unwrap_err();
        assert!(matches!(err, StateError::InvalidValue { field: "cycle", .. }));
    }

    let mut snapshot = valid.clone();
    snapshot.last_event_check = 2.0;
    let err = entity.restore(&snapshot).unwrap_err();
    assert!(matches!(err, StateError::InvalidValue { field: "last_event_check", .. }));

    // The rejected snapshots left the entity untouched
    assert_eq!(entity.snapshot(), valid);
    let mut fired = 0;
    let now = entity.state().anim_time;
    entity.dispatch_anim_events(now, &mut |_: &studio_anim::FiredEvent| fired += 1);
    assert_eq!(fired, 0);
}

#[test]
fn test_non_looping_restore_accepts_resting_cycle() {
    let mut snapshot = crate::common::entity_playing(crate::common::FIRE).snapshot();
    assert!(!snapshot.loops);
    snapshot.cycle = studio_anim::cycle::MAX_NON_LOOPING_CYCLE;
    snapshot.finished = true;
    snapshot.last_event_check = 1.01;

    let mut entity = Animating::new().with_model(soldier());
    entity.restore(&snapshot).unwrap();
    assert_eq!(entity.cycle(), studio_anim::cycle::MAX_NON_LOOPING_CYCLE);
}
