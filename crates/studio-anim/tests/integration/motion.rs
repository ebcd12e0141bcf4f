//! Root-motion integration tests

use glam::Vec3;
use studio_anim::cycle::MAX_NON_LOOPING_CYCLE;

use crate::common::{FIRE, IDLE, MOVE, WALK, assert_vec3_near, entity_playing};

#[test]
fn test_walking_covers_its_linear_motion() {
    let mut entity = entity_playing(WALK);
    entity.set_angles(Vec3::new(0.0, 90.0, 0.0));

    for i in 1..=5 {
        let movement = entity.interval_movement(0.2);
        assert!(movement.moved);
        entity.set_origin(movement.position);
        entity.set_angles(movement.angles);
        entity.studio_frame_advance(i as f32 * 0.2);
    }
    assert_vec3_near(entity.origin(), Vec3::new(0.0, 40.0, 0.0));
    assert_vec3_near(entity.velocity(), Vec3::new(0.0, 40.0, 0.0));
}

#[test]
fn test_non_looping_interval_is_clamped_to_end() {
    let mut entity = entity_playing(FIRE);
    entity.set_cycle(0.9);

    let movement = entity.interval_movement(0.5);
    assert!(movement.finished);
    assert_eq!(movement.end_cycle, 1.0);
    assert!((movement.interval_used - 0.1).abs() < 1e-4);
    assert!(!movement.moved);

    entity.set_cycle(2.0);
    assert_eq!(entity.cycle(), MAX_NON_LOOPING_CYCLE);
}

#[test]
fn test_blended_ground_speed() {
    let mut entity = entity_playing(MOVE);
    assert!((entity.sequence_ground_speed(Some(MOVE)) - 40.0).abs() < 0.01);

    entity.set_pose_parameter_by_name("speed", 0.5);
    assert!((entity.sequence_ground_speed(Some(MOVE)) - 70.0).abs() < 0.01);
    assert!((entity.sequence_move_dist(MOVE) - 70.0).abs() < 0.01);
    assert!((entity.movement_frame(35.0) - 0.6125).abs() < 0.001);

    entity.studio_frame_advance(0.1);
    assert!((entity.ground_speed() - 70.0).abs() < 0.01);
    assert!((entity.instantaneous_velocity(0.1) - 70.0).abs() < 0.01);
}

#[test]
fn test_ground_speed_velocity_follows_entity_yaw() {
    let mut entity = entity_playing(WALK);
    entity.set_angles(Vec3::new(0.0, -90.0, 0.0));
    entity.studio_frame_advance(0.1);
    assert_vec3_near(entity.ground_speed_velocity(), Vec3::new(0.0, -40.0, 0.0));
    assert!((entity.sequence_move_yaw(WALK)).abs() < 0.001);
}

#[test]
fn test_stationary_sequences() {
    let entity = entity_playing(IDLE);
    assert!(!entity.has_movement(IDLE));
    assert!(entity.has_movement(WALK));
    assert_eq!(entity.ground_speed_velocity(), Vec3::ZERO);
    assert_eq!(entity.instantaneous_velocity(0.1), 0.0);
}
