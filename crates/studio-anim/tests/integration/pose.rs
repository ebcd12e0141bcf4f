//! Pose solver integration tests

use glam::Vec3;
use studio_anim::{AnimatingOptions, AutoplayPolicy, TickContext};
use studio_model::BoneFlags;

use crate::common::{
    HAND, HEAD, IDLE, SPINE, THIGH, assert_vec3_near, entity_playing, entity_with_options,
};

fn position(transform: Option<glam::Affine3A>) -> Vec3 {
    Vec3::from(transform.unwrap().translation)
}

#[test]
fn test_bind_pose_world_positions() {
    let mut entity = entity_playing(IDLE);
    let ctx = TickContext::new(0.1);
    let bones = entity.bone_transforms(&ctx).to_vec();
    assert_vec3_near(position(bones[HEAD]), Vec3::new(0.0, 0.0, 66.0));
    assert_vec3_near(position(bones[HAND]), Vec3::new(0.0, -10.0, 51.0));
}

#[test]
fn test_cached_bones_exclude_unreferenced_bones() {
    let mut entity = entity_playing(IDLE);
    entity.set_origin(Vec3::new(3.0, 0.0, 0.0));
    let ctx = TickContext::new(0.1);

    let cached = entity.bone_transforms(&ctx).to_vec();
    assert!(cached[THIGH].is_none());
    assert!(cached[SPINE].is_some());

    let full = entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING);
    assert_vec3_near(position(full[THIGH]), Vec3::new(3.0, 0.0, 36.0));

    // Uncached bones report the entity transform
    let thigh = entity.get_bone_transform(&ctx, THIGH);
    assert_vec3_near(Vec3::from(thigh.translation), Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn test_autoplay_layers_only_with_ik() {
    let ctx = TickContext::new(0.1).with_realtime(0.35);

    let mut entity = entity_playing(IDLE);
    let plain = entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING);
    assert_vec3_near(position(plain[HEAD]), Vec3::new(0.0, 0.0, 66.0));

    entity.enable_ik();
    let layered = entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING);
    assert_vec3_near(position(layered[HEAD]), Vec3::new(0.0, 0.0, 67.0));
}

#[test]
fn test_autoplay_always() {
    let options = AnimatingOptions::default().with_autoplay(AutoplayPolicy::Always);
    let mut entity = entity_with_options(IDLE, options);
    let ctx = TickContext::new(0.1);
    let bones = entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING);
    assert_vec3_near(position(bones[HEAD]), Vec3::new(0.0, 0.0, 67.0));
}

#[test]
fn test_bone_controller_turns_spine() {
    let mut entity = entity_playing(IDLE);
    let stored = entity.set_bone_controller(0, 90.0);
    assert!((stored - 45.0).abs() < 0.01);
    assert!((entity.get_bone_controller(0) - 45.0).abs() < 0.01);

    let ctx = TickContext::new(0.1);
    let hand = entity.get_bone_transform(&ctx, HAND);
    let offset = 10.0 * std::f32::consts::FRAC_1_SQRT_2;
    assert_vec3_near(Vec3::from(hand.translation), Vec3::new(offset, -offset, 51.0));
}

#[test]
fn test_entity_placement_and_scale() {
    let mut entity = entity_playing(IDLE);
    entity.set_origin(Vec3::new(100.0, 50.0, 0.0));
    entity.set_angles(Vec3::new(0.0, 180.0, 0.0));
    entity.set_model_scale(2.0);

    let ctx = TickContext::new(0.1);
    let hand = entity.get_bone_transform(&ctx, HAND);
    assert_vec3_near(Vec3::from(hand.translation), Vec3::new(100.0, 70.0, 102.0));
    assert_vec3_near(entity.eye_position(), Vec3::new(100.0, 50.0, 128.0));
}

#[test]
fn test_invalid_sequence_holds_bind_pose() {
    let mut entity = entity_playing(IDLE);
    entity.state_mut().sequence = Some(99);
    let ctx = TickContext::new(0.1);
    let head = entity.get_bone_transform(&ctx, HEAD);
    assert_vec3_near(Vec3::from(head.translation), Vec3::new(0.0, 0.0, 66.0));
}
