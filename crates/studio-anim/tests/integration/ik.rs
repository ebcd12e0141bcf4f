//! IK context integration tests

use glam::Vec3;
use studio_anim::{
    AnimatingOptions, GroundPlaneTracer, IkMissPolicy, IkState, TickContext,
};
use studio_model::BoneFlags;

use crate::common::{FOOT, IDLE, assert_vec3_near, entity_playing, entity_with_options};

const CALF: usize = 5;

#[test]
fn test_foot_locks_to_ground() {
    let mut entity = entity_playing(IDLE);
    entity.enable_ik();
    assert!(entity.set_ik_target(0, Vec3::ZERO, 10.0, 2.0, 0.5));

    let floor = GroundPlaneTracer::new(5.0);
    let ctx = TickContext::new(0.5).with_tracer(&floor);
    let bones = entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING);

    let foot = Vec3::from(bones[FOOT].unwrap().translation);
    assert_vec3_near(foot, Vec3::new(0.0, 0.0, 5.0));
    let knee = Vec3::from(bones[CALF].unwrap().translation);
    assert!(knee.x > 1.0, "knee should bend forward, got {knee:?}");

    let ik = entity.ik().unwrap();
    assert_vec3_near(ik.target(0).unwrap().position, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(ik.state(), IkState::Solved { time: 0.5 });
}

#[test]
fn test_moved_entity_solves_in_world_space() {
    let mut entity = entity_playing(IDLE);
    entity.set_origin(Vec3::new(10.0, 0.0, 0.0));
    entity.set_angles(Vec3::new(0.0, 90.0, 0.0));
    entity.enable_ik();
    entity.set_ik_target(0, Vec3::new(10.0, 0.0, 0.0), 10.0, 2.0, 1.0);

    let floor = GroundPlaneTracer::new(5.0);
    let ctx = TickContext::new(1.0).with_tracer(&floor);
    let bones = entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING);
    assert_vec3_near(
        Vec3::from(bones[FOOT].unwrap().translation),
        Vec3::new(10.0, 0.0, 5.0),
    );
}

#[test]
fn test_stale_target_leaves_chain_alone() {
    let mut entity = entity_playing(IDLE);
    entity.enable_ik();
    entity.set_ik_target(0, Vec3::ZERO, 10.0, 2.0, 0.4);

    let floor = GroundPlaneTracer::new(5.0);
    let ctx = TickContext::new(0.5).with_tracer(&floor);
    let bones = entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING);

    assert_vec3_near(Vec3::from(bones[FOOT].unwrap().translation), Vec3::ZERO);
    assert_eq!(entity.ik().unwrap().target(0).unwrap().position, Vec3::ZERO);
}

#[test]
fn test_miss_policies() {
    let desired = Vec3::new(0.0, 3.0, 0.0);
    let pit = GroundPlaneTracer::new(-50.0);

    let mut keep = entity_playing(IDLE);
    keep.enable_ik();
    keep.set_ik_target(0, desired, 10.0, 2.0, 0.5);
    keep.setup_bones(&TickContext::new(0.5).with_tracer(&pit), BoneFlags::USED_BY_ANYTHING);
    assert_eq!(keep.ik().unwrap().target(0).unwrap().position, desired);

    let options = AnimatingOptions::default().with_ik_miss_policy(IkMissPolicy::UseTraceEnd);
    let mut snap = entity_with_options(IDLE, options);
    snap.enable_ik();
    assert_eq!(snap.ik().unwrap().miss_policy(), IkMissPolicy::UseTraceEnd);
    snap.set_ik_target(0, desired, 10.0, 2.0, 0.5);
    snap.setup_bones(&TickContext::new(0.5).with_tracer(&pit), BoneFlags::USED_BY_ANYTHING);
    assert_vec3_near(
        snap.ik().unwrap().target(0).unwrap().position,
        Vec3::new(0.0, 3.0, -10.0),
    );
}

#[test]
fn test_targets_require_ik_and_a_chain() {
    let mut entity = entity_playing(IDLE);
    assert!(!entity.set_ik_target(0, Vec3::ZERO, 10.0, 2.0, 0.0));

    entity.enable_ik();
    assert!(!entity.set_ik_target(3, Vec3::ZERO, 10.0, 2.0, 0.0));
    assert!(entity.set_ik_target(0, Vec3::ZERO, 10.0, 2.0, 0.0));
    assert_eq!(entity.ik().unwrap().targets().len(), 1);

    entity.disable_ik();
    assert!(!entity.is_ik_enabled());
    assert!(entity.ik().is_none());
}

#[test]
fn test_editing_ik_directly_invalidates_cached_bones() {
    let mut entity = entity_playing(IDLE);
    entity.enable_ik();
    let floor = GroundPlaneTracer::new(5.0);
    let ctx = TickContext::new(0.5).with_tracer(&floor);

    entity.bone_transforms(&ctx);
    assert!(!entity.cached_bones().is_empty());

    entity
        .ik_mut()
        .unwrap()
        .set_target(0, Vec3::ZERO, 10.0, 2.0, 0.5);
    assert!(entity.cached_bones().is_empty());

    entity.bone_transforms(&ctx);
    assert_eq!(entity.cached_bones().stats().misses, 2);
    assert_eq!(entity.ik().unwrap().targets().len(), 1);
}
