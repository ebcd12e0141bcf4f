//! Transform cache integration tests

use glam::Vec3;
use pretty_assertions::assert_eq;
use studio_anim::{CACHED_BONE_MASK, CacheStats, TickContext};

use crate::common::{HEAD, IDLE, WALK, entity_playing};

#[test]
fn test_repeated_queries_hit() {
    let mut entity = entity_playing(IDLE);
    let ctx = TickContext::new(0.1);

    entity.get_bone_transform(&ctx, HEAD);
    entity.get_attachment_by_name(&ctx, "muzzle");
    entity.hitboxes_front_side(&ctx, Vec3::Z, 0.0);

    let stats = entity.cached_bones().stats();
    assert_eq!(stats.misses, 1);
    assert!(stats.hits >= 3);
    assert_eq!(entity.cached_bones().key().unwrap().mask, CACHED_BONE_MASK);
}

#[test]
fn test_key_tracks_sequence_time_and_placement() {
    let mut entity = entity_playing(IDLE);
    let ctx = TickContext::new(0.1);
    entity.bone_transforms(&ctx);

    entity.set_origin(Vec3::new(1.0, 0.0, 0.0));
    entity.bone_transforms(&ctx);

    entity.set_angles(Vec3::new(0.0, 45.0, 0.0));
    entity.bone_transforms(&ctx);

    entity.studio_frame_advance(0.1);
    entity.bone_transforms(&ctx);

    entity.set_sequence(Some(WALK));
    entity.bone_transforms(&ctx);

    entity.bone_transforms(&ctx);
    assert_eq!(entity.cached_bones().stats(), CacheStats { hits: 1, misses: 5 });
}

#[test]
fn test_invalidation_forces_recompute() {
    let mut entity = entity_playing(IDLE);
    let ctx = TickContext::new(0.1);
    entity.bone_transforms(&ctx);

    entity.invalidate_bone_cache();
    assert!(entity.cached_bones().is_empty());
    entity.bone_transforms(&ctx);

    // Controllers are not part of the key, setting one invalidates
    entity.set_bone_controller(0, 30.0);
    entity.bone_transforms(&ctx);

    assert_eq!(entity.cached_bones().stats().misses, 3);
    assert_eq!(entity.cached_bones().stats().hits, 0);
}

#[test]
fn test_moving_the_entity_moves_cached_bones() {
    let mut entity = entity_playing(IDLE);
    let ctx = TickContext::new(0.1);
    let before = entity.get_bone_transform(&ctx, HEAD);

    entity.set_origin(Vec3::new(0.0, 0.0, 10.0));
    let after = entity.get_bone_transform(&ctx, HEAD);
    assert!((after.translation.z - before.translation.z - 10.0).abs() < 0.001);

    let cache = entity.bone_cache(&ctx);
    assert!(cache.get(HEAD).is_some());
}
