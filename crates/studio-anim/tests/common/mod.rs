//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use glam::Vec3;
use studio_anim::{Animating, AnimatingOptions, FiredEvent};
use studio_model::{
    AnimEvent, AnimationDesc, AttachmentDesc, BodyPartDesc, BoneControllerDesc, BoneDesc,
    BoneTrack, ControllerKind, HitboxDesc, HitboxSet, IkChainDesc, ModelBuilder, MovementSegment,
    PoseParamDesc, SequenceDesc, SequenceFlags, StudioModel,
};

pub const IDLE: usize = 0;
pub const WALK: usize = 1;
pub const FIRE: usize = 2;
pub const MOVE: usize = 3;
pub const BREATHE: usize = 4;
pub const FOOTSTEPS: usize = 5;
/// 0.1 second loop carrying the step events, shorter than one max interval
pub const FLUTTER: usize = 6;

pub const SPINE: usize = 1;
pub const HEAD: usize = 2;
pub const HAND: usize = 3;
pub const THIGH: usize = 4;
pub const FOOT: usize = 6;

/// Event numbers baked into the footsteps sequence at cycles 0.1, 0.5 and 0.9
pub const STEP_EVENTS: [(f32, i32); 3] = [(0.1, 100), (0.5, 200), (0.9, 300)];

/// A small humanoid: torso with a hand, one IK leg, 1 second clips at 10 fps.
///
/// Bones: pelvis (z 36) > spine > head, spine > hand, pelvis > thigh > calf > foot.
/// The foot rests at z 0 in the bind pose.
pub fn soldier_model() -> StudioModel {
    let mut footsteps = SequenceDesc::new("footsteps", 0).with_flags(SequenceFlags::LOOPING);
    for (cycle, event) in STEP_EVENTS {
        footsteps = footsteps.with_event(AnimEvent::new(cycle, event));
    }
    let mut flutter = SequenceDesc::new("flutter", 5).with_flags(SequenceFlags::LOOPING);
    for (cycle, event) in STEP_EVENTS {
        flutter = flutter.with_event(AnimEvent::new(cycle, event));
    }

    ModelBuilder::new("soldier")
        .with_eye_position(Vec3::new(0.0, 0.0, 64.0))
        .with_hull(Vec3::new(-16.0, -16.0, 0.0), Vec3::new(16.0, 16.0, 72.0))
        .add_bone(BoneDesc::new("pelvis", None, Vec3::new(0.0, 0.0, 36.0)))
        .add_bone(BoneDesc::new("spine", Some(0), Vec3::new(0.0, 0.0, 10.0)))
        .add_bone(BoneDesc::new("head", Some(1), Vec3::new(0.0, 0.0, 20.0)))
        .add_bone(BoneDesc::new("hand", Some(1), Vec3::new(0.0, -10.0, 5.0)))
        .add_bone(BoneDesc::new("thigh", Some(0), Vec3::ZERO))
        .add_bone(BoneDesc::new("calf", Some(4), Vec3::new(0.0, 0.0, -18.0)))
        .add_bone(BoneDesc::new("foot", Some(5), Vec3::new(0.0, 0.0, -18.0)))
        .add_controller(BoneControllerDesc {
            bone: SPINE,
            kind: ControllerKind::RotateZ,
            start: -45.0,
            end: 45.0,
            index: 0,
        })
        .add_pose_param(PoseParamDesc::new("move_yaw", -180.0, 180.0).with_looping(360.0))
        .add_pose_param(PoseParamDesc::new("speed", 0.0, 1.0))
        .add_animation(AnimationDesc::new("idle", 10.0, 11))
        .add_animation(
            AnimationDesc::new("walk", 10.0, 11)
                .with_movement(MovementSegment::linear(10.0, 40.0, Vec3::X)),
        )
        .add_animation(
            AnimationDesc::new("run", 10.0, 11)
                .with_movement(MovementSegment::linear(10.0, 100.0, Vec3::X)),
        )
        .add_animation(AnimationDesc::new("fire", 10.0, 11))
        .add_animation(AnimationDesc::new("breathe", 10.0, 11).with_track(
            SPINE,
            BoneTrack {
                positions: vec![Vec3::new(0.0, 0.0, 1.0)],
                rotations: Vec::new(),
            },
        ))
        .add_animation(AnimationDesc::new("flutter", 10.0, 2))
        .add_sequence(
            SequenceDesc::new("idle", 0)
                .with_flags(SequenceFlags::LOOPING)
                .with_activity("ACT_IDLE", 1),
        )
        .add_sequence(
            SequenceDesc::new("walk", 1)
                .with_flags(SequenceFlags::LOOPING)
                .with_activity("ACT_WALK", 1),
        )
        .add_sequence(
            SequenceDesc::new("fire", 3)
                .with_activity("ACT_RANGE_ATTACK", 1)
                .with_fade_out(0.0)
                .with_event(AnimEvent::new(0.5, 10).with_options("muzzle"))
                .with_event(AnimEvent::new(0.5, 6000))
                .with_event(AnimEvent::new(0.9995, 20)),
        )
        .add_sequence(
            SequenceDesc::new("move", 1)
                .with_flags(SequenceFlags::LOOPING)
                .with_blend(1, 0.0, 1.0, vec![1, 2]),
        )
        .add_sequence(
            SequenceDesc::new("breathe", 4)
                .with_flags(SequenceFlags::LOOPING | SequenceFlags::AUTOPLAY | SequenceFlags::DELTA),
        )
        .add_sequence(footsteps)
        .add_sequence(flutter)
        .add_attachment(AttachmentDesc::new("muzzle", HAND, Vec3::new(5.0, 0.0, 0.0)))
        .add_hitbox_set(HitboxSet::new(
            "default",
            vec![
                HitboxDesc::new(HEAD, 1, Vec3::splat(-4.0), Vec3::splat(4.0)).with_name("head"),
                HitboxDesc::new(HAND, 4, Vec3::splat(-2.0), Vec3::splat(2.0)).with_name("hand"),
            ],
        ))
        .add_body_part(BodyPartDesc::new("helmet", 1, 2))
        .add_ik_chain(IkChainDesc::new("leg", [THIGH, 5, FOOT], Vec3::X))
        .build()
        .unwrap()
}

pub fn soldier() -> Arc<StudioModel> {
    Arc::new(soldier_model())
}

/// An entity playing `sequence` from the start
pub fn entity_playing(sequence: usize) -> Animating {
    entity_with_options(sequence, AnimatingOptions::default())
}

pub fn entity_with_options(sequence: usize, options: AnimatingOptions) -> Animating {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut entity = Animating::new().with_options(options).with_model(soldier());
    entity.reset_sequence(sequence);
    entity
}

/// Advance and dispatch at `ticks` evenly spaced times, collecting every event
pub fn run_ticks(entity: &mut Animating, tick: f32, ticks: usize) -> Vec<FiredEvent> {
    let mut fired = Vec::new();
    let start = entity.state().anim_time;
    for i in 1..=ticks {
        let time = start + i as f32 * tick;
        entity.update(time, &mut |event: &FiredEvent| fired.push(event.clone()));
    }
    fired
}

pub fn assert_vec3_near(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 0.01,
        "expected {expected:?}, got {actual:?}"
    );
}
