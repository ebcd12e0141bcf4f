//! Pose evaluation benchmarks

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use studio_anim::{Animating, PoseRequest, PoseSolver, TickContext};
use studio_model::{
    AnimationDesc, AttachmentDesc, BoneDesc, BoneFlags, BoneTrack, HitboxDesc, HitboxSet,
    ModelBuilder, SequenceDesc, SequenceFlags, StudioModel,
};

/// A single chain of `bones` bones, every one animated over 31 frames
fn chain_model(bones: usize) -> StudioModel {
    let mut builder = ModelBuilder::new(format!("chain_{bones}"));
    let mut anim = AnimationDesc::new("sway", 30.0, 31);
    for i in 0..bones {
        let parent = i.checked_sub(1);
        builder = builder.add_bone(BoneDesc::new(format!("bone_{i}"), parent, Vec3::Z * 4.0));
        let rotations = (0..31)
            .map(|f| Quat::from_rotation_x((f as f32 / 30.0).sin() * 0.2))
            .collect();
        anim = anim.with_track(
            i,
            BoneTrack {
                positions: vec![Vec3::Z * 4.0],
                rotations,
            },
        );
    }

    let tip = bones - 1;
    builder
        .add_animation(anim)
        .add_sequence(SequenceDesc::new("sway", 0).with_flags(SequenceFlags::LOOPING))
        .add_attachment(AttachmentDesc::new("tip", tip, Vec3::X))
        .add_hitbox_set(HitboxSet::new(
            "default",
            vec![HitboxDesc::new(tip, 0, Vec3::splat(-1.0), Vec3::splat(1.0))],
        ))
        .build()
        .unwrap()
}

fn bench_compute_pose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_pose");

    for bones in [8, 32, 128] {
        let model = chain_model(bones);
        let solver = PoseSolver::new(&model);
        let pose_parameters = [0.0; 24];
        let bone_controllers = [0.0; 4];

        group.bench_with_input(BenchmarkId::from_parameter(bones), &bones, |b, _| {
            let mut cycle = 0.0;
            b.iter(|| {
                cycle = (cycle + 0.01) % 1.0;
                let pose = solver.compute_pose(&PoseRequest {
                    sequence: Some(0),
                    cycle: black_box(cycle),
                    pose_parameters: &pose_parameters,
                    bone_controllers: &bone_controllers,
                    mask: BoneFlags::USED_BY_ANYTHING,
                    realtime: 0.0,
                    autoplay: false,
                });
                black_box(pose);
            });
        });
    }

    group.finish();
}

fn bench_bone_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("bone_queries");
    let model = Arc::new(chain_model(64));

    group.bench_function("cached_attachment", |b| {
        let mut entity = Animating::new().with_model(Arc::clone(&model));
        entity.reset_sequence(0);
        let ctx = TickContext::new(0.1);
        b.iter(|| black_box(entity.get_attachment(&ctx, 0)));
    });

    group.bench_function("advancing_attachment", |b| {
        let mut entity = Animating::new().with_model(Arc::clone(&model));
        entity.reset_sequence(0);
        let mut time = 0.0;
        b.iter(|| {
            time += 0.05;
            entity.studio_frame_advance(time);
            black_box(entity.get_attachment(&TickContext::new(time), 0))
        });
    });

    group.bench_function("full_skeleton", |b| {
        let mut entity = Animating::new().with_model(Arc::clone(&model));
        entity.reset_sequence(0);
        let ctx = TickContext::new(0.1);
        b.iter(|| black_box(entity.setup_bones(&ctx, BoneFlags::USED_BY_ANYTHING)));
    });

    group.finish();
}

criterion_group!(benches, bench_compute_pose, bench_bone_queries);
criterion_main!(benches);
