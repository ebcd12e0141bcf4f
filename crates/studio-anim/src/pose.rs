//! Pose solver: composes local bone poses from sequences, autoplay layers and
//! bone controllers, then builds world transforms through the skeleton.

use glam::{Affine3A, Quat, Vec3};
use studio_model::{BoneFlags, StudioModel};

use crate::cycle::frac;

/// Local position and rotation of every bone
#[derive(Debug, Clone, PartialEq)]
pub struct BonePose {
    /// Position relative to the parent bone
    pub positions: Vec<Vec3>,
    /// Rotation relative to the parent bone
    pub rotations: Vec<Quat>,
}

impl BonePose {
    /// Bind pose of a model
    pub fn bind(model: &StudioModel) -> Self {
        Self {
            positions: model.bones().iter().map(|b| b.position).collect(),
            rotations: model.bones().iter().map(|b| b.rotation).collect(),
        }
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Local transform of one bone
    pub fn local_transform(&self, bone: usize) -> Affine3A {
        match (self.positions.get(bone), self.rotations.get(bone)) {
            (Some(&p), Some(&q)) => Affine3A::from_rotation_translation(q, p),
            _ => Affine3A::IDENTITY,
        }
    }
}

/// Inputs of one pose evaluation
#[derive(Debug, Clone, Copy)]
pub struct PoseRequest<'a> {
    /// Primary sequence
    pub sequence: Option<usize>,
    /// Cycle of the primary sequence
    pub cycle: f32,
    /// Normalized pose parameters
    pub pose_parameters: &'a [f32],
    /// Normalized bone controller slots
    pub bone_controllers: &'a [f32],
    /// Bones to evaluate
    pub mask: BoneFlags,
    /// Clock driving autoplay layers
    pub realtime: f32,
    /// Whether autoplay sequences are layered on top
    pub autoplay: bool,
}

/// Evaluates poses for one model
#[derive(Debug, Clone, Copy)]
pub struct PoseSolver<'a> {
    model: &'a StudioModel,
}

impl<'a> PoseSolver<'a> {
    pub fn new(model: &'a StudioModel) -> Self {
        Self { model }
    }

    /// Whether a bone is evaluated under `mask`. `USED_BY_ANYTHING` selects the
    /// full skeleton, including bones nothing references.
    pub fn bone_in_mask(&self, bone: usize, mask: BoneFlags) -> bool {
        mask.contains(BoneFlags::USED_BY_ANYTHING)
            || self.model.bone_used_by(bone, mask)
    }

    /// Full pose evaluation: primary sequence, autoplay layers, then bone controllers
    pub fn compute_pose(&self, request: &PoseRequest<'_>) -> BonePose {
        let mut pose = BonePose::bind(self.model);
        self.calc_pose(
            &mut pose,
            request.sequence,
            request.cycle,
            request.pose_parameters,
            request.mask,
        );
        if request.autoplay {
            self.calc_autoplay_sequences(
                &mut pose,
                request.realtime,
                request.pose_parameters,
                request.mask,
            );
        }
        self.apply_bone_controllers(&mut pose, request.bone_controllers, request.mask);
        pose
    }

    /// Overwrite `pose` with the primary sequence sampled at `cycle`.
    ///
    /// An invalid sequence leaves the bind pose in place.
    pub fn calc_pose(
        &self,
        pose: &mut BonePose,
        sequence: Option<usize>,
        cycle: f32,
        pose_parameters: &[f32],
        mask: BoneFlags,
    ) {
        let Some(index) = sequence else {
            return;
        };
        let Some(seq) = self.model.sequence(index) else {
            log::warn!(
                "Pose for invalid sequence {index} on model '{}'",
                self.model.name()
            );
            return;
        };

        let weights = self.model.seq_blend_weights(index, pose_parameters);
        for bone in 0..pose.len() {
            if !self.bone_in_mask(bone, mask) {
                continue;
            }
            let bone_weight = seq.bone_weight(bone);
            if bone_weight <= 0.0 {
                continue;
            }

            let (pos, rot) = self.sample_blend(&weights, cycle, bone, seq.is_delta());
            let (bind_pos, bind_rot) = (pose.positions[bone], pose.rotations[bone]);
            let (pos, rot) = if seq.is_delta() {
                (bind_pos + pos, (bind_rot * rot).normalize())
            } else {
                (pos, rot)
            };

            if bone_weight >= 1.0 {
                pose.positions[bone] = pos;
                pose.rotations[bone] = rot;
            } else {
                pose.positions[bone] = bind_pos.lerp(pos, bone_weight);
                pose.rotations[bone] = bind_rot.slerp(rot, bone_weight);
            }
        }
    }

    /// Layer a sequence on top of `pose` with the given weight
    pub fn accumulate_pose(
        &self,
        pose: &mut BonePose,
        sequence: usize,
        cycle: f32,
        weight: f32,
        pose_parameters: &[f32],
        mask: BoneFlags,
    ) {
        if weight <= 0.0 {
            return;
        }
        let Some(seq) = self.model.sequence(sequence) else {
            log::warn!("Layer for invalid sequence {sequence}");
            return;
        };

        let weights = self.model.seq_blend_weights(sequence, pose_parameters);
        for bone in 0..pose.len() {
            if !self.bone_in_mask(bone, mask) {
                continue;
            }
            let s = (weight * seq.bone_weight(bone)).clamp(0.0, 1.0);
            if s <= 0.0 {
                continue;
            }

            let (pos, rot) = self.sample_blend(&weights, cycle, bone, seq.is_delta());
            if seq.is_delta() {
                pose.positions[bone] += pos * s;
                pose.rotations[bone] =
                    (pose.rotations[bone] * Quat::IDENTITY.slerp(rot, s)).normalize();
            } else {
                pose.positions[bone] = pose.positions[bone].lerp(pos, s);
                pose.rotations[bone] = pose.rotations[bone].slerp(rot, s);
            }
        }
    }

    /// Layer every autoplay sequence, each on its own timeline driven by `realtime`
    pub fn calc_autoplay_sequences(
        &self,
        pose: &mut BonePose,
        realtime: f32,
        pose_parameters: &[f32],
        mask: BoneFlags,
    ) {
        for (index, seq) in self.model.sequences().iter().enumerate() {
            if !seq.is_autoplay() {
                continue;
            }
            let cps = self.model.sequence_cycles_per_second(index, pose_parameters);
            let cycle = frac(realtime * cps);
            self.accumulate_pose(pose, index, cycle, 1.0, pose_parameters, mask);
        }
    }

    /// Apply procedural bone controller offsets
    pub fn apply_bone_controllers(
        &self,
        pose: &mut BonePose,
        bone_controllers: &[f32],
        mask: BoneFlags,
    ) {
        for controller in self.model.controllers() {
            let bone = controller.bone;
            if bone >= pose.len() || !self.bone_in_mask(bone, mask) {
                continue;
            }
            let normalized = bone_controllers.get(controller.index).copied().unwrap_or(0.0);
            let value = controller.denormalize(normalized);
            let axis = controller.kind.axis();
            if controller.kind.is_rotation() {
                pose.rotations[bone] =
                    (pose.rotations[bone] * Quat::from_axis_angle(axis, value.to_radians()))
                        .normalize();
            } else {
                pose.positions[bone] += axis * value;
            }
        }
    }

    /// Compose local poses into bone-to-world transforms.
    ///
    /// Root bones compose against `root`. Bones outside `mask` are None.
    pub fn build_matrices(
        &self,
        pose: &BonePose,
        root: &Affine3A,
        mask: BoneFlags,
    ) -> Vec<Option<Affine3A>> {
        let mut world: Vec<Option<Affine3A>> = vec![None; pose.len()];
        for (i, bone) in self.model.bones().iter().enumerate().take(pose.len()) {
            if !self.bone_in_mask(i, mask) {
                continue;
            }
            let parent = bone
                .parent
                .and_then(|p| world.get(p).copied().flatten())
                .unwrap_or(*root);
            world[i] = Some(parent * pose.local_transform(i));
        }
        world
    }

    /// Blend the samples of every weighted animation for one bone
    fn sample_blend(
        &self,
        weights: &[(usize, f32)],
        cycle: f32,
        bone: usize,
        delta: bool,
    ) -> (Vec3, Quat) {
        let (default_pos, default_rot) = if delta {
            (Vec3::ZERO, Quat::IDENTITY)
        } else {
            self.model
                .bone(bone)
                .map_or((Vec3::ZERO, Quat::IDENTITY), |b| (b.position, b.rotation))
        };

        let mut pos = Vec3::ZERO;
        let mut rot = default_rot;
        let mut total = 0.0;
        for &(anim_index, w) in weights {
            let (p, q) = match self.model.animation(anim_index) {
                Some(anim) => {
                    let frame = anim.frame_at(cycle);
                    let track = anim.track(bone);
                    (
                        track
                            .and_then(|t| t.sample_position(frame))
                            .unwrap_or(default_pos),
                        track
                            .and_then(|t| t.sample_rotation(frame))
                            .unwrap_or(default_rot),
                    )
                }
                None => (default_pos, default_rot),
            };

            pos += p * w;
            total += w;
            rot = if total <= w { q } else { rot.slerp(q, w / total) };
        }

        if total <= 0.0 {
            return (default_pos, default_rot);
        }
        (pos / total, rot.normalize())
    }
}
