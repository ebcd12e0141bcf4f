//! The immutable model handle and its metadata queries

use glam::Vec3;
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::animation::AnimationDesc;
use crate::attachment::AttachmentDesc;
use crate::bodygroup::BodyPartDesc;
use crate::bone::{BoneControllerDesc, BoneDesc, BoneFlags};
use crate::error::Result;
use crate::flex::{FlexControllerDesc, FlexDesc};
use crate::hitbox::{HitboxDesc, HitboxSet};
use crate::ik::IkChainDesc;
use crate::pose_param::PoseParamDesc;
use crate::sequence::{AnimEvent, SequenceDesc};
use crate::validation::validate_model;

/// Maximum number of pose parameters a model may define
pub const MAX_POSE_PARAMETERS: usize = 24;

/// Maximum number of entity bone controller slots
pub const MAX_BONE_CONTROLLERS: usize = 4;

/// Plain description of a compiled model, as loaded from disk or assembled by
/// [`crate::ModelBuilder`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct ModelDesc {
    pub name: String,
    pub eye_position: Vec3,
    pub hull_min: Vec3,
    pub hull_max: Vec3,
    pub bones: Vec<BoneDesc>,
    pub controllers: Vec<BoneControllerDesc>,
    pub pose_params: Vec<PoseParamDesc>,
    pub animations: Vec<AnimationDesc>,
    pub sequences: Vec<SequenceDesc>,
    pub attachments: Vec<AttachmentDesc>,
    pub hitbox_sets: Vec<HitboxSet>,
    pub body_parts: Vec<BodyPartDesc>,
    pub flex_controllers: Vec<FlexControllerDesc>,
    pub flex_descs: Vec<FlexDesc>,
    pub ik_chains: Vec<IkChainDesc>,
    /// Transition graph: `transitions[from - 1][to - 1]` is the node to pass
    /// through when going from node `from` to node `to` (0 = direct)
    pub transitions: Vec<Vec<usize>>,
}

/// Immutable, validated model. Shared between entities behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioModel {
    desc: ModelDesc,
}

impl StudioModel {
    /// Validate a description and bake derived data
    pub fn from_desc(mut desc: ModelDesc) -> Result<Self> {
        validate_model(&desc)?;

        for anim in &mut desc.animations {
            anim.bake_movement();
        }
        propagate_bone_usage(&mut desc);

        log::debug!(
            "Loaded model '{}': {} bones, {} sequences, {} animations",
            desc.name,
            desc.bones.len(),
            desc.sequences.len(),
            desc.animations.len()
        );

        Ok(Self { desc })
    }

    /// Parse a JSON model description
    #[cfg(feature = "serde-support")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let desc: ModelDesc = serde_json::from_str(json)?;
        Self::from_desc(desc)
    }

    /// Load a JSON model description from a file
    #[cfg(feature = "serde-support")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize the model description as pretty JSON
    #[cfg(feature = "serde-support")]
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.desc)?)
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    /// Underlying description
    pub fn desc(&self) -> &ModelDesc {
        &self.desc
    }

    pub fn eye_position(&self) -> Vec3 {
        self.desc.eye_position
    }

    /// Collision hull bounds
    pub fn hull(&self) -> (Vec3, Vec3) {
        (self.desc.hull_min, self.desc.hull_max)
    }

    // Bones

    pub fn bones(&self) -> &[BoneDesc] {
        &self.desc.bones
    }

    pub fn bone(&self, index: usize) -> Option<&BoneDesc> {
        self.desc.bones.get(index)
    }

    pub fn bone_count(&self) -> usize {
        self.desc.bones.len()
    }

    /// Find a bone by name (case-insensitive)
    pub fn lookup_bone(&self, name: &str) -> Option<usize> {
        position_by_name(&self.desc.bones, name, |b| &b.name)
    }

    /// Whether a bone is needed for any of the usage bits in `mask`
    pub fn bone_used_by(&self, bone: usize, mask: BoneFlags) -> bool {
        self.bone(bone).is_some_and(|b| b.flags.intersects(mask))
    }

    pub fn controllers(&self) -> &[BoneControllerDesc] {
        &self.desc.controllers
    }

    // Pose parameters

    pub fn pose_params(&self) -> &[PoseParamDesc] {
        &self.desc.pose_params
    }

    pub fn pose_param(&self, index: usize) -> Option<&PoseParamDesc> {
        self.desc.pose_params.get(index)
    }

    pub fn pose_param_count(&self) -> usize {
        self.desc.pose_params.len()
    }

    /// Find a pose parameter by name (case-insensitive)
    pub fn lookup_pose_param(&self, name: &str) -> Option<usize> {
        position_by_name(&self.desc.pose_params, name, |p| &p.name)
    }

    // Sequences and animations

    pub fn sequences(&self) -> &[SequenceDesc] {
        &self.desc.sequences
    }

    pub fn sequence(&self, index: usize) -> Option<&SequenceDesc> {
        self.desc.sequences.get(index)
    }

    pub fn sequence_count(&self) -> usize {
        self.desc.sequences.len()
    }

    /// Find a sequence by label (case-insensitive)
    pub fn lookup_sequence(&self, label: &str) -> Option<usize> {
        position_by_name(&self.desc.sequences, label, |s| &s.label)
    }

    /// Sequences that can play for an activity, with their indices
    pub fn sequences_for_activity<'a>(
        &'a self,
        activity: &'a str,
    ) -> impl Iterator<Item = (usize, &'a SequenceDesc)> + 'a {
        self.desc.sequences.iter().enumerate().filter(move |(_, s)| {
            s.activity
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(activity))
        })
    }

    /// Baked events of a sequence (empty for an invalid index)
    pub fn sequence_events(&self, sequence: usize) -> &[AnimEvent] {
        self.sequence(sequence).map_or(&[], |s| s.events.as_slice())
    }

    pub fn animations(&self) -> &[AnimationDesc] {
        &self.desc.animations
    }

    pub fn animation(&self, index: usize) -> Option<&AnimationDesc> {
        self.desc.animations.get(index)
    }

    /// Position of a pose parameter inside one blend axis of a sequence.
    ///
    /// Returns the grid column/row and the blend factor towards the next one.
    pub fn local_pose_parameter(
        &self,
        sequence: &SequenceDesc,
        pose_params: &[f32],
        axis: usize,
    ) -> (usize, f32) {
        let size = sequence.group_size[axis];
        let Some(param) = sequence.param_index[axis] else {
            return (0, 0.0);
        };
        if size <= 1 {
            return (0, 0.0);
        }
        let Some(desc) = self.pose_param(param) else {
            return (0, 0.0);
        };

        let value = desc.denormalize(pose_params.get(param).copied().unwrap_or(0.0));
        let (start, end) = (sequence.param_start[axis], sequence.param_end[axis]);
        let s = if (end - start).abs() > f32::EPSILON {
            ((value - start) / (end - start)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let f = s * (size - 1) as f32;
        let index = (f.floor() as usize).min(size - 2);
        (index, f - index as f32)
    }

    /// Animations contributing to a sequence at the given pose, with weights summing to 1
    pub fn seq_blend_weights(&self, sequence: usize, pose_params: &[f32]) -> Vec<(usize, f32)> {
        let Some(seq) = self.sequence(sequence) else {
            return Vec::new();
        };
        let (i0, s0) = self.local_pose_parameter(seq, pose_params, 0);
        let (i1, s1) = self.local_pose_parameter(seq, pose_params, 1);

        let corners = [
            (i0, i1, (1.0 - s0) * (1.0 - s1)),
            (i0 + 1, i1, s0 * (1.0 - s1)),
            (i0, i1 + 1, (1.0 - s0) * s1),
            (i0 + 1, i1 + 1, s0 * s1),
        ];

        let mut weights: Vec<(usize, f32)> = Vec::with_capacity(4);
        for (c0, c1, w) in corners {
            if w <= 0.0 {
                continue;
            }
            let Some(anim) = seq.animation_at(c0, c1) else {
                continue;
            };
            match weights.iter_mut().find(|(a, _)| *a == anim) {
                Some(entry) => entry.1 += w,
                None => weights.push((anim, w)),
            }
        }
        weights
    }

    /// Cycles per second of a sequence at the given pose (0.0 when degenerate)
    pub fn sequence_cycles_per_second(&self, sequence: usize, pose_params: &[f32]) -> f32 {
        self.seq_blend_weights(sequence, pose_params)
            .iter()
            .filter_map(|&(anim, w)| self.animation(anim).map(|a| a.cycles_per_second() * w))
            .sum()
    }

    /// Duration of a sequence in seconds (0.0 when degenerate)
    pub fn sequence_duration(&self, sequence: usize, pose_params: &[f32]) -> f32 {
        let cps = self.sequence_cycles_per_second(sequence, pose_params);
        if cps > 0.0 { 1.0 / cps } else { 0.0 }
    }

    /// Root displacement between two cycles, in the sequence's frame at `cycle_from`.
    ///
    /// Returns None when no blended animation carries root motion.
    pub fn seq_movement(
        &self,
        sequence: usize,
        cycle_from: f32,
        cycle_to: f32,
        pose_params: &[f32],
    ) -> Option<(Vec3, f32)> {
        let mut found = false;
        let mut delta = Vec3::ZERO;
        let mut yaw = 0.0;
        for (anim, w) in self.seq_blend_weights(sequence, pose_params) {
            if let Some((d, a)) = self
                .animation(anim)
                .and_then(|a| a.movement(cycle_from, cycle_to))
            {
                delta += d * w;
                yaw += a * w;
                found = true;
            }
        }
        found.then_some((delta, yaw))
    }

    /// Root velocity of a sequence at a cycle, in units per second
    pub fn seq_velocity(&self, sequence: usize, cycle: f32, pose_params: &[f32]) -> Option<Vec3> {
        let mut found = false;
        let mut velocity = Vec3::ZERO;
        for (anim, w) in self.seq_blend_weights(sequence, pose_params) {
            if let Some(v) = self.animation(anim).and_then(|a| a.velocity_at(cycle)) {
                velocity += v * w;
                found = true;
            }
        }
        found.then_some(velocity)
    }

    /// Cycle at which a sequence's root motion first covers `distance`
    pub fn find_seq_distance(&self, sequence: usize, pose_params: &[f32], distance: f32) -> f32 {
        let weights = self.seq_blend_weights(sequence, pose_params);
        if weights.is_empty() {
            return 1.0;
        }
        weights
            .iter()
            .map(|&(anim, w)| {
                self.animation(anim)
                    .map_or(1.0, |a| a.find_distance(distance))
                    * w
            })
            .sum()
    }

    /// Root displacement over one full cycle
    pub fn sequence_linear_motion(&self, sequence: usize, pose_params: &[f32]) -> Vec3 {
        self.seq_movement(sequence, 0.0, 1.0, pose_params)
            .map_or(Vec3::ZERO, |(delta, _)| delta)
    }

    /// Direction of a sequence's linear motion in degrees, None when stationary
    pub fn sequence_move_yaw(&self, sequence: usize, pose_params: &[f32]) -> Option<f32> {
        let motion = self.sequence_linear_motion(sequence, pose_params);
        if motion.x == 0.0 && motion.y == 0.0 {
            return None;
        }
        Some(motion.y.atan2(motion.x).to_degrees())
    }

    /// Intermediate node when travelling between two transition graph nodes
    /// (0 when the move is direct or either node is unknown)
    pub fn transition_node(&self, from: usize, to: usize) -> usize {
        if from == 0 || to == 0 {
            return 0;
        }
        self.desc
            .transitions
            .get(from - 1)
            .and_then(|row| row.get(to - 1))
            .copied()
            .unwrap_or(0)
    }

    // Attachments

    pub fn attachments(&self) -> &[AttachmentDesc] {
        &self.desc.attachments
    }

    pub fn attachment(&self, index: usize) -> Option<&AttachmentDesc> {
        self.desc.attachments.get(index)
    }

    /// Find an attachment by name (case-insensitive)
    pub fn lookup_attachment(&self, name: &str) -> Option<usize> {
        position_by_name(&self.desc.attachments, name, |a| &a.name)
    }

    // Hitboxes

    pub fn hitbox_sets(&self) -> &[HitboxSet] {
        &self.desc.hitbox_sets
    }

    pub fn hitbox_set(&self, index: usize) -> Option<&HitboxSet> {
        self.desc.hitbox_sets.get(index)
    }

    /// Find a hitbox set by name (case-insensitive)
    pub fn lookup_hitbox_set(&self, name: &str) -> Option<usize> {
        position_by_name(&self.desc.hitbox_sets, name, |s| &s.name)
    }

    pub fn hitbox(&self, set: usize, index: usize) -> Option<&HitboxDesc> {
        self.hitbox_set(set).and_then(|s| s.hitboxes.get(index))
    }

    /// Find a hitbox by name within a set (case-insensitive)
    pub fn lookup_hitbox(&self, set: usize, name: &str) -> Option<usize> {
        self.hitbox_set(set)
            .and_then(|s| position_by_name(&s.hitboxes, name, |h| &h.name))
    }

    // Body groups, flexes and IK

    pub fn body_parts(&self) -> &[BodyPartDesc] {
        &self.desc.body_parts
    }

    pub fn lookup_body_part(&self, name: &str) -> Option<usize> {
        position_by_name(&self.desc.body_parts, name, |b| &b.name)
    }

    pub fn flex_controllers(&self) -> &[FlexControllerDesc] {
        &self.desc.flex_controllers
    }

    pub fn lookup_flex_controller(&self, name: &str) -> Option<usize> {
        position_by_name(&self.desc.flex_controllers, name, |f| &f.name)
    }

    pub fn flex_descs(&self) -> &[FlexDesc] {
        &self.desc.flex_descs
    }

    pub fn ik_chains(&self) -> &[IkChainDesc] {
        &self.desc.ik_chains
    }

    pub fn ik_chain(&self, index: usize) -> Option<&IkChainDesc> {
        self.desc.ik_chains.get(index)
    }

    pub fn lookup_ik_chain(&self, name: &str) -> Option<usize> {
        position_by_name(&self.desc.ik_chains, name, |c| &c.name)
    }
}

fn position_by_name<T>(items: &[T], name: &str, key: impl Fn(&T) -> &String) -> Option<usize> {
    items.iter().position(|item| key(item).eq_ignore_ascii_case(name))
}

/// Mark every bone referenced by hitboxes, attachments or controllers, then
/// give each parent the union of its children's usage.
fn propagate_bone_usage(desc: &mut ModelDesc) {
    for set in &desc.hitbox_sets {
        for hitbox in &set.hitboxes {
            desc.bones[hitbox.bone].flags |= BoneFlags::USED_BY_HITBOX;
        }
    }
    for attachment in &desc.attachments {
        desc.bones[attachment.bone].flags |= BoneFlags::USED_BY_ATTACHMENT;
    }
    for controller in &desc.controllers {
        desc.bones[controller.bone].flags |= BoneFlags::USED_BY_BONE_CONTROLLER;
    }

    // Parents precede children, so a reverse walk reaches every ancestor
    for i in (0..desc.bones.len()).rev() {
        if let Some(parent) = desc.bones[i].parent {
            let flags = desc.bones[i].flags & BoneFlags::USED_BY_ANYTHING;
            desc.bones[parent].flags |= flags;
        }
    }
}
