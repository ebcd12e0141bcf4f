//! Structural validation of model descriptions.
//!
//! Runs once when a [`StudioModel`](crate::StudioModel) is built so that every
//! cross-table index can be trusted afterwards.

use std::collections::HashSet;

use crate::animation::AnimationDesc;
use crate::error::{ModelError, Result};
use crate::model::{MAX_BONE_CONTROLLERS, MAX_POSE_PARAMETERS, ModelDesc};
use crate::sequence::SequenceDesc;

/// Validate every table of a model description
pub fn validate_model(desc: &ModelDesc) -> Result<()> {
    validate_bones(desc)?;
    validate_controllers(desc)?;
    validate_pose_params(desc)?;
    for (i, anim) in desc.animations.iter().enumerate() {
        validate_animation(i, anim, desc.bones.len())?;
    }
    for sequence in &desc.sequences {
        validate_sequence(sequence, desc)?;
    }
    validate_references(desc)?;
    validate_transitions(desc)
}

/// Bones must have unique names and parents that precede them
pub fn validate_bones(desc: &ModelDesc) -> Result<()> {
    unique_names("bone", desc.bones.iter().map(|b| b.name.as_str()))?;
    for (i, bone) in desc.bones.iter().enumerate() {
        if let Some(parent) = bone.parent {
            if parent >= i {
                return Err(ModelError::InvalidParent { bone: i, parent });
            }
        }
    }
    Ok(())
}

fn validate_controllers(desc: &ModelDesc) -> Result<()> {
    for controller in &desc.controllers {
        check_index("bone", controller.bone, desc.bones.len())?;
        check_index("bone controller slot", controller.index, MAX_BONE_CONTROLLERS)?;
    }
    Ok(())
}

fn validate_pose_params(desc: &ModelDesc) -> Result<()> {
    if desc.pose_params.len() > MAX_POSE_PARAMETERS {
        return Err(ModelError::ValidationError(format!(
            "{} pose parameters exceed the limit of {}",
            desc.pose_params.len(),
            MAX_POSE_PARAMETERS
        )));
    }
    unique_names("pose parameter", desc.pose_params.iter().map(|p| p.name.as_str()))
}

/// Keyframe counts must match the frame count and motion segments must be ordered
pub fn validate_animation(index: usize, anim: &AnimationDesc, bone_count: usize) -> Result<()> {
    if anim.num_frames == 0 {
        return Err(ModelError::InvalidAnimation(format!(
            "animation {index} ('{}') has no frames",
            anim.name
        )));
    }
    if anim.tracks.len() > bone_count {
        return Err(ModelError::InvalidAnimation(format!(
            "animation '{}' has {} tracks for {} bones",
            anim.name,
            anim.tracks.len(),
            bone_count
        )));
    }
    for (bone, track) in anim.tracks.iter().enumerate() {
        for len in [track.positions.len(), track.rotations.len()] {
            if len > 1 && len != anim.num_frames {
                return Err(ModelError::InvalidAnimation(format!(
                    "animation '{}' bone {bone} has {len} keys for {} frames",
                    anim.name, anim.num_frames
                )));
            }
        }
    }

    let last_frame = (anim.num_frames - 1) as f32;
    let mut prev = 0.0;
    for segment in &anim.movements {
        if segment.end_frame <= prev || segment.end_frame > last_frame {
            return Err(ModelError::InvalidAnimation(format!(
                "animation '{}' movement segment ends at frame {} (previous {prev}, last {last_frame})",
                anim.name, segment.end_frame
            )));
        }
        prev = segment.end_frame;
    }
    Ok(())
}

/// Sequences must reference existing animations, pose parameters and nodes
pub fn validate_sequence(sequence: &SequenceDesc, desc: &ModelDesc) -> Result<()> {
    let expected = sequence.group_size[0] * sequence.group_size[1];
    if expected == 0 || sequence.animations.len() != expected {
        return Err(ModelError::ValidationError(format!(
            "sequence '{}' has {} animations for a {}x{} blend grid",
            sequence.label,
            sequence.animations.len(),
            sequence.group_size[0],
            sequence.group_size[1]
        )));
    }
    for &anim in &sequence.animations {
        check_index("animation", anim, desc.animations.len())?;
    }
    for param in sequence.param_index.iter().flatten() {
        check_index("pose parameter", *param, desc.pose_params.len())?;
    }
    if !sequence.bone_weights.is_empty() && sequence.bone_weights.len() != desc.bones.len() {
        return Err(ModelError::ValidationError(format!(
            "sequence '{}' has {} bone weights for {} bones",
            sequence.label,
            sequence.bone_weights.len(),
            desc.bones.len()
        )));
    }
    let nodes = desc.transitions.len();
    for node in [sequence.entry_node, sequence.exit_node] {
        if node > nodes {
            return Err(ModelError::IndexOutOfRange {
                kind: "transition node",
                index: node,
                count: nodes,
            });
        }
    }
    Ok(())
}

fn validate_references(desc: &ModelDesc) -> Result<()> {
    let bones = desc.bones.len();
    for attachment in &desc.attachments {
        check_index("bone", attachment.bone, bones)?;
    }
    for set in &desc.hitbox_sets {
        for hitbox in &set.hitboxes {
            check_index("bone", hitbox.bone, bones)?;
        }
    }
    for chain in &desc.ik_chains {
        for &link in &chain.links {
            check_index("bone", link, bones)?;
        }
        let [hip, knee, foot] = chain.links;
        if desc.bones[foot].parent != Some(knee) || desc.bones[knee].parent != Some(hip) {
            return Err(ModelError::ValidationError(format!(
                "IK chain '{}' links are not a parent chain",
                chain.name
            )));
        }
    }
    unique_names("sequence", desc.sequences.iter().map(|s| s.label.as_str()))?;
    unique_names("attachment", desc.attachments.iter().map(|a| a.name.as_str()))
}

fn validate_transitions(desc: &ModelDesc) -> Result<()> {
    let nodes = desc.transitions.len();
    for row in &desc.transitions {
        if row.len() != nodes {
            return Err(ModelError::ValidationError(format!(
                "transition table row has {} entries, expected {nodes}",
                row.len()
            )));
        }
        for &node in row {
            check_index("transition node", node, nodes + 1)?;
        }
    }
    Ok(())
}

fn check_index(kind: &'static str, index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(ModelError::IndexOutOfRange { kind, index, count });
    }
    Ok(())
}

fn unique_names<'a>(kind: &'static str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(ModelError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
