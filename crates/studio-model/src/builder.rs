//! Fluent construction of models in code.
//!
//! # Examples
//!
//! ```
//! use glam::Vec3;
//! use studio_model::{AnimationDesc, BoneDesc, ModelBuilder, SequenceDesc, SequenceFlags};
//!
//! let model = ModelBuilder::new("crate")
//!     .add_bone(BoneDesc::new("root", None, Vec3::ZERO))
//!     .add_animation(AnimationDesc::new("idle", 30.0, 31))
//!     .add_sequence(SequenceDesc::new("idle", 0).with_flags(SequenceFlags::LOOPING))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(model.sequence_count(), 1);
//! ```

use glam::Vec3;

use crate::animation::AnimationDesc;
use crate::attachment::AttachmentDesc;
use crate::bodygroup::BodyPartDesc;
use crate::bone::{BoneControllerDesc, BoneDesc};
use crate::error::Result;
use crate::flex::{FlexControllerDesc, FlexDesc};
use crate::hitbox::HitboxSet;
use crate::ik::IkChainDesc;
use crate::model::{ModelDesc, StudioModel};
use crate::pose_param::PoseParamDesc;
use crate::sequence::SequenceDesc;

/// Builder for [`StudioModel`]. All validation happens in [`ModelBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    desc: ModelDesc,
}

impl ModelBuilder {
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            desc: ModelDesc {
                name: name.into(),
                ..ModelDesc::default()
            },
        }
    }

    #[must_use]
    pub fn with_eye_position(mut self, eye: Vec3) -> Self {
        self.desc.eye_position = eye;
        self
    }

    #[must_use]
    pub fn with_hull(mut self, min: Vec3, max: Vec3) -> Self {
        self.desc.hull_min = min;
        self.desc.hull_max = max;
        self
    }

    /// Add a bone. Parents must be added before their children.
    #[must_use]
    pub fn add_bone(mut self, bone: BoneDesc) -> Self {
        self.desc.bones.push(bone);
        self
    }

    #[must_use]
    pub fn add_controller(mut self, controller: BoneControllerDesc) -> Self {
        self.desc.controllers.push(controller);
        self
    }

    #[must_use]
    pub fn add_pose_param(mut self, param: PoseParamDesc) -> Self {
        self.desc.pose_params.push(param);
        self
    }

    #[must_use]
    pub fn add_animation(mut self, animation: AnimationDesc) -> Self {
        self.desc.animations.push(animation);
        self
    }

    #[must_use]
    pub fn add_sequence(mut self, sequence: SequenceDesc) -> Self {
        self.desc.sequences.push(sequence);
        self
    }

    #[must_use]
    pub fn add_attachment(mut self, attachment: AttachmentDesc) -> Self {
        self.desc.attachments.push(attachment);
        self
    }

    #[must_use]
    pub fn add_hitbox_set(mut self, set: HitboxSet) -> Self {
        self.desc.hitbox_sets.push(set);
        self
    }

    #[must_use]
    pub fn add_body_part(mut self, part: BodyPartDesc) -> Self {
        self.desc.body_parts.push(part);
        self
    }

    #[must_use]
    pub fn add_flex_controller(mut self, controller: FlexControllerDesc) -> Self {
        self.desc.flex_controllers.push(controller);
        self
    }

    #[must_use]
    pub fn add_flex(mut self, flex: FlexDesc) -> Self {
        self.desc.flex_descs.push(flex);
        self
    }

    #[must_use]
    pub fn add_ik_chain(mut self, chain: IkChainDesc) -> Self {
        self.desc.ik_chains.push(chain);
        self
    }

    /// Set the transition graph (square table, see [`ModelDesc::transitions`])
    #[must_use]
    pub fn with_transitions(mut self, transitions: Vec<Vec<usize>>) -> Self {
        self.desc.transitions = transitions;
        self
    }

    /// Validate and produce the immutable model
    pub fn build(self) -> Result<StudioModel> {
        StudioModel::from_desc(self.desc)
    }
}
