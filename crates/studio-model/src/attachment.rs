//! Attachment points

use glam::{Affine3A, Quat, Vec3};
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Named offset relative to a bone, used to place effects and carried items
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct AttachmentDesc {
    /// Attachment name
    pub name: String,
    /// Owning bone
    pub bone: usize,
    /// Offset from the bone origin
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub position: Vec3,
    /// Rotation relative to the bone
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub rotation: Quat,
}

impl AttachmentDesc {
    pub fn new<S: Into<String>>(name: S, bone: usize, position: Vec3) -> Self {
        Self {
            name: name.into(),
            bone,
            position,
            rotation: Quat::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Transform from attachment space to bone space
    pub fn local_transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }
}
