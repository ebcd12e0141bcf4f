//! Bones and bone controllers

use glam::{Affine3A, Quat, Vec3};
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// What a bone is needed for. Used as the mask when evaluating partial skeletons.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct BoneFlags: u32 {
        /// Referenced by a hitbox
        const USED_BY_HITBOX = 0x100;
        /// Referenced by an attachment
        const USED_BY_ATTACHMENT = 0x200;
        /// Skins render vertices
        const USED_BY_VERTEX = 0x400;
        /// Referenced by a bone controller
        const USED_BY_BONE_CONTROLLER = 0x800;
        /// Any use
        const USED_BY_ANYTHING = 0xF00;
    }
}

impl Default for BoneFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Skeleton bone with its bind-pose local transform
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BoneDesc {
    /// Bone name
    pub name: String,
    /// Parent bone index (None for root bones)
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub parent: Option<usize>,
    /// Bind-pose position relative to the parent
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub position: Vec3,
    /// Bind-pose rotation relative to the parent
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub rotation: Quat,
    /// Usage flags
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub flags: BoneFlags,
}

impl BoneDesc {
    /// Create a bone with an identity bind rotation
    pub fn new<S: Into<String>>(name: S, parent: Option<usize>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            parent,
            position,
            rotation: Quat::IDENTITY,
            flags: BoneFlags::empty(),
        }
    }

    /// Set the bind rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Add usage flags
    #[must_use]
    pub fn with_flags(mut self, flags: BoneFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Bind-pose local transform
    pub fn bind_transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }
}

/// Axis and mode a bone controller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum ControllerKind {
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
}

impl ControllerKind {
    /// Whether the controller value is an angle in degrees
    pub fn is_rotation(self) -> bool {
        matches!(self, Self::RotateX | Self::RotateY | Self::RotateZ)
    }

    /// Unit axis the controller acts along or around
    pub fn axis(self) -> Vec3 {
        match self {
            Self::TranslateX | Self::RotateX => Vec3::X,
            Self::TranslateY | Self::RotateY => Vec3::Y,
            Self::TranslateZ | Self::RotateZ => Vec3::Z,
        }
    }
}

/// Procedural per-bone offset driven by one of the entity's controller slots
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BoneControllerDesc {
    /// Bone the offset is applied to
    pub bone: usize,
    /// Axis and mode
    pub kind: ControllerKind,
    /// Value mapped from normalized 0.0
    pub start: f32,
    /// Value mapped from normalized 1.0
    pub end: f32,
    /// Entity controller slot feeding this controller
    pub index: usize,
}

impl BoneControllerDesc {
    /// Map a controller value into its normalized `[0, 1]` setting.
    ///
    /// Rotational controllers treat values as degrees: reversed ranges are
    /// mirrored and values are wrapped by whole turns towards the range.
    pub fn encode(&self, value: f32) -> f32 {
        let mut value = value;
        if self.kind.is_rotation() {
            if self.end < self.start {
                value = -value;
            }
            if self.start + 359.0 >= self.end {
                let mid = (self.start + self.end) / 2.0;
                if value > mid + 180.0 {
                    value -= 360.0;
                }
                if value < mid - 180.0 {
                    value += 360.0;
                }
            } else if value > 360.0 {
                value -= (value / 360.0).trunc() * 360.0;
            } else if value < 0.0 {
                value += ((value / -360.0).trunc() + 1.0) * 360.0;
            }
        }

        let span = self.end - self.start;
        if span == 0.0 {
            return 0.0;
        }
        ((value - self.start) / span).clamp(0.0, 1.0)
    }

    /// Convert a normalized setting back into controller units
    pub fn denormalize(&self, normalized: f32) -> f32 {
        normalized * (self.end - self.start) + self.start
    }
}
