//! Hitbox sets

use glam::Vec3;
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box in the space of its bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct HitboxDesc {
    /// Optional hitbox name
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub name: String,
    /// Owning bone
    pub bone: usize,
    /// Hit group reported to damage code
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub group: i32,
    /// Box minimum
    pub bbmin: Vec3,
    /// Box maximum
    pub bbmax: Vec3,
}

impl HitboxDesc {
    pub fn new(bone: usize, group: i32, bbmin: Vec3, bbmax: Vec3) -> Self {
        Self {
            name: String::new(),
            bone,
            group,
            bbmin,
            bbmax,
        }
    }

    #[must_use]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Box centre in bone space
    pub fn center(&self) -> Vec3 {
        (self.bbmin + self.bbmax) * 0.5
    }
}

/// Named collection of hitboxes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct HitboxSet {
    /// Set name
    pub name: String,
    /// Boxes in this set
    pub hitboxes: Vec<HitboxDesc>,
}

impl HitboxSet {
    pub fn new<S: Into<String>>(name: S, hitboxes: Vec<HitboxDesc>) -> Self {
        Self {
            name: name.into(),
            hitboxes,
        }
    }
}
