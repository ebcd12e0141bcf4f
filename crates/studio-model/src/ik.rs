//! IK chain descriptors

use glam::Vec3;
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Three-bone limb (hip, knee, foot) that can be solved to reach a target
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct IkChainDesc {
    /// Chain name (e.g. `lfoot`)
    pub name: String,
    /// Bones from the root of the limb to the end effector
    pub links: [usize; 3],
    /// Direction the middle joint bends towards, in model space
    pub knee_dir: Vec3,
}

impl IkChainDesc {
    pub fn new<S: Into<String>>(name: S, links: [usize; 3], knee_dir: Vec3) -> Self {
        Self {
            name: name.into(),
            links,
            knee_dir,
        }
    }

    /// End effector bone
    pub fn effector(&self) -> usize {
        self.links[2]
    }
}
