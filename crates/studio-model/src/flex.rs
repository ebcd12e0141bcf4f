//! Facial flex controllers

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Flex controller driving one or more facial flexes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct FlexControllerDesc {
    /// Controller name
    pub name: String,
    /// Controller category (e.g. `phoneme`, `eyes`)
    pub kind: String,
    /// Minimum value
    pub min: f32,
    /// Maximum value
    pub max: f32,
}

/// Facial flex, identified by its FACS action-unit name
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct FlexDesc {
    pub facs: String,
}
