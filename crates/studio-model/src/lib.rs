//! Compiled skeletal model metadata.
//!
//! A [`StudioModel`] is the immutable, shareable description of an animated
//! model: its skeleton, the sequences it can play and the baked animation and
//! root-motion data behind them, plus pose parameters, bone controllers,
//! attachments, hitbox sets, body groups, flex controllers and IK chains.
//!
//! Models are built with [`ModelBuilder`] or, with the `serde-support` feature,
//! loaded from JSON. Lookups are name based and case-insensitive. Queries on
//! invalid indices return `None` or neutral values instead of failing.
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_model::{ModelRegistry, ModelInfo};
//!
//! let mut registry = ModelRegistry::new();
//! let model = registry.load("models/soldier.json")?;
//!
//! let walk = model.lookup_sequence("walk").unwrap();
//! println!("walk lasts {}s", model.sequence_duration(walk, &[]));
//! ```

pub mod animation;
pub mod attachment;
pub mod bodygroup;
pub mod bone;
pub mod builder;
pub mod error;
pub mod flex;
pub mod hitbox;
pub mod ik;
pub mod math;
pub mod model;
pub mod pose_param;
pub mod registry;
pub mod sequence;
pub mod validation;

pub use animation::{AnimationDesc, BoneTrack, MovementSegment};
pub use attachment::AttachmentDesc;
pub use bodygroup::BodyPartDesc;
pub use bone::{BoneControllerDesc, BoneDesc, BoneFlags, ControllerKind};
pub use builder::ModelBuilder;
pub use error::{ModelError, Result};
pub use flex::{FlexControllerDesc, FlexDesc};
pub use hitbox::{HitboxDesc, HitboxSet};
pub use ik::IkChainDesc;
pub use model::{MAX_BONE_CONTROLLERS, MAX_POSE_PARAMETERS, ModelDesc, StudioModel};
pub use pose_param::PoseParamDesc;
pub use registry::{ModelInfo, ModelRegistry};
pub use sequence::{AnimEvent, SequenceDesc, SequenceFlags};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
