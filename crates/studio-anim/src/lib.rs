//! Skeletal pose evaluation and sequence timing.
//!
//! This crate drives [`studio_model::StudioModel`] instances over time. Each
//! simulation tick an [`Animating`] entity:
//!
//! - advances its sequence clock ([`clock`])
//! - dispatches the baked events the cycle crossed ([`events`])
//! - evaluates its pose on demand ([`pose`]), optionally corrected by inverse
//!   kinematics against world collision ([`ik`], [`collision`])
//! - caches bone-to-world transforms for hitbox and attachment queries
//!   ([`bone_cache`])
//! - reports the root motion its animation implies ([`motion`])
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_anim::{Animating, TickContext};
//!
//! let mut entity = Animating::new().with_model(model);
//! entity.reset_sequence(entity.lookup_sequence("walk").unwrap());
//!
//! let mut time = 0.0;
//! while time < 2.0 {
//!     time += 0.1;
//!     entity.update(time, &mut |event: &studio_anim::FiredEvent| {
//!         println!("event {} at {:.2}s", event.event, event.time);
//!     });
//!     let hand = entity.get_attachment_by_name(&TickContext::new(time), "hand");
//! }
//! ```

pub mod animating;
pub mod bone_cache;
pub mod clock;
pub mod collision;
pub mod cycle;
pub mod error;
pub mod events;
pub mod ik;
pub mod motion;
pub mod options;
pub mod persist;
pub mod pose;
pub mod state;

pub use animating::{Animating, CACHED_BONE_MASK, TickContext};
pub use bone_cache::{BoneCache, BoneCacheKey, CacheStats};
pub use collision::{ContentsMask, GroundPlaneTracer, NullTracer, TraceHull, TraceResult};
pub use error::{Result, StateError};
pub use events::{AnimEventHandler, FiredEvent};
pub use ik::{IkContext, IkState, IkTarget};
pub use motion::IntervalMovement;
pub use options::{AnimatingOptions, AutoplayPolicy, IkMissPolicy};
pub use persist::{AnimatingSnapshot, FIELDS, FieldDesc, FieldKind, FieldValue, SNAPSHOT_VERSION};
pub use pose::{BonePose, PoseRequest, PoseSolver};
pub use state::AnimationState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
