//! Component integration tests

pub mod cache;
pub mod clock;
pub mod events;
pub mod ik;
pub mod motion;
pub mod persist;
pub mod pose;
