//! Shared utilities for the studio-rs CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
