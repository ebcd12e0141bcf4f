//! Command implementations

pub mod anim;
pub mod model;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use studio_model::StudioModel;

/// Load and validate a JSON model description
pub fn load_model(path: &Path) -> Result<Arc<StudioModel>> {
    let model = StudioModel::load(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    log::info!("Loaded model '{}' from {}", model.name(), path.display());
    Ok(Arc::new(model))
}
