//! Model lookup by name.
//!
//! The animation core never reaches for a global model cache. Hosts pass a
//! [`ModelInfo`] implementation wherever a model has to be resolved by name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::StudioModel;

/// Provider of loaded models
pub trait ModelInfo: Send + Sync {
    /// Resolve a model by name
    fn get_model(&self, name: &str) -> Option<Arc<StudioModel>>;
}

/// In-memory [`ModelInfo`] keyed by model name
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<StudioModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its own name, replacing any previous entry
    pub fn register(&mut self, model: StudioModel) -> Arc<StudioModel> {
        let model = Arc::new(model);
        self.models
            .insert(model.name().to_string(), Arc::clone(&model));
        model
    }

    /// Load a JSON model description and register it
    #[cfg(feature = "serde-support")]
    pub fn load<P: AsRef<std::path::Path>>(&mut self, path: P) -> crate::Result<Arc<StudioModel>> {
        let model = StudioModel::load(path)?;
        Ok(self.register(model))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelInfo for ModelRegistry {
    fn get_model(&self, name: &str) -> Option<Arc<StudioModel>> {
        self.models.get(name).cloned()
    }
}
