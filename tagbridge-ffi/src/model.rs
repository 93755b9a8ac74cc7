//! Loaded models behind `tb_model_t` handles

use crate::error::{BoundaryError, Result};
use crate::registry::Registry;
use std::sync::Arc;
use tagbridge_core::BridgeConfig;
use tagbridge_lexicon::LexiconModel;

/// A model plus the bridge settings it was loaded with
#[derive(Debug)]
pub(crate) struct LoadedModel {
    pub(crate) model: LexiconModel,
    pub(crate) config: BridgeConfig,
}

static MODELS: Registry<Arc<LoadedModel>> = Registry::new();

pub(crate) fn load(path: &str, config_path: Option<&str>) -> Result<u64> {
    let config = match config_path {
        Some(p) => BridgeConfig::from_toml_file(p)?,
        None => BridgeConfig::default(),
    };
    let model = LexiconModel::load(path)?;
    let handle = MODELS.insert(Arc::new(LoadedModel { model, config }));
    tracing::info!(handle, path, "model loaded");
    Ok(handle)
}

/// In-flight calls keep their own reference, so freeing a model while it is
/// tagging only takes effect once those calls return
pub(crate) fn lookup(handle: u64) -> Result<Arc<LoadedModel>> {
    MODELS.get(handle).ok_or(BoundaryError::UnknownModel(handle))
}

pub(crate) fn free(handle: u64) -> bool {
    MODELS.remove(handle).is_some()
}

pub(crate) fn live() -> usize {
    MODELS.len()
}
