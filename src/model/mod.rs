//! Loaded regression model and the single inference call made against it.

use std::{path::Path, sync::Arc};

use crate::error::ModelError;
use crate::features::{FeatureVector, N_FEATURES};

#[cfg(feature = "torchscript")]
mod torch;
mod xgboost;

#[cfg(feature = "torchscript")]
pub use torch::TorchRegressor;
pub use xgboost::TreeEnsemble;

/// A pre-fit regressor mapping one feature row to one value.
pub trait Regressor: Send + Sync {
    /// Width of the row the model was trained on.
    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f32]) -> Result<f32, ModelError>;

    /// Short human-readable description for logs and the health endpoint.
    fn describe(&self) -> String;
}

/// Process-wide, read-only handle to the loaded model.
pub type ModelHandle = Arc<dyn Regressor>;

/// Reads the model file once, choosing the backend by extension.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelHandle, ModelError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "json" => Ok(Arc::new(TreeEnsemble::load(path)?)),
        #[cfg(feature = "torchscript")]
        "pt" => Ok(Arc::new(TorchRegressor::load(path, N_FEATURES)?)),
        _ => Err(ModelError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Checks the model accepts the feature contract and survives one forward pass.
pub fn ensure_ready(model: &dyn Regressor) -> Result<(), ModelError> {
    if model.n_features() != N_FEATURES {
        return Err(ModelError::Corrupt(format!(
            "model expects {} features, the form produces {}",
            model.n_features(),
            N_FEATURES
        )));
    }
    model.predict(&[0.0; N_FEATURES])?;
    Ok(())
}

/// Batch-of-one inference on an encoded row.
pub fn predict(model: &dyn Regressor, features: &FeatureVector) -> Result<f32, ModelError> {
    model.predict(&features.to_array())
}
