use crate::model_artifact::{CreditModel, InferenceError, LoadedModel, ModelInfo};
use crate::models::CardFeatures;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    /// No model was loaded at startup.
    #[error("credit model is not loaded")]
    ModelUnavailable,
    #[error("model produced a non-finite score: {0}")]
    NonFinitePrediction(f64),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Applies the pre-trained credit model to card features.
///
/// Cheap to clone; the model itself is shared read-only between requests.
#[derive(Clone, Default)]
pub struct Scorer {
    model: Option<Arc<dyn CreditModel>>,
    info: Option<ModelInfo>,
}

impl Scorer {
    pub fn new(model: Arc<dyn CreditModel>) -> Self {
        Self {
            model: Some(model),
            info: None,
        }
    }

    /// A scorer with no model; every call fails with [`ScoreError::ModelUnavailable`].
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_loaded(loaded: Option<LoadedModel>) -> Self {
        match loaded {
            Some(loaded) => Self {
                model: Some(loaded.model),
                info: Some(loaded.info),
            },
            None => Self::unavailable(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.info.as_ref()
    }

    pub fn score(&self, features: &CardFeatures) -> Result<f64, ScoreError> {
        let model = self.model.as_ref().ok_or(ScoreError::ModelUnavailable)?;

        let score = model.predict(&features.to_vector())?;
        if !score.is_finite() {
            return Err(ScoreError::NonFinitePrediction(score));
        }

        Ok(score)
    }
}
