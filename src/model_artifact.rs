//! Pre-trained credit model artifacts.
//!
//! The model is a regressor exported to ONNX (e.g. scikit-learn through
//! skl2onnx) taking one `[1, 4]` float tensor ordered as [`FEATURE_NAMES`]
//! and producing a single score. It is loaded once at startup and shared by
//! every request.

use crate::models::FEATURE_NAMES;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Arc, Mutex};

const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// A pre-trained predictive function over the four card features.
pub trait CreditModel: Send + Sync {
    /// Predict a credit score from features ordered as [`FEATURE_NAMES`].
    fn predict(&self, features: &[f64; 4]) -> Result<f64, InferenceError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("model inference failed: {0}")]
pub struct InferenceError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model artifact not found at {0}")]
    NotFound(String),
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load ONNX model: {0}")]
    Onnx(String),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Identifying details of the model in use, reported by `/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub input: String,
    pub output: String,
    /// Hex SHA-256 of the artifact bytes.
    pub sha256: String,
}

/// ONNX Runtime session wrapped as a [`CreditModel`].
pub struct OnnxCreditModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxCreditModel {
    /// Build a session from serialized ONNX bytes.
    pub fn from_memory(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        let session = Session::builder()
            .map_err(onnx_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(onnx_error)?
            .with_intra_threads(1)
            .map_err(onnx_error)?
            .commit_from_memory(bytes)
            .map_err(onnx_error)?;

        let inputs = session.inputs();
        if inputs.len() != 1 {
            return Err(ModelLoadError::Invalid(format!(
                "expected a single input tensor, found {}",
                inputs.len()
            )));
        }
        check_input_width(inputs[0].dtype())?;
        let input_name = inputs[0].name().to_string();

        let output_names: Vec<&str> = session.outputs().iter().map(|o| o.name()).collect();
        let output_name = select_output(&output_names)
            .ok_or_else(|| ModelLoadError::Invalid("model has no outputs".to_string()))?
            .to_string();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl CreditModel for OnnxCreditModel {
    fn predict(&self, features: &[f64; 4]) -> Result<f64, InferenceError> {
        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_array(([1_i64, FEATURE_COUNT as i64], data.into_boxed_slice()))
            .map_err(|e| InferenceError(format!("failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError(format!("lock error: {}", e)))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| InferenceError(e.to_string()))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| InferenceError(format!("missing output '{}'", self.output_name)))?;

        // skl2onnx emits float32 by default; double-precision exports are also accepted.
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return first_value(data.iter().map(|&v| v as f64));
        }
        match output.try_extract_tensor::<f64>() {
            Ok((_, data)) => first_value(data.iter().copied()),
            Err(e) => Err(InferenceError(format!(
                "output '{}' is not a numeric tensor: {}",
                self.output_name, e
            ))),
        }
    }
}

fn first_value(mut values: impl Iterator<Item = f64>) -> Result<f64, InferenceError> {
    values
        .next()
        .ok_or_else(|| InferenceError("model returned an empty tensor".to_string()))
}

fn onnx_error(e: impl std::fmt::Display) -> ModelLoadError {
    ModelLoadError::Onnx(e.to_string())
}

/// Pick the score output: the first one that is not a class label.
fn select_output<'a>(names: &[&'a str]) -> Option<&'a str> {
    names
        .iter()
        .find(|name| !name.contains("label"))
        .or_else(|| names.first())
        .copied()
}

/// The input must accept `FEATURE_COUNT` columns. Dynamic dimensions are accepted.
fn check_input_width(dtype: &ValueType) -> Result<(), ModelLoadError> {
    match dtype {
        ValueType::Tensor { shape, .. } => match shape.last() {
            Some(&width) if width > 0 && width as usize != FEATURE_COUNT => {
                Err(ModelLoadError::Invalid(format!(
                    "model expects {} features, have {} ({})",
                    width,
                    FEATURE_COUNT,
                    FEATURE_NAMES.join(", ")
                )))
            }
            _ => Ok(()),
        },
        other => Err(ModelLoadError::Invalid(format!(
            "model input is not a tensor: {:?}",
            other
        ))),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// A validated model ready to serve predictions.
#[derive(Clone)]
pub struct LoadedModel {
    pub info: ModelInfo,
    pub model: Arc<dyn CreditModel>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel").field("info", &self.info).finish()
    }
}

impl LoadedModel {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, ModelLoadError> {
        let model = OnnxCreditModel::from_memory(bytes)?;

        Ok(Self {
            info: ModelInfo {
                name: name.to_string(),
                input: model.input_name().to_string(),
                output: model.output_name().to_string(),
                sha256: sha256_hex(bytes),
            },
            model: Arc::new(model),
        })
    }

    /// Load an artifact from disk. The model is named after the file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ModelLoadError::NotFound(path.display().to_string()),
            _ => ModelLoadError::Io(e),
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        let loaded = Self::from_bytes(&name, &bytes)?;
        tracing::info!(
            model = %loaded.info.name,
            input = %loaded.info.input,
            output = %loaded.info.output,
            sha256 = %loaded.info.sha256,
            path = %path.display(),
            "Credit model loaded"
        );

        Ok(loaded)
    }

    /// Load the model at startup, tolerating a missing artifact.
    ///
    /// A missing file yields `Ok(None)` so the service can run without scores.
    /// Any other failure is returned since a corrupt artifact must not be ignored.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ModelLoadError> {
        match Self::load(&path) {
            Ok(model) => Ok(Some(model)),
            Err(ModelLoadError::NotFound(path)) => {
                tracing::warn!(
                    "Model artifact '{}' not found. Predictions will not work.",
                    path
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regressor_output_is_selected() {
        assert_eq!(select_output(&["variable"]), Some("variable"));
        assert_eq!(
            select_output(&["output_label", "output_probability"]),
            Some("output_probability")
        );
        assert_eq!(select_output(&["label"]), Some("label"));
        assert_eq!(select_output(&[]), None);
    }

    #[test]
    fn test_artifact_checksum_is_stable() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_first_value_of_empty_tensor_is_an_error() {
        assert_eq!(first_value([712.5_f64, 1.0].into_iter()), Ok(712.5));
        assert!(first_value(std::iter::empty()).is_err());
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = LoadedModel::from_bytes("broken", b"not an onnx model");
        assert!(matches!(result, Err(ModelLoadError::Onnx(_))));
    }

    #[test]
    fn test_missing_file_is_tolerated() {
        let result = LoadedModel::load_optional("/nonexistent/credit-model.onnx").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_corrupt_file_fails_startup() {
        let path = std::env::temp_dir().join(format!("credit-model-{}.onnx", std::process::id()));
        std::fs::write(&path, b"\x00\x01garbage").unwrap();

        let result = LoadedModel::load_optional(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }
}
