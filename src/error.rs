//! Error types for loading artifacts and predicting segments

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Broad category of a [`PredictionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An artifact file does not exist
    ModelNotFound,
    /// An artifact exists but could not be read or deserialized
    ModelLoad,
    /// Transforming the inputs or predicting the cluster failed
    Prediction,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ModelNotFound => write!(f, "model not found"),
            ErrorKind::ModelLoad => write!(f, "model load"),
            ErrorKind::Prediction => write!(f, "prediction"),
        }
    }
}

/// Failure of a single prediction run, carrying a user-facing message
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Error: Model file not found. Ensure models are in {}\nDetail: {detail}", model_dir.display())]
    ModelNotFound { model_dir: PathBuf, detail: String },

    #[error("Error loading models: {detail}")]
    ModelLoad { detail: String },

    #[error("Error during prediction: {detail}")]
    Prediction { detail: String },
}

impl PredictionError {
    pub fn not_found(model_dir: &Path, detail: impl fmt::Display) -> Self {
        Self::ModelNotFound {
            model_dir: model_dir.to_path_buf(),
            detail: detail.to_string(),
        }
    }

    pub fn load(detail: impl fmt::Display) -> Self {
        Self::ModelLoad {
            detail: detail.to_string(),
        }
    }

    pub fn prediction(detail: impl fmt::Display) -> Self {
        Self::Prediction {
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            Self::ModelLoad { .. } => ErrorKind::ModelLoad,
            Self::Prediction { .. } => ErrorKind::Prediction,
        }
    }

    /// Underlying cause without the user-facing prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::ModelNotFound { detail, .. }
            | Self::ModelLoad { detail }
            | Self::Prediction { detail } => detail,
        }
    }
}

/// Error raised by a single transformer or by the clustering model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("The Box-Cox transformation can only be applied to strictly positive data, got {0}")]
    NonPositiveInput(f64),

    #[error("transformed value for {feature} is not finite ({value})")]
    NonFinite { feature: &'static str, value: f64 },

    #[error("X has {found} features, but the model is expecting {expected} features as input")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid clustering model: {0}")]
    InvalidModel(String),
}
