//! Fitted single-feature transformers
//!
//! Each input dimension is scaled by its own transformer before the values are
//! concatenated into the clustering feature vector. Power transforms follow the
//! usual Yeo-Johnson and Box-Cox definitions, optionally followed by a z-score
//! standardization fitted on the transformed training data.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Z-score parameters applied after a power transform, or on their own
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardization {
    pub mean: f64,
    pub scale: f64,
}

impl Standardization {
    pub fn new(mean: f64, scale: f64) -> Self {
        Self { mean, scale }
    }

    pub fn apply(&self, value: f64) -> f64 {
        // A constant training column has zero spread; leave it unscaled.
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        (value - self.mean) / scale
    }
}

/// A transformer fitted on one feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransformerArtifact", into = "TransformerArtifact")]
pub enum FeatureTransformer {
    YeoJohnson {
        lambda: f64,
        standardize: Option<Standardization>,
    },
    BoxCox {
        lambda: f64,
        standardize: Option<Standardization>,
    },
    Standard(Standardization),
}

impl FeatureTransformer {
    /// Map one raw value into the space the clustering model was fitted in
    pub fn transform(&self, value: f64) -> Result<f64, ModelError> {
        match self {
            FeatureTransformer::YeoJohnson {
                lambda,
                standardize,
            } => Ok(standardized(yeo_johnson(value, *lambda), standardize)),
            FeatureTransformer::BoxCox {
                lambda,
                standardize,
            } => {
                if value <= 0.0 || value.is_nan() {
                    return Err(ModelError::NonPositiveInput(value));
                }
                Ok(standardized(box_cox(value, *lambda), standardize))
            }
            FeatureTransformer::Standard(scaler) => Ok(scaler.apply(value)),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            FeatureTransformer::YeoJohnson { .. } => "yeo-johnson",
            FeatureTransformer::BoxCox { .. } => "box-cox",
            FeatureTransformer::Standard(_) => "standard",
        }
    }
}

fn standardized(value: f64, standardize: &Option<Standardization>) -> f64 {
    match standardize {
        Some(scaler) => scaler.apply(value),
        None => value,
    }
}

fn is_zero(lambda: f64) -> bool {
    lambda.abs() < f64::EPSILON
}

fn yeo_johnson(x: f64, lambda: f64) -> f64 {
    if x >= 0.0 {
        if is_zero(lambda) {
            x.ln_1p()
        } else {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        }
    } else if is_zero(lambda - 2.0) {
        -(-x).ln_1p()
    } else {
        -((1.0 - x).powf(2.0 - lambda) - 1.0) / (2.0 - lambda)
    }
}

fn box_cox(x: f64, lambda: f64) -> f64 {
    if is_zero(lambda) {
        x.ln()
    } else {
        (x.powf(lambda) - 1.0) / lambda
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Method {
    YeoJohnson,
    BoxCox,
    Standard,
}

/// On-disk layout of a transformer artifact
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransformerArtifact {
    method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lambda: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
}

impl TryFrom<TransformerArtifact> for FeatureTransformer {
    type Error = String;

    fn try_from(artifact: TransformerArtifact) -> Result<Self, Self::Error> {
        let standardize = match (artifact.mean, artifact.scale) {
            (Some(mean), Some(scale)) => Some(Standardization::new(mean, scale)),
            (None, None) => None,
            _ => return Err("`mean` and `scale` must be given together".to_string()),
        };

        match artifact.method {
            Method::YeoJohnson | Method::BoxCox => {
                let lambda = artifact.lambda.ok_or_else(|| {
                    "power transformer artifact is missing `lambda`".to_string()
                })?;
                if !lambda.is_finite() {
                    return Err(format!("`lambda` must be finite, got {}", lambda));
                }
                Ok(if artifact.method == Method::YeoJohnson {
                    FeatureTransformer::YeoJohnson {
                        lambda,
                        standardize,
                    }
                } else {
                    FeatureTransformer::BoxCox {
                        lambda,
                        standardize,
                    }
                })
            }
            Method::Standard => standardize
                .map(FeatureTransformer::Standard)
                .ok_or_else(|| "standard scaler artifact needs `mean` and `scale`".to_string()),
        }
    }
}

impl From<FeatureTransformer> for TransformerArtifact {
    fn from(transformer: FeatureTransformer) -> Self {
        let (method, lambda, standardize) = match transformer {
            FeatureTransformer::YeoJohnson {
                lambda,
                standardize,
            } => (Method::YeoJohnson, Some(lambda), standardize),
            FeatureTransformer::BoxCox {
                lambda,
                standardize,
            } => (Method::BoxCox, Some(lambda), standardize),
            FeatureTransformer::Standard(scaler) => (Method::Standard, None, Some(scaler)),
        };

        TransformerArtifact {
            method,
            lambda,
            mean: standardize.map(|s| s.mean),
            scale: standardize.map(|s| s.scale),
        }
    }
}
