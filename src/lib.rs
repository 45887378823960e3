//! SegmentCast: customer segment prediction from pre-fitted models
//!
//! Four per-feature transformers scale the recency, frequency, monetary and
//! discount values of one customer; a fitted K-Means model assigns the
//! resulting feature vector to a cluster, which is then mapped to a segment label.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod segment;
pub mod transform;

// Re-export public items for easier access
pub use cli::Args;
pub use crate::config::AppConfig;
pub use data::{CustomerFeatures, Feature};
pub use error::{ErrorKind, ModelError, PredictionError};
pub use model::{predict_segment, ArtifactNames, ClusterId, KMeansModel, SegmentModel};
pub use segment::{map_cluster_to_name, SegmentMap};
pub use transform::{FeatureTransformer, Standardization};

/// Common result type used by the application plumbing
pub type Result<T> = anyhow::Result<T>;
