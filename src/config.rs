//! Runtime configuration: where the artifacts live and how clusters are labelled

use crate::model::ArtifactNames;
use crate::segment::SegmentMap;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory containing the five model artifacts
    pub model_dir: PathBuf,
    /// Artifact file names inside `model_dir`
    pub artifacts: ArtifactNames,
    /// Cluster id to segment label table
    pub segments: SegmentMap,
}

impl AppConfig {
    /// Load configuration from a TOML or JSON file; missing keys keep their defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .with_context(|| format!("Failed to read configuration {}", path.as_ref().display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
            artifacts: ArtifactNames::default(),
            segments: SegmentMap::default(),
        }
    }
}
