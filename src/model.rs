//! Pre-fitted segmentation model: per-feature transformers plus K-Means centroids

use crate::data::{CustomerFeatures, Feature};
use crate::error::{ModelError, PredictionError};
use crate::transform::FeatureTransformer;
use linfa_clustering::KMeans;
use linfa_nn::distance::{Distance, L2Dist};
use ndarray::{Array1, Array2, ArrayView1};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Cluster label emitted by the clustering model
///
/// Only meaningful relative to the training run that produced the centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fitted K-Means model reduced to its centroids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KMeansArtifact", into = "KMeansArtifact")]
pub struct KMeansModel {
    /// Cluster centroids, one row per cluster id
    centroids: Array2<f64>,
}

impl KMeansModel {
    pub fn new(centroids: Array2<f64>) -> Result<Self, ModelError> {
        if centroids.nrows() == 0 || centroids.ncols() == 0 {
            return Err(ModelError::InvalidModel(
                "centroid matrix must not be empty".to_string(),
            ));
        }
        if centroids.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidModel(
                "centroids must be finite".to_string(),
            ));
        }
        Ok(Self { centroids })
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.centroids.ncols()
    }

    /// Assign a feature vector to its nearest centroid
    ///
    /// Ties go to the lowest cluster id.
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<ClusterId, ModelError> {
        if features.len() != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features(),
                found: features.len(),
            });
        }

        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for (cluster_idx, centroid) in self.centroids.outer_iter().enumerate() {
            let distance = L2Dist.rdistance(features, centroid);
            if distance < min_distance {
                min_distance = distance;
                closest_cluster = cluster_idx;
            }
        }

        Ok(ClusterId(closest_cluster))
    }
}

impl From<&KMeans<f64, L2Dist>> for KMeansModel {
    fn from(model: &KMeans<f64, L2Dist>) -> Self {
        Self {
            centroids: model.centroids().clone(),
        }
    }
}

/// On-disk layout of the clustering artifact
#[derive(Debug, Serialize, Deserialize)]
struct KMeansArtifact {
    centroids: Vec<Vec<f64>>,
}

impl TryFrom<KMeansArtifact> for KMeansModel {
    type Error = ModelError;

    fn try_from(artifact: KMeansArtifact) -> Result<Self, Self::Error> {
        let n_clusters = artifact.centroids.len();
        let n_features = artifact.centroids.first().map_or(0, Vec::len);
        if artifact.centroids.iter().any(|row| row.len() != n_features) {
            return Err(ModelError::InvalidModel(
                "centroid rows have different lengths".to_string(),
            ));
        }

        let flat: Vec<f64> = artifact.centroids.into_iter().flatten().collect();
        let centroids = Array2::from_shape_vec((n_clusters, n_features), flat)
            .map_err(|e| ModelError::InvalidModel(e.to_string()))?;
        Self::new(centroids)
    }
}

impl From<KMeansModel> for KMeansArtifact {
    fn from(model: KMeansModel) -> Self {
        Self {
            centroids: model
                .centroids
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
        }
    }
}

/// File names of the five artifacts inside the model directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtifactNames {
    pub recency: String,
    pub frequency: String,
    pub monetary: String,
    pub discount: String,
    pub clustering: String,
}

impl ArtifactNames {
    pub fn transformer(&self, feature: Feature) -> &str {
        match feature {
            Feature::Recency => &self.recency,
            Feature::Frequency => &self.frequency,
            Feature::Monetary => &self.monetary,
            Feature::Discount => &self.discount,
        }
    }
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            recency: Feature::Recency.default_artifact(),
            frequency: Feature::Frequency.default_artifact(),
            monetary: Feature::Monetary.default_artifact(),
            discount: Feature::Discount.default_artifact(),
            clustering: "kmeans_clustering_model.json".to_string(),
        }
    }
}

/// The four fitted transformers and the clustering model, loaded together
#[derive(Debug, Clone)]
pub struct SegmentModel {
    /// Transformers in [`Feature::ORDER`]
    transformers: [FeatureTransformer; 4],
    clustering: KMeansModel,
}

impl SegmentModel {
    pub fn new(
        transformers: [FeatureTransformer; 4],
        clustering: KMeansModel,
    ) -> Result<Self, PredictionError> {
        if clustering.n_features() != Feature::ORDER.len() {
            return Err(PredictionError::load(ModelError::DimensionMismatch {
                expected: Feature::ORDER.len(),
                found: clustering.n_features(),
            }));
        }
        Ok(Self {
            transformers,
            clustering,
        })
    }

    /// Load all artifacts from `model_dir`
    pub fn load(model_dir: &Path, names: &ArtifactNames) -> Result<Self, PredictionError> {
        info!(model_dir = %model_dir.display(), "Loading segmentation model");

        let [recency, frequency, monetary, discount] =
            Feature::ORDER.map(|feature| model_dir.join(names.transformer(feature)));
        let transformers: [FeatureTransformer; 4] = [
            read_artifact(model_dir, &recency)?,
            read_artifact(model_dir, &frequency)?,
            read_artifact(model_dir, &monetary)?,
            read_artifact(model_dir, &discount)?,
        ];
        let clustering: KMeansModel = read_artifact(model_dir, &model_dir.join(&names.clustering))?;

        info!(
            clusters = clustering.n_clusters(),
            methods = ?transformers.each_ref().map(FeatureTransformer::method),
            "Segmentation model loaded"
        );

        Self::new(transformers, clustering)
    }

    pub fn transformer(&self, feature: Feature) -> &FeatureTransformer {
        &self.transformers[feature.index()]
    }

    pub fn clustering(&self) -> &KMeansModel {
        &self.clustering
    }

    /// Transform raw inputs into the clustering feature vector
    pub fn transform(&self, customer: &CustomerFeatures) -> Result<Array1<f64>, ModelError> {
        let raw = customer.to_array();
        let mut vector = Vec::with_capacity(raw.len());
        for ((feature, transformer), x) in Feature::ORDER.iter().zip(&self.transformers).zip(raw) {
            let value = transformer.transform(x)?;
            if !value.is_finite() {
                return Err(ModelError::NonFinite {
                    feature: feature.name(),
                    value,
                });
            }
            vector.push(value);
        }
        Ok(Array1::from(vector))
    }

    /// Predict the cluster id of one customer
    pub fn predict(&self, customer: &CustomerFeatures) -> Result<ClusterId, PredictionError> {
        let features = self
            .transform(customer)
            .map_err(PredictionError::prediction)?;
        debug!(?features, "Transformed feature vector");

        let cluster = self
            .clustering
            .predict(features.view())
            .map_err(PredictionError::prediction)?;
        debug!(%cluster, "Predicted cluster");
        Ok(cluster)
    }
}

fn read_artifact<T: DeserializeOwned>(model_dir: &Path, path: &Path) -> Result<T, PredictionError> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            PredictionError::not_found(model_dir, format!("{}: '{}'", e, path.display()))
        }
        _ => PredictionError::load(format!("{}: {}", path.display(), e)),
    })?;

    serde_json::from_str(&contents)
        .map_err(|e| PredictionError::load(format!("{}: {}", path.display(), e)))
}

/// Load the artifacts under their default names and predict one customer
///
/// Artifacts are read fresh on every call.
pub fn predict_segment(
    model_dir: impl AsRef<Path>,
    customer: &CustomerFeatures,
) -> Result<ClusterId, PredictionError> {
    let model = SegmentModel::load(model_dir.as_ref(), &ArtifactNames::default())?;
    model.predict(customer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transform::Standardization;
    use ndarray::array;

    fn create_test_model() -> SegmentModel {
        let identity = FeatureTransformer::Standard(Standardization::new(0.0, 1.0));
        let clustering = KMeansModel::new(array![
            [0.0, 0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0, 0.0],
            [0.0, 10.0, 0.0, 0.0],
            [0.0, 0.0, 10.0, 10.0],
        ])
        .unwrap();
        SegmentModel::new(
            [identity.clone(), identity.clone(), identity.clone(), identity],
            clustering,
        )
        .unwrap()
    }

    #[test]
    fn test_predict_nearest_centroid() {
        let model = create_test_model();
        let cases = [
            ([1.0, 1.0, 1.0, 1.0], 0),
            ([9.0, 1.0, 0.0, 0.0], 1),
            ([0.0, 12.0, 0.0, 0.0], 2),
            ([0.0, 0.0, 8.0, 9.0], 3),
        ];
        for (values, expected) in cases {
            let cluster = model.predict(&CustomerFeatures::from(values)).unwrap();
            assert_eq!(cluster, ClusterId(expected), "input {:?}", values);
        }
    }

    #[test]
    fn test_ties_go_to_lowest_id() {
        let model = create_test_model();
        let cluster = model
            .predict(&CustomerFeatures::new(5.0, 0.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(cluster, ClusterId(0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = create_test_model();
        let result = model.clustering().predict(array![1.0, 2.0].view());
        assert_eq!(
            result,
            Err(ModelError::DimensionMismatch {
                expected: 4,
                found: 2
            })
        );
    }

    #[test]
    fn test_non_finite_input_is_prediction_error() {
        let model = create_test_model();
        let err = model
            .predict(&CustomerFeatures::new(f64::NAN, 1.0, 1.0, 1.0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Prediction);
        assert!(err.to_string().contains("recency"));
    }

    #[test]
    fn test_model_must_take_four_features() {
        let identity = FeatureTransformer::Standard(Standardization::new(0.0, 1.0));
        let clustering = KMeansModel::new(array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]).unwrap();
        let err = SegmentModel::new(
            [identity.clone(), identity.clone(), identity.clone(), identity],
            clustering,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoad);
    }

    #[test]
    fn test_parse_clustering_artifact() {
        let model: KMeansModel =
            serde_json::from_str(r#"{"centroids": [[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]}"#).unwrap();
        assert_eq!(model.n_clusters(), 3);
        assert_eq!(model.n_features(), 2);

        let ragged = serde_json::from_str::<KMeansModel>(r#"{"centroids": [[0.0, 1.0], [2.0]]}"#);
        assert!(ragged.is_err());

        let empty = serde_json::from_str::<KMeansModel>(r#"{"centroids": []}"#);
        assert!(empty.is_err());
    }

    #[test]
    fn test_transform_keeps_feature_columns() {
        let shift = |mean| FeatureTransformer::Standard(Standardization::new(mean, 1.0));
        let model = SegmentModel::new(
            [shift(1.0), shift(2.0), shift(3.0), shift(4.0)],
            KMeansModel::new(array![[0.0, 0.0, 0.0, 0.0]]).unwrap(),
        )
        .unwrap();

        let features = model
            .transform(&CustomerFeatures::new(11.0, 22.0, 33.0, 44.0))
            .unwrap();
        assert_eq!(features, array![10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_transformer_lookup_by_feature() {
        let model = create_test_model();
        assert_eq!(model.transformer(Feature::Monetary).method(), "standard");
    }
}
