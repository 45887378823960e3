//! Cluster id to business segment labels
//!
//! The labels were assigned by inspecting the clusters of one training run, so
//! they are configuration rather than a property of the model. A retrained
//! model may order its clusters differently.

use crate::model::ClusterId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const DEFAULT_SEGMENTS: [(usize, &str); 4] = [
    (0, "Top Customer (Loyal, Big Spenders)"),
    (1, "High Value Customer (Active, Recent Buyer)"),
    (2, "Medium Value Customer"),
    (3, "Low Value / At-Risk Customer (Infrequent Buyer)"),
];

/// Lookup table from cluster id to segment label
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HashMap<String, String>")]
pub struct SegmentMap {
    labels: BTreeMap<usize, String>,
}

impl SegmentMap {
    pub fn new(labels: impl IntoIterator<Item = (usize, String)>) -> Self {
        Self {
            labels: labels.into_iter().collect(),
        }
    }

    /// Label for `cluster`, or `Unknown Cluster (<id>)` when unmapped
    pub fn name(&self, cluster: ClusterId) -> String {
        self.labels
            .get(&cluster.0)
            .cloned()
            .unwrap_or_else(|| format!("Unknown Cluster ({})", cluster))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for SegmentMap {
    fn default() -> Self {
        Self::new(
            DEFAULT_SEGMENTS
                .iter()
                .map(|&(id, label)| (id, label.to_string())),
        )
    }
}

impl TryFrom<HashMap<String, String>> for SegmentMap {
    type Error = String;

    fn try_from(raw: HashMap<String, String>) -> Result<Self, Self::Error> {
        let mut labels = BTreeMap::new();
        for (key, label) in raw {
            let id = key
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("segment key '{}' is not a cluster id", key))?;
            labels.insert(id, label);
        }
        Ok(Self { labels })
    }
}

/// Map a cluster id to its label using the built-in table
pub fn map_cluster_to_name(cluster: ClusterId) -> String {
    SegmentMap::default().name(cluster)
}
