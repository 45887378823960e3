//! Raw customer inputs and the fixed feature order

use std::fmt;

/// One input dimension of the segmentation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Recency,
    Frequency,
    Monetary,
    Discount,
}

impl Feature {
    /// Column order of the feature vector. Must match the order the
    /// clustering model was fitted with; a mismatch silently yields wrong clusters.
    pub const ORDER: [Feature; 4] = [
        Feature::Recency,
        Feature::Frequency,
        Feature::Monetary,
        Feature::Discount,
    ];

    /// Column of this feature in the feature vector
    pub fn index(self) -> usize {
        match self {
            Feature::Recency => 0,
            Feature::Frequency => 1,
            Feature::Monetary => 2,
            Feature::Discount => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Recency => "recency",
            Feature::Frequency => "frequency",
            Feature::Monetary => "monetary",
            Feature::Discount => "discount",
        }
    }

    /// Default artifact file name of this feature's transformer
    pub fn default_artifact(self) -> String {
        format!("transformer_{}.json", self.name())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw values for one customer, in business units
///
/// Monetary and discount are in dollars. No range checks are applied:
/// values far outside the training distribution are classified by wherever
/// the fitted transformers place them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerFeatures {
    /// Days since the last purchase
    pub recency: f64,
    /// Total number of orders
    pub frequency: f64,
    /// Total sales in dollars
    pub monetary: f64,
    /// Total discount in dollars
    pub discount: f64,
}

impl CustomerFeatures {
    pub fn new(recency: f64, frequency: f64, monetary: f64, discount: f64) -> Self {
        Self {
            recency,
            frequency,
            monetary,
            discount,
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Recency => self.recency,
            Feature::Frequency => self.frequency,
            Feature::Monetary => self.monetary,
            Feature::Discount => self.discount,
        }
    }

    /// Raw values in [`Feature::ORDER`]
    pub fn to_array(&self) -> [f64; 4] {
        Feature::ORDER.map(|feature| self.get(feature))
    }
}

impl From<[f64; 4]> for CustomerFeatures {
    fn from(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_recency_frequency_monetary_discount() {
        let names: Vec<&str> = Feature::ORDER.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["recency", "frequency", "monetary", "discount"]);
        for (idx, feature) in Feature::ORDER.iter().enumerate() {
            assert_eq!(feature.index(), idx);
        }
    }

    #[test]
    fn test_to_array_follows_order() {
        let customer = CustomerFeatures::new(20.0, 10.0, 7000.0, 1100.0);
        assert_eq!(customer.to_array(), [20.0, 10.0, 7000.0, 1100.0]);
        assert_eq!(CustomerFeatures::from(customer.to_array()), customer);
    }

    #[test]
    fn test_default_artifact_names() {
        assert_eq!(
            Feature::Discount.default_artifact(),
            "transformer_discount.json"
        );
    }
}
