//! Mock similarity provider for deterministic tests.

use std::collections::HashMap;

use crate::feature::FeatureVector;
use crate::ontology::OntologyProperty;

use super::{check_score, SimilarityError, SimilarityProvider};

/// The categorical feature the mock uses to identify the scored column.
/// Tests set it via `FeatureVector::with_categorical("column_name", ...)`.
pub const COLUMN_NAME_FEATURE: &str = "column_name";

/// Provider returning scores from a fixed table keyed by
/// `(column name, property URI)`.
#[derive(Debug, Clone, Default)]
pub struct MockSimilarityProvider {
    scores: HashMap<(String, String), f64>,
    default_score: f64,
    fail: bool,
}

impl MockSimilarityProvider {
    /// Create a provider that returns 0.0 for unknown pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the score for one `(column, property)` pair.
    pub fn with_score(
        mut self,
        column: impl Into<String>,
        property_uri: impl Into<String>,
        score: f64,
    ) -> Self {
        self.scores
            .insert((column.into(), property_uri.into()), score);
        self
    }

    /// Set the score returned for pairs not in the table.
    pub fn with_default(mut self, score: f64) -> Self {
        self.default_score = score;
        self
    }

    /// Make every call fail, for exercising error propagation.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl SimilarityProvider for MockSimilarityProvider {
    fn score(
        &self,
        features: &FeatureVector,
        property: &OntologyProperty,
    ) -> Result<f64, SimilarityError> {
        if self.fail {
            return Err(SimilarityError::Request("mock failure".to_string()));
        }

        let column = features
            .categorical
            .get(COLUMN_NAME_FEATURE)
            .cloned()
            .unwrap_or_default();

        let score = self
            .scores
            .get(&(column, property.uri.clone()))
            .copied()
            .unwrap_or(self.default_score);

        check_score(score)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
