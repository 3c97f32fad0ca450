//! Similarity service contract for the evidence-weighted mapper.
//!
//! The evidence-weighted strategy is the only mapping strategy allowed to
//! consult an external semantic-similarity service. Provider failures are
//! not degraded silently: they propagate as `MappingError::SimilarityService`
//! and callers re-run with the heuristic mapper if they want a fallback.

mod http;
mod mock;

pub use http::HttpSimilarityProvider;
pub use mock::{MockSimilarityProvider, COLUMN_NAME_FEATURE};

use thiserror::Error;

use crate::feature::FeatureVector;
use crate::ontology::OntologyProperty;

/// Errors from an external similarity service.
#[derive(Debug, Error)]
pub enum SimilarityError {
    /// Provider configuration problem (missing key, bad endpoint, ...).
    #[error("similarity provider configuration: {0}")]
    Config(String),

    /// The request itself failed (network, HTTP status, malformed body).
    #[error("similarity request failed: {0}")]
    Request(String),

    /// The service returned a score outside `[0, 1]`.
    #[error("similarity service returned score {0} outside [0, 1]")]
    InvalidScore(f64),
}

/// External semantic-similarity scoring service.
///
/// Implementations must be safe to call concurrently and idempotent: a score
/// is a pure function of the feature vector and the property.
pub trait SimilarityProvider: Send + Sync {
    /// Score how well a column with the given features matches a property.
    /// The result must lie in `[0, 1]`.
    fn score(
        &self,
        features: &FeatureVector,
        property: &OntologyProperty,
    ) -> Result<f64, SimilarityError>;

    /// Provider name, for logging.
    fn name(&self) -> &str;
}

/// Reject scores outside the contract range.
pub(crate) fn check_score(score: f64) -> Result<f64, SimilarityError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(SimilarityError::InvalidScore(score))
    }
}
