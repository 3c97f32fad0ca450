//! HTTP-backed similarity provider.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::feature::FeatureVector;
use crate::ontology::OntologyProperty;

use super::{check_score, SimilarityError, SimilarityProvider};

/// Default request timeout. Individual rule timeouts are handled by the
/// executor; this only bounds the mapping phase.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider that POSTs feature vectors to a scoring endpoint.
///
/// The endpoint receives `{ "features": ..., "property": ... }` and must
/// answer `{ "score": <float in [0, 1]> }`.
pub struct HttpSimilarityProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

impl HttpSimilarityProvider {
    /// Create a provider for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SimilarityError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                SimilarityError::Config(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Attach a bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Create from the `ONTOGUARD_SIMILARITY_URL` (and optional
    /// `ONTOGUARD_SIMILARITY_KEY`) environment variables.
    pub fn from_env() -> Result<Self, SimilarityError> {
        let endpoint = std::env::var("ONTOGUARD_SIMILARITY_URL").map_err(|_| {
            SimilarityError::Config(
                "ONTOGUARD_SIMILARITY_URL environment variable not set".to_string(),
            )
        })?;
        let provider = Self::new(endpoint)?;
        match std::env::var("ONTOGUARD_SIMILARITY_KEY") {
            Ok(key) => Ok(provider.with_api_key(key)),
            Err(_) => Ok(provider),
        }
    }

    fn build_headers(&self) -> Result<HeaderMap, SimilarityError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref key) = self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| SimilarityError::Config(format!("invalid API key: {}", e)))?;
            headers.insert("authorization", value);
        }
        Ok(headers)
    }
}

impl SimilarityProvider for HttpSimilarityProvider {
    fn score(
        &self,
        features: &FeatureVector,
        property: &OntologyProperty,
    ) -> Result<f64, SimilarityError> {
        let body = json!({
            "features": features,
            "property": {
                "uri": property.uri,
                "name": property.name,
                "description": property.description,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| SimilarityError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(SimilarityError::Request(format!("{}: {}", status, text)));
        }

        let parsed: ScoreResponse = response
            .json()
            .map_err(|e| SimilarityError::Request(format!("malformed response: {}", e)))?;

        check_score(parsed.score)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_endpoint_is_request_error() {
        let provider = HttpSimilarityProvider::new("http://127.0.0.1:1/score").unwrap();
        let features = FeatureVector::new();
        let property = OntologyProperty::new("p:x", "x");

        let err = provider.score(&features, &property).unwrap_err();
        assert!(matches!(err, SimilarityError::Request(_)));
    }
}
