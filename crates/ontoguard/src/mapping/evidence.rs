//! Evidence-weighted mapping strategy.
//!
//! Scores each column/property pair from the column's feature vector against
//! the property's reference vector: a semantic component (external similarity
//! service, or embedding cosine when no service is configured), a numeric
//! affinity component, and a categorical overlap component. Components with
//! no evidence on either side simply drop out of the weighted average, so a
//! sparsely-profiled column still gets a meaningful score.

use std::sync::Arc;

use crate::error::MappingError;
use crate::feature::Column;
use crate::ontology::{OntologyProperty, OntologySchema};
use crate::similarity::SimilarityProvider;

use super::{resolve_assignments, FieldMapper, FieldMapping, MappingConfig};

/// Weights for the evidence components and the penalty applied when the
/// column's inferred type cannot hold the property's expected type.
#[derive(Debug, Clone)]
pub struct EvidenceConfig {
    /// Weight of the semantic component (service score or embedding cosine).
    pub semantic_weight: f64,
    /// Weight of the numeric-feature affinity component.
    pub numeric_weight: f64,
    /// Weight of the categorical-feature overlap component.
    pub categorical_weight: f64,
    /// Multiplier applied to the combined score on a type mismatch.
    pub type_mismatch_penalty: f64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.6,
            numeric_weight: 0.2,
            categorical_weight: 0.2,
            type_mismatch_penalty: 0.5,
        }
    }
}

/// Maps columns by weighted feature-vector evidence.
pub struct EvidenceMapper {
    provider: Option<Arc<dyn SimilarityProvider>>,
    config: MappingConfig,
    evidence: EvidenceConfig,
}

impl EvidenceMapper {
    /// Create a mapper with no similarity service; the semantic component
    /// falls back to embedding cosine similarity.
    pub fn new() -> Self {
        Self {
            provider: None,
            config: MappingConfig::default(),
            evidence: EvidenceConfig::default(),
        }
    }

    /// Attach an external similarity service for the semantic component.
    pub fn with_provider(mut self, provider: Arc<dyn SimilarityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the mapping configuration.
    pub fn with_config(mut self, config: MappingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the evidence weights.
    pub fn with_evidence(mut self, evidence: EvidenceConfig) -> Self {
        self.evidence = evidence;
        self
    }

    /// Combined evidence score for one pair, in `[0, 1]`.
    ///
    /// Service failures propagate; the caller decides whether to fall back
    /// to another strategy.
    fn score_pair(
        &self,
        column: &Column,
        property: &OntologyProperty,
    ) -> Result<f64, MappingError> {
        let mut weighted = 0.0f64;
        let mut weight_total = 0.0f64;

        let semantic = match &self.provider {
            Some(provider) => Some(provider.score(&column.features, property)?),
            None => property
                .reference
                .as_ref()
                .and_then(|reference| column.features.cosine_similarity(reference)),
        };
        if let Some(score) = semantic {
            weighted += self.evidence.semantic_weight * score;
            weight_total += self.evidence.semantic_weight;
        }

        if let Some(reference) = &property.reference {
            if let Some(affinity) = column.features.numeric_affinity(reference) {
                weighted += self.evidence.numeric_weight * affinity;
                weight_total += self.evidence.numeric_weight;
            }
            if let Some(overlap) = column.features.categorical_overlap(reference) {
                weighted += self.evidence.categorical_weight * overlap;
                weight_total += self.evidence.categorical_weight;
            }
        }

        if weight_total == 0.0 {
            return Ok(0.0);
        }

        let mut score = weighted / weight_total;
        if !column.inferred_type.compatible_with(property.expected_type) {
            score *= self.evidence.type_mismatch_penalty;
        }
        Ok(score)
    }
}

impl Default for EvidenceMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper for EvidenceMapper {
    fn map(
        &self,
        columns: &[Column],
        schema: &OntologySchema,
    ) -> Result<FieldMapping, MappingError> {
        if schema.is_empty() {
            return Err(MappingError::EmptySchema);
        }

        let properties = schema.sorted_properties();
        let mut scores = Vec::with_capacity(columns.len());
        for column in columns {
            let mut row = Vec::with_capacity(properties.len());
            for property in &properties {
                row.push(self.score_pair(column, property)?);
            }
            scores.push(row);
        }

        resolve_assignments(columns, &properties, &scores, &self.config)
    }

    fn name(&self) -> &str {
        "evidence"
    }
}
