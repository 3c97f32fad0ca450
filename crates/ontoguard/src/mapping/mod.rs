//! Field mapping engine: assigning dataset columns to ontology properties.
//!
//! Three interchangeable strategies implement the [`FieldMapper`] capability
//! trait; callers select one by configuration:
//!
//! - [`EvidenceMapper`] — scores pairs from feature-vector evidence,
//!   optionally consulting an external similarity service.
//! - [`HeuristicMapper`] — deterministic name similarity, always available.
//! - [`ExplicitMapper`] — caller-supplied ground truth, confidence 1.0.
//!
//! The first two share the optimal-assignment path in [`assignment`]: a
//! complete bipartite score matrix solved as a maximum-weight matching, so
//! two columns never both claim the best-scoring property while a third
//! property goes unmapped.

mod assignment;
mod evidence;
mod explicit;
mod heuristic;

pub use evidence::{EvidenceConfig, EvidenceMapper};
pub use explicit::ExplicitMapper;
pub use heuristic::HeuristicMapper;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MappingError;
use crate::feature::Column;
use crate::ontology::{OntologyProperty, OntologySchema};

/// One resolved mapping entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedField {
    /// The ontology property the column maps to.
    pub property_uri: String,
    /// Confidence of the assignment, in `[0, 1]`.
    pub confidence: f64,
}

/// The resolved column-to-property assignment for a dataset.
///
/// Built once per run and read-only afterwards. Unless many-to-one is
/// explicitly enabled, a column maps to at most one property and a property
/// is targeted by at most one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Entries in column declaration order.
    pub entries: IndexMap<String, MappedField>,
    /// Required properties no column was mapped to (non-strict mode only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmapped_required: Vec<String>,
}

impl FieldMapping {
    /// Look up the entry for a column.
    pub fn get(&self, column: &str) -> Option<&MappedField> {
        self.entries.get(column)
    }

    /// Iterate entries in column declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MappedField)> {
        self.entries.iter()
    }

    /// Number of mapped columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no column was mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any column targets the given property.
    pub fn targets_property(&self, uri: &str) -> bool {
        self.entries.values().any(|m| m.property_uri == uri)
    }
}

/// Configuration shared by the mapping strategies.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    /// Pairs scoring below this confidence are excluded from the match even
    /// if the matching would otherwise select them.
    pub min_confidence: f64,
    /// Strict mode: unmapped required properties become errors instead of
    /// warnings.
    pub strict: bool,
    /// Allow several columns to target the same property (per-column argmax
    /// instead of one-to-one matching).
    pub allow_many_to_one: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            strict: false,
            allow_many_to_one: false,
        }
    }
}

/// Capability trait over the mapping strategies.
pub trait FieldMapper: Send + Sync {
    /// Produce a mapping for the given columns against the schema.
    ///
    /// Fails with [`MappingError::EmptySchema`] when the schema has no
    /// properties, and in strict mode when a required property ends up
    /// unmapped. Strategy-specific failures (e.g. a similarity service
    /// error) propagate as the corresponding `MappingError` variant.
    fn map(
        &self,
        columns: &[Column],
        schema: &OntologySchema,
    ) -> Result<FieldMapping, MappingError>;

    /// Strategy name, for logging and diagnostics.
    fn name(&self) -> &str;
}

/// Turn a complete score matrix into a mapping, honoring the configured
/// threshold, uniqueness mode, and required-property policy.
///
/// `properties` must be the schema's URI-sorted property list and `scores`
/// must be indexed `[column][property]` against that order; this is what
/// makes exact ties resolve to the earliest column, then the lexically
/// smallest URI.
pub(crate) fn resolve_assignments(
    columns: &[Column],
    properties: &[&OntologyProperty],
    scores: &[Vec<f64>],
    config: &MappingConfig,
) -> Result<FieldMapping, MappingError> {
    let chosen: Vec<Option<usize>> = if config.allow_many_to_one {
        scores.iter().map(|row| argmax(row)).collect()
    } else {
        assignment::max_weight_assignment(scores)
    };

    let mut mapping = FieldMapping::default();
    for (col_idx, column) in columns.iter().enumerate() {
        let Some(prop_idx) = chosen.get(col_idx).copied().flatten() else {
            continue;
        };
        let confidence = scores[col_idx][prop_idx];
        if confidence < config.min_confidence {
            debug!(
                column = %column.name,
                property = %properties[prop_idx].uri,
                confidence,
                "assignment below confidence threshold, column left unmapped"
            );
            continue;
        }
        mapping.entries.insert(
            column.name.clone(),
            MappedField {
                property_uri: properties[prop_idx].uri.clone(),
                confidence,
            },
        );
    }

    apply_required_policy(mapping, properties.iter().copied(), config)
}

/// Check required properties after assignment: error in strict mode, warn
/// and record otherwise.
pub(crate) fn apply_required_policy<'a>(
    mut mapping: FieldMapping,
    properties: impl Iterator<Item = &'a OntologyProperty>,
    config: &MappingConfig,
) -> Result<FieldMapping, MappingError> {
    for property in properties {
        if property.required && !mapping.targets_property(&property.uri) {
            if config.strict {
                return Err(MappingError::RequiredPropertyUnmapped {
                    uri: property.uri.clone(),
                });
            }
            warn!(property = %property.uri, "required property has no mapped column");
            mapping.unmapped_required.push(property.uri.clone());
        }
    }
    Ok(mapping)
}

/// Index of the row maximum; the first maximum wins on exact ties.
fn argmax(row: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in row.iter().enumerate() {
        match best {
            Some((_, b)) if score <= b => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}
