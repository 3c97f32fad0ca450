//! Explicit mapping strategy: caller-supplied column-to-property dictionary.

use indexmap::IndexMap;
use tracing::warn;

use crate::error::MappingError;
use crate::feature::Column;
use crate::ontology::OntologySchema;

use super::{apply_required_policy, FieldMapper, FieldMapping, MappedField, MappingConfig};

/// Maps columns from a fixed dictionary. Entries are ground truth, so every
/// assignment gets confidence 1.0 and the confidence threshold does not
/// apply.
///
/// In strict mode an entry naming an unknown column or property is an error;
/// otherwise it is logged and skipped.
#[derive(Debug, Clone, Default)]
pub struct ExplicitMapper {
    assignments: IndexMap<String, String>,
    config: MappingConfig,
}

impl ExplicitMapper {
    /// Create an empty mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from `(column, property URI)` pairs.
    pub fn from_pairs<I, C, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        Self {
            assignments: pairs
                .into_iter()
                .map(|(c, p)| (c.into(), p.into()))
                .collect(),
            config: MappingConfig::default(),
        }
    }

    /// Add one assignment.
    pub fn with_assignment(
        mut self,
        column: impl Into<String>,
        property_uri: impl Into<String>,
    ) -> Self {
        self.assignments.insert(column.into(), property_uri.into());
        self
    }

    /// Set the mapping configuration.
    pub fn with_config(mut self, config: MappingConfig) -> Self {
        self.config = config;
        self
    }
}

impl FieldMapper for ExplicitMapper {
    fn map(
        &self,
        columns: &[Column],
        schema: &OntologySchema,
    ) -> Result<FieldMapping, MappingError> {
        if schema.is_empty() {
            return Err(MappingError::EmptySchema);
        }

        let mut mapping = FieldMapping::default();
        // Iterate columns, not the dictionary, so entries land in column
        // declaration order regardless of how the dictionary was built.
        for column in columns {
            let Some(uri) = self.assignments.get(&column.name) else {
                continue;
            };
            if schema.get(uri).is_none() {
                if self.config.strict {
                    return Err(MappingError::UnknownProperty { uri: uri.clone() });
                }
                warn!(column = %column.name, property = %uri, "explicit mapping references unknown property, skipping");
                continue;
            }
            if !self.config.allow_many_to_one && mapping.targets_property(uri) {
                return Err(MappingError::DuplicateTarget { uri: uri.clone() });
            }
            mapping.entries.insert(
                column.name.clone(),
                MappedField {
                    property_uri: uri.clone(),
                    confidence: 1.0,
                },
            );
        }

        for column_name in self.assignments.keys() {
            if !columns.iter().any(|c| &c.name == column_name) {
                if self.config.strict {
                    return Err(MappingError::UnknownColumn {
                        column: column_name.clone(),
                    });
                }
                warn!(column = %column_name, "explicit mapping references unknown column, skipping");
            }
        }

        apply_required_policy(mapping, schema.properties().iter(), &self.config)
    }

    fn name(&self) -> &str {
        "explicit"
    }
}
