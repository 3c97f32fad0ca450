//! Ontology schema: the read-only catalog of canonical properties.

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureVector, ValueType};

/// A canonical, URI-identified field definition from a standard such as FHIR
/// or Schema.org. Validation rules attach to properties by URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyProperty {
    /// Unique identifier, e.g. `https://hl7.org/fhir/Patient.birthDate`.
    pub uri: String,
    /// Human-readable name, e.g. `birthDate`.
    pub name: String,
    /// Alternative names the property is known under in the wild.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Expected primitive type of mapped values.
    #[serde(default)]
    pub expected_type: ValueType,
    /// Whether a complete dataset is expected to map this property.
    #[serde(default)]
    pub required: bool,
    /// Reference feature vector for evidence-weighted mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<FeatureVector>,
    /// Textual description, usable by external similarity services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OntologyProperty {
    /// Create a property with the given URI and name.
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            aliases: Vec::new(),
            expected_type: ValueType::Unknown,
            required: false,
            reference: None,
            description: None,
        }
    }

    /// Add an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the expected value type.
    pub fn with_type(mut self, expected_type: ValueType) -> Self {
        self.expected_type = expected_type;
        self
    }

    /// Mark the property as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the reference feature vector.
    pub fn with_reference(mut self, reference: FeatureVector) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The last segment of the URI (after `/`, `#` or `:`), often the most
    /// name-like part for heuristic matching.
    pub fn uri_segment(&self) -> &str {
        self.uri
            .rsplit(|c| c == '/' || c == '#' || c == ':')
            .next()
            .unwrap_or(&self.uri)
    }
}

/// Read-only catalog of ontology properties, loaded from an external schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologySchema {
    properties: Vec<OntologyProperty>,
}

impl OntologySchema {
    /// Create a schema from a list of properties.
    pub fn from_properties(properties: Vec<OntologyProperty>) -> Self {
        Self { properties }
    }

    /// All properties in declaration order.
    pub fn properties(&self) -> &[OntologyProperty] {
        &self.properties
    }

    /// Look up a property by URI.
    pub fn get(&self, uri: &str) -> Option<&OntologyProperty> {
        self.properties.iter().find(|p| p.uri == uri)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the schema has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Properties sorted by URI. Mapping strategies score against this order
    /// so that exact ties resolve to the lexically smallest URI.
    pub(crate) fn sorted_properties(&self) -> Vec<&OntologyProperty> {
        let mut sorted: Vec<&OntologyProperty> = self.properties.iter().collect();
        sorted.sort_by(|a, b| a.uri.cmp(&b.uri));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_segment() {
        let p = OntologyProperty::new("https://hl7.org/fhir/Patient.birthDate", "birthDate");
        assert_eq!(p.uri_segment(), "Patient.birthDate");

        let p = OntologyProperty::new("schema:birthDate", "birthDate");
        assert_eq!(p.uri_segment(), "birthDate");

        let p = OntologyProperty::new("plain", "plain");
        assert_eq!(p.uri_segment(), "plain");
    }

    #[test]
    fn test_sorted_properties() {
        let schema = OntologySchema::from_properties(vec![
            OntologyProperty::new("b", "b"),
            OntologyProperty::new("a", "a"),
        ]);
        let sorted = schema.sorted_properties();
        assert_eq!(sorted[0].uri, "a");
        assert_eq!(sorted[1].uri, "b");
    }

    #[test]
    fn test_lookup() {
        let schema =
            OntologySchema::from_properties(vec![OntologyProperty::new("a", "a").required()]);
        assert!(schema.get("a").unwrap().required);
        assert!(schema.get("missing").is_none());
    }
}
