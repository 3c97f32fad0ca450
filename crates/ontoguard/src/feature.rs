//! Column and feature-vector data types.
//!
//! A [`FeatureVector`] is the statistical/semantic fingerprint of one column,
//! produced once by an external profiler and read-only afterwards. The mapping
//! strategies compare it against the reference vectors carried by ontology
//! properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive value type of a column or an ontology property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    #[default]
    Unknown,
}

impl ValueType {
    /// Whether the type represents a numeric value.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }

    /// Whether a column of this type can plausibly hold values of `expected`.
    ///
    /// `Unknown` on either side is treated as compatible; integer columns are
    /// accepted where floats are expected.
    pub fn compatible_with(&self, expected: ValueType) -> bool {
        if *self == expected {
            return true;
        }
        match (self, expected) {
            (ValueType::Unknown, _) | (_, ValueType::Unknown) => true,
            (ValueType::Integer, ValueType::Float) => true,
            (ValueType::Date, ValueType::DateTime) => true,
            // Untyped text can hold anything; the rules decide.
            (ValueType::String, _) => true,
            _ => false,
        }
    }
}

/// Statistical/semantic summary of one column.
///
/// Immutable once profiled; the engine never recomputes or mutates features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Named numeric features (null rate, cardinality ratio, mean, std, ...).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub numeric: IndexMap<String, f64>,
    /// Named categorical features (value-pattern signatures, detected format, ...).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub categorical: IndexMap<String, String>,
    /// Optional semantic embedding of the column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl FeatureVector {
    /// Create an empty feature vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric feature.
    pub fn with_numeric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.numeric.insert(name.into(), value);
        self
    }

    /// Add a categorical feature.
    pub fn with_categorical(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.categorical.insert(name.into(), value.into());
        self
    }

    /// Set the semantic embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Cosine similarity between the embeddings of two feature vectors,
    /// rescaled to `[0, 1]`. `None` when either side has no embedding or the
    /// dimensions differ.
    pub fn cosine_similarity(&self, other: &FeatureVector) -> Option<f64> {
        let a = self.embedding.as_ref()?;
        let b = other.embedding.as_ref()?;
        if a.len() != b.len() || a.is_empty() {
            return None;
        }

        let mut dot = 0.0f64;
        let mut norm_a = 0.0f64;
        let mut norm_b = 0.0f64;
        for (&x, &y) in a.iter().zip(b.iter()) {
            dot += x as f64 * y as f64;
            norm_a += (x as f64).powi(2);
            norm_b += (y as f64).powi(2);
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return None;
        }

        let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
        Some(((cosine + 1.0) / 2.0).clamp(0.0, 1.0))
    }

    /// Affinity between the numeric features both vectors share, in `[0, 1]`.
    ///
    /// Each shared feature contributes `1 - |a - b| / (|a| + |b|)`; the result
    /// is the mean over shared features. `None` when no features are shared.
    pub fn numeric_affinity(&self, other: &FeatureVector) -> Option<f64> {
        let mut sum = 0.0;
        let mut shared = 0usize;
        for (name, &a) in &self.numeric {
            if let Some(&b) = other.numeric.get(name) {
                let denom = a.abs() + b.abs();
                let per_feature = if denom == 0.0 {
                    1.0
                } else {
                    1.0 - ((a - b).abs() / denom).min(1.0)
                };
                sum += per_feature;
                shared += 1;
            }
        }
        if shared == 0 {
            None
        } else {
            Some(sum / shared as f64)
        }
    }

    /// Fraction of shared categorical features holding equal values, in
    /// `[0, 1]`. `None` when no categorical features are shared.
    pub fn categorical_overlap(&self, other: &FeatureVector) -> Option<f64> {
        let mut equal = 0usize;
        let mut shared = 0usize;
        for (name, a) in &self.categorical {
            if let Some(b) = other.categorical.get(name) {
                shared += 1;
                if a == b {
                    equal += 1;
                }
            }
        }
        if shared == 0 {
            None
        } else {
            Some(equal as f64 / shared as f64)
        }
    }
}

/// A profiled dataset column: name, inferred type, and features.
///
/// Columns are created once at profiling time and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within a dataset.
    pub name: String,
    /// Zero-based declaration position in the dataset.
    pub position: usize,
    /// Declared or inferred primitive type.
    #[serde(default)]
    pub inferred_type: ValueType,
    /// Statistical/semantic features produced by the profiler.
    #[serde(default)]
    pub features: FeatureVector,
}

impl Column {
    /// Create a column with empty features.
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            inferred_type: ValueType::Unknown,
            features: FeatureVector::new(),
        }
    }

    /// Set the inferred type.
    pub fn with_type(mut self, inferred_type: ValueType) -> Self {
        self.inferred_type = inferred_type;
        self
    }

    /// Set the feature vector.
    pub fn with_features(mut self, features: FeatureVector) -> Self {
        self.features = features;
        self
    }
}
