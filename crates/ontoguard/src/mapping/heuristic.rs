//! Heuristic mapping strategy: deterministic name similarity.
//!
//! No external services and no feature evidence, so accuracy is lower than
//! the evidence-weighted strategy, but it is always available and is the
//! natural fallback when a similarity service is down.

use std::collections::HashSet;

use crate::error::MappingError;
use crate::feature::Column;
use crate::ontology::{OntologyProperty, OntologySchema};

use super::{resolve_assignments, FieldMapper, FieldMapping, MappingConfig};

/// Score for an exact normalized match against a property alias. Exact
/// matches against the property name or URI segment score 1.0.
const ALIAS_MATCH_SCORE: f64 = 0.95;

/// Maps columns by fuzzy name similarity against property names, URI
/// segments, and aliases.
#[derive(Debug, Clone, Default)]
pub struct HeuristicMapper {
    config: MappingConfig,
}

impl HeuristicMapper {
    /// Create a mapper with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    pub fn with_config(config: MappingConfig) -> Self {
        Self { config }
    }

    /// Similarity between a column name and a property, in `[0, 1]`.
    fn score_pair(&self, column_name: &str, property: &OntologyProperty) -> f64 {
        let column_tokens = tokenize(column_name);
        let column_joined = column_tokens.join("");

        let mut best = 0.0f64;
        for (candidate, exact_score) in candidate_names(property) {
            let candidate_tokens = tokenize(&candidate);
            let candidate_joined = candidate_tokens.join("");

            let score = if column_joined == candidate_joined && !column_joined.is_empty() {
                exact_score
            } else {
                let jaccard = token_jaccard(&column_tokens, &candidate_tokens);
                let lev = levenshtein_similarity(&column_joined, &candidate_joined);
                0.5 * jaccard + 0.5 * lev
            };
            best = best.max(score);
        }
        best
    }
}

impl FieldMapper for HeuristicMapper {
    fn map(
        &self,
        columns: &[Column],
        schema: &OntologySchema,
    ) -> Result<FieldMapping, MappingError> {
        if schema.is_empty() {
            return Err(MappingError::EmptySchema);
        }

        let properties = schema.sorted_properties();
        let scores: Vec<Vec<f64>> = columns
            .iter()
            .map(|column| {
                properties
                    .iter()
                    .map(|property| self.score_pair(&column.name, property))
                    .collect()
            })
            .collect();

        resolve_assignments(columns, &properties, &scores, &self.config)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// The names a property can be matched under, with the score awarded for an
/// exact normalized match.
fn candidate_names(property: &OntologyProperty) -> Vec<(String, f64)> {
    let mut names = vec![
        (property.name.clone(), 1.0),
        (property.uri_segment().to_string(), 1.0),
    ];
    for alias in &property.aliases {
        names.push((alias.clone(), ALIAS_MATCH_SCORE));
    }
    names
}

/// Split a name into lowercase tokens on separators and camelCase
/// boundaries: `birthDate` and `birth_date` both tokenize to
/// `["birth", "date"]`.
fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Jaccard similarity over token sets. Repeated tokens count once, so the
/// result stays in `[0, 1]`.
fn token_jaccard(a: &[String], b: &[String]) -> f64 {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// `1 - distance / max_len`, in `[0, 1]`.
fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Calculate Levenshtein (edit) distance between two strings.
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix: Vec<Vec<usize>> = vec![vec![0; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}
