//! The result report: the stable output contract of a validation run.
//!
//! Field names in this module are a compatibility surface consumed by
//! external reporting collaborators and must not be renamed without a
//! migration note. Reports carry no timestamps or other ambient state so
//! that identical inputs serialize byte-identically.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::source::Record;

/// Aggregated counts for one roll-up dimension (records or rule evaluations).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rollup {
    /// Total units counted (records, or (record, rule) evaluations).
    pub total_count: usize,
    /// Units with a passing outcome.
    pub passed_count: usize,
    /// Units with a failing outcome (validation failure or rule error).
    pub failed_count: usize,
    /// `failed_count / total_count * 100`, or 0 when the total is 0.
    pub failed_percentage: f64,
    /// `passed_count / total_count * 100`, or 0 when the total is 0.
    pub pass_percentage: f64,
    /// Indices of records contributing at least one failure, in input order.
    pub failed_indices: Vec<usize>,
}

impl Rollup {
    /// Percentage helper, defined as 0 when `total` is 0.
    pub(crate) fn percentage(count: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        }
    }
}

/// Per-field counts for one mapped column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCounts {
    /// The ontology property the column was mapped to.
    pub mapped_property_uri: String,
    /// Evaluation units counted for this field.
    pub total_count: usize,
    /// Passing units.
    pub passed_count: usize,
    /// Failing units.
    pub failed_count: usize,
}

/// The three orthogonal roll-ups over all record results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Per-record counts: one unit per input record.
    pub records: Rollup,
    /// Per-evaluation counts: one unit per (record, rule) pair.
    pub rules: Rollup,
    /// Per-field counts, keyed by column name, in mapping order.
    pub fields: IndexMap<String, FieldCounts>,
}

/// One non-passing rule outcome, rendered for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Identifier of the rule that failed or errored.
    pub rule_id: String,
    /// The column the rule was applied to.
    pub field: String,
    /// The rule's failure message with the actual value substituted.
    pub message: String,
}

/// A failed record with its full content and every non-passing outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Zero-based input index of the record.
    pub index: usize,
    /// The record as read from the source.
    pub record: Record,
    /// All non-passing outcomes for this record.
    pub errors: Vec<ErrorDetail>,
}

/// The externally consumed artifact of a validation run.
///
/// Append-only while a run is in progress, frozen at completion. A report
/// with `complete == false` covers only the records that were fully
/// aggregated before the run was cancelled or the stream failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultReport {
    /// Aggregate statistics over all processed records.
    pub summary: Summary,
    /// Failed records in input order.
    pub error_records: Vec<ErrorRecord>,
    /// Whether every record of the input stream was processed.
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(Rollup::percentage(0, 0), 0.0);
        assert_eq!(Rollup::percentage(5, 0), 0.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Rollup::percentage(1, 4), 25.0);
        assert_eq!(Rollup::percentage(4, 4), 100.0);
    }

    #[test]
    fn test_report_serialization_shape() {
        let mut summary = Summary::default();
        summary.fields.insert(
            "birth_date".to_string(),
            FieldCounts {
                mapped_property_uri: "fhir:Patient.birthDate".to_string(),
                total_count: 1,
                passed_count: 0,
                failed_count: 1,
            },
        );
        let report = ResultReport {
            summary,
            error_records: vec![],
            complete: true,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["summary"]["records"]["total_count"].is_number());
        assert!(json["summary"]["records"]["failed_indices"].is_array());
        assert_eq!(
            json["summary"]["fields"]["birth_date"]["mapped_property_uri"],
            "fhir:Patient.birthDate"
        );
        assert_eq!(json["complete"], true);
    }
}
