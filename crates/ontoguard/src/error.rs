//! Error types for the Ontoguard library.
//!
//! The taxonomy follows the run lifecycle: `MappingError` is fatal to the
//! mapping phase and surfaces before any record is processed; `RunError`
//! means the record stream itself failed mid-run and carries the partial
//! report built so far. Individual rule faults never become errors at this
//! level; they are contained as `RuleOutcome::Error` inside the report.

use thiserror::Error;

use crate::report::ResultReport;
use crate::similarity::SimilarityError;
use crate::source::SourceError;

/// Errors raised while resolving a field mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The ontology schema has no properties to map against.
    #[error("ontology schema has no properties")]
    EmptySchema,

    /// Strict mode: a required property ended up with no mapped column.
    #[error("required property '{uri}' has no mapped column")]
    RequiredPropertyUnmapped { uri: String },

    /// An explicit mapping references a column the dataset does not have.
    #[error("explicit mapping references unknown column '{column}'")]
    UnknownColumn { column: String },

    /// An explicit mapping references a property the schema does not have.
    #[error("explicit mapping references unknown property '{uri}'")]
    UnknownProperty { uri: String },

    /// Two columns target the same property while many-to-one is disabled.
    #[error("property '{uri}' is targeted by more than one column")]
    DuplicateTarget { uri: String },

    /// The external similarity service failed. Callers that want graceful
    /// degradation should catch this and re-run with the heuristic mapper.
    #[error("similarity service failed")]
    SimilarityService(#[from] SimilarityError),
}

/// The record stream failed mid-run. The partial report covers every record
/// that was fully aggregated before the failure and is marked incomplete.
#[derive(Debug, Error)]
#[error("record stream failed after {} records: {source}", partial.summary.records.total_count)]
pub struct RunError {
    /// The connector failure.
    #[source]
    pub source: SourceError,
    /// Partial results, never discarded.
    pub partial: Box<ResultReport>,
}

/// Union of the phase errors for the one-call orchestration path.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Mapping phase failed; no record was processed.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Record stream failed mid-run; partial results are attached.
    #[error(transparent)]
    Run(#[from] RunError),
}

/// Result type alias for Ontoguard operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_error_display_counts_records() {
        let mut partial = ResultReport::default();
        partial.summary.records.total_count = 3;
        let err = RunError {
            source: SourceError::new("disk vanished"),
            partial: Box::new(partial),
        };

        let msg = err.to_string();
        assert!(msg.contains("after 3 records"));
        assert!(msg.contains("disk vanished"));
    }

    #[test]
    fn test_engine_error_from_mapping() {
        let err: EngineError = MappingError::EmptySchema.into();
        assert!(matches!(err, EngineError::Mapping(MappingError::EmptySchema)));
    }
}
