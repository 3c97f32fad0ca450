//! Ontoguard: ontology-driven validation for tabular datasets.
//!
//! Ontoguard maps dataset columns onto canonical ontology properties, then
//! validates every record against the rules attached to those properties and
//! folds the outcomes into a deterministic result report.
//!
//! # Core Principles
//!
//! - **Mapping before validation**: rules attach to ontology properties, not
//!   column names, so the same rule set works across differently-shaped
//!   datasets
//! - **Fault containment**: a panicking or hanging rule taints one
//!   evaluation, never the run
//! - **Deterministic output**: identical inputs produce byte-identical
//!   reports, regardless of worker count
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ontoguard::{
//!     builtin, Column, CsvSource, HeuristicMapper, InMemoryRuleStore,
//!     OntologyProperty, OntologySchema, RuleExecutor,
//! };
//!
//! let schema = OntologySchema::from_properties(vec![
//!     OntologyProperty::new("https://hl7.org/fhir/Patient.birthDate", "birthDate").required(),
//! ]);
//! let store = InMemoryRuleStore::new()
//!     .with_rule(builtin::valid_date("https://hl7.org/fhir/Patient.birthDate"));
//!
//! let executor = RuleExecutor::new(Arc::new(HeuristicMapper::new()), Arc::new(store));
//! let source = CsvSource::new("patients.csv");
//! let columns = vec![Column::new("birth_date", 0)];
//!
//! let report = executor.run(&source, &columns, &schema).unwrap();
//! println!("failed records: {}", report.summary.records.failed_count);
//! ```

pub mod error;
pub mod executor;
pub mod feature;
pub mod mapping;
pub mod ontology;
pub mod report;
pub mod rules;
pub mod similarity;
pub mod source;

pub use error::{EngineError, MappingError, Result, RunError};
pub use executor::{CancellationToken, ExecutionConfig, RuleExecutor};
pub use feature::{Column, FeatureVector, ValueType};
pub use mapping::{
    EvidenceConfig, EvidenceMapper, ExplicitMapper, FieldMapper, FieldMapping, HeuristicMapper,
    MappedField, MappingConfig,
};
pub use ontology::{OntologyProperty, OntologySchema};
pub use report::{ErrorDetail, ErrorRecord, FieldCounts, ResultReport, Rollup, Summary};
pub use rules::{builtin, InMemoryRuleStore, Rule, RuleOutcome, RuleStore, Severity};
pub use similarity::{HttpSimilarityProvider, MockSimilarityProvider, SimilarityProvider};
pub use source::{CsvSource, Record, RecordSource, SourceError, VecSource};
