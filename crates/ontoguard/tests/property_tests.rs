//! Property-based tests for Ontoguard.
//!
//! These tests use proptest to generate random inputs and verify that the
//! engine maintains its invariants under all conditions.
//!
//! # Testing Philosophy
//!
//! Property-based tests verify:
//! 1. **Uniqueness**: one-to-one mapping never assigns a column or property twice
//! 2. **Determinism**: same input always produces the same report
//! 3. **Consistency**: roll-up counters always balance
//! 4. **Containment**: faulting rules never break the run
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p ontoguard --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p ontoguard --test property_tests
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::Value;

use ontoguard::similarity::COLUMN_NAME_FEATURE;
use ontoguard::{
    builtin, Column, EvidenceMapper, ExecutionConfig, ExplicitMapper, FeatureVector,
    FieldMapper, HeuristicMapper, InMemoryRuleStore, MappingConfig, MockSimilarityProvider,
    OntologyProperty,
    OntologySchema, Record, ResultReport, Rule, RuleExecutor, RuleOutcome, VecSource,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Generate a random column/property score matrix.
fn score_matrix() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..5, 1usize..5).prop_flat_map(|(columns, properties)| {
        prop::collection::vec(
            prop::collection::vec(0.0f64..1.0, properties),
            columns,
        )
    })
}

/// Generate a random cell value: null, integer-like, or free text.
fn cell_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        "-?[0-9]{1,6}".prop_map(Value::String),
        "[a-z]{1,10}".prop_map(Value::String),
    ]
}

/// Generate a random single-column dataset.
fn age_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(cell_value(), 0..30).prop_map(|values| {
        values
            .into_iter()
            .map(|v| Record::from_iter([("age".to_string(), v)]))
            .collect()
    })
}

fn mapper_for(scores: &[Vec<f64>]) -> (EvidenceMapper, Vec<Column>, OntologySchema) {
    let mut provider = MockSimilarityProvider::new();
    for (i, row) in scores.iter().enumerate() {
        for (j, &score) in row.iter().enumerate() {
            provider = provider.with_score(format!("c{i}"), format!("p:{j:02}"), score);
        }
    }

    let columns: Vec<Column> = (0..scores.len())
        .map(|i| {
            Column::new(format!("c{i}"), i).with_features(
                FeatureVector::new().with_categorical(COLUMN_NAME_FEATURE, format!("c{i}")),
            )
        })
        .collect();
    let schema = OntologySchema::from_properties(
        (0..scores[0].len())
            .map(|j| OntologyProperty::new(format!("p:{j:02}"), format!("prop{j}")))
            .collect(),
    );

    let mapper = EvidenceMapper::new()
        .with_provider(Arc::new(provider))
        .with_config(MappingConfig {
            min_confidence: 0.0,
            strict: false,
            allow_many_to_one: false,
        });
    (mapper, columns, schema)
}

fn run_age_dataset(records: Vec<Record>, store: InMemoryRuleStore, workers: usize) -> ResultReport {
    let source = VecSource::new(records);
    let mapper = ExplicitMapper::new().with_assignment("age", "p:age");
    RuleExecutor::new(Arc::new(mapper), Arc::new(store))
        .with_config(ExecutionConfig {
            workers,
            rule_timeout: None,
        })
        .run_with_mapping(&source, &mapper_mapping())
        .expect("run failed")
}

fn mapper_mapping() -> ontoguard::FieldMapping {
    let mapper = ExplicitMapper::new().with_assignment("age", "p:age");
    let schema = OntologySchema::from_properties(vec![OntologyProperty::new("p:age", "age")]);
    mapper
        .map(&[Column::new("age", 0)], &schema)
        .expect("mapping failed")
}

fn age_store() -> InMemoryRuleStore {
    InMemoryRuleStore::new()
        .with_rule(builtin::not_null("p:age"))
        .with_rule(builtin::integer("p:age"))
}

// =============================================================================
// Mapping Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_one_to_one_mapping_is_unique_both_ways(scores in score_matrix()) {
        let (mapper, columns, schema) = mapper_for(&scores);
        let mapping = mapper.map(&columns, &schema).expect("mapping failed");

        let mut seen_properties = HashSet::new();
        for (_, mapped) in mapping.iter() {
            prop_assert!(
                seen_properties.insert(mapped.property_uri.clone()),
                "property {} assigned twice", mapped.property_uri
            );
            prop_assert!((0.0..=1.0).contains(&mapped.confidence));
        }
        prop_assert!(mapping.len() <= scores.len().min(scores[0].len()));
    }

    #[test]
    fn prop_heuristic_confidence_within_bounds(name in "[a-z]{1,6}(_[a-z]{1,6}){0,3}") {
        let mapper = HeuristicMapper::with_config(MappingConfig {
            min_confidence: 0.0,
            strict: false,
            allow_many_to_one: false,
        });
        // Aliases with repeated tokens exercise the set-based overlap.
        let schema = OntologySchema::from_properties(vec![
            OntologyProperty::new("p:data", "data").with_alias("data_data"),
            OntologyProperty::new("p:sample", "sample_id"),
        ]);

        let mapping = mapper
            .map(&[Column::new(name, 0)], &schema)
            .expect("mapping failed");
        for (_, mapped) in mapping.iter() {
            prop_assert!(
                (0.0..=1.0).contains(&mapped.confidence),
                "confidence {} is outside [0, 1]", mapped.confidence
            );
        }
    }

    #[test]
    fn prop_mapping_is_deterministic(scores in score_matrix()) {
        let (mapper, columns, schema) = mapper_for(&scores);
        let first = mapper.map(&columns, &schema).expect("mapping failed");
        let second = mapper.map(&columns, &schema).expect("mapping failed");
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Report Invariants
// =============================================================================

proptest! {
    #[test]
    fn prop_rollup_counters_balance(records in age_records()) {
        let total = records.len();
        let report = run_age_dataset(records, age_store(), 1);

        let recs = &report.summary.records;
        prop_assert_eq!(recs.total_count, total);
        prop_assert_eq!(recs.passed_count + recs.failed_count, recs.total_count);
        prop_assert_eq!(recs.failed_indices.len(), recs.failed_count);
        prop_assert!(recs.failed_indices.windows(2).all(|w| w[0] < w[1]));
        prop_assert!((0.0..=100.0).contains(&recs.pass_percentage));
        prop_assert!((0.0..=100.0).contains(&recs.failed_percentage));

        let rules = &report.summary.rules;
        prop_assert_eq!(rules.total_count, total * 2);
        prop_assert_eq!(rules.passed_count + rules.failed_count, rules.total_count);

        let field = &report.summary.fields["age"];
        prop_assert_eq!(field.total_count, total * 2);
        prop_assert_eq!(field.passed_count + field.failed_count, field.total_count);

        // error_records mirror failed_indices exactly, in input order.
        let error_indices: Vec<usize> = report.error_records.iter().map(|e| e.index).collect();
        prop_assert_eq!(&error_indices, &recs.failed_indices);
        prop_assert!(report.error_records.iter().all(|e| !e.errors.is_empty()));
        prop_assert!(report.complete);
    }

    #[test]
    fn prop_reports_serialize_identically(records in age_records()) {
        let first = run_age_dataset(records.clone(), age_store(), 1);
        let second = run_age_dataset(records, age_store(), 1);
        prop_assert_eq!(
            serde_json::to_string(&first).expect("serialization failed"),
            serde_json::to_string(&second).expect("serialization failed")
        );
    }

    #[test]
    fn prop_parallel_matches_sequential(records in age_records(), workers in 2usize..5) {
        let sequential = run_age_dataset(records.clone(), age_store(), 1);
        let parallel = run_age_dataset(records, age_store(), workers);
        prop_assert_eq!(sequential, parallel);
    }
}

// =============================================================================
// Fault Containment Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_panicking_rule_never_breaks_the_run(records in age_records()) {
        let total = records.len();
        let store = InMemoryRuleStore::new()
            .with_rule(Rule::new("boom", "p:age", |_, _| panic!("always")))
            .with_rule(builtin::integer("p:age"));

        let report = run_age_dataset(records, store, 1);

        prop_assert!(report.complete);
        prop_assert_eq!(report.summary.records.total_count, total);
        // Every record carries exactly one errored evaluation from "boom".
        prop_assert_eq!(report.summary.records.failed_count, total);
        let all_have_boom = report.error_records.iter().all(|e| {
            e.errors.iter().any(|d| d.rule_id == "boom")
        });
        prop_assert!(all_have_boom);
        // The second rule still ran for every record.
        prop_assert_eq!(report.summary.rules.total_count, total * 2);
    }

    #[test]
    fn prop_rule_outcomes_are_deterministic(value in cell_value()) {
        let rule = builtin::integer("p:age");
        let record = Record::from_iter([("age".to_string(), value.clone())]);
        let first = (rule.predicate)(&value, &record);
        let second = (rule.predicate)(&value, &record);
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Outcome Semantics
// =============================================================================

proptest! {
    #[test]
    fn prop_not_null_partitions_values(value in cell_value()) {
        let rule = builtin::not_null("p:age");
        let record = Record::new();
        let outcome = (rule.predicate)(&value, &record);
        match value {
            Value::Null => {
                let is_fail = matches!(outcome, RuleOutcome::Fail { .. });
                prop_assert!(is_fail);
            }
            _ => prop_assert!(outcome.is_pass()),
        }
    }
}
