//! Rule execution: drives the validation run.
//!
//! The executor pulls records from a source, evaluates every applicable rule
//! against each record, and folds the outcomes into a [`ResultReport`].
//! Faults are contained per evaluation: a panicking or timed-out rule
//! becomes a `RuleOutcome::Error` for that one (record, rule) pair and the
//! run carries on. The report is deterministic for a given input regardless
//! of the worker count.

mod aggregate;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{EngineError, RunError};
use crate::feature::Column;
use crate::mapping::{FieldMapper, FieldMapping};
use crate::ontology::OntologySchema;
use crate::report::ResultReport;
use crate::rules::{Rule, RuleOutcome, RulePredicate, RuleStore};
use crate::source::{Record, RecordIter, RecordSource, SourceError};

use aggregate::{RecordResult, ReportBuilder, RuleEval};

/// Cooperative cancellation handle. Cloning shares the flag; cancelling is
/// observed before each record, so a run stops at a record boundary and the
/// partial report stays consistent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Executor tuning knobs.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Number of worker threads. 1 runs everything on the calling thread.
    pub workers: usize,
    /// Wall-clock budget per rule evaluation. `None` disables the watchdog;
    /// enabling it costs one short-lived thread per evaluation.
    pub rule_timeout: Option<Duration>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            rule_timeout: None,
        }
    }
}

/// Drives a validation run: mapping, evaluation, aggregation.
pub struct RuleExecutor {
    mapper: Arc<dyn FieldMapper>,
    store: Arc<dyn RuleStore>,
    config: ExecutionConfig,
    cancel: CancellationToken,
}

impl RuleExecutor {
    /// Create an executor with default configuration.
    pub fn new(mapper: Arc<dyn FieldMapper>, store: Arc<dyn RuleStore>) -> Self {
        Self {
            mapper,
            store,
            config: ExecutionConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the execution configuration.
    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a cancellation token. Keep a clone to cancel from elsewhere.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the full pipeline: resolve the field mapping, then validate every
    /// record of the source against the mapped rules.
    pub fn run(
        &self,
        source: &dyn RecordSource,
        columns: &[Column],
        schema: &OntologySchema,
    ) -> Result<ResultReport, EngineError> {
        let mapping = self.mapper.map(columns, schema)?;
        info!(
            strategy = self.mapper.name(),
            mapped = mapping.len(),
            "field mapping resolved"
        );
        Ok(self.run_with_mapping(source, &mapping)?)
    }

    /// Validate every record of the source against an already-resolved
    /// mapping.
    ///
    /// A cancelled run returns `Ok` with the report marked incomplete; a
    /// failing record stream returns a [`RunError`] carrying the partial
    /// report over the records aggregated before the failure.
    pub fn run_with_mapping(
        &self,
        source: &dyn RecordSource,
        mapping: &FieldMapping,
    ) -> Result<ResultReport, RunError> {
        // Fetch each mapped property's rule set once per run.
        let plan: Vec<(String, Vec<Rule>)> = mapping
            .iter()
            .map(|(column, mapped)| (column.clone(), self.store.rules_for(&mapped.property_uri)))
            .collect();

        let builder = ReportBuilder::new(mapping);
        let iter = match source.open() {
            Ok(iter) => iter,
            Err(source) => {
                return Err(RunError {
                    source,
                    partial: Box::new(builder.finish(false)),
                })
            }
        };

        let result = if self.config.workers <= 1 {
            self.run_sequential(iter, &plan, builder)
        } else {
            self.run_parallel(iter, &plan, builder)
        };

        if let Ok(report) = &result {
            info!(
                records = report.summary.records.total_count,
                failed = report.summary.records.failed_count,
                complete = report.complete,
                "validation run finished"
            );
        }
        result
    }

    fn run_sequential(
        &self,
        iter: RecordIter<'_>,
        plan: &[(String, Vec<Rule>)],
        mut builder: ReportBuilder,
    ) -> Result<ResultReport, RunError> {
        for (index, item) in iter.enumerate() {
            if self.cancel.is_cancelled() {
                warn!(processed = builder.committed(), "run cancelled");
                return Ok(builder.finish(false));
            }
            match item {
                Ok(record) => {
                    builder.push(evaluate_record(index, record, plan, self.config.rule_timeout))
                }
                Err(source) => {
                    return Err(RunError {
                        source,
                        partial: Box::new(builder.finish(false)),
                    })
                }
            }
        }
        Ok(builder.finish(true))
    }

    fn run_parallel(
        &self,
        iter: RecordIter<'_>,
        plan: &[(String, Vec<Rule>)],
        mut builder: ReportBuilder,
    ) -> Result<ResultReport, RunError> {
        let workers = self.config.workers;
        let timeout = self.config.rule_timeout;
        let cancel = self.cancel.clone();

        let (work_tx, work_rx) = mpsc::sync_channel::<(usize, Record)>(workers * 2);
        let (result_tx, result_rx) = mpsc::channel::<RecordResult>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        // The scope joins every worker before returning, so once it ends the
        // result channel is fully drained below.
        let feed: Result<bool, SourceError> = std::thread::scope(|scope| {
            for _ in 0..workers {
                let work_rx = Arc::clone(&work_rx);
                let result_tx = result_tx.clone();
                scope.spawn(move || loop {
                    let job = {
                        let Ok(guard) = work_rx.lock() else { return };
                        guard.recv()
                    };
                    let Ok((index, record)) = job else { return };
                    let result = evaluate_record(index, record, plan, timeout);
                    if result_tx.send(result).is_err() {
                        return;
                    }
                });
            }
            drop(result_tx);

            for (index, item) in iter.enumerate() {
                if cancel.is_cancelled() {
                    warn!("run cancelled");
                    return Ok(false);
                }
                match item {
                    Ok(record) => {
                        if work_tx.send((index, record)).is_err() {
                            return Ok(false);
                        }
                    }
                    Err(err) => return Err(err),
                }
            }
            drop(work_tx);
            Ok(true)
        });

        for result in result_rx {
            builder.push(result);
        }

        match feed {
            Ok(complete) => Ok(builder.finish(complete)),
            Err(source) => Err(RunError {
                source,
                partial: Box::new(builder.finish(false)),
            }),
        }
    }
}

/// Evaluate every mapped rule against one record.
fn evaluate_record(
    index: usize,
    record: Record,
    plan: &[(String, Vec<Rule>)],
    timeout: Option<Duration>,
) -> RecordResult {
    let mut evals = Vec::new();
    for (field, rules) in plan {
        let value = record.get(field).cloned().unwrap_or(Value::Null);
        for rule in rules {
            let outcome = evaluate_rule(rule, &value, &record, timeout);
            let message = match &outcome {
                RuleOutcome::Pass => None,
                RuleOutcome::Fail { .. } => Some(rule.render_message(field, &value)),
                RuleOutcome::Error { cause } => Some(cause.clone()),
            };
            evals.push(RuleEval {
                field: field.clone(),
                rule_id: rule.id.clone(),
                outcome,
                message,
            });
        }
    }
    RecordResult {
        index,
        record,
        evals,
    }
}

/// Evaluate one rule with panic containment and the optional watchdog.
fn evaluate_rule(
    rule: &Rule,
    value: &Value,
    record: &Record,
    timeout: Option<Duration>,
) -> RuleOutcome {
    let Some(limit) = timeout else {
        return run_guarded(&rule.predicate, value, record);
    };

    let predicate = Arc::clone(&rule.predicate);
    let value = value.clone();
    let record = record.clone();
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(run_guarded(&predicate, &value, &record));
    });

    match rx.recv_timeout(limit) {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(rule = %rule.id, ?limit, "rule evaluation timed out");
            RuleOutcome::error(format!(
                "rule '{}' exceeded the evaluation timeout of {:?}",
                rule.id, limit
            ))
        }
    }
}

fn run_guarded(predicate: &RulePredicate, value: &Value, record: &Record) -> RuleOutcome {
    match catch_unwind(AssertUnwindSafe(|| predicate(value, record))) {
        Ok(outcome) => outcome,
        Err(payload) => RuleOutcome::error(format!("rule panicked: {}", panic_message(&payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
