//! Report aggregation: an ordered fold over per-record results.
//!
//! Workers may finish records out of order; the builder buffers results and
//! commits them strictly in input order, so a record's contribution to all
//! three roll-ups and to `error_records` lands atomically and the final
//! report is identical regardless of worker scheduling.

use std::collections::BTreeMap;

use crate::mapping::FieldMapping;
use crate::report::{ErrorDetail, ErrorRecord, FieldCounts, ResultReport, Rollup};
use crate::rules::RuleOutcome;
use crate::source::Record;

/// One rule evaluation, with the report message already rendered.
#[derive(Debug, Clone)]
pub(crate) struct RuleEval {
    pub field: String,
    pub rule_id: String,
    pub outcome: RuleOutcome,
    /// Rendered failure message or error cause; `None` for a pass.
    pub message: Option<String>,
}

/// All evaluations for one input record.
#[derive(Debug, Clone)]
pub(crate) struct RecordResult {
    pub index: usize,
    pub record: Record,
    pub evals: Vec<RuleEval>,
}

/// Builds the [`ResultReport`] by committing record results in input order.
pub(crate) struct ReportBuilder {
    report: ResultReport,
    pending: BTreeMap<usize, RecordResult>,
    next_index: usize,
}

impl ReportBuilder {
    /// Create a builder with field counters pre-registered for every mapped
    /// column, in mapping order.
    pub fn new(mapping: &FieldMapping) -> Self {
        let mut report = ResultReport::default();
        for (column, mapped) in mapping.iter() {
            report.summary.fields.insert(
                column.clone(),
                FieldCounts {
                    mapped_property_uri: mapped.property_uri.clone(),
                    total_count: 0,
                    passed_count: 0,
                    failed_count: 0,
                },
            );
        }
        Self {
            report,
            pending: BTreeMap::new(),
            next_index: 0,
        }
    }

    /// Accept one result, committing it and any buffered successors once the
    /// input order allows.
    pub fn push(&mut self, result: RecordResult) {
        self.pending.insert(result.index, result);
        while let Some(next) = self.pending.remove(&self.next_index) {
            self.next_index += 1;
            self.commit(next);
        }
    }

    /// Number of records committed so far.
    pub fn committed(&self) -> usize {
        self.next_index
    }

    fn commit(&mut self, result: RecordResult) {
        let RecordResult {
            index,
            record,
            evals,
        } = result;

        let mut details = Vec::new();
        for eval in &evals {
            let passed = eval.outcome.is_pass();

            let rules = &mut self.report.summary.rules;
            rules.total_count += 1;
            if passed {
                rules.passed_count += 1;
            } else {
                rules.failed_count += 1;
                details.push(ErrorDetail {
                    rule_id: eval.rule_id.clone(),
                    field: eval.field.clone(),
                    message: eval.message.clone().unwrap_or_default(),
                });
            }

            if let Some(counts) = self.report.summary.fields.get_mut(&eval.field) {
                counts.total_count += 1;
                if passed {
                    counts.passed_count += 1;
                } else {
                    counts.failed_count += 1;
                }
            }
        }

        // Mapped fields with no rules are informational: the record counts
        // as seen and passing for them.
        for (field, counts) in self.report.summary.fields.iter_mut() {
            if !evals.iter().any(|e| &e.field == field) {
                counts.total_count += 1;
                counts.passed_count += 1;
            }
        }

        let records = &mut self.report.summary.records;
        records.total_count += 1;
        if details.is_empty() {
            records.passed_count += 1;
        } else {
            records.failed_count += 1;
            records.failed_indices.push(index);
            self.report.summary.rules.failed_indices.push(index);
            self.report.error_records.push(ErrorRecord {
                index,
                record,
                errors: details,
            });
        }
    }

    /// Freeze the report. Buffered results past a gap in the input order are
    /// discarded: the report covers exactly the committed prefix.
    pub fn finish(mut self, complete: bool) -> ResultReport {
        while let Some(next) = self.pending.remove(&self.next_index) {
            self.next_index += 1;
            self.commit(next);
        }

        for rollup in [
            &mut self.report.summary.records,
            &mut self.report.summary.rules,
        ] {
            rollup.failed_percentage = Rollup::percentage(rollup.failed_count, rollup.total_count);
            rollup.pass_percentage = Rollup::percentage(rollup.passed_count, rollup.total_count);
        }

        self.report.complete = complete;
        self.report
    }
}
