//! Validation rules: predicates, outcomes, and the rule store contract.

pub mod builtin;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::Record;

/// Outcome of evaluating one rule against one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The value satisfies the rule.
    Pass,
    /// The value violates the rule.
    Fail {
        /// Why the value was rejected.
        reason: String,
    },
    /// The rule itself could not be evaluated (panic or timeout). Distinct
    /// from a validation failure, but counted as one in the roll-ups.
    Error {
        /// What went wrong during evaluation.
        cause: String,
    },
}

impl RuleOutcome {
    /// Whether the outcome is a pass.
    pub fn is_pass(&self) -> bool {
        matches!(self, RuleOutcome::Pass)
    }

    /// Convenience constructor for a failure.
    pub fn fail(reason: impl Into<String>) -> Self {
        RuleOutcome::Fail {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for an evaluation error.
    pub fn error(cause: impl Into<String>) -> Self {
        RuleOutcome::Error {
            cause: cause.into(),
        }
    }
}

/// Severity of a rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that should be addressed.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// The executable predicate of a rule.
///
/// Predicates must be pure functions of `(field value, record)`: no
/// wall-clock reads, no external mutable state. The executor isolates them
/// with panic containment and an optional timeout, so they are treated as
/// potentially faulting and potentially blocking.
pub type RulePredicate = Arc<dyn Fn(&Value, &Record) -> RuleOutcome + Send + Sync>;

/// A validation rule owned by an ontology property.
#[derive(Clone)]
pub struct Rule {
    /// Identifier, unique within the owning property's rule set.
    pub id: String,
    /// The property this rule attaches to.
    pub property_uri: String,
    /// Severity of a violation.
    pub severity: Severity,
    /// Failure message template. `{value}` and `{field}` are substituted
    /// when the message is rendered for the report.
    pub message: String,
    /// The executable predicate.
    pub predicate: RulePredicate,
}

impl Rule {
    /// Create a rule with `Error` severity and a generic message.
    pub fn new(
        id: impl Into<String>,
        property_uri: impl Into<String>,
        predicate: impl Fn(&Value, &Record) -> RuleOutcome + Send + Sync + 'static,
    ) -> Self {
        let id = id.into();
        Self {
            message: format!("value '{{value}}' failed rule '{}'", id),
            id,
            property_uri: property_uri.into(),
            severity: Severity::Error,
            predicate: Arc::new(predicate),
        }
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the failure message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Render the failure message for a concrete field and value.
    pub fn render_message(&self, field: &str, value: &Value) -> String {
        self.message
            .replace("{value}", &display_value(value))
            .replace("{field}", field)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("property_uri", &self.property_uri)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Render a record value for display in messages.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read-only index from property URI to the ordered rules attached to it.
///
/// Implementations are assumed cheap (cached by the caller); the executor
/// fetches each property's rule set once per run.
pub trait RuleStore: Send + Sync {
    /// The rules for a property, in attachment order. An empty set means the
    /// property is informational only.
    fn rules_for(&self, property_uri: &str) -> Vec<Rule>;
}

/// Simple in-memory rule store, keyed by property URI.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleStore {
    rules: IndexMap<String, Vec<Rule>>,
}

impl InMemoryRuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule under its owning property, preserving attachment order.
    pub fn add(&mut self, rule: Rule) {
        self.rules
            .entry(rule.property_uri.clone())
            .or_default()
            .push(rule);
    }

    /// Builder-style variant of [`add`](Self::add).
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.add(rule);
        self
    }

    /// Total number of rules across all properties.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Whether the store holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleStore for InMemoryRuleStore {
    fn rules_for(&self, property_uri: &str) -> Vec<Rule> {
        self.rules.get(property_uri).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_outcome_is_pass() {
        assert!(RuleOutcome::Pass.is_pass());
        assert!(!RuleOutcome::fail("bad").is_pass());
        assert!(!RuleOutcome::error("boom").is_pass());
    }

    #[test]
    fn test_render_message() {
        let rule = Rule::new("check", "p:age", |_, _| RuleOutcome::Pass)
            .with_message("'{value}' is not valid for {field}");
        let msg = rule.render_message("age", &Value::String("abc".into()));
        assert_eq!(msg, "'abc' is not valid for age");
    }

    #[test]
    fn test_render_message_null() {
        let rule = Rule::new("check", "p:age", |_, _| RuleOutcome::Pass)
            .with_message("got {value}");
        assert_eq!(rule.render_message("age", &Value::Null), "got null");
    }

    #[test]
    fn test_store_preserves_order() {
        let mut store = InMemoryRuleStore::new();
        store.add(Rule::new("first", "p:x", |_, _| RuleOutcome::Pass));
        store.add(Rule::new("second", "p:x", |_, _| RuleOutcome::Pass));
        store.add(Rule::new("other", "p:y", |_, _| RuleOutcome::Pass));

        let rules = store.rules_for("p:x");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "first");
        assert_eq!(rules[1].id, "second");
        assert!(store.rules_for("p:missing").is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
