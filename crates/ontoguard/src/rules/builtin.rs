//! Built-in rule constructors for common per-property checks.
//!
//! Null values pass every rule except `not_null`; completeness and validity
//! are separate concerns, so callers attach both when a field is mandatory.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{display_value, Rule, RuleOutcome, Severity};

/// Date formats accepted by [`valid_date`], tried in order.
static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?\d+$").unwrap()
});

/// The field must hold a non-null value.
pub fn not_null(property_uri: impl Into<String>) -> Rule {
    Rule::new("not-null", property_uri, |value, _| {
        if value.is_null() {
            RuleOutcome::fail("value is missing")
        } else {
            RuleOutcome::Pass
        }
    })
    .with_message("field '{field}' is missing a value")
}

/// The value must parse as a real calendar date in one of the accepted
/// formats. Impossible dates such as `02/31/1985` fail.
pub fn valid_date(property_uri: impl Into<String>) -> Rule {
    Rule::new("valid-date", property_uri, |value, _| {
        let Some(text) = value.as_str() else {
            if value.is_null() {
                return RuleOutcome::Pass;
            }
            return RuleOutcome::fail("value is not a date string");
        };
        let trimmed = text.trim();
        if DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(trimmed, fmt).is_ok())
        {
            RuleOutcome::Pass
        } else {
            RuleOutcome::fail("not a valid calendar date")
        }
    })
    .with_message("'{value}' is not a valid calendar date")
}

/// The value must parse as an integer.
pub fn integer(property_uri: impl Into<String>) -> Rule {
    Rule::new("integer", property_uri, |value, _| match value {
        Value::Null => RuleOutcome::Pass,
        Value::Number(n) if n.is_i64() || n.is_u64() => RuleOutcome::Pass,
        Value::String(s) if INTEGER_PATTERN.is_match(s.trim()) => RuleOutcome::Pass,
        _ => RuleOutcome::fail("not an integer"),
    })
    .with_message("'{value}' is not an integer")
}

/// The numeric value must lie within `[min, max]` (either bound optional).
pub fn numeric_range(
    property_uri: impl Into<String>,
    min: Option<f64>,
    max: Option<f64>,
) -> Rule {
    Rule::new("numeric-range", property_uri, move |value, _| {
        let number = match value {
            Value::Null => return RuleOutcome::Pass,
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(number) = number else {
            return RuleOutcome::fail("not a number");
        };
        if min.is_some_and(|m| number < m) {
            return RuleOutcome::fail(format!("{} is below the minimum", number));
        }
        if max.is_some_and(|m| number > m) {
            return RuleOutcome::fail(format!("{} is above the maximum", number));
        }
        RuleOutcome::Pass
    })
    .with_message("'{value}' is outside the expected range")
    .with_severity(Severity::Warning)
}

/// The string value must match the given pattern.
pub fn matches_pattern(
    property_uri: impl Into<String>,
    pattern: &str,
) -> Result<Rule, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(Rule::new("pattern", property_uri, move |value, _| {
        let Some(text) = value.as_str() else {
            if value.is_null() {
                return RuleOutcome::Pass;
            }
            return RuleOutcome::fail("value is not a string");
        };
        if regex.is_match(text.trim()) {
            RuleOutcome::Pass
        } else {
            RuleOutcome::fail(format!("does not match pattern {}", regex.as_str()))
        }
    })
    .with_message("'{value}' does not match the expected pattern"))
}

/// The value must be one of the allowed strings (exact match after trim).
pub fn one_of(property_uri: impl Into<String>, allowed: Vec<String>) -> Rule {
    Rule::new("one-of", property_uri, move |value, _| {
        if value.is_null() {
            return RuleOutcome::Pass;
        }
        let text = display_value(value);
        if allowed.iter().any(|a| a == text.trim()) {
            RuleOutcome::Pass
        } else {
            RuleOutcome::fail("value not in the allowed set")
        }
    })
    .with_message("'{value}' is not an allowed value for {field}")
    .with_severity(Severity::Warning)
}

/// The string value must be at most `max` characters long.
pub fn max_length(property_uri: impl Into<String>, max: usize) -> Rule {
    Rule::new("max-length", property_uri, move |value, _| {
        let Some(text) = value.as_str() else {
            return RuleOutcome::Pass;
        };
        if text.chars().count() <= max {
            RuleOutcome::Pass
        } else {
            RuleOutcome::fail(format!("longer than {} characters", max))
        }
    })
    .with_message("'{value}' exceeds the maximum length for {field}")
    .with_severity(Severity::Warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Record;

    fn eval(rule: &Rule, value: Value) -> RuleOutcome {
        (rule.predicate)(&value, &Record::new())
    }

    #[test]
    fn test_not_null() {
        let rule = not_null("p:x");
        assert!(eval(&rule, Value::String("y".into())).is_pass());
        assert!(!eval(&rule, Value::Null).is_pass());
    }

    #[test]
    fn test_valid_date_accepts_iso_and_us() {
        let rule = valid_date("p:birth");
        assert!(eval(&rule, Value::String("1985-02-28".into())).is_pass());
        assert!(eval(&rule, Value::String("02/28/1985".into())).is_pass());
    }

    #[test]
    fn test_valid_date_rejects_impossible_date() {
        let rule = valid_date("p:birth");
        let outcome = eval(&rule, Value::String("02/31/1985".into()));
        assert!(matches!(outcome, RuleOutcome::Fail { .. }));
    }

    #[test]
    fn test_valid_date_null_passes() {
        let rule = valid_date("p:birth");
        assert!(eval(&rule, Value::Null).is_pass());
    }

    #[test]
    fn test_numeric_range() {
        let rule = numeric_range("p:age", Some(0.0), Some(120.0));
        assert!(eval(&rule, Value::from(42)).is_pass());
        assert!(eval(&rule, Value::String("17.5".into())).is_pass());
        assert!(!eval(&rule, Value::from(-1)).is_pass());
        assert!(!eval(&rule, Value::from(200)).is_pass());
        assert!(!eval(&rule, Value::String("abc".into())).is_pass());
    }

    #[test]
    fn test_integer() {
        let rule = integer("p:count");
        assert!(eval(&rule, Value::from(3)).is_pass());
        assert!(eval(&rule, Value::String("-12".into())).is_pass());
        assert!(!eval(&rule, Value::String("3.5".into())).is_pass());
        assert!(!eval(&rule, Value::from(3.5)).is_pass());
    }

    #[test]
    fn test_matches_pattern() {
        let rule = matches_pattern("p:id", r"^S\d{3}$").unwrap();
        assert!(eval(&rule, Value::String("S001".into())).is_pass());
        assert!(!eval(&rule, Value::String("X1".into())).is_pass());
    }

    #[test]
    fn test_matches_pattern_invalid_regex() {
        assert!(matches_pattern("p:id", "[unclosed").is_err());
    }

    #[test]
    fn test_one_of() {
        let rule = one_of("p:sex", vec!["M".into(), "F".into()]);
        assert!(eval(&rule, Value::String("M".into())).is_pass());
        assert!(!eval(&rule, Value::String("unknown".into())).is_pass());
    }

    #[test]
    fn test_max_length() {
        let rule = max_length("p:code", 3);
        assert!(eval(&rule, Value::String("abc".into())).is_pass());
        assert!(!eval(&rule, Value::String("abcd".into())).is_pass());
    }
}
