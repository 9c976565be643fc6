//! Mail filtering system
//!
//! Declarative filter rules loaded from JSON: each rule combines conditions
//! with All/Any logic and carries a list of opaque action identifiers.

pub mod conditions;
pub mod engine;

pub use conditions::{ConditionField, ConditionOperator, FilterCondition};
pub use engine::{EngineReport, EvalFailure, FilterEngine, MatchResult};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Unified error type for filter loading and evaluation
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("failed to parse date {value:?}: expected RFC 822 date-time")]
    FieldParse { value: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mail filter rule
///
/// The JSON key for the combinator is `predicate`, matching the rule file
/// format; conditions carry their own `predicate` key for the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "predicate")]
    pub match_logic: MatchLogic,
    pub conditions: Vec<FilterCondition>,
    pub actions: Vec<String>,
}

impl FilterRule {
    /// Display label for diagnostics: the rule's name, or its position.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{index}"),
        }
    }
}

/// Match logic for multiple conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLogic {
    All, // AND - every condition must match
    Any, // OR - at least one condition must match
}

/// Ordered collection of filter rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<FilterRule>,
}

impl RuleSet {
    /// Load and validate a rule set from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> FilterResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a rule set from a JSON string.
    ///
    /// Unknown object keys are ignored; unknown field, operator, or
    /// combinator values are a configuration error.
    pub fn from_json(raw: &str) -> FilterResult<Self> {
        let rule_set: RuleSet =
            serde_json::from_str(raw).map_err(|e| FilterError::Configuration(e.to_string()))?;
        rule_set.validate()?;
        Ok(rule_set)
    }

    /// Reject value-level problems the closed enums cannot catch.
    fn validate(&self) -> FilterResult<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            for condition in &rule.conditions {
                if condition.field != ConditionField::ReceivedDate {
                    continue;
                }
                if matches!(
                    condition.operator,
                    ConditionOperator::Contains | ConditionOperator::NotContains
                ) {
                    return Err(FilterError::Configuration(format!(
                        "rule {}: substring operators do not apply to \"Received Date\"",
                        rule.label(index)
                    )));
                }
                if condition.value.trim().parse::<u32>().is_err() {
                    return Err(FilterError::Configuration(format!(
                        "rule {}: \"Received Date\" value {:?} is not a day count",
                        rule.label(index),
                        condition.value
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_rule_file_shape() {
        let raw = r#"{
            "rules": [
                {
                    "predicate": "All",
                    "conditions": [
                        {"field": "From", "predicate": "contains", "value": "sender@example.com"},
                        {"field": "Received Date", "predicate": "greater_than", "value": "30"}
                    ],
                    "actions": ["mark_as_read", "archive"]
                },
                {
                    "name": "newsletter",
                    "predicate": "Any",
                    "conditions": [
                        {"field": "Subject", "predicate": "not_equals", "value": "Weekly digest"}
                    ],
                    "actions": ["move_to_folder:News"]
                }
            ]
        }"#;

        let rule_set = RuleSet::from_json(raw).unwrap();
        assert_eq!(rule_set.rules.len(), 2);
        assert_eq!(rule_set.rules[0].match_logic, MatchLogic::All);
        assert_eq!(rule_set.rules[0].conditions[1].field, ConditionField::ReceivedDate);
        assert_eq!(rule_set.rules[0].actions, vec!["mark_as_read", "archive"]);
        assert_eq!(rule_set.rules[1].name.as_deref(), Some("newsletter"));
        assert_eq!(rule_set.rules[1].match_logic, MatchLogic::Any);
    }

    #[test]
    fn unknown_combinator_is_configuration_error() {
        let raw = r#"{"rules": [{"predicate": "Most", "conditions": [], "actions": []}]}"#;
        let err = RuleSet::from_json(raw).unwrap_err();
        assert!(matches!(err, FilterError::Configuration(_)));
    }

    #[test]
    fn unknown_field_is_configuration_error() {
        let raw = r#"{
            "rules": [{
                "predicate": "All",
                "conditions": [{"field": "Cc", "predicate": "contains", "value": "x"}],
                "actions": []
            }]
        }"#;
        let err = RuleSet::from_json(raw).unwrap_err();
        assert!(matches!(err, FilterError::Configuration(_)));
    }

    #[test]
    fn unknown_operator_is_configuration_error() {
        let raw = r#"{
            "rules": [{
                "predicate": "All",
                "conditions": [{"field": "Subject", "predicate": "matches_regex", "value": "x"}],
                "actions": []
            }]
        }"#;
        let err = RuleSet::from_json(raw).unwrap_err();
        assert!(matches!(err, FilterError::Configuration(_)));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let raw = r#"{
            "version": 3,
            "rules": [{
                "predicate": "All",
                "enabled": true,
                "conditions": [
                    {"field": "From", "predicate": "contains", "value": "x", "note": "hi"}
                ],
                "actions": ["mark_as_read"]
            }]
        }"#;
        let rule_set = RuleSet::from_json(raw).unwrap();
        assert_eq!(rule_set.rules.len(), 1);
    }

    #[test]
    fn received_date_value_must_be_day_count() {
        let raw = r#"{
            "rules": [{
                "predicate": "All",
                "conditions": [{"field": "Received Date", "predicate": "less_than", "value": "soon"}],
                "actions": []
            }]
        }"#;
        let err = RuleSet::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("day count"));
    }

    #[test]
    fn received_date_rejects_substring_operators() {
        let raw = r#"{
            "rules": [{
                "name": "stale",
                "predicate": "All",
                "conditions": [{"field": "Received Date", "predicate": "contains", "value": "2"}],
                "actions": []
            }]
        }"#;
        let err = RuleSet::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("stale"));
    }

    #[test]
    fn received_date_accepts_spaced_and_compact_field_names() {
        for field in ["Received Date", "ReceivedDate"] {
            let raw = format!(
                r#"{{
                    "rules": [{{
                        "predicate": "All",
                        "conditions": [{{"field": "{field}", "predicate": "greater_than", "value": "7"}}],
                        "actions": []
                    }}]
                }}"#
            );
            let rule_set = RuleSet::from_json(&raw).unwrap();
            assert_eq!(rule_set.rules[0].conditions[0].field, ConditionField::ReceivedDate);
        }
    }
}
