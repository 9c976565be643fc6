//! Filter engine - evaluates rules against stored messages

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{FilterError, FilterResult, FilterRule, MatchLogic, RuleSet};
use crate::db::StoredMessage;

/// One rule hit: which message matched, and the actions the rule carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub message_id: String,
    pub rule_name: Option<String>,
    pub actions: Vec<String>,
}

/// A (message, rule) pair whose evaluation failed.
#[derive(Debug)]
pub struct EvalFailure {
    pub message_id: String,
    pub rule_name: Option<String>,
    pub error: FilterError,
}

/// Outcome of a full engine pass.
#[derive(Debug, Default)]
pub struct EngineReport {
    pub matches: Vec<MatchResult>,
    pub failures: Vec<EvalFailure>,
}

/// Filter engine evaluating a rule set against message snapshots.
///
/// The wall clock is captured once at construction so date-relative
/// conditions see the same "now" across an entire run.
pub struct FilterEngine {
    now: DateTime<Utc>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::with_now(Utc::now())
    }

    /// Create an engine with an injected clock (tests, replayed runs).
    pub fn with_now(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Test if a single rule matches a message.
    ///
    /// Conditions are evaluated in listed order. An empty condition list is
    /// vacuously true under `All` and false under `Any`.
    pub fn matches(&self, message: &StoredMessage, rule: &FilterRule) -> FilterResult<bool> {
        let mut verdicts = Vec::with_capacity(rule.conditions.len());
        for condition in &rule.conditions {
            verdicts.push(condition.evaluate(message, self.now)?);
        }

        let matched = match rule.match_logic {
            MatchLogic::All => verdicts.iter().all(|v| *v),
            MatchLogic::Any => verdicts.iter().any(|v| *v),
        };
        Ok(matched)
    }

    /// Evaluate every rule against every message.
    ///
    /// Full cross product, messages outer / rules inner, input order
    /// preserved. Every match is reported; nothing is deduplicated. A failing
    /// (message, rule) pair is recorded and the pass continues.
    pub fn run(&self, messages: &[StoredMessage], rule_set: &RuleSet) -> EngineReport {
        let mut report = EngineReport::default();

        for message in messages {
            for (index, rule) in rule_set.rules.iter().enumerate() {
                match self.matches(message, rule) {
                    Ok(true) => {
                        log::info!(
                            "Rule {} matched message {} (actions: {:?})",
                            rule.label(index),
                            message.id,
                            rule.actions
                        );
                        report.matches.push(MatchResult {
                            message_id: message.id.clone(),
                            rule_name: rule.name.clone(),
                            actions: rule.actions.clone(),
                        });
                    }
                    Ok(false) => {}
                    Err(error) => {
                        log::warn!(
                            "Rule {} failed on message {}: {}",
                            rule.label(index),
                            message.id,
                            error
                        );
                        report.failures.push(EvalFailure {
                            message_id: message.id.clone(),
                            rule_name: rule.name.clone(),
                            error,
                        });
                    }
                }
            }
        }

        report
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}
