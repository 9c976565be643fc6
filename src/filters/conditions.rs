//! Filter condition matching logic

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::db::StoredMessage;
use crate::filters::{FilterError, FilterResult};

/// Date pattern stored messages carry, e.g. `Mon, 19 Jul 2021 10:00:00 +0000`
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Filter condition to match against stored messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: ConditionField,
    #[serde(rename = "predicate")]
    pub operator: ConditionOperator,
    pub value: String,
}

/// Message fields that can be filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionField {
    From,
    Subject,
    #[serde(rename = "Received Date", alias = "ReceivedDate")]
    ReceivedDate,
}

/// Comparison operators for conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
}

impl FilterCondition {
    /// Test this condition against a message.
    ///
    /// Text fields compare exactly (case-sensitive); `Received Date` compares
    /// the message's timestamp against `now` minus the condition's day count.
    pub fn evaluate(&self, message: &StoredMessage, now: DateTime<Utc>) -> FilterResult<bool> {
        match self.field {
            ConditionField::From => Ok(self.compare_text(&message.from_address)),
            ConditionField::Subject => Ok(self.compare_text(&message.subject)),
            ConditionField::ReceivedDate => self.compare_date(&message.date, now),
        }
    }

    fn compare_text(&self, field_value: &str) -> bool {
        match self.operator {
            ConditionOperator::Contains => field_value.contains(&self.value),
            ConditionOperator::NotContains => !field_value.contains(&self.value),
            ConditionOperator::Equals => field_value == self.value,
            ConditionOperator::NotEquals => field_value != self.value,
            ConditionOperator::LessThan => field_value < self.value.as_str(),
            ConditionOperator::GreaterThan => field_value > self.value.as_str(),
        }
    }

    /// Chronological comparison: `greater_than` means the message is newer
    /// than the cutoff, `less_than` that it is older.
    fn compare_date(&self, date: &str, now: DateTime<Utc>) -> FilterResult<bool> {
        let received = parse_message_date(date)?.with_timezone(&Utc);
        let days = self.value.trim().parse::<i64>().map_err(|_| {
            FilterError::Configuration(format!(
                "\"Received Date\" value {:?} is not a day count",
                self.value
            ))
        })?;
        let cutoff = now - Duration::days(days);

        let verdict = match self.operator {
            ConditionOperator::Equals => received == cutoff,
            ConditionOperator::NotEquals => received != cutoff,
            ConditionOperator::LessThan => received < cutoff,
            ConditionOperator::GreaterThan => received > cutoff,
            ConditionOperator::Contains | ConditionOperator::NotContains => {
                return Err(FilterError::Configuration(
                    "substring operators do not apply to \"Received Date\"".to_string(),
                ));
            }
        };
        Ok(verdict)
    }
}

/// Parse a stored message date under the fixed RFC 822 pattern.
pub fn parse_message_date(date: &str) -> FilterResult<DateTime<FixedOffset>> {
    DateTime::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| FilterError::FieldParse {
        value: date.to_string(),
    })
}
