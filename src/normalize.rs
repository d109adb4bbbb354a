//! Converts raw stored documents into uniform [`Transaction`] values.
//!
//! Malformed amounts never abort a pass: the record is marked skipped,
//! counted, logged, and left in the store untouched.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::domain::category::Category;
use crate::domain::transaction::Transaction;
use crate::storage::RawRecord;

pub const DEFAULT_DESCRIPTION: &str = "no description";

const AMOUNT_FIELD: &str = "amount";
const DESCRIPTION_FIELD: &str = "description";
const OCCURRED_AT_FIELD: &str = "occurred_at";

/// Outcome of normalizing a single stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Transaction(Transaction),
    Skipped { id: String, reason: SkipReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingAmount,
    UnparsableAmount,
    NonPositiveAmount,
}

pub fn normalize(category: Category, record: &RawRecord) -> Normalized {
    let amount = match record.fields.get(AMOUNT_FIELD) {
        None => return skipped(category, record, SkipReason::MissingAmount),
        Some(value) => match parse_amount(value) {
            None => return skipped(category, record, SkipReason::UnparsableAmount),
            Some(amount) if !amount.is_finite() => {
                return skipped(category, record, SkipReason::UnparsableAmount)
            }
            Some(amount) if amount <= 0.0 => {
                return skipped(category, record, SkipReason::NonPositiveAmount)
            }
            Some(amount) => amount,
        },
    };

    let description = record
        .fields
        .get(DESCRIPTION_FIELD)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned());

    let occurred_at = record.fields.get(OCCURRED_AT_FIELD).and_then(parse_timestamp);

    Normalized::Transaction(Transaction::new(
        record.id.clone(),
        category,
        amount,
        description,
        occurred_at,
    ))
}

/// Normalizes a whole collection read, returning the usable transactions
/// and how many records were skipped.
pub fn normalize_all(category: Category, records: &[RawRecord]) -> (Vec<Transaction>, usize) {
    let mut transactions = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        match normalize(category, record) {
            Normalized::Transaction(txn) => transactions.push(txn),
            Normalized::Skipped { .. } => skipped += 1,
        }
    }
    (transactions, skipped)
}

fn skipped(category: Category, record: &RawRecord, reason: SkipReason) -> Normalized {
    warn!(id = %record.id, %category, ?reason, "skipping malformed record");
    Normalized::Skipped {
        id: record.id.clone(),
        reason,
    }
}

/// Amounts arrive as JSON numbers or as user-typed strings with either
/// decimal separator.
fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .replace(' ', "")
            .replace(',', ".")
            .parse::<f64>()
            .ok(),
        _ => None,
    }
}

/// Timestamps arrive as RFC 3339 strings or epoch milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn record(entries: &[(&str, Value)]) -> RawRecord {
        let mut fields = Map::new();
        for (key, value) in entries {
            fields.insert((*key).into(), value.clone());
        }
        RawRecord {
            id: "r1".into(),
            fields,
        }
    }

    #[test]
    fn numeric_amount_produces_a_transaction() {
        let raw = record(&[
            ("amount", json!(150.75)),
            ("description", json!("salary")),
            ("occurred_at", json!("2024-01-05T12:00:00Z")),
        ]);
        match normalize(Category::Income, &raw) {
            Normalized::Transaction(txn) => {
                assert_eq!(txn.amount, 150.75);
                assert_eq!(txn.description, "salary");
                assert_eq!(txn.date_label(), "2024-01-05");
            }
            other => panic!("expected transaction, got {other:?}"),
        }
    }

    #[test]
    fn string_amount_accepts_comma_separator() {
        let raw = record(&[("amount", json!("1234,56"))]);
        match normalize(Category::Expense, &raw) {
            Normalized::Transaction(txn) => assert_eq!(txn.amount, 1234.56),
            other => panic!("expected transaction, got {other:?}"),
        }
    }

    #[test]
    fn missing_description_gets_the_default() {
        let raw = record(&[("amount", json!(10))]);
        match normalize(Category::Offering, &raw) {
            Normalized::Transaction(txn) => {
                assert_eq!(txn.description, DEFAULT_DESCRIPTION);
                assert_eq!(txn.occurred_at, None);
            }
            other => panic!("expected transaction, got {other:?}"),
        }
    }

    #[test]
    fn millisecond_timestamps_are_accepted() {
        let raw = record(&[("amount", json!(5)), ("occurred_at", json!(1704456000000i64))]);
        match normalize(Category::Tithe, &raw) {
            Normalized::Transaction(txn) => {
                assert_eq!(txn.date_label(), "2024-01-05");
            }
            other => panic!("expected transaction, got {other:?}"),
        }
    }

    #[test]
    fn zero_and_negative_amounts_are_skipped() {
        for bad in [json!(0), json!(-3.5)] {
            let raw = record(&[("amount", bad)]);
            assert!(matches!(
                normalize(Category::Income, &raw),
                Normalized::Skipped {
                    reason: SkipReason::NonPositiveAmount,
                    ..
                }
            ));
        }
    }

    #[test]
    fn garbage_amounts_are_skipped_not_fatal() {
        for bad in [json!("not a number"), json!("NaN"), json!(true), json!(null)] {
            let raw = record(&[("amount", bad)]);
            assert!(matches!(
                normalize(Category::Income, &raw),
                Normalized::Skipped {
                    reason: SkipReason::UnparsableAmount,
                    ..
                }
            ));
        }
    }

    #[test]
    fn absent_amount_is_its_own_skip_reason() {
        let raw = record(&[("description", json!("dangling"))]);
        assert!(matches!(
            normalize(Category::Expense, &raw),
            Normalized::Skipped {
                reason: SkipReason::MissingAmount,
                ..
            }
        ));
    }

    #[test]
    fn normalize_all_counts_skips_without_dropping_good_records() {
        let records = vec![
            record(&[("amount", json!(10))]),
            record(&[("amount", json!("oops"))]),
            record(&[("amount", json!(20))]),
        ];
        let (transactions, skipped) = normalize_all(Category::Investment, &records);
        assert_eq!(transactions.len(), 2);
        assert_eq!(skipped, 1);
    }
}
