//! Report compilation: the merged history feed and the consolidated
//! summary payload for external renderers.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::totals::AggregateTotals;
use crate::domain::transaction::Transaction;
use crate::errors::EngineResult;
use crate::storage::CategoryStore;

use super::aggregation::{self, Snapshot};

/// Flattens the five category feeds of a snapshot into one list sorted
/// descending by date; undated records sort last.
pub fn merge_history(snapshot: &Snapshot) -> Vec<Transaction> {
    let mut history: Vec<Transaction> = snapshot
        .transactions
        .values()
        .flat_map(|transactions| transactions.iter().cloned())
        .collect();
    history.sort_by(newest_first);
    history
}

fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    match (a.occurred_at, b.occurred_at) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// History filter: case-insensitive substring match on the category label
/// and/or an ISO-date prefix such as `"2024-01"`. Both conditions must
/// hold when both are set; undated records never match a date prefix.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub type_substring: Option<String>,
    pub year_month_prefix: Option<String>,
}

impl HistoryFilter {
    pub fn by_type(substring: impl Into<String>) -> Self {
        Self {
            type_substring: Some(substring.into()),
            ..Self::default()
        }
    }

    pub fn by_date_prefix(prefix: impl Into<String>) -> Self {
        Self {
            year_month_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(needle) = &self.type_substring {
            let label = transaction.category.label().to_lowercase();
            if !label.contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(prefix) = &self.year_month_prefix {
            match transaction.occurred_at {
                Some(ts) => {
                    if !ts.to_rfc3339().starts_with(prefix.as_str()) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    pub fn apply(&self, history: Vec<Transaction>) -> Vec<Transaction> {
        history.into_iter().filter(|txn| self.matches(txn)).collect()
    }
}

/// The single structured payload handed to an external renderer or
/// exporter: totals plus the itemized per-category detail. Plain data,
/// no formatting logic.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedSummary {
    pub totals: AggregateTotals,
    pub balance: f64,
    pub per_category: BTreeMap<Category, Vec<Transaction>>,
    pub generated_at: DateTime<Utc>,
}

/// Builds the consolidated summary from a fresh complete pass. A failed
/// read of any single category aborts the whole summary; a partially
/// correct report is never returned.
pub fn build_consolidated_summary(store: &dyn CategoryStore) -> EngineResult<ConsolidatedSummary> {
    let snapshot = aggregation::collect_snapshot(store)?;
    let totals = snapshot.totals;
    let generated_at = snapshot.fetched_at;
    let mut per_category = snapshot.transactions;
    for transactions in per_category.values_mut() {
        transactions.sort_by(newest_first);
    }
    Ok(ConsolidatedSummary {
        totals,
        balance: totals.balance(),
        per_category,
        generated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use crate::storage::{Collection, MemoryStore};
    use chrono::TimeZone;
    use serde_json::{json, Map};

    fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn txn(category: Category, occurred_at: Option<DateTime<Utc>>) -> Transaction {
        Transaction::new("t", category, 10.0, "x", occurred_at)
    }

    fn snapshot_of(transactions: Vec<Transaction>) -> Snapshot {
        let mut by_category: BTreeMap<Category, Vec<Transaction>> = BTreeMap::new();
        for txn in transactions {
            by_category.entry(txn.category).or_default().push(txn);
        }
        Snapshot {
            transactions: by_category,
            skipped: BTreeMap::new(),
            totals: AggregateTotals::default(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn history_sorts_newest_first_with_undated_last() {
        let snapshot = snapshot_of(vec![
            txn(Category::Income, Some(ts(2024, 1, 5))),
            txn(Category::Offering, Some(ts(2024, 2, 1))),
            txn(Category::Expense, None),
        ]);
        let history = merge_history(&snapshot);
        let dates: Vec<_> = history.iter().map(|t| t.date_label()).collect();
        assert_eq!(dates, vec!["2024-02-01", "2024-01-05", "date unavailable"]);
    }

    #[test]
    fn date_prefix_filter_matches_year_and_month() {
        let snapshot = snapshot_of(vec![
            txn(Category::Income, Some(ts(2024, 1, 5))),
            txn(Category::Offering, Some(ts(2024, 2, 1))),
            txn(Category::Expense, None),
        ]);
        let history = merge_history(&snapshot);
        let filtered = HistoryFilter::by_date_prefix("2024-01").apply(history);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date_label(), "2024-01-05");
    }

    #[test]
    fn type_filter_is_case_insensitive_substring() {
        let snapshot = snapshot_of(vec![
            txn(Category::Income, Some(ts(2024, 1, 5))),
            txn(Category::Investment, Some(ts(2024, 1, 6))),
            txn(Category::Tithe, Some(ts(2024, 1, 7))),
        ]);
        let history = merge_history(&snapshot);
        // "in" hits both Income and Investment.
        let filtered = HistoryFilter::by_type("IN").apply(history);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn filters_compose_with_logical_and() {
        let snapshot = snapshot_of(vec![
            txn(Category::Income, Some(ts(2024, 1, 5))),
            txn(Category::Income, Some(ts(2024, 2, 5))),
            txn(Category::Expense, Some(ts(2024, 1, 9))),
        ]);
        let history = merge_history(&snapshot);
        let filter = HistoryFilter {
            type_substring: Some("income".into()),
            year_month_prefix: Some("2024-01".into()),
        };
        let filtered = filter.apply(history);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category, Category::Income);
        assert_eq!(filtered[0].date_label(), "2024-01-05");
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let snapshot = snapshot_of(vec![
            txn(Category::Income, Some(ts(2024, 1, 5))),
            txn(Category::Expense, None),
        ]);
        let history = merge_history(&snapshot);
        assert_eq!(HistoryFilter::default().apply(history).len(), 2);
    }

    #[test]
    fn summary_fails_closed_when_one_category_is_unreadable() {
        let store = MemoryStore::new();
        for category in [Category::Income, Category::Tithe, Category::Offering] {
            let mut fields = Map::new();
            fields.insert("amount".into(), json!(10.0));
            store
                .write_one(Collection::Category(category), fields)
                .unwrap();
        }
        store.fail_reads(Collection::Category(Category::Expense));

        let err = build_consolidated_summary(&store).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ReadFailure {
                category: Category::Expense
            }
        ));
    }

    #[test]
    fn summary_carries_totals_and_ordered_detail() {
        let store = MemoryStore::new();
        let mut older = Map::new();
        older.insert("amount".into(), json!(100.0));
        older.insert("occurred_at".into(), json!("2024-01-05T12:00:00Z"));
        let mut newer = Map::new();
        newer.insert("amount".into(), json!(200.0));
        newer.insert("occurred_at".into(), json!("2024-03-01T12:00:00Z"));
        store
            .write_one(Collection::Category(Category::Income), older)
            .unwrap();
        store
            .write_one(Collection::Category(Category::Income), newer)
            .unwrap();

        let summary = build_consolidated_summary(&store).unwrap();
        assert_eq!(summary.totals.income, 300.0);
        assert_eq!(summary.balance, 300.0);
        let income = &summary.per_category[&Category::Income];
        assert_eq!(income[0].date_label(), "2024-03-01");
        assert_eq!(income[1].date_label(), "2024-01-05");
    }

    #[test]
    fn summary_serializes_for_external_renderers() {
        let store = MemoryStore::new();
        let summary = build_consolidated_summary(&store).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("totals").is_some());
        assert!(json.get("per_category").is_some());
    }
}
