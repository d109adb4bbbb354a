//! Aggregation passes: concurrent category reads joined into one
//! consistent snapshot, plus the derived total arithmetic.

use std::collections::BTreeMap;
use std::thread;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::category::Category;
use crate::domain::totals::AggregateTotals;
use crate::domain::transaction::Transaction;
use crate::errors::{EngineError, EngineResult};
use crate::normalize;
use crate::storage::{CategoryStore, Collection};

/// Suggested contribution rate applied to total income.
pub const TITHE_RATE: f64 = 0.10;

/// Immutable result of one complete aggregation pass.
///
/// Built only when all five category reads succeed; a partial snapshot is
/// never exposed.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub transactions: BTreeMap<Category, Vec<Transaction>>,
    pub skipped: BTreeMap<Category, usize>,
    pub totals: AggregateTotals,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn category(&self, category: Category) -> &[Transaction] {
        self.transactions
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Records excluded from totals across the whole pass.
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Sum of amounts over transactions with the matching category.
pub fn total_of(category: Category, transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|txn| txn.category == category)
        .map(|txn| txn.amount)
        .sum()
}

/// The 10% suggestion derived from total income. Pure arithmetic; posting
/// it as a tithe record is a separate, explicit operation.
pub fn compute_tithe(total_income: f64) -> f64 {
    total_income * TITHE_RATE
}

/// Reads all five categories concurrently and joins them into a
/// [`Snapshot`]. Any single failed read fails the whole pass with
/// [`EngineError::ReadFailure`] naming the category.
pub fn collect_snapshot(store: &dyn CategoryStore) -> EngineResult<Snapshot> {
    let reads = thread::scope(|scope| {
        let handles: Vec<_> = Category::ALL
            .into_iter()
            .map(|category| {
                let handle =
                    scope.spawn(move || store.list_all(Collection::Category(category)));
                (category, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(category, handle)| (category, handle.join()))
            .collect::<Vec<_>>()
    });

    let mut transactions = BTreeMap::new();
    let mut skipped = BTreeMap::new();
    let mut totals = AggregateTotals::default();

    for (category, outcome) in reads {
        let records = match outcome {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                warn!(%category, %err, "category read failed; voiding the pass");
                return Err(EngineError::ReadFailure { category });
            }
            Err(_) => {
                warn!(%category, "category read worker panicked; voiding the pass");
                return Err(EngineError::ReadFailure { category });
            }
        };
        let (normalized, skips) = normalize::normalize_all(category, &records);
        totals.set(category, total_of(category, &normalized));
        transactions.insert(category, normalized);
        skipped.insert(category, skips);
    }

    let snapshot = Snapshot {
        transactions,
        skipped,
        totals,
        fetched_at: Utc::now(),
    };
    debug!(
        balance = snapshot.totals.balance(),
        skipped = snapshot.skipped_total(),
        "aggregation pass complete"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::{json, Map, Value};

    fn seed(store: &MemoryStore, category: Category, amounts: &[Value]) {
        for amount in amounts {
            let mut fields = Map::new();
            fields.insert("amount".into(), amount.clone());
            store
                .write_one(Collection::Category(category), fields)
                .unwrap();
        }
    }

    fn txn(category: Category, amount: f64) -> Transaction {
        Transaction::new("t", category, amount, "x", None)
    }

    #[test]
    fn total_of_sums_matching_category_only() {
        let transactions = vec![
            txn(Category::Income, 100.0),
            txn(Category::Income, 50.5),
            txn(Category::Expense, 30.0),
        ];
        assert!((total_of(Category::Income, &transactions) - 150.5).abs() < 1e-9);
        assert!((total_of(Category::Expense, &transactions) - 30.0).abs() < 1e-9);
        assert_eq!(total_of(Category::Offering, &transactions), 0.0);
    }

    #[test]
    fn total_of_is_order_invariant() {
        let mut transactions = vec![
            txn(Category::Income, 12.34),
            txn(Category::Income, 56.78),
            txn(Category::Income, 90.12),
        ];
        let forward = total_of(Category::Income, &transactions);
        transactions.reverse();
        let backward = total_of(Category::Income, &transactions);
        assert_eq!(forward, backward);
    }

    #[test]
    fn tithe_is_ten_percent_of_income() {
        assert_eq!(compute_tithe(1000.0), 100.0);
        assert_eq!(compute_tithe(0.0), 0.0);
    }

    #[test]
    fn snapshot_totals_reflect_every_category() {
        let store = MemoryStore::new();
        seed(&store, Category::Income, &[json!(1000.0)]);
        seed(&store, Category::Tithe, &[json!(100.0)]);
        seed(&store, Category::Offering, &[json!(50.0)]);
        seed(&store, Category::Investment, &[json!(200.0)]);
        seed(&store, Category::Expense, &[json!(400.0)]);

        let snapshot = collect_snapshot(&store).unwrap();
        assert_eq!(snapshot.totals.income, 1000.0);
        assert!((snapshot.totals.balance() - 250.0).abs() < 1e-9);
        assert_eq!(snapshot.skipped_total(), 0);
    }

    #[test]
    fn malformed_records_are_counted_not_fatal() {
        let store = MemoryStore::new();
        seed(
            &store,
            Category::Income,
            &[json!(100.0), json!("garbage"), json!(-5.0)],
        );
        let snapshot = collect_snapshot(&store).unwrap();
        assert_eq!(snapshot.totals.income, 100.0);
        assert_eq!(snapshot.skipped[&Category::Income], 2);
        assert_eq!(snapshot.category(Category::Income).len(), 1);
    }

    #[test]
    fn one_failed_category_voids_the_whole_pass() {
        let store = MemoryStore::new();
        seed(&store, Category::Income, &[json!(1000.0)]);
        store.fail_reads(Collection::Category(Category::Expense));

        let err = collect_snapshot(&store).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ReadFailure {
                category: Category::Expense
            }
        ));
    }

    #[test]
    fn empty_categories_are_successful_zero_totals() {
        let store = MemoryStore::new();
        let snapshot = collect_snapshot(&store).unwrap();
        assert_eq!(snapshot.totals, AggregateTotals::default());
        assert_eq!(snapshot.totals.balance(), 0.0);
    }
}
