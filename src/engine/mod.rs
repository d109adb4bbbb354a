//! The engine façade: refresh passes over the category store plus the
//! validated mutation flows the entry screens drive.

pub mod aggregation;
pub mod budget;
pub mod goal;
pub mod report;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map};
use tracing::{debug, warn};

use crate::domain::budget::BudgetLine;
use crate::domain::category::Category;
use crate::domain::goal::Goal;
use crate::domain::totals::AggregateTotals;
use crate::domain::transaction::Transaction;
use crate::errors::{EngineError, EngineResult};
use crate::normalize;
use crate::storage::{CategoryStore, Collection};

pub use aggregation::{compute_tithe, total_of, Snapshot, TITHE_RATE};
pub use budget::{BudgetOverview, BudgetSummary};
pub use report::{ConsolidatedSummary, HistoryFilter};

/// Result of a refresh pass. A pass that was superseded by a newer one
/// before completing hands back nothing: stale snapshots are discarded,
/// never merged (last-started-completes-wins).
#[derive(Debug)]
pub enum RefreshOutcome {
    Fresh(Snapshot),
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PassToken(u64);

/// Orchestrates aggregation passes and validated mutations over one
/// category store. Holds no aggregate state of its own; every read
/// operation recomputes from a fresh store snapshot.
pub struct Engine {
    store: Arc<dyn CategoryStore>,
    pass_seq: AtomicU64,
}

impl Engine {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self {
            store,
            pass_seq: AtomicU64::new(0),
        }
    }

    pub(crate) fn begin_pass(&self) -> PassToken {
        PassToken(self.pass_seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn is_current(&self, token: PassToken) -> bool {
        self.pass_seq.load(Ordering::SeqCst) == token.0
    }

    /// Runs a full aggregation pass and returns its immutable snapshot,
    /// unless a newer pass started in the meantime.
    pub fn refresh(&self) -> EngineResult<RefreshOutcome> {
        let token = self.begin_pass();
        let snapshot = aggregation::collect_snapshot(self.store.as_ref())?;
        if self.is_current(token) {
            Ok(RefreshOutcome::Fresh(snapshot))
        } else {
            warn!(pass = token.0, "discarding superseded aggregation pass");
            Ok(RefreshOutcome::Superseded)
        }
    }

    /// Fresh totals from a complete pass; fails closed if any category
    /// cannot be read.
    pub fn get_aggregate_totals(&self) -> EngineResult<AggregateTotals> {
        Ok(aggregation::collect_snapshot(self.store.as_ref())?.totals)
    }

    /// Time-ordered merged history across all five categories, optionally
    /// filtered by category label and/or date prefix.
    pub fn get_history(&self, filter: Option<&HistoryFilter>) -> EngineResult<Vec<Transaction>> {
        let snapshot = aggregation::collect_snapshot(self.store.as_ref())?;
        let history = report::merge_history(&snapshot);
        Ok(match filter {
            Some(filter) => filter.apply(history),
            None => history,
        })
    }

    pub fn get_budget_summary(&self) -> EngineResult<BudgetOverview> {
        let lines = budget::list_lines(self.store.as_ref())?;
        let summary = budget::summarize(&lines);
        Ok(BudgetOverview { lines, summary })
    }

    pub fn get_goals(&self) -> EngineResult<Vec<Goal>> {
        goal::list_goals(self.store.as_ref())
    }

    pub fn build_consolidated_summary(&self) -> EngineResult<ConsolidatedSummary> {
        report::build_consolidated_summary(self.store.as_ref())
    }

    /// Records a new transaction in `category`, stamped with the current
    /// time.
    pub fn add_transaction(
        &self,
        category: Category,
        amount: f64,
        description: &str,
    ) -> EngineResult<Transaction> {
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::Validation(
                "transaction description must not be empty".into(),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::Validation(
                "transaction amount must be a positive number".into(),
            ));
        }
        self.write_transaction(category, amount, description)
    }

    pub fn delete_transaction(&self, category: Category, id: &str) -> EngineResult<()> {
        self.store.delete_one(Collection::Category(category), id)?;
        Ok(())
    }

    /// Computes the 10% tithe suggestion from current total income and
    /// persists it as a new tithe record. Income records are never
    /// touched. Fails with a validation error when there is no income to
    /// tithe on.
    pub fn post_tithe(&self) -> EngineResult<Transaction> {
        let records = self
            .store
            .list_all(Collection::Category(Category::Income))
            .map_err(|err| {
                warn!(%err, "income read failed while computing tithe");
                EngineError::ReadFailure {
                    category: Category::Income,
                }
            })?;
        let (transactions, skipped) = normalize::normalize_all(Category::Income, &records);
        if skipped > 0 {
            debug!(skipped, "ignored malformed income records while computing tithe");
        }
        let total_income = total_of(Category::Income, &transactions);
        if transactions.is_empty() {
            return Err(EngineError::Validation(
                "no income recorded; add income before computing a tithe".into(),
            ));
        }
        let amount = compute_tithe(total_income);
        self.write_transaction(Category::Tithe, amount, "tithe (10% of income)")
    }

    fn write_transaction(
        &self,
        category: Category,
        amount: f64,
        description: &str,
    ) -> EngineResult<Transaction> {
        let occurred_at = Utc::now();
        let mut fields = Map::new();
        fields.insert("amount".into(), json!(amount));
        fields.insert("description".into(), json!(description));
        fields.insert("occurred_at".into(), json!(occurred_at.to_rfc3339()));
        let id = self
            .store
            .write_one(Collection::Category(category), fields)?;
        Ok(Transaction::new(
            id,
            category,
            amount,
            description,
            Some(occurred_at),
        ))
    }

    // Budget line flows.

    pub fn add_budget_line(&self, label: &str, limit: f64) -> EngineResult<BudgetLine> {
        budget::add_line(self.store.as_ref(), label, limit)
    }

    pub fn record_spent(&self, id: &str, new_spent: f64) -> EngineResult<()> {
        budget::record_spent(self.store.as_ref(), id, new_spent)
    }

    pub fn delete_budget_line(&self, id: &str) -> EngineResult<()> {
        budget::delete_line(self.store.as_ref(), id)
    }

    // Goal flows.

    pub fn add_goal(
        &self,
        description: &str,
        target: f64,
        deadline: &str,
        initial_saved: f64,
    ) -> EngineResult<Goal> {
        goal::add_goal(self.store.as_ref(), description, target, deadline, initial_saved)
    }

    pub fn update_saved(&self, id: &str, new_saved: f64) -> EngineResult<()> {
        goal::update_saved(self.store.as_ref(), id, new_saved)
    }

    pub fn delete_goal(&self, id: &str) -> EngineResult<()> {
        goal::delete_goal(self.store.as_ref(), id)
    }
}
