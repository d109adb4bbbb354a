//! Budget line tracking: user-set spending limits against user-recorded
//! spending.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::budget::BudgetLine;
use crate::errors::{EngineError, EngineResult};
use crate::storage::{CategoryStore, Collection, RawRecord};

#[derive(Debug, Deserialize)]
struct BudgetFields {
    category_label: String,
    limit: f64,
    #[serde(default)]
    spent: f64,
}

/// Creates a new budget line with zero spending recorded.
pub fn add_line(store: &dyn CategoryStore, label: &str, limit: f64) -> EngineResult<BudgetLine> {
    let label = label.trim();
    if label.is_empty() {
        return Err(EngineError::Validation(
            "budget label must not be empty".into(),
        ));
    }
    if !limit.is_finite() || limit <= 0.0 {
        return Err(EngineError::Validation(
            "budget limit must be a positive amount".into(),
        ));
    }

    let mut fields = Map::new();
    fields.insert("category_label".into(), json!(label));
    fields.insert("limit".into(), json!(limit));
    fields.insert("spent".into(), json!(0.0));
    let id = store.write_one(Collection::Budgets, fields)?;
    Ok(BudgetLine::new(id, label, limit))
}

/// Overwrites the recorded spending for a line. Absolute set, not an
/// increment; zero is allowed.
pub fn record_spent(store: &dyn CategoryStore, id: &str, new_spent: f64) -> EngineResult<()> {
    if !new_spent.is_finite() || new_spent < 0.0 {
        return Err(EngineError::Validation(
            "spent amount must be zero or a positive number".into(),
        ));
    }
    let mut fields = Map::new();
    fields.insert("spent".into(), json!(new_spent));
    store.update_fields(Collection::Budgets, id, fields)?;
    Ok(())
}

pub fn delete_line(store: &dyn CategoryStore, id: &str) -> EngineResult<()> {
    store.delete_one(Collection::Budgets, id)?;
    Ok(())
}

/// All budget lines currently stored. Malformed lines are logged and
/// skipped, mirroring how malformed transactions are handled.
pub fn list_lines(store: &dyn CategoryStore) -> EngineResult<Vec<BudgetLine>> {
    let records = store.list_all(Collection::Budgets)?;
    Ok(records.into_iter().filter_map(decode_line).collect())
}

fn decode_line(record: RawRecord) -> Option<BudgetLine> {
    match serde_json::from_value::<BudgetFields>(Value::Object(record.fields)) {
        Ok(fields) => Some(BudgetLine {
            id: record.id,
            category_label: fields.category_label,
            limit: fields.limit,
            spent: fields.spent,
        }),
        Err(err) => {
            warn!(id = %record.id, %err, "skipping malformed budget line");
            None
        }
    }
}

/// Roll-up across all budget lines. `used_percent` is `None` when no
/// limit has been set, instead of propagating a division by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_spent: f64,
    pub total_limit: f64,
    pub used_percent: Option<f64>,
}

pub fn summarize(lines: &[BudgetLine]) -> BudgetSummary {
    let total_spent: f64 = lines.iter().map(|line| line.spent).sum();
    let total_limit: f64 = lines.iter().map(|line| line.limit).sum();
    let used_percent = (total_limit > 0.0).then(|| total_spent / total_limit * 100.0);
    BudgetSummary {
        total_spent,
        total_limit,
        used_percent,
    }
}

/// Budget lines together with their roll-up, as handed to presentation.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetOverview {
    pub lines: Vec<BudgetLine>,
    pub summary: BudgetSummary,
}
