//! Savings goal tracking: target amounts, deadlines, and saved progress.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::goal::Goal;
use crate::errors::{EngineError, EngineResult};
use crate::storage::{CategoryStore, Collection, RawRecord};

pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct GoalFields {
    description: String,
    target: f64,
    deadline: NaiveDate,
    #[serde(default)]
    saved: f64,
}

/// Creates a goal after validating description, target, and deadline.
/// The deadline must parse as `YYYY-MM-DD` and must not lie before today;
/// a deadline equal to today is accepted.
pub fn add_goal(
    store: &dyn CategoryStore,
    description: &str,
    target: f64,
    deadline: &str,
    initial_saved: f64,
) -> EngineResult<Goal> {
    add_goal_from(
        store,
        description,
        target,
        deadline,
        initial_saved,
        Utc::now().date_naive(),
    )
}

/// Deadline validation takes an explicit reference date so callers and
/// tests are not coupled to the wall clock.
pub fn add_goal_from(
    store: &dyn CategoryStore,
    description: &str,
    target: f64,
    deadline: &str,
    initial_saved: f64,
    today: NaiveDate,
) -> EngineResult<Goal> {
    let description = description.trim();
    if description.is_empty() {
        return Err(EngineError::Validation(
            "goal description must not be empty".into(),
        ));
    }
    if !target.is_finite() || target <= 0.0 {
        return Err(EngineError::Validation(
            "goal target must be a positive amount".into(),
        ));
    }
    let deadline = parse_deadline(deadline)?;
    if deadline < today {
        return Err(EngineError::Validation(
            "goal deadline must not be in the past".into(),
        ));
    }
    if !initial_saved.is_finite() || initial_saved < 0.0 {
        return Err(EngineError::Validation(
            "initial saved amount must be zero or a positive number".into(),
        ));
    }

    let mut fields = Map::new();
    fields.insert("description".into(), json!(description));
    fields.insert("target".into(), json!(target));
    fields.insert(
        "deadline".into(),
        json!(deadline.format(DEADLINE_FORMAT).to_string()),
    );
    fields.insert("saved".into(), json!(initial_saved));
    let id = store.write_one(Collection::Goals, fields)?;
    Ok(Goal {
        id,
        description: description.into(),
        target,
        deadline,
        saved: initial_saved,
    })
}

/// Overwrites the saved amount for a goal.
///
/// Zero is rejected along with negatives, matching the original update
/// flow; see DESIGN.md for why this strictness is kept as-is.
pub fn update_saved(store: &dyn CategoryStore, id: &str, new_saved: f64) -> EngineResult<()> {
    if !new_saved.is_finite() || new_saved <= 0.0 {
        return Err(EngineError::Validation(
            "saved amount must be a positive number".into(),
        ));
    }
    let mut fields = Map::new();
    fields.insert("saved".into(), json!(new_saved));
    store.update_fields(Collection::Goals, id, fields)?;
    Ok(())
}

pub fn delete_goal(store: &dyn CategoryStore, id: &str) -> EngineResult<()> {
    store.delete_one(Collection::Goals, id)?;
    Ok(())
}

/// All goals currently stored. Malformed goal records are logged and
/// skipped.
pub fn list_goals(store: &dyn CategoryStore) -> EngineResult<Vec<Goal>> {
    let records = store.list_all(Collection::Goals)?;
    Ok(records.into_iter().filter_map(decode_goal).collect())
}

fn decode_goal(record: RawRecord) -> Option<Goal> {
    match serde_json::from_value::<GoalFields>(Value::Object(record.fields)) {
        Ok(fields) => Some(Goal {
            id: record.id,
            description: fields.description,
            target: fields.target,
            deadline: fields.deadline,
            saved: fields.saved,
        }),
        Err(err) => {
            warn!(id = %record.id, %err, "skipping malformed goal record");
            None
        }
    }
}

fn parse_deadline(raw: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DEADLINE_FORMAT).map_err(|_| {
        EngineError::Validation("goal deadline must use the YYYY-MM-DD format".into())
    })
}
