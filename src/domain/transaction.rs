use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::common::{Displayable, Identifiable};

/// A normalized ledger movement read from one category collection.
///
/// Transactions are read-only to the engine: they are created by the entry
/// flows, never mutated once stored, and removed only by explicit delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub category: Category,
    pub amount: f64,
    pub description: String,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        amount: f64,
        description: impl Into<String>,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            amount,
            description: description.into(),
            occurred_at,
        }
    }

    /// Presentation label for the record date; undated records render as
    /// "date unavailable" instead of breaking the history view.
    pub fn date_label(&self) -> String {
        match self.occurred_at {
            Some(ts) => ts.format("%Y-%m-%d").to_string(),
            None => "date unavailable".into(),
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!(
            "{}: {:.2} - {}",
            self.category,
            self.amount,
            self.date_label()
        )
    }
}
