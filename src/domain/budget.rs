use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, Identifiable};

/// A spending guardrail for a user-labeled category.
///
/// `spent` is entered by the user through an explicit update action; it is
/// not derived from the expense ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetLine {
    pub id: String,
    pub category_label: String,
    pub limit: f64,
    pub spent: f64,
}

impl BudgetLine {
    pub fn new(id: impl Into<String>, category_label: impl Into<String>, limit: f64) -> Self {
        Self {
            id: id.into(),
            category_label: category_label.into(),
            limit,
            spent: 0.0,
        }
    }

    /// True when recorded spending exceeds the limit. Surfaced to callers
    /// for presentation; the engine raises no alert beyond this flag.
    pub fn overrun(&self) -> bool {
        self.spent > self.limit
    }
}

impl Identifiable for BudgetLine {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for BudgetLine {
    fn display_label(&self) -> String {
        format!(
            "{}: {:.2} / {:.2}",
            self.category_label, self.spent, self.limit
        )
    }
}
