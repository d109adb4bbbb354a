use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, Identifiable};

/// A savings goal with a target amount and a deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    pub description: String,
    pub target: f64,
    pub deadline: NaiveDate,
    pub saved: f64,
}

impl Goal {
    /// Completion percentage; may exceed 100 when savings pass the target.
    pub fn progress(&self) -> f64 {
        if self.target > 0.0 {
            self.saved / self.target * 100.0
        } else {
            0.0
        }
    }

    /// Derived read-only status; completed goals are never auto-archived.
    pub fn completed(&self) -> bool {
        self.progress() >= 100.0
    }

    pub fn deadline_passed(&self, today: NaiveDate) -> bool {
        self.deadline < today
    }
}

impl Identifiable for Goal {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Goal {
    fn display_label(&self) -> String {
        format!(
            "{}: {:.2}% ({:.2} of {:.2})",
            self.description,
            self.progress(),
            self.saved,
            self.target
        )
    }
}
