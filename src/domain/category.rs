//! Domain types for the five transaction categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five ledger movement kinds tracked by the engine.
///
/// Budget lines and goals live in their own collections and are not
/// categories; see [`crate::storage::Collection`].
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Category {
    Income,
    Tithe,
    Offering,
    Investment,
    Expense,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Income,
        Category::Tithe,
        Category::Offering,
        Category::Investment,
        Category::Expense,
    ];

    /// Presentation label, also the target of history type filters.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Tithe => "Tithe",
            Category::Offering => "Offering",
            Category::Investment => "Investment",
            Category::Expense => "Expense",
        }
    }

    /// Store collection key for this category.
    pub fn collection_name(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Tithe => "tithe",
            Category::Offering => "offering",
            Category::Investment => "investment",
            Category::Expense => "expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
