use serde::{Deserialize, Serialize};

use crate::domain::category::Category;

/// Per-category totals derived from one complete aggregation pass.
///
/// Never persisted; recomputed on every pass and only ever built from a
/// snapshot in which all five category reads succeeded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregateTotals {
    pub income: f64,
    pub tithe: f64,
    pub offering: f64,
    pub investment: f64,
    pub expense: f64,
}

impl AggregateTotals {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Income => self.income,
            Category::Tithe => self.tithe,
            Category::Offering => self.offering,
            Category::Investment => self.investment,
            Category::Expense => self.expense,
        }
    }

    pub fn set(&mut self, category: Category, total: f64) {
        match category {
            Category::Income => self.income = total,
            Category::Tithe => self.tithe = total,
            Category::Offering => self.offering = total,
            Category::Investment => self.investment = total,
            Category::Expense => self.expense = total,
        }
    }

    /// Net balance: income minus everything set aside or spent.
    pub fn balance(&self) -> f64 {
        self.income - (self.tithe + self.offering + self.investment + self.expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_subtracts_outflows_from_income() {
        let totals = AggregateTotals {
            income: 1000.0,
            tithe: 100.0,
            offering: 50.0,
            investment: 200.0,
            expense: 400.0,
        };
        assert!((totals.balance() - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn get_and_set_cover_every_category() {
        let mut totals = AggregateTotals::default();
        for (index, category) in Category::ALL.into_iter().enumerate() {
            totals.set(category, index as f64 + 1.0);
        }
        for (index, category) in Category::ALL.into_iter().enumerate() {
            assert_eq!(totals.get(category), index as f64 + 1.0);
        }
    }
}
