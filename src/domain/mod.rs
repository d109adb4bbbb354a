pub mod budget;
pub mod category;
pub mod common;
pub mod goal;
pub mod totals;
pub mod transaction;

pub use budget::BudgetLine;
pub use category::Category;
pub use goal::Goal;
pub use totals::AggregateTotals;
pub use transaction::Transaction;
