//! Plain data types: expenses, budgets, categories, alert markers and user scopes.

pub mod alert;
pub mod budget;
pub mod category;
pub mod common;
pub mod expense;
pub mod user;

pub use alert::{MarkerSet, NotificationMarker, ThresholdTier};
pub use budget::{Budget, BudgetMetrics, BudgetStatus, NewBudget};
pub use category::{Category, CategoryRegistry, DEFAULT_CATEGORIES};
pub use common::{
    month_start_back, parse_amount, validate_amount, BudgetPeriod, Displayable, Identifiable,
    NamedEntity,
};
pub use expense::{Expense, NewExpense};
pub use user::{UserRecord, UserScope};
