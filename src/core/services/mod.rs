pub mod budget_calculator;
pub mod budget_service;
pub mod expense_service;
pub mod summary_service;
pub mod threshold_notifier;
pub mod trends_service;

pub use budget_calculator::BudgetCalculator;
pub use budget_service::{BudgetService, UpsertOutcome};
pub use expense_service::ExpenseService;
pub use summary_service::{DashboardSummary, MonthComparison, SummaryService};
pub use threshold_notifier::{AlertPolicy, Evaluation, FiringAlert, ThresholdNotifier};
pub use trends_service::{CategoryTotal, MonthlyTotal, TrendsReport, TrendsService};

use crate::errors::BuddyError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Buddy(#[from] BuddyError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(String),
}

impl From<ServiceError> for BuddyError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Buddy(inner) => inner,
            ServiceError::Invalid(message) => BuddyError::InvalidInput(message),
            ServiceError::NotFound(message) => BuddyError::NotFound(message),
        }
    }
}
