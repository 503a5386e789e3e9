use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("You don't have permission to {0}")]
    Forbidden(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Allocated amount {allocated} exceeds total income {income}")]
    AllocationExceedsIncome { allocated: Decimal, income: Decimal },

    #[error("Completed budgets cannot be {0}")]
    BudgetClosed(String),

    #[error("{0}")]
    Validation(String),

    /// Storage failure, message carries the failed action and the driver error.
    #[error("{0}")]
    Repository(String),

    #[error("Advisor failed: {0}")]
    Advisor(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
