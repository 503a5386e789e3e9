use crate::db::{budget_repository, connection, transaction_repository};
use crate::errors::{Error, Result};
use crate::models::budget::Budget;
use crate::models::transaction::Transaction;
use rusqlite::Connection;
use std::path::Path;

pub trait TransactionRepository {
    fn insert_transaction(&self, transaction: &Transaction) -> Result<()>;
    fn find_transaction(&self, id: &str) -> Result<Option<Transaction>>;
    /// Newest-created first.
    fn transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>>;
    fn save_transaction(&self, transaction: &Transaction) -> Result<()>;
    fn delete_transaction(&self, id: &str) -> Result<()>;
}

pub trait BudgetRepository {
    fn insert_budget(&self, budget: &Budget) -> Result<()>;
    fn find_budget(&self, id: &str) -> Result<Option<Budget>>;
    fn budgets_for_user(&self, user_id: &str) -> Result<Vec<Budget>>;
    fn save_budget(&self, budget: &Budget) -> Result<()>;
    fn delete_budget(&self, id: &str) -> Result<()>;
}

/// Everything the core reads and writes for a user.
pub trait LedgerRepository: TransactionRepository + BudgetRepository {}

impl<T: TransactionRepository + BudgetRepository> LedgerRepository for T {}

pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = connection::establish_connection(path).map_err(|e| {
            Error::Repository(format!("Failed to open database '{}': {}", path.display(), e))
        })?;
        Ok(Self::new(conn))
    }
}

impl TransactionRepository for SqliteLedger {
    fn insert_transaction(&self, transaction: &Transaction) -> Result<()> {
        transaction_repository::add_transaction(&self.conn, transaction).map_err(Error::Repository)
    }

    fn find_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        transaction_repository::get_transaction(&self.conn, id).map_err(Error::Repository)
    }

    fn transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        transaction_repository::get_user_transactions(&self.conn, user_id)
            .map_err(Error::Repository)
    }

    fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        transaction_repository::update_transaction(&self.conn, transaction)
            .map_err(Error::Repository)
    }

    fn delete_transaction(&self, id: &str) -> Result<()> {
        transaction_repository::remove_transaction(&self.conn, id).map_err(Error::Repository)
    }
}

impl BudgetRepository for SqliteLedger {
    fn insert_budget(&self, budget: &Budget) -> Result<()> {
        budget_repository::add_budget(&self.conn, budget).map_err(Error::Repository)
    }

    fn find_budget(&self, id: &str) -> Result<Option<Budget>> {
        budget_repository::get_budget(&self.conn, id).map_err(Error::Repository)
    }

    fn budgets_for_user(&self, user_id: &str) -> Result<Vec<Budget>> {
        budget_repository::get_user_budgets(&self.conn, user_id).map_err(Error::Repository)
    }

    fn save_budget(&self, budget: &Budget) -> Result<()> {
        budget_repository::update_budget(&self.conn, budget).map_err(Error::Repository)
    }

    fn delete_budget(&self, id: &str) -> Result<()> {
        budget_repository::delete_budget(&self.conn, id).map_err(Error::Repository)
    }
}

#[cfg(test)]
pub fn test_ledger() -> SqliteLedger {
    SqliteLedger::new(connection::establish_test_connection().unwrap())
}

/// Ledger whose every call fails the way a dropped database connection would.
#[cfg(test)]
pub struct UnavailableLedger;

#[cfg(test)]
pub const UNAVAILABLE_MESSAGE: &str = "Failed to query database: connection refused";

#[cfg(test)]
fn unavailable<T>() -> Result<T> {
    Err(Error::Repository(UNAVAILABLE_MESSAGE.to_string()))
}

#[cfg(test)]
impl TransactionRepository for UnavailableLedger {
    fn insert_transaction(&self, _transaction: &Transaction) -> Result<()> {
        unavailable()
    }

    fn find_transaction(&self, _id: &str) -> Result<Option<Transaction>> {
        unavailable()
    }

    fn transactions_for_user(&self, _user_id: &str) -> Result<Vec<Transaction>> {
        unavailable()
    }

    fn save_transaction(&self, _transaction: &Transaction) -> Result<()> {
        unavailable()
    }

    fn delete_transaction(&self, _id: &str) -> Result<()> {
        unavailable()
    }
}

#[cfg(test)]
impl BudgetRepository for UnavailableLedger {
    fn insert_budget(&self, _budget: &Budget) -> Result<()> {
        unavailable()
    }

    fn find_budget(&self, _id: &str) -> Result<Option<Budget>> {
        unavailable()
    }

    fn budgets_for_user(&self, _user_id: &str) -> Result<Vec<Budget>> {
        unavailable()
    }

    fn save_budget(&self, _budget: &Budget) -> Result<()> {
        unavailable()
    }

    fn delete_budget(&self, _id: &str) -> Result<()> {
        unavailable()
    }
}
