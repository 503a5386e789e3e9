use crate::errors::Error;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::Validation(
                "Invalid transaction type. Use 'income' or 'expense'.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: String,
        user_id: String,
        transaction_type: TransactionType,
        category: String,
        amount: Decimal,
        date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            transaction_type,
            category,
            amount,
            date,
            created_at,
        }
    }

    pub fn is_expense_in(&self, category: &str) -> bool {
        self.transaction_type == TransactionType::Expense && self.category == category
    }
}

/// Fields accepted when recording an income or an expense.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub category: String,
    pub amount: Decimal,
    pub date: Option<DateTime<Utc>>,
}

/// Partial replacement; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionView {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id.clone(),
            transaction_type: transaction.transaction_type,
            category: transaction.category.clone(),
            amount: transaction.amount,
            date: transaction.date,
            created_at: transaction.created_at,
        }
    }
}
