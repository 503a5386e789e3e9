use crate::db::repository::TransactionRepository;
use crate::errors::{Error, Result};
use crate::models::summary::Balance;
use crate::models::transaction::{
    NewTransaction, Transaction, TransactionType, TransactionUpdate, TransactionView,
};
use crate::operations::aggregation;
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

pub fn create_income<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    input: NewTransaction,
) -> Result<TransactionView> {
    create_transaction(repo, user_id, TransactionType::Income, input)
}

pub fn create_expense<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    input: NewTransaction,
) -> Result<TransactionView> {
    create_transaction(repo, user_id, TransactionType::Expense, input)
}

fn create_transaction<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    transaction_type: TransactionType,
    input: NewTransaction,
) -> Result<TransactionView> {
    ensure_positive(input.amount)?;
    if input.category.trim().is_empty() {
        return Err(Error::Validation("Category cannot be empty".to_string()));
    }

    // Stored timestamps keep microseconds.
    let now = Utc::now().trunc_subsecs(6);
    let transaction = Transaction::new(
        Uuid::new_v4().to_string(),
        user_id.to_string(),
        transaction_type,
        input.category,
        input.amount,
        input.date.map_or(now, |d| d.trunc_subsecs(6)),
        now,
    );
    repo.insert_transaction(&transaction)?;
    info!(
        transaction_id = %transaction.id,
        %transaction_type,
        category = %transaction.category,
        amount = %transaction.amount,
        "transaction recorded"
    );
    Ok(TransactionView::from(&transaction))
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount("Amount must be greater than 0".to_string()));
    }
    Ok(())
}

/// Loads a transaction and checks it belongs to `user_id`.
fn owned_transaction<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
    action: &str,
) -> Result<Transaction> {
    let transaction = repo
        .find_transaction(id)?
        .ok_or_else(|| Error::NotFound("Transaction".to_string()))?;
    if transaction.user_id != user_id {
        warn!(transaction_id = %id, %user_id, "transaction ownership check failed");
        return Err(Error::Forbidden(format!("{} this transaction", action)));
    }
    Ok(transaction)
}

fn newest_date_first(mut transactions: Vec<Transaction>) -> Vec<TransactionView> {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions.iter().map(TransactionView::from).collect()
}

pub fn list_transactions<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
) -> Result<Vec<TransactionView>> {
    Ok(newest_date_first(repo.transactions_for_user(user_id)?))
}

pub fn get_transaction<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
) -> Result<TransactionView> {
    let transaction = owned_transaction(repo, user_id, id, "view")?;
    Ok(TransactionView::from(&transaction))
}

pub fn update_transaction<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
    update: TransactionUpdate,
) -> Result<TransactionView> {
    let mut transaction = owned_transaction(repo, user_id, id, "update")?;

    if let Some(transaction_type) = update.transaction_type {
        transaction.transaction_type = transaction_type;
    }
    if let Some(category) = update.category.filter(|c| !c.trim().is_empty()) {
        transaction.category = category;
    }
    if let Some(amount) = update.amount {
        ensure_positive(amount)?;
        transaction.amount = amount;
    }
    if let Some(date) = update.date {
        transaction.date = date.trunc_subsecs(6);
    }

    repo.save_transaction(&transaction)?;
    info!(transaction_id = %id, "transaction updated");
    Ok(TransactionView::from(&transaction))
}

pub fn delete_transaction<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
) -> Result<()> {
    owned_transaction(repo, user_id, id, "delete")?;
    repo.delete_transaction(id)?;
    info!(transaction_id = %id, "transaction deleted");
    Ok(())
}

pub fn get_balance<R: TransactionRepository + ?Sized>(repo: &R, user_id: &str) -> Result<Balance> {
    let transactions = repo.transactions_for_user(user_id)?;
    Ok(Balance {
        balance: aggregation::aggregate(&transactions).balance,
    })
}

pub fn transactions_by_category<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    category: &str,
) -> Result<Vec<TransactionView>> {
    let matching = repo
        .transactions_for_user(user_id)?
        .into_iter()
        .filter(|t| t.category == category)
        .collect();
    Ok(newest_date_first(matching))
}

/// Transactions whose `date` falls in `[start, end]`.
pub fn transactions_by_date_range<R: TransactionRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<TransactionView>> {
    if start > end {
        return Err(Error::Validation("Start date must be before end date.".to_string()));
    }
    let matching = repo
        .transactions_for_user(user_id)?
        .into_iter()
        .filter(|t| t.date >= start && t.date <= end)
        .collect();
    Ok(newest_date_first(matching))
}
