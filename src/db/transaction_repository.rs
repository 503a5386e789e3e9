use crate::models::transaction::{Transaction, TransactionType};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, transaction_type, category, amount, date, created_at FROM transactions";

pub(crate) fn encode_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn decode_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

pub(crate) fn decode_decimal(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let transaction_type: String = row.get(2)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        transaction_type: TransactionType::from_str(&transaction_type)
            .map_err(|e| conversion_error(2, e))?,
        category: row.get(3)?,
        amount: decode_decimal(row, 4)?,
        date: decode_timestamp(row, 5)?,
        created_at: decode_timestamp(row, 6)?,
    })
}

pub fn add_transaction(conn: &Connection, transaction: &Transaction) -> Result<(), String> {
    conn.execute(
        "INSERT INTO transactions (id, user_id, transaction_type, category, amount, date, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            &transaction.id,
            &transaction.user_id,
            transaction.transaction_type.as_str(),
            &transaction.category,
            transaction.amount.to_string(),
            encode_timestamp(&transaction.date),
            encode_timestamp(&transaction.created_at),
        ],
    )
    .map_err(|e| format!("Failed to insert transaction: {}", e))?;

    Ok(())
}

pub fn get_transaction(conn: &Connection, id: &str) -> Result<Option<Transaction>, String> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SELECT_COLUMNS),
        [id],
        row_to_transaction,
    )
    .optional()
    .map_err(|e| format!("Failed to query transaction: {}", e))
}

/// All of a user's transactions, most recently created first.
pub fn get_user_transactions(conn: &Connection, user_id: &str) -> Result<Vec<Transaction>, String> {
    let mut stmt = conn
        .prepare(&format!(
            "{} WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))
        .map_err(|e| format!("Failed to prepare statement: {}", e))?;

    let transaction_iter = stmt
        .query_map([user_id], row_to_transaction)
        .map_err(|e| format!("Failed to query transactions: {}", e))?;

    let mut transactions = Vec::new();
    for transaction in transaction_iter {
        transactions.push(transaction.map_err(|e| format!("Failed to parse transaction: {}", e))?);
    }

    Ok(transactions)
}

pub fn update_transaction(conn: &Connection, transaction: &Transaction) -> Result<(), String> {
    let rows_affected = conn
        .execute(
            "UPDATE transactions SET transaction_type = ?2, category = ?3, amount = ?4, date = ?5 WHERE id = ?1",
            rusqlite::params![
                &transaction.id,
                transaction.transaction_type.as_str(),
                &transaction.category,
                transaction.amount.to_string(),
                encode_timestamp(&transaction.date),
            ],
        )
        .map_err(|e| format!("Failed to update transaction: {}", e))?;

    if rows_affected == 0 {
        return Err(format!("Transaction with ID {} not found", transaction.id));
    }

    Ok(())
}

pub fn remove_transaction(conn: &Connection, id: &str) -> Result<(), String> {
    let rows_affected = conn
        .execute("DELETE FROM transactions WHERE id = ?1", [id])
        .map_err(|e| format!("Failed to delete transaction: {}", e))?;

    if rows_affected == 0 {
        return Err(format!("Transaction with ID {} not found", id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn create_test_transaction(id: &str, user_id: &str, created_minute: u32) -> Transaction {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 15, 9, created_minute, 0).unwrap();
        Transaction::new(
            id.to_string(),
            user_id.to_string(),
            TransactionType::Income,
            "Salary".to_string(),
            Decimal::new(10000, 2),
            created_at,
            created_at,
        )
    }

    #[test]
    fn test_add_transaction_success() {
        let conn = establish_test_connection().unwrap();
        let transaction = create_test_transaction(&Uuid::new_v4().to_string(), "alice", 0);

        let result = add_transaction(&conn, &transaction);
        assert!(result.is_ok());
    }

    #[test]
    fn test_add_transaction_duplicate_id() {
        let conn = establish_test_connection().unwrap();
        let id = Uuid::new_v4().to_string();
        let transaction = create_test_transaction(&id, "alice", 0);

        add_transaction(&conn, &transaction).unwrap();
        let result = add_transaction(&conn, &transaction);

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("UNIQUE constraint failed"));
    }

    #[test]
    fn test_get_transaction_round_trips_fields() {
        let conn = establish_test_connection().unwrap();
        let transaction = create_test_transaction("t1", "alice", 5);
        add_transaction(&conn, &transaction).unwrap();

        let stored = get_transaction(&conn, "t1").unwrap();
        assert_eq!(stored, Some(transaction));
        assert_eq!(get_transaction(&conn, "missing").unwrap(), None);
    }

    #[test]
    fn test_get_user_transactions_filters_and_orders() {
        let conn = establish_test_connection().unwrap();
        add_transaction(&conn, &create_test_transaction("old", "alice", 1)).unwrap();
        add_transaction(&conn, &create_test_transaction("new", "alice", 30)).unwrap();
        add_transaction(&conn, &create_test_transaction("other", "bob", 10)).unwrap();

        let transactions = get_user_transactions(&conn, "alice").unwrap();
        let ids: Vec<&str> = transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_get_user_transactions_empty() {
        let conn = establish_test_connection().unwrap();
        assert_eq!(get_user_transactions(&conn, "alice").unwrap().len(), 0);
    }

    #[test]
    fn test_update_transaction_replaces_fields() {
        let conn = establish_test_connection().unwrap();
        let mut transaction = create_test_transaction("t1", "alice", 0);
        add_transaction(&conn, &transaction).unwrap();

        transaction.transaction_type = TransactionType::Expense;
        transaction.category = "food".to_string();
        transaction.amount = Decimal::new(4250, 2);
        update_transaction(&conn, &transaction).unwrap();

        let stored = get_transaction(&conn, "t1").unwrap().unwrap();
        assert_eq!(stored.transaction_type, TransactionType::Expense);
        assert_eq!(stored.category, "food");
        assert_eq!(stored.amount, Decimal::new(4250, 2));
    }

    #[test]
    fn test_update_transaction_not_found() {
        let conn = establish_test_connection().unwrap();
        let transaction = create_test_transaction("ghost", "alice", 0);
        let result = update_transaction(&conn, &transaction);
        assert!(result.unwrap_err().contains("not found"));
    }

    #[test]
    fn test_remove_transaction_success() {
        let conn = establish_test_connection().unwrap();
        let id = Uuid::new_v4().to_string();
        add_transaction(&conn, &create_test_transaction(&id, "alice", 0)).unwrap();

        let result = remove_transaction(&conn, &id);
        assert!(result.is_ok());

        let all = get_user_transactions(&conn, "alice").unwrap();
        assert_eq!(all.len(), 0);
    }

    #[test]
    fn test_remove_transaction_not_found() {
        let conn = establish_test_connection().unwrap();
        let non_existent_id = Uuid::new_v4().to_string();

        let result = remove_transaction(&conn, &non_existent_id);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("not found"));
    }
}
