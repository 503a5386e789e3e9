use crate::db::transaction_repository::decode_decimal;
use crate::models::budget::{Budget, BudgetStatus};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use std::str::FromStr;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, name, allocated_amount, category, status FROM budgets";

fn row_to_budget(row: &Row) -> rusqlite::Result<Budget> {
    let status: String = row.get(5)?;
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        allocated_amount: decode_decimal(row, 3)?,
        category: row.get(4)?,
        status: BudgetStatus::from_str(&status)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
    })
}

pub fn add_budget(conn: &Connection, budget: &Budget) -> Result<(), String> {
    conn.execute(
        "INSERT INTO budgets (id, user_id, name, allocated_amount, category, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            &budget.id,
            &budget.user_id,
            &budget.name,
            budget.allocated_amount.to_string(),
            &budget.category,
            budget.status.as_str(),
        ],
    )
    .map_err(|e| format!("Failed to insert budget: {}", e))?;
    Ok(())
}

pub fn get_budget(conn: &Connection, id: &str) -> Result<Option<Budget>, String> {
    conn.query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), [id], row_to_budget)
        .optional()
        .map_err(|e| format!("Failed to query budget: {}", e))
}

pub fn get_user_budgets(conn: &Connection, user_id: &str) -> Result<Vec<Budget>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE user_id = ?1 ORDER BY rowid ASC", SELECT_COLUMNS))
        .map_err(|e| format!("Failed to prepare statement: {}", e))?;

    let iter = stmt
        .query_map([user_id], row_to_budget)
        .map_err(|e| format!("Failed to query budgets: {}", e))?;

    let mut budgets = Vec::new();
    for budget in iter {
        budgets.push(budget.map_err(|e| format!("Failed to parse budget: {}", e))?);
    }
    Ok(budgets)
}

pub fn update_budget(conn: &Connection, budget: &Budget) -> Result<(), String> {
    let rows = conn
        .execute(
            "UPDATE budgets SET name = ?2, allocated_amount = ?3, category = ?4, status = ?5 WHERE id = ?1",
            rusqlite::params![
                &budget.id,
                &budget.name,
                budget.allocated_amount.to_string(),
                &budget.category,
                budget.status.as_str(),
            ],
        )
        .map_err(|e| format!("Failed to update budget: {}", e))?;

    if rows == 0 {
        return Err(format!("Budget with ID {} not found", budget.id));
    }
    Ok(())
}

pub fn delete_budget(conn: &Connection, id: &str) -> Result<(), String> {
    let rows = conn
        .execute("DELETE FROM budgets WHERE id = ?1", [id])
        .map_err(|e| format!("Failed to delete budget: {}", e))?;

    if rows == 0 {
        return Err(format!("Budget with ID {} not found", id));
    }
    Ok(())
}
