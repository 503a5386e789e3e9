use crate::db::repository::LedgerRepository;
use crate::errors::Result;
use crate::models::budget::Budget;
use crate::models::summary::{BudgetSummary, CategorySpending, DashboardSummary};
use crate::models::transaction::{Transaction, TransactionView};
use crate::operations::aggregation;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

pub const RECENT_TRANSACTIONS: usize = 5;

/// Most recently created first, at most `limit` entries.
pub fn most_recent(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered.truncate(limit);
    ordered
}

pub fn build_dashboard_summary(transactions: &[Transaction]) -> DashboardSummary {
    let totals = aggregation::aggregate(transactions);
    DashboardSummary {
        balance: totals.balance,
        total_income: totals.total_income,
        total_expenses: totals.total_expenses,
        spending_percentage: totals.spending_percentage,
        recent_transactions: most_recent(transactions, RECENT_TRANSACTIONS)
            .into_iter()
            .map(TransactionView::from)
            .collect(),
    }
}

pub fn build_budget_summary(budgets: &[Budget], transactions: &[Transaction]) -> BudgetSummary {
    let totals = aggregation::aggregate(transactions);
    let total_allocated = budgets
        .iter()
        .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.allocated_amount));

    // Downstream consumers look entries up by either budget name or category.
    let mut category_breakdown = HashMap::new();
    for budget in budgets {
        let spent = aggregation::category_spend(transactions, &budget.category);
        let spending = CategorySpending {
            allocated: budget.allocated_amount,
            spent,
            remaining: budget.allocated_amount - spent,
        };
        category_breakdown.insert(budget.name.clone(), spending);
        category_breakdown.insert(budget.category.clone(), spending);
    }

    BudgetSummary {
        total_income: totals.total_income,
        total_expenses: totals.total_expenses,
        total_allocated,
        remaining_budget: totals.total_income - total_allocated,
        category_breakdown,
    }
}

pub fn get_dashboard_summary<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
) -> Result<DashboardSummary> {
    let transactions = repo.transactions_for_user(user_id)?;
    debug!(%user_id, count = transactions.len(), "building dashboard summary");
    Ok(build_dashboard_summary(&transactions))
}

pub fn get_budget_summary<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
) -> Result<BudgetSummary> {
    let budgets = repo.budgets_for_user(user_id)?;
    let transactions = repo.transactions_for_user(user_id)?;
    debug!(%user_id, budgets = budgets.len(), "building budget summary");
    Ok(build_budget_summary(&budgets, &transactions))
}
