use crate::db::repository::LedgerRepository;
use crate::errors::{Error, Result};
use crate::models::budget::{Budget, BudgetInput, BudgetView};
use crate::models::transaction::NewTransaction;
use crate::operations::{aggregation, budget_status, transactions};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

/// Loads a budget and checks it belongs to `user_id`.
fn owned_budget<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
    action: &str,
) -> Result<Budget> {
    let budget = repo
        .find_budget(id)?
        .ok_or_else(|| Error::NotFound("Budget".to_string()))?;
    if budget.user_id != user_id {
        warn!(budget_id = %id, %user_id, "budget ownership check failed");
        return Err(Error::Forbidden(format!("{} this budget", action)));
    }
    Ok(budget)
}

pub fn create_budget<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    input: BudgetInput,
) -> Result<BudgetView> {
    input.validate()?;
    let transactions = repo.transactions_for_user(user_id)?;
    budget_status::validate_allocation(
        input.allocated_amount,
        aggregation::total_income(&transactions),
    )?;

    let spent = aggregation::category_spend(&transactions, &input.category);
    let budget = Budget {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        status: budget_status::compute_status(spent, input.allocated_amount),
        name: input.name,
        allocated_amount: input.allocated_amount,
        category: input.category,
    };
    repo.insert_budget(&budget)?;
    info!(
        budget_id = %budget.id,
        category = %budget.category,
        allocated = %budget.allocated_amount,
        status = %budget.status,
        "budget created"
    );
    Ok(BudgetView::from(&budget))
}

pub fn list_budgets<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
) -> Result<Vec<BudgetView>> {
    let budgets = repo.budgets_for_user(user_id)?;
    let transactions = repo.transactions_for_user(user_id)?;

    let mut views = Vec::with_capacity(budgets.len());
    for mut budget in budgets {
        budget_status::recompute_status(repo, &mut budget, &transactions)?;
        views.push(BudgetView::from(&budget));
    }
    Ok(views)
}

pub fn get_budget<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
) -> Result<BudgetView> {
    let mut budget = owned_budget(repo, user_id, id, "view")?;
    if !budget.is_completed() {
        let transactions = repo.transactions_for_user(user_id)?;
        budget_status::recompute_status(repo, &mut budget, &transactions)?;
    }
    Ok(BudgetView::from(&budget))
}

pub fn update_budget<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
    input: BudgetInput,
) -> Result<BudgetView> {
    let mut budget = owned_budget(repo, user_id, id, "update")?;
    if budget.is_completed() {
        return Err(Error::BudgetClosed("updated".to_string()));
    }
    input.validate()?;

    let transactions = repo.transactions_for_user(user_id)?;
    budget_status::validate_allocation(
        input.allocated_amount,
        aggregation::total_income(&transactions),
    )?;

    budget.name = input.name;
    budget.allocated_amount = input.allocated_amount;
    budget.category = input.category;
    let spent = aggregation::category_spend(&transactions, &budget.category);
    budget.status = budget_status::compute_status(spent, budget.allocated_amount);

    repo.save_budget(&budget)?;
    info!(budget_id = %id, status = %budget.status, "budget updated");
    Ok(BudgetView::from(&budget))
}

pub fn delete_budget<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
) -> Result<()> {
    owned_budget(repo, user_id, id, "delete")?;
    repo.delete_budget(id)?;
    info!(budget_id = %id, "budget deleted");
    Ok(())
}

/// Records an expense of `amount` against the budget's category.
pub fn use_budget<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
    amount: Decimal,
) -> Result<()> {
    let budget = owned_budget(repo, user_id, id, "use")?;
    if budget.is_completed() {
        return Err(Error::BudgetClosed("used".to_string()));
    }
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount("Amount must be greater than 0".to_string()));
    }

    transactions::create_expense(
        repo,
        user_id,
        NewTransaction {
            category: budget.category.clone(),
            amount,
            date: None,
        },
    )?;
    info!(budget_id = %id, %amount, "budget used");
    Ok(())
}

pub fn close_budget<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    id: &str,
) -> Result<BudgetView> {
    let mut budget = owned_budget(repo, user_id, id, "close")?;
    budget_status::close(&mut budget);
    repo.save_budget(&budget)?;
    info!(budget_id = %id, "budget closed");
    Ok(BudgetView::from(&budget))
}
