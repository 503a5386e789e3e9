use crate::db::repository::BudgetRepository;
use crate::errors::{Error, Result};
use crate::models::budget::{Budget, BudgetStatus};
use crate::models::transaction::Transaction;
use crate::operations::aggregation;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Spend ratio at which a budget flips to `exceeded`.
pub const EXCEEDED_THRESHOLD: Decimal = dec!(0.8);

pub fn compute_status(spent: Decimal, allocated: Decimal) -> BudgetStatus {
    if allocated <= Decimal::ZERO {
        return BudgetStatus::Active;
    }
    // spent / allocated < 0.8, without the division
    if spent < allocated * EXCEEDED_THRESHOLD {
        BudgetStatus::Active
    } else {
        BudgetStatus::Exceeded
    }
}

pub fn validate_allocation(allocated_amount: Decimal, total_income: Decimal) -> Result<()> {
    if allocated_amount > total_income {
        return Err(Error::AllocationExceedsIncome {
            allocated: allocated_amount,
            income: total_income,
        });
    }
    Ok(())
}

/// Brings a non-completed budget's status in line with current spend.
/// Returns whether the status changed.
pub fn reconcile(budget: &mut Budget, transactions: &[Transaction]) -> bool {
    if budget.is_completed() {
        return false;
    }
    let spent = aggregation::category_spend(transactions, &budget.category);
    let status = compute_status(spent, budget.allocated_amount);
    if status == budget.status {
        return false;
    }
    debug!(
        budget_id = %budget.id,
        from = %budget.status,
        to = %status,
        %spent,
        "budget status recomputed"
    );
    budget.status = status;
    true
}

/// `reconcile`, writing the budget back only when its status moved.
pub fn recompute_status<R: BudgetRepository + ?Sized>(
    repo: &R,
    budget: &mut Budget,
    transactions: &[Transaction],
) -> Result<()> {
    if reconcile(budget, transactions) {
        repo.save_budget(budget)?;
    }
    Ok(())
}

pub fn close(budget: &mut Budget) {
    budget.status = BudgetStatus::Completed;
}
