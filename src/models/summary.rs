use crate::models::transaction::TransactionView;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub balance: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub spending_percentage: Decimal,
    pub recent_transactions: Vec<TransactionView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategorySpending {
    pub allocated: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_allocated: Decimal,
    pub remaining_budget: Decimal,
    /// Keyed by both the budget name and the budget category.
    pub category_breakdown: HashMap<String, CategorySpending>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Balance {
    pub balance: Decimal,
}
