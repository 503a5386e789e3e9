use crate::errors::Error;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Active,
    Exceeded,
    /// Set only by closing the budget; never recomputed afterwards.
    Completed,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Active => "active",
            BudgetStatus::Exceeded => "exceeded",
            BudgetStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BudgetStatus::Active),
            "exceeded" => Ok(BudgetStatus::Exceeded),
            "completed" => Ok(BudgetStatus::Completed),
            other => Err(Error::Validation(format!("Unknown budget status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub allocated_amount: Decimal,
    pub category: String,
    pub status: BudgetStatus,
}

impl Budget {
    pub fn is_completed(&self) -> bool {
        self.status == BudgetStatus::Completed
    }
}

/// Input for creating or replacing a budget's editable fields.
#[derive(Debug, Clone)]
pub struct BudgetInput {
    pub name: String,
    pub allocated_amount: Decimal,
    pub category: String,
}

impl BudgetInput {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Budget name cannot be empty".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(Error::Validation("Category cannot be empty".to_string()));
        }
        if self.allocated_amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(
                "Allocated amount must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    pub id: String,
    pub name: String,
    pub allocated_amount: Decimal,
    pub category: String,
    pub status: BudgetStatus,
}

impl From<&Budget> for BudgetView {
    fn from(budget: &Budget) -> Self {
        Self {
            id: budget.id.clone(),
            name: budget.name.clone(),
            allocated_amount: budget.allocated_amount,
            category: budget.category.clone(),
            status: budget.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, amount: i64, category: &str) -> BudgetInput {
        BudgetInput {
            name: name.to_string(),
            allocated_amount: Decimal::from(amount),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_budget_input_valid() {
        assert!(input("Groceries", 100, "food").validate().is_ok());
    }

    #[test]
    fn test_budget_input_empty_name() {
        let result = input("  ", 100, "food").validate();
        assert_eq!(result.unwrap_err().to_string(), "Budget name cannot be empty");
    }

    #[test]
    fn test_budget_input_empty_category() {
        let result = input("Groceries", 100, "").validate();
        assert_eq!(result.unwrap_err().to_string(), "Category cannot be empty");
    }

    #[test]
    fn test_budget_input_non_positive_amount() {
        assert!(matches!(
            input("Groceries", 0, "food").validate(),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [BudgetStatus::Active, BudgetStatus::Exceeded, BudgetStatus::Completed] {
            assert_eq!(status.as_str().parse::<BudgetStatus>().unwrap(), status);
        }
        assert!("closed".parse::<BudgetStatus>().is_err());
    }
}
