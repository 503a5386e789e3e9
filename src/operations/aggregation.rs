//! Totals derived from one snapshot of a user's transactions.
//!
//! Every function here is pure and total: an empty slice yields zeros, a
//! zero income yields a zero spending percentage and sums saturate at
//! `Decimal::MAX` instead of overflowing.

use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerTotals {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub spending_percentage: Decimal,
}

pub fn aggregate(transactions: &[Transaction]) -> LedgerTotals {
    let total_income = sum_by_type(transactions, TransactionType::Income);
    let total_expenses = sum_by_type(transactions, TransactionType::Expense);
    LedgerTotals {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        spending_percentage: spending_percentage(total_expenses, total_income),
    }
}

pub fn total_income(transactions: &[Transaction]) -> Decimal {
    sum_by_type(transactions, TransactionType::Income)
}

fn sum_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

pub fn spending_percentage(total_expenses: Decimal, total_income: Decimal) -> Decimal {
    if total_income > Decimal::ZERO {
        total_expenses
            .checked_div(total_income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}

pub fn category_spend(transactions: &[Transaction], category: &str) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.is_expense_in(category))
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

/// Expense totals per category, in the order each category is first seen.
pub fn expense_totals_by_category(transactions: &[Transaction]) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for transaction in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
    {
        match totals.iter_mut().find(|(c, _)| *c == transaction.category) {
            Some((_, total)) => *total = total.saturating_add(transaction.amount),
            None => totals.push((transaction.category.clone(), transaction.amount)),
        }
    }
    totals
}

/// Highest-spend categories first; equal totals keep their first-seen order.
pub fn top_expense_categories(transactions: &[Transaction], limit: usize) -> Vec<(String, Decimal)> {
    let mut totals = expense_totals_by_category(transactions);
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(limit);
    totals
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    pub(crate) fn tx(
        id: &str,
        transaction_type: TransactionType,
        category: &str,
        amount: Decimal,
        created_minute: i64,
    ) -> Transaction {
        let created_at =
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap() + Duration::minutes(created_minute);
        Transaction::new(
            id.to_string(),
            "alice".to_string(),
            transaction_type,
            category.to_string(),
            amount,
            created_at,
            created_at,
        )
    }

    fn income(amount: Decimal) -> Transaction {
        tx("i", TransactionType::Income, "salary", amount, 0)
    }

    fn expense(category: &str, amount: Decimal) -> Transaction {
        tx("e", TransactionType::Expense, category, amount, 0)
    }

    #[test]
    fn test_aggregate_empty_is_all_zero() {
        let totals = aggregate(&[]);
        assert_eq!(totals.total_income, Decimal::ZERO);
        assert_eq!(totals.total_expenses, Decimal::ZERO);
        assert_eq!(totals.balance, Decimal::ZERO);
        assert_eq!(totals.spending_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_aggregate_totals_and_balance() {
        let transactions = vec![
            income(dec!(1000)),
            income(dec!(250.50)),
            expense("food", dec!(120.25)),
            expense("rent", dec!(600)),
        ];
        let totals = aggregate(&transactions);
        assert_eq!(totals.total_income, dec!(1250.50));
        assert_eq!(totals.total_expenses, dec!(720.25));
        assert_eq!(totals.balance, totals.total_income - totals.total_expenses);
        assert_eq!(totals.balance, dec!(530.25));
    }

    #[test]
    fn test_spending_percentage() {
        let transactions = vec![income(dec!(1000)), expense("food", dec!(250))];
        assert_eq!(aggregate(&transactions).spending_percentage, dec!(25));
    }

    #[test]
    fn test_spending_percentage_without_income_is_zero() {
        let transactions = vec![expense("food", dec!(40))];
        let totals = aggregate(&transactions);
        assert_eq!(totals.spending_percentage, Decimal::ZERO);
        assert_eq!(totals.balance, dec!(-40));
    }

    #[test]
    fn test_category_spend_ignores_income_and_other_categories() {
        let transactions = vec![
            expense("food", dec!(30)),
            expense("food", dec!(20)),
            expense("Food", dec!(99)),
            expense("rent", dec!(500)),
            tx("i", TransactionType::Income, "food", dec!(1000), 0),
        ];
        assert_eq!(category_spend(&transactions, "food"), dec!(50));
        assert_eq!(category_spend(&transactions, "travel"), Decimal::ZERO);
    }

    #[test]
    fn test_top_expense_categories_sorted_with_stable_ties() {
        let transactions = vec![
            expense("transport", dec!(40)),
            expense("food", dec!(100)),
            expense("fun", dec!(40)),
            expense("food", dec!(20)),
            expense("rent", dec!(700)),
            expense("gifts", dec!(5)),
            expense("books", dec!(1)),
        ];
        let top = top_expense_categories(&transactions, 5);
        let names: Vec<&str> = top.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["rent", "food", "transport", "fun", "gifts"]);
        assert_eq!(top[1].1, dec!(120));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let huge = dec!(70000000000000000000000000000);
        let transactions = vec![income(dec!(1)), expense("food", huge), expense("food", huge)];
        let totals = aggregate(&transactions);
        assert_eq!(totals.total_expenses, Decimal::MAX);
        assert_eq!(totals.spending_percentage, Decimal::MAX);
        assert_eq!(totals.balance, Decimal::ONE - Decimal::MAX);
        assert_eq!(category_spend(&transactions, "food"), Decimal::MAX);
        assert_eq!(top_expense_categories(&transactions, 5)[0].1, Decimal::MAX);
    }
}
