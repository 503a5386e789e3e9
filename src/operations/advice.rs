//! Financial snapshot handed to an external text-generation collaborator.
//!
//! The collaborator is anything that can turn a system prompt plus a user
//! message into a reply; which one is used is decided where the program is
//! wired together.

use crate::db::repository::LedgerRepository;
use crate::errors::Result;
use crate::operations::{aggregation, summary};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

/// Number of most recently created transactions the snapshot covers.
pub const CONTEXT_TRANSACTIONS: usize = 20;
pub const TOP_CATEGORIES: usize = 5;

pub trait Advisor {
    fn send_message(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

/// Stand-in used when no real provider is configured.
pub struct MockAdvisor;

impl Advisor for MockAdvisor {
    fn send_message(&self, _system_prompt: &str, user_message: &str) -> Result<String> {
        Ok(format!("This is a mock AI response to: {}", user_message))
    }
}

fn money(amount: Decimal) -> String {
    format!(
        "${:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn build_financial_context<R: LedgerRepository + ?Sized>(
    repo: &R,
    user_id: &str,
) -> Result<String> {
    let transactions = repo.transactions_for_user(user_id)?;
    let recent: Vec<_> = summary::most_recent(&transactions, CONTEXT_TRANSACTIONS)
        .into_iter()
        .cloned()
        .collect();
    let budget_count = repo.budgets_for_user(user_id)?.len();

    let totals = aggregation::aggregate(&recent);
    let top = aggregation::top_expense_categories(&recent, TOP_CATEGORIES);
    let category_text = if top.is_empty() {
        "None yet".to_string()
    } else {
        top.iter()
            .map(|(category, amount)| format!("{}: {}", category, money(*amount)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    debug!(%user_id, transactions = recent.len(), budget_count, "financial context built");
    Ok(format!(
        "Total Income: {}\n\
         Total Expenses: {}\n\
         Current Balance: {}\n\
         Active Budgets: {}\n\
         Recent Transactions: {}\n\
         Top Spending Categories: {}",
        money(totals.total_income),
        money(totals.total_expenses),
        money(totals.balance),
        budget_count,
        recent.len(),
        category_text
    ))
}

pub fn system_prompt(display_name: &str, context: &str) -> String {
    format!(
        "You are Moneta AI, a helpful financial advisor assistant for {}.\n\
         You provide personalized financial advice based on their real transaction data.\n\
         \n\
         User's Financial Summary:\n\
         {}\n\
         \n\
         Guidelines:\n\
         - Be concise and actionable\n\
         - Provide specific recommendations based on their data\n\
         - Use friendly, encouraging tone\n\
         - Focus on practical money management tips\n\
         - Keep responses under 150 words",
        display_name, context
    )
}

/// Answers `message` with the user's current finances as context.
/// Fails without calling the advisor when the context cannot be built.
pub fn chat<R: LedgerRepository + ?Sized>(
    repo: &R,
    advisor: &dyn Advisor,
    user_id: &str,
    display_name: &str,
    message: &str,
) -> Result<String> {
    let context = build_financial_context(repo, user_id)?;
    let reply = advisor.send_message(&system_prompt(display_name, &context), message)?;
    info!(%user_id, reply_len = reply.len(), "advisor replied");
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{
        test_ledger, BudgetRepository, TransactionRepository, UnavailableLedger, UNAVAILABLE_MESSAGE,
    };
    use crate::errors::Error;
    use crate::models::budget::{Budget, BudgetStatus};
    use crate::models::transaction::TransactionType;
    use crate::operations::aggregation::tests::tx;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;

    struct RecordingAdvisor {
        prompts: RefCell<Vec<String>>,
    }

    impl Advisor for RecordingAdvisor {
        fn send_message(&self, system_prompt: &str, user_message: &str) -> Result<String> {
            self.prompts.borrow_mut().push(system_prompt.to_string());
            Ok(format!("ok: {}", user_message))
        }
    }

    struct FailingAdvisor;

    impl Advisor for FailingAdvisor {
        fn send_message(&self, _system_prompt: &str, _user_message: &str) -> Result<String> {
            Err(Error::Advisor("AI service unavailable".to_string()))
        }
    }

    #[test]
    fn test_context_for_new_user() {
        let ledger = test_ledger();
        let context = build_financial_context(&ledger, "alice").unwrap();
        assert_eq!(
            context,
            "Total Income: $0.00\n\
             Total Expenses: $0.00\n\
             Current Balance: $0.00\n\
             Active Budgets: 0\n\
             Recent Transactions: 0\n\
             Top Spending Categories: None yet"
        );
    }

    #[test]
    fn test_context_lists_top_categories() {
        let ledger = test_ledger();
        let entries = [
            ("i1", TransactionType::Income, "salary", dec!(3000)),
            ("e1", TransactionType::Expense, "food", dec!(120.5)),
            ("e2", TransactionType::Expense, "rent", dec!(900)),
            ("e3", TransactionType::Expense, "food", dec!(30)),
        ];
        for (minute, (id, transaction_type, category, amount)) in entries.into_iter().enumerate() {
            ledger
                .insert_transaction(&tx(id, transaction_type, category, amount, minute as i64))
                .unwrap();
        }
        ledger
            .insert_budget(&Budget {
                id: "b1".to_string(),
                user_id: "alice".to_string(),
                name: "Groceries".to_string(),
                allocated_amount: dec!(500),
                category: "food".to_string(),
                status: BudgetStatus::Active,
            })
            .unwrap();

        let context = build_financial_context(&ledger, "alice").unwrap();
        assert!(context.contains("Total Income: $3000.00"));
        assert!(context.contains("Total Expenses: $1050.50"));
        assert!(context.contains("Current Balance: $1949.50"));
        assert!(context.contains("Active Budgets: 1"));
        assert!(context.contains("Recent Transactions: 4"));
        assert!(context.contains("Top Spending Categories: rent: $900.00, food: $150.50"));
    }

    #[test]
    fn test_context_covers_only_recent_transactions() {
        let ledger = test_ledger();
        ledger
            .insert_transaction(&tx("old", TransactionType::Income, "salary", dec!(5000), 0))
            .unwrap();
        for minute in 1..=20 {
            let id = format!("e{}", minute);
            ledger
                .insert_transaction(&tx(&id, TransactionType::Expense, "food", dec!(1), minute))
                .unwrap();
        }

        let context = build_financial_context(&ledger, "alice").unwrap();
        assert!(context.contains("Total Income: $0.00"));
        assert!(context.contains("Total Expenses: $20.00"));
        assert!(context.contains("Recent Transactions: 20"));
    }

    #[test]
    fn test_chat_passes_context_to_advisor() {
        let ledger = test_ledger();
        ledger
            .insert_transaction(&tx("i1", TransactionType::Income, "salary", dec!(100), 0))
            .unwrap();
        let advisor = RecordingAdvisor {
            prompts: RefCell::new(Vec::new()),
        };

        let reply = chat(&ledger, &advisor, "alice", "Alice", "How am I doing?").unwrap();
        assert_eq!(reply, "ok: How am I doing?");

        let prompts = advisor.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("assistant for Alice"));
        assert!(prompts[0].contains("Total Income: $100.00"));
    }

    #[test]
    fn test_chat_surfaces_advisor_failure() {
        let ledger = test_ledger();
        let result = chat(&ledger, &FailingAdvisor, "alice", "Alice", "hi");
        assert!(matches!(result, Err(Error::Advisor(_))));
    }

    #[test]
    fn test_chat_aborts_when_context_cannot_be_built() {
        let advisor = RecordingAdvisor {
            prompts: RefCell::new(Vec::new()),
        };
        let result = chat(&UnavailableLedger, &advisor, "alice", "Alice", "hi");
        match result {
            Err(Error::Repository(message)) => assert_eq!(message, UNAVAILABLE_MESSAGE),
            other => panic!("expected repository error, got {:?}", other),
        }
        assert!(advisor.prompts.borrow().is_empty());
    }

    #[test]
    fn test_mock_advisor_echoes_message() {
        let reply = MockAdvisor.send_message("prompt", "save more?").unwrap();
        assert_eq!(reply, "This is a mock AI response to: save more?");
    }
}
