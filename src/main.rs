mod config;
mod db;
mod errors;
mod logging;
mod models;
mod operations;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use config::Config;
use db::repository::SqliteLedger;
use models::budget::BudgetInput;
use models::transaction::{NewTransaction, TransactionType, TransactionUpdate};
use operations::advice::{self, MockAdvisor};
use operations::{budget, summary, transactions};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fintrack", version, about = "Personal income, expense and budget tracker")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "FINTRACK_DB")]
    db: Option<PathBuf>,

    /// Authenticated user the command acts for
    #[arg(long, global = true, env = "FINTRACK_USER")]
    user: Option<String>,

    /// Log filter directive, e.g. `fintrack=debug`
    #[arg(long, global = true, env = "RUST_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record an income
    Income(EntryArgs),
    /// Record an expense
    Expense(EntryArgs),
    #[command(subcommand)]
    Transactions(TransactionCommand),
    #[command(subcommand)]
    Budget(BudgetCommand),
    /// Balance, totals and the five most recent transactions
    Dashboard,
    /// Print the financial snapshot given to the advisor
    Context,
    /// Ask the advisor a question
    Ask {
        message: String,
        /// Name the advisor addresses
        #[arg(long, default_value = "there")]
        name: String,
    },
}

#[derive(clap::Args)]
struct EntryArgs {
    #[arg(long)]
    category: String,
    #[arg(long)]
    amount: Decimal,
    /// YYYY-MM-DD or RFC 3339; defaults to now
    #[arg(long, value_parser = parse_date)]
    date: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum TransactionCommand {
    List,
    Show {
        id: String,
    },
    Update {
        id: String,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
    Delete {
        id: String,
    },
    Balance,
    Category {
        category: String,
    },
    Range {
        #[arg(value_parser = parse_date)]
        start: DateTime<Utc>,
        #[arg(value_parser = parse_date)]
        end: DateTime<Utc>,
    },
}

#[derive(clap::Args)]
struct BudgetArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    amount: Decimal,
    #[arg(long)]
    category: String,
}

impl From<BudgetArgs> for BudgetInput {
    fn from(args: BudgetArgs) -> Self {
        BudgetInput {
            name: args.name,
            allocated_amount: args.amount,
            category: args.category,
        }
    }
}

#[derive(Subcommand)]
enum BudgetCommand {
    Create(BudgetArgs),
    List,
    Show {
        id: String,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: BudgetArgs,
    },
    Delete {
        id: String,
    },
    /// Spend from a budget; records an expense in its category
    Use {
        id: String,
        #[arg(long)]
        amount: Decimal,
    },
    /// Mark a budget completed
    Close {
        id: String,
    },
    Summary,
}

fn parse_date(input: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(input)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| "Invalid date format. Please use YYYY-MM-DD.".to_string())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn entry(args: EntryArgs) -> NewTransaction {
    NewTransaction {
        category: args.category,
        amount: args.amount,
        date: args.date,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::new(cli.db, cli.user, cli.log);
    logging::init(&config.log_filter);

    let user_id = config.require_user()?;
    let ledger = SqliteLedger::open(&config.database_path)
        .with_context(|| format!("Failed to connect to {}", config.database_path.display()))?;

    match cli.command {
        Command::Income(args) => print_json(&transactions::create_income(&ledger, user_id, entry(args))?),
        Command::Expense(args) => print_json(&transactions::create_expense(&ledger, user_id, entry(args))?),
        Command::Transactions(command) => match command {
            TransactionCommand::List => print_json(&transactions::list_transactions(&ledger, user_id)?),
            TransactionCommand::Show { id } => {
                print_json(&transactions::get_transaction(&ledger, user_id, &id)?)
            }
            TransactionCommand::Update {
                id,
                transaction_type,
                category,
                amount,
                date,
            } => {
                let update = TransactionUpdate {
                    transaction_type,
                    category,
                    amount,
                    date,
                };
                print_json(&transactions::update_transaction(&ledger, user_id, &id, update)?)
            }
            TransactionCommand::Delete { id } => {
                transactions::delete_transaction(&ledger, user_id, &id)?;
                println!("Transaction removed successfully.");
                Ok(())
            }
            TransactionCommand::Balance => print_json(&transactions::get_balance(&ledger, user_id)?),
            TransactionCommand::Category { category } => {
                print_json(&transactions::transactions_by_category(&ledger, user_id, &category)?)
            }
            TransactionCommand::Range { start, end } => {
                print_json(&transactions::transactions_by_date_range(&ledger, user_id, start, end)?)
            }
        },
        Command::Budget(command) => match command {
            BudgetCommand::Create(args) => print_json(&budget::create_budget(&ledger, user_id, args.into())?),
            BudgetCommand::List => print_json(&budget::list_budgets(&ledger, user_id)?),
            BudgetCommand::Show { id } => print_json(&budget::get_budget(&ledger, user_id, &id)?),
            BudgetCommand::Update { id, fields } => {
                print_json(&budget::update_budget(&ledger, user_id, &id, fields.into())?)
            }
            BudgetCommand::Delete { id } => {
                budget::delete_budget(&ledger, user_id, &id)?;
                println!("Budget deleted successfully.");
                Ok(())
            }
            BudgetCommand::Use { id, amount } => {
                budget::use_budget(&ledger, user_id, &id, amount)?;
                println!("Budget used successfully.");
                Ok(())
            }
            BudgetCommand::Close { id } => print_json(&budget::close_budget(&ledger, user_id, &id)?),
            BudgetCommand::Summary => print_json(&summary::get_budget_summary(&ledger, user_id)?),
        },
        Command::Dashboard => print_json(&summary::get_dashboard_summary(&ledger, user_id)?),
        Command::Context => {
            println!("{}", advice::build_financial_context(&ledger, user_id)?);
            Ok(())
        }
        Command::Ask { message, name } => {
            let reply = advice::chat(&ledger, &MockAdvisor, user_id, &name, &message)?;
            println!("{}", reply);
            Ok(())
        }
    }
}

fn main() {
    config::load_dotenv();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
