pub mod accounts;
pub mod init;
pub mod period;
pub mod report;
pub mod status;
pub mod summary;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use mia::db::get_connection;
use mia::error::{MiaError, Result};
use mia::models::TxnType;
use mia::settings::get_db_path;

/// Opens the configured database, which `mia init` must have created.
pub(crate) fn open_db() -> Result<Connection> {
    let path = get_db_path();
    if !path.exists() {
        return Err(MiaError::Other(
            "Database not found. Run `mia init` to set up.".into(),
        ));
    }
    get_connection(&path)
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Parser)]
#[command(name = "mia", about = "Double-entry bookkeeping with a hierarchical chart of accounts.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Mia: choose a data directory and initialize the database.
    Init {
        /// Path for Mia data (default: ~/Documents/mia)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage the chart of accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Parse, compose and look up structured summaries.
    Summary {
        #[command(subcommand)]
        command: SummaryCommands,
    },
    /// Record and list transactions.
    Txn {
        #[command(subcommand)]
        command: TxnCommands,
    },
    /// Accounting reports: ledger, trial balance, income statement, balance sheet.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show a report period and the periods to choose from.
    Period {
        /// Period: YYYY-MM, YYYY-MM-, -YYYY-MM, YYYY, -YYYY, -, YYYY-MM-DD,
        /// YYYY-MM-DD-YYYY-MM-DD or -YYYY-MM-DD (default: this month)
        spec: Option<String>,
    },
    /// Show the current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Account code, e.g. 6274
        code: String,
        /// Account title, e.g. 'Snacks'
        title: String,
    },
    /// Move an account and all of its sub-accounts to a new code.
    Rename {
        /// Current account code
        code: String,
        /// New account code
        new_code: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
    },
    /// Check whether a code can be used, without saving anything.
    Check {
        /// Proposed account code
        code: String,
        /// Code of the account being renamed
        #[arg(long)]
        original: Option<String>,
    },
    /// List the chart of accounts.
    List,
}

#[derive(Subcommand)]
pub enum SummaryCommands {
    /// Show the structure of a summary and the account it suggests.
    Parse {
        /// Summary text, e.g. '餐飲—午餐×2'
        text: String,
        /// Look up the suggestion among credit records
        #[arg(long)]
        credit: bool,
    },
    /// Build a summary from its fields.
    Compose {
        #[command(subcommand)]
        shape: ComposeCommands,
    },
    /// List the known summary categories and their accounts.
    Categories {
        /// Show the categories of credit records
        #[arg(long)]
        credit: bool,
    },
}

#[derive(Subcommand)]
pub enum ComposeCommands {
    /// category—route—from—to
    Bus {
        category: String,
        route: String,
        from: String,
        to: String,
        /// Repeat count
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
    /// category—from→to, or category—from↔to with --round-trip
    Travel {
        category: String,
        from: String,
        to: String,
        #[arg(long = "round-trip")]
        round_trip: bool,
        /// Repeat count
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
    /// category—text
    General {
        category: String,
        text: String,
        /// Repeat count
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
}

#[derive(Subcommand)]
pub enum TxnCommands {
    /// Add a transaction.
    Add {
        /// income (cash receipt), expense (cash disbursement) or transfer
        #[arg(long = "type", value_enum)]
        txn_type: TxnType,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Debit record: CODE:AMOUNT[:SUMMARY] (repeatable)
        #[arg(long)]
        debit: Vec<String>,
        /// Credit record: CODE:AMOUNT[:SUMMARY] (repeatable)
        #[arg(long)]
        credit: Vec<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Position among the transactions of the same day
        #[arg(long)]
        ord: Option<String>,
    },
    /// List transactions in a period.
    List {
        /// Period specification (default: this month)
        #[arg(long)]
        period: Option<String>,
    },
    /// Delete a transaction and its records.
    Delete {
        /// Transaction number, as shown by `mia txn list`
        id: i64,
    },
    /// Put the transactions of one day in a new order.
    Sort {
        /// Date: YYYY-MM-DD
        date: String,
        /// Requested position: ID:N (repeatable). Others go last.
        #[arg(long = "order")]
        order: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Records of an account and its sub-accounts, with a running balance.
    Ledger {
        /// Account code, e.g. 1111
        code: String,
        /// Period specification (default: this month)
        #[arg(long)]
        period: Option<String>,
    },
    /// Debit and credit balances of every account.
    TrialBalance {
        /// Period specification (default: this month)
        #[arg(long)]
        period: Option<String>,
    },
    /// Revenue and expenses of the period.
    IncomeStatement {
        /// Period specification (default: this month)
        #[arg(long)]
        period: Option<String>,
    },
    /// Assets, liabilities and equity at the end of the period.
    BalanceSheet {
        /// Period specification (default: this month)
        #[arg(long)]
        period: Option<String>,
    },
}
