mod cli;

use clap::Parser;

use cli::{AccountsCommands, Cli, Commands, ReportCommands, SummaryCommands, TxnCommands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        if let Err(e) = cli::status::run() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    };

    let result = match command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add { code, title } => cli::accounts::add(&code, &title),
            AccountsCommands::Rename {
                code,
                new_code,
                title,
            } => cli::accounts::rename(&code, &new_code, title.as_deref()),
            AccountsCommands::Check { code, original } => cli::accounts::check(&code, original.as_deref()),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Summary { command } => match command {
            SummaryCommands::Parse { text, credit } => cli::summary::parse(&text, credit),
            SummaryCommands::Compose { shape } => cli::summary::compose(shape),
            SummaryCommands::Categories { credit } => cli::summary::categories(credit),
        },
        Commands::Txn { command } => match command {
            TxnCommands::Add {
                txn_type,
                date,
                debit,
                credit,
                notes,
                ord,
            } => cli::transactions::add(txn_type, &date, &debit, &credit, notes.as_deref(), ord.as_deref()),
            TxnCommands::List { period } => cli::transactions::list(period.as_deref()),
            TxnCommands::Delete { id } => cli::transactions::delete(id),
            TxnCommands::Sort { date, order } => cli::transactions::sort(&date, &order),
        },
        Commands::Report { command } => match command {
            ReportCommands::Ledger { code, period } => cli::report::ledger(&code, period.as_deref()),
            ReportCommands::TrialBalance { period } => cli::report::trial_balance(period.as_deref()),
            ReportCommands::IncomeStatement { period } => cli::report::income_statement(period.as_deref()),
            ReportCommands::BalanceSheet { period } => cli::report::balance_sheet(period.as_deref()),
        },
        Commands::Period { spec } => cli::period::run(spec.as_deref()),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
