use colored::Colorize;
use comfy_table::{Cell, Table};

use mia::error::Result;
use mia::fmt::amount;
use mia::models::RecordSide;
use mia::period::Period;
use mia::reports::{self, StatementSection};

use super::{open_db, today};

fn optional_amount(value: Option<f64>) -> String {
    value.map(amount).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Data-fetching wrappers (used by dispatch)
// ---------------------------------------------------------------------------

pub fn ledger(code: &str, period: Option<&str>) -> Result<()> {
    let period = Period::parse(period, today())?;
    let conn = open_db()?;
    let data = reports::get_ledger(&conn, code, &period)?;
    println!("{}", format_ledger(&data, &period));
    Ok(())
}

pub fn trial_balance(period: Option<&str>) -> Result<()> {
    let period = Period::parse(period, today())?;
    let conn = open_db()?;
    let data = reports::get_trial_balance(&conn, &period)?;
    println!("{}", format_trial_balance(&data, &period));
    Ok(())
}

pub fn income_statement(period: Option<&str>) -> Result<()> {
    let period = Period::parse(period, today())?;
    let conn = open_db()?;
    let data = reports::get_income_statement(&conn, &period)?;
    println!("{}", format_income_statement(&data, &period));
    Ok(())
}

pub fn balance_sheet(period: Option<&str>) -> Result<()> {
    let period = Period::parse(period, today())?;
    let conn = open_db()?;
    let data = reports::get_balance_sheet(&conn, &period)?;
    println!("{}", format_balance_sheet(&data, &period));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

pub fn format_ledger(ledger: &reports::Ledger, period: &Period) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Account", "Summary", "Debit", "Credit", "Balance"]);
    for entry in &ledger.entries {
        let (debit, credit) = match entry.side {
            RecordSide::Debit => (amount(entry.amount), String::new()),
            RecordSide::Credit => (String::new(), amount(entry.amount)),
        };
        let summary = entry.summary.as_deref().unwrap_or("");
        let summary = if entry.txn_id.is_none() {
            Cell::new(summary.italic())
        } else {
            Cell::new(summary)
        };
        table.add_row(vec![
            Cell::new(&entry.date),
            Cell::new(&entry.account_code),
            summary,
            Cell::new(debit),
            Cell::new(credit),
            Cell::new(amount(entry.balance)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(amount(ledger.total_debit)),
        Cell::new(amount(ledger.total_credit)),
        Cell::new(amount(ledger.balance).bold()),
    ]);
    format!(
        "Ledger of {} {} {}\n{table}",
        ledger.code, ledger.title, period.prep_desc
    )
}

pub fn format_trial_balance(tb: &reports::TrialBalance, period: &Period) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Account", "Debit", "Credit"]);
    for row in &tb.rows {
        table.add_row(vec![
            Cell::new(format!("{} {}", row.code, row.title)),
            Cell::new(optional_amount(row.debit)),
            Cell::new(optional_amount(row.credit)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(amount(tb.total_debit).bold()),
        Cell::new(amount(tb.total_credit).bold()),
    ]);
    format!("Trial Balance {}\n{table}", period.prep_desc)
}

fn add_section(table: &mut Table, section: &StatementSection) {
    table.add_row(vec![
        Cell::new(format!("{} {}", section.code, section.title).bold()),
        Cell::new(""),
    ]);
    for group in &section.groups {
        table.add_row(vec![
            Cell::new(format!("  {} {}", group.code, group.title)),
            Cell::new(""),
        ]);
        for account in &group.details {
            table.add_row(vec![
                Cell::new(format!("    {} {}", account.code, account.title)),
                Cell::new(amount(account.amount)),
            ]);
        }
        table.add_row(vec![
            Cell::new(format!("  Total {}", group.title)),
            Cell::new(amount(group.amount)),
        ]);
    }
    table.add_row(vec![
        Cell::new(format!("Total {}", section.title).bold()),
        Cell::new(amount(section.amount).bold()),
    ]);
}

pub fn format_income_statement(statement: &reports::IncomeStatement, period: &Period) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Account", "Amount"]);
    for section in &statement.sections {
        add_section(&mut table, section);
        if let Some(total) = &section.cumulative {
            let amount_cell = if total.amount >= 0.0 {
                Cell::new(amount(total.amount).green().bold())
            } else {
                Cell::new(amount(total.amount).red().bold())
            };
            table.add_row(vec![Cell::new(total.title.as_str().bold()), amount_cell]);
        }
        table.add_row(vec![Cell::new(""), Cell::new("")]);
    }
    format!("Income Statement {}\n{table}", period.prep_desc)
}

pub fn format_balance_sheet(sheet: &reports::BalanceSheet, period: &Period) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Account", "Amount"]);
    add_section(&mut table, &sheet.assets);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    add_section(&mut table, &sheet.liabilities);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    add_section(&mut table, &sheet.owners_equity);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![
        Cell::new(format!("Total {} and {}", sheet.liabilities.title, sheet.owners_equity.title).bold()),
        Cell::new(amount(sheet.liabilities.amount + sheet.owners_equity.amount).bold()),
    ]);
    format!("Balance Sheet {}\n{table}", period.prep_desc)
}
