use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};

use mia::db::{delete_transaction, insert_transaction, list_transactions, load_registry, sort_day};
use mia::error::{MiaError, Result};
use mia::fmt::{amount, parse_amount};
use mia::models::{Record, RecordSide, Transaction, TxnType};
use mia::period::Period;
use mia::records::{has_order_hole, parse_order};
use mia::summary;

use super::{open_db, today};

/// Parses `CODE:AMOUNT[:SUMMARY]`. Summaries are stored in canonical form.
fn parse_record(side: RecordSide, ord: u32, entry: &str) -> Result<Record> {
    let invalid = || MiaError::Other(format!("Invalid {side} record {entry:?}: expected CODE:AMOUNT[:SUMMARY]"));
    let mut parts = entry.splitn(3, ':');
    let code = parts.next().map(str::trim).filter(|c| !c.is_empty()).ok_or_else(invalid)?;
    let value = parts.next().and_then(parse_amount).ok_or_else(invalid)?;
    let summary = parts
        .next()
        .map(|s| summary::compose(&summary::parse(s)))
        .filter(|s| !s.is_empty());
    Ok(Record {
        id: None,
        side,
        ord,
        account_code: code.to_string(),
        summary,
        amount: value,
    })
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| MiaError::Other(format!("Invalid date {date:?}: expected YYYY-MM-DD")))
}

/// Parses `ID:N` requests. A position that is not a number sorts last.
fn parse_requests(entries: &[String]) -> Result<HashMap<i64, u32>> {
    let mut requested = HashMap::new();
    for entry in entries {
        let (id, ord) = entry.split_once(':').unwrap_or((entry.as_str(), ""));
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| MiaError::Other(format!("Invalid order {entry:?}: expected ID:N")))?;
        requested.insert(id, parse_order(Some(ord.trim())));
    }
    Ok(requested)
}

pub fn add(
    txn_type: TxnType,
    date: &str,
    debit: &[String],
    credit: &[String],
    notes: Option<&str>,
    ord: Option<&str>,
) -> Result<()> {
    let date = parse_date(date)?;

    let mut records = Vec::new();
    for (i, entry) in debit.iter().enumerate() {
        records.push(parse_record(RecordSide::Debit, i as u32 + 1, entry)?);
    }
    for (i, entry) in credit.iter().enumerate() {
        records.push(parse_record(RecordSide::Credit, i as u32 + 1, entry)?);
    }

    let txn = Transaction {
        id: None,
        date: date.format("%Y-%m-%d").to_string(),
        ord: 0,
        notes: notes.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
        records,
    };

    let conn = open_db()?;
    let id = insert_transaction(&conn, txn_type, &txn, parse_order(ord))?;
    println!("Added {} transaction #{id} on {}", txn_type.as_str(), txn.date);
    Ok(())
}

pub fn list(period: Option<&str>) -> Result<()> {
    let period = Period::parse(period, today())?;
    let conn = open_db()?;
    let txns = list_transactions(&conn, period.start, period.end)?;
    if txns.is_empty() {
        println!("No transactions ({}).", period.description);
        return Ok(());
    }
    let registry = load_registry(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "#", "Type", "Account", "Summary", "Debit", "Credit"]);
    for txn in &txns {
        let mut first = true;
        for record in &txn.records {
            let (id, date, ord, kind) = if first {
                (
                    txn.id.map(|id| id.to_string()).unwrap_or_default(),
                    txn.date.clone(),
                    txn.ord.to_string(),
                    txn.txn_type().as_str(),
                )
            } else {
                (String::new(), String::new(), String::new(), "")
            };
            first = false;
            let title = registry.get(&record.account_code).map(String::as_str).unwrap_or("");
            let (debit, credit) = match record.side {
                RecordSide::Debit => (amount(record.amount), String::new()),
                RecordSide::Credit => (String::new(), amount(record.amount)),
            };
            table.add_row(vec![
                Cell::new(id),
                Cell::new(date),
                Cell::new(ord),
                Cell::new(kind),
                Cell::new(format!("{} {title}", record.account_code)),
                Cell::new(record.summary.as_deref().unwrap_or("")),
                Cell::new(debit),
                Cell::new(credit),
            ]);
        }
        if let Some(notes) = &txn.notes {
            table.add_row(vec![
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new(notes.dimmed()),
                Cell::new(""),
                Cell::new(""),
            ]);
        }
    }
    println!("Transactions {}\n{table}", period.prep_desc);

    let mut days: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for txn in &txns {
        days.entry(txn.date.as_str()).or_default().push(txn.ord);
    }
    for (date, ords) in days {
        if has_order_hole(&ords) {
            eprintln!(
                "{} transactions on {date} are out of order; run `mia txn sort {date}` to renumber them",
                "Warning:".yellow().bold()
            );
        }
    }
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    delete_transaction(&conn, id)?;
    println!("Deleted transaction #{id}");
    Ok(())
}

pub fn sort(date: &str, order: &[String]) -> Result<()> {
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();
    let requested = parse_requests(order)?;
    let conn = open_db()?;
    match sort_day(&conn, &date, &requested)? {
        0 => println!("The order of transactions on {date} was not modified."),
        n => println!("Moved {n} transactions on {date}."),
    }
    Ok(())
}
