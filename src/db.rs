use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use log::info;
use rusqlite::{Connection, OptionalExtension};

use crate::codes::{self, Registry};
use crate::error::{MiaError, Result};
use crate::models::{Account, Record, RecordSide, Transaction, TxnType};
use crate::records::{check_transaction, reorder, with_cash_record, DEFAULT_ORDER};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    code TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    ord INTEGER NOT NULL,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY,
    transaction_id INTEGER NOT NULL,
    is_credit INTEGER NOT NULL,
    ord INTEGER NOT NULL,
    account_code TEXT NOT NULL,
    summary TEXT,
    amount REAL NOT NULL,
    FOREIGN KEY (transaction_id) REFERENCES transactions(id) ON DELETE CASCADE,
    FOREIGN KEY (account_code) REFERENCES accounts(code) ON UPDATE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date, ord);
CREATE INDEX IF NOT EXISTS idx_records_transaction ON records(transaction_id);
";

// (code, title)
const DEFAULT_ACCOUNTS: &[(&str, &str)] = &[
    ("1", "Assets"),
    ("11", "Current Assets"),
    ("111", "Cash and Cash Equivalents"),
    ("1111", "Cash on Hand"),
    ("1113", "Cash in Banks"),
    ("114", "Prepayments"),
    ("1141", "Prepaid Expenses"),
    ("2", "Liabilities"),
    ("21", "Current Liabilities"),
    ("211", "Short-term Borrowings"),
    ("2111", "Bank Overdraft"),
    ("214", "Receipts in Advance"),
    ("2141", "Advance Receipts"),
    ("3", "Equity"),
    ("31", "Capital"),
    ("311", "Capital"),
    ("3111", "Capital Stock"),
    ("33", "Retained Earnings"),
    ("335", "Accumulated Profit or Loss"),
    ("3351", "Accumulated Profit or Loss"),
    ("3353", "Net Income or Loss for Current Period"),
    ("4", "Operating Revenue"),
    ("46", "Service Revenue"),
    ("461", "Service Revenue"),
    ("4611", "Service Revenue"),
    ("6", "Operating Expenses"),
    ("62", "Administrative Expenses"),
    ("625", "Travel"),
    ("6254", "Travel Expenses"),
    ("627", "Daily Expenses"),
    ("6272", "Transportation"),
    ("6273", "Meals"),
    ("7", "Non-operating Income and Expenses"),
    ("71", "Non-operating Revenue"),
    ("711", "Interest Revenue"),
    ("7111", "Interest Revenue"),
    ("75", "Non-operating Expenses"),
    ("751", "Interest Expense"),
    ("7511", "Interest Expense"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |row| row.get(0))?;
    if count == 0 {
        for (code, title) in DEFAULT_ACCOUNTS {
            conn.execute(
                "INSERT INTO accounts (code, title) VALUES (?1, ?2)",
                rusqlite::params![code, title],
            )?;
        }
        info!("seeded {} default accounts", DEFAULT_ACCOUNTS.len());
    }
    Ok(())
}

/// A fresh snapshot of the chart of accounts.
pub fn load_registry(conn: &Connection) -> Result<Registry> {
    let mut stmt = conn.prepare("SELECT code, title FROM accounts")?;
    let registry = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Registry, _>>()?;
    Ok(registry)
}

pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT code, title FROM accounts ORDER BY code")?;
    let accounts = stmt
        .query_map([], |row| {
            Ok(Account {
                code: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(accounts)
}

/// Validates and adds a new account. Returns the stored code.
pub fn insert_account(conn: &Connection, code: &str, title: &str) -> Result<String> {
    let registry = load_registry(conn)?;
    let code = codes::validate(code, "", &registry)?;
    let title = title.trim();
    if title.is_empty() {
        return Err(MiaError::Other("Please fill in the title.".into()));
    }
    conn.execute(
        "INSERT INTO accounts (code, title) VALUES (?1, ?2)",
        rusqlite::params![code, title],
    )?;
    info!("added account {code} {title}");
    Ok(code)
}

/// Moves an account and its whole subtree to a new code. Records follow
/// their accounts through the foreign key.
pub fn rename_account(conn: &Connection, original: &str, proposed: &str, title: Option<&str>) -> Result<String> {
    let registry = load_registry(conn)?;
    let original = original.trim();
    if !registry.contains_key(original) {
        return Err(MiaError::UnknownAccount(original.to_string()));
    }
    let code = codes::validate(proposed, original, &registry)?;

    let tx = conn.unchecked_transaction()?;
    let moved = tx.execute(
        "UPDATE accounts SET code = ?2 || substr(code, length(?1) + 1) \
         WHERE substr(code, 1, length(?1)) = ?1",
        rusqlite::params![original, code],
    )?;
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        tx.execute(
            "UPDATE accounts SET title = ?2 WHERE code = ?1",
            rusqlite::params![code, title],
        )?;
    }
    tx.commit()?;

    info!("renamed account {original} to {code} ({moved} accounts moved)");
    Ok(code)
}

/// Checks and saves a transaction, adding the implied cash record for
/// receipts and disbursements. The transaction takes position
/// `requested_ord` among those of its date; later ones move down.
pub fn insert_transaction(
    conn: &Connection,
    txn_type: TxnType,
    txn: &Transaction,
    requested_ord: u32,
) -> Result<i64> {
    let registry = load_registry(conn)?;
    let errors = check_transaction(txn_type, txn, &registry);
    if !errors.is_empty() {
        return Err(MiaError::Transaction(errors));
    }
    let records = with_cash_record(txn_type, txn.records.clone());

    let tx = conn.unchecked_transaction()?;
    let day = day_orders(&tx, &txn.date)?;

    tx.execute(
        "INSERT INTO transactions (date, ord, notes) VALUES (?1, 0, ?2)",
        rusqlite::params![txn.date, txn.notes],
    )?;
    let id = tx.last_insert_rowid();

    // (id, requested order, current order)
    let mut entries: Vec<(i64, u32, u32)> = day.iter().map(|&(id, ord)| (id, ord, ord)).collect();
    entries.push((id, requested_ord, 0));
    for ordered in reorder(entries, |&(_, requested, current)| (requested, current)) {
        let (txn_id, _, current) = ordered.item;
        if txn_id == id || current != ordered.ord {
            tx.execute(
                "UPDATE transactions SET ord = ?2 WHERE id = ?1",
                rusqlite::params![txn_id, ordered.ord],
            )?;
        }
    }

    for side in [RecordSide::Debit, RecordSide::Credit] {
        let lines: Vec<&Record> = records.iter().filter(|r| r.side == side).collect();
        for ordered in reorder(lines, |r| r.ord) {
            let r = ordered.item;
            tx.execute(
                "INSERT INTO records (transaction_id, is_credit, ord, account_code, summary, amount) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, side.is_credit(), ordered.ord, r.account_code, r.summary, r.amount],
            )?;
        }
    }
    tx.commit()?;

    info!("added {} transaction {id} on {}", txn_type.as_str(), txn.date);
    Ok(id)
}

/// Deletes a transaction with its records and closes the gap it leaves
/// in the orders of its day.
pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let date: Option<String> = conn
        .query_row("SELECT date FROM transactions WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    let date = date.ok_or(MiaError::UnknownTransaction(id))?;

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    let day = day_orders(&tx, &date)?;
    let mut moved = 0;
    for ordered in reorder(day, |&(_, ord)| ord) {
        let (txn_id, ord) = ordered.item;
        if ord != ordered.ord {
            tx.execute(
                "UPDATE transactions SET ord = ?2 WHERE id = ?1",
                rusqlite::params![txn_id, ordered.ord],
            )?;
            moved += 1;
        }
    }
    tx.commit()?;

    info!("deleted transaction {id} on {date} ({moved} moved up)");
    Ok(())
}

/// Re-sorts the transactions of one day by requested position. Those
/// without a request go last; ties keep their current order. Returns how
/// many transactions changed position.
pub fn sort_day(conn: &Connection, date: &str, requested: &HashMap<i64, u32>) -> Result<usize> {
    let day = day_orders(conn, date)?;
    if let Some(&id) = requested.keys().find(|id| !day.iter().any(|(d, _)| d == *id)) {
        return Err(MiaError::UnknownTransaction(id));
    }

    let sorted = reorder(day, |(id, ord)| {
        (requested.get(id).copied().unwrap_or(DEFAULT_ORDER), *ord)
    });
    let modified: Vec<(i64, u32)> = sorted
        .into_iter()
        .filter(|o| o.item.1 != o.ord)
        .map(|o| (o.item.0, o.ord))
        .collect();
    if modified.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    for (id, ord) in &modified {
        tx.execute(
            "UPDATE transactions SET ord = ?2 WHERE id = ?1",
            rusqlite::params![id, ord],
        )?;
    }
    tx.commit()?;

    info!("sorted {} transactions on {date}", modified.len());
    Ok(modified.len())
}

/// `(id, ord)` of one day's transactions, in order.
pub fn day_orders(conn: &Connection, date: &str) -> Result<Vec<(i64, u32)>> {
    let mut stmt = conn.prepare("SELECT id, ord FROM transactions WHERE date = ?1 ORDER BY ord, id")?;
    let rows = stmt
        .query_map([date], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Transactions dated within `start..=end`, by date and order, each
/// with its records.
pub fn list_transactions(conn: &Connection, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, ord, notes FROM transactions \
         WHERE date BETWEEN ?1 AND ?2 ORDER BY date, ord, id",
    )?;
    let mut txns = stmt
        .query_map(
            [start.format("%Y-%m-%d").to_string(), end.format("%Y-%m-%d").to_string()],
            |row| {
                Ok(Transaction {
                    id: Some(row.get(0)?),
                    date: row.get(1)?,
                    ord: row.get(2)?,
                    notes: row.get(3)?,
                    records: Vec::new(),
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, is_credit, ord, account_code, summary, amount FROM records \
         WHERE transaction_id = ?1 ORDER BY is_credit, ord",
    )?;
    for txn in &mut txns {
        txn.records = stmt
            .query_map([txn.id], |row| {
                Ok(Record {
                    id: Some(row.get(0)?),
                    side: RecordSide::from_is_credit(row.get(1)?),
                    ord: row.get(2)?,
                    account_code: row.get(3)?,
                    summary: row.get(4)?,
                    amount: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
    }
    Ok(txns)
}

/// The first and last transaction dates, if there are any transactions.
pub fn data_range(conn: &Connection) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let row: Option<(Option<String>, Option<String>)> = conn
        .query_row("SELECT MIN(date), MAX(date) FROM transactions", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?;
    let Some((Some(first), Some(last))) = row else {
        return Ok(None);
    };
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| MiaError::Other(format!("Bad date {s}: {e}")))
    };
    Ok(Some((parse(&first)?, parse(&last)?)))
}
