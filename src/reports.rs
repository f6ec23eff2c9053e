use rusqlite::{Connection, OptionalExtension, Params};

use crate::codes::Registry;
use crate::db::load_registry;
use crate::error::{MiaError, Result};
use crate::models::{RecordSide, ACCUMULATED_BALANCE, NET_CHANGE};
use crate::period::Period;

/// A record's amount with debits positive.
const SIGNED_AMOUNT: &str = "CASE WHEN r.is_credit THEN -r.amount ELSE r.amount END";

/// Assets, liabilities and equity keep their balances across periods.
const REAL_ACCOUNT: &str = "substr(r.account_code, 1, 1) IN ('1', '2', '3')";

fn is_real(code: &str) -> bool {
    matches!(code.as_bytes().first(), Some(b'1'..=b'3'))
}

fn is_nonzero(amount: f64) -> bool {
    amount.abs() >= 0.005
}

fn bounds(period: &Period) -> (String, String) {
    (
        period.start.format("%Y-%m-%d").to_string(),
        period.end.format("%Y-%m-%d").to_string(),
    )
}

fn group_code(code: &str) -> &str {
    code.get(..2).unwrap_or(code)
}

// ---------------------------------------------------------------------------
// Account totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AccountAmount {
    pub code: String,
    pub title: String,
    pub amount: f64,
}

/// Debit-positive totals per account over the records matching `filter`,
/// leaving out accounts that come to zero.
fn account_totals<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<AccountAmount>> {
    let sql = format!(
        "SELECT r.account_code, a.title, SUM({SIGNED_AMOUNT}) AS total \
         FROM records r \
         JOIN transactions t ON r.transaction_id = t.id \
         JOIN accounts a ON a.code = r.account_code \
         WHERE {filter} \
         GROUP BY r.account_code, a.title ORDER BY r.account_code"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok(AccountAmount {
                code: row.get(0)?,
                title: row.get(1)?,
                amount: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().filter(|a| is_nonzero(a.amount)).collect())
}

fn balance_of<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<f64> {
    let sql = format!(
        "SELECT COALESCE(SUM({SIGNED_AMOUNT}), 0.0) \
         FROM records r JOIN transactions t ON r.transaction_id = t.id \
         WHERE {filter}"
    );
    Ok(conn.query_row(&sql, params, |row| row.get(0))?)
}

fn title_of(registry: &Registry, code: &str) -> String {
    registry.get(code).cloned().unwrap_or_else(|| code.to_string())
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// `None` for the brought-forward line.
    pub txn_id: Option<i64>,
    pub date: String,
    pub account_code: String,
    pub summary: Option<String>,
    pub side: RecordSide,
    pub amount: f64,
    /// Running debit-positive balance after this entry.
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub code: String,
    pub title: String,
    pub entries: Vec<LedgerEntry>,
    pub total_debit: f64,
    pub total_credit: f64,
    pub balance: f64,
}

/// Every record of an account and its subtree within the period, with a
/// running balance. Real accounts open with the balance brought forward
/// from before the period.
pub fn get_ledger(conn: &Connection, code: &str, period: &Period) -> Result<Ledger> {
    let code = code.trim();
    let title: Option<String> = conn
        .query_row("SELECT title FROM accounts WHERE code = ?1", [code], |row| row.get(0))
        .optional()?;
    let title = title.ok_or_else(|| MiaError::UnknownAccount(code.to_string()))?;
    let (start, end) = bounds(period);
    let under_account = "substr(r.account_code, 1, length(?2)) = ?2";

    let mut entries = Vec::new();
    let mut balance = 0.0;
    if is_real(code) {
        balance = balance_of(
            conn,
            &format!("t.date < ?1 AND {under_account}"),
            rusqlite::params![start, code],
        )?;
        entries.push(LedgerEntry {
            txn_id: None,
            date: start.clone(),
            account_code: code.to_string(),
            summary: Some("Brought Forward".to_string()),
            side: RecordSide::from_is_credit(balance < 0.0),
            amount: balance.abs(),
            balance,
        });
    }

    let sql = format!(
        "SELECT t.id, t.date, r.account_code, r.summary, r.is_credit, r.amount \
         FROM records r JOIN transactions t ON r.transaction_id = t.id \
         WHERE t.date BETWEEN ?1 AND ?3 AND {under_account} \
         ORDER BY t.date, t.ord, r.is_credit, r.ord"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![start, code, end], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                RecordSide::from_is_credit(row.get(4)?),
                row.get::<_, f64>(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let (mut total_debit, mut total_credit) = (0.0, 0.0);
    for (txn_id, date, account_code, summary, side, amount) in rows {
        match side {
            RecordSide::Debit => {
                total_debit += amount;
                balance += amount;
            }
            RecordSide::Credit => {
                total_credit += amount;
                balance -= amount;
            }
        }
        entries.push(LedgerEntry {
            txn_id: Some(txn_id),
            date,
            account_code,
            summary,
            side,
            amount,
            balance,
        });
    }

    Ok(Ledger {
        code: code.to_string(),
        title,
        entries,
        total_debit,
        total_credit,
        balance,
    })
}

// ---------------------------------------------------------------------------
// Trial balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TrialBalanceRow {
    pub code: String,
    pub title: String,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
}

impl TrialBalanceRow {
    fn new(code: String, title: String, amount: f64) -> Self {
        let (debit, credit) = if amount > 0.0 {
            (Some(amount), None)
        } else {
            (None, Some(-amount))
        };
        TrialBalanceRow {
            code,
            title,
            debit,
            credit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: f64,
    pub total_credit: f64,
}

/// Income and expense accounts over the period, balance sheet accounts as
/// of its end. Earlier profit or loss shows on the accumulated balance.
pub fn get_trial_balance(conn: &Connection, period: &Period) -> Result<TrialBalance> {
    let (start, end) = bounds(period);

    let nominal = account_totals(
        conn,
        &format!("t.date BETWEEN ?1 AND ?2 AND NOT {REAL_ACCOUNT}"),
        rusqlite::params![start, end],
    )?;
    let real = account_totals(
        conn,
        &format!("t.date <= ?1 AND {REAL_ACCOUNT} AND r.account_code <> ?2"),
        rusqlite::params![end, ACCUMULATED_BALANCE],
    )?;
    let mut rows: Vec<TrialBalanceRow> = nominal
        .into_iter()
        .chain(real)
        .map(|a| TrialBalanceRow::new(a.code, a.title, a.amount))
        .collect();

    let accumulated = balance_of(
        conn,
        &format!("(t.date < ?1 AND NOT {REAL_ACCOUNT}) OR (t.date <= ?2 AND r.account_code = ?3)"),
        rusqlite::params![start, end, ACCUMULATED_BALANCE],
    )?;
    if is_nonzero(accumulated) {
        let registry = load_registry(conn)?;
        rows.push(TrialBalanceRow::new(
            ACCUMULATED_BALANCE.to_string(),
            title_of(&registry, ACCUMULATED_BALANCE),
            accumulated,
        ));
    }
    rows.sort_by(|a, b| a.code.cmp(&b.code));

    let total_debit = rows.iter().filter_map(|r| r.debit).sum();
    let total_credit = rows.iter().filter_map(|r| r.credit).sum();
    Ok(TrialBalance {
        rows,
        total_debit,
        total_credit,
    })
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StatementGroup {
    pub code: String,
    pub title: String,
    pub amount: f64,
    pub details: Vec<AccountAmount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementSection {
    pub code: String,
    pub title: String,
    pub amount: f64,
    pub groups: Vec<StatementGroup>,
    /// Running total of this and the sections above it.
    pub cumulative: Option<AccountAmount>,
}

/// Groups accounts under their two-digit group and one-digit section.
fn build_section(registry: &Registry, code: &str, accounts: &[AccountAmount]) -> StatementSection {
    let mut group_codes: Vec<&str> = accounts
        .iter()
        .map(|a| group_code(&a.code))
        .filter(|g| g.starts_with(code))
        .collect();
    group_codes.dedup();

    let groups: Vec<StatementGroup> = group_codes
        .into_iter()
        .map(|g| {
            let details: Vec<AccountAmount> = accounts
                .iter()
                .filter(|a| group_code(&a.code) == g)
                .cloned()
                .collect();
            StatementGroup {
                code: g.to_string(),
                title: title_of(registry, g),
                amount: details.iter().map(|a| a.amount).sum(),
                details,
            }
        })
        .collect();

    StatementSection {
        code: code.to_string(),
        title: title_of(registry, code),
        amount: groups.iter().map(|g| g.amount).sum(),
        groups,
        cumulative: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeStatement {
    pub sections: Vec<StatementSection>,
    pub net_income: f64,
}

/// Revenue and expenses of the period, credit positive, with the running
/// income after each section from the second on.
pub fn get_income_statement(conn: &Connection, period: &Period) -> Result<IncomeStatement> {
    let (start, end) = bounds(period);
    let accounts: Vec<AccountAmount> = account_totals(
        conn,
        &format!("t.date BETWEEN ?1 AND ?2 AND NOT {REAL_ACCOUNT}"),
        rusqlite::params![start, end],
    )?
    .into_iter()
    .map(|a| AccountAmount {
        amount: -a.amount,
        ..a
    })
    .collect();
    let registry = load_registry(conn)?;

    let mut sections = Vec::new();
    let mut cumulative = 0.0;
    for code in ["4", "5", "6", "7", "8", "9"] {
        if !registry.contains_key(code) {
            continue;
        }
        let mut section = build_section(&registry, code, &accounts);
        cumulative += section.amount;
        let label = match code {
            "5" => Some(("", "Gross Income".to_string())),
            "6" => Some(("", "Operating Income".to_string())),
            "7" => Some(("", "Before Tax Income".to_string())),
            "8" => Some(("", "After Tax Income".to_string())),
            "9" => Some((NET_CHANGE, title_of(&registry, NET_CHANGE))),
            _ => None,
        };
        section.cumulative = label.map(|(total_code, title)| AccountAmount {
            code: total_code.to_string(),
            title,
            amount: cumulative,
        });
        sections.push(section);
    }

    Ok(IncomeStatement {
        sections,
        net_income: cumulative,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSheet {
    pub assets: StatementSection,
    pub liabilities: StatementSection,
    pub owners_equity: StatementSection,
}

/// Balances as of the end of the period. Profit or loss shows in equity,
/// split between what was brought forward and what the period added.
pub fn get_balance_sheet(conn: &Connection, period: &Period) -> Result<BalanceSheet> {
    let (start, end) = bounds(period);
    let registry = load_registry(conn)?;

    let mut accounts = account_totals(
        conn,
        &format!("t.date <= ?1 AND {REAL_ACCOUNT} AND r.account_code <> ?2"),
        rusqlite::params![end, ACCUMULATED_BALANCE],
    )?;

    // income, expenses and whatever was booked straight to the accumulated balance
    let profit_or_loss = format!("NOT ({REAL_ACCOUNT} AND r.account_code <> ?1)");
    let accumulated = balance_of(
        conn,
        &format!("{profit_or_loss} AND t.date < ?2"),
        rusqlite::params![ACCUMULATED_BALANCE, start],
    )?;
    let net_change = balance_of(
        conn,
        &format!("{profit_or_loss} AND t.date BETWEEN ?2 AND ?3"),
        rusqlite::params![ACCUMULATED_BALANCE, start, end],
    )?;
    for (code, amount) in [(ACCUMULATED_BALANCE, accumulated), (NET_CHANGE, net_change)] {
        if is_nonzero(amount) {
            accounts.push(AccountAmount {
                code: code.to_string(),
                title: title_of(&registry, code),
                amount,
            });
        }
    }
    accounts.sort_by(|a, b| a.code.cmp(&b.code));

    for account in accounts.iter_mut().filter(|a| a.code.starts_with(['2', '3'])) {
        account.amount = -account.amount;
    }

    Ok(BalanceSheet {
        assets: build_section(&registry, "1", &accounts),
        liabilities: build_section(&registry, "2", &accounts),
        owners_equity: build_section(&registry, "3", &accounts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db, insert_transaction};
    use crate::models::{Record, Transaction, TxnType};
    use chrono::NaiveDate;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn period(spec: &str) -> Period {
        Period::parse(Some(spec), today()).unwrap()
    }

    fn line(side: RecordSide, code: &str, amount: f64) -> Record {
        Record {
            id: None,
            side,
            ord: 1,
            account_code: code.to_string(),
            summary: None,
            amount,
        }
    }

    fn book(conn: &Connection, txn_type: TxnType, date: &str, records: Vec<Record>) -> i64 {
        let txn = Transaction {
            id: None,
            date: date.to_string(),
            ord: 0,
            notes: None,
            records,
        };
        insert_transaction(conn, txn_type, &txn, 9999).unwrap()
    }

    /// Capital in January, fees and lunches in March, a lunch in April.
    fn seed_books(conn: &Connection) {
        book(
            conn,
            TxnType::Transfer,
            "2025-01-02",
            vec![
                line(RecordSide::Debit, "1113", 5000.0),
                line(RecordSide::Credit, "3111", 5000.0),
            ],
        );
        book(conn, TxnType::Income, "2025-03-03", vec![line(RecordSide::Credit, "4611", 1000.0)]);
        book(conn, TxnType::Expense, "2025-03-10", vec![line(RecordSide::Debit, "6273", 120.0)]);
        book(conn, TxnType::Expense, "2025-03-10", vec![line(RecordSide::Debit, "6272", 80.0)]);
        book(conn, TxnType::Expense, "2025-04-01", vec![line(RecordSide::Debit, "6273", 50.0)]);
    }

    #[test]
    fn test_ledger_brings_real_balances_forward() {
        let (_dir, conn) = test_db();
        seed_books(&conn);

        let ledger = get_ledger(&conn, "1111", &period("2025-04")).unwrap();
        assert_eq!(ledger.title, "Cash on Hand");
        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.entries[0].txn_id, None);
        assert_eq!(ledger.entries[0].side, RecordSide::Debit);
        assert_eq!(ledger.entries[0].amount, 800.0);
        assert_eq!(ledger.entries[1].side, RecordSide::Credit);
        assert_eq!(ledger.entries[1].balance, 750.0);
        assert_eq!(ledger.total_credit, 50.0);
        assert_eq!(ledger.balance, 750.0);
    }

    #[test]
    fn test_ledger_covers_subtree_in_book_order() {
        let (_dir, conn) = test_db();
        seed_books(&conn);

        let ledger = get_ledger(&conn, "627", &period("2025-03")).unwrap();
        let codes: Vec<&str> = ledger.entries.iter().map(|e| e.account_code.as_str()).collect();
        // nominal accounts start each period from nothing
        assert_eq!(codes, vec!["6273", "6272"]);
        assert_eq!(ledger.entries[1].balance, 200.0);
        assert_eq!(ledger.total_debit, 200.0);

        let ledger = get_ledger(&conn, "11", &period("2025-03")).unwrap();
        assert_eq!(ledger.entries[0].amount, 5000.0);
        assert_eq!(ledger.balance, 5800.0);

        assert!(matches!(
            get_ledger(&conn, "999", &period("2025-03")),
            Err(MiaError::UnknownAccount(_))
        ));
    }

    #[test]
    fn test_trial_balance_balances() {
        let (_dir, conn) = test_db();
        seed_books(&conn);

        let tb = get_trial_balance(&conn, &period("2025-03")).unwrap();
        let rows: Vec<(&str, Option<f64>, Option<f64>)> =
            tb.rows.iter().map(|r| (r.code.as_str(), r.debit, r.credit)).collect();
        assert_eq!(
            rows,
            vec![
                ("1111", Some(800.0), None),
                ("1113", Some(5000.0), None),
                ("3111", None, Some(5000.0)),
                ("4611", None, Some(1000.0)),
                ("6272", Some(80.0), None),
                ("6273", Some(120.0), None),
            ]
        );
        assert_eq!(tb.total_debit, 6000.0);
        assert_eq!(tb.total_credit, 6000.0);
    }

    #[test]
    fn test_trial_balance_carries_earlier_income() {
        let (_dir, conn) = test_db();
        seed_books(&conn);

        let tb = get_trial_balance(&conn, &period("2025-04")).unwrap();
        let accumulated = tb.rows.iter().find(|r| r.code == ACCUMULATED_BALANCE).unwrap();
        assert_eq!(accumulated.credit, Some(800.0));
        assert!(tb.rows.iter().all(|r| r.code != "4611"));
        assert_eq!(tb.total_debit, tb.total_credit);
        assert_eq!(tb.total_debit, 5800.0);
    }

    #[test]
    fn test_income_statement_sections() {
        let (_dir, conn) = test_db();
        seed_books(&conn);

        let statement = get_income_statement(&conn, &period("2025-03")).unwrap();
        let codes: Vec<&str> = statement.sections.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["4", "6", "7"]);

        let revenue = &statement.sections[0];
        assert_eq!(revenue.amount, 1000.0);
        assert_eq!(revenue.cumulative, None);
        let expenses = &statement.sections[1];
        assert_eq!(expenses.amount, -200.0);
        assert_eq!(expenses.groups.len(), 1);
        assert_eq!(expenses.groups[0].code, "62");
        assert_eq!(expenses.groups[0].details.len(), 2);
        let operating = expenses.cumulative.as_ref().unwrap();
        assert_eq!(operating.title, "Operating Income");
        assert_eq!(operating.amount, 800.0);
        assert!(statement.sections[2].groups.is_empty());
        assert_eq!(statement.net_income, 800.0);
    }

    #[test]
    fn test_balance_sheet_equation_holds() {
        let (_dir, conn) = test_db();
        seed_books(&conn);

        let sheet = get_balance_sheet(&conn, &period("2025-04")).unwrap();
        assert_eq!(sheet.assets.amount, 5750.0);
        assert_eq!(sheet.liabilities.amount, 0.0);
        assert_eq!(sheet.owners_equity.amount, 5750.0);

        let equity: Vec<(&str, f64)> = sheet.owners_equity.groups
            .iter()
            .flat_map(|g| &g.details)
            .map(|a| (a.code.as_str(), a.amount))
            .collect();
        assert_eq!(
            equity,
            vec![("3111", 5000.0), (ACCUMULATED_BALANCE, 800.0), (NET_CHANGE, -50.0)]
        );
    }

    #[test]
    fn test_reports_on_empty_books() {
        let (_dir, conn) = test_db();
        let tb = get_trial_balance(&conn, &period("2025")).unwrap();
        assert!(tb.rows.is_empty());
        assert_eq!(tb.total_debit, 0.0);
        let sheet = get_balance_sheet(&conn, &period("2025")).unwrap();
        assert!(sheet.assets.groups.is_empty());
        let ledger = get_ledger(&conn, "1111", &period("2025")).unwrap();
        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.balance, 0.0);
    }
}
