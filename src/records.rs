use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::codes::{is_parent_account, Registry};
use crate::error::{RecordError, TransactionError};
use crate::models::{Record, RecordSide, Transaction, TxnType, CASH_ACCOUNT};

/// Requested orders that are missing or not a number sort last.
pub const DEFAULT_ORDER: u32 = 9999;

pub const MAX_TEXT_LEN: usize = 128;

static DEBIT_ACCOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([1235689]|7[5678])").unwrap());
static CREDIT_ACCOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([123489]|7[1234])").unwrap());

/// Records may only be booked to registered leaf accounts whose class
/// fits the side of the record.
pub fn check_record_account(code: &str, side: RecordSide, registry: &Registry) -> Result<(), RecordError> {
    if !registry.contains_key(code) {
        return Err(RecordError::AccountNotFound);
    }
    if is_parent_account(registry, code) {
        return Err(RecordError::ParentAccount);
    }
    match side {
        RecordSide::Debit if !DEBIT_ACCOUNT.is_match(code) => Err(RecordError::NotForDebit),
        RecordSide::Credit if !CREDIT_ACCOUNT.is_match(code) => Err(RecordError::NotForCredit),
        _ => Ok(()),
    }
}

pub fn check_record(record: &Record, registry: &Registry) -> Result<(), RecordError> {
    check_record_account(&record.account_code, record.side, registry)?;
    if record.amount <= 0.0 {
        return Err(RecordError::AmountNotPositive);
    }
    if record
        .summary
        .as_deref()
        .is_some_and(|s| s.chars().count() > MAX_TEXT_LEN)
    {
        return Err(RecordError::SummaryTooLong);
    }
    Ok(())
}

/// Every problem with a submitted transaction, record problems first.
/// An empty list means the transaction can be saved.
pub fn check_transaction(txn_type: TxnType, txn: &Transaction, registry: &Registry) -> Vec<TransactionError> {
    let mut errors = Vec::new();

    for side in [RecordSide::Debit, RecordSide::Credit] {
        let lines = txn.records.iter().filter(|r| r.side == side);
        for (i, record) in lines.enumerate() {
            if let Err(error) = check_record(record, registry) {
                errors.push(TransactionError::Record {
                    side,
                    no: i + 1,
                    error,
                });
            }
        }
    }

    if NaiveDate::parse_from_str(&txn.date, "%Y-%m-%d").is_err() {
        errors.push(TransactionError::InvalidDate);
    }
    match txn_type {
        TxnType::Income if txn.debit_records().next().is_some() => {
            errors.push(TransactionError::DebitRecordsNotAllowed);
        }
        TxnType::Expense if txn.credit_records().next().is_some() => {
            errors.push(TransactionError::CreditRecordsNotAllowed);
        }
        _ => {}
    }
    if txn_type != TxnType::Income && txn.debit_records().next().is_none() {
        errors.push(TransactionError::MissingDebitRecords);
    }
    if txn_type != TxnType::Expense && txn.credit_records().next().is_none() {
        errors.push(TransactionError::MissingCreditRecords);
    }
    if txn_type == TxnType::Transfer && !is_balanced(txn.debit_total(), txn.credit_total()) {
        errors.push(TransactionError::Imbalanced);
    }
    if txn
        .notes
        .as_deref()
        .is_some_and(|n| n.chars().count() > MAX_TEXT_LEN)
    {
        errors.push(TransactionError::NotesTooLong);
    }
    errors
}

/// Amounts carry two decimals; anything under half a cent is rounding.
pub fn is_balanced(debit: f64, credit: f64) -> bool {
    (debit - credit).abs() < 0.005
}

/// Adds the implied cash line to a cash receipt or disbursement, for the
/// total of the entered lines. The entered lines must all be on the other
/// side; [`check_transaction`] rejects anything else. Transfers are
/// returned unchanged.
pub fn with_cash_record(txn_type: TxnType, mut records: Vec<Record>) -> Vec<Record> {
    let side = match txn_type {
        TxnType::Income => RecordSide::Debit,
        TxnType::Expense => RecordSide::Credit,
        TxnType::Transfer => return records,
    };
    let amount = records.iter().filter(|r| r.side != side).map(|r| r.amount).sum();
    records.push(Record {
        id: None,
        side,
        ord: 1,
        account_code: CASH_ACCOUNT.to_string(),
        summary: None,
        amount,
    });
    records
}

/// Parses a requested position. Only plain digits count.
pub fn parse_order(value: Option<&str>) -> u32 {
    match value {
        Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => {
            v.parse().unwrap_or(DEFAULT_ORDER)
        }
        _ => DEFAULT_ORDER,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<T> {
    pub ord: u32,
    pub item: T,
}

/// Sorts by `key` (stable, so equal keys keep their submitted order) and
/// renumbers from 1.
pub fn reorder<T, K, F>(mut items: Vec<T>, key: F) -> Vec<Ordered<T>>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    items.sort_by_key(key);
    items
        .into_iter()
        .zip(1..)
        .map(|(item, ord)| Ordered { ord, item })
        .collect()
}

/// Whether the orders of one day's transactions are anything other than
/// exactly 1, 2, ..., n.
pub fn has_order_hole(ords: &[u32]) -> bool {
    let mut sorted = ords.to_vec();
    sorted.sort_unstable();
    sorted.iter().zip(1..).any(|(&ord, expected)| ord != expected)
}
