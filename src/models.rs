use std::fmt;

/// Cash on hand; the implied other side of cash receipts and disbursements.
pub const CASH_ACCOUNT: &str = "1111";

/// Profit or loss carried over from earlier periods.
pub const ACCUMULATED_BALANCE: &str = "3351";

/// Profit or loss of the reported period.
pub const NET_CHANGE: &str = "3353";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub code: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordSide {
    Debit,
    Credit,
}

impl RecordSide {
    pub fn from_is_credit(is_credit: bool) -> Self {
        if is_credit {
            RecordSide::Credit
        } else {
            RecordSide::Debit
        }
    }

    pub fn is_credit(self) -> bool {
        self == RecordSide::Credit
    }
}

impl fmt::Display for RecordSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSide::Debit => f.write_str("debit"),
            RecordSide::Credit => f.write_str("credit"),
        }
    }
}

/// Cash receipts only carry credit records and cash disbursements only
/// debit records; the cash side is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TxnType {
    Income,
    Expense,
    Transfer,
}

impl TxnType {
    pub fn as_str(self) -> &'static str {
        match self {
            TxnType::Income => "income",
            TxnType::Expense => "expense",
            TxnType::Transfer => "transfer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Option<i64>,
    pub side: RecordSide,
    pub ord: u32,
    pub account_code: String,
    pub summary: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    pub date: String,
    pub ord: u32,
    pub notes: Option<String>,
    pub records: Vec<Record>,
}

impl Transaction {
    pub fn debit_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.side == RecordSide::Debit)
    }

    pub fn credit_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.side == RecordSide::Credit)
    }

    pub fn debit_total(&self) -> f64 {
        self.debit_records().map(|r| r.amount).sum()
    }

    pub fn credit_total(&self) -> f64 {
        self.credit_records().map(|r| r.amount).sum()
    }

    /// A cash receipt has a single bare cash debit line, a cash
    /// disbursement a single bare cash credit line. Anything else is a
    /// transfer.
    pub fn txn_type(&self) -> TxnType {
        if is_bare_cash(self.credit_records()) {
            TxnType::Expense
        } else if is_bare_cash(self.debit_records()) {
            TxnType::Income
        } else {
            TxnType::Transfer
        }
    }
}

fn is_bare_cash<'a>(mut records: impl Iterator<Item = &'a Record>) -> bool {
    match (records.next(), records.next()) {
        (Some(r), None) => r.account_code == CASH_ACCOUNT && r.summary.is_none(),
        _ => false,
    }
}
