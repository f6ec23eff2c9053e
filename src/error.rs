use thiserror::Error;

use crate::models::RecordSide;

#[derive(Error, Debug)]
pub enum MiaError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Code(#[from] CodeError),

    #[error("{0}")]
    Record(#[from] RecordError),

    #[error("{}", join_errors(.0))]
    Transaction(Vec<TransactionError>),

    #[error("{0}")]
    Period(#[from] PeriodError),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown transaction: #{0}")]
    UnknownTransaction(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MiaError>;

fn join_errors(errors: &[TransactionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a proposed account code was rejected. The messages are shown
/// to the user next to the code field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Please fill in the code.")]
    EmptyCode,

    #[error("You can only use numbers in the code, and it cannot start with 0.")]
    InvalidCharacters,

    #[error("This code is too long (max. 5).")]
    CodeTooLong,

    #[error("You cannot set the code under itself.")]
    CodeUnderSelf,

    #[error("This code is already in use.")]
    CodeInUse,

    #[error("The parent account of this code does not exist.")]
    ParentNotFound,

    #[error("The descendant account codes will be too long (max. 5).")]
    DescendantCodeTooLong,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("This account does not exist.")]
    AccountNotFound,

    #[error("You cannot select a parent account.")]
    ParentAccount,

    #[error("This account is not for debit records.")]
    NotForDebit,

    #[error("This account is not for credit records.")]
    NotForCredit,

    #[error("The amount must be more than 0.")]
    AmountNotPositive,

    #[error("This summary is too long (max. 128 characters).")]
    SummaryTooLong,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Please fill in debit accounting records.")]
    MissingDebitRecords,

    #[error("Please fill in credit accounting records.")]
    MissingCreditRecords,

    #[error("The total of the debit and credit amounts are inconsistent.")]
    Imbalanced,

    #[error("These notes are too long (max. 128 characters).")]
    NotesTooLong,

    #[error("Please fill in a valid date (YYYY-MM-DD).")]
    InvalidDate,

    #[error("Cash receipts cannot have debit records; the cash debit is added for you.")]
    DebitRecordsNotAllowed,

    #[error("Cash disbursements cannot have credit records; the cash credit is added for you.")]
    CreditRecordsNotAllowed,

    #[error("{side} record #{no}: {error}")]
    Record {
        side: RecordSide,
        no: usize,
        error: RecordError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid period: {0}")]
    Invalid(String),
}
