use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Books {
    home: TempDir,
}

impl Books {
    fn new() -> Self {
        Books {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn initialized() -> Self {
        let books = Books::new();
        books
            .mia()
            .arg("init")
            .arg("--data-dir")
            .arg(books.home.path().join("data"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized mia"));
        books
    }

    fn mia(&self) -> Command {
        let mut cmd = Command::cargo_bin("mia").unwrap();
        cmd.env("MIA_HOME", self.home.path().join("config"))
            .env("NO_COLOR", "1");
        cmd
    }
}

#[test]
fn test_commands_need_init() {
    let books = Books::new();
    books
        .mia()
        .args(["accounts", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run `mia init`"));
}

#[test]
fn test_init_seeds_chart() {
    let books = Books::initialized();
    books
        .mia()
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1111").and(predicate::str::contains("Cash on Hand")));
    books
        .mia()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Accounts:"));
}

#[test]
fn test_add_and_rename_accounts() {
    let books = Books::initialized();
    books
        .mia()
        .args(["accounts", "add", "6274", "Snacks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added account: 6274 Snacks"));
    books
        .mia()
        .args(["accounts", "add", "6274", "Snacks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in use"));
    books
        .mia()
        .args(["accounts", "add", "0274", "Zero"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only use numbers"));
    books
        .mia()
        .args(["accounts", "rename", "627", "628", "--title", "Living"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed account 627 to 628"));
    books
        .mia()
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6284").and(predicate::str::contains("Living")));
}

#[test]
fn test_check_reports_every_problem() {
    let books = Books::initialized();
    books
        .mia()
        .args(["accounts", "check", "2112"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2112 can be used"));
    books
        .mia()
        .args(["accounts", "check", "111", "--original", "11"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("under itself").and(predicate::str::contains("already in use")),
        );
}

#[test]
fn test_summary_parse_and_compose() {
    let books = Books::new();
    books
        .mia()
        .args(["summary", "parse", "旅行—台北↔高雄×3"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("travel")
                .and(predicate::str::contains("↔"))
                .and(predicate::str::contains("旅行—台北↔高雄×3")),
        );
    books
        .mia()
        .args(["summary", "compose", "bus", "公車", "235", "台北", "新竹"])
        .assert()
        .success()
        .stdout("公車—235—台北—新竹\n");
    books
        .mia()
        .args(["summary", "compose", "travel", "旅行", "台北", "高雄", "--round-trip", "--count", "2"])
        .assert()
        .success()
        .stdout("旅行—台北↔高雄×2\n");
    books
        .mia()
        .args(["summary", "compose", "general", "a—b", "c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot form a general summary"));
}

#[test]
fn test_transactions_and_suggestions() {
    let books = Books::initialized();
    books
        .mia()
        .args(["txn", "add", "--type", "expense", "--date", "2025-03-05"])
        .args(["--debit", "6273:120:餐飲 — 午餐", "--notes", "team lunch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added expense transaction"));
    books
        .mia()
        .args(["txn", "list", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Cash on Hand")
                .and(predicate::str::contains("餐飲—午餐"))
                .and(predicate::str::contains("120.00"))
                .and(predicate::str::contains("team lunch")),
        );
    books
        .mia()
        .args(["summary", "parse", "餐飲—晚餐"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested account: 6273"));
    books
        .mia()
        .args(["summary", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("餐飲"));
}

#[test]
fn test_invalid_transactions_are_rejected() {
    let books = Books::initialized();
    books
        .mia()
        .args(["txn", "add", "--type", "transfer", "--date", "2025-03-05"])
        .args(["--debit", "6273:100", "--credit", "1113:90"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inconsistent"));
    books
        .mia()
        .args(["txn", "add", "--type", "expense", "--date", "2025-03-05"])
        .args(["--debit", "627:100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parent account"));
    books
        .mia()
        .args(["txn", "add", "--type", "expense", "--date", "2025-02-30"])
        .args(["--debit", "6273:100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
    books
        .mia()
        .args(["txn", "list", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions"));
}

#[test]
fn test_period_command() {
    let books = Books::new();
    books
        .mia()
        .args(["period", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01").and(predicate::str::contains("2024-12-31")));
    books
        .mia()
        .args(["period", "2024-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid period: 2024-13"));
}

#[test]
fn test_cash_side_lines_are_refused() {
    let books = Books::initialized();
    books
        .mia()
        .args(["txn", "add", "--type", "expense", "--date", "2025-03-05"])
        .args(["--debit", "6273:100", "--credit", "1113:100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot have credit records"));
    books
        .mia()
        .args(["txn", "list", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions"));
}

#[test]
fn test_sort_and_delete_transactions() {
    let books = Books::initialized();
    for amount in ["10", "20", "30"] {
        books
            .mia()
            .args(["txn", "add", "--type", "expense", "--date", "2025-03-05"])
            .args(["--debit", &format!("6273:{amount}")])
            .assert()
            .success();
    }
    books
        .mia()
        .args(["txn", "sort", "2025-03-05", "--order", "3:1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved 3 transactions"));
    books
        .mia()
        .args(["txn", "sort", "2025-03-05", "--order", "3:1", "--order", "1:2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not modified"));
    books
        .mia()
        .args(["txn", "sort", "2025-03-06", "--order", "3:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown transaction: #3"));
    books
        .mia()
        .args(["txn", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted transaction #1"));
    books
        .mia()
        .args(["txn", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown transaction: #1"));
    books
        .mia()
        .args(["txn", "list", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20.00").and(predicate::str::contains("10.00").not()))
        .stderr(predicate::str::contains("out of order").not());
}

#[test]
fn test_reports() {
    let books = Books::initialized();
    books
        .mia()
        .args(["txn", "add", "--type", "transfer", "--date", "2025-01-02"])
        .args(["--debit", "1113:5000", "--credit", "3111:5000"])
        .assert()
        .success();
    books
        .mia()
        .args(["txn", "add", "--type", "income", "--date", "2025-03-03"])
        .args(["--credit", "4611:1000:顧問—三月"])
        .assert()
        .success();
    books
        .mia()
        .args(["txn", "add", "--type", "expense", "--date", "2025-03-05"])
        .args(["--debit", "6273:120:餐飲—午餐"])
        .assert()
        .success();

    books
        .mia()
        .args(["report", "trial-balance", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Trial Balance")
                .and(predicate::str::contains("4611 Service Revenue"))
                .and(predicate::str::contains("6,000.00")),
        );
    books
        .mia()
        .args(["report", "ledger", "1111", "--period", "2025-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Brought Forward").and(predicate::str::contains("880.00")));
    books
        .mia()
        .args(["report", "income-statement", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Operating Income").and(predicate::str::contains("880.00")));
    books
        .mia()
        .args(["report", "balance-sheet", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Net Income or Loss for Current Period")
                .and(predicate::str::contains("5,880.00")),
        );
    books
        .mia()
        .args(["report", "ledger", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown account: 999"));
}
