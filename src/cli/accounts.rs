use colored::Colorize;
use comfy_table::{Cell, Table};

use mia::codes::{self, is_parent_account};
use mia::db::{insert_account, list_accounts, load_registry, rename_account};
use mia::error::{MiaError, Result};

use super::open_db;

pub fn add(code: &str, title: &str) -> Result<()> {
    let conn = open_db()?;
    let code = insert_account(&conn, code, title)?;
    println!("Added account: {code} {}", title.trim());
    Ok(())
}

pub fn rename(code: &str, new_code: &str, title: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let renamed = rename_account(&conn, code, new_code, title)?;
    println!("Renamed account {} to {renamed}", code.trim());
    Ok(())
}

/// Reports every problem with the code at once.
pub fn check(code: &str, original: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let registry = load_registry(&conn)?;
    match codes::validate_all(code, original.unwrap_or(""), &registry) {
        Ok(code) => {
            println!("{} {code} can be used.", "OK".green().bold());
            Ok(())
        }
        Err(errors) => Err(MiaError::Other(
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        )),
    }
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let accounts = list_accounts(&conn)?;
    let registry = load_registry(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Code", "Title"]);
    for account in accounts {
        let indent = "  ".repeat(account.code.len().saturating_sub(1));
        let title = if is_parent_account(&registry, &account.code) {
            Cell::new(format!("{indent}{}", account.title.bold()))
        } else {
            Cell::new(format!("{indent}{}", account.title))
        };
        table.add_row(vec![Cell::new(account.code), title]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
