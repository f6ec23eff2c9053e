use comfy_table::{Cell, Table};

use mia::db::{data_range, get_connection};
use mia::error::Result;
use mia::period::{Chooser, Period};
use mia::settings::get_db_path;

use super::today;

pub fn run(spec: Option<&str>) -> Result<()> {
    let today = today();
    let period = Period::parse(spec, today)?;

    println!("Period:     {}", period.spec);
    println!("From:       {}", period.start.format("%Y-%m-%d"));
    println!("To:         {}", period.end.format("%Y-%m-%d"));
    println!("Reads as:   {}", period.description);

    let db_path = get_db_path();
    let data = if db_path.exists() {
        data_range(&get_connection(&db_path)?)?
    } else {
        None
    };
    if data.is_none() {
        println!();
        println!("No transactions to choose periods from.");
        return Ok(());
    }

    let chooser = Chooser::new(&period, data, today);
    let mut table = Table::new();
    table.set_header(vec!["Choice", "Spec"]);
    let mut add = |label: &str, spec: Option<String>| {
        if let Some(spec) = spec {
            table.add_row(vec![Cell::new(label), Cell::new(spec)]);
        }
    };
    add("This month", chooser.this_month());
    add("Last month", chooser.last_month());
    add("Since last month", chooser.since_last_month());
    if chooser.has_months_to_choose() {
        add("Chosen month", chooser.chosen_month());
    }
    add("This year", chooser.this_year());
    add("Last year", chooser.last_year());
    if chooser.has_years_to_choose() {
        for year in chooser.years_to_choose().unwrap_or_default() {
            add("Year", Some(year));
        }
    }
    add("Today", chooser.today_spec());
    add("Yesterday", chooser.yesterday_spec());
    if chooser.has_days_to_choose() {
        add("First day", chooser.first_day());
        add("Last day", chooser.last_day());
        add("Period start", chooser.chosen_start());
        add("Period end", chooser.chosen_end());
    }
    add("Before this period", chooser.period_before());
    add("All time", Some("-".to_string()));

    println!();
    println!("{table}");
    Ok(())
}
