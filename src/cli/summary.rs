use colored::Colorize;
use comfy_table::{Cell, Table};

use mia::categorizer::load_summary_categories;
use mia::db::{get_connection, load_registry};
use mia::error::{MiaError, Result};
use mia::models::RecordSide;
use mia::settings::get_db_path;
use mia::summary::{self, Direction, ShapeKind, SummaryShape};

use super::{open_db, ComposeCommands};

fn side(credit: bool) -> RecordSide {
    RecordSide::from_is_credit(credit)
}

pub fn parse(text: &str, credit: bool) -> Result<()> {
    let shape = summary::parse(text);

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    let kind = shape.kind().map_or("unstructured", ShapeKind::as_str);
    table.add_row(vec![Cell::new("Shape"), Cell::new(kind)]);
    for (name, value) in fields(&shape) {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    table.add_row(vec![Cell::new("Count"), Cell::new(shape.count())]);
    table.add_row(vec![Cell::new("Canonical".bold()), Cell::new(summary::compose(&shape))]);
    println!("{table}");

    // Suggestions need past records; without a database there are none.
    let db_path = get_db_path();
    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let categories = load_summary_categories(&conn)?;
        if let Some(code) = summary::suggest(&shape, side(credit), &categories) {
            let registry = load_registry(&conn)?;
            let title = registry.get(&code).map(String::as_str).unwrap_or("");
            println!("Suggested account: {} {title}", code.green());
        }
    }
    Ok(())
}

pub fn compose(command: ComposeCommands) -> Result<()> {
    let shape = match command {
        ComposeCommands::Bus {
            category,
            route,
            from,
            to,
            count,
        } => SummaryShape::Bus {
            category: category.trim().to_string(),
            route: route.trim().to_string(),
            from: from.trim().to_string(),
            to: to.trim().to_string(),
            count,
        },
        ComposeCommands::Travel {
            category,
            from,
            to,
            round_trip,
            count,
        } => SummaryShape::Travel {
            category: category.trim().to_string(),
            from: from.trim().to_string(),
            direction: if round_trip { Direction::RoundTrip } else { Direction::OneWay },
            to: to.trim().to_string(),
            count,
        },
        ComposeCommands::General {
            category,
            text,
            count,
        } => SummaryShape::General {
            category: category.trim().to_string(),
            remainder: text.trim().to_string(),
            count,
        },
    };

    let text = summary::compose(&shape);
    if summary::parse(&text) != shape {
        let kind = shape.kind().map_or("unstructured", ShapeKind::as_str);
        return Err(MiaError::Other(format!(
            "These fields cannot form a {kind} summary: fields must be non-empty and must not contain separators."
        )));
    }
    println!("{text}");
    Ok(())
}

pub fn categories(credit: bool) -> Result<()> {
    let conn = open_db()?;
    let categories = load_summary_categories(&conn)?;
    let registry = load_registry(&conn)?;
    let side = side(credit);

    let mut table = Table::new();
    table.set_header(vec!["Shape", "Category", "Account", "Uses"]);
    for kind in [ShapeKind::Bus, ShapeKind::Travel, ShapeKind::General] {
        for hint in categories.categories(side, kind) {
            let title = registry.get(&hint.account_code).map(String::as_str).unwrap_or("");
            table.add_row(vec![
                Cell::new(kind.as_str()),
                Cell::new(&hint.category),
                Cell::new(format!("{} {title}", hint.account_code)),
                Cell::new(hint.count),
            ]);
        }
    }
    println!("Summary categories ({side})\n{table}");
    Ok(())
}

fn fields(shape: &SummaryShape) -> Vec<(&'static str, String)> {
    match shape {
        SummaryShape::Bus {
            category,
            route,
            from,
            to,
            ..
        } => vec![
            ("Category", category.clone()),
            ("Route", route.clone()),
            ("From", from.clone()),
            ("To", to.clone()),
        ],
        SummaryShape::Travel {
            category,
            from,
            direction,
            to,
            ..
        } => vec![
            ("Category", category.clone()),
            ("From", from.clone()),
            ("Direction", direction.glyph().to_string()),
            ("To", to.clone()),
        ],
        SummaryShape::General {
            category,
            remainder,
            ..
        } => vec![("Category", category.clone()), ("Text", remainder.clone())],
        SummaryShape::Unstructured { text, .. } => vec![("Text", text.clone())],
    }
}
