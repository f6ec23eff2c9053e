use std::collections::{BTreeMap, HashMap};

use rusqlite::Connection;

use crate::error::Result;
use crate::models::RecordSide;
use crate::summary::{self, ShapeKind, EM_DASH};

/// Prepayments, receipts in advance and temporary payments/receipts are
/// settled against their original record, so their summaries say nothing
/// about which account a category belongs to.
const EXCLUDED_PREFIXES: &[&str] = &["114", "214", "128", "228"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHint {
    pub category: String,
    pub account_code: String,
    pub count: usize,
}

/// Summary categories seen on past records, with the account each one
/// was booked to most often, kept per record side and summary shape.
#[derive(Debug, Clone, Default)]
pub struct SummaryCategories {
    hints: HashMap<(RecordSide, ShapeKind), Vec<CategoryHint>>,
}

impl SummaryCategories {
    /// Build hints from `(side, summary, account_code)` triples.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = (RecordSide, &'a str, &'a str)>,
    {
        let mut usage: BTreeMap<(RecordSide, ShapeKind, String), BTreeMap<&'a str, usize>> =
            BTreeMap::new();

        for (side, text, account_code) in records {
            if !text.contains(EM_DASH) {
                continue;
            }
            if EXCLUDED_PREFIXES.iter().any(|p| account_code.starts_with(p)) {
                continue;
            }
            let shape = summary::parse(text);
            let (Some(kind), Some(category)) = (shape.kind(), shape.category()) else {
                continue;
            };
            *usage
                .entry((side, kind, category.to_string()))
                .or_default()
                .entry(account_code)
                .or_insert(0) += 1;
        }

        let mut hints: HashMap<(RecordSide, ShapeKind), Vec<CategoryHint>> = HashMap::new();
        for ((side, kind, category), accounts) in usage {
            // accounts iterate in code order, so ties keep the lower code
            let mut best: Option<(&str, usize)> = None;
            for (code, count) in accounts {
                if best.map_or(true, |(_, n)| count > n) {
                    best = Some((code, count));
                }
            }
            if let Some((code, count)) = best {
                hints.entry((side, kind)).or_default().push(CategoryHint {
                    category,
                    account_code: code.to_string(),
                    count,
                });
            }
        }
        for list in hints.values_mut() {
            list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        }

        Self { hints }
    }

    pub fn lookup(&self, side: RecordSide, kind: ShapeKind, category: &str) -> Option<&str> {
        self.categories(side, kind)
            .iter()
            .find(|h| h.category == category)
            .map(|h| h.account_code.as_str())
    }

    /// Hints for one side and shape, most frequent first.
    pub fn categories(&self, side: RecordSide, kind: ShapeKind) -> &[CategoryHint] {
        self.hints.get(&(side, kind)).map_or(&[], |v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

pub fn load_summary_categories(conn: &Connection) -> Result<SummaryCategories> {
    let mut stmt = conn.prepare(
        "SELECT is_credit, summary, account_code FROM records \
         WHERE summary LIKE '%' || ?1 || '%'",
    )?;
    let rows: Vec<(bool, String, String)> = stmt
        .query_map([EM_DASH.to_string()], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(SummaryCategories::from_records(rows.iter().map(|(is_credit, text, code)| {
        (RecordSide::from_is_credit(*is_credit), text.as_str(), code.as_str())
    })))
}
