//! Structured transaction summaries.
//!
//! A summary is free text, but a few separator patterns carry structure
//! that the entry form can pick apart and put back together:
//!
//! * bus route: `公車—235—台北—新竹`
//! * travel route: `旅行—台北→高雄` (one way) or `旅行—台北↔高雄` (round trip)
//! * general category: `餐飲—午餐`
//!
//! Any of them may end in a repeat count such as `×3`.

use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::categorizer::SummaryCategories;
use crate::models::RecordSide;

pub const EM_DASH: char = '—';
pub const TIMES: char = '×';

static COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^(.*)×([0-9]+)$").unwrap());
static BUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([^—]+)—([^—]+)—([^—→↔]+)[—→]([^—→↔]+)$").unwrap());
static TRAVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([^—]+)—([^—→↔]+)([→↔])([^—→↔]+)$").unwrap());
static GENERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^([^—]+)—([^—]+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    OneWay,
    RoundTrip,
}

impl Direction {
    pub fn glyph(self) -> char {
        match self {
            Direction::OneWay => '→',
            Direction::RoundTrip => '↔',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '→' => Some(Direction::OneWay),
            '↔' => Some(Direction::RoundTrip),
            _ => None,
        }
    }
}

/// Which structured pattern a summary follows. Category hints are kept
/// separately per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Bus,
    Travel,
    General,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Bus => "bus",
            ShapeKind::Travel => "travel",
            ShapeKind::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryShape {
    Bus {
        category: String,
        route: String,
        from: String,
        to: String,
        count: u32,
    },
    Travel {
        category: String,
        from: String,
        direction: Direction,
        to: String,
        count: u32,
    },
    General {
        category: String,
        remainder: String,
        count: u32,
    },
    Unstructured {
        text: String,
        count: u32,
    },
}

impl SummaryShape {
    pub fn kind(&self) -> Option<ShapeKind> {
        match self {
            SummaryShape::Bus { .. } => Some(ShapeKind::Bus),
            SummaryShape::Travel { .. } => Some(ShapeKind::Travel),
            SummaryShape::General { .. } => Some(ShapeKind::General),
            SummaryShape::Unstructured { .. } => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            SummaryShape::Bus { category, .. }
            | SummaryShape::Travel { category, .. }
            | SummaryShape::General { category, .. } => Some(category),
            SummaryShape::Unstructured { .. } => None,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            SummaryShape::Bus { count, .. }
            | SummaryShape::Travel { count, .. }
            | SummaryShape::General { count, .. }
            | SummaryShape::Unstructured { count, .. } => *count,
        }
    }
}

/// Renders the canonical summary string; see [`compose`].
impl fmt::Display for SummaryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryShape::Bus {
                category,
                route,
                from,
                to,
                ..
            } => write!(f, "{category}{EM_DASH}{route}{EM_DASH}{from}{EM_DASH}{to}")?,
            SummaryShape::Travel {
                category,
                from,
                direction,
                to,
                ..
            } => write!(f, "{category}{EM_DASH}{from}{}{to}", direction.glyph())?,
            SummaryShape::General {
                category,
                remainder,
                ..
            } => write!(f, "{category}{EM_DASH}{remainder}")?,
            SummaryShape::Unstructured { text, .. } => f.write_str(text)?,
        }
        match self.count() {
            1 => Ok(()),
            n => write!(f, "{TIMES}{n}"),
        }
    }
}

/// Classify a summary. Never fails: text that follows none of the
/// patterns comes back as [`SummaryShape::Unstructured`].
///
/// Patterns are tried bus, then travel, then general. The bus pattern
/// uses a superset of the travel separators, so the order matters.
pub fn parse(summary: &str) -> SummaryShape {
    let (body, count) = split_count(summary.trim());

    let shape = match_bus(body, count)
        .or_else(|| match_travel(body, count))
        .or_else(|| match_general(body, count))
        .unwrap_or_else(|| SummaryShape::Unstructured {
            text: body.to_string(),
            count,
        });
    debug!("summary {summary:?} parsed as {:?}", shape.kind());
    shape
}

/// The canonical string for a shape. `parse(&compose(&s)) == s` for any
/// shape returned by [`parse`]. A count of 1 is never rendered.
pub fn compose(shape: &SummaryShape) -> String {
    shape.to_string()
}

/// The account most often used with this summary's category on the
/// given side, if any.
pub fn suggest(shape: &SummaryShape, side: RecordSide, categories: &SummaryCategories) -> Option<String> {
    let kind = shape.kind()?;
    let category = shape.category()?;
    categories.lookup(side, kind, category).map(str::to_string)
}

/// Splits off a trailing `×N`. A count of 0 or 1 is not rendered back, so
/// when stripping it would expose another `×N` the text is left whole.
fn split_count(text: &str) -> (&str, u32) {
    let Some((body, n)) = trailing_count(text) else {
        return (text, 1);
    };
    if n > 1 {
        (body, n)
    } else if trailing_count(body).is_some() {
        (text, 1)
    } else {
        (body, 1)
    }
}

fn trailing_count(text: &str) -> Option<(&str, u32)> {
    let caps = COUNT.captures(text)?;
    let n = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let body = caps.get(1).map_or("", |m| m.as_str()).trim();
    Some((body, n))
}

fn field(caps: &Captures<'_>, i: usize) -> Option<String> {
    let value = caps.get(i)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn match_bus(body: &str, count: u32) -> Option<SummaryShape> {
    let caps = BUS.captures(body)?;
    Some(SummaryShape::Bus {
        category: field(&caps, 1)?,
        route: field(&caps, 2)?,
        from: field(&caps, 3)?,
        to: field(&caps, 4)?,
        count,
    })
}

fn match_travel(body: &str, count: u32) -> Option<SummaryShape> {
    let caps = TRAVEL.captures(body)?;
    let direction = caps
        .get(3)
        .and_then(|m| m.as_str().chars().next())
        .and_then(Direction::from_glyph)?;
    Some(SummaryShape::Travel {
        category: field(&caps, 1)?,
        from: field(&caps, 2)?,
        direction,
        to: field(&caps, 4)?,
        count,
    })
}

fn match_general(body: &str, count: u32) -> Option<SummaryShape> {
    let caps = GENERAL.captures(body)?;
    Some(SummaryShape::General {
        category: field(&caps, 1)?,
        remainder: field(&caps, 2)?,
        count,
    })
}
