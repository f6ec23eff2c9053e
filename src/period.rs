//! Report periods named by compact specifications:
//!
//! | spec                    | period                        |
//! |-------------------------|-------------------------------|
//! | `2025-03`               | that month                    |
//! | `2025-03-`              | since that month              |
//! | `-2025-03`              | until the end of that month   |
//! | `2025`                  | that year                     |
//! | `-2025`                 | until the end of that year    |
//! | `-`                     | all time                      |
//! | `2025-03-05`            | that day                      |
//! | `2025-03-05-2025-04-01` | that date range, inclusive    |
//! | `-2025-03-05`           | until that day                |
//!
//! "Until" periods start at [`very_start`]; open-ended periods end with the
//! current month.

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::PeriodError;

static MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})$").unwrap());
static SINCE_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-$").unwrap());
static UNTIL_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-([0-9]{4})-([0-9]{2})$").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})$").unwrap());
static UNTIL_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-([0-9]{4})$").unwrap());
static DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());
static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})-([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap()
});
static UNTIL_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());

/// The earliest date any "until" period reaches back to.
pub fn very_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub spec: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: String,
    /// The description as it reads after "transactions ...".
    pub prep_desc: String,
}

impl Period {
    /// `None` selects the current month.
    pub fn parse(spec: Option<&str>, today: NaiveDate) -> Result<Self, PeriodError> {
        let Some(spec) = spec else {
            let start = month_start(today);
            return Ok(Period::new(format_month(today), start, month_last_day(start), "This Month".into()));
        };
        let invalid = || PeriodError::Invalid(spec.to_string());

        if let Some(caps) = MONTH.captures(spec) {
            let (year, month) = (num(&caps, 1), num(&caps, 2));
            let start = ymd(year, month, 1).ok_or_else(invalid)?;
            return Ok(Period::new(spec.into(), start, month_last_day(start), month_text(year, month, today)));
        }
        if let Some(caps) = SINCE_MONTH.captures(spec) {
            let (year, month) = (num(&caps, 1), num(&caps, 2));
            let start = ymd(year, month, 1).ok_or_else(invalid)?;
            let description = format!("Since {}", month_text(year, month, today));
            return Ok(Period::open(spec.into(), start, month_last_day(today), description));
        }
        if let Some(caps) = UNTIL_MONTH.captures(spec) {
            let (year, month) = (num(&caps, 1), num(&caps, 2));
            let until = ymd(year, month, 1).ok_or_else(invalid)?;
            let description = format!("Until {}", month_text(year, month, today));
            return Ok(Period::open(spec.into(), very_start(), month_last_day(until), description));
        }
        if let Some(caps) = YEAR.captures(spec) {
            let year = num(&caps, 1);
            let start = ymd(year, 1, 1).ok_or_else(invalid)?;
            let end = ymd(year, 12, 31).ok_or_else(invalid)?;
            return Ok(Period::new(spec.into(), start, end, year_text(year, today)));
        }
        if let Some(caps) = UNTIL_YEAR.captures(spec) {
            let year = num(&caps, 1);
            let end = ymd(year, 12, 31).ok_or_else(invalid)?;
            let description = format!("Until {}", year_text(year, today));
            return Ok(Period::open(spec.into(), very_start(), end, description));
        }
        if spec == "-" {
            return Ok(Period::new(spec.into(), very_start(), month_last_day(today), "All Time".into()));
        }
        if let Some(caps) = DAY.captures(spec) {
            let day = ymd(num(&caps, 1), num(&caps, 2), num(&caps, 3)).ok_or_else(invalid)?;
            return Ok(Period::new(spec.into(), day, day, date_text(day, today)));
        }
        if let Some(caps) = RANGE.captures(spec) {
            let start = ymd(num(&caps, 1), num(&caps, 2), num(&caps, 3)).ok_or_else(invalid)?;
            let end = ymd(num(&caps, 4), num(&caps, 5), num(&caps, 6)).ok_or_else(invalid)?;
            if start == end {
                return Ok(Period::new(format_day(start), start, end, date_text(start, today)));
            }
            return Ok(Period::new(spec.into(), start, end, range_text(start, end, today)));
        }
        if let Some(caps) = UNTIL_DAY.captures(spec) {
            let end = ymd(num(&caps, 1), num(&caps, 2), num(&caps, 3)).ok_or_else(invalid)?;
            let description = format!("Until {}", date_text(end, today));
            return Ok(Period::open(spec.into(), very_start(), end, description));
        }
        Err(invalid())
    }

    pub fn default_spec(today: NaiveDate) -> String {
        format_month(today)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    fn new(spec: String, start: NaiveDate, end: NaiveDate, description: String) -> Self {
        let prep_desc = format!("In {description}");
        Period {
            spec,
            start,
            end,
            description,
            prep_desc,
        }
    }

    /// Since/until descriptions already read as a preposition phrase.
    fn open(spec: String, start: NaiveDate, end: NaiveDate, description: String) -> Self {
        Period {
            spec,
            start,
            end,
            prep_desc: description.clone(),
            description,
        }
    }
}

/// The quick choices offered next to the current period, limited to the
/// range of dates that actually have data.
pub struct Chooser<'a> {
    period: &'a Period,
    data: Option<(NaiveDate, NaiveDate)>,
    today: NaiveDate,
}

impl<'a> Chooser<'a> {
    /// `data` is the first and last transaction date, if there are any.
    pub fn new(period: &'a Period, data: Option<(NaiveDate, NaiveDate)>, today: NaiveDate) -> Self {
        Chooser { period, data, today }
    }

    pub fn this_month(&self) -> Option<String> {
        let (start, _) = self.data?;
        if self.today < month_start(start) {
            return None;
        }
        Some(format_month(self.today))
    }

    pub fn last_month(&self) -> Option<String> {
        let (start, _) = self.data?;
        let last = last_month_start(self.today);
        if last < month_start(start) {
            return None;
        }
        Some(format_month(last))
    }

    pub fn since_last_month(&self) -> Option<String> {
        self.last_month().map(|m| format!("{m}-"))
    }

    pub fn has_months_to_choose(&self) -> bool {
        match self.data {
            Some((start, end)) => {
                start < last_month_start(self.today) || end >= next_month_start(self.today)
            }
            None => false,
        }
    }

    /// The current period's month, if it is a single month overlapping the data.
    pub fn chosen_month(&self) -> Option<String> {
        let (start, end) = self.data?;
        if !MONTH.is_match(&self.period.spec) {
            return None;
        }
        if self.period.end < start || self.period.start > end {
            return None;
        }
        Some(self.period.spec.clone())
    }

    pub fn this_year(&self) -> Option<String> {
        let (start, _) = self.data?;
        let year = self.today.year();
        (year >= start.year()).then(|| year.to_string())
    }

    pub fn last_year(&self) -> Option<String> {
        let (start, _) = self.data?;
        let year = self.today.year() - 1;
        (year >= start.year()).then(|| year.to_string())
    }

    pub fn has_years_to_choose(&self) -> bool {
        match self.data {
            Some((start, end)) => {
                let year = self.today.year();
                start.year() < year - 1 || end.year() > year
            }
            None => false,
        }
    }

    /// Years with data other than this year and last year: future years
    /// first, newest first, then earlier years, newest first.
    pub fn years_to_choose(&self) -> Option<Vec<String>> {
        let (start, end) = self.data?;
        let year = self.today.year();
        let after = ((year + 1)..=end.year()).rev();
        let before = (start.year()..(year - 1)).rev();
        Some(after.chain(before).map(|y| y.to_string()).collect())
    }

    pub fn today_spec(&self) -> Option<String> {
        self.day_in_data(self.today)
    }

    pub fn yesterday_spec(&self) -> Option<String> {
        self.day_in_data(self.today - Duration::days(1))
    }

    pub fn has_days_to_choose(&self) -> bool {
        matches!(self.data, Some((start, end)) if start != end)
    }

    pub fn first_day(&self) -> Option<String> {
        self.data.map(|(start, _)| format_day(start))
    }

    pub fn last_day(&self) -> Option<String> {
        self.data.map(|(_, end)| format_day(end))
    }

    /// The period's first day, clamped to the first day with data.
    pub fn chosen_start(&self) -> Option<String> {
        let (start, _) = self.data?;
        Some(format_day(self.period.start.max(start)))
    }

    /// The period's last day, clamped to the last day with data.
    pub fn chosen_end(&self) -> Option<String> {
        let (_, end) = self.data?;
        Some(format_day(self.period.end.min(end)))
    }

    /// Everything before the current period, at the same granularity.
    pub fn period_before(&self) -> Option<String> {
        let (start, _) = self.data?;
        if self.period.start <= start {
            return None;
        }
        let previous = self.period.start - Duration::days(1);
        if YEAR.is_match(&self.period.spec) {
            Some(format!("-{}", previous.year()))
        } else if MONTH.is_match(&self.period.spec) {
            Some(format!("-{}", format_month(previous)))
        } else {
            Some(format!("-{}", format_day(previous)))
        }
    }

    fn day_in_data(&self, day: NaiveDate) -> Option<String> {
        let (start, end) = self.data?;
        (start <= day && day <= end).then(|| format_day(day))
    }
}

fn num(caps: &Captures<'_>, i: usize) -> u32 {
    caps.get(i).and_then(|m| m.as_str().parse().ok()).unwrap_or(0)
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn next_month_start(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(day)
}

fn last_month_start(day: NaiveDate) -> NaiveDate {
    month_start(month_start(day) - Duration::days(1))
}

fn month_last_day(day: NaiveDate) -> NaiveDate {
    next_month_start(day) - Duration::days(1)
}

fn format_month(day: NaiveDate) -> String {
    day.format("%Y-%m").to_string()
}

fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn month_text(year: u32, month: u32, today: NaiveDate) -> String {
    let last = last_month_start(today);
    let is = |d: NaiveDate| d.year() == year as i32 && d.month() == month;
    if is(today) {
        "This Month".into()
    } else if is(last) {
        "Last Month".into()
    } else {
        format!("{year}/{month}")
    }
}

fn year_text(year: u32, today: NaiveDate) -> String {
    let year = year as i32;
    if year == today.year() {
        "This Year".into()
    } else if year == today.year() - 1 {
        "Last Year".into()
    } else {
        year.to_string()
    }
}

fn date_text(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".into()
    } else if day == today - Duration::days(1) {
        "Yesterday".into()
    } else if day.year() != today.year() {
        format!("{}/{}/{}", day.year(), day.month(), day.day())
    } else {
        format!("{}/{}", day.month(), day.day())
    }
}

fn range_text(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> String {
    let full = |d: NaiveDate| format!("{}/{}/{}", d.year(), d.month(), d.day());
    let short = |d: NaiveDate| format!("{}/{}", d.month(), d.day());
    let head = if start.year() != today.year() { full(start) } else { short(start) };
    if start.year() != end.year() {
        format!("{}-{}", full(start), full(end))
    } else if start.month() != end.month() {
        format!("{head}-{}", short(end))
    } else {
        format!("{head}-{}", end.day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> NaiveDate {
        d(2025, 3, 15)
    }

    fn parse(spec: &str) -> Period {
        Period::parse(Some(spec), today()).unwrap()
    }

    #[test]
    fn test_default_is_this_month() {
        let p = Period::parse(None, today()).unwrap();
        assert_eq!(p.spec, "2025-03");
        assert_eq!((p.start, p.end), (d(2025, 3, 1), d(2025, 3, 31)));
        assert_eq!(p.description, "This Month");
    }

    #[test]
    fn test_month() {
        let p = parse("2024-02");
        assert_eq!((p.start, p.end), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(p.description, "2024/2");
        assert_eq!(p.prep_desc, "In 2024/2");
        assert_eq!(parse("2025-02").description, "Last Month");
        assert_eq!(parse("2024-12").end, d(2024, 12, 31));
    }

    #[test]
    fn test_last_month_across_new_year() {
        let p = Period::parse(Some("2024-12"), d(2025, 1, 10)).unwrap();
        assert_eq!(p.description, "Last Month");
    }

    #[test]
    fn test_since_and_until_month() {
        let p = parse("2024-11-");
        assert_eq!((p.start, p.end), (d(2024, 11, 1), d(2025, 3, 31)));
        assert_eq!(p.description, "Since 2024/11");
        assert_eq!(p.prep_desc, "Since 2024/11");
        let p = parse("-2025-02");
        assert_eq!((p.start, p.end), (very_start(), d(2025, 2, 28)));
        assert_eq!(p.description, "Until Last Month");
    }

    #[test]
    fn test_years() {
        let p = parse("2023");
        assert_eq!((p.start, p.end), (d(2023, 1, 1), d(2023, 12, 31)));
        assert_eq!(p.description, "2023");
        assert_eq!(parse("2025").description, "This Year");
        assert_eq!(parse("2024").description, "Last Year");
        let p = parse("-2024");
        assert_eq!((p.start, p.end), (very_start(), d(2024, 12, 31)));
        assert_eq!(p.description, "Until Last Year");
    }

    #[test]
    fn test_all_time() {
        let p = parse("-");
        assert_eq!((p.start, p.end), (very_start(), d(2025, 3, 31)));
        assert_eq!(p.description, "All Time");
    }

    #[test]
    fn test_days() {
        assert_eq!(parse("2025-03-15").description, "Today");
        assert_eq!(parse("2025-03-14").description, "Yesterday");
        assert_eq!(parse("2025-01-02").description, "1/2");
        assert_eq!(parse("2024-01-02").description, "2024/1/2");
        let p = parse("-2025-03-01");
        assert_eq!((p.start, p.end), (very_start(), d(2025, 3, 1)));
        assert_eq!(p.description, "Until 3/1");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(parse("2024-12-30-2025-01-02").description, "2024/12/30-2025/1/2");
        assert_eq!(parse("2025-01-30-2025-02-02").description, "1/30-2/2");
        assert_eq!(parse("2024-01-30-2024-02-02").description, "2024/1/30-2/2");
        assert_eq!(parse("2025-02-03-2025-02-09").description, "2/3-9");
        assert_eq!(parse("2024-02-03-2024-02-09").description, "2024/2/3-9");
        let p = parse("2025-02-03-2025-02-03");
        assert_eq!(p.spec, "2025-02-03");
        assert_eq!(p.description, "2/3");
    }

    #[test]
    fn test_invalid_specs() {
        for spec in ["", "2025-13", "2025-02-30", "abc", "25-01", "2025-1", "--"] {
            assert_eq!(
                Period::parse(Some(spec), today()),
                Err(PeriodError::Invalid(spec.to_string())),
                "spec {spec:?}"
            );
        }
    }

    #[test]
    fn test_contains() {
        let p = parse("2025-02");
        assert!(p.contains(d(2025, 2, 28)));
        assert!(!p.contains(d(2025, 3, 1)));
    }

    #[test]
    fn test_chooser_without_data() {
        let p = parse("2025-03");
        let c = Chooser::new(&p, None, today());
        assert_eq!(c.this_month(), None);
        assert_eq!(c.last_month(), None);
        assert!(!c.has_months_to_choose());
        assert_eq!(c.years_to_choose(), None);
        assert_eq!(c.period_before(), None);
    }

    #[test]
    fn test_chooser_months() {
        let p = parse("2025-03");
        let c = Chooser::new(&p, Some((d(2025, 3, 2), d(2025, 3, 20))), today());
        assert_eq!(c.this_month().as_deref(), Some("2025-03"));
        assert_eq!(c.last_month(), None);
        assert_eq!(c.since_last_month(), None);
        assert!(!c.has_months_to_choose());
        assert_eq!(c.chosen_month().as_deref(), Some("2025-03"));

        let c = Chooser::new(&p, Some((d(2024, 6, 1), d(2025, 4, 2))), today());
        assert_eq!(c.last_month().as_deref(), Some("2025-02"));
        assert_eq!(c.since_last_month().as_deref(), Some("2025-02-"));
        assert!(c.has_months_to_choose());
    }

    #[test]
    fn test_chooser_years() {
        let p = parse("2025");
        let c = Chooser::new(&p, Some((d(2021, 5, 1), d(2027, 1, 1))), today());
        assert_eq!(c.this_year().as_deref(), Some("2025"));
        assert_eq!(c.last_year().as_deref(), Some("2024"));
        assert!(c.has_years_to_choose());
        assert_eq!(
            c.years_to_choose().unwrap(),
            vec!["2027", "2026", "2023", "2022", "2021"]
        );
        assert_eq!(c.period_before().as_deref(), Some("-2024"));
    }

    #[test]
    fn test_chooser_days_and_clamping() {
        let p = parse("2025-02-01-2025-04-30");
        let c = Chooser::new(&p, Some((d(2025, 2, 10), d(2025, 3, 14))), today());
        assert_eq!(c.today_spec(), None);
        assert_eq!(c.yesterday_spec().as_deref(), Some("2025-03-14"));
        assert!(c.has_days_to_choose());
        assert_eq!(c.first_day().as_deref(), Some("2025-02-10"));
        assert_eq!(c.last_day().as_deref(), Some("2025-03-14"));
        assert_eq!(c.chosen_start().as_deref(), Some("2025-02-10"));
        assert_eq!(c.chosen_end().as_deref(), Some("2025-03-14"));
        assert_eq!(c.period_before(), None);

        let p = parse("2025-03");
        let c = Chooser::new(&p, Some((d(2025, 2, 10), d(2025, 3, 14))), today());
        assert_eq!(c.period_before().as_deref(), Some("-2025-02"));
        let p = parse("2025-03-05");
        let c = Chooser::new(&p, Some((d(2025, 2, 10), d(2025, 3, 14))), today());
        assert_eq!(c.period_before().as_deref(), Some("-2025-03-04"));
    }
}
