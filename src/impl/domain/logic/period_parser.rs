use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::entities::BookingPeriod;

use super::utils::{month_end, month_start};

pub use super::utils::{is_leap_year, last_day_of_month};

macro_rules! grammar_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new($pattern).expect("period grammar regex should always compile")
        });
    };
}

grammar_regex!(MONTH_NAME_RANGE, r"(?i)^([a-z]+)\s+to\s+([a-z]+)\s+(\d{4})$");
grammar_regex!(
    NUMERIC_MONTH_RANGE,
    r"(?i)^(\d{1,2})/(\d{4})\s+to\s+(\d{1,2})/(\d{4})$"
);
grammar_regex!(QUARTER_YEAR, r"(?i)^Q(\d)\s+(\d{4})$");
grammar_regex!(YEAR_DASH_QUARTER, r"(?i)^(\d{4})-Q(\d)$");
grammar_regex!(QUARTER_DASH_YEAR, r"(?i)^Q(\d)-(\d{4})$");
grammar_regex!(QUARTER_LIST_YEAR, r"(?i)^(Q\d(?:\s*,\s*Q\d)+)\s+(\d{4})$");
grammar_regex!(QUARTER_TOKEN, r"(?i)Q(\d)");
grammar_regex!(NUMERIC_MONTH, r"^(\d{1,2})/(\d{4})$");
grammar_regex!(MONTH_NAME, r"(?i)^([a-z]+)\s+(\d{4})$");

/// A grammar either does not match (`None`), or matches and resolves to a
/// period or to nothing (`Some(None)`, e.g. an unknown month name). The first
/// matching grammar decides the result.
type Grammar = fn(&str) -> Option<Option<BookingPeriod>>;

/// Tried in order; some patterns are substrings of others.
const GRAMMARS: [(&str, Grammar); 6] = [
    ("month-name range", month_name_range),
    ("numeric month range", numeric_month_range),
    ("quarter", single_quarter),
    ("quarter list", quarter_list),
    ("numeric month", numeric_month),
    ("month name", month_name),
];

/// Parses free-form booking-period text ("Q1 2025", "Jan to Dec 2025",
/// "3/2025", ...) into an inclusive date range.
///
/// Returns `None` for blank text, text matching no grammar, and text whose
/// month or quarter does not resolve. Never panics on user input.
pub fn parse_period(text: &str) -> Option<BookingPeriod> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for (name, grammar) in GRAMMARS {
        if let Some(resolved) = grammar(text) {
            if resolved.is_none() {
                log::debug!("period '{}' matched {} but did not resolve", text, name);
            }
            return resolved;
        }
    }
    None
}

fn month_name_range(text: &str) -> Option<Option<BookingPeriod>> {
    let c = MONTH_NAME_RANGE.captures(text)?;
    Some(year(&c, 3).and_then(|year| {
        span(year, month_from_name(&c[1])?, year, month_from_name(&c[2])?)
    }))
}

fn numeric_month_range(text: &str) -> Option<Option<BookingPeriod>> {
    let c = NUMERIC_MONTH_RANGE.captures(text)?;
    Some(year(&c, 2).and_then(|from_year| {
        span(from_year, number(&c, 1)?, year(&c, 4)?, number(&c, 3)?)
    }))
}

fn single_quarter(text: &str) -> Option<Option<BookingPeriod>> {
    let (quarter, quarter_year) = if let Some(c) = QUARTER_YEAR.captures(text) {
        (number(&c, 1), year(&c, 2))
    } else if let Some(c) = YEAR_DASH_QUARTER.captures(text) {
        (number(&c, 2), year(&c, 1))
    } else if let Some(c) = QUARTER_DASH_YEAR.captures(text) {
        (number(&c, 1), year(&c, 2))
    } else {
        return None;
    };
    Some(quarter.zip(quarter_year).and_then(|(q, y)| quarter_span(y, q, q)))
}

fn quarter_list(text: &str) -> Option<Option<BookingPeriod>> {
    let c = QUARTER_LIST_YEAR.captures(text)?;
    let quarters = QUARTER_TOKEN
        .captures_iter(&c[1])
        .map(|q| number(&q, 1))
        .collect::<Option<Vec<u32>>>();
    Some(quarters.and_then(|quarters| {
        // Every listed quarter must be valid, not only the bounds.
        if quarters.iter().any(|q| quarter_months(*q).is_none()) {
            return None;
        }
        let first = *quarters.iter().min()?;
        let last = *quarters.iter().max()?;
        quarter_span(year(&c, 2)?, first, last)
    }))
}

fn numeric_month(text: &str) -> Option<Option<BookingPeriod>> {
    let c = NUMERIC_MONTH.captures(text)?;
    Some(year(&c, 2).and_then(|year| {
        let month = number(&c, 1)?;
        span(year, month, year, month)
    }))
}

fn month_name(text: &str) -> Option<Option<BookingPeriod>> {
    let c = MONTH_NAME.captures(text)?;
    Some(year(&c, 2).and_then(|year| {
        let month = month_from_name(&c[1])?;
        span(year, month, year, month)
    }))
}

// Helpers.
// ---

fn number(c: &Captures, group: usize) -> Option<u32> {
    c.get(group)?.as_str().parse().ok()
}

fn year(c: &Captures, group: usize) -> Option<i32> {
    c.get(group)?.as_str().parse().ok()
}

/// First day of the start month through the last day of the end month.
fn span(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> Option<BookingPeriod> {
    let from = month_start(from_year, from_month)?;
    let to = month_end(to_year, to_month)?;
    (from <= to).then_some(BookingPeriod { from, to })
}

fn quarter_span(year: i32, first_quarter: u32, last_quarter: u32) -> Option<BookingPeriod> {
    let (start_month, _) = quarter_months(first_quarter)?;
    let (_, end_month) = quarter_months(last_quarter)?;
    span(year, start_month, year, end_month)
}

fn quarter_months(quarter: u32) -> Option<(u32, u32)> {
    match quarter {
        1 => Some((1, 3)),
        2 => Some((4, 6)),
        3 => Some((7, 9)),
        4 => Some((10, 12)),
        _ => None,
    }
}

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Full English month name or three-letter abbreviation, any case.
fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|full| name == *full || (name.len() == 3 && full.starts_with(&name)))
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    use pretty_assertions::assert_eq;

    fn period(from: (i32, u32, u32), to: (i32, u32, u32)) -> Option<BookingPeriod> {
        Some(BookingPeriod {
            from: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            to: NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
        })
    }

    #[test]
    fn parses_single_quarters_in_all_forms() {
        assert_eq!(parse_period("Q1 2025"), period((2025, 1, 1), (2025, 3, 31)));
        assert_eq!(parse_period("Q4 2024"), period((2024, 10, 1), (2024, 12, 31)));
        assert_eq!(parse_period("2025-Q2"), period((2025, 4, 1), (2025, 6, 30)));
        assert_eq!(parse_period("Q3-2025"), period((2025, 7, 1), (2025, 9, 30)));
        assert_eq!(parse_period("  q2   2025 "), period((2025, 4, 1), (2025, 6, 30)));
    }

    #[test]
    fn quarter_lists_span_min_to_max() {
        assert_eq!(parse_period("Q1, Q3 2025"), period((2025, 1, 1), (2025, 9, 30)));
        assert_eq!(parse_period("Q4,Q2 2025"), period((2025, 4, 1), (2025, 12, 31)));
        assert_eq!(
            parse_period("Q1, Q2, Q3, Q4 2026"),
            period((2026, 1, 1), (2026, 12, 31))
        );
        assert_eq!(parse_period("Q1, Q5 2025"), None);
        assert_eq!(parse_period("Q1 Q3 2025"), None);
    }

    #[test]
    fn parses_month_name_ranges() {
        assert_eq!(parse_period("Jan to Dec 2025"), period((2025, 1, 1), (2025, 12, 31)));
        assert_eq!(
            parse_period("february TO april 2024"),
            period((2024, 2, 1), (2024, 4, 30))
        );
        assert_eq!(parse_period("Jan to Foo 2025"), None);
        assert_eq!(parse_period("Dec to Jan 2025"), None);
    }

    #[test]
    fn parses_numeric_month_ranges_across_years() {
        assert_eq!(
            parse_period("1/2025 to 12/2025"),
            period((2025, 1, 1), (2025, 12, 31))
        );
        assert_eq!(
            parse_period("11/2024 to 02/2025"),
            period((2024, 11, 1), (2025, 2, 28))
        );
        assert_eq!(parse_period("13/2025 to 12/2025"), None);
    }

    #[test]
    fn parses_single_months() {
        assert_eq!(parse_period("2/2024"), period((2024, 2, 1), (2024, 2, 29)));
        assert_eq!(parse_period("02/2025"), period((2025, 2, 1), (2025, 2, 28)));
        assert_eq!(parse_period("Sept 2025"), period((2025, 9, 1), (2025, 9, 30)));
        assert_eq!(parse_period("MARCH 2025"), period((2025, 3, 1), (2025, 3, 31)));
        assert_eq!(parse_period("0/2025"), None);
        assert_eq!(parse_period("Mar. 2025"), None);
    }

    #[test]
    fn rejects_unparsable_text() {
        assert_eq!(parse_period(""), None);
        assert_eq!(parse_period("   "), None);
        assert_eq!(parse_period("garbage"), None);
        assert_eq!(parse_period("Q5 2025"), None);
        assert_eq!(parse_period("Q0-2025"), None);
        assert_eq!(parse_period("Ma 2025"), None);
        assert_eq!(parse_period("2025"), None);
    }

    #[test]
    fn successful_parses_are_ordered() {
        let inputs = [
            "Q1 2025",
            "Q1, Q3 2025",
            "Jan to Dec 2025",
            "1/2024 to 3/2026",
            "Feb 2024",
            "12/2025",
        ];
        for input in inputs {
            let p = parse_period(input).unwrap();
            assert!(p.from <= p.to, "{input}");
        }
    }
}
