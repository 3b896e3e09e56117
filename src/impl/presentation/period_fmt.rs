use chrono::{Datelike as _, NaiveDate};

use crate::entities::BookingPeriod;

/// Compact display of a date range: "Jan 2025", "Jan to Dec 2025" or
/// "Nov 2024 to Feb 2025". Days are not shown, so this does not always
/// parse back to the same range.
pub fn format_period_display(from: NaiveDate, to: NaiveDate) -> String {
    let month = |d: NaiveDate| d.format("%b").to_string();
    if from.year() != to.year() {
        format!(
            "{} {} to {} {}",
            month(from),
            from.year(),
            month(to),
            to.year()
        )
    } else if from.month() != to.month() {
        format!("{} to {} {}", month(from), month(to), to.year())
    } else {
        format!("{} {}", month(from), from.year())
    }
}

impl std::fmt::Display for BookingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_period_display(self.from, self.to))
    }
}
