use chrono::NaiveDate;

/// Inclusive date range resolved from booking-period text. `from <= to` holds
/// for every value produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookingPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

// --

impl BookingPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    pub fn overlaps(&self, other: &BookingPeriod) -> bool {
        self.from <= other.to && other.from <= self.to
    }
}
