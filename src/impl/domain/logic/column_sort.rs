use std::cmp::Ordering;

use crate::entities::{CellValue, Row};

/// One comparison strategy per column, never mixed row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortStrategy {
    Numeric,
    CaseInsensitiveText,
}

enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortStrategy {
    /// Numeric when every non-missing value in the column reads as a number.
    pub(crate) fn for_column(rows: &[Row], column: &str) -> Self {
        let all_numeric = rows
            .iter()
            .map(|r| r.get(column))
            .filter(|v| !v.is_missing())
            .all(|v| v.as_number().is_some());
        if all_numeric {
            SortStrategy::Numeric
        } else {
            SortStrategy::CaseInsensitiveText
        }
    }

    fn key(self, value: &CellValue) -> SortKey {
        if value.is_missing() {
            return SortKey::Missing;
        }
        match self {
            SortStrategy::Numeric => value.as_number().map_or(SortKey::Missing, SortKey::Number),
            SortStrategy::CaseInsensitiveText => {
                SortKey::Text(value.canonical_string().to_lowercase())
            }
        }
    }
}

/// Stable sort of `rows` by `column`. Missing values go last in both
/// directions.
pub(crate) fn sort_rows(rows: Vec<Row>, column: &str, ascending: bool) -> Vec<Row> {
    let strategy = SortStrategy::for_column(&rows, column);
    let mut keyed: Vec<(SortKey, Row)> = rows
        .into_iter()
        .map(|row| (strategy.key(row.get(column)), row))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare(a, b, ascending));
    keyed.into_iter().map(|(_, row)| row).collect()
}

fn compare(a: &SortKey, b: &SortKey, ascending: bool) -> Ordering {
    let ordering = match (a, b) {
        (SortKey::Missing, SortKey::Missing) => return Ordering::Equal,
        (SortKey::Missing, _) => return Ordering::Greater,
        (_, SortKey::Missing) => return Ordering::Less,
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
        (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        // A column has a single strategy, so mixed keys cannot occur.
        _ => Ordering::Equal,
    };
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}
