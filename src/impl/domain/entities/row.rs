use std::collections::HashMap;

use chrono::NaiveDate;

/// Stable identity of a grid row, usually the database primary key. Never a
/// display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub fields: HashMap<String, CellValue>,
}

// --

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CellValue {
    /// String form used for filter membership, sorting fallback and duplicate
    /// detection. Deterministic per value type.
    pub fn canonical_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Null, blank text, and NaN (as a number or as the text exported for
    /// an empty cell).
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => {
                let s = s.trim();
                s.is_empty() || s.eq_ignore_ascii_case("nan")
            }
            CellValue::Number(n) => n.is_nan(),
            CellValue::Date(_) => false,
        }
    }

    /// Finite numeric reading of the value, if it has one. Text is parsed
    /// after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

static NULL_CELL: CellValue = CellValue::Null;

impl Row {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            fields: HashMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.fields.insert(column.to_string(), value.into());
        self
    }

    /// Value at `column`, or `Null` if the row has no such field.
    pub fn get(&self, column: &str) -> &CellValue {
        self.fields.get(column).unwrap_or(&NULL_CELL)
    }
}
