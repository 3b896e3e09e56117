use std::{str::FromStr, sync::LazyLock};

use chrono::NaiveDate;
use fractic_server_error::ServerError;
use regex::Regex;

use crate::entities::CellValue;

static GROUPED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").expect("grouped number regex should compile")
});

/// Raw import cell. Blank cells are null; numbers may carry `,` thousands
/// separators; `YYYY-MM-DD` is a date; anything else is trimmed text.
#[derive(Debug)]
pub(crate) struct CellValueModel(pub CellValue);
impl FromStr for CellValueModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Ok(CellValueModel(CellValue::Null));
        }
        let numeric = if GROUPED_NUMBER.is_match(raw) {
            raw.replace(',', "")
        } else {
            raw.to_string()
        };
        if let Ok(n) = numeric.parse::<f64>() {
            if n.is_finite() {
                return Ok(CellValueModel(CellValue::Number(n)));
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(CellValueModel(CellValue::Date(d)));
        }
        Ok(CellValueModel(CellValue::Text(raw.to_string())))
    }
}

impl Into<CellValue> for CellValueModel {
    fn into(self) -> CellValue {
        self.0
    }
}
