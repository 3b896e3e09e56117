use num_format::{Locale, ToFormattedString as _};

use crate::entities::CellValue;

/// Display text of a cell, as shown in the grid and in exports.
///
/// Numbers use en thousands separators (1,234.50); whole numbers print
/// without decimals. Dates are ISO, nulls blank.
pub fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

/// Totals strip value, always with two decimal places.
pub fn format_total(total: f64) -> String {
    format_with_decimals(total, 2)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        (n as i64).to_formatted_string(&Locale::en)
    } else {
        format_with_decimals(n, 2)
    }
}

fn format_with_decimals(n: f64, decimal_places: usize) -> String {
    let rounded = format!("{:.decimal_places$}", n.abs());
    let (integer_part, fractional_part) =
        rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let integer_part = integer_part
        .parse::<u64>()
        .map(|i| i.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| integer_part.to_string());
    let sign = if n < 0.0 && rounded.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    if fractional_part.is_empty() {
        format!("{}{}", sign, integer_part)
    } else {
        format!("{}{}.{}", sign, integer_part, fractional_part)
    }
}
