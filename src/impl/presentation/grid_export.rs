use fractic_server_error::{CriticalError, ServerError};

use crate::domain::logic::grid_engine::GridEngine;

use super::cell_fmt::format_cell;

/// The visible view, flattened to display strings, as handed to the
/// workbook/PDF writers.
#[derive(Debug, Clone, PartialEq)]
pub struct GridExport {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl GridExport {
    /// Visible rows in view order, cells formatted per column.
    pub fn from_engine(title: &str, engine: &GridEngine) -> Self {
        let columns = engine.columns().to_vec();
        let rows = engine
            .visible_rows()
            .map(|row| columns.iter().map(|c| format_cell(row.get(c))).collect())
            .collect();
        Self {
            title: title.to_string(),
            columns,
            rows,
        }
    }

    pub fn to_csv(&self) -> Result<String, ServerError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.columns)
            .map_err(|e| CriticalError::with_debug("failed to write CSV header", &e))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| CriticalError::with_debug("failed to write CSV row", &e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| CriticalError::with_debug("failed to flush CSV output", &e))?;
        String::from_utf8(bytes)
            .map_err(|e| CriticalError::with_debug("CSV output is not valid UTF-8", &e))
    }
}
