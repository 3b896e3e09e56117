use std::time::Duration;

pub const FROM_DATE_COLUMN: &str = "from_date";
pub const TO_DATE_COLUMN: &str = "to_date";

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub title: String,
    /// Columns read from the data source, in display order.
    pub columns: Vec<String>,
    pub id_column: String,
    /// Free-text booking period column. When set, `from_date` and `to_date`
    /// are derived from it.
    pub period_column: Option<String>,
    /// Columns ignored when looking for duplicate rows (synthetic ids,
    /// document numbers).
    pub duplicate_ignore_columns: Vec<String>,
    pub auto_refresh: AutoRefreshConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRefreshConfig {
    pub enabled: bool,
    pub interval: Duration,
}

// --

impl Default for AutoRefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(30),
        }
    }
}

impl GridConfig {
    pub fn new(title: &str, columns: &[&str], id_column: &str) -> Self {
        Self {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            id_column: id_column.to_string(),
            period_column: None,
            duplicate_ignore_columns: vec![id_column.to_string()],
            auto_refresh: AutoRefreshConfig::default(),
        }
    }

    pub fn with_period_column(mut self, column: &str) -> Self {
        self.period_column = Some(column.to_string());
        self
    }

    /// Grid columns: the source columns, followed by the derived period dates
    /// when a period column is configured.
    pub fn schema(&self) -> Vec<String> {
        let mut schema = self.columns.clone();
        if self.period_column.is_some() {
            for derived in [FROM_DATE_COLUMN, TO_DATE_COLUMN] {
                if !schema.iter().any(|c| c == derived) {
                    schema.push(derived.to_string());
                }
            }
        }
        schema
    }
}
